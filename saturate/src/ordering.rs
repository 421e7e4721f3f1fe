//! Term and literal orderings: Knuth-Bendix (KBO) and Lexicographic Path (LPO).
//!
//! Both orderings are standard superposition-calculus machinery and are selected through one
//! [`TermOrdering`] enum per `SolverConfig`, following the single-enum-driven strategy-knob style
//! used for the other configurable passes in this crate.
use std::cmp::Ordering as StdOrdering;

use saturate_formula::{FunctionId, TermData, TermId, TermStore};

/// Result of comparing two terms under a simplification ordering.
///
/// Term orderings used for superposition are partial, so a plain [`StdOrdering`] is insufficient:
/// two terms may simply be incomparable.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Comparison {
    Less,
    Equal,
    Greater,
    Incomparable,
}

impl Comparison {
    pub fn is_greater_or_equal(self) -> bool {
        matches!(self, Comparison::Greater | Comparison::Equal)
    }
}

/// Which simplification ordering a saturation run uses.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum TermOrdering {
    /// Knuth-Bendix ordering: compares weight first, breaking ties lexicographically by symbol
    /// precedence (here: ascending function-symbol id).
    Kbo,
    /// Lexicographic path ordering: recursively compares the head symbol's precedence, falling
    /// back to a lexicographic comparison of arguments.
    Lpo,
}

impl TermOrdering {
    pub fn compare(self, store: &TermStore, a: TermId, b: TermId) -> Comparison {
        match self {
            TermOrdering::Kbo => kbo_compare(store, a, b),
            TermOrdering::Lpo => lpo_compare(store, a, b),
        }
    }
}

fn precedence(f: FunctionId) -> u32 {
    f.index() as u32
}

/// Knuth-Bendix ordering: weight (symbol count) is the primary key, subject to the usual
/// admissibility caveat that a variable must occur in `a` at least as often as in `b` for `a` to
/// be considered greater. Falls back to symbol precedence as a tie-break.
fn kbo_compare(store: &TermStore, a: TermId, b: TermId) -> Comparison {
    if a == b {
        return Comparison::Equal;
    }

    if !var_occurrences_dominate(store, a, b) {
        return if var_occurrences_dominate(store, b, a) {
            kbo_compare_with_dominance(store, b, a).reverse()
        } else {
            Comparison::Incomparable
        };
    }

    kbo_compare_with_dominance(store, a, b)
}

impl Comparison {
    fn reverse(self) -> Comparison {
        match self {
            Comparison::Less => Comparison::Greater,
            Comparison::Greater => Comparison::Less,
            other => other,
        }
    }
}

fn kbo_compare_with_dominance(store: &TermStore, a: TermId, b: TermId) -> Comparison {
    let wa = store.weight(a);
    let wb = store.weight(b);
    match wa.cmp(&wb) {
        StdOrdering::Greater => Comparison::Greater,
        StdOrdering::Less => Comparison::Less,
        StdOrdering::Equal => match (store.functor(a), store.functor(b)) {
            (Some(fa), Some(fb)) => match precedence(fa).cmp(&precedence(fb)) {
                StdOrdering::Equal => {
                    let args_a = store.args(a);
                    let args_b = store.args(b);
                    for (&x, &y) in args_a.iter().zip(args_b.iter()) {
                        match kbo_compare(store, x, y) {
                            Comparison::Equal => continue,
                            other => return other,
                        }
                    }
                    Comparison::Equal
                }
                StdOrdering::Greater => Comparison::Greater,
                StdOrdering::Less => Comparison::Less,
            },
            (Some(_), None) => Comparison::Greater,
            (None, Some(_)) => Comparison::Less,
            (None, None) => Comparison::Equal,
        },
    }
}

/// Whether every variable occurs in `a` at least as often as in `b` (a necessary condition for
/// `a >= b` in KBO with all-1 weights per symbol and a non-collapsing precedence).
fn var_occurrences_dominate(store: &TermStore, a: TermId, b: TermId) -> bool {
    let mut counts_a = rustc_hash::FxHashMap::default();
    let mut counts_b = rustc_hash::FxHashMap::default();
    count_vars(store, a, &mut counts_a);
    count_vars(store, b, &mut counts_b);
    counts_b
        .iter()
        .all(|(var, &count_b)| counts_a.get(var).copied().unwrap_or(0) >= count_b)
}

fn count_vars(
    store: &TermStore,
    term: TermId,
    counts: &mut rustc_hash::FxHashMap<saturate_formula::Var, u32>,
) {
    match store.data(term) {
        TermData::Var(v) => {
            *counts.entry(*v).or_insert(0) += 1;
        }
        TermData::Special(_) => {}
        TermData::App(_, args) => {
            for &arg in args.iter() {
                count_vars(store, arg, counts);
            }
        }
    }
}

/// Lexicographic path ordering, standard recursive definition over symbol precedence.
fn lpo_compare(store: &TermStore, a: TermId, b: TermId) -> Comparison {
    if a == b {
        return Comparison::Equal;
    }

    if store.is_var(a) {
        return if occurs_as_subterm(store, a, b) {
            Comparison::Less
        } else {
            Comparison::Incomparable
        };
    }
    if store.is_var(b) {
        return if occurs_as_subterm(store, b, a) {
            Comparison::Greater
        } else {
            Comparison::Incomparable
        };
    }

    let (fa, args_a) = (store.functor(a).unwrap(), store.args(a));
    let (fb, args_b) = (store.functor(b).unwrap(), store.args(b));

    // Case 1: some argument of `a` is >= b.
    if args_a
        .iter()
        .any(|&arg| lpo_compare(store, arg, b).is_greater_or_equal() || arg == b)
    {
        return Comparison::Greater;
    }
    // Symmetric case for `b`.
    if args_b
        .iter()
        .any(|&arg| lpo_compare(store, arg, a).is_greater_or_equal() || arg == a)
    {
        return Comparison::Less;
    }

    match precedence(fa).cmp(&precedence(fb)) {
        StdOrdering::Greater => {
            if args_b
                .iter()
                .all(|&arg| lpo_compare(store, a, arg) == Comparison::Greater)
            {
                Comparison::Greater
            } else {
                Comparison::Incomparable
            }
        }
        StdOrdering::Less => {
            if args_a
                .iter()
                .all(|&arg| lpo_compare(store, b, arg) == Comparison::Greater)
            {
                Comparison::Less
            } else {
                Comparison::Incomparable
            }
        }
        StdOrdering::Equal => {
            for (&x, &y) in args_a.iter().zip(args_b.iter()) {
                match lpo_compare(store, x, y) {
                    Comparison::Equal => continue,
                    Comparison::Greater => {
                        return if args_b.iter().all(|&arg| lpo_compare(store, a, arg) == Comparison::Greater) {
                            Comparison::Greater
                        } else {
                            Comparison::Incomparable
                        };
                    }
                    Comparison::Less => {
                        return if args_a.iter().all(|&arg| lpo_compare(store, b, arg) == Comparison::Greater) {
                            Comparison::Less
                        } else {
                            Comparison::Incomparable
                        };
                    }
                    Comparison::Incomparable => return Comparison::Incomparable,
                }
            }
            Comparison::Equal
        }
    }
}

fn occurs_as_subterm(store: &TermStore, var: TermId, term: TermId) -> bool {
    if var == term {
        return true;
    }
    match store.data(term) {
        TermData::App(_, args) => args.iter().any(|&arg| occurs_as_subterm(store, var, arg)),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use saturate_formula::Var;

    #[test]
    fn kbo_orders_by_weight() {
        let mut store = TermStore::new();
        let f = store.signature_mut().declare_function("f", 1);
        let a = store.signature_mut().declare_function("a", 0);
        let a_id = store.create(a, vec![]);
        let fa = store.create(f, vec![a_id]);

        assert_eq!(kbo_compare(&store, fa, a_id), Comparison::Greater);
        assert_eq!(kbo_compare(&store, a_id, fa), Comparison::Less);
        assert_eq!(kbo_compare(&store, a_id, a_id), Comparison::Equal);
    }

    #[test]
    fn kbo_variable_is_incomparable_with_non_subterm() {
        let mut store = TermStore::new();
        let f = store.signature_mut().declare_function("f", 1);
        let a = store.signature_mut().declare_function("a", 0);
        let a_id = store.create(a, vec![]);
        let _fa = store.create(f, vec![a_id]);
        let x = store.mk_var(Var::from_index(0));

        assert_eq!(kbo_compare(&store, x, a_id), Comparison::Incomparable);
    }

    #[test]
    fn lpo_orders_nested_application_above_subterm() {
        let mut store = TermStore::new();
        let f = store.signature_mut().declare_function("f", 1);
        let a = store.signature_mut().declare_function("a", 0);
        let a_id = store.create(a, vec![]);
        let fa = store.create(f, vec![a_id]);
        let ffa = store.create(f, vec![fa]);

        assert_eq!(lpo_compare(&store, ffa, fa), Comparison::Greater);
        assert_eq!(lpo_compare(&store, fa, ffa), Comparison::Less);
    }
}
