//! Clause-level simplifications that do not involve rewriting: tautology detection, duplicate-
//! literal and trivial-inequality elimination, and multiset subsumption (with its one-literal
//! "subsumption resolution" cousin).
//!
//! Covers the forward simplification pass (tautology checks, duplicate/trivial-literal removal,
//! forward subsumption and subsumption resolution) and the backward counterparts run against the
//! active set, tagged with the `Subsumption`/`SubsumptionResolution`/`TautologyIntroduction` rules.
use rustc_hash::FxHashMap;
use saturate_formula::{Literal, TermData, TermId, TermStore, Var};

use crate::clause::Clause;

/// Whether `literals` is a propositional tautology: it contains a literal and its exact
/// complement, or a reflexive positive equality `t = t`.
pub fn is_tautology(store: &TermStore, literals: &[Literal]) -> bool {
    for (i, &a) in literals.iter().enumerate() {
        if a.is_equality() && a.is_positive() {
            let args = a.args(store);
            if args.len() == 2 && args[0] == args[1] {
                return true;
            }
        }
        for &b in &literals[i + 1..] {
            if a.atom() == b.atom() && a.is_positive() != b.is_positive() {
                return true;
            }
        }
    }
    false
}

/// Remove duplicate literals (same atom and polarity), keeping the first occurrence's order.
pub fn remove_duplicate_literals(literals: &[Literal]) -> Vec<Literal> {
    let mut seen = rustc_hash::FxHashSet::default();
    literals
        .iter()
        .copied()
        .filter(|lit| seen.insert((lit.atom(), lit.is_positive())))
        .collect()
}

/// Remove negative equality literals of the shape `t != t`, always false and thus a contributing
/// disjunct that can never make the clause true; removing one cannot make the clause unsound.
pub fn remove_trivial_inequalities(store: &TermStore, literals: &[Literal]) -> Vec<Literal> {
    literals
        .iter()
        .copied()
        .filter(|lit| {
            if lit.is_equality() && lit.is_negative() {
                let args = lit.args(store);
                if args.len() == 2 && args[0] == args[1] {
                    return false;
                }
            }
            true
        })
        .collect()
}

/// One-way match `pattern` into `instance`, extending `bindings` (shared across the whole
/// subsumption attempt, not reset per literal) and failing if a pattern variable would need two
/// different instance bindings.
fn extend_match(
    store: &TermStore,
    pattern: TermId,
    instance: TermId,
    bindings: &mut FxHashMap<Var, TermId>,
) -> bool {
    if let Some(var) = store.as_var(pattern) {
        return match bindings.get(&var) {
            Some(&bound) => bound == instance,
            None => {
                bindings.insert(var, instance);
                true
            }
        };
    }
    match (store.data(pattern), store.data(instance)) {
        (TermData::App(f1, a1), TermData::App(f2, a2)) => {
            if f1 != f2 || a1.len() != a2.len() {
                return false;
            }
            a1.iter()
                .zip(a2.iter())
                .all(|(&p, &i)| extend_match(store, p, i, bindings))
        }
        (TermData::Special(s1), TermData::Special(s2)) => s1 == s2,
        _ => pattern == instance,
    }
}

fn literal_matches(store: &TermStore, pattern: Literal, instance: Literal, bindings: &mut FxHashMap<Var, TermId>) -> bool {
    if pattern.header() != instance.header() {
        return false;
    }
    extend_match(store, pattern.atom(), instance.atom(), bindings)
}

/// Search, with backtracking, for an injective assignment of every `pattern` literal to a
/// distinct `instance` literal such that one shared substitution matches all of them: a clause
/// `C` subsumes `D` iff there is a substitution `σ` with `Cσ ⊆ D` as a multiset.
pub fn multiset_subsumes(store: &TermStore, pattern: &[Literal], instance: &[Literal]) -> bool {
    if pattern.len() > instance.len() {
        return false;
    }
    let mut used = vec![false; instance.len()];
    let mut bindings = FxHashMap::default();
    backtrack_subsume(store, pattern, 0, instance, &mut used, &mut bindings)
}

fn backtrack_subsume(
    store: &TermStore,
    pattern: &[Literal],
    idx: usize,
    instance: &[Literal],
    used: &mut [bool],
    bindings: &mut FxHashMap<Var, TermId>,
) -> bool {
    if idx == pattern.len() {
        return true;
    }
    let lit = pattern[idx];
    for ii in 0..instance.len() {
        if used[ii] {
            continue;
        }
        let saved = bindings.clone();
        if literal_matches(store, lit, instance[ii], bindings) {
            used[ii] = true;
            if backtrack_subsume(store, pattern, idx + 1, instance, used, bindings) {
                return true;
            }
            used[ii] = false;
        }
        *bindings = saved;
    }
    false
}

/// Whether `subsumer` subsumes `subsumed` (a different clause; a clause never usefully subsumes
/// a strictly-longer copy of itself via the identity substitution, since that is a no-op).
pub fn subsumes(store: &TermStore, subsumer: &Clause, subsumed: &Clause) -> bool {
    multiset_subsumes(store, &subsumer.literals, &subsumed.literals)
}

/// Subsumption resolution: if some active clause `side = rest ∨ L'` has `L'` complementary (same
/// atom family, opposite polarity, under the shared substitution) to a literal `L` of `target`,
/// and `rest` multiset-subsumes `target` minus `L`, then `L` can be dropped from `target`.
///
/// Returns the simplified literal list when a matching side premise is found, `None` otherwise.
pub fn subsumption_resolution(store: &TermStore, target: &[Literal], side: &[Literal]) -> Option<Vec<Literal>> {
    for (ti, &target_lit) in target.iter().enumerate() {
        for (si, &side_lit) in side.iter().enumerate() {
            if side_lit.header() != target_lit.complementary_header() {
                continue;
            }
            let rest: Vec<Literal> = side
                .iter()
                .enumerate()
                .filter(|&(k, _)| k != si)
                .map(|(_, &l)| l)
                .collect();
            let target_minus: Vec<Literal> = target
                .iter()
                .enumerate()
                .filter(|&(k, _)| k != ti)
                .map(|(_, &l)| l)
                .collect();
            let mut bindings = FxHashMap::default();
            if !literal_matches(store, side_lit, target_lit, &mut bindings) {
                continue;
            }
            if multiset_subsumes(store, &rest, &target_minus) {
                return Some(target_minus);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use saturate_formula::{PredicateId, Var};

    #[test]
    fn detects_propositional_tautology() {
        let mut store = TermStore::new();
        let p = store.signature_mut().declare_predicate("p", 1);
        let x = store.mk_var(Var::from_index(0));
        let y = store.mk_var(Var::from_index(1));
        let pos = store.create_literal(p, true, false, vec![x]);
        let neg = store.create_literal(p, true, false, vec![x]).negate();
        let r = store.create_literal(p, true, false, vec![y]);

        assert!(is_tautology(&store, &[pos, neg, r]));
    }

    #[test]
    fn detects_reflexive_equality_tautology() {
        let mut store = TermStore::new();
        let x = store.mk_var(Var::from_index(0));
        let eq = store.create_literal(PredicateId::equality(), true, true, vec![x, x]);
        assert!(is_tautology(&store, &[eq]));
    }

    #[test]
    fn unit_clause_subsumes_longer_clause_containing_an_instance() {
        let mut store = TermStore::new();
        let p = store.signature_mut().declare_predicate("p", 1);
        let x = store.mk_var(Var::from_index(0));
        let a = store.signature_mut().declare_function("a", 0);
        let a_id = store.create(a, vec![]);
        let b = store.signature_mut().declare_function("b", 0);
        let b_id = store.create(b, vec![]);

        let general = store.create_literal(p, true, false, vec![x]);
        let specific_a = store.create_literal(p, true, false, vec![a_id]);
        let specific_b = store.create_literal(p, true, false, vec![b_id]);

        assert!(multiset_subsumes(&store, &[general], &[specific_a, specific_b]));
    }

    #[test]
    fn subsumption_resolution_drops_matched_literal() {
        let mut store = TermStore::new();
        let p = store.signature_mut().declare_predicate("p", 1);
        let q = store.signature_mut().declare_predicate("q", 0);
        let a = store.signature_mut().declare_function("a", 0);
        let a_id = store.create(a, vec![]);
        let x = store.mk_var(Var::from_index(0));

        let side_neg = store.create_literal(p, true, false, vec![x]).negate();
        let target_pos = store.create_literal(p, true, false, vec![a_id]);
        let target_q = store.create_literal(q, true, false, vec![]);

        let simplified =
            subsumption_resolution(&store, &[target_pos, target_q], std::slice::from_ref(&side_neg));
        assert_eq!(simplified, Some(vec![target_q]));
    }
}
