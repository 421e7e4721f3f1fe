//! Robinson unification over banked terms, and substitution application/renaming.
//!
//! Standard multi-bank occurs-checked unification; mutations are recorded onto a trail so
//! backtracking can undo bindings rather than copying substitution state wholesale.
use rustc_hash::FxHashMap;
use saturate_formula::{TermData, TermId, TermStore, Var};

use crate::bank::{Bank, BankedTerm};
use crate::substitution::Substitution;
use crate::trail::Trail;

/// Follow `term` through `subst` until it reaches an unbound variable or a non-variable term.
fn deref(store: &TermStore, subst: &Substitution, mut term: BankedTerm) -> BankedTerm {
    loop {
        match store.as_var(term.term) {
            Some(v) => match subst.lookup((v, term.bank)) {
                Some(next) => term = next,
                None => return term,
            },
            None => return term,
        }
    }
}

fn occurs(store: &TermStore, subst: &Substitution, var: (Var, Bank), term: BankedTerm) -> bool {
    let term = deref(store, subst, term);
    match store.data(term.term) {
        TermData::Var(v) => (*v, term.bank) == var,
        TermData::Special(_) => false,
        TermData::App(_, args) => args
            .iter()
            .any(|&arg| occurs(store, subst, var, BankedTerm::new(arg, term.bank))),
    }
}

/// Unify `t1` and `t2`, extending `subst` and recording every binding onto `trail`.
///
/// Returns `false` (leaving `subst` unchanged, modulo bindings the caller must roll back via
/// `trail`) on clash or failed occurs-check
pub fn unify(
    store: &TermStore,
    subst: &mut Substitution,
    trail: &mut Trail,
    t1: BankedTerm,
    t2: BankedTerm,
) -> bool {
    let t1 = deref(store, subst, t1);
    let t2 = deref(store, subst, t2);

    if t1.term == t2.term && t1.bank == t2.bank {
        return true;
    }

    let v1 = store.as_var(t1.term).map(|v| (v, t1.bank));
    let v2 = store.as_var(t2.term).map(|v| (v, t2.bank));

    match (v1, v2) {
        (Some(key), _) => {
            if occurs(store, subst, key, t2) {
                return false;
            }
            subst.bind(key, t2, trail);
            true
        }
        (_, Some(key)) => {
            if occurs(store, subst, key, t1) {
                return false;
            }
            subst.bind(key, t1, trail);
            true
        }
        (None, None) => match (store.data(t1.term), store.data(t2.term)) {
            (TermData::App(f1, a1), TermData::App(f2, a2)) => {
                if f1 != f2 || a1.len() != a2.len() {
                    return false;
                }
                for (&x, &y) in a1.iter().zip(a2.iter()) {
                    if !unify(
                        store,
                        subst,
                        trail,
                        BankedTerm::new(x, t1.bank),
                        BankedTerm::new(y, t2.bank),
                    ) {
                        return false;
                    }
                }
                true
            }
            (TermData::Special(s1), TermData::Special(s2)) => s1 == s2 && t1.bank == t2.bank,
            _ => false,
        },
    }
}

/// Unify the argument lists of two literals that must already share a header (same predicate and
/// polarity)
pub fn unify_args(
    store: &TermStore,
    subst: &mut Substitution,
    trail: &mut Trail,
    l1_args: &[TermId],
    bank1: Bank,
    l2_args: &[TermId],
    bank2: Bank,
) -> bool {
    if l1_args.len() != l2_args.len() {
        return false;
    }
    for (&x, &y) in l1_args.iter().zip(l2_args.iter()) {
        if !unify(
            store,
            subst,
            trail,
            BankedTerm::new(x, bank1),
            BankedTerm::new(y, bank2),
        ) {
            return false;
        }
    }
    true
}

/// Produces fresh, compactly-numbered variables for an output bank while walking a term through
/// the current substitution.
#[derive(Default)]
pub struct Renamer {
    next: u32,
    map: FxHashMap<(Var, Bank), Var>,
}

impl Renamer {
    pub fn new() -> Renamer {
        Renamer::default()
    }

    fn rename(&mut self, key: (Var, Bank)) -> Var {
        let next = &mut self.next;
        *self.map.entry(key).or_insert_with(|| {
            let fresh = Var::from_index(*next as usize);
            *next += 1;
            fresh
        })
    }
}

/// Apply `subst` to `term`, writing the result into `store` and renaming any variables left
/// unbound into fresh, compact numbers via `renamer`.
pub fn apply(
    store: &mut TermStore,
    subst: &Substitution,
    renamer: &mut Renamer,
    term: BankedTerm,
) -> TermId {
    let term = deref(store, subst, term);
    match store.data(term.term).clone() {
        TermData::Var(v) => {
            let fresh = renamer.rename((v, term.bank));
            store.mk_var(fresh)
        }
        TermData::Special(v) => store.mk_special(v),
        TermData::App(f, args) => {
            let new_args: Vec<TermId> = args
                .iter()
                .map(|&arg| apply(store, subst, renamer, BankedTerm::new(arg, term.bank)))
                .collect();
            store.create(f, new_args)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use saturate_formula::TermStore;

    #[test]
    fn unifies_variable_with_ground_term() {
        let mut store = TermStore::new();
        let f = store.signature_mut().declare_function("f", 1);
        let a = store.signature_mut().declare_function("a", 0);
        let a_id = store.create(a, vec![]);
        let fa = store.create(f, vec![a_id]);
        let x = store.mk_var(Var::from_index(0));

        let mut subst = Substitution::new();
        let mut trail = Trail::new();
        let cp = trail.checkpoint();

        assert!(unify(
            &store,
            &mut subst,
            &mut trail,
            BankedTerm::new(x, Bank::GOAL),
            BankedTerm::new(fa, Bank::INDEXED),
        ));
        assert_eq!(
            subst.lookup((Var::from_index(0), Bank::GOAL)),
            Some(BankedTerm::new(fa, Bank::INDEXED))
        );
        trail.commit(cp);
    }

    #[test]
    fn occurs_check_rejects_cyclic_binding() {
        let mut store = TermStore::new();
        let f = store.signature_mut().declare_function("f", 1);
        let x = store.mk_var(Var::from_index(0));
        let fx = store.create(f, vec![x]);

        let mut subst = Substitution::new();
        let mut trail = Trail::new();
        let cp = trail.checkpoint();

        assert!(!unify(
            &store,
            &mut subst,
            &mut trail,
            BankedTerm::new(x, Bank::GOAL),
            BankedTerm::new(fx, Bank::GOAL),
        ));
        trail.rollback(cp, &mut subst);
        assert!(subst.is_empty());
    }

    #[test]
    fn different_banks_keep_variables_disjoint() {
        let mut store = TermStore::new();
        let f = store.signature_mut().declare_function("f", 2);
        let x = store.mk_var(Var::from_index(0));
        let y = store.mk_var(Var::from_index(0)); // same raw index, different bank
        let a = store.signature_mut().declare_function("a", 0);
        let a_id = store.create(a, vec![]);
        let fxa = store.create(f, vec![x, a_id]);
        let fay = store.create(f, vec![a_id, y]);

        let mut subst = Substitution::new();
        let mut trail = Trail::new();
        let cp = trail.checkpoint();

        assert!(unify(
            &store,
            &mut subst,
            &mut trail,
            BankedTerm::new(fxa, Bank::GOAL),
            BankedTerm::new(fay, Bank::INDEXED),
        ));
        // X (goal) bound to `a`; the second argument's Y (indexed) is bound to `a` too, but the
        // two Var(0)s never collide because their banks differ.
        assert_eq!(
            subst.lookup((Var::from_index(0), Bank::GOAL)),
            Some(BankedTerm::new(a_id, Bank::INDEXED))
        );
        assert_eq!(
            subst.lookup((Var::from_index(0), Bank::INDEXED)),
            Some(BankedTerm::new(a_id, Bank::GOAL))
        );
        trail.commit(cp);
    }

    #[test]
    fn rollback_undoes_bindings_on_failure() {
        let mut store = TermStore::new();
        let f = store.signature_mut().declare_function("f", 2);
        let g = store.signature_mut().declare_function("g", 1);
        let a = store.signature_mut().declare_function("a", 0);
        let b = store.signature_mut().declare_function("b", 0);
        let a_id = store.create(a, vec![]);
        let b_id = store.create(b, vec![]);
        let x = store.mk_var(Var::from_index(0));

        let lhs = store.create(f, vec![x, store.create(g, vec![a_id])]);
        let rhs = store.create(f, vec![a_id, store.create(g, vec![b_id])]);

        let mut subst = Substitution::new();
        let mut trail = Trail::new();
        let cp = trail.checkpoint();

        assert!(!unify(
            &store,
            &mut subst,
            &mut trail,
            BankedTerm::new(lhs, Bank::GOAL),
            BankedTerm::new(rhs, Bank::GOAL),
        ));
        trail.rollback(cp, &mut subst);
        assert!(subst.is_empty());
    }

    #[test]
    fn apply_renames_unbound_variables_compactly() {
        let mut store = TermStore::new();
        let f = store.signature_mut().declare_function("f", 2);
        let x = store.mk_var(Var::from_index(5));
        let y = store.mk_var(Var::from_index(9));
        let fxy = store.create(f, vec![x, y]);

        let subst = Substitution::new();
        let mut renamer = Renamer::new();
        let renamed = apply(&mut store, &subst, &mut renamer, BankedTerm::new(fxy, Bank::GOAL));

        let args = store.args(renamed).to_vec();
        assert_eq!(store.as_var(args[0]), Some(Var::from_index(0)));
        assert_eq!(store.as_var(args[1]), Some(Var::from_index(1)));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use saturate_formula::term::strategy::*;

    proptest! {
        #[test]
        fn a_ground_term_always_unifies_with_itself(shape in ground_term_shape()) {
            let mut store = TermStore::new();
            let sig = TestSignature::declare(&mut store);
            let term = materialize(&mut store, &sig, &shape);

            let mut subst = Substitution::new();
            let mut trail = Trail::new();
            let cp = trail.checkpoint();
            prop_assert!(unify(
                &store,
                &mut subst,
                &mut trail,
                BankedTerm::new(term, Bank::GOAL),
                BankedTerm::new(term, Bank::GOAL),
            ));
            trail.rollback(cp, &mut subst);
        }

        #[test]
        fn a_variable_bound_to_a_ground_term_applies_back_to_it(shape in ground_term_shape()) {
            let mut store = TermStore::new();
            let sig = TestSignature::declare(&mut store);
            let term = materialize(&mut store, &sig, &shape);
            let x = store.mk_var(Var::from_index(0));

            let mut subst = Substitution::new();
            let mut trail = Trail::new();
            let cp = trail.checkpoint();
            prop_assert!(unify(
                &store,
                &mut subst,
                &mut trail,
                BankedTerm::new(x, Bank::GOAL),
                BankedTerm::new(term, Bank::INDEXED),
            ));

            let mut renamer = Renamer::new();
            let applied = apply(&mut store, &subst, &mut renamer, BankedTerm::new(x, Bank::GOAL));
            prop_assert_eq!(applied, term);
            trail.rollback(cp, &mut subst);
        }

        #[test]
        fn a_variable_never_unifies_with_a_term_that_contains_it(shape in ground_term_shape()) {
            let mut store = TermStore::new();
            let sig = TestSignature::declare(&mut store);
            let x = store.mk_var(Var::from_index(0));
            let wrapped = materialize(&mut store, &sig, &TermShape::Unary(Box::new(shape)));
            let fx = store.create(sig.f, vec![x, wrapped]);

            let mut subst = Substitution::new();
            let mut trail = Trail::new();
            let cp = trail.checkpoint();
            prop_assert!(!unify(
                &store,
                &mut subst,
                &mut trail,
                BankedTerm::new(x, Bank::GOAL),
                BankedTerm::new(fx, Bank::GOAL),
            ));
            trail.rollback(cp, &mut subst);
        }
    }
}
