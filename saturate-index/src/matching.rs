//! One-way term matching (pattern against instance), used for generalisation/instance queries.
//!
//! Unlike [`saturate_unify::unify`], only the pattern side's variables are ever bound; the
//! instance side is treated as rigid. This is deliberately a separate, simpler routine rather
//! than unification-with-one-bank-frozen, since matching never needs a trail: a match attempt
//! either succeeds outright or is discarded wholesale, there is nothing to roll back mid-way.
use rustc_hash::FxHashMap;
use saturate_formula::{TermData, TermId, TermStore, Var};

/// Match `pattern` against `instance`, returning the pattern-variable bindings on success.
pub fn one_way_match(
    store: &TermStore,
    pattern: TermId,
    instance: TermId,
) -> Option<FxHashMap<Var, TermId>> {
    let mut bindings = FxHashMap::default();
    if match_into(store, pattern, instance, &mut bindings) {
        Some(bindings)
    } else {
        None
    }
}

/// Match two equal-length argument lists, threading one binding set across all of them.
pub fn one_way_match_args(
    store: &TermStore,
    pattern_args: &[TermId],
    instance_args: &[TermId],
) -> Option<FxHashMap<Var, TermId>> {
    if pattern_args.len() != instance_args.len() {
        return None;
    }
    let mut bindings = FxHashMap::default();
    for (&p, &i) in pattern_args.iter().zip(instance_args.iter()) {
        if !match_into(store, p, i, &mut bindings) {
            return None;
        }
    }
    Some(bindings)
}

fn match_into(
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
                .all(|(&p, &i)| match_into(store, p, i, bindings))
        }
        (TermData::Special(s1), TermData::Special(s2)) => s1 == s2,
        _ => pattern == instance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use saturate_formula::TermStore;

    #[test]
    fn pattern_variable_matches_any_subterm() {
        let mut store = TermStore::new();
        let f = store.signature_mut().declare_function("f", 1);
        let a = store.signature_mut().declare_function("a", 0);
        let a_id = store.create(a, vec![]);
        let fa = store.create(f, vec![a_id]);
        let x = store.mk_var(Var::from_index(0));
        let fx = store.create(f, vec![x]);

        let bindings = one_way_match(&store, fx, fa).unwrap();
        assert_eq!(bindings.get(&Var::from_index(0)), Some(&a_id));
    }

    #[test]
    fn repeated_pattern_variable_forces_equal_instances() {
        let mut store = TermStore::new();
        let f = store.signature_mut().declare_function("f", 2);
        let a = store.signature_mut().declare_function("a", 0);
        let b = store.signature_mut().declare_function("b", 0);
        let a_id = store.create(a, vec![]);
        let b_id = store.create(b, vec![]);
        let x = store.mk_var(Var::from_index(0));
        let fxx = store.create(f, vec![x, x]);
        let fab = store.create(f, vec![a_id, b_id]);

        assert!(one_way_match(&store, fxx, fab).is_none());
    }

    #[test]
    fn instance_variables_may_not_bind() {
        let mut store = TermStore::new();
        let f = store.signature_mut().declare_function("f", 1);
        let a = store.signature_mut().declare_function("a", 0);
        let a_id = store.create(a, vec![]);
        let fa = store.create(f, vec![a_id]);
        let y = store.mk_var(Var::from_index(1));
        let fy = store.create(f, vec![y]);

        // `fa` (rigid) as the pattern cannot match the variable-containing `fy`.
        assert!(one_way_match(&store, fa, fy).is_none());
    }
}
