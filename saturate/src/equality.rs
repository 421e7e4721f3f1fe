//! Equality resolution and equality factoring, the two equality-specific generating rules that
//! are not themselves rewriting (see `superposition.rs` for that).
//!
//! Covers the `EqualityResolution`/`EqualityFactoring` generating rules.
use saturate_bdd::Bdd;
use saturate_formula::TermStore;
use saturate_proof::{Inference, InferenceStore, RuleTag};
use saturate_unify::{unify, Bank, BankedTerm, Renamer, Substitution, Trail};

use crate::clause::{Clause, ClauseId, ClauseStorage, InputType};
use crate::ordering::{Comparison, TermOrdering};
use crate::resolution::rename_literal;
use crate::selection::SelectionFunction;
use crate::statistics::Statistics;

/// Equality resolution: a selected negative equality literal `s != t` whose sides unify under
/// `σ` is dropped, yielding `Cσ`.
#[allow(clippy::too_many_arguments)]
pub fn equality_resolution(
    store: &mut TermStore,
    bdd: &mut Bdd,
    proof: &mut InferenceStore,
    clauses: &ClauseStorage,
    statistics: &mut Statistics,
    selection: SelectionFunction,
    given: ClauseId,
) -> Vec<Clause> {
    let mut out = Vec::new();
    let clause = clauses.get(given).clone();

    for (i, lit) in clause.literals.iter().enumerate() {
        if !clause.is_selected(i) || !lit.is_equality() || lit.is_positive() {
            continue;
        }
        let args = lit.args(store);
        if args.len() != 2 {
            continue;
        }
        let (s, t) = (args[0], args[1]);

        let mut subst = Substitution::new();
        let mut trail = Trail::new();
        let checkpoint = trail.checkpoint();
        let unified = unify(
            store,
            &mut subst,
            &mut trail,
            BankedTerm::new(s, Bank::GOAL),
            BankedTerm::new(t, Bank::GOAL),
        );
        if !unified {
            trail.rollback(checkpoint, &mut subst);
            continue;
        }

        let mut renamer = Renamer::new();
        let new_literals: Vec<_> = clause
            .literals
            .iter()
            .enumerate()
            .filter(|&(k, _)| k != i)
            .map(|(_, &l)| rename_literal(store, &subst, &mut renamer, l, Bank::GOAL))
            .collect();
        trail.commit(checkpoint);

        let unit = proof.record(Inference::new(RuleTag::EqualityResolution, vec![clause.inference]));
        statistics.equality_resolution_inferences += 1;
        out.push(Clause::new(
            new_literals,
            InputType::Axiom,
            clause.propositional_part,
            clause.age + 1,
            unit,
            store,
            selection,
        ));
    }

    out
}

/// Equality factoring (Brand-style): given `C ∨ s≈t ∨ u≈v`, if `σ = mgu(s,u)` and `tσ` is not
/// ordering-greater than `sσ`, derive `(C ∨ t̸≈v ∨ u≈v)σ`.
#[allow(clippy::too_many_arguments)]
pub fn equality_factoring(
    store: &mut TermStore,
    bdd: &mut Bdd,
    proof: &mut InferenceStore,
    clauses: &ClauseStorage,
    ordering: TermOrdering,
    statistics: &mut Statistics,
    selection: SelectionFunction,
    given: ClauseId,
) -> Vec<Clause> {
    let mut out = Vec::new();
    let clause = clauses.get(given).clone();

    let equalities: Vec<usize> = clause
        .literals
        .iter()
        .enumerate()
        .filter(|&(i, lit)| clause.is_selected(i) && lit.is_equality() && lit.is_positive())
        .map(|(i, _)| i)
        .collect();

    for &i in &equalities {
        for &j in &equalities {
            if i == j {
                continue;
            }
            let args_i = clause.literals[i].args(store);
            let args_j = clause.literals[j].args(store);
            if args_i.len() != 2 || args_j.len() != 2 {
                continue;
            }

            for &(s, t) in &[(args_i[0], args_i[1]), (args_i[1], args_i[0])] {
                for &(u, v) in &[(args_j[0], args_j[1]), (args_j[1], args_j[0])] {
                    let mut subst = Substitution::new();
                    let mut trail = Trail::new();
                    let checkpoint = trail.checkpoint();
                    let unified = unify(
                        store,
                        &mut subst,
                        &mut trail,
                        BankedTerm::new(s, Bank::GOAL),
                        BankedTerm::new(u, Bank::GOAL),
                    );
                    if !unified {
                        trail.rollback(checkpoint, &mut subst);
                        continue;
                    }
                    if ordering.compare(store, t, s) == Comparison::Greater {
                        trail.rollback(checkpoint, &mut subst);
                        continue;
                    }

                    let mut renamer = Renamer::new();
                    let mut new_literals = Vec::new();
                    for (k, &lit) in clause.literals.iter().enumerate() {
                        if k == i || k == j {
                            continue;
                        }
                        new_literals.push(rename_literal(store, &subst, &mut renamer, lit, Bank::GOAL));
                    }
                    let t_renamed = saturate_unify::apply(store, &subst, &mut renamer, BankedTerm::new(t, Bank::GOAL));
                    let v_renamed = saturate_unify::apply(store, &subst, &mut renamer, BankedTerm::new(v, Bank::GOAL));
                    new_literals.push(store.create_literal(
                        saturate_formula::PredicateId::equality(),
                        false,
                        true,
                        vec![t_renamed, v_renamed],
                    ));
                    new_literals.push(rename_literal(store, &subst, &mut renamer, clause.literals[j], Bank::GOAL));
                    trail.commit(checkpoint);

                    let unit =
                        proof.record(Inference::new(RuleTag::EqualityFactoring, vec![clause.inference]));
                    statistics.equality_factoring_inferences += 1;
                    out.push(Clause::new(
                        new_literals,
                        InputType::Axiom,
                        clause.propositional_part,
                        clause.age + 1,
                        unit,
                        store,
                        selection,
                    ));
                }
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use saturate_bdd::Bdd;
    use saturate_formula::{PredicateId, Var};
    use saturate_proof::InferenceStore;

    #[test]
    fn resolves_reflexive_equality() {
        let mut store = TermStore::new();
        let mut bdd = Bdd::new();
        let mut proof = InferenceStore::new();
        let mut clauses = ClauseStorage::new();
        let mut statistics = Statistics::new();

        let x = store.mk_var(Var::from_index(0));
        let p = store.signature_mut().declare_predicate("p", 0);
        let prop = store.create_literal(p, true, false, vec![]);
        let neq = store
            .create_literal(PredicateId::equality(), true, true, vec![x, x])
            .negate();

        let unit = proof.record(Inference::new(RuleTag::Input, vec![]));
        let clause = clauses.insert(Clause::new(
            vec![prop, neq],
            InputType::Axiom,
            bdd.falsity(),
            0,
            unit,
            &store,
            SelectionFunction::SelectAllNegative,
        ));

        let results = equality_resolution(
            &mut store,
            &mut bdd,
            &mut proof,
            &clauses,
            &mut statistics,
            SelectionFunction::SelectAllNegative,
            clause,
        );
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].literals.len(), 1);
    }
}
