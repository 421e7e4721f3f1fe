//! Binary resolution and factoring: the two generating rules that do not involve equality.
//!
//! Resolution partners are found through the active-clause index's complementary-header
//! unification query; factoring pairs two literals of the *same* clause. Both only fire on
//! selected literals, restricting the search to the literal-selection subset of each clause
//! rather than scanning every literal.
use saturate_bdd::Bdd;
use saturate_formula::TermStore;
use saturate_index::{HeaderIndex, LiteralIndexingStructure};
use saturate_proof::{Inference, InferenceStore, RuleTag};
use saturate_unify::{apply, Bank, BankedTerm, Renamer, Trail};

use crate::clause::{Clause, ClauseId, ClauseStorage, InputType};
use crate::selection::SelectionFunction;
use crate::statistics::Statistics;

/// Resolve `given`'s selected literals against every active clause's selected literals of
/// complementary header, producing one resolvent per successful unification.
#[allow(clippy::too_many_arguments)]
pub fn resolution(
    store: &mut TermStore,
    bdd: &mut Bdd,
    proof: &mut InferenceStore,
    clauses: &ClauseStorage,
    active_index: &HeaderIndex<ClauseId>,
    statistics: &mut Statistics,
    selection: SelectionFunction,
    given: ClauseId,
) -> Vec<Clause> {
    let mut out = Vec::new();
    let given_clause = clauses.get(given).clone();

    for (gi, &glit) in given_clause.literals.iter().enumerate() {
        if !given_clause.is_selected(gi) {
            continue;
        }

        for candidate in active_index.get_unifications(store, glit, true) {
            let other_id = candidate.clause;
            if other_id == given && candidate.lit.atom() == glit.atom() {
                // Resolving a clause's literal against itself under the identity substitution is
                // not a resolvent, it is the tautology check's job; skip it here.
                continue;
            }
            let other_clause = clauses.get(other_id).clone();
            let oi = match other_clause
                .literals
                .iter()
                .position(|&l| l == candidate.lit)
            {
                Some(i) => i,
                None => continue,
            };
            if !other_clause.is_selected(oi) {
                continue;
            }

            let mut renamer = Renamer::new();
            let mut new_literals = Vec::new();
            for (i, &lit) in given_clause.literals.iter().enumerate() {
                if i == gi {
                    continue;
                }
                new_literals.push(rename_literal(store, &candidate.bindings, &mut renamer, lit, Bank::GOAL));
            }
            for (i, &lit) in other_clause.literals.iter().enumerate() {
                if i == oi {
                    continue;
                }
                new_literals.push(rename_literal(
                    store,
                    &candidate.bindings,
                    &mut renamer,
                    lit,
                    Bank::INDEXED,
                ));
            }

            let prop = bdd.disjunction(given_clause.propositional_part, other_clause.propositional_part);
            let unit = proof.record(Inference::new(RuleTag::Resolution, vec![
                given_clause.inference,
                other_clause.inference,
            ]));
            let age = given_clause.age.max(other_clause.age) + 1;
            statistics.resolution_inferences += 1;
            out.push(Clause::new(
                new_literals,
                InputType::Axiom,
                prop,
                age,
                unit,
                store,
                selection,
            ));
        }
    }

    out
}

/// Ordinary factoring: unify two positive (or two negative) literals of the same clause and drop
/// one.
#[allow(clippy::too_many_arguments)]
pub fn factoring(
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

    for i in 0..clause.literals.len() {
        if !clause.is_selected(i) {
            continue;
        }
        for j in (i + 1)..clause.literals.len() {
            let li = clause.literals[i];
            let lj = clause.literals[j];
            if li.header() != lj.header() {
                continue;
            }

            let mut subst = saturate_unify::Substitution::new();
            let mut trail = Trail::new();
            let checkpoint = trail.checkpoint();
            let unified = saturate_unify::unify_args(
                store,
                &mut subst,
                &mut trail,
                li.args(store),
                Bank::GOAL,
                lj.args(store),
                Bank::GOAL,
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
                .filter(|&(k, _)| k != j)
                .map(|(_, &lit)| rename_literal(store, &subst, &mut renamer, lit, Bank::GOAL))
                .collect();
            trail.commit(checkpoint);

            let unit = proof.record(Inference::new(RuleTag::Factoring, vec![clause.inference]));
            statistics.factoring_inferences += 1;
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

    out
}

/// Apply a unification-bank substitution to `lit`, renaming any variable it leaves unbound into a
/// fresh, compact variable via `renamer`, reconstructing it as a [`saturate_formula::Literal`].
pub(crate) fn rename_literal(
    store: &mut TermStore,
    subst: &saturate_unify::Substitution,
    renamer: &mut Renamer,
    lit: saturate_formula::Literal,
    bank: Bank,
) -> saturate_formula::Literal {
    let new_atom = apply(store, subst, renamer, BankedTerm::new(lit.atom(), bank));
    let new_args = store.args(new_atom).to_vec();
    let commutative = lit.is_equality();
    store.create_literal(lit.predicate(), lit.is_positive(), commutative, new_args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use saturate_bdd::Bdd;
    use saturate_formula::Var;
    use saturate_proof::InferenceStore;

    #[test]
    fn resolves_p_and_not_p() {
        let mut store = TermStore::new();
        let mut bdd = Bdd::new();
        let mut proof = InferenceStore::new();
        let mut clauses = ClauseStorage::new();
        let mut active_index: HeaderIndex<ClauseId> = HeaderIndex::new();
        let mut statistics = Statistics::new();

        let p = store.signature_mut().declare_predicate("p", 0);
        let pos = store.create_literal(p, true, false, vec![]);
        let neg = pos.negate();

        let unit_a = proof.record(Inference::new(RuleTag::Input, vec![]));
        let a = clauses.insert(Clause::new(
            vec![pos],
            InputType::Axiom,
            bdd.falsity(),
            0,
            unit_a,
            &store,
            SelectionFunction::SelectAllNegative,
        ));
        let unit_b = proof.record(Inference::new(RuleTag::Input, vec![]));
        let b = clauses.insert(Clause::new(
            vec![neg],
            InputType::Axiom,
            bdd.falsity(),
            0,
            unit_b,
            &store,
            SelectionFunction::SelectAllNegative,
        ));
        active_index.insert(pos, a);

        let resolvents = resolution(
            &mut store,
            &mut bdd,
            &mut proof,
            &clauses,
            &active_index,
            &mut statistics,
            SelectionFunction::SelectAllNegative,
            b,
        );
        assert_eq!(resolvents.len(), 1);
        assert!(resolvents[0].literals.is_empty());
    }

    #[test]
    fn factors_two_unifiable_positive_literals() {
        let mut store = TermStore::new();
        let mut bdd = Bdd::new();
        let mut proof = InferenceStore::new();
        let mut clauses = ClauseStorage::new();
        let mut statistics = Statistics::new();

        let p = store.signature_mut().declare_predicate("p", 1);
        let x = store.mk_var(Var::from_index(0));
        let y = store.mk_var(Var::from_index(1));
        let lit_x = store.create_literal(p, true, false, vec![x]);
        let lit_y = store.create_literal(p, true, false, vec![y]);

        let unit = proof.record(Inference::new(RuleTag::Input, vec![]));
        let c = clauses.insert(Clause::new(
            vec![lit_x, lit_y],
            InputType::Axiom,
            bdd.falsity(),
            0,
            unit,
            &store,
            SelectionFunction::SelectNone,
        ));

        let factors = factoring(
            &mut store,
            &mut bdd,
            &mut proof,
            &clauses,
            &mut statistics,
            SelectionFunction::SelectNone,
            c,
        );
        assert_eq!(factors.len(), 1);
        assert_eq!(factors[0].literals.len(), 1);
    }
}
