//! Superposition: rewriting with an oriented equality drawn from one premise into a subterm of
//! another, the equality-aware generalisation of resolution.
//!
//! Covers the three superposition `RuleTag`s
//! (`SuperpositionForward`/`SuperpositionBackward`/`SuperpositionSelf`):
//! forward is the given clause's equation rewriting into an active clause, backward is an active
//! equation rewriting into the given clause, and self is both premises being the given clause
//! itself. All three call the same subterm-position search and rebuild helpers; only which clause
//! supplies the equation and which supplies the rewritten target differs.
use saturate_bdd::Bdd;
use saturate_formula::{Literal, TermData, TermId, TermStore};
use saturate_proof::{Inference, InferenceStore, RuleTag};
use saturate_unify::{apply, unify, Bank, BankedTerm, Renamer, Substitution, Trail};

use crate::clause::{Clause, ClauseId, ClauseStorage, InputType};
use crate::ordering::{Comparison, TermOrdering};
use crate::resolution::rename_literal;
use crate::selection::SelectionFunction;
use crate::statistics::Statistics;

/// One subterm occurrence: the path of argument indices from the literal's atom down to it.
fn collect_positions(store: &TermStore, term: TermId, path: Vec<usize>, out: &mut Vec<(Vec<usize>, TermId)>) {
    out.push((path.clone(), term));
    if let TermData::App(_, args) = store.data(term) {
        for (i, &arg) in args.iter().enumerate() {
            let mut child_path = path.clone();
            child_path.push(i);
            collect_positions(store, arg, child_path, out);
        }
    }
}

/// Rebuild `term` (read under `bank`, via the original, unsubstituted tree) replacing the
/// subtree at `path` with `replacement`, applying `subst`/`renamer` to every other position.
fn rebuild_with_replacement(
    store: &mut TermStore,
    subst: &Substitution,
    renamer: &mut Renamer,
    term: TermId,
    bank: Bank,
    path: &[usize],
    depth: usize,
    replacement: BankedTerm,
) -> TermId {
    if depth == path.len() {
        return apply(store, subst, renamer, replacement);
    }
    let args = store.args(term).to_vec();
    let functor = store.functor(term).expect("non-leaf path must index into a compound");
    let mut new_args = Vec::with_capacity(args.len());
    for (i, &arg) in args.iter().enumerate() {
        if i == path[depth] {
            new_args.push(rebuild_with_replacement(
                store, subst, renamer, arg, bank, path, depth + 1, replacement,
            ));
        } else {
            new_args.push(apply(store, subst, renamer, BankedTerm::new(arg, bank)));
        }
    }
    store.create(functor, new_args)
}

/// One successful rewrite: the literal index rewritten, the path within its atom, and the
/// substitution produced by unifying the equation's left side with that subterm.
struct RewriteSite {
    literal_index: usize,
    path: Vec<usize>,
    subst: Substitution,
}

fn find_rewrite_sites(
    store: &TermStore,
    eq_lhs: TermId,
    eq_bank: Bank,
    target_literals: &[Literal],
    target_bank: Bank,
) -> Vec<RewriteSite> {
    let mut sites = Vec::new();
    for (li, lit) in target_literals.iter().enumerate() {
        let mut positions = Vec::new();
        collect_positions(store, lit.atom(), Vec::new(), &mut positions);
        for (path, subterm) in positions {
            if path.is_empty() && store.args(lit.atom()).is_empty() && store.is_var(subterm) {
                // Rewriting a bare variable atom is never sound (it would match everything);
                // skip, matching the usual superposition side condition against variable heads.
                continue;
            }
            let mut subst = Substitution::new();
            let mut trail = Trail::new();
            let checkpoint = trail.checkpoint();
            let ok = unify(
                store,
                &mut subst,
                &mut trail,
                BankedTerm::new(eq_lhs, eq_bank),
                BankedTerm::new(subterm, target_bank),
            );
            if ok {
                trail.commit(checkpoint);
                sites.push(RewriteSite {
                    literal_index: li,
                    path,
                    subst,
                });
            } else {
                trail.rollback(checkpoint, &mut subst);
            }
        }
    }
    sites
}

/// Perform every superposition inference rewriting with `from`'s selected positive equalities
/// into `into`'s literals. When `from == into` this realizes `SuperpositionSelf`; otherwise the
/// caller picks `rule` (`SuperpositionForward`/`SuperpositionBackward`) according to which side is
/// the given clause.
#[allow(clippy::too_many_arguments)]
fn superpose_into(
    store: &mut TermStore,
    bdd: &mut Bdd,
    proof: &mut InferenceStore,
    clauses: &ClauseStorage,
    ordering: TermOrdering,
    statistics: &mut Statistics,
    selection: SelectionFunction,
    from: ClauseId,
    into: ClauseId,
    rule: RuleTag,
) -> Vec<Clause> {
    let mut out = Vec::new();
    let from_clause = clauses.get(from).clone();
    let into_clause = clauses.get(into).clone();

    for (ei, eq_lit) in from_clause.literals.iter().enumerate() {
        if !from_clause.is_selected(ei) || !eq_lit.is_equality() || !eq_lit.is_positive() {
            continue;
        }
        let args = eq_lit.args(store);
        if args.len() != 2 {
            continue;
        }
        let (s, t) = (args[0], args[1]);

        for &(lhs, rhs) in &[(s, t), (t, s)] {
            if from == into {
                // Rewriting a unit equation with itself produces nothing new.
                if from_clause.literals.len() == 1 {
                    continue;
                }
            }
            let sites = find_rewrite_sites(store, lhs, Bank::GOAL, &into_clause.literals, Bank::INDEXED);
            for site in sites {
                if site.literal_index == ei && from == into {
                    continue;
                }
                let cmp = ordering.compare(store, lhs, rhs);
                if cmp == Comparison::Less {
                    continue;
                }

                let mut renamer = Renamer::new();
                let mut new_literals = Vec::new();

                for (i, &lit) in from_clause.literals.iter().enumerate() {
                    if i == ei {
                        continue;
                    }
                    new_literals.push(rename_literal(store, &site.subst, &mut renamer, lit, Bank::GOAL));
                }

                for (i, &lit) in into_clause.literals.iter().enumerate() {
                    if i == site.literal_index {
                        let rewritten_atom = rebuild_with_replacement(
                            store,
                            &site.subst,
                            &mut renamer,
                            lit.atom(),
                            Bank::INDEXED,
                            &site.path,
                            0,
                            BankedTerm::new(rhs, Bank::GOAL),
                        );
                        let new_args = store.args(rewritten_atom).to_vec();
                        let commutative = lit.is_equality();
                        new_literals.push(store.create_literal(
                            lit.predicate(),
                            lit.is_positive(),
                            commutative,
                            new_args,
                        ));
                    } else {
                        new_literals.push(rename_literal(store, &site.subst, &mut renamer, lit, Bank::INDEXED));
                    }
                }

                let prop = bdd.disjunction(from_clause.propositional_part, into_clause.propositional_part);
                let unit = proof.record(Inference::new(rule, vec![from_clause.inference, into_clause.inference]));
                let age = from_clause.age.max(into_clause.age) + 1;
                statistics.superposition_inferences += 1;
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
    }

    out
}

/// Forward superposition: `given` supplies the equation, rewriting into `active`.
#[allow(clippy::too_many_arguments)]
pub fn superposition_forward(
    store: &mut TermStore,
    bdd: &mut Bdd,
    proof: &mut InferenceStore,
    clauses: &ClauseStorage,
    ordering: TermOrdering,
    statistics: &mut Statistics,
    selection: SelectionFunction,
    given: ClauseId,
    active: ClauseId,
) -> Vec<Clause> {
    superpose_into(
        store,
        bdd,
        proof,
        clauses,
        ordering,
        statistics,
        selection,
        given,
        active,
        RuleTag::SuperpositionForward,
    )
}

/// Backward superposition: an `active` equation rewrites into `given`.
#[allow(clippy::too_many_arguments)]
pub fn superposition_backward(
    store: &mut TermStore,
    bdd: &mut Bdd,
    proof: &mut InferenceStore,
    clauses: &ClauseStorage,
    ordering: TermOrdering,
    statistics: &mut Statistics,
    selection: SelectionFunction,
    active: ClauseId,
    given: ClauseId,
) -> Vec<Clause> {
    superpose_into(
        store,
        bdd,
        proof,
        clauses,
        ordering,
        statistics,
        selection,
        active,
        given,
        RuleTag::SuperpositionBackward,
    )
}

/// Self-superposition: `given` rewrites into its own other literals.
#[allow(clippy::too_many_arguments)]
pub fn superposition_self(
    store: &mut TermStore,
    bdd: &mut Bdd,
    proof: &mut InferenceStore,
    clauses: &ClauseStorage,
    ordering: TermOrdering,
    statistics: &mut Statistics,
    selection: SelectionFunction,
    given: ClauseId,
) -> Vec<Clause> {
    superpose_into(
        store,
        bdd,
        proof,
        clauses,
        ordering,
        statistics,
        selection,
        given,
        given,
        RuleTag::SuperpositionSelf,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use saturate_bdd::Bdd;
    use saturate_formula::Var;
    use saturate_proof::InferenceStore;

    #[test]
    fn rewrites_ground_subterm_with_unit_equality() {
        let mut store = TermStore::new();
        let mut bdd = Bdd::new();
        let mut proof = InferenceStore::new();
        let mut clauses = ClauseStorage::new();
        let mut statistics = Statistics::new();

        let a = store.signature_mut().declare_function("a", 0);
        let b = store.signature_mut().declare_function("b", 0);
        let f = store.signature_mut().declare_function("f", 1);
        let p = store.signature_mut().declare_predicate("p", 1);

        let a_id = store.create(a, vec![]);
        let b_id = store.create(b, vec![]);
        let fa = store.create(f, vec![a_id]);

        let eq = store.create_literal(saturate_formula::PredicateId::equality(), true, true, vec![a_id, b_id]);
        let eq_unit = proof.record(Inference::new(RuleTag::Input, vec![]));
        let eq_clause = clauses.insert(Clause::new(
            vec![eq],
            InputType::Axiom,
            bdd.falsity(),
            0,
            eq_unit,
            &store,
            SelectionFunction::SelectNone,
        ));

        let target = store.create_literal(p, true, false, vec![fa]);
        let target_unit = proof.record(Inference::new(RuleTag::Input, vec![]));
        let target_clause = clauses.insert(Clause::new(
            vec![target],
            InputType::Axiom,
            bdd.falsity(),
            0,
            target_unit,
            &store,
            SelectionFunction::SelectNone,
        ));

        let results = superposition_forward(
            &mut store,
            &mut bdd,
            &mut proof,
            &clauses,
            TermOrdering::Kbo,
            &mut statistics,
            SelectionFunction::SelectNone,
            eq_clause,
            target_clause,
        );

        assert!(!results.is_empty());
        let rewritten = &results[0];
        assert_eq!(rewritten.literals.len(), 1);
        let fb = store.create(f, vec![b_id]);
        let expected = store.create_literal(p, true, false, vec![fb]);
        assert_eq!(rewritten.literals[0].atom(), expected.atom());
    }

    #[test]
    fn does_not_rewrite_a_bare_variable_atom() {
        let mut store = TermStore::new();
        let mut bdd = Bdd::new();
        let mut proof = InferenceStore::new();
        let mut clauses = ClauseStorage::new();
        let mut statistics = Statistics::new();

        let x = store.mk_var(Var::from_index(0));
        let a = store.signature_mut().declare_function("a", 0);
        let a_id = store.create(a, vec![]);
        let eq = store.create_literal(saturate_formula::PredicateId::equality(), true, true, vec![x, a_id]);
        let unit = proof.record(Inference::new(RuleTag::Input, vec![]));
        let eq_clause = clauses.insert(Clause::new(
            vec![eq],
            InputType::Axiom,
            bdd.falsity(),
            0,
            unit,
            &store,
            SelectionFunction::SelectNone,
        ));

        let results = superposition_self(
            &mut store,
            &mut bdd,
            &mut proof,
            &clauses,
            TermOrdering::Kbo,
            &mut statistics,
            SelectionFunction::SelectNone,
            eq_clause,
        );
        assert!(results.is_empty());
    }
}
