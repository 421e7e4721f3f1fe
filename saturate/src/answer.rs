//! Answer-literal manager and extractor.
//!
//! Injects a fresh answer predicate into an existentially-quantified conjecture, captures a
//! refutation-ending clause built solely from positive answer literals, manufactures the synthetic
//! unit-resulting-resolution refutation that terminates the loop, and reconstructs the witness
//! terms: directly when the conjecture was a single literal, or via forward-chaining tabulation
//! plus a backtracking substitution search when it was a conjunction.
use rustc_hash::FxHashMap;
use saturate_bdd::Bdd;
use saturate_formula::{Literal, PredicateId, TermId, TermStore, Var};
use saturate_proof::{Inference, InferenceStore, RuleTag, UnitId};
use saturate_unify::{apply, unify, unify_args, Bank, BankedTerm, Renamer, Substitution, Trail};

use crate::clause::{Clause, ClauseId, ClauseStorage, InputType};
use crate::selection::SelectionFunction;

/// The original goal an answer predicate was minted for: its existential variables (in
/// declaration order) and the literal conjuncts of its matrix, recorded at injection time so
/// extraction never has to re-derive them from the proof DAG.
#[derive(Clone)]
struct GoalSpec {
    vars: Vec<Var>,
    literals: Vec<Literal>,
}

/// Tracks every answer predicate minted during one run and the goal each answers.
#[derive(Default)]
pub struct AnswerManager {
    arities: FxHashMap<PredicateId, usize>,
    goals: FxHashMap<PredicateId, GoalSpec>,
    counter: usize,
}

/// A reconstructed witness: one term per existential variable, in declaration order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Answer {
    pub terms: Vec<TermId>,
}

impl AnswerManager {
    pub fn new() -> AnswerManager {
        AnswerManager::default()
    }

    /// Injection: for a conjecture `¬∃vars.(literals)`, mint a fresh answer predicate of arity
    /// `vars.len()` and return the positive `ans(vars)` literal to conjoin with `literals` before
    /// clausification.
    pub fn inject(&mut self, store: &mut TermStore, vars: Vec<Var>, literals: Vec<Literal>) -> Literal {
        let name = format!("ans#{}", self.counter);
        self.counter += 1;
        let pred = store.signature_mut().declare_predicate(&name, vars.len());
        let args: Vec<TermId> = vars.iter().map(|&v| store.mk_var(v)).collect();

        self.arities.insert(pred, vars.len());
        self.goals.insert(pred, GoalSpec { vars, literals });
        store.create_literal(pred, true, false, args)
    }

    pub fn is_answer_predicate(&self, pred: PredicateId) -> bool {
        self.arities.contains_key(&pred)
    }

    /// Capture: whether `clause` is a candidate answer (no splits, non-empty, every literal
    /// positive and over an answer predicate).
    pub fn try_capture(&self, bdd: &Bdd, clause: &Clause) -> bool {
        !clause.literals.is_empty()
            && bdd.is_false(clause.propositional_part)
            && clause
                .literals
                .iter()
                .all(|lit| lit.is_positive() && self.is_answer_predicate(lit.predicate()))
    }

    /// Manufacture the synthetic refutation: one identity resolver unit clause `{¬ans(X...)}` per
    /// literal of `candidate`, resolved against it in one `UnitResultingResolution` inference.
    pub fn synthesize_refutation(
        &self,
        store: &mut TermStore,
        bdd: &mut Bdd,
        proof: &mut InferenceStore,
        clauses: &mut ClauseStorage,
        candidate: ClauseId,
    ) -> ClauseId {
        let clause = clauses.get(candidate).clone();
        let mut parents = vec![clause.inference];

        for &lit in &clause.literals {
            let arity = self.arities[&lit.predicate()];
            let vars: Vec<TermId> = (0..arity).map(|i| store.mk_var(Var::from_index(i))).collect();
            let resolver_lit = store.create_literal(lit.predicate(), false, false, vars);
            let resolver_unit = proof.record(Inference::new(RuleTag::Axiom, vec![]));
            let resolver_clause = Clause::new(
                vec![resolver_lit],
                InputType::Axiom,
                bdd.falsity(),
                clause.age,
                resolver_unit,
                store,
                SelectionFunction::SelectAllNegative,
            );
            clauses.insert(resolver_clause);
            parents.push(resolver_unit);
        }

        let refutation_unit = proof.record(Inference::new(RuleTag::UnitResultingResolution, parents));
        let refutation = Clause::new(
            Vec::new(),
            clause.input_type,
            bdd.falsity(),
            clause.age + 1,
            refutation_unit,
            store,
            SelectionFunction::SelectAllNegative,
        );
        clauses.insert(refutation)
    }

    /// Direct extraction: a captured clause with a single answer literal yields its arguments
    /// directly as the witness tuple.
    pub fn direct_witness(&self, store: &TermStore, clause: &Clause) -> Option<Answer> {
        if clause.literals.len() != 1 {
            return None;
        }
        let lit = clause.literals[0];
        if !self.is_answer_predicate(lit.predicate()) {
            return None;
        }
        Some(Answer {
            terms: lit.args(store).to_vec(),
        })
    }

    /// Conjunctive goal extraction: tabulate ground/near-ground unit consequences of the
    /// input/clausify/axiom premises reachable from `refutation_unit`, then search for a
    /// substitution making every literal of `predicate`'s goal provable from a lemma.
    pub fn conjunctive_extraction(
        &self,
        store: &mut TermStore,
        proof: &InferenceStore,
        clauses: &ClauseStorage,
        refutation_unit: UnitId,
        predicate: PredicateId,
    ) -> Option<Answer> {
        let goal = self.goals.get(&predicate)?.clone();
        let premises = collect_premises(proof, clauses, refutation_unit);
        let lemmas = tabulate(store, &premises);

        let mut subst = Substitution::new();
        let mut trail = Trail::new();
        if !search(store, &goal.literals, 0, &lemmas, &mut subst, &mut trail) {
            return None;
        }

        let mut renamer = Renamer::new();
        let terms = goal
            .vars
            .iter()
            .map(|&v| {
                let term = store.mk_var(v);
                apply(store, &subst, &mut renamer, BankedTerm::new(term, Bank::GOAL))
            })
            .collect();
        Some(Answer { terms })
    }
}

/// Every `Input`/`Clausify`/`Axiom` unit reachable from `refutation_unit`, mapped back to the
/// clause it derived.
fn collect_premises(proof: &InferenceStore, clauses: &ClauseStorage, refutation_unit: UnitId) -> Vec<Clause> {
    proof
        .ancestors(refutation_unit)
        .into_iter()
        .filter(|&unit| {
            matches!(
                proof.rule(unit),
                Some(RuleTag::Input) | Some(RuleTag::Clausify) | Some(RuleTag::Axiom)
            )
        })
        .filter_map(|unit| clauses.by_inference(unit))
        .map(|id| clauses.get(id).clone())
        .collect()
}

/// Forward-chain the premises to a fixpoint (bounded to a handful of rounds, a deliberately
/// conservative limit since this sub-procedure's job is finding *a* witness quickly, not
/// re-running the main saturation loop), accumulating unit consequences as lemmas: a non-unit
/// premise becomes a new lemma once every literal but one has been resolved away by an existing
/// lemma.
fn tabulate(store: &TermStore, premises: &[Clause]) -> Vec<Literal> {
    let mut lemmas: Vec<Literal> = premises
        .iter()
        .filter(|c| c.literals.len() == 1)
        .map(|c| c.literals[0])
        .collect();
    let rest: Vec<&Clause> = premises.iter().filter(|c| c.literals.len() > 1).collect();

    for _round in 0..8 {
        let mut discovered = Vec::new();
        for clause in &rest {
            let mut remaining = Vec::new();
            for &lit in &clause.literals {
                let resolved = lemmas.iter().any(|&lemma| {
                    if lemma.header() != lit.complementary_header() {
                        return false;
                    }
                    let mut subst = Substitution::new();
                    let mut trail = Trail::new();
                    let cp = trail.checkpoint();
                    let ok = unify_args(store, &mut subst, &mut trail, lemma.args(store), Bank::GOAL, lit.args(store), Bank::INDEXED);
                    trail.rollback(cp, &mut subst);
                    ok
                });
                if !resolved {
                    remaining.push(lit);
                }
            }
            if remaining.len() == 1 && !lemmas.contains(&remaining[0]) {
                discovered.push(remaining[0]);
            }
        }
        if discovered.is_empty() {
            break;
        }
        lemmas.extend(discovered);
    }
    lemmas
}

/// Depth-first search across `goals` with a shared, backtracking substitution trail: each goal
/// literal must unify with some lemma of the same header; ties break by lemma order. A fallback
/// at every goal additionally tries the two-sided unification of a positive equality goal against
/// an equality lemma
fn search(
    store: &TermStore,
    goals: &[Literal],
    idx: usize,
    lemmas: &[Literal],
    subst: &mut Substitution,
    trail: &mut Trail,
) -> bool {
    if idx == goals.len() {
        return true;
    }
    let goal = goals[idx];

    for &lemma in lemmas {
        if lemma.header() != goal.header() {
            continue;
        }
        let cp = trail.checkpoint();
        if unify_args(store, subst, trail, goal.args(store), Bank::GOAL, lemma.args(store), Bank::INDEXED)
            && search(store, goals, idx + 1, lemmas, subst, trail)
        {
            return true;
        }
        trail.rollback(cp, subst);
    }

    if goal.is_equality() && goal.is_positive() {
        let goal_args = goal.args(store);
        if goal_args.len() == 2 {
            for &lemma in lemmas {
                if lemma.header() != goal.header() || !lemma.is_equality() {
                    continue;
                }
                let lemma_args = lemma.args(store);
                if lemma_args.len() != 2 {
                    continue;
                }
                let cp = trail.checkpoint();
                let ok = unify(store, subst, trail, BankedTerm::new(goal_args[0], Bank::GOAL), BankedTerm::new(lemma_args[1], Bank::INDEXED))
                    && unify(store, subst, trail, BankedTerm::new(goal_args[1], Bank::GOAL), BankedTerm::new(lemma_args[0], Bank::INDEXED));
                if ok && search(store, goals, idx + 1, lemmas, subst, trail) {
                    return true;
                }
                trail.rollback(cp, subst);
            }
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use saturate_proof::InferenceStore;

    #[test]
    fn direct_witness_reads_the_single_literals_arguments() {
        let mut store = TermStore::new();
        let bdd = Bdd::new();
        let mut manager = AnswerManager::new();

        let x = Var::from_index(0);
        let p = store.signature_mut().declare_predicate("p", 1);
        let px = store.create_literal(p, true, false, vec![store.mk_var(x)]);
        let ans_lit = manager.inject(&mut store, vec![x], vec![px]);

        let a = store.signature_mut().declare_function("a", 0);
        let a_id = store.create(a, vec![]);
        let witness_lit = store.create_literal(ans_lit.predicate(), true, false, vec![a_id]);

        let unit = InferenceStore::new().record(Inference::new(RuleTag::Input, vec![]));
        let clause = Clause::new(
            vec![witness_lit],
            InputType::Axiom,
            bdd.falsity(),
            0,
            unit,
            &store,
            SelectionFunction::SelectNone,
        );

        assert!(manager.try_capture(&bdd, &clause));
        let answer = manager.direct_witness(&store, &clause).unwrap();
        assert_eq!(answer.terms, vec![a_id]);
    }

    #[test]
    fn synthesize_refutation_produces_the_empty_clause() {
        let mut store = TermStore::new();
        let mut bdd = Bdd::new();
        let mut proof = InferenceStore::new();
        let mut clauses = ClauseStorage::new();
        let mut manager = AnswerManager::new();

        let x = Var::from_index(0);
        let p = store.signature_mut().declare_predicate("p", 1);
        let px = store.create_literal(p, true, false, vec![store.mk_var(x)]);
        let ans_lit = manager.inject(&mut store, vec![x], vec![px]);

        let a = store.signature_mut().declare_function("a", 0);
        let a_id = store.create(a, vec![]);
        let witness_lit = store.create_literal(ans_lit.predicate(), true, false, vec![a_id]);

        let unit = proof.record(Inference::new(RuleTag::Input, vec![]));
        let candidate = clauses.insert(Clause::new(
            vec![witness_lit],
            InputType::Axiom,
            bdd.falsity(),
            0,
            unit,
            &store,
            SelectionFunction::SelectNone,
        ));

        let refutation = manager.synthesize_refutation(&mut store, &mut bdd, &mut proof, &mut clauses, candidate);
        assert!(clauses.get(refutation).is_empty_refutation(&bdd));
    }
}
