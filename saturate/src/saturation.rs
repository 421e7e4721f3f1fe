//! The given-clause saturation loop: the six-step main schedule over three clause sets.
//!
//! Plain `&mut Context` field borrows are used throughout rather than
//! `partial_ref`'s `partial!` macro: every rule module already takes disjoint `&mut`/`&`
//! parameters per subsystem (see `resolution.rs`/`superposition.rs`/etc.), and the borrow checker
//! sees `ctx.term_store`, `ctx.bdd`, `ctx.proof`, ... as independent field borrows when taken
//! directly at the call site, with no need for the macro's borrow-splitting machinery. Recorded as
//! an implementation note in `DESIGN.md`.
use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};

use rustc_hash::FxHashSet;
use saturate_index::LiteralIndexingStructure;
use saturate_proof::{Inference, RuleTag};

use crate::clause::{Clause, ClauseId};
use crate::context::Context;
use crate::demodulation;
use crate::equality;
use crate::resolution;
use crate::splitter::{self, SplitOutcome};
use crate::statistics::{LimitReason, Phase, TerminationReason};
use crate::subsumption;
use crate::superposition;

/// Outcome of one saturation run, replacing the usual `RefutationFoundException` pattern with an
/// ordinary, `Copy`-friendly enum.
#[derive(Copy, Clone, Debug)]
pub enum Outcome {
    /// More work remains; never returned by [`run`] itself, only used to name the "keep going"
    /// state this documentation refers to.
    Running,
    /// The empty clause was derived (directly, or via the synthetic answer-literal refutation);
    /// `ClauseId` names the refutation unit.
    Refutation(ClauseId),
    /// `passive` and `unprocessed` both drained without finding a refutation.
    Saturated,
    /// A configured resource limit, or the polled interrupt flag, tripped first.
    Limit(LimitReason),
}

/// The three clause collections the schedule threads clauses through.
#[derive(Default)]
struct ClauseSets {
    unprocessed: VecDeque<ClauseId>,
    passive: FxHashSet<ClauseId>,
    passive_by_weight: BinaryHeap<Reverse<(u32, u32, ClauseId)>>,
    passive_by_age: BinaryHeap<Reverse<(u32, ClauseId)>>,
    active: Vec<ClauseId>,
    picks: u32,
}

impl ClauseSets {
    fn push_unprocessed(&mut self, id: ClauseId) {
        self.unprocessed.push_back(id);
    }

    fn push_passive(&mut self, clause: &Clause, id: ClauseId) {
        self.passive.insert(id);
        self.passive_by_weight.push(Reverse((clause.weight, clause.age, id)));
        self.passive_by_age.push(Reverse((clause.age, id)));
    }

    fn remove_active(&mut self, id: ClauseId) {
        self.active.retain(|&c| c != id);
    }

    /// Pick the next given clause: weight-best `ratio` times in a row, then age-best once.
    /// Entries popped off one heap that are no longer in
    /// `passive` are stale (lazily deleted when the clause was already picked via the other
    /// heap) and are simply skipped.
    fn pop_given(&mut self, ratio: u32) -> Option<ClauseId> {
        loop {
            let by_age = ratio != 0 && self.picks % (ratio + 1) == ratio;
            let primary = if by_age {
                self.passive_by_age.pop().map(|Reverse((_, id))| id)
            } else {
                self.passive_by_weight.pop().map(|Reverse((_, _, id))| id)
            };
            match primary {
                Some(id) if self.passive.remove(&id) => {
                    self.picks += 1;
                    return Some(id);
                }
                Some(_) => continue,
                None => {
                    let fallback = if by_age {
                        self.passive_by_weight.pop().map(|Reverse((_, _, id))| id)
                    } else {
                        self.passive_by_age.pop().map(|Reverse((_, id))| id)
                    };
                    match fallback {
                        Some(id) if self.passive.remove(&id) => {
                            self.picks += 1;
                            return Some(id);
                        }
                        Some(_) => continue,
                        None => return None,
                    }
                }
            }
        }
    }
}

fn retract_from_index(ctx: &mut Context, id: ClauseId) {
    let clause = ctx.clauses.get(id).clone();
    for (i, &lit) in clause.literals.iter().enumerate() {
        if clause.is_selected(i) {
            ctx.active_index.remove(lit, id);
        }
    }
}

fn activate(ctx: &mut Context, sets: &mut ClauseSets, id: ClauseId) {
    sets.active.push(id);
    let clause = ctx.clauses.get(id).clone();
    for (i, &lit) in clause.literals.iter().enumerate() {
        if clause.is_selected(i) {
            ctx.active_index.insert(lit, id);
        }
    }
}

/// Step 6: file a freshly built clause. Returns `Some` the moment a refutation (direct, or via
/// answer-literal capture) is found; otherwise inserts the clause and queues it onto
/// `unprocessed`.
fn consider_new_clause(ctx: &mut Context, sets: &mut ClauseSets, clause: Clause) -> Option<Outcome> {
    if clause.is_empty_refutation(&ctx.bdd) {
        let id = ctx.clauses.insert(clause);
        return Some(Outcome::Refutation(id));
    }
    if ctx.answer_manager.try_capture(&ctx.bdd, &clause) {
        let id = ctx.clauses.insert(clause);
        let refutation =
            ctx.answer_manager
                .synthesize_refutation(&mut ctx.term_store, &mut ctx.bdd, &mut ctx.proof, &mut ctx.clauses, id);
        return Some(Outcome::Refutation(refutation));
    }
    let id = ctx.clauses.insert(clause);
    sets.push_unprocessed(id);
    None
}

/// Steps 1-3: forward-simplify one clause off `unprocessed` (demodulation, subsumption
/// resolution, subsumption, tautology/trivial-inequality/duplicate-literal cleanup), then hand it
/// to the splitter.
fn process_unprocessed(
    ctx: &mut Context,
    sets: &mut ClauseSets,
    mut id: ClauseId,
    demodulators: &[demodulation::Demodulator],
) -> Option<Outcome> {
    loop {
        match demodulation::forward_demodulation(
            &mut ctx.term_store,
            &mut ctx.proof,
            &ctx.clauses,
            &mut ctx.statistics,
            ctx.config.selection,
            ctx.config.ordering,
            demodulators,
            id,
        ) {
            Some(simplified) => id = ctx.clauses.insert(simplified),
            None => break,
        }
    }

    if ctx.config.subsumption {
        let active_ids: Vec<ClauseId> = sets.active.clone();
        loop {
            let target = ctx.clauses.get(id).clone();
            let mut simplified_once = false;
            for &other in &active_ids {
                let side = ctx.clauses.get(other).clone();
                if let Some(new_literals) = subsumption::subsumption_resolution(&ctx.term_store, &target.literals, &side.literals) {
                    ctx.statistics.subsumption_resolutions += 1;
                    let unit = ctx
                        .proof
                        .record(Inference::new(RuleTag::SubsumptionResolution, vec![target.inference, side.inference]));
                    let rebuilt = Clause::new(
                        new_literals,
                        target.input_type,
                        target.propositional_part,
                        target.age,
                        unit,
                        &ctx.term_store,
                        ctx.config.selection,
                    );
                    id = ctx.clauses.insert(rebuilt);
                    simplified_once = true;
                    break;
                }
            }
            if !simplified_once {
                break;
            }
        }

        let clause = ctx.clauses.get(id).clone();
        for &other in &active_ids {
            let other_clause = ctx.clauses.get(other).clone();
            if subsumption::subsumes(&ctx.term_store, &other_clause, &clause) {
                ctx.statistics.discarded_subsumed += 1;
                return None;
            }
        }
    }

    let clause = ctx.clauses.get(id).clone();
    if subsumption::is_tautology(&ctx.term_store, &clause.literals) {
        ctx.statistics.discarded_tautologies += 1;
        return None;
    }

    let cleaned = subsumption::remove_duplicate_literals(&subsumption::remove_trivial_inequalities(&ctx.term_store, &clause.literals));
    let clause = if cleaned.len() != clause.literals.len() {
        let rebuilt = Clause::new(
            cleaned,
            clause.input_type,
            clause.propositional_part,
            clause.age,
            clause.inference,
            &ctx.term_store,
            ctx.config.selection,
        );
        id = ctx.clauses.insert(rebuilt);
        ctx.clauses.get(id).clone()
    } else {
        clause
    };

    if clause.is_empty_refutation(&ctx.bdd) {
        return Some(Outcome::Refutation(id));
    }
    if ctx.answer_manager.try_capture(&ctx.bdd, &clause) {
        let refutation =
            ctx.answer_manager
                .synthesize_refutation(&mut ctx.term_store, &mut ctx.bdd, &mut ctx.proof, &mut ctx.clauses, id);
        return Some(Outcome::Refutation(refutation));
    }

    if !ctx.config.splitting {
        sets.push_passive(&clause, id);
        return None;
    }

    match splitter::split_clause(
        &mut ctx.term_store,
        &mut ctx.bdd,
        &mut ctx.proof,
        &mut ctx.clauses,
        &mut ctx.variant_index,
        &mut ctx.statistics,
        id,
        clause.inference,
    ) {
        SplitOutcome::Unchanged => sets.push_passive(&clause, id),
        SplitOutcome::Split { retained, new_units } => {
            for unit_id in new_units {
                sets.push_unprocessed(unit_id);
            }
            if let Some(retained_id) = retained {
                let retained_clause = ctx.clauses.get(retained_id).clone();
                if retained_clause.is_empty_refutation(&ctx.bdd) {
                    return Some(Outcome::Refutation(retained_id));
                }
                sets.push_passive(&retained_clause, retained_id);
            }
        }
    }
    None
}

/// Step 4's second half: backward demodulation, backward subsumption and backward subsumption
/// resolution of the active set against the just-activated `given` clause.
fn backward_simplify(ctx: &mut Context, sets: &mut ClauseSets, given: ClauseId) -> Option<Outcome> {
    if ctx.config.demodulation {
        let orientations = demodulation::oriented_unit_equalities(&ctx.term_store, ctx.config.ordering, &ctx.clauses, &[given]);
        if let Some(&demodulator) = orientations.first() {
            let active_ids: Vec<ClauseId> = sets.active.iter().copied().filter(|&id| id != given).collect();
            let results = demodulation::backward_demodulation(
                &mut ctx.term_store,
                &mut ctx.proof,
                &ctx.clauses,
                &mut ctx.statistics,
                ctx.config.selection,
                ctx.config.ordering,
                demodulator,
                &active_ids,
            );
            for (old_id, new_clause) in results {
                sets.remove_active(old_id);
                retract_from_index(ctx, old_id);
                if let Some(outcome) = consider_new_clause(ctx, sets, new_clause) {
                    return Some(outcome);
                }
            }
        }
    }

    if ctx.config.subsumption {
        let given_clause = ctx.clauses.get(given).clone();
        let active_ids: Vec<ClauseId> = sets.active.iter().copied().filter(|&id| id != given).collect();
        for other in active_ids {
            let other_clause = ctx.clauses.get(other).clone();
            if subsumption::subsumes(&ctx.term_store, &given_clause, &other_clause) {
                sets.remove_active(other);
                retract_from_index(ctx, other);
                ctx.statistics.discarded_subsumed += 1;
                continue;
            }
            if let Some(new_literals) = subsumption::subsumption_resolution(&ctx.term_store, &other_clause.literals, &given_clause.literals) {
                sets.remove_active(other);
                retract_from_index(ctx, other);
                ctx.statistics.subsumption_resolutions += 1;
                let unit = ctx
                    .proof
                    .record(Inference::new(RuleTag::SubsumptionResolution, vec![other_clause.inference, given_clause.inference]));
                let simplified = Clause::new(
                    new_literals,
                    other_clause.input_type,
                    other_clause.propositional_part,
                    other_clause.age,
                    unit,
                    &ctx.term_store,
                    ctx.config.selection,
                );
                if let Some(outcome) = consider_new_clause(ctx, sets, simplified) {
                    return Some(outcome);
                }
            }
        }
    }
    None
}

/// Step 5: every generating inference of `given` against the active set.
fn generate(ctx: &mut Context, sets: &ClauseSets, given: ClauseId) -> Vec<Clause> {
    let mut generated = Vec::new();

    generated.extend(resolution::resolution(
        &mut ctx.term_store,
        &mut ctx.bdd,
        &mut ctx.proof,
        &ctx.clauses,
        &ctx.active_index,
        &mut ctx.statistics,
        ctx.config.selection,
        given,
    ));
    generated.extend(resolution::factoring(
        &mut ctx.term_store,
        &mut ctx.bdd,
        &mut ctx.proof,
        &ctx.clauses,
        &mut ctx.statistics,
        ctx.config.selection,
        given,
    ));
    generated.extend(equality::equality_resolution(
        &mut ctx.term_store,
        &mut ctx.bdd,
        &mut ctx.proof,
        &ctx.clauses,
        &mut ctx.statistics,
        ctx.config.selection,
        given,
    ));
    generated.extend(equality::equality_factoring(
        &mut ctx.term_store,
        &mut ctx.bdd,
        &mut ctx.proof,
        &ctx.clauses,
        ctx.config.ordering,
        &mut ctx.statistics,
        ctx.config.selection,
        given,
    ));
    generated.extend(superposition::superposition_self(
        &mut ctx.term_store,
        &mut ctx.bdd,
        &mut ctx.proof,
        &ctx.clauses,
        ctx.config.ordering,
        &mut ctx.statistics,
        ctx.config.selection,
        given,
    ));

    for &other in &sets.active {
        if other == given {
            continue;
        }
        generated.extend(superposition::superposition_forward(
            &mut ctx.term_store,
            &mut ctx.bdd,
            &mut ctx.proof,
            &ctx.clauses,
            ctx.config.ordering,
            &mut ctx.statistics,
            ctx.config.selection,
            given,
            other,
        ));
        generated.extend(superposition::superposition_backward(
            &mut ctx.term_store,
            &mut ctx.bdd,
            &mut ctx.proof,
            &ctx.clauses,
            ctx.config.ordering,
            &mut ctx.statistics,
            ctx.config.selection,
            other,
            given,
        ));
    }

    generated
}

/// Run the given-clause loop to completion, refutation, or a resource limit. `initial` names
/// clauses already inserted into `ctx.clauses` (preprocessed input). `interrupted` is the
/// process boundary's polled `SIGINT` flag; `memory_used_bytes` supplies the current resident
/// size for the soft memory budget.
pub fn run(ctx: &mut Context, initial: Vec<ClauseId>, interrupted: &AtomicBool, memory_used_bytes: &dyn Fn() -> u64) -> Outcome {
    let mut sets = ClauseSets::default();
    for id in initial {
        sets.push_unprocessed(id);
    }

    ctx.statistics.set_phase(Phase::Saturating);
    let budget = ctx.config.budget();

    loop {
        if interrupted.load(AtomicOrdering::Relaxed) {
            ctx.statistics.terminate(TerminationReason::TimeLimit);
            return Outcome::Limit(LimitReason::Interrupted);
        }
        if let Some(reason) = budget.check(&ctx.statistics, memory_used_bytes()) {
            ctx.statistics.terminate(match reason {
                LimitReason::TimeLimit => TerminationReason::TimeLimit,
                LimitReason::MemoryLimit => TerminationReason::MemoryLimit,
                LimitReason::GivenClauseLimit => TerminationReason::GivenClauseLimit,
                LimitReason::Interrupted => TerminationReason::TimeLimit,
            });
            return Outcome::Limit(reason);
        }

        let demodulators = if ctx.config.demodulation {
            let active_ids: Vec<ClauseId> = sets.active.clone();
            demodulation::oriented_unit_equalities(&ctx.term_store, ctx.config.ordering, &ctx.clauses, &active_ids)
        } else {
            Vec::new()
        };

        while let Some(id) = sets.unprocessed.pop_front() {
            if let Some(outcome) = process_unprocessed(ctx, &mut sets, id, &demodulators) {
                ctx.statistics.terminate(TerminationReason::Refutation);
                return outcome;
            }
        }

        let given = match sets.pop_given(ctx.config.age_weight_ratio) {
            Some(id) => id,
            None => {
                ctx.statistics.terminate(TerminationReason::Saturation);
                return Outcome::Saturated;
            }
        };
        ctx.statistics.given_clauses += 1;

        activate(ctx, &mut sets, given);
        if let Some(outcome) = backward_simplify(ctx, &mut sets, given) {
            ctx.statistics.terminate(TerminationReason::Refutation);
            return outcome;
        }

        let generated = generate(ctx, &sets, given);
        for clause in generated {
            ctx.statistics.generated_clauses += 1;
            if let Some(outcome) = consider_new_clause(ctx, &mut sets, clause) {
                ctx.statistics.terminate(TerminationReason::Refutation);
                return outcome;
            }
        }
        ctx.statistics.retained_clauses = sets.active.len() as u64 + sets.passive.len() as u64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SolverConfig;
    use crate::clause::InputType;

    #[test]
    fn refutes_p_and_not_p() {
        let mut ctx = Context::new(SolverConfig::default());

        let p = ctx.term_store.signature_mut().declare_predicate("p", 0);
        let pos = ctx.term_store.create_literal(p, true, false, vec![]);
        let neg = pos.negate();

        let unit_a = ctx.proof.record(Inference::new(RuleTag::Input, vec![]));
        let a = ctx.clauses.insert(Clause::new(
            vec![pos],
            InputType::Axiom,
            ctx.bdd.falsity(),
            0,
            unit_a,
            &ctx.term_store,
            ctx.config.selection,
        ));
        let unit_b = ctx.proof.record(Inference::new(RuleTag::Input, vec![]));
        let b = ctx.clauses.insert(Clause::new(
            vec![neg],
            InputType::NegatedConjecture,
            ctx.bdd.falsity(),
            0,
            unit_b,
            &ctx.term_store,
            ctx.config.selection,
        ));

        let interrupted = AtomicBool::new(false);
        let outcome = run(&mut ctx, vec![a, b], &interrupted, &|| 0);
        assert!(matches!(outcome, Outcome::Refutation(_)));
    }

    #[test]
    fn saturates_on_a_single_satisfiable_unit() {
        let mut ctx = Context::new(SolverConfig::default());
        let p = ctx.term_store.signature_mut().declare_predicate("p", 0);
        let pos = ctx.term_store.create_literal(p, true, false, vec![]);
        let unit = ctx.proof.record(Inference::new(RuleTag::Input, vec![]));
        let a = ctx.clauses.insert(Clause::new(
            vec![pos],
            InputType::Axiom,
            ctx.bdd.falsity(),
            0,
            unit,
            &ctx.term_store,
            ctx.config.selection,
        ));

        let interrupted = AtomicBool::new(false);
        let outcome = run(&mut ctx, vec![a], &interrupted, &|| 0);
        assert!(matches!(outcome, Outcome::Saturated));
    }
}
