//! Demodulation: simplification by rewriting with an *oriented* unit equality, as opposed to
//! superposition's generating (non-simplifying) rewriting.
//!
//! Covers forward simplification against the active set and backward simplification of the
//! active set against a new unit equality. Unlike superposition,
//! the equation's left side is matched (one-way, via `saturate_index::matching`) rather than
//! unified into the target, and an equation only demodulates when it is ordering-oriented
//! (`lhs` strictly greater than `rhs`), which both guarantees termination and is what lets a
//! "demodulator" stay a simplification rather than a generating inference.
use saturate_bdd::Bdd;
use saturate_formula::{Literal, TermData, TermId, TermStore};
use saturate_index::one_way_match;
use saturate_proof::{Inference, InferenceStore, RuleTag, UnitId};

use crate::clause::{Clause, ClauseId, ClauseStorage, InputType};
use crate::ordering::{Comparison, TermOrdering};
use crate::selection::SelectionFunction;
use crate::statistics::Statistics;

/// A ground-oriented (or at least ordering-oriented) unit equality usable as a rewrite rule:
/// `lhs` strictly reduces to `rhs` under `ordering`.
#[derive(Copy, Clone)]
pub struct Demodulator {
    pub source: ClauseId,
    pub lhs: TermId,
    pub rhs: TermId,
}

/// Collect every active unit clause whose single literal is a positive, ordering-oriented
/// equality, in the orientation that makes it usable as a rewrite rule.
pub fn oriented_unit_equalities(
    store: &TermStore,
    ordering: TermOrdering,
    clauses: &ClauseStorage,
    active: &[ClauseId],
) -> Vec<Demodulator> {
    let mut out = Vec::new();
    for &id in active {
        let clause = clauses.get(id);
        if clause.literals.len() != 1 {
            continue;
        }
        let lit = clause.literals[0];
        if !lit.is_equality() || !lit.is_positive() {
            continue;
        }
        let args = lit.args(store);
        if args.len() != 2 {
            continue;
        }
        let (s, t) = (args[0], args[1]);
        if ordering.compare(store, s, t) == Comparison::Greater {
            out.push(Demodulator { source: id, lhs: s, rhs: t });
        } else if ordering.compare(store, t, s) == Comparison::Greater {
            out.push(Demodulator { source: id, lhs: t, rhs: s });
        }
        // Incomparable or equal sides give no sound rewrite direction; skip.
    }
    out
}

fn substitute(store: &mut TermStore, bindings: &rustc_hash::FxHashMap<saturate_formula::Var, TermId>, term: TermId) -> TermId {
    if let Some(var) = store.as_var(term) {
        return *bindings.get(&var).expect("match-produced bindings must cover every pattern variable");
    }
    if let TermData::Special(_) = store.data(term) {
        return term;
    }
    let args = store.args(term).to_vec();
    if args.is_empty() {
        return term;
    }
    let functor = store.functor(term).expect("non-var, non-special term must be an application");
    let new_args: Vec<TermId> = args.iter().map(|&a| substitute(store, bindings, a)).collect();
    store.create(functor, new_args)
}

/// Try every subterm position of `term` against every demodulator, returning the rewritten term
/// and the demodulator used for the first successful, ordering-sound match.
fn rewrite_once(store: &mut TermStore, ordering: TermOrdering, demodulators: &[Demodulator], term: TermId) -> Option<(TermId, ClauseId)> {
    for d in demodulators {
        if let Some(bindings) = one_way_match(store, d.lhs, term) {
            let rhs_instance = substitute(store, &bindings, d.rhs);
            if ordering.compare(store, term, rhs_instance) == Comparison::Greater {
                return Some((rhs_instance, d.source));
            }
        }
    }
    if let TermData::App(_, _) = store.data(term) {
        let args = store.args(term).to_vec();
        let functor = store.functor(term).unwrap();
        for (i, &arg) in args.iter().enumerate() {
            if let Some((rewritten_arg, source)) = rewrite_once(store, ordering, demodulators, arg) {
                let mut new_args = args.clone();
                new_args[i] = rewritten_arg;
                return Some((store.create(functor, new_args), source));
            }
        }
    }
    None
}

/// Rewrite `lit` to a normal form with respect to `demodulators`, returning the simplified literal
/// and the demodulators used (in application order), or `None` if nothing applied.
fn demodulate_literal(
    store: &mut TermStore,
    ordering: TermOrdering,
    demodulators: &[Demodulator],
    lit: Literal,
) -> Option<(Literal, Vec<ClauseId>)> {
    let mut atom = lit.atom();
    let mut used = Vec::new();
    loop {
        match rewrite_once(store, ordering, demodulators, atom) {
            Some((rewritten, source)) => {
                atom = rewritten;
                used.push(source);
            }
            None => break,
        }
    }
    if used.is_empty() {
        return None;
    }
    let new_args = store.args(atom).to_vec();
    let commutative = lit.is_equality();
    Some((store.create_literal(lit.predicate(), lit.is_positive(), commutative, new_args), used))
}

fn demodulate_literals(
    store: &mut TermStore,
    ordering: TermOrdering,
    demodulators: &[Demodulator],
    literals: &[Literal],
) -> Option<(Vec<Literal>, Vec<ClauseId>)> {
    let mut changed = false;
    let mut premises = Vec::new();
    let mut out = Vec::with_capacity(literals.len());
    for &lit in literals {
        match demodulate_literal(store, ordering, demodulators, lit) {
            Some((new_lit, used)) => {
                changed = true;
                premises.extend(used);
                out.push(new_lit);
            }
            None => out.push(lit),
        }
    }
    if changed {
        Some((out, premises))
    } else {
        None
    }
}

/// Forward demodulation: simplify `given` against the active set's oriented unit equalities.
/// Returns the simplified clause when any literal was rewritten.
#[allow(clippy::too_many_arguments)]
pub fn forward_demodulation(
    store: &mut TermStore,
    proof: &mut InferenceStore,
    clauses: &ClauseStorage,
    statistics: &mut Statistics,
    selection: SelectionFunction,
    ordering: TermOrdering,
    demodulators: &[Demodulator],
    given: ClauseId,
) -> Option<Clause> {
    let clause = clauses.get(given).clone();
    let (new_literals, used) = demodulate_literals(store, ordering, demodulators, &clause.literals)?;

    statistics.demodulations += used.len() as u64;
    let mut parents: Vec<UnitId> = vec![clause.inference];
    parents.extend(used.into_iter().map(|id| clauses.get(id).inference));
    let unit = proof.record(Inference::new(RuleTag::Demodulation, parents));

    Some(Clause::new(
        new_literals,
        clause.input_type,
        clause.propositional_part,
        clause.age,
        unit,
        store,
        selection,
    ))
}

/// Backward demodulation: simplify every clause named in `active` against the single freshly
/// inserted `new_demodulator`. Returns, for every active clause that changed, its id and the
/// simplified replacement; the caller is responsible for retracting the old clause from the
/// active index and scheduling the replacement like any freshly generated clause.
#[allow(clippy::too_many_arguments)]
pub fn backward_demodulation(
    store: &mut TermStore,
    proof: &mut InferenceStore,
    clauses: &ClauseStorage,
    statistics: &mut Statistics,
    selection: SelectionFunction,
    ordering: TermOrdering,
    new_demodulator: Demodulator,
    active: &[ClauseId],
) -> Vec<(ClauseId, Clause)> {
    let mut out = Vec::new();
    let demodulators = [new_demodulator];
    for &id in active {
        if id == new_demodulator.source {
            continue;
        }
        let clause = clauses.get(id).clone();
        if let Some((new_literals, used)) = demodulate_literals(store, ordering, &demodulators, &clause.literals) {
            statistics.demodulations += used.len() as u64;
            let parents = vec![clause.inference, clauses.get(new_demodulator.source).inference];
            let unit = proof.record(Inference::new(RuleTag::Demodulation, parents));
            out.push((
                id,
                Clause::new(
                    new_literals,
                    clause.input_type,
                    clause.propositional_part,
                    clause.age,
                    unit,
                    store,
                    selection,
                ),
            ));
        }
    }
    out
}
