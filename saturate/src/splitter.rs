//! The splitter: variable-disjoint component decomposition and propositional-part bookkeeping.
//!
//! Components are found by union-find over shared variables; each component is then either
//! promoted to a fresh split name, unified with an existing variant, or kept as a freshly
//! inserted unique clause. Splitting is BDD-flavoured rather than the newer AVATAR/SAT-backend
//! style (the choice is recorded in `DESIGN.md`).
use rustc_hash::FxHashMap;
use saturate_bdd::{Bdd, BddVar, NodeId};
use saturate_formula::{Literal, TermId, TermStore};
use saturate_proof::{Inference, InferenceStore, RuleTag, UnitId};
use saturate_unify::{apply, Bank, BankedTerm, Renamer, Substitution};

use crate::clause::{Clause, ClauseId, ClauseStorage, InputType};
use crate::statistics::Statistics;

/// A clause-component equivalence class, keyed by variable-renamed canonical literals.
type VariantKey = Vec<(u64, TermId)>;

#[derive(Copy, Clone, Debug)]
struct VariantEntry {
    unit: ClauseId,
    split_var: Option<BddVar>,
}

/// Maps clause components (modulo variable renaming) to the clause that first realized them and,
/// once one exists, the split variable naming it.
#[derive(Default)]
pub struct VariantIndex {
    entries: FxHashMap<VariantKey, VariantEntry>,
    /// Reuses a split name for a propositional literal's atom across clauses.
    prop_pred_names: FxHashMap<TermId, BddVar>,
}

impl VariantIndex {
    pub fn new() -> VariantIndex {
        VariantIndex::default()
    }
}

fn canonical_key(store: &mut TermStore, literals: &[Literal]) -> VariantKey {
    let mut sorted: Vec<Literal> = literals.to_vec();
    sorted.sort_by_key(|lit| (lit.header(), store.weight(lit.atom())));

    let subst = Substitution::new();
    let mut renamer = Renamer::new();
    sorted
        .into_iter()
        .map(|lit| {
            let canonical_atom = apply(
                store,
                &subst,
                &mut renamer,
                BankedTerm::new(lit.atom(), Bank(0)),
            );
            (lit.header(), canonical_atom)
        })
        .collect()
}

/// Union-find partition of a clause's literals into variable-connected components.
fn components(store: &TermStore, literals: &[Literal]) -> Vec<Vec<usize>> {
    let n = literals.len();
    let mut parent: Vec<usize> = (0..n).collect();

    fn find(parent: &mut [usize], x: usize) -> usize {
        if parent[x] != x {
            parent[x] = find(parent, parent[x]);
        }
        parent[x]
    }

    fn union(parent: &mut [usize], a: usize, b: usize) {
        let ra = find(parent, a);
        let rb = find(parent, b);
        if ra != rb {
            parent[ra] = rb;
        }
    }

    let mut var_owner: FxHashMap<saturate_formula::Var, usize> = FxHashMap::default();
    for (i, lit) in literals.iter().enumerate() {
        for &var in literal_vars(store, *lit).iter() {
            match var_owner.get(&var) {
                Some(&owner) => union(&mut parent, owner, i),
                None => {
                    var_owner.insert(var, i);
                }
            }
        }
    }

    let mut groups: FxHashMap<usize, Vec<usize>> = FxHashMap::default();
    for i in 0..n {
        let root = find(&mut parent, i);
        groups.entry(root).or_insert_with(Vec::new).push(i);
    }
    groups.into_values().collect()
}

fn literal_vars(store: &TermStore, lit: Literal) -> Vec<saturate_formula::Var> {
    let mut vars = Vec::new();
    collect_vars(store, lit.atom(), &mut vars);
    vars
}

fn collect_vars(store: &TermStore, term: TermId, out: &mut Vec<saturate_formula::Var>) {
    if let Some(v) = store.as_var(term) {
        out.push(v);
        return;
    }
    for &arg in store.args(term) {
        collect_vars(store, arg, out);
    }
}

fn is_propositional(store: &TermStore, lit: Literal) -> bool {
    store.args(lit.atom()).is_empty()
}

/// What happened to a clause that was offered to the splitter.
pub enum SplitOutcome {
    /// The clause has a single variable-connected component; nothing to do.
    Unchanged,
    /// The clause was decomposed. `retained` is the (possibly absent, if fully discharged)
    /// surviving master clause; `new_units` lists every other freshly produced unit (naming
    /// premises and newly-inserted standalone components) that must be scheduled like any other
    /// derived clause.
    Split {
        retained: Option<ClauseId>,
        new_units: Vec<ClauseId>,
    },
}

/// Attempt to split `clause_id`'s literals into independently-tracked components.
#[allow(clippy::too_many_arguments)]
pub fn split_clause(
    store: &mut TermStore,
    bdd: &mut Bdd,
    proof: &mut InferenceStore,
    clauses: &mut ClauseStorage,
    variant_index: &mut VariantIndex,
    statistics: &mut Statistics,
    clause_id: ClauseId,
    original_unit: UnitId,
) -> SplitOutcome {
    let original = clauses.get(clause_id).clone();
    let parts = components(store, &original.literals);
    if parts.len() <= 1 {
        return SplitOutcome::Unchanged;
    }

    let mut accumulator = bdd.falsity();
    let mut naming_premises: Vec<UnitId> = vec![original_unit];
    let mut new_units: Vec<ClauseId> = Vec::new();
    let mut master_literals: Option<Vec<Literal>> = None;

    for indices in &parts {
        let lits: Vec<Literal> = indices.iter().map(|&i| original.literals[i]).collect();

        if lits.len() == 1 && is_propositional(store, lits[0]) {
            let lit = lits[0];
            let var = *variant_index
                .prop_pred_names
                .entry(lit.atom())
                .or_insert_with(|| bdd.new_var());
            accumulator = bdd.disjunction(accumulator, bdd.atomic(var, lit.is_positive()));

            let naming_prop = bdd.atomic(var, !lit.is_positive());
            let naming_unit = proof.record(Inference::new(RuleTag::ClauseNaming, vec![original_unit]));
            naming_premises.push(naming_unit);
            let naming_clause = Clause::new(
                vec![lit],
                original.input_type,
                naming_prop,
                original.age,
                naming_unit,
                store,
                crate::selection::SelectionFunction::SelectAllNegative,
            );
            new_units.push(clauses.insert(naming_clause));
            continue;
        }

        let key = canonical_key(store, &lits);
        match variant_index.entries.get(&key).copied() {
            Some(entry) if entry.split_var.is_some() => {
                let var = entry.split_var.unwrap();
                accumulator = bdd.disjunction(accumulator, bdd.atomic(var, true));
            }
            Some(entry) => {
                let var = bdd.new_var();
                if let Some(existing) = variant_index.entries.get_mut(&key) {
                    existing.split_var = Some(var);
                }
                accumulator = bdd.disjunction(accumulator, bdd.atomic(var, true));

                let naming_prop = bdd.atomic(var, false);
                let old_prop = clauses.get(entry.unit).propositional_part;
                let tracking_id = clauses.get(entry.unit).inference;
                clauses.get_mut(entry.unit).propositional_part = naming_prop;
                proof.note_prop_alteration(
                    tracking_id,
                    saturate_proof::PropAlteration {
                        old: old_prop,
                        new: naming_prop,
                        rule: RuleTag::ClauseNaming,
                    },
                );
                new_units.push(entry.unit);
            }
            None if master_literals.is_none() => {
                master_literals = Some(lits);
            }
            None => {
                let var = bdd.new_var();
                accumulator = bdd.disjunction(accumulator, bdd.atomic(var, true));
                let naming_prop = bdd.atomic(var, false);

                let naming_unit = proof.record(Inference::new(RuleTag::ClauseNaming, vec![original_unit]));
                naming_premises.push(naming_unit);
                let new_clause = Clause::new(
                    lits,
                    original.input_type,
                    naming_prop,
                    original.age,
                    naming_unit,
                    store,
                    crate::selection::SelectionFunction::SelectAllNegative,
                );
                let new_id = clauses.insert(new_clause);
                variant_index.entries.insert(
                    key,
                    VariantEntry {
                        unit: new_id,
                        split_var: Some(var),
                    },
                );
                new_units.push(new_id);
            }
        }
    }

    let master_prop = bdd.conjunction(original.propositional_part, bdd.negation(accumulator));
    statistics.splits += 1;

    proof.note_splitting_event(
        original_unit,
        saturate_proof::SplittingEvent {
            premises: naming_premises,
            pre: original.propositional_part,
            post: master_prop,
        },
    );

    // Every component other than (at most) one designated master was named above and folded
    // into `accumulator`; if no component was left unnamed there is nothing left to retain.
    let retained = match master_literals {
        Some(_) if bdd.is_true(master_prop) => None,
        Some(master_literals) => {
            let master_unit = proof.record(Inference::new(RuleTag::Splitting, vec![original_unit]));
            let master = Clause::new(
                master_literals,
                original.input_type,
                master_prop,
                original.age,
                master_unit,
                store,
                crate::selection::SelectionFunction::SelectAllNegative,
            );
            Some(clauses.insert(master))
        }
        None => None,
    };

    SplitOutcome::Split {
        retained,
        new_units,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use saturate_formula::Var;

    #[test]
    fn single_component_clause_is_unchanged() {
        let mut store = TermStore::new();
        let mut bdd = Bdd::new();
        let mut proof = InferenceStore::new();
        let mut clauses = ClauseStorage::new();
        let mut variant_index = VariantIndex::new();
        let mut statistics = Statistics::new();

        let p = store.signature_mut().declare_predicate("p", 1);
        let x = store.mk_var(Var::from_index(0));
        let lit = store.create_literal(p, true, false, vec![x]);
        let unit = proof.record(Inference::new(RuleTag::Input, vec![]));
        let clause = Clause::new(
            vec![lit],
            InputType::Axiom,
            bdd.falsity(),
            0,
            unit,
            &store,
            crate::selection::SelectionFunction::SelectAllNegative,
        );
        let id = clauses.insert(clause);

        let outcome = split_clause(
            &mut store,
            &mut bdd,
            &mut proof,
            &mut clauses,
            &mut variant_index,
            &mut statistics,
            id,
            unit,
        );
        assert!(matches!(outcome, SplitOutcome::Unchanged));
    }

    #[test]
    fn two_propositional_components_are_named() {
        let mut store = TermStore::new();
        let mut bdd = Bdd::new();
        let mut proof = InferenceStore::new();
        let mut clauses = ClauseStorage::new();
        let mut variant_index = VariantIndex::new();
        let mut statistics = Statistics::new();

        let p = store.signature_mut().declare_predicate("p", 0);
        let q = store.signature_mut().declare_predicate("q", 0);
        let lit_p = store.create_literal(p, true, false, vec![]);
        let lit_q = store.create_literal(q, true, false, vec![]);
        let unit = proof.record(Inference::new(RuleTag::Input, vec![]));
        let clause = Clause::new(
            vec![lit_p, lit_q],
            InputType::Axiom,
            bdd.falsity(),
            0,
            unit,
            &store,
            crate::selection::SelectionFunction::SelectAllNegative,
        );
        let id = clauses.insert(clause);

        let outcome = split_clause(
            &mut store,
            &mut bdd,
            &mut proof,
            &mut clauses,
            &mut variant_index,
            &mut statistics,
            id,
            unit,
        );

        match outcome {
            SplitOutcome::Split { retained, new_units } => {
                assert_eq!(new_units.len(), 2);
                assert!(retained.is_none(), "both components were named, nothing should be retained");
            }
            SplitOutcome::Unchanged => panic!("expected a split"),
        }
        assert_eq!(statistics.splits, 1);
    }

    #[test]
    fn three_nonground_components_name_all_but_one_master() {
        let mut store = TermStore::new();
        let mut bdd = Bdd::new();
        let mut proof = InferenceStore::new();
        let mut clauses = ClauseStorage::new();
        let mut variant_index = VariantIndex::new();
        let mut statistics = Statistics::new();

        let p = store.signature_mut().declare_predicate("p", 1);
        let q = store.signature_mut().declare_predicate("q", 1);
        let r = store.signature_mut().declare_predicate("r", 1);
        let x = store.mk_var(Var::from_index(0));
        let y = store.mk_var(Var::from_index(1));
        let z = store.mk_var(Var::from_index(2));
        let lit_p = store.create_literal(p, true, false, vec![x]);
        let lit_q = store.create_literal(q, true, false, vec![y]);
        let lit_r = store.create_literal(r, true, false, vec![z]);
        let unit = proof.record(Inference::new(RuleTag::Input, vec![]));
        let clause = Clause::new(
            vec![lit_p, lit_q, lit_r],
            InputType::Axiom,
            bdd.falsity(),
            0,
            unit,
            &store,
            crate::selection::SelectionFunction::SelectAllNegative,
        );
        let id = clauses.insert(clause);

        let outcome = split_clause(
            &mut store,
            &mut bdd,
            &mut proof,
            &mut clauses,
            &mut variant_index,
            &mut statistics,
            id,
            unit,
        );

        match outcome {
            SplitOutcome::Split { retained, new_units } => {
                // Two of the three components are named and folded into the accumulator; the
                // third stays as the retained master, guarded by the negated accumulator so it
                // only fires once both named components are refuted.
                assert_eq!(new_units.len(), 2);
                assert!(retained.is_some(), "one component must remain as the master clause");
                let master = clauses.get(retained.unwrap());
                assert_eq!(master.literals.len(), 1);
                assert_ne!(master.propositional_part, bdd.falsity());
            }
            SplitOutcome::Unchanged => panic!("expected a split"),
        }
        assert_eq!(statistics.splits, 1);
    }
}
