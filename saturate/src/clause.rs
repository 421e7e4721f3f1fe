//! Clauses: multisets of literals plus propositional-part and provenance bookkeeping.
use saturate_bdd::NodeId;
use saturate_formula::{Literal, TermStore};
use saturate_proof::UnitId;

use crate::selection::SelectionFunction;

/// Where a clause originally came from.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum InputType {
    Axiom,
    Hypothesis,
    Assumption,
    Conjecture,
    NegatedConjecture,
}

/// Identifies one clause held by a [`ClauseStorage`].
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[repr(transparent)]
pub struct ClauseId {
    index: u32,
}

impl ClauseId {
    #[inline]
    fn from_index(index: usize) -> ClauseId {
        ClauseId {
            index: index as u32,
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        self.index as usize
    }
}

/// A clause: a multiset of literals plus the propositional-part/split bookkeeping every clause
/// carries.
#[derive(Clone)]
pub struct Clause {
    pub literals: Vec<Literal>,
    pub input_type: InputType,
    /// BDD node encoding the disjunction of split-names under which this clause currently holds;
    /// `⊤` means the clause has been discharged, `⊥` means it is unconditional.
    pub propositional_part: NodeId,
    /// Split-level identifiers this clause's propositional part currently depends on.
    pub splits: rustc_hash::FxHashSet<saturate_bdd::BddVar>,
    pub age: u32,
    pub weight: u32,
    /// Bit `i` set means `literals[i]` is selected (see [`SelectionFunction`]).
    pub selected: u64,
    pub inference: UnitId,
}

impl Clause {
    pub fn new(
        literals: Vec<Literal>,
        input_type: InputType,
        propositional_part: NodeId,
        age: u32,
        inference: UnitId,
        store: &TermStore,
        selection: SelectionFunction,
    ) -> Clause {
        let weight = literals.iter().map(|lit| lit.weight(store)).sum();
        let selected = selection.select(store, &literals);
        Clause {
            literals,
            input_type,
            propositional_part,
            splits: rustc_hash::FxHashSet::default(),
            age,
            weight,
            selected,
            inference,
        }
    }

    pub fn is_selected(&self, literal_index: usize) -> bool {
        self.selected & (1 << literal_index) != 0
    }

    pub fn selected_indices(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.literals.len()).filter(move |&i| self.is_selected(i))
    }

    /// A clause with no literals and an unconditional (`⊥`) propositional part is the empty
    /// refutation.
    pub fn is_empty_refutation(&self, bdd: &saturate_bdd::Bdd) -> bool {
        self.literals.is_empty() && bdd.is_false(self.propositional_part)
    }

    pub fn is_unit(&self) -> bool {
        self.literals.len() == 1
    }
}

/// Arena owning every clause produced during a saturation run.
///
/// Clauses are appended and never removed from the arena itself (a retired clause's slot stays
/// populated so that `ClauseId`s referenced from proofs/side tables remain valid); liveness is
/// tracked separately by the three clause sets in `saturation.rs`.
#[derive(Default)]
pub struct ClauseStorage {
    clauses: Vec<Clause>,
    by_inference: rustc_hash::FxHashMap<UnitId, ClauseId>,
}

impl ClauseStorage {
    pub fn new() -> ClauseStorage {
        ClauseStorage::default()
    }

    pub fn insert(&mut self, clause: Clause) -> ClauseId {
        let id = ClauseId::from_index(self.clauses.len());
        self.by_inference.insert(clause.inference, id);
        self.clauses.push(clause);
        id
    }

    /// The clause that a given inference unit derived, if any clause produced by that unit is
    /// still held in the arena (used by answer extraction to walk from proof units back to the
    /// clauses carrying their literals).
    pub fn by_inference(&self, unit: UnitId) -> Option<ClauseId> {
        self.by_inference.get(&unit).copied()
    }

    pub fn get(&self, id: ClauseId) -> &Clause {
        &self.clauses[id.index()]
    }

    pub fn get_mut(&mut self, id: ClauseId) -> &mut Clause {
        &mut self.clauses[id.index()]
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }
}
