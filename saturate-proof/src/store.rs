//! The inference store: a reference-counted DAG of units and their derivations.
use rustc_hash::FxHashMap;
use saturate_bdd::NodeId;

use crate::rule::{Inference, RuleTag};
use crate::unit::UnitId;

struct Record {
    inference: Inference,
    /// Number of live references: derived descendants plus indices that still retain this unit.
    ref_count: u32,
}

/// A propositional-part alteration recorded against a unit: its old node, its new node, and the
/// rule responsible.
#[derive(Copy, Clone, Debug)]
pub struct PropAlteration {
    pub old: NodeId,
    pub new: NodeId,
    pub rule: RuleTag,
}

/// A splitting event: the premise list plus the propositional part before and after the split.
#[derive(Clone, Debug)]
pub struct SplittingEvent {
    pub premises: Vec<UnitId>,
    pub pre: NodeId,
    pub post: NodeId,
}

/// Record of two variant clauses (equal modulo variable renaming) being merged into one.
#[derive(Copy, Clone, Debug)]
pub struct VariantMerge {
    pub old_propositional_part: NodeId,
    pub new_propositional_part: NodeId,
    pub merging_unit: UnitId,
}

/// Process-wide singleton mapping every unit to its parents and rule tag.
///
/// Units are added once and never mutated; removal happens only by reference-count decay: a unit
/// shares ownership of its parents with all other units referencing them, and reference counts
/// remove a unit once no derived descendant and no index retains it.
#[derive(Default)]
pub struct InferenceStore {
    records: FxHashMap<UnitId, Record>,
    next_id: u32,
    prop_alterations: FxHashMap<UnitId, Vec<PropAlteration>>,
    splitting_events: FxHashMap<UnitId, SplittingEvent>,
    variant_merges: FxHashMap<UnitId, VariantMerge>,
}

impl InferenceStore {
    pub fn new() -> InferenceStore {
        InferenceStore::default()
    }

    /// Register a new unit's inference, taking one reference count on each of its parents.
    pub fn record(&mut self, inference: Inference) -> UnitId {
        let id = UnitId::from_index(self.next_id as usize);
        self.next_id += 1;

        for &parent in &inference.parents {
            if let Some(record) = self.records.get_mut(&parent) {
                record.ref_count += 1;
            }
        }

        self.records.insert(
            id,
            Record {
                inference,
                ref_count: 0,
            },
        );
        id
    }

    pub fn inference(&self, unit: UnitId) -> Option<&Inference> {
        self.records.get(&unit).map(|record| &record.inference)
    }

    pub fn rule(&self, unit: UnitId) -> Option<RuleTag> {
        self.inference(unit).map(|inference| inference.rule)
    }

    pub fn parents(&self, unit: UnitId) -> &[UnitId] {
        self.inference(unit)
            .map(|inference| inference.parents.as_slice())
            .unwrap_or(&[])
    }

    /// Add one external reference (e.g. an index retaining this unit), keeping it alive even if
    /// it has no derived descendants.
    pub fn retain(&mut self, unit: UnitId) {
        if let Some(record) = self.records.get_mut(&unit) {
            record.ref_count += 1;
        }
    }

    /// Drop one external reference. When a unit's count reaches zero it is removed, and each of
    /// its parents' counts is decremented in turn, recursively collecting anything that becomes
    /// unreachable.
    pub fn release(&mut self, unit: UnitId) {
        let mut to_release = vec![unit];
        while let Some(id) = to_release.pop() {
            let should_remove = match self.records.get_mut(&id) {
                Some(record) => {
                    if record.ref_count == 0 {
                        true
                    } else {
                        record.ref_count -= 1;
                        false
                    }
                }
                None => false,
            };
            if should_remove {
                if let Some(record) = self.records.remove(&id) {
                    to_release.extend(record.inference.parents.iter().copied());
                }
                self.prop_alterations.remove(&id);
                self.splitting_events.remove(&id);
                self.variant_merges.remove(&id);
            }
        }
    }

    pub fn note_prop_alteration(&mut self, unit: UnitId, alteration: PropAlteration) {
        self.prop_alterations
            .entry(unit)
            .or_insert_with(Vec::new)
            .push(alteration);
    }

    pub fn prop_alterations(&self, unit: UnitId) -> &[PropAlteration] {
        self.prop_alterations
            .get(&unit)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn note_splitting_event(&mut self, unit: UnitId, event: SplittingEvent) {
        self.splitting_events.insert(unit, event);
    }

    pub fn splitting_event(&self, unit: UnitId) -> Option<&SplittingEvent> {
        self.splitting_events.get(&unit)
    }

    pub fn note_variant_merge(&mut self, unit: UnitId, merge: VariantMerge) {
        self.variant_merges.insert(unit, merge);
    }

    pub fn variant_merge(&self, unit: UnitId) -> Option<&VariantMerge> {
        self.variant_merges.get(&unit)
    }

    /// Walk the DAG upward from `unit`, yielding every ancestor unit exactly once (used by proof
    /// printers and the answer-extraction refutation reconstructor).
    pub fn ancestors(&self, unit: UnitId) -> Vec<UnitId> {
        let mut seen = rustc_hash::FxHashSet::default();
        let mut order = Vec::new();
        let mut stack = vec![unit];
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            order.push(id);
            stack.extend(self.parents(id).iter().copied());
        }
        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_units_have_no_parents() {
        let mut store = InferenceStore::new();
        let axiom = store.record(Inference::new(RuleTag::Axiom, vec![]));
        assert_eq!(store.parents(axiom), &[]);
        assert_eq!(store.rule(axiom), Some(RuleTag::Axiom));
    }

    #[test]
    fn derived_units_record_ordered_parents() {
        let mut store = InferenceStore::new();
        let a = store.record(Inference::new(RuleTag::Input, vec![]));
        let b = store.record(Inference::new(RuleTag::Input, vec![]));
        let resolvent = store.record(Inference::new(RuleTag::Resolution, vec![a, b]));
        assert_eq!(store.parents(resolvent), &[a, b]);
    }

    #[test]
    fn release_collects_unreferenced_ancestors() {
        let mut store = InferenceStore::new();
        let a = store.record(Inference::new(RuleTag::Input, vec![]));
        let b = store.record(Inference::new(RuleTag::Input, vec![]));
        let resolvent = store.record(Inference::new(RuleTag::Resolution, vec![a, b]));

        store.retain(resolvent);
        store.release(resolvent);
        assert!(store.inference(resolvent).is_none());
        assert!(store.inference(a).is_none());
        assert!(store.inference(b).is_none());
    }

    #[test]
    fn release_keeps_still_referenced_parent() {
        let mut store = InferenceStore::new();
        let a = store.record(Inference::new(RuleTag::Input, vec![]));
        let b = store.record(Inference::new(RuleTag::Input, vec![]));
        let r1 = store.record(Inference::new(RuleTag::Resolution, vec![a, b]));
        let r2 = store.record(Inference::new(RuleTag::Factoring, vec![a]));

        store.retain(r1);
        store.retain(r2);
        store.release(r1);

        // `a` is still referenced through `r2`.
        assert!(store.inference(a).is_some());
        assert!(store.inference(b).is_none());
        assert!(store.inference(r1).is_none());
        assert!(store.inference(r2).is_some());
    }

    #[test]
    fn ancestors_visits_each_unit_once_in_a_diamond() {
        let mut store = InferenceStore::new();
        let a = store.record(Inference::new(RuleTag::Input, vec![]));
        let b = store.record(Inference::new(RuleTag::Factoring, vec![a]));
        let c = store.record(Inference::new(RuleTag::Factoring, vec![a]));
        let d = store.record(Inference::new(RuleTag::Resolution, vec![b, c]));

        let ancestors = store.ancestors(d);
        assert_eq!(ancestors.len(), 4);
        assert!(ancestors.contains(&a));
        assert!(ancestors.contains(&b));
        assert!(ancestors.contains(&c));
        assert!(ancestors.contains(&d));
    }
}
