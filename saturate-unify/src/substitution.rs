//! Bank-aware substitutions.
use rustc_hash::FxHashMap;
use saturate_formula::Var;

use crate::bank::{Bank, BankedTerm};
use crate::trail::Trail;

/// A mapping from `(Var, Bank)` to a banked term.
///
/// Never mutated directly outside of [`crate::unify::unify`] and [`crate::unify::apply`]: every
/// binding is recorded onto a [`Trail`] at the same time so it can be undone.
#[derive(Default)]
pub struct Substitution {
    bindings: FxHashMap<(Var, Bank), BankedTerm>,
}

impl Substitution {
    pub fn new() -> Substitution {
        Substitution::default()
    }

    /// Bind `key` to `value`, recording the mutation onto `trail`.
    pub fn bind(&mut self, key: (Var, Bank), value: BankedTerm, trail: &mut Trail) {
        debug_assert!(
            !self.bindings.contains_key(&key),
            "rebinding an already-bound variable without an intervening rollback"
        );
        self.bindings.insert(key, value);
        trail.record(key);
    }

    /// Undo a binding. Called only by [`Trail::rollback`].
    pub(crate) fn unbind(&mut self, key: (Var, Bank)) {
        self.bindings.remove(&key);
    }

    pub fn lookup(&self, key: (Var, Bank)) -> Option<BankedTerm> {
        self.bindings.get(&key).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }
}
