//! Multi-bank substitution, trail-based backtracking and Robinson unification.
//!
//! Variables from different clauses are kept disjoint via a caller-chosen [`Bank`] rather than
//! renamed apart, bindings are recorded onto an explicit [`Trail`] so that failed unification
//! attempts (and backtracking search, e.g. answer extraction) can cheaply roll back, and
//! [`unify::apply`] walks a term through the substitution while renaming into a fresh output bank.
pub mod bank;
pub mod substitution;
pub mod trail;
pub mod unify;

pub use bank::{Bank, BankedTerm};
pub use substitution::Substitution;
pub use trail::{Checkpoint, ScopedTrail, Trail};
pub use unify::{apply, unify, unify_args, Renamer};
