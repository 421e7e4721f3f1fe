//! The inference store: a reference-counted DAG of derivations.
//!
//! Every unit (clause or formula) owns exactly one [`Inference`] describing its rule tag and
//! ordered parents, plus side tables for propositional-part alterations, splitting events, and
//! variant merges, kept separate from `Inference` itself rather than bloating every unit's record.
pub mod rule;
pub mod store;
pub mod unit;

pub use rule::{Inference, RuleTag};
pub use store::{InferenceStore, PropAlteration, SplittingEvent, VariantMerge};
pub use unit::UnitId;
