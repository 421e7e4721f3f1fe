//! Literal indexing structures.
//!
//! A [`LiteralIndexingStructure`] trait plus the default header-bucketed implementation
//! ([`HeaderIndex`]) that `saturate`'s active-clause set uses to drive resolution, superposition,
//! subsumption and demodulation lookups. Kept generic over the clause handle type `C` so this
//! crate has no dependency on `saturate`'s clause representation.
pub mod index;
pub mod matching;

pub use index::{HeaderIndex, LiteralIndexingStructure, Match, PatternBindings};
pub use matching::{one_way_match, one_way_match_args};
