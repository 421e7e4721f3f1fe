//! Hash-consed term, literal and signature data types for the Saturate first-order prover.
//!
//! This crate implements the term store: structural sharing, the weight/ground/
//! variable-occurrence caches, two-variable-equality tagging, and the symbol table.
pub mod literal;
pub mod signature;
pub mod term;

pub use literal::{Literal, LiteralSorts};
pub use signature::{Colour, FunctionId, PredicateId, Signature, Sort};
pub use term::{SpecialVar, TermData, TermId, TermRecord, TermStore, Var};

/// Shortcut for tests
#[cfg(any(test, feature = "internal-testing"))]
#[doc(hidden)]
#[macro_export]
macro_rules! var {
    ($x:expr) => {
        $crate::Var::from_index($x)
    };
}

/// Shortcut for tests
#[cfg(any(test, feature = "internal-testing"))]
#[doc(hidden)]
#[macro_export]
macro_rules! vars {
    ( $( $x:expr ),* ) => { [ $( $crate::var!( $x ) ),* ] };
    ( $( $x:expr ),* , ) => { $crate::vars! [ $( $x ),* ] };
}
