//! Solver configuration.
use saturate_macros::DocDefault;

use crate::ordering::TermOrdering;
use crate::selection::SelectionFunction;
use crate::statistics::Budget;

/// Configurable parameters governing one saturation run.
///
/// One flat, `DocDefault`-derived struct whose doc comments double as the default-value source,
/// rather than a builder or a scattered set of constructor arguments.
#[derive(DocDefault)]
pub struct SolverConfig {
    /// Term ordering used to orient equations and compare literals. (Default: TermOrdering::Kbo)
    pub ordering: TermOrdering,

    /// Literal selection function restricting which literals participate in resolution and
    /// superposition as the maximal/selected literal. (Default: SelectionFunction::SelectAllNegative)
    pub selection: SelectionFunction,

    /// Weight given to a clause's age (vs. its weight) when picking the next given clause out of
    /// the passive set; clauses are picked by age every `age_weight_ratio`-th pick and by weight
    /// otherwise. (Default: 5)
    pub age_weight_ratio: u32,

    /// Whether forward and backward subsumption are attempted before and after activating a
    /// clause. (Default: true)
    pub subsumption: bool,

    /// Whether demodulation (rewriting by oriented unit equalities) is attempted. (Default: true)
    pub demodulation: bool,

    /// Whether the splitting subsystem decomposes variable-disjoint clause components into
    /// separately named propositional parts. (Default: true)
    pub splitting: bool,

    /// Maximum number of given clauses to process before giving up with `GivenClauseLimit`.
    /// `0` means unlimited. (Default: 0)
    pub given_clause_limit: u64,

    /// Soft wall-clock limit in milliseconds. `0` means unlimited. (Default: 0)
    pub time_limit_ms: u64,

    /// Soft memory budget in bytes, checked by the process boundary. `0` means unlimited.
    /// (Default: 0)
    pub memory_limit_bytes: u64,
}

impl SolverConfig {
    pub fn budget(&self) -> Budget {
        Budget::new(self.given_clause_limit, self.time_limit_ms, self.memory_limit_bytes)
    }
}
