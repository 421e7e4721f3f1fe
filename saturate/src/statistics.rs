//! Counters, phase tracking and termination reasons.
//!
//! Small `Default`-derived counter structs updated by plain field increments, no
//! observer/event-bus indirection.
use std::fmt;
use std::time::{Duration, Instant};

/// The phase the saturation loop is currently in, covering loading through finalisation
/// (the parsing internals themselves live upstream of this crate).
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Phase {
    /// Preprocessed input clauses are still being inserted.
    Loading,
    /// A clause is being decomposed by the splitter.
    Splitting,
    /// The given-clause loop is running.
    Saturating,
    /// A refutation was found; answer-literal witness reconstruction is running.
    AnswerExtraction,
    /// Producing the final report (derivation, SZS status, answer tuples).
    Finalisation,
    /// A refutation (the empty clause) was found.
    Refuted,
    /// The passive set emptied without finding a refutation.
    Saturated,
    /// A configured resource limit was hit.
    LimitReached,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Phase::Loading => "loading",
            Phase::Splitting => "splitting",
            Phase::Saturating => "saturating",
            Phase::AnswerExtraction => "answer extraction",
            Phase::Finalisation => "finalisation",
            Phase::Refuted => "refuted",
            Phase::Saturated => "saturated",
            Phase::LimitReached => "limit reached",
        };
        f.write_str(name)
    }
}

/// Why the saturation loop stopped.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum TerminationReason {
    Refutation,
    Saturation,
    TimeLimit,
    MemoryLimit,
    GivenClauseLimit,
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            TerminationReason::Refutation => "refutation found",
            TerminationReason::Saturation => "saturated, no refutation",
            TerminationReason::TimeLimit => "time limit exceeded",
            TerminationReason::MemoryLimit => "memory limit exceeded",
            TerminationReason::GivenClauseLimit => "given-clause limit exceeded",
        };
        f.write_str(name)
    }
}

/// Saturation-loop counters and phase/termination tracking.
#[derive(Debug)]
pub struct Statistics {
    pub phase: Phase,
    pub termination: Option<TerminationReason>,
    pub given_clauses: u64,
    pub generated_clauses: u64,
    pub retained_clauses: u64,
    pub discarded_tautologies: u64,
    pub discarded_subsumed: u64,
    pub resolution_inferences: u64,
    pub superposition_inferences: u64,
    pub factoring_inferences: u64,
    pub equality_resolution_inferences: u64,
    pub equality_factoring_inferences: u64,
    pub demodulations: u64,
    pub subsumption_resolutions: u64,
    pub splits: u64,
    pub variant_merges: u64,
    start: Instant,
}

impl Default for Statistics {
    fn default() -> Statistics {
        Statistics {
            phase: Phase::Loading,
            termination: None,
            given_clauses: 0,
            generated_clauses: 0,
            retained_clauses: 0,
            discarded_tautologies: 0,
            discarded_subsumed: 0,
            resolution_inferences: 0,
            superposition_inferences: 0,
            factoring_inferences: 0,
            equality_resolution_inferences: 0,
            equality_factoring_inferences: 0,
            demodulations: 0,
            subsumption_resolutions: 0,
            splits: 0,
            variant_merges: 0,
            start: Instant::now(),
        }
    }
}

/// Why the saturation loop was cut short without deciding the problem, the payload of
/// `Outcome::Limit`.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum LimitReason {
    TimeLimit,
    MemoryLimit,
    GivenClauseLimit,
    /// The caller's polled interrupt flag (`saturate-cli`'s `SIGINT` handler) was set.
    Interrupted,
}

impl fmt::Display for LimitReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            LimitReason::TimeLimit => "time limit exceeded",
            LimitReason::MemoryLimit => "memory limit exceeded",
            LimitReason::GivenClauseLimit => "given-clause limit exceeded",
            LimitReason::Interrupted => "interrupted",
        };
        f.write_str(name)
    }
}

/// The soft resource budget governing one saturation run. Checked at two polling points: after
/// each given-clause step, and after each generating-inference batch. Memory accounting itself
/// is the process boundary's job (`saturate-cli`); this only compares whatever byte count the
/// caller supplies against the configured ceiling.
#[derive(Copy, Clone, Debug)]
pub struct Budget {
    pub given_clause_limit: u64,
    pub time_limit_ms: u64,
    pub memory_limit_bytes: u64,
}

impl Budget {
    pub fn new(given_clause_limit: u64, time_limit_ms: u64, memory_limit_bytes: u64) -> Budget {
        Budget {
            given_clause_limit,
            time_limit_ms,
            memory_limit_bytes,
        }
    }

    /// Whether any configured ceiling has been exceeded. `memory_used_bytes` is supplied by the
    /// caller (`0` disables the check, matching `given_clause_limit`/`time_limit_ms`'s "0 means
    /// unlimited" convention).
    pub fn check(&self, statistics: &Statistics, memory_used_bytes: u64) -> Option<LimitReason> {
        if self.given_clause_limit != 0 && statistics.given_clauses >= self.given_clause_limit {
            return Some(LimitReason::GivenClauseLimit);
        }
        if self.time_limit_ms != 0 && statistics.elapsed().as_millis() as u64 >= self.time_limit_ms {
            return Some(LimitReason::TimeLimit);
        }
        if self.memory_limit_bytes != 0 && memory_used_bytes >= self.memory_limit_bytes {
            return Some(LimitReason::MemoryLimit);
        }
        None
    }
}

impl Statistics {
    pub fn new() -> Statistics {
        Statistics::default()
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn set_phase(&mut self, phase: Phase) {
        log::debug!("saturation phase: {}", phase);
        self.phase = phase;
    }

    pub fn terminate(&mut self, reason: TerminationReason) {
        self.termination = Some(reason);
        self.phase = match reason {
            TerminationReason::Refutation => Phase::Refuted,
            TerminationReason::Saturation => Phase::Saturated,
            _ => Phase::LimitReached,
        };
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "phase:                      {}", self.phase)?;
        if let Some(reason) = self.termination {
            writeln!(f, "termination:                {}", reason)?;
        }
        writeln!(f, "elapsed:                    {:?}", self.elapsed())?;
        writeln!(f, "given clauses:              {}", self.given_clauses)?;
        writeln!(f, "generated clauses:         {}", self.generated_clauses)?;
        writeln!(f, "retained clauses:           {}", self.retained_clauses)?;
        writeln!(f, "discarded (tautology):      {}", self.discarded_tautologies)?;
        writeln!(f, "discarded (subsumed):       {}", self.discarded_subsumed)?;
        writeln!(f, "resolution inferences:      {}", self.resolution_inferences)?;
        writeln!(f, "superposition inferences:   {}", self.superposition_inferences)?;
        writeln!(f, "factoring inferences:       {}", self.factoring_inferences)?;
        writeln!(f, "equality resolutions:       {}", self.equality_resolution_inferences)?;
        writeln!(f, "equality factorings:        {}", self.equality_factoring_inferences)?;
        writeln!(f, "demodulations:              {}", self.demodulations)?;
        writeln!(f, "subsumption resolutions:    {}", self.subsumption_resolutions)?;
        writeln!(f, "splits:                     {}", self.splits)?;
        write!(f, "variant merges:             {}", self.variant_merges)
    }
}
