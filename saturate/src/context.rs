//! Central prover data structure.
//!
//! One [`Context`] owns every subsystem a saturation run touches: the term store, the
//! unification working state, the BDD, the inference store, clause storage, the active-clause
//! index, the splitter's variant index, the answer-literal manager, configuration and
//! statistics. A single struct with `part!`
//! declared fields, so functions that need several subsystems at once take a
//! `partial!(Context, mut FooP, BarP, ...)` borrow rather than `&mut self`, which both documents
//! their data dependencies and lets the borrow checker see that two `partial!` borrows of
//! disjoint parts can be held simultaneously.
use partial_ref::{part, PartialRefTarget};

use saturate_bdd::Bdd;
use saturate_formula::TermStore;
use saturate_index::HeaderIndex;
use saturate_proof::InferenceStore;
use saturate_unify::{Substitution, Trail};

use crate::answer::AnswerManager;
use crate::clause::{ClauseId, ClauseStorage};
use crate::config::SolverConfig;
use crate::splitter::VariantIndex;
use crate::statistics::Statistics;

/// Part declarations for [`Context`], grouped in a dedicated `parts` submodule so call sites can
/// `use parts::*;`.
pub mod parts {
    use super::*;

    part!(pub TermStoreP: TermStore);
    part!(pub SubstitutionP: Substitution);
    part!(pub UnifyTrailP: Trail);
    part!(pub BddP: Bdd);
    part!(pub ProofP: InferenceStore);
    part!(pub ClausesP: ClauseStorage);
    part!(pub ActiveIndexP: HeaderIndex<ClauseId>);
    part!(pub VariantIndexP: VariantIndex);
    part!(pub AnswerManagerP: AnswerManager);
    part!(pub ConfigP: SolverConfig);
    part!(pub StatisticsP: Statistics);
}

use parts::*;

/// Central prover data structure; see the module documentation.
#[derive(PartialRefTarget, Default)]
pub struct Context {
    #[part(TermStoreP)]
    pub term_store: TermStore,
    #[part(SubstitutionP)]
    pub substitution: Substitution,
    #[part(UnifyTrailP)]
    pub unify_trail: Trail,
    #[part(BddP)]
    pub bdd: Bdd,
    #[part(ProofP)]
    pub proof: InferenceStore,
    #[part(ClausesP)]
    pub clauses: ClauseStorage,
    #[part(ActiveIndexP)]
    pub active_index: HeaderIndex<ClauseId>,
    #[part(VariantIndexP)]
    pub variant_index: VariantIndex,
    #[part(AnswerManagerP)]
    pub answer_manager: AnswerManager,
    #[part(ConfigP)]
    pub config: SolverConfig,
    #[part(StatisticsP)]
    pub statistics: Statistics,
}

impl Context {
    pub fn new(config: SolverConfig) -> Context {
        Context {
            config,
            ..Context::default()
        }
    }
}
