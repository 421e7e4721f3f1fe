//! Rule tags.
use crate::unit::UnitId;

/// The rule that derived a unit, and from which parents.
///
/// One flat, `Copy`-friendly enum rather than a class hierarchy, so exhaustive `match`es at every
/// proof consumer (printer, checker, statistics) catch an unhandled rule at compile time.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum RuleTag {
    /// A clause read directly from the problem's axioms, untouched.
    Input,
    /// The negation of an existentially-quantified conjecture, introduced as a clause to refute.
    NegatedConjecture,
    /// A clause supplied by background theory axioms rather than the problem proper.
    Axiom,
    /// A clause produced while reducing a non-clausal input formula to clausal form.
    Clausify,
    /// Ordinary binary resolution between a positive and a negative literal.
    Resolution,
    /// Superposition where the given clause rewrote into an active clause.
    SuperpositionForward,
    /// Superposition where an active clause rewrote into the given clause.
    SuperpositionBackward,
    /// Superposition of a clause into itself (both premises are the same unit).
    SuperpositionSelf,
    /// Equality/ordinary factoring of two literals of the same clause.
    Factoring,
    /// Equality resolution: removing a literal `s != t` after unifying `s` and `t`.
    EqualityResolution,
    /// Equality factoring, per Brand/Bachmair-Ganzinger-style calculi.
    EqualityFactoring,
    /// Simplification by rewriting with an active oriented equality.
    Demodulation,
    /// Removal of a literal subsumed, modulo unification, by another clause.
    SubsumptionResolution,
    /// Deletion of a clause recognised as a propositional tautology.
    TautologyIntroduction,
    /// Naming of a propositional component with a fresh split variable.
    ClauseNaming,
    /// Decomposition of a clause into variable-disjoint, individually named components.
    Splitting,
    /// Introduction of an answer literal into a clause derived from the goal.
    AnswerLiteral,
    /// Unit-resulting resolution, used to assemble the final answer-extraction refutation.
    UnitResultingResolution,
}

impl RuleTag {
    /// Whether this tag marks a unit as having no logical parents (a true leaf of the DAG).
    pub fn is_leaf_rule(self) -> bool {
        matches!(self, RuleTag::Input | RuleTag::NegatedConjecture | RuleTag::Axiom)
    }

    /// The rule name as it appears in a TPTP `inference(<rule>, ...)` annotation.
    pub fn tptp_name(self) -> &'static str {
        match self {
            RuleTag::Input => "input",
            RuleTag::NegatedConjecture => "negated_conjecture",
            RuleTag::Axiom => "axiom",
            RuleTag::Clausify => "clausify",
            RuleTag::Resolution => "resolution",
            RuleTag::SuperpositionForward => "forward_superposition",
            RuleTag::SuperpositionBackward => "backward_superposition",
            RuleTag::SuperpositionSelf => "self_superposition",
            RuleTag::Factoring => "factoring",
            RuleTag::EqualityResolution => "equality_resolution",
            RuleTag::EqualityFactoring => "equality_factoring",
            RuleTag::Demodulation => "demodulation",
            RuleTag::SubsumptionResolution => "subsumption_resolution",
            RuleTag::TautologyIntroduction => "tautology_introduction",
            RuleTag::ClauseNaming => "clause_naming",
            RuleTag::Splitting => "splitting",
            RuleTag::AnswerLiteral => "answer_literal",
            RuleTag::UnitResultingResolution => "unit_resulting_resolution",
        }
    }
}

/// One edge set in the inference DAG: the rule that produced a unit, and its ordered parents.
///
/// `parents` is non-empty unless `rule.is_leaf_rule()`.
#[derive(Clone, Debug)]
pub struct Inference {
    pub rule: RuleTag,
    pub parents: Vec<UnitId>,
}

impl Inference {
    pub fn new(rule: RuleTag, parents: Vec<UnitId>) -> Inference {
        debug_assert!(
            rule.is_leaf_rule() || !parents.is_empty(),
            "a non-leaf inference must have at least one parent"
        );
        Inference { rule, parents }
    }
}
