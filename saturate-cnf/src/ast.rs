//! Parse tree for the restricted TPTP subset `saturate-cnf` accepts.
//!
//! Deliberately small: a `Term` is either a variable (TPTP upper-case word) or a function
//! application (TPTP lower-case word, possibly zero-arity); an `Atom` is an equality or an
//! ordinary predicate application; a `Literal` pairs an atom with a polarity.

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Term {
    Var(String),
    App(String, Vec<Term>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Atom {
    Equality(Term, Term),
    Pred(String, Vec<Term>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Literal {
    pub positive: bool,
    pub atom: Atom,
}

/// The TPTP annotated-formula role, restricted to the roles this crate's `Clause` carries.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Role {
    Axiom,
    Hypothesis,
    Assumption,
    Conjecture,
    NegatedConjecture,
}

impl Role {
    pub fn from_name(name: &str) -> Option<Role> {
        match name {
            "axiom" => Some(Role::Axiom),
            "hypothesis" => Some(Role::Hypothesis),
            "assumption" => Some(Role::Assumption),
            "conjecture" => Some(Role::Conjecture),
            "negated_conjecture" => Some(Role::NegatedConjecture),
            _ => None,
        }
    }
}

/// One top-level annotated formula.
#[derive(Clone, Debug)]
pub enum Unit {
    /// `cnf(name, role, (L1 | L2 | ...)).`: already clausal.
    Cnf {
        name: String,
        role: Role,
        literals: Vec<Literal>,
    },
    /// `fof(name, conjecture, ?[X1,...,Xn]: (L1 & ... & Lk)).`: a flat existentially quantified
    /// conjunction; the only FOF shape this crate accepts.
    FofConjecture {
        name: String,
        vars: Vec<String>,
        literals: Vec<Literal>,
    },
}
