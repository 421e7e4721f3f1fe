//! Variable banks.
//!
//! Each variable carries an implicit *bank* (an integer index) chosen by the caller (e.g. 0 =
//! goal, 1 = indexed clause) so that the same variable number from two clauses does not collide.
//! Variable identity for unification purposes is therefore `(Var, Bank)`, even though the
//! underlying [`saturate_formula::Var`] index space is shared by every clause.
use saturate_formula::TermId;

/// An integer namespace a caller assigns to a clause/query before unifying against another.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Bank(pub u32);

impl Bank {
    /// Conventional bank for the "query"/goal side of an index lookup.
    pub const GOAL: Bank = Bank(0);
    /// Conventional bank for the "indexed clause" side of an index lookup.
    pub const INDEXED: Bank = Bank(1);
}

/// A term paired with the bank its variables should be read in.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct BankedTerm {
    pub term: TermId,
    pub bank: Bank,
}

impl BankedTerm {
    pub fn new(term: TermId, bank: Bank) -> BankedTerm {
        BankedTerm { term, bank }
    }
}
