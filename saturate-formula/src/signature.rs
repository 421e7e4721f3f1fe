//! Function, predicate and sort symbols.
use rustc_hash::FxHashMap;

/// Index type used for function, predicate and sort symbols.
pub type SymbolIdx = u32;

/// A function symbol.
///
/// Function symbols name ordinary (non-predicate) compounds. Index 0 has no special meaning for
/// functions (unlike predicate index 0, which is reserved for equality).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[repr(transparent)]
pub struct FunctionId {
    index: SymbolIdx,
}

impl FunctionId {
    #[inline]
    pub fn from_index(index: usize) -> FunctionId {
        FunctionId {
            index: index as SymbolIdx,
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        self.index as usize
    }
}

/// A predicate symbol.
///
/// Predicate 0 is reserved for equality.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[repr(transparent)]
pub struct PredicateId {
    index: SymbolIdx,
}

impl PredicateId {
    #[inline]
    pub fn from_index(index: usize) -> PredicateId {
        PredicateId {
            index: index as SymbolIdx,
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        self.index as usize
    }

    /// The reserved equality predicate.
    #[inline]
    pub const fn equality() -> PredicateId {
        PredicateId { index: 0 }
    }

    #[inline]
    pub fn is_equality(self) -> bool {
        self.index == 0
    }
}

/// A sort (type) symbol.
///
/// Sort inference proper is out of scope ; sorts are only carried along so that the
/// two-variable-equality invariant  can record a sort tag.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[repr(transparent)]
pub struct Sort {
    index: SymbolIdx,
}

impl Sort {
    /// The default (unsorted, "individual") sort, always present.
    pub const INDIVIDUAL: Sort = Sort { index: 0 };

    #[inline]
    pub fn from_index(index: usize) -> Sort {
        Sort {
            index: index as SymbolIdx,
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        self.index as usize
    }
}

/// Colour of a symbol or term, used by the (external) interpolation tooling.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Colour {
    Left,
    Right,
    Transparent,
}

impl Default for Colour {
    fn default() -> Colour {
        Colour::Transparent
    }
}

#[derive(Clone, Debug)]
struct FunctionEntry {
    name: String,
    arity: usize,
    commutative: bool,
    interpreted: bool,
    colour: Colour,
}

#[derive(Clone, Debug)]
struct PredicateEntry {
    name: String,
    arity: usize,
}

/// The symbol table shared by all terms created through one [`TermStore`].
///
/// Kept separate from the hash-consing table itself so that signature lookups (name -> id, arity,
/// commutativity, colour) don't need to walk term data.
#[derive(Default, Debug)]
pub struct Signature {
    functions: Vec<FunctionEntry>,
    function_names: FxHashMap<String, FunctionId>,
    predicates: Vec<PredicateEntry>,
    predicate_names: FxHashMap<String, PredicateId>,
    sorts: Vec<String>,
    sort_names: FxHashMap<String, Sort>,
}

impl Signature {
    pub fn new() -> Signature {
        let mut sig = Signature::default();
        // Predicate 0 is reserved for equality.
        sig.predicates.push(PredicateEntry {
            name: "=".to_owned(),
            arity: 2,
        });
        sig.predicate_names
            .insert("=".to_owned(), PredicateId::equality());
        sig.sorts.push("$i".to_owned());
        sig.sort_names
            .insert("$i".to_owned(), Sort::INDIVIDUAL);
        sig
    }

    /// Look up or declare a function symbol of the given arity.
    ///
    /// Declaring the same name with a different arity is a user input error in TPTP (functions are
    /// overloaded by arity there), so this keeps the *last* arity seen per name+arity pair distinct.
    pub fn declare_function(&mut self, name: &str, arity: usize) -> FunctionId {
        let key = format!("{}/{}", name, arity);
        if let Some(&id) = self.function_names.get(&key) {
            return id;
        }
        let id = FunctionId::from_index(self.functions.len());
        self.functions.push(FunctionEntry {
            name: name.to_owned(),
            arity,
            commutative: false,
            interpreted: false,
            colour: Colour::Transparent,
        });
        self.function_names.insert(key, id);
        id
    }

    pub fn declare_predicate(&mut self, name: &str, arity: usize) -> PredicateId {
        let key = format!("{}/{}", name, arity);
        if let Some(&id) = self.predicate_names.get(&key) {
            return id;
        }
        let id = PredicateId::from_index(self.predicates.len());
        self.predicates.push(PredicateEntry {
            name: name.to_owned(),
            arity,
        });
        self.predicate_names.insert(key, id);
        id
    }

    pub fn declare_sort(&mut self, name: &str) -> Sort {
        if let Some(&sort) = self.sort_names.get(name) {
            return sort;
        }
        let sort = Sort::from_index(self.sorts.len());
        self.sorts.push(name.to_owned());
        self.sort_names.insert(name.to_owned(), sort);
        sort
    }

    pub fn function_arity(&self, id: FunctionId) -> usize {
        self.functions[id.index()].arity
    }

    pub fn function_name(&self, id: FunctionId) -> &str {
        &self.functions[id.index()].name
    }

    pub fn predicate_arity(&self, id: PredicateId) -> usize {
        self.predicates[id.index()].arity
    }

    pub fn predicate_name(&self, id: PredicateId) -> &str {
        if id.is_equality() {
            "="
        } else {
            &self.predicates[id.index()].name
        }
    }

    pub fn set_function_commutative(&mut self, id: FunctionId, commutative: bool) {
        self.functions[id.index()].commutative = commutative;
    }

    pub fn function_is_commutative(&self, id: FunctionId) -> bool {
        self.functions[id.index()].commutative
    }

    pub fn set_function_interpreted(&mut self, id: FunctionId, interpreted: bool) {
        self.functions[id.index()].interpreted = interpreted;
    }

    pub fn function_is_interpreted(&self, id: FunctionId) -> bool {
        self.functions[id.index()].interpreted
    }

    pub fn set_function_colour(&mut self, id: FunctionId, colour: Colour) {
        self.functions[id.index()].colour = colour;
    }

    pub fn function_colour(&self, id: FunctionId) -> Colour {
        self.functions[id.index()].colour
    }
}
