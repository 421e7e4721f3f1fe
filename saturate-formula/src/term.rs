//! Hash-consed terms.
//!
//! Terms are interned into a [`TermStore`]: structurally equal compounds always share the same
//! [`TermId`]. Metadata that would otherwise be
//! recomputed on every traversal (arity, ground flag, weight, variable occurrences, ...) is cached
//! alongside the hash-consed data in a [`TermRecord`], not folded into the hash-consing key itself.
use std::cell::Cell;

use rustc_hash::FxHashMap;

use crate::signature::{Colour, FunctionId, Signature, Sort};

/// Index type backing [`Var`], [`SpecialVar`] and [`TermId`].
pub type Idx = u32;

/// An ordinary variable.
///
/// Ordinary variables are the ones that appear in input clauses and get bound by unification in
/// the "user visible" sense.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Var {
    index: Idx,
}

impl Var {
    #[inline]
    pub fn from_index(index: usize) -> Var {
        Var {
            index: index as Idx,
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        self.index as usize
    }
}

impl std::fmt::Debug for Var {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "X{}", self.index)
    }
}

/// A special variable.
///
/// Special variables live in a namespace disjoint from [`Var`] (a different Rust type, so they
/// cannot be confused at the type level) and are reserved for internal substitution slots, e.g.
/// skolemised output-bank placeholders used while applying a substitution.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct SpecialVar {
    index: Idx,
}

impl SpecialVar {
    #[inline]
    pub fn from_index(index: usize) -> SpecialVar {
        SpecialVar {
            index: index as Idx,
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        self.index as usize
    }
}

impl std::fmt::Debug for SpecialVar {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "S{}", self.index)
    }
}

/// A shared term's identity.
///
/// Two terms built through [`TermStore::create`] (or `mk_var`/`mk_special`) have the same `TermId`
/// exactly when they are structurally equal.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct TermId {
    index: Idx,
}

impl TermId {
    #[inline]
    fn from_index(index: usize) -> TermId {
        TermId {
            index: index as Idx,
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        self.index as usize
    }
}

impl std::fmt::Debug for TermId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "t{}", self.index)
    }
}

/// The hash-consing key / underlying shape of a term.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum TermData {
    Var(Var),
    Special(SpecialVar),
    App(FunctionId, Box<[TermId]>),
}

/// Cached, derived metadata for one hash-consed term.
///
/// All fields other than `distinct_vars` are computed once at creation time and never change
/// afterwards (structural sharing means the term itself never changes). `distinct_vars` is
/// computed lazily since it requires a subterm walk that most terms never need (`None` means
/// "not yet computed").
pub struct TermRecord {
    pub data: TermData,
    pub arity: usize,
    pub ground: bool,
    pub weight: u32,
    pub var_occurrences: u32,
    distinct_vars: Cell<Option<u32>>,
    pub commutative: bool,
    pub colour: Colour,
    pub interpreted: bool,
    pub arg_order_hint: u8,
}

/// Hash-consed term store with a signature attached.
///
/// One `TermStore` is owned by a solving [`crate::Context`]-like value (see `saturate`'s
/// `Context`); it is explicitly threaded through rather than kept as a process global, per the
/// "Singletons" design note.
pub struct TermStore {
    signature: Signature,
    terms: Vec<TermRecord>,
    intern: FxHashMap<TermData, TermId>,
}

impl Default for TermStore {
    fn default() -> TermStore {
        TermStore::new()
    }
}

impl TermStore {
    pub fn new() -> TermStore {
        TermStore {
            signature: Signature::new(),
            terms: Vec::new(),
            intern: FxHashMap::default(),
        }
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn signature_mut(&mut self) -> &mut Signature {
        &mut self.signature
    }

    pub fn record(&self, id: TermId) -> &TermRecord {
        &self.terms[id.index()]
    }

    pub fn data(&self, id: TermId) -> &TermData {
        &self.terms[id.index()].data
    }

    pub fn is_ground(&self, id: TermId) -> bool {
        self.terms[id.index()].ground
    }

    pub fn weight(&self, id: TermId) -> u32 {
        self.terms[id.index()].weight
    }

    pub fn args(&self, id: TermId) -> &[TermId] {
        match &self.terms[id.index()].data {
            TermData::App(_, args) => args,
            _ => &[],
        }
    }

    /// Distinct-variable count, computed lazily (see [`TermRecord::distinct_vars`]).
    pub fn distinct_var_count(&self, id: TermId) -> u32 {
        if let Some(count) = self.terms[id.index()].distinct_vars.get() {
            return count;
        }
        let mut seen = rustc_hash::FxHashSet::default();
        self.collect_vars(id, &mut seen);
        let count = seen.len() as u32;
        self.terms[id.index()].distinct_vars.set(Some(count));
        count
    }

    fn collect_vars(&self, id: TermId, seen: &mut rustc_hash::FxHashSet<Var>) {
        match &self.terms[id.index()].data {
            TermData::Var(v) => {
                seen.insert(*v);
            }
            TermData::Special(_) => {}
            TermData::App(_, args) => {
                for &arg in args.iter() {
                    self.collect_vars(arg, seen);
                }
            }
        }
    }

    /// Intern an ordinary variable.
    pub fn mk_var(&mut self, var: Var) -> TermId {
        self.intern_leaf(TermData::Var(var), 1, false)
    }

    /// Intern a special (internal) variable.
    pub fn mk_special(&mut self, var: SpecialVar) -> TermId {
        self.intern_leaf(TermData::Special(var), 1, false)
    }

    fn intern_leaf(&mut self, data: TermData, weight: u32, ground: bool) -> TermId {
        if let Some(&id) = self.intern.get(&data) {
            return id;
        }
        let id = TermId::from_index(self.terms.len());
        self.terms.push(TermRecord {
            data: data.clone(),
            arity: 0,
            ground,
            weight,
            var_occurrences: if ground { 0 } else { 1 },
            distinct_vars: Cell::new(if ground { Some(0) } else { Some(1) }),
            commutative: false,
            colour: Colour::Transparent,
            interpreted: false,
            arg_order_hint: 0,
        });
        self.intern.insert(data, id);
        id
    }

    /// Create a compound term.
    ///
    /// Applies the function symbol's registered commutativity (arguments are sorted by [`TermId`]
    /// before hash-consing, so e.g. `a+b` and `b+a` share an identity) the same way
    /// [`Self::create_literal`] does for commutative literals.
    pub fn create(&mut self, functor: FunctionId, mut args: Vec<TermId>) -> TermId {
        debug_assert_eq!(args.len(), self.signature.function_arity(functor));

        if self.signature.function_is_commutative(functor) {
            args.sort();
        }

        let data = TermData::App(functor, args.into_boxed_slice());
        if let Some(&id) = self.intern.get(&data) {
            return id;
        }

        let args = match &data {
            TermData::App(_, args) => args.clone(),
            _ => unreachable!(),
        };

        let mut ground = true;
        let mut weight = 1u32;
        let mut var_occurrences = 0u32;
        for &arg in args.iter() {
            let rec = &self.terms[arg.index()];
            ground &= rec.ground;
            weight += rec.weight;
            var_occurrences += rec.var_occurrences;
        }

        let colour = self.signature.function_colour(functor);
        let interpreted = args.is_empty() && self.signature.function_is_interpreted(functor);
        let commutative = self.signature.function_is_commutative(functor);
        let arg_order_hint = ((weight.wrapping_add(var_occurrences)) & 0x7) as u8;

        let id = TermId::from_index(self.terms.len());
        self.terms.push(TermRecord {
            data: data.clone(),
            arity: args.len(),
            ground,
            weight,
            var_occurrences,
            distinct_vars: Cell::new(if ground { Some(0) } else { None }),
            commutative,
            colour,
            interpreted,
            arg_order_hint,
        });
        self.intern.insert(data, id);
        id
    }

    /// Whether `id` is a variable (ordinary or special).
    pub fn is_var(&self, id: TermId) -> bool {
        matches!(
            self.terms[id.index()].data,
            TermData::Var(_) | TermData::Special(_)
        )
    }

    pub fn as_var(&self, id: TermId) -> Option<Var> {
        match self.terms[id.index()].data {
            TermData::Var(v) => Some(v),
            _ => None,
        }
    }

    pub fn functor(&self, id: TermId) -> Option<FunctionId> {
        match self.terms[id.index()].data {
            TermData::App(f, _) => Some(f),
            _ => None,
        }
    }

    /// Render a term for diagnostics / proof output, in TPTP-ish notation.
    pub fn display(&self, id: TermId) -> String {
        let mut out = String::new();
        self.display_into(id, &mut out);
        out
    }

    fn display_into(&self, id: TermId, out: &mut String) {
        match &self.terms[id.index()].data {
            TermData::Var(v) => out.push_str(&format!("X{}", v.index())),
            TermData::Special(v) => out.push_str(&format!("$S{}", v.index())),
            TermData::App(f, args) => {
                out.push_str(self.signature.function_name(*f));
                if !args.is_empty() {
                    out.push('(');
                    for (i, &arg) in args.iter().enumerate() {
                        if i > 0 {
                            out.push(',');
                        }
                        self.display_into(arg, out);
                    }
                    out.push(')');
                }
            }
        }
    }
}

/// Shared term-shape generators, exposed so downstream crates (unification, superposition, ...)
/// can build arbitrary interned terms for their own property tests without redeclaring a toy
/// signature each time.
#[cfg(any(test, feature = "proptest-strategies"))]
#[doc(hidden)]
pub mod strategy {
    use super::*;
    use crate::signature::FunctionId;
    use proptest::{prelude::*, *};

    /// A term built from two nullary constants, a unary and a binary functor, before it has been
    /// interned into any particular [`TermStore`].
    #[derive(Clone, Debug)]
    pub enum TermShape {
        Const(bool),
        Var(usize),
        Unary(Box<TermShape>),
        Binary(Box<TermShape>, Box<TermShape>),
    }

    /// The toy signature `term_shape`'s output is built against.
    pub struct TestSignature {
        pub f: FunctionId,
        pub g: FunctionId,
        pub a: FunctionId,
        pub b: FunctionId,
    }

    impl TestSignature {
        pub fn declare(store: &mut TermStore) -> TestSignature {
            TestSignature {
                f: store.signature_mut().declare_function("f", 2),
                g: store.signature_mut().declare_function("g", 1),
                a: store.signature_mut().declare_function("a", 0),
                b: store.signature_mut().declare_function("b", 0),
            }
        }
    }

    /// Intern `shape` under `sig`, sharing whatever substructure the store already has.
    pub fn materialize(store: &mut TermStore, sig: &TestSignature, shape: &TermShape) -> TermId {
        match shape {
            TermShape::Const(false) => store.create(sig.a, vec![]),
            TermShape::Const(true) => store.create(sig.b, vec![]),
            TermShape::Var(index) => store.mk_var(Var::from_index(*index)),
            TermShape::Unary(inner) => {
                let arg = materialize(store, sig, inner);
                store.create(sig.g, vec![arg])
            }
            TermShape::Binary(left, right) => {
                let l = materialize(store, sig, left);
                let r = materialize(store, sig, right);
                store.create(sig.f, vec![l, r])
            }
        }
    }

    /// Terms built only from the two constants: always ground.
    pub fn ground_term_shape() -> impl Strategy<Value = TermShape> {
        let leaf = prop_oneof![Just(TermShape::Const(false)), Just(TermShape::Const(true))];
        leaf.prop_recursive(4, 32, 2, |inner| {
            prop_oneof![
                inner.clone().prop_map(|t| TermShape::Unary(Box::new(t))),
                (inner.clone(), inner).prop_map(|(l, r)| TermShape::Binary(Box::new(l), Box::new(r))),
            ]
        })
    }

    /// Terms that may also mention up to `var_count` distinct variables.
    pub fn term_shape(var_count: usize) -> impl Strategy<Value = TermShape> {
        let leaf = prop_oneof![
            Just(TermShape::Const(false)),
            Just(TermShape::Const(true)),
            (0..var_count.max(1)).prop_map(TermShape::Var),
        ];
        leaf.prop_recursive(4, 32, 2, |inner| {
            prop_oneof![
                inner.clone().prop_map(|t| TermShape::Unary(Box::new(t))),
                (inner.clone(), inner).prop_map(|(l, r)| TermShape::Binary(Box::new(l), Box::new(r))),
            ]
        })
    }

    /// Sum of weights the `create`/`intern_leaf` recurrence would have assigned to `shape`,
    /// computed independently of any [`TermStore`] for use as a proptest oracle.
    pub fn expected_weight(shape: &TermShape) -> u32 {
        match shape {
            TermShape::Const(_) | TermShape::Var(_) => 1,
            TermShape::Unary(inner) => 1 + expected_weight(inner),
            TermShape::Binary(l, r) => 1 + expected_weight(l) + expected_weight(r),
        }
    }

    pub fn shape_is_ground(shape: &TermShape) -> bool {
        match shape {
            TermShape::Const(_) => true,
            TermShape::Var(_) => false,
            TermShape::Unary(inner) => shape_is_ground(inner),
            TermShape::Binary(l, r) => shape_is_ground(l) && shape_is_ground(r),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_consing_identity() {
        let mut store = TermStore::new();
        let f = store.signature_mut().declare_function("f", 1);
        let a = store.signature_mut().declare_function("a", 0);

        let a1 = store.create(a, vec![]);
        let a2 = store.create(a, vec![]);
        assert_eq!(a1, a2);

        let fa1 = store.create(f, vec![a1]);
        let fa2 = store.create(f, vec![a2]);
        assert_eq!(fa1, fa2);

        let x = store.mk_var(Var::from_index(0));
        let fx = store.create(f, vec![x]);
        assert_ne!(fx, fa1);
    }

    #[test]
    fn weight_invariant() {
        let mut store = TermStore::new();
        let f = store.signature_mut().declare_function("f", 2);
        let a = store.signature_mut().declare_function("a", 0);

        let a_id = store.create(a, vec![]);
        assert_eq!(store.weight(a_id), 1);

        let faa = store.create(f, vec![a_id, a_id]);
        assert_eq!(store.weight(faa), 1 + store.weight(a_id) + store.weight(a_id));
    }

    #[test]
    fn ground_flag() {
        let mut store = TermStore::new();
        let f = store.signature_mut().declare_function("f", 1);
        let a = store.signature_mut().declare_function("a", 0);

        let a_id = store.create(a, vec![]);
        let fa = store.create(f, vec![a_id]);
        assert!(store.is_ground(fa));

        let x = store.mk_var(Var::from_index(0));
        let fx = store.create(f, vec![x]);
        assert!(!store.is_ground(fx));
    }

    #[test]
    fn commutative_sharing() {
        let mut store = TermStore::new();
        let plus = store.signature_mut().declare_function("plus", 2);
        store.signature_mut().set_function_commutative(plus, true);
        let a = store.signature_mut().declare_function("a", 0);
        let b = store.signature_mut().declare_function("b", 0);

        let a_id = store.create(a, vec![]);
        let b_id = store.create(b, vec![]);

        let ab = store.create(plus, vec![a_id, b_id]);
        let ba = store.create(plus, vec![b_id, a_id]);
        assert_eq!(ab, ba);
    }

    #[test]
    fn distinct_var_count_lazy() {
        let mut store = TermStore::new();
        let f = store.signature_mut().declare_function("f", 2);
        let x = store.mk_var(Var::from_index(0));
        let y = store.mk_var(Var::from_index(1));

        let fxy = store.create(f, vec![x, y]);
        assert_eq!(store.distinct_var_count(fxy), 2);

        let fxx = store.create(f, vec![x, x]);
        assert_eq!(store.distinct_var_count(fxx), 1);
    }
}

#[cfg(test)]
mod proptests {
    use super::strategy::*;
    use super::*;
    use proptest::{prelude::*, *};

    proptest! {
        #[test]
        fn hash_consing_is_structural(shape in term_shape(3)) {
            let mut store = TermStore::new();
            let sig = TestSignature::declare(&mut store);

            let first = materialize(&mut store, &sig, &shape);
            let second = materialize(&mut store, &sig, &shape);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn weight_matches_recursive_definition(shape in term_shape(3)) {
            let mut store = TermStore::new();
            let sig = TestSignature::declare(&mut store);

            let id = materialize(&mut store, &sig, &shape);
            prop_assert_eq!(store.weight(id), expected_weight(&shape));
        }

        #[test]
        fn ground_flag_matches_shape(shape in term_shape(3)) {
            let mut store = TermStore::new();
            let sig = TestSignature::declare(&mut store);

            let id = materialize(&mut store, &sig, &shape);
            prop_assert_eq!(store.is_ground(id), shape_is_ground(&shape));
            if shape_is_ground(&shape) {
                prop_assert_eq!(store.distinct_var_count(id), 0);
            }
        }

        #[test]
        fn distinct_shapes_with_distinct_top_symbols_never_share_an_id(
                left in ground_term_shape(), right in ground_term_shape()) {
            let mut store = TermStore::new();
            let sig = TestSignature::declare(&mut store);

            let a = materialize(&mut store, &sig, &TermShape::Unary(Box::new(left)));
            let b = materialize(&mut store, &sig, &TermShape::Binary(
                Box::new(TermShape::Const(false)),
                Box::new(right),
            ));
            prop_assert_ne!(a, b, "a unary and a binary application can never share an identity");
        }
    }
}
