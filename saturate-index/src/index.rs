//! The literal indexing structure contract and its default header-bucketed implementation.
use std::hash::Hash;

use rustc_hash::FxHashMap;
use saturate_formula::{Literal, TermId, TermStore, Var};
use saturate_unify::{unify_args, Bank, Substitution, Trail};

use crate::matching::one_way_match_args;

/// One retrieval result: the stored literal and clause handle, plus the bindings connecting it
/// to the query. `B` is [`Substitution`] for unification queries and a plain variable map for
/// matching queries (generalisations/instances), since those never need trail-backed bindings.
#[derive(Debug)]
pub struct Match<C, B> {
    pub lit: Literal,
    pub clause: C,
    pub bindings: B,
}

/// A one-way variable binding produced by [`LiteralIndexingStructure::get_generalizations`] or
/// [`LiteralIndexingStructure::get_instances`].
pub type PatternBindings = FxHashMap<Var, TermId>;

/// Literal storage supporting unification, generalisation and instance retrieval, with the
/// invariant that every stored literal is returned at most once per query.
pub trait LiteralIndexingStructure<C: Copy + Eq + Hash> {
    fn insert(&mut self, lit: Literal, clause: C);
    fn remove(&mut self, lit: Literal, clause: C);

    /// Literals unifiable with `query`. When `complementary` is set, literals are matched against
    /// `query`'s complementary header (used to find resolution partners).
    fn get_unifications(
        &self,
        store: &TermStore,
        query: Literal,
        complementary: bool,
    ) -> Vec<Match<C, Substitution>>;

    /// Stored literals that are generalisations of `query` (`query` is an instance of them).
    fn get_generalizations(&self, store: &TermStore, query: Literal) -> Vec<Match<C, PatternBindings>>;

    /// Stored literals that are instances of `query` (`query` is a generalisation of them).
    fn get_instances(&self, store: &TermStore, query: Literal) -> Vec<Match<C, PatternBindings>>;

    /// Every stored `(literal, clause)` pair, in no particular order.
    fn get_all(&self) -> Vec<(Literal, C)>;
}

/// Default `LiteralIndexingStructure`: literals are bucketed by [`Literal::header`], and each
/// query does a linear scan of the relevant bucket. Simple, and exactly the fallback the Design
/// Notes call for "a trait-object hook for user extensions" to improve on (e.g. a discrimination
/// tree) without the rest of the workspace depending on which one is in use.
pub struct HeaderIndex<C> {
    buckets: FxHashMap<u64, Vec<(Literal, C)>>,
}

// Written by hand rather than `#[derive(Default)]`: the derive would add a spurious `C: Default`
// bound, even though an empty map never needs one.
impl<C> Default for HeaderIndex<C> {
    fn default() -> HeaderIndex<C> {
        HeaderIndex {
            buckets: FxHashMap::default(),
        }
    }
}

impl<C: Copy + Eq + Hash> HeaderIndex<C> {
    pub fn new() -> HeaderIndex<C> {
        HeaderIndex::default()
    }
}

impl<C: Copy + Eq + Hash> LiteralIndexingStructure<C> for HeaderIndex<C> {
    fn insert(&mut self, lit: Literal, clause: C) {
        self.buckets
            .entry(lit.header())
            .or_insert_with(Vec::new)
            .push((lit, clause));
    }

    fn remove(&mut self, lit: Literal, clause: C) {
        if let Some(bucket) = self.buckets.get_mut(&lit.header()) {
            if let Some(pos) = bucket
                .iter()
                .position(|&(stored_lit, stored_clause)| stored_lit == lit && stored_clause == clause)
            {
                bucket.swap_remove(pos);
            }
        }
    }

    fn get_unifications(
        &self,
        store: &TermStore,
        query: Literal,
        complementary: bool,
    ) -> Vec<Match<C, Substitution>> {
        let header = if complementary {
            query.complementary_header()
        } else {
            query.header()
        };
        let mut results = Vec::new();
        let bucket = match self.buckets.get(&header) {
            Some(bucket) => bucket,
            None => return results,
        };

        for &(lit, clause) in bucket {
            let mut subst = Substitution::new();
            let mut trail = Trail::new();
            let checkpoint = trail.checkpoint();
            let unified = unify_args(
                store,
                &mut subst,
                &mut trail,
                query.args(store),
                Bank::GOAL,
                lit.args(store),
                Bank::INDEXED,
            );
            trail.commit(checkpoint);
            if unified {
                results.push(Match {
                    lit,
                    clause,
                    bindings: subst,
                });
            }
        }
        results
    }

    fn get_generalizations(&self, store: &TermStore, query: Literal) -> Vec<Match<C, PatternBindings>> {
        let mut results = Vec::new();
        let bucket = match self.buckets.get(&query.header()) {
            Some(bucket) => bucket,
            None => return results,
        };
        for &(lit, clause) in bucket {
            // `lit` (stored) is the pattern, `query` is the rigid instance.
            if let Some(bindings) = one_way_match_args(store, lit.args(store), query.args(store)) {
                results.push(Match {
                    lit,
                    clause,
                    bindings,
                });
            }
        }
        results
    }

    fn get_instances(&self, store: &TermStore, query: Literal) -> Vec<Match<C, PatternBindings>> {
        let mut results = Vec::new();
        let bucket = match self.buckets.get(&query.header()) {
            Some(bucket) => bucket,
            None => return results,
        };
        for &(lit, clause) in bucket {
            // `query` is the pattern, `lit` (stored) is the rigid instance.
            if let Some(bindings) = one_way_match_args(store, query.args(store), lit.args(store)) {
                results.push(Match {
                    lit,
                    clause,
                    bindings,
                });
            }
        }
        results
    }

    fn get_all(&self) -> Vec<(Literal, C)> {
        self.buckets
            .values()
            .flat_map(|bucket| bucket.iter().copied())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use saturate_formula::{PredicateId, TermStore, Var};

    #[test]
    fn insert_then_unification_finds_complementary_literal() {
        let mut store = TermStore::new();
        let p = store.signature_mut().declare_predicate("p", 1);
        let a = store.signature_mut().declare_function("a", 0);
        let a_id = store.create(a, vec![]);
        let x = store.mk_var(Var::from_index(0));

        let pos = store.create_literal(p, true, false, vec![a_id]);
        let neg_query = store.create_literal(p, false, false, vec![x]);

        let mut index = HeaderIndex::new();
        index.insert(pos, 1u32);

        let matches = index.get_unifications(&store, neg_query, true);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].clause, 1);
    }

    #[test]
    fn remove_drops_only_the_matching_pair() {
        let mut store = TermStore::new();
        let p = store.signature_mut().declare_predicate("p", 0);
        let lit = store.create_literal(p, true, false, vec![]);

        let mut index: HeaderIndex<u32> = HeaderIndex::new();
        index.insert(lit, 1);
        index.insert(lit, 2);
        index.remove(lit, 1);

        let all = index.get_all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].1, 2);
    }

    #[test]
    fn generalizations_and_instances_are_dual() {
        let mut store = TermStore::new();
        let p = store.signature_mut().declare_predicate("p", 1);
        let f = store.signature_mut().declare_function("f", 1);
        let a = store.signature_mut().declare_function("a", 0);
        let a_id = store.create(a, vec![]);
        let fa = store.create(f, vec![a_id]);
        let x = store.mk_var(Var::from_index(0));
        let fx = store.create(f, vec![x]);

        let general = store.create_literal(p, true, false, vec![fx]);
        let specific = store.create_literal(p, true, false, vec![fa]);

        let mut index = HeaderIndex::new();
        index.insert(general, "rule");

        let generalizations = index.get_generalizations(&store, specific);
        assert_eq!(generalizations.len(), 1);

        let mut index2 = HeaderIndex::new();
        index2.insert(specific, "fact");
        let instances = index2.get_instances(&store, general);
        assert_eq!(instances.len(), 1);
    }

    #[test]
    fn equality_predicate_is_reserved_index_zero() {
        assert_eq!(PredicateId::equality().index(), 0);
    }
}
