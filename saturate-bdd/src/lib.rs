//! Reduced, ordered, hash-consed binary decision diagrams.
//!
//! Exposes `true()`, `false()`, `atomic(var, polarity)`, `conjunction(a,b)`, `disjunction(a,b)`,
//! `negation(a)`, `is_true(n)`, `is_false(n)`, and `new_var() -> var_id`. Variables are allocated
//! monotonically by [`Bdd::new_var`]; their meaning (which clause component a variable names) is
//! owned entirely by the splitter, not by this crate.
//!
//! The node table follows the same arena-plus-interning-map idiom as `saturate_formula`'s term
//! store (structural hash-consing, `Vec` arena, `HashMap` for the reverse lookup); binary
//! operations are memoised by `(op, lhs, rhs)` as the Design Notes prescribe, instead of being
//! recomputed on every call.
use rustc_hash::FxHashMap;

/// A BDD variable, allocated monotonically by [`Bdd::new_var`].
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[repr(transparent)]
pub struct BddVar {
    index: u32,
}

impl BddVar {
    #[inline]
    fn from_index(index: u32) -> BddVar {
        BddVar { index }
    }

    #[inline]
    pub fn index(self) -> u32 {
        self.index
    }
}

/// A hash-consed BDD node's identity.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[repr(transparent)]
pub struct NodeId {
    index: u32,
}

impl NodeId {
    /// The constant-false sink. Reserved as index 0, mirroring the term store's convention of
    /// reserving low indices for distinguished values.
    pub const FALSE: NodeId = NodeId { index: 0 };
    /// The constant-true sink, reserved as index 1.
    pub const TRUE: NodeId = NodeId { index: 1 };

    #[inline]
    fn from_index(index: usize) -> NodeId {
        NodeId {
            index: index as u32,
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        self.index as usize
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
enum NodeData {
    Sink(bool),
    Branch {
        var: BddVar,
        low: NodeId,
        high: NodeId,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
enum BinOp {
    And,
    Or,
}

/// Hash-consed reduced ordered BDD store.
///
/// One `Bdd` is owned process-wide , explicitly threaded
/// through rather than kept as a global, exactly like `saturate_formula::TermStore`.
pub struct Bdd {
    nodes: Vec<NodeData>,
    intern: FxHashMap<NodeData, NodeId>,
    next_var: u32,
    bin_memo: FxHashMap<(BinOp, NodeId, NodeId), NodeId>,
    neg_memo: FxHashMap<NodeId, NodeId>,
}

impl Default for Bdd {
    fn default() -> Bdd {
        Bdd::new()
    }
}

impl Bdd {
    pub fn new() -> Bdd {
        let mut nodes = Vec::new();
        nodes.push(NodeData::Sink(false));
        nodes.push(NodeData::Sink(true));
        let mut intern = FxHashMap::default();
        intern.insert(NodeData::Sink(false), NodeId::FALSE);
        intern.insert(NodeData::Sink(true), NodeId::TRUE);

        Bdd {
            nodes,
            intern,
            next_var: 0,
            bin_memo: FxHashMap::default(),
            neg_memo: FxHashMap::default(),
        }
    }

    pub fn truth(&self) -> NodeId {
        NodeId::TRUE
    }

    pub fn falsity(&self) -> NodeId {
        NodeId::FALSE
    }

    pub fn is_true(&self, node: NodeId) -> bool {
        node == NodeId::TRUE
    }

    pub fn is_false(&self, node: NodeId) -> bool {
        node == NodeId::FALSE
    }

    /// Allocate a fresh, previously unused BDD variable, ordered after every existing one.
    pub fn new_var(&mut self) -> BddVar {
        let var = BddVar::from_index(self.next_var);
        self.next_var += 1;
        var
    }

    fn mk_node(&mut self, var: BddVar, low: NodeId, high: NodeId) -> NodeId {
        if low == high {
            return low;
        }
        let data = NodeData::Branch { var, low, high };
        if let Some(&id) = self.intern.get(&data) {
            return id;
        }
        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(data);
        self.intern.insert(data, id);
        id
    }

    /// The literal `var` (if `polarity`) or `!var` (otherwise)
    pub fn atomic(&mut self, var: BddVar, polarity: bool) -> NodeId {
        if polarity {
            self.mk_node(var, NodeId::FALSE, NodeId::TRUE)
        } else {
            self.mk_node(var, NodeId::TRUE, NodeId::FALSE)
        }
    }

    fn node_var(&self, node: NodeId) -> Option<BddVar> {
        match self.nodes[node.index()] {
            NodeData::Branch { var, .. } => Some(var),
            NodeData::Sink(_) => None,
        }
    }

    fn children(&self, node: NodeId, var: BddVar) -> (NodeId, NodeId) {
        match self.nodes[node.index()] {
            NodeData::Branch {
                var: node_var,
                low,
                high,
            } if node_var == var => (low, high),
            _ => (node, node),
        }
    }

    pub fn negation(&mut self, node: NodeId) -> NodeId {
        if let Some(&id) = self.neg_memo.get(&node) {
            return id;
        }
        let result = match self.nodes[node.index()] {
            NodeData::Sink(b) => {
                if b {
                    NodeId::FALSE
                } else {
                    NodeId::TRUE
                }
            }
            NodeData::Branch { var, low, high } => {
                let low = self.negation(low);
                let high = self.negation(high);
                self.mk_node(var, low, high)
            }
        };
        self.neg_memo.insert(node, result);
        result
    }

    fn apply(&mut self, op: BinOp, a: NodeId, b: NodeId) -> NodeId {
        if let Some(&id) = self.bin_memo.get(&(op, a, b)) {
            return id;
        }

        let result = match (self.nodes[a.index()], self.nodes[b.index()]) {
            (NodeData::Sink(x), NodeData::Sink(y)) => {
                let value = match op {
                    BinOp::And => x && y,
                    BinOp::Or => x || y,
                };
                if value {
                    NodeId::TRUE
                } else {
                    NodeId::FALSE
                }
            }
            (NodeData::Sink(x), NodeData::Branch { .. }) => match op {
                BinOp::And if !x => NodeId::FALSE,
                BinOp::And => b,
                BinOp::Or if x => NodeId::TRUE,
                BinOp::Or => b,
            },
            (NodeData::Branch { .. }, NodeData::Sink(y)) => match op {
                BinOp::And if !y => NodeId::FALSE,
                BinOp::And => a,
                BinOp::Or if y => NodeId::TRUE,
                BinOp::Or => a,
            },
            (
                NodeData::Branch { var: va, .. },
                NodeData::Branch { var: vb, .. },
            ) => {
                let var = va.min(vb);
                let (a_low, a_high) = self.children(a, var);
                let (b_low, b_high) = self.children(b, var);
                let low = self.apply(op, a_low, b_low);
                let high = self.apply(op, a_high, b_high);
                self.mk_node(var, low, high)
            }
        };

        self.bin_memo.insert((op, a, b), result);
        result
    }

    pub fn conjunction(&mut self, a: NodeId, b: NodeId) -> NodeId {
        self.apply(BinOp::And, a, b)
    }

    pub fn disjunction(&mut self, a: NodeId, b: NodeId) -> NodeId {
        self.apply(BinOp::Or, a, b)
    }

    pub fn implication(&mut self, a: NodeId, b: NodeId) -> NodeId {
        let not_a = self.negation(a);
        self.disjunction(not_a, b)
    }

    /// The set of variables this node's literal is built over, useful for diagnostics.
    pub fn support(&self, node: NodeId) -> Vec<BddVar> {
        let mut seen = std::collections::BTreeSet::new();
        self.collect_support(node, &mut seen);
        seen.into_iter().collect()
    }

    fn collect_support(&self, node: NodeId, seen: &mut std::collections::BTreeSet<BddVar>) {
        if let NodeData::Branch { var, low, high } = self.nodes[node.index()] {
            seen.insert(var);
            self.collect_support(low, seen);
            self.collect_support(high, seen);
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::{prelude::*, *};

    /// An arbitrary boolean expression over three fixed variables, before it is folded down into
    /// a hash-consed node. Reduction makes two `NodeId`s equal exactly when they denote the same
    /// boolean function, so building a law's two sides from independent shapes and comparing the
    /// resulting `NodeId`s is a direct semantic-equivalence check.
    #[derive(Clone, Debug)]
    enum BoolShape {
        Var(usize),
        Not(Box<BoolShape>),
        And(Box<BoolShape>, Box<BoolShape>),
        Or(Box<BoolShape>, Box<BoolShape>),
    }

    fn bool_shape() -> impl Strategy<Value = BoolShape> {
        let leaf = (0usize..3).prop_map(BoolShape::Var);
        leaf.prop_recursive(4, 32, 2, |inner| {
            prop_oneof![
                inner.clone().prop_map(|s| BoolShape::Not(Box::new(s))),
                (inner.clone(), inner.clone()).prop_map(|(a, b)| BoolShape::And(Box::new(a), Box::new(b))),
                (inner.clone(), inner).prop_map(|(a, b)| BoolShape::Or(Box::new(a), Box::new(b))),
            ]
        })
    }

    fn build(bdd: &mut Bdd, vars: &[BddVar; 3], shape: &BoolShape) -> NodeId {
        match shape {
            BoolShape::Var(i) => bdd.atomic(vars[*i], true),
            BoolShape::Not(inner) => {
                let node = build(bdd, vars, inner);
                bdd.negation(node)
            }
            BoolShape::And(a, b) => {
                let a = build(bdd, vars, a);
                let b = build(bdd, vars, b);
                bdd.conjunction(a, b)
            }
            BoolShape::Or(a, b) => {
                let a = build(bdd, vars, a);
                let b = build(bdd, vars, b);
                bdd.disjunction(a, b)
            }
        }
    }

    proptest! {
        #[test]
        fn conjunction_is_commutative(a in bool_shape(), b in bool_shape()) {
            let mut bdd = Bdd::new();
            let vars = [bdd.new_var(), bdd.new_var(), bdd.new_var()];
            let na = build(&mut bdd, &vars, &a);
            let nb = build(&mut bdd, &vars, &b);
            prop_assert_eq!(bdd.conjunction(na, nb), bdd.conjunction(nb, na));
        }

        #[test]
        fn disjunction_is_commutative(a in bool_shape(), b in bool_shape()) {
            let mut bdd = Bdd::new();
            let vars = [bdd.new_var(), bdd.new_var(), bdd.new_var()];
            let na = build(&mut bdd, &vars, &a);
            let nb = build(&mut bdd, &vars, &b);
            prop_assert_eq!(bdd.disjunction(na, nb), bdd.disjunction(nb, na));
        }

        #[test]
        fn conjunction_is_associative(a in bool_shape(), b in bool_shape(), c in bool_shape()) {
            let mut bdd = Bdd::new();
            let vars = [bdd.new_var(), bdd.new_var(), bdd.new_var()];
            let na = build(&mut bdd, &vars, &a);
            let nb = build(&mut bdd, &vars, &b);
            let nc = build(&mut bdd, &vars, &c);
            let left_first = bdd.conjunction(na, nb);
            let left = bdd.conjunction(left_first, nc);
            let right_first = bdd.conjunction(nb, nc);
            let right = bdd.conjunction(na, right_first);
            prop_assert_eq!(left, right);
        }

        #[test]
        fn de_morgan_over_conjunction(a in bool_shape(), b in bool_shape()) {
            let mut bdd = Bdd::new();
            let vars = [bdd.new_var(), bdd.new_var(), bdd.new_var()];
            let na = build(&mut bdd, &vars, &a);
            let nb = build(&mut bdd, &vars, &b);
            let lhs = {
                let conj = bdd.conjunction(na, nb);
                bdd.negation(conj)
            };
            let rhs = {
                let not_a = bdd.negation(na);
                let not_b = bdd.negation(nb);
                bdd.disjunction(not_a, not_b)
            };
            prop_assert_eq!(lhs, rhs);
        }

        #[test]
        fn double_negation_is_identity(a in bool_shape()) {
            let mut bdd = Bdd::new();
            let vars = [bdd.new_var(), bdd.new_var(), bdd.new_var()];
            let na = build(&mut bdd, &vars, &a);
            let negated_twice = bdd.negation(bdd.negation(na));
            prop_assert_eq!(na, negated_twice);
        }

        #[test]
        fn disjunction_absorbs_conjunction_with_shared_operand(a in bool_shape(), b in bool_shape()) {
            let mut bdd = Bdd::new();
            let vars = [bdd.new_var(), bdd.new_var(), bdd.new_var()];
            let na = build(&mut bdd, &vars, &a);
            let nb = build(&mut bdd, &vars, &b);
            let conj = bdd.conjunction(na, nb);
            let absorbed = bdd.disjunction(na, conj);
            prop_assert_eq!(absorbed, na);
        }
    }
}
