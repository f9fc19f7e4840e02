//! Property-based tests for CRDT correctness.
//!
//! These tests verify the laws every replica relies on to converge:
//! - Commutativity: merge(A, B) == merge(B, A)
//! - Associativity: merge(merge(A, B), C) == merge(A, merge(B, C))
//! - Idempotence: merge(A, A) == A
//!
//! "Equal" here means equal resolved state. Insertion order inside a set may
//! differ between replicas, so states are compared after sorting.

use lwwes_crdt::{Element, ElementSet, Graph, NodeId, Set};
use proptest::prelude::*;

// =============================================================================
// HELPER STRATEGIES
// =============================================================================

fn key_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["a", "b", "c", "d", "e"]).prop_map(str::to_owned)
}

fn element_strategy() -> impl Strategy<Value = Element<String>> {
    (key_strategy(), 0i64..50).prop_map(|(key, ts)| Element::new(key, ts))
}

fn set_strategy() -> impl Strategy<Value = Set<String>> {
    prop::collection::vec(element_strategy(), 0..20).prop_map(|elements| {
        let mut set = Set::new();
        for element in elements {
            set.add(element);
        }
        set
    })
}

#[derive(Debug, Clone)]
enum Op {
    Add(String, i64),
    Remove(String, i64),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (key_strategy(), 0i64..50).prop_map(|(k, t)| Op::Add(k, t)),
        (key_strategy(), 0i64..50).prop_map(|(k, t)| Op::Remove(k, t)),
    ]
}

fn element_set_from(ops: &[Op]) -> ElementSet<String> {
    let es = ElementSet::new();
    for op in ops {
        match op {
            Op::Add(k, t) => {
                es.add_data(k.clone(), *t);
            }
            Op::Remove(k, t) => {
                es.remove_data(k.clone(), *t);
            }
        }
    }
    es
}

fn resolved(set: &Set<String>) -> Vec<Element<String>> {
    let mut elements = set.elements().to_vec();
    elements.sort_by(|a, b| a.data().cmp(b.data()));
    elements
}

fn members(es: &ElementSet<String>) -> Vec<Element<String>> {
    let mut elements = es.lookup_all();
    elements.sort_by(|a, b| a.data().cmp(b.data()));
    elements
}

#[derive(Debug, Clone)]
enum GraphOp {
    Add(String, String, i64),
    Remove(String, String, i64),
}

fn graph_op_strategy() -> impl Strategy<Value = GraphOp> {
    let node = prop::sample::select(vec!["n0", "n1", "n2", "n3", "n4"]).prop_map(str::to_owned);
    let parent =
        prop::sample::select(vec![NodeId::ROOT, "n0", "n1", "n2", "n3"]).prop_map(str::to_owned);
    (any::<bool>(), node, parent, 2i64..40).prop_map(|(add, node, parent, ts)| {
        if add {
            GraphOp::Add(node, parent, ts)
        } else {
            GraphOp::Remove(node, parent, ts)
        }
    })
}

fn graph_from(ops: &[GraphOp]) -> Graph {
    let graph = Graph::new();
    for op in ops {
        let result = match op {
            GraphOp::Add(node, parent, ts) => graph.add_node(node.as_str(), parent.as_str(), *ts),
            GraphOp::Remove(node, parent, ts) => {
                graph.remove_node(node.as_str(), parent.as_str(), *ts)
            }
        };
        result.unwrap();
    }
    graph
}

fn view(graph: &Graph) -> Vec<(NodeId, NodeId)> {
    let mut pairs = graph.query_all_nodes().edges();
    pairs.sort();
    pairs
}

// =============================================================================
// SET PROPERTY TESTS
// =============================================================================

mod set_properties {
    use super::*;

    proptest! {
        #[test]
        fn add_is_idempotent(set in set_strategy(), element in element_strategy()) {
            let mut once = set.clone();
            once.add(element.clone());
            let mut twice = once.clone();
            twice.add(element);
            prop_assert_eq!(once.elements(), twice.elements());
        }

        #[test]
        fn add_keeps_latest_timestamp(key in key_strategy(), t1 in 0i64..100, t2 in 0i64..100) {
            let mut set = Set::new();
            set.add(Element::new(key.clone(), t1));
            set.add(Element::new(key.clone(), t2));
            prop_assert_eq!(set.len(), 1);
            prop_assert_eq!(set.find(&key).unwrap().timestamp().value(), t1.max(t2));
        }

        #[test]
        fn union_is_commutative(a in set_strategy(), b in set_strategy()) {
            prop_assert_eq!(resolved(&a.union(&b)), resolved(&b.union(&a)));
        }

        #[test]
        fn union_is_associative(a in set_strategy(), b in set_strategy(), c in set_strategy()) {
            let left = a.union(&b).union(&c);
            let right = a.union(&b.union(&c));
            prop_assert_eq!(resolved(&left), resolved(&right));
        }

        #[test]
        fn union_is_idempotent(a in set_strategy()) {
            let union = a.union(&a);
            prop_assert_eq!(union.elements(), a.elements());
        }
    }
}

// =============================================================================
// ELEMENT SET PROPERTY TESTS
// =============================================================================

mod element_set_properties {
    use super::*;

    proptest! {
        #[test]
        fn merge_is_commutative(
            ops_a in prop::collection::vec(op_strategy(), 0..30),
            ops_b in prop::collection::vec(op_strategy(), 0..30),
        ) {
            let ab = element_set_from(&ops_a);
            ab.merge(&element_set_from(&ops_b));
            let ba = element_set_from(&ops_b);
            ba.merge(&element_set_from(&ops_a));
            prop_assert_eq!(members(&ab), members(&ba));
        }

        #[test]
        fn merge_is_associative(
            ops_a in prop::collection::vec(op_strategy(), 0..20),
            ops_b in prop::collection::vec(op_strategy(), 0..20),
            ops_c in prop::collection::vec(op_strategy(), 0..20),
        ) {
            let left = element_set_from(&ops_a);
            left.merge(&element_set_from(&ops_b));
            left.merge(&element_set_from(&ops_c));

            let bc = element_set_from(&ops_b);
            bc.merge(&element_set_from(&ops_c));
            let right = element_set_from(&ops_a);
            right.merge(&bc);

            prop_assert_eq!(members(&left), members(&right));
        }

        #[test]
        fn merge_is_idempotent(ops in prop::collection::vec(op_strategy(), 0..30)) {
            let es = element_set_from(&ops);
            let before = members(&es);
            es.merge(&es.clone());
            prop_assert_eq!(members(&es), before);
        }

        #[test]
        fn remove_is_gated_on_observed_add(
            key in key_strategy(),
            add_ts in 0i64..50,
            remove_ts in 0i64..50,
        ) {
            let es = ElementSet::new();
            es.add_data(key.clone(), add_ts);
            let accepted = es.remove_data(key.clone(), remove_ts);
            prop_assert_eq!(accepted, add_ts <= remove_ts);
            // Ties favor the add.
            prop_assert_eq!(es.contains(&key), remove_ts <= add_ts);
        }
    }
}

// =============================================================================
// GRAPH PROPERTY TESTS
// =============================================================================

mod graph_properties {
    use super::*;

    proptest! {
        #[test]
        fn merged_replicas_show_same_tree(
            ops_a in prop::collection::vec(graph_op_strategy(), 0..25),
            ops_b in prop::collection::vec(graph_op_strategy(), 0..25),
        ) {
            let a = graph_from(&ops_a);
            let b = graph_from(&ops_b);
            a.merge(&b);
            b.merge(&a);
            prop_assert_eq!(view(&a), view(&b));
        }

        #[test]
        fn view_never_contains_duplicate_nodes(
            ops in prop::collection::vec(graph_op_strategy(), 0..40),
        ) {
            let tree = graph_from(&ops).query_all_nodes();
            let mut children: Vec<NodeId> = tree.edges().into_iter().map(|(_, to)| to).collect();
            let total = children.len();
            children.sort();
            children.dedup();
            prop_assert_eq!(children.len(), total);
            prop_assert_eq!(tree.node_count(), total + 1);
        }
    }
}
