//! Cycle detector: window bounds, de-duplication, parallel/sequential agreement.

use amlgraph_core::{
    cycle_detector::CycleDetector,
    graph::GraphStore,
    model::{AccountAttrs, EdgeAttrs, NodeAttrs, TransferAttrs},
    types::NodeKind,
};
use chrono::NaiveDate;

fn accounts_graph(accounts: &[&str], transfers: &[(&str, &str)]) -> GraphStore {
    let ts = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap().and_hms_opt(12, 0, 0).unwrap();
    let mut graph = GraphStore::new();
    graph.apply_constraints();
    for a in accounts {
        graph
            .create_node(a, NodeAttrs::Account(AccountAttrs { balance: 0.0, opened_on: None }))
            .unwrap();
    }
    for (i, (from, to)) in transfers.iter().enumerate() {
        graph
            .create_edge(from, to, EdgeAttrs::Transfer(TransferAttrs::new(format!("t{i}"), 100.0, ts)))
            .unwrap();
    }
    graph
}

fn keys(graph: &GraphStore, cycle: &[usize]) -> Vec<String> {
    cycle.iter().map(|&id| graph.key_of(id)).collect()
}

fn ring(names: &[&'static str]) -> Vec<(&'static str, &'static str)> {
    names
        .iter()
        .zip(names.iter().cycle().skip(1))
        .map(|(a, b)| (*a, *b))
        .collect()
}

#[test]
fn detects_rings_of_three_four_and_five() {
    for names in [
        vec!["A", "B", "C"],
        vec!["A", "B", "C", "D"],
        vec!["A", "B", "C", "D", "E"],
    ] {
        let graph = accounts_graph(&names, &ring(&names));
        let report = CycleDetector::new(3, 5).detect(&graph);
        assert_eq!(report.cycles.len(), 1, "ring of {} not found", names.len());
        assert_eq!(report.members.len(), names.len());
    }
}

#[test]
fn ignores_rings_outside_the_window() {
    let two = ["A", "B"];
    let graph = accounts_graph(&two, &ring(&two));
    assert!(CycleDetector::new(3, 5).detect(&graph).cycles.is_empty());

    let six = ["A", "B", "C", "D", "E", "F"];
    let graph = accounts_graph(&six, &ring(&six));
    let report = CycleDetector::new(3, 5).detect(&graph);
    assert!(report.cycles.is_empty(), "6-ring found: {:?}", report.cycles);
    assert!(report.members.is_empty());
}

#[test]
fn window_is_configurable() {
    let six = ["A", "B", "C", "D", "E", "F"];
    let graph = accounts_graph(&six, &ring(&six));
    assert_eq!(CycleDetector::new(3, 6).detect(&graph).cycles.len(), 1);

    let two = ["A", "B"];
    let graph = accounts_graph(&two, &ring(&two));
    assert_eq!(CycleDetector::new(2, 5).detect(&graph).cycles.len(), 1);
}

#[test]
fn parallel_edges_do_not_multiply_cycles() {
    let graph = accounts_graph(
        &["A", "B", "C"],
        &[("A", "B"), ("A", "B"), ("B", "C"), ("C", "A"), ("C", "A")],
    );
    let report = CycleDetector::new(3, 5).detect(&graph);
    assert_eq!(report.cycles.len(), 1);
}

#[test]
fn cycles_are_deduplicated_by_participant_set() {
    // A->B->C->D->A and A->C->B->D->A visit the same four accounts.
    let graph = accounts_graph(
        &["A", "B", "C", "D"],
        &[("A", "B"), ("B", "C"), ("C", "D"), ("D", "A"), ("A", "C"), ("C", "B"), ("B", "D")],
    );
    let report = CycleDetector::new(3, 5).detect(&graph);

    let sets: Vec<Vec<String>> = report.cycles.iter().map(|c| keys(&graph, c)).collect();
    let full = vec!["A".to_string(), "B".to_string(), "C".to_string(), "D".to_string()];
    assert_eq!(
        sets.iter().filter(|s| **s == full).count(),
        1,
        "The 4-account set appears once: {sets:?}"
    );
    let mut sorted = sets.clone();
    sorted.dedup();
    assert_eq!(sorted.len(), sets.len(), "No duplicate participant sets");
}

#[test]
fn overlapping_cycles_share_members() {
    let graph = accounts_graph(
        &["A", "B", "C", "D"],
        &[("A", "B"), ("B", "C"), ("C", "A"), ("B", "D"), ("D", "A")],
    );
    let report = CycleDetector::new(3, 5).detect(&graph);
    assert_eq!(report.cycles.len(), 2);
    assert_eq!(report.members.len(), 4);
    let a = graph.lookup(NodeKind::Account, "A").unwrap();
    assert!(report.contains(a));
}

#[test]
fn tail_into_a_ring_is_not_a_member() {
    let graph = accounts_graph(
        &["T", "A", "B", "C"],
        &[("T", "A"), ("A", "B"), ("B", "C"), ("C", "A")],
    );
    let report = CycleDetector::new(3, 5).detect(&graph);
    let t = graph.lookup(NodeKind::Account, "T").unwrap();
    assert!(!report.contains(t), "An account feeding a ring is not on it");
    assert_eq!(report.members.len(), 3);
}

#[test]
fn parallel_and_sequential_searches_agree() {
    let names: Vec<String> = (0..40).map(|i| format!("ACC{i:02}")).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    // Deterministic pseudo-random wiring.
    let mut transfers = Vec::new();
    let mut x: u64 = 17;
    for _ in 0..160 {
        x = x.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        let from = (x >> 33) as usize % refs.len();
        let to = (x >> 13) as usize % refs.len();
        if from != to {
            transfers.push((refs[from], refs[to]));
        }
    }
    let graph = accounts_graph(&refs, &transfers);

    let parallel = CycleDetector::new(3, 5).with_parallel(true).detect(&graph);
    let sequential = CycleDetector::new(3, 5).with_parallel(false).detect(&graph);
    assert_eq!(parallel, sequential);
    assert!(!parallel.cycles.is_empty(), "Dense random graph should contain a ring");
}
