//! Query surface: flagged list, client view, bounded subgraph.

use amlgraph_core::{
    config::AppConfig,
    error::GraphError,
    ingest::{AccountRecord, ClientRecord, RecordBatches, TransactionRecord},
    types::{ClientStatus, EdgeKind, NodeKind, RiskFlag},
    AmlGraph,
};
use chrono::NaiveDate;

fn client(id: &str, name: &str) -> ClientRecord {
    ClientRecord {
        client_id: id.to_string(),
        name: name.to_string(),
        address: Some("3 rue Carnot, 69001 Lyon".to_string()),
        birth_date: NaiveDate::from_ymd_opt(1980, 6, 1),
        risk_category: None,
    }
}

fn account(iban: &str, owner: &str, bank: &str) -> AccountRecord {
    AccountRecord {
        account_id: iban.to_string(),
        client_id: owner.to_string(),
        bank_name: bank.to_string(),
        balance: 2_500.0,
        creation_date: None,
    }
}

fn transfer(id: &str, from: &str, to: &str, amount: f64) -> TransactionRecord {
    TransactionRecord {
        tx_id: id.to_string(),
        sender_iban: from.to_string(),
        receiver_iban: to.to_string(),
        amount,
        date: NaiveDate::from_ymd_opt(2024, 2, 2).unwrap().and_hms_opt(16, 0, 0).unwrap(),
        currency: "EUR".to_string(),
    }
}

/// alice: FR76AAAA0001 --> bob: FR76BBBB0001 --> carol: FR76CCCC0001 --> dave: FR76DDDD0001
/// with alice also receiving from erin and a 15000 transfer alice -> bob.
fn network() -> AmlGraph {
    let batches = RecordBatches {
        clients: vec![
            client("alice", "Alice Martin"),
            client("bob", "Bob Durand"),
            client("carol", "Carol Petit"),
            client("dave", "Dave Roux"),
            client("erin", "Erin Blanc"),
        ],
        accounts: vec![
            account("FR76AAAA0001", "alice", "Banque Nord"),
            account("FR76AAAA0002", "alice", "Banque Sud"),
            account("FR76BBBB0001", "bob", "Banque Nord"),
            account("FR76CCCC0001", "carol", "Banque Est"),
            account("FR76DDDD0001", "dave", "Banque Ouest"),
            account("FR76EEEE0001", "erin", "Banque Nord"),
        ],
        transactions: vec![
            transfer("t1", "FR76AAAA0001", "FR76BBBB0001", 15_000.0),
            transfer("t2", "FR76BBBB0001", "FR76CCCC0001", 200.0),
            transfer("t3", "FR76CCCC0001", "FR76DDDD0001", 200.0),
            transfer("t4", "FR76EEEE0001", "FR76AAAA0001", 300.0),
        ],
    };
    let mut aml = AmlGraph::new(AppConfig::default()).unwrap();
    aml.apply_constraints();
    aml.load(&batches).unwrap();
    aml.run_detection().unwrap();
    aml
}

// ── Flagged list and client view ───────────────────────────────────

#[test]
fn flagged_clients_ordered_by_score_then_id() {
    let batches = RecordBatches {
        clients: vec![client("z", "Zoe"), client("y", "Yann"), client("x", "Xavier"), client("w", "Will")],
        accounts: vec![
            account("FRZ", "z", "B"),
            account("FRY", "y", "B"),
            account("FRX", "x", "B"),
            account("FRW", "w", "B"),
        ],
        transactions: vec![
            transfer("t1", "FRZ", "FRW", 10_000.0),
            transfer("t2", "FRY", "FRW", 10_000.0),
            transfer("t3", "FRX", "FRW", 10_000.0),
            transfer("t4", "FRX", "FRW", 10_000.0),
        ],
    };
    let mut aml = AmlGraph::new(AppConfig::default()).unwrap();
    aml.apply_constraints();
    aml.load(&batches).unwrap();
    aml.run_detection().unwrap();

    let flagged = aml.list_flagged_clients(None);
    let ids: Vec<&str> = flagged.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["x", "y", "z"], "40 first, then 20s by id; w has score 0");
    assert_eq!(flagged[0].risk_score, 40);
    assert_eq!(flagged[0].status, Some(ClientStatus::Warning));

    assert_eq!(aml.list_flagged_clients(Some(2)).len(), 2);
    assert!(aml.list_flagged_clients(Some(0)).is_empty());
}

#[test]
fn get_client_returns_full_record() {
    let aml = network();
    let alice = aml.get_client("alice").expect("alice exists");

    assert_eq!(alice.name, "Alice Martin");
    assert_eq!(alice.address.as_deref(), Some("3 rue Carnot, 69001 Lyon"));
    assert_eq!(alice.risk_score, 20);
    assert_eq!(alice.flags, vec![RiskFlag::HighAmount]);
    assert_eq!(alice.status, Some(ClientStatus::Warning));
    let ibans: Vec<&str> = alice.accounts.iter().map(|a| a.iban.as_str()).collect();
    assert_eq!(ibans, vec!["FR76AAAA0001", "FR76AAAA0002"]);
    assert_eq!(alice.accounts[1].bank.as_deref(), Some("Banque Sud"));

    assert!(aml.get_client("nobody").is_none());
}

// ── Subgraph ───────────────────────────────────────────────────────

#[test]
fn subgraph_covers_two_hops_in_both_directions() {
    let aml = network();
    let sub = aml.get_subgraph("alice").expect("subgraph");

    assert!(sub.contains(NodeKind::Client, "alice"));
    assert!(sub.contains(NodeKind::Account, "FR76AAAA0001"));
    assert!(sub.contains(NodeKind::Account, "FR76AAAA0002"), "Idle owned account is included");
    assert!(sub.contains(NodeKind::Account, "FR76BBBB0001"), "1 hop outgoing");
    assert!(sub.contains(NodeKind::Account, "FR76CCCC0001"), "2 hops outgoing");
    assert!(!sub.contains(NodeKind::Account, "FR76DDDD0001"), "3 hops is out of range");
    assert!(sub.contains(NodeKind::Account, "FR76EEEE0001"), "1 hop incoming");
    assert!(!sub.contains(NodeKind::Client, "bob"), "Only the requested client is expanded");

    assert!(sub.contains(NodeKind::Bank, "Banque Nord"));
    assert!(sub.contains(NodeKind::Bank, "Banque Sud"));
    assert!(sub.contains(NodeKind::Bank, "Banque Est"), "Bank of a 2-hop account");
    assert!(!sub.contains(NodeKind::Bank, "Banque Ouest"));
    assert!(!sub.truncated);
}

#[test]
fn subgraph_edges_carry_relationship_and_suspicion() {
    let aml = network();
    let sub = aml.get_subgraph("alice").unwrap();

    let owns = sub.edges.iter().filter(|e| e.kind == EdgeKind::Owns).count();
    assert_eq!(owns, 2);

    let t1 = aml.graph().transfer("t1").unwrap().id;
    let hot = sub.edges.iter().find(|e| e.id == t1).expect("t1 included");
    assert!(hot.is_suspicious);
    assert_eq!(hot.color, "#F7A7A6");
    assert_eq!(hot.label, "TRANSFERS_TO");

    let cold = sub
        .edges
        .iter()
        .find(|e| e.kind == EdgeKind::TransfersTo && !e.is_suspicious)
        .expect("a normal transfer");
    assert_eq!(cold.color, "#cccccc");
}

#[test]
fn presentation_hints_follow_kind_and_status() {
    let aml = network();
    let sub = aml.get_subgraph("alice").unwrap();

    let alice = sub.nodes.iter().find(|n| n.key == "alice").unwrap();
    assert_eq!(alice.hint.category, "Client");
    assert_eq!(alice.hint.label, "Alice Martin");
    assert_eq!(alice.hint.color, "#FFA94D", "WARNING client");
    assert_eq!(alice.hint.size, 30);

    let account = sub.nodes.iter().find(|n| n.key == "FR76AAAA0001").unwrap();
    assert_eq!(account.hint.label, "FR76AAAA...");
    assert_eq!(account.hint.color, "#FFD166");
    assert_eq!(account.hint.size, 25);

    let bank = sub.nodes.iter().find(|n| n.kind == NodeKind::Bank).unwrap();
    assert_eq!(bank.hint.color, "#118AB2");

    let dave = aml.get_subgraph("dave").unwrap();
    let dave_node = dave.nodes.iter().find(|n| n.key == "dave").unwrap();
    assert_eq!(dave_node.hint.color, "#4AD395", "Unclassified client");
}

#[test]
fn subgraph_is_capped_at_max_paths() {
    let hub = "FR76HUB00001";
    let mut batches = RecordBatches {
        clients: vec![client("hub", "Hub Owner"), client("spoke", "Spoke Owner")],
        accounts: vec![account(hub, "hub", "Banque Nord")],
        transactions: vec![],
    };
    for i in 0..80 {
        let iban = format!("FR76SPOKE{i:03}");
        batches.accounts.push(account(&iban, "spoke", "Banque Nord"));
        batches.transactions.push(transfer(&format!("s{i}"), hub, &iban, 100.0));
    }
    let mut config = AppConfig::default();
    config.subgraph.max_paths = 10;
    let mut aml = AmlGraph::new(config).unwrap();
    aml.apply_constraints();
    aml.load(&batches).unwrap();

    let sub = aml.get_subgraph("hub").unwrap();
    assert_eq!(sub.paths, 10);
    assert!(sub.truncated);
    let spokes = sub.nodes.iter().filter(|n| n.key.starts_with("FR76SPOKE")).count();
    assert!(spokes <= 10, "{spokes} spokes exceed the cap");
}

#[test]
fn unknown_client_subgraph_is_an_error() {
    let aml = network();
    let err = aml.get_subgraph("nobody").unwrap_err();
    assert!(matches!(err, GraphError::UnknownReference { .. }), "got {err:?}");
}

#[test]
fn extraction_does_not_mutate_risk_fields() {
    let aml = network();
    let before = aml.graph().snapshot();
    aml.get_subgraph("alice").unwrap();
    aml.get_subgraph("bob").unwrap();
    assert_eq!(aml.graph().snapshot(), before);
}
