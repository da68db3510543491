//! Read-only views for the visualization consumer.

use crate::{
    graph::GraphStore,
    model::Node,
    types::{ClientStatus, Direction, EdgeKind, NodeKind, RiskCategory, RiskFlag},
};
use chrono::NaiveDate;
use serde::Serialize;

/// Sidebar length used when the caller gives no limit.
pub const DEFAULT_FLAGGED_LIMIT: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlaggedClient {
    pub id: String,
    pub name: String,
    pub risk_score: u32,
    pub status: Option<ClientStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountView {
    pub iban: String,
    pub balance: f64,
    pub bank: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientView {
    pub id: String,
    pub name: String,
    pub address: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub risk_category: Option<RiskCategory>,
    pub risk_score: u32,
    pub status: Option<ClientStatus>,
    pub flags: Vec<RiskFlag>,
    pub accounts: Vec<AccountView>,
}

/// Clients with a positive score, highest first; ties by id ascending.
pub fn list_flagged_clients(graph: &GraphStore, limit: usize) -> Vec<FlaggedClient> {
    let mut flagged: Vec<FlaggedClient> = graph
        .nodes_of_kind(NodeKind::Client)
        .filter_map(|node| {
            let client = node.attrs.as_client()?;
            (client.risk_score > 0).then(|| FlaggedClient {
                id: node.key.clone(),
                name: client.name.clone(),
                risk_score: client.risk_score,
                status: client.status,
            })
        })
        .collect();
    flagged.sort_by(|a, b| b.risk_score.cmp(&a.risk_score).then_with(|| a.id.cmp(&b.id)));
    flagged.truncate(limit);
    flagged
}

pub fn get_client(graph: &GraphStore, client_id: &str) -> Option<ClientView> {
    let node = graph.node_by_key(NodeKind::Client, client_id)?;
    let client = node.attrs.as_client()?;
    let accounts = graph
        .edges_of(node.id, EdgeKind::Owns, Direction::Outgoing)
        .filter_map(|owns| graph.node(owns.to))
        .map(|account| account_view(graph, account))
        .collect();

    Some(ClientView {
        id: node.key.clone(),
        name: client.name.clone(),
        address: client.address.clone(),
        birth_date: client.birth_date,
        risk_category: client.risk_category,
        risk_score: client.risk_score,
        status: client.status,
        flags: client.flags.clone(),
        accounts,
    })
}

fn account_view(graph: &GraphStore, account: &Node) -> AccountView {
    AccountView {
        iban: account.key.clone(),
        balance: account.attrs.as_account().map_or(0.0, |a| a.balance),
        bank: graph.bank_of(account.id).ok().map(|bank| graph.key_of(bank)),
    }
}
