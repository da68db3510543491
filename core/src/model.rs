//! Node and edge payloads held by the graph store.
//!
//! Only two payloads carry mutable state: `ClientAttrs` (risk accumulator,
//! status, flags) and `TransferAttrs` (suspicion flag and reason). Both are
//! written exclusively by the detection engine.

use crate::types::{
    ClientStatus, EdgeId, EdgeKind, NodeId, NodeKind, RiskCategory, RiskFlag, SuspicionReason,
};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientAttrs {
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub risk_category: Option<RiskCategory>,
    #[serde(default)]
    pub risk_score: u32,
    #[serde(default)]
    pub status: Option<ClientStatus>,
    #[serde(default)]
    pub flags: Vec<RiskFlag>,
}

impl ClientAttrs {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: None,
            birth_date: None,
            risk_category: None,
            risk_score: 0,
            status: None,
            flags: Vec::new(),
        }
    }

    /// Append a flag unless already present. Returns true when appended.
    pub fn add_flag(&mut self, flag: RiskFlag) -> bool {
        if self.flags.contains(&flag) {
            return false;
        }
        self.flags.push(flag);
        true
    }

    pub fn has_flag(&self, flag: RiskFlag) -> bool {
        self.flags.contains(&flag)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountAttrs {
    pub balance: f64,
    #[serde(default)]
    pub opened_on: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BankAttrs {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeAttrs {
    Client(ClientAttrs),
    Account(AccountAttrs),
    Bank(BankAttrs),
}

impl NodeAttrs {
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Client(_)  => NodeKind::Client,
            Self::Account(_) => NodeKind::Account,
            Self::Bank(_)    => NodeKind::Bank,
        }
    }

    pub fn as_client(&self) -> Option<&ClientAttrs> {
        match self {
            Self::Client(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_account(&self) -> Option<&AccountAttrs> {
        match self {
            Self::Account(a) => Some(a),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferAttrs {
    pub id: String,
    pub amount: f64,
    pub timestamp: NaiveDateTime,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub is_suspicious: bool,
    #[serde(default)]
    pub reason: Option<SuspicionReason>,
}

fn default_currency() -> String {
    "EUR".to_string()
}

impl TransferAttrs {
    pub fn new(id: impl Into<String>, amount: f64, timestamp: NaiveDateTime) -> Self {
        Self {
            id: id.into(),
            amount,
            timestamp,
            currency: default_currency(),
            is_suspicious: false,
            reason: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EdgeAttrs {
    Owns,
    DomiciledAt,
    Transfer(TransferAttrs),
}

impl EdgeAttrs {
    pub fn kind(&self) -> EdgeKind {
        match self {
            Self::Owns        => EdgeKind::Owns,
            Self::DomiciledAt => EdgeKind::DomiciledAt,
            Self::Transfer(_) => EdgeKind::TransfersTo,
        }
    }

    pub fn as_transfer(&self) -> Option<&TransferAttrs> {
        match self {
            Self::Transfer(t) => Some(t),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub key: String,
    pub attrs: NodeAttrs,
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        self.attrs.kind()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub id: EdgeId,
    pub from: NodeId,
    pub to: NodeId,
    pub attrs: EdgeAttrs,
}

impl Edge {
    pub fn kind(&self) -> EdgeKind {
        self.attrs.kind()
    }

    /// The endpoint on the far side of `node`.
    pub fn other(&self, node: NodeId) -> NodeId {
        if self.from == node { self.to } else { self.from }
    }
}
