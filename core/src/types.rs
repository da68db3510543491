//! Shared primitive types used across the graph engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Dense index into the store's node table. Stable for the lifetime of a load.
pub type NodeId = usize;

/// Dense index into the store's edge table.
pub type EdgeId = usize;

/// The canonical detection run identifier.
pub type RunId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Client,
    Account,
    Bank,
}

impl NodeKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Client  => "Client",
            Self::Account => "Account",
            Self::Bank    => "Bank",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgeKind {
    Owns,
    DomiciledAt,
    TransfersTo,
}

impl EdgeKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Owns        => "OWNS",
            Self::DomiciledAt => "DOMICILED_AT",
            Self::TransfersTo => "TRANSFERS_TO",
        }
    }

    /// The (source, target) node kinds every edge of this kind connects.
    pub fn endpoints(&self) -> (NodeKind, NodeKind) {
        match self {
            Self::Owns        => (NodeKind::Client, NodeKind::Account),
            Self::DomiciledAt => (NodeKind::Account, NodeKind::Bank),
            Self::TransfersTo => (NodeKind::Account, NodeKind::Account),
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Outgoing,
    Incoming,
    Both,
}

/// Final classification written by the last detection stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientStatus {
    Safe,
    Warning,
    Critical,
}

impl ClientStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Safe     => "SAFE",
            Self::Warning  => "WARNING",
            Self::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for ClientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Detection tags appended to a client's flag set.
/// Variants are never reordered: snapshots persist them by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskFlag {
    HighAmount,
    PotentialSmurfing,
    LaunderingCycle,
}

impl RiskFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HighAmount        => "HIGH_AMOUNT",
            Self::PotentialSmurfing => "POTENTIAL_SMURFING",
            Self::LaunderingCycle   => "LAUNDERING_CYCLE",
        }
    }
}

impl fmt::Display for RiskFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a transfer was marked suspicious.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SuspicionReason {
    #[serde(rename = "High Amount")]
    HighAmount,
}

impl SuspicionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HighAmount => "High Amount",
        }
    }
}

impl fmt::Display for SuspicionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Seed risk category delivered with each client record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskCategory {
    Low,
    Medium,
    High,
}
