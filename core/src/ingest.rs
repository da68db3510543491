//! Batch ingestion: clients, then accounts, then transfers.
//!
//! Each batch is applied in fixed-size chunks. Per-record failures
//! (duplicate key, unknown IBAN, self-loop) skip the record and are counted
//! in the report. A missing owner client on an account is fatal; the chunk
//! containing it is validated before any of its records are applied, so a
//! fatal error never leaves half a chunk in the graph.

use crate::{
    abort::AbortSignal,
    config::IngestConfig,
    error::{GraphError, GraphResult},
    graph::GraphStore,
    model::{AccountAttrs, BankAttrs, ClientAttrs, EdgeAttrs, NodeAttrs, TransferAttrs},
    types::{NodeKind, RiskCategory},
};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ── Input records ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientRecord {
    pub client_id: String,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default, alias = "risk_score")]
    pub risk_category: Option<RiskCategory>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub account_id: String,
    pub client_id: String,
    pub bank_name: String,
    pub balance: f64,
    #[serde(default)]
    pub creation_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub tx_id: String,
    pub sender_iban: String,
    pub receiver_iban: String,
    pub amount: f64,
    pub date: NaiveDateTime,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "EUR".to_string()
}

/// The three ordered batches delivered by the data source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordBatches {
    pub clients: Vec<ClientRecord>,
    pub accounts: Vec<AccountRecord>,
    pub transactions: Vec<TransactionRecord>,
}

impl RecordBatches {
    /// Read `clients.json`, `accounts.json` and `transactions.json` from `dir`.
    pub fn load_dir(dir: impl AsRef<Path>) -> anyhow::Result<Self> {
        let dir = dir.as_ref();
        Ok(Self {
            clients: read_json(&dir.join("clients.json"))?,
            accounts: read_json(&dir.join("accounts.json"))?,
            transactions: read_json(&dir.join("transactions.json"))?,
        })
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Cannot read {}: {e}", path.display()))?;
    Ok(serde_json::from_str(&content)?)
}

// ── Report ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedRecord {
    pub batch: &'static str,
    pub key: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IngestReport {
    pub clients_created: usize,
    pub accounts_created: usize,
    pub banks_created: usize,
    pub transfers_created: usize,
    pub chunks_applied: usize,
    pub skipped: Vec<SkippedRecord>,
}

impl IngestReport {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    pub fn skipped_in(&self, batch: &str) -> usize {
        self.skipped.iter().filter(|s| s.batch == batch).count()
    }

    fn skip(&mut self, batch: &'static str, key: &str, err: &GraphError) {
        log::warn!("ingest {batch}: skipping '{key}': {err}");
        self.skipped.push(SkippedRecord {
            batch,
            key: key.to_string(),
            reason: err.to_string(),
        });
    }
}

// ── Pipeline ───────────────────────────────────────────────────────

pub struct Ingestor<'g> {
    graph: &'g mut GraphStore,
    config: IngestConfig,
    abort: AbortSignal,
}

impl<'g> Ingestor<'g> {
    pub fn new(graph: &'g mut GraphStore, config: IngestConfig) -> Self {
        Self {
            graph,
            config,
            abort: AbortSignal::new(),
        }
    }

    pub fn with_abort(mut self, abort: AbortSignal) -> Self {
        self.abort = abort;
        self
    }

    /// Wipe every node and edge before a fresh load.
    pub fn clean(&mut self) {
        self.graph.clear();
    }

    pub fn apply_constraints(&mut self) {
        let created = self.graph.apply_constraints();
        log::debug!("ingest: {created} uniqueness constraint(s) created");
    }

    /// Load all three batches in order. Requires constraints to be applied.
    pub fn load(&mut self, batches: &RecordBatches) -> GraphResult<IngestReport> {
        if !self.graph.constraints_applied() {
            return Err(GraphError::ConstraintsNotApplied);
        }
        let mut report = IngestReport::default();
        self.load_clients(&batches.clients, &mut report)?;
        self.load_accounts(&batches.accounts, &mut report)?;
        self.load_transfers(&batches.transactions, &mut report)?;
        log::info!(
            "ingest complete: {} clients, {} accounts, {} banks, {} transfers, {} skipped",
            report.clients_created,
            report.accounts_created,
            report.banks_created,
            report.transfers_created,
            report.skipped_count()
        );
        Ok(report)
    }

    fn chunk_size(&self) -> usize {
        self.config.chunk_size.max(1)
    }

    fn check_abort(&self, batch: &'static str, chunks_applied: usize) -> GraphResult<()> {
        if self.abort.is_aborted() {
            log::warn!("ingest {batch}: aborted after {chunks_applied} chunk(s)");
            return Err(GraphError::IngestAborted { batch, chunks_applied });
        }
        Ok(())
    }

    fn load_clients(&mut self, records: &[ClientRecord], report: &mut IngestReport) -> GraphResult<()> {
        for (i, chunk) in records.chunks(self.chunk_size()).enumerate() {
            self.check_abort("clients", i)?;
            for record in chunk {
                let attrs = ClientAttrs {
                    address: record.address.clone(),
                    birth_date: record.birth_date,
                    risk_category: record.risk_category,
                    ..ClientAttrs::new(record.name.clone())
                };
                match self.graph.create_node(&record.client_id, NodeAttrs::Client(attrs)) {
                    Ok(_) => report.clients_created += 1,
                    Err(e) if e.is_recoverable() => report.skip("clients", &record.client_id, &e),
                    Err(e) => return Err(e),
                }
            }
            report.chunks_applied += 1;
            log::debug!("ingest clients: chunk {i} applied ({} records)", chunk.len());
        }
        Ok(())
    }

    fn load_accounts(&mut self, records: &[AccountRecord], report: &mut IngestReport) -> GraphResult<()> {
        for (i, chunk) in records.chunks(self.chunk_size()).enumerate() {
            self.check_abort("accounts", i)?;

            // Owners must exist before any account of the chunk is written.
            for record in chunk {
                if self.graph.lookup(NodeKind::Client, &record.client_id).is_none() {
                    log::error!(
                        "ingest accounts: account '{}' references unknown client '{}'",
                        record.account_id,
                        record.client_id
                    );
                    return Err(GraphError::MissingOwner {
                        account: record.account_id.clone(),
                        client: record.client_id.clone(),
                    });
                }
            }

            for record in chunk {
                if self.graph.lookup(NodeKind::Account, &record.account_id).is_some() {
                    let err = GraphError::ConstraintViolation {
                        entity: NodeKind::Account.label(),
                        key: record.account_id.clone(),
                    };
                    report.skip("accounts", &record.account_id, &err);
                    continue;
                }
                self.materialize_account(record, report)?;
            }
            report.chunks_applied += 1;
            log::debug!("ingest accounts: chunk {i} applied ({} records)", chunk.len());
        }
        Ok(())
    }

    fn materialize_account(&mut self, record: &AccountRecord, report: &mut IngestReport) -> GraphResult<()> {
        let (_, bank_created) = self
            .graph
            .get_or_create_node(&record.bank_name, NodeAttrs::Bank(BankAttrs::default()));
        if bank_created {
            report.banks_created += 1;
        }
        let attrs = AccountAttrs {
            balance: record.balance,
            opened_on: record.creation_date,
        };
        self.graph.create_node(&record.account_id, NodeAttrs::Account(attrs))?;
        self.graph.create_edge(&record.client_id, &record.account_id, EdgeAttrs::Owns)?;
        self.graph.create_edge(&record.account_id, &record.bank_name, EdgeAttrs::DomiciledAt)?;
        report.accounts_created += 1;
        Ok(())
    }

    fn load_transfers(&mut self, records: &[TransactionRecord], report: &mut IngestReport) -> GraphResult<()> {
        for (i, chunk) in records.chunks(self.chunk_size()).enumerate() {
            self.check_abort("transactions", i)?;
            for record in chunk {
                let attrs = TransferAttrs {
                    currency: record.currency.clone(),
                    ..TransferAttrs::new(record.tx_id.clone(), record.amount, record.date)
                };
                let result = self.graph.create_edge(
                    &record.sender_iban,
                    &record.receiver_iban,
                    EdgeAttrs::Transfer(attrs),
                );
                match result {
                    Ok(_) => report.transfers_created += 1,
                    Err(GraphError::DanglingReference { entity, key }) => {
                        let err = GraphError::UnknownReference { entity, key };
                        report.skip("transactions", &record.tx_id, &err);
                    }
                    Err(e) if e.is_recoverable() => report.skip("transactions", &record.tx_id, &e),
                    Err(e) => return Err(e),
                }
            }
            report.chunks_applied += 1;
            log::debug!("ingest transactions: chunk {i} applied ({} records)", chunk.len());
        }
        Ok(())
    }
}
