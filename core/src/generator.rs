//! Synthetic batch generator.
//!
//! RULE: same seed and same config produce byte-identical batches.
//! Every draw comes from a `StreamRng`; dates are offsets from a fixed
//! anchor, never from the wall clock.
//!
//! Each batch kind has its own stream, so changing `num_transactions`
//! leaves clients and accounts untouched.

use crate::{
    ingest::{AccountRecord, ClientRecord, RecordBatches, TransactionRecord},
    name_generator::NameGenerator,
    rng::{RngBank, StreamRng, StreamSlot},
    types::RiskCategory,
};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Builder;

const RISK_CATEGORIES: [RiskCategory; 3] = [RiskCategory::Low, RiskCategory::Medium, RiskCategory::High];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub seed: u64,
    pub num_clients: usize,
    pub num_banks: usize,
    pub num_transactions: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            num_clients: 200,
            num_banks: 5,
            num_transactions: 1000,
        }
    }
}

pub struct DataGenerator {
    config: GeneratorConfig,
    anchor: NaiveDateTime,
}

impl DataGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        let anchor = NaiveDate::from_ymd_opt(2024, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap_or_default();
        Self { config, anchor }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn generate(&self) -> RecordBatches {
        let bank = RngBank::new(self.config.seed);
        let clients = self.generate_clients(&mut bank.for_stream(StreamSlot::Clients));
        let banks = NameGenerator::bank_names(self.config.num_banks.max(1));
        let accounts = self.generate_accounts(
            &clients,
            &banks,
            &mut bank.for_stream(StreamSlot::Accounts),
            &mut bank.for_stream(StreamSlot::Banks),
        );
        let transactions =
            self.generate_transactions(&accounts, &mut bank.for_stream(StreamSlot::Transactions));

        log::info!(
            "generated {} clients, {} accounts, {} transactions (seed {})",
            clients.len(),
            accounts.len(),
            transactions.len(),
            self.config.seed
        );
        RecordBatches { clients, accounts, transactions }
    }

    fn generate_clients(&self, rng: &mut StreamRng) -> Vec<ClientRecord> {
        (0..self.config.num_clients)
            .map(|_| {
                let client_id = random_uuid(rng);
                let name = NameGenerator::generate_full_name(rng);
                let address = NameGenerator::generate_address(rng);
                // Adults between 18 and 80.
                let age_days = 18 * 365 + rng.next_u64_below(62 * 365) as i64;
                let birth_date = (self.anchor - Duration::days(age_days)).date();
                ClientRecord {
                    client_id,
                    name,
                    address: Some(address),
                    birth_date: Some(birth_date),
                    risk_category: rng.pick(&RISK_CATEGORIES).copied(),
                }
            })
            .collect()
    }

    fn generate_accounts(
        &self,
        clients: &[ClientRecord],
        banks: &[String],
        rng: &mut StreamRng,
        bank_rng: &mut StreamRng,
    ) -> Vec<AccountRecord> {
        let mut accounts = Vec::with_capacity(clients.len() * 2);
        for client in clients {
            let count = 1 + rng.next_u64_below(2);
            for _ in 0..count {
                let opened_days_ago = rng.next_u64_below(5 * 365) as i64;
                accounts.push(AccountRecord {
                    account_id: random_iban(rng),
                    client_id: client.client_id.clone(),
                    bank_name: bank_rng.pick(banks).cloned().unwrap_or_default(),
                    balance: round_cents(rng.uniform(1_000.0, 50_000.0)),
                    creation_date: Some((self.anchor - Duration::days(opened_days_ago)).date()),
                });
            }
        }
        accounts
    }

    fn generate_transactions(&self, accounts: &[AccountRecord], rng: &mut StreamRng) -> Vec<TransactionRecord> {
        if accounts.len() < 2 {
            return Vec::new();
        }
        let n = accounts.len() as u64;
        (0..self.config.num_transactions)
            .map(|_| {
                let sender = rng.next_u64_below(n) as usize;
                // Offset in [1, n) guarantees receiver != sender.
                let receiver = (sender + 1 + rng.next_u64_below(n - 1) as usize) % accounts.len();
                let seconds_ago = rng.next_u64_below(365 * 24 * 3600) as i64;
                TransactionRecord {
                    tx_id: random_uuid(rng),
                    sender_iban: accounts[sender].account_id.clone(),
                    receiver_iban: accounts[receiver].account_id.clone(),
                    amount: round_cents(rng.uniform(10.0, 15_000.0)),
                    date: self.anchor - Duration::seconds(seconds_ago),
                    currency: "EUR".to_string(),
                }
            })
            .collect()
    }
}

fn random_uuid(rng: &mut StreamRng) -> String {
    Builder::from_random_bytes(rng.bytes16()).into_uuid().to_string()
}

/// French-format IBAN: "FR76" followed by 23 digits.
fn random_iban(rng: &mut StreamRng) -> String {
    let digits: String = (0..23)
        .map(|_| char::from(b'0' + rng.next_u64_below(10) as u8))
        .collect();
    format!("FR76{digits}")
}

fn round_cents(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
