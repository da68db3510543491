//! aml-runner: headless driver for the AML graph engine.
//!
//! Usage:
//!   aml-runner --seed 12345 --clients 200 --banks 5 --transactions 1000
//!   aml-runner --input ./batches --db run.db
//!   aml-runner --seed 12345 --ipc-mode

use amlgraph_core::{
    config::AppConfig,
    engine::DetectionReport,
    generator::{DataGenerator, GeneratorConfig},
    ingest::RecordBatches,
    store::SnapshotStore,
    AmlGraph,
};
use anyhow::{Context, Result};
use std::env;
use std::io::{self, BufRead, Write};
use std::path::Path;

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    RunDetection,
    ListFlagged {
        #[serde(default)]
        limit: Option<usize>,
    },
    GetClient {
        id: String,
    },
    GetSubgraph {
        client_id: String,
    },
    Quit,
}

#[derive(serde::Serialize)]
struct RunSummary<'a> {
    run_id: &'a str,
    completed_stages: &'a [&'static str],
    suspicious_transfers: usize,
    cycles: usize,
    flagged_clients: usize,
}

impl<'a> From<&'a DetectionReport> for RunSummary<'a> {
    fn from(report: &'a DetectionReport) -> Self {
        Self {
            run_id: &report.run_id,
            completed_stages: &report.completed_stages,
            suspicious_transfers: report.suspicious_transfers,
            cycles: report.cycles,
            flagged_clients: report.flagged_clients,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let defaults = GeneratorConfig::default();
    let generator = GeneratorConfig {
        seed,
        num_clients: parse_arg(&args, "--clients", defaults.num_clients),
        num_banks: parse_arg(&args, "--banks", defaults.num_banks),
        num_transactions: parse_arg(&args, "--transactions", defaults.num_transactions),
    };
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let input = arg_value(&args, "--input");
    let db = arg_value(&args, "--db").unwrap_or(":memory:");
    let data_dir = arg_value(&args, "--data-dir").unwrap_or("./data");

    if !ipc_mode {
        println!("AML graph / aml-runner");
        println!("  seed:      {seed}");
        println!("  input:     {}", input.unwrap_or("(generated)"));
        println!("  db:        {db}");
        println!("  data_dir:  {data_dir}");
        println!("  started:   {}", chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC"));
        println!();
    }

    let config = load_config(data_dir)?;
    let store = SnapshotStore::open(db).with_context(|| format!("opening {db}"))?;
    store.migrate()?;

    let batches = match input {
        Some(dir) => RecordBatches::load_dir(dir)?,
        None => DataGenerator::new(generator).generate(),
    };

    let mut aml = AmlGraph::new(config)?;
    aml.clean();
    aml.apply_constraints();
    let ingest = aml.load(&batches)?;
    if !ipc_mode {
        println!(
            "Loaded {} clients, {} accounts, {} banks, {} transfers ({} skipped)",
            ingest.clients_created,
            ingest.accounts_created,
            ingest.banks_created,
            ingest.transfers_created,
            ingest.skipped_count()
        );
    }

    if ipc_mode {
        run_ipc_loop(&mut aml, &store, seed)?;
    } else {
        let report = aml.run_detection()?;
        aml.persist_run(&store, &report, seed)?;
        print_summary(&aml, &report);
    }

    Ok(())
}

fn load_config(data_dir: &str) -> Result<AppConfig> {
    if Path::new(data_dir).join("config.json").exists() {
        AppConfig::load(data_dir)
    } else {
        log::warn!("no config.json under {data_dir}, using defaults");
        Ok(AppConfig::default())
    }
}

fn run_ipc_loop(aml: &mut AmlGraph, store: &SnapshotStore, seed: u64) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                write_error(&mut stdout, e)?;
                continue;
            }
        };

        match cmd {
            IpcCommand::Quit => break,
            IpcCommand::RunDetection => match aml.run_detection() {
                Ok(report) => {
                    aml.persist_run(store, &report, seed)?;
                    writeln!(stdout, "{}", serde_json::to_string(&RunSummary::from(&report))?)?;
                }
                Err(e) => write_error(&mut stdout, e)?,
            },
            IpcCommand::ListFlagged { limit } => {
                let flagged = aml.list_flagged_clients(limit);
                writeln!(stdout, "{}", serde_json::to_string(&flagged)?)?;
            }
            IpcCommand::GetClient { id } => match aml.get_client(&id) {
                Some(view) => writeln!(stdout, "{}", serde_json::to_string(&view)?)?,
                None => write_error(&mut stdout, format!("unknown client '{id}'"))?,
            },
            IpcCommand::GetSubgraph { client_id } => match aml.get_subgraph(&client_id) {
                Ok(subgraph) => writeln!(stdout, "{}", serde_json::to_string(&subgraph)?)?,
                Err(e) => write_error(&mut stdout, e)?,
            },
        }
        stdout.flush()?;
    }
    Ok(())
}

fn write_error(stdout: &mut io::Stdout, err: impl std::fmt::Display) -> Result<()> {
    let err_json = serde_json::json!({ "error": err.to_string() });
    writeln!(stdout, "{}", err_json)?;
    stdout.flush()?;
    Ok(())
}

fn print_summary(aml: &AmlGraph, report: &DetectionReport) {
    let graph = aml.graph();

    println!();
    println!("=== DETECTION SUMMARY ===");
    println!("  run_id:               {}", report.run_id);
    println!("  stages:               {}", report.completed_stages.join(" -> "));
    println!("  nodes:                {}", graph.node_count());
    println!("  transfers:            {}", graph.transfer_count());
    println!("  suspicious transfers: {}", report.suspicious_transfers);
    println!("  cycles:               {}", report.cycles);
    println!("  flagged clients:      {}", report.flagged_clients);

    println!();
    println!("=== TOP FLAGGED CLIENTS ===");
    let flagged = aml.list_flagged_clients(None);
    if flagged.is_empty() {
        println!("  (No client flagged)");
    } else {
        for c in &flagged {
            let status = c.status.map(|s| s.as_str()).unwrap_or("-");
            println!("  {:>3} | {:<8} | {} ({})", c.risk_score, status, c.name, c.id);
        }
    }
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2).find(|w| w[0] == flag).map(|w| w[1].as_str())
}
