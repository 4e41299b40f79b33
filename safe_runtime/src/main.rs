//! ledger-replay: rebuild a ledger from a journal file and print its
//! hash and global counters.
//!
//! Usage:
//!   ledger-replay <journal.log> --deployer <account> [--config <ledger.json>]

use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use safe_engine::{Account, LedgerConfig};
use safe_runtime::journal::{Journal, JournalEntry};
use safe_runtime::proto_bridge::proto_to_entry;
use safe_runtime::replay;

const USAGE: &str = "usage: ledger-replay <journal.log> --deployer <account> [--config <ledger.json>]";

struct Args {
    journal: PathBuf,
    deployer: Account,
    config: Option<PathBuf>,
}

fn parse_args() -> Result<Args, String> {
    let mut journal = None;
    let mut deployer = None;
    let mut config = None;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--deployer" => deployer = args.next().map(Account::new),
            "--config" => config = args.next().map(PathBuf::from),
            "-h" | "--help" => return Err(USAGE.to_string()),
            other if journal.is_none() && !other.starts_with("--") => {
                journal = Some(PathBuf::from(other))
            }
            other => return Err(format!("unexpected argument {:?}\n{}", other, USAGE)),
        }
    }

    Ok(Args {
        journal: journal.ok_or_else(|| USAGE.to_string())?,
        deployer: deployer.ok_or_else(|| USAGE.to_string())?,
        config,
    })
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let config = match &args.config {
        Some(path) => LedgerConfig::from_json(&fs::read_to_string(path)?)?,
        None => LedgerConfig::default(),
    };

    let entries = Journal::read_all_from_file(&args.journal)?
        .iter()
        .map(proto_to_entry)
        .collect::<Result<Vec<JournalEntry>, _>>()?;

    let engine = replay::rebuild_engine(&config, &args.deployer, &entries)?;

    println!("sequence: {}", engine.sequence());
    println!("hash: {}", engine.canonical_hash()?);
    println!("global_debt: {}", engine.global_debt());
    println!("global_unbacked_debt: {}", engine.global_unbacked_debt());
    println!("collateral_types: {}", engine.state().collateral_types.len());
    println!("enabled: {}", engine.is_enabled());
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{}", message);
            return ExitCode::from(2);
        }
    };
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("ledger-replay: {}", err);
            ExitCode::FAILURE
        }
    }
}
