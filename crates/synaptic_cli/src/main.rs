//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `synaptic_core` linkage.
//! - Run the tag/value walkthrough against an in-memory SQLite scene.
//!
//! Usage: `synaptic_cli [log_dir]`. With a log directory, core logging is
//! started there at the build-mode default level.

use log::error;
use std::error::Error;
use std::process::ExitCode;
use synaptic_core::db::open_db_in_memory;
use synaptic_core::{init_logging, LoggingConfig, MetadataAccessor, NodeId, SqliteNodeStore};

fn main() -> ExitCode {
    println!("synaptic_core ping={}", synaptic_core::ping());
    println!("synaptic_core version={}", synaptic_core::core_version());

    if let Some(log_dir) = std::env::args().nth(1) {
        if let Err(err) = init_logging(&LoggingConfig::new(log_dir)) {
            eprintln!("logging disabled: {err}");
        }
    }

    match run_walkthrough() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_walkthrough module=cli status=error error={err}");
            eprintln!("walkthrough failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run_walkthrough() -> Result<(), Box<dyn Error>> {
    let conn = open_db_in_memory()?;
    let store = SqliteNodeStore::try_new(&conn)?;
    let host = NodeId::new("A")?;
    let target = NodeId::new("B")?;
    store.create_node(&host)?;
    store.create_node(&target)?;

    let accessor = MetadataAccessor::new(store);
    accessor.get(&host)?.set("foobar", &123)?;
    let value = accessor
        .get(&host)?
        .get_or("foobar", serde_json::Value::Null)?;
    println!("{host}.foobar={value}");

    accessor.get(&host)?.tag("rainbow", &target)?;
    let found = accessor.get(&host)?.find_first("rainbow")?;
    println!(
        "{host} rainbow -> {}",
        found.as_ref().map_or("<none>", NodeId::as_str)
    );
    Ok(())
}
