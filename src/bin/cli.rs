//! slotstore CLI
//!
//! Command-line front end for a slotstore record file.

use std::process;

use clap::{Parser, Subcommand};
use slotstore::{Config, Store, SyncStrategy};
use tracing_subscriber::{fmt, EnvFilter};

/// slotstore CLI
#[derive(Parser, Debug)]
#[command(name = "slotstore-cli")]
#[command(about = "Add to and search a slotstore record file")]
#[command(version)]
struct Args {
    /// Record file
    #[arg(short, long, default_value = "./slotstore.db")]
    file: String,

    /// fsync after every append
    #[arg(long)]
    sync: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Append one or more values
    Add {
        /// Values to store (each truncated to 256 bytes)
        #[arg(required = true)]
        values: Vec<String>,
    },

    /// Print every stored value containing a substring
    Find {
        /// Case-sensitive substring
        query: String,
    },
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,slotstore=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> slotstore::Result<()> {
    let sync_strategy = if args.sync {
        SyncStrategy::EveryWrite
    } else {
        SyncStrategy::OsBuffered
    };

    let config = Config::builder()
        .path(&args.file)
        .sync_strategy(sync_strategy)
        .build()?;

    let store = Store::open_with(config, std::sync::Arc::new(slotstore::LocalHost))?;

    match args.command {
        Commands::Add { values } => {
            // Issue every write before waiting on any of them
            let pending: Vec<_> = values.into_iter().map(|v| store.add_entry(v)).collect();
            let count = pending.len();
            for write in pending {
                write.wait()?;
            }
            tracing::info!("Stored {} values in {}", count, args.file);
        }
        Commands::Find { query } => {
            let mut count = 0usize;
            for found in store.find(query) {
                println!("{}", found?);
                count += 1;
            }
            tracing::info!("{} matches", count);
        }
    }

    store.shutdown()
}
