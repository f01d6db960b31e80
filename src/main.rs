mod cli;
mod config;
mod error;
mod geofence;
mod identity;
mod leaderboard;
mod ledger;
mod lifecycle;
mod model;
mod repository;
mod storage;
mod task;
mod users;

use std::process;

use tracing_subscriber::EnvFilter;

use config::Config;
use storage::Storage;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("geoquest=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(1);
    });

    let path = config.database_path().unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(1);
    });

    let storage = match Storage::new(&path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to open database at {}: {e}", path.display());
            process::exit(1);
        }
    };

    if let Err(e) = cli::run(&config, &storage) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
