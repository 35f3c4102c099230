//! SnapKV - Demo Driver
//!
//! Walks through the store's operations against a snapshot file:
//! create with a TTL, read, wait for expiry, read again, remove, batch create.

use serde_json::json;
use snapkv::{Store, StoreConfig};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Demo configuration
struct Config {
    /// Snapshot file to use
    path: PathBuf,
    /// TTL of the demo key, in seconds
    ttl: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: PathBuf::from(snapkv::DEFAULT_SNAPSHOT_PATH),
            ttl: 2,
        }
    }
}

impl Config {
    /// Parse configuration from command-line arguments
    fn from_args() -> Self {
        let mut config = Config::default();
        let args: Vec<String> = std::env::args().collect();

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--file" | "-f" => {
                    if i + 1 < args.len() {
                        config.path = PathBuf::from(&args[i + 1]);
                        i += 2;
                    } else {
                        eprintln!("Error: --file requires a value");
                        std::process::exit(1);
                    }
                }
                "--ttl" | "-t" => {
                    if i + 1 < args.len() {
                        config.ttl = args[i + 1].parse().unwrap_or_else(|_| {
                            eprintln!("Error: invalid TTL");
                            std::process::exit(1);
                        });
                        i += 2;
                    } else {
                        eprintln!("Error: --ttl requires a value");
                        std::process::exit(1);
                    }
                }
                "--help" | "-h" => {
                    print_help();
                    std::process::exit(0);
                }
                "--version" | "-v" => {
                    println!("SnapKV version {}", snapkv::VERSION);
                    std::process::exit(0);
                }
                _ => {
                    eprintln!("Unknown argument: {}", args[i]);
                    print_help();
                    std::process::exit(1);
                }
            }
        }

        config
    }
}

fn print_help() {
    println!(
        r#"
SnapKV - An Embedded Key-Value Store with Snapshot Persistence

USAGE:
    snapkv [OPTIONS]

OPTIONS:
    -f, --file <PATH>    Snapshot file (default: datastore.json)
    -t, --ttl <SECS>     TTL of the demo key (default: 2)
    -v, --version        Print version information
    -h, --help           Print this help message
"#
    );
}

/// Prints the outcome of one store call.
fn report<T: std::fmt::Display>(step: &str, result: Result<T, snapkv::StoreError>) {
    match result {
        Ok(value) => info!("{}: {}", step, value),
        Err(e) => warn!("{}: {}", step, e),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_args();

    // Set up logging
    let _subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    let store = Store::open(StoreConfig::default().with_path(&config.path))?;
    info!("Using snapshot {}", config.path.display());

    report(
        "Creating key1",
        store
            .create("key1", json!({"name": "Alice"}), config.ttl)
            .map(|()| "created"),
    );
    report("Reading key1", store.read("key1"));

    let wait = Duration::from_secs(config.ttl + 1);
    info!("Sleeping {}s to let key1 expire...", wait.as_secs());
    tokio::time::sleep(wait).await;

    report("Reading expired key1", store.read("key1"));
    report("Removing key1", store.remove("key1").map(|()| "removed"));

    let batch = vec![
        ("key2".to_string(), json!({"name": "Bob"})),
        ("key3".to_string(), json!({"name": "Charlie"})),
    ];
    report(
        "Batch creating key2, key3",
        store.batch_create(batch, 0).map(|()| "created"),
    );

    info!("Store holds {} keys", store.len());
    store.close()?;
    Ok(())
}
