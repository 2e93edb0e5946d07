use crate::core::{StoreConfig, DEFAULT_CAPACITY, DEFAULT_FILE};
use clap::Parser;
use std::path::PathBuf;

/// Manage payment records stored in a CSV file
#[derive(Parser, Debug)]
#[command(name = "payments")]
#[command(about = "Manage payment records stored in a CSV file", long_about = None)]
pub struct CliArgs {
    /// CSV file holding the payment records
    #[arg(
        short = 'f',
        long = "file",
        value_name = "PATH",
        env = "PAYMENTS_FILE",
        default_value = DEFAULT_FILE,
        help = "Path to the payment records file (created on first save)"
    )]
    pub file: PathBuf,

    /// Maximum number of records
    #[arg(
        long = "capacity",
        value_name = "COUNT",
        help = "Maximum number of records (default: 100, range: 1-999)"
    )]
    pub capacity: Option<usize>,

    /// Enable debug logging on stderr
    #[arg(short = 'v', long = "verbose", help = "Log debug diagnostics to stderr")]
    pub verbose: bool,
}

impl CliArgs {
    /// Create a StoreConfig from CLI arguments
    ///
    /// Out-of-range capacities are replaced by the default, with a warning.
    pub fn to_store_config(&self) -> StoreConfig {
        StoreConfig::new(&self.file, self.capacity.unwrap_or(DEFAULT_CAPACITY))
    }
}
