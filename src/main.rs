//! Payment Records CLI
//!
//! Interactive menu for managing payment records kept in a CSV file.
//!
//! # Usage
//!
//! ```bash
//! cargo run
//! cargo run -- --file data/payments.csv
//! cargo run -- --capacity 200 --verbose
//! ```
//!
//! The program loads the records file (a missing file starts an empty store),
//! then runs the menu on stdin/stdout until the user exits or input ends.
//! Every successful change is written back to the file immediately.
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (file exists but cannot be read, terminal I/O failure)

use payment_records::cli::{self, Menu};
use payment_records::{CsvFileStorage, PaymentStore};
use std::io;
use std::process;
use tracing::warn;

fn main() {
    let args = cli::parse_args();
    cli::init_tracing(args.verbose);
    let config = args.to_store_config();

    let storage = CsvFileStorage::new(&config.path);
    let (mut store, report) = match PaymentStore::open(storage, config.capacity) {
        Ok(opened) => opened,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    println!(
        "Loaded {} payment record(s) from {}",
        store.len(),
        config.path.display()
    );
    if !report.skipped.is_empty() {
        println!("Skipped {} malformed line(s).", report.skipped.len());
    }
    if report.ignored > 0 {
        println!(
            "Ignored {} line(s) beyond the capacity of {} records.",
            report.ignored,
            store.capacity()
        );
    }

    let result = {
        let stdin = io::stdin();
        let stdout = io::stdout();
        Menu::new(&mut store, stdin.lock(), stdout.lock()).run()
    };

    if store.is_dirty() {
        if let Err(e) = store.sync() {
            warn!("Unsaved changes could not be written: {}", e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
