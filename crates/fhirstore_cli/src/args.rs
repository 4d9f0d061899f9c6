//! CLI argument definitions using clap.
//!
//! Commands:
//! - fhirstore ping
//! - fhirstore init
//! - fhirstore insert <file>
//! - fhirstore get <type> <id>
//! - fhirstore update <file>
//! - fhirstore delete <type> <id>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// fhirstore - uniquely keyed FHIR resource storage on SQLite
#[derive(Parser, Debug)]
#[command(name = "fhirstore")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// JSON configuration file; flags below override its values
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// SQLite database file (in-memory when omitted)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Absolute directory for rolling log files
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print core linkage and version
    Ping,

    #[command(flatten)]
    Store(StoreCommand),
}

/// Commands that open the configured database.
#[derive(Subcommand, Debug)]
pub enum StoreCommand {
    /// Create the resource schema if missing
    Init,

    /// Insert a new resource read from a FHIR JSON file
    Insert {
        file: PathBuf,
    },

    /// Print the resource stored under TYPE/ID
    Get {
        resource_type: String,
        id: String,
    },

    /// Replace an existing resource with the FHIR JSON in a file
    Update {
        file: PathBuf,
    },

    /// Delete the resource stored under TYPE/ID
    Delete {
        resource_type: String,
        id: String,
    },
}
