//! CLI entry point over `fhirstore_core`.
//!
//! # Responsibility
//! - Wire configuration, logging and a store connection for one command.
//! - Map store errors to stderr and a non-zero exit code.

mod args;

use args::{Cli, Command, StoreCommand};
use clap::Parser;
use fhirstore_core::db::open_db_with_config;
use fhirstore_core::{init_logging_from_config, FhirResource, ResourceStore, StoreConfig};
use log::info;
use std::error::Error;
use std::path::Path;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = load_config(&cli)?;
    match cli.command {
        Command::Ping => {
            println!("fhirstore_core ping={}", fhirstore_core::ping());
            println!("fhirstore_core version={}", fhirstore_core::core_version());
            Ok(())
        }
        Command::Store(command) => run_store_command(&config, command),
    }
}

fn run_store_command(config: &StoreConfig, command: StoreCommand) -> Result<(), Box<dyn Error>> {
    init_logging_from_config(config)?;
    let conn = open_db_with_config(config)?;
    let store = ResourceStore::sqlite_json(&conn)?;

    match command {
        StoreCommand::Init => {
            info!("event=cli_init module=cli status=ok");
            println!("schema ready");
        }
        StoreCommand::Insert { file } => {
            let resource = read_resource(&file)?;
            store.insert(&resource)?;
            println!("{}/{}", resource.resource_type, resource.id);
        }
        StoreCommand::Get { resource_type, id } => {
            let resource: FhirResource = store.select(&resource_type, &id)?;
            println!("{}", serde_json::to_string_pretty(&resource)?);
        }
        StoreCommand::Update { file } => {
            let resource = read_resource(&file)?;
            store.update(&resource)?;
            println!("{}/{}", resource.resource_type, resource.id);
        }
        StoreCommand::Delete { resource_type, id } => {
            store.delete(&resource_type, &id)?;
            println!("{resource_type}/{id}");
        }
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<StoreConfig, Box<dyn Error>> {
    let mut config = match cli.config.as_deref() {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => StoreConfig::default(),
    };
    if let Some(db) = &cli.db {
        config.db_path = Some(db.clone());
    }
    if let Some(log_dir) = &cli.log_dir {
        config.log_dir = Some(log_dir.clone());
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    Ok(config)
}

fn read_resource(path: &Path) -> Result<FhirResource, Box<dyn Error>> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}
