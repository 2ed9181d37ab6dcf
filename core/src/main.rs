use clap::Parser;
use log::{error, info};
use std::process;
use std::sync::Arc;

use radscribe_core::cli::report::TextReport;
use radscribe_core::cli::{Cli, OutputFormat};
use radscribe_core::config::AppConfig;
use radscribe_core::orchestrator::Analyzer;
use radscribe_core::report::{GroqClient, RetryPolicy};
use radscribe_core::storage::ReportStore;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    let mut config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    };
    if let Some(db) = cli.db {
        config.db_path = db;
    }

    let bytes = match std::fs::read(&cli.file) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error: failed to read {}: {}", cli.file.display(), e);
            process::exit(1);
        }
    };

    let store = match ReportStore::open(&config.db_path) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            eprintln!("Error: failed to open report store: {}", e);
            process::exit(1);
        }
    };

    let model = match GroqClient::new(&config) {
        Ok(model) => Arc::new(model),
        Err(e) => {
            eprintln!("Error: failed to build model client: {}", e);
            process::exit(1);
        }
    };

    let analyzer = Analyzer::new(model, store).with_retry(RetryPolicy {
        max_attempts: 3,
        base_delay: config.retry_base_delay,
    });

    info!("Analyzing {}", cli.file.display());

    match analyzer.analyze(bytes).await {
        Ok(outcome) => match cli.format {
            OutputFormat::Text => print!("{}", TextReport::new(&outcome)),
            OutputFormat::Json => match serde_json::to_string_pretty(&outcome) {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    error!("Failed to serialize outcome: {}", e);
                    process::exit(1);
                }
            },
        },
        Err(e) => {
            error!("Analysis failed: {}", e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn setup_logging(verbose: bool) {
    if verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }
}
