//! marlin — the fleet reporting CLI
//!
//! # Usage
//!
//! ```bash
//! # Run the HTTP service
//! marlin serve --database-url postgres://localhost/fleet_ops
//!
//! # Show the SQL a report spec compiles to, without a database
//! marlin plan report.json
//!
//! # List datasets and their columns
//! marlin datasets
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::*;
use marlin::prelude::*;

#[derive(Parser)]
#[command(name = "marlin")]
#[command(version)]
#[command(about = "Fleet-operations dynamic reporting gateway", long_about = None)]
#[command(after_help = "EXAMPLES:
    marlin serve --database-url postgres://localhost/fleet_ops --bind 0.0.0.0:8080
    marlin plan weekly_fuel.json
    marlin datasets")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP reporting service
    Serve {
        /// Database connection URL
        #[arg(long, env = "DATABASE_URL")]
        database_url: String,

        /// Address to bind the HTTP server to
        #[arg(long, default_value = "0.0.0.0:8080")]
        bind: String,

        /// Connection pool size
        #[arg(long, default_value_t = 5)]
        max_connections: u32,
    },
    /// Compile a report spec file to SQL without executing it
    Plan {
        /// Path to a JSON report request
        file: String,
    },
    /// List the available datasets and their columns
    Datasets,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve {
            database_url,
            bind,
            max_connections,
        } => serve(database_url, bind, max_connections).await,
        Commands::Plan { file } => plan(&file),
        Commands::Datasets => {
            show_datasets();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn serve(database_url: String, bind: String, max_connections: u32) -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "marlin=info,tower_http=info".into()),
        )
        .init();

    let server = Server::builder()
        .database(database_url)
        .bind(bind)
        .max_connections(max_connections)
        .build_and_init()
        .await?;

    server.serve().await?;
    Ok(())
}

fn plan(path: &str) -> anyhow::Result<()> {
    let body =
        std::fs::read_to_string(path).with_context(|| format!("failed to read '{path}'"))?;
    let request: ReportRequest =
        serde_json::from_str(&body).with_context(|| format!("bad report spec in '{path}'"))?;

    let composed = compose(&request)?;

    println!("{}", "Data query:".green().bold());
    println!("{}", composed.data.sql);
    println!();
    println!("{}", "Count query:".green().bold());
    println!("{}", composed.count.sql);
    println!();
    println!("{}", "Parameters:".green().bold());
    if composed.data.params.is_empty() {
        println!("{}", "(none)".dimmed());
    }
    for (i, param) in composed.data.params.iter().enumerate() {
        println!("  ${} = {:?}", i + 1, param);
    }
    Ok(())
}

fn show_datasets() {
    println!("{}", "Available datasets:".cyan().bold());
    println!();
    for dataset in Dataset::ALL {
        println!("  {}", dataset.name().yellow());
        println!("    {}", dataset.columns().join(", ").dimmed());
    }
}
