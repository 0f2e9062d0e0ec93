use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use clap::{Parser, Subcommand};
use serde_json::Value;

use trailhead::config::load_config;
use trailhead::routing::{BoxedHandler, HandlerOwner};
use trailhead::Dispatcher;

#[derive(Parser)]
#[command(name = "trailhead-cli")]
#[command(about = "Inspection CLI for trailhead services", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the service info endpoint
    Info {
        #[arg(short, long, default_value = "http://localhost:2111/info")]
        url: String,
    },
    /// Load a config file and build its route table without serving
    Check { config: PathBuf },
}

/// Resolves every name to a no-op handler so a config can be checked offline.
struct AnyHandler;

impl HandlerOwner for AnyHandler {
    fn resolve(&self, _name: &str) -> Option<BoxedHandler> {
        Some(BoxedHandler::new(|_request: Request<Body>| async { StatusCode::NO_CONTENT }))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Info { url } => {
            let res = reqwest::get(&url).await?;
            print_response(res).await?;
        }
        Commands::Check { config } => {
            let config = load_config(&config)?;
            let dispatcher = Dispatcher::from_config(&config, Arc::new(AnyHandler), None)?;
            println!("{} route(s) registered", dispatcher.table().len());
            for route in dispatcher.table().iter() {
                let methods: Vec<_> = route.methods().iter().map(|m| m.as_str()).collect();
                println!("  {:<30} {:<16} {}", route.pattern(), methods.join(","), route.handler_name());
            }
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: service returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
