//! oxide-routes CLI
//!
//! Command-line tool for checking route files.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use oxide_router::{Method, RouteTable};

/// Inspect and test route files.
#[derive(Parser)]
#[command(name = "oxide-routes")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Route file (YAML, or JSON with a `.json` extension).
    #[arg(short, long, env = "OXIDE_ROUTES_FILE", default_value = "routes.yaml")]
    routes: PathBuf,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and compile every route, then list them.
    Check,

    /// Show the first route matching a request.
    Match {
        /// HTTP method.
        method: String,

        /// Request URI, optionally with a query string.
        uri: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let records = oxide_router::load_routes(&cli.routes)
        .with_context(|| format!("failed to load {}", cli.routes.display()))?;
    let table = RouteTable::from_records(records)?;

    match cli.command {
        Commands::Check => {
            println!("\nRoutes in {}:", cli.routes.display());
            println!("{:-<60}", "");

            for record in table.routes() {
                let methods = record
                    .methods
                    .as_ref()
                    .map_or_else(|| "ANY".to_string(), |methods| methods.join(","));
                let handler = record
                    .handler_ref()
                    .with_context(|| format!("route {}", record.path))?;
                println!(" {methods:<12} {:<32} {handler}", record.path);
            }
            println!();
            info!("{} routes OK", table.len());
        }

        Commands::Match { method, uri } => {
            let Some(parsed) = Method::parse(&method) else {
                bail!("unknown HTTP method: {method}");
            };

            match table.match_route(parsed, &uri) {
                Some(matched) => {
                    let record = &matched.route.record;
                    println!("route:   {}", record.path);
                    if let Some(name) = &record.name {
                        println!("name:    {name}");
                    }
                    println!("handler: {}", record.handler_ref()?);
                    let names = matched.route.pattern.param_names();
                    for (name, value) in names.iter().zip(&matched.params) {
                        println!("  {name} = {value}");
                    }
                }
                None => info!("No route matches {} {}", parsed, uri),
            }
        }
    }

    Ok(())
}
