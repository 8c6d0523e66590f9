use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sneaker_vault::{
    config::Config,
    database::Database,
    lookup::{ExternalLookupClient, HttpLookupTransport, LookupKind, LookupOutcome},
    models::Gender,
    services::{SizeConversionEngine, SizeUnit},
};

#[derive(Parser)]
#[command(name = "sneaker-vault")]
#[command(version = "0.1.0")]
#[command(about = "Sneaker catalogue tools: size conversion, catalogue lookups and migrations")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Database URL (overrides config file)
    #[arg(short = 'd', long, value_name = "URL")]
    database_url: Option<String>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// US/EU size conversion
    #[command(subcommand)]
    Size(SizeCommand),

    /// Resolve a SKU or barcode against the catalogue
    #[command(subcommand)]
    Lookup(LookupCommand),

    /// Create the database and apply embedded migrations
    Migrate,
}

#[derive(Subcommand)]
enum SizeCommand {
    /// Convert a size between units
    Convert {
        size: f64,
        #[arg(long)]
        from: SizeUnit,
        #[arg(long)]
        to: SizeUnit,
        #[arg(short, long, default_value = "men")]
        gender: Gender,
    },
    /// Derive the US/EU pair from one size, detecting its unit
    Both {
        size: f64,
        #[arg(short, long, default_value = "men")]
        gender: Gender,
    },
    /// Print the conversion table
    Table {
        #[arg(short, long, default_value = "men")]
        gender: Gender,
    },
}

#[derive(Subcommand)]
enum LookupCommand {
    Sku { sku: String },
    Barcode { code: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging with specified level
    let log_filter = format!("sneaker_vault={}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Command::Size(command) => run_size(command),
        Command::Lookup(command) => {
            let config = load_config(&cli.config, cli.database_url)?;
            run_lookup(&config, command).await
        }
        Command::Migrate => {
            let config = load_config(&cli.config, cli.database_url)?;
            info!("Using database: {}", config.database.url);
            let database = Database::new(&config.database).await?;
            database.migrate().await?;
            info!("Database migrations applied");
            Ok(())
        }
    }
}

fn load_config(path: &str, database_url: Option<String>) -> Result<Config> {
    std::env::set_var("CONFIG_FILE", path);
    let mut config = Config::load()?;
    info!("Configuration loaded from: {}", path);

    if let Some(database_url) = database_url {
        config.database.url = database_url;
    }
    Ok(config)
}

fn run_size(command: SizeCommand) -> Result<()> {
    let engine = SizeConversionEngine::new();
    match command {
        SizeCommand::Convert {
            size,
            from,
            to,
            gender,
        } => {
            let converted = engine.convert_size(size, from, to, gender);
            if !engine.is_valid_size(size, from, gender) {
                eprintln!(
                    "note: {} is not in the {} table, returned unchanged",
                    engine.format_size(size, from),
                    gender.as_str()
                );
            }
            println!("{}", engine.format_size(converted, to));
        }
        SizeCommand::Both { size, gender } => {
            let pair = engine.generate_both_sizes(size, gender);
            println!(
                "{} / {}",
                engine.format_size(pair.size_us, SizeUnit::Us),
                engine.format_size(pair.size_eu, SizeUnit::Eu)
            );
        }
        SizeCommand::Table { gender } => {
            let us = engine.get_available_sizes(SizeUnit::Us, gender);
            let eu = engine.get_available_sizes(SizeUnit::Eu, gender);
            println!("{:>6}  {:>6}", "US", "EU");
            for (us, eu) in us.iter().zip(eu.iter()) {
                println!("{:>6}  {:>6}", us, eu);
            }
        }
    }
    Ok(())
}

async fn run_lookup(config: &Config, command: LookupCommand) -> Result<()> {
    let transport = HttpLookupTransport::from_config(&config.lookup)?;
    let client = ExternalLookupClient::new(Arc::new(transport), &config.lookup);

    let (kind, query) = match command {
        LookupCommand::Sku { sku } => (LookupKind::Sku, sku),
        LookupCommand::Barcode { code } => (LookupKind::Barcode, code),
    };

    match client.lookup(kind, &query).await? {
        LookupOutcome::Found(draft) => println!("{}", serde_json::to_string_pretty(&draft)?),
        LookupOutcome::MissingInput => anyhow::bail!("A SKU or barcode is required"),
    }
    Ok(())
}
