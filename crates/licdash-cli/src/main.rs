//! licdash CLI entrypoint.

use clap::Parser;
use console::style;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod form;
mod handlers;
mod poller;
mod render;
mod session;
mod view;

use commands::{Commands, ConfigCommands};
use config::{CliConfig, OutputFormat};
use handlers::App;
use licdash_client::LicenseApiClient;
use session::SessionStore;

#[derive(Parser)]
#[command(name = "licdash")]
#[command(author, version, about = "License dashboard command-line interface", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (defaults to the configured one)
    #[arg(short, long, global = true, value_enum)]
    output: Option<OutputFormat>,

    #[command(subcommand)]
    command: Commands,
}

fn init_tracing(verbose: bool) {
    let env_filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", style("✗").red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = CliConfig::load()?;
    let store = SessionStore::default_location()?;

    let command = match cli.command {
        Commands::Login => return handlers::login(&store, &config),
        Commands::Logout => return handlers::logout(&store),
        Commands::Config { command } => {
            return match command {
                ConfigCommands::Show => handlers::show_config(&config),
                ConfigCommands::Set { key, value } => handlers::set_config(&key, &value),
            };
        }
        command => command,
    };

    let client = LicenseApiClient::new(config.api_config())?;
    let app = App {
        format: cli.output.unwrap_or(config.output_format),
        session: store.load(),
        source: Arc::new(client),
        config,
    };

    match command {
        Commands::Overview { search } => handlers::overview(&app, &search).await?,
        Commands::Licenses {
            search,
            product,
            expand,
        } => handlers::licenses(&app, &search, &product, expand).await?,
        Commands::Show { key } => handlers::show(&app, &key).await?,
        Commands::Stats => handlers::stats(&app).await?,
        Commands::Create(args) => handlers::create(&app, args).await?,
        Commands::Edit {
            key,
            status,
            expiry,
            license_type,
        } => handlers::edit(&app, &key, status, expiry, license_type).await?,
        Commands::Delete { key, yes } => handlers::delete(&app, &key, yes).await?,
        Commands::Check { key } => handlers::check(&app, &key).await?,
        Commands::Watch { view, search } => handlers::watch(&app, view, &search).await?,
        Commands::Login | Commands::Logout | Commands::Config { .. } => {}
    }

    Ok(())
}
