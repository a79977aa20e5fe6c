//! StayAdvisor - LLM-powered short-term-rental investment advisor
//!
//! Loads per-city listing datasets, summarizes average prices by
//! neighbourhood and room type, estimates nightly price and monthly
//! revenue, and grounds a chat assistant in those numbers.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (bad config, unreadable dataset, chat failure, etc.)

mod analysis;
mod auth;
mod chat;
mod cli;
mod config;
mod context;
mod dataset;
mod errors;
mod models;
mod questions;
mod repl;
mod report;
mod session;

use anyhow::{Context, Result};
use auth::{CredentialValidator, StaticCredentials};
use chat::ChatService;
use cli::Args;
use config::{Config, CONFIG_FILE_NAME};
use dataset::Datasets;
use repl::Repl;
use session::{Advisor, AdvisorSettings, Session};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle helper flags early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }
    if let Some(ref password) = args.hash_password {
        println!("{}", auth::hash_password(password));
        return Ok(());
    }

    // Config is read before logging starts so `general.verbose` applies
    let (mut config, source) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);
    if let Err(e) = config.validate() {
        eprintln!("Error: invalid configuration: {}", e);
        std::process::exit(1);
    }

    init_logging(args.log_level(config.general.verbose));

    info!("StayAdvisor v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    source.log();

    if let Err(e) = run(args, config).await {
        error!("StayAdvisor failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .stayadvisor.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    std::fs::write(path, Config::default_toml())
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to add cities, pick a model, or require a login.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(level: tracing::Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

async fn run(args: Args, config: Config) -> Result<()> {
    if let Some(ref city) = args.city {
        if config.city(city).is_none() {
            anyhow::bail!(
                "unknown city: {} (configured: {})",
                city,
                config
                    .cities
                    .iter()
                    .map(|c| c.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
    }

    let datasets = Datasets::load_all(&config.cities).context("Failed to load listing data")?;
    for name in datasets.names() {
        info!("Loaded dataset for {}", name);
    }

    let advisor = Advisor::new(
        datasets,
        AdvisorSettings {
            booked_nights: config.estimate.booked_nights,
            retries: config.model.retries,
            ..AdvisorSettings::default()
        },
    );

    let chat = if args.needs_chat() {
        let client = chat::client_from_config(&config.model)?;
        info!(
            "Using {:?} model {} at {}",
            config.model.provider, config.model.name, config.model.api_url
        );
        Some(client)
    } else {
        None
    };

    match chat {
        Some(chat) if args.is_interactive() => {
            run_interactive(&args, &config, &advisor, chat.as_ref()).await
        }
        chat => run_one_shot(&args, &advisor, chat.as_deref()).await,
    }
}

/// Where the configuration came from, logged once logging is up.
enum ConfigSource {
    Explicit(PathBuf),
    DefaultFile,
    BuiltIn,
    Fallback(String),
}

impl ConfigSource {
    fn log(&self) {
        match self {
            ConfigSource::Explicit(path) => info!("Loaded config from: {}", path.display()),
            ConfigSource::DefaultFile => info!("Loaded default config from {}", CONFIG_FILE_NAME),
            ConfigSource::BuiltIn => debug!("No config file found, using defaults"),
            ConfigSource::Fallback(e) => warn!("Failed to load config: {}", e),
        }
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<(Config, ConfigSource)> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        let config = Config::load(config_path)?;
        return Ok((config, ConfigSource::Explicit(config_path.clone())));
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok((config, ConfigSource::DefaultFile)),
        Ok(None) => Ok((Config::default(), ConfigSource::BuiltIn)),
        Err(e) => Ok((Config::default(), ConfigSource::Fallback(format!("{:#}", e)))),
    }
}

/// Summary, estimate, map, dry run or a single question, then exit.
async fn run_one_shot(args: &Args, advisor: &Advisor, chat: Option<&dyn ChatService>) -> Result<()> {
    let mut session = Session::new();
    let city = args.city.as_deref().context("--city is required")?;
    advisor.select_city(&mut session, city)?;
    let dataset = advisor.current_dataset(&session)?;

    if args.summary {
        repl::print_summary(dataset, session.summary());
    }

    if let (Some(neighbourhood), Some(room_type)) = (&args.neighbourhood, &args.room_type) {
        let estimate = advisor.estimate(&mut session, neighbourhood, room_type)?;
        let dataset = advisor.current_dataset(&session)?;
        if estimate.fallback && !args.quiet {
            repl::print_fallback_notice(neighbourhood, room_type);
        }
        repl::print_estimate(&dataset.currency, &estimate);
    }

    if let Some(ref path) = args.map {
        let dataset = advisor.current_dataset(&session)?;
        let points = analysis::map_points(dataset);
        report::write_geojson(&dataset.name, &points, path)?;
        println!("🗺️  Wrote {} listings to {}", points.len(), path.display());
    }

    if args.dry_run {
        println!("{}", advisor.system_prompt(&session)?);
        return Ok(());
    }

    let mut model_used = String::from("none");
    if let Some(ref message) = args.message {
        let chat = chat.context("no chat service configured")?;
        model_used = chat.model_name().to_string();

        let reply = advisor.ask(&mut session, chat, message).await?;
        println!("{}", reply);
    }

    if let Some(ref path) = args.export {
        let report = advisor.report(&session, &model_used)?;
        report::write_session_report(&report, path, args.format)?;
        println!("📝 Session saved to {}", path.display());
    }

    Ok(())
}

async fn run_interactive(
    args: &Args,
    config: &Config,
    advisor: &Advisor,
    chat: &dyn ChatService,
) -> Result<()> {
    let credentials = StaticCredentials::from_config(&config.auth);
    let validator: Option<&dyn CredentialValidator> = if config.auth.required {
        Some(&credentials)
    } else {
        None
    };

    let repl = Repl::new(advisor, chat, validator)
        .with_default_export(&config.general.export);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let session = repl.run(&mut lines, args.city.as_deref()).await?;

    if let Some(ref path) = args.export {
        if session.city().is_none() {
            warn!("No city selected; skipping export to {}", path.display());
            return Ok(());
        }
        let report = advisor.report(&session, chat.model_name())?;
        report::write_session_report(&report, path, args.format)?;
        println!("📝 Session saved to {}", path.display());
    }

    println!("👋 Goodbye!");
    Ok(())
}
