//! opus-translate - Interactive Machine Translation
//!
//! Entry point: parses the command line, sets up logging and configuration,
//! and dispatches to the translation shell.

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tokio::io::{AsyncReadExt, BufReader};
use tracing::{debug, info, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use opus_translate::cli::{Args, Commands, ConfigAction};
use opus_translate::config::Config;
use opus_translate::error::TranslateError;
use opus_translate::interactive::InteractiveSession;
use opus_translate::language;
use opus_translate::model::{HubClient, ModelKey, ModelResolver, RegistryFactory};
use opus_translate::shell::{Render, Shell, TranslationForm};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Parse command line arguments
    let args = Args::parse();

    // Setup logging to both console and file; the guard flushes the file on return
    let _guard = setup_logging(args.verbose)?;

    // Load configuration
    let config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            // Try to load config.toml from current directory first
            if std::path::Path::new("config.toml").exists() {
                info!("Found config.toml in current directory, loading...");
                Config::from_file("config.toml")?
            } else {
                Config::default()
            }
        }
    };

    match args.command {
        Commands::Translate { from, to, text, input } => {
            let source = language::lookup(&from)?;
            let target = language::lookup(&to)?;

            let text = match (text, input) {
                (Some(text), _) => text,
                (None, Some(path)) => {
                    info!("Reading text from: {}", path.display());
                    tokio::fs::read_to_string(&path).await?
                }
                (None, None) => {
                    let mut buffer = String::new();
                    tokio::io::stdin().read_to_string(&mut buffer).await?;
                    buffer
                }
            };

            let shell = build_shell(&config)?;
            let form = TranslationForm {
                source: source.name.to_string(),
                target: target.name.to_string(),
                text,
            };

            let render = shell.handle(&form).await;
            if render.is_failure() {
                eprintln!("{}", render);
                return Ok(ExitCode::FAILURE);
            }
            if let Render::Success { text, .. } = render {
                println!("{}", text);
            }
        }
        Commands::Interactive => {
            info!("Starting interactive session");
            let shell = build_shell(&config)?;
            let stdin = BufReader::new(tokio::io::stdin());
            let actions = InteractiveSession::new(&shell, stdin, tokio::io::stdout())
                .run()
                .await?;
            info!("Interactive session ended after {} translations", actions);
        }
        Commands::Languages { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(language::entries())?);
            } else {
                println!("{:<10} {:<5}", "Language", "Code");
                println!("{}", "-".repeat(16));
                for entry in language::entries() {
                    println!("{:<10} {:<5}", entry.name, entry.code);
                }
            }
        }
        Commands::Model { from, to, check } => {
            let source = language::lookup(&from)?;
            let target = language::lookup(&to)?;
            let key = ModelKey::new(&config.model.provider_prefix, source.code, target.code)?;
            println!("{}", key);

            if check {
                let client = HubClient::new(&config.model)?;
                match client.check(&key).await {
                    Ok(()) => println!("Status: available"),
                    Err(TranslateError::ModelUnavailable(_)) => {
                        println!("Status: not published");
                        return Ok(ExitCode::FAILURE);
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        }
        Commands::Config { action } => match action {
            ConfigAction::Init { path, force } => {
                if path.exists() && !force {
                    return Err(TranslateError::Config(format!(
                        "{} already exists, use --force to overwrite",
                        path.display()
                    ))
                    .into());
                }
                Config::default().save_to_file(&path)?;
                println!("Wrote default configuration to {}", path.display());
            }
            ConfigAction::Show => {
                print!("{}", config.to_toml()?);
            }
        },
    }

    Ok(ExitCode::SUCCESS)
}

fn build_shell(config: &Config) -> Result<Shell> {
    let registry = RegistryFactory::create_default(config.model.clone())?;
    if config.cache.capacity == 0 {
        debug!("Model cache disabled: every translation reloads its model");
    }
    let resolver = ModelResolver::new(
        config.model.provider_prefix.clone(),
        registry,
        config.cache.capacity,
    );
    Ok(Shell::new(resolver))
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<WorkerGuard> {
    // Create log directory
    let log_dir = std::env::current_dir()?.join(".opus-translate").join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "opus-translate.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);

    // Determine log level
    let log_level = if verbose { Level::DEBUG } else { Level::INFO };
    let console_level = if verbose { LevelFilter::DEBUG } else { LevelFilter::WARN };

    // Console output goes to stderr so translations on stdout stay clean
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(verbose)
        .with_line_number(verbose)
        .with_filter(console_level);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false); // No ANSI colors in file

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    debug!("Logging initialized - console: {}, file: {}",
          log_level, log_dir.join("opus-translate.log").display());

    Ok(guard)
}
