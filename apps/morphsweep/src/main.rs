//! morphsweep - Remove residual polymorphic rows
//!
//! Loads entity declarations from configuration, connects to the database
//! and runs sweeps or cascade deletes through the sweep crate.

mod cli;
mod display;
mod error;
mod events;
mod logging;

use crate::cli::{Cli, Commands};
use crate::display::{
    EntitySummary, OperationResult, OutputRenderer, RelationCatalog, RelationListing,
};
use crate::error::CliError;
use crate::events::EventHandler;
use clap::Parser;
use morphsweep_catalog::{resolve, DeclaredRegistry};
use morphsweep_config::Config;
use morphsweep_events::{AppEvent, EventEmitter, EventReceiver, EventSender, GeneralEvent};
use morphsweep_sweep::{create_pool, PoolSettings, Sweeper};
use morphsweep_types::{ColorChoice, OutputFormat, ScanMode, SweepReport};
use std::process;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::select;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Parse command line arguments first to check for JSON mode
    let cli = Cli::parse();
    let json_mode = cli.global.json;

    init_tracing(json_mode, cli.global.debug);

    if let Err(e) = run(cli).await {
        error!("Application error: {}", e);
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

/// Main application logic
async fn run(cli: Cli) -> Result<(), CliError> {
    info!("Starting morphsweep v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration with proper precedence:
    // 1. Start with file config (or defaults)
    let mut config = Config::load_or_default(&cli.global.config).await?;

    // 2. Merge environment variables
    config.merge_env()?;

    // 3. Apply CLI flags (highest precedence)
    apply_cli_config(&mut config, &cli.global, &cli.command);

    let (event_sender, event_receiver) = morphsweep_events::channel();

    let warnings = config.validate()?;
    event_sender.emit(AppEvent::General(GeneralEvent::ConfigurationValidated {
        source: cli
            .global
            .config
            .as_ref()
            .map_or_else(|| "default".to_string(), |p| p.display().to_string()),
        entities: config.entities.len(),
        warnings,
    }));

    let json_output = cli.global.json || config.general.default_output == OutputFormat::Json;
    let color = match config.general.default_output {
        OutputFormat::Plain if cli.global.color.is_none() => ColorChoice::Never,
        _ => config.general.color,
    };
    let renderer = OutputRenderer::new(json_output, color);
    let colors_enabled = renderer.colors_enabled();
    console::set_colors_enabled(colors_enabled);
    console::set_colors_enabled_stderr(colors_enabled);
    let mut event_handler = EventHandler::new(colors_enabled, json_output);

    let result = execute_command_with_events(
        cli.command,
        config,
        event_sender,
        event_receiver,
        &mut event_handler,
    )
    .await?;

    renderer.render_result(&result)?;

    info!("Command completed successfully");
    Ok(())
}

/// Execute command with concurrent event handling
async fn execute_command_with_events(
    command: Commands,
    config: Config,
    event_sender: EventSender,
    mut event_receiver: EventReceiver,
    event_handler: &mut EventHandler,
) -> Result<OperationResult, CliError> {
    let mut command_future = Box::pin(execute_command(command, config, event_sender));

    loop {
        select! {
            result = &mut command_future => {
                // Drain any remaining events
                while let Ok(event) = event_receiver.try_recv() {
                    event_handler.handle_event(event);
                }
                return result;
            }

            event = event_receiver.recv() => {
                if let Some(event) = event {
                    event_handler.handle_event(event);
                }
            }
        }
    }
}

/// Execute the specified command
async fn execute_command(
    command: Commands,
    config: Config,
    event_sender: EventSender,
) -> Result<OperationResult, CliError> {
    let registry = DeclaredRegistry::new(config.entities.clone())?;

    match command {
        Commands::Entities => {
            let entities = registry
                .definitions()
                .map(|d| EntitySummary {
                    label: d.label.clone(),
                    table: d.table.clone(),
                    key: d.key.clone(),
                    cascade: d.cascade,
                    accessors: d.cascade_delete_morph.clone(),
                })
                .collect();
            Ok(OperationResult::Entities(entities))
        }

        Commands::Relations { label } => {
            let entity = registry.representative(&label)?;
            let resolution = resolve(&entity);
            Ok(OperationResult::Relations(RelationCatalog {
                label,
                relations: resolution
                    .relations
                    .into_iter()
                    .map(|named| RelationListing {
                        accessor: named.accessor,
                        descriptor: named.descriptor,
                    })
                    .collect(),
                skipped: resolution.skipped,
            }))
        }

        Commands::Clean { entity, .. } => {
            let mode = if config.dry_run() {
                ScanMode::DryRun
            } else {
                ScanMode::Delete
            };
            let target = entity
                .as_deref()
                .map(|label| registry.representative(label))
                .transpose()?;

            let database = config.database_url()?;
            let sweeper = build_sweeper(&config, registry, event_sender)
                .await?
                .with_mode(mode);

            let report = match target {
                Some(target) => {
                    let start = Instant::now();
                    let entity_report = sweeper
                        .sweep_entity(&target)
                        .await
                        .map_err(CliError::on(database, entity.as_deref()))?;
                    SweepReport {
                        mode,
                        entities: vec![entity_report],
                        duration_ms: u64::try_from(start.elapsed().as_millis())
                            .unwrap_or(u64::MAX),
                    }
                }
                None => sweeper.sweep().await.map_err(CliError::on(database, None))?,
            };
            Ok(OperationResult::Sweep(report))
        }

        Commands::Delete {
            label,
            key,
            with_parent,
        } => {
            let entity = registry.instance(&label, &key)?;
            let database = config.database_url()?;
            let sweeper = build_sweeper(&config, registry, event_sender).await?;
            let report = if with_parent {
                sweeper.delete_with_dependents(&entity).await
            } else {
                sweeper.delete(&entity).await
            }
            .map_err(CliError::on(database, Some(label.as_str())))?;
            Ok(OperationResult::Cascade(report))
        }
    }
}

/// Connect to the configured database and wire the sweeper to the event channel
async fn build_sweeper(
    config: &Config,
    registry: DeclaredRegistry,
    event_sender: EventSender,
) -> Result<Sweeper, CliError> {
    let url = config.database_url()?;
    let settings = PoolSettings {
        max_connections: config.database.max_connections,
        busy_timeout: Duration::from_secs(config.database.busy_timeout),
        create_if_missing: false,
    };
    let pool = create_pool(url, &settings).await?;

    Ok(Sweeper::new(pool, Arc::new(registry)).with_event_sender(event_sender))
}

/// Initialize tracing/logging
fn init_tracing(json_mode: bool, debug_enabled_flag: bool) {
    let debug_enabled = std::env::var("RUST_LOG").is_ok() || debug_enabled_flag;

    if debug_enabled {
        // Debug mode: structured JSON logs on stderr, leaving stdout to results
        tracing_subscriber::fmt()
            .json()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                    tracing_subscriber::EnvFilter::new("info,morphsweep=debug")
                }),
            )
            .init();
    } else if json_mode {
        // JSON mode: keep stderr free of human log lines
        tracing_subscriber::fmt()
            .with_writer(std::io::sink)
            .with_env_filter("off")
            .init();
    } else {
        // Normal mode: the event handler prints status lines itself
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(tracing_subscriber::EnvFilter::new(
                "warn,morphsweep::logging=off",
            ))
            .init();
    }
}

/// Apply CLI configuration overrides (highest precedence)
fn apply_cli_config(config: &mut Config, global: &cli::GlobalArgs, command: &Commands) {
    if let Some(color) = global.color {
        config.general.color = color;
    }
    if let Some(url) = &global.database {
        config.database.url = Some(url.clone());
    }
    if let Commands::Clean { dry_run: true, .. } = command {
        config.general.dry_run = true;
    }
}
