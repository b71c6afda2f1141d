//! `run` command implementation.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::pipeline::{EventInput, Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    // Validate config path
    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    // Load and parse configuration
    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    info!(
        capacity = blueprint.handler.capacity,
        sinks = blueprint.sinks.len(),
        destinations = blueprint.destinations.len(),
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint);
        return Ok(());
    }

    // Build engine configuration
    let pipeline_config = PipelineConfig {
        blueprint,
        input: match args.input {
            Some(ref path) => EventInput::File(path.clone()),
            None => EventInput::Stdin,
        },
        max_records: if args.max_records == 0 {
            None
        } else {
            Some(args.max_records)
        },
        timeout: if args.timeout == 0 {
            None
        } else {
            Some(Duration::from_secs(args.timeout))
        },
        metrics_port: if args.metrics_port == 0 {
            None
        } else {
            Some(args.metrics_port)
        },
    };

    // Create and run engine
    let pipeline = Pipeline::new(pipeline_config);

    // Setup graceful shutdown handler
    let shutdown_signal = setup_shutdown_signal();

    info!("Starting engine...");

    // Run engine with shutdown signal
    tokio::select! {
        result = pipeline.run() => {
            match result {
                Ok(stats) => {
                    info!(
                        records = stats.records_ingested,
                        duration_secs = stats.duration.as_secs_f64(),
                        rate = format!("{:.2}/s", stats.rate()),
                        "Engine completed"
                    );

                    // Print detailed statistics
                    stats.print_summary();
                }
                Err(e) => {
                    return Err(e).context("Engine execution failed");
                }
            }
        }
        _ = shutdown_signal => {
            warn!("Received shutdown signal, stopping engine...");
        }
    }

    info!("logcourier finished");
    Ok(())
}

/// Setup Ctrl+C and SIGTERM signal handlers
async fn setup_shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &contracts::CourierBlueprint) {
    println!("\n=== Configuration Summary ===\n");
    println!("Handler:");
    println!("  Capacity: {} records", blueprint.handler.capacity);
    println!("  Remote level: {}", blueprint.handler.remote_level);
    println!(
        "  Dispatch every {}s",
        blueprint.handler.flush_interval_secs
    );

    if !blueprint.sinks.is_empty() {
        println!("\nSinks ({}):", blueprint.sinks.len());
        for sink in &blueprint.sinks {
            println!("  - {} ({:?})", sink.name, sink.sink_type);
        }
    }

    if !blueprint.destinations.is_empty() {
        println!("\nDestinations ({}):", blueprint.destinations.len());
        for destination in &blueprint.destinations {
            println!(
                "  - {} -> {} ({:?})",
                destination.id, destination.chat, destination.routing
            );
        }
    }

    println!();
}
