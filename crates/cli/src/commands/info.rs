//! `info` command implementation.

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::InfoArgs;

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let json = config_loader::ConfigLoader::to_json(&blueprint)
            .context("Failed to serialize configuration")?;
        println!("{}", json);
        return Ok(());
    }

    println!("=== logcourier configuration ===\n");
    println!("Handler:");
    println!("  Capacity: {} records", blueprint.handler.capacity);
    println!(
        "  Local dispatch: {} (level >= {})",
        if blueprint.handler.local_dispatch {
            "enabled"
        } else {
            "disabled"
        },
        blueprint.handler.local_level
    );
    println!("  Remote level: {}", blueprint.handler.remote_level);
    println!(
        "  Dispatch cadence: every {}s",
        blueprint.handler.flush_interval_secs
    );
    println!(
        "  Segmentation: {} chars, file fallback beyond {} segments",
        blueprint.handler.segment_limit, blueprint.handler.max_segments
    );

    if args.sinks || !blueprint.sinks.is_empty() {
        println!("\nLocal sinks ({}):", blueprint.sinks.len());
        for sink in &blueprint.sinks {
            println!(
                "  - {} ({:?}, level >= {})",
                sink.name, sink.sink_type, sink.min_level
            );
            if args.sinks {
                for (key, value) in &sink.params {
                    println!("      {key} = {value}");
                }
            }
        }
    }

    if args.destinations || !blueprint.destinations.is_empty() {
        println!("\nDestinations ({}):", blueprint.destinations.len());
        for destination in &blueprint.destinations {
            let routing = match destination.origin {
                Some(ref origin) => format!("{:?}, origin={origin}", destination.routing),
                None => format!("{:?}", destination.routing),
            };
            println!(
                "  - {} -> chat {} (level >= {}, {})",
                destination.id, destination.chat, destination.min_level, routing
            );
        }
    }

    println!(
        "\nRedaction: {} secret(s) masked before transmission",
        blueprint.redaction.secrets.len()
    );

    Ok(())
}
