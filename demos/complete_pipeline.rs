//! Complete pipeline demo: blueprint -> engine -> console transport,
//! with local console/file sinks and the periodic dispatch poller running.
//!
//! Run with: cargo run --bin complete_pipeline

use std::time::Duration;

use channels::{ConsoleChannel, MockInstaller};
use config_loader::{ConfigFormat, ConfigLoader};
use contracts::Level;
use handler::sinks::{ConsoleSink, RotatingFileSink};
use handler::LogHandler;
use observability::{LogFormat, ObservabilityConfig};

const BLUEPRINT: &str = r#"
[handler]
capacity = 200
remote_level = "warning"
flush_interval_secs = 1

[[sinks]]
name = "console"
sink_type = "console"
min_level = "info"

[[sinks]]
name = "logfile"
sink_type = "file"
min_level = "debug"
[sinks.params]
path = "/tmp/logcourier-demo.log"
max_bytes = "65536"

[[destinations]]
id = "ops"
chat = "ops-room"
min_level = "warning"
routing = "broadcast"
"#;

#[tokio::main]
async fn main() {
    observability::init_with_config(ObservabilityConfig {
        log_format: LogFormat::Compact,
        metrics_port: None,
        default_log_level: "info".to_string(),
    })
    .expect("observability init");

    let blueprint = ConfigLoader::load_from_str(BLUEPRINT, ConfigFormat::Toml)
        .expect("demo blueprint is valid");

    let courier = LogHandler::new(
        blueprint.handler.clone(),
        &blueprint.redaction,
        MockInstaller::new(),
    );

    courier.add_local_sink(Box::new(ConsoleSink::new(Level::Info)));
    courier.add_local_sink(Box::new(
        RotatingFileSink::from_params("logfile", Level::Debug, &blueprint.sinks[1].params)
            .expect("log file opens"),
    ));

    let channel = ConsoleChannel::new();
    for destination in &blueprint.destinations {
        courier.register_destination(destination, channel.clone());
    }

    // Simulate a burst of activity; the 1s poller delivers between bursts
    for round in 0..3u32 {
        courier.submit(
            Level::Info,
            "demo.worker",
            "round {} started",
            vec![round.to_string()],
            None,
            None,
        );
        courier.submit(
            Level::Warning,
            "demo.worker",
            "round {} is running behind",
            vec![round.to_string()],
            None,
            None,
        );
        tokio::time::sleep(Duration::from_millis(1200)).await;
    }

    println!("\nstored record lines:");
    for line in courier.dumps_formatted(Level::Warning, None) {
        println!("  {line}");
    }

    courier.shutdown();
}
