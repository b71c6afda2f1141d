//! Engine orchestrator - builds the handler from a blueprint and feeds it
//! a stream of JSON-lines log events.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use channels::{CommandInstaller, ConsoleChannel};
use contracts::{
    CourierBlueprint, ExceptionInfo, Level, LocalSinkType, OriginTag,
};
use handler::sinks::{ConsoleSink, RotatingFileSink};
use handler::LogHandler;
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use super::PipelineStats;

/// Where log events are read from
#[derive(Debug, Clone)]
pub enum EventInput {
    Stdin,
    File(PathBuf),
}

/// Engine configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// The engine blueprint
    pub blueprint: CourierBlueprint,

    /// Event input source
    pub input: EventInput,

    /// Maximum records to ingest (None = unlimited)
    pub max_records: Option<u64>,

    /// Engine timeout (None = no timeout)
    pub timeout: Option<Duration>,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// One structured log event from the input stream
#[derive(Debug, Deserialize)]
struct LogEvent {
    level: Level,
    logger: String,
    message: String,
    #[serde(default)]
    args: Vec<String>,
    #[serde(default)]
    origin: Option<String>,
    #[serde(default)]
    exception: Option<ExceptionInfo>,
}

/// Main engine orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new engine with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run the engine to completion
    pub async fn run(self) -> Result<PipelineStats> {
        let start_time = Instant::now();
        let blueprint = &self.config.blueprint;

        // Initialize Metrics (optional)
        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        // Build the handler service
        let courier = LogHandler::new(
            blueprint.handler.clone(),
            &blueprint.redaction,
            CommandInstaller::pip(),
        );

        let active_sinks = self.install_sinks(&courier)?;
        let active_destinations = self.install_destinations(&courier);

        info!(
            sinks = active_sinks,
            destinations = active_destinations,
            "Engine assembled"
        );

        // Ingest events
        let ingested = match self.config.timeout {
            Some(timeout) => {
                match tokio::time::timeout(timeout, self.ingest_events(&courier)).await {
                    Ok(count) => count?,
                    Err(_) => {
                        warn!(timeout_secs = timeout.as_secs(), "Engine timeout reached");
                        0
                    }
                }
            }
            None => self.ingest_events(&courier).await?,
        };

        // Final flush so short runs still deliver their backlog
        courier.run_dispatch_cycle().await;

        let stats = self.collect_stats(&courier, ingested, active_sinks, start_time);
        courier.shutdown();
        Ok(stats)
    }

    /// Install local sinks from the blueprint
    fn install_sinks(
        &self,
        courier: &Arc<LogHandler<ConsoleChannel, CommandInstaller>>,
    ) -> Result<usize> {
        let sinks = &self.config.blueprint.sinks;
        for sink_config in sinks {
            match sink_config.sink_type {
                LocalSinkType::Console => {
                    courier.add_local_sink(Box::new(ConsoleSink::named(
                        &sink_config.name,
                        sink_config.min_level,
                    )));
                }
                LocalSinkType::File => {
                    let sink = RotatingFileSink::from_params(
                        &sink_config.name,
                        sink_config.min_level,
                        &sink_config.params,
                    )
                    .with_context(|| format!("Failed to open file sink '{}'", sink_config.name))?;
                    courier.add_local_sink(Box::new(sink));
                }
            }
        }
        Ok(sinks.len())
    }

    /// Register remote destinations against a console transport
    fn install_destinations(
        &self,
        courier: &Arc<LogHandler<ConsoleChannel, CommandInstaller>>,
    ) -> usize {
        let channel = ConsoleChannel::new();
        for destination in &self.config.blueprint.destinations {
            courier.register_destination(destination, channel.clone());
        }
        self.config.blueprint.destinations.len()
    }

    /// Read JSON-lines events and submit them to the handler.
    async fn ingest_events(
        &self,
        courier: &Arc<LogHandler<ConsoleChannel, CommandInstaller>>,
    ) -> Result<u64> {
        match &self.config.input {
            EventInput::Stdin => {
                let reader = BufReader::new(tokio::io::stdin());
                self.ingest_from(courier, reader.lines()).await
            }
            EventInput::File(path) => {
                let file = tokio::fs::File::open(path)
                    .await
                    .with_context(|| format!("Failed to open input {}", path.display()))?;
                let reader = BufReader::new(file);
                self.ingest_from(courier, reader.lines()).await
            }
        }
    }

    async fn ingest_from<R>(
        &self,
        courier: &Arc<LogHandler<ConsoleChannel, CommandInstaller>>,
        mut lines: tokio::io::Lines<R>,
    ) -> Result<u64>
    where
        R: AsyncBufReadExt + Unpin,
    {
        let mut count: u64 = 0;

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str::<LogEvent>(&line) {
                Ok(event) => {
                    observability::record_record_submitted(event.level);
                    courier.submit(
                        event.level,
                        &event.logger,
                        &event.message,
                        event.args,
                        event.exception,
                        event.origin.map(OriginTag::from),
                    );
                    count += 1;
                }
                Err(e) => {
                    warn!(error = %e, "Skipping malformed event line");
                }
            }

            if count.is_multiple_of(1000) && count > 0 {
                info!(records = count, "Ingestion progress");
            }

            if let Some(max) = self.config.max_records {
                if count >= max {
                    info!(records = count, "Record limit reached");
                    break;
                }
            }
        }

        Ok(count)
    }

    fn collect_stats(
        &self,
        courier: &Arc<LogHandler<ConsoleChannel, CommandInstaller>>,
        records_ingested: u64,
        active_sinks: usize,
        start_time: Instant,
    ) -> PipelineStats {
        let scheduler = courier.scheduler();
        let mut stats = PipelineStats {
            records_ingested,
            records_stored: courier.dump().len(),
            duration: start_time.elapsed(),
            active_sinks,
            active_destinations: self.config.blueprint.destinations.len(),
            sink_failures: courier.sink_failures(),
            cycles_run: scheduler.cycles_run(),
            cycles_skipped: scheduler.cycles_skipped(),
            ..Default::default()
        };

        for (_, snapshot) in scheduler.destination_metrics() {
            stats.segments_sent += snapshot.text_count;
            stats.reports_sent += snapshot.report_count;
            stats.documents_sent += snapshot.document_count;
            stats.batch_failures += snapshot.failure_count;
        }

        stats
    }
}
