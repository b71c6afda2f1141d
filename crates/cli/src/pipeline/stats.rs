//! Engine run statistics.

use std::time::Duration;

/// Statistics from an engine run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Total records ingested from the input stream
    pub records_ingested: u64,

    /// Records currently held in the bounded store
    pub records_stored: usize,

    /// Total duration of the run
    pub duration: Duration,

    /// Number of local sinks installed
    pub active_sinks: usize,

    /// Number of remote destinations registered
    pub active_destinations: usize,

    /// Local sink write failures
    pub sink_failures: u64,

    /// Dispatch cycles executed
    pub cycles_run: u64,

    /// Dispatch ticks skipped (previous cycle still running)
    pub cycles_skipped: u64,

    /// Text segments handed to transports
    pub segments_sent: u64,

    /// Interactive report messages sent
    pub reports_sent: u64,

    /// Document fallbacks sent
    pub documents_sent: u64,

    /// Destination batches that failed
    pub batch_failures: u64,
}

impl PipelineStats {
    /// Records ingested per second
    pub fn rate(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.records_ingested as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n=== Engine Statistics ===\n");

        println!("Ingestion");
        println!("   Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   Records ingested: {}", self.records_ingested);
        println!("   Records stored: {}", self.records_stored);
        println!("   Rate: {:.2}/s", self.rate());

        println!("\nLocal fan-out");
        println!("   Sinks: {}", self.active_sinks);
        println!("   Write failures: {}", self.sink_failures);

        println!("\nRemote dispatch");
        println!("   Destinations: {}", self.active_destinations);
        println!(
            "   Cycles: {} run, {} skipped",
            self.cycles_run, self.cycles_skipped
        );
        println!("   Segments sent: {}", self.segments_sent);
        println!("   Reports sent: {}", self.reports_sent);
        println!("   Document fallbacks: {}", self.documents_sent);
        println!("   Failed batches: {}", self.batch_failures);

        println!();
    }
}
