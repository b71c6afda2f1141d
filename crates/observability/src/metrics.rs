//! Dispatch metrics collection
//!
//! Collects and aggregates delivery statistics for the courier engine.

use contracts::Level;
use metrics::{counter, gauge, histogram};

/// Record one submitted record
pub fn record_record_submitted(level: Level) {
    counter!(
        "courier_records_total",
        "level" => level.as_str()
    )
    .increment(1);
}

/// Record buffer evictions
pub fn record_records_evicted(count: u64) {
    if count > 0 {
        counter!("courier_records_evicted_total").increment(count);
    }
}

/// Record one remote text segment handed to a transport
pub fn record_remote_segment(destination: &str) {
    counter!(
        "courier_segments_sent_total",
        "destination" => destination.to_string()
    )
    .increment(1);
}

/// Record one remote report delivery
pub fn record_remote_report(destination: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "courier_reports_sent_total",
        "destination" => destination.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record a skipped dispatch tick (previous cycle still in flight)
pub fn record_cycle_skipped() {
    counter!("courier_cycles_skipped_total").increment(1);
}

/// Statistics of one completed dispatch cycle
#[derive(Debug, Clone, Copy, Default)]
pub struct CycleStats {
    /// Text segments sent
    pub texts: u64,
    /// Report messages sent
    pub reports: u64,
    /// Document fallbacks sent
    pub documents: u64,
    /// Destination batches that failed
    pub failures: u64,
    /// Characters in the cycle's text batches
    pub batch_chars: u64,
}

/// Dispatch statistics aggregator
///
/// Aggregates in memory for summaries; exported metrics go through the
/// `metrics` facade separately.
#[derive(Debug, Clone, Default)]
pub struct DispatchStatsAggregator {
    /// Completed cycles
    pub total_cycles: u64,

    /// Skipped ticks
    pub total_skipped: u64,

    /// Text segments sent
    pub total_texts: u64,

    /// Report messages sent
    pub total_reports: u64,

    /// Document fallbacks sent
    pub total_documents: u64,

    /// Failed destination batches
    pub total_failures: u64,

    /// Batch size statistics (characters)
    pub batch_stats: RunningStats,
}

impl DispatchStatsAggregator {
    /// Create a new aggregator
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold in one completed cycle
    pub fn record_cycle(&mut self, stats: CycleStats) {
        self.total_cycles += 1;
        self.total_texts += stats.texts;
        self.total_reports += stats.reports;
        self.total_documents += stats.documents;
        self.total_failures += stats.failures;
        if stats.batch_chars > 0 {
            self.batch_stats.push(stats.batch_chars as f64);
        }

        gauge!("courier_last_cycle_segments").set(stats.texts as f64);
        if stats.batch_chars > 0 {
            histogram!("courier_batch_chars").record(stats.batch_chars as f64);
        }
    }

    /// Fold in one skipped tick
    pub fn record_skipped(&mut self) {
        self.total_skipped += 1;
    }

    /// Produce a summary report
    pub fn summary(&self) -> DispatchSummary {
        DispatchSummary {
            total_cycles: self.total_cycles,
            total_skipped: self.total_skipped,
            total_texts: self.total_texts,
            total_reports: self.total_reports,
            total_documents: self.total_documents,
            total_failures: self.total_failures,
            skip_rate: if self.total_cycles + self.total_skipped > 0 {
                self.total_skipped as f64 / (self.total_cycles + self.total_skipped) as f64 * 100.0
            } else {
                0.0
            },
            batch_chars: StatsSummary::from(&self.batch_stats),
        }
    }

    /// Reset statistics
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Dispatch summary
#[derive(Debug, Clone, Default)]
pub struct DispatchSummary {
    pub total_cycles: u64,
    pub total_skipped: u64,
    pub total_texts: u64,
    pub total_reports: u64,
    pub total_documents: u64,
    pub total_failures: u64,
    pub skip_rate: f64,
    pub batch_chars: StatsSummary,
}

impl std::fmt::Display for DispatchSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Dispatch Summary ===")?;
        writeln!(f, "Cycles: {}", self.total_cycles)?;
        writeln!(
            f,
            "Skipped ticks: {} ({:.2}%)",
            self.total_skipped, self.skip_rate
        )?;
        writeln!(f, "Text segments sent: {}", self.total_texts)?;
        writeln!(f, "Reports sent: {}", self.total_reports)?;
        writeln!(f, "Document fallbacks: {}", self.total_documents)?;
        writeln!(f, "Failed batches: {}", self.total_failures)?;
        writeln!(f, "Batch size (chars): {}", self.batch_chars)?;
        Ok(())
    }
}

/// Statistics summary
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count(),
            min: stats.min(),
            max: stats.max(),
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics calculator (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// Add a new value
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// Sample count
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Mean
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// Standard deviation
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Minimum
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Maximum
    pub fn max(&self) -> f64 {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_stats() {
        let mut stats = RunningStats::default();

        stats.push(1.0);
        stats.push(2.0);
        stats.push(3.0);
        stats.push(4.0);
        stats.push(5.0);

        assert_eq!(stats.count(), 5);
        assert!((stats.mean() - 3.0).abs() < 1e-10);
        assert!((stats.min() - 1.0).abs() < 1e-10);
        assert!((stats.max() - 5.0).abs() < 1e-10);
        assert!((stats.variance() - 2.5).abs() < 1e-10);
    }

    #[test]
    fn test_aggregator_update() {
        let mut aggregator = DispatchStatsAggregator::new();

        aggregator.record_cycle(CycleStats {
            texts: 3,
            reports: 1,
            documents: 0,
            failures: 0,
            batch_chars: 512,
        });
        aggregator.record_skipped();

        assert_eq!(aggregator.total_cycles, 1);
        assert_eq!(aggregator.total_skipped, 1);
        assert_eq!(aggregator.total_texts, 3);
        assert_eq!(aggregator.batch_stats.count(), 1);
    }

    #[test]
    fn test_summary_display() {
        let mut aggregator = DispatchStatsAggregator::new();
        aggregator.record_cycle(CycleStats {
            texts: 2,
            reports: 0,
            documents: 1,
            failures: 0,
            batch_chars: 100,
        });

        let output = format!("{}", aggregator.summary());
        assert!(output.contains("Cycles: 1"));
        assert!(output.contains("Document fallbacks: 1"));
    }
}
