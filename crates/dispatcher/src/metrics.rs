//! Per-destination delivery metrics for observability

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Metrics for a single destination
#[derive(Debug, Default)]
pub struct DeliveryMetrics {
    /// Current queue length
    queue_len: AtomicUsize,
    /// Total text segments handed to the transport
    text_count: AtomicU64,
    /// Total interactive report messages sent
    report_count: AtomicU64,
    /// Total file-attachment fallbacks sent
    document_count: AtomicU64,
    /// Total batches that failed to build or send
    failure_count: AtomicU64,
}

impl DeliveryMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Get current queue length
    pub fn queue_len(&self) -> usize {
        self.queue_len.load(Ordering::Relaxed)
    }

    /// Set current queue length
    pub fn set_queue_len(&self, len: usize) {
        self.queue_len.store(len, Ordering::Relaxed);
    }

    /// Get total text segment count
    pub fn text_count(&self) -> u64 {
        self.text_count.load(Ordering::Relaxed)
    }

    /// Increment text segment count
    pub fn inc_text_count(&self) {
        self.text_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get report message count
    pub fn report_count(&self) -> u64 {
        self.report_count.load(Ordering::Relaxed)
    }

    /// Increment report message count
    pub fn inc_report_count(&self) {
        self.report_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get document fallback count
    pub fn document_count(&self) -> u64 {
        self.document_count.load(Ordering::Relaxed)
    }

    /// Increment document fallback count
    pub fn inc_document_count(&self) {
        self.document_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get failure count
    pub fn failure_count(&self) -> u64 {
        self.failure_count.load(Ordering::Relaxed)
    }

    /// Increment failure count
    pub fn inc_failure_count(&self) {
        self.failure_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            queue_len: self.queue_len(),
            text_count: self.text_count(),
            report_count: self.report_count(),
            document_count: self.document_count(),
            failure_count: self.failure_count(),
        }
    }
}

/// Snapshot of destination metrics (for reporting)
#[derive(Debug, Clone, Copy)]
pub struct MetricsSnapshot {
    pub queue_len: usize,
    pub text_count: u64,
    pub report_count: u64,
    pub document_count: u64,
    pub failure_count: u64,
}
