//! LocalSink trait - synchronous writer applied during local fan-out.

use crate::{CourierError, Level, LogRecord};

/// Local output target (console stream, rotating file, ...).
///
/// Fan-out to local sinks happens synchronously inside the submission
/// critical section and must never perform network I/O. Implementations
/// should therefore keep `write` cheap; buffered writers flush on `flush`.
pub trait LocalSink: Send {
    /// Sink name (used for logging/metrics).
    fn name(&self) -> &str;

    /// Minimum severity this sink accepts.
    fn min_level(&self) -> Level;

    /// Write one record.
    ///
    /// # Errors
    /// Returns a write error (should include context). The fan-out counts
    /// and traces failures but never propagates them to submitters.
    fn write(&mut self, record: &LogRecord) -> Result<(), CourierError>;

    /// Flush buffered output (if any).
    fn flush(&mut self) -> Result<(), CourierError>;
}
