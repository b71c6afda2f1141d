//! # Dispatcher
//!
//! Remote delivery: destination registry, periodic dispatch cycles,
//! payload segmentation, redaction, and interactive actions.
//!
//! Responsibilities:
//! - Track registered destinations and their per-destination queues
//! - Drain queues on a fixed cadence; overlapping cycles collapse to a
//!   skipped tick rather than queueing
//! - Segment text batches to the transport's 4096-character limit, falling
//!   back to a single file attachment for oversized batches
//! - Redact known secrets immediately before anything leaves the process
//! - Isolate failures: one destination's broken transport never delays or
//!   corrupts another's delivery

pub mod actions;
pub mod error;
pub mod metrics;
pub mod redact;
pub mod registry;
pub mod scheduler;
pub mod segment;

pub use actions::ActionRouter;
pub use error::DispatchError;
pub use metrics::{DeliveryMetrics, MetricsSnapshot};
pub use redact::SecretStore;
pub use registry::{Destination, DestinationRegistry, QueuedItem, QueuedPayload};
pub use scheduler::{DispatchScheduler, SchedulerConfig};
pub use segment::split_segments;
