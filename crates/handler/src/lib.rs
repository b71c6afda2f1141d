//! # Handler
//!
//! The log aggregation service object: accepts submissions, stores them in
//! the bounded record buffer, fans qualifying records out to local sinks
//! synchronously, and queues them for remote dispatch.
//!
//! ## Usage example
//!
//! ```ignore
//! use contracts::{HandlerSettings, Level, RedactionSettings};
//! use handler::{sinks::ConsoleSink, LogHandler};
//!
//! let handler = LogHandler::new(
//!     HandlerSettings::default(),
//!     &RedactionSettings::default(),
//!     installer,
//! );
//! handler.add_local_sink(Box::new(ConsoleSink::new(Level::Info)));
//! handler.register_destination(&destination_config, channel);
//!
//! handler.submit(Level::Error, "core.net", "request failed", vec![], None, None);
//! ```

pub mod context;
mod handler;
pub mod sinks;

pub use crate::handler::LogHandler;
pub use context::{current_origin, with_origin, with_origin_sync};
