//! # Contracts
//!
//! Frozen interface contracts (ICD), defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Delivery model
//! - Local sinks are synchronous writers, applied inline at submission time
//! - Remote channels are asynchronous transports with a hard 4096-character
//!   limit per text message; delivery is best-effort, never retried

mod blueprint;
mod channel;
mod destination;
mod error;
mod exception;
mod level;
mod origin;
mod record;
mod sink;

pub use blueprint::*;
pub use channel::*;
pub use destination::{ChatRef, DestinationId, RoutingMode};
pub use error::*;
pub use exception::*;
pub use level::Level;
pub use origin::OriginTag;
pub use record::*;
pub use sink::LocalSink;
