//! # Record Store
//!
//! Bounded, order-preserving storage of captured log records.
//!
//! Responsibilities:
//! - Hold the most recent N records across two partitions: `pending`
//!   (not yet fanned out to local sinks) and `delivered` (already fanned out)
//! - Evict on overflow, delivered-oldest-first
//! - Serve ordered read-back for `dump` / formatted dumps
//!
//! ## Usage example
//!
//! ```ignore
//! use record_store::RecordBuffer;
//!
//! let mut buffer = RecordBuffer::new(7000);
//! buffer.append(record);
//!
//! let keys = buffer.pending_keys();
//! // ... apply pending records to local sinks ...
//! buffer.promote(&keys);
//! ```

mod buffer;

pub use buffer::{RecordBuffer, RecordKey};
