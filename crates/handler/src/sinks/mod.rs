//! Local sink implementations
//!
//! Contains ConsoleSink and RotatingFileSink.

mod console;
mod file;

pub use self::console::ConsoleSink;
pub use self::file::{RotatingFileConfig, RotatingFileSink};
