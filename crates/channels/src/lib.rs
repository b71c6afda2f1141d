//! # Channels
//!
//! Concrete and mock implementations of the external collaborator seams:
//! chat transports ([`contracts::ChatChannel`]) and package installers
//! ([`contracts::PackageInstaller`]).
//!
//! The engine core never implements a transport itself; tests and demos
//! plug these in.

mod console;
mod installer;
mod mock;

pub use console::ConsoleChannel;
pub use installer::{CommandInstaller, MockInstaller};
pub use mock::{MockChannelConfig, MockChatChannel, SentActions, SentDocument, SentText};
