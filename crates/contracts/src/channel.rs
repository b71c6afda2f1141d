//! ChatChannel and PackageInstaller traits - external collaborator seams.
//!
//! The engine never implements a real transport; it only drives these
//! interfaces. Concrete and mock implementations live in the `channels`
//! crate.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::{ChatRef, CourierError};

/// Hard per-message payload limit enforced by chat transports.
/// Segmentation in the dispatcher must respect this.
pub const MAX_MESSAGE_CHARS: usize = 4096;

/// Identifier of a delivered message, assigned by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub u64);

/// Per-send options.
#[derive(Debug, Clone, Copy, Default)]
pub struct SendOptions {
    /// Deliver without a notification sound (used for routine log batches).
    pub silent: bool,
}

/// Identifier of an interactive action affordance, routed back to the
/// dispatcher when the user invokes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionId(pub u64);

/// What an interactive action does when invoked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ActionKind {
    /// Render the full redacted stack trace of the originating report.
    ShowFullTrace,
    /// Install the named package via the installer collaborator.
    InstallPackage { package: String },
}

/// One action affordance attached to an interactive message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionButton {
    pub id: ActionId,
    pub label: String,
    pub kind: ActionKind,
}

/// Remote chat transport.
///
/// Text payloads longer than [`MAX_MESSAGE_CHARS`] are rejected by real
/// transports; callers segment before sending. All sends are best-effort:
/// the engine never retries and never blocks ingestion on a send.
#[trait_variant::make(ChatChannel: Send)]
pub trait LocalChatChannel {
    /// Send a plain text message.
    async fn send_text(
        &self,
        chat: &ChatRef,
        text: &str,
        opts: SendOptions,
    ) -> Result<MessageId, CourierError>;

    /// Send a document attachment with a caption.
    async fn send_document(
        &self,
        chat: &ChatRef,
        payload: Bytes,
        filename: &str,
        caption: &str,
    ) -> Result<(), CourierError>;

    /// Send a message carrying interactive action affordances.
    async fn send_with_actions(
        &self,
        chat: &ChatRef,
        text: &str,
        actions: &[ActionButton],
    ) -> Result<MessageId, CourierError>;
}

/// Outcome of a package installation attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallOutcome {
    pub success: bool,
    /// Installer diagnostic text (stderr tail on failure).
    pub detail: String,
}

/// External package-installation collaborator, invoked only from the
/// "install" interactive action.
#[trait_variant::make(PackageInstaller: Send)]
pub trait LocalPackageInstaller {
    async fn install(&self, package: &str) -> Result<InstallOutcome, CourierError>;
}
