//! Console chat channel - demo transport printing to stdout.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use contracts::{
    ActionButton, ChatChannel, ChatRef, CourierError, MessageId, SendOptions,
};

/// Demo transport that renders messages to stdout instead of a network.
#[derive(Clone)]
pub struct ConsoleChannel {
    next_message_id: Arc<AtomicU64>,
}

impl ConsoleChannel {
    pub fn new() -> Self {
        Self {
            next_message_id: Arc::new(AtomicU64::new(1)),
        }
    }

    fn next_id(&self) -> MessageId {
        MessageId(self.next_message_id.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ConsoleChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatChannel for ConsoleChannel {
    async fn send_text(
        &self,
        chat: &ChatRef,
        text: &str,
        opts: SendOptions,
    ) -> Result<MessageId, CourierError> {
        let marker = if opts.silent { "·" } else { "!" };
        println!("[{chat}] {marker} {text}");
        Ok(self.next_id())
    }

    async fn send_document(
        &self,
        chat: &ChatRef,
        payload: Bytes,
        filename: &str,
        caption: &str,
    ) -> Result<(), CourierError> {
        println!(
            "[{chat}] document {filename} ({} bytes): {caption}",
            payload.len()
        );
        Ok(())
    }

    async fn send_with_actions(
        &self,
        chat: &ChatRef,
        text: &str,
        actions: &[ActionButton],
    ) -> Result<MessageId, CourierError> {
        let labels: Vec<&str> = actions.iter().map(|a| a.label.as_str()).collect();
        println!("[{chat}] {text}\n    actions: {}", labels.join(" | "));
        Ok(self.next_id())
    }
}
