//! Mock chat channel
//!
//! Mock implementation for unit tests, supports injecting failure
//! scenarios and artificial send latency.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use contracts::{
    ActionButton, ChatChannel, ChatRef, CourierError, MessageId, SendOptions,
};
use tracing::debug;

/// Mock channel configuration (failure/latency injection)
#[derive(Debug, Default, Clone)]
pub struct MockChannelConfig {
    /// Chats whose sends should fail
    pub fail_chats: Vec<String>,
    /// Artificial latency per send
    pub send_delay: Option<Duration>,
}

/// One recorded `send_text` call
#[derive(Debug, Clone)]
pub struct SentText {
    pub chat: String,
    pub text: String,
    pub silent: bool,
}

/// One recorded `send_document` call
#[derive(Debug, Clone)]
pub struct SentDocument {
    pub chat: String,
    pub filename: String,
    pub caption: String,
    pub payload: Bytes,
}

/// One recorded `send_with_actions` call
#[derive(Debug, Clone)]
pub struct SentActions {
    pub chat: String,
    pub text: String,
    pub actions: Vec<ActionButton>,
}

#[derive(Default)]
struct MockState {
    texts: Vec<SentText>,
    documents: Vec<SentDocument>,
    action_messages: Vec<SentActions>,
}

struct MockInner {
    config: MockChannelConfig,
    next_message_id: AtomicU64,
    state: Mutex<MockState>,
}

/// Mock chat transport recording every call.
#[derive(Clone)]
pub struct MockChatChannel {
    inner: Arc<MockInner>,
}

impl MockChatChannel {
    /// Create a default mock channel
    pub fn new() -> Self {
        Self::with_config(MockChannelConfig::default())
    }

    /// Create a mock channel with failure/latency injection
    pub fn with_config(config: MockChannelConfig) -> Self {
        Self {
            inner: Arc::new(MockInner {
                config,
                // Start at 1000 so ids are easy to spot in assertions
                next_message_id: AtomicU64::new(1000),
                state: Mutex::new(MockState::default()),
            }),
        }
    }

    async fn gate(&self, chat: &ChatRef) -> Result<(), CourierError> {
        if let Some(delay) = self.inner.config.send_delay {
            tokio::time::sleep(delay).await;
        }
        if self.inner.config.fail_chats.iter().any(|c| c == chat.as_str()) {
            return Err(CourierError::channel_send(chat.as_str(), "mock failure"));
        }
        Ok(())
    }

    fn next_id(&self) -> MessageId {
        MessageId(self.inner.next_message_id.fetch_add(1, Ordering::SeqCst))
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.inner.state.lock().expect("mock state poisoned")
    }

    /// All recorded text sends
    pub fn sent_texts(&self) -> Vec<SentText> {
        self.state().texts.clone()
    }

    /// All recorded document sends
    pub fn sent_documents(&self) -> Vec<SentDocument> {
        self.state().documents.clone()
    }

    /// All recorded interactive-action sends
    pub fn sent_action_messages(&self) -> Vec<SentActions> {
        self.state().action_messages.clone()
    }

    /// Total calls across all three send kinds
    pub fn total_sends(&self) -> usize {
        let state = self.state();
        state.texts.len() + state.documents.len() + state.action_messages.len()
    }
}

impl Default for MockChatChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatChannel for MockChatChannel {
    async fn send_text(
        &self,
        chat: &ChatRef,
        text: &str,
        opts: SendOptions,
    ) -> Result<MessageId, CourierError> {
        self.gate(chat).await?;
        debug!(chat = %chat, len = text.len(), "mock send_text");
        self.state().texts.push(SentText {
            chat: chat.to_string(),
            text: text.to_string(),
            silent: opts.silent,
        });
        Ok(self.next_id())
    }

    async fn send_document(
        &self,
        chat: &ChatRef,
        payload: Bytes,
        filename: &str,
        caption: &str,
    ) -> Result<(), CourierError> {
        self.gate(chat).await?;
        self.state().documents.push(SentDocument {
            chat: chat.to_string(),
            filename: filename.to_string(),
            caption: caption.to_string(),
            payload,
        });
        Ok(())
    }

    async fn send_with_actions(
        &self,
        chat: &ChatRef,
        text: &str,
        actions: &[ActionButton],
    ) -> Result<MessageId, CourierError> {
        self.gate(chat).await?;
        self.state().action_messages.push(SentActions {
            chat: chat.to_string(),
            text: text.to_string(),
            actions: actions.to_vec(),
        });
        Ok(self.next_id())
    }
}
