//! Interactive action round-trips: "full traceback" and "install".
//!
//! Reports are delivered with action affordances; when the user invokes
//! one, the embedding application routes the action id back here.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use contracts::{
    ActionButton, ActionId, ActionKind, ChatChannel, ChatRef, CourierError, LogRecord,
    PackageInstaller, SendOptions,
};
use tracing::{debug, warn};

use crate::error::DispatchError;
use crate::redact::SecretStore;
use crate::segment::split_segments;

/// Pending actions are bounded; the oldest are forgotten first.
const MAX_PENDING_ACTIONS: usize = 256;

struct PendingAction<C> {
    kind: ActionKind,
    record: Arc<LogRecord>,
    chat: ChatRef,
    channel: C,
}

struct PendingActions<C> {
    map: HashMap<ActionId, PendingAction<C>>,
    order: VecDeque<ActionId>,
}

/// Routes invoked action ids back to their originating report.
pub struct ActionRouter<C, I> {
    next_id: AtomicU64,
    pending: Mutex<PendingActions<C>>,
    installer: I,
    secrets: SecretStore,
    segment_limit: usize,
}

impl<C, I> ActionRouter<C, I>
where
    C: ChatChannel + Clone + Send + Sync + 'static,
    I: PackageInstaller + Send + Sync + 'static,
{
    pub fn new(installer: I, secrets: SecretStore, segment_limit: usize) -> Self {
        Self {
            next_id: AtomicU64::new(1),
            pending: Mutex::new(PendingActions {
                map: HashMap::new(),
                order: VecDeque::new(),
            }),
            installer,
            secrets,
            segment_limit,
        }
    }

    /// Build the action affordances for a report message and remember them
    /// for later invocation.
    pub fn register(&self, record: &Arc<LogRecord>, chat: &ChatRef, channel: C) -> Vec<ActionButton> {
        let mut buttons = vec![self.add(
            record,
            chat,
            channel.clone(),
            ActionKind::ShowFullTrace,
            "Full traceback".to_string(),
        )];

        if let Some(package) = record.report().and_then(|r| r.missing_package()) {
            buttons.push(self.add(
                record,
                chat,
                channel,
                ActionKind::InstallPackage {
                    package: package.to_string(),
                },
                format!("Install {package}"),
            ));
        }

        buttons
    }

    fn add(
        &self,
        record: &Arc<LogRecord>,
        chat: &ChatRef,
        channel: C,
        kind: ActionKind,
        label: String,
    ) -> ActionButton {
        let id = ActionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut pending = self.pending.lock().expect("pending actions poisoned");

        while pending.map.len() >= MAX_PENDING_ACTIONS {
            if let Some(old) = pending.order.pop_front() {
                pending.map.remove(&old);
            } else {
                break;
            }
        }

        pending.map.insert(
            id,
            PendingAction {
                kind: kind.clone(),
                record: Arc::clone(record),
                chat: chat.clone(),
                channel,
            },
        );
        pending.order.push_back(id);

        ActionButton { id, label, kind }
    }

    /// Invoke a previously issued action.
    pub async fn invoke(&self, id: ActionId) -> Result<(), DispatchError> {
        let (kind, record, chat, channel) = {
            let pending = self.pending.lock().expect("pending actions poisoned");
            let action = pending.map.get(&id).ok_or(DispatchError::UnknownAction(id))?;
            (
                action.kind.clone(),
                Arc::clone(&action.record),
                action.chat.clone(),
                action.channel.clone(),
            )
        };

        match kind {
            ActionKind::ShowFullTrace => self.show_full_trace(&record, &chat, &channel).await?,
            ActionKind::InstallPackage { package } => {
                self.install_package(&package, &chat, &channel).await?
            }
        }
        Ok(())
    }

    /// Render the full redacted stack, re-segmented to the message limit.
    async fn show_full_trace(
        &self,
        record: &Arc<LogRecord>,
        chat: &ChatRef,
        channel: &C,
    ) -> Result<(), CourierError> {
        let Some(report) = record.report() else {
            debug!("full-trace action on a record without a cached report");
            return Ok(());
        };

        let text = format!(
            "{}\n\n<b>Full traceback:</b>\n{}",
            report.summary, report.full_stack
        );
        let text = self.secrets.redact(&text);

        for segment in split_segments(&text, self.segment_limit) {
            channel
                .send_text(chat, &segment, SendOptions::default())
                .await?;
        }
        Ok(())
    }

    /// Run the installer collaborator and report the outcome into the chat.
    async fn install_package(
        &self,
        package: &str,
        chat: &ChatRef,
        channel: &C,
    ) -> Result<(), CourierError> {
        let escaped = classifier::escape_html(package);
        let text = match self.installer.install(package).await {
            Ok(outcome) if outcome.success => {
                format!("<b>Package <code>{escaped}</code> installed successfully.</b>")
            }
            Ok(outcome) => format!(
                "<b>Failed to install <code>{escaped}</code>:</b>\n<code>{}</code>",
                classifier::escape_html(&outcome.detail)
            ),
            Err(e) => {
                warn!(package, error = %e, "installer failed");
                format!(
                    "<b>Failed to install <code>{escaped}</code>:</b>\n<code>{}</code>",
                    classifier::escape_html(&e.to_string())
                )
            }
        };

        channel
            .send_text(chat, &self.secrets.redact(&text), SendOptions::default())
            .await?;
        Ok(())
    }

    /// Number of remembered actions (for tests/diagnostics).
    pub fn pending_len(&self) -> usize {
        self.pending.lock().expect("pending actions poisoned").map.len()
    }
}
