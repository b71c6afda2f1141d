//! DispatchScheduler - periodic remote queue drain.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use bytes::Bytes;
use contracts::{ChatChannel, CourierError, LogRecord, PackageInstaller, SendOptions};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, instrument, warn};

use crate::actions::ActionRouter;
use crate::metrics::MetricsSnapshot;
use crate::redact::SecretStore;
use crate::registry::{Destination, DestinationRegistry, QueuedPayload};
use crate::segment::split_segments;

/// Scheduler configuration
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Interval between dispatch cycles
    pub interval: Duration,
    /// Segment size in characters (the transport's per-message limit)
    pub segment_limit: usize,
    /// Batches producing more segments than this become a file attachment
    pub max_segments: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3),
            segment_limit: contracts::MAX_MESSAGE_CHARS,
            max_segments: 5,
        }
    }
}

/// Periodically drains per-destination remote queues and delivers them.
///
/// Cycles are serialized through a dedicated asynchronous lock: a tick that
/// fires while a cycle is still running is skipped entirely, not queued.
pub struct DispatchScheduler<C, I> {
    registry: Arc<DestinationRegistry<C>>,
    actions: Arc<ActionRouter<C, I>>,
    secrets: SecretStore,
    config: SchedulerConfig,
    cycle_lock: tokio::sync::Mutex<()>,
    poller: StdMutex<Option<JoinHandle<()>>>,
    cycles_run: AtomicU64,
    cycles_skipped: AtomicU64,
}

impl<C, I> DispatchScheduler<C, I>
where
    C: ChatChannel + Clone + Send + Sync + 'static,
    I: PackageInstaller + Send + Sync + 'static,
{
    pub fn new(
        registry: Arc<DestinationRegistry<C>>,
        installer: I,
        secrets: SecretStore,
        config: SchedulerConfig,
    ) -> Self {
        let actions = Arc::new(ActionRouter::new(
            installer,
            secrets.clone(),
            config.segment_limit,
        ));
        Self {
            registry,
            actions,
            secrets,
            config,
            cycle_lock: tokio::sync::Mutex::new(()),
            poller: StdMutex::new(None),
            cycles_run: AtomicU64::new(0),
            cycles_skipped: AtomicU64::new(0),
        }
    }

    /// The action router for this scheduler's reports.
    pub fn actions(&self) -> &Arc<ActionRouter<C, I>> {
        &self.actions
    }

    /// (Re)start the polling task. Any previous poller is cancelled first,
    /// so exactly one poller is active per process regardless of
    /// registration churn.
    pub fn start(self: &Arc<Self>) {
        let mut slot = self.poller.lock().expect("poller slot poisoned");
        if let Some(old) = slot.take() {
            old.abort();
            debug!("previous dispatch poller cancelled");
        }

        // The task only holds a weak handle, so dropping the scheduler
        // ends the poller instead of the poller keeping it alive.
        let scheduler = Arc::downgrade(self);
        let interval = self.config.interval;
        *slot = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let Some(scheduler) = scheduler.upgrade() else { break };
                scheduler.run_cycle().await;
            }
        }));
    }

    /// Cancel the polling task, if one is active.
    pub fn stop(&self) {
        if let Some(poller) = self.poller.lock().expect("poller slot poisoned").take() {
            poller.abort();
            debug!("dispatch poller stopped");
        }
    }

    /// Whether a polling task is currently active.
    pub fn is_running(&self) -> bool {
        self.poller
            .lock()
            .expect("poller slot poisoned")
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Run one dispatch cycle. Returns `false` when another cycle was
    /// already in flight and this one was skipped.
    #[instrument(name = "dispatch_cycle", skip(self))]
    pub async fn run_cycle(&self) -> bool {
        let Ok(_guard) = self.cycle_lock.try_lock() else {
            self.cycles_skipped.fetch_add(1, Ordering::Relaxed);
            metrics::counter!("courier_dispatch_cycles_skipped_total").increment(1);
            debug!("dispatch cycle still running, tick skipped");
            return false;
        };

        self.cycles_run.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("courier_dispatch_cycles_total").increment(1);

        for destination in self.registry.snapshot() {
            if let Err(e) = self.flush_destination(&destination).await {
                destination.metrics().inc_failure_count();
                warn!(
                    destination = %destination.id,
                    error = %e,
                    "destination flush failed, continuing with others"
                );
            }
        }
        true
    }

    /// Build and deliver one destination's batch.
    async fn flush_destination(&self, destination: &Arc<Destination<C>>) -> Result<(), CourierError> {
        let items = destination.take_queue();
        if items.is_empty() {
            return Ok(());
        }

        let mut text_batch = String::new();
        let mut reports: Vec<Arc<LogRecord>> = Vec::new();
        for item in items {
            match item.payload {
                QueuedPayload::Text(line) => text_batch.push_str(&line),
                QueuedPayload::Report(record) => reports.push(record),
            }
        }

        for record in &reports {
            self.send_report(destination, record).await?;
        }
        self.send_text_batch(destination, &text_batch).await?;
        Ok(())
    }

    /// Deliver the concatenated plain-text batch: segmented fire-and-forget
    /// messages, or a single document when the batch is too large.
    async fn send_text_batch(
        &self,
        destination: &Arc<Destination<C>>,
        batch: &str,
    ) -> Result<(), CourierError> {
        if batch.is_empty() {
            return Ok(());
        }

        let escaped = classifier::escape_html(batch);
        let redacted = self.secrets.redact(&escaped);
        let segments = split_segments(&redacted, self.config.segment_limit);

        if segments.len() > self.config.max_segments {
            destination
                .channel
                .send_document(
                    &destination.chat,
                    Bytes::from(redacted.into_bytes()),
                    "courier-logs.txt",
                    "<b>Journals are too big to be sent as separate messages</b>",
                )
                .await?;
            destination.metrics().inc_document_count();
            metrics::counter!("courier_remote_documents_total").increment(1);
            return Ok(());
        }

        for segment in segments {
            let channel = destination.channel.clone();
            let chat = destination.chat.clone();
            let delivery = Arc::clone(destination.metrics());
            let id = destination.id.clone();
            // Best-effort: no retry, no backpressure from the transport.
            tokio::spawn(async move {
                let opts = SendOptions { silent: true };
                if let Err(e) = channel.send_text(&chat, &segment, opts).await {
                    delivery.inc_failure_count();
                    warn!(destination = %id, error = %e, "segment send failed");
                }
            });
            destination.metrics().inc_text_count();
            metrics::counter!("courier_remote_segments_total").increment(1);
        }
        Ok(())
    }

    /// Deliver one exception report as an interactive message.
    async fn send_report(
        &self,
        destination: &Arc<Destination<C>>,
        record: &Arc<LogRecord>,
    ) -> Result<(), CourierError> {
        let Some(report) = record.report() else {
            debug!("queued report record without a cached report, dropped");
            return Ok(());
        };

        let buttons = self
            .actions
            .register(record, &destination.chat, destination.channel.clone());
        let summary = self.secrets.redact(&report.summary);

        destination
            .channel
            .send_with_actions(&destination.chat, &summary, &buttons)
            .await?;
        destination.metrics().inc_report_count();
        metrics::counter!("courier_remote_reports_total").increment(1);
        Ok(())
    }

    /// Cycles executed since creation.
    pub fn cycles_run(&self) -> u64 {
        self.cycles_run.load(Ordering::Relaxed)
    }

    /// Ticks skipped because a cycle was still in flight.
    pub fn cycles_skipped(&self) -> u64 {
        self.cycles_skipped.load(Ordering::Relaxed)
    }

    /// Per-destination metric snapshots.
    pub fn destination_metrics(&self) -> Vec<(String, MetricsSnapshot)> {
        self.registry
            .snapshot()
            .iter()
            .map(|d| (d.id.to_string(), d.metrics().snapshot()))
            .collect()
    }
}

impl<C, I> Drop for DispatchScheduler<C, I> {
    fn drop(&mut self) {
        if let Ok(mut slot) = self.poller.lock() {
            if let Some(poller) = slot.take() {
                poller.abort();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::QueuedItem;
    use channels::{MockChannelConfig, MockChatChannel, MockInstaller};
    use contracts::{
        ActionKind, ExceptionCategory, ExceptionInfo, ExceptionReport, Level, RoutingMode,
    };
    use tokio::time::{sleep, Duration};

    type TestScheduler = DispatchScheduler<MockChatChannel, MockInstaller>;

    fn scheduler_with(
        channel: &MockChatChannel,
        installer: MockInstaller,
        secrets: SecretStore,
        config: SchedulerConfig,
        min_level: Level,
        routing: RoutingMode,
        origin: Option<&str>,
    ) -> Arc<TestScheduler> {
        let registry = Arc::new(DestinationRegistry::new());
        registry.register(Destination::new(
            "dest".into(),
            "log-chat".into(),
            min_level,
            routing,
            origin.map(Into::into),
            channel.clone(),
        ));
        Arc::new(DispatchScheduler::new(registry, installer, secrets, config))
    }

    fn text_item(level: Level, origin: Option<&str>, line: &str) -> QueuedItem {
        QueuedItem {
            payload: QueuedPayload::Text(line.to_string()),
            level,
            origin: origin.map(Into::into),
        }
    }

    fn report_record(category: ExceptionCategory) -> Arc<LogRecord> {
        let record = Arc::new(LogRecord::new(
            Level::Error,
            "core.net",
            "request failed",
            Vec::new(),
            Some(ExceptionInfo {
                kind: "ValueError".to_string(),
                message: "bad payload".to_string(),
                traceback: String::new(),
                caller: None,
                comment: None,
            }),
            None,
        ));
        record.cache_report(ExceptionReport {
            category,
            summary: "<b>Error:</b> <code>ValueError: bad payload</code>".to_string(),
            full_stack: "<code>ValueError: bad payload</code>".to_string(),
        });
        record
    }

    fn enqueue(scheduler: &Arc<TestScheduler>, item: QueuedItem) {
        scheduler.registry.enqueue(item, false);
    }

    #[tokio::test]
    async fn test_text_segments_sent_individually_and_silently() {
        let channel = MockChatChannel::new();
        let scheduler = scheduler_with(
            &channel,
            MockInstaller::new(),
            SecretStore::empty(),
            SchedulerConfig::default(),
            Level::Debug,
            RoutingMode::Broadcast,
            None,
        );

        enqueue(&scheduler, text_item(Level::Info, None, "[INFO] a: one\n"));
        enqueue(&scheduler, text_item(Level::Info, None, "[INFO] a: two\n"));
        assert!(scheduler.run_cycle().await);

        // Segment sends are fire-and-forget; give them a beat to land.
        sleep(Duration::from_millis(50)).await;

        let texts = channel.sent_texts();
        assert_eq!(texts.len(), 1);
        assert!(texts[0].silent);
        assert_eq!(texts[0].text, "[INFO] a: one\n[INFO] a: two\n");
        assert!(channel.sent_documents().is_empty());
    }

    #[tokio::test]
    async fn test_oversized_batch_becomes_single_document() {
        let channel = MockChatChannel::new();
        let config = SchedulerConfig {
            segment_limit: 10,
            max_segments: 5,
            ..Default::default()
        };
        let scheduler = scheduler_with(
            &channel,
            MockInstaller::new(),
            SecretStore::empty(),
            config,
            Level::Debug,
            RoutingMode::Broadcast,
            None,
        );

        // 100 chars at limit 10 -> 10 segments > 5 -> document fallback
        enqueue(
            &scheduler,
            text_item(Level::Info, None, &"x".repeat(100)),
        );
        assert!(scheduler.run_cycle().await);
        sleep(Duration::from_millis(50)).await;

        let documents = channel.sent_documents();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].filename, "courier-logs.txt");
        assert_eq!(documents[0].payload.len(), 100);
        assert!(channel.sent_texts().is_empty());
    }

    #[tokio::test]
    async fn test_redaction_before_transport() {
        let channel = MockChatChannel::new();
        let mut secrets = SecretStore::empty();
        secrets.add_secret("12345678:AAF0secret", "<token>");
        let scheduler = scheduler_with(
            &channel,
            MockInstaller::new(),
            secrets,
            SchedulerConfig::default(),
            Level::Debug,
            RoutingMode::Broadcast,
            None,
        );

        enqueue(
            &scheduler,
            text_item(Level::Error, None, "[ERROR] auth: token 12345678:AAF0secret rejected\n"),
        );
        scheduler.run_cycle().await;
        sleep(Duration::from_millis(50)).await;

        let texts = channel.sent_texts();
        assert_eq!(texts.len(), 1);
        assert!(!texts[0].text.contains("12345678:AAF0secret"));
        assert!(texts[0].text.contains("<token>"));
    }

    #[tokio::test]
    async fn test_overlapping_ticks_collapse_to_one_cycle() {
        let channel = MockChatChannel::with_config(MockChannelConfig {
            fail_chats: Vec::new(),
            send_delay: Some(Duration::from_millis(150)),
        });
        let scheduler = scheduler_with(
            &channel,
            MockInstaller::new(),
            SecretStore::empty(),
            SchedulerConfig::default(),
            Level::Debug,
            RoutingMode::Broadcast,
            None,
        );

        // Reports are awaited inside the cycle, so the slow mock keeps the
        // first cycle in flight while two more ticks fire.
        enqueue(
            &scheduler,
            QueuedItem {
                payload: QueuedPayload::Report(report_record(ExceptionCategory::Unclassified)),
                level: Level::Error,
                origin: None,
            },
        );

        let first = {
            let scheduler = Arc::clone(&scheduler);
            tokio::spawn(async move { scheduler.run_cycle().await })
        };
        sleep(Duration::from_millis(20)).await;

        assert!(!scheduler.run_cycle().await);
        assert!(!scheduler.run_cycle().await);
        assert!(first.await.unwrap());

        assert_eq!(scheduler.cycles_run(), 1);
        assert_eq!(scheduler.cycles_skipped(), 2);
        assert_eq!(channel.sent_action_messages().len(), 1);
    }

    #[tokio::test]
    async fn test_exclusive_destination_receives_matching_entry_only() {
        let channel = MockChatChannel::new();
        let scheduler = scheduler_with(
            &channel,
            MockInstaller::new(),
            SecretStore::empty(),
            SchedulerConfig::default(),
            Level::Warning,
            RoutingMode::Exclusive,
            Some("client1"),
        );

        enqueue(
            &scheduler,
            text_item(Level::Info, Some("client1"), "[INFO] a: info\n"),
        );
        enqueue(
            &scheduler,
            text_item(Level::Error, Some("client1"), "[ERROR] a: own error\n"),
        );
        enqueue(
            &scheduler,
            text_item(Level::Error, Some("client2"), "[ERROR] a: foreign error\n"),
        );

        scheduler.run_cycle().await;
        sleep(Duration::from_millis(50)).await;

        assert_eq!(channel.total_sends(), 1);
        let texts = channel.sent_texts();
        assert!(texts[0].text.contains("own error"));
        assert!(!texts[0].text.contains("foreign error"));
    }

    #[tokio::test]
    async fn test_report_message_carries_install_action() {
        let channel = MockChatChannel::new();
        let installer = MockInstaller::new();
        let scheduler = scheduler_with(
            &channel,
            installer.clone(),
            SecretStore::empty(),
            SchedulerConfig::default(),
            Level::Debug,
            RoutingMode::Broadcast,
            None,
        );

        let record = report_record(ExceptionCategory::MissingDependency {
            package: "pillow".to_string(),
        });
        enqueue(
            &scheduler,
            QueuedItem {
                payload: QueuedPayload::Report(record),
                level: Level::Error,
                origin: None,
            },
        );
        scheduler.run_cycle().await;

        let messages = channel.sent_action_messages();
        assert_eq!(messages.len(), 1);
        let kinds: Vec<&ActionKind> = messages[0].actions.iter().map(|a| &a.kind).collect();
        assert!(matches!(kinds[0], ActionKind::ShowFullTrace));
        assert!(matches!(
            kinds[1],
            ActionKind::InstallPackage { package } if package == "pillow"
        ));

        // Install round-trip reports back into the same chat
        let install_id = messages[0].actions[1].id;
        scheduler.actions().invoke(install_id).await.unwrap();
        assert_eq!(installer.installed(), vec!["pillow".to_string()]);
        let texts = channel.sent_texts();
        assert_eq!(texts.len(), 1);
        assert!(texts[0].text.contains("installed successfully"));
    }

    #[tokio::test]
    async fn test_full_trace_action_renders_redacted_stack() {
        let channel = MockChatChannel::new();
        let mut secrets = SecretStore::empty();
        secrets.add_secret("79001234567", "<phone>");
        let scheduler = scheduler_with(
            &channel,
            MockInstaller::new(),
            secrets,
            SchedulerConfig::default(),
            Level::Debug,
            RoutingMode::Broadcast,
            None,
        );

        let record = Arc::new(LogRecord::new(
            Level::Error,
            "core.auth",
            "login failed",
            Vec::new(),
            None,
            None,
        ));
        record.cache_report(ExceptionReport {
            category: ExceptionCategory::Unclassified,
            summary: "<b>Error:</b> <code>login failed</code>".to_string(),
            full_stack: "<code>phone 79001234567 rejected</code>".to_string(),
        });
        enqueue(
            &scheduler,
            QueuedItem {
                payload: QueuedPayload::Report(record),
                level: Level::Error,
                origin: None,
            },
        );
        scheduler.run_cycle().await;

        let messages = channel.sent_action_messages();
        let trace_id = messages[0].actions[0].id;
        scheduler.actions().invoke(trace_id).await.unwrap();

        let texts = channel.sent_texts();
        assert_eq!(texts.len(), 1);
        assert!(texts[0].text.contains("Full traceback"));
        assert!(texts[0].text.contains("<phone>"));
        assert!(!texts[0].text.contains("79001234567"));
    }

    #[tokio::test]
    async fn test_failing_destination_does_not_affect_others() {
        let channel = MockChatChannel::with_config(MockChannelConfig {
            fail_chats: vec!["broken".to_string()],
            send_delay: None,
        });
        let registry = Arc::new(DestinationRegistry::new());
        registry.register(Destination::new(
            "bad".into(),
            "broken".into(),
            Level::Debug,
            RoutingMode::Broadcast,
            None,
            channel.clone(),
        ));
        registry.register(Destination::new(
            "good".into(),
            "healthy".into(),
            Level::Debug,
            RoutingMode::Broadcast,
            None,
            channel.clone(),
        ));
        let scheduler: Arc<TestScheduler> = Arc::new(DispatchScheduler::new(
            registry,
            MockInstaller::new(),
            SecretStore::empty(),
            SchedulerConfig::default(),
        ));

        scheduler.registry.enqueue(
            QueuedItem {
                payload: QueuedPayload::Report(report_record(ExceptionCategory::Unclassified)),
                level: Level::Error,
                origin: None,
            },
            false,
        );

        assert!(scheduler.run_cycle().await);
        sleep(Duration::from_millis(50)).await;

        // The broken chat failed, the healthy one still got its report.
        let chats: Vec<String> = channel
            .sent_action_messages()
            .iter()
            .map(|m| m.chat.clone())
            .collect();
        assert_eq!(chats, vec!["healthy".to_string()]);
    }
}
