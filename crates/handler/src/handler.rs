//! LogHandler - the aggregation service object.

use std::cell::{Cell, RefCell};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use contracts::{
    ActionId, ChatChannel, DestinationConfig, ExceptionInfo, HandlerSettings, Level, LocalSink,
    LogRecord, OriginTag, PackageInstaller, RedactionSettings,
};
use dispatcher::{
    Destination, DestinationRegistry, DispatchError, DispatchScheduler, QueuedItem, QueuedPayload,
    SchedulerConfig, SecretStore,
};
use record_store::RecordBuffer;
use tracing::{debug, info, warn};

use crate::context;

thread_local! {
    // A sink submitting from inside the fan-out would deadlock on the state
    // lock; such records are deferred and drained by the outer submit call.
    static IN_SUBMIT: Cell<bool> = const { Cell::new(false) };
    static DEFERRED: RefCell<Vec<Arc<LogRecord>>> = const { RefCell::new(Vec::new()) };
}

struct HandlerState {
    buffer: RecordBuffer,
    sinks: Vec<Box<dyn LocalSink>>,
    local_dispatch: bool,
    local_level: Level,
    remote_level: Level,
    force_send_all: bool,
    suppress_common: bool,
    sink_failures: u64,
}

/// The log aggregation and dispatch service.
///
/// Constructed once per process and shared as `Arc<LogHandler<_, _>>`;
/// there is no implicit global. `submit` is fire-and-forget: it never
/// blocks on the network, never returns an error, and is safe to call
/// reentrantly from a sink's own error handling.
pub struct LogHandler<C, I> {
    state: Mutex<HandlerState>,
    registry: Arc<DestinationRegistry<C>>,
    scheduler: Arc<DispatchScheduler<C, I>>,
}

impl<C, I> LogHandler<C, I>
where
    C: ChatChannel + Clone + Send + Sync + 'static,
    I: PackageInstaller + Send + Sync + 'static,
{
    /// Create the handler with its dispatch machinery. The dispatch poller
    /// is started lazily on the first destination registration.
    pub fn new(
        settings: HandlerSettings,
        redaction: &RedactionSettings,
        installer: I,
    ) -> Arc<Self> {
        let registry = Arc::new(DestinationRegistry::new());
        let scheduler = Arc::new(DispatchScheduler::new(
            Arc::clone(&registry),
            installer,
            SecretStore::from_settings(redaction),
            SchedulerConfig {
                interval: Duration::from_secs(settings.flush_interval_secs),
                segment_limit: settings.segment_limit,
                max_segments: settings.max_segments,
            },
        ));

        Arc::new(Self {
            state: Mutex::new(HandlerState {
                buffer: RecordBuffer::new(settings.capacity),
                sinks: Vec::new(),
                local_dispatch: settings.local_dispatch,
                local_level: settings.local_level,
                remote_level: settings.remote_level,
                force_send_all: settings.force_send_all,
                suppress_common: settings.suppress_common,
                sink_failures: 0,
            }),
            registry,
            scheduler,
        })
    }

    /// Submit one log entry. Fire-and-forget: never raises, never performs
    /// network I/O, safe to call from any task or thread.
    ///
    /// When `origin` is `None` the ambient task-local origin context is
    /// used (see [`crate::context`]).
    pub fn submit(
        &self,
        level: Level,
        logger: &str,
        message: &str,
        args: Vec<String>,
        exception: Option<ExceptionInfo>,
        origin: Option<OriginTag>,
    ) {
        let origin = origin.or_else(context::current_origin);
        let record = Arc::new(LogRecord::new(
            level, logger, message, args, exception, origin,
        ));

        if IN_SUBMIT.get() {
            // Reentrant call from a sink; handle after the outer fan-out.
            DEFERRED.with_borrow_mut(|queue| queue.push(record));
            return;
        }

        IN_SUBMIT.set(true);
        self.ingest(record);
        loop {
            let next = DEFERRED.with_borrow_mut(|queue| {
                if queue.is_empty() {
                    None
                } else {
                    Some(queue.remove(0))
                }
            });
            let Some(deferred) = next else { break };
            self.ingest(deferred);
        }
        IN_SUBMIT.set(false);
    }

    fn ingest(&self, record: Arc<LogRecord>) {
        metrics::counter!("courier_records_submitted_total").increment(1);

        // Recover from poisoning: a panicking sink must not make the
        // handler permanently unusable.
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if record.level >= state.remote_level {
            self.enqueue_remote(&state, &record);
        }

        state.buffer.append(Arc::clone(&record));

        if state.local_dispatch && record.level >= state.local_level {
            Self::fan_out(&mut state);
        }
    }

    /// Classify (when exceptional) and queue the record for every matching
    /// destination.
    fn enqueue_remote(&self, state: &HandlerState, record: &Arc<LogRecord>) {
        let payload = match &record.exception {
            Some(exception) => {
                let report = classifier::build_report(exception);
                if state.suppress_common && classifier::is_common_noise(&report.summary) {
                    debug!(logger = %record.logger, "common-noise report suppressed");
                    return;
                }
                record.cache_report(report);
                QueuedPayload::Report(Arc::clone(record))
            }
            None => QueuedPayload::Text(record.remote_line()),
        };

        self.registry.enqueue(
            QueuedItem {
                payload,
                level: record.level,
                origin: record.origin.clone(),
            },
            state.force_send_all,
        );
    }

    /// Apply every buffered pending record to every qualifying sink, then
    /// promote them. Runs inside the state critical section so interleaved
    /// submits cannot observe a partial promotion.
    fn fan_out(state: &mut HandlerState) {
        let HandlerState {
            buffer,
            sinks,
            sink_failures,
            ..
        } = state;

        let keys = buffer.pending_keys();
        for &key in &keys {
            let Some(record) = buffer.get(key) else { continue };
            for sink in sinks.iter_mut() {
                if sink.min_level() <= record.level {
                    if let Err(e) = sink.write(record) {
                        *sink_failures += 1;
                        metrics::counter!("courier_sink_write_failures_total").increment(1);
                        warn!(sink = sink.name(), error = %e, "local sink write failed");
                    }
                }
            }
        }
        buffer.promote(&keys);
    }

    /// Register a local sink. Applies to records buffered from now on.
    pub fn add_local_sink(&self, sink: Box<dyn LocalSink>) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        debug!(sink = sink.name(), "local sink registered");
        state.sinks.push(sink);
    }

    /// Add or replace a remote destination and (re)start the dispatch
    /// poller, keeping exactly one active poller regardless of churn.
    pub fn register_destination(&self, config: &DestinationConfig, channel: C) {
        self.registry.register(Destination::new(
            config.id.clone(),
            config.chat.clone(),
            config.min_level,
            config.routing,
            config.origin.as_deref().map(OriginTag::from),
            channel,
        ));
        self.scheduler.start();
    }

    /// Remove a destination; its pending queue is dropped.
    pub fn unregister_destination(&self, id: &contracts::DestinationId) -> bool {
        self.registry.unregister(id)
    }

    /// Invoke an interactive action previously attached to a report.
    pub async fn invoke_action(&self, id: ActionId) -> Result<(), DispatchError> {
        self.scheduler.actions().invoke(id).await
    }

    /// Run one dispatch cycle out of band (tests, final flush).
    pub async fn run_dispatch_cycle(&self) -> bool {
        self.scheduler.run_cycle().await
    }

    /// All stored records, oldest to newest.
    pub fn dump(&self) -> Vec<Arc<LogRecord>> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .buffer
            .dump()
    }

    /// Formatted lines for stored records with `level >= min_level`,
    /// optionally restricted to one origin (untagged records always pass).
    pub fn dumps_formatted(&self, min_level: Level, origin: Option<&str>) -> Vec<String> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .buffer
            .records_at_least(min_level, origin)
            .iter()
            .map(|record| record.format_line())
            .collect()
    }

    /// Change the local fan-out threshold.
    pub fn set_local_level(&self, level: Level) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .local_level = level;
    }

    /// Change the remote queuing threshold.
    pub fn set_remote_level(&self, level: Level) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remote_level = level;
    }

    /// Toggle the deliver-to-all routing override.
    pub fn set_force_send_all(&self, force: bool) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .force_send_all = force;
    }

    /// Toggle suppression of well-known noisy reports.
    pub fn set_suppress_common(&self, suppress: bool) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .suppress_common = suppress;
    }

    /// Total local sink write failures observed.
    pub fn sink_failures(&self) -> u64 {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .sink_failures
    }

    /// The dispatch scheduler (metrics, manual cycles).
    pub fn scheduler(&self) -> &Arc<DispatchScheduler<C, I>> {
        &self.scheduler
    }

    /// Stop the dispatch poller and flush local sinks.
    pub fn shutdown(&self) {
        self.scheduler.stop();
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        for sink in state.sinks.iter_mut() {
            if let Err(e) = sink.flush() {
                warn!(sink = sink.name(), error = %e, "sink flush failed on shutdown");
            }
        }
        info!("log handler shut down");
    }
}
