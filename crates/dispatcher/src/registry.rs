//! Destination registry and per-destination remote queues.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use contracts::{ChatRef, DestinationId, Level, LogRecord, OriginTag, RoutingMode};
use tracing::{debug, warn};

use crate::metrics::DeliveryMetrics;

/// Payload queued for remote delivery.
#[derive(Debug, Clone)]
pub enum QueuedPayload {
    /// Pre-formatted plain text line.
    Text(String),
    /// Record carrying a cached exception report.
    Report(Arc<LogRecord>),
}

/// One queued (payload, origin) pair.
#[derive(Debug, Clone)]
pub struct QueuedItem {
    pub payload: QueuedPayload,
    pub level: Level,
    pub origin: Option<OriginTag>,
}

/// A registered remote destination with its pending queue.
pub struct Destination<C> {
    pub id: DestinationId,
    pub chat: ChatRef,
    pub min_level: Level,
    pub routing: RoutingMode,
    /// Owning origin; exclusive destinations only receive matching records.
    pub origin: Option<OriginTag>,
    pub channel: C,
    queue: Mutex<Vec<QueuedItem>>,
    metrics: Arc<DeliveryMetrics>,
}

impl<C> Destination<C> {
    pub fn new(
        id: DestinationId,
        chat: ChatRef,
        min_level: Level,
        routing: RoutingMode,
        origin: Option<OriginTag>,
        channel: C,
    ) -> Self {
        Self {
            id,
            chat,
            min_level,
            routing,
            origin,
            channel,
            queue: Mutex::new(Vec::new()),
            metrics: Arc::new(DeliveryMetrics::new()),
        }
    }

    /// Whether this destination accepts the given (level, origin) pair.
    fn accepts(&self, level: Level, origin: Option<&OriginTag>, force_send_all: bool) -> bool {
        if level < self.min_level {
            return false;
        }
        if force_send_all {
            return true;
        }
        match self.routing {
            RoutingMode::Broadcast => true,
            RoutingMode::Exclusive => match (origin, self.origin.as_ref()) {
                // Untagged records reach every qualifying destination.
                (None, _) => true,
                (Some(tag), Some(own)) => tag == own,
                (Some(_), None) => false,
            },
        }
    }

    fn push(&self, item: QueuedItem) {
        let mut queue = self.queue.lock().expect("destination queue poisoned");
        queue.push(item);
        self.metrics.set_queue_len(queue.len());
    }

    /// Atomically take the whole queue. Items enqueued afterwards are held
    /// for the next cycle.
    pub fn take_queue(&self) -> Vec<QueuedItem> {
        let mut queue = self.queue.lock().expect("destination queue poisoned");
        self.metrics.set_queue_len(0);
        std::mem::take(&mut *queue)
    }

    /// Delivery metrics for this destination.
    pub fn metrics(&self) -> &Arc<DeliveryMetrics> {
        &self.metrics
    }
}

/// Tracks remote destinations; thread-safe, shared between the submitting
/// side (enqueue) and the dispatch scheduler (drain).
pub struct DestinationRegistry<C> {
    destinations: RwLock<HashMap<DestinationId, Arc<Destination<C>>>>,
}

impl<C> Default for DestinationRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> DestinationRegistry<C> {
    pub fn new() -> Self {
        Self {
            destinations: RwLock::new(HashMap::new()),
        }
    }

    /// Add or replace a destination. Replacing drops the old queue.
    pub fn register(&self, destination: Destination<C>) {
        let id = destination.id.clone();
        let mut map = self.destinations.write().expect("registry poisoned");
        if map.insert(id.clone(), Arc::new(destination)).is_some() {
            warn!(destination = %id, "destination replaced");
        } else {
            debug!(destination = %id, "destination registered");
        }
    }

    /// Remove a destination. Its pending queue is dropped, not flushed.
    pub fn unregister(&self, id: &DestinationId) -> bool {
        let removed = self
            .destinations
            .write()
            .expect("registry poisoned")
            .remove(id)
            .is_some();
        if removed {
            debug!(destination = %id, "destination unregistered");
        }
        removed
    }

    /// Append the item to the queue of every destination that accepts it.
    pub fn enqueue(&self, item: QueuedItem, force_send_all: bool) {
        let map = self.destinations.read().expect("registry poisoned");
        for destination in map.values() {
            if destination.accepts(item.level, item.origin.as_ref(), force_send_all) {
                destination.push(item.clone());
            }
        }
    }

    /// Snapshot of all registered destinations.
    pub fn snapshot(&self) -> Vec<Arc<Destination<C>>> {
        self.destinations
            .read()
            .expect("registry poisoned")
            .values()
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.destinations.read().expect("registry poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_item(level: Level, origin: Option<&str>) -> QueuedItem {
        QueuedItem {
            payload: QueuedPayload::Text("[INFO] test: hi\n".to_string()),
            level,
            origin: origin.map(OriginTag::from),
        }
    }

    fn destination(
        id: &str,
        min_level: Level,
        routing: RoutingMode,
        origin: Option<&str>,
    ) -> Destination<()> {
        Destination::new(
            id.into(),
            "chat".into(),
            min_level,
            routing,
            origin.map(OriginTag::from),
            (),
        )
    }

    #[test]
    fn test_broadcast_receives_all_qualifying() {
        let registry = DestinationRegistry::new();
        registry.register(destination("b", Level::Info, RoutingMode::Broadcast, None));

        registry.enqueue(text_item(Level::Warning, Some("client1")), false);
        registry.enqueue(text_item(Level::Debug, None), false);

        let dest = &registry.snapshot()[0];
        assert_eq!(dest.take_queue().len(), 1);
    }

    #[test]
    fn test_exclusive_filters_foreign_origin() {
        let registry = DestinationRegistry::new();
        registry.register(destination(
            "x",
            Level::Info,
            RoutingMode::Exclusive,
            Some("client1"),
        ));

        registry.enqueue(text_item(Level::Error, Some("client1")), false);
        registry.enqueue(text_item(Level::Error, Some("client2")), false);
        registry.enqueue(text_item(Level::Error, None), false);

        // own origin + untagged pass, foreign origin does not
        let dest = &registry.snapshot()[0];
        assert_eq!(dest.take_queue().len(), 2);
    }

    #[test]
    fn test_force_send_all_overrides_routing() {
        let registry = DestinationRegistry::new();
        registry.register(destination(
            "x",
            Level::Info,
            RoutingMode::Exclusive,
            Some("client1"),
        ));

        registry.enqueue(text_item(Level::Error, Some("client2")), true);
        assert_eq!(registry.snapshot()[0].take_queue().len(), 1);
    }

    #[test]
    fn test_level_threshold_still_applies_under_force() {
        let registry = DestinationRegistry::new();
        registry.register(destination("w", Level::Warning, RoutingMode::Broadcast, None));

        registry.enqueue(text_item(Level::Info, None), true);
        assert!(registry.snapshot()[0].take_queue().is_empty());
    }

    #[test]
    fn test_take_queue_clears() {
        let registry = DestinationRegistry::new();
        registry.register(destination("b", Level::Debug, RoutingMode::Broadcast, None));
        registry.enqueue(text_item(Level::Info, None), false);

        let dest = &registry.snapshot()[0];
        assert_eq!(dest.take_queue().len(), 1);
        assert!(dest.take_queue().is_empty());
    }

    #[test]
    fn test_reregister_drops_queue() {
        let registry = DestinationRegistry::new();
        registry.register(destination("b", Level::Debug, RoutingMode::Broadcast, None));
        registry.enqueue(text_item(Level::Info, None), false);

        registry.register(destination("b", Level::Debug, RoutingMode::Broadcast, None));
        assert!(registry.snapshot()[0].take_queue().is_empty());
    }
}
