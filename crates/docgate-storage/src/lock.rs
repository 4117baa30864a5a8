//! Per-topic mutual exclusion for storage mutations.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::trace;

use docgate_core::types::TopicId;

/// Registry of one async mutex per topic.
///
/// Every code path that allocates a version, writes artifacts, or replaces
/// a topic's files holds the topic's guard for the whole sequence, so two
/// concurrent saves can never allocate the same version number.
#[derive(Debug, Default)]
pub struct TopicLocks {
    /// Topic id → mutex.
    locks: DashMap<TopicId, Arc<Mutex<()>>>,
}

/// Held while a topic is being mutated. Dropping it releases the topic.
#[derive(Debug)]
pub struct TopicGuard {
    /// Locked topic.
    topic: TopicId,
    /// The owned guard.
    _guard: OwnedMutexGuard<()>,
}

impl Drop for TopicGuard {
    fn drop(&mut self) {
        trace!(topic = %self.topic, "Topic unlocked");
    }
}

impl TopicLocks {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until the topic is free and locks it.
    pub async fn lock(&self, topic: &TopicId) -> TopicGuard {
        // Clone the Arc out so the DashMap shard is not held across the await.
        let mutex = self
            .locks
            .entry(topic.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let guard = mutex.lock_owned().await;
        trace!(topic = %topic, "Topic locked");

        TopicGuard {
            topic: topic.clone(),
            _guard: guard,
        }
    }

    /// Drops mutexes nobody holds or waits on.
    pub fn prune(&self) {
        self.locks.retain(|_, mutex| Arc::strong_count(mutex) > 1);
    }

    /// Number of tracked topics.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Whether no topic is tracked.
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
