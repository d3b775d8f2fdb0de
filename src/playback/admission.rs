//! Per-source admission control
//!
//! A source that gets a sound admitted is blocked for the configured
//! debounce window. The block is lifted by a one-shot timer task, not by
//! later traffic. Records live in a sharded map, so sources only contend
//! with sources hashed to the same shard.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::net::IpAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::config::SettingsStore;

/// Network origin of a request. Exact address match, no normalization.
pub type SourceId = IpAddr;

/// A live block on one source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdmissionRecord {
    pub unblock_at: Instant,
    /// Distinguishes this record from a later one for the same source
    generation: u64,
}

/// Debounce gate keyed by source address
pub struct Blocker {
    records: Arc<DashMap<SourceId, AdmissionRecord>>,
    settings: Arc<SettingsStore>,
    generation: AtomicU64,
}

impl Blocker {
    pub fn new(settings: Arc<SettingsStore>) -> Self {
        Self {
            records: Arc::new(DashMap::new()),
            settings,
            generation: AtomicU64::new(0),
        }
    }

    /// Admit `source` if it has no live record, and block it for the
    /// current delay.
    ///
    /// Returns `false` for a blocked source without touching its deadline.
    /// Must be called from within a tokio runtime; the unblock is a spawned
    /// timer task.
    pub fn check_and_block(&self, source: SourceId) -> bool {
        let delay = self.settings.block_delay();

        let record = match self.records.entry(source) {
            Entry::Occupied(_) => return false,
            Entry::Vacant(vacant) => {
                let record = AdmissionRecord {
                    unblock_at: Instant::now() + delay,
                    generation: self.generation.fetch_add(1, Ordering::Relaxed),
                };
                vacant.insert(record);
                record
            }
        };

        tracing::debug!("Blocked {} for {:?}", source, delay);
        self.schedule_unblock(source, record);
        true
    }

    fn schedule_unblock(&self, source: SourceId, record: AdmissionRecord) {
        let records = Arc::clone(&self.records);
        tokio::spawn(async move {
            tokio::time::sleep_until(record.unblock_at).await;
            // Only ever remove the record this task was scheduled for
            if records
                .remove_if(&source, |_, live| live.generation == record.generation)
                .is_some()
            {
                tracing::debug!("Unblocked {}", source);
            }
        });
    }

    pub fn is_blocked(&self, source: &SourceId) -> bool {
        self.records.contains_key(source)
    }

    /// Remaining block time for `source`, if blocked
    pub fn remaining(&self, source: &SourceId) -> Option<Duration> {
        self.records
            .get(source)
            .map(|record| record.unblock_at.saturating_duration_since(Instant::now()))
    }

    /// Number of currently blocked sources
    pub fn blocked_count(&self) -> usize {
        self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn blocker(delay_ms: u64) -> Blocker {
        let settings = Arc::new(SettingsStore::default());
        settings.set_block_delay(Duration::from_millis(delay_ms));
        Blocker::new(settings)
    }

    fn ip(last: u8) -> SourceId {
        IpAddr::V4(Ipv4Addr::new(192, 168, 1, last))
    }

    #[tokio::test]
    async fn test_only_first_request_admitted() {
        let blocker = blocker(10_000);

        assert!(blocker.check_and_block(ip(1)));
        for _ in 0..5 {
            assert!(!blocker.check_and_block(ip(1)));
        }
        assert_eq!(blocker.blocked_count(), 1);
    }

    #[tokio::test]
    async fn test_sources_are_independent() {
        let blocker = blocker(10_000);

        assert!(blocker.check_and_block(ip(1)));
        assert!(blocker.check_and_block(ip(2)));
        assert!(!blocker.check_and_block(ip(1)));
        assert!(blocker.is_blocked(&ip(2)));
        assert!(!blocker.is_blocked(&ip(3)));
    }

    // On a paused clock the runtime jumps straight to the next timer, so
    // the unblock task always runs before a later wakeup of the test.
    async fn elapse(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_unblocks_after_window() {
        let blocker = blocker(50);

        assert!(blocker.check_and_block(ip(1)));
        assert!(!blocker.check_and_block(ip(1)));

        elapse(45).await;
        assert!(blocker.is_blocked(&ip(1)));

        elapse(10).await;
        assert!(!blocker.is_blocked(&ip(1)));
        assert!(blocker.check_and_block(ip(1)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejection_does_not_extend_deadline() {
        let blocker = blocker(10_000);

        assert!(blocker.check_and_block(ip(1)));
        let before = blocker.remaining(&ip(1)).unwrap();

        elapse(20).await;
        assert!(!blocker.check_and_block(ip(1)));
        let after = blocker.remaining(&ip(1)).unwrap();
        assert!(after < before);
        assert!(after <= Duration::from_millis(9_980));

        elapse(9_990).await;
        assert!(!blocker.is_blocked(&ip(1)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_change_is_not_retroactive() {
        let settings = Arc::new(SettingsStore::default());
        settings.set_block_delay(Duration::from_millis(10_000));
        let blocker = Blocker::new(Arc::clone(&settings));

        assert!(blocker.check_and_block(ip(1)));
        settings.set_block_delay(Duration::from_millis(10));
        assert!(blocker.check_and_block(ip(2)));

        elapse(20).await;

        assert!(blocker.is_blocked(&ip(1)));
        assert!(!blocker.is_blocked(&ip(2)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_checks_admit_once() {
        let blocker = Arc::new(blocker(10_000));
        let mut tasks = Vec::new();
        for _ in 0..32 {
            let blocker = Arc::clone(&blocker);
            tasks.push(tokio::spawn(async move { blocker.check_and_block(ip(7)) }));
        }

        let mut admitted = 0;
        for task in tasks {
            if task.await.unwrap() {
                admitted += 1;
            }
        }
        assert_eq!(admitted, 1);
    }
}
