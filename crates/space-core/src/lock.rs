//! Per-claim mutual exclusion.
//!
//! [`ClaimLocks`] hands out one async mutex per claim uid. Locks are created
//! lazily and kept for the lifetime of the registry: the table grows with the
//! number of distinct claims seen by the process, which is bounded by the
//! claims that were active on this controller or node.
use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, Mutex, PoisonError},
};

use space_model::ClaimUid;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::trace;

type LockTable = HashMap<ClaimUid, Arc<AsyncMutex<()>>>;

/// Registry of claim locks.
///
/// Cloning yields a handle to the same table.
#[derive(Clone, Default)]
pub struct ClaimLocks {
    table: Arc<Mutex<LockTable>>,
}

impl ClaimLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until the claim's lock is free and take it.
    ///
    /// Waiters on the same claim are served in FIFO order. Claims with
    /// different uids never wait on each other.
    pub async fn acquire(&self, uid: &ClaimUid) -> ClaimGuard {
        let guard = self.lock_for(uid).lock_owned().await;
        trace!(claim_uid = %uid, "claim lock acquired");
        ClaimGuard {
            uid: uid.clone(),
            _guard: guard,
        }
    }

    /// Take the claim's lock if nobody holds it.
    pub fn try_acquire(&self, uid: &ClaimUid) -> Option<ClaimGuard> {
        let guard = self.lock_for(uid).try_lock_owned().ok()?;
        Some(ClaimGuard {
            uid: uid.clone(),
            _guard: guard,
        })
    }

    /// Number of claims with a lock in the table.
    pub fn len(&self) -> usize {
        self.table().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock_for(&self, uid: &ClaimUid) -> Arc<AsyncMutex<()>> {
        Arc::clone(self.table().entry(uid.clone()).or_default())
    }

    // The table is only touched by non-panicking map operations.
    fn table(&self) -> std::sync::MutexGuard<'_, LockTable> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for ClaimLocks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClaimLocks")
            .field("claims", &self.len())
            .finish()
    }
}

/// Exclusive hold on one claim. Released on drop.
pub struct ClaimGuard {
    uid: ClaimUid,
    _guard: OwnedMutexGuard<()>,
}

impl ClaimGuard {
    pub fn claim(&self) -> &ClaimUid {
        &self.uid
    }
}

impl Drop for ClaimGuard {
    fn drop(&mut self) {
        trace!(claim_uid = %self.uid, "claim lock released");
    }
}

impl fmt::Debug for ClaimGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClaimGuard").field("uid", &self.uid).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        time::Duration,
    };

    use super::*;

    #[tokio::test]
    async fn same_claim_is_exclusive() {
        let locks = ClaimLocks::new();
        let uid = ClaimUid::from("c-1");

        let held = locks.acquire(&uid).await;
        assert!(locks.try_acquire(&uid).is_none());

        drop(held);
        assert!(locks.try_acquire(&uid).is_some());
    }

    #[tokio::test]
    async fn distinct_claims_do_not_block() {
        let locks = ClaimLocks::new();
        let _a = locks.acquire(&ClaimUid::from("c-1")).await;

        let b = tokio::time::timeout(
            Duration::from_millis(100),
            locks.acquire(&ClaimUid::from("c-2")),
        )
        .await;
        assert!(b.is_ok(), "lock for another claim must be granted immediately");
    }

    #[tokio::test]
    async fn locks_are_reused_per_claim() {
        let locks = ClaimLocks::new();
        for _ in 0..3 {
            drop(locks.acquire(&ClaimUid::from("c-1")).await);
        }
        drop(locks.acquire(&ClaimUid::from("c-2")).await);
        assert_eq!(locks.len(), 2);
    }

    #[tokio::test]
    async fn clones_share_the_table() {
        let locks = ClaimLocks::new();
        let other = locks.clone();
        let uid = ClaimUid::from("c-1");

        let _held = locks.acquire(&uid).await;
        assert!(other.try_acquire(&uid).is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn critical_sections_never_overlap() {
        let locks = ClaimLocks::new();
        let inside = Arc::new(AtomicUsize::new(0));
        let overlaps = Arc::new(AtomicUsize::new(0));

        let mut tasks = Vec::new();
        for _ in 0..16 {
            let locks = locks.clone();
            let inside = Arc::clone(&inside);
            let overlaps = Arc::clone(&overlaps);
            tasks.push(tokio::spawn(async move {
                let _guard = locks.acquire(&ClaimUid::from("c-1")).await;
                if inside.fetch_add(1, Ordering::SeqCst) != 0 {
                    overlaps.fetch_add(1, Ordering::SeqCst);
                }
                tokio::time::sleep(Duration::from_millis(2)).await;
                inside.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for t in tasks {
            t.await.unwrap();
        }

        assert_eq!(overlaps.load(Ordering::SeqCst), 0);
    }
}
