//! Per-video mutual exclusion
//!
//! Uploads for the same video run one at a time, from the owner check through
//! the metadata write-back. Different videos never wait on each other.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

type LockMap = HashMap<Uuid, Arc<AsyncMutex<()>>>;

#[derive(Clone, Default)]
pub struct VideoLocks {
    inner: Arc<Mutex<LockMap>>,
}

impl VideoLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self) -> MutexGuard<'_, LockMap> {
        // The map is never left half-updated, so a poisoned lock is still usable.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Wait for exclusive access to `video_id`.
    pub async fn acquire(&self, video_id: Uuid) -> VideoLockGuard {
        let lock = self.map().entry(video_id).or_default().clone();
        let guard = lock.lock_owned().await;
        VideoLockGuard {
            video_id,
            locks: self.clone(),
            guard: Some(guard),
        }
    }

    /// Number of videos currently locked or waited on.
    pub fn len(&self) -> usize {
        self.map().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Held for the duration of one upload. Dropping it releases the video and
/// forgets its entry once nobody else is waiting.
pub struct VideoLockGuard {
    video_id: Uuid,
    locks: VideoLocks,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for VideoLockGuard {
    fn drop(&mut self) {
        self.guard.take();
        let mut map = self.locks.map();
        let unused = map
            .get(&self.video_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1);
        if unused {
            map.remove(&self.video_id);
        }
    }
}
