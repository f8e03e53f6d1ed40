//! Fixed-capacity worker pool.
//!
//! `submit` waits for a free slot before spawning, so a producer that submits
//! faster than jobs finish is throttled instead of queueing work in memory.
//! Tasks report their own results; the pool only tracks that they ended.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinSet;

/// Bounds the number of concurrently running tasks to `capacity`.
pub struct WorkerPool {
    slots: Arc<Semaphore>,
    capacity: usize,
    active: Arc<AtomicUsize>,
    tasks: JoinSet<()>,
}

/// Held by a running task; frees its slot when dropped.
struct SlotGuard {
    _permit: OwnedSemaphorePermit,
    active: Arc<AtomicUsize>,
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::AcqRel);
    }
}

impl WorkerPool {
    /// `capacity` is clamped to at least 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: Arc::new(Semaphore::new(capacity)),
            capacity,
            active: Arc::new(AtomicUsize::new(0)),
            tasks: JoinSet::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Tasks currently holding a slot.
    pub fn active(&self) -> usize {
        self.active.load(Ordering::Acquire)
    }

    /// Run `task` on a free worker, waiting until one is available.
    pub async fn submit<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        // The semaphore is never closed, so acquisition only fails if that changes.
        let Ok(permit) = Arc::clone(&self.slots).acquire_owned().await else {
            tracing::error!("worker pool semaphore closed; dropping task");
            return;
        };
        self.active.fetch_add(1, Ordering::AcqRel);
        let guard = SlotGuard {
            _permit: permit,
            active: Arc::clone(&self.active),
        };
        self.tasks.spawn(async move {
            let _guard = guard;
            task.await;
        });
        self.reap_finished();
    }

    /// Drop bookkeeping for tasks that already ended.
    fn reap_finished(&mut self) {
        while let Some(res) = self.tasks.try_join_next() {
            if let Err(e) = res {
                tracing::error!("worker task ended abnormally: {}", e);
            }
        }
    }

    /// Wait for every submitted task to finish.
    pub async fn drain(mut self) {
        while let Some(res) = self.tasks.join_next().await {
            if let Err(e) = res {
                tracing::error!("worker task ended abnormally: {}", e);
            }
        }
    }
}
