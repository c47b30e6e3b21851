use crate::error::{AnalysisError, Result};
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinSet;

pub const MAX_POOL_SIZE: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolSnapshot {
    pub limit: usize,
    pub queue_capacity: usize,
    pub in_flight: usize,
    pub queued: usize,
}

#[derive(Debug, Default)]
struct Counters {
    in_flight: AtomicUsize,
    queued: AtomicUsize,
}

/// Process-wide bound on matcher work.
///
/// `workers` caps how many jobs execute at once; `queue` caps how many may wait for a worker.
/// A job holds its queue slot until it starts running. [`WorkerPool::try_reserve`] never
/// waits, so callers decide whether to drain their own work or give up.
#[derive(Debug)]
pub struct WorkerPool {
    workers: Arc<Semaphore>,
    queue: Arc<Semaphore>,
    limit: usize,
    queue_capacity: usize,
    counters: Arc<Counters>,
}

impl WorkerPool {
    pub fn new(limit: usize, queue_capacity: usize) -> Self {
        let limit = limit.clamp(1, MAX_POOL_SIZE);
        let queue_capacity = queue_capacity.max(1);
        Self {
            workers: Arc::new(Semaphore::new(limit)),
            queue: Arc::new(Semaphore::new(queue_capacity)),
            limit,
            queue_capacity,
            counters: Arc::new(Counters::default()),
        }
    }

    pub fn snapshot(&self) -> PoolSnapshot {
        PoolSnapshot {
            limit: self.limit,
            queue_capacity: self.queue_capacity,
            in_flight: self.counters.in_flight.load(Ordering::Relaxed),
            queued: self.counters.queued.load(Ordering::Relaxed),
        }
    }

    /// Take a queue slot, or `None` when `queue_capacity` jobs are already waiting.
    pub fn try_reserve(&self) -> Option<QueueSlot> {
        Arc::clone(&self.queue).try_acquire_owned().ok().map(QueueSlot)
    }

    pub fn queue_full(&self) -> AnalysisError {
        AnalysisError::internal(format!(
            "worker pool queue is full ({} waiting)",
            self.queue_capacity
        ))
    }

    /// Queue `job` on `tasks` under `slot`; it runs on the blocking pool once a worker
    /// slot frees up, and gives the queue slot back when it starts.
    pub fn spawn<T, F>(&self, slot: QueueSlot, tasks: &mut JoinSet<Result<T>>, job: F)
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let waiting = QueuedGuard::new(Arc::clone(&self.counters), slot.0);
        let workers = Arc::clone(&self.workers);
        let counters = Arc::clone(&self.counters);

        tasks.spawn(async move {
            let permit = workers
                .acquire_owned()
                .await
                .map_err(|_| AnalysisError::internal("worker pool is closed"))?;
            drop(waiting);
            let running = RunningGuard::new(counters, permit);

            let output = tokio::task::spawn_blocking(move || {
                let _running = running;
                job()
            })
            .await
            .map_err(|err| AnalysisError::internal(format!("matcher task failed: {err}")))?;
            Ok(output)
        });
    }
}

/// A reserved place in the pool queue
#[derive(Debug)]
pub struct QueueSlot(OwnedSemaphorePermit);

struct QueuedGuard {
    counters: Arc<Counters>,
    _slot: OwnedSemaphorePermit,
}

impl QueuedGuard {
    fn new(counters: Arc<Counters>, slot: OwnedSemaphorePermit) -> Self {
        counters.queued.fetch_add(1, Ordering::Relaxed);
        Self {
            counters,
            _slot: slot,
        }
    }
}

impl Drop for QueuedGuard {
    fn drop(&mut self) {
        self.counters.queued.fetch_sub(1, Ordering::Relaxed);
    }
}

struct RunningGuard {
    counters: Arc<Counters>,
    _permit: OwnedSemaphorePermit,
}

impl RunningGuard {
    fn new(counters: Arc<Counters>, permit: OwnedSemaphorePermit) -> Self {
        counters.in_flight.fetch_add(1, Ordering::Relaxed);
        Self {
            counters,
            _permit: permit,
        }
    }
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.counters.in_flight.fetch_sub(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn pool_size_is_clamped() {
        assert_eq!(WorkerPool::new(0, 4).snapshot().limit, 1);
        assert_eq!(WorkerPool::new(10_000, 4).snapshot().limit, MAX_POOL_SIZE);
        assert_eq!(WorkerPool::new(3, 0).snapshot().queue_capacity, 1);
    }

    #[tokio::test]
    async fn jobs_run_and_counters_settle() {
        let pool = WorkerPool::new(2, 16);
        let mut tasks = JoinSet::new();
        for i in 0..8usize {
            let slot = pool.try_reserve().unwrap();
            pool.spawn(slot, &mut tasks, move || i * 2);
        }

        let mut outputs = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            outputs.push(joined.unwrap().unwrap());
        }
        outputs.sort_unstable();
        assert_eq!(outputs, vec![0, 2, 4, 6, 8, 10, 12, 14]);

        let snapshot = pool.snapshot();
        assert_eq!(snapshot.in_flight, 0);
        assert_eq!(snapshot.queued, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn full_queue_refuses_reservation() {
        let pool = WorkerPool::new(1, 1);
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let mut tasks = JoinSet::new();

        // Occupies the only worker until released.
        let slot = pool.try_reserve().unwrap();
        pool.spawn(slot, &mut tasks, move || {
            let _ = release_rx.recv_timeout(Duration::from_secs(10));
        });
        while pool.snapshot().in_flight == 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        // Takes the only queue slot.
        let slot = pool.try_reserve().unwrap();
        pool.spawn(slot, &mut tasks, || ());
        assert!(pool.try_reserve().is_none());
        let err = pool.queue_full();
        assert_eq!(err.code(), "INTERNAL_ERROR");
        assert!(err.to_string().contains("queue is full"), "{err}");

        release_tx.send(()).unwrap();
        while let Some(joined) = tasks.join_next().await {
            joined.unwrap().unwrap();
        }
        assert_eq!(pool.snapshot().queued, 0);
        assert!(pool.try_reserve().is_some());
    }

    #[tokio::test]
    async fn panicking_job_surfaces_as_internal_error() {
        let pool = WorkerPool::new(1, 4);
        let mut tasks: JoinSet<Result<()>> = JoinSet::new();
        let slot = pool.try_reserve().unwrap();
        pool.spawn(slot, &mut tasks, || panic!("boom"));

        let err = tasks.join_next().await.unwrap().unwrap().unwrap_err();
        assert_eq!(err.code(), "INTERNAL_ERROR");
        assert_eq!(pool.snapshot().in_flight, 0);
    }
}
