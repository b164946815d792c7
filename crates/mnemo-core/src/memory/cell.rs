//! Single-initialization slot for expensive shared handles.
//!
//! `EmbedderCell` builds its value once and hands every caller the same
//! `Arc`. Unlike `tokio::sync::OnceCell`, a
//! failed construction is reported to every caller that was already waiting
//! on it, instead of each waiter starting its own attempt. The slot stays
//! empty after a failure, so a caller arriving later retries.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use mnemo_types::error::ModelLoadError;
use tokio::sync::Mutex;

/// Bookkeeping for construction attempts. Guarded by the init lock.
#[derive(Default)]
struct Attempts {
    /// Number of finished attempts (success or failure).
    completed: u64,
    /// The most recent failure and the attempt number that produced it.
    last_failure: Option<(u64, ModelLoadError)>,
}

/// Process-lifetime, single-flight cache holding one `Arc<T>`.
pub struct EmbedderCell<T> {
    value: OnceLock<Arc<T>>,
    init_lock: Mutex<Attempts>,
    completed: AtomicU64,
}

impl<T> EmbedderCell<T> {
    pub fn new() -> Self {
        Self {
            value: OnceLock::new(),
            init_lock: Mutex::new(Attempts::default()),
            completed: AtomicU64::new(0),
        }
    }

    /// The cached value, if construction has succeeded.
    pub fn get(&self) -> Option<Arc<T>> {
        self.value.get().cloned()
    }

    pub fn is_initialized(&self) -> bool {
        self.value.get().is_some()
    }

    /// Return the cached value, constructing it with `init` if needed.
    ///
    /// At most one `init` runs at a time. Callers that queue behind a running
    /// attempt receive its outcome: the same `Arc` on success, a clone of the
    /// same [`ModelLoadError`] on failure.
    pub async fn get_or_try_init<F, Fut>(&self, init: F) -> Result<Arc<T>, ModelLoadError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ModelLoadError>>,
    {
        if let Some(value) = self.value.get() {
            return Ok(Arc::clone(value));
        }

        // Attempts finished before this caller arrived. Any failure numbered
        // above this happened while we were queued and is ours to report.
        let seen = self.completed.load(Ordering::Acquire);

        let mut attempts = self.init_lock.lock().await;

        if let Some(value) = self.value.get() {
            return Ok(Arc::clone(value));
        }
        if let Some((attempt, err)) = &attempts.last_failure {
            if *attempt > seen {
                tracing::debug!(attempt, "Sharing failure of concurrent construction");
                return Err(err.clone());
            }
        }

        let attempt = attempts.completed + 1;
        tracing::debug!(attempt, "Constructing shared handle");
        let result = init().await;

        attempts.completed = attempt;
        self.completed.store(attempt, Ordering::Release);

        match result {
            Ok(value) => {
                let value = Arc::new(value);
                attempts.last_failure = None;
                let _ = self.value.set(Arc::clone(&value));
                Ok(value)
            }
            Err(err) => {
                tracing::warn!(attempt, error = %err, "Shared handle construction failed");
                attempts.last_failure = Some((attempt, err.clone()));
                Err(err)
            }
        }
    }
}

impl<T> Default for EmbedderCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use tokio::sync::Barrier;

    use super::*;

    struct Handle {
        id: usize,
    }

    fn load_error() -> ModelLoadError {
        ModelLoadError {
            model: "test-model".to_string(),
            reason: "weights missing".to_string(),
        }
    }

    #[tokio::test]
    async fn sequential_calls_share_one_instance() {
        let cell = EmbedderCell::new();
        let builds = AtomicUsize::new(0);
        let builds = &builds;

        let first = cell
            .get_or_try_init(|| async move {
                builds.fetch_add(1, Ordering::SeqCst);
                Ok(Handle { id: 7 })
            })
            .await
            .unwrap();
        let second = cell
            .get_or_try_init(|| async move {
                builds.fetch_add(1, Ordering::SeqCst);
                Ok(Handle { id: 8 })
            })
            .await
            .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.id, 7);
        assert_eq!(builds.load(Ordering::SeqCst), 1);
        assert!(cell.is_initialized());
        assert!(Arc::ptr_eq(&cell.get().unwrap(), &first));
    }

    #[tokio::test]
    async fn get_before_init_is_none() {
        let cell: EmbedderCell<Handle> = EmbedderCell::default();
        assert!(cell.get().is_none());
        assert!(!cell.is_initialized());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_first_calls_construct_once() {
        const CALLERS: usize = 16;
        let cell = Arc::new(EmbedderCell::new());
        let builds = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(CALLERS));

        let mut tasks = Vec::new();
        for _ in 0..CALLERS {
            let cell = Arc::clone(&cell);
            let builds = Arc::clone(&builds);
            let barrier = Arc::clone(&barrier);
            tasks.push(tokio::spawn(async move {
                barrier.wait().await;
                cell.get_or_try_init(move || async move {
                    let id = builds.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(200)).await;
                    Ok(Handle { id })
                })
                .await
            }));
        }

        let mut handles = Vec::new();
        for task in tasks {
            handles.push(task.await.unwrap().unwrap());
        }

        assert_eq!(builds.load(Ordering::SeqCst), 1);
        assert!(handles.iter().all(|h| Arc::ptr_eq(h, &handles[0])));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_failure_is_shared_then_retried() {
        const CALLERS: usize = 8;
        let cell: Arc<EmbedderCell<Handle>> = Arc::new(EmbedderCell::new());
        let builds = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(CALLERS));

        let mut tasks = Vec::new();
        for _ in 0..CALLERS {
            let cell = Arc::clone(&cell);
            let builds = Arc::clone(&builds);
            let barrier = Arc::clone(&barrier);
            tasks.push(tokio::spawn(async move {
                barrier.wait().await;
                cell.get_or_try_init(move || async move {
                    builds.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(200)).await;
                    Err(load_error())
                })
                .await
            }));
        }

        for task in tasks {
            let err = task.await.unwrap().err().unwrap();
            assert_eq!(err, load_error());
        }
        assert_eq!(builds.load(Ordering::SeqCst), 1);
        assert!(!cell.is_initialized());

        // A caller arriving after the failure gets a fresh attempt.
        let retry_builds = Arc::clone(&builds);
        let handle = cell
            .get_or_try_init(move || async move {
                retry_builds.fetch_add(1, Ordering::SeqCst);
                Ok(Handle { id: 42 })
            })
            .await
            .unwrap();
        assert_eq!(handle.id, 42);
        assert_eq!(builds.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failure_does_not_poison_the_slot() {
        let cell: EmbedderCell<Handle> = EmbedderCell::new();

        let err = cell
            .get_or_try_init(|| async { Err(load_error()) })
            .await
            .err()
            .unwrap();
        assert_eq!(err.model, "test-model");

        let handle = cell
            .get_or_try_init(|| async { Ok(Handle { id: 1 }) })
            .await
            .unwrap();
        assert_eq!(handle.id, 1);
    }

    #[tokio::test]
    async fn cancelled_construction_lets_next_caller_retry() {
        let cell: EmbedderCell<Handle> = EmbedderCell::new();

        let stalled = cell.get_or_try_init(|| async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(Handle { id: 0 })
        });
        let timed_out = tokio::time::timeout(Duration::from_millis(20), stalled).await;
        assert!(timed_out.is_err());

        let handle = cell
            .get_or_try_init(|| async { Ok(Handle { id: 2 }) })
            .await
            .unwrap();
        assert_eq!(handle.id, 2);
    }
}
