//! Cancellable delayed tasks.
//!
//! DESIGN
//! ======
//! Every scheduled task is wrapped in a guard sharing one atomic state with
//! its `CancelHandle`. The wrapper only runs the task if it wins the
//! `PENDING -> FIRED` transition; `cancel()` only wins `PENDING -> CANCELLED`.
//! That makes `cancel()` safe to call any number of times, before or after
//! the task fires, on every scheduler implementation.
//!
//! Dropping a handle does not cancel its task. Owners cancel explicitly, the
//! same way effect cleanup does in the UI.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

const PENDING: u8 = 0;
const FIRED: u8 = 1;
const CANCELLED: u8 = 2;

/// Deferred unit of work.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Something that can run a task after a delay.
pub trait Scheduler: Send + Sync {
    /// Run `task` once `delay` has elapsed unless the returned handle is cancelled first.
    fn schedule(&self, delay: Duration, task: Task) -> CancelHandle;
}

// =============================================================================
// CANCEL HANDLE
// =============================================================================

/// Handle to a scheduled task.
#[derive(Clone, Debug)]
pub struct CancelHandle {
    state: Arc<AtomicU8>,
}

impl CancelHandle {
    /// Wrap `task` so it only runs while its handle is still pending.
    ///
    /// Scheduler implementations call this and hand the returned task to
    /// their timer; the handle goes back to the caller.
    #[must_use]
    pub fn guard(task: Task) -> (Self, Task) {
        let handle = Self { state: Arc::new(AtomicU8::new(PENDING)) };
        let state = Arc::clone(&handle.state);
        let guarded: Task = Box::new(move || {
            if state.compare_exchange(PENDING, FIRED, Ordering::AcqRel, Ordering::Acquire).is_ok() {
                task();
            }
        });
        (handle, guarded)
    }

    /// Suppress the task if it has not run yet. Idempotent.
    pub fn cancel(&self) {
        let _ = self.state.compare_exchange(PENDING, CANCELLED, Ordering::AcqRel, Ordering::Acquire);
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.state.load(Ordering::Acquire) == PENDING
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.state.load(Ordering::Acquire) == CANCELLED
    }

    #[must_use]
    pub fn has_fired(&self) -> bool {
        self.state.load(Ordering::Acquire) == FIRED
    }
}

// =============================================================================
// TOKIO
// =============================================================================

/// Runs tasks on a tokio runtime after `tokio::time::sleep`.
#[cfg(feature = "tokio")]
#[derive(Clone, Debug)]
pub struct TokioScheduler {
    runtime: tokio::runtime::Handle,
}

#[cfg(feature = "tokio")]
impl TokioScheduler {
    #[must_use]
    pub fn new(runtime: tokio::runtime::Handle) -> Self {
        Self { runtime }
    }

    /// Bind to the runtime of the calling context.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    #[must_use]
    pub fn current() -> Self {
        Self::new(tokio::runtime::Handle::current())
    }
}

#[cfg(feature = "tokio")]
impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> CancelHandle {
        let (handle, task) = CancelHandle::guard(task);
        self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            task();
        });
        handle
    }
}

// =============================================================================
// BROWSER
// =============================================================================

/// Runs tasks from a browser `setTimeout`.
#[cfg(feature = "hydrate")]
#[derive(Clone, Copy, Debug, Default)]
pub struct TimeoutScheduler;

#[cfg(feature = "hydrate")]
impl Scheduler for TimeoutScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> CancelHandle {
        let (handle, task) = CancelHandle::guard(task);
        let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
        // The guard makes an orphaned timeout harmless, so no JS handle is kept.
        gloo_timers::callback::Timeout::new(millis, task).forget();
        handle
    }
}

// =============================================================================
// MANUAL CLOCK
// =============================================================================

/// Virtual-clock scheduler; time only moves when [`ManualScheduler::advance`] is called.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    inner: Arc<Mutex<ManualClock>>,
}

#[derive(Default)]
struct ManualClock {
    now: Duration,
    seq: u64,
    queue: Vec<ManualEntry>,
}

struct ManualEntry {
    due: Duration,
    seq: u64,
    handle: CancelHandle,
    task: Task,
}

impl ManualScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time elapsed since creation.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.lock().now
    }

    /// Tasks neither fired nor cancelled.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.lock().queue.iter().filter(|entry| entry.handle.is_pending()).count()
    }

    /// Move the clock forward, running every task that comes due in deadline
    /// order (scheduling order on ties). Returns how many tasks ran.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.lock().now + by;
        let mut ran = 0;
        loop {
            // Tasks run outside the lock so they may schedule follow-ups.
            let next = {
                let mut clock = self.lock();
                clock.queue.retain(|entry| !entry.handle.is_cancelled());
                let position = clock
                    .queue
                    .iter()
                    .enumerate()
                    .filter(|(_, entry)| entry.due <= target)
                    .min_by_key(|(_, entry)| (entry.due, entry.seq))
                    .map(|(idx, _)| idx);
                position.map(|idx| {
                    let entry = clock.queue.remove(idx);
                    clock.now = clock.now.max(entry.due);
                    entry
                })
            };
            let Some(entry) = next else { break };
            (entry.task)();
            if entry.handle.has_fired() {
                ran += 1;
            }
        }
        self.lock().now = target;
        ran
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ManualClock> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> CancelHandle {
        let (handle, task) = CancelHandle::guard(task);
        let mut clock = self.lock();
        let due = clock.now + delay;
        let seq = clock.seq;
        clock.seq += 1;
        clock.queue.push(ManualEntry { due, seq, handle: handle.clone(), task });
        handle
    }
}

#[cfg(test)]
#[path = "schedule_test.rs"]
mod tests;
