//! Deferred tasks and the timer seam
//!
//! Timers carry data, not closures: when one fires, the host hands the
//! [`Deferred`] back to the session. Note tasks are tagged with the playback
//! generation they were scheduled under so a seek can invalidate them.

use serde::{Deserialize, Serialize};

/// Work to run once a timer fires
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Deferred {
    /// Re-render MIDI and timemap, then reseek
    Rerender,
    /// Reseek to selection or page
    Reseek,
    /// Stop marking a note as sounding
    Unhighlight { id: String, generation: u64 },
    /// End of score reached
    StopPlayback { generation: u64 },
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(pub u64);

pub trait Scheduler {
    /// Run `task` after `delay_ms`
    fn schedule(&mut self, delay_ms: f64, task: Deferred) -> TimerHandle;

    /// Drop a pending task; unknown handles are ignored
    fn cancel(&mut self, handle: TimerHandle);
}

#[derive(Debug, Clone)]
struct PendingTask {
    due: f64,
    handle: TimerHandle,
    task: Deferred,
}

/// Scheduler driven by an explicit virtual clock
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    now: f64,
    next_handle: u64,
    pending: Vec<PendingTask>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Pending tasks in firing order
    pub fn pending(&self) -> Vec<(f64, Deferred)> {
        let mut tasks: Vec<&PendingTask> = self.pending.iter().collect();
        tasks.sort_by(|a, b| a.due.total_cmp(&b.due).then(a.handle.cmp(&b.handle)));
        tasks.into_iter().map(|p| (p.due, p.task.clone())).collect()
    }

    /// Move the clock forward and return the tasks that came due, in order
    pub fn advance(&mut self, ms: f64) -> Vec<Deferred> {
        self.now += ms.max(0.0);
        let now = self.now;
        let (mut ready, waiting): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|p| p.due <= now);
        self.pending = waiting;
        ready.sort_by(|a, b| a.due.total_cmp(&b.due).then(a.handle.cmp(&b.handle)));
        ready.into_iter().map(|p| p.task).collect()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&mut self, delay_ms: f64, task: Deferred) -> TimerHandle {
        self.next_handle += 1;
        let handle = TimerHandle(self.next_handle);
        self.pending.push(PendingTask { due: self.now + delay_ms.max(0.0), handle, task });
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.pending.retain(|p| p.handle != handle);
    }
}
