//! Deadline scheduler
//!
//! Single-threaded replacement for timer callbacks. The owner schedules
//! tasks against explicit [`Instant`]s and drives them by calling
//! [`Scheduler::poll`] from its own loop; nothing fires between polls, so
//! task execution is always interleaved deterministically with the owner's
//! other work. Every scheduled task can be cancelled through the
//! [`TaskHandle`] returned at scheduling time.

use std::time::{Duration, Instant};

/// Identifies one scheduled task for cancellation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

#[derive(Debug, Clone, Copy)]
enum Repeat {
    Once,
    Every(Duration),
}

#[derive(Debug)]
struct Entry<T> {
    handle: TaskHandle,
    due: Instant,
    seq: u64,
    repeat: Repeat,
    task: T,
}

/// Deadline-ordered task queue driven by explicit polls
#[derive(Debug)]
pub struct Scheduler<T> {
    entries: Vec<Entry<T>>,
    next_id: u64,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }
}

impl<T: Clone> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, due: Instant, repeat: Repeat, task: T) -> TaskHandle {
        let handle = TaskHandle(self.next_id);
        let seq = self.next_id;
        self.next_id += 1;
        self.entries.push(Entry {
            handle,
            due,
            seq,
            repeat,
            task,
        });
        handle
    }

    /// Schedule `task` to fire once at `now + delay`
    pub fn schedule_once(&mut self, now: Instant, delay: Duration, task: T) -> TaskHandle {
        self.push(now + delay, Repeat::Once, task)
    }

    /// Schedule `task` to fire every `period`, first at `now + period`.
    ///
    /// Re-arming happens at poll time relative to the poll instant, so a
    /// stalled owner gets one fire per poll rather than a burst of missed
    /// intervals.
    pub fn schedule_repeating(&mut self, now: Instant, period: Duration, task: T) -> TaskHandle {
        self.push(now + period, Repeat::Every(period), task)
    }

    /// Cancel a pending task. Returns false when the handle already fired
    /// (one-shot) or was cancelled before.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.handle != handle);
        self.entries.len() < before
    }

    /// Drop every pending task
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// The earliest pending deadline, for sleep sizing in the driving loop
    pub fn next_due(&self) -> Option<Instant> {
        self.entries.iter().map(|entry| entry.due).min()
    }

    /// Collect every task due at or before `now`, in deadline order (ties
    /// break by scheduling order). One-shots are consumed; repeating tasks
    /// re-arm at `now + period`.
    pub fn poll(&mut self, now: Instant) -> Vec<T> {
        let mut due: Vec<usize> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.due <= now)
            .map(|(index, _)| index)
            .collect();
        due.sort_by_key(|&index| (self.entries[index].due, self.entries[index].seq));

        let mut fired = Vec::with_capacity(due.len());
        let mut consumed = Vec::new();
        for index in due {
            let entry = &mut self.entries[index];
            fired.push(entry.task.clone());
            match entry.repeat {
                Repeat::Once => consumed.push(index),
                Repeat::Every(period) => entry.due = now + period,
            }
        }
        consumed.sort_unstable_by(|a, b| b.cmp(a));
        for index in consumed {
            self.entries.remove(index);
        }
        fired
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
