// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! A real-time scheduler that runs deferred tasks on a dedicated worker thread.

use std::cmp::Ordering as CmpOrdering;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use tracing::{debug, error, span, Level};

use super::Task;

/// The deadline used for delays too long to represent as an [`Instant`].
const FAR_FUTURE: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

enum Command {
    Schedule { due: Instant, task: Task },
    Flush(Sender<()>),
    Stop,
}

/// A task waiting for its deadline. Ordered so the earliest deadline is at the
/// top of a max-heap, ties broken by submission order.
struct Pending {
    due: Instant,
    seq: u64,
    task: Task,
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> CmpOrdering {
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Runs scheduled tasks on a worker thread once their deadline passes.
pub struct ThreadScheduler {
    tx: Sender<Command>,
    pending: Arc<AtomicUsize>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl ThreadScheduler {
    /// Starts a new scheduler and its worker thread.
    pub fn new() -> ThreadScheduler {
        let (tx, rx) = crossbeam_channel::unbounded();
        let pending = Arc::new(AtomicUsize::new(0));
        let worker = {
            let pending = pending.clone();
            thread::spawn(move || run(rx, pending))
        };

        ThreadScheduler {
            tx,
            pending,
            worker: Mutex::new(Some(worker)),
        }
    }

    /// Runs every pending task and stops the worker thread. Tasks scheduled
    /// afterwards are dropped without running.
    pub fn shutdown(&self) {
        let Some(worker) = self.worker.lock().take() else {
            return;
        };

        if self.tx.send(Command::Stop).is_err() {
            error!("Scheduler worker exited early");
        }
        if worker.join().is_err() {
            error!("Error while joining scheduler worker");
        }
    }
}

impl Default for ThreadScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ThreadScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl super::Scheduler for ThreadScheduler {
    fn schedule(&self, after: Duration, task: Task) {
        self.pending.fetch_add(1, Ordering::SeqCst);
        let now = Instant::now();
        let due = now
            .checked_add(after)
            .or_else(|| now.checked_add(FAR_FUTURE))
            .unwrap_or(now);
        let command = Command::Schedule { due, task };
        if self.tx.send(command).is_err() {
            self.pending.fetch_sub(1, Ordering::SeqCst);
            error!("Scheduler is shut down, dropping task");
        }
    }

    /// Runs all pending tasks on the worker and waits for them to finish. Must
    /// not be called from inside a scheduled task.
    fn flush(&self) {
        let (ack_tx, ack_rx) = crossbeam_channel::bounded(1);
        if self.tx.send(Command::Flush(ack_tx)).is_err() {
            return;
        }
        if ack_rx.recv().is_err() {
            error!("Scheduler worker exited before flushing");
        }
    }

    fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }
}

fn run(rx: Receiver<Command>, pending: Arc<AtomicUsize>) {
    let span = span!(Level::DEBUG, "scheduler");
    let _enter = span.enter();

    let mut queue: BinaryHeap<Pending> = BinaryHeap::new();
    let mut next_seq = 0u64;

    let run_task = |entry: Pending| {
        (entry.task)();
        pending.fetch_sub(1, Ordering::SeqCst);
    };

    loop {
        let received = match queue.peek() {
            Some(next) => rx.recv_timeout(next.due.saturating_duration_since(Instant::now())),
            None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };

        match received {
            Ok(Command::Schedule { due, task }) => {
                queue.push(Pending {
                    due,
                    seq: next_seq,
                    task,
                });
                next_seq += 1;
            }
            Ok(Command::Flush(ack)) => {
                debug!(tasks = queue.len(), "Flushing scheduled tasks");
                while let Some(entry) = queue.pop() {
                    run_task(entry);
                }
                let _ = ack.send(());
            }
            Ok(Command::Stop) | Err(RecvTimeoutError::Disconnected) => {
                debug!(tasks = queue.len(), "Stopping scheduler");
                while let Some(entry) = queue.pop() {
                    run_task(entry);
                }
                return;
            }
            Err(RecvTimeoutError::Timeout) => {}
        }

        let now = Instant::now();
        while queue.peek().is_some_and(|next| next.due <= now) {
            if let Some(entry) = queue.pop() {
                run_task(entry);
            }
        }
    }
}
