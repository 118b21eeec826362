//! Host event queues.
//!
//! Channels deliver readiness notifications by queueing events on the host's
//! cooperative event queue. Events run to completion, in FIFO order, on
//! whatever loop drains the queue; nothing here spawns threads.
//!
//! - [`LocalEventQueue`] - drained explicitly with [`LocalEventQueue::run_pending`]
//! - [`TokioEventQueue`] - drained by an [`EventPump`] task on a Tokio runtime

use std::collections::VecDeque;

use parking_lot::Mutex;
use tokio::sync::mpsc;

/// A deferred callback waiting on the host event queue.
pub type QueuedEvent = Box<dyn FnOnce() + Send + 'static>;

/// Host event queue.
pub trait EventQueue: Send + Sync {
    /// Append an event to the tail of the queue.
    ///
    /// Returns false if the queue no longer runs events; the event has
    /// then been dropped without running.
    fn queue(&self, event: QueuedEvent) -> bool;
}

/// FIFO queue drained by the owner's loop.
#[derive(Default)]
pub struct LocalEventQueue {
    events: Mutex<VecDeque<QueuedEvent>>,
}

impl std::fmt::Debug for LocalEventQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalEventQueue")
            .field("pending", &self.len())
            .finish()
    }
}

impl LocalEventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of events waiting to run.
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run the event at the head of the queue, if any.
    ///
    /// The lock is released before the event runs, so events may queue
    /// further events.
    pub fn service_one(&self) -> bool {
        let event = self.events.lock().pop_front();
        match event {
            Some(event) => {
                event();
                true
            }
            None => false,
        }
    }

    /// Run events until the queue is empty, including any queued while
    /// running. Returns how many ran.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        while self.service_one() {
            ran += 1;
        }
        ran
    }
}

impl EventQueue for LocalEventQueue {
    fn queue(&self, event: QueuedEvent) -> bool {
        self.events.lock().push_back(event);
        true
    }
}

/// Queue whose events are run by an [`EventPump`] on a Tokio runtime.
#[derive(Debug, Clone)]
pub struct TokioEventQueue {
    tx: mpsc::UnboundedSender<QueuedEvent>,
}

/// Receiving half of a [`TokioEventQueue`].
#[derive(Debug)]
pub struct EventPump {
    rx: mpsc::UnboundedReceiver<QueuedEvent>,
}

impl TokioEventQueue {
    /// Create a queue and the pump that drains it.
    pub fn new() -> (Self, EventPump) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, EventPump { rx })
    }
}

impl EventQueue for TokioEventQueue {
    fn queue(&self, event: QueuedEvent) -> bool {
        // A dropped pump means the host loop is gone; the event and whatever
        // it owns are released here instead.
        if self.tx.send(event).is_err() {
            tracing::debug!("event pump gone, dropping queued event");
            return false;
        }
        true
    }
}

impl EventPump {
    /// Run events as they arrive until every queue handle is dropped.
    pub async fn run(mut self) {
        while let Some(event) = self.rx.recv().await {
            event();
        }
    }

    /// Run every event already queued, without waiting for more.
    pub fn run_ready(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(event) = self.rx.try_recv() {
            event();
            ran += 1;
        }
        ran
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_local_queue_fifo() {
        let queue = LocalEventQueue::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        for i in 0..3 {
            let log = log.clone();
            queue.queue(Box::new(move || log.lock().push(i)));
        }
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.run_pending(), 3);
        assert_eq!(*log.lock(), vec![0, 1, 2]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_local_queue_reentrant() {
        let queue = Arc::new(LocalEventQueue::new());
        let count = Arc::new(AtomicUsize::new(0));

        let inner_queue = queue.clone();
        let inner_count = count.clone();
        queue.queue(Box::new(move || {
            inner_count.fetch_add(1, Ordering::SeqCst);
            let again = inner_count.clone();
            inner_queue.queue(Box::new(move || {
                again.fetch_add(1, Ordering::SeqCst);
            }));
        }));

        assert_eq!(queue.run_pending(), 2);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_tokio_pump() {
        let (queue, pump) = TokioEventQueue::new();
        let count = Arc::new(AtomicUsize::new(0));
        for _ in 0..4 {
            let count = count.clone();
            queue.queue(Box::new(move || {
                count.fetch_add(1, Ordering::SeqCst);
            }));
        }
        drop(queue);
        pump.run().await;
        assert_eq!(count.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_queue_after_pump_dropped() {
        let (queue, pump) = TokioEventQueue::new();
        drop(pump);
        let ran = Arc::new(AtomicUsize::new(0));
        let r = ran.clone();
        assert!(!queue.queue(Box::new(move || {
            r.fetch_add(1, Ordering::SeqCst);
        })));
        assert_eq!(ran.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_run_ready_without_runtime() {
        let (queue, mut pump) = TokioEventQueue::new();
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        queue.queue(Box::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(pump.run_ready(), 1);
        assert_eq!(pump.run_ready(), 0);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
