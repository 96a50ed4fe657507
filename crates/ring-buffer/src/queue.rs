//! Drop-oldest queue implementation

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use tokio::sync::Notify;

struct QueueState<T> {
    items: VecDeque<T>,
    closed: bool,
}

/// Bounded single-consumer queue that overwrites its oldest item when full
pub struct FrameQueue<T> {
    /// Pending items and the closed flag
    state: Mutex<QueueState<T>>,
    /// Wakes the consumer on push and close
    notify: Notify,
    /// Maximum pending items
    capacity: usize,
    /// Items evicted because the queue was full
    dropped: AtomicU64,
}

impl<T> FrameQueue<T> {
    /// Create a queue holding at most `capacity` items (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            state: Mutex::new(QueueState {
                items: VecDeque::with_capacity(capacity),
                closed: false,
            }),
            notify: Notify::new(),
            capacity,
            dropped: AtomicU64::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueueState<T>> {
        // A panic while holding the lock cannot leave the deque half-updated.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Push an item, returning the evicted oldest item if the queue was full
    ///
    /// Pushing into a closed queue discards the item and returns it.
    pub fn push(&self, item: T) -> Option<T> {
        let evicted = {
            let mut state = self.lock();
            if state.closed {
                return Some(item);
            }
            let evicted = if state.items.len() >= self.capacity {
                state.items.pop_front()
            } else {
                None
            };
            state.items.push_back(item);
            evicted
        };

        if evicted.is_some() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
        self.notify.notify_one();
        evicted
    }

    /// Wait for the next item; `None` once the queue is closed
    pub async fn pop(&self) -> Option<T> {
        loop {
            {
                let mut state = self.lock();
                if let Some(item) = state.items.pop_front() {
                    return Some(item);
                }
                if state.closed {
                    return None;
                }
            }
            self.notify.notified().await;
        }
    }

    /// Take the next item without waiting
    pub fn try_pop(&self) -> Option<T> {
        self.lock().items.pop_front()
    }

    /// Close the queue, discarding pending items and waking the consumer
    pub fn close(&self) {
        {
            let mut state = self.lock();
            state.closed = true;
            state.items.clear();
        }
        self.notify.notify_one();
    }

    /// Whether `close` has been called
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Number of pending items
    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    /// Check if queue is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the queue capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total items evicted by `push` (for statistics)
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}
