//! Concurrent FIFO of accepted-but-unprocessed contexts.

use crossbeam_queue::{ArrayQueue, SegQueue};

enum Inner<T> {
    Unbounded(SegQueue<T>),
    Bounded(ArrayQueue<T>),
}

/// Multi-producer, multi-consumer FIFO used between the acceptor and the workers.
///
/// `push` and `try_pop` never block. Every item is handed out by exactly one
/// `try_pop`, which is what keeps a context from reaching two workers.
pub struct DispatchQueue<T> {
    inner: Inner<T>,
}

impl<T> DispatchQueue<T> {
    /// Create a queue with no size limit.
    pub fn unbounded() -> Self {
        Self {
            inner: Inner::Unbounded(SegQueue::new()),
        }
    }

    /// Create a queue holding at most `capacity` items.
    ///
    /// # Panics
    /// Panics if `capacity` is zero. Config validation rejects that value first.
    pub fn bounded(capacity: usize) -> Self {
        Self {
            inner: Inner::Bounded(ArrayQueue::new(capacity)),
        }
    }

    /// Create a queue from an optional capacity.
    pub fn with_capacity(capacity: Option<usize>) -> Self {
        match capacity {
            Some(capacity) => Self::bounded(capacity),
            None => Self::unbounded(),
        }
    }

    /// Append an item. A full bounded queue hands the item back.
    pub fn push(&self, item: T) -> Result<(), T> {
        match &self.inner {
            Inner::Unbounded(q) => {
                q.push(item);
                Ok(())
            }
            Inner::Bounded(q) => q.push(item),
        }
    }

    /// Remove the oldest item, if any.
    pub fn try_pop(&self) -> Option<T> {
        match &self.inner {
            Inner::Unbounded(q) => q.pop(),
            Inner::Bounded(q) => q.pop(),
        }
    }

    pub fn len(&self) -> usize {
        match &self.inner {
            Inner::Unbounded(q) => q.len(),
            Inner::Bounded(q) => q.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match &self.inner {
            Inner::Unbounded(q) => q.is_empty(),
            Inner::Bounded(q) => q.is_empty(),
        }
    }

    /// Maximum number of items, `None` when unbounded.
    pub fn capacity(&self) -> Option<usize> {
        match &self.inner {
            Inner::Unbounded(_) => None,
            Inner::Bounded(q) => Some(q.capacity()),
        }
    }
}

impl<T> std::fmt::Debug for DispatchQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchQueue")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};
    use std::thread;

    #[test]
    fn pops_in_arrival_order() {
        let queue = DispatchQueue::unbounded();
        for i in 0..5 {
            queue.push(i).unwrap();
        }
        let drained: Vec<_> = std::iter::from_fn(|| queue.try_pop()).collect();
        assert_eq!(drained, vec![0, 1, 2, 3, 4]);
        assert!(queue.is_empty());
    }

    #[test]
    fn bounded_queue_hands_back_overflow() {
        let queue = DispatchQueue::bounded(2);
        assert_eq!(queue.capacity(), Some(2));
        queue.push("a").unwrap();
        queue.push("b").unwrap();
        assert_eq!(queue.push("c"), Err("c"));
        assert_eq!(queue.try_pop(), Some("a"));
        queue.push("c").unwrap();
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn concurrent_consumers_never_share_an_item() {
        let queue = Arc::new(DispatchQueue::unbounded());
        for i in 0..10_000u32 {
            queue.push(i).unwrap();
        }

        let seen = Arc::new(Mutex::new(Vec::new()));
        let consumers: Vec<_> = (0..4)
            .map(|_| {
                let queue = Arc::clone(&queue);
                let seen = Arc::clone(&seen);
                thread::spawn(move || {
                    let mut local = Vec::new();
                    while let Some(item) = queue.try_pop() {
                        local.push(item);
                    }
                    seen.lock().unwrap().extend(local);
                })
            })
            .collect();
        for c in consumers {
            c.join().unwrap();
        }

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 10_000);
        let unique: HashSet<_> = seen.iter().copied().collect();
        assert_eq!(unique.len(), 10_000);
    }
}
