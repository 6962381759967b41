//! Fixed-capacity sliding windows.
//!
//! Storage primitive for every windowed statistic in the controller: the
//! actuator duty history, the mean-wind window, and the optimizer
//! performance windows. Pushing into a full window drops the oldest sample.

use std::collections::VecDeque;

/// Ring buffer keeping the most recent `capacity` samples.
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> RingBuffer<T> {
    /// Create an empty buffer holding at most `capacity` samples.
    ///
    /// # Panics
    /// Panics if capacity is 0.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Ring buffer capacity must be greater than 0");
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a sample, dropping the oldest when the buffer is full.
    pub fn push(&mut self, item: T) {
        if self.items.len() == self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(item);
    }

    /// Number of samples currently held.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True if no samples have been pushed yet.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// True once the buffer holds `capacity` samples.
    pub fn is_full(&self) -> bool {
        self.items.len() == self.capacity
    }

    /// Maximum number of samples the buffer holds.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterate over samples, oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    /// Drop all samples, keeping the capacity.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_buffer() {
        let buf: RingBuffer<f64> = RingBuffer::new(4);
        assert!(buf.is_empty());
        assert!(!buf.is_full());
        assert_eq!(buf.len(), 0);
        assert_eq!(buf.capacity(), 4);
    }

    #[test]
    #[should_panic(expected = "Ring buffer capacity must be greater than 0")]
    fn test_zero_capacity_panics() {
        let _buf: RingBuffer<f64> = RingBuffer::new(0);
    }

    #[test]
    fn test_push_and_iterate_in_order() {
        let mut buf = RingBuffer::new(3);
        buf.push(1);
        buf.push(2);
        assert_eq!(buf.len(), 2);
        assert!(!buf.is_full());

        let items: Vec<i32> = buf.iter().copied().collect();
        assert_eq!(items, vec![1, 2]);
    }

    #[test]
    fn test_oldest_dropped_when_full() {
        let mut buf = RingBuffer::new(3);
        for n in 1..=5 {
            buf.push(n);
        }
        assert!(buf.is_full());
        assert_eq!(buf.len(), 3);

        let items: Vec<i32> = buf.iter().copied().collect();
        assert_eq!(items, vec![3, 4, 5]);
    }

    #[test]
    fn test_clear_keeps_capacity() {
        let mut buf = RingBuffer::new(2);
        buf.push(10);
        buf.push(20);
        buf.clear();
        assert!(buf.is_empty());
        assert_eq!(buf.capacity(), 2);

        buf.push(30);
        let items: Vec<i32> = buf.iter().copied().collect();
        assert_eq!(items, vec![30]);
    }
}
