//! Fixed-capacity overwrite-oldest ring buffer
//!
//! Bounds memory for retained recent samples during a recording session.
//! Unlike an SPSC queue, this buffer is a single-owner container: when
//! full, `push` overwrites the logically oldest element and hands it back
//! to the caller. No internal synchronization is provided; the access
//! model is single-threaded.
//!
//! ## Example
//!
//! ```rust
//! use psg_dsp::ring_buffer::RingBuffer;
//!
//! let mut ring = RingBuffer::new(3).unwrap();
//! ring.push(1);
//! ring.push(2);
//! ring.push(3);
//! assert_eq!(ring.push(4), Some(1)); // oldest evicted
//! assert_eq!(ring.to_vec(), vec![2, 3, 4]);
//! ```

use crate::types::{DspError, DspResult};

/// Fixed-capacity FIFO with overwrite-oldest semantics.
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    /// Backing slots, length == capacity. Occupied slots are `Some`.
    slots: Box<[Option<T>]>,
    /// Index of the logically oldest element.
    head: usize,
    /// Current logical size, always <= capacity.
    len: usize,
}

impl<T> RingBuffer<T> {
    /// Create a ring buffer with the given capacity.
    ///
    /// Returns `DspError::InvalidCapacity` when `capacity` is zero.
    pub fn new(capacity: usize) -> DspResult<Self> {
        if capacity == 0 {
            return Err(DspError::InvalidCapacity(capacity));
        }
        let slots: Vec<Option<T>> = (0..capacity).map(|_| None).collect();
        Ok(Self {
            slots: slots.into_boxed_slice(),
            head: 0,
            len: 0,
        })
    }

    /// Capacity fixed at construction.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Current number of stored elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    #[inline]
    fn physical(&self, logical: usize) -> usize {
        (self.head + logical) % self.capacity()
    }

    /// Append an element, evicting and returning the oldest when full.
    pub fn push(&mut self, value: T) -> Option<T> {
        if self.len < self.capacity() {
            let slot = self.physical(self.len);
            self.slots[slot] = Some(value);
            self.len += 1;
            None
        } else {
            let evicted = self.slots[self.head].replace(value);
            self.head = (self.head + 1) % self.capacity();
            evicted
        }
    }

    /// Append an element only if there is room. Returns false when full.
    pub fn try_push(&mut self, value: T) -> bool {
        if self.is_full() {
            return false;
        }
        self.push(value);
        true
    }

    /// Remove and return the oldest element.
    pub fn dequeue(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        let value = self.slots[self.head].take();
        self.head = (self.head + 1) % self.capacity();
        self.len -= 1;
        value
    }

    /// Inspect the oldest element without removing it.
    pub fn peek(&self) -> Option<&T> {
        if self.len == 0 {
            None
        } else {
            self.slots[self.head].as_ref()
        }
    }

    /// Random access relative to the oldest element (0-indexed).
    ///
    /// Returns `DspError::IndexOutOfRange` outside `[0, len)`.
    pub fn get(&self, index: usize) -> DspResult<&T> {
        if index >= self.len {
            return Err(DspError::IndexOutOfRange {
                index,
                len: self.len,
            });
        }
        Ok(self.slots[self.physical(index)]
            .as_ref()
            .expect("occupied slot"))
    }

    /// Iterate oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        (0..self.len).map(move |i| {
            self.slots[self.physical(i)]
                .as_ref()
                .expect("occupied slot")
        })
    }

    /// Drop all elements without changing capacity.
    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = None;
        }
        self.head = 0;
        self.len = 0;
    }

    /// Push every element of an iterator, retaining only the newest
    /// `capacity` elements when the source is longer.
    pub fn extend_from<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.push(value);
        }
    }
}

impl<T: Clone> RingBuffer<T> {
    /// Snapshot in oldest-to-newest order, independent of later mutation.
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(RingBuffer::<i32>::new(0).is_err());
    }

    #[test]
    fn test_push_below_capacity() {
        let mut ring = RingBuffer::new(4).unwrap();
        assert_eq!(ring.push(1), None);
        assert_eq!(ring.push(2), None);
        assert_eq!(ring.len(), 2);
        assert!(!ring.is_full());
    }

    #[test]
    fn test_overwrite_returns_oldest() {
        let mut ring = RingBuffer::new(3).unwrap();
        for i in 1..=3 {
            assert_eq!(ring.push(i), None);
        }
        // The (C+1)th push evicts the original oldest element.
        assert_eq!(ring.push(4), Some(1));
        assert_eq!(ring.push(5), Some(2));
        assert_eq!(ring.to_vec(), vec![3, 4, 5]);
        assert_eq!(ring.len(), 3);
    }

    #[test]
    fn test_try_push_refuses_when_full() {
        let mut ring = RingBuffer::new(2).unwrap();
        assert!(ring.try_push(1));
        assert!(ring.try_push(2));
        assert!(!ring.try_push(3));
        assert_eq!(ring.to_vec(), vec![1, 2]);
    }

    #[test]
    fn test_dequeue_fifo_order() {
        let mut ring = RingBuffer::new(3).unwrap();
        ring.extend_from([1, 2, 3, 4]);
        assert_eq!(ring.dequeue(), Some(2));
        assert_eq!(ring.dequeue(), Some(3));
        assert_eq!(ring.dequeue(), Some(4));
        assert_eq!(ring.dequeue(), None);
    }

    #[test]
    fn test_peek_and_get() {
        let mut ring = RingBuffer::new(3).unwrap();
        ring.extend_from([10, 20, 30, 40]);
        assert_eq!(ring.peek(), Some(&20));
        assert_eq!(*ring.get(0).unwrap(), 20);
        assert_eq!(*ring.get(2).unwrap(), 40);
        assert!(ring.get(3).is_err());
    }

    #[test]
    fn test_clear_keeps_capacity() {
        let mut ring = RingBuffer::new(2).unwrap();
        ring.extend_from([1, 2, 3]);
        ring.clear();
        assert!(ring.is_empty());
        assert_eq!(ring.capacity(), 2);
        ring.push(9);
        assert_eq!(ring.to_vec(), vec![9]);
    }

    #[test]
    fn test_extend_keeps_newest() {
        let mut ring = RingBuffer::new(3).unwrap();
        ring.extend_from(0..10);
        assert_eq!(ring.to_vec(), vec![7, 8, 9]);
    }

    #[test]
    fn test_push_after_dequeue_wraparound() {
        let mut ring = RingBuffer::new(3).unwrap();
        for round in 0..5 {
            ring.push(round * 10);
            ring.push(round * 10 + 1);
            assert_eq!(ring.dequeue(), Some(round * 10));
            assert_eq!(ring.dequeue(), Some(round * 10 + 1));
        }
        assert!(ring.is_empty());
    }

    #[test]
    fn test_snapshot_independent_of_mutation() {
        let mut ring = RingBuffer::new(3).unwrap();
        ring.extend_from([1, 2, 3]);
        let snapshot = ring.to_vec();
        ring.push(4);
        assert_eq!(snapshot, vec![1, 2, 3]);
    }
}
