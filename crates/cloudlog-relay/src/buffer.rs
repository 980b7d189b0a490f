// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Bounded FIFO buffer with drop-oldest eviction.
//!
//! The buffer is the single point of contention between the capture path and
//! the dispatch path; callers share it behind a mutex and keep critical
//! sections short. Overflow is not an error: the oldest entry is evicted so
//! the buffer always holds the most recent entries.

use crate::entry::LogEntry;
use std::collections::VecDeque;

#[derive(Debug)]
pub struct LogBuffer {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl LogBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        LogBuffer {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an entry, evicting the oldest one first when at capacity.
    /// Never fails and never blocks.
    pub fn enqueue(&mut self, entry: LogEntry) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Remove and return the oldest entry, if any.
    pub fn dequeue(&mut self) -> Option<LogEntry> {
        self.entries.pop_front()
    }

    /// Remove and return every entry in FIFO order.
    pub fn drain_all(&mut self) -> Vec<LogEntry> {
        self.entries.drain(..).collect()
    }

    /// Discard all entries. Used when a guest session is detected and guest
    /// logging is disabled.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::LogSeverity;
    use proptest::prelude::*;

    fn entry(message: &str) -> LogEntry {
        LogEntry::new(message, LogSeverity::Log)
    }

    fn messages(buffer: &mut LogBuffer) -> Vec<String> {
        buffer.drain_all().into_iter().map(|e| e.message).collect()
    }

    #[test]
    fn test_evicts_oldest_at_capacity() {
        let mut buffer = LogBuffer::new(3);
        for message in ["A", "B", "C", "D"] {
            buffer.enqueue(entry(message));
        }

        assert_eq!(buffer.len(), 3);
        assert_eq!(messages(&mut buffer), vec!["B", "C", "D"]);
    }

    #[test]
    fn test_dequeue_is_fifo() {
        let mut buffer = LogBuffer::new(10);
        buffer.enqueue(entry("first"));
        buffer.enqueue(entry("second"));
        buffer.enqueue(entry("third"));

        assert_eq!(buffer.dequeue().unwrap().message, "first");
        assert_eq!(buffer.dequeue().unwrap().message, "second");
        assert_eq!(buffer.dequeue().unwrap().message, "third");
        assert!(buffer.dequeue().is_none());
    }

    #[test]
    fn test_clear_empties_buffer() {
        let mut buffer = LogBuffer::new(5);
        for i in 0..5 {
            buffer.enqueue(entry(&format!("entry-{i}")));
        }

        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.len(), 0);
    }

    #[test]
    fn test_zero_capacity_clamps_to_one() {
        let mut buffer = LogBuffer::new(0);
        buffer.enqueue(entry("only"));
        buffer.enqueue(entry("newer"));

        assert_eq!(buffer.capacity(), 1);
        assert_eq!(messages(&mut buffer), vec!["newer"]);
    }

    proptest! {
        // Whatever the enqueue sequence, the buffer ends up holding exactly
        // the last `capacity` entries in arrival order.
        #[test]
        fn test_retains_most_recent_entries(
            incoming in prop::collection::vec("[a-z]{1,8}", 0..200),
            capacity in 1usize..32,
        ) {
            let mut buffer = LogBuffer::new(capacity);
            for message in &incoming {
                buffer.enqueue(entry(message));
            }

            let expected: Vec<String> = incoming
                .iter()
                .rev()
                .take(capacity)
                .rev()
                .cloned()
                .collect();
            prop_assert_eq!(messages(&mut buffer), expected);
        }
    }
}
