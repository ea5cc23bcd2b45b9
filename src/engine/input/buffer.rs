// Pending input queue shared by producer threads and the logic tick

use super::record::Record;
use crate::core::time::Microseconds;
use parking_lot::Mutex;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Queued record with its arrival sequence number
///
/// The sequence number keeps records with equal timestamps in arrival order,
/// also across a drain and [`requeue`](PendingQueue::requeue).
#[derive(Debug, Clone, Copy)]
pub struct Queued {
    record: Record,
    sequence: u64,
}

impl Queued {
    pub fn record(&self) -> &Record {
        &self.record
    }

    fn key(&self) -> (Microseconds, u64) {
        (self.record.timestamp, self.sequence)
    }
}

impl PartialEq for Queued {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Queued {}

impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Queued {
    // Reversed so the heap top is the oldest record
    fn cmp(&self, other: &Self) -> Ordering {
        other.key().cmp(&self.key())
    }
}

#[derive(Debug, Default)]
struct Inner {
    heap: BinaryHeap<Queued>,
    next_sequence: u64,
}

impl Inner {
    fn push(&mut self, record: Record) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(Queued { record, sequence });
    }
}

/// Thread-safe min-timestamp priority queue of input records
///
/// Any thread may push. Only the logic tick drains. Every operation holds
/// the lock for a single insert or a single batch removal. The queue has
/// no depth limit.
#[derive(Debug, Default)]
pub struct PendingQueue {
    inner: Mutex<Inner>,
}

impl PendingQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record in timestamp order
    pub fn push(&self, record: Record) {
        self.inner.lock().push(record);
    }

    /// Remove and return, oldest first, every record stamped at or before `up_to`
    pub fn drain_ready(&self, up_to: Microseconds) -> Vec<Record> {
        self.drain_ready_limited(up_to, usize::MAX)
    }

    /// Like [`drain_ready`](Self::drain_ready), taking at most `limit` records
    pub fn drain_ready_limited(&self, up_to: Microseconds, limit: usize) -> Vec<Record> {
        self.drain_queued(up_to, limit)
            .into_iter()
            .map(|queued| queued.record)
            .collect()
    }

    /// Remove at most `limit` ready records, keeping their arrival order
    /// so they can be handed back with [`requeue`](Self::requeue)
    pub fn drain_queued(&self, up_to: Microseconds, limit: usize) -> Vec<Queued> {
        let mut inner = self.inner.lock();
        let mut ready = Vec::new();

        while ready.len() < limit {
            match inner.heap.peek() {
                Some(top) if top.record.timestamp <= up_to => {}
                _ => break,
            }
            if let Some(queued) = inner.heap.pop() {
                ready.push(queued);
            }
        }

        ready
    }

    /// Put drained but unprocessed records back with their original order
    pub fn requeue(&self, records: impl IntoIterator<Item = Queued>) {
        let mut inner = self.inner.lock();
        inner.heap.extend(records);
    }

    /// Timestamp of the oldest queued record
    pub fn peek_timestamp(&self) -> Option<Microseconds> {
        self.inner.lock().heap.peek().map(|top| top.record.timestamp)
    }

    /// Number of queued records
    pub fn len(&self) -> usize {
        self.inner.lock().heap.len()
    }

    /// Check if the queue is empty
    pub fn is_empty(&self) -> bool {
        self.inner.lock().heap.is_empty()
    }

    /// Discard every queued record
    pub fn clear(&self) {
        self.inner.lock().heap.clear();
    }
}
