//! Future-event list.
//!
//! A `BinaryHeap` of `Reverse<Event>` keyed by `(time, seq)`. Sequence
//! numbers are handed out on insertion, so events at the same timestamp pop
//! in the order they were scheduled.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::components::ProcessorId;
use crate::engine::{Event, EventType};
use crate::error::{SimError, SimResult};

#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    heap: BinaryHeap<Reverse<Event>>,
    next_seq: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, time: f64, source: ProcessorId, event_type: EventType) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(Event {
            time,
            seq,
            source,
            event_type,
        }));
        seq
    }

    pub fn pop_next(&mut self) -> SimResult<Event> {
        self.heap
            .pop()
            .map(|Reverse(event)| event)
            .ok_or(SimError::SchedulerEmpty)
    }

    pub fn peek(&self) -> Option<&Event> {
        self.heap.peek().map(|Reverse(event)| event)
    }

    pub fn peek_time(&self) -> Option<f64> {
        self.peek().map(|e| e.time)
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }
}
