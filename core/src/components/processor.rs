use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::components::{MessageId, ProcessorId};

/// A single-server station with a FIFO backlog.
///
/// The processor is busy exactly when `current` is set; the message in
/// service is never also in `queue`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Processor {
    pub id: ProcessorId,
    queue: VecDeque<MessageId>,
    current: Option<MessageId>,
    busy_time: f64,
    last_start: f64,
}

impl Processor {
    pub fn new(id: ProcessorId) -> Self {
        Self {
            id,
            queue: VecDeque::new(),
            current: None,
            busy_time: 0.0,
            last_start: 0.0,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<MessageId> {
        self.current
    }

    pub fn queue(&self) -> &VecDeque<MessageId> {
        &self.queue
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn busy_time(&self) -> f64 {
        self.busy_time
    }

    pub fn last_start(&self) -> f64 {
        self.last_start
    }

    pub(crate) fn enqueue(&mut self, msg: MessageId) {
        self.queue.push_back(msg);
    }

    /// Moves the head of the queue into service. `None` if the queue is empty.
    pub(crate) fn begin_next(&mut self, now: f64) -> Option<MessageId> {
        debug_assert!(self.current.is_none(), "{} started while busy", self.id);
        let msg = self.queue.pop_front()?;
        self.current = Some(msg);
        self.last_start = now;
        Some(msg)
    }

    /// Ends the current service, accumulating its duration.
    pub(crate) fn finish(&mut self, now: f64) -> Option<MessageId> {
        let msg = self.current.take()?;
        self.busy_time += now - self.last_start;
        Some(msg)
    }
}
