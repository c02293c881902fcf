use serde::{Deserialize, Serialize};
use std::fmt;

use crate::components::ProcessorId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MessageId(pub u64);

impl MessageId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// External entry point of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Origin {
    C2,
    C3,
}

impl Origin {
    pub fn processor(self) -> ProcessorId {
        match self {
            Origin::C2 => ProcessorId::C2,
            Origin::C3 => ProcessorId::C3,
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.processor(), f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Disposition {
    Completed,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub origin: Origin,
    pub arrival_time: f64,
    pub start_queue_time: Option<f64>,
    pub start_proc_time: Option<f64>,
    /// Set once, when the message leaves the system.
    pub finish_time: Option<f64>,
    pub rejected: bool,
    /// Times C1 sent the message back to its origin.
    pub recirculations: u32,
}

impl Message {
    pub fn new(id: MessageId, origin: Origin, arrival_time: f64) -> Self {
        Self {
            id,
            origin,
            arrival_time,
            start_queue_time: Some(arrival_time),
            start_proc_time: None,
            finish_time: None,
            rejected: false,
            recirculations: 0,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.finish_time.is_some()
    }

    pub fn disposition(&self) -> Option<Disposition> {
        self.finish_time.map(|_| {
            if self.rejected {
                Disposition::Rejected
            } else {
                Disposition::Completed
            }
        })
    }

    /// Total time in the system, for terminal messages.
    pub fn sojourn(&self) -> Option<f64> {
        self.finish_time.map(|t| t - self.arrival_time)
    }

    /// Time spent waiting in the origin queue during the last pass.
    pub fn queue_wait(&self) -> Option<f64> {
        match (self.start_queue_time, self.start_proc_time) {
            (Some(q), Some(p)) => Some(p - q),
            _ => None,
        }
    }

    pub(crate) fn requeue(&mut self, now: f64) {
        self.start_queue_time = Some(now);
        self.recirculations += 1;
    }

    pub(crate) fn reject(&mut self, now: f64) {
        self.rejected = true;
        self.finish_time = Some(now);
    }

    pub(crate) fn complete(&mut self, now: f64) {
        self.finish_time = Some(now);
    }
}
