use serde::{Deserialize, Serialize};
use std::fmt;

pub mod message;
pub mod processor;

pub use message::{Disposition, Message, MessageId, Origin};
pub use processor::Processor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessorId {
    C1,
    C2,
    C3,
}

impl ProcessorId {
    pub const ALL: [ProcessorId; 3] = [ProcessorId::C1, ProcessorId::C2, ProcessorId::C3];

    pub fn name(self) -> &'static str {
        match self {
            ProcessorId::C1 => "C1",
            ProcessorId::C2 => "C2",
            ProcessorId::C3 => "C3",
        }
    }
}

impl fmt::Display for ProcessorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
