use crate::engine::{Event, Snapshot};

/// Receives a read-only view of the run after each handled event.
pub trait Observer {
    fn on_step(&mut self, event: &Event, snapshot: &Snapshot);
}

impl<F> Observer for F
where
    F: FnMut(&Event, &Snapshot),
{
    fn on_step(&mut self, event: &Event, snapshot: &Snapshot) {
        self(event, snapshot)
    }
}
