use trinode_core::{Event, MessageId, Observer, ProcessorId, Snapshot};

/// Prints the system state after every handled event.
pub struct ConsoleObserver;

fn ids(queue: &[MessageId]) -> String {
    let items: Vec<String> = queue.iter().map(|id| id.0.to_string()).collect();
    format!("[{}]", items.join(", "))
}

impl Observer for ConsoleObserver {
    fn on_step(&mut self, event: &Event, snapshot: &Snapshot) {
        let rule = "-".repeat(50);
        println!("\n{}", rule);
        println!("Run #{} | Clock: {:.2} s", snapshot.run_index, snapshot.clock);
        println!("Event: {} from {}", event.event_type, event.source);

        let order = [ProcessorId::C2, ProcessorId::C3, ProcessorId::C1];
        let views: Vec<_> = order.iter().filter_map(|&id| snapshot.processor(id)).collect();

        let sizes: Vec<String> = views
            .iter()
            .map(|v| format!("{}: {}", v.id, v.queue.len()))
            .collect();
        println!("Queue sizes -> {}", sizes.join(", "));

        println!("Queue contents ->");
        for v in &views {
            println!("   - {}: {}", v.id, ids(&v.queue));
        }

        let states: Vec<String> = views
            .iter()
            .map(|v| match v.current {
                Some(id) => format!("{}: Busy ({})", v.id, id),
                None => format!("{}: Idle", v.id),
            })
            .collect();
        println!("Processor states -> {}", states.join(", "));

        let c = &snapshot.counters;
        println!("Totals so far:");
        println!("   - Messages arrived to C2: {}", c.arrivals_c2);
        println!("   - Messages arrived to C3: {}", c.arrivals_c3);
        println!("   - Messages rejected by C3: {}", c.rejected_by_c3);
        println!("   - Messages sent by C1: {}", c.sent_by_c1);
        println!("   - Trio active time: {:.2} s", snapshot.trio_time);
        println!("   - Pending events: {}", snapshot.pending_events);

        if let Some(id) = snapshot.last_message {
            println!("Last message ID: {}", id.0);
        }
    }
}
