use crate::common::TestHarness;
use std::collections::HashMap;
use trinode_core::*;

const SEEDS: [u32; 4] = [123_456_789, 1, 42, 987_654_321];

fn long_run(seed: u32) -> TestHarness {
    let config = RunConfig::default()
        .with_seed(seed)
        .with_horizon(1000.0)
        .with_trace();
    let mut h = TestHarness::with_config(config);
    h.run();
    h
}

#[test]
fn test_clock_never_goes_back() {
    for seed in SEEDS {
        let h = long_run(seed);
        let times: Vec<f64> = h.sim.trace().iter().map(|e| e.time).collect();
        assert!(
            times.windows(2).all(|w| w[0] <= w[1]),
            "seed {}: events handled out of order",
            seed
        );
        assert!(times.iter().all(|&t| t <= 1000.0), "seed {}: event past horizon", seed);
    }
}

#[test]
fn test_message_timestamps_are_ordered() {
    for seed in SEEDS {
        let h = long_run(seed);
        for msg in h.sim.messages() {
            let queued = msg.start_queue_time.expect("queued on arrival");
            assert!(msg.arrival_time <= queued, "{} queued before arriving", msg.id);
            if let Some(finish) = msg.finish_time {
                let start = msg.start_proc_time.expect("terminal messages were served");
                assert!(queued <= start, "{} served before queueing", msg.id);
                assert!(start <= finish, "{} finished before service", msg.id);
                assert!(msg.sojourn().unwrap() >= 0.0);
                assert!(msg.queue_wait().unwrap() >= 0.0);
            }
        }
    }
}

#[test]
fn test_every_message_accounted_for() {
    for seed in SEEDS {
        let h = long_run(seed);
        let stats = h.stats();
        let categorized: usize = Category::ALL
            .iter()
            .map(|&c| stats.category(c).count)
            .sum();
        assert_eq!(categorized, stats.overall.count);
        assert_eq!(
            categorized + h.sim.in_flight(),
            h.sim.messages().len(),
            "seed {}: categories and in-flight must cover every message",
            seed
        );
        assert_eq!(
            h.count(Category::C3Rejected) as u64,
            h.counters().rejected_by_c3
        );
        assert!(h
            .sim
            .messages()
            .iter()
            .filter(|m| m.rejected)
            .all(|m| m.origin == Origin::C3));
    }
}

#[test]
fn test_utilization_bounded() {
    for seed in SEEDS {
        let stats = long_run(seed).stats();
        for id in ProcessorId::ALL {
            let u = stats.utilization.get(id);
            assert!((0.0..=1.0).contains(&u), "seed {}: {} utilization {}", seed, id, u);
        }
        assert!((0.0..=1.0).contains(&stats.trio_fraction));
        for metric in [
            Metric::EfficiencyC2,
            Metric::EfficiencyC3,
            Metric::EfficiencyRejected,
            Metric::EfficiencyAll,
        ] {
            assert!((0.0..=1.0).contains(&stats.metric(metric)), "{}", metric.label());
        }
    }
}

#[test]
fn test_trio_time_monotone_and_bounded() {
    let mut h = TestHarness::with_horizon(1000.0);
    let mut last = 0.0;
    let mut check = |_: &Event, snap: &Snapshot| {
        assert!(snap.trio_time >= last, "trio time decreased at t={}", snap.clock);
        assert!(snap.trio_time <= snap.clock + 1e-9);
        last = snap.trio_time;
    };
    h.sim.run_with(&mut check);

    let trio = h.sim.trio_time();
    assert!(trio <= h.sim.horizon());
    for id in ProcessorId::ALL {
        assert!(trio <= h.busy_time(id) + 1e-9, "trio exceeds {} busy time", id);
    }
}

#[test]
fn test_in_flight_messages_have_one_location() {
    let mut h = TestHarness::with_horizon(1000.0);
    let mut check = |event: &Event, snap: &Snapshot| {
        let mut seen: HashMap<MessageId, ProcessorId> = HashMap::new();
        for view in &snap.processors {
            assert_eq!(view.busy, view.current.is_some());
            for id in view.current.iter().chain(view.queue.iter()) {
                if let Some(other) = seen.insert(*id, view.id) {
                    panic!("{} held by {} and {} after {}", id, other, view.id, event.event_type);
                }
            }
        }
    };
    h.sim.run_with(&mut check);

    for msg in h.sim.messages() {
        let holders = ProcessorId::ALL
            .iter()
            .filter(|&&id| {
                let p = h.sim.processor(id);
                p.current() == Some(msg.id) || p.queue().contains(&msg.id)
            })
            .count();
        let expected = if msg.is_terminal() { 0 } else { 1 };
        assert_eq!(holders, expected, "{} held by {} processors", msg.id, holders);
    }
}

#[test]
fn test_rejected_messages_never_reach_c1() {
    let mut h = TestHarness::with_horizon(1000.0);
    h.run();

    let rejected: Vec<MessageId> = h
        .sim
        .messages()
        .iter()
        .filter(|m| m.rejected)
        .map(|m| m.id)
        .collect();
    let finished_at_c1: Vec<MessageId> = h
        .sim
        .trace()
        .iter()
        .filter_map(|e| match e.event_type {
            EventType::FinishC1 { message } => Some(message),
            _ => None,
        })
        .collect();
    assert!(!rejected.is_empty());
    for id in rejected {
        let msg = h.sim.message(id).unwrap();
        // A rejected message may have visited C1 before being sent back to C3.
        let visits = finished_at_c1.iter().filter(|&&m| m == id).count();
        assert_eq!(visits as u32, msg.recirculations, "{} reached C1 after rejection", id);
    }
}
