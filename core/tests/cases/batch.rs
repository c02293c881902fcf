use crate::common::{run_batch, TestHarness};
use trinode_core::analytics::mean;
use trinode_core::*;

#[test]
fn test_first_batch_run_matches_single_run() {
    let runs = run_batch(&RunConfig::default(), 3);

    let mut single = TestHarness::new();
    single.run();

    assert_eq!(runs[0], single.stats(), "Run 1 should use the base seed");
    assert_eq!(runs[1].run_index, 2);
    assert_eq!(runs[2].run_index, 3);
}

#[test]
fn test_batch_runs_are_independent() {
    let runs = run_batch(&RunConfig::default().with_horizon(500.0), 5);
    for (i, a) in runs.iter().enumerate() {
        for b in &runs[i + 1..] {
            assert_ne!(
                a.counters, b.counters,
                "Runs {} and {} replayed the same stream",
                a.run_index, b.run_index
            );
        }
    }
}

#[test]
fn test_summary_averages_runs() {
    let runs = run_batch(&RunConfig::default().with_horizon(500.0), 5);
    let summary = summarize(&runs);

    assert_eq!(summary.runs, 5);
    assert_eq!(summary.averages.len(), Metric::ALL.len());
    for metric in Metric::ALL {
        let values: Vec<f64> = runs.iter().map(|r| r.metric(metric)).collect();
        let avg = summary.average(metric).unwrap();
        assert!((avg - mean(&values)).abs() < 1e-12, "{} average", metric.label());
    }

    for metric in Metric::TIMES {
        let ci = summary.interval(metric).unwrap();
        let avg = summary.average(metric).unwrap();
        assert!(ci.low <= avg && avg <= ci.high, "{} interval misses its mean", metric.label());
    }
    assert!(summary.interval(Metric::UtilizationC1).is_none());
}

#[test]
fn test_batch_is_reproducible() {
    let config = RunConfig::default().with_seed(99).with_horizon(200.0);
    assert_eq!(run_batch(&config, 3), run_batch(&config, 3));
}
