//! Text rendering of run statistics and batch summaries.

use std::io::{self, Write};
use trinode_core::{BatchSummary, Category, Metric, RunStats};

const RULE_WIDTH: usize = 40;

/// Fractions are reported as percentages.
fn display_value(metric: Metric, value: f64) -> f64 {
    if metric.unit() == "%" {
        value * 100.0
    } else {
        value
    }
}

fn interval_label(metric: Metric) -> &'static str {
    match metric {
        Metric::TimeC2 => "Time (C2)",
        Metric::TimeC3 => "Time (C3)",
        Metric::TimeRejected => "Time (Rejected)",
        _ => "Total Time",
    }
}

fn category_label(category: Category) -> &'static str {
    match category {
        Category::C2Success => "C2 completed",
        Category::C3Success => "C3 completed",
        Category::C3Rejected => "C3 rejected",
    }
}

fn banner<W: Write>(out: &mut W, title: &str) -> io::Result<()> {
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
    writeln!(out, "{:^width$}", title, width = RULE_WIDTH)?;
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))
}

fn metric_line<W: Write>(out: &mut W, metric: Metric, value: f64) -> io::Result<()> {
    writeln!(
        out,
        "{:<24}: {:.4} {}",
        metric.label(),
        display_value(metric, value),
        metric.unit()
    )
}

/// Every scalar metric of one run, followed by counts and sojourn quantiles.
pub fn write_run<W: Write>(out: &mut W, stats: &RunStats) -> io::Result<()> {
    for metric in Metric::ALL {
        metric_line(out, metric, stats.metric(metric))?;
    }
    for category in Category::ALL {
        writeln!(
            out,
            "{:<24}: {}",
            category_label(category),
            stats.category(category).count
        )?;
    }
    writeln!(out, "{:<24}: {}", "Still in system", stats.in_flight)?;
    writeln!(
        out,
        "{:<24}: p50 {:.3} s, p95 {:.3} s, p99 {:.3} s, max {:.3} s",
        "Time in system",
        stats.sojourn.p50,
        stats.sojourn.p95,
        stats.sojourn.p99,
        stats.sojourn.max
    )?;
    let c = &stats.counters;
    writeln!(
        out,
        "{:<24}: C2 {}, C3 {}, rejected {}, sent by C1 {}",
        "Counters", c.arrivals_c2, c.arrivals_c3, c.rejected_by_c3, c.sent_by_c1
    )
}

pub fn write_run_summaries<W: Write>(out: &mut W, runs: &[RunStats]) -> io::Result<()> {
    banner(out, "RUN SUMMARIES")?;
    for stats in runs {
        writeln!(
            out,
            "Run {:>2}: Avg total time = {:.2} s | Efficiency = {:.2}",
            stats.run_index,
            stats.metric(Metric::TimeAll),
            stats.metric(Metric::EfficiencyAll)
        )?;
    }
    Ok(())
}

pub fn write_summary<W: Write>(out: &mut W, summary: &BatchSummary) -> io::Result<()> {
    writeln!(out)?;
    banner(out, "AVERAGE METRICS")?;
    for &(metric, value) in &summary.averages {
        metric_line(out, metric, value)?;
    }

    writeln!(out)?;
    banner(out, "95% CONFIDENCE INTERVALS")?;
    for &(metric, ci) in &summary.intervals {
        writeln!(
            out,
            "{:<18}: [{:.2}, {:.2}] s",
            interval_label(metric),
            ci.low,
            ci.high
        )?;
    }
    Ok(())
}

/// The full results document: per-run details, then the batch summary.
pub fn write_results<W: Write>(
    out: &mut W,
    runs: &[RunStats],
    summary: &BatchSummary,
) -> io::Result<()> {
    writeln!(out, "=== DETAILED RUN STATISTICS ===\n")?;
    for stats in runs {
        writeln!(out, "--- Run {} ---", stats.run_index)?;
        write_run(out, stats)?;
        writeln!(out)?;
    }
    write_run_summaries(out, runs)?;
    write_summary(out, summary)
}
