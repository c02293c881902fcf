//! Post-run statistics.
//!
//! Everything here is a pure function of the finished run: the message list,
//! per-processor busy totals, trio time and counters. Only terminal messages
//! (those with a finish time) contribute.

use hdrhistogram::Histogram;
use serde::{Deserialize, Serialize};

use crate::components::{Message, Origin, ProcessorId};
use crate::engine::{Counters, Simulation};
use crate::error::SimResult;

/// z-value for a two-sided 95% interval.
pub const Z_95: f64 = 1.96;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    C2Success,
    C3Success,
    C3Rejected,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::C2Success, Category::C3Success, Category::C3Rejected];

    /// `None` for messages still in the system.
    pub fn of(msg: &Message) -> Option<Category> {
        if !msg.is_terminal() {
            return None;
        }
        Some(match (msg.rejected, msg.origin) {
            (true, _) => Category::C3Rejected,
            (false, Origin::C2) => Category::C2Success,
            (false, Origin::C3) => Category::C3Success,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub low: f64,
    pub high: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub count: usize,
    /// Mean time in the system.
    pub mean_time: f64,
    /// Mean of queue-wait / time-in-system.
    pub efficiency: f64,
    pub mean_time_ci: ConfidenceInterval,
}

impl CategoryStats {
    /// `samples` holds `(time_in_system, queue_wait)` pairs.
    pub fn from_samples(samples: &[(f64, f64)]) -> Self {
        let totals: Vec<f64> = samples.iter().map(|&(t, _)| t).collect();
        Self {
            count: samples.len(),
            mean_time: mean(&totals),
            efficiency: efficiency(samples),
            mean_time_ci: confidence_interval(&totals),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Utilization {
    pub c1: f64,
    pub c2: f64,
    pub c3: f64,
}

impl Utilization {
    pub fn get(&self, id: ProcessorId) -> f64 {
        match id {
            ProcessorId::C1 => self.c1,
            ProcessorId::C2 => self.c2,
            ProcessorId::C3 => self.c3,
        }
    }
}

/// Time-in-system quantiles, in seconds, at millisecond resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SojournPercentiles {
    pub p50: f64,
    pub p95: f64,
    pub p99: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    pub run_index: u32,
    pub horizon: f64,
    pub c2_success: CategoryStats,
    pub c3_success: CategoryStats,
    pub c3_rejected: CategoryStats,
    pub overall: CategoryStats,
    pub utilization: Utilization,
    pub trio_time: f64,
    pub trio_fraction: f64,
    pub counters: Counters,
    pub messages_created: usize,
    pub in_flight: usize,
    pub sojourn: SojournPercentiles,
}

impl RunStats {
    pub fn category(&self, category: Category) -> &CategoryStats {
        match category {
            Category::C2Success => &self.c2_success,
            Category::C3Success => &self.c3_success,
            Category::C3Rejected => &self.c3_rejected,
        }
    }

    pub fn metric(&self, metric: Metric) -> f64 {
        match metric {
            Metric::TimeC2 => self.c2_success.mean_time,
            Metric::TimeC3 => self.c3_success.mean_time,
            Metric::TimeRejected => self.c3_rejected.mean_time,
            Metric::TimeAll => self.overall.mean_time,
            Metric::EfficiencyC2 => self.c2_success.efficiency,
            Metric::EfficiencyC3 => self.c3_success.efficiency,
            Metric::EfficiencyRejected => self.c3_rejected.efficiency,
            Metric::EfficiencyAll => self.overall.efficiency,
            Metric::UtilizationC1 => self.utilization.c1,
            Metric::UtilizationC2 => self.utilization.c2,
            Metric::UtilizationC3 => self.utilization.c3,
            Metric::TrioTime => self.trio_time,
            Metric::TrioFraction => self.trio_fraction,
        }
    }
}

/// Scalar metrics reported for every run and averaged across a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    TimeC2,
    TimeC3,
    TimeRejected,
    TimeAll,
    EfficiencyC2,
    EfficiencyC3,
    EfficiencyRejected,
    EfficiencyAll,
    UtilizationC1,
    UtilizationC2,
    UtilizationC3,
    TrioTime,
    TrioFraction,
}

impl Metric {
    pub const ALL: [Metric; 13] = [
        Metric::TimeC2,
        Metric::TimeC3,
        Metric::TimeRejected,
        Metric::TimeAll,
        Metric::EfficiencyC2,
        Metric::EfficiencyC3,
        Metric::EfficiencyRejected,
        Metric::EfficiencyAll,
        Metric::UtilizationC1,
        Metric::UtilizationC2,
        Metric::UtilizationC3,
        Metric::TrioTime,
        Metric::TrioFraction,
    ];

    /// Mean-time metrics, for which cross-run intervals are reported.
    pub const TIMES: [Metric; 4] = [
        Metric::TimeC2,
        Metric::TimeC3,
        Metric::TimeRejected,
        Metric::TimeAll,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Metric::TimeC2 => "Avg time (C2)",
            Metric::TimeC3 => "Avg time (C3)",
            Metric::TimeRejected => "Avg time (Rejected)",
            Metric::TimeAll => "Avg total time",
            Metric::EfficiencyC2 => "Efficiency (C2)",
            Metric::EfficiencyC3 => "Efficiency (C3)",
            Metric::EfficiencyRejected => "Efficiency (Rejected)",
            Metric::EfficiencyAll => "Overall efficiency",
            Metric::UtilizationC1 => "Utilization (C1)",
            Metric::UtilizationC2 => "Utilization (C2)",
            Metric::UtilizationC3 => "Utilization (C3)",
            Metric::TrioTime => "Total trio time",
            Metric::TrioFraction => "Trio occupancy",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Metric::TimeC2
            | Metric::TimeC3
            | Metric::TimeRejected
            | Metric::TimeAll
            | Metric::TrioTime => "s",
            Metric::UtilizationC1
            | Metric::UtilizationC2
            | Metric::UtilizationC3
            | Metric::TrioFraction => "%",
            _ => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub runs: usize,
    pub averages: Vec<(Metric, f64)>,
    /// Interval of each mean-time metric across runs.
    pub intervals: Vec<(Metric, ConfidenceInterval)>,
}

impl BatchSummary {
    pub fn average(&self, metric: Metric) -> Option<f64> {
        self.averages.iter().find(|(m, _)| *m == metric).map(|&(_, v)| v)
    }

    pub fn interval(&self, metric: Metric) -> Option<ConfidenceInterval> {
        self.intervals.iter().find(|(m, _)| *m == metric).map(|&(_, ci)| ci)
    }
}

pub fn summarize(runs: &[RunStats]) -> BatchSummary {
    let series = |metric: Metric| -> Vec<f64> { runs.iter().map(|r| r.metric(metric)).collect() };
    BatchSummary {
        runs: runs.len(),
        averages: Metric::ALL.iter().map(|&m| (m, mean(&series(m)))).collect(),
        intervals: Metric::TIMES
            .iter()
            .map(|&m| (m, confidence_interval(&series(m))))
            .collect(),
    }
}

pub fn collect(sim: &Simulation) -> SimResult<RunStats> {
    compute(
        sim.config().run_index,
        sim.horizon(),
        sim.messages(),
        [
            sim.processor(ProcessorId::C1).busy_time(),
            sim.processor(ProcessorId::C2).busy_time(),
            sim.processor(ProcessorId::C3).busy_time(),
        ],
        sim.trio_time(),
        sim.counters(),
    )
}

/// `busy` holds the accumulated busy time of C1, C2 and C3, in that order.
pub fn compute(
    run_index: u32,
    horizon: f64,
    messages: &[Message],
    busy: [f64; 3],
    trio_time: f64,
    counters: Counters,
) -> SimResult<RunStats> {
    let mut c2 = Vec::new();
    let mut c3 = Vec::new();
    let mut rejected = Vec::new();
    let mut all = Vec::new();
    let mut histogram = Histogram::<u64>::new(3)?;

    for msg in messages {
        let category = match Category::of(msg) {
            Some(c) => c,
            None => continue,
        };
        let total = msg.sojourn().unwrap_or(0.0);
        let wait = msg.queue_wait().unwrap_or(0.0);
        let sample = (total, wait);
        match category {
            Category::C2Success => c2.push(sample),
            Category::C3Success => c3.push(sample),
            Category::C3Rejected => rejected.push(sample),
        }
        all.push(sample);
        histogram.record((total.max(0.0) * 1000.0).round() as u64)?;
    }

    let ratio = |x: f64| if horizon > 0.0 { x / horizon } else { 0.0 };
    let sojourn = if histogram.is_empty() {
        SojournPercentiles::default()
    } else {
        SojournPercentiles {
            p50: histogram.value_at_quantile(0.50) as f64 / 1000.0,
            p95: histogram.value_at_quantile(0.95) as f64 / 1000.0,
            p99: histogram.value_at_quantile(0.99) as f64 / 1000.0,
            max: histogram.max() as f64 / 1000.0,
        }
    };

    Ok(RunStats {
        run_index,
        horizon,
        c2_success: CategoryStats::from_samples(&c2),
        c3_success: CategoryStats::from_samples(&c3),
        c3_rejected: CategoryStats::from_samples(&rejected),
        overall: CategoryStats::from_samples(&all),
        utilization: Utilization {
            c1: ratio(busy[0]),
            c2: ratio(busy[1]),
            c3: ratio(busy[2]),
        },
        trio_time,
        trio_fraction: ratio(trio_time),
        counters,
        messages_created: messages.len(),
        in_flight: messages.len() - all.len(),
        sojourn,
    })
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation; 0 for fewer than two values.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}

/// Normal-approximation 95% interval of the mean; `(0, 0)` below two samples.
pub fn confidence_interval(values: &[f64]) -> ConfidenceInterval {
    if values.len() < 2 {
        return ConfidenceInterval::default();
    }
    let m = mean(values);
    let h = Z_95 * std_dev(values) / (values.len() as f64).sqrt();
    ConfidenceInterval { low: m - h, high: m + h }
}

/// Mean of `wait / total` over `(total, wait)` pairs.
pub fn efficiency(samples: &[(f64, f64)]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let ratios: Vec<f64> = samples
        .iter()
        .map(|&(total, wait)| if total > 0.0 { wait / total } else { 0.0 })
        .collect();
    mean(&ratios)
}
