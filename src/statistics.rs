//! Cross-run summaries: one scalar per run per metric, reduced to a mean, a spread and normal confidence intervals.

use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Confidence levels with their two-sided standard normal quantiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConfidenceLevel {
    P90,
    P95,
    P99,
}

impl ConfidenceLevel {
    pub fn z(self) -> f64 {
        match self {
            Self::P90 => 1.645,
            Self::P95 => 1.960,
            Self::P99 => 2.576,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
}

impl ConfidenceInterval {
    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }

    pub fn half_width(&self) -> f64 {
        (self.upper - self.lower) / 2.0
    }
}

impl Display for ConfidenceInterval {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "({:.3}, {:.3})", self.lower, self.upper)
    }
}

/// Normal-approximation interval `mean ± z·sqrt(variance / n)`. Both bounds are NaN when `n` is zero.
pub fn normal_confidence_interval(n: usize, mean: f64, variance: f64, level: ConfidenceLevel) -> ConfidenceInterval {
    let half_width = level.z() * (variance / n as f64).sqrt();
    ConfidenceInterval {
        lower: mean - half_width,
        upper: mean + half_width,
    }
}

/// One metric across runs.
///
/// `std` is the population standard deviation of the samples. A summary of no samples has NaN statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSummary {
    pub samples: Vec<f64>,
    pub mean: f64,
    pub std: f64,
    pub ci_95: ConfidenceInterval,
    pub ci_99: ConfidenceInterval,
}

impl MetricSummary {
    pub fn from_samples(samples: Vec<f64>) -> Self {
        let n = samples.len() as f64;
        let mean = samples.iter().sum::<f64>() / n;
        let variance = samples.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / n;

        Self {
            ci_95: normal_confidence_interval(samples.len(), mean, variance, ConfidenceLevel::P95),
            ci_99: normal_confidence_interval(samples.len(), mean, variance, ConfidenceLevel::P99),
            mean,
            std: variance.sqrt(),
            samples,
        }
    }

    pub fn count(&self) -> usize {
        self.samples.len()
    }

    pub fn confidence_interval(&self, level: ConfidenceLevel) -> ConfidenceInterval {
        normal_confidence_interval(self.samples.len(), self.mean, self.std * self.std, level)
    }
}

impl Display for MetricSummary {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "mean {:.3}, std {:.3}, 95% CI {} over {} runs",
            self.mean,
            self.std,
            self.ci_95,
            self.samples.len()
        )
    }
}

/// Fixed-width bucket counts starting at zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub bin_width: f64,
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Count `values` into buckets `[k·bin_width, (k+1)·bin_width)`. Negative or NaN values are not counted.
    pub fn from_values<I>(values: I, bin_width: f64) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let mut counts: Vec<usize> = Vec::new();
        for value in values {
            if !(value >= 0.0) {
                continue;
            }
            let bin = (value / bin_width).floor() as usize;
            if counts.len() <= bin {
                counts.resize(bin + 1, 0);
            }
            counts[bin] += 1;
        }
        Self { bin_width, counts }
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Statistics of a single queue over all runs of a scenario.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueueStatistics {
    pub queue: usize,
    /// Per run, the time-weighted mean length of this queue.
    pub queue_length: MetricSummary,
    /// Per run, the mean waiting time in this queue. Runs in which it served nobody are left out.
    pub waiting_time: MetricSummary,
    /// Time-weighted `P(Q = k)`, averaged over runs.
    pub queue_length_distribution: Vec<f64>,
    /// Waiting times of every customer of this queue, over all runs.
    pub waiting_time_histogram: Histogram,
}

impl QueueStatistics {
    pub fn metrics(&self) -> Vec<(&'static str, &MetricSummary)> {
        vec![("queue_length", &self.queue_length), ("waiting_time", &self.waiting_time)]
    }
}

/// Statistics of the whole canteen over all runs of a scenario.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanteenStatistics {
    /// Group arrival rate of the scenario, in groups per second.
    pub arrival_rate: f64,
    pub runs: usize,
    /// Runs aborted by an error and left out of every summary.
    pub failed_runs: usize,
    /// Per run, the mean over queues of their time-weighted mean lengths.
    pub queue_length: MetricSummary,
    /// Per run, the mean waiting time over every customer served.
    pub waiting_time: MetricSummary,
    /// Per run, the time-weighted mean number of customers inside.
    pub customers_in_canteen: MetricSummary,
    pub sojourn_customer: MetricSummary,
    pub sojourn_group: MetricSummary,
    /// Time-weighted `P(Q = k)`, averaged over queues and runs.
    pub queue_length_distribution: Vec<f64>,
    pub waiting_time_histogram: Histogram,
    /// Occupancy steps `(time, customers inside)` of every run, ordered by time.
    pub canteen_occupancy: Vec<(f64, usize)>,
}

impl CanteenStatistics {
    pub fn metrics(&self) -> Vec<(&'static str, &MetricSummary)> {
        vec![
            ("queue_length", &self.queue_length),
            ("waiting_time", &self.waiting_time),
            ("customers_in_canteen", &self.customers_in_canteen),
            ("sojourn_customer", &self.sojourn_customer),
            ("sojourn_group", &self.sojourn_group),
        ]
    }
}

impl Display for CanteenStatistics {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        writeln!(
            f,
            "{:.3} groups/min, {} runs ({} failed)",
            self.arrival_rate * 60.0,
            self.runs,
            self.failed_runs
        )?;
        for (name, summary) in self.metrics() {
            writeln!(f, "  {name}: {summary}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ninety_five_percent_interval() {
        let ci = normal_confidence_interval(100, 5.0, 1.0, ConfidenceLevel::P95);
        assert!((ci.lower - 4.804).abs() < 1e-9, "lower bound {}", ci.lower);
        assert!((ci.upper - 5.196).abs() < 1e-9, "upper bound {}", ci.upper);
        assert!(ci.contains(5.0));
    }

    #[test]
    fn wider_level_gives_wider_interval() {
        let summary = MetricSummary::from_samples(vec![1.0, 2.0, 3.0, 4.0]);
        let p90 = summary.confidence_interval(ConfidenceLevel::P90);
        assert!(p90.half_width() < summary.ci_95.half_width());
        assert!(summary.ci_95.half_width() < summary.ci_99.half_width());
    }

    #[test]
    fn summary_uses_population_std() {
        let summary = MetricSummary::from_samples(vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_eq!(5.0, summary.mean);
        assert_eq!(2.0, summary.std);
        assert_eq!(8, summary.count());
    }

    #[test]
    fn empty_summary_is_nan() {
        let summary = MetricSummary::from_samples(Vec::new());
        assert_eq!(0, summary.count());
        assert!(summary.mean.is_nan());
        assert!(summary.ci_95.lower.is_nan());
    }

    #[test]
    fn histogram_buckets() {
        let histogram = Histogram::from_values([0.0, 9.9, 10.0, 35.0, -1.0], 10.0);
        assert_eq!(vec![2, 1, 0, 1], histogram.counts);
        assert_eq!(4, histogram.total());
    }
}
