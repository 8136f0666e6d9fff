use crate::statistics::{CanteenStatistics, Histogram, MetricSummary, QueueStatistics};
use crate::{Error, SimResults, SimulationConfig};

use std::fmt::{Display, Formatter};

/// Runs of one arrival-rate scenario.
#[derive(Debug, Clone)]
pub struct ScenarioHistory {
    arrival_rate: f64,
    runs: Vec<SimResults>,
    failed_runs: usize,
}

impl ScenarioHistory {
    /// Group arrival rate, in groups per second.
    pub fn arrival_rate(&self) -> f64 {
        self.arrival_rate
    }

    pub fn runs(&self) -> &[SimResults] {
        &self.runs
    }

    pub fn failed_runs(&self) -> usize {
        self.failed_runs
    }
}

/// Results of every successful run, grouped by scenario, and the statistics derived from them.
///
/// Failed runs are only counted. Each statistic is computed from one scalar per run; runs for which a metric is
/// undefined, such as the mean waiting time of a queue that never served anyone, add no sample to it.
#[derive(Debug, Clone)]
pub struct SimHistory {
    num_queues: usize,
    waiting_time_bin_width: f64,
    scenarios: Vec<ScenarioHistory>,
}

impl SimHistory {
    /// Empty history with one scenario per arrival rate of `config`.
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            num_queues: config.num_queues,
            waiting_time_bin_width: config.waiting_time_bin_width,
            scenarios: config
                .arrival_rate_scenarios
                .iter()
                .map(|&arrival_rate| ScenarioHistory {
                    arrival_rate,
                    runs: Vec::new(),
                    failed_runs: 0,
                })
                .collect(),
        }
    }

    /// # Errors
    ///
    /// Returns [`Error::Configuration`] for an unknown scenario.
    pub fn add_sim_run(&mut self, scenario: usize, results: SimResults) -> crate::Result {
        self.scenario_mut(scenario)?.runs.push(results);
        Ok(())
    }

    /// Count a run of `scenario` that was aborted and will not enter the statistics.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] for an unknown scenario.
    pub fn record_failed_run(&mut self, scenario: usize) -> crate::Result {
        self.scenario_mut(scenario)?.failed_runs += 1;
        Ok(())
    }

    pub fn scenarios(&self) -> &[ScenarioHistory] {
        &self.scenarios
    }

    /// # Errors
    ///
    /// Returns [`Error::Configuration`] for an unknown scenario.
    pub fn scenario(&self, scenario: usize) -> crate::Result<&ScenarioHistory> {
        self.scenarios.get(scenario).ok_or_else(|| {
            Error::Configuration(format!("unknown scenario {scenario} of {}", self.scenarios.len()))
        })
    }

    fn scenario_mut(&mut self, scenario: usize) -> crate::Result<&mut ScenarioHistory> {
        let count = self.scenarios.len();
        self.scenarios
            .get_mut(scenario)
            .ok_or_else(|| Error::Configuration(format!("unknown scenario {scenario} of {count}")))
    }

    pub fn num_queues(&self) -> usize {
        self.num_queues
    }

    /// Statistics of all queues together for one scenario.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] for an unknown scenario.
    pub fn statistics_for_all_queues(&self, scenario: usize) -> crate::Result<CanteenStatistics> {
        let history = self.scenario(scenario)?;
        let runs = &history.runs;

        let queue_length = runs
            .iter()
            .map(|run| {
                let means = run.mean_queue_length();
                means.iter().sum::<f64>() / means.len() as f64
            })
            .collect();

        let mut canteen_occupancy: Vec<(f64, usize)> = runs.iter().flat_map(SimResults::canteen_series).collect();
        canteen_occupancy.sort_by(|a, b| a.0.total_cmp(&b.0));

        Ok(CanteenStatistics {
            arrival_rate: history.arrival_rate,
            runs: runs.len(),
            failed_runs: history.failed_runs,
            queue_length: MetricSummary::from_samples(queue_length),
            waiting_time: MetricSummary::from_samples(runs.iter().filter_map(SimResults::mean_waiting_time_all).collect()),
            customers_in_canteen: MetricSummary::from_samples(
                runs.iter().map(SimResults::mean_canteen_occupancy).collect(),
            ),
            sojourn_customer: MetricSummary::from_samples(
                runs.iter().filter_map(SimResults::mean_sojourn_customer).collect(),
            ),
            sojourn_group: MetricSummary::from_samples(runs.iter().filter_map(SimResults::mean_sojourn_group).collect()),
            queue_length_distribution: average_distributions(
                runs.iter().map(SimResults::pooled_queue_length_distribution),
                runs.len(),
            ),
            waiting_time_histogram: Histogram::from_values(
                runs.iter().flat_map(SimResults::all_waiting_times),
                self.waiting_time_bin_width,
            ),
            canteen_occupancy,
        })
    }

    /// Statistics of queue `queue` for one scenario.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] for an unknown scenario or queue.
    pub fn statistics_for_queue(&self, scenario: usize, queue: usize) -> crate::Result<QueueStatistics> {
        let history = self.scenario(scenario)?;
        if queue >= self.num_queues {
            return Err(Error::Configuration(format!("unknown queue {queue} of {}", self.num_queues)));
        }
        let runs = &history.runs;

        Ok(QueueStatistics {
            queue,
            queue_length: MetricSummary::from_samples(
                runs.iter()
                    .filter_map(|run| run.mean_queue_length().get(queue).copied())
                    .collect(),
            ),
            waiting_time: MetricSummary::from_samples(
                runs.iter().filter_map(|run| run.mean_waiting_time(queue)).collect(),
            ),
            queue_length_distribution: average_distributions(
                runs.iter().map(|run| run.queue_length_distribution(queue)),
                runs.len(),
            ),
            waiting_time_histogram: Histogram::from_values(
                runs.iter().flat_map(|run| run.waiting_times(queue).iter().copied()),
                self.waiting_time_bin_width,
            ),
        })
    }

    /// Whole-canteen statistics of every scenario, in scenario order.
    ///
    /// # Errors
    ///
    /// Never fails for a history built by [`SimHistory::new()`]; the signature mirrors
    /// [`statistics_for_all_queues()`](SimHistory::statistics_for_all_queues).
    pub fn statistics(&self) -> crate::Result<Vec<CanteenStatistics>> {
        (0..self.scenarios.len())
            .map(|scenario| self.statistics_for_all_queues(scenario))
            .collect()
    }
}

/// Element-wise mean of `count` distributions of possibly different lengths.
fn average_distributions<I>(distributions: I, count: usize) -> Vec<f64>
where
    I: IntoIterator<Item = Vec<f64>>,
{
    let mut average: Vec<f64> = Vec::new();
    if count == 0 {
        return average;
    }
    for distribution in distributions {
        if average.len() < distribution.len() {
            average.resize(distribution.len(), 0.0);
        }
        for (k, p) in distribution.into_iter().enumerate() {
            average[k] += p / count as f64;
        }
    }
    average
}

impl Display for SimHistory {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "SimHistory of {} scenarios:", self.scenarios.len())?;
        for scenario in &self.scenarios {
            write!(
                f,
                " [{:.4}/s: {} runs, {} failed]",
                scenario.arrival_rate,
                scenario.runs.len(),
                scenario.failed_runs
            )?;
        }
        Ok(())
    }
}
