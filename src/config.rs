//! Configuration for a batch of canteen simulations.
//!
//! Every field has a default taken from the canteen study this crate was built for: one hour of lunch service, three
//! checkout queues with one cashier each, and four arrival-rate scenarios of one to four groups per minute.

use crate::Error;
use serde::{Deserialize, Serialize};

/// Probability that a customer pays cash rather than by card.
pub const DEFAULT_CASH_PROBABILITY: f64 = 0.4;
/// Success probability of the geometric group-size distribution (mean group size 3).
pub const DEFAULT_GROUP_SIZE_PARAM: f64 = 1.0 / 3.0;
/// Mean service time at the till for cash payments, in seconds.
pub const DEFAULT_CASH_SERVICE_MEAN: f64 = 20.0;
/// Mean service time at the till for card payments, in seconds.
pub const DEFAULT_CARD_SERVICE_MEAN: f64 = 12.0;
/// Mean time a customer spends grabbing food before queueing, in seconds.
pub const DEFAULT_GRAB_FOOD_MEAN: f64 = 80.0;
/// Group arrival rates, in groups per minute.
pub const DEFAULT_ARRIVAL_RATES_PER_MINUTE: [f64; 4] = [1.0, 2.0, 3.0, 4.0];
/// Lunch service from 12:00 to 13:00, in seconds.
pub const DEFAULT_HORIZON: f64 = 3600.0;
/// Largest group admitted to the canteen. The group-size parameter may not imply a larger mean group.
pub const MAX_GROUP_SIZE: usize = 1_000;

/// How independent runs are spread over threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConcurrencyMode {
    /// Runs execute one after another on the calling thread.
    #[default]
    Sequential,
    /// Runs execute on a rayon thread pool.
    Rayon,
}

/// Mean service times per payment method, shared by all servers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceParams {
    pub cash_mean: f64,
    pub card_mean: f64,
}

impl Default for ServiceParams {
    fn default() -> Self {
        Self {
            cash_mean: DEFAULT_CASH_SERVICE_MEAN,
            card_mean: DEFAULT_CARD_SERVICE_MEAN,
        }
    }
}

/// Parameters of one batch: the canteen layout, the random distributions, the scenarios to sweep and how many runs to
/// perform per scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Group arrival rates to simulate, in groups per second. One scenario per entry.
    pub arrival_rate_scenarios: Vec<f64>,
    pub num_queues: usize,
    /// Total number of servers; must split evenly over the queues.
    pub num_servers: usize,
    /// No group arrives at or after this time; customers already inside still finish.
    pub horizon_seconds: f64,
    pub service: ServiceParams,
    /// Success probability of the geometric group-size distribution.
    pub group_size_param: f64,
    /// Probability that a customer pays cash.
    pub payment_probability: f64,
    pub grab_food_mean_time: f64,
    /// Independent runs per scenario.
    pub runs: usize,
    /// Master seed from which every run's seed is derived.
    pub seed: u64,
    pub concurrency: ConcurrencyMode,
    /// Worker threads for [`ConcurrencyMode::Rayon`]; rayon's default when unset.
    pub thread_pool_size: Option<usize>,
    /// Bucket width, in seconds, of the waiting-time histograms.
    pub waiting_time_bin_width: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            arrival_rate_scenarios: DEFAULT_ARRIVAL_RATES_PER_MINUTE.iter().map(|rate| rate / 60.0).collect(),
            num_queues: 3,
            num_servers: 3,
            horizon_seconds: DEFAULT_HORIZON,
            service: ServiceParams::default(),
            group_size_param: DEFAULT_GROUP_SIZE_PARAM,
            payment_probability: DEFAULT_CASH_PROBABILITY,
            grab_food_mean_time: DEFAULT_GRAB_FOOD_MEAN,
            runs: 100,
            seed: 0,
            concurrency: ConcurrencyMode::default(),
            thread_pool_size: None,
            waiting_time_bin_width: 10.0,
        }
    }
}

impl SimulationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the scenarios with the given arrival rates, in groups per second.
    pub fn with_arrival_rates(mut self, rates_per_second: Vec<f64>) -> Self {
        self.arrival_rate_scenarios = rates_per_second;
        self
    }

    /// Replace the scenarios with the given arrival rates, in groups per minute.
    pub fn with_arrival_rates_per_minute(mut self, rates_per_minute: &[f64]) -> Self {
        self.arrival_rate_scenarios = rates_per_minute.iter().map(|rate| rate / 60.0).collect();
        self
    }

    pub fn with_layout(mut self, num_queues: usize, num_servers: usize) -> Self {
        self.num_queues = num_queues;
        self.num_servers = num_servers;
        self
    }

    pub fn with_horizon(mut self, horizon_seconds: f64) -> Self {
        self.horizon_seconds = horizon_seconds;
        self
    }

    pub fn with_service(mut self, service: ServiceParams) -> Self {
        self.service = service;
        self
    }

    pub fn with_group_size_param(mut self, p: f64) -> Self {
        self.group_size_param = p;
        self
    }

    pub fn with_payment_probability(mut self, p: f64) -> Self {
        self.payment_probability = p;
        self
    }

    pub fn with_grab_food_mean_time(mut self, mean: f64) -> Self {
        self.grab_food_mean_time = mean;
        self
    }

    pub fn with_runs(mut self, runs: usize) -> Self {
        self.runs = runs;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the concurrency mode for the batch.
    pub fn with_concurrency(mut self, mode: ConcurrencyMode) -> Self {
        self.concurrency = mode;
        self
    }

    /// Set the thread pool size. Only affects [`ConcurrencyMode::Rayon`].
    pub fn with_thread_pool_size(mut self, size: usize) -> Self {
        self.thread_pool_size = Some(size);
        self
    }

    pub fn with_waiting_time_bin_width(mut self, width: f64) -> Self {
        self.waiting_time_bin_width = width;
        self
    }

    /// Number of servers bound to each queue.
    pub fn servers_per_queue(&self) -> usize {
        if self.num_queues == 0 {
            0
        } else {
            self.num_servers / self.num_queues
        }
    }

    /// Check the parts of the configuration that are not distribution parameters. Distribution parameters are
    /// checked when the samplers are built in [`CanteenSetup::new`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] naming the first problem found.
    ///
    /// [`CanteenSetup::new`]: crate::canteen::CanteenSetup::new
    pub fn validate(&self) -> crate::Result {
        if self.arrival_rate_scenarios.is_empty() {
            return Err(Error::Configuration("at least one arrival rate scenario is required".into()));
        }
        if let Some(rate) = self
            .arrival_rate_scenarios
            .iter()
            .find(|rate| !(rate.is_finite() && **rate > 0.0))
        {
            return Err(Error::Configuration(format!("arrival rate must be positive, got {rate}")));
        }
        if self.num_queues == 0 || self.num_servers == 0 {
            return Err(Error::Configuration("at least one queue and one server are required".into()));
        }
        if self.num_servers % self.num_queues != 0 {
            return Err(Error::Configuration(format!(
                "{} servers cannot be split evenly over {} queues",
                self.num_servers, self.num_queues
            )));
        }
        if !(self.horizon_seconds.is_finite() && self.horizon_seconds > 0.0) {
            return Err(Error::Configuration(format!(
                "horizon must be positive, got {}",
                self.horizon_seconds
            )));
        }
        if self.runs == 0 {
            return Err(Error::Configuration("at least one run per scenario is required".into()));
        }
        if self.thread_pool_size == Some(0) {
            return Err(Error::Configuration("thread pool size must be at least 1".into()));
        }
        if !(self.waiting_time_bin_width.is_finite() && self.waiting_time_bin_width > 0.0) {
            return Err(Error::Configuration(format!(
                "waiting time bin width must be positive, got {}",
                self.waiting_time_bin_width
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SimulationConfig::default();
        assert_eq!(Ok(()), config.validate());
        assert_eq!(4, config.arrival_rate_scenarios.len());
        assert_eq!(1, config.servers_per_queue());
        assert_eq!(ConcurrencyMode::Sequential, config.concurrency);
    }

    #[test]
    fn uneven_server_split_is_rejected() {
        let config = SimulationConfig::new().with_layout(2, 3);
        assert!(matches!(config.validate(), Err(Error::Configuration(_))));
    }

    #[test]
    fn non_positive_values_are_rejected() {
        let base = SimulationConfig::new();
        assert!(base.clone().with_horizon(0.0).validate().is_err());
        assert!(base.clone().with_arrival_rates(vec![]).validate().is_err());
        assert!(base.clone().with_arrival_rates(vec![0.1, -0.2]).validate().is_err());
        assert!(base.clone().with_runs(0).validate().is_err());
        assert!(base.clone().with_layout(0, 0).validate().is_err());
        assert!(base.clone().with_thread_pool_size(0).validate().is_err());
        assert!(base.with_waiting_time_bin_width(0.0).validate().is_err());
    }

    #[test]
    fn per_minute_rates_are_converted() {
        let config = SimulationConfig::new().with_arrival_rates_per_minute(&[3.0]);
        assert_eq!(vec![0.05], config.arrival_rate_scenarios);
    }
}
