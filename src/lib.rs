//! # Overview
//!
//! canteen-des simulates the checkout of a canteen with discrete-event simulation and aggregates its measurements
//! over many independent runs. Groups of customers enter, each member spends a while grabbing food and then joins the
//! shortest of several checkout queues, each served by one or more cashiers. A run covers one service period; groups
//! stop arriving at the horizon and the run ends once the last customer has left.
//!
//! The crate is built in layers:
//!
//! * A generic engine. The [`FutureEventSet`] orders events by execution time, breaking ties by insertion order, and
//!   [`Simulation`] pops and dispatches them to a [`SimState`] that owns everything a replication needs. The clock
//!   type is any [`SimTime`]; the canteen uses [`OrderedFloat<f64>`].
//! * The canteen model in [`canteen`]: customers, groups, queues, servers and the [`Canteen`] state whose events move
//!   customers through the queues while recording measurements into [`SimResults`].
//! * Aggregation. [`SimHistory`] keeps the results of every run per arrival-rate scenario and reduces them to
//!   [`CanteenStatistics`] and [`QueueStatistics`], with normal-approximation confidence intervals.
//! * Orchestration. [`run_simulation()`] validates a [`SimulationConfig`], derives one seed per run from a master
//!   seed and executes the runs either sequentially or on a rayon thread pool.
//!
//! Each run owns its random-number generator, event set and entities, so runs on separate threads share nothing and
//! the results depend only on the master seed, not on scheduling.
//!
//! # Logging
//!
//! The crate logs through the [`log`] facade and never installs a logger: per-event dispatch at `trace`, group and
//! service details at `debug`, scenario progress at `info` and excluded runs at `warn`.
//!
//! [`OrderedFloat<f64>`]: ordered_float::OrderedFloat
//! [`Canteen`]: canteen::Canteen
//! [`CanteenStatistics`]: statistics::CanteenStatistics
//! [`QueueStatistics`]: statistics::QueueStatistics
//! [`log`]: https://docs.rs/log/0.4

pub mod canteen;
mod config;
mod error;
mod events;
mod generic_parameters;
mod history;
mod results;
mod runner;
mod sampler;
mod simulation;
pub mod statistics;

pub use config::{
    ConcurrencyMode, ServiceParams, SimulationConfig, DEFAULT_ARRIVAL_RATES_PER_MINUTE, DEFAULT_CARD_SERVICE_MEAN,
    DEFAULT_CASH_PROBABILITY, DEFAULT_CASH_SERVICE_MEAN, DEFAULT_GRAB_FOOD_MEAN, DEFAULT_GROUP_SIZE_PARAM,
    DEFAULT_HORIZON, MAX_GROUP_SIZE,
};
pub use error::{Error, Result};
pub use events::FutureEventSet;
pub use generic_parameters::{SimState, SimTime};
pub use history::{ScenarioHistory, SimHistory};
pub use results::SimResults;
pub use runner::{run_once, run_simulation};
pub use sampler::Sampler;
pub use simulation::{Phase, Simulation};
