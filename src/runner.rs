//! Batch execution: every scenario of a configuration, `runs` times each.

use crate::canteen::{Canteen, CanteenSetup};
use crate::{ConcurrencyMode, Error, SimHistory, SimResults, Simulation, SimulationConfig};

use log::{debug, info, warn};
use ordered_float::OrderedFloat;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use rayon::prelude::*;
use rayon::ThreadPool;

/// Run every scenario of `config` and collect the results.
///
/// Seeds for all runs are drawn from a generator seeded with `config.seed` before the first run starts, so the
/// outcome is the same whether runs execute sequentially or on a thread pool. A run that fails is logged, counted in
/// the history and left out of its statistics; the other runs are unaffected.
///
/// # Errors
///
/// Returns [`Error::Configuration`] if the configuration is rejected or the thread pool cannot be built. Errors inside
/// individual runs are not returned.
pub fn run_simulation(config: &SimulationConfig) -> crate::Result<SimHistory> {
    run_batch(config, run_once)
}

/// [`run_simulation`] with the replication itself supplied by `run`.
pub(crate) fn run_batch<F>(config: &SimulationConfig, run: F) -> crate::Result<SimHistory>
where
    F: Fn(&CanteenSetup, u64) -> crate::Result<SimResults> + Sync,
{
    config.validate()?;
    let setups = config
        .arrival_rate_scenarios
        .iter()
        .map(|&rate| CanteenSetup::new(config, rate))
        .collect::<crate::Result<Vec<_>>>()?;
    let seeds = derive_seeds(config.seed, setups.len(), config.runs);
    let pool = match config.concurrency {
        ConcurrencyMode::Sequential => None,
        ConcurrencyMode::Rayon => Some(build_pool(config.thread_pool_size)?),
    };

    let mut history = SimHistory::new(config);
    for (scenario, (setup, seeds)) in setups.iter().zip(&seeds).enumerate() {
        info!(
            "scenario {scenario}: {:.3} groups/min, {} runs ({:?})",
            setup.arrival_rate() * 60.0,
            seeds.len(),
            config.concurrency
        );

        let outcomes: Vec<crate::Result<SimResults>> = match &pool {
            None => seeds.iter().map(|&seed| run(setup, seed)).collect(),
            Some(pool) => pool.install(|| seeds.par_iter().map(|&seed| run(setup, seed)).collect()),
        };

        for (run, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                Ok(results) => history.add_sim_run(scenario, results)?,
                Err(e) => {
                    warn!("scenario {scenario} run {run} excluded: {e}");
                    history.record_failed_run(scenario)?;
                },
            }
        }

        let finished = history.scenario(scenario)?;
        info!(
            "scenario {scenario} finished: {} runs kept, {} failed",
            finished.runs().len(),
            finished.failed_runs()
        );
    }
    Ok(history)
}

/// Run one replication of `setup`, seeded with `seed`.
///
/// # Errors
///
/// Passes on whatever error aborted the run, including [`Error::Internal`] if the canteen did not drain.
pub fn run_once(setup: &CanteenSetup, seed: u64) -> crate::Result<SimResults> {
    let mut simulation = Simulation::new(Canteen::new(setup, seed)?, OrderedFloat(0.0));
    let (canteen, event_set) = simulation.parts_mut();
    canteen.schedule_first_group(event_set)?;
    simulation.run()?;

    debug!(
        "run with seed {seed} executed {} events, ending at {:.3}",
        simulation.events_executed(),
        simulation.current_time().0
    );
    simulation.into_state().into_results()
}

/// One seed per run per scenario, scenario-major.
fn derive_seeds(master_seed: u64, scenarios: usize, runs: usize) -> Vec<Vec<u64>> {
    let mut rng = Pcg64::seed_from_u64(master_seed);
    (0..scenarios)
        .map(|_| (0..runs).map(|_| rng.random::<u64>()).collect())
        .collect()
}

fn build_pool(size: Option<usize>) -> crate::Result<ThreadPool> {
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(threads) = size {
        builder = builder.num_threads(threads);
    }
    builder
        .build()
        .map_err(|e| Error::Configuration(format!("could not build thread pool: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_are_reproducible_and_distinct() {
        let first = derive_seeds(7, 2, 3);
        assert_eq!(first, derive_seeds(7, 2, 3));
        assert_ne!(first, derive_seeds(8, 2, 3));
        assert_eq!(2, first.len());
        assert!(first.iter().all(|runs| runs.len() == 3));
        assert_ne!(first[0], first[1]);
    }

    #[test]
    fn invalid_configuration_stops_the_batch() {
        let config = SimulationConfig::new().with_layout(2, 3);
        assert!(run_simulation(&config).unwrap_err().is_configuration());

        let config = SimulationConfig::new().with_payment_probability(-0.1);
        assert!(run_simulation(&config).unwrap_err().is_configuration());
    }

    #[test]
    fn run_once_drains_the_canteen() {
        let config = SimulationConfig::new().with_horizon(300.0);
        let setup = CanteenSetup::new(&config, 3.0 / 60.0).unwrap();
        let results = run_once(&setup, 17).unwrap();

        assert_eq!(results.customer_arrivals(), results.departures());
        assert!(results.elapsed() > 0.0 || results.groups_arrived() == 0);
    }

    #[test]
    fn failed_run_is_counted_and_left_out() {
        for mode in [ConcurrencyMode::Sequential, ConcurrencyMode::Rayon] {
            let config = SimulationConfig::new()
                .with_layout(1, 1)
                .with_horizon(300.0)
                .with_arrival_rates_per_minute(&[2.0])
                .with_runs(6)
                .with_seed(11)
                .with_concurrency(mode);
            let doomed = derive_seeds(config.seed, 1, config.runs)[0][1];

            let history = run_batch(&config, |setup, seed| {
                if seed == doomed {
                    Err(Error::Internal(format!("run with seed {seed} aborted")))
                } else {
                    run_once(setup, seed)
                }
            })
            .unwrap();

            let scenario = history.scenario(0).unwrap();
            assert_eq!(1, scenario.failed_runs(), "{mode:?}");
            assert_eq!(5, scenario.runs().len(), "{mode:?}");

            let statistics = history.statistics_for_all_queues(0).unwrap();
            assert_eq!(1, statistics.failed_runs);
            assert_eq!(5, statistics.runs);
            assert_eq!(5, statistics.queue_length.count(), "the failed run must not contribute a sample");
            assert_eq!(5, statistics.customers_in_canteen.count());

            // the surviving runs are exactly the ones an unfaulted batch produces for the other seeds
            let clean = run_simulation(&config).unwrap();
            let kept: Vec<_> = clean
                .scenario(0)
                .unwrap()
                .runs()
                .iter()
                .enumerate()
                .filter(|&(run, _)| run != 1)
                .map(|(_, results)| results.departures())
                .collect();
            let departures: Vec<_> = scenario.runs().iter().map(SimResults::departures).collect();
            assert_eq!(kept, departures);
        }
    }
}
