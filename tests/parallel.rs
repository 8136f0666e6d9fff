mod util;

use canteen_des::{run_simulation, ConcurrencyMode, SimHistory, SimulationConfig};

fn config(mode: ConcurrencyMode) -> SimulationConfig {
    SimulationConfig::new()
        .with_arrival_rates_per_minute(&[1.0, 3.0])
        .with_horizon(1200.0)
        .with_runs(12)
        .with_seed(2024)
        .with_concurrency(mode)
}

fn fingerprint(history: &SimHistory) -> Vec<(usize, usize, Vec<f64>, Option<f64>)> {
    history
        .scenarios()
        .iter()
        .flat_map(|scenario| scenario.runs())
        .map(|run| {
            (
                run.customer_arrivals(),
                run.departures(),
                run.mean_queue_length(),
                run.mean_waiting_time_all(),
            )
        })
        .collect()
}

#[test]
fn rayon_matches_sequential() {
    util::init_logging();
    let sequential = run_simulation(&config(ConcurrencyMode::Sequential)).unwrap();
    let parallel = run_simulation(&config(ConcurrencyMode::Rayon)).unwrap();

    assert_eq!(fingerprint(&sequential), fingerprint(&parallel), "runs differ between modes");
    assert_eq!(
        sequential.statistics_for_all_queues(1).unwrap(),
        parallel.statistics_for_all_queues(1).unwrap()
    );
}

#[test]
fn pool_size_does_not_change_results() {
    let two = run_simulation(&config(ConcurrencyMode::Rayon).with_thread_pool_size(2)).unwrap();
    let four = run_simulation(&config(ConcurrencyMode::Rayon).with_thread_pool_size(4)).unwrap();

    assert_eq!(fingerprint(&two), fingerprint(&four));
    assert!(two.scenarios().iter().all(|scenario| scenario.runs().len() == 12));
}
