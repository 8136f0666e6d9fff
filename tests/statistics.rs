mod util;

use canteen_des::statistics::{normal_confidence_interval, ConfidenceLevel, MetricSummary};
use canteen_des::{run_simulation, SimulationConfig};

fn history() -> canteen_des::SimHistory {
    let config = SimulationConfig::new()
        .with_arrival_rates_per_minute(&[2.0])
        .with_horizon(1800.0)
        .with_runs(30)
        .with_seed(9);
    run_simulation(&config).unwrap()
}

#[test]
fn interval_matches_normal_approximation() {
    let ci = normal_confidence_interval(100, 5.0, 1.0, ConfidenceLevel::P95);
    assert_floats_near_equal!(4.804, ci.lower, 1e-12, "lower bound");
    assert_floats_near_equal!(5.196, ci.upper, 1e-12, "upper bound");

    let ci = normal_confidence_interval(25, 10.0, 4.0, ConfidenceLevel::P90);
    assert_floats_near_equal!(0.658, ci.half_width(), 1e-12, "90% half width");
}

#[test]
fn summary_of_constant_samples_is_a_point() {
    let summary = MetricSummary::from_samples(vec![3.5; 10]);
    assert_eq!(3.5, summary.mean);
    assert_eq!(0.0, summary.std);
    assert_eq!(summary.ci_95.lower, summary.ci_95.upper);
}

#[test]
fn canteen_statistics_summarise_every_run() {
    let statistics = history().statistics_for_all_queues(0).unwrap();

    assert_eq!(30, statistics.runs);
    assert_eq!(0, statistics.failed_runs);
    for (name, summary) in statistics.metrics() {
        assert_eq!(30, summary.count(), "{name} should have one sample per run");
        assert!(summary.std >= 0.0, "{name} has a negative spread");
        assert!(summary.ci_95.contains(summary.mean), "{name} mean outside its interval");
        assert!(summary.ci_99.half_width() >= summary.ci_95.half_width());
    }

    let total: f64 = statistics.queue_length_distribution.iter().sum();
    assert_floats_near_equal!(1.0, total, 1e-9, "queue length distribution should sum to one");
    assert!(statistics.waiting_time_histogram.total() > 0);
    assert!(statistics.canteen_occupancy.windows(2).all(|w| w[0].0 <= w[1].0));
}

#[test]
fn queue_statistics_cover_each_queue() {
    let history = history();
    let all = history.statistics_for_all_queues(0).unwrap();

    let mut waiting_counted = 0;
    let mut mean_of_queue_means = 0.0;
    for queue in 0..history.num_queues() {
        let statistics = history.statistics_for_queue(0, queue).unwrap();
        assert_eq!(queue, statistics.queue);
        assert_eq!(30, statistics.queue_length.count());
        waiting_counted += statistics.waiting_time_histogram.total();
        mean_of_queue_means += statistics.queue_length.mean / history.num_queues() as f64;
    }

    assert_eq!(all.waiting_time_histogram.total(), waiting_counted);
    assert_floats_near_equal!(all.queue_length.mean, mean_of_queue_means, 1e-9, "queue length means disagree");
    assert!(history.statistics_for_queue(0, history.num_queues()).is_err());
}

#[test]
fn statistics_serialize_to_json() {
    let statistics = history().statistics_for_all_queues(0).unwrap();
    let value = serde_json::to_value(&statistics).unwrap();

    assert_eq!(30, value["runs"]);
    assert!(value["queue_length"]["ci_95"]["lower"].is_number());
    assert_eq!(30, value["sojourn_group"]["samples"].as_array().unwrap().len());
}
