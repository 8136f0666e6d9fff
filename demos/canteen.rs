//! Runs the canteen study: one hour of lunch service, three queues with one cashier each, and group arrival rates of
//! one to four groups per minute, 100 runs per rate.
//!
//! Pass a path to a JSON file to override any part of the configuration, e.g.
//!
//! ```text
//! cargo run --example canteen -- config.json
//! ```
//!
//! with `config.json` holding `{"num_servers": 6, "concurrency": "Rayon"}`. Set `RUST_LOG=debug` for per-run detail.

use canteen_des::{run_simulation, SimulationConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .format_timestamp(None)
        .parse_default_env()
        .init();

    let config: SimulationConfig = match std::env::args().nth(1) {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => SimulationConfig::default(),
    };

    println!(
        "{} queues, {} servers, {} runs per scenario over {:.0} s",
        config.num_queues, config.num_servers, config.runs, config.horizon_seconds
    );

    let history = run_simulation(&config)?;
    for scenario in 0..history.scenarios().len() {
        let statistics = history.statistics_for_all_queues(scenario)?;
        println!();
        print!("{statistics}");

        for queue in 0..history.num_queues() {
            let per_queue = history.statistics_for_queue(scenario, queue)?;
            for (name, summary) in per_queue.metrics() {
                println!("  queue {} {name}: {summary}", queue + 1);
            }
        }
    }
    Ok(())
}
