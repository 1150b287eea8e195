//! Command line runner for island simulations.
//!
//! Usage: `biosim-runner [scenario.json]`. Without a path the built-in
//! single-cell scenario is used.

mod scenario;
mod telemetry;

use anyhow::{Context, Result};
use scenario::Scenario;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use tracing::info;

fn main() -> Result<()> {
    telemetry::init_tracing();

    let scenario = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => Scenario::load(&path)
            .with_context(|| format!("failed to load scenario {}", path.display()))?,
        None => {
            info!("No scenario given, using the built-in example");
            Scenario::default()
        }
    };

    let mut sim = scenario.build().context("failed to set up simulation")?;

    info!(
        event = "simulation_start",
        years = scenario.years,
        seed = scenario.seed,
        herbivores = sim.num_animals_per_species().herbivores,
        carnivores = sim.num_animals_per_species().carnivores,
        "Starting simulation"
    );
    sim.simulate(scenario.years);

    let totals = sim.num_animals_per_species();
    info!(
        event = "simulation_complete",
        year = sim.year(),
        herbivores = totals.herbivores,
        carnivores = totals.carnivores,
        "Simulation complete"
    );

    if let Some(path) = &scenario.log_file {
        let file = File::create(path)
            .with_context(|| format!("failed to create year log {}", path.display()))?;
        scenario::write_year_log(BufWriter::new(file), sim.history())
            .with_context(|| format!("failed to write year log {}", path.display()))?;
        info!(path = %path.display(), "Year log written");
    }

    Ok(())
}
