//! Seeded simulation driver: owns the island, the parameters and the
//! generator, and keeps the year counter and year log.

use crate::island::Island;
use biosim_core::{
    create_rng, Coord, Draw, Error, Landscape, PopulationCounts, PopulationRecord,
    PopulationSamples, Result, SimulationConfig, Species, YearRecord,
};
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;
use tracing::{info, instrument};

pub struct BioSim<R: Draw = ChaCha8Rng> {
    island: Island,
    config: SimulationConfig,
    rng: R,
    year: u32,
    history: Vec<YearRecord>,
}

impl BioSim<ChaCha8Rng> {
    /// Build a simulation seeded from `config.seed`
    pub fn new(
        map: &str,
        initial_population: &[PopulationRecord],
        config: SimulationConfig,
    ) -> Result<Self> {
        let rng = create_rng(config.seed);
        Self::with_rng(map, initial_population, config, rng)
    }
}

impl<R: Draw> BioSim<R> {
    pub fn with_rng(
        map: &str,
        initial_population: &[PopulationRecord],
        config: SimulationConfig,
        rng: R,
    ) -> Result<Self> {
        let mut island = Island::new(map)?;
        island.add_population(initial_population, &config)?;

        info!(
            event = "simulation_created",
            seed = config.seed,
            width = island.grid().width,
            height = island.grid().height,
            animals = island.num_animals(),
            "Simulation created"
        );

        Ok(Self {
            island,
            config,
            rng,
            year: 0,
            history: Vec::new(),
        })
    }

    pub fn add_population(&mut self, records: &[PopulationRecord]) -> Result<()> {
        self.island.add_population(records, &self.config)
    }

    /// Override parameters of a species given by name (`"Herbivore"` or
    /// `"Carnivore"`). Existing animals follow the new values from the next
    /// phase on.
    pub fn set_animal_parameters(
        &mut self,
        species: &str,
        overrides: &BTreeMap<String, f64>,
    ) -> Result<()> {
        let species: Species = species.parse()?;
        self.config.set_species_parameters(species, overrides)
    }

    /// Override parameters of a landscape given by its map letter
    pub fn set_landscape_parameters(
        &mut self,
        code: &str,
        overrides: &BTreeMap<String, f64>,
    ) -> Result<()> {
        let mut chars = code.chars();
        let landscape = match (chars.next(), chars.next()) {
            (Some(c), None) => Landscape::from_code(c),
            _ => None,
        }
        .ok_or_else(|| Error::UnknownLandscape(code.to_string()))?;
        self.config.set_landscape_parameters(landscape, overrides)
    }

    /// Run `years` more years, logging the totals after each one
    #[instrument(skip(self), fields(start_year = self.year))]
    pub fn simulate(&mut self, years: u32) {
        for _ in 0..years {
            let totals = self.island.update_one_year(&self.config, &mut self.rng);
            self.year += 1;

            info!(
                year = self.year,
                herbivores = totals.herbivores,
                carnivores = totals.carnivores,
                "Year complete"
            );
            self.history.push(YearRecord {
                year: self.year,
                herbivores: totals.herbivores,
                carnivores: totals.carnivores,
            });
        }
    }

    /// Last year simulated, 0 before the first one
    pub fn year(&self) -> u32 {
        self.year
    }

    pub fn num_animals_per_species(&self) -> PopulationCounts {
        self.island.total_counts()
    }

    pub fn num_animals(&self) -> usize {
        self.island.num_animals()
    }

    /// Totals recorded after each simulated year
    pub fn history(&self) -> &[YearRecord] {
        &self.history
    }

    pub fn cell_counts(&self) -> BTreeMap<Coord, PopulationCounts> {
        self.island.cell_counts()
    }

    pub fn samples(&self) -> PopulationSamples {
        self.island.samples()
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }
}
