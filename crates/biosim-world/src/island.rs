//! The island: every cell of the map and the yearly cycle across them.
//!
//! A year runs seven phases in a fixed order. Each phase is applied to
//! every cell before the next one starts:
//!
//! 1. feeding (fodder regrows, herbivores graze, carnivores hunt)
//! 2. reproduction
//! 3. migration
//! 4. aging
//! 5. weight loss
//! 6. mortality
//! 7. totals
//!
//! Cells are visited in row-major order, so a seeded generator gives the
//! same history on every run.

use crate::cell::Cell;
use crate::grid::Grid;
use crate::organism::Animal;
use biosim_core::{
    Coord, Draw, Error, PopulationCounts, PopulationRecord, PopulationSamples, Result,
    SimulationConfig,
};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, instrument};

pub struct Island {
    grid: Grid,
    cells: BTreeMap<Coord, Cell>,
    habitable: HashSet<Coord>,
}

impl Island {
    /// Build the island from a map string
    pub fn new(map: &str) -> Result<Self> {
        Ok(Self::from_grid(Grid::parse(map)?))
    }

    pub fn from_grid(grid: Grid) -> Self {
        let cells: BTreeMap<Coord, Cell> = grid
            .iter()
            .map(|(coord, landscape)| (coord, Cell::new(coord, landscape)))
            .collect();
        let habitable = cells
            .values()
            .filter(|cell| cell.is_habitable())
            .map(Cell::coord)
            .collect();

        Self {
            grid,
            cells,
            habitable,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn cell(&self, coord: Coord) -> Option<&Cell> {
        self.cells.get(&coord)
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> + '_ {
        self.cells.values()
    }

    /// Place animals on the island.
    ///
    /// Every record is checked before anything is placed, so a bad record
    /// leaves the island unchanged.
    pub fn add_population(
        &mut self,
        records: &[PopulationRecord],
        config: &SimulationConfig,
    ) -> Result<()> {
        let mut placements = Vec::with_capacity(records.len());
        for record in records {
            let cell = self
                .cells
                .get(&record.loc)
                .ok_or(Error::CellOutOfBounds(record.loc))?;
            if !cell.is_habitable() {
                return Err(Error::UninhabitableCell(record.loc));
            }

            let animals = record
                .pop
                .iter()
                .map(|animal| Animal::from_record(animal, config.species(animal.species)))
                .collect::<Result<Vec<_>>>()?;
            placements.push((record.loc, animals));
        }

        for (coord, animals) in placements {
            debug!(cell = %coord, count = animals.len(), "Adding population");
            if let Some(cell) = self.cells.get_mut(&coord) {
                cell.add_animals(animals)?;
            }
        }
        Ok(())
    }

    /// Current population as records, one per occupied cell
    pub fn population_records(&self) -> Vec<PopulationRecord> {
        self.cells
            .values()
            .filter(|cell| cell.population_counts().total() > 0)
            .map(|cell| PopulationRecord {
                loc: cell.coord(),
                pop: cell
                    .herbivores()
                    .iter()
                    .chain(cell.carnivores())
                    .map(Animal::to_record)
                    .collect(),
            })
            .collect()
    }

    fn habitable_cells(&mut self) -> impl Iterator<Item = &mut Cell> + '_ {
        self.cells.values_mut().filter(|cell| cell.is_habitable())
    }

    pub fn feeding<R: Draw>(&mut self, config: &SimulationConfig, rng: &mut R) {
        for cell in self.habitable_cells() {
            cell.replenish_fodder(config);
            cell.feed_herbivores(config);
            cell.feed_carnivores(config, rng);
        }
    }

    pub fn procreation<R: Draw>(&mut self, config: &SimulationConfig, rng: &mut R) {
        for cell in self.habitable_cells() {
            cell.reproduce(config, rng);
        }
    }

    /// Move animals between neighbouring cells.
    ///
    /// All intents are decided first. Departures are then resolved cell by
    /// cell, and arrivals are held back until every cell is done, so no
    /// animal moves twice in a year.
    pub fn migration<R: Draw>(&mut self, config: &SimulationConfig, rng: &mut R) {
        for cell in self.habitable_cells() {
            cell.mark_migration_intent(config, rng);
        }

        let habitable = &self.habitable;
        let mut arrivals: BTreeMap<Coord, Vec<Animal>> = BTreeMap::new();
        for cell in self.cells.values_mut() {
            for (destination, animal) in
                cell.remove_migrated(rng, |coord| habitable.contains(&coord))
            {
                arrivals.entry(destination).or_default().push(animal);
            }
        }

        let moved: usize = arrivals.values().map(Vec::len).sum();
        for (destination, animals) in arrivals {
            if let Some(cell) = self.cells.get_mut(&destination) {
                cell.receive(animals);
            }
        }
        debug!(moved, "Migration resolved");
    }

    pub fn aging(&mut self) {
        for cell in self.habitable_cells() {
            cell.age_all();
        }
    }

    pub fn weight_loss(&mut self, config: &SimulationConfig) {
        for cell in self.habitable_cells() {
            cell.apply_weight_loss(config);
        }
    }

    pub fn mortality<R: Draw>(&mut self, config: &SimulationConfig, rng: &mut R) {
        for cell in self.habitable_cells() {
            cell.apply_mortality(config, rng);
        }
    }

    /// Run one full year and return the island totals afterwards
    #[instrument(skip_all)]
    pub fn update_one_year<R: Draw>(
        &mut self,
        config: &SimulationConfig,
        rng: &mut R,
    ) -> PopulationCounts {
        self.feeding(config, rng);
        self.procreation(config, rng);
        self.migration(config, rng);
        self.aging();
        self.weight_loss(config);
        self.mortality(config, rng);
        self.total_counts()
    }

    /// Live animals summed over all cells
    pub fn total_counts(&self) -> PopulationCounts {
        let mut totals = PopulationCounts::default();
        for cell in self.cells.values() {
            totals += cell.population_counts();
        }
        totals
    }

    pub fn num_herbivores(&self) -> usize {
        self.total_counts().herbivores
    }

    pub fn num_carnivores(&self) -> usize {
        self.total_counts().carnivores
    }

    pub fn num_animals(&self) -> usize {
        self.total_counts().total()
    }

    /// Per-cell counts for every habitable cell
    pub fn cell_counts(&self) -> BTreeMap<Coord, PopulationCounts> {
        self.cells
            .values()
            .filter(|cell| cell.is_habitable())
            .map(|cell| (cell.coord(), cell.population_counts()))
            .collect()
    }

    /// Age, weight and fitness of every animal on the island
    pub fn samples(&self) -> PopulationSamples {
        let mut samples = PopulationSamples::default();
        for cell in self.cells.values() {
            samples.extend(cell.age_weight_fitness_samples());
        }
        samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use biosim_core::{create_rng, AnimalRecord, ScriptedDraws, Species};

    const MAP: &str = "WWWWW
                       WLLHW
                       WLHHW
                       WDDDW
                       WWWWW";

    fn record(loc: (i32, i32), species: Species, count: usize, age: i64, weight: f64) -> PopulationRecord {
        PopulationRecord {
            loc: loc.into(),
            pop: (0..count)
                .map(|_| AnimalRecord {
                    species,
                    age,
                    weight,
                })
                .collect(),
        }
    }

    fn populated_island() -> (Island, SimulationConfig) {
        let config = SimulationConfig::default();
        let mut island = Island::new(MAP).unwrap();
        island
            .add_population(
                &[
                    record((3, 3), Species::Herbivore, 20, 5, 20.0),
                    record((3, 3), Species::Carnivore, 20, 5, 20.0),
                ],
                &config,
            )
            .unwrap();
        (island, config)
    }

    #[test]
    fn test_add_population() {
        let (island, _) = populated_island();
        assert_eq!(island.num_herbivores(), 20);
        assert_eq!(island.num_carnivores(), 20);
        assert_eq!(island.num_animals(), 40);
        assert_eq!(
            island.cell_counts()[&Coord::new(3, 3)],
            PopulationCounts::new(20, 20)
        );
    }

    #[test]
    fn test_add_population_to_water_fails() {
        let config = SimulationConfig::default();
        let mut island = Island::new(MAP).unwrap();
        let result = island.add_population(
            &[
                record((2, 2), Species::Herbivore, 5, 1, 10.0),
                record((1, 1), Species::Herbivore, 5, 1, 10.0),
            ],
            &config,
        );
        assert!(matches!(result, Err(Error::UninhabitableCell(c)) if c == Coord::new(1, 1)));
        assert_eq!(island.num_animals(), 0);

        let result = island.add_population(&[record((9, 9), Species::Carnivore, 1, 1, 10.0)], &config);
        assert!(matches!(result, Err(Error::CellOutOfBounds(_))));
    }

    #[test]
    fn test_add_population_rejects_negative_age() {
        let config = SimulationConfig::default();
        let mut island = Island::new(MAP).unwrap();
        let result = island.add_population(&[record((2, 2), Species::Herbivore, 2, -3, 10.0)], &config);
        assert!(matches!(result, Err(Error::InvalidParameter(_))));
    }

    #[test]
    fn test_migration_all_east() {
        let (mut island, config) = populated_island();
        island.migration(&config, &mut ScriptedDraws::constant(0.0));

        assert_eq!(island.num_animals(), 40);
        for (coord, counts) in island.cell_counts() {
            if coord == Coord::new(3, 4) {
                assert_eq!(counts, PopulationCounts::new(20, 20));
            } else {
                assert_eq!(counts.total(), 0);
            }
        }
    }

    #[test]
    fn test_migration_all_south() {
        let (mut island, config) = populated_island();
        // 40 intent draws that migrate, then direction draws above 0.75
        let mut draws = vec![0.0; 40];
        draws.push(0.9);
        island.migration(&config, &mut ScriptedDraws::new(draws));

        assert_eq!(
            island.cell_counts()[&Coord::new(4, 3)],
            PopulationCounts::new(20, 20)
        );
        assert_eq!(island.cell_counts()[&Coord::new(3, 3)].total(), 0);
    }

    #[test]
    fn test_migration_blocked_by_water() {
        let config = SimulationConfig::default();
        let mut island = Island::new(MAP).unwrap();
        island
            .add_population(&[record((2, 4), Species::Herbivore, 10, 5, 20.0)], &config)
            .unwrap();

        island.migration(&config, &mut ScriptedDraws::constant(0.0));

        let cell = island.cell(Coord::new(2, 4)).unwrap();
        assert_eq!(cell.population_counts().herbivores, 10);
        assert!(cell.herbivores().iter().all(|h| !h.has_migrated()));
    }

    #[test]
    fn test_migrants_move_only_once() {
        // a corridor of lowland: with every draw at 0.0 each animal heads
        // east, but must stop after one step
        let config = SimulationConfig::default();
        let mut island = Island::new("WWWWWW\nWLLLLW\nWWWWWW").unwrap();
        island
            .add_population(&[record((2, 2), Species::Herbivore, 5, 5, 20.0)], &config)
            .unwrap();

        island.migration(&config, &mut ScriptedDraws::constant(0.0));
        assert_eq!(island.cell_counts()[&Coord::new(2, 3)].herbivores, 5);
        assert_eq!(island.cell_counts()[&Coord::new(2, 4)].herbivores, 0);

        island.aging();
        island.migration(&config, &mut ScriptedDraws::constant(0.0));
        assert_eq!(island.cell_counts()[&Coord::new(2, 4)].herbivores, 5);
    }

    fn small_island(config: &SimulationConfig) -> Island {
        let mut island = Island::new("WWW\nWLW\nWWW").unwrap();
        island
            .add_population(&[record((2, 2), Species::Herbivore, 50, 5, 20.0)], config)
            .unwrap();
        island
    }

    #[test]
    fn test_one_year_small_island_low_draws() {
        let config = SimulationConfig::default();
        let mut island = small_island(&config);

        let totals = island.update_one_year(&config, &mut ScriptedDraws::constant(0.001));

        assert_eq!(totals, island.total_counts());
        let samples = island.samples();
        assert_eq!(samples.herbivores.len(), totals.herbivores);
        assert!(samples.herbivores.weight.iter().all(|w| *w >= 0.0));
        assert!(samples.herbivores.age.iter().all(|a| *a >= 6));
    }

    #[test]
    fn test_one_year_small_island_survivors() {
        let config = SimulationConfig::default();
        let mut island = small_island(&config);

        // too light to breed after grazing, too unfit to want to leave,
        // and the draws sit above the death probability
        let totals = island.update_one_year(&config, &mut ScriptedDraws::constant(0.5));

        assert_eq!(totals, PopulationCounts::new(50, 0));
        let samples = island.samples();
        assert!(samples.herbivores.age.iter().all(|a| *a == 6));
        let expected_weight = (20.0 + 10.0 * 0.9) * 0.95;
        assert!(samples
            .herbivores
            .weight
            .iter()
            .all(|w| (w - expected_weight).abs() < 1e-9));
    }

    #[test]
    fn test_invariants_over_many_years() {
        let config = SimulationConfig::default();
        let mut island = Island::new(MAP).unwrap();
        island
            .add_population(
                &[
                    record((2, 2), Species::Herbivore, 100, 5, 20.0),
                    record((3, 3), Species::Carnivore, 20, 5, 20.0),
                ],
                &config,
            )
            .unwrap();

        let mut rng = create_rng(11);
        for _ in 0..30 {
            island.update_one_year(&config, &mut rng);
            for cell in island.cells() {
                if !cell.is_habitable() {
                    assert_eq!(cell.population_counts().total(), 0);
                }
                for animal in cell.herbivores().iter().chain(cell.carnivores()) {
                    assert!(animal.weight() >= 0.0);
                    assert!((0.0..=1.0).contains(&animal.fitness()));
                    assert!(!animal.has_migrated());
                }
            }
        }
    }

    #[test]
    fn test_same_seed_same_history() {
        let run = |seed: u64| {
            let (mut island, config) = populated_island();
            let mut rng = create_rng(seed);
            (0..20)
                .map(|_| island.update_one_year(&config, &mut rng))
                .collect::<Vec<_>>()
        };
        assert_eq!(run(5), run(5));
    }

    #[test]
    fn test_population_records_round_trip() {
        let (mut island, config) = populated_island();
        let mut rng = create_rng(2);
        for _ in 0..5 {
            island.update_one_year(&config, &mut rng);
        }

        let json = serde_json::to_string(&island.population_records()).unwrap();
        let records: Vec<PopulationRecord> = serde_json::from_str(&json).unwrap();

        let mut reloaded = Island::new(MAP).unwrap();
        reloaded.add_population(&records, &config).unwrap();
        assert_eq!(reloaded.cell_counts(), island.cell_counts());
    }
}
