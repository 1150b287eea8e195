//! A single island cell and the per-cell phases of the yearly cycle.

use crate::organism::Animal;
use biosim_core::{
    Coord, Direction, Draw, Error, Landscape, PopulationCounts, PopulationSamples, Result,
    SimulationConfig, Species, SpeciesParams, SpeciesSamples,
};
use tracing::trace;

/// One cell of the island, with its fodder and both populations
#[derive(Debug, Clone)]
pub struct Cell {
    coord: Coord,
    landscape: Landscape,
    fodder: f64,
    herbivores: Vec<Animal>,
    carnivores: Vec<Animal>,
}

impl Cell {
    pub fn new(coord: Coord, landscape: Landscape) -> Self {
        Self {
            coord,
            landscape,
            fodder: 0.0,
            herbivores: Vec::new(),
            carnivores: Vec::new(),
        }
    }

    pub fn coord(&self) -> Coord {
        self.coord
    }

    pub fn is_habitable(&self) -> bool {
        self.landscape.is_habitable()
    }

    pub fn fodder(&self) -> f64 {
        self.fodder
    }

    pub fn herbivores(&self) -> &[Animal] {
        &self.herbivores
    }

    pub fn carnivores(&self) -> &[Animal] {
        &self.carnivores
    }

    /// Place animals into the cell
    pub fn add_animals(&mut self, animals: Vec<Animal>) -> Result<()> {
        if !self.is_habitable() {
            return Err(Error::UninhabitableCell(self.coord));
        }
        self.receive(animals);
        Ok(())
    }

    /// Place animals without the habitability check, for migrants whose
    /// destination was already resolved against the open cells
    pub(crate) fn receive(&mut self, animals: Vec<Animal>) {
        for animal in animals {
            self.population_mut(animal.species()).push(animal);
        }
    }

    fn population_mut(&mut self, species: Species) -> &mut Vec<Animal> {
        match species {
            Species::Herbivore => &mut self.herbivores,
            Species::Carnivore => &mut self.carnivores,
        }
    }

    pub fn population_counts(&self) -> PopulationCounts {
        PopulationCounts::new(self.herbivores.len(), self.carnivores.len())
    }

    pub fn age_weight_fitness_samples(&self) -> PopulationSamples {
        fn collect(population: &[Animal]) -> SpeciesSamples {
            let mut samples = SpeciesSamples::default();
            for animal in population {
                samples.push(animal.age(), animal.weight(), animal.fitness());
            }
            samples
        }

        PopulationSamples {
            herbivores: collect(&self.herbivores),
            carnivores: collect(&self.carnivores),
        }
    }

    pub fn replenish_fodder(&mut self, config: &SimulationConfig) {
        if !self.is_habitable() {
            return;
        }
        self.fodder = config.f_max(self.landscape);
    }

    fn calculate_fitness(&mut self, config: &SimulationConfig) {
        for animal in &mut self.herbivores {
            animal.calculate_fitness(&config.herbivore);
        }
        for animal in &mut self.carnivores {
            animal.calculate_fitness(&config.carnivore);
        }
    }

    fn sort_herbivores_by_fitness(&mut self) {
        self.herbivores
            .sort_by(|a, b| b.fitness().total_cmp(&a.fitness()));
    }

    /// Herbivores graze in order of decreasing fitness until the fodder runs out
    pub fn feed_herbivores(&mut self, config: &SimulationConfig) {
        if !self.is_habitable() {
            return;
        }
        self.calculate_fitness(config);
        self.sort_herbivores_by_fitness();

        let params = &config.herbivore;
        for herbivore in &mut self.herbivores {
            if self.fodder <= 0.0 {
                break;
            }
            let eaten = self.fodder.min(params.f);
            herbivore.gain_weight(eaten, params);
            self.fodder -= eaten;
        }
    }

    /// Carnivores hunt in random order, each trying the herbivores from the
    /// fittest down until its appetite is met
    pub fn feed_carnivores<R: Draw>(&mut self, config: &SimulationConfig, rng: &mut R) {
        if !self.is_habitable() || self.carnivores.is_empty() {
            return;
        }
        self.calculate_fitness(config);
        self.sort_herbivores_by_fitness();
        rng.shuffle(&mut self.carnivores);

        let params = &config.carnivore;
        for predator in &mut self.carnivores {
            let appetite = params.f;
            let mut eaten = 0.0;

            for prey in self.herbivores.iter_mut().filter(|prey| !prey.is_dead()) {
                if eaten >= appetite {
                    break;
                }
                let probability = predator.predation_probability(prey, params).unwrap_or(0.0);
                if rng.uniform() < probability {
                    prey.mark_dead();
                    let meal = prey.weight().min(appetite - eaten);
                    predator.gain_weight(meal, params);
                    predator.calculate_fitness(params);
                    eaten += meal;
                }
            }
        }

        let before = self.herbivores.len();
        self.herbivores.retain(|prey| !prey.is_dead());
        trace!(
            cell = %self.coord,
            killed = before - self.herbivores.len(),
            "Carnivores fed"
        );
    }

    /// Every animal may give birth once; newborns join after the round
    pub fn reproduce<R: Draw>(&mut self, config: &SimulationConfig, rng: &mut R) {
        if !self.is_habitable() {
            return;
        }
        let newborn_herbivores = breed(&mut self.herbivores, &config.herbivore, rng);
        let newborn_carnivores = breed(&mut self.carnivores, &config.carnivore, rng);

        trace!(
            cell = %self.coord,
            herbivore_births = newborn_herbivores.len(),
            carnivore_births = newborn_carnivores.len(),
            "Reproduction"
        );
        self.herbivores.extend(newborn_herbivores);
        self.carnivores.extend(newborn_carnivores);
    }

    pub fn mark_migration_intent<R: Draw>(&mut self, config: &SimulationConfig, rng: &mut R) {
        if !self.is_habitable() {
            return;
        }
        for animal in &mut self.herbivores {
            animal.evaluate_migration(&config.herbivore, rng);
        }
        for animal in &mut self.carnivores {
            animal.evaluate_migration(&config.carnivore, rng);
        }
    }

    /// Remove every animal flagged to migrate whose destination is open and
    /// hand it over together with that destination. Animals facing a closed
    /// neighbour drop their flag and stay.
    pub fn remove_migrated<R, F>(&mut self, rng: &mut R, is_open: F) -> Vec<(Coord, Animal)>
    where
        R: Draw,
        F: Fn(Coord) -> bool,
    {
        let mut departures = Vec::new();
        if !self.is_habitable() {
            return departures;
        }

        let coord = self.coord;
        for population in [&mut self.herbivores, &mut self.carnivores] {
            let mut staying = Vec::with_capacity(population.len());
            for mut animal in population.drain(..) {
                if !animal.has_migrated() {
                    staying.push(animal);
                    continue;
                }

                let direction = Direction::from_draw(rng.uniform());
                let destination = coord.step(direction);
                if is_open(destination) {
                    departures.push((destination, animal));
                } else {
                    trace!(
                        cell = %coord,
                        direction = ?direction,
                        "Migration cancelled, destination closed"
                    );
                    animal.settle();
                    staying.push(animal);
                }
            }
            *population = staying;
        }

        departures
    }

    pub fn age_all(&mut self) {
        if !self.is_habitable() {
            return;
        }
        for animal in self.herbivores.iter_mut().chain(self.carnivores.iter_mut()) {
            animal.grow_one_year();
            animal.settle();
        }
    }

    pub fn apply_weight_loss(&mut self, config: &SimulationConfig) {
        if !self.is_habitable() {
            return;
        }
        for animal in &mut self.herbivores {
            animal.lose_weight(&config.herbivore);
        }
        for animal in &mut self.carnivores {
            animal.lose_weight(&config.carnivore);
        }
    }

    pub fn apply_mortality<R: Draw>(&mut self, config: &SimulationConfig, rng: &mut R) {
        if !self.is_habitable() {
            return;
        }
        for animal in &mut self.herbivores {
            animal.evaluate_death(&config.herbivore, rng);
        }
        for animal in &mut self.carnivores {
            animal.evaluate_death(&config.carnivore, rng);
        }
        self.herbivores.retain(|animal| !animal.is_dead());
        self.carnivores.retain(|animal| !animal.is_dead());
    }
}

/// Birth round for one population. The headcount handed to each parent
/// starts at the population size and drops by one per parent processed.
fn breed<R: Draw>(population: &mut [Animal], params: &SpeciesParams, rng: &mut R) -> Vec<Animal> {
    let mut remaining = population.len();
    let mut newborns = Vec::new();
    for parent in population.iter_mut() {
        if let Some(child) = parent.attempt_birth(remaining, params, rng) {
            newborns.push(child);
        }
        remaining = remaining.saturating_sub(1);
    }
    newborns
}
