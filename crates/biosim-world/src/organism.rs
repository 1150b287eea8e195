//! Animal state and the yearly rules applied to a single animal.

use biosim_core::fitness;
use biosim_core::{AnimalRecord, Draw, Error, Result, Species, SpeciesParams};

/// A herbivore or carnivore on the island.
///
/// Species constants are not stored on the animal; every rule takes the
/// species table it should use.
#[derive(Debug, Clone, PartialEq)]
pub struct Animal {
    species: Species,
    age: u32,
    weight: f64,
    fitness: f64,
    has_migrated: bool,
    is_dead: bool,
}

impl Animal {
    /// Create an animal from a loaded age and weight
    pub fn new(species: Species, age: i64, weight: f64, params: &SpeciesParams) -> Result<Self> {
        let age = u32::try_from(age).map_err(|_| {
            Error::InvalidParameter(format!("age must be a non-negative integer, got {}", age))
        })?;
        if weight.is_nan() || weight < 0.0 {
            return Err(Error::InvalidParameter(format!(
                "weight must be non-negative, got {}",
                weight
            )));
        }

        let mut animal = Self::newborn(species, weight);
        animal.age = age;
        animal.calculate_fitness(params);
        Ok(animal)
    }

    pub fn from_record(record: &AnimalRecord, params: &SpeciesParams) -> Result<Self> {
        Self::new(record.species, record.age, record.weight, params)
    }

    fn newborn(species: Species, weight: f64) -> Self {
        Self {
            species,
            age: 0,
            weight,
            fitness: 0.0,
            has_migrated: false,
            is_dead: false,
        }
    }

    pub fn species(&self) -> Species {
        self.species
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Fitness as of the last [`Animal::calculate_fitness`] call
    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    pub fn has_migrated(&self) -> bool {
        self.has_migrated
    }

    pub fn is_dead(&self) -> bool {
        self.is_dead
    }

    pub fn to_record(&self) -> AnimalRecord {
        AnimalRecord {
            species: self.species,
            age: i64::from(self.age),
            weight: self.weight,
        }
    }

    pub fn calculate_fitness(&mut self, params: &SpeciesParams) -> f64 {
        self.fitness = fitness::fitness(self.age, self.weight, params);
        self.fitness
    }

    pub fn grow_one_year(&mut self) {
        self.age += 1;
    }

    pub fn gain_weight(&mut self, fodder: f64, params: &SpeciesParams) {
        self.weight += fodder * params.beta;
    }

    pub fn lose_weight(&mut self, params: &SpeciesParams) {
        self.weight -= self.weight * params.eta;
        if self.weight < 0.0 {
            self.weight = 0.0;
        }
    }

    pub(crate) fn mark_dead(&mut self) {
        self.is_dead = true;
    }

    pub(crate) fn settle(&mut self) {
        self.has_migrated = false;
    }

    /// Roll for death this year
    pub fn evaluate_death<R: Draw>(&mut self, params: &SpeciesParams, rng: &mut R) -> bool {
        let draw = rng.uniform();
        let phi = self.calculate_fitness(params);
        if self.weight <= 0.0 || draw < fitness::death_probability(phi, params) {
            self.is_dead = true;
        }
        self.is_dead
    }

    /// Decide whether the animal wants to leave its cell this year.
    ///
    /// An animal already flagged has moved once and is settled again.
    pub fn evaluate_migration<R: Draw>(&mut self, params: &SpeciesParams, rng: &mut R) -> bool {
        if self.has_migrated {
            self.has_migrated = false;
            return false;
        }

        let phi = self.calculate_fitness(params);
        if rng.uniform() < params.mu * phi {
            self.has_migrated = true;
        }
        self.has_migrated
    }

    /// Try to give birth with `n` animals of the species in the cell.
    ///
    /// On success the mother loses `xi` times the newborn's weight.
    pub fn attempt_birth<R: Draw>(
        &mut self,
        n: usize,
        params: &SpeciesParams,
        rng: &mut R,
    ) -> Option<Animal> {
        let phi = self.calculate_fitness(params);
        let child_weight = rng.normal(params.w_birth, params.sigma_birth);
        let weight_loss = child_weight * params.xi;
        let minimum_weight = params.zeta * (params.w_birth + params.sigma_birth);

        if self.weight < weight_loss || child_weight <= 0.0 || self.weight < minimum_weight {
            return None;
        }

        if rng.uniform() < fitness::birth_probability(phi, n, params) {
            self.weight -= weight_loss;
            let mut child = Animal::newborn(self.species, child_weight);
            child.calculate_fitness(params);
            Some(child)
        } else {
            None
        }
    }

    /// Chance that this carnivore kills `prey`, based on the cached fitness
    /// of both. `None` for herbivores.
    pub fn predation_probability(&self, prey: &Animal, params: &SpeciesParams) -> Option<f64> {
        if self.species != Species::Carnivore {
            return None;
        }
        let delta_phi_max = params.delta_phi_max?;
        Some(fitness::kill_probability(
            self.fitness,
            prey.fitness,
            delta_phi_max,
        ))
    }
}
