//! Core type definitions for the simulation.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The two animal species living on the island
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Species {
    Herbivore,
    Carnivore,
}

impl Species {
    pub fn name(&self) -> &'static str {
        match self {
            Species::Herbivore => "Herbivore",
            Species::Carnivore => "Carnivore",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Species {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Herbivore" => Ok(Species::Herbivore),
            "Carnivore" => Ok(Species::Carnivore),
            other => Err(Error::UnknownSpecies(other.to_string())),
        }
    }
}

/// Landscape kind of a single cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Landscape {
    Water,
    Lowland,
    Highland,
    Desert,
}

impl Landscape {
    /// Parse a map character (`W`, `L`, `H`, `D`)
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'W' => Some(Landscape::Water),
            'L' => Some(Landscape::Lowland),
            'H' => Some(Landscape::Highland),
            'D' => Some(Landscape::Desert),
            _ => None,
        }
    }

    pub fn code(&self) -> char {
        match self {
            Landscape::Water => 'W',
            Landscape::Lowland => 'L',
            Landscape::Highland => 'H',
            Landscape::Desert => 'D',
        }
    }

    /// Animals may live anywhere but in water
    pub fn is_habitable(&self) -> bool {
        !matches!(self, Landscape::Water)
    }
}

/// Cell coordinate on the island map.
///
/// Rows and columns are 1-based: `(1, 1)` is the first character of the
/// first map line. Serialized as a `[row, col]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "(i32, i32)", into = "(i32, i32)")]
pub struct Coord {
    pub row: i32,
    pub col: i32,
}

impl Coord {
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Neighbouring coordinate one step in `direction`
    pub fn step(&self, direction: Direction) -> Self {
        let (d_row, d_col) = direction.to_delta();
        Self {
            row: self.row + d_row,
            col: self.col + d_col,
        }
    }
}

impl From<(i32, i32)> for Coord {
    fn from((row, col): (i32, i32)) -> Self {
        Self { row, col }
    }
}

impl From<Coord> for (i32, i32) {
    fn from(coord: Coord) -> Self {
        (coord.row, coord.col)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Direction for migration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub fn to_delta(&self) -> (i32, i32) {
        match self {
            Direction::North => (-1, 0),
            Direction::South => (1, 0),
            Direction::East => (0, 1),
            Direction::West => (0, -1),
        }
    }

    /// Map a uniform draw in `[0, 1]` onto one of the four directions,
    /// each covering a quarter of the interval.
    pub fn from_draw(draw: f64) -> Self {
        if draw <= 0.25 {
            Direction::East
        } else if draw <= 0.5 {
            Direction::West
        } else if draw <= 0.75 {
            Direction::North
        } else {
            Direction::South
        }
    }
}

/// One animal in a population record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimalRecord {
    pub species: Species,
    pub age: i64,
    pub weight: f64,
}

/// Animals to place into a single cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationRecord {
    pub loc: Coord,
    pub pop: Vec<AnimalRecord>,
}

/// Live animal counts, per cell or summed over the island
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationCounts {
    pub herbivores: usize,
    pub carnivores: usize,
}

impl PopulationCounts {
    pub fn new(herbivores: usize, carnivores: usize) -> Self {
        Self {
            herbivores,
            carnivores,
        }
    }

    pub fn total(&self) -> usize {
        self.herbivores + self.carnivores
    }
}

impl std::ops::AddAssign for PopulationCounts {
    fn add_assign(&mut self, other: Self) {
        self.herbivores += other.herbivores;
        self.carnivores += other.carnivores;
    }
}

/// Age, weight and fitness of every animal of one species
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeciesSamples {
    pub age: Vec<u32>,
    pub weight: Vec<f64>,
    pub fitness: Vec<f64>,
}

impl SpeciesSamples {
    pub fn push(&mut self, age: u32, weight: f64, fitness: f64) {
        self.age.push(age);
        self.weight.push(weight);
        self.fitness.push(fitness);
    }

    pub fn extend(&mut self, other: SpeciesSamples) {
        self.age.extend(other.age);
        self.weight.extend(other.weight);
        self.fitness.extend(other.fitness);
    }

    pub fn len(&self) -> usize {
        self.age.len()
    }

    pub fn is_empty(&self) -> bool {
        self.age.is_empty()
    }
}

/// Per-species samples, used for histograms
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PopulationSamples {
    pub herbivores: SpeciesSamples,
    pub carnivores: SpeciesSamples,
}

impl PopulationSamples {
    pub fn extend(&mut self, other: PopulationSamples) {
        self.herbivores.extend(other.herbivores);
        self.carnivores.extend(other.carnivores);
    }
}

/// Island totals after a simulated year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRecord {
    pub year: u32,
    pub herbivores: usize,
    pub carnivores: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_from_draw() {
        assert_eq!(Direction::from_draw(0.0), Direction::East);
        assert_eq!(Direction::from_draw(0.25), Direction::East);
        assert_eq!(Direction::from_draw(0.35), Direction::West);
        assert_eq!(Direction::from_draw(0.6), Direction::North);
        assert_eq!(Direction::from_draw(0.76), Direction::South);
        assert_eq!(Direction::from_draw(1.0), Direction::South);
    }

    #[test]
    fn test_coord_step() {
        let coord = Coord::new(3, 3);
        assert_eq!(coord.step(Direction::North), Coord::new(2, 3));
        assert_eq!(coord.step(Direction::South), Coord::new(4, 3));
        assert_eq!(coord.step(Direction::East), Coord::new(3, 4));
        assert_eq!(coord.step(Direction::West), Coord::new(3, 2));
    }

    #[test]
    fn test_landscape_codes() {
        for code in ['W', 'L', 'H', 'D'] {
            let landscape = Landscape::from_code(code).unwrap();
            assert_eq!(landscape.code(), code);
        }
        assert!(Landscape::from_code('K').is_none());
        assert!(!Landscape::Water.is_habitable());
        assert!(Landscape::Desert.is_habitable());
    }

    #[test]
    fn test_species_parsing() {
        assert_eq!("Herbivore".parse::<Species>().unwrap(), Species::Herbivore);
        assert_eq!("Carnivore".parse::<Species>().unwrap(), Species::Carnivore);
        assert!(matches!(
            "Omnivore".parse::<Species>(),
            Err(Error::UnknownSpecies(_))
        ));
    }

    #[test]
    fn test_population_record_json() {
        let json = r#"{"loc": [2, 2], "pop": [{"species": "Herbivore", "age": 5, "weight": 20.0}]}"#;
        let record: PopulationRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.loc, Coord::new(2, 2));
        assert_eq!(record.pop[0].species, Species::Herbivore);

        let back = serde_json::to_string(&record).unwrap();
        assert!(back.contains("\"loc\":[2,2]"));
    }

    #[test]
    fn test_population_counts() {
        let mut counts = PopulationCounts::new(3, 1);
        counts += PopulationCounts::new(2, 2);
        assert_eq!(counts.total(), 8);
        assert_eq!(counts, PopulationCounts::new(5, 3));
    }
}
