//! Scenario files: everything needed to set up and run one simulation.

use biosim_core::{
    AnimalRecord, Coord, PopulationRecord, Result, SimulationConfig, Species, YearRecord,
};
use biosim_world::BioSim;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Parameter overrides keyed by target (species name or landscape letter),
/// then by parameter name
pub type Overrides = BTreeMap<String, BTreeMap<String, f64>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub map: String,
    pub seed: u64,
    pub years: u32,
    pub initial_population: Vec<PopulationRecord>,
    pub animal_parameters: Overrides,
    pub landscape_parameters: Overrides,
    /// Where to write the year log as CSV
    pub log_file: Option<PathBuf>,
}

impl Default for Scenario {
    /// A single lowland cell with fifty grown herbivores
    fn default() -> Self {
        Self {
            map: "WWW\nWLW\nWWW".to_string(),
            seed: 12345,
            years: 10,
            initial_population: vec![PopulationRecord {
                loc: Coord::new(2, 2),
                pop: (0..50)
                    .map(|_| AnimalRecord {
                        species: Species::Herbivore,
                        age: 5,
                        weight: 20.0,
                    })
                    .collect(),
            }],
            animal_parameters: Overrides::new(),
            landscape_parameters: Overrides::new(),
            log_file: None,
        }
    }
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let scenario = serde_json::from_str(&contents)?;
        debug!(path = %path.display(), "Scenario loaded");
        Ok(scenario)
    }

    /// Create the simulation and apply every override
    pub fn build(&self) -> Result<BioSim> {
        let config = SimulationConfig {
            seed: self.seed,
            ..Default::default()
        };
        let mut sim = BioSim::new(&self.map, &self.initial_population, config)?;

        for (species, overrides) in &self.animal_parameters {
            sim.set_animal_parameters(species, overrides)?;
        }
        for (code, overrides) in &self.landscape_parameters {
            sim.set_landscape_parameters(code, overrides)?;
        }
        Ok(sim)
    }
}

/// Write the year log as `Year,Total_Herbivores,Total_Carnivores` lines
pub fn write_year_log<W: Write>(mut out: W, history: &[YearRecord]) -> std::io::Result<()> {
    writeln!(out, "Year,Total_Herbivores,Total_Carnivores")?;
    for record in history {
        writeln!(
            out,
            "{},{},{}",
            record.year, record.herbivores, record.carnivores
        )?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use biosim_core::{Error, Landscape, PopulationCounts};

    #[test]
    fn test_default_scenario() {
        let scenario = Scenario::default();
        let sim = scenario.build().unwrap();
        assert_eq!(sim.num_animals_per_species(), PopulationCounts::new(50, 0));
        assert_eq!(sim.config().seed, 12345);
    }

    #[test]
    fn test_parse_scenario_json() {
        let json = r#"{
            "map": "WWWW\nWLHW\nWWWW",
            "seed": 7,
            "years": 3,
            "initial_population": [
                {"loc": [2, 3], "pop": [
                    {"species": "Herbivore", "age": 2, "weight": 15.0},
                    {"species": "Carnivore", "age": 3, "weight": 25.0}
                ]}
            ],
            "animal_parameters": {"Carnivore": {"F": 30.0}},
            "landscape_parameters": {"H": {"f_max": 100.0}}
        }"#;
        let scenario: Scenario = serde_json::from_str(json).unwrap();
        assert_eq!(scenario.years, 3);
        assert!(scenario.log_file.is_none());

        let mut sim = scenario.build().unwrap();
        assert_eq!(sim.config().carnivore.f, 30.0);
        assert_eq!(sim.config().f_max(Landscape::Highland), 100.0);
        assert_eq!(
            sim.cell_counts()[&Coord::new(2, 3)],
            PopulationCounts::new(1, 1)
        );

        sim.simulate(scenario.years);
        assert_eq!(sim.history().len(), 3);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let scenario: Scenario = serde_json::from_str(r#"{"years": 4}"#).unwrap();
        assert_eq!(scenario.years, 4);
        assert_eq!(scenario.map, Scenario::default().map);
        assert_eq!(scenario.initial_population.len(), 1);
    }

    #[test]
    fn test_bad_override_fails_build() {
        let mut scenario = Scenario::default();
        scenario
            .animal_parameters
            .insert("Dragon".to_string(), BTreeMap::from([("F".to_string(), 1.0)]));
        assert!(matches!(scenario.build(), Err(Error::UnknownSpecies(_))));
    }

    #[test]
    fn test_write_year_log() {
        let history = [
            YearRecord {
                year: 1,
                herbivores: 55,
                carnivores: 0,
            },
            YearRecord {
                year: 2,
                herbivores: 61,
                carnivores: 3,
            },
        ];
        let mut out = Vec::new();
        write_year_log(&mut out, &history).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Year,Total_Herbivores,Total_Carnivores\n1,55,0\n2,61,3\n"
        );
    }

    #[test]
    fn test_load_missing_file() {
        let result = Scenario::load(Path::new("/nonexistent/biosim/scenario.json"));
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
