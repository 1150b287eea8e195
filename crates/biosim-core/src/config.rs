//! Configuration types for the simulation.

use crate::error::{Error, Result};
use crate::types::{Landscape, Species};
use serde::{de, Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Biological constants shared by every animal of one species
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesParams {
    /// Mean birth weight
    pub w_birth: f64,
    /// Standard deviation of the birth weight
    pub sigma_birth: f64,
    /// Share of eaten food turned into weight
    pub beta: f64,
    /// Share of weight lost every year
    pub eta: f64,
    /// Age at which the age factor of fitness is one half
    pub a_half: f64,
    pub phi_age: f64,
    /// Weight at which the weight factor of fitness is one half
    pub w_half: f64,
    pub phi_weight: f64,
    /// Migration propensity
    pub mu: f64,
    /// Birth probability scale
    pub gamma: f64,
    /// Minimum mother weight, in multiples of `w_birth + sigma_birth`
    pub zeta: f64,
    /// Mother weight lost per unit of newborn weight
    pub xi: f64,
    /// Death probability scale
    pub omega: f64,
    /// Appetite per year
    #[serde(rename = "F")]
    pub f: f64,
    /// Fitness difference at which predation always succeeds (carnivores only)
    #[serde(rename = "DeltaPhiMax", default, skip_serializing_if = "Option::is_none")]
    pub delta_phi_max: Option<f64>,
}

impl SpeciesParams {
    pub fn herbivore() -> Self {
        Self {
            w_birth: 8.0,
            sigma_birth: 1.5,
            beta: 0.9,
            eta: 0.05,
            a_half: 40.0,
            phi_age: 0.6,
            w_half: 10.0,
            phi_weight: 0.1,
            mu: 0.25,
            gamma: 0.2,
            zeta: 3.5,
            xi: 1.2,
            omega: 0.4,
            f: 10.0,
            delta_phi_max: None,
        }
    }

    pub fn carnivore() -> Self {
        Self {
            w_birth: 6.0,
            sigma_birth: 1.0,
            beta: 0.75,
            eta: 0.125,
            a_half: 40.0,
            phi_age: 0.3,
            w_half: 4.0,
            phi_weight: 0.4,
            mu: 0.4,
            gamma: 0.8,
            zeta: 3.5,
            xi: 1.1,
            omega: 0.8,
            f: 50.0,
            delta_phi_max: Some(10.0),
        }
    }

    /// Set a single parameter by its conventional name (`w_birth`, `F`,
    /// `DeltaPhiMax`, ...).
    pub fn set(&mut self, name: &str, value: f64) -> Result<()> {
        let slot = match name {
            "w_birth" => &mut self.w_birth,
            "sigma_birth" => &mut self.sigma_birth,
            "beta" => &mut self.beta,
            "eta" => &mut self.eta,
            "a_half" => &mut self.a_half,
            "phi_age" => &mut self.phi_age,
            "w_half" => &mut self.w_half,
            "phi_weight" => &mut self.phi_weight,
            "mu" => &mut self.mu,
            "gamma" => &mut self.gamma,
            "zeta" => &mut self.zeta,
            "xi" => &mut self.xi,
            "omega" => &mut self.omega,
            "F" => &mut self.f,
            "DeltaPhiMax" => match self.delta_phi_max.as_mut() {
                Some(slot) => slot,
                None => return Err(Error::UnknownParameter(name.to_string())),
            },
            _ => return Err(Error::UnknownParameter(name.to_string())),
        };

        if value.is_nan() || value < 0.0 {
            return Err(Error::InvalidParameter(format!(
                "{} must be non-negative, got {}",
                name, value
            )));
        }
        if name == "eta" && value > 1.0 {
            return Err(Error::InvalidParameter(format!(
                "eta must not exceed 1, got {}",
                value
            )));
        }
        if name == "DeltaPhiMax" && value == 0.0 {
            return Err(Error::InvalidParameter(
                "DeltaPhiMax must be strictly positive".to_string(),
            ));
        }

        *slot = value;
        Ok(())
    }

    /// Apply a set of overrides. Either every entry is accepted or the
    /// table is left untouched.
    pub fn apply(&mut self, overrides: &BTreeMap<String, f64>) -> Result<()> {
        let mut updated = self.clone();
        for (name, value) in overrides {
            updated.set(name, *value)?;
        }
        *self = updated;
        Ok(())
    }
}

/// Parameters of a vegetated landscape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandscapeParams {
    /// Fodder available at the start of every year
    pub f_max: f64,
}

impl LandscapeParams {
    pub fn set(&mut self, name: &str, value: f64) -> Result<()> {
        match name {
            "f_max" if value.is_nan() || value < 0.0 => Err(Error::InvalidParameter(format!(
                "f_max must be non-negative, got {}",
                value
            ))),
            "f_max" => {
                self.f_max = value;
                Ok(())
            }
            _ => Err(Error::UnknownParameter(name.to_string())),
        }
    }

    pub fn apply(&mut self, overrides: &BTreeMap<String, f64>) -> Result<()> {
        let mut updated = self.clone();
        for (name, value) in overrides {
            updated.set(name, *value)?;
        }
        *self = updated;
        Ok(())
    }
}

/// Full parameter set for one simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Random seed for reproducibility
    pub seed: u64,
    #[serde(deserialize_with = "herbivore_table")]
    pub herbivore: SpeciesParams,
    #[serde(deserialize_with = "carnivore_table")]
    pub carnivore: SpeciesParams,
    pub lowland: LandscapeParams,
    pub highland: LandscapeParams,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            herbivore: SpeciesParams::herbivore(),
            carnivore: SpeciesParams::carnivore(),
            lowland: LandscapeParams { f_max: 800.0 },
            highland: LandscapeParams { f_max: 300.0 },
        }
    }
}

fn herbivore_table<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<SpeciesParams, D::Error> {
    let params = SpeciesParams::deserialize(deserializer)?;
    if params.delta_phi_max.is_some() {
        return Err(de::Error::custom("herbivores do not take DeltaPhiMax"));
    }
    Ok(params)
}

fn carnivore_table<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<SpeciesParams, D::Error> {
    let params = SpeciesParams::deserialize(deserializer)?;
    match params.delta_phi_max {
        Some(value) if value > 0.0 => Ok(params),
        Some(value) => Err(de::Error::custom(format!(
            "DeltaPhiMax must be strictly positive, got {}",
            value
        ))),
        None => Err(de::Error::custom("carnivore table requires DeltaPhiMax")),
    }
}

impl SimulationConfig {
    pub fn species(&self, species: Species) -> &SpeciesParams {
        match species {
            Species::Herbivore => &self.herbivore,
            Species::Carnivore => &self.carnivore,
        }
    }

    /// Yearly fodder of a landscape kind; water and desert grow nothing
    pub fn f_max(&self, landscape: Landscape) -> f64 {
        match landscape {
            Landscape::Lowland => self.lowland.f_max,
            Landscape::Highland => self.highland.f_max,
            Landscape::Water | Landscape::Desert => 0.0,
        }
    }

    pub fn set_species_parameters(
        &mut self,
        species: Species,
        overrides: &BTreeMap<String, f64>,
    ) -> Result<()> {
        let params = match species {
            Species::Herbivore => &mut self.herbivore,
            Species::Carnivore => &mut self.carnivore,
        };
        params.apply(overrides)?;
        debug!(species = %species, overrides = ?overrides, "Species parameters updated");
        Ok(())
    }

    /// Only lowland and highland carry tunable parameters
    pub fn set_landscape_parameters(
        &mut self,
        landscape: Landscape,
        overrides: &BTreeMap<String, f64>,
    ) -> Result<()> {
        let params = match landscape {
            Landscape::Lowland => &mut self.lowland,
            Landscape::Highland => &mut self.highland,
            Landscape::Water | Landscape::Desert => {
                return Err(Error::InvalidParameter(format!(
                    "landscape {} has no tunable parameters",
                    landscape.code()
                )))
            }
        };
        params.apply(overrides)?;
        debug!(landscape = %landscape.code(), overrides = ?overrides, "Landscape parameters updated");
        Ok(())
    }
}
