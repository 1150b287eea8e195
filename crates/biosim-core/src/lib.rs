//! Core types and utilities for the BioSim island ecosystem simulation.

pub mod types;
pub mod config;
pub mod error;
pub mod fitness;
pub mod rng;

pub use error::{Error, Result};
pub use types::*;
pub use config::*;
pub use rng::{create_rng, Draw, ScriptedDraws};
