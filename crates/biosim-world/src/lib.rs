//! Island simulation engine.
//!
//! This crate holds the animals, the cells they live in, the island that runs
//! the yearly cycle, and the seeded driver on top of it.

pub mod cell;
pub mod grid;
pub mod island;
pub mod organism;
pub mod simulation;

pub use cell::Cell;
pub use grid::Grid;
pub use island::Island;
pub use organism::Animal;
pub use simulation::BioSim;
