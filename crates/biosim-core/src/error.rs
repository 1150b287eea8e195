//! Error types for the simulation.

use crate::types::Coord;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),

    #[error("Unknown species: {0}")]
    UnknownSpecies(String),

    #[error("Unknown landscape: {0}")]
    UnknownLandscape(String),

    #[error("Invalid map: {0}")]
    MapValidation(String),

    #[error("Cell {0} is not habitable")]
    UninhabitableCell(Coord),

    #[error("Cell {0} is outside the island")]
    CellOutOfBounds(Coord),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
