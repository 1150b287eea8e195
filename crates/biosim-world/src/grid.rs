//! Island geography parsed from a map string.

use biosim_core::{Coord, Error, Landscape, Result};

/// A bounded 2D grid of landscape kinds, surrounded by water
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub width: i32,
    pub height: i32,
    tiles: Vec<Landscape>,
}

impl Grid {
    /// Parse and validate a map with one character per cell.
    ///
    /// Leading and trailing whitespace on each line is ignored, as are blank
    /// lines, so indented multi-line literals can be passed directly.
    pub fn parse(map: &str) -> Result<Self> {
        let lines: Vec<&str> = map
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        let first = match lines.first() {
            Some(first) => first,
            None => return Err(Error::MapValidation("map is empty".to_string())),
        };
        let width = first.chars().count();
        if lines.iter().any(|line| line.chars().count() != width) {
            return Err(Error::MapValidation(
                "map lines must be of equal length".to_string(),
            ));
        }

        let mut tiles = Vec::with_capacity(width * lines.len());
        for line in &lines {
            for code in line.chars() {
                let landscape = Landscape::from_code(code).ok_or_else(|| {
                    Error::MapValidation(format!("unknown landscape type '{}'", code))
                })?;
                tiles.push(landscape);
            }
        }

        let grid = Self {
            width: width as i32,
            height: lines.len() as i32,
            tiles,
        };

        if grid
            .iter()
            .any(|(coord, landscape)| grid.is_border(coord) && landscape != Landscape::Water)
        {
            return Err(Error::MapValidation(
                "map boundary must be water".to_string(),
            ));
        }

        Ok(grid)
    }

    /// Landscape at `coord`, `None` outside the map
    pub fn get(&self, coord: Coord) -> Option<Landscape> {
        self.coord_to_index(coord).map(|index| self.tiles[index])
    }

    fn is_border(&self, coord: Coord) -> bool {
        coord.row == 1 || coord.col == 1 || coord.row == self.height || coord.col == self.width
    }

    fn coord_to_index(&self, coord: Coord) -> Option<usize> {
        if coord.row < 1 || coord.col < 1 || coord.row > self.height || coord.col > self.width {
            return None;
        }
        Some(((coord.row - 1) * self.width + (coord.col - 1)) as usize)
    }

    /// Get coordinate from index
    pub fn index_to_coord(&self, index: usize) -> Coord {
        let row = (index as i32) / self.width + 1;
        let col = (index as i32) % self.width + 1;
        Coord::new(row, col)
    }

    /// Iterator over all cells with coordinates, row by row
    pub fn iter(&self) -> impl Iterator<Item = (Coord, Landscape)> + '_ {
        self.tiles
            .iter()
            .enumerate()
            .map(move |(i, landscape)| (self.index_to_coord(i), *landscape))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_parsing() {
        let grid = Grid::parse(
            "WWWWW
             WLLHW
             WLHHW
             WDDDW
             WWWWW",
        )
        .unwrap();
        assert_eq!(grid.width, 5);
        assert_eq!(grid.height, 5);
        assert_eq!(grid.get(Coord::new(2, 2)), Some(Landscape::Lowland));
        assert_eq!(grid.get(Coord::new(2, 4)), Some(Landscape::Highland));
        assert_eq!(grid.get(Coord::new(4, 3)), Some(Landscape::Desert));
        assert_eq!(grid.get(Coord::new(1, 1)), Some(Landscape::Water));
        assert_eq!(grid.get(Coord::new(0, 3)), None);
        assert_eq!(grid.get(Coord::new(6, 3)), None);
    }

    #[test]
    fn test_iteration_order() {
        let grid = Grid::parse("WWWW\nWLHW\nWWWW").unwrap();
        let coords: Vec<Coord> = grid.iter().map(|(coord, _)| coord).collect();
        assert_eq!(coords.len(), 12);
        assert_eq!(coords[0], Coord::new(1, 1));
        assert_eq!(coords[5], Coord::new(2, 2));
        assert_eq!(grid.get(Coord::new(2, 3)), Some(Landscape::Highland));
    }

    #[test]
    fn test_rejects_unequal_lines() {
        let err = Grid::parse("W\nWW").unwrap_err();
        assert!(matches!(err, Error::MapValidation(msg) if msg.contains("equal length")));
    }

    #[test]
    fn test_rejects_unknown_letter() {
        let err = Grid::parse("WWW\nWKW\nWWW").unwrap_err();
        assert!(matches!(err, Error::MapValidation(msg) if msg.contains("'K'")));
    }

    #[test]
    fn test_rejects_land_on_border() {
        let err = Grid::parse("WL\nWW").unwrap_err();
        assert!(matches!(err, Error::MapValidation(msg) if msg.contains("water")));

        let err = Grid::parse("WWW\nWLL\nWWW").unwrap_err();
        assert!(matches!(err, Error::MapValidation(_)));
    }

    #[test]
    fn test_rejects_empty_map() {
        assert!(matches!(Grid::parse("  \n"), Err(Error::MapValidation(_))));
    }
}
