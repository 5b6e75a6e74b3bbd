use std::collections::HashMap;

use crate::{Color, Coord};

/// Current color per coordinate. Entries are never removed; un-painting is
/// not a thing, and there is no history beyond the latest value.
#[derive(Clone, Debug, Default)]
pub struct BoardGrid {
    width: u32,
    height: u32,
    colors: HashMap<Coord, Color>,
}

impl BoardGrid {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            colors: HashMap::new(),
        }
    }

    pub fn set(&mut self, coord: Coord, color: Color) {
        self.colors.insert(coord, color);
    }

    pub fn get(&self, coord: Coord) -> Option<Color> {
        self.colors.get(&coord).copied()
    }

    /// Dense export indexed `pixels[x][y]`, unpainted cells as black. This
    /// is the shape the save endpoint stores and replays.
    pub fn snapshot_pixels(&self) -> Vec<Vec<[u8; 3]>> {
        (0..self.width)
            .map(|x| {
                (0..self.height)
                    .map(|y| {
                        self.colors
                            .get(&Coord::new(x, y))
                            .map_or([0, 0, 0], |color| [color.r, color.g, color.b])
                    })
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_write_wins() {
        let mut grid = BoardGrid::new(10, 20);
        grid.set(Coord::new(2, 3), Color::new(255, 0, 0));
        assert_eq!(grid.get(Coord::new(2, 3)), Some(Color::new(255, 0, 0)));
        grid.set(Coord::new(2, 3), Color::new(0, 0, 0));
        assert_eq!(grid.get(Coord::new(2, 3)), Some(Color::new(0, 0, 0)));
    }

    #[test]
    fn unset_cells_read_as_absent() {
        let grid = BoardGrid::new(4, 4);
        assert_eq!(grid.get(Coord::new(0, 0)), None);
    }

    #[test]
    fn snapshot_is_dense_and_column_major() {
        let mut grid = BoardGrid::new(2, 3);
        grid.set(Coord::new(1, 2), Color::new(9, 8, 7));
        let pixels = grid.snapshot_pixels();
        assert_eq!(pixels.len(), 2);
        assert_eq!(pixels[0].len(), 3);
        assert_eq!(pixels[1][2], [9, 8, 7]);
        assert_eq!(pixels[0][0], [0, 0, 0]);
    }
}
