use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use crate::Position;

/// Dense row-major 2D grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid<T> {
    rows: usize,
    cols: usize,
    cells: Vec<T>,
}

/// Roster slot standing on each cell, if any.
pub type Occupancy = Grid<Option<usize>>;

impl<T: Default + Clone> Grid<T> {
    /// # Panics
    ///
    /// Panics if `rows * cols` overflows `usize`.
    pub fn new(rows: usize, cols: usize) -> Self {
        let size = rows.checked_mul(cols).expect("Grid size overflow");
        Grid {
            rows,
            cols,
            cells: vec![T::default(); size],
        }
    }
}

impl<T> Grid<T> {
    #[inline]
    fn offset(&self, position: Position) -> Option<usize> {
        (position.row < self.rows && position.col < self.cols)
            .then(|| position.row * self.cols + position.col)
    }

    /// Yields `(Position, &T)` for every cell in row-major order.
    pub fn enumerate(&self) -> impl Iterator<Item = (Position, &T)> {
        let cols = self.cols;
        self.cells
            .iter()
            .enumerate()
            .map(move |(offset, cell)| (Position::new(offset / cols, offset % cols), cell))
    }
}

impl Occupancy {
    /// Unoccupied cells other than `exclude`, in row-major order.
    pub fn free_cells(&self, exclude: Position) -> Vec<Position> {
        self.enumerate()
            .filter(|(position, slot)| slot.is_none() && *position != exclude)
            .map(|(position, _)| position)
            .collect()
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|slot| slot.is_some()).count()
    }
}

impl<T> Index<Position> for Grid<T> {
    type Output = T;

    fn index(&self, position: Position) -> &T {
        match self.offset(position) {
            Some(offset) => &self.cells[offset],
            None => panic!(
                "{position:?} out of bounds for a {}x{} grid",
                self.rows, self.cols
            ),
        }
    }
}

impl<T> IndexMut<Position> for Grid<T> {
    fn index_mut(&mut self, position: Position) -> &mut T {
        let (rows, cols) = (self.rows, self.cols);
        match self.offset(position) {
            Some(offset) => &mut self.cells[offset],
            None => panic!("{position:?} out of bounds for a {rows}x{cols} grid"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_are_row_major() {
        let grid: Grid<u8> = Grid::new(2, 3);
        let cells: Vec<Position> = grid.enumerate().map(|(pos, _)| pos).collect();
        assert_eq!(cells.len(), 6);
        assert_eq!(cells[4], Position::new(1, 1));
        assert_eq!(grid.offset(Position::new(1, 2)), Some(5));
        assert_eq!(grid.offset(Position::new(2, 0)), None);
    }

    #[test]
    fn free_cells_skip_occupied_and_excluded() {
        let mut grid: Occupancy = Grid::new(2, 2);
        grid[Position::new(0, 1)] = Some(4);
        assert_eq!(grid.occupied_count(), 1);
        assert_eq!(
            grid.free_cells(Position::new(1, 1)),
            vec![Position::new(0, 0), Position::new(1, 0)]
        );
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn indexing_outside_panics() {
        let grid: Grid<bool> = Grid::new(2, 2);
        let _ = grid[Position::new(0, 2)];
    }
}
