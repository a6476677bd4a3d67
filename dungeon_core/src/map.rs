use std::ops::{Index, IndexMut};

use crate::Position;

/// Represents errors that can occur within the grid operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("Position {position} is out of bounds for grid size ({rows}, {cols})")]
    OutOfBounds {
        position: Position,
        rows: usize,
        cols: usize,
    },
}

/// A generic 2D grid structure.
///
/// Stores elements of type `T` in a flat vector using row-major order, so a
/// cell's index is `row * cols + col`. Positions double as stable arena
/// handles: anything that refers to a cell stores its `Position` rather than a
/// reference into the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid<T> {
    rows: usize,
    cols: usize,
    cells: Vec<T>,
}

impl<T> Grid<T> {
    /// Creates a new grid with the specified dimensions, filled by a generator function.
    ///
    /// The generator function `f` is called once per cell in row-major order.
    ///
    /// # Panics
    ///
    /// Panics if `rows * cols` overflows `usize`.
    pub fn from_generator<F>(rows: usize, cols: usize, mut f: F) -> Self
    where
        F: FnMut(Position) -> T,
    {
        let size = rows.checked_mul(cols).expect("Grid size overflow");
        let mut cells = Vec::with_capacity(size);
        for row in 0..rows {
            for col in 0..cols {
                cells.push(f(Position::new(row, col)));
            }
        }
        Grid { rows, cols, cells }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Converts a position to a flat vector index.
    ///
    /// Returns `None` if the position is out of bounds.
    #[inline]
    pub fn index_of(&self, position: Position) -> Option<usize> {
        if self.contains(position) {
            Some(position.row * self.cols + position.col)
        } else {
            None
        }
    }

    /// Converts a flat vector index back to a position.
    ///
    /// Returns `None` if the index is out of bounds.
    #[inline]
    pub fn position_of(&self, index: usize) -> Option<Position> {
        if index < self.cells.len() {
            Some(Position::new(index / self.cols, index % self.cols))
        } else {
            None
        }
    }

    /// Checks if the given position is within the grid boundaries.
    #[inline]
    pub fn contains(&self, position: Position) -> bool {
        position.row < self.rows && position.col < self.cols
    }

    pub fn get(&self, position: Position) -> Option<&T> {
        let index = self.index_of(position)?;
        self.cells.get(index)
    }

    pub fn get_mut(&mut self, position: Position) -> Option<&mut T> {
        let index = self.index_of(position)?;
        self.cells.get_mut(index)
    }

    /// Like [`Grid::get`], but reports an out-of-bounds error instead of `None`.
    pub fn require(&self, position: Position) -> Result<&T, GridError> {
        let error = self.out_of_bounds(position);
        self.get(position).ok_or(error)
    }

    /// Like [`Grid::get_mut`], but reports an out-of-bounds error instead of `None`.
    pub fn require_mut(&mut self, position: Position) -> Result<&mut T, GridError> {
        let error = self.out_of_bounds(position);
        self.get_mut(position).ok_or(error)
    }

    fn out_of_bounds(&self, position: Position) -> GridError {
        GridError::OutOfBounds {
            position,
            rows: self.rows,
            cols: self.cols,
        }
    }

    /// Returns an iterator over the cells of the grid in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.cells.iter()
    }

    /// Returns an iterator over every position in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + use<T> {
        let cols = self.cols;
        (0..self.cells.len()).map(move |index| Position::new(index / cols, index % cols))
    }

    /// Returns an iterator that yields `(Position, &T)` for each cell.
    pub fn enumerate(&self) -> impl Iterator<Item = (Position, &T)> {
        let cols = self.cols;
        self.cells
            .iter()
            .enumerate()
            .map(move |(index, cell)| (Position::new(index / cols, index % cols), cell))
    }
}

impl<T> Index<Position> for Grid<T> {
    type Output = T;

    #[inline]
    fn index(&self, position: Position) -> &Self::Output {
        match self.index_of(position) {
            Some(idx) => &self.cells[idx],
            None => panic!(
                "Grid index {} out of bounds for grid size ({}, {})",
                position, self.rows, self.cols
            ),
        }
    }
}

impl<T> IndexMut<Position> for Grid<T> {
    #[inline]
    fn index_mut(&mut self, position: Position) -> &mut Self::Output {
        let (rows, cols) = (self.rows, self.cols);
        match self.index_of(position) {
            Some(idx) => &mut self.cells[idx],
            None => panic!(
                "Grid index {} out of bounds for grid size ({}, {})",
                position, rows, cols
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_and_position_round_trip_row_major() {
        let grid = Grid::from_generator(3, 4, |p| p.row * 10 + p.col);
        assert_eq!(grid.index_of(Position::new(2, 1)), Some(9));
        assert_eq!(grid.position_of(9), Some(Position::new(2, 1)));
        assert_eq!(grid[Position::new(2, 1)], 21);
        assert_eq!(grid.len(), 12);
    }

    #[test]
    fn out_of_bounds_lookups_fail() {
        let grid = Grid::from_generator(2, 2, |_| ());
        assert!(grid.get(Position::new(2, 0)).is_none());
        assert_eq!(grid.position_of(4), None);
        assert_eq!(
            grid.require(Position::new(0, 5)),
            Err(GridError::OutOfBounds {
                position: Position::new(0, 5),
                rows: 2,
                cols: 2,
            })
        );
    }

    #[test]
    fn enumerate_matches_positions() {
        let grid = Grid::from_generator(2, 3, |p| p);
        for (position, cell) in grid.enumerate() {
            assert_eq!(position, *cell);
        }
        assert_eq!(grid.positions().count(), 6);
    }
}
