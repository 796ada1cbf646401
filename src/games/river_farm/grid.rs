//! Grid compositor: stamps every placed tile's rotated pattern into one master bitmap.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::tiles::rotated_pattern;
use super::types::*;

/// Fine-grained water bitmap of the whole board, `(ROWS*K) x (COLS*K)`, row-major.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterGrid {
    pub rows: usize,
    pub cols: usize,
    cells: Vec<bool>,
}

impl MasterGrid {
    /// An all-dry grid.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![false; rows * cols],
        }
    }

    /// Build a grid from explicit rows of water flags.
    pub fn from_rows(rows: &[Vec<bool>]) -> Self {
        let cols = rows.first().map(|r| r.len()).unwrap_or(0);
        assert!(
            rows.iter().all(|r| r.len() == cols),
            "All grid rows must have the same length"
        );
        Self {
            rows: rows.len(),
            cols,
            cells: rows.iter().flatten().copied().collect(),
        }
    }

    #[inline]
    fn idx(&self, cell: SubCell) -> usize {
        cell.0 * self.cols + cell.1
    }

    #[inline]
    pub fn in_bounds(&self, cell: SubCell) -> bool {
        cell.0 < self.rows && cell.1 < self.cols
    }

    #[inline]
    pub fn is_water(&self, cell: SubCell) -> bool {
        assert!(self.in_bounds(cell), "Sub-cell out of range: {cell:?}");
        self.cells[self.idx(cell)]
    }

    pub fn set(&mut self, cell: SubCell, water: bool) {
        assert!(self.in_bounds(cell), "Sub-cell out of range: {cell:?}");
        let i = self.idx(cell);
        self.cells[i] = water;
    }

    /// All water cells, row-major.
    pub fn water_cells(&self) -> impl Iterator<Item = SubCell> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, w)| **w)
            .map(move |(i, _)| (i / self.cols, i % self.cols))
    }

    pub fn water_count(&self) -> usize {
        self.cells.iter().filter(|&&w| w).count()
    }
}

/// Text rendering: `~` water, `.` dry.
impl fmt::Display for MasterGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..self.rows {
            for c in 0..self.cols {
                f.write_str(if self.is_water((r, c)) { "~" } else { "." })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Top-left master-grid cell of a board tile.
#[inline]
pub fn tile_origin(pos: TilePos) -> SubCell {
    (pos.0 * K, pos.1 * K)
}

/// The board tile whose K x K footprint contains a master-grid cell.
#[inline]
pub fn tile_of(cell: SubCell) -> TilePos {
    (cell.0 / K, cell.1 / K)
}

/// Expand the board into its master grid. Empty cells stay dry.
pub fn compose(board: &Board) -> MasterGrid {
    let mut grid = MasterGrid::new(ROWS * K, COLS * K);

    for (pos, tile) in board.occupied() {
        let pattern = rotated_pattern(tile.tile_type, tile.rotation);
        let (r0, c0) = tile_origin(pos);
        for (i, row) in pattern.iter().enumerate() {
            for (j, &water) in row.iter().enumerate() {
                if water {
                    grid.set((r0 + i, c0 + j), true);
                }
            }
        }
    }

    tracing::debug!(
        rows = grid.rows,
        cols = grid.cols,
        tiles = board.occupied().count(),
        water = grid.water_count(),
        "composed master grid"
    );
    grid
}
