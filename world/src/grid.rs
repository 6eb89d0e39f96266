//! Toroidal two-state grid evolved with birth/survival counting.

use std::mem;

use antlife_core::{AutomatonError, Cell, CellCoord};

/// Offsets of the eight cells surrounding a cell, as `(row, column)` deltas.
const NEIGHBOR_OFFSETS: [(i64, i64); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Fixed-size grid of cells whose edges wrap around.
///
/// Every coordinate accepted by the grid is reduced modulo the grid's
/// dimensions, so lookups never fall out of bounds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
    scratch: Vec<Cell>,
}

impl Grid {
    /// Creates an all-white grid.
    ///
    /// Fails with [`AutomatonError::InvalidDimension`] when either dimension
    /// is non-positive or the cell count cannot be addressed.
    pub fn new(width: i64, height: i64) -> Result<Self, AutomatonError> {
        let invalid = AutomatonError::InvalidDimension { width, height };
        if width <= 0 || height <= 0 {
            return Err(invalid);
        }
        let columns = u32::try_from(width).map_err(|_| invalid)?;
        let rows = u32::try_from(height).map_err(|_| invalid)?;
        let capacity =
            usize::try_from(u64::from(columns) * u64::from(rows)).map_err(|_| invalid)?;

        Ok(Self {
            width: columns,
            height: rows,
            cells: white_cells(capacity).ok_or(invalid)?,
            scratch: white_cells(capacity).ok_or(invalid)?,
        })
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Current generation in row-major order.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Current generation as exported cell codes, borrowed from live storage.
    #[must_use]
    pub fn codes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.cells)
    }

    /// Returns the cell at the wrapped coordinates.
    #[must_use]
    pub fn get(&self, row: i64, column: i64) -> Cell {
        self.cells[self.index(row, column)]
    }

    /// Overwrites the cell at the wrapped coordinates.
    pub fn set(&mut self, row: i64, column: i64, cell: Cell) {
        let index = self.index(row, column);
        self.cells[index] = cell;
    }

    /// Flips the cell at the wrapped coordinates and returns its new state.
    pub fn toggle(&mut self, row: i64, column: i64) -> Cell {
        let index = self.index(row, column);
        self.cells[index].toggle();
        self.cells[index]
    }

    /// Counts black cells among the eight wrapped neighbours.
    #[must_use]
    pub fn live_neighbor_count(&self, row: i64, column: i64) -> u8 {
        let origin = self.wrap(row, column);
        let row = i64::from(origin.row());
        let column = i64::from(origin.column());
        NEIGHBOR_OFFSETS
            .iter()
            .map(|&(delta_row, delta_column)| {
                self.get(row + delta_row, column + delta_column).is_black()
            })
            .fold(0, |count, alive| count + u8::from(alive))
    }

    /// Replaces the current generation with the next one.
    ///
    /// Every cell is computed from the current generation into the scratch
    /// buffer, which is then swapped in.
    pub fn step(&mut self) {
        let width = i64::from(self.width);
        let height = i64::from(self.height);

        for row in 0..height {
            for column in 0..width {
                let index = self.index(row, column);
                let neighbors = self.live_neighbor_count(row, column);
                self.scratch[index] = next_state(self.cells[index], neighbors);
            }
        }

        mem::swap(&mut self.cells, &mut self.scratch);
    }

    /// Number of black cells.
    #[must_use]
    pub fn population(&self) -> u32 {
        let count = self.cells.iter().filter(|cell| cell.is_black()).count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    /// Resets every cell to white.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::White);
    }

    /// Reduces arbitrary coordinates onto the torus.
    #[must_use]
    pub fn wrap(&self, row: i64, column: i64) -> CellCoord {
        let row = row.rem_euclid(i64::from(self.height));
        let column = column.rem_euclid(i64::from(self.width));
        // rem_euclid keeps both values inside 0..u32::MAX.
        CellCoord::new(row as u32, column as u32)
    }

    fn index(&self, row: i64, column: i64) -> usize {
        let cell = self.wrap(row, column);
        cell.row() as usize * self.width as usize + cell.column() as usize
    }
}

/// All-white buffer, or `None` when `len` cells cannot be allocated.
fn white_cells(len: usize) -> Option<Vec<Cell>> {
    let mut cells = Vec::new();
    cells.try_reserve_exact(len).ok()?;
    cells.resize(len, Cell::White);
    Some(cells)
}

/// Birth/survival rule for two-state cells (B3/S23).
#[must_use]
pub const fn next_state(cell: Cell, live_neighbors: u8) -> Cell {
    match (cell, live_neighbors) {
        (Cell::Black, 2 | 3) => Cell::Black,
        (Cell::White, 3) => Cell::Black,
        _ => Cell::White,
    }
}
