//! Ant-style walker that turns on the colour of the cell it occupies.

use antlife_core::{AgentState, Cell, CellCoord, Direction};

use crate::grid::Grid;

/// Single agent walking over the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Agent {
    row: u32,
    column: u32,
    direction: Direction,
}

/// Outcome of a single agent step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AgentStep {
    /// Cell occupied before the step.
    pub from: CellCoord,
    /// Cell occupied after the step.
    pub to: CellCoord,
    /// Heading after the turn.
    pub direction: Direction,
    /// New state of the departed cell when a trail was deposited.
    pub deposited: Option<Cell>,
}

impl Agent {
    /// Creates an agent at the provided cell.
    #[must_use]
    pub const fn new(row: u32, column: u32, direction: Direction) -> Self {
        Self {
            row,
            column,
            direction,
        }
    }

    /// Row currently occupied.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Column currently occupied.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Current heading.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Snapshot of position and heading.
    #[must_use]
    pub const fn state(&self) -> AgentState {
        AgentState {
            cell: CellCoord::new(self.row, self.column),
            direction: self.direction,
        }
    }

    /// Turns on the occupied cell and moves one cell forward.
    ///
    /// Black turns right, white turns left. When `trail_deposit` is set the
    /// departed cell is flipped before moving. Movement wraps with the
    /// grid's topology.
    pub fn step(&mut self, grid: &mut Grid, trail_deposit: bool) -> AgentStep {
        let row = i64::from(self.row);
        let column = i64::from(self.column);
        let from = grid.wrap(row, column);

        self.direction = match grid.get(row, column) {
            Cell::Black => self.direction.turn_right(),
            Cell::White => self.direction.turn_left(),
        };

        let deposited = trail_deposit.then(|| grid.toggle(row, column));

        let (delta_row, delta_column) = self.direction.offset();
        let to = grid.wrap(row + delta_row, column + delta_column);
        self.row = to.row();
        self.column = to.column();

        AgentStep {
            from,
            to,
            direction: self.direction,
            deposited,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn black_cell_turns_right_and_trail_clears_it() {
        let mut grid = Grid::new(2, 2).expect("valid grid");
        grid.set(0, 0, Cell::Black);
        let mut agent = Agent::new(0, 0, Direction::Up);

        let step = agent.step(&mut grid, true);

        assert_eq!(agent.direction(), Direction::Right);
        assert_eq!((agent.row(), agent.column()), (0, (0 + 1) % 2));
        assert_eq!(grid.get(0, 0), Cell::White);
        assert_eq!(step.deposited, Some(Cell::White));
        assert_eq!(step.from, CellCoord::new(0, 0));
        assert_eq!(step.to, CellCoord::new(0, 1));
    }

    #[test]
    fn white_cell_turns_left_and_wraps_off_the_left_edge() {
        let mut grid = Grid::new(2, 2).expect("valid grid");
        let mut agent = Agent::new(0, 0, Direction::Up);

        let _ = agent.step(&mut grid, true);

        assert_eq!(agent.direction(), Direction::Left);
        // Column 0 - 1 wraps to width - 1.
        assert_eq!((agent.row(), agent.column()), (0, 1));
        assert_eq!(grid.get(0, 0), Cell::Black);
    }

    #[test]
    fn disabled_trail_leaves_cells_untouched() {
        let mut grid = Grid::new(3, 3).expect("valid grid");
        grid.set(1, 1, Cell::Black);
        let mut agent = Agent::new(1, 1, Direction::Down);

        let step = agent.step(&mut grid, false);

        assert_eq!(agent.direction(), Direction::Left);
        assert_eq!(step.to, CellCoord::new(1, 0));
        assert_eq!(step.deposited, None);
        assert_eq!(grid.get(1, 1), Cell::Black);
    }

    #[test]
    fn moving_up_from_top_row_wraps_to_bottom() {
        let mut grid = Grid::new(4, 3).expect("valid grid");
        grid.set(0, 2, Cell::Black);
        let mut agent = Agent::new(0, 2, Direction::Left);

        let _ = agent.step(&mut grid, false);

        assert_eq!(agent.direction(), Direction::Up);
        assert_eq!((agent.row(), agent.column()), (2, 2));
    }

    #[test]
    fn four_white_steps_trace_a_square() {
        let mut grid = Grid::new(5, 5).expect("valid grid");
        let mut agent = Agent::new(2, 2, Direction::Up);

        for _ in 0..4 {
            let _ = agent.step(&mut grid, true);
        }

        assert_eq!(agent.state().cell, CellCoord::new(2, 2));
        assert_eq!(agent.direction(), Direction::Up);
        assert_eq!(grid.population(), 4);
    }
}
