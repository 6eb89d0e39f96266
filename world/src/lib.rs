#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative automaton state for antlife.
//!
//! An [`Automaton`] owns one toroidal [`Grid`] and one [`Agent`]. Each call
//! to [`Automaton::tick`] moves the agent over the pre-tick grid, evolves the
//! grid (trail deposits included) into its next generation and then
//! republishes the agent words returned by [`Automaton::agent_view`].
//! [`Automaton::cells_view`] borrows the grid's live storage without copying.

mod agent;
mod exporter;
mod grid;

use std::fmt;

use antlife_core::{
    AgentView, AutomatonError, Cell, CellCoord, CellsView, Command, Direction, Event,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

pub use agent::{Agent, AgentStep};
pub use grid::{next_state, Grid};

use exporter::Exporter;

const DEFAULT_WIDTH: i64 = 17;
const DEFAULT_HEIGHT: i64 = 17;

/// Parameters required to construct an [`Automaton`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AutomatonConfig {
    /// Number of grid columns.
    pub width: i64,
    /// Number of grid rows.
    pub height: i64,
    /// Starting row of the agent; wrapped onto the grid.
    pub agent_row: i64,
    /// Starting column of the agent; wrapped onto the grid.
    pub agent_column: i64,
    /// Starting heading of the agent.
    pub agent_direction: Direction,
    /// Whether the agent flips every cell it departs from.
    pub trail_deposit: bool,
}

impl Default for AutomatonConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            agent_row: DEFAULT_HEIGHT / 2,
            agent_column: DEFAULT_WIDTH / 2,
            agent_direction: Direction::Up,
            trail_deposit: true,
        }
    }
}

/// Grid and agent advanced together one tick at a time.
#[derive(Clone, Debug)]
pub struct Automaton {
    grid: Grid,
    agent: Agent,
    exporter: Exporter,
    trail_deposit: bool,
    generation: u64,
}

impl Automaton {
    /// Creates an all-white automaton with the agent at `agent_position`.
    ///
    /// The position is wrapped onto the grid. Fails with
    /// [`AutomatonError::InvalidDimension`] when either dimension is not
    /// positive; no automaton is created in that case.
    pub fn new(
        width: i64,
        height: i64,
        agent_position: CellCoord,
        agent_direction: Direction,
        trail_deposit: bool,
    ) -> Result<Self, AutomatonError> {
        Self::build(
            width,
            height,
            i64::from(agent_position.row()),
            i64::from(agent_position.column()),
            agent_direction,
            trail_deposit,
        )
    }

    /// Creates an automaton from a configuration value.
    pub fn from_config(config: &AutomatonConfig) -> Result<Self, AutomatonError> {
        Self::build(
            config.width,
            config.height,
            config.agent_row,
            config.agent_column,
            config.agent_direction,
            config.trail_deposit,
        )
    }

    fn build(
        width: i64,
        height: i64,
        agent_row: i64,
        agent_column: i64,
        agent_direction: Direction,
        trail_deposit: bool,
    ) -> Result<Self, AutomatonError> {
        let grid = Grid::new(width, height)?;
        let start = grid.wrap(agent_row, agent_column);
        let agent = Agent::new(start.row(), start.column(), agent_direction);
        let exporter = Exporter::new(&agent);

        debug!(
            width = grid.width(),
            height = grid.height(),
            agent_row = start.row(),
            agent_column = start.column(),
            direction = %agent_direction,
            trail_deposit,
            "automaton constructed"
        );

        Ok(Self {
            grid,
            agent,
            exporter,
            trail_deposit,
            generation: 0,
        })
    }

    /// Advances the agent and the grid by one tick.
    pub fn tick(&mut self) {
        let _ = self.advance();
    }

    /// Advances one tick, reporting what changed through `out_events`.
    pub fn tick_with_events(&mut self, out_events: &mut Vec<Event>) {
        let step = self.advance();

        out_events.push(Event::AgentAdvanced {
            from: step.from,
            to: step.to,
            direction: step.direction,
        });
        if let Some(state) = step.deposited {
            out_events.push(Event::TrailDeposited {
                cell: step.from,
                state,
            });
        }
        out_events.push(Event::GenerationAdvanced {
            generation: self.generation,
            population: self.grid.population(),
        });
    }

    fn advance(&mut self) -> AgentStep {
        // The agent turns on, and deposits into, the pre-tick grid; the
        // generation step then sees the deposit as input.
        let step = self.agent.step(&mut self.grid, self.trail_deposit);
        self.grid.step();

        self.generation = self.generation.saturating_add(1);
        self.exporter.refresh(&self.agent, self.generation);

        trace!(
            generation = self.generation,
            row = step.to.row(),
            column = step.to.column(),
            direction = %step.direction,
            "tick committed"
        );
        step
    }

    /// Number of grid columns; constant for the automaton's lifetime.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.grid.width()
    }

    /// Number of grid rows; constant for the automaton's lifetime.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.grid.height()
    }

    /// Number of completed ticks.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Reports whether the agent deposits a trail.
    #[must_use]
    pub const fn trail_deposit(&self) -> bool {
        self.trail_deposit
    }

    /// Row-major cell codes of the current generation.
    ///
    /// The view aliases the grid's storage and borrows the automaton, so it
    /// cannot be held across the next [`tick`](Self::tick), which swaps the
    /// generation buffers. Fetch a fresh view after every tick.
    #[must_use]
    pub fn cells_view(&self) -> CellsView<'_> {
        self.exporter.cells_view(&self.grid)
    }

    /// Agent words `[row, column, direction]` as of the last committed tick.
    ///
    /// Subject to the same re-fetch rule as [`cells_view`](Self::cells_view).
    #[must_use]
    pub fn agent_view(&self) -> AgentView<'_> {
        self.exporter.agent_view(&self.grid)
    }

    /// Flips a cell between ticks and returns its new state.
    pub fn toggle_cell(&mut self, row: i64, column: i64) -> Cell {
        self.grid.toggle(row, column)
    }

    /// Overwrites a cell between ticks.
    pub fn set_cell(&mut self, row: i64, column: i64, state: Cell) {
        self.grid.set(row, column, state);
    }
}

impl fmt::Display for Automaton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = usize::try_from(self.grid.width()).map_err(|_| fmt::Error)?;
        for line in self.grid.cells().chunks(width) {
            for &cell in line {
                let symbol = if cell == Cell::White { '◻' } else { '◼' };
                write!(f, "{symbol}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Applies the provided command to the automaton, mutating state deterministically.
pub fn apply(automaton: &mut Automaton, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick => automaton.tick_with_events(out_events),
        Command::ToggleCell { cell } => {
            let state = automaton.toggle_cell(i64::from(cell.row()), i64::from(cell.column()));
            out_events.push(Event::CellChanged {
                cell: automaton.grid.wrap(i64::from(cell.row()), i64::from(cell.column())),
                state,
            });
        }
        Command::SetCell { cell, state } => {
            let row = i64::from(cell.row());
            let column = i64::from(cell.column());
            if automaton.grid.get(row, column) == state {
                return;
            }
            automaton.set_cell(row, column, state);
            out_events.push(Event::CellChanged {
                cell: automaton.grid.wrap(row, column),
                state,
            });
        }
    }
}

/// Query functions that provide read-only access to the automaton state.
pub mod query {
    use antlife_core::AgentState;

    use super::{Automaton, Grid};

    /// Provides read-only access to the automaton's grid.
    #[must_use]
    pub fn grid(automaton: &Automaton) -> &Grid {
        &automaton.grid
    }

    /// Captures the agent's current position and heading.
    #[must_use]
    pub fn agent(automaton: &Automaton) -> AgentState {
        automaton.agent.state()
    }

    /// Number of ticks committed so far.
    #[must_use]
    pub fn generation(automaton: &Automaton) -> u64 {
        automaton.generation
    }

    /// Number of black cells in the current generation.
    #[must_use]
    pub fn population(automaton: &Automaton) -> u32 {
        automaton.grid.population()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn automaton(width: i64, height: i64, trail_deposit: bool) -> Automaton {
        Automaton::new(
            width,
            height,
            CellCoord::new(0, 0),
            Direction::Up,
            trail_deposit,
        )
        .expect("valid dimensions")
    }

    #[test]
    fn construction_rejects_invalid_dimensions() {
        let zero_width = Automaton::new(0, 5, CellCoord::new(0, 0), Direction::Up, true);
        let negative_height = Automaton::new(5, -1, CellCoord::new(0, 0), Direction::Up, true);

        assert_eq!(
            zero_width.map(|_| ()),
            Err(AutomatonError::InvalidDimension {
                width: 0,
                height: 5
            })
        );
        assert_eq!(
            negative_height.map(|_| ()),
            Err(AutomatonError::InvalidDimension {
                width: 5,
                height: -1
            })
        );
    }

    #[test]
    fn default_config_is_seventeen_square_with_centred_agent() {
        let automaton =
            Automaton::from_config(&AutomatonConfig::default()).expect("default config");
        let agent = query::agent(&automaton);

        assert_eq!((automaton.width(), automaton.height()), (17, 17));
        assert_eq!(agent.cell, CellCoord::new(8, 8));
        assert_eq!(agent.direction, Direction::Up);
        assert!(automaton.trail_deposit());
        assert_eq!(automaton.agent_view().as_words(), &[8, 8, 0]);
    }

    #[test]
    fn agent_position_wraps_onto_grid() {
        let automaton = Automaton::new(4, 3, CellCoord::new(5, 9), Direction::Left, false)
            .expect("valid dimensions");

        assert_eq!(query::agent(&automaton).cell, CellCoord::new(2, 1));
        assert!(automaton.agent_view().is_active());
    }

    #[test]
    fn initial_views_describe_white_grid_and_agent() {
        let automaton = automaton(4, 2, true);
        let cells = automaton.cells_view();
        let agent = automaton.agent_view();

        assert_eq!(cells.as_bytes(), &[0; 8]);
        assert_eq!(agent.as_words(), &[0, 0, Direction::Up.code()]);
        assert_eq!(cells.generation(), 0);
    }

    #[test]
    fn trail_deposit_feeds_the_same_generation() {
        // A lone deposited cell has no neighbours and dies in the same tick.
        let mut automaton = automaton(5, 5, true);
        let mut events = Vec::new();
        automaton.tick_with_events(&mut events);

        assert_eq!(
            events,
            vec![
                Event::AgentAdvanced {
                    from: CellCoord::new(0, 0),
                    to: CellCoord::new(0, 4),
                    direction: Direction::Left,
                },
                Event::TrailDeposited {
                    cell: CellCoord::new(0, 0),
                    state: Cell::Black,
                },
                Event::GenerationAdvanced {
                    generation: 1,
                    population: 0,
                },
            ]
        );
        assert_eq!(automaton.cells_view().population(), 0);
    }

    #[test]
    fn deposit_completing_a_block_survives() {
        let mut automaton = automaton(6, 6, true);
        automaton.set_cell(0, 1, Cell::Black);
        automaton.set_cell(1, 0, Cell::Black);
        automaton.set_cell(1, 1, Cell::Black);

        automaton.tick();

        let cells = automaton.cells_view();
        for (row, column) in [(0, 0), (0, 1), (1, 0), (1, 1)] {
            assert_eq!(
                cells.cell(CellCoord::new(row, column)),
                Some(Cell::Black),
                "({row}, {column})"
            );
        }
        assert_eq!(cells.population(), 4);
    }

    #[test]
    fn views_share_the_committed_generation() {
        let mut automaton = automaton(8, 8, true);
        for expected in 1..=5 {
            automaton.tick();
            let cells = automaton.cells_view();
            let agent = automaton.agent_view();
            assert_eq!(cells.generation(), expected);
            assert_eq!(agent.generation(), expected);
            assert_eq!(automaton.generation(), expected);
        }
    }

    #[test]
    fn views_must_be_refetched_after_tick() {
        let mut automaton = automaton(5, 5, false);
        let before: Vec<u32> = automaton.agent_view().as_words().to_vec();

        automaton.tick();

        let after = automaton.agent_view();
        assert_ne!(after.as_words().as_slice(), before.as_slice());
        assert_eq!(after.as_words(), &[0, 4, Direction::Left.code()]);
    }

    #[test]
    fn cells_view_borrows_live_grid_storage() {
        let mut automaton = automaton(6, 4, true);
        let first_buffer = automaton.cells_view().as_ptr();
        let agent_address = automaton.agent_view().as_ptr();

        automaton.tick();
        let second_buffer = automaton.cells_view().as_ptr();
        assert_eq!(second_buffer, query::grid(&automaton).codes().as_ptr());
        assert_ne!(second_buffer, first_buffer);

        automaton.tick();
        assert_eq!(automaton.cells_view().as_ptr(), first_buffer);
        assert_eq!(automaton.agent_view().as_ptr(), agent_address);
    }

    #[test]
    fn edits_between_ticks_are_visible_without_refresh() {
        let mut automaton = automaton(4, 4, true);
        automaton.set_cell(2, 3, Cell::Black);
        let _ = automaton.toggle_cell(-1, -1);

        let cells = automaton.cells_view();
        assert_eq!(cells.cell(CellCoord::new(2, 3)), Some(Cell::Black));
        assert_eq!(cells.cell(CellCoord::new(3, 3)), Some(Cell::Black));
        assert_eq!(cells.generation(), 0);
    }

    #[test]
    fn apply_routes_commands_and_skips_redundant_writes() {
        let mut automaton = automaton(3, 3, true);
        let mut events = Vec::new();

        apply(
            &mut automaton,
            Command::SetCell {
                cell: CellCoord::new(1, 1),
                state: Cell::White,
            },
            &mut events,
        );
        assert!(events.is_empty());

        apply(
            &mut automaton,
            Command::ToggleCell {
                cell: CellCoord::new(4, 4),
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::CellChanged {
                cell: CellCoord::new(1, 1),
                state: Cell::Black,
            }]
        );
        assert_eq!(
            automaton.cells_view().cell(CellCoord::new(1, 1)),
            Some(Cell::Black)
        );

        events.clear();
        apply(&mut automaton, Command::Tick, &mut events);
        assert!(matches!(
            events.last(),
            Some(Event::GenerationAdvanced { generation: 1, .. })
        ));
    }

    #[test]
    fn display_renders_rows_of_squares() {
        let mut automaton = automaton(3, 2, true);
        let _ = automaton.toggle_cell(1, 2);

        assert_eq!(automaton.to_string(), "◻◻◻\n◻◻◼\n");
    }
}
