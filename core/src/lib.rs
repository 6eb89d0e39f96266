#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the antlife engine.
//!
//! This crate defines the value types that connect adapters, the
//! authoritative automaton, and pure systems. Adapters submit [`Command`]
//! values describing desired mutations, the world executes them through its
//! `apply` entry point and broadcasts [`Event`] values describing what
//! changed. Renderers never see the automaton's internals: they read the
//! flat [`CellsView`] and [`AgentView`] buffers exported after every tick.

use std::fmt;

use bytemuck::NoUninit;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of `u32` words in the exported agent buffer.
pub const AGENT_VIEW_LEN: usize = 3;

/// State of a single grid cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, NoUninit)]
#[repr(u8)]
pub enum Cell {
    /// Dead cell, exported as `0`.
    #[default]
    White = 0,
    /// Live cell, exported as `1`.
    Black = 1,
}

impl Cell {
    /// Single byte code used by the exported cell buffer.
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Decodes a byte produced by [`Cell::code`].
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::White),
            1 => Some(Self::Black),
            _ => None,
        }
    }

    /// Returns the opposite state.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    /// Flips the cell in place.
    pub fn toggle(&mut self) {
        *self = self.toggled();
    }

    /// Reports whether the cell is live.
    #[must_use]
    pub const fn is_black(self) -> bool {
        matches!(self, Self::Black)
    }
}

/// Heading of the agent, in clockwise order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u32)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    Up = 0,
    /// Movement toward increasing column indices.
    Right = 1,
    /// Movement toward increasing row indices.
    Down = 2,
    /// Movement toward decreasing column indices.
    Left = 3,
}

impl Direction {
    /// All directions in clockwise order starting at [`Direction::Up`].
    pub const ALL: [Direction; 4] = [Self::Up, Self::Right, Self::Down, Self::Left];

    /// Code exported in the third word of the agent buffer.
    #[must_use]
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Decodes a direction code, returning `None` outside `0..=3`.
    #[must_use]
    pub const fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(Self::Up),
            1 => Some(Self::Right),
            2 => Some(Self::Down),
            3 => Some(Self::Left),
            _ => None,
        }
    }

    /// Heading after a quarter turn clockwise.
    #[must_use]
    pub const fn turn_right(self) -> Self {
        Self::ALL[((self.code() + 1) % 4) as usize]
    }

    /// Heading after a quarter turn counter-clockwise.
    #[must_use]
    pub const fn turn_left(self) -> Self {
        Self::ALL[((self.code() + 3) % 4) as usize]
    }

    /// Row and column deltas of a single step in this direction.
    #[must_use]
    pub const fn offset(self) -> (i64, i64) {
        match self {
            Self::Up => (-1, 0),
            Self::Right => (0, 1),
            Self::Down => (1, 0),
            Self::Left => (0, -1),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Up => "Up",
            Self::Right => "Right",
            Self::Down => "Down",
            Self::Left => "Left",
        };
        f.write_str(name)
    }
}

/// Location of a single grid cell expressed as row and column indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    row: u32,
    column: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }
}

/// Immutable snapshot of the agent's position and heading.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentState {
    /// Cell currently occupied by the agent.
    pub cell: CellCoord,
    /// Heading the agent will turn from on its next step.
    pub direction: Direction,
}

/// Commands that express all permissible automaton mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Advances the automaton by one generation.
    Tick,
    /// Flips the state of a single cell between ticks.
    ToggleCell {
        /// Cell to flip; coordinates wrap onto the torus.
        cell: CellCoord,
    },
    /// Overwrites the state of a single cell between ticks.
    SetCell {
        /// Cell to overwrite; coordinates wrap onto the torus.
        cell: CellCoord,
        /// State written into the cell.
        state: Cell,
    },
}

/// Events broadcast by the automaton after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// The agent turned and moved one cell.
    AgentAdvanced {
        /// Cell the agent occupied before the step.
        from: CellCoord,
        /// Cell the agent occupies after the step.
        to: CellCoord,
        /// Heading after the turn.
        direction: Direction,
    },
    /// The agent flipped the cell it departed from.
    TrailDeposited {
        /// Cell that was flipped.
        cell: CellCoord,
        /// State the cell holds after the flip.
        state: Cell,
    },
    /// The grid finished computing a new generation.
    GenerationAdvanced {
        /// Number of completed ticks, including this one.
        generation: u64,
        /// Number of black cells in the new generation.
        population: u32,
    },
    /// A cell was changed by a command outside the tick.
    CellChanged {
        /// Cell that changed.
        cell: CellCoord,
        /// State the cell holds after the change.
        state: Cell,
    },
}

/// Errors surfaced while constructing an automaton.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum AutomatonError {
    /// Width or height was non-positive or too large to address.
    #[error("invalid grid dimensions {width}x{height}: both must be positive")]
    InvalidDimension {
        /// Requested number of columns.
        width: i64,
        /// Requested number of rows.
        height: i64,
    },
}

/// Read-only view of the exported cell buffer.
///
/// Holds one byte per cell in row-major order (`0` white, `1` black). The
/// view borrows the automaton, so it cannot outlive the next tick; callers
/// re-fetch it after every tick.
#[derive(Clone, Copy, Debug)]
pub struct CellsView<'a> {
    bytes: &'a [u8],
    width: u32,
    height: u32,
    generation: u64,
}

impl<'a> CellsView<'a> {
    /// Captures a new cell view backed by the provided byte slice.
    #[must_use]
    pub fn new(bytes: &'a [u8], width: u32, height: u32, generation: u64) -> Self {
        Self {
            bytes,
            width,
            height,
            generation,
        }
    }

    /// Raw row-major cell codes.
    #[must_use]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Address of the first cell code, for hosts that read memory directly.
    #[must_use]
    pub fn as_ptr(&self) -> *const u8 {
        self.bytes.as_ptr()
    }

    /// Number of cells in the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Reports whether the view holds no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Provides the dimensions of the exported grid as `(width, height)`.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Generation the view was captured at.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Decodes the cell at the provided in-range coordinate.
    #[must_use]
    pub fn cell(&self, cell: CellCoord) -> Option<Cell> {
        if cell.row() >= self.height || cell.column() >= self.width {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.width).ok()?;
        self.bytes
            .get(row * width + column)
            .copied()
            .and_then(Cell::from_code)
    }

    /// Iterator over the rows of raw cell codes.
    pub fn rows(&self) -> impl Iterator<Item = &'a [u8]> + 'a {
        let width = usize::try_from(self.width).unwrap_or(usize::MAX).max(1);
        self.bytes.chunks(width)
    }

    /// Number of black cells in the view.
    #[must_use]
    pub fn population(&self) -> u32 {
        let count = self
            .bytes
            .iter()
            .filter(|&&code| code == Cell::Black.code())
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }
}

/// Read-only view of the exported agent buffer `[row, column, direction]`.
///
/// Like [`CellsView`], the view borrows the automaton and is invalidated by
/// the next tick.
#[derive(Clone, Copy, Debug)]
pub struct AgentView<'a> {
    words: &'a [u32; AGENT_VIEW_LEN],
    width: u32,
    height: u32,
    generation: u64,
}

impl<'a> AgentView<'a> {
    /// Captures a new agent view backed by the provided words.
    #[must_use]
    pub fn new(words: &'a [u32; AGENT_VIEW_LEN], width: u32, height: u32, generation: u64) -> Self {
        Self {
            words,
            width,
            height,
            generation,
        }
    }

    /// Raw `[row, column, direction_code]` words.
    #[must_use]
    pub fn as_words(&self) -> &'a [u32; AGENT_VIEW_LEN] {
        self.words
    }

    /// Address of the first word, for hosts that read memory directly.
    #[must_use]
    pub fn as_ptr(&self) -> *const u32 {
        self.words.as_ptr()
    }

    /// Exported row of the agent.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.words[0]
    }

    /// Exported column of the agent.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.words[1]
    }

    /// Exported direction code.
    #[must_use]
    pub const fn direction_code(&self) -> u32 {
        self.words[2]
    }

    /// Decoded heading, `None` when the code is out of range.
    #[must_use]
    pub const fn direction(&self) -> Option<Direction> {
        Direction::from_code(self.direction_code())
    }

    /// Generation the view was captured at.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Reports whether the agent lies on the grid and should be drawn.
    ///
    /// Out-of-range coordinates are the inactive sentinel.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.row() < self.height
            && self.column() < self.width
            && self.direction().is_some()
    }

    /// Decodes the view into an agent snapshot when it is active.
    #[must_use]
    pub fn state(&self) -> Option<AgentState> {
        if !self.is_active() {
            return None;
        }
        Some(AgentState {
            cell: CellCoord::new(self.row(), self.column()),
            direction: self.direction()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{AgentView, Cell, CellCoord, CellsView, Direction, AGENT_VIEW_LEN};
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn turning_right_four_times_returns_to_start() {
        for direction in Direction::ALL {
            let mut heading = direction;
            for _ in 0..4 {
                heading = heading.turn_right();
            }
            assert_eq!(heading, direction);
        }
    }

    #[test]
    fn turns_follow_cyclic_order() {
        assert_eq!(Direction::Up.turn_right(), Direction::Right);
        assert_eq!(Direction::Left.turn_right(), Direction::Up);
        assert_eq!(Direction::Up.turn_left(), Direction::Left);
        assert_eq!(Direction::Right.turn_left(), Direction::Up);
        for direction in Direction::ALL {
            assert_eq!(direction.turn_right().turn_left(), direction);
        }
    }

    #[test]
    fn codes_match_exported_layout() {
        assert_eq!(Cell::White.code(), 0);
        assert_eq!(Cell::Black.code(), 1);
        assert_eq!(Cell::from_code(2), None);
        assert_eq!(Direction::Left.code(), 3);
        assert_eq!(Direction::from_code(4), None);
        assert_eq!(
            bytemuck::cast_slice::<Cell, u8>(&[Cell::White, Cell::Black]),
            &[0, 1]
        );
    }

    #[test]
    fn toggle_flips_in_place() {
        let mut cell = Cell::White;
        cell.toggle();
        assert_eq!(cell, Cell::Black);
        cell.toggle();
        assert_eq!(cell, Cell::White);
    }

    #[test]
    fn core_types_round_trip_through_bincode() {
        assert_round_trip(&Cell::Black);
        assert_round_trip(&Direction::Down);
        assert_round_trip(&CellCoord::new(4, 9));
    }

    #[test]
    fn cells_view_decodes_row_major_layout() {
        let bytes = [0, 1, 0, 0, 0, 1];
        let view = CellsView::new(&bytes, 3, 2, 7);

        assert_eq!(view.cell(CellCoord::new(0, 1)), Some(Cell::Black));
        assert_eq!(view.cell(CellCoord::new(1, 2)), Some(Cell::Black));
        assert_eq!(view.cell(CellCoord::new(1, 0)), Some(Cell::White));
        assert_eq!(view.cell(CellCoord::new(2, 0)), None);
        assert_eq!(view.population(), 2);
        assert_eq!(view.rows().count(), 2);
        assert_eq!(view.generation(), 7);
    }

    #[test]
    fn agent_view_treats_out_of_range_as_inactive() {
        let inside: [u32; AGENT_VIEW_LEN] = [1, 2, 1];
        let past_rows: [u32; AGENT_VIEW_LEN] = [3, 0, 0];
        let past_columns: [u32; AGENT_VIEW_LEN] = [0, 4, 0];

        assert!(AgentView::new(&inside, 4, 3, 0).is_active());
        assert!(!AgentView::new(&past_rows, 4, 3, 0).is_active());
        assert!(!AgentView::new(&past_columns, 4, 3, 0).is_active());
        assert_eq!(AgentView::new(&past_rows, 4, 3, 0).state(), None);
        assert_eq!(
            AgentView::new(&inside, 4, 3, 0).direction(),
            Some(Direction::Right)
        );
    }
}
