#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure bootstrap system that seeds the automaton's initial generation.
//!
//! The system never touches the automaton directly: it translates a
//! [`Pattern`] into a batch of [`Command::SetCell`] values which adapters
//! apply through the world's `apply` entry point.

use std::{collections::BTreeSet, fmt, str::FromStr};

use antlife_core::{Cell, CellCoord, Command};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

/// Seed used by [`Pattern::Random`] when none is configured.
pub const DEFAULT_RANDOM_SEED: u64 = 0x5eed_a771_1fe0_0017;

/// Fill ratio used by [`Pattern::Random`] when none is configured.
pub const DEFAULT_DENSITY: f64 = 0.3;

const BLINKER: &[(i64, i64)] = &[(0, 0), (0, 1), (0, 2)];
const BLOCK: &[(i64, i64)] = &[(0, 0), (0, 1), (1, 0), (1, 1)];
const GLIDER: &[(i64, i64)] = &[(0, 1), (1, 2), (2, 0), (2, 1), (2, 2)];

/// Initial generation layouts understood by the bootstrap system.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Pattern {
    /// Leaves the grid white.
    #[default]
    Empty,
    /// Horizontal line of three cells.
    Blinker,
    /// Stable two-by-two square.
    Block,
    /// Five-cell spaceship travelling down and to the right.
    Glider,
    /// Independent coin flips for every cell.
    Random {
        /// Probability that a cell starts black, clamped to `0.0..=1.0`.
        density: f64,
        /// Seed of the deterministic generator.
        seed: u64,
    },
}

impl Pattern {
    /// Random pattern using the default density and seed.
    #[must_use]
    pub const fn random() -> Self {
        Self::Random {
            density: DEFAULT_DENSITY,
            seed: DEFAULT_RANDOM_SEED,
        }
    }

    fn offsets(&self) -> &'static [(i64, i64)] {
        match self {
            Self::Blinker => BLINKER,
            Self::Block => BLOCK,
            Self::Glider => GLIDER,
            Self::Empty | Self::Random { .. } => &[],
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Empty => "empty",
            Self::Blinker => "blinker",
            Self::Block => "block",
            Self::Glider => "glider",
            Self::Random { .. } => "random",
        };
        f.write_str(name)
    }
}

/// Error returned when a pattern name is not recognised.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown seed pattern '{name}'; expected one of empty, blinker, block, glider, random")]
pub struct PatternParseError {
    name: String,
}

impl FromStr for Pattern {
    type Err = PatternParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "empty" => Ok(Self::Empty),
            "blinker" => Ok(Self::Blinker),
            "block" => Ok(Self::Block),
            "glider" => Ok(Self::Glider),
            "random" => Ok(Self::random()),
            _ => Err(PatternParseError {
                name: value.to_owned(),
            }),
        }
    }
}

/// Produces the commands that lay a seed pattern onto the grid.
#[derive(Debug, Default)]
pub struct Bootstrap;

impl Bootstrap {
    /// Emits `SetCell` commands for `pattern` anchored at `origin`.
    ///
    /// Cells are wrapped onto a `width` by `height` torus, deduplicated and
    /// emitted in row-major order. Nothing is emitted for an empty grid.
    pub fn handle(
        &self,
        pattern: Pattern,
        origin: CellCoord,
        width: u32,
        height: u32,
        out: &mut Vec<Command>,
    ) {
        if width == 0 || height == 0 {
            return;
        }

        let cells = match pattern {
            Pattern::Random { density, seed } => random_cells(density, seed, width, height),
            fixed => anchored_cells(fixed.offsets(), origin, width, height),
        };

        out.extend(cells.into_iter().map(|cell| Command::SetCell {
            cell,
            state: Cell::Black,
        }));
    }
}

fn anchored_cells(
    offsets: &[(i64, i64)],
    origin: CellCoord,
    width: u32,
    height: u32,
) -> BTreeSet<CellCoord> {
    let rows = i64::from(height);
    let columns = i64::from(width);
    offsets
        .iter()
        .map(|&(row, column)| {
            let row = (i64::from(origin.row()) + row).rem_euclid(rows);
            let column = (i64::from(origin.column()) + column).rem_euclid(columns);
            // rem_euclid results lie within the u32 dimensions.
            CellCoord::new(row as u32, column as u32)
        })
        .collect()
}

fn random_cells(density: f64, seed: u64, width: u32, height: u32) -> BTreeSet<CellCoord> {
    let density = if density.is_nan() {
        0.0
    } else {
        density.clamp(0.0, 1.0)
    };
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut cells = BTreeSet::new();
    for row in 0..height {
        for column in 0..width {
            if rng.gen_bool(density) {
                let _ = cells.insert(CellCoord::new(row, column));
            }
        }
    }
    cells
}
