#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for antlife adapters.
//!
//! Backends never read the automaton itself. Each frame they receive a
//! [`Scene`] rebuilt from the exported cell and agent views, laid out on a
//! canvas where every cell is a square separated from its neighbours by a
//! one pixel grid line.

use anyhow::Result as AnyResult;
use antlife_core::{AgentState, AgentView, Cell, CellsView, Direction};
use glam::{Affine2, Vec2};
use std::{error::Error, f32::consts::FRAC_PI_2, fmt, time::Duration};

/// Side length of a cell in canvas pixels.
pub const DEFAULT_CELL_SIZE: f32 = 40.0;

/// Side length of the agent glyph in canvas pixels.
pub const DEFAULT_GLYPH_SIZE: f32 = 25.6;

/// Uniform scale applied to the glyph path before placement.
pub const GLYPH_SCALE: f32 = 0.2;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Parses an opaque `#RRGGBB` color.
    pub fn from_hex(value: &str) -> Result<Self, RenderingError> {
        let invalid = || RenderingError::InvalidColor {
            value: value.to_owned(),
        };
        let digits = value.trim().strip_prefix('#').ok_or_else(invalid)?;
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(invalid());
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16).map_err(|_| invalid())
        };
        Ok(Self::from_rgb_u8(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

/// Colors used to draw a frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    /// Grid line color.
    pub grid: Color,
    /// Fill of white cells.
    pub white: Color,
    /// Fill of black cells.
    pub black: Color,
    /// Fill of the agent glyph.
    pub agent: Color,
}

impl Palette {
    /// Fill color of a cell state.
    #[must_use]
    pub const fn cell(&self, cell: Cell) -> Color {
        match cell {
            Cell::White => self.white,
            Cell::Black => self.black,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            grid: Color::from_rgb_u8(0xcc, 0xcc, 0xcc),
            white: Color::from_rgb_u8(0xff, 0xff, 0xff),
            black: Color::from_rgb_u8(0x00, 0x00, 0x00),
            agent: Color::from_rgb_u8(0xff, 0x00, 0x00),
        }
    }
}

/// Straight line segment in canvas pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineSegment {
    /// Start of the segment.
    pub from: Vec2,
    /// End of the segment.
    pub to: Vec2,
}

/// Pixel geometry of the canvas hosting the grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasLayout {
    /// Number of columns contained in the grid.
    pub columns: u32,
    /// Number of rows contained in the grid.
    pub rows: u32,
    /// Side length of a single cell in pixels, excluding grid lines.
    pub cell_size: f32,
    /// Side length of the agent glyph in pixels.
    pub glyph_size: f32,
}

impl CanvasLayout {
    /// Creates a new layout descriptor.
    ///
    /// Returns an error when `cell_size` is not a positive finite number.
    pub fn new(columns: u32, rows: u32, cell_size: f32) -> Result<Self, RenderingError> {
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(RenderingError::InvalidCellSize { cell_size });
        }

        Ok(Self {
            columns,
            rows,
            cell_size,
            glyph_size: DEFAULT_GLYPH_SIZE * cell_size / DEFAULT_CELL_SIZE,
        })
    }

    /// Distance between the origins of two adjacent cells.
    #[must_use]
    pub fn pitch(&self) -> f32 {
        self.cell_size + 1.0
    }

    /// Total canvas width, including the trailing grid line.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.pitch() * self.columns as f32 + 1.0
    }

    /// Total canvas height, including the trailing grid line.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.pitch() * self.rows as f32 + 1.0
    }

    /// Top-left pixel of the fill area of a cell.
    #[must_use]
    pub fn cell_origin(&self, row: u32, column: u32) -> Vec2 {
        Vec2::new(
            column as f32 * self.pitch() + 1.0,
            row as f32 * self.pitch() + 1.0,
        )
    }

    /// Vertical lines followed by horizontal lines framing every cell.
    #[must_use]
    pub fn grid_lines(&self) -> Vec<LineSegment> {
        let vertical = (0..=self.columns).map(|column| {
            let x = column as f32 * self.pitch() + 1.0;
            LineSegment {
                from: Vec2::new(x, 0.0),
                to: Vec2::new(x, self.height()),
            }
        });
        let horizontal = (0..=self.rows).map(|row| {
            let y = row as f32 * self.pitch() + 1.0;
            LineSegment {
                from: Vec2::new(0.0, y),
                to: Vec2::new(self.width(), y),
            }
        });
        vertical.chain(horizontal).collect()
    }
}

/// Fill of a single cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellPresentation {
    /// Row of the cell.
    pub row: u32,
    /// Column of the cell.
    pub column: u32,
    /// Exported state of the cell.
    pub state: Cell,
    /// Fill color derived from the palette.
    pub color: Color,
}

/// Placement of the agent mascot.
///
/// `transform` maps the mascot path, authored facing up in a 128 unit box,
/// into canvas pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AgentGlyph {
    /// Row occupied by the agent.
    pub row: u32,
    /// Column occupied by the agent.
    pub column: u32,
    /// Heading the glyph is turned towards.
    pub direction: Direction,
    /// Path-to-canvas transform.
    pub transform: Affine2,
    /// Fill color of the glyph.
    pub color: Color,
}

impl AgentGlyph {
    /// Places the glyph for the provided agent state.
    #[must_use]
    pub fn new(layout: &CanvasLayout, state: AgentState, color: Color) -> Self {
        let row = state.cell.row();
        let column = state.cell.column();
        let inset = (layout.cell_size - layout.glyph_size) / 2.0;
        let placement = Affine2::from_translation(layout.cell_origin(row, column) + inset)
            * Affine2::from_scale(Vec2::splat(GLYPH_SCALE));

        Self {
            row,
            column,
            direction: state.direction,
            transform: placement * Self::for_direction(layout.cell_size, state.direction),
            color,
        }
    }

    /// Rotation or flip turning the upward-facing path towards `direction`.
    #[must_use]
    pub fn for_direction(cell_size: f32, direction: Direction) -> Affine2 {
        match direction {
            Direction::Up => Affine2::IDENTITY,
            Direction::Right => {
                Affine2::from_translation(Vec2::new(3.0 * cell_size, 0.0))
                    * Affine2::from_angle(FRAC_PI_2)
            }
            Direction::Down => {
                Affine2::from_translation(Vec2::new(0.0, 3.5 * cell_size))
                    * Affine2::from_scale(Vec2::new(1.0, -1.0))
            }
            Direction::Left => {
                Affine2::from_translation(Vec2::new(0.0, 3.0 * cell_size))
                    * Affine2::from_angle(-FRAC_PI_2)
            }
        }
    }
}

/// Everything a backend draws for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Canvas geometry.
    pub layout: CanvasLayout,
    /// Colors applied to the frame.
    pub palette: Palette,
    /// One entry per cell in row-major order.
    pub cells: Vec<CellPresentation>,
    /// Agent glyph, absent when the exported agent is inactive.
    pub agent: Option<AgentGlyph>,
    /// Generation the views were captured at.
    pub generation: u64,
    /// Number of black cells.
    pub population: u32,
}

impl Scene {
    /// Builds a scene from freshly fetched views.
    #[must_use]
    pub fn from_views(
        layout: CanvasLayout,
        palette: Palette,
        cells: CellsView<'_>,
        agent: AgentView<'_>,
    ) -> Self {
        let mut scene = Self {
            layout,
            palette,
            cells: Vec::with_capacity(cells.len()),
            agent: None,
            generation: 0,
            population: 0,
        };
        scene.refresh(cells, agent);
        scene
    }

    /// Replaces the scene content with freshly fetched views.
    ///
    /// Unknown cell codes are drawn white. The agent glyph is dropped when
    /// the agent view reports the inactive sentinel.
    pub fn refresh(&mut self, cells: CellsView<'_>, agent: AgentView<'_>) {
        self.cells.clear();
        for (row, line) in (0_u32..).zip(cells.rows()) {
            for (column, &code) in (0_u32..).zip(line) {
                let state = Cell::from_code(code).unwrap_or_default();
                self.cells.push(CellPresentation {
                    row,
                    column,
                    state,
                    color: self.palette.cell(state),
                });
            }
        }

        self.agent = agent
            .state()
            .filter(|state| {
                state.cell.row() < self.layout.rows && state.cell.column() < self.layout.columns
            })
            .map(|state| AgentGlyph::new(&self.layout, state, self.palette.agent));
        self.generation = cells.generation();
        self.population = cells.population();
    }

    /// Cell presentation at the provided coordinate.
    #[must_use]
    pub fn cell(&self, row: u32, column: u32) -> Option<&CellPresentation> {
        if row >= self.layout.rows || column >= self.layout.columns {
            return None;
        }
        let index = row as usize * self.layout.columns as usize + column as usize;
        self.cells.get(index)
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title shown by the backend.
    pub title: String,
    /// Delay between two frames.
    pub frame_interval: Duration,
    /// Scene content that should be displayed first.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(title: T, frame_interval: Duration, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            title: title.into(),
            frame_interval,
            scene,
        }
    }
}

/// Decision returned by the per-frame callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameControl {
    /// Keep presenting frames.
    Continue,
    /// Stop without drawing another frame.
    Exit,
}

/// Rendering backend capable of presenting antlife scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until the callback requests an exit.
    ///
    /// The backend draws the initial scene, then repeatedly waits for the
    /// frame interval and calls `update_scene` with the time elapsed since the
    /// previous frame. The callback ticks the automaton and refreshes the
    /// scene from newly fetched views; the scene is drawn unless the callback
    /// returned [`FrameControl::Exit`].
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, &mut Scene) -> FrameControl;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// Cell size must be a positive finite number of pixels.
    InvalidCellSize {
        /// Provided size that failed validation.
        cell_size: f32,
    },
    /// Color strings must use the `#RRGGBB` form.
    InvalidColor {
        /// Provided string that failed to parse.
        value: String,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCellSize { cell_size } => {
                write!(f, "cell_size must be positive (received {cell_size})")
            }
            Self::InvalidColor { value } => {
                write!(f, "color '{value}' is not of the form #RRGGBB")
            }
        }
    }
}

impl Error for RenderingError {}

#[cfg(test)]
mod tests {
    use super::*;
    use antlife_core::{CellCoord, AGENT_VIEW_LEN};

    fn assert_close(actual: Vec2, expected: Vec2) {
        assert!(
            (actual - expected).length() < 1e-3,
            "expected {expected:?}, got {actual:?}"
        );
    }

    fn layout(columns: u32, rows: u32) -> CanvasLayout {
        CanvasLayout::new(columns, rows, DEFAULT_CELL_SIZE).expect("valid layout")
    }

    #[test]
    fn canvas_leaves_room_for_one_pixel_borders() {
        let layout = layout(17, 17);

        assert_eq!(layout.width(), 698.0);
        assert_eq!(layout.height(), 698.0);
        assert_eq!(layout.cell_origin(2, 3), Vec2::new(124.0, 83.0));
        assert!((layout.glyph_size - DEFAULT_GLYPH_SIZE).abs() < f32::EPSILON);
    }

    #[test]
    fn layout_rejects_degenerate_cell_sizes() {
        for cell_size in [0.0, -4.0, f32::NAN, f32::INFINITY] {
            assert!(matches!(
                CanvasLayout::new(3, 3, cell_size),
                Err(RenderingError::InvalidCellSize { .. })
            ));
        }
    }

    #[test]
    fn grid_lines_frame_every_cell() {
        let layout = layout(4, 2);
        let lines = layout.grid_lines();

        assert_eq!(lines.len(), 5 + 3);
        assert_eq!(lines[0].from, Vec2::new(1.0, 0.0));
        assert_eq!(lines[4].to, Vec2::new(165.0, layout.height()));
        assert_eq!(lines[5].from, Vec2::new(0.0, 1.0));
    }

    #[test]
    fn hex_colors_parse_and_reject_garbage() {
        assert_eq!(
            Color::from_hex("#CCCCCC"),
            Ok(Color::from_rgb_u8(204, 204, 204))
        );
        assert!(Color::from_hex("CCCCCC").is_err());
        assert!(Color::from_hex("#12345").is_err());
        assert!(Color::from_hex("#zz0000").is_err());
    }

    #[test]
    fn glyph_orientation_matches_heading() {
        let layout = layout(5, 5);
        let origin = layout.cell_origin(1, 2) + (DEFAULT_CELL_SIZE - DEFAULT_GLYPH_SIZE) / 2.0;
        let glyph = |direction| {
            AgentGlyph::new(
                &layout,
                AgentState {
                    cell: CellCoord::new(1, 2),
                    direction,
                },
                Palette::default().agent,
            )
        };

        let up = glyph(Direction::Up);
        assert_close(up.transform.transform_point2(Vec2::ZERO), origin);
        assert_close(up.transform.transform_vector2(Vec2::X), Vec2::new(0.2, 0.0));

        let right = glyph(Direction::Right);
        assert_close(
            right.transform.transform_point2(Vec2::ZERO),
            origin + Vec2::new(24.0, 0.0),
        );
        assert_close(
            right.transform.transform_vector2(Vec2::X),
            Vec2::new(0.0, 0.2),
        );

        let down = glyph(Direction::Down);
        assert_close(
            down.transform.transform_point2(Vec2::ZERO),
            origin + Vec2::new(0.0, 28.0),
        );
        assert_close(
            down.transform.transform_vector2(Vec2::Y),
            Vec2::new(0.0, -0.2),
        );

        let left = glyph(Direction::Left);
        assert_close(
            left.transform.transform_point2(Vec2::ZERO),
            origin + Vec2::new(0.0, 24.0),
        );
        assert_close(
            left.transform.transform_vector2(Vec2::X),
            Vec2::new(0.0, -0.2),
        );
    }

    #[test]
    fn scene_colors_cells_and_places_agent() {
        let bytes = [0, 1, 1, 0, 0, 0];
        let words: [u32; AGENT_VIEW_LEN] = [1, 2, Direction::Down.code()];
        let cells = CellsView::new(&bytes, 3, 2, 4);
        let agent = AgentView::new(&words, 3, 2, 4);

        let scene = Scene::from_views(layout(3, 2), Palette::default(), cells, agent);

        assert_eq!(scene.cells.len(), 6);
        assert_eq!(scene.cell(0, 1).map(|cell| cell.state), Some(Cell::Black));
        assert_eq!(
            scene.cell(1, 0).map(|cell| cell.color),
            Some(Palette::default().white)
        );
        assert_eq!(scene.generation, 4);
        assert_eq!(scene.population, 2);
        let glyph = scene.agent.expect("agent is active");
        assert_eq!((glyph.row, glyph.column), (1, 2));
        assert_eq!(glyph.direction, Direction::Down);
    }

    #[test]
    fn scene_skips_inactive_agent() {
        let bytes = [0; 4];
        let words: [u32; AGENT_VIEW_LEN] = [2, 0, 0];
        let cells = CellsView::new(&bytes, 2, 2, 0);
        let agent = AgentView::new(&words, 2, 2, 0);

        let scene = Scene::from_views(layout(2, 2), Palette::default(), cells, agent);

        assert!(scene.agent.is_none());
        assert_eq!(scene.cells.len(), 4);
    }
}
