//! Plain-text backend that prints every frame to a writer.

use std::{
    fmt::Write as _,
    io::Write,
    thread,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use antlife_core::{Cell, Direction};
use antlife_rendering::{FrameControl, Presentation, RenderingBackend, Scene};

/// Rendering backend writing frames as text, one character per cell.
#[derive(Debug)]
pub(crate) struct TerminalBackend<W> {
    out: W,
}

impl<W: Write> TerminalBackend<W> {
    /// Creates a backend printing to `out`.
    pub(crate) fn new(out: W) -> Self {
        Self { out }
    }

    fn draw(&mut self, scene: &Scene) -> Result<()> {
        self.out
            .write_all(frame_text(scene).as_bytes())
            .context("failed to write frame")?;
        self.out.flush().context("failed to flush frame")
    }
}

impl<W: Write> RenderingBackend for TerminalBackend<W> {
    fn run<F>(mut self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, &mut Scene) -> FrameControl,
    {
        let Presentation {
            title,
            frame_interval,
            mut scene,
        } = presentation;

        writeln!(self.out, "{title}").context("failed to write title")?;
        self.draw(&scene)?;

        let mut last_frame = Instant::now();
        loop {
            thread::sleep(frame_interval);
            let now = Instant::now();
            let elapsed = now.duration_since(last_frame);
            last_frame = now;

            if update_scene(elapsed, &mut scene) == FrameControl::Exit {
                break;
            }
            self.draw(&scene)?;
        }

        Ok(())
    }
}

/// Text of a single frame: the grid followed by a status line.
pub(crate) fn frame_text(scene: &Scene) -> String {
    let columns = scene.layout.columns as usize;
    let rows = scene.layout.rows as usize;
    let mut text = String::with_capacity((columns + 1) * rows * 3 + 48);

    for row in 0..scene.layout.rows {
        for column in 0..scene.layout.columns {
            let symbol = match scene.agent {
                Some(agent) if agent.row == row && agent.column == column => {
                    arrow(agent.direction)
                }
                _ => match scene.cell(row, column).map(|cell| cell.state) {
                    Some(Cell::Black) => '◼',
                    Some(Cell::White) | None => '◻',
                },
            };
            text.push(symbol);
        }
        text.push('\n');
    }

    // Writing into a String cannot fail.
    let _ = writeln!(
        text,
        "generation {} population {}",
        scene.generation, scene.population
    );
    text.push('\n');
    text
}

fn arrow(direction: Direction) -> char {
    match direction {
        Direction::Up => '▲',
        Direction::Right => '▶',
        Direction::Down => '▼',
        Direction::Left => '◀',
    }
}
