//! Character-grid renderer for terminals and tests
//!
//! Game space is downsampled onto a grid of cells. The ball sprite is a
//! circle mask built once for the session's radius and stamped every frame.

use std::fmt;
use std::io::Write;

use glam::{IVec2, Vec2};

use super::RenderAdapter;
use crate::error::FrameError;
use crate::platform::DrawSurface;
use crate::sim::GameSpace;

const BACKGROUND: char = ' ';
const BALL: char = 'O';

/// A grid of characters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharCanvas {
    cols: usize,
    rows: usize,
    cells: Vec<char>,
}

impl CharCanvas {
    pub fn new(cols: usize, rows: usize) -> Self {
        let cols = cols.max(1);
        let rows = rows.max(1);
        Self {
            cols,
            rows,
            cells: vec![BACKGROUND; cols * rows],
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn get(&self, col: usize, row: usize) -> Option<char> {
        (col < self.cols && row < self.rows).then(|| self.cells[row * self.cols + col])
    }

    /// Set a cell; out-of-range cells are clipped
    pub fn set(&mut self, col: i64, row: i64, ch: char) {
        if col < 0 || row < 0 || col >= self.cols as i64 || row >= self.rows as i64 {
            return;
        }
        self.cells[row as usize * self.cols + col as usize] = ch;
    }

    pub fn fill(&mut self, ch: char) {
        self.cells.fill(ch);
    }

    pub fn write_centered(&mut self, row: usize, text: &str) {
        let len = text.chars().count();
        let start = self.cols.saturating_sub(len) / 2;
        for (i, ch) in text.chars().enumerate() {
            self.set((start + i) as i64, row as i64, ch);
        }
    }

    pub fn row_text(&self, row: usize) -> String {
        self.cells[row * self.cols..(row + 1) * self.cols].iter().collect()
    }

    pub fn count(&self, ch: char) -> usize {
        self.cells.iter().filter(|&&c| c == ch).count()
    }
}

impl fmt::Display for CharCanvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.rows {
            writeln!(f, "{}", self.row_text(row))?;
        }
        Ok(())
    }
}

/// Circle mask in cells, sized for one radius
#[derive(Debug, Clone)]
struct BallSprite {
    radius: i32,
    cols: usize,
    rows: usize,
    mask: Vec<bool>,
}

impl BallSprite {
    fn new(radius: i32, cell: Vec2) -> Self {
        let diameter = (radius * 2) as f32;
        let cols = ((diameter / cell.x).ceil() as usize).max(1);
        let rows = ((diameter / cell.y).ceil() as usize).max(1);
        let center = Vec2::splat(radius as f32);

        let mut mask = vec![false; cols * rows];
        for row in 0..rows {
            for col in 0..cols {
                let sample = Vec2::new(col as f32 + 0.5, row as f32 + 0.5) * cell;
                mask[row * cols + col] = sample.distance(center) <= radius as f32;
            }
        }
        // Smaller than a cell: still visible
        if !mask.contains(&true) {
            mask[(rows / 2) * cols + cols / 2] = true;
        }

        Self {
            radius,
            cols,
            rows,
            mask,
        }
    }
}

/// Renders onto a [`CharCanvas`] covering the whole game space
#[derive(Debug, Clone)]
pub struct AsciiRenderer {
    cell: Vec2,
    sprite: BallSprite,
}

impl AsciiRenderer {
    pub fn new(space: GameSpace, cols: usize, rows: usize, radius: i32) -> Self {
        let cell = space.size().as_vec2() / Vec2::new(cols.max(1) as f32, rows.max(1) as f32);
        Self {
            cell,
            sprite: BallSprite::new(radius, cell),
        }
    }

    fn to_cell(&self, pos: IVec2) -> (i64, i64) {
        let p = (pos.as_vec2() / self.cell).floor();
        (p.x as i64, p.y as i64)
    }
}

impl RenderAdapter<CharCanvas> for AsciiRenderer {
    fn draw_background(&mut self, canvas: &mut CharCanvas) -> Result<(), FrameError> {
        canvas.fill(BACKGROUND);
        Ok(())
    }

    fn draw_score(
        &mut self,
        canvas: &mut CharCanvas,
        score: u32,
        high_score: u32,
        label: &str,
    ) -> Result<(), FrameError> {
        // Best score and its label at the top, current score in the middle
        canvas.write_centered(0, &high_score.to_string());
        if canvas.rows() > 2 {
            canvas.write_centered(1, label);
        }
        canvas.write_centered(canvas.rows() / 2, &score.to_string());
        Ok(())
    }

    fn draw_ball(
        &mut self,
        canvas: &mut CharCanvas,
        pos: IVec2,
        radius: i32,
    ) -> Result<(), FrameError> {
        if radius != self.sprite.radius {
            return Err(FrameError::Render(format!(
                "ball sprite was built for radius {}, asked for {}",
                self.sprite.radius, radius
            )));
        }
        let (left, top) = self.to_cell(pos);
        let sprite = &self.sprite;
        for row in 0..sprite.rows {
            for col in 0..sprite.cols {
                if sprite.mask[row * sprite.cols + col] {
                    canvas.set(left + col as i64, top + row as i64, BALL);
                }
            }
        }
        Ok(())
    }
}

/// Terminal surface: hands out blank canvases and prints every Nth post
pub struct AsciiSurface {
    out: Box<dyn Write + Send>,
    cols: usize,
    rows: usize,
    draw_every: u64,
    posted: u64,
}

impl AsciiSurface {
    /// `draw_every == 0` never prints
    pub fn new(out: Box<dyn Write + Send>, cols: usize, rows: usize, draw_every: u64) -> Self {
        Self {
            out,
            cols,
            rows,
            draw_every,
            posted: 0,
        }
    }

    pub fn posted(&self) -> u64 {
        self.posted
    }
}

impl DrawSurface for AsciiSurface {
    type Canvas = CharCanvas;

    fn lock_canvas(&mut self) -> Option<CharCanvas> {
        Some(CharCanvas::new(self.cols, self.rows))
    }

    fn unlock_and_post(&mut self, canvas: CharCanvas) -> Result<(), FrameError> {
        self.posted += 1;
        if self.draw_every == 0 || self.posted % self.draw_every != 0 {
            return Ok(());
        }
        write!(self.out, "{}\n{}", "-".repeat(canvas.cols()), canvas)
            .and_then(|_| self.out.flush())
            .map_err(|e| FrameError::Post(e.to_string()))
    }
}
