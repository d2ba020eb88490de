//! The cell grid: a z-buffered glyph raster with dirty-cell diffing.
//!
//! A [`CellGrid`] survives across frames; each frame writes glyphs through
//! [`Screen::put_pixel`], and [`CellGrid::flush`] emits only the cells
//! that changed, with minimal cursor moves and minimal SGR transitions.

use std::io::{self, Write};

use crate::css::color::Color;
use crate::css::style::Style;
use crate::render::driver::Driver;

// ---------------------------------------------------------------------------
// PixelStyle
// ---------------------------------------------------------------------------

/// The visual style of one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelStyle {
    pub fg: Color,
    pub bg: Color,
    pub bold: bool,
    pub dim: bool,
    pub italic: bool,
    pub underline: bool,
    pub z_index: i32,
}

impl Default for PixelStyle {
    fn default() -> Self {
        Self {
            fg: Color::DEFAULT,
            bg: Color::DEFAULT,
            bold: false,
            dim: false,
            italic: false,
            underline: false,
            z_index: 0,
        }
    }
}

impl PixelStyle {
    /// Project the glyph-visible parts of a [`Style`].
    pub fn from_style(style: &Style) -> Self {
        Self {
            fg: style.fg_color,
            bg: style.bg_color,
            bold: style.text_style.bold,
            dim: style.text_style.dim,
            italic: style.text_style.italic,
            underline: style.text_style.underline,
            z_index: style.z_index,
        }
    }

    /// Visual equality; `z_index` participates in arbitration, not in
    /// appearance.
    pub fn is_same_style(&self, other: &PixelStyle) -> bool {
        self.fg == other.fg
            && self.bg == other.bg
            && self.bold == other.bold
            && self.dim == other.dim
            && self.italic == other.italic
            && self.underline == other.underline
    }
}

// ---------------------------------------------------------------------------
// Cell
// ---------------------------------------------------------------------------

/// One glyph slot on the grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub glyph: char,
    pub style: PixelStyle,
    dirty: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            glyph: ' ',
            style: PixelStyle::default(),
            dirty: false,
        }
    }
}

impl Cell {
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

// ---------------------------------------------------------------------------
// Screen
// ---------------------------------------------------------------------------

/// Anything glyphs can be rasterized onto.
pub trait Screen {
    /// Write one glyph. Returns `false` when `(x, y)` is out of bounds.
    ///
    /// A write with a `z_index` strictly below the stored cell's is a
    /// no-op (but still in bounds).
    fn put_pixel(&mut self, glyph: char, x: i32, y: i32, style: PixelStyle) -> bool;
    fn rows(&self) -> i32;
    fn cols(&self) -> i32;
    /// Reset every cell to its default and unmark dirtiness.
    fn clear(&mut self);
}

impl<S: Screen + ?Sized> Screen for &mut S {
    fn put_pixel(&mut self, glyph: char, x: i32, y: i32, style: PixelStyle) -> bool {
        (**self).put_pixel(glyph, x, y, style)
    }

    fn rows(&self) -> i32 {
        (**self).rows()
    }

    fn cols(&self) -> i32 {
        (**self).cols()
    }

    fn clear(&mut self) {
        (**self).clear()
    }
}

// ---------------------------------------------------------------------------
// CellGrid
// ---------------------------------------------------------------------------

/// A row-major grid of [`Cell`]s with per-cell dirty flags.
#[derive(Debug, Clone, Default)]
pub struct CellGrid {
    rows: i32,
    cols: i32,
    cells: Vec<Cell>,
    dirty: bool,
}

impl CellGrid {
    pub fn new(cols: i32, rows: i32) -> Self {
        let rows = rows.max(0);
        let cols = cols.max(0);
        Self {
            rows,
            cols,
            cells: vec![Cell::default(); (rows * cols) as usize],
            dirty: false,
        }
    }

    pub fn cell(&self, x: i32, y: i32) -> Option<&Cell> {
        if x < 0 || y < 0 || x >= self.cols || y >= self.rows {
            return None;
        }
        Some(&self.cells[(y * self.cols + x) as usize])
    }

    /// Whether any cell changed since the last flush.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Emit the dirty cells to `driver`, row-major, offset by `(dx, dy)`.
    ///
    /// A cursor move is emitted only when the next dirty cell is not the
    /// immediate right neighbor of the previously emitted one; SGR state
    /// is re-emitted only when the cell's style differs visually from the
    /// running state. A second flush without intervening writes emits
    /// nothing.
    pub fn flush<W: Write>(&mut self, driver: &mut Driver<W>, dx: i32, dy: i32) -> io::Result<()> {
        if !self.dirty {
            return Ok(());
        }

        let mut previous: Option<(i32, i32)> = None;
        let mut current_style: Option<PixelStyle> = None;
        for r in 0..self.rows {
            for c in 0..self.cols {
                let index = (r * self.cols + c) as usize;
                if !self.cells[index].dirty {
                    continue;
                }

                if previous != Some((r, c - 1)) {
                    driver.move_to(c + dx, r + dy)?;
                }

                let style = self.cells[index].style;
                let restyle = match current_style {
                    Some(ref s) => !s.is_same_style(&style),
                    None => true,
                };
                if restyle {
                    driver.reset()?;
                    driver.apply_style(&style)?;
                    current_style = Some(style);
                }

                driver.write_glyph(self.cells[index].glyph)?;
                self.cells[index].dirty = false;
                previous = Some((r, c));
            }
        }

        self.dirty = false;
        Ok(())
    }
}

impl Screen for CellGrid {
    fn put_pixel(&mut self, glyph: char, x: i32, y: i32, style: PixelStyle) -> bool {
        if x < 0 || y < 0 || x >= self.cols || y >= self.rows {
            return false;
        }
        let cell = &mut self.cells[(y * self.cols + x) as usize];
        if cell.style.z_index > style.z_index {
            return true;
        }
        if !cell.style.is_same_style(&style) || cell.glyph != glyph {
            cell.dirty = true;
        }
        cell.style = style;
        cell.glyph = glyph;
        self.dirty |= cell.dirty;
        true
    }

    fn rows(&self) -> i32 {
        self.rows
    }

    fn cols(&self) -> i32 {
        self.cols
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::default());
        self.dirty = false;
    }
}

// ---------------------------------------------------------------------------
// NullGrid
// ---------------------------------------------------------------------------

/// A measurement sink: accepts everything, stores nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullGrid;

impl Screen for NullGrid {
    fn put_pixel(&mut self, _glyph: char, x: i32, y: i32, _style: PixelStyle) -> bool {
        x < self.cols() && y < self.rows()
    }

    fn rows(&self) -> i32 {
        i32::MAX
    }

    fn cols(&self) -> i32 {
        i32::MAX
    }

    fn clear(&mut self) {}
}

// ===========================================================================
// Tests
// ===========================================================================
