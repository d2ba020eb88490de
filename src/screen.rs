//! The frame-loop surface: a persistent grid plus an ANSI driver.
//!
//! A [`Terminal`] owns the [`CellGrid`] that survives across frames and
//! the [`Driver`] it flushes through. A frame is `render` followed by
//! `flush`; only the cells that changed since the previous flush reach
//! the sink.

use std::io::{self, BufWriter, Stdout, Write};

use crate::dom::Context;
use crate::geometry::BoundingBox;
use crate::layout::engine::LayoutTree;
use crate::render::device::Device;
use crate::render::driver::Driver;
use crate::render::grid::CellGrid;
use crate::render::grid::Screen as _;
use crate::render::renderer::render;

/// A terminal surface of fixed cell dimensions.
pub struct Terminal<W: Write> {
    grid: CellGrid,
    driver: Driver<W>,
}

impl Terminal<BufWriter<Stdout>> {
    /// A terminal over buffered stdout.
    pub fn stdout(cols: i32, rows: i32) -> Self {
        Self::new(Driver::stdout(), cols, rows)
    }

    /// The current terminal size in cells, from the platform.
    pub fn size() -> io::Result<(u16, u16)> {
        crossterm::terminal::size()
    }
}

impl<W: Write> Terminal<W> {
    pub fn new(driver: Driver<W>, cols: i32, rows: i32) -> Self {
        Self {
            grid: CellGrid::new(cols, rows),
            driver,
        }
    }

    /// The viewport covering the whole surface.
    pub fn viewport(&self) -> BoundingBox {
        BoundingBox::new(0, 0, self.grid.cols(), self.grid.rows())
    }

    pub fn grid(&self) -> &CellGrid {
        &self.grid
    }

    /// Replace the grid with a blank one of the new size.
    pub fn resize(&mut self, cols: i32, rows: i32) {
        self.grid = CellGrid::new(cols, rows);
    }

    /// Rasterize a laid-out tree into the grid.
    pub fn render(&mut self, ctx: &Context, tree: &mut LayoutTree) {
        let mut device = Device::new(&mut self.grid);
        render(&mut device, ctx, tree);
    }

    /// Emit the dirty cells and flush the sink.
    pub fn flush(&mut self) -> io::Result<()> {
        self.grid.flush(&mut self.driver, 0, 0)?;
        self.driver.flush()
    }

    /// Enter raw mode and the alternate screen, hide the cursor, and
    /// opt into mouse tracking.
    pub fn enter(&mut self) -> io::Result<()> {
        self.driver.enter_alt_screen()?;
        self.driver.hide_cursor()?;
        self.driver.enable_mouse_capture()?;
        self.driver.clear_screen()?;
        self.driver.flush()
    }

    /// Undo [`enter`](Self::enter).
    pub fn leave(&mut self) -> io::Result<()> {
        self.driver.disable_mouse_capture()?;
        self.driver.show_cursor()?;
        self.driver.leave_alt_screen()?;
        self.driver.flush()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
