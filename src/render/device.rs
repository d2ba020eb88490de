//! The device: a clipped, optionally translated view onto a screen.
//!
//! A [`Device`] owns (or mutably borrows) a [`Screen`] and carries the
//! current viewport. Writes outside the viewport are reported as
//! `Clipped` without touching the screen; writes inside defer to the
//! screen, which distinguishes `Rendered` from `OutOfBound`. Scoped
//! viewport changes go through [`ClipGuard`], which restores the prior
//! viewport on every exit path.

use std::ops::{Deref, DerefMut};

use crate::geometry::{BoundingBox, Point};
use crate::render::grid::{NullGrid, PixelStyle, Screen};

/// The outcome of a device-level pixel write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutPixel {
    /// Outside the viewport; the screen was not touched.
    Clipped,
    Rendered,
    /// Inside the viewport but outside the screen.
    OutOfBound,
}

/// A clipped view onto a screen.
#[derive(Debug)]
pub struct Device<S: Screen> {
    screen: S,
    viewport: BoundingBox,
    /// World coordinate of the screen's (0, 0) cell.
    origin: Point,
}

impl Device<NullGrid> {
    /// A measurement device: infinite, accepts everything, stores
    /// nothing.
    pub fn null() -> Self {
        Device::new(NullGrid)
    }
}

impl<S: Screen> Device<S> {
    pub fn new(screen: S) -> Self {
        Self {
            screen,
            viewport: BoundingBox::inf(),
            origin: Point::new(0, 0),
        }
    }

    /// A device whose screen starts at `origin` in world coordinates;
    /// used to render subtrees into scroll backing grids.
    pub fn with_origin(screen: S, origin: Point) -> Self {
        Self {
            screen,
            viewport: BoundingBox::inf(),
            origin,
        }
    }

    pub fn viewport(&self) -> BoundingBox {
        self.viewport
    }

    /// Install a new viewport. Prefer [`ClipGuard`] for scoped changes.
    pub fn clip(&mut self, viewport: BoundingBox) {
        self.viewport = viewport;
    }

    pub fn rows(&self) -> i32 {
        self.screen.rows()
    }

    pub fn cols(&self) -> i32 {
        self.screen.cols()
    }

    pub fn clear(&mut self) {
        self.screen.clear();
    }

    /// Write one glyph at world coordinates.
    pub fn put_pixel(&mut self, glyph: char, x: i32, y: i32, style: PixelStyle) -> PutPixel {
        if !self.viewport.contains(x, y) {
            return PutPixel::Clipped;
        }
        if self
            .screen
            .put_pixel(glyph, x - self.origin.x, y - self.origin.y, style)
        {
            PutPixel::Rendered
        } else {
            PutPixel::OutOfBound
        }
    }

    /// Write a run of glyphs left to right starting at `(x, y)`.
    ///
    /// Stops on the first `OutOfBound` write or at the viewport's right
    /// or bottom edge. Returns `(bytes_consumed, x_after)`.
    pub fn write_text(&mut self, text: &str, x: i32, y: i32, style: PixelStyle) -> (usize, i32) {
        if y >= self.viewport.max_y() {
            return (0, x);
        }
        let mut consumed = 0;
        let mut cx = x;
        for glyph in text.chars() {
            if self.put_pixel(glyph, cx, y, style) == PutPixel::OutOfBound {
                break;
            }
            if cx >= self.viewport.max_x() {
                break;
            }
            consumed += glyph.len_utf8();
            cx += 1;
        }
        (consumed, cx)
    }
}

/// Restores the device's previous viewport when dropped. Not copyable;
/// dereferences to the device so rendering can continue through it.
pub struct ClipGuard<'a, S: Screen> {
    device: &'a mut Device<S>,
    saved: BoundingBox,
}

impl<'a, S: Screen> ClipGuard<'a, S> {
    pub fn new(device: &'a mut Device<S>, viewport: BoundingBox) -> Self {
        let saved = device.viewport();
        device.clip(viewport);
        Self { device, saved }
    }
}

impl<S: Screen> Deref for ClipGuard<'_, S> {
    type Target = Device<S>;

    fn deref(&self) -> &Device<S> {
        self.device
    }
}

impl<S: Screen> DerefMut for ClipGuard<'_, S> {
    fn deref_mut(&mut self) -> &mut Device<S> {
        self.device
    }
}

impl<S: Screen> Drop for ClipGuard<'_, S> {
    fn drop(&mut self) {
        self.device.clip(self.saved);
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::grid::CellGrid;

    fn style() -> PixelStyle {
        PixelStyle::default()
    }

    // -----------------------------------------------------------------------
    // put_pixel outcomes
    // -----------------------------------------------------------------------

    #[test]
    fn rendered_inside_viewport_and_grid() {
        let mut grid = CellGrid::new(10, 5);
        let mut dev = Device::new(&mut grid);
        assert_eq!(dev.put_pixel('x', 3, 2, style()), PutPixel::Rendered);
        assert_eq!(grid.cell(3, 2).unwrap().glyph, 'x');
    }

    #[test]
    fn clipped_outside_viewport() {
        let mut grid = CellGrid::new(10, 5);
        let mut dev = Device::new(&mut grid);
        dev.clip(BoundingBox::new(0, 0, 2, 2));
        assert_eq!(dev.put_pixel('x', 5, 0, style()), PutPixel::Clipped);
        assert_eq!(grid.cell(5, 0).unwrap().glyph, ' ');
    }

    #[test]
    fn out_of_bound_beyond_grid() {
        let mut grid = CellGrid::new(4, 2);
        let mut dev = Device::new(&mut grid);
        assert_eq!(dev.put_pixel('x', 100, 0, style()), PutPixel::OutOfBound);
    }

    #[test]
    fn origin_translates_world_to_grid() {
        let mut grid = CellGrid::new(4, 2);
        let mut dev = Device::with_origin(&mut grid, Point::new(10, 20));
        assert_eq!(dev.put_pixel('x', 11, 21, style()), PutPixel::Rendered);
        assert_eq!(grid.cell(1, 1).unwrap().glyph, 'x');
    }

    #[test]
    fn null_device_renders_everywhere() {
        let mut dev = Device::null();
        assert_eq!(dev.put_pixel('x', 9999, 9999, style()), PutPixel::Rendered);
    }

    // -----------------------------------------------------------------------
    // write_text
    // -----------------------------------------------------------------------

    #[test]
    fn write_text_advances_per_code_point() {
        let mut grid = CellGrid::new(10, 2);
        let mut dev = Device::new(&mut grid);
        let (consumed, after) = dev.write_text("héllo", 1, 0, style());
        assert_eq!(consumed, "héllo".len());
        assert_eq!(after, 6);
        assert_eq!(grid.cell(1, 0).unwrap().glyph, 'h');
        assert_eq!(grid.cell(2, 0).unwrap().glyph, 'é');
        assert_eq!(grid.cell(5, 0).unwrap().glyph, 'o');
    }

    #[test]
    fn write_text_stops_at_viewport_right_edge() {
        let mut grid = CellGrid::new(10, 2);
        let mut dev = Device::new(&mut grid);
        dev.clip(BoundingBox::new(0, 0, 3, 2));
        let (_, after) = dev.write_text("abcdef", 0, 0, style());
        assert!(after <= 3);
        assert_eq!(grid.cell(3, 0).unwrap().glyph, ' ');
    }

    #[test]
    fn write_text_below_viewport_writes_nothing() {
        let mut grid = CellGrid::new(10, 2);
        let mut dev = Device::new(&mut grid);
        dev.clip(BoundingBox::new(0, 0, 10, 1));
        let (consumed, after) = dev.write_text("abc", 0, 5, style());
        assert_eq!(consumed, 0);
        assert_eq!(after, 0);
    }

    #[test]
    fn write_text_stops_when_grid_ends() {
        let mut grid = CellGrid::new(3, 1);
        let mut dev = Device::new(&mut grid);
        let (consumed, _) = dev.write_text("abcdef", 0, 0, style());
        assert!(consumed <= 4);
        assert_eq!(grid.cell(2, 0).unwrap().glyph, 'c');
    }

    // -----------------------------------------------------------------------
    // ClipGuard
    // -----------------------------------------------------------------------

    #[test]
    fn clip_guard_restores_on_drop() {
        let mut grid = CellGrid::new(10, 5);
        let mut dev = Device::new(&mut grid);
        dev.clip(BoundingBox::new(0, 0, 10, 5));
        {
            let guard = ClipGuard::new(&mut dev, BoundingBox::new(1, 1, 2, 2));
            assert_eq!(guard.viewport(), BoundingBox::new(1, 1, 2, 2));
        }
        assert_eq!(dev.viewport(), BoundingBox::new(0, 0, 10, 5));
    }

    #[test]
    fn clip_guard_nests() {
        let mut grid = CellGrid::new(10, 5);
        let mut dev = Device::new(&mut grid);
        dev.clip(BoundingBox::new(0, 0, 10, 5));
        {
            let mut outer = ClipGuard::new(&mut dev, BoundingBox::new(0, 0, 4, 4));
            {
                let inner = ClipGuard::new(&mut outer, BoundingBox::new(0, 0, 2, 2));
                assert_eq!(inner.viewport(), BoundingBox::new(0, 0, 2, 2));
            }
            assert_eq!(outer.viewport(), BoundingBox::new(0, 0, 4, 4));
        }
        assert_eq!(dev.viewport(), BoundingBox::new(0, 0, 10, 5));
    }

    #[test]
    fn clip_guard_writes_through() {
        let mut grid = CellGrid::new(10, 5);
        let mut dev = Device::new(&mut grid);
        {
            let mut guard = ClipGuard::new(&mut dev, BoundingBox::new(0, 0, 2, 2));
            assert_eq!(guard.put_pixel('a', 1, 1, style()), PutPixel::Rendered);
            assert_eq!(guard.put_pixel('b', 3, 3, style()), PutPixel::Clipped);
        }
        assert_eq!(grid.cell(1, 1).unwrap().glyph, 'a');
        assert_eq!(grid.cell(3, 3).unwrap().glyph, ' ');
    }
}
