//! Snapshot rendering helpers.
//!
//! Functions for running a markup source through the full parse → layout
//! → render pipeline and turning the resulting grid into a plain-text
//! string suitable for snapshot testing and assertions.

use crate::dom::{parse, Context};
use crate::geometry::BoundingBox;
use crate::layout::engine::LayoutTree;
use crate::render::device::Device;
use crate::render::grid::CellGrid;
use crate::render::grid::Screen as _;
use crate::render::renderer::render;

/// Parse, lay out, and render `source` at a `width` × `height` viewport.
///
/// Returns the full pipeline state for structural assertions.
///
/// # Panics
///
/// Panics when the markup does not parse; test inputs are expected to be
/// well-formed.
pub fn render_source(source: &str, width: i32, height: i32) -> (Context, LayoutTree, CellGrid) {
    let mut ctx = parse(source).expect("test markup parses");
    let mut tree = LayoutTree::new(BoundingBox::new(0, 0, width, height));
    tree.compute(&mut ctx);
    let mut grid = CellGrid::new(width, height);
    {
        let mut device = Device::new(&mut grid);
        render(&mut device, &ctx, &mut tree);
    }
    (ctx, tree, grid)
}

/// Render `source` and return the grid as text.
///
/// Each row becomes one line with trailing spaces trimmed; rows are
/// joined with `'\n'` and trailing blank rows are dropped.
pub fn render_source_to_string(source: &str, width: i32, height: i32) -> String {
    let (_, _, grid) = render_source(source, width, height);
    grid_to_string(&grid)
}

/// Convert a grid's glyphs to a plain string, one row per line.
pub fn grid_to_string(grid: &CellGrid) -> String {
    let mut rows: Vec<String> = (0..grid.rows())
        .map(|y| {
            let row: String = (0..grid.cols())
                .map(|x| grid.cell(x, y).map(|c| c.glyph).unwrap_or(' '))
                .collect();
            row.trim_end().to_owned()
        })
        .collect();

    while rows.last().is_some_and(|r| r.is_empty()) {
        rows.pop();
    }
    rows.join("\n")
}

// ===========================================================================
// Tests
// ===========================================================================
