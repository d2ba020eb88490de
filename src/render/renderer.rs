//! Renders a laid-out tree onto a device: text lines, scroll backing
//! grids, and borders with per-corner glyph selection.

use crate::css::style::Overflow;
use crate::dom::Context;
use crate::geometry::{BoundingBox, Point};
use crate::layout::engine::LayoutTree;
use crate::render::device::{ClipGuard, Device};
use crate::render::grid::{CellGrid, PixelStyle, Screen};

/// Render the whole tree under its viewport clip.
pub fn render<S: Screen>(device: &mut Device<S>, ctx: &Context, tree: &mut LayoutTree) {
    let viewport = tree.viewport;
    let mut guard = ClipGuard::new(device, viewport);
    render_node(&mut guard, ctx, tree, 0, viewport, false);
}

fn render_node<S: Screen>(
    device: &mut Device<S>,
    ctx: &Context,
    tree: &mut LayoutTree,
    node: usize,
    clip: BoundingBox,
    ignore_scroll: bool,
) {
    let style = ctx.styles[tree.nodes[node].style_index].clone();

    if tree.nodes[node].is_text() {
        let span = tree.nodes[node].lines;
        let pixel_style = PixelStyle::from_style(&style);
        for i in span.range() {
            let line = tree.lines[i];
            device.write_text(
                ctx.text(line.slice),
                line.bounds.x,
                line.bounds.y,
                pixel_style,
            );
        }
        return;
    }

    let scrollable = tree.nodes[node].scrollable_x || tree.nodes[node].scrollable_y;
    if scrollable && !ignore_scroll {
        let container = tree.nodes[node].container;

        // Render the subtree into the node's backing grid, reusing it
        // when the container size is unchanged.
        let mut canvas = match tree.nodes[node].canvas.take() {
            Some(mut canvas)
                if canvas.cols() == container.width && canvas.rows() == container.height =>
            {
                canvas.clear();
                canvas
            }
            _ => CellGrid::new(container.width, container.height),
        };
        {
            let mut backing =
                Device::with_origin(&mut canvas, Point::new(container.x, container.y));
            render_node(&mut backing, ctx, tree, node, container, true);
        }

        // Blit the visible cells under the parent-provided clip.
        let blit_clip = clip.intersection(&device.viewport());
        let mut guard = ClipGuard::new(device, blit_clip);
        for r in 0..canvas.rows() {
            for c in 0..canvas.cols() {
                if let Some(cell) = canvas.cell(c, r) {
                    guard.put_pixel(cell.glyph, container.x + c, container.y + r, cell.style);
                }
            }
        }
        drop(guard);
        tree.nodes[node].canvas = Some(canvas);
        return;
    }

    let children = tree.nodes[node].children.clone();
    for child in children {
        if tree.nodes[child].is_text() {
            render_node(device, ctx, tree, child, clip, false);
        } else {
            // Clip to the child's container on each axis whose overflow
            // is not `visible`.
            let child_style = &ctx.styles[tree.nodes[child].style_index];
            let container = tree.nodes[child].container;
            let current = device.viewport();
            let (min_x, max_x) = if child_style.overflow_x != Overflow::Visible {
                (container.min_x(), container.max_x())
            } else {
                (current.min_x(), current.max_x())
            };
            let (min_y, max_y) = if child_style.overflow_y != Overflow::Visible {
                (container.min_y(), container.max_y())
            } else {
                (current.min_y(), current.max_y())
            };
            let child_clip =
                BoundingBox::from_edges(min_x, max_x, min_y, max_y).intersection(&current);
            let mut guard = ClipGuard::new(device, child_clip);
            render_node(&mut guard, ctx, tree, child, child_clip, false);
        }
    }

    draw_borders(device, tree, node, &style);
}

/// Draw the four border edges along the container, then the corners.
/// Each corner's glyph comes from its own border type; each edge and
/// corner takes its border's color.
fn draw_borders<S: Screen>(
    device: &mut Device<S>,
    tree: &LayoutTree,
    node: usize,
    style: &crate::css::style::Style,
) {
    let container = tree.nodes[node].container;
    let [tl, tr, br, bl] = style.border_type;
    let mut border_style = PixelStyle::from_style(style);

    if style.border_top.width.as_cell() != 0 {
        let set = style.border_top.char_set(tl);
        border_style.fg = style.border_top.color;
        let y = container.min_y();
        for x in container.min_x()..container.max_x() {
            device.put_pixel(set.horizontal, x, y, border_style);
        }
    }

    if style.border_bottom.width.as_cell() != 0 {
        let set = style.border_bottom.char_set(bl);
        border_style.fg = style.border_bottom.color;
        let y = container.max_y() - 1;
        for x in container.min_x()..container.max_x() {
            device.put_pixel(set.horizontal, x, y, border_style);
        }
    }

    if style.border_left.width.as_cell() != 0 {
        let set = style.border_left.char_set(tl);
        border_style.fg = style.border_left.color;
        let x = container.min_x();
        for y in container.min_y()..container.max_y() {
            device.put_pixel(set.vertical, x, y, border_style);
        }
    }

    if style.border_right.width.as_cell() != 0 {
        let set = style.border_right.char_set(tr);
        border_style.fg = style.border_right.color;
        let x = container.max_x() - 1;
        for y in container.min_y()..container.max_y() {
            device.put_pixel(set.vertical, x, y, border_style);
        }
    }

    let top = style.border_top.width.as_cell() != 0;
    let bottom = style.border_bottom.width.as_cell() != 0;
    let left = style.border_left.width.as_cell() != 0;
    let right = style.border_right.width.as_cell() != 0;

    if top && left {
        border_style.fg = style.border_left.color;
        let glyph = style.border_top.char_set(tl).top_left;
        device.put_pixel(glyph, container.min_x(), container.min_y(), border_style);
    }
    if top && right {
        border_style.fg = style.border_right.color;
        let glyph = style.border_top.char_set(tr).top_right;
        device.put_pixel(glyph, container.max_x() - 1, container.min_y(), border_style);
    }
    if bottom && right {
        border_style.fg = style.border_right.color;
        let glyph = style.border_bottom.char_set(br).bottom_right;
        device.put_pixel(glyph, container.max_x() - 1, container.max_y() - 1, border_style);
    }
    if bottom && left {
        border_style.fg = style.border_left.color;
        let glyph = style.border_bottom.char_set(bl).bottom_left;
        device.put_pixel(glyph, container.min_x(), container.max_y() - 1, border_style);
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::color::Color;
    use crate::dom::parse;

    fn render_to_grid(source: &str, width: i32, height: i32) -> (Context, LayoutTree, CellGrid) {
        let mut ctx = parse(source).expect("markup parses");
        let mut tree = LayoutTree::new(BoundingBox::new(0, 0, width, height));
        tree.compute(&mut ctx);
        let mut grid = CellGrid::new(width, height);
        {
            let mut device = Device::new(&mut grid);
            render(&mut device, &ctx, &mut tree);
        }
        (ctx, tree, grid)
    }

    fn row_text(grid: &CellGrid, y: i32) -> String {
        (0..grid.cols())
            .map(|x| grid.cell(x, y).map(|c| c.glyph).unwrap_or(' '))
            .collect::<String>()
            .trim_end()
            .to_owned()
    }

    // -----------------------------------------------------------------------
    // Text
    // -----------------------------------------------------------------------

    #[test]
    fn renders_single_line() {
        let (_, _, grid) = render_to_grid("<text>hello</text>", 20, 3);
        assert_eq!(row_text(&grid, 0), "hello");
        assert_eq!(row_text(&grid, 1), "");
    }

    #[test]
    fn renders_wrapped_rows() {
        let (_, _, grid) = render_to_grid("<text>hello world again</text>", 10, 5);
        assert_eq!(row_text(&grid, 0), "hello");
        assert_eq!(row_text(&grid, 1), "world");
        assert_eq!(row_text(&grid, 2), "again");
    }

    #[test]
    fn text_style_reaches_cells() {
        let (_, _, grid) = render_to_grid(r#"<row><b color="red">x</b></row>"#, 10, 3);
        let cell = grid.cell(0, 0).unwrap();
        assert_eq!(cell.glyph, 'x');
        assert_eq!(cell.style.fg, Color::RED);
        assert!(cell.style.bold);
    }

    // -----------------------------------------------------------------------
    // Borders
    // -----------------------------------------------------------------------

    #[test]
    fn border_box_with_inner_text() {
        let (ctx, tree, grid) = render_to_grid(
            r#"<row id="r" border="thin solid red"><text>hi</text></row>"#,
            10,
            5,
        );
        let r = ctx.element_by_id("r").unwrap();
        let node = tree
            .node_for(crate::dom::NodeRef { index: r, kind: crate::dom::NodeKind::Element })
            .unwrap();
        let container = tree.nodes[node].container;
        assert_eq!(container.height, 3);

        // Edges and corners.
        assert_eq!(grid.cell(0, 0).unwrap().glyph, '┌');
        assert_eq!(grid.cell(container.max_x() - 1, 0).unwrap().glyph, '┐');
        assert_eq!(grid.cell(0, 2).unwrap().glyph, '└');
        assert_eq!(grid.cell(container.max_x() - 1, 2).unwrap().glyph, '┘');
        assert_eq!(grid.cell(1, 0).unwrap().glyph, '─');
        assert_eq!(grid.cell(0, 1).unwrap().glyph, '│');

        // Border color applies to the edge cells.
        assert_eq!(grid.cell(1, 0).unwrap().style.fg, Color::RED);

        // Interior text at (1, 1).
        assert_eq!(grid.cell(1, 1).unwrap().glyph, 'h');
        assert_eq!(grid.cell(2, 1).unwrap().glyph, 'i');
    }

    #[test]
    fn rounded_corners() {
        let (_, _, grid) = render_to_grid(
            r#"<row border="thin solid" border-type="rounded"><text>x</text></row>"#,
            10,
            5,
        );
        assert_eq!(grid.cell(0, 0).unwrap().glyph, '╭');
        assert_eq!(grid.cell(9, 0).unwrap().glyph, '╮');
        assert_eq!(grid.cell(0, 2).unwrap().glyph, '╰');
        assert_eq!(grid.cell(9, 2).unwrap().glyph, '╯');
    }

    #[test]
    fn per_corner_types_are_independent() {
        let (_, _, grid) = render_to_grid(
            r#"<row border="thin solid" border-type="sharp" border-type-top-left="rounded"><text>x</text></row>"#,
            10,
            5,
        );
        assert_eq!(grid.cell(0, 0).unwrap().glyph, '╭');
        assert_eq!(grid.cell(9, 0).unwrap().glyph, '┐');
    }

    // -----------------------------------------------------------------------
    // Clipping
    // -----------------------------------------------------------------------

    #[test]
    fn nothing_outside_viewport_is_dirty() {
        let mut ctx = parse("<text>hello world hello world</text>").unwrap();
        let mut tree = LayoutTree::new(BoundingBox::new(0, 0, 5, 2));
        tree.compute(&mut ctx);
        // The grid is larger than the viewport.
        let mut grid = CellGrid::new(20, 10);
        {
            let mut device = Device::new(&mut grid);
            render(&mut device, &ctx, &mut tree);
        }
        for y in 0..10 {
            for x in 0..20 {
                let cell = grid.cell(x, y).unwrap();
                if x >= 5 || y >= 2 {
                    assert!(!cell.is_dirty(), "cell ({x},{y}) written outside viewport");
                }
            }
        }
    }

    #[test]
    fn clip_overflow_limits_emitted_rows() {
        let (_, _, grid) = render_to_grid(
            r#"<box width="6c" height="2c" overflow="clip clip"><text>aa bb cc dd ee</text></box>"#,
            20,
            10,
        );
        for y in 2..10 {
            assert_eq!(row_text(&grid, y), "", "row {y} should be clipped");
        }
    }

    // -----------------------------------------------------------------------
    // z-order
    // -----------------------------------------------------------------------

    #[test]
    fn higher_z_wins_regardless_of_document_order() {
        let source = r#"<col><box z_index="2c" width="3c" height="1c">AAA</box><box z_index="1c" width="3c" height="1c" margin-top="-1c">BBB</box></col>"#;
        let (_, _, grid) = render_to_grid(source, 10, 5);
        // The second box overlaps the first, but carries a lower z.
        assert_eq!(row_text(&grid, 0), "AAA");

        let flipped = r#"<col><box z_index="1c" width="3c" height="1c">AAA</box><box z_index="2c" width="3c" height="1c" margin-top="-1c">BBB</box></col>"#;
        let (_, _, grid) = render_to_grid(flipped, 10, 5);
        assert_eq!(row_text(&grid, 0), "BBB");
    }

    // -----------------------------------------------------------------------
    // Scroll backing grids
    // -----------------------------------------------------------------------

    #[test]
    fn scroll_box_clips_via_backing_grid() {
        let source = r#"<box id="b" width="6c" height="2c" overflow="scroll scroll"><text>aa bb cc dd ee</text></box>"#;
        let (ctx, tree, grid) = render_to_grid(source, 20, 10);
        let b = ctx.element_by_id("b").unwrap();
        let node = tree
            .node_for(crate::dom::NodeRef { index: b, kind: crate::dom::NodeKind::Element })
            .unwrap();
        // The backing grid was allocated and kept for reuse.
        let canvas = tree.nodes[node].canvas.as_ref().expect("backing grid");
        assert_eq!(canvas.cols(), 6);
        assert_eq!(canvas.rows(), 2);
        // Content beyond the container is not on the screen.
        for y in 2..10 {
            assert_eq!(row_text(&grid, y), "");
        }
        // Visible content is.
        assert!(row_text(&grid, 0).contains("aa"));
    }
}
