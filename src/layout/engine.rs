//! The layout tree and its two cyclic resolution passes.
//!
//! [`LayoutTree::compute`] rebuilds the tree from a [`Context`]:
//!
//! 1. **Width pass** — a single bottom-up recursion. Fixed widths win
//!    outright; `fit` widths accumulate child content (inline runs
//!    cumulatively, blocks by maximum); percent widths inside `fit`
//!    parents back-propagate (`parent ≥ intrinsic / fraction`) and are
//!    finalized once the parent's width is known. Percent padding is
//!    folded in by dividing the content by the remaining fraction.
//! 2. **Height pass** — a single recursion that lays text into line
//!    boxes, stacks block children with vertical-margin collapsing, and
//!    lets consecutive inline children share rows through a tracked
//!    cursor. Pending collapsed margins are applied by shifting the line
//!    boxes and child containers recorded since the last flush boundary.
//!
//! The tree is rebuilt whenever the viewport, styles, or source change;
//! node indices are stable only within one computation.

use crate::css::number::Number;
use crate::css::style::{Display, Overflow, Style, Whitespace};
use crate::dom::{Context, NodeKind, NodeRef, TextSlice};
use crate::geometry::{BoundingBox, Point};
use crate::layout::line_box::{LineBox, LineSpan};
use crate::layout::text::{measure_width, TextLayouter};
use crate::render::grid::CellGrid;

/// One laid-out node: an element or a non-empty text run.
#[derive(Debug, Default)]
pub struct LayoutNode {
    /// Back-reference into the Context's node arrays.
    pub source: Option<NodeRef>,
    pub style_index: usize,
    /// The normalized text for text nodes, `None` for elements.
    pub text: Option<TextSlice>,
    /// This node's lines in the tree's flat line array.
    pub lines: LineSpan,
    /// Children in document order, as indices into the tree.
    pub children: Vec<usize>,
    /// The border box, borders and padding included.
    pub container: BoundingBox,
    pub scrollable_x: bool,
    pub scrollable_y: bool,
    /// Backing grid for scroll overflow; allocated lazily by the
    /// renderer and reused across frames.
    pub canvas: Option<CellGrid>,
}

impl LayoutNode {
    fn element(source: NodeRef, style_index: usize) -> Self {
        Self {
            source: Some(source),
            style_index,
            ..Self::default()
        }
    }

    fn text(source: NodeRef, style_index: usize, text: TextSlice) -> Self {
        Self {
            source: Some(source),
            style_index,
            text: Some(text),
            ..Self::default()
        }
    }

    pub fn is_text(&self) -> bool {
        self.text.is_some()
    }
}

/// Flow state threaded through the height pass.
#[derive(Debug, Clone, Copy)]
struct FlowState {
    /// Rows consumed so far within the current element.
    height: i32,
    /// The content box text and children flow into.
    content: BoundingBox,
    /// The inline cursor.
    cursor: Point,
    /// Index of the previous inline sibling's last line box, for the
    /// word-continuation heuristic.
    previous_line: Option<usize>,
}

/// The laid-out document for one viewport.
#[derive(Debug, Default)]
pub struct LayoutTree {
    pub viewport: BoundingBox,
    pub nodes: Vec<LayoutNode>,
    /// All line boxes, flat; nodes own [`LineSpan`]s into it.
    pub lines: Vec<LineBox>,
}

impl LayoutTree {
    pub fn new(viewport: BoundingBox) -> Self {
        Self {
            viewport,
            nodes: Vec::new(),
            lines: Vec::new(),
        }
    }

    /// Find the layout node for a document node, if it was laid out.
    pub fn node_for(&self, source: NodeRef) -> Option<usize> {
        self.nodes.iter().position(|n| n.source == Some(source))
    }

    /// Rebuild the layout from `ctx` for the current viewport.
    pub fn compute(&mut self, ctx: &mut Context) {
        ctx.resolve_styles();
        self.nodes.clear();
        self.lines.clear();

        self.nodes.push(LayoutNode::element(Context::ROOT, 0));
        self.collect(ctx, 0, 0);

        self.seed_root_style(ctx);
        self.propagate_absolute(ctx, 0);
        self.resolve_width(ctx, 0, self.viewport.width);
        let start = FlowState {
            height: self.viewport.height,
            content: self.viewport,
            cursor: Point::new(self.viewport.min_x(), self.viewport.min_y()),
            previous_line: None,
        };
        self.resolve_height(ctx, 0, start);
        self.mark_scrollable(ctx, 0);
    }

    // -----------------------------------------------------------------------
    // Tree construction
    // -----------------------------------------------------------------------

    fn collect(&mut self, ctx: &Context, el_index: usize, layout_index: usize) {
        let children = ctx.elements[el_index].children.clone();
        for child_ref in children {
            match child_ref.kind {
                NodeKind::Text => {
                    let text = &ctx.texts[child_ref.index];
                    if text.normalized.is_empty() {
                        continue;
                    }
                    let index = self.nodes.len();
                    self.nodes
                        .push(LayoutNode::text(child_ref, text.style_index, text.normalized));
                    self.nodes[layout_index].children.push(index);
                }
                NodeKind::Element => {
                    let style_index = ctx.elements[child_ref.index].style_index;
                    let index = self.nodes.len();
                    self.nodes.push(LayoutNode::element(child_ref, style_index));
                    self.nodes[layout_index].children.push(index);
                    self.collect(ctx, child_ref.index, index);
                }
            }
        }
    }

    /// Pin the sentinel root style to the viewport.
    fn seed_root_style(&mut self, ctx: &mut Context) {
        let style = &mut ctx.styles[self.nodes[0].style_index];
        style.width = Number::Cells(self.viewport.width);
        style.height = Number::Cells(self.viewport.height);
        style.inset = crate::css::number::QuadProperty::new(
            Number::Cells(self.viewport.min_y()),
            Number::Cells(self.viewport.max_x()),
            Number::Cells(self.viewport.max_y()),
            Number::Cells(self.viewport.min_x()),
        );
    }

    /// Top-down pre-pass: children of absolutely-sized parents get their
    /// percentages resolved and margins made concrete.
    fn propagate_absolute(&mut self, ctx: &mut Context, node: usize) {
        let style = ctx.styles[self.nodes[node].style_index].clone();
        let children = self.nodes[node].children.clone();
        for child in children {
            let child_style = &mut ctx.styles[self.nodes[child].style_index];
            if let Number::Cells(width) = style.width {
                resolve_width_props(child_style, width, false);
                child_style.margin = child_style.margin.resolve(width.max(0));
            }
            if let Number::Cells(height) = style.height {
                resolve_height_props(child_style, height, false);
            }
            self.propagate_absolute(ctx, child);
        }
    }

    // -----------------------------------------------------------------------
    // Width pass
    // -----------------------------------------------------------------------

    fn resolve_width(&mut self, ctx: &mut Context, node: usize, max_parent_width: i32) -> i32 {
        let style_index = self.nodes[node].style_index;
        let mut content_width = 0;

        if let Some(slice) = self.nodes[node].text {
            content_width = measure_width(ctx.text(slice));
            if ctx.styles[style_index].whitespace != Whitespace::NoWrap {
                content_width = content_width.min(max_parent_width);
            }
        }

        let children = self.nodes[node].children.clone();
        let mut last_inline = false;
        let mut percent_children: Vec<(usize, f32)> = Vec::new();
        for child in children {
            let child_style_index = self.nodes[child].style_index;
            {
                let child_style = &mut ctx.styles[child_style_index];
                child_style.margin = child_style.margin.resolve(max_parent_width);
            }
            let child_style = ctx.styles[child_style_index].clone();
            let is_inline = child_style.is_inline_context();
            let margin = child_style.margin.horizontal();

            match child_style.width {
                Number::Cells(child_width) => {
                    let mut w = child_width;
                    if is_inline && last_inline {
                        w += content_width;
                    }
                    content_width = content_width.max(w);
                    self.resolve_width(ctx, child, child_width);
                }
                Number::Fit => {
                    let mut parent_width = match ctx.styles[style_index].width {
                        Number::Cells(w) => w,
                        _ => max_parent_width,
                    };
                    if is_inline && last_inline {
                        parent_width += content_width;
                    }
                    let w = self.resolve_width(ctx, child, parent_width);
                    content_width = content_width.max(w);
                }
                Number::Percent(p) => {
                    // Back-propagation: the parent must be wide enough
                    // for the child's intrinsic content at this fraction.
                    let fraction = p / 100.0;
                    let intrinsic = self.resolve_width(ctx, child, max_parent_width);
                    let need = if fraction >= 1e-4 {
                        (intrinsic as f32 / fraction).round() as i32
                    } else {
                        intrinsic
                    };
                    content_width = content_width.max(need);
                    percent_children.push((child, fraction));
                }
            }

            last_inline = is_inline;
            content_width += margin;
        }

        let style = ctx.styles[style_index].clone();
        let width = if let Number::Cells(w) = style.width {
            self.nodes[node].container.width = w;
            w
        } else {
            let mut content = content_width
                + style.border_left.border_width()
                + style.border_right.border_width();
            let mut percent = 0.0f32;
            match style.padding.left {
                Number::Percent(p) => percent += p / 100.0,
                other => content += other.as_cell(),
            }
            match style.padding.right {
                Number::Percent(p) => percent += p / 100.0,
                other => content += other.as_cell(),
            }
            percent = 1.0 - percent;

            let actual = if percent >= 1e-4 {
                (content as f32 / percent) as i32
            } else {
                content
            };
            self.nodes[node].container.width = actual;
            resolve_width_props(&mut ctx.styles[style_index], actual, true);
            actual
        };

        // Percent children resolve against the parent's final width.
        for (child, fraction) in percent_children {
            let resolved = (width as f32 * fraction).round() as i32;
            ctx.styles[self.nodes[child].style_index].width = Number::Cells(resolved);
            self.nodes[child].container.width = resolved;
        }

        width
    }

    // -----------------------------------------------------------------------
    // Height pass
    // -----------------------------------------------------------------------

    fn resolve_height(&mut self, ctx: &mut Context, node: usize, param: FlowState) -> FlowState {
        if let Some(slice) = self.nodes[node].text {
            return self.resolve_text_height(ctx, node, slice, param);
        }

        let style_index = self.nodes[node].style_index;
        let element_style = ctx.styles[style_index].clone();
        let span_start = self.lines.len() as u32;

        let mut v_margin = (0i32, 0i32);
        let mut flow = param;
        flow.height = 0;
        let mut run_start_y: Option<i32> = None;
        let mut margin_line_start = self.lines.len();
        let mut margin_node_start = 0usize;
        let mut previous_inline = false;

        let children = self.nodes[node].children.clone();
        for (i, &child) in children.iter().enumerate() {
            let child_style = ctx.styles[self.nodes[child].style_index].clone();

            let inline_display = child_style.display == Display::Inline;
            let top_margin = if inline_display { 0 } else { child_style.margin.top.as_cell() };
            let bottom_margin =
                if inline_display { 0 } else { child_style.margin.bottom.as_cell() };
            let top_padding = if inline_display { 0 } else { child_style.padding.top.as_cell() };

            if child_style.can_collapse_margin() {
                v_margin.0 = combine_margin(v_margin.0, top_margin);
                v_margin.1 = combine_margin(v_margin.1, bottom_margin);
            } else {
                v_margin.0 += top_margin;
                v_margin.1 += bottom_margin;
            }

            let offset_x = child_style.padding.left.as_cell()
                + child_style.border_left.border_width()
                + child_style.margin.left.as_cell();
            let offset_y = top_padding + child_style.border_top.border_width();

            let is_inline = child_style.has_inline_flow();

            if !is_inline {
                // A block boundary: close any open inline run first.
                if let Some(run_y) = run_start_y.take() {
                    flow.height += flow.cursor.y - run_y + 1;
                    flow.cursor = Point::new(param.content.x, param.content.y + flow.height);
                    margin_line_start = self.lines.len();
                    margin_node_start = i;
                }

                let gap = v_margin.0;
                let cx = param.content.x;
                let cy = param.content.y + flow.height;
                self.nodes[child].container.x = cx + child_style.margin.left.as_cell();
                self.nodes[child].container.y = cy;

                let inner_width = (param.content.width
                    - (child_style.padding.horizontal()
                        + child_style.border_left.border_width()
                        + child_style.border_right.border_width()
                        + child_style.margin.horizontal()))
                .max(0);
                let content_width = if self.nodes[child].is_text() {
                    inner_width.min(self.nodes[child].container.width)
                } else {
                    inner_width.min(child_style.content_width())
                }
                .max(0);

                let content = BoundingBox::new(
                    cx + offset_x,
                    cy + offset_y,
                    content_width,
                    BoundingBox::inf().height - (cy + offset_y),
                );
                let child_param = FlowState {
                    height: 0,
                    content,
                    cursor: Point::new(content.x, content.y),
                    previous_line: None,
                };
                let result = self.resolve_height(ctx, child, child_param);

                let mut child_height = match child_style.height {
                    Number::Fit => result.height,
                    Number::Cells(h) => h,
                    Number::Percent(_) => 0,
                };
                child_height += child_style.padding.vertical()
                    + child_style.border_top.border_width()
                    + child_style.border_bottom.border_width();
                self.nodes[child].container.height = child_height;

                // Flush: the pending collapsed margin shifts everything
                // recorded since the last boundary.
                if gap != 0 {
                    for line in &mut self.lines[margin_line_start..] {
                        line.bounds.y += gap;
                    }
                    for &j in &children[margin_node_start..=i] {
                        self.shift_subtree(j, gap);
                    }
                }

                flow.height += child_height + gap;
                v_margin = (v_margin.1, 0);
                margin_line_start = self.lines.len();
                margin_node_start = i + 1;
                flow.cursor = Point::new(param.content.x, param.content.y + flow.height);
                flow.previous_line = None;
            } else {
                if run_start_y.is_none() {
                    // An inline run opens: consume the pending margin as
                    // a plain gap before any of its lines exist.
                    let gap = v_margin.0;
                    flow.height += gap;
                    flow.cursor.y += gap;
                    v_margin.0 = 0;
                    run_start_y = Some(flow.cursor.y);
                }

                self.nodes[child].container.x = flow.cursor.x;
                self.nodes[child].container.y = flow.cursor.y;

                let continuation = if previous_inline && !self.lines.is_empty() {
                    let candidate = self.lines.len() - 1;
                    let text = ctx.text(self.lines[candidate].slice);
                    if text.is_empty() || text == " " {
                        None
                    } else {
                        Some(candidate)
                    }
                } else {
                    param.previous_line
                };

                // Inline children flow inside the current content box.
                let content = BoundingBox::new(
                    param.content.x,
                    param.content.y,
                    param.content.width,
                    BoundingBox::inf().height - param.content.y,
                );
                let child_param = FlowState {
                    height: 0,
                    content,
                    cursor: flow.cursor,
                    previous_line: continuation,
                };
                let result = self.resolve_height(ctx, child, child_param);
                flow.cursor = result.cursor;
                flow.previous_line = result.previous_line;

                let mut child_height = match child_style.height {
                    Number::Fit => result.height,
                    Number::Cells(h) => h,
                    Number::Percent(_) => 0,
                };
                child_height += child_style.padding.vertical()
                    + child_style.border_top.border_width()
                    + child_style.border_bottom.border_width();
                self.nodes[child].container.height = child_height;
            }

            previous_inline = is_inline;
            let container_height = self.nodes[child].container.height;
            resolve_height_props(
                &mut ctx.styles[self.nodes[child].style_index],
                container_height,
                true,
            );
        }

        if let Some(run_y) = run_start_y.take() {
            flow.height += flow.cursor.y - run_y + 1;
            margin_line_start = self.lines.len();
            margin_node_start = children.len();
        }

        // Trailing pending margin shift.
        if v_margin.0 != 0 {
            for line in &mut self.lines[margin_line_start..] {
                line.bounds.y += v_margin.0;
            }
            for &j in &children[margin_node_start.min(children.len())..] {
                self.shift_subtree(j, v_margin.0);
            }
        }

        self.nodes[node].lines = LineSpan {
            start: span_start,
            size: self.lines.len() as u32 - span_start,
        };

        let mut out = param;
        out.height = flow.height;
        if element_style.has_inline_flow() {
            out.cursor = flow.cursor;
            out.previous_line = flow.previous_line;
        } else {
            out.cursor = Point::new(param.content.x, param.cursor.y + flow.height);
        }
        if node == 0 {
            self.nodes[0].container = param.content;
        }
        out
    }

    fn resolve_text_height(
        &mut self,
        ctx: &mut Context,
        node: usize,
        slice: TextSlice,
        param: FlowState,
    ) -> FlowState {
        let style = ctx.styles[self.nodes[node].style_index].clone();
        let container = BoundingBox::new(
            param.content.x,
            param.content.y,
            param.content.width,
            BoundingBox::inf().height - param.content.y,
        );
        let mut layouter = TextLayouter {
            slice,
            container,
            start: param.cursor,
        };
        let previous_word_line = param.previous_line.filter(|&p| self.lines.len() == p + 1);
        let result = layouter.layout(ctx.text(slice), &mut self.lines, previous_word_line, &style);
        self.nodes[node].lines = result.span;

        let mut out = param;
        out.height = result.height;
        out.cursor = layouter.start;
        out
    }

    fn shift_subtree(&mut self, node: usize, dy: i32) {
        self.nodes[node].container.y += dy;
        let children = self.nodes[node].children.clone();
        for child in children {
            self.shift_subtree(child, dy);
        }
    }

    // -----------------------------------------------------------------------
    // Scroll overflow
    // -----------------------------------------------------------------------

    /// Flag nodes whose children escape their content box on an axis
    /// with `auto`/`scroll` overflow; the renderer gives them backing
    /// grids.
    fn mark_scrollable(&mut self, ctx: &Context, node: usize) {
        if !self.nodes[node].is_text() {
            let style = &ctx.styles[self.nodes[node].style_index];
            let container = self.nodes[node].container;
            let content = container
                .pad(
                    style.border_top.border_width(),
                    style.border_right.border_width(),
                    style.border_bottom.border_width(),
                    style.border_left.border_width(),
                )
                .pad(
                    style.padding.top.as_cell(),
                    style.padding.right.as_cell(),
                    style.padding.bottom.as_cell(),
                    style.padding.left.as_cell(),
                );
            let scroll_x = matches!(style.overflow_x, Overflow::Auto | Overflow::Scroll);
            let scroll_y = matches!(style.overflow_y, Overflow::Auto | Overflow::Scroll);
            let mut overflow_x = false;
            let mut overflow_y = false;
            for &child in &self.nodes[node].children {
                let c = self.nodes[child].container;
                overflow_x |= c.max_x() > content.max_x() || c.min_x() < content.min_x();
                overflow_y |= c.max_y() > content.max_y() || c.min_y() < content.min_y();
            }
            for i in self.nodes[node].lines.range() {
                let b = self.lines[i].bounds;
                overflow_x |= b.max_x() > content.max_x() || b.min_x() < content.min_x();
                overflow_y |= b.max_y() > content.max_y() || b.min_y() < content.min_y();
            }
            self.nodes[node].scrollable_x = scroll_x && overflow_x;
            self.nodes[node].scrollable_y = scroll_y && overflow_y;
        }

        let children = self.nodes[node].children.clone();
        for child in children {
            self.mark_scrollable(ctx, child);
        }
    }
}

/// Sign-respecting margin collapse: both positive takes the max, both
/// negative the min, mixed signs sum.
fn combine_margin(pending: i32, incoming: i32) -> i32 {
    if pending < 0 && incoming < 0 {
        pending.min(incoming)
    } else if pending > 0 && incoming > 0 {
        pending.max(incoming)
    } else {
        pending + incoming
    }
}

/// Resolve the width-related style properties against a parent width.
///
/// With `resolve_auto_fit` the `fit` values become concrete, the width is
/// clamped by `min-width`, and `clip` overflow additionally clamps by
/// `max-width` and the parent. Without it, only percentages resolve.
fn resolve_width_props(style: &mut Style, parent_width: i32, resolve_auto_fit: bool) {
    let parent_width = parent_width.max(0);
    if resolve_auto_fit {
        style.width = style.width.resolve_all(parent_width);
        style.min_width = style.min_width.resolve_all(parent_width);
        style.max_width = style.max_width.resolve_all(parent_width);
        style.width = Number::Cells(style.width.as_cell().max(style.min_width.as_cell()));
        if style.overflow_x == Overflow::Clip {
            let clamped = style
                .width
                .as_cell()
                .min(style.max_width.as_cell())
                .min(parent_width);
            style.width = Number::Cells(clamped);
        }
    } else {
        style.width = style.width.resolve_percent(parent_width);
        style.min_width = style.min_width.resolve_percent(parent_width);
        style.max_width = style.max_width.resolve_percent(parent_width);
    }
    style.padding = style.padding.resolve(parent_width);
    style.inset = style.inset.resolve(parent_width);
}

/// Height counterpart of [`resolve_width_props`].
fn resolve_height_props(style: &mut Style, parent_height: i32, resolve_auto_fit: bool) {
    if resolve_auto_fit {
        style.min_height = style.min_height.resolve_all(parent_height);
        style.max_height = style.max_height.resolve_all(parent_height);
        style.height = style.height.resolve_all(parent_height);
        style.height = Number::Cells(style.height.as_cell().max(style.min_height.as_cell()));
        if style.overflow_y == Overflow::Clip {
            let clamped = style
                .height
                .as_cell()
                .min(style.max_height.as_cell())
                .min(parent_height);
            style.height = Number::Cells(clamped);
        }
    } else {
        style.min_height = style.min_height.resolve_percent(parent_height);
        style.max_height = style.max_height.resolve_percent(parent_height);
        style.height = style.height.resolve_percent(parent_height);
    }
}

// ===========================================================================
// Tests
// ===========================================================================
