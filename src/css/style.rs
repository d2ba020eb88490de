//! The per-element style record and its attribute parser.
//!
//! A [`Style`] is parsed once per element out of the raw attribute map,
//! with the parent's style supplying inherited color defaults, and is
//! immutable to everything but the layout passes (which resolve its
//! symbolic lengths in place). Malformed values silently fall back to
//! their defaults; layout never aborts on bad input.

use std::collections::HashMap;

use crate::css::border::{parse_border_type, Border, BorderType};
use crate::css::color::Color;
use crate::css::number::{Number, QuadProperty};

/// Attribute keys recognized by the style parser.
pub mod keys {
    pub const COLOR: &str = "color";
    pub const BACKGROUND_COLOR: &str = "background-color";

    pub const PADDING: &str = "padding";
    pub const PADDING_TOP: &str = "padding-top";
    pub const PADDING_RIGHT: &str = "padding-right";
    pub const PADDING_BOTTOM: &str = "padding-bottom";
    pub const PADDING_LEFT: &str = "padding-left";

    pub const MARGIN: &str = "margin";
    pub const MARGIN_TOP: &str = "margin-top";
    pub const MARGIN_RIGHT: &str = "margin-right";
    pub const MARGIN_BOTTOM: &str = "margin-bottom";
    pub const MARGIN_LEFT: &str = "margin-left";

    pub const WIDTH: &str = "width";
    pub const MIN_WIDTH: &str = "min-width";
    pub const MAX_WIDTH: &str = "max-width";
    pub const HEIGHT: &str = "height";
    pub const MIN_HEIGHT: &str = "min-height";
    pub const MAX_HEIGHT: &str = "max-height";

    pub const BORDER: &str = "border";
    pub const BORDER_TOP: &str = "border-top";
    pub const BORDER_RIGHT: &str = "border-right";
    pub const BORDER_BOTTOM: &str = "border-bottom";
    pub const BORDER_LEFT: &str = "border-left";

    pub const BORDER_TYPE: &str = "border-type";
    pub const BORDER_TYPE_TOP_LEFT: &str = "border-type-top-left";
    pub const BORDER_TYPE_TOP_RIGHT: &str = "border-type-top-right";
    pub const BORDER_TYPE_BOTTOM_RIGHT: &str = "border-type-bottom-right";
    pub const BORDER_TYPE_BOTTOM_LEFT: &str = "border-type-bottom-left";

    pub const INSET: &str = "inset";
    pub const TOP: &str = "top";
    pub const LEFT: &str = "left";
    pub const RIGHT: &str = "right";
    pub const BOTTOM: &str = "bottom";

    pub const Z_INDEX: &str = "z_index";
    pub const DISPLAY: &str = "display";
    pub const WHITE_SPACE: &str = "white-space";
    pub const OVERFLOW_WRAP: &str = "overflow-wrap";

    pub const OVERFLOW: &str = "overflow";
    pub const OVERFLOW_X: &str = "overflow_x";
    pub const OVERFLOW_Y: &str = "overflow_y";
}

/// Properties copied from parent to child when the child does not set them.
pub const INHERITED_PROPERTIES: [&str; 3] =
    [keys::COLOR, keys::BACKGROUND_COLOR, keys::WHITE_SPACE];

/// Tags whose default display is inline.
const INLINE_TAGS: [&str; 6] = ["text", "span", "em", "b", "strong", "i"];

// ---------------------------------------------------------------------------
// Enumerated properties
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Display {
    #[default]
    Block,
    InlineBlock,
    Inline,
    Flex,
    Grid,
}

/// What kind of layout item an element is inside its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ItemType {
    #[default]
    None,
    Flex,
    Grid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overflow {
    #[default]
    Visible,
    Auto,
    Clip,
    Scroll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Whitespace {
    /// Runs of whitespace collapse to a single space.
    #[default]
    Normal,
    /// Collapse like `Normal`, but never wrap implicitly.
    NoWrap,
    /// Everything is preserved.
    Pre,
    /// Everything is preserved, with wrapping.
    PreWrap,
    /// Newlines are preserved, other whitespace collapses.
    PreLine,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowWrap {
    /// Break only at ordinary word break points.
    #[default]
    Normal,
    /// Split words that do not fit a full line.
    BreakWord,
}

/// Text attribute flags carried onto glyphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextStyle {
    pub bold: bool,
    pub italic: bool,
    pub dim: bool,
    pub underline: bool,
    pub strike: bool,
}

pub fn parse_overflow(value: &str, default: Overflow) -> Overflow {
    match value.trim() {
        "clip" => Overflow::Clip,
        "auto" => Overflow::Auto,
        "visible" => Overflow::Visible,
        "scroll" => Overflow::Scroll,
        _ => default,
    }
}

// ---------------------------------------------------------------------------
// Style
// ---------------------------------------------------------------------------

/// The resolved style of one element or text node.
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub min_width: Number,
    pub max_width: Number,
    pub min_height: Number,
    pub max_height: Number,
    pub width: Number,
    pub height: Number,

    pub display: Display,
    pub item_type: ItemType,

    pub border_top: Border,
    pub border_right: Border,
    pub border_bottom: Border,
    pub border_left: Border,
    /// Corner types in (top-left, top-right, bottom-right, bottom-left)
    /// order.
    pub border_type: [BorderType; 4],

    pub padding: QuadProperty,
    pub margin: QuadProperty,
    pub inset: QuadProperty,

    pub z_index: i32,

    pub overflow_x: Overflow,
    pub overflow_y: Overflow,

    pub fg_color: Color,
    pub bg_color: Color,

    pub whitespace: Whitespace,
    pub overflow_wrap: OverflowWrap,

    pub text_style: TextStyle,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            min_width: Number::min(),
            max_width: Number::max(),
            min_height: Number::min(),
            max_height: Number::max(),
            width: Number::fit(),
            height: Number::fit(),
            display: Display::Block,
            item_type: ItemType::None,
            border_top: Border::default(),
            border_right: Border::default(),
            border_bottom: Border::default(),
            border_left: Border::default(),
            border_type: [BorderType::Sharp; 4],
            padding: QuadProperty::default(),
            margin: QuadProperty::default(),
            inset: QuadProperty::default(),
            z_index: 0,
            overflow_x: Overflow::Visible,
            overflow_y: Overflow::Visible,
            fg_color: Color::DEFAULT,
            bg_color: Color::DEFAULT,
            whitespace: Whitespace::Normal,
            overflow_wrap: OverflowWrap::Normal,
            text_style: TextStyle::default(),
        }
    }
}

impl Style {
    /// Parse an element's attributes into a style, with the parent style
    /// supplying inherited color defaults and the item-type context.
    pub fn parse(tag: &str, attributes: &HashMap<String, String>, parent: Option<&Style>) -> Style {
        let get = |key: &str| attributes.get(key).map(String::as_str).unwrap_or("");
        let mut style = Style::default();

        style.display = match get(keys::DISPLAY).trim() {
            "block" => Display::Block,
            "inline" => Display::Inline,
            "inline-block" => Display::InlineBlock,
            "flex" => Display::Flex,
            "grid" => Display::Grid,
            _ => {
                if INLINE_TAGS.contains(&tag) {
                    Display::Inline
                } else {
                    Display::Block
                }
            }
        };

        if let Some(parent) = parent {
            style.item_type = match parent.display {
                Display::Flex => ItemType::Flex,
                Display::Grid => ItemType::Grid,
                _ => ItemType::None,
            };
        }

        style.fg_color = Color::parse(
            get(keys::COLOR),
            parent.map(|p| p.fg_color).unwrap_or(Color::DEFAULT),
        );
        style.bg_color = Color::parse(
            get(keys::BACKGROUND_COLOR),
            parent.map(|p| p.bg_color).unwrap_or(Color::DEFAULT),
        );

        style.padding = parse_quad_with_sides(
            attributes,
            style.padding,
            keys::PADDING,
            [keys::PADDING_TOP, keys::PADDING_RIGHT, keys::PADDING_BOTTOM, keys::PADDING_LEFT],
        );
        style.margin = parse_quad_with_sides(
            attributes,
            style.margin,
            keys::MARGIN,
            [keys::MARGIN_TOP, keys::MARGIN_RIGHT, keys::MARGIN_BOTTOM, keys::MARGIN_LEFT],
        );
        style.inset = parse_quad_with_sides(
            attributes,
            style.inset,
            keys::INSET,
            [keys::TOP, keys::RIGHT, keys::BOTTOM, keys::LEFT],
        );

        // Borders: the shorthand applies to all four edges, per-side keys
        // override.
        let shorthand = get(keys::BORDER);
        if !shorthand.is_empty() {
            let border = Border::parse(shorthand);
            style.border_top = border;
            style.border_right = border;
            style.border_bottom = border;
            style.border_left = border;
        }
        for (key, slot) in [
            (keys::BORDER_TOP, &mut style.border_top),
            (keys::BORDER_RIGHT, &mut style.border_right),
            (keys::BORDER_BOTTOM, &mut style.border_bottom),
            (keys::BORDER_LEFT, &mut style.border_left),
        ] {
            let value = get(key);
            if !value.is_empty() {
                *slot = Border::parse(value);
            }
        }

        let border_type = get(keys::BORDER_TYPE);
        if !border_type.is_empty() {
            style.border_type = parse_border_type(border_type, BorderType::Sharp);
        }
        for (i, key) in [
            keys::BORDER_TYPE_TOP_LEFT,
            keys::BORDER_TYPE_TOP_RIGHT,
            keys::BORDER_TYPE_BOTTOM_RIGHT,
            keys::BORDER_TYPE_BOTTOM_LEFT,
        ]
        .into_iter()
        .enumerate()
        {
            let value = get(key);
            if !value.is_empty() {
                style.border_type[i] = parse_border_type(value, BorderType::Sharp)[i];
            }
        }

        let width = get(keys::WIDTH);
        if !width.is_empty() {
            style.width = Number::parse(width, Number::fit());
        } else if style.display == Display::Block {
            style.width = Number::Percent(100.0);
        }

        let height = get(keys::HEIGHT);
        if !height.is_empty() {
            style.height = Number::parse(height, Number::fit());
        }

        style.min_width = Number::parse(get(keys::MIN_WIDTH), Number::min());
        style.min_height = Number::parse(get(keys::MIN_HEIGHT), Number::min());
        style.max_width = Number::parse(get(keys::MAX_WIDTH), Number::max());
        style.max_height = Number::parse(get(keys::MAX_HEIGHT), Number::max());

        if let Number::Cells(z) = Number::parse(get(keys::Z_INDEX), Number::fit()) {
            style.z_index = z;
        }

        // The two-value overflow form is `overflow: <y> <x>`.
        let overflow = get(keys::OVERFLOW).trim();
        if !overflow.is_empty() {
            match overflow.split_once(char::is_whitespace) {
                Some((y, x)) => {
                    style.overflow_y = parse_overflow(y, style.overflow_y);
                    style.overflow_x = parse_overflow(x, style.overflow_x);
                }
                None => {
                    style.overflow_y = parse_overflow(overflow, style.overflow_y);
                    style.overflow_x = style.overflow_y;
                }
            }
        }
        let overflow_x = get(keys::OVERFLOW_X);
        if !overflow_x.is_empty() {
            style.overflow_x = parse_overflow(overflow_x, style.overflow_x);
        }
        let overflow_y = get(keys::OVERFLOW_Y);
        if !overflow_y.is_empty() {
            style.overflow_y = parse_overflow(overflow_y, style.overflow_y);
        }

        style.whitespace = match get(keys::WHITE_SPACE).trim() {
            "normal" => Whitespace::Normal,
            "nowrap" => Whitespace::NoWrap,
            "pre" => Whitespace::Pre,
            "pre-wrap" => Whitespace::PreWrap,
            "pre-line" => Whitespace::PreLine,
            _ => style.whitespace,
        };

        style.overflow_wrap = match get(keys::OVERFLOW_WRAP).trim() {
            "normal" => OverflowWrap::Normal,
            "break-word" => OverflowWrap::BreakWord,
            _ => style.overflow_wrap,
        };

        style.text_style.bold = tag == "b";
        style.text_style.italic = tag == "i";

        // Inline elements size to content and carry no vertical margins.
        if style.display == Display::Inline {
            style.width = Number::fit();
            style.height = Number::fit();
            style.min_width = Number::min();
            style.min_height = Number::min();
            style.max_width = Number::max();
            style.max_height = Number::max();
            style.margin.top = Number::min();
            style.margin.bottom = Number::min();
        }

        style
    }

    /// The width available to content: width minus horizontal borders and
    /// padding, clamped to zero.
    pub fn content_width(&self) -> i32 {
        let borders = self.border_left.border_width() + self.border_right.border_width();
        let padding = self.padding.left.as_cell() + self.padding.right.as_cell();
        (self.width.as_cell() - (borders + padding)).max(0)
    }

    /// Whether a display participates in inline flow.
    pub fn display_has_inline_flow(display: Display) -> bool {
        matches!(display, Display::Inline | Display::InlineBlock)
    }

    pub fn has_inline_flow(&self) -> bool {
        Self::display_has_inline_flow(self.display)
    }

    /// Whether children of a display sit in an inline context.
    pub fn display_is_inline_context(display: Display) -> bool {
        matches!(display, Display::Inline | Display::InlineBlock)
    }

    pub fn is_inline_context(&self) -> bool {
        Self::display_is_inline_context(self.display)
    }

    /// Inline elements do not shift the vertical flow.
    pub fn ignore_vertical_layout_shift(&self) -> bool {
        self.display == Display::Inline
    }

    /// Only ordinary flow items collapse vertical margins.
    pub fn can_collapse_margin(&self) -> bool {
        self.item_type == ItemType::None
    }

    /// Non-zero left padding acts as a whitespace producer at the left
    /// run boundary.
    pub fn has_start_whitespace(&self) -> bool {
        match self.padding.left {
            Number::Cells(c) => c > 0,
            Number::Percent(p) => p > 0.0,
            Number::Fit => false,
        }
    }

    /// Non-zero right padding acts as a whitespace producer at the right
    /// run boundary.
    pub fn has_end_whitespace(&self) -> bool {
        match self.padding.right {
            Number::Cells(c) => c > 0,
            Number::Percent(p) => p > 0.0,
            Number::Fit => false,
        }
    }
}

fn parse_quad_with_sides(
    attributes: &HashMap<String, String>,
    mut quad: QuadProperty,
    shorthand: &str,
    sides: [&str; 4],
) -> QuadProperty {
    let get = |key: &str| attributes.get(key).map(String::as_str).unwrap_or("");
    let value = get(shorthand);
    if !value.is_empty() {
        quad = QuadProperty::parse(value, quad);
    }
    let [top, right, bottom, left] = sides;
    let value = get(top);
    if !value.is_empty() {
        quad.top = QuadProperty::parse(value, quad).top;
    }
    let value = get(right);
    if !value.is_empty() {
        quad.right = QuadProperty::parse(value, quad).right;
    }
    let value = get(bottom);
    if !value.is_empty() {
        quad.bottom = QuadProperty::parse(value, quad).bottom;
    }
    let value = get(left);
    if !value.is_empty() {
        quad.left = QuadProperty::parse(value, quad).left;
    }
    quad
}

// ===========================================================================
// Tests
// ===========================================================================
