//! Borders: width, line style, color, and box-drawing character sets.
//!
//! Border widths are restricted to 0, 1, or 2 cells (`thin` / `thick`); on
//! the grid a border edge always occupies one cell, so `border_width()`
//! saturates at 1 and the width only drives glyph selection.

use crate::css::color::Color;
use crate::css::number::Number;

/// The line style of one border edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderStyle {
    #[default]
    None,
    Solid,
    Dotted,
}

/// The corner flavor applied where two border edges meet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderType {
    #[default]
    Sharp,
    Rounded,
}

/// The glyphs used to draw one border configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxCharSet {
    pub vertical: char,
    pub horizontal: char,
    pub top_left: char,
    pub top_right: char,
    pub bottom_right: char,
    pub bottom_left: char,
}

const ROUNDED: BoxCharSet = BoxCharSet {
    vertical: '│',
    horizontal: '─',
    top_left: '╭',
    top_right: '╮',
    bottom_right: '╯',
    bottom_left: '╰',
};

const ROUNDED_BOLD: BoxCharSet = BoxCharSet {
    vertical: '┃',
    horizontal: '━',
    top_left: '┏',
    top_right: '┓',
    bottom_right: '┛',
    bottom_left: '┗',
};

// Sharp corners come from this set; the dotted strokes are only used when
// the border style is Dotted.
const DOTTED: BoxCharSet = BoxCharSet {
    vertical: '┆',
    horizontal: '┄',
    top_left: '┌',
    top_right: '┐',
    bottom_right: '┘',
    bottom_left: '└',
};

const DOTTED_BOLD: BoxCharSet = BoxCharSet {
    vertical: '┇',
    horizontal: '┉',
    top_left: '┏',
    top_right: '┓',
    bottom_right: '┛',
    bottom_left: '┗',
};

/// One border edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Border {
    pub width: Number,
    pub style: BorderStyle,
    pub color: Color,
}

impl Default for Border {
    fn default() -> Self {
        Self {
            width: Number::min(),
            style: BorderStyle::None,
            color: Color::DEFAULT,
        }
    }
}

impl Border {
    /// Parse `[thin|thick] (solid|dotted) <color>`; any component may be
    /// omitted. An empty value yields the default (no border).
    pub fn parse(value: &str) -> Border {
        let value = value.trim();
        if value.is_empty() {
            return Border::default();
        }

        let mut width = Number::fit();
        let mut rest = value;

        let prefix_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        match &rest[..prefix_end] {
            "thin" => {
                width = Number::Cells(1);
                rest = rest[prefix_end..].trim_start();
            }
            "thick" => {
                width = Number::Cells(2);
                rest = rest[prefix_end..].trim_start();
            }
            _ => {}
        }

        let style_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let style = parse_border_style(&rest[..style_end], BorderStyle::None);
        let color = Color::parse(rest[style_end..].trim_start(), Color::DEFAULT);

        Border { width, style, color }
    }

    /// The number of cells this edge occupies on the grid: 0 or 1.
    #[inline]
    pub fn border_width(&self) -> i32 {
        self.width.as_cell().min(1)
    }

    #[inline]
    pub fn is_thin(&self) -> bool {
        self.width.as_cell() == 1
    }

    #[inline]
    pub fn is_thick(&self) -> bool {
        self.width.as_cell() == 2
    }

    /// Select the box char set for this edge given a corner type.
    ///
    /// Pure function of (style, width, type): dotted styles swap the
    /// strokes, thick widths swap in the bold sets, rounded corners come
    /// from the rounded sets.
    pub fn char_set(&self, corner: BorderType) -> BoxCharSet {
        let mut horizontal = ROUNDED.horizontal;
        let mut vertical = ROUNDED.vertical;
        let (mut tl, mut tr, mut br, mut bl) = (
            DOTTED.top_left,
            DOTTED.top_right,
            DOTTED.bottom_right,
            DOTTED.bottom_left,
        );

        if corner == BorderType::Rounded {
            tl = ROUNDED.top_left;
            tr = ROUNDED.top_right;
            br = ROUNDED.bottom_right;
            bl = ROUNDED.bottom_left;
        }

        if self.style == BorderStyle::Dotted {
            horizontal = DOTTED.horizontal;
            vertical = DOTTED.vertical;
        }

        if self.width.as_cell() == 2 {
            if self.style == BorderStyle::Dotted {
                horizontal = DOTTED_BOLD.horizontal;
                vertical = DOTTED_BOLD.vertical;
            } else {
                horizontal = ROUNDED_BOLD.horizontal;
                vertical = ROUNDED_BOLD.vertical;
            }
            let set = if corner == BorderType::Rounded { ROUNDED_BOLD } else { DOTTED_BOLD };
            tl = set.top_left;
            tr = set.top_right;
            br = set.bottom_right;
            bl = set.bottom_left;
        }

        BoxCharSet {
            vertical,
            horizontal,
            top_left: tl,
            top_right: tr,
            bottom_right: br,
            bottom_left: bl,
        }
    }
}

fn parse_border_style(value: &str, default: BorderStyle) -> BorderStyle {
    match value {
        "solid" => BorderStyle::Solid,
        "dotted" => BorderStyle::Dotted,
        _ => default,
    }
}

/// Parse a `border-type` shorthand of 1–4 tokens drawn from
/// {`sharp`, `rounded`}, with the same 1/2/3/4 semantics as padding.
/// Returns corners in (top-left, top-right, bottom-right, bottom-left)
/// order.
pub fn parse_border_type(value: &str, default: BorderType) -> [BorderType; 4] {
    let value = value.trim();
    if value.is_empty() {
        return [default; 4];
    }

    let mut parts = [BorderType::Sharp; 4];
    let mut count = 0;
    for token in value.split_ascii_whitespace() {
        if count == 4 {
            break;
        }
        parts[count] = if token == "rounded" { BorderType::Rounded } else { BorderType::Sharp };
        count += 1;
    }

    match count {
        1 => [parts[0]; 4],
        2 => [parts[0], parts[1], parts[0], parts[1]],
        3 => [parts[0], parts[1], parts[2], BorderType::Sharp],
        _ => [parts[0], parts[1], parts[2], parts[3]],
    }
}

// ===========================================================================
// Tests
// ===========================================================================
