//! Tagged lengths and four-sided quad properties.
//!
//! A [`Number`] is either `fit` (size to content), an integer cell count,
//! or a percentage of some parent dimension. Percentages stay symbolic
//! until a layout pass resolves them against a concrete parent size.

/// A tagged length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// Size to content ("fit").
    Fit,
    /// Percentage of the parent dimension.
    Percent(f32),
    /// Absolute cell count.
    Cells(i32),
}

impl Number {
    /// The `fit` value.
    #[inline]
    pub const fn fit() -> Self {
        Number::Fit
    }

    /// Zero cells; the neutral minimum bound.
    #[inline]
    pub const fn min() -> Self {
        Number::Cells(0)
    }

    /// The largest representable cell count; the neutral maximum bound.
    #[inline]
    pub const fn max() -> Self {
        Number::Cells(i32::MAX)
    }

    /// Parse a length value: `fit` | `N(px|c|cell)` | `N%`.
    ///
    /// Integer `N`; negatives are accepted on cell units. Anything
    /// malformed (including a bare `fit`) yields `default`.
    pub fn parse(value: &str, default: Number) -> Number {
        let value = value.trim();
        if value.is_empty() || value == "fit" {
            return default;
        }

        if let Some(body) = value.strip_suffix('%') {
            return body
                .trim()
                .parse::<f32>()
                .map(Number::Percent)
                .unwrap_or(default);
        }

        let (negative, rest) = match value.strip_prefix('-') {
            Some(rest) => (true, rest.trim_start()),
            None => (false, value),
        };
        if rest.is_empty() {
            return default;
        }

        let digits_end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let Ok(cells) = rest[..digits_end].parse::<i32>() else {
            return default;
        };
        match &rest[digits_end..] {
            "px" | "c" | "cell" => Number::Cells(if negative { -cells } else { cells }),
            _ => default,
        }
    }

    /// Resolve a percentage against `parent`; `Fit` and `Cells` pass
    /// through unchanged.
    #[inline]
    pub fn resolve_percent(self, parent: i32) -> Number {
        match self {
            Number::Percent(p) => Number::Cells((parent as f32 * p / 100.0).round() as i32),
            other => other,
        }
    }

    /// Resolve both `Fit` (to `parent` cells) and percentages.
    #[inline]
    pub fn resolve_all(self, parent: i32) -> Number {
        match self {
            Number::Fit => Number::Cells(parent),
            other => other.resolve_percent(parent),
        }
    }

    /// The cell count, or 0 for unresolved values.
    #[inline]
    pub fn as_cell(self) -> i32 {
        match self {
            Number::Cells(c) => c,
            _ => 0,
        }
    }

    #[inline]
    pub fn is_cells(self) -> bool {
        matches!(self, Number::Cells(_))
    }

    #[inline]
    pub fn is_percent(self) -> bool {
        matches!(self, Number::Percent(_))
    }

    #[inline]
    pub fn is_fit(self) -> bool {
        matches!(self, Number::Fit)
    }
}

impl Default for Number {
    fn default() -> Self {
        Number::Fit
    }
}

// ---------------------------------------------------------------------------
// QuadProperty
// ---------------------------------------------------------------------------

/// Four [`Number`]s, one per side, used for padding, margin, and inset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadProperty {
    pub top: Number,
    pub right: Number,
    pub bottom: Number,
    pub left: Number,
}

impl QuadProperty {
    /// Create a quad with explicit per-side values.
    pub const fn new(top: Number, right: Number, bottom: Number, left: Number) -> Self {
        Self { top, right, bottom, left }
    }

    /// Resolve every side (both `fit` and percentages) against `parent`.
    pub fn resolve(self, parent: i32) -> QuadProperty {
        QuadProperty {
            top: self.top.resolve_all(parent),
            right: self.right.resolve_all(parent),
            bottom: self.bottom.resolve_all(parent),
            left: self.left.resolve_all(parent),
        }
    }

    /// Total resolved vertical extent: `top + bottom`.
    pub fn vertical(&self) -> i32 {
        self.top.as_cell() + self.bottom.as_cell()
    }

    /// Total resolved horizontal extent: `left + right`.
    pub fn horizontal(&self) -> i32 {
        self.left.as_cell() + self.right.as_cell()
    }

    /// Parse a CSS shorthand list of 1–4 numbers:
    ///
    /// - 1 value: all sides
    /// - 2 values: vertical, horizontal
    /// - 3 values: top, horizontal, bottom
    /// - 4 values: top, right, bottom, left
    pub fn parse(value: &str, default: QuadProperty) -> QuadProperty {
        let value = value.trim();
        if value.is_empty() {
            return default;
        }

        let mut parts = [Number::min(); 4];
        let mut count = 0;
        for token in value.split_ascii_whitespace() {
            if count == 4 {
                break;
            }
            parts[count] = Number::parse(token, Number::min());
            count += 1;
        }

        match count {
            1 => QuadProperty::new(parts[0], parts[0], parts[0], parts[0]),
            2 => QuadProperty::new(parts[0], parts[1], parts[0], parts[1]),
            3 => QuadProperty::new(parts[0], parts[1], parts[2], parts[1]),
            4 => QuadProperty::new(parts[0], parts[1], parts[2], parts[3]),
            _ => default,
        }
    }
}

impl Default for QuadProperty {
    fn default() -> Self {
        Self {
            top: Number::min(),
            right: Number::min(),
            bottom: Number::min(),
            left: Number::min(),
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
