//! Terminal colors: truecolor, 4-bit, 8-bit, transparent.
//!
//! The value grammar accepted by [`Color::parse`]:
//! `#rgb` / `#rrggbb`, `rgb(r, g, b)`, `hsl(h, s, l)`, `bit(n)` for 8-bit
//! indexed, the named 4-bit colors (`black` … `white`) and their `light-*`
//! variants, plus `default` and `transparent`. Malformed values fall back
//! to the caller-supplied default; parsing never fails loudly.

/// A terminal color.
///
/// `Bit4` carries the basic palette index 0–15 plus the sentinel `16`,
/// which stands for the terminal's default color (SGR 39/49).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Rgb { r: u8, g: u8, b: u8 },
    Bit4(u8),
    Bit8(u8),
    Transparent,
}

impl Color {
    pub const BLACK: Color = Color::Bit4(0);
    pub const RED: Color = Color::Bit4(1);
    pub const GREEN: Color = Color::Bit4(2);
    pub const YELLOW: Color = Color::Bit4(3);
    pub const BLUE: Color = Color::Bit4(4);
    pub const MAGENTA: Color = Color::Bit4(5);
    pub const CYAN: Color = Color::Bit4(6);
    pub const WHITE: Color = Color::Bit4(7);
    pub const BRIGHT_BLACK: Color = Color::Bit4(8);
    pub const BRIGHT_RED: Color = Color::Bit4(9);
    pub const BRIGHT_GREEN: Color = Color::Bit4(10);
    pub const BRIGHT_YELLOW: Color = Color::Bit4(11);
    pub const BRIGHT_BLUE: Color = Color::Bit4(12);
    pub const BRIGHT_MAGENTA: Color = Color::Bit4(13);
    pub const BRIGHT_CYAN: Color = Color::Bit4(14);
    pub const BRIGHT_WHITE: Color = Color::Bit4(15);
    /// The terminal's configured default color.
    pub const DEFAULT: Color = Color::Bit4(16);

    /// Whether this is the transparent sentinel.
    #[inline]
    pub const fn is_transparent(&self) -> bool {
        matches!(self, Color::Transparent)
    }

    /// Parse a color value, falling back to `default` on anything
    /// unrecognized.
    pub fn parse(value: &str, default: Color) -> Color {
        let value = value.trim();
        if value.is_empty() {
            return default;
        }

        if let Some(hex) = value.strip_prefix('#') {
            return parse_hex(hex).unwrap_or(default);
        }
        if let Some(args) = value.strip_prefix("rgb") {
            let mut parts = [0.0f32; 3];
            parse_components(args, &mut parts);
            return Color::Rgb {
                r: parts[0] as u8,
                g: parts[1] as u8,
                b: parts[2] as u8,
            };
        }
        if let Some(args) = value.strip_prefix("bit") {
            let mut parts = [0.0f32; 1];
            parse_components(args, &mut parts);
            return Color::Bit8(parts[0] as u8);
        }
        if let Some(args) = value.strip_prefix("hsl") {
            let mut parts = [0.0f32; 3];
            parse_components(args, &mut parts);
            let (r, g, b) = hsl_to_rgb(parts[0], parts[1], parts[2]);
            return Color::Rgb { r, g, b };
        }

        match value {
            "transparent" => Color::Transparent,
            "default" => Color::DEFAULT,
            "black" => Color::BLACK,
            "red" => Color::RED,
            "green" => Color::GREEN,
            "yellow" => Color::YELLOW,
            "blue" => Color::BLUE,
            "magenta" => Color::MAGENTA,
            "cyan" => Color::CYAN,
            "white" => Color::WHITE,
            "light-black" => Color::BRIGHT_BLACK,
            "light-red" => Color::BRIGHT_RED,
            "light-green" => Color::BRIGHT_GREEN,
            "light-yellow" => Color::BRIGHT_YELLOW,
            "light-blue" => Color::BRIGHT_BLUE,
            "light-magenta" => Color::BRIGHT_MAGENTA,
            "light-cyan" => Color::BRIGHT_CYAN,
            "light-white" => Color::BRIGHT_WHITE,
            _ => default,
        }
    }
}

/// Parse a hex color body (without the leading `#`).
///
/// Supports 6-digit (`rrggbb`) and 3-digit (`rgb`, each digit expanded to
/// `dd`) forms.
fn parse_hex(hex: &str) -> Option<Color> {
    match hex.len() {
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(Color::Rgb { r, g, b })
        }
        3 => {
            let r = u8::from_str_radix(&hex[0..1], 16).ok()?;
            let g = u8::from_str_radix(&hex[1..2], 16).ok()?;
            let b = u8::from_str_radix(&hex[2..3], 16).ok()?;
            Some(Color::Rgb {
                r: r * 16 + r,
                g: g * 16 + g,
                b: b * 16 + b,
            })
        }
        _ => None,
    }
}

/// Scan numeric components out of an argument list like `(255, 0, 10)`.
///
/// Anything that is not a digit or `.` separates components; a `)` stops
/// the scan. Missing components stay zero.
fn parse_components(args: &str, out: &mut [f32]) {
    let bytes = args.as_bytes();
    let mut i = 0;
    let mut k = 0;

    while k < out.len() && i < bytes.len() {
        while i < bytes.len() {
            let b = bytes[i];
            if b == b')' {
                return;
            }
            if b.is_ascii_digit() || b == b'.' {
                break;
            }
            i += 1;
        }

        let start = i;
        while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
            i += 1;
        }
        if start == i {
            return;
        }
        if let Ok(v) = args[start..i].parse::<f32>() {
            out[k] = v;
        }
        k += 1;
    }
}

/// Convert HSL (`h` in degrees, `s`/`l` in percent) to sRGB via the
/// standard formula.
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> (u8, u8, u8) {
    fn hue_to_rgb(p: f32, q: f32, mut t: f32) -> f32 {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        if t * 6.0 < 1.0 {
            return p + (q - p) * 6.0 * t;
        }
        if t * 2.0 < 1.0 {
            return q;
        }
        if t * 3.0 < 2.0 {
            return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
        }
        p
    }

    let th = h / 360.0;
    let ts = s / 100.0;
    let tl = l / 100.0;

    let (r, g, b);
    if ts <= 0.00001 {
        r = tl;
        g = tl;
        b = tl;
    } else {
        let q = if tl < 0.5 { tl * (1.0 + ts) } else { tl + ts - tl * ts };
        let p = 2.0 * tl - q;
        r = hue_to_rgb(p, q, th + 1.0 / 3.0);
        g = hue_to_rgb(p, q, th);
        b = hue_to_rgb(p, q, th - 1.0 / 3.0);
    }

    ((r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8)
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // Hex
    // -----------------------------------------------------------------------

    #[test]
    fn parse_hex_6digit() {
        assert_eq!(
            Color::parse("#ff0000", Color::DEFAULT),
            Color::Rgb { r: 255, g: 0, b: 0 }
        );
    }

    #[test]
    fn parse_hex_3digit_expands() {
        assert_eq!(
            Color::parse("#abc", Color::DEFAULT),
            Color::Rgb { r: 0xaa, g: 0xbb, b: 0xcc }
        );
    }

    #[test]
    fn parse_hex_invalid_falls_back() {
        assert_eq!(Color::parse("#ff00", Color::RED), Color::RED);
        assert_eq!(Color::parse("#gghhii", Color::RED), Color::RED);
    }

    // -----------------------------------------------------------------------
    // Functional notations
    // -----------------------------------------------------------------------

    #[test]
    fn parse_rgb() {
        assert_eq!(
            Color::parse("rgb(255, 136, 0)", Color::DEFAULT),
            Color::Rgb { r: 255, g: 136, b: 0 }
        );
    }

    #[test]
    fn parse_rgb_missing_components_are_zero() {
        assert_eq!(
            Color::parse("rgb(7)", Color::DEFAULT),
            Color::Rgb { r: 7, g: 0, b: 0 }
        );
    }

    #[test]
    fn parse_bit8() {
        assert_eq!(Color::parse("bit(208)", Color::DEFAULT), Color::Bit8(208));
    }

    #[test]
    fn parse_hsl_red() {
        assert_eq!(
            Color::parse("hsl(0, 100, 50)", Color::DEFAULT),
            Color::Rgb { r: 255, g: 0, b: 0 }
        );
    }

    #[test]
    fn parse_hsl_grey_when_unsaturated() {
        let Color::Rgb { r, g, b } = Color::parse("hsl(120, 0, 50)", Color::DEFAULT) else {
            panic!("expected rgb");
        };
        assert_eq!(r, g);
        assert_eq!(g, b);
    }

    // -----------------------------------------------------------------------
    // Named colors & sentinels
    // -----------------------------------------------------------------------

    #[test]
    fn parse_named() {
        assert_eq!(Color::parse("red", Color::DEFAULT), Color::RED);
        assert_eq!(Color::parse("light-blue", Color::DEFAULT), Color::BRIGHT_BLUE);
        assert_eq!(Color::parse("white", Color::DEFAULT), Color::WHITE);
    }

    #[test]
    fn parse_sentinels() {
        assert_eq!(Color::parse("default", Color::RED), Color::DEFAULT);
        assert_eq!(Color::parse("transparent", Color::RED), Color::Transparent);
        assert!(Color::parse("transparent", Color::RED).is_transparent());
    }

    #[test]
    fn parse_unknown_falls_back() {
        assert_eq!(Color::parse("rainbow", Color::GREEN), Color::GREEN);
        assert_eq!(Color::parse("", Color::GREEN), Color::GREEN);
        assert_eq!(Color::parse("  red  ", Color::GREEN), Color::RED);
    }

    // -----------------------------------------------------------------------
    // Equality
    // -----------------------------------------------------------------------

    #[test]
    fn equality_is_tag_and_payload() {
        assert_eq!(Color::Bit4(3), Color::Bit4(3));
        assert_ne!(Color::Bit4(3), Color::Bit8(3));
        assert_ne!(Color::Rgb { r: 1, g: 2, b: 3 }, Color::Rgb { r: 1, g: 2, b: 4 });
        assert_eq!(Color::Transparent, Color::Transparent);
    }
}
