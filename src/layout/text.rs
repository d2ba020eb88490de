//! The text layouter: single-pass word wrapping into line boxes.
//!
//! Widths are measured in UTF-8 code points (one code point ≈ one cell).
//! The layouter walks the text once, emitting a [`LineBox`] per word (and
//! per preserved whitespace cell under `pre`/`pre-wrap`), wrapping at the
//! container's right edge. `nowrap` suppresses all implicit wrapping;
//! `break-word` splits words wider than a full line.

use crate::css::style::{OverflowWrap, Style, Whitespace};
use crate::dom::TextSlice;
use crate::geometry::{BoundingBox, Point};
use crate::layout::line_box::{LineBox, LineSpan};

/// The intrinsic width of a text run: the maximum code-point count of any
/// `\n`-separated segment.
pub fn measure_width(text: &str) -> i32 {
    text.split('\n')
        .map(|segment| segment.chars().count())
        .max()
        .unwrap_or(0) as i32
}

/// The byte index of the next whitespace at or after `from`, or
/// `text.len()`.
pub fn find_word(text: &str, from: usize) -> usize {
    text.as_bytes()[from..]
        .iter()
        .position(|b| b.is_ascii_whitespace())
        .map(|i| from + i)
        .unwrap_or(text.len())
}

/// The outcome of laying out one text run.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextLayout {
    /// The emitted lines, as a span into the caller's line array.
    pub span: LineSpan,
    /// Rows consumed, counting the final (still open) row.
    pub height: i32,
}

/// Lays one text run into line boxes.
///
/// `container` is the wrapping region; `start` is the cursor inside it
/// (the two differ when the run continues an inline flow). After
/// [`layout`](Self::layout) returns, `start` holds the cursor position
/// after the last glyph.
#[derive(Debug)]
pub struct TextLayouter {
    pub slice: TextSlice,
    pub container: BoundingBox,
    pub start: Point,
}

impl TextLayouter {
    /// Lay `text` (the resolved characters of `self.slice`) into `lines`.
    ///
    /// `previous_word_line`, when set, is the index of the previous inline
    /// sibling's last line box; if this run starts exactly where that line
    /// ended and the joined word would overflow the row, the previous line
    /// is moved down first so the word stays unbroken.
    pub fn layout(
        &mut self,
        text: &str,
        lines: &mut Vec<LineBox>,
        previous_word_line: Option<usize>,
        style: &Style,
    ) -> TextLayout {
        let line_start = lines.len() as u32;
        let empty = TextLayout {
            span: LineSpan { start: line_start, size: 0 },
            height: 0,
        };

        if self.container.width == 0 || self.container.height == 0 {
            return empty;
        }
        if style.content_width() == 0 {
            return empty;
        }

        let mut x = self.start.x;
        let mut y = self.start.y;
        if x < self.container.min_x() || y < self.container.min_y() {
            return empty;
        }

        let len = text.chars().count() as i32;
        let nowrap = style.whitespace == Whitespace::NoWrap;
        let max_x = self.container.max_x() as i64;
        let max_y = self.container.max_y();

        // Continuation of an inline run: if the adjoining previous word
        // ends exactly at the cursor and the joined token overflows the
        // row, move the previous word down with us.
        if !nowrap {
            if let Some(previous) = previous_word_line {
                if lines.len() == previous + 1 {
                    let line = &mut lines[previous];
                    if line.bounds.max_x() == x
                        && line.bounds.min_y() == y
                        && (line.bounds.max_x() as i64 + len as i64) >= max_x
                    {
                        line.bounds.x = self.container.min_x();
                        line.bounds.y += 1;
                        x = line.bounds.max_x();
                        y = line.bounds.y;
                    }
                }
            }
        }

        let start_y = y;

        // Fast path: the whole run fits on the current row.
        if nowrap || (!text.contains('\n') && (x as i64 + len as i64) < max_x) {
            lines.push(LineBox {
                slice: self.slice,
                bounds: BoundingBox::new(x, y, len, 1),
            });
            self.start = Point::new(x + len, y);
            return TextLayout {
                span: LineSpan { start: line_start, size: 1 },
                height: 1,
            };
        }

        let preserve = matches!(style.whitespace, Whitespace::Pre | Whitespace::PreWrap);
        let bytes = text.as_bytes();
        let mut i = 0usize;

        while i < text.len() {
            if y >= max_y {
                break;
            }

            let b = bytes[i];
            if b.is_ascii_whitespace() {
                if (x as i64 + 1) >= max_x {
                    y += 1;
                    x = self.container.min_x();
                    if y >= max_y {
                        break;
                    }
                }
                let render = preserve || x != self.container.min_x();
                if render {
                    if b == b'\n' {
                        x = self.container.min_x();
                        y += 1;
                    } else {
                        if preserve {
                            lines.push(LineBox {
                                slice: self.slice.subslice(i..i + 1),
                                bounds: BoundingBox::new(x, y, 1, 1),
                            });
                        }
                        x += 1;
                    }
                }
                i += 1;
                continue;
            }

            let end = find_word(text, i);
            let word = &text[i..end];
            let word_width = word.chars().count() as i32;

            if (x as i64 + word_width as i64) > max_x && x != self.container.min_x() {
                y += 1;
                x = self.container.min_x();
                if y >= max_y {
                    break;
                }
            }

            if style.overflow_wrap == OverflowWrap::BreakWord
                && (x as i64 + word_width as i64) > max_x
            {
                // The word is wider than a full line: split it cell by
                // cell, each fragment becoming its own line box.
                let mut fragment_start = i;
                let mut fragment_x = x;
                let mut width = 0;
                let mut truncated = false;
                for (offset, _) in word.char_indices() {
                    if x as i64 >= max_x {
                        lines.push(LineBox {
                            slice: self.slice.subslice(fragment_start..i + offset),
                            bounds: BoundingBox::new(fragment_x, y, width, 1),
                        });
                        y += 1;
                        x = self.container.min_x();
                        fragment_x = x;
                        fragment_start = i + offset;
                        width = 0;
                        if y >= max_y {
                            truncated = true;
                            break;
                        }
                    }
                    x += 1;
                    width += 1;
                }
                if !truncated && fragment_start < end {
                    lines.push(LineBox {
                        slice: self.slice.subslice(fragment_start..end),
                        bounds: BoundingBox::new(fragment_x, y, width, 1),
                    });
                }
            } else {
                lines.push(LineBox {
                    slice: self.slice.subslice(i..end),
                    bounds: BoundingBox::new(x, y, word_width, 1),
                });
                x += word_width;
            }
            i = end;
        }

        self.start = Point::new(x, y);
        let final_y = y.min(max_y - 1);
        TextLayout {
            span: LineSpan {
                start: line_start,
                size: lines.len() as u32 - line_start,
            },
            height: (final_y - start_y + 1).max(0),
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::number::Number;

    fn text_style(width: i32) -> Style {
        let mut style = Style::default();
        style.width = Number::Cells(width);
        style
    }

    /// Run the layouter over `text` inside `container`, starting at
    /// `start`. Returns the boxes plus the final cursor.
    fn lay(
        text: &str,
        container: BoundingBox,
        start: Point,
        style: &Style,
    ) -> (Vec<LineBox>, TextLayout, Point) {
        let mut lines = Vec::new();
        let mut layouter = TextLayouter {
            slice: TextSlice::source(0..text.len()),
            container,
            start,
        };
        let result = layouter.layout(text, &mut lines, None, style);
        (lines, result, layouter.start)
    }

    fn line_text<'a>(text: &'a str, lb: &LineBox) -> &'a str {
        lb.slice.resolve(text, &[])
    }

    // -----------------------------------------------------------------------
    // Measurement helpers
    // -----------------------------------------------------------------------

    #[test]
    fn measure_single_segment() {
        assert_eq!(measure_width("hello"), 5);
        assert_eq!(measure_width(""), 0);
    }

    #[test]
    fn measure_takes_longest_segment() {
        assert_eq!(measure_width("ab\nlonger\nc"), 6);
    }

    #[test]
    fn measure_counts_code_points() {
        assert_eq!(measure_width("héllo"), 5);
        assert_eq!(measure_width("⚠️"), 2); // U+26A0 U+FE0F
    }

    #[test]
    fn find_word_basics() {
        assert_eq!(find_word("hello world", 0), 5);
        assert_eq!(find_word("hello world", 6), 11);
        assert_eq!(find_word("hello", 0), 5);
        assert_eq!(find_word("a\tb", 0), 1);
    }

    // -----------------------------------------------------------------------
    // Fast path
    // -----------------------------------------------------------------------

    #[test]
    fn single_line_fits() {
        let container = BoundingBox::new(0, 0, 50, 50);
        let (lines, result, end) =
            lay("hello", container, Point::new(0, 0), &text_style(5));
        assert_eq!(lines.len(), 1);
        assert_eq!(line_text("hello", &lines[0]), "hello");
        assert_eq!(lines[0].bounds, BoundingBox::new(0, 0, 5, 1));
        assert_eq!(result.height, 1);
        assert_eq!(end, Point::new(5, 0));
    }

    #[test]
    fn zero_size_container_emits_nothing() {
        let (lines, result, _) = lay(
            "hello",
            BoundingBox::new(0, 0, 0, 10),
            Point::new(0, 0),
            &text_style(5),
        );
        assert!(lines.is_empty());
        assert_eq!(result.height, 0);
        assert!(result.span.is_empty());
    }

    #[test]
    fn zero_content_width_emits_nothing() {
        let (lines, ..) = lay(
            "hello",
            BoundingBox::new(0, 0, 10, 10),
            Point::new(0, 0),
            &text_style(0),
        );
        assert!(lines.is_empty());
    }

    // -----------------------------------------------------------------------
    // Word wrapping
    // -----------------------------------------------------------------------

    #[test]
    fn wraps_on_whitespace() {
        let container = BoundingBox::new(0, 0, 10, 5);
        let text = "hello world again";
        let (lines, result, _) = lay(text, container, Point::new(0, 0), &text_style(10));
        assert_eq!(lines.len(), 3);
        assert_eq!(line_text(text, &lines[0]), "hello");
        assert_eq!(lines[0].bounds, BoundingBox::new(0, 0, 5, 1));
        assert_eq!(line_text(text, &lines[1]), "world");
        assert_eq!(lines[1].bounds, BoundingBox::new(0, 1, 5, 1));
        assert_eq!(line_text(text, &lines[2]), "again");
        assert_eq!(lines[2].bounds, BoundingBox::new(0, 2, 5, 1));
        assert_eq!(result.height, 3);
    }

    #[test]
    fn line_box_width_equals_code_point_count() {
        let container = BoundingBox::new(0, 0, 8, 10);
        let text = "héllo wörld ab";
        let (lines, ..) = lay(text, container, Point::new(0, 0), &text_style(8));
        for lb in &lines {
            assert_eq!(
                lb.bounds.width as usize,
                line_text(text, lb).chars().count()
            );
            assert_eq!(lb.bounds.height, 1);
        }
    }

    #[test]
    fn stops_at_container_bottom() {
        let container = BoundingBox::new(0, 0, 4, 2);
        let text = "aa bb cc dd ee";
        let (lines, result, _) = lay(text, container, Point::new(0, 0), &text_style(4));
        assert_eq!(result.height, 2);
        for lb in &lines {
            assert!(lb.bounds.y < 2);
        }
    }

    #[test]
    fn mid_row_start_wraps_back_to_container_left() {
        let container = BoundingBox::new(0, 0, 10, 5);
        let text = "world";
        let (lines, ..) = lay(text, container, Point::new(7, 0), &text_style(5));
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].bounds, BoundingBox::new(0, 1, 5, 1));
    }

    // -----------------------------------------------------------------------
    // Whitespace modes
    // -----------------------------------------------------------------------

    #[test]
    fn nowrap_never_wraps() {
        let mut style = text_style(30);
        style.whitespace = Whitespace::NoWrap;
        let container = BoundingBox::new(0, 0, 10, 5);
        let text = "hello world again";
        let (lines, result, end) = lay(text, container, Point::new(0, 0), &style);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].bounds.y, 0);
        assert_eq!(result.height, 1);
        assert_eq!(end.y, 0);
    }

    #[test]
    fn pre_emits_whitespace_boxes_and_round_trips() {
        let mut style = text_style(20);
        style.whitespace = Whitespace::Pre;
        let container = BoundingBox::new(0, 0, 20, 10);
        let text = "ab  cd\nef";
        let (lines, ..) = lay(text, container, Point::new(0, 0), &style);
        let joined: String = lines.iter().map(|lb| line_text(text, lb)).collect();
        // Concatenated glyphs equal the original, modulo the newline.
        assert_eq!(joined, "ab  cdef");
        // The newline moved the cursor down.
        let ef = lines.last().unwrap();
        assert_eq!(ef.bounds.y, 1);
        assert_eq!(ef.bounds.x, 0);
    }

    #[test]
    fn normal_mode_emits_no_whitespace_boxes() {
        let container = BoundingBox::new(0, 0, 50, 5);
        // Wide container, but force the slow path with a newline.
        let text = "a b\nc";
        let (lines, ..) = lay(text, container, Point::new(0, 0), &text_style(50));
        let texts: Vec<_> = lines.iter().map(|lb| line_text(text, lb)).collect();
        assert_eq!(texts, vec!["a", "b", "c"]);
    }

    #[test]
    fn leading_whitespace_at_line_start_is_swallowed() {
        let container = BoundingBox::new(0, 0, 10, 5);
        // The newline forces the slow path.
        let text = " abc\nd";
        let (lines, ..) = lay(text, container, Point::new(0, 0), &text_style(10));
        assert_eq!(line_text(text, &lines[0]), "abc");
        assert_eq!(lines[0].bounds.x, 0);
    }

    // -----------------------------------------------------------------------
    // break-word
    // -----------------------------------------------------------------------

    #[test]
    fn break_word_splits_long_words() {
        let mut style = text_style(4);
        style.overflow_wrap = OverflowWrap::BreakWord;
        let container = BoundingBox::new(0, 0, 4, 10);
        let text = "abcdefghij";
        let (lines, result, _) = lay(text, container, Point::new(0, 0), &style);
        assert_eq!(lines.len(), 3);
        assert_eq!(line_text(text, &lines[0]), "abcd");
        assert_eq!(line_text(text, &lines[1]), "efgh");
        assert_eq!(line_text(text, &lines[2]), "ij");
        assert_eq!(lines[1].bounds, BoundingBox::new(0, 1, 4, 1));
        assert_eq!(result.height, 3);
    }

    #[test]
    fn break_word_fragments_cover_all_glyphs() {
        let mut style = text_style(3);
        style.overflow_wrap = OverflowWrap::BreakWord;
        let container = BoundingBox::new(0, 0, 3, 10);
        let text = "αβγδεζη"; // multi-byte code points
        let (lines, ..) = lay(text, container, Point::new(0, 0), &style);
        let joined: String = lines.iter().map(|lb| line_text(text, lb)).collect();
        assert_eq!(joined, text);
    }

    #[test]
    fn without_break_word_long_word_overflows() {
        let container = BoundingBox::new(0, 0, 4, 10);
        let text = "abcdefghij\nx";
        let (lines, ..) = lay(text, container, Point::new(0, 0), &text_style(4));
        // One oversized box; clipping happens at render time.
        assert_eq!(line_text(text, &lines[0]), "abcdefghij");
        assert_eq!(lines[0].bounds.width, 10);
    }

    // -----------------------------------------------------------------------
    // Inline continuation
    // -----------------------------------------------------------------------

    #[test]
    fn continuation_moves_previous_word_down() {
        let container = BoundingBox::new(0, 0, 10, 5);
        let full = "wordtail";
        // Simulate the previous sibling having emitted "word" ending at
        // x=7 on row 0.
        let mut lines = vec![LineBox {
            slice: TextSlice::source(0..4),
            bounds: BoundingBox::new(3, 0, 4, 1),
        }];
        let mut layouter = TextLayouter {
            slice: TextSlice::source(4..8),
            container,
            start: Point::new(7, 0),
        };
        let style = text_style(4);
        layouter.layout(&full[4..8], &mut lines, Some(0), &style);

        // "word" moved to the next row's start, "tail" follows it.
        assert_eq!(lines[0].bounds, BoundingBox::new(0, 1, 4, 1));
        assert_eq!(lines[1].bounds, BoundingBox::new(4, 1, 4, 1));
    }

    #[test]
    fn no_continuation_when_cursor_does_not_adjoin() {
        let container = BoundingBox::new(0, 0, 10, 5);
        let mut lines = vec![LineBox {
            slice: TextSlice::source(0..4),
            bounds: BoundingBox::new(0, 0, 4, 1),
        }];
        let mut layouter = TextLayouter {
            slice: TextSlice::source(0..2),
            container,
            start: Point::new(6, 0),
        };
        layouter.layout("ab", &mut lines, Some(0), &text_style(2));
        assert_eq!(lines[0].bounds, BoundingBox::new(0, 0, 4, 1));
    }
}
