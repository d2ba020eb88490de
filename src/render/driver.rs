//! Crossterm-backed ANSI driver.
//!
//! The driver wraps any byte sink and queues the escape vocabulary the
//! flusher needs: cursor moves (1-based row;col on the wire), SGR reset
//! and colors (truecolor / 8-bit indexed / basic 4-bit), the text
//! attribute flags, screen clear, cursor visibility, and mouse-capture
//! opt-in. When the sink is not a display, control sequences are
//! suppressed and only raw glyph bytes are written.

use std::io::{self, BufWriter, IsTerminal, Stdout, Write};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::queue;
use crossterm::style::{
    Attribute, Color as TermColor, ResetColor, SetAttribute, SetBackgroundColor,
    SetForegroundColor,
};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
    LeaveAlternateScreen,
};

use crate::css::color::Color;
use crate::render::grid::PixelStyle;

/// An escape-sequence writer over a byte sink.
pub struct Driver<W: Write> {
    writer: W,
    is_display: bool,
}

impl Driver<BufWriter<Stdout>> {
    /// A driver over buffered stdout; display mode follows whether stdout
    /// is a terminal.
    pub fn stdout() -> Self {
        let is_display = io::stdout().is_terminal();
        Self {
            writer: BufWriter::new(io::stdout()),
            is_display,
        }
    }
}

impl<W: Write> Driver<W> {
    pub fn new(writer: W, is_display: bool) -> Self {
        Self { writer, is_display }
    }

    /// Whether control sequences are being emitted.
    pub fn is_display(&self) -> bool {
        self.is_display
    }

    /// Consume the driver and return the sink.
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Move the cursor to the 0-based cell `(x, y)`.
    pub fn move_to(&mut self, x: i32, y: i32) -> io::Result<()> {
        if !self.is_display {
            return Ok(());
        }
        queue!(self.writer, MoveTo(x.max(0) as u16, y.max(0) as u16))
    }

    /// SGR reset.
    pub fn reset(&mut self) -> io::Result<()> {
        if !self.is_display {
            return Ok(());
        }
        queue!(self.writer, ResetColor)
    }

    pub fn clear_screen(&mut self) -> io::Result<()> {
        if !self.is_display {
            return Ok(());
        }
        queue!(self.writer, Clear(ClearType::All))
    }

    pub fn hide_cursor(&mut self) -> io::Result<()> {
        if !self.is_display {
            return Ok(());
        }
        queue!(self.writer, Hide)
    }

    pub fn show_cursor(&mut self) -> io::Result<()> {
        if !self.is_display {
            return Ok(());
        }
        queue!(self.writer, Show)
    }

    pub fn enable_mouse_capture(&mut self) -> io::Result<()> {
        if !self.is_display {
            return Ok(());
        }
        queue!(self.writer, EnableMouseCapture)
    }

    pub fn disable_mouse_capture(&mut self) -> io::Result<()> {
        if !self.is_display {
            return Ok(());
        }
        queue!(self.writer, DisableMouseCapture)
    }

    /// Enter the alternate screen and raw mode.
    pub fn enter_alt_screen(&mut self) -> io::Result<()> {
        if !self.is_display {
            return Ok(());
        }
        queue!(self.writer, EnterAlternateScreen)?;
        self.writer.flush()?;
        enable_raw_mode()
    }

    /// Leave the alternate screen and raw mode.
    pub fn leave_alt_screen(&mut self) -> io::Result<()> {
        if !self.is_display {
            return Ok(());
        }
        disable_raw_mode()?;
        queue!(self.writer, LeaveAlternateScreen)?;
        self.writer.flush()
    }

    /// Queue the minimum SGR sequence for a cell style: foreground,
    /// background, then the attribute flags.
    pub fn apply_style(&mut self, style: &PixelStyle) -> io::Result<()> {
        if !self.is_display {
            return Ok(());
        }
        self.set_color(style.fg, true)?;
        self.set_color(style.bg, false)?;
        if style.bold {
            queue!(self.writer, SetAttribute(Attribute::Bold))?;
        }
        if style.dim {
            queue!(self.writer, SetAttribute(Attribute::Dim))?;
        }
        if style.italic {
            queue!(self.writer, SetAttribute(Attribute::Italic))?;
        }
        if style.underline {
            queue!(self.writer, SetAttribute(Attribute::Underlined))?;
        }
        Ok(())
    }

    /// Emit one color plane. Truecolor and 8-bit indexed colors go
    /// through crossterm; 4-bit colors use the classic `30–37`/`90–97`
    /// codes (crossterm would widen them to `38;5;n`), with the default
    /// sentinel as `39`/`49`. Transparent emits nothing.
    fn set_color(&mut self, color: Color, foreground: bool) -> io::Result<()> {
        match color {
            Color::Rgb { r, g, b } => {
                let color = TermColor::Rgb { r, g, b };
                if foreground {
                    queue!(self.writer, SetForegroundColor(color))
                } else {
                    queue!(self.writer, SetBackgroundColor(color))
                }
            }
            Color::Bit8(n) => {
                let color = TermColor::AnsiValue(n);
                if foreground {
                    queue!(self.writer, SetForegroundColor(color))
                } else {
                    queue!(self.writer, SetBackgroundColor(color))
                }
            }
            Color::Bit4(n) => {
                let base: u16 = if foreground { 0 } else { 10 };
                let code = if n >= 16 {
                    39 + base
                } else if n < 8 {
                    30 + base + n as u16
                } else {
                    90 + base + (n - 8) as u16
                };
                write!(self.writer, "\x1b[{code}m")
            }
            Color::Transparent => Ok(()),
        }
    }

    /// Write one glyph. Glyphs are written even in non-display mode.
    pub fn write_glyph(&mut self, glyph: char) -> io::Result<()> {
        let mut buf = [0u8; 4];
        self.writer.write_all(glyph.encode_utf8(&mut buf).as_bytes())
    }

    /// Write a raw string of glyphs.
    pub fn write_str(&mut self, text: &str) -> io::Result<()> {
        self.writer.write_all(text.as_bytes())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
