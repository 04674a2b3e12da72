use core::fmt::{self, Write as _};
use embedded_io_async::Write as AsyncWrite;
use heapless::String;

use crate::terminal::TerminalConfig;

const BACKSPACE: u8 = 0x08;

/// Cursor-tracking terminal writer.
///
/// Every byte written through it updates a model of the peer's cursor
/// (1-based column and row), and cursor/screen operations emit the matching
/// CSI sequence. Each public operation flushes before returning.
pub struct TerminalWriter<'a, W: AsyncWrite> {
    writer: &'a mut W,
    rows: usize,
    cols: usize,
    column: usize,
    row: usize,
    fg_color: Option<u8>,
    saved: (usize, usize),
}

impl<'a, W: AsyncWrite> TerminalWriter<'a, W> {
    /// Create a new terminal writer with the cursor assumed at (1, 1)
    pub fn new(writer: &'a mut W, config: &TerminalConfig) -> Self {
        Self {
            writer,
            rows: config.rows,
            cols: config.cols,
            column: 1,
            row: 1,
            fg_color: None,
            saved: (1, 1),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Tracked cursor column (1-based)
    pub fn column(&self) -> usize {
        self.column
    }

    /// Tracked cursor row (1-based)
    pub fn row(&self) -> usize {
        self.row
    }

    /// Last foreground colour sent to the terminal, if any
    pub fn color(&self) -> Option<u8> {
        self.fg_color
    }

    async fn send(&mut self, bytes: &[u8]) -> Result<(), W::Error> {
        self.writer.write_all(bytes).await?;
        self.writer.flush().await
    }

    async fn csi(&mut self, args: fmt::Arguments<'_>) -> Result<(), W::Error> {
        let mut cmd = String::<48>::new();
        let _ = cmd.push_str("\x1b[");
        let _ = cmd.write_fmt(args);
        self.send(cmd.as_bytes()).await
    }

    fn track(&mut self, byte: u8) {
        match byte {
            b'\n' => {
                if self.row < self.rows {
                    self.row += 1;
                }
                self.column = 1;
            }
            b'\r' => self.column = 1,
            BACKSPACE => self.column = self.column.saturating_sub(1).max(1),
            _ => self.column += 1,
        }
    }

    /// Write a single byte
    pub async fn write_char(&mut self, c: u8) -> Result<(), W::Error> {
        self.write_bytes(&[c]).await
    }

    /// Write raw bytes, tracking the cursor for each one
    pub async fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), W::Error> {
        for &byte in bytes {
            self.track(byte);
        }
        self.send(bytes).await
    }

    /// Write a string
    pub async fn write_str(&mut self, s: &str) -> Result<(), W::Error> {
        self.write_bytes(s.as_bytes()).await
    }

    /// Write a line (adds \r\n)
    pub async fn write_line(&mut self, s: &str) -> Result<(), W::Error> {
        self.write_str(s).await?;
        self.write_str("\r\n").await
    }

    /// Clear the screen and home the cursor
    pub async fn clear_screen(&mut self) -> Result<(), W::Error> {
        self.send(b"\x1b[2J\x1b[H").await?;
        self.column = 1;
        self.row = 1;
        Ok(())
    }

    /// Clear from the cursor to the end of the line
    pub async fn clear_to_end_of_line(&mut self) -> Result<(), W::Error> {
        self.send(b"\x1b[K").await
    }

    /// Select a foreground colour and effect (see [`colors`] and [`effects`]).
    ///
    /// Nothing is sent when `color` is already the active colour.
    pub async fn set_color(&mut self, color: u8, effect: u8) -> Result<(), W::Error> {
        if self.fg_color == Some(color) {
            return Ok(());
        }
        self.csi(format_args!("{};{}m", effect, color)).await?;
        self.fg_color = Some(color);
        Ok(())
    }

    /// Reset text formatting
    pub async fn reset_format(&mut self) -> Result<(), W::Error> {
        self.send(b"\x1b[0m").await?;
        self.fg_color = None;
        Ok(())
    }

    /// Move the cursor to column `x`, row `y`
    pub async fn move_to(&mut self, x: usize, y: usize) -> Result<(), W::Error> {
        self.csi(format_args!("{};{}H", y, x)).await?;
        self.column = x;
        self.row = y;
        Ok(())
    }

    /// Move cursor up by n lines.
    ///
    /// `n` is sent as is; the tracked row saturates at 1.
    pub async fn move_up(&mut self, n: usize) -> Result<(), W::Error> {
        if n == 0 {
            return Ok(());
        }
        self.csi(format_args!("{}A", n)).await?;
        self.row = self.row.saturating_sub(n).max(1);
        Ok(())
    }

    /// Move cursor down by n lines
    pub async fn move_down(&mut self, n: usize) -> Result<(), W::Error> {
        if n == 0 {
            return Ok(());
        }
        self.csi(format_args!("{}B", n)).await?;
        self.row = self.row.saturating_add(n);
        Ok(())
    }

    /// Move cursor right by n columns
    pub async fn move_right(&mut self, n: usize) -> Result<(), W::Error> {
        if n == 0 {
            return Ok(());
        }
        self.csi(format_args!("{}C", n)).await?;
        self.column = self.column.saturating_add(n);
        Ok(())
    }

    /// Move cursor left by n columns.
    ///
    /// `n` is sent as is; the tracked column saturates at 1.
    pub async fn move_left(&mut self, n: usize) -> Result<(), W::Error> {
        if n == 0 {
            return Ok(());
        }
        self.csi(format_args!("{}D", n)).await?;
        self.column = self.column.saturating_sub(n).max(1);
        Ok(())
    }

    /// Save the cursor, both on the terminal and in the tracked model
    pub async fn save_position(&mut self) -> Result<(), W::Error> {
        self.send(b"\x1b[s").await?;
        self.saved = (self.column, self.row);
        Ok(())
    }

    /// Return to the position recorded by [`save_position`](Self::save_position)
    pub async fn restore_position(&mut self) -> Result<(), W::Error> {
        (self.column, self.row) = self.saved;
        self.send(b"\x1b[u").await
    }

    /// Flush the writer
    pub async fn flush(&mut self) -> Result<(), W::Error> {
        self.writer.flush().await
    }
}

/// SGR foreground colour codes
pub mod colors {
    pub const BLACK: u8 = 30;
    pub const RED: u8 = 31;
    pub const GREEN: u8 = 32;
    pub const YELLOW: u8 = 33;
    pub const BLUE: u8 = 34;
    pub const MAGENTA: u8 = 35;
    pub const CYAN: u8 = 36;
    pub const WHITE: u8 = 37;
}

/// SGR effect codes, sent ahead of the colour
pub mod effects {
    pub const NORMAL: u8 = 0;
    pub const BOLD: u8 = 1;
    pub const UNDERLINE: u8 = 4;
    pub const BLINK: u8 = 5;
    pub const REVERSE: u8 = 7;
}
