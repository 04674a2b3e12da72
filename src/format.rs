//! printf-style output on top of [`TerminalWriter`].
//!
//! Supported directives: `%%`, `%c`, `%s`, `%d`, `%u`, `%o`, `%x` and `%p`,
//! each with an optional width (`%5d`) and zero padding (`%05d`). There are
//! no precision or length modifiers. An unknown conversion character is
//! written as is.

use embedded_io_async::Write as AsyncWrite;

use crate::numeral::{self, Numeral, NUMERAL_CAPACITY};
use crate::writer::TerminalWriter;

/// One argument consumed by a `%` directive
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Arg<'s> {
    Char(u8),
    Str(&'s str),
    Int(i32),
    Uint(u32),
}

impl Arg<'_> {
    fn as_u32(&self) -> Option<u32> {
        match *self {
            Arg::Uint(v) => Some(v),
            Arg::Int(v) => Some(v as u32),
            Arg::Char(c) => Some(c as u32),
            Arg::Str(_) => None,
        }
    }

    fn as_i32(&self) -> Option<i32> {
        self.as_u32().map(|v| match *self {
            Arg::Int(i) => i,
            _ => v as i32,
        })
    }
}

impl From<char> for Arg<'_> {
    /// Characters outside a single byte become `?`
    fn from(c: char) -> Self {
        Arg::Char(u8::try_from(c).unwrap_or(b'?'))
    }
}

impl From<u8> for Arg<'_> {
    fn from(c: u8) -> Self {
        Arg::Char(c)
    }
}

impl<'s> From<&'s str> for Arg<'s> {
    fn from(s: &'s str) -> Self {
        Arg::Str(s)
    }
}

impl From<i32> for Arg<'_> {
    fn from(v: i32) -> Self {
        Arg::Int(v)
    }
}

impl From<u32> for Arg<'_> {
    fn from(v: u32) -> Self {
        Arg::Uint(v)
    }
}

impl From<u16> for Arg<'_> {
    fn from(v: u16) -> Self {
        Arg::Uint(v.into())
    }
}

impl From<usize> for Arg<'_> {
    /// Saturates at `u32::MAX`
    fn from(v: usize) -> Self {
        Arg::Uint(u32::try_from(v).unwrap_or(u32::MAX))
    }
}

/// Format onto a [`TerminalWriter`], printf style.
///
/// ```rust,ignore
/// tprintf!(term, "%s: %05d\r\n", "count", 42).await?;
/// ```
#[macro_export]
macro_rules! tprintf {
    ($term:expr, $fmt:expr $(, $arg:expr)* $(,)?) => {
        $term.format($fmt, &[$($crate::Arg::from($arg)),*])
    };
}

impl<'a, W: AsyncWrite> TerminalWriter<'a, W> {
    /// Write `fmt`, expanding each directive with the next argument.
    ///
    /// A directive whose argument is missing or of an unusable kind (a
    /// string for a numeric conversion) expands to nothing.
    pub async fn format(&mut self, fmt: &str, args: &[Arg<'_>]) -> Result<(), W::Error> {
        let fmt = fmt.as_bytes();
        let mut args = args.iter();
        let mut i = 0;
        let mut literal_start = 0;

        while i < fmt.len() {
            if fmt[i] != b'%' {
                i += 1;
                continue;
            }
            if literal_start < i {
                self.write_bytes(&fmt[literal_start..i]).await?;
            }
            i += 1;

            let mut pad_with_space = true;
            if fmt.get(i) == Some(&b'0') {
                pad_with_space = false;
                i += 1;
            }
            let mut width = 0usize;
            if matches!(fmt.get(i), Some(b'1'..=b'9')) {
                let start = i;
                while matches!(fmt.get(i), Some(b'0'..=b'9')) {
                    i += 1;
                }
                // Only ASCII digits were consumed
                let digits = core::str::from_utf8(&fmt[start..i]).unwrap_or("");
                width = numeral::parse_unsigned(digits, 10) as usize;
            }

            let Some(&conversion) = fmt.get(i) else {
                // Dangling '%' at the end of the format
                self.write_char(b'%').await?;
                literal_start = i;
                break;
            };
            i += 1;
            literal_start = i;

            match conversion {
                b'%' => self.write_char(b'%').await?,
                b'c' => {
                    if let Some(c) = args.next().and_then(Arg::as_u32) {
                        self.write_char(c as u8).await?;
                    }
                }
                b's' => {
                    if let Some(Arg::Str(s)) = args.next() {
                        self.write_str(s).await?;
                    }
                }
                b'd' => {
                    if let Some(v) = args.next().and_then(Arg::as_i32) {
                        self.write_signed(v, width, pad_with_space).await?;
                    }
                }
                b'u' | b'o' | b'x' | b'p' => {
                    if let Some(v) = args.next().and_then(Arg::as_u32) {
                        let base = match conversion {
                            b'o' => 8,
                            b'x' | b'p' => 16,
                            _ => 10,
                        };
                        if conversion == b'p' {
                            self.write_str("0x").await?;
                        }
                        let n = numeral::format_unsigned(v, base, width, pad_with_space);
                        self.write_str(&n).await?;
                    }
                }
                other => self.write_char(other).await?,
            }
        }

        if literal_start < fmt.len() {
            self.write_bytes(&fmt[literal_start..]).await?;
        }
        Ok(())
    }

    /// `%d`: the sign takes one column of the field width. With space
    /// padding the sign sits right before the digits, with zero padding it
    /// leads the field.
    async fn write_signed(&mut self, v: i32, width: usize, pad_with_space: bool) -> Result<(), W::Error> {
        let magnitude = v.unsigned_abs();
        if v >= 0 {
            let n = numeral::format_unsigned(magnitude, 10, width, pad_with_space);
            return self.write_str(&n).await;
        }

        let digits = numeral::format_unsigned(magnitude, 10, 0, pad_with_space);
        // Same cap as the unsigned path, counting the sign
        let field = width.saturating_sub(1).min(NUMERAL_CAPACITY - 1);
        if pad_with_space {
            let mut out = Numeral::new();
            for _ in digits.len()..field {
                let _ = out.push(' ');
            }
            let _ = out.push('-');
            let _ = out.push_str(&digits);
            self.write_str(&out).await
        } else {
            self.write_char(b'-').await?;
            let n = numeral::format_unsigned(magnitude, 10, field, false);
            self.write_str(&n).await
        }
    }
}
