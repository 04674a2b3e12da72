use heapless::String;

/// Widest numeral (digits plus padding) the codec produces
pub const NUMERAL_CAPACITY: usize = 34;

/// A formatted numeral
pub type Numeral = String<NUMERAL_CAPACITY>;

const DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Render `value` in `base` (2 to 16, upper-case hex digits), left-padded
/// to `min_width` with spaces or zeros.
///
/// Longer numerals are never truncated. Padding stops at
/// [`NUMERAL_CAPACITY`].
pub fn format_unsigned(value: u32, base: u32, min_width: usize, pad_with_space: bool) -> Numeral {
    let base = base.clamp(2, 16);

    // Collect least-significant first, then emit reversed
    let mut scratch = [0u8; 32];
    let mut count = 0;
    let mut rest = value;
    loop {
        scratch[count] = DIGITS[(rest % base) as usize];
        count += 1;
        rest /= base;
        if rest == 0 {
            break;
        }
    }

    let mut out = Numeral::new();
    let pad = if pad_with_space { ' ' } else { '0' };
    let width = min_width.min(NUMERAL_CAPACITY);
    for _ in count..width {
        let _ = out.push(pad);
    }
    for &digit in scratch[..count].iter().rev() {
        let _ = out.push(digit as char);
    }
    out
}

/// Parse the leading run of `base` digits in `s` (hex accepts either case).
///
/// Stops at the first character that is not a digit. Overflow wraps, and
/// input without a leading digit yields 0.
pub fn parse_unsigned(s: &str, base: u32) -> u32 {
    let base = base.clamp(2, 16);
    s.chars()
        .map_while(|c| c.to_digit(base))
        .fold(0u32, |acc, digit| acc.wrapping_mul(base).wrapping_add(digit))
}
