use embedded_io_async::Read;

const EOT: u8 = 0x04;
const ESC: u8 = 0x1B;

/// Logical key produced from received bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyCode {
    /// Printable ASCII character
    Char(u8),
    Enter,
    Tab,
    Backspace,
    /// Forward delete
    Delete,
    Home,
    End,
    ArrowLeft,
    ArrowRight,
    /// Ctrl-D
    EndOfTransmission,
    Unknown,
}

/// Classify a single byte on its own.
///
/// ESC introduces a multi-byte sequence that one byte cannot describe, so
/// it maps to [`KeyCode::Unknown`] here; [`KeyDecoder`] handles sequences.
pub fn classify(byte: u8) -> KeyCode {
    match byte {
        0x20..=0x7E => KeyCode::Char(byte),
        EOT => KeyCode::EndOfTransmission,
        b'\r' | b'\n' => KeyCode::Enter,
        b'\t' => KeyCode::Tab,
        0x7F | 0x08 => KeyCode::Backspace,
        _ => KeyCode::Unknown,
    }
}

/// State machine for parsing ANSI escape sequences
#[derive(Debug, Clone, Copy, PartialEq)]
enum EscapeState {
    Normal,
    Escape,
    /// After `ESC [`, with the numeric parameter collected so far
    Csi(u8),
    /// After `ESC O`
    Ss3,
}

/// Byte-at-a-time key decoder.
///
/// With escape decoding enabled it understands a small set of VT100/xterm
/// sequences:
///
/// | Sequence                                    | Key          |
/// |---------------------------------------------|--------------|
/// | `ESC [ C`                                   | `ArrowRight` |
/// | `ESC [ D`                                   | `ArrowLeft`  |
/// | `ESC [ H`, `ESC O H`, `ESC [ 1 ~`, `ESC [ 7 ~` | `Home`    |
/// | `ESC [ F`, `ESC O F`, `ESC [ 4 ~`, `ESC [ 8 ~` | `End`     |
/// | `ESC [ 3 ~`                                 | `Delete`     |
///
/// Any other complete sequence yields [`KeyCode::Unknown`]. With decoding
/// disabled every byte goes through [`classify`], so raw serial input can
/// never produce the navigation keys.
pub struct KeyDecoder {
    escape_sequences: bool,
    state: EscapeState,
}

impl KeyDecoder {
    pub fn new(escape_sequences: bool) -> Self {
        Self {
            escape_sequences,
            state: EscapeState::Normal,
        }
    }

    /// Feed one byte. Returns a key once one is complete, `None` while
    /// inside an escape sequence.
    pub fn feed(&mut self, byte: u8) -> Option<KeyCode> {
        match self.state {
            EscapeState::Normal => {
                if byte == ESC && self.escape_sequences {
                    self.state = EscapeState::Escape;
                    None
                } else {
                    Some(classify(byte))
                }
            }
            EscapeState::Escape => match byte {
                b'[' => {
                    self.state = EscapeState::Csi(0);
                    None
                }
                b'O' => {
                    self.state = EscapeState::Ss3;
                    None
                }
                // A second ESC starts a fresh sequence
                ESC => Some(KeyCode::Unknown),
                // Lone ESC: the byte after it stands on its own
                _ => {
                    self.state = EscapeState::Normal;
                    Some(classify(byte))
                }
            },
            EscapeState::Ss3 => match byte {
                b'H' => self.finish(KeyCode::Home),
                b'F' => self.finish(KeyCode::End),
                _ => self.finish(KeyCode::Unknown),
            },
            EscapeState::Csi(param) => match byte {
                b'0'..=b'9' => {
                    self.state = EscapeState::Csi(param.saturating_mul(10).saturating_add(byte - b'0'));
                    None
                }
                // Parameter separators, and modifiers we ignore
                b';' => {
                    self.state = EscapeState::Csi(0);
                    None
                }
                b'C' => self.finish(KeyCode::ArrowRight),
                b'D' => self.finish(KeyCode::ArrowLeft),
                b'H' => self.finish(KeyCode::Home),
                b'F' => self.finish(KeyCode::End),
                b'~' => self.finish(match param {
                    1 | 7 => KeyCode::Home,
                    4 | 8 => KeyCode::End,
                    3 => KeyCode::Delete,
                    _ => KeyCode::Unknown,
                }),
                // Any other final byte ends the sequence
                0x40..=0x7E => self.finish(KeyCode::Unknown),
                _ => {
                    self.state = EscapeState::Normal;
                    trace!("malformed escape sequence at {=u8:#x}", byte);
                    Some(KeyCode::Unknown)
                }
            },
        }
    }

    fn finish(&mut self, key: KeyCode) -> Option<KeyCode> {
        self.state = EscapeState::Normal;
        if key == KeyCode::Unknown {
            trace!("unrecognised escape sequence");
        }
        Some(key)
    }

    /// Drop any half-parsed escape sequence
    pub fn reset(&mut self) {
        self.state = EscapeState::Normal;
    }

    /// Read bytes from `reader` until a whole key has been decoded
    pub async fn read_key<R: Read>(&mut self, reader: &mut R) -> Result<Option<KeyCode>, R::Error> {
        let mut byte = [0u8; 1];
        loop {
            if reader.read(&mut byte).await? == 0 {
                return Ok(None);
            }
            if let Some(key) = self.feed(byte[0]) {
                return Ok(Some(key));
            }
        }
    }
}
