use embedded_io_async::{Error, ErrorKind};

/// Errors that can occur while reading a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReadLineError {
    /// The byte channel failed
    Io(ErrorKind),
    /// Ctrl-D was pressed, or the input stream ended
    EndOfTransmission,
    /// The cancellation signal fired
    Cancelled,
}

impl ReadLineError {
    pub(crate) fn io<E: Error>(err: E) -> Self {
        ReadLineError::Io(err.kind())
    }
}

impl core::fmt::Display for ReadLineError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ReadLineError::Io(kind) => write!(f, "i/o error: {:?}", kind),
            ReadLineError::EndOfTransmission => f.write_str("end of transmission"),
            ReadLineError::Cancelled => f.write_str("read cancelled"),
        }
    }
}
