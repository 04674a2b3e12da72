#![cfg_attr(not(test), no_std)]
#![doc = include_str!("../README.md")]

//! A serial terminal for `no_std` embedded systems.
//!
//! This crate provides cursor-addressable screen control, printf-style
//! output and single-line editing on top of async byte I/O, fed by an
//! interrupt-safe receive ring.

// Must come first so the logging macros are visible to the other modules.
mod fmt;

pub mod error;
pub mod format;
pub mod key;
pub mod line;
pub mod numeral;
pub mod rx;
pub mod terminal;
pub mod writer;

#[cfg(test)]
mod testlib;

pub use error::ReadLineError;
pub use format::Arg;
pub use key::{classify, KeyCode, KeyDecoder};
pub use line::{EditEvent, LineBuffer};
pub use rx::{RxBuffer, RxConsumer, RxProducer, RX_BUFFER_SIZE};
pub use terminal::{LineEditor, TerminalConfig};
pub use writer::{colors, effects, TerminalWriter};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::rx::{RxBuffer, RxConsumer, RxProducer};
    pub use crate::terminal::{LineEditor, TerminalConfig};
    pub use crate::tprintf;
    pub use crate::writer::TerminalWriter;
    pub use crate::{Arg, KeyCode, ReadLineError};
}
