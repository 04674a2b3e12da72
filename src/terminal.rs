use embassy_futures::select::{select, Either};
use embassy_sync::{blocking_mutex::raw::RawMutex, signal::Signal};
use embedded_io_async::{Read, Write as AsyncWrite};

use crate::error::ReadLineError;
use crate::key::{KeyCode, KeyDecoder};
use crate::line::{EditEvent, LineBuffer};
use crate::writer::TerminalWriter;

const BACKSPACE: u8 = 0x08;

/// Configuration for the terminal
#[derive(Clone, Copy)]
pub struct TerminalConfig {
    /// Screen height, bounds the tracked row
    pub rows: usize,
    /// Screen width
    pub cols: usize,
    /// Decode arrow/Home/End/Delete escape sequences from the peer
    pub ansi_keys: bool,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            rows: 24,
            cols: 80,
            ansi_keys: true,
        }
    }
}

/// Interactive single-line editor.
///
/// Reads keys from any [`Read`] source (normally an
/// [`RxConsumer`](crate::RxConsumer)), applies them to a [`LineBuffer`] and
/// redraws only the part of the line that changed.
pub struct LineEditor {
    decoder: KeyDecoder,
}

impl LineEditor {
    pub fn new(config: &TerminalConfig) -> Self {
        Self {
            decoder: KeyDecoder::new(config.ansi_keys),
        }
    }

    /// Read a single key press. `Ok(None)` means the input stream ended.
    pub async fn read_key<R: Read>(&mut self, reader: &mut R) -> Result<Option<KeyCode>, ReadLineError> {
        self.decoder.read_key(reader).await.map_err(ReadLineError::io)
    }

    /// Read and edit one line into `buf`.
    ///
    /// Clears to the end of the current line and shows `prompt`, then edits
    /// until Enter, returning the line length. The text is left in
    /// `buf[..len]`. Input beyond `buf.len()` is ignored.
    ///
    /// When `cancel` is given, signalling it aborts the read with
    /// [`ReadLineError::Cancelled`]; drive it from a timer for a timeout.
    pub async fn read_line<R, W, M>(
        &mut self,
        reader: &mut R,
        writer: &mut TerminalWriter<'_, W>,
        prompt: &str,
        buf: &mut [u8],
        cancel: Option<&Signal<M, ()>>,
    ) -> Result<usize, ReadLineError>
    where
        R: Read,
        W: AsyncWrite,
        M: RawMutex,
    {
        let mut line = LineBuffer::new(buf);
        self.decoder.reset();

        writer.clear_to_end_of_line().await.map_err(ReadLineError::io)?;
        writer.write_str(prompt).await.map_err(ReadLineError::io)?;

        loop {
            let Some(byte) = next_byte(reader, cancel).await? else {
                debug!("input ended during read_line");
                return Err(ReadLineError::EndOfTransmission);
            };
            let Some(key) = self.decoder.feed(byte) else {
                continue;
            };

            match line.handle_key(key) {
                EditEvent::Done(len) => {
                    debug!("read_line complete, {} bytes", len);
                    return Ok(len);
                }
                EditEvent::Aborted => {
                    debug!("read_line aborted");
                    return Err(ReadLineError::EndOfTransmission);
                }
                event => redraw(writer, &line, event).await.map_err(ReadLineError::io)?,
            }
        }
    }
}

async fn next_byte<R, M>(reader: &mut R, cancel: Option<&Signal<M, ()>>) -> Result<Option<u8>, ReadLineError>
where
    R: Read,
    M: RawMutex,
{
    let mut byte = [0u8; 1];
    let count = match cancel {
        Some(signal) => match select(reader.read(&mut byte), signal.wait()).await {
            Either::First(result) => result.map_err(ReadLineError::io)?,
            Either::Second(()) => {
                debug!("read_line cancelled");
                return Err(ReadLineError::Cancelled);
            }
        },
        None => reader.read(&mut byte).await.map_err(ReadLineError::io)?,
    };
    Ok((count > 0).then_some(byte[0]))
}

/// Bring the screen in line with an edit that already happened in `line`
async fn redraw<W: AsyncWrite>(
    writer: &mut TerminalWriter<'_, W>,
    line: &LineBuffer<'_>,
    event: EditEvent,
) -> Result<(), W::Error> {
    match event {
        EditEvent::Inserted => {
            // The inserted byte sits just before the cursor
            let from = line.cursor() - 1;
            writer.clear_to_end_of_line().await?;
            writer.save_position().await?;
            writer.write_bytes(&line.content()[from..]).await?;
            writer.restore_position().await?;
            writer.move_right(1).await
        }
        EditEvent::Deleted => redraw_tail(writer, line).await,
        EditEvent::Erased => {
            writer.write_char(BACKSPACE).await?;
            redraw_tail(writer, line).await
        }
        EditEvent::MovedLeft(n) => writer.move_left(n).await,
        EditEvent::MovedRight(n) => writer.move_right(n).await,
        EditEvent::None | EditEvent::Done(_) | EditEvent::Aborted => Ok(()),
    }
}

async fn redraw_tail<W: AsyncWrite>(writer: &mut TerminalWriter<'_, W>, line: &LineBuffer<'_>) -> Result<(), W::Error> {
    writer.clear_to_end_of_line().await?;
    writer.save_position().await?;
    writer.write_bytes(line.tail()).await?;
    writer.restore_position().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testlib::{Capture, Failing, Script};
    use embassy_futures::block_on;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use embedded_io_async::ErrorKind;
    use pretty_assertions::assert_eq;

    const NO_CANCEL: Option<&Signal<NoopRawMutex, ()>> = None;

    fn run(input: &[u8], buf: &mut [u8]) -> (Result<usize, ReadLineError>, std::string::String) {
        let cfg = TerminalConfig::default();
        let mut out = Capture::default();
        let mut reader = Script::new(input);
        let mut editor = LineEditor::new(&cfg);
        let result = {
            let mut writer = TerminalWriter::new(&mut out, &cfg);
            block_on(editor.read_line(&mut reader, &mut writer, "> ", buf, NO_CANCEL))
        };
        (result, out.as_str().into())
    }

    #[test]
    fn test_plain_line() {
        let mut buf = [0u8; 16];
        let (result, _) = run(b"hello\r", &mut buf);
        assert_eq!(result, Ok(5));
        assert_eq!(&buf[..5], b"hello");
    }

    #[test]
    fn test_empty_line() {
        let mut buf = [0u8; 16];
        let (result, out) = run(b"\n", &mut buf);
        assert_eq!(result, Ok(0));
        assert_eq!(out, "\x1b[K> ");
    }

    #[test]
    fn test_insert_redraw_sequence() {
        let mut buf = [0u8; 16];
        let (result, out) = run(b"ab\x1b[DX\r", &mut buf);
        assert_eq!(result, Ok(3));
        assert_eq!(&buf[..3], b"aXb");
        assert_eq!(
            out,
            concat!(
                "\x1b[K> ",
                "\x1b[K\x1b[sa\x1b[u\x1b[1C",
                "\x1b[K\x1b[sb\x1b[u\x1b[1C",
                "\x1b[1D",
                "\x1b[K\x1b[sXb\x1b[u\x1b[1C",
            )
        );
    }

    #[test]
    fn test_home_then_insert() {
        let mut buf = [0u8; 16];
        let (result, _) = run(b"ab\x1b[HX\r", &mut buf);
        assert_eq!(result, Ok(3));
        assert_eq!(&buf[..3], b"Xab");
    }

    #[test]
    fn test_backspace_and_delete() {
        let mut buf = [0u8; 16];
        // "abcd", left twice, forward-delete 'c', backspace 'b', End
        let (result, out) = run(b"abcd\x1b[D\x1b[D\x1b[3~\x7f\x1b[F\r", &mut buf);
        assert_eq!(result, Ok(2));
        assert_eq!(&buf[..2], b"ad");
        assert!(out.ends_with("\x1b[K\x1b[sd\x1b[u\x08\x1b[K\x1b[sd\x1b[u\x1b[1C"));
    }

    #[test]
    fn test_noop_keys_emit_nothing() {
        let mut buf = [0u8; 16];
        let (result, out) = run(b"\x7f\x1b[3~\x1b[D\x1b[C\x1b[H\x1b[F\t\x01\r", &mut buf);
        assert_eq!(result, Ok(0));
        assert_eq!(out, "\x1b[K> ");
    }

    #[test]
    fn test_full_buffer_ignores_input() {
        let mut buf = [0u8; 3];
        let (result, _) = run(b"abcdef\r", &mut buf);
        assert_eq!(result, Ok(3));
        assert_eq!(&buf, b"abc");
    }

    #[test]
    fn test_escape_then_enter_completes_line() {
        let mut buf = [0u8; 16];
        let (result, _) = run(b"ok\x1b\r", &mut buf);
        assert_eq!(result, Ok(2));
        assert_eq!(&buf[..2], b"ok");

        let (result, _) = run(b"ok\x1b\x04", &mut buf);
        assert_eq!(result, Err(ReadLineError::EndOfTransmission));
    }

    #[test]
    fn test_ctrl_d_aborts() {
        let mut buf = [0u8; 16];
        let (result, _) = run(b"abc\x04", &mut buf);
        assert_eq!(result, Err(ReadLineError::EndOfTransmission));
    }

    #[test]
    fn test_end_of_stream_aborts() {
        let mut buf = [0u8; 16];
        let (result, _) = run(b"abc", &mut buf);
        assert_eq!(result, Err(ReadLineError::EndOfTransmission));
    }

    #[test]
    fn test_cursor_tracking_after_edit() {
        let cfg = TerminalConfig::default();
        let mut out = Capture::default();
        let mut reader = Script::new(b"abc\x1b[D\x7f\r");
        let mut editor = LineEditor::new(&cfg);
        let mut writer = TerminalWriter::new(&mut out, &cfg);
        let mut buf = [0u8; 8];
        let len = block_on(editor.read_line(&mut reader, &mut writer, "$ ", &mut buf, NO_CANCEL)).unwrap();
        assert_eq!(len, 2);
        // Prompt (2 columns) plus one character left of the cursor
        assert_eq!(writer.column(), 4);
    }

    #[test]
    fn test_cancel_signal() {
        let cfg = TerminalConfig::default();
        let mut out = Capture::default();
        let mut reader = Script::pending_after(b"ab");
        let mut editor = LineEditor::new(&cfg);
        let mut writer = TerminalWriter::new(&mut out, &cfg);
        let cancel = Signal::<NoopRawMutex, ()>::new();
        cancel.signal(());
        let mut buf = [0u8; 8];
        let result = block_on(editor.read_line(&mut reader, &mut writer, "", &mut buf, Some(&cancel)));
        assert_eq!(result, Err(ReadLineError::Cancelled));
    }

    #[test]
    fn test_write_failure_is_reported() {
        let cfg = TerminalConfig::default();
        let mut out = Failing;
        let mut reader = Script::new(b"a\r");
        let mut editor = LineEditor::new(&cfg);
        let mut writer = TerminalWriter::new(&mut out, &cfg);
        let mut buf = [0u8; 8];
        let result = block_on(editor.read_line(&mut reader, &mut writer, "", &mut buf, NO_CANCEL));
        assert_eq!(result, Err(ReadLineError::Io(ErrorKind::BrokenPipe)));
    }

    #[test]
    fn test_read_key() {
        let mut editor = LineEditor::new(&TerminalConfig::default());
        let mut reader = Script::new(b"\x1b[C\x04");
        assert_eq!(block_on(editor.read_key(&mut reader)), Ok(Some(KeyCode::ArrowRight)));
        assert_eq!(block_on(editor.read_key(&mut reader)), Ok(Some(KeyCode::EndOfTransmission)));
        assert_eq!(block_on(editor.read_key(&mut reader)), Ok(None));
    }
}
