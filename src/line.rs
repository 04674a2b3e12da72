use crate::key::KeyCode;

/// Outcome of applying one key to a [`LineBuffer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditEvent {
    /// Nothing changed
    None,
    /// A byte was inserted before the cursor
    Inserted,
    /// The byte under the cursor was removed
    Deleted,
    /// The byte before the cursor was removed and the cursor stepped back
    Erased,
    MovedLeft(usize),
    MovedRight(usize),
    /// Enter, with the final line length
    Done(usize),
    /// Ctrl-D
    Aborted,
}

/// Edit buffer for a single input line, backed by caller-owned storage.
///
/// `content()` is always the first `len()` bytes of the storage and the
/// cursor is an insertion point in `0..=len()`. Operations that would break
/// either bound are no-ops and return `false`.
pub struct LineBuffer<'a> {
    buf: &'a mut [u8],
    len: usize,
    cursor: usize,
}

impl<'a> LineBuffer<'a> {
    /// Start an empty line; capacity is the length of `buf`
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self {
            buf,
            len: 0,
            cursor: 0,
        }
    }

    pub fn content(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Content from the cursor to the end of the line
    pub fn tail(&self) -> &[u8] {
        &self.buf[self.cursor..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    pub fn is_full(&self) -> bool {
        self.len >= self.buf.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Insert at the cursor, shifting the tail right. No-op when full.
    pub fn insert(&mut self, byte: u8) -> bool {
        if self.is_full() {
            return false;
        }
        self.buf.copy_within(self.cursor..self.len, self.cursor + 1);
        self.buf[self.cursor] = byte;
        self.len += 1;
        self.cursor += 1;
        true
    }

    /// Remove the byte under the cursor. No-op at the end of the line.
    pub fn delete(&mut self) -> bool {
        if self.cursor >= self.len {
            return false;
        }
        self.buf.copy_within(self.cursor + 1..self.len, self.cursor);
        self.len -= 1;
        true
    }

    /// Remove the byte before the cursor. No-op at the start of the line.
    pub fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        self.delete()
    }

    pub fn move_left(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        true
    }

    pub fn move_right(&mut self) -> bool {
        if self.cursor >= self.len {
            return false;
        }
        self.cursor += 1;
        true
    }

    /// Move to the start of the line, returning how far the cursor moved
    pub fn home(&mut self) -> usize {
        core::mem::take(&mut self.cursor)
    }

    /// Move to the end of the line, returning how far the cursor moved
    pub fn end(&mut self) -> usize {
        let moved = self.len - self.cursor;
        self.cursor = self.len;
        moved
    }

    /// Apply a key press to the line
    pub fn handle_key(&mut self, key: KeyCode) -> EditEvent {
        match key {
            KeyCode::Char(byte) => {
                if self.insert(byte) {
                    EditEvent::Inserted
                } else {
                    trace!("line full, ignoring {=u8:#x}", byte);
                    EditEvent::None
                }
            }
            KeyCode::Delete if self.delete() => EditEvent::Deleted,
            KeyCode::Backspace if self.backspace() => EditEvent::Erased,
            KeyCode::ArrowLeft if self.move_left() => EditEvent::MovedLeft(1),
            KeyCode::ArrowRight if self.move_right() => EditEvent::MovedRight(1),
            KeyCode::Home => match self.home() {
                0 => EditEvent::None,
                moved => EditEvent::MovedLeft(moved),
            },
            KeyCode::End => match self.end() {
                0 => EditEvent::None,
                moved => EditEvent::MovedRight(moved),
            },
            KeyCode::Enter => EditEvent::Done(self.len),
            KeyCode::EndOfTransmission => EditEvent::Aborted,
            _ => EditEvent::None,
        }
    }
}
