//! Buffered character reader with look-ahead and position tracking

use std::io::{self, Read};

use crate::error::{CsvError, CsvResult};

const CHUNK_SIZE: usize = 8192;

/// The last character observed by [`PositionedReader::read`].
///
/// Look-ahead never changes this state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LastChar {
    /// Nothing has been read yet
    Undefined,

    /// The previous read hit the end of the stream
    EndOfStream,

    /// The most recently read character
    Char(char),
}

/// A buffered reader over a byte source, decoded as UTF-8 one character at
/// a time.
///
/// Tracks the last character read, the current line number (counting end of
/// line sightings) and the absolute character position, and supports a
/// single-character look-ahead. Used exclusively by the lexer.
pub(crate) struct PositionedReader<R> {
    source: R,
    /// Raw bytes buffered from the source, not yet decoded
    buf: Vec<u8>,
    start: usize,
    /// One-character pushback slot filled by [`Self::look_ahead`]
    peeked: Option<Option<char>>,
    last_char: LastChar,
    eol_counter: u64,
    position: u64,
    closed: bool,
}

impl<R: Read> PositionedReader<R> {
    pub(crate) fn new(source: R) -> Self {
        PositionedReader {
            source,
            buf: Vec::new(),
            start: 0,
            peeked: None,
            last_char: LastChar::Undefined,
            eol_counter: 0,
            position: 0,
            closed: false,
        }
    }

    /// Read one character, or `None` at end of stream.
    ///
    /// Updates the last-char state, the line counter (a `\r`, or a `\n` not
    /// preceded by `\r`) and the character position.
    pub(crate) fn read(&mut self) -> CsvResult<Option<char>> {
        self.ensure_open()?;
        let current = self.next_raw()?;
        match current {
            Some(c) => {
                if c == '\r' || (c == '\n' && self.last_char != LastChar::Char('\r')) {
                    self.eol_counter += 1;
                }
                self.last_char = LastChar::Char(c);
            }
            None => self.last_char = LastChar::EndOfStream,
        }
        self.position += 1;
        Ok(current)
    }

    /// Fill `buf` by repeated single-character reads.
    ///
    /// Returns the number of characters stored, or `None` when the stream is
    /// already exhausted and `buf` is non-empty.
    pub(crate) fn read_into(&mut self, buf: &mut [char]) -> CsvResult<Option<usize>> {
        if buf.is_empty() {
            return Ok(Some(0));
        }
        let Some(first) = self.read()? else {
            return Ok(None);
        };
        buf[0] = first;
        let mut count = 1;
        while count < buf.len() {
            match self.read()? {
                Some(c) => {
                    buf[count] = c;
                    count += 1;
                }
                None => break,
            }
        }
        Ok(Some(count))
    }

    /// Return the next character without consuming it.
    ///
    /// Does not affect the line number, position or last-char state.
    pub(crate) fn look_ahead(&mut self) -> CsvResult<Option<char>> {
        self.ensure_open()?;
        match self.peeked {
            Some(c) => Ok(c),
            None => {
                let c = self.decode_next()?;
                self.peeked = Some(c);
                Ok(c)
            }
        }
    }

    /// Consume through the next line terminator (CR, LF or CRLF) and return
    /// the line without it, or `None` at end of stream.
    ///
    /// Advances the line counter exactly once per returned line and leaves
    /// the last-char state at LF. Only called when processing a comment,
    /// otherwise information would be lost.
    pub(crate) fn read_line(&mut self) -> CsvResult<Option<String>> {
        self.ensure_open()?;
        let Some(first) = self.next_raw()? else {
            self.last_char = LastChar::EndOfStream;
            return Ok(None);
        };

        let mut line = String::new();
        let mut consumed = 1u64;
        let mut c = first;
        loop {
            if c == '\r' {
                if self.peek_raw()? == Some('\n') {
                    self.next_raw()?;
                    consumed += 1;
                }
                break;
            }
            if c == '\n' {
                break;
            }
            line.push(c);
            match self.next_raw()? {
                Some(next) => {
                    consumed += 1;
                    c = next;
                }
                None => break,
            }
        }

        self.position += consumed;
        self.eol_counter += 1;
        self.last_char = LastChar::Char('\n');
        Ok(Some(line))
    }

    /// Line number of the character the cursor sits on: the end-of-line
    /// count, plus one while in the middle of a line.
    pub(crate) fn current_line_number(&self) -> u64 {
        match self.last_char {
            LastChar::Undefined
            | LastChar::EndOfStream
            | LastChar::Char('\r')
            | LastChar::Char('\n') => self.eol_counter,
            LastChar::Char(_) => self.eol_counter + 1,
        }
    }

    pub(crate) fn position(&self) -> u64 {
        self.position
    }

    pub(crate) fn last_char(&self) -> LastChar {
        self.last_char
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed
    }

    /// Idempotent; further reads fail with [`CsvError::Closed`].
    pub(crate) fn close(&mut self) {
        self.closed = true;
        self.last_char = LastChar::EndOfStream;
    }

    fn ensure_open(&self) -> CsvResult<()> {
        if self.closed {
            Err(CsvError::Closed)
        } else {
            Ok(())
        }
    }

    /// Next character, consuming the pushback slot first.
    fn next_raw(&mut self) -> CsvResult<Option<char>> {
        if let Some(peeked) = self.peeked.take() {
            return Ok(peeked);
        }
        self.decode_next()
    }

    fn peek_raw(&mut self) -> CsvResult<Option<char>> {
        match self.peeked {
            Some(c) => Ok(c),
            None => {
                let c = self.decode_next()?;
                self.peeked = Some(c);
                Ok(c)
            }
        }
    }

    /// Decode the next UTF-8 character from the byte buffer, refilling from
    /// the source as needed. Bypasses the pushback slot.
    fn decode_next(&mut self) -> CsvResult<Option<char>> {
        self.fill(1)?;
        if self.buf.len() == self.start {
            return Ok(None);
        }
        let first = self.buf[self.start];
        let width = match first {
            0x00..=0x7f => 1,
            0xc2..=0xdf => 2,
            0xe0..=0xef => 3,
            0xf0..=0xf4 => 4,
            _ => return Err(invalid_utf8()),
        };
        self.fill(width)?;
        if self.buf.len() - self.start < width {
            return Err(invalid_utf8());
        }
        let bytes = &self.buf[self.start..self.start + width];
        let decoded = std::str::from_utf8(bytes).map_err(|_| invalid_utf8())?;
        let c = decoded.chars().next().ok_or_else(invalid_utf8)?;
        self.start += width;
        Ok(Some(c))
    }

    /// Ensure at least `need` undecoded bytes are buffered, if available.
    fn fill(&mut self, need: usize) -> CsvResult<()> {
        if self.start > 0 && self.buf.len() - self.start < need {
            self.buf.drain(..self.start);
            self.start = 0;
        }
        while self.buf.len() - self.start < need {
            let mut chunk = [0u8; CHUNK_SIZE];
            let n = self.source.read(&mut chunk)?;
            if n == 0 {
                break;
            }
            self.buf.extend_from_slice(&chunk[..n]);
        }
        Ok(())
    }
}

fn invalid_utf8() -> CsvError {
    CsvError::Io(io::Error::new(
        io::ErrorKind::InvalidData,
        "stream did not contain valid UTF-8",
    ))
}
