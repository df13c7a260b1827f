//! Streaming record parser
//!
//! Pulls tokens from the lexer and assembles them into [`CsvRecord`]s. The
//! parser is a forward-only cursor over the input; records are produced one
//! at a time and comments are attached to the record that follows them.

use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::Path;
use std::sync::Arc;

use crate::error::{CsvError, CsvResult};
use crate::format::CsvFormat;
use crate::lexer::Lexer;
use crate::reader::PositionedReader;
use crate::record::{CsvRecord, HeaderMap};
use crate::token::{Token, TokenType};

/// Parses delimited input into records according to a [`CsvFormat`].
pub struct CsvParser<R> {
    lexer: Lexer<R>,
    format: CsvFormat,
    header_map: Option<Arc<HeaderMap>>,
    record_buf: Vec<Option<String>>,
    token: Token,
    record_number: u64,
    character_offset: u64,
    peeked: Option<CsvRecord>,
}

impl<R: Read> CsvParser<R> {
    /// Parse `reader` from its beginning.
    pub fn new(reader: R, format: CsvFormat) -> CsvResult<Self> {
        Self::with_position(reader, format, 0, 1)
    }

    /// Parse a reader that starts mid-stream.
    ///
    /// `character_offset` is added to every reported record position and
    /// `record_number` is assigned to the first record produced. Together
    /// they let a caller resume at a position taken from an earlier parse.
    pub fn with_position(
        reader: R,
        format: CsvFormat,
        character_offset: u64,
        record_number: u64,
    ) -> CsvResult<Self> {
        format.validate()?;
        log::trace!("new parser with dialect {format}");
        let lexer = Lexer::new(&format, PositionedReader::new(reader));
        let mut parser = CsvParser {
            lexer,
            format,
            header_map: None,
            record_buf: Vec::new(),
            token: Token::new(),
            record_number: record_number.saturating_sub(1),
            character_offset,
            peeked: None,
        };
        parser.header_map = parser.initialize_header()?.map(Arc::new);
        Ok(parser)
    }

    /// Read or skip the header record per the dialect's header declaration.
    fn initialize_header(&mut self) -> CsvResult<Option<HeaderMap>> {
        let Some(format_header) = self.format.header().map(<[String]>::to_vec) else {
            return Ok(None);
        };
        let names = if format_header.is_empty() {
            // Column names come from the first record of the input
            log::debug!("reading header names from the first record");
            self.read_next()?.map(|record| {
                record
                    .values()
                    .iter()
                    .map(|v| v.clone().unwrap_or_default())
                    .collect::<Vec<String>>()
            })
        } else {
            if self.format.skip_header_record() {
                self.read_next()?;
            }
            Some(format_header)
        };
        match names {
            Some(names) => Ok(Some(HeaderMap::new(
                names,
                self.format.ignore_header_case(),
                self.format.allow_missing_column_names(),
            )?)),
            None => Ok(None),
        }
    }

    /// The next record, or `None` at end of input.
    pub fn next_record(&mut self) -> CsvResult<Option<CsvRecord>> {
        if let Some(record) = self.peeked.take() {
            return Ok(Some(record));
        }
        self.read_next()
    }

    fn read_next(&mut self) -> CsvResult<Option<CsvRecord>> {
        self.record_buf.clear();
        let mut comment: Option<String> = None;
        let start_position = self.lexer.character_position() + self.character_offset;

        loop {
            self.token.reset();
            self.lexer.next_token(&mut self.token)?;
            match self.token.ty {
                TokenType::Token => self.add_record_value(false),
                TokenType::EoRecord => {
                    self.add_record_value(true);
                    break;
                }
                TokenType::Eof => {
                    if self.token.is_ready {
                        self.add_record_value(true);
                    }
                    break;
                }
                TokenType::Invalid => {
                    let line = self.lexer.current_line_number();
                    log::debug!("unparseable token sequence at line {line}");
                    return Err(CsvError::InvalidParseSequence { line });
                }
                TokenType::Comment => match &mut comment {
                    None => comment = Some(self.token.content.clone()),
                    Some(buf) => {
                        buf.push('\n');
                        buf.push_str(&self.token.content);
                    }
                },
            }
        }

        if self.record_buf.is_empty() {
            return Ok(None);
        }
        self.record_number += 1;
        Ok(Some(CsvRecord::new(
            std::mem::take(&mut self.record_buf),
            self.header_map.clone(),
            comment,
            self.record_number,
            start_position,
        )))
    }

    /// Append the current token content as a field, applying trim, the
    /// trailing-delimiter rule and null-string conversion.
    fn add_record_value(&mut self, last: bool) {
        let content = if self.format.trim() {
            self.token.content.trim()
        } else {
            self.token.content.as_str()
        };
        if last && content.is_empty() && self.format.trailing_delimiter() {
            return;
        }
        if Some(content) == self.format.null_string() {
            self.record_buf.push(None);
        } else {
            self.record_buf.push(Some(content.to_string()));
        }
    }

    /// Whether another record is available without consuming it
    pub fn has_next(&mut self) -> CsvResult<bool> {
        if self.is_closed() {
            return Ok(false);
        }
        if self.peeked.is_none() {
            self.peeked = self.read_next()?;
        }
        Ok(self.peeked.is_some())
    }

    /// Iterate over the remaining records.
    ///
    /// The iterator shares this parser's cursor: records consumed through it
    /// are not seen again by [`next_record`](Self::next_record), and vice
    /// versa.
    pub fn records(&mut self) -> Records<'_, R> {
        Records {
            parser: self,
            done: false,
        }
    }

    /// Drain the remaining records into a vector.
    pub fn read_records(&mut self) -> CsvResult<Vec<CsvRecord>> {
        let mut records = Vec::new();
        while let Some(record) = self.next_record()? {
            records.push(record);
        }
        Ok(records)
    }

    /// Line number the cursor is on. For multi-line quoted fields this does
    /// not correspond to the record number.
    pub fn current_line_number(&self) -> u64 {
        self.lexer.current_line_number()
    }

    /// Number of the most recently produced record
    pub fn record_number(&self) -> u64 {
        self.record_number
    }

    /// The first end-of-line sequence seen in the input
    pub fn first_end_of_line(&self) -> Option<&'static str> {
        self.lexer.first_eol()
    }

    /// The header mapping, if the dialect declared one
    pub fn header_map(&self) -> Option<Arc<HeaderMap>> {
        self.header_map.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.lexer.is_closed()
    }

    /// Release the underlying reader. Further reads fail with
    /// [`CsvError::Closed`].
    pub fn close(&mut self) {
        self.lexer.close();
    }
}

impl CsvParser<Cursor<Vec<u8>>> {
    /// Parse an in-memory string.
    pub fn from_string(input: &str, format: CsvFormat) -> CsvResult<Self> {
        Self::new(Cursor::new(input.as_bytes().to_vec()), format)
    }
}

impl CsvParser<BufReader<File>> {
    /// Parse a file.
    pub fn from_path(path: impl AsRef<Path>, format: CsvFormat) -> CsvResult<Self> {
        let file = File::open(path)?;
        Self::new(BufReader::new(file), format)
    }
}

/// Record iterator borrowing a [`CsvParser`]; see [`CsvParser::records`].
///
/// Iterating a closed parser yields a single [`CsvError::Closed`]. After the
/// first `None` the iterator is fused.
pub struct Records<'a, R> {
    parser: &'a mut CsvParser<R>,
    done: bool,
}

impl<R: Read> Iterator for Records<'_, R> {
    type Item = CsvResult<CsvRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.parser.is_closed() {
            self.done = true;
            return Some(Err(CsvError::Closed));
        }
        match self.parser.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
