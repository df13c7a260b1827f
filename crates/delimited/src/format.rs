//! Dialect configuration
//!
//! A [`CsvFormat`] is an immutable description of a delimited-text dialect:
//! meta characters, quoting policy, null handling, header declaration. The
//! `with_*` builders return modified copies so that the named dialects can be
//! used as starting points.

use std::fmt;
use std::io::{Cursor, Write};

use crate::error::{CsvError, CsvResult};
use crate::parser::CsvParser;
use crate::printer::CsvPrinter;
use crate::value::Value;

/// Record separator of the host platform
const LINE_SEPARATOR: &str = if cfg!(windows) { "\r\n" } else { "\n" };

/// Quoting policy applied by the printer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteMode {
    /// Quote every field
    All,

    /// Quote every non-null field
    AllNonNull,

    /// Quote only fields that need it
    Minimal,

    /// Quote every field that is not [`Value::Number`]
    NonNumeric,

    /// Never quote; special characters are escaped instead
    None,
}

/// A delimited-text dialect.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvFormat {
    delimiter: char,
    quote_character: Option<char>,
    quote_mode: Option<QuoteMode>,
    comment_marker: Option<char>,
    escape_character: Option<char>,
    ignore_surrounding_spaces: bool,
    ignore_empty_lines: bool,
    record_separator: Option<String>,
    null_string: Option<String>,
    header_comments: Vec<String>,
    header: Option<Vec<String>>,
    skip_header_record: bool,
    allow_missing_column_names: bool,
    ignore_header_case: bool,
    trim: bool,
    trailing_delimiter: bool,
    auto_flush: bool,
}

fn is_line_break(c: char) -> bool {
    c == '\n' || c == '\r'
}

pub(crate) fn write_char<W: Write>(out: &mut W, c: char) -> std::io::Result<()> {
    out.write_all(c.encode_utf8(&mut [0u8; 4]).as_bytes())
}

impl CsvFormat {
    /// Comma-delimited, double-quoted, CRLF record separator, empty lines
    /// ignored.
    pub fn default_format() -> Self {
        CsvFormat {
            delimiter: ',',
            quote_character: Some('"'),
            quote_mode: None,
            comment_marker: None,
            escape_character: None,
            ignore_surrounding_spaces: false,
            ignore_empty_lines: true,
            record_separator: Some("\r\n".to_string()),
            null_string: None,
            header_comments: Vec::new(),
            header: None,
            skip_header_record: false,
            allow_missing_column_names: false,
            ignore_header_case: false,
            trim: false,
            trailing_delimiter: false,
            auto_flush: false,
        }
    }

    /// Like the default dialect but keeping empty lines and allowing missing
    /// column names, as spreadsheet exports do.
    pub fn excel() -> Self {
        let mut f = Self::default_format();
        f.ignore_empty_lines = false;
        f.allow_missing_column_names = true;
        f
    }

    /// Strict RFC 4180: like the default dialect but empty lines are records
    pub fn rfc4180() -> Self {
        let mut f = Self::default_format();
        f.ignore_empty_lines = false;
        f
    }

    /// `SELECT INTO OUTFILE` / `LOAD DATA INFILE` dialect: tab-delimited,
    /// unquoted, backslash-escaped, `\N` for SQL NULL
    pub fn mysql() -> Self {
        let mut f = Self::default_format();
        f.delimiter = '\t';
        f.escape_character = Some('\\');
        f.ignore_empty_lines = false;
        f.quote_character = None;
        f.record_separator = Some("\n".to_string());
        f.null_string = Some("\\N".to_string());
        f.quote_mode = Some(QuoteMode::AllNonNull);
        f
    }

    /// SQL*Loader dialect
    pub fn oracle() -> Self {
        let mut f = Self::default_format();
        f.escape_character = Some('\\');
        f.ignore_empty_lines = false;
        f.null_string = Some("\\N".to_string());
        f.trim = true;
        f.record_separator = Some(LINE_SEPARATOR.to_string());
        f.quote_mode = Some(QuoteMode::Minimal);
        f
    }

    /// PostgreSQL `COPY ... CSV` dialect; quote and escape are both `"`
    pub fn postgresql_csv() -> Self {
        let mut f = Self::default_format();
        f.escape_character = Some('"');
        f.ignore_empty_lines = false;
        f.record_separator = Some("\n".to_string());
        f.null_string = Some(String::new());
        f.quote_mode = Some(QuoteMode::AllNonNull);
        f
    }

    /// PostgreSQL `COPY` text dialect
    pub fn postgresql_text() -> Self {
        let mut f = Self::postgresql_csv();
        f.delimiter = '\t';
        f.null_string = Some("\\N".to_string());
        f
    }

    /// Informix `UNLOAD` dialect: pipe-delimited, backslash-escaped
    pub fn informix_unload() -> Self {
        let mut f = Self::default_format();
        f.delimiter = '|';
        f.escape_character = Some('\\');
        f.record_separator = Some("\n".to_string());
        f
    }

    /// Informix `UNLOAD` with `DELIMITER ','`
    pub fn informix_unload_csv() -> Self {
        let mut f = Self::default_format();
        f.record_separator = Some("\n".to_string());
        f
    }

    /// Tab-delimited with surrounding spaces ignored
    pub fn tdf() -> Self {
        let mut f = Self::default_format();
        f.delimiter = '\t';
        f.ignore_surrounding_spaces = true;
        f
    }

    /// Look up a named dialect
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "Default" => Self::default_format(),
            "Excel" => Self::excel(),
            "InformixUnload" => Self::informix_unload(),
            "InformixUnloadCsv" => Self::informix_unload_csv(),
            "MySQL" => Self::mysql(),
            "Oracle" => Self::oracle(),
            "PostgreSQLCsv" => Self::postgresql_csv(),
            "PostgreSQLText" => Self::postgresql_text(),
            "RFC4180" => Self::rfc4180(),
            "TDF" => Self::tdf(),
            _ => return None,
        })
    }

    /// Check the dialect for internally contradictory settings.
    ///
    /// The quote and escape characters may coincide (the PostgreSQL dialects
    /// use `"` for both); every other meta-character pair must differ.
    pub fn validate(&self) -> CsvResult<()> {
        if is_line_break(self.delimiter) {
            return Err(CsvError::InvalidFormat(
                "The delimiter cannot be a line break".to_string(),
            ));
        }
        if self.quote_character == Some(self.delimiter) {
            return Err(CsvError::InvalidFormat(format!(
                "The quote character and the delimiter cannot be the same ('{}')",
                self.delimiter
            )));
        }
        if self.escape_character == Some(self.delimiter) {
            return Err(CsvError::InvalidFormat(format!(
                "The escape character and the delimiter cannot be the same ('{}')",
                self.delimiter
            )));
        }
        if self.comment_marker == Some(self.delimiter) {
            return Err(CsvError::InvalidFormat(format!(
                "The comment start character and the delimiter cannot be the same ('{}')",
                self.delimiter
            )));
        }
        if self.quote_character.is_some() && self.quote_character == self.comment_marker {
            return Err(CsvError::InvalidFormat(format!(
                "The comment start character and the quote character cannot be the same ('{}')",
                // checked is_some above
                self.comment_marker.unwrap_or_default()
            )));
        }
        if self.escape_character.is_some() && self.escape_character == self.comment_marker {
            return Err(CsvError::InvalidFormat(format!(
                "The comment start and the escape character cannot be the same ('{}')",
                self.escape_character.unwrap_or_default()
            )));
        }
        if self.escape_character.is_none() && self.quote_mode == Some(QuoteMode::None) {
            return Err(CsvError::InvalidFormat(
                "Quote mode set to NONE but no escape character is set".to_string(),
            ));
        }
        if let Some(header) = &self.header {
            let mut seen = std::collections::HashSet::new();
            for name in header {
                if !seen.insert(name.as_str()) {
                    return Err(CsvError::InvalidFormat(format!(
                        "The header contains a duplicate entry: {name:?} in {header:?}"
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn with_delimiter(mut self, delimiter: char) -> CsvResult<Self> {
        if is_line_break(delimiter) {
            return Err(CsvError::InvalidFormat(
                "The delimiter cannot be a line break".to_string(),
            ));
        }
        self.delimiter = delimiter;
        self.validate()?;
        Ok(self)
    }

    pub fn with_quote(mut self, quote: impl Into<Option<char>>) -> CsvResult<Self> {
        let quote = quote.into();
        if quote.is_some_and(is_line_break) {
            return Err(CsvError::InvalidFormat(
                "The quote character cannot be a line break".to_string(),
            ));
        }
        self.quote_character = quote;
        self.validate()?;
        Ok(self)
    }

    pub fn with_escape(mut self, escape: impl Into<Option<char>>) -> CsvResult<Self> {
        let escape = escape.into();
        if escape.is_some_and(is_line_break) {
            return Err(CsvError::InvalidFormat(
                "The escape character cannot be a line break".to_string(),
            ));
        }
        self.escape_character = escape;
        self.validate()?;
        Ok(self)
    }

    pub fn with_comment_marker(mut self, marker: impl Into<Option<char>>) -> CsvResult<Self> {
        let marker = marker.into();
        if marker.is_some_and(is_line_break) {
            return Err(CsvError::InvalidFormat(
                "The comment start marker character cannot be a line break".to_string(),
            ));
        }
        self.comment_marker = marker;
        self.validate()?;
        Ok(self)
    }

    pub fn with_quote_mode(mut self, mode: QuoteMode) -> CsvResult<Self> {
        self.quote_mode = Some(mode);
        self.validate()?;
        Ok(self)
    }

    /// Declare the column names up front
    pub fn with_header(mut self, header: &[&str]) -> CsvResult<Self> {
        self.header = Some(header.iter().map(|s| s.to_string()).collect());
        self.validate()?;
        Ok(self)
    }

    /// Read the column names from the first record of the input
    pub fn with_first_record_as_header(mut self) -> Self {
        self.header = Some(Vec::new());
        self.skip_header_record = true;
        self
    }

    pub fn with_header_comments(mut self, comments: &[&str]) -> Self {
        self.header_comments = comments.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_null_string(mut self, null_string: impl Into<String>) -> Self {
        self.null_string = Some(null_string.into());
        self
    }

    pub fn with_record_separator(mut self, separator: impl Into<String>) -> Self {
        self.record_separator = Some(separator.into());
        self
    }

    pub fn with_system_record_separator(self) -> Self {
        self.with_record_separator(LINE_SEPARATOR)
    }

    pub fn with_ignore_surrounding_spaces(mut self, ignore: bool) -> Self {
        self.ignore_surrounding_spaces = ignore;
        self
    }

    pub fn with_ignore_empty_lines(mut self, ignore: bool) -> Self {
        self.ignore_empty_lines = ignore;
        self
    }

    pub fn with_ignore_header_case(mut self, ignore: bool) -> Self {
        self.ignore_header_case = ignore;
        self
    }

    pub fn with_skip_header_record(mut self, skip: bool) -> Self {
        self.skip_header_record = skip;
        self
    }

    pub fn with_allow_missing_column_names(mut self, allow: bool) -> Self {
        self.allow_missing_column_names = allow;
        self
    }

    pub fn with_trim(mut self, trim: bool) -> Self {
        self.trim = trim;
        self
    }

    pub fn with_trailing_delimiter(mut self, trailing: bool) -> Self {
        self.trailing_delimiter = trailing;
        self
    }

    /// Flush the underlying writer when a printer over this dialect is closed
    pub fn with_auto_flush(mut self, auto_flush: bool) -> Self {
        self.auto_flush = auto_flush;
        self
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    pub fn quote_character(&self) -> Option<char> {
        self.quote_character
    }

    pub fn quote_mode(&self) -> Option<QuoteMode> {
        self.quote_mode
    }

    pub fn comment_marker(&self) -> Option<char> {
        self.comment_marker
    }

    pub fn escape_character(&self) -> Option<char> {
        self.escape_character
    }

    pub fn ignore_surrounding_spaces(&self) -> bool {
        self.ignore_surrounding_spaces
    }

    pub fn ignore_empty_lines(&self) -> bool {
        self.ignore_empty_lines
    }

    pub fn record_separator(&self) -> Option<&str> {
        self.record_separator.as_deref()
    }

    pub fn null_string(&self) -> Option<&str> {
        self.null_string.as_deref()
    }

    pub fn header_comments(&self) -> &[String] {
        &self.header_comments
    }

    pub fn header(&self) -> Option<&[String]> {
        self.header.as_deref()
    }

    pub fn skip_header_record(&self) -> bool {
        self.skip_header_record
    }

    pub fn allow_missing_column_names(&self) -> bool {
        self.allow_missing_column_names
    }

    pub fn ignore_header_case(&self) -> bool {
        self.ignore_header_case
    }

    pub fn trim(&self) -> bool {
        self.trim
    }

    pub fn trailing_delimiter(&self) -> bool {
        self.trailing_delimiter
    }

    pub fn auto_flush(&self) -> bool {
        self.auto_flush
    }

    /// Parse from a reader using this dialect
    pub fn parse<R: std::io::Read>(&self, reader: R) -> CsvResult<CsvParser<R>> {
        CsvParser::new(reader, self.clone())
    }

    /// Parse a string using this dialect
    pub fn parse_str(&self, input: &str) -> CsvResult<CsvParser<Cursor<Vec<u8>>>> {
        CsvParser::from_string(input, self.clone())
    }

    /// Print to a writer using this dialect
    pub fn printer<W: Write>(&self, sink: W) -> CsvResult<CsvPrinter<W>> {
        CsvPrinter::new(sink, self.clone())
    }

    /// Render a single record to a string, without the record separator
    pub fn format<I>(&self, values: I) -> CsvResult<String>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let mut printer = CsvPrinter::new(Vec::new(), self.clone())?;
        printer.print_record(values)?;
        let bytes = printer.into_inner();
        Ok(String::from_utf8_lossy(&bytes).trim().to_string())
    }

    /// Write one field, preceded by the delimiter unless it opens a record.
    pub(crate) fn print_value<W: Write>(
        &self,
        out: &mut W,
        value: &Value,
        new_record: bool,
    ) -> CsvResult<()> {
        let text = match value {
            Value::Null => match &self.null_string {
                None => String::new(),
                Some(null_string) => match (self.quote_mode, self.quote_character) {
                    (Some(QuoteMode::All), Some(q)) => format!("{q}{null_string}{q}"),
                    _ => null_string.clone(),
                },
            },
            other => other.to_string(),
        };
        let text = if self.trim {
            text.trim().to_string()
        } else {
            text
        };

        if !new_record {
            write_char(out, self.delimiter)?;
        }
        if value.is_null() {
            // The null string is written verbatim, never quoted or escaped
            out.write_all(text.as_bytes())?;
        } else if self.quote_character.is_some() {
            self.print_and_quote(out, value, &text, new_record)?;
        } else if self.escape_character.is_some() {
            self.print_and_escape(out, &text)?;
        } else {
            out.write_all(text.as_bytes())?;
        }
        Ok(())
    }

    fn print_and_quote<W: Write>(
        &self,
        out: &mut W,
        value: &Value,
        text: &str,
        new_record: bool,
    ) -> CsvResult<()> {
        let Some(quote_char) = self.quote_character else {
            out.write_all(text.as_bytes())?;
            return Ok(());
        };

        let quote = match self.quote_mode.unwrap_or(QuoteMode::Minimal) {
            QuoteMode::All | QuoteMode::AllNonNull => true,
            QuoteMode::NonNumeric => !matches!(value, Value::Number(_)),
            QuoteMode::None => return self.print_and_escape(out, text),
            QuoteMode::Minimal => {
                let mut chars = text.chars();
                match chars.next() {
                    // Only an empty first field of a record needs quotes, so
                    // the record is not mistaken for an empty line
                    None => new_record,
                    Some(first) if first <= '#' => true,
                    Some(_) => {
                        text.chars().any(|c| {
                            is_line_break(c) || c == quote_char || c == self.delimiter
                        }) || text.chars().next_back().is_some_and(|last| last <= ' ')
                    }
                }
            }
        };

        if !quote {
            out.write_all(text.as_bytes())?;
            return Ok(());
        }

        let mut buf = String::with_capacity(text.len() + 2);
        buf.push(quote_char);
        for c in text.chars() {
            if c == quote_char {
                buf.push(quote_char);
            }
            buf.push(c);
        }
        buf.push(quote_char);
        out.write_all(buf.as_bytes())?;
        Ok(())
    }

    /// Escape line breaks, the delimiter and the escape character itself.
    /// CR and LF are rewritten to `r` and `n` after the escape.
    fn print_and_escape<W: Write>(&self, out: &mut W, text: &str) -> CsvResult<()> {
        let Some(escape) = self.escape_character else {
            out.write_all(text.as_bytes())?;
            return Ok(());
        };

        let mut buf = String::with_capacity(text.len());
        for c in text.chars() {
            if is_line_break(c) || c == self.delimiter || c == escape {
                buf.push(escape);
                buf.push(match c {
                    '\n' => 'n',
                    '\r' => 'r',
                    other => other,
                });
            } else {
                buf.push(c);
            }
        }
        out.write_all(buf.as_bytes())?;
        Ok(())
    }

    /// Terminate a record: trailing delimiter if configured, then the record
    /// separator.
    pub(crate) fn println<W: Write>(&self, out: &mut W) -> CsvResult<()> {
        if self.trailing_delimiter {
            write_char(out, self.delimiter)?;
        }
        if let Some(separator) = &self.record_separator {
            out.write_all(separator.as_bytes())?;
        }
        Ok(())
    }
}

impl Default for CsvFormat {
    fn default() -> Self {
        Self::default_format()
    }
}

impl fmt::Display for CsvFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Delimiter=<{}>", self.delimiter)?;
        if let Some(escape) = self.escape_character {
            write!(f, " Escape=<{escape}>")?;
        }
        if let Some(quote) = self.quote_character {
            write!(f, " QuoteChar=<{quote}>")?;
        }
        if let Some(marker) = self.comment_marker {
            write!(f, " CommentStart=<{marker}>")?;
        }
        if let Some(null_string) = &self.null_string {
            write!(f, " NullString=<{null_string}>")?;
        }
        if let Some(separator) = &self.record_separator {
            write!(f, " RecordSeparator=<{separator}>")?;
        }
        if self.ignore_empty_lines {
            f.write_str(" EmptyLines:ignored")?;
        }
        if self.ignore_surrounding_spaces {
            f.write_str(" SurroundingSpaces:ignored")?;
        }
        if self.ignore_header_case {
            f.write_str(" IgnoreHeaderCase:ignored")?;
        }
        write!(f, " SkipHeaderRecord:{}", self.skip_header_record)?;
        if !self.header_comments.is_empty() {
            write!(f, " HeaderComments:[{}]", self.header_comments.join(", "))?;
        }
        if let Some(header) = &self.header {
            write!(f, " Header:[{}]", header.join(", "))?;
        }
        Ok(())
    }
}
