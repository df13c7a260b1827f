//! Error types for delimited

use thiserror::Error;

/// Result type alias using [`CsvError`]
pub type CsvResult<T> = std::result::Result<T, CsvError>;

/// Errors that can occur while configuring a dialect, parsing or printing
#[derive(Debug, Error)]
pub enum CsvError {
    /// IO error from the underlying reader or writer
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid dialect configuration
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Duplicate column name encountered while building the header map
    #[error("The header contains a duplicate name: {name:?}")]
    DuplicateHeaderName {
        /// The offending column name
        name: String,
    },

    /// The tokenizer produced no classifiable token
    #[error("(line {line}) invalid parse sequence")]
    InvalidParseSequence { line: u64 },

    /// Non-whitespace between a closing quote and the next delimiter
    #[error("(line {line}) invalid char between encapsulated token and delimiter")]
    StrayCharAfterQuote { line: u64 },

    /// End of stream inside a quoted field; reported with the starting line
    #[error("(startline {line}) EOF reached before encapsulated token finished")]
    UnterminatedQuote { line: u64 },

    /// End of stream directly after an escape character
    #[error("(line {line}) EOF whilst processing escape sequence")]
    EscapeAtEndOfStream { line: u64 },

    /// By-name field access on a record parsed without a header
    #[error("No header mapping was specified, the record values can't be accessed by name")]
    NoHeaderMapping,

    /// By-name field access with a name the header map does not contain
    #[error("Mapping for {name} not found, expected one of [{known}]")]
    ColumnNotFound { name: String, known: String },

    /// The header maps a name to an index beyond the record's field count
    #[error("Index for header {name:?} is {index}, but the record only has {size} values")]
    ColumnIndexOutOfRange {
        name: String,
        index: usize,
        size: usize,
    },

    /// Operation on a closed parser or reader
    #[error("The parser is closed")]
    Closed,
}
