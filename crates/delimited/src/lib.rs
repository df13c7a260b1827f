//! Streaming parser and printer for delimited text with configurable
//! dialects.
//!
//! A [`CsvFormat`] describes a dialect: delimiter, quoting, escaping,
//! comments, null handling and header declaration. Named dialects such as
//! [`CsvFormat::mysql`] or [`CsvFormat::excel`] are starting points that the
//! `with_*` builders refine. Parsing is streaming and forward-only; records
//! report their ordinal and character position so a parse can be resumed
//! mid-stream.
//!
//! ```
//! use delimited::{CsvFormat, CsvParser};
//!
//! # fn main() -> delimited::CsvResult<()> {
//! let format = CsvFormat::default_format().with_first_record_as_header();
//! let mut parser = CsvParser::from_string("name,count\nfoo,3\nbar,7\n", format)?;
//! let records = parser.read_records()?;
//! assert_eq!(records.len(), 2);
//! assert_eq!(records[1].get_by_name("count")?, Some("7"));
//! # Ok(())
//! # }
//! ```

mod error;
mod format;
mod lexer;
mod parser;
mod printer;
mod reader;
mod record;
mod token;
mod value;

pub use error::{CsvError, CsvResult};
pub use format::{CsvFormat, QuoteMode};
pub use parser::{CsvParser, Records};
pub use printer::CsvPrinter;
pub use record::{CsvRecord, HeaderMap};
pub use value::Value;
