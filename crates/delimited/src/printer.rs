//! Record printer
//!
//! Writes values according to a [`CsvFormat`], tracking record boundaries so
//! delimiters land between fields and not before the first one. Header
//! comments and a declared header are emitted when the printer is created.

use std::io::Write;

use crate::error::CsvResult;
use crate::format::{write_char, CsvFormat};
use crate::value::Value;

pub struct CsvPrinter<W> {
    out: W,
    format: CsvFormat,
    new_record: bool,
}

impl<W: Write> CsvPrinter<W> {
    /// Wrap a writer. If the dialect declares header comments or a header,
    /// they are written immediately.
    pub fn new(out: W, format: CsvFormat) -> CsvResult<Self> {
        format.validate()?;
        let mut printer = CsvPrinter {
            out,
            format,
            new_record: true,
        };
        let comments = printer.format.header_comments().to_vec();
        for line in &comments {
            printer.print_comment(line)?;
        }
        let header = printer
            .format
            .header()
            .filter(|h| !h.is_empty())
            .map(<[String]>::to_vec);
        if let Some(header) = header {
            if !printer.format.skip_header_record() {
                printer.print_record(header)?;
            }
        }
        Ok(printer)
    }

    /// Write a single field
    pub fn print(&mut self, value: impl Into<Value>) -> CsvResult<()> {
        let value = value.into();
        self.format
            .print_value(&mut self.out, &value, self.new_record)?;
        self.new_record = false;
        Ok(())
    }

    /// Terminate the current record
    pub fn println(&mut self) -> CsvResult<()> {
        self.format.println(&mut self.out)?;
        self.new_record = true;
        Ok(())
    }

    /// Write one record and terminate it
    pub fn print_record<I>(&mut self, values: I) -> CsvResult<()>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        for value in values {
            self.print(value)?;
        }
        self.println()
    }

    /// Write a sequence of records
    pub fn print_records<I>(&mut self, records: I) -> CsvResult<()>
    where
        I: IntoIterator,
        I::Item: IntoIterator,
        <I::Item as IntoIterator>::Item: Into<Value>,
    {
        for record in records {
            self.print_record(record)?;
        }
        Ok(())
    }

    /// Write a comment. A no-op unless the dialect has a comment marker.
    ///
    /// Line breaks inside `comment` start a new commented line; a pending
    /// record is terminated first.
    pub fn print_comment(&mut self, comment: &str) -> CsvResult<()> {
        let Some(marker) = self.format.comment_marker() else {
            return Ok(());
        };
        if !self.new_record {
            self.println()?;
        }
        write_char(&mut self.out, marker)?;
        self.out.write_all(b" ")?;
        let mut chars = comment.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '\r' | '\n' => {
                    if c == '\r' && chars.peek() == Some(&'\n') {
                        chars.next();
                    }
                    self.println()?;
                    write_char(&mut self.out, marker)?;
                    self.out.write_all(b" ")?;
                }
                other => write_char(&mut self.out, other)?,
            }
        }
        self.println()
    }

    pub fn flush(&mut self) -> CsvResult<()> {
        self.out.flush()?;
        Ok(())
    }

    /// Drop the writer, flushing first when `flush` is set or the dialect
    /// enables `auto_flush`
    pub fn close(mut self, flush: bool) -> CsvResult<()> {
        if flush || self.format.auto_flush() {
            self.flush()?;
        }
        Ok(())
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
