//! Tokenizer
//!
//! Classifies runs of characters into tokens (field content, end of record,
//! end of file, comment) according to the active dialect.

use std::io::Read;

use crate::error::{CsvError, CsvResult};
use crate::format::CsvFormat;
use crate::reader::{LastChar, PositionedReader};
use crate::token::{Token, TokenType};

/// Result of resolving one escape sequence
enum Unescaped {
    /// The sequence maps to a single character; the escape is dropped
    Mapped(char),

    /// Unrecognized sequence; both the escape and this character are kept
    Verbatim(char),
}

/// The tokenizer: consumes the reader one character at a time and fills the
/// caller's token.
pub(crate) struct Lexer<R> {
    reader: PositionedReader<R>,
    delimiter: char,
    escape: Option<char>,
    quote_char: Option<char>,
    comment_start: Option<char>,
    ignore_surrounding_spaces: bool,
    ignore_empty_lines: bool,
    /// First line-terminator style seen in the stream; reporting only
    first_eol: Option<&'static str>,
}

impl<R: Read> Lexer<R> {
    pub(crate) fn new(format: &CsvFormat, reader: PositionedReader<R>) -> Self {
        Lexer {
            reader,
            delimiter: format.delimiter(),
            escape: format.escape_character(),
            quote_char: format.quote_character(),
            comment_start: format.comment_marker(),
            ignore_surrounding_spaces: format.ignore_surrounding_spaces(),
            ignore_empty_lines: format.ignore_empty_lines(),
            first_eol: None,
        }
    }

    pub(crate) fn first_eol(&self) -> Option<&'static str> {
        self.first_eol
    }

    pub(crate) fn current_line_number(&self) -> u64 {
        self.reader.current_line_number()
    }

    pub(crate) fn character_position(&self) -> u64 {
        self.reader.position()
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.reader.is_closed()
    }

    pub(crate) fn close(&mut self) {
        self.reader.close();
    }

    /// Produce the next token. The caller resets `token` beforehand.
    pub(crate) fn next_token(&mut self, token: &mut Token) -> CsvResult<()> {
        let mut last_char = self.reader.last_char();
        let mut c = self.reader.read()?;
        let mut eol = self.read_end_of_line(c)?;

        if self.ignore_empty_lines {
            while eol && is_start_of_line(last_char) {
                last_char = c.map_or(LastChar::EndOfStream, LastChar::Char);
                c = self.reader.read()?;
                eol = self.read_end_of_line(c)?;
                if c.is_none() {
                    token.ty = TokenType::Eof;
                    return Ok(());
                }
            }
        }

        // True end of file, unless a delimiter still owes us an empty field.
        if last_char == LastChar::EndOfStream
            || (last_char != LastChar::Char(self.delimiter) && c.is_none())
        {
            token.ty = TokenType::Eof;
            return Ok(());
        }

        if is_start_of_line(last_char) && self.is_comment_start(c) {
            return match self.reader.read_line()? {
                None => {
                    token.ty = TokenType::Eof;
                    Ok(())
                }
                Some(line) => {
                    token.content.push_str(line.trim());
                    token.ty = TokenType::Comment;
                    Ok(())
                }
            };
        }

        while token.ty == TokenType::Invalid {
            if self.ignore_surrounding_spaces {
                while self.is_whitespace(c) && !eol {
                    c = self.reader.read()?;
                    eol = self.read_end_of_line(c)?;
                }
            }
            if c == Some(self.delimiter) {
                token.ty = TokenType::Token;
            } else if eol {
                token.ty = TokenType::EoRecord;
            } else if self.is_quote_char(c) {
                self.encapsulated_token(token)?;
            } else if c.is_none() {
                token.ty = TokenType::Eof;
                token.is_ready = true;
            } else {
                self.simple_token(token, c)?;
            }
        }
        Ok(())
    }

    /// Accumulate an unquoted field up to a delimiter, end of line or end of
    /// file.
    fn simple_token(&mut self, token: &mut Token, first: Option<char>) -> CsvResult<()> {
        let mut ch = first;
        loop {
            if self.read_end_of_line(ch)? {
                token.ty = TokenType::EoRecord;
                break;
            }
            let Some(cur) = ch else {
                token.ty = TokenType::Eof;
                token.is_ready = true;
                break;
            };
            if cur == self.delimiter {
                token.ty = TokenType::Token;
                break;
            }
            if self.escape == Some(cur) {
                match self.read_escape()? {
                    Unescaped::Mapped(u) => token.content.push(u),
                    Unescaped::Verbatim(raw) => {
                        token.content.push(cur);
                        token.content.push(raw);
                    }
                }
            } else {
                token.content.push(cur);
            }
            ch = self.reader.read()?;
        }

        if self.ignore_surrounding_spaces {
            trim_trailing_spaces(&mut token.content);
        }
        Ok(())
    }

    /// Accumulate a quoted field. A doubled quote is a literal quote; the
    /// closing quote may only be followed by whitespace before the next
    /// delimiter or end of line.
    fn encapsulated_token(&mut self, token: &mut Token) -> CsvResult<()> {
        let start_line = self.current_line_number();
        let mut c = self.reader.read()?;
        loop {
            match c {
                None => return Err(CsvError::UnterminatedQuote { line: start_line }),
                Some(cur) if self.escape == Some(cur) => match self.read_escape()? {
                    Unescaped::Mapped(u) => token.content.push(u),
                    Unescaped::Verbatim(raw) => {
                        token.content.push(cur);
                        token.content.push(raw);
                    }
                },
                Some(cur) if self.quote_char == Some(cur) => {
                    let next = self.reader.look_ahead()?;
                    if self.is_quote_char(next) {
                        // Doubled quote: literal quote char
                        if let Some(q) = self.reader.read()? {
                            token.content.push(q);
                        }
                    } else {
                        // Closing quote; consume up to the next delimiter
                        loop {
                            c = self.reader.read()?;
                            if c == Some(self.delimiter) {
                                token.ty = TokenType::Token;
                                return Ok(());
                            }
                            if c.is_none() {
                                token.ty = TokenType::Eof;
                                token.is_ready = true;
                                return Ok(());
                            }
                            if self.read_end_of_line(c)? {
                                token.ty = TokenType::EoRecord;
                                return Ok(());
                            }
                            if !self.is_whitespace(c) {
                                return Err(CsvError::StrayCharAfterQuote {
                                    line: self.current_line_number(),
                                });
                            }
                        }
                    }
                }
                Some(cur) => token.content.push(cur),
            }
            c = self.reader.read()?;
        }
    }

    /// Resolve the character following an escape.
    fn read_escape(&mut self) -> CsvResult<Unescaped> {
        let Some(c) = self.reader.read()? else {
            return Err(CsvError::EscapeAtEndOfStream {
                line: self.current_line_number(),
            });
        };
        Ok(match c {
            'r' => Unescaped::Mapped('\r'),
            'n' => Unescaped::Mapped('\n'),
            't' => Unescaped::Mapped('\t'),
            'b' => Unescaped::Mapped('\u{8}'),
            'f' => Unescaped::Mapped('\u{c}'),
            '\r' | '\n' | '\u{c}' | '\t' | '\u{8}' => Unescaped::Mapped(c),
            _ if self.is_meta_char(c) => Unescaped::Mapped(c),
            _ => Unescaped::Verbatim(c),
        })
    }

    /// Detect CR, LF or CRLF; a CRLF pair is consumed as one unit. The first
    /// terminator style encountered is remembered for reporting.
    fn read_end_of_line(&mut self, ch: Option<char>) -> CsvResult<bool> {
        let mut ch = ch;
        if ch == Some('\r') && self.reader.look_ahead()? == Some('\n') {
            ch = self.reader.read()?;
            if self.first_eol.is_none() {
                self.first_eol = Some("\r\n");
            }
        }
        if self.first_eol.is_none() {
            if ch == Some('\n') {
                self.first_eol = Some("\n");
            } else if ch == Some('\r') {
                self.first_eol = Some("\r");
            }
        }
        Ok(matches!(ch, Some('\n') | Some('\r')))
    }

    /// Whitespace for field-boundary purposes; the delimiter itself never
    /// counts (TAB-delimited dialects).
    fn is_whitespace(&self, c: Option<char>) -> bool {
        match c {
            Some(ch) => ch != self.delimiter && is_space_char(ch),
            None => false,
        }
    }

    fn is_quote_char(&self, c: Option<char>) -> bool {
        self.quote_char.is_some() && c == self.quote_char
    }

    fn is_comment_start(&self, c: Option<char>) -> bool {
        self.comment_start.is_some() && c == self.comment_start
    }

    fn is_meta_char(&self, c: char) -> bool {
        c == self.delimiter
            || Some(c) == self.escape
            || Some(c) == self.quote_char
            || Some(c) == self.comment_start
    }
}

fn is_start_of_line(last: LastChar) -> bool {
    matches!(
        last,
        LastChar::Undefined | LastChar::Char('\n') | LastChar::Char('\r')
    )
}

fn is_space_char(ch: char) -> bool {
    matches!(
        ch,
        ' ' | '\t'
            | '\n'
            | '\u{b}'
            | '\u{c}'
            | '\r'
            | '\u{1c}'..='\u{1f}'
            | '\u{200b}'..='\u{200d}'
            | '\u{3000}'
    )
}

fn trim_trailing_spaces(content: &mut String) {
    while content.chars().next_back().is_some_and(is_space_char) {
        content.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::CsvFormat;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn lexer(input: &str, format: &CsvFormat) -> Lexer<Cursor<Vec<u8>>> {
        let reader = PositionedReader::new(Cursor::new(input.as_bytes().to_vec()));
        Lexer::new(format, reader)
    }

    fn next(lexer: &mut Lexer<Cursor<Vec<u8>>>) -> (TokenType, String) {
        let mut token = Token::new();
        lexer.next_token(&mut token).unwrap();
        (token.ty, token.content)
    }

    fn format_with_escaping() -> CsvFormat {
        CsvFormat::default_format().with_escape('\\').unwrap()
    }

    #[test]
    fn test_surrounding_spaces_are_deleted() {
        let format = CsvFormat::default_format().with_ignore_surrounding_spaces(true);
        let code = "noSpaces,  leadingSpaces,trailingSpaces  ,  surroundingSpaces  ,  ,,";
        let mut lexer = lexer(code, &format);
        assert_eq!(next(&mut lexer), (TokenType::Token, "noSpaces".into()));
        assert_eq!(next(&mut lexer), (TokenType::Token, "leadingSpaces".into()));
        assert_eq!(next(&mut lexer), (TokenType::Token, "trailingSpaces".into()));
        assert_eq!(
            next(&mut lexer),
            (TokenType::Token, "surroundingSpaces".into())
        );
        assert_eq!(next(&mut lexer), (TokenType::Token, String::new()));
        assert_eq!(next(&mut lexer), (TokenType::Token, String::new()));
        assert_eq!(next(&mut lexer), (TokenType::Eof, String::new()));
    }

    #[test]
    fn test_surrounding_tabs_are_deleted() {
        let format = CsvFormat::default_format().with_ignore_surrounding_spaces(true);
        let code = "noTabs,\tleadingTab,trailingTab\t,\tsurroundingTabs\t,\t\t,,";
        let mut lexer = lexer(code, &format);
        assert_eq!(next(&mut lexer), (TokenType::Token, "noTabs".into()));
        assert_eq!(next(&mut lexer), (TokenType::Token, "leadingTab".into()));
        assert_eq!(next(&mut lexer), (TokenType::Token, "trailingTab".into()));
        assert_eq!(
            next(&mut lexer),
            (TokenType::Token, "surroundingTabs".into())
        );
        assert_eq!(next(&mut lexer), (TokenType::Token, String::new()));
        assert_eq!(next(&mut lexer), (TokenType::Token, String::new()));
        assert_eq!(next(&mut lexer), (TokenType::Eof, String::new()));
    }

    #[test]
    fn test_ignore_empty_lines() {
        let format = CsvFormat::default_format().with_ignore_empty_lines(true);
        let code = "first,line,\n\n\nsecond,line\n\n\nthird line \n\n\nlast, line \n\n\n\n";
        let mut lexer = lexer(code, &format);
        assert_eq!(next(&mut lexer), (TokenType::Token, "first".into()));
        assert_eq!(next(&mut lexer), (TokenType::Token, "line".into()));
        assert_eq!(next(&mut lexer), (TokenType::EoRecord, String::new()));
        assert_eq!(next(&mut lexer), (TokenType::Token, "second".into()));
        assert_eq!(next(&mut lexer), (TokenType::EoRecord, "line".into()));
        assert_eq!(next(&mut lexer), (TokenType::EoRecord, "third line ".into()));
        assert_eq!(next(&mut lexer), (TokenType::Token, "last".into()));
        assert_eq!(next(&mut lexer), (TokenType::EoRecord, " line ".into()));
        assert_eq!(next(&mut lexer), (TokenType::Eof, String::new()));
        assert_eq!(next(&mut lexer), (TokenType::Eof, String::new()));
    }

    #[test]
    fn test_comments() {
        let format = CsvFormat::default_format().with_comment_marker('#').unwrap();
        let code = "first,line,\n\
                    second,line,tokenWith#no-comment\n\
                    # comment line \n\
                    third,line,#no-comment\n\
                    # penultimate comment\n\
                    # Final comment\n";
        let mut lexer = lexer(code, &format);
        assert_eq!(next(&mut lexer), (TokenType::Token, "first".into()));
        assert_eq!(next(&mut lexer), (TokenType::Token, "line".into()));
        assert_eq!(next(&mut lexer), (TokenType::EoRecord, String::new()));
        assert_eq!(next(&mut lexer), (TokenType::Token, "second".into()));
        assert_eq!(next(&mut lexer), (TokenType::Token, "line".into()));
        assert_eq!(
            next(&mut lexer),
            (TokenType::EoRecord, "tokenWith#no-comment".into())
        );
        assert_eq!(next(&mut lexer), (TokenType::Comment, "comment line".into()));
        assert_eq!(next(&mut lexer), (TokenType::Token, "third".into()));
        assert_eq!(next(&mut lexer), (TokenType::Token, "line".into()));
        assert_eq!(next(&mut lexer), (TokenType::EoRecord, "#no-comment".into()));
        assert_eq!(
            next(&mut lexer),
            (TokenType::Comment, "penultimate comment".into())
        );
        assert_eq!(next(&mut lexer), (TokenType::Comment, "Final comment".into()));
        assert_eq!(next(&mut lexer), (TokenType::Eof, String::new()));
        assert_eq!(next(&mut lexer), (TokenType::Eof, String::new()));
    }

    #[test]
    fn test_comments_and_empty_lines() {
        let format = CsvFormat::default_format()
            .with_comment_marker('#')
            .unwrap()
            .with_ignore_empty_lines(false);
        let code = "1,2,3,\n\n\na,b x,c#no-comment\n#foo\n\n\nd,e,#no-comment\n\n\n\
                    # penultimate comment\n\n\n# Final comment\n";
        let mut lexer = lexer(code, &format);
        assert_eq!(next(&mut lexer), (TokenType::Token, "1".into()));
        assert_eq!(next(&mut lexer), (TokenType::Token, "2".into()));
        assert_eq!(next(&mut lexer), (TokenType::Token, "3".into()));
        assert_eq!(next(&mut lexer), (TokenType::EoRecord, String::new()));
        assert_eq!(next(&mut lexer), (TokenType::EoRecord, String::new()));
        assert_eq!(next(&mut lexer), (TokenType::EoRecord, String::new()));
        assert_eq!(next(&mut lexer), (TokenType::Token, "a".into()));
        assert_eq!(next(&mut lexer), (TokenType::Token, "b x".into()));
        assert_eq!(next(&mut lexer), (TokenType::EoRecord, "c#no-comment".into()));
        assert_eq!(next(&mut lexer), (TokenType::Comment, "foo".into()));
        assert_eq!(next(&mut lexer), (TokenType::EoRecord, String::new()));
        assert_eq!(next(&mut lexer), (TokenType::EoRecord, String::new()));
        assert_eq!(next(&mut lexer), (TokenType::Token, "d".into()));
        assert_eq!(next(&mut lexer), (TokenType::Token, "e".into()));
        assert_eq!(next(&mut lexer), (TokenType::EoRecord, "#no-comment".into()));
        assert_eq!(next(&mut lexer), (TokenType::EoRecord, String::new()));
        assert_eq!(next(&mut lexer), (TokenType::EoRecord, String::new()));
        assert_eq!(
            next(&mut lexer),
            (TokenType::Comment, "penultimate comment".into())
        );
        assert_eq!(next(&mut lexer), (TokenType::EoRecord, String::new()));
        assert_eq!(next(&mut lexer), (TokenType::EoRecord, String::new()));
        assert_eq!(next(&mut lexer), (TokenType::Comment, "Final comment".into()));
        assert_eq!(next(&mut lexer), (TokenType::Eof, String::new()));
        assert_eq!(next(&mut lexer), (TokenType::Eof, String::new()));
    }

    #[test]
    fn test_backslash_without_escaping() {
        let format = CsvFormat::default_format();
        assert!(format.escape_character().is_none());
        let code = "a,\\,,b\\\n\\,,";
        let mut lexer = lexer(code, &format);
        assert_eq!(next(&mut lexer), (TokenType::Token, "a".into()));
        assert_eq!(next(&mut lexer), (TokenType::Token, "\\".into()));
        assert_eq!(next(&mut lexer), (TokenType::Token, String::new()));
        assert_eq!(next(&mut lexer), (TokenType::EoRecord, "b\\".into()));
        assert_eq!(next(&mut lexer), (TokenType::Token, "\\".into()));
        assert_eq!(next(&mut lexer), (TokenType::Token, String::new()));
        assert_eq!(next(&mut lexer), (TokenType::Eof, String::new()));
    }

    #[test]
    fn test_backslash_with_escaping() {
        let format = format_with_escaping().with_ignore_empty_lines(false);
        assert!(format.escape_character().is_some());
        let code = "a,\\,,b\\\\\n\\,,\\\nc,d\\\r\ne";
        let mut lexer = lexer(code, &format);
        assert_eq!(next(&mut lexer), (TokenType::Token, "a".into()));
        assert_eq!(next(&mut lexer), (TokenType::Token, ",".into()));
        assert_eq!(next(&mut lexer), (TokenType::EoRecord, "b\\".into()));
        assert_eq!(next(&mut lexer), (TokenType::Token, ",".into()));
        assert_eq!(next(&mut lexer), (TokenType::Token, "\nc".into()));
        assert_eq!(next(&mut lexer), (TokenType::EoRecord, "d\r".into()));
        assert_eq!(next(&mut lexer), (TokenType::Eof, "e".into()));
    }

    #[test]
    fn test_quoted_with_surrounding_spaces() {
        let format = CsvFormat::default_format().with_ignore_surrounding_spaces(true);
        let code = "a,\"foo\",b\na,   \" foo\",b\na,\"foo \"  ,b\na,  \" foo \"  ,b";
        let mut lexer = lexer(code, &format);
        assert_eq!(next(&mut lexer), (TokenType::Token, "a".into()));
        assert_eq!(next(&mut lexer), (TokenType::Token, "foo".into()));
        assert_eq!(next(&mut lexer), (TokenType::EoRecord, "b".into()));
        assert_eq!(next(&mut lexer), (TokenType::Token, "a".into()));
        assert_eq!(next(&mut lexer), (TokenType::Token, " foo".into()));
        assert_eq!(next(&mut lexer), (TokenType::EoRecord, "b".into()));
        assert_eq!(next(&mut lexer), (TokenType::Token, "a".into()));
        assert_eq!(next(&mut lexer), (TokenType::Token, "foo ".into()));
        assert_eq!(next(&mut lexer), (TokenType::EoRecord, "b".into()));
        assert_eq!(next(&mut lexer), (TokenType::Token, "a".into()));
        assert_eq!(next(&mut lexer), (TokenType::Token, " foo ".into()));
        assert_eq!(next(&mut lexer), (TokenType::Eof, "b".into()));
    }

    #[test]
    fn test_multi_line_quoted_values() {
        let code = "a,\"foo\n\",b\n\"foo\n  baar ,,,\"\n\"\n\t \n\"";
        let format = CsvFormat::default_format();
        let mut lexer = lexer(code, &format);
        assert_eq!(next(&mut lexer), (TokenType::Token, "a".into()));
        assert_eq!(next(&mut lexer), (TokenType::Token, "foo\n".into()));
        assert_eq!(next(&mut lexer), (TokenType::EoRecord, "b".into()));
        assert_eq!(
            next(&mut lexer),
            (TokenType::EoRecord, "foo\n  baar ,,,".into())
        );
        assert_eq!(next(&mut lexer), (TokenType::Eof, "\n\t \n".into()));
    }

    #[test]
    fn test_doubled_quote_and_comment() {
        let format = CsvFormat::default_format()
            .with_quote('\'')
            .unwrap()
            .with_comment_marker('!')
            .unwrap()
            .with_delimiter(';')
            .unwrap();
        let code = "a;'b and '' more\n'\n!comment;;;;\n;;";
        let mut lexer = lexer(code, &format);
        assert_eq!(next(&mut lexer), (TokenType::Token, "a".into()));
        assert_eq!(
            next(&mut lexer),
            (TokenType::EoRecord, "b and ' more\n".into())
        );
    }

    #[test]
    fn test_delimiter_is_whitespace() {
        let format = CsvFormat::tdf();
        let code = "one\ttwo\t\tfour \t five\t six";
        let mut lexer = lexer(code, &format);
        assert_eq!(next(&mut lexer), (TokenType::Token, "one".into()));
        assert_eq!(next(&mut lexer), (TokenType::Token, "two".into()));
        assert_eq!(next(&mut lexer), (TokenType::Token, String::new()));
        assert_eq!(next(&mut lexer), (TokenType::Token, "four".into()));
        assert_eq!(next(&mut lexer), (TokenType::Token, "five".into()));
        assert_eq!(next(&mut lexer), (TokenType::Eof, "six".into()));
    }

    #[test]
    fn test_escaped_control_letters() {
        let cases = [
            ("character\\rEscaped", "character\rEscaped"),
            ("character\\nEscaped", "character\nEscaped"),
            ("character\\tEscaped", "character\tEscaped"),
            ("character\\bEscaped", "character\u{8}Escaped"),
            ("character\\fEscaped", "character\u{c}Escaped"),
        ];
        for (code, expected) in cases {
            let format = format_with_escaping();
            let mut lexer = lexer(code, &format);
            assert_eq!(next(&mut lexer).1, expected, "input {code:?}");
        }
    }

    #[test]
    fn test_escaped_raw_control_chars_pass_through() {
        let cases = [
            ("character\\\rEscaped", "character\rEscaped"),
            ("character\\\nEscaped", "character\nEscaped"),
            ("character\\\tEscaped", "character\tEscaped"),
            ("character\\\u{8}Escaped", "character\u{8}Escaped"),
            ("character\\\u{c}Escaped", "character\u{c}Escaped"),
        ];
        for (code, expected) in cases {
            let format = format_with_escaping();
            let mut lexer = lexer(code, &format);
            assert_eq!(next(&mut lexer).1, expected, "input {code:?}");
        }
    }

    #[test]
    fn test_unescaped_control_chars_split_or_stay() {
        let format = format_with_escaping();
        let mut lx = lexer("character\rNotEscaped", &format);
        assert_eq!(next(&mut lx).1, "character");
        assert_eq!(next(&mut lx).1, "NotEscaped");

        let mut lx = lexer("character\tNotEscaped", &format);
        assert_eq!(next(&mut lx).1, "character\tNotEscaped");
    }

    // Unrecognized escape sequences keep both characters verbatim instead
    // of raising.
    #[test]
    fn test_unrecognized_escape_kept_verbatim() {
        let format = format_with_escaping();
        let mut lx = lexer("character\\aEscaped", &format);
        assert_eq!(next(&mut lx).1, "character\\aEscaped");

        let mut lx = lexer("character\\NEscaped", &format);
        assert_eq!(next(&mut lx).1, "character\\NEscaped");
    }

    #[test]
    fn test_escaped_meta_char_with_custom_escape() {
        let format = CsvFormat::default_format().with_escape('!').unwrap();
        let mut lx = lexer("character!rEscaped", &format);
        assert_eq!(next(&mut lx).1, "character\rEscaped");
    }

    #[test]
    fn test_escaping_at_eof_is_an_error() {
        let format = format_with_escaping();
        let mut lx = lexer("escaping at EOF is evil\\", &format);
        let mut token = Token::new();
        assert!(matches!(
            lx.next_token(&mut token),
            Err(CsvError::EscapeAtEndOfStream { .. })
        ));
    }

    #[test]
    fn test_eof_inside_quotes_is_an_error() {
        let format = CsvFormat::default_format();
        let mut lx = lexer("a,\"never closed", &format);
        let mut token = Token::new();
        lx.next_token(&mut token).unwrap();
        token.reset();
        assert!(matches!(
            lx.next_token(&mut token),
            Err(CsvError::UnterminatedQuote { line: 1 })
        ));
    }

    #[test]
    fn test_stray_char_after_closing_quote() {
        let format = CsvFormat::default_format();
        let mut lx = lexer("\"closed\"oops,b", &format);
        let mut token = Token::new();
        assert!(matches!(
            lx.next_token(&mut token),
            Err(CsvError::StrayCharAfterQuote { .. })
        ));
    }

    #[test]
    fn test_first_eol_is_sticky() {
        let format = CsvFormat::default_format().with_ignore_empty_lines(false);
        let mut lx = lexer("a\r\nb\nc\rd", &format);
        assert_eq!(lx.first_eol(), None);
        let mut token = Token::new();
        while token.ty != TokenType::Eof {
            token.reset();
            lx.next_token(&mut token).unwrap();
        }
        assert_eq!(lx.first_eol(), Some("\r\n"));
    }
}
