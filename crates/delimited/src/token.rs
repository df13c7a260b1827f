//! Tokenizer output

/// Classification of one lexer step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenType {
    /// Freshly reset, not yet classified
    Invalid,

    /// A field followed by a delimiter
    Token,

    /// End of the input stream
    Eof,

    /// A field terminating a record
    EoRecord,

    /// A comment line (content is the trimmed comment text)
    Comment,
}

/// Reusable token buffer; reset before each call into the lexer.
///
/// Pooling the buffer across calls is an internal allocation optimization,
/// not part of the public contract.
#[derive(Debug)]
pub(crate) struct Token {
    pub(crate) ty: TokenType,
    pub(crate) content: String,
    /// Set when end of stream was reached with unflushed content
    pub(crate) is_ready: bool,
}

impl Token {
    pub(crate) fn new() -> Self {
        Token {
            ty: TokenType::Invalid,
            content: String::new(),
            is_ready: false,
        }
    }

    pub(crate) fn reset(&mut self) {
        self.ty = TokenType::Invalid;
        self.content.clear();
        self.is_ready = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_clears_state() {
        let mut token = Token::new();
        token.ty = TokenType::EoRecord;
        token.content.push_str("abc");
        token.is_ready = true;

        token.reset();
        assert_eq!(token.ty, TokenType::Invalid);
        assert_eq!(token.content, "");
        assert!(!token.is_ready);
    }
}
