use crate::lexer::{LexError, Lexer};
use crate::parser::{Expected, ParseResult, SyntaxError};
use crate::token::{Token, TokenKind};

/// One token of lookahead over a [`Lexer`].
///
/// A fail-fast lex error met while advancing is parked and the stream is
/// treated as ended from then on; the parser reports the parked error in
/// place of whatever syntax error the early end caused.
pub struct Cursor<'g, 'src> {
    lexer: Lexer<'g, 'src>,

    current: Option<Token<'src>>,
    lookahead: Option<Token<'src>>,

    lex_error: Option<LexError>,
}

impl<'g, 'src> Cursor<'g, 'src> {
    /// Wraps `lexer` and loads the first lookahead token.
    pub fn new(lexer: Lexer<'g, 'src>) -> Self {
        let mut cursor = Self {
            lexer,
            current: None,
            lookahead: None,
            lex_error: None,
        };
        cursor.advance();
        cursor
    }

    /// The last consumed token.
    pub fn current(&self) -> Option<Token<'src>> {
        self.current
    }

    /// The next unconsumed token, or `None` at end of input.
    pub fn lookahead(&self) -> Option<Token<'src>> {
        self.lookahead
    }

    pub fn at_end(&self) -> bool {
        self.lookahead.is_none()
    }

    pub fn advance(&mut self) {
        self.current = self.lookahead.take();
        self.lookahead = match self.lexer.next() {
            Some(Ok(token)) => Some(token),
            Some(Err(error)) => {
                self.lex_error = Some(error);
                None
            }
            None => None,
        };
    }

    /// Consumes the lookahead if it is of `kind`. Leaves the cursor
    /// untouched otherwise.
    pub fn accept(&mut self, kind: TokenKind) -> bool {
        self.accept_token(kind).is_some()
    }

    pub fn accept_token(&mut self, kind: TokenKind) -> Option<Token<'src>> {
        match self.lookahead {
            Some(token) if token.kind == kind => {
                self.advance();
                Some(token)
            }
            _ => None,
        }
    }

    pub fn expect(&mut self, kind: TokenKind) -> ParseResult<Token<'src>> {
        match self.accept_token(kind) {
            Some(token) => Ok(token),
            None => Err(self.error_expected(Expected::Token(kind)).into()),
        }
    }

    pub fn expect_end(&mut self) -> ParseResult<()> {
        if self.at_end() && self.lex_error.is_none() {
            Ok(())
        } else {
            Err(self.error_expected(Expected::EndOfInput).into())
        }
    }

    pub fn error_expected(&self, expected: Expected) -> SyntaxError {
        match self.lookahead {
            Some(token) => SyntaxError {
                expected,
                found: token.describe(),
                line: token.line,
                column: token.column,
                span: token.span,
                unclosed: None,
            },
            None => {
                let position = self.lexer.eof_position();
                SyntaxError {
                    expected,
                    found: "end of input".to_owned(),
                    line: position.line,
                    column: position.column,
                    span: self.lexer.eof_span(),
                    unclosed: None,
                }
            }
        }
    }

    pub fn take_lex_error(&mut self) -> Option<LexError> {
        self.lex_error.take()
    }

    /// Characters the lexer skipped under the tolerant policy.
    pub fn into_lex_errors(self) -> Vec<LexError> {
        self.lexer.into_errors()
    }
}
