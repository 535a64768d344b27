#[cfg(test)]
mod tests;

mod reduce;

use std::fmt;
use std::num::IntErrorKind;

use descent_diagnostic::span::Span;
use descent_diagnostic::{Diagnostic, IntoDiagnostic, Snippet};

pub use reduce::{BuildTree, Fold, Reduce, Spanned};

use crate::ast::BinOp;
use crate::cursor::Cursor;
use crate::lexer::{LexError, Lexer};
use crate::token::{Position, Token, TokenKind};

/// Parentheses nested deeper than this are rejected rather than risk
/// exhausting the stack.
pub const MAX_NESTING: usize = 256;

#[derive(serde::Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    Token(TokenKind),
    EndOfInput,
    Message(&'static str),
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Token(kind) => f.write_str(kind.token_name()),
            Expected::EndOfInput => f.write_str("end of input"),
            Expected::Message(message) => f.write_str(message),
        }
    }
}

#[derive(thiserror::Error, serde::Serialize, Debug, Clone, PartialEq, Eq)]
#[error("expected {expected}, found {found} at line {line}, column {column}")]
pub struct SyntaxError {
    pub expected: Expected,
    pub found: String,
    pub line: u32,
    pub column: u32,
    pub span: Span,

    /// The `(` left open when a `)` was expected.
    pub unclosed: Option<Span>,
}

impl SyntaxError {
    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }
}

#[derive(thiserror::Error, serde::Serialize, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("integer literal `{text}` does not fit in 64 bits")]
    IntegerOverflow { text: String, span: Span },

    #[error("`{text}` is not an integer literal")]
    InvalidInteger { text: String, span: Span },

    #[error("division by zero")]
    DivisionByZero { span: Span },

    #[error("`{op}` overflowed")]
    Overflow { op: BinOp, span: Span },
}

impl EvalError {
    pub fn span(&self) -> Span {
        match self {
            EvalError::IntegerOverflow { span, .. }
            | EvalError::InvalidInteger { span, .. }
            | EvalError::DivisionByZero { span }
            | EvalError::Overflow { span, .. } => *span,
        }
    }
}

#[derive(thiserror::Error, serde::Serialize, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error(transparent)]
    Lexer(#[from] LexError),

    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    Eval(#[from] EvalError),
}

pub type ParseResult<T> = Result<T, ParseError>;

impl IntoDiagnostic for SyntaxError {
    fn into_diagnostic(self) -> Diagnostic {
        let diagnostic = Diagnostic::error()
            .with_message(format!("expected {}, found {}", self.expected, self.found))
            .with_snippet(Snippet::primary(
                format!("expected {} here", self.expected),
                self.span,
            ));

        match self.unclosed {
            Some(span) => diagnostic.with_snippet(Snippet::secondary("unclosed `(`", span)),
            None => diagnostic,
        }
    }
}

impl IntoDiagnostic for EvalError {
    fn into_diagnostic(self) -> Diagnostic {
        let label = match &self {
            EvalError::IntegerOverflow { .. } | EvalError::InvalidInteger { .. } => "this literal",
            EvalError::DivisionByZero { .. } => "this is zero",
            EvalError::Overflow { .. } => "in this expression",
        };

        Diagnostic::error()
            .with_message(self.to_string())
            .with_snippet(Snippet::primary(label, self.span()))
    }
}

impl IntoDiagnostic for ParseError {
    fn into_diagnostic(self) -> Diagnostic {
        match self {
            ParseError::Lexer(error) => error.into_diagnostic(),
            ParseError::Syntax(error) => error.into_diagnostic(),
            ParseError::Eval(error) => error.into_diagnostic(),
        }
    }
}

/// Recursive-descent parser for
///
/// ```text
/// expr   ::= term   ( ('+' | '-') term )*
/// term   ::= factor ( ('*' | '/') factor )*
/// factor ::= NUMBER | '(' expr ')'
/// ```
///
/// Each precedence level loops over its own operators and recurses into
/// the next level for operands, which makes every operator left-associative.
pub struct Parser<'g, 'src, R: Reduce> {
    cursor: Cursor<'g, 'src>,
    reduce: R,
    depth: usize,
}

impl<'g, 'src, R: Reduce> Parser<'g, 'src, R> {
    pub fn new(lexer: Lexer<'g, 'src>, reduce: R) -> Self {
        Self {
            cursor: Cursor::new(lexer),
            reduce,
            depth: 0,
        }
    }

    /// Parses the whole input as one expression. Also returns the
    /// characters the lexer skipped, if it was tolerant.
    ///
    /// A syntax error caused by a fail-fast lex error ending the stream is
    /// reported as that lex error.
    pub fn parse(mut self) -> (ParseResult<R::Output>, Vec<LexError>) {
        let result = self.parse_root().map_err(|err| match err {
            ParseError::Syntax(_) => match self.cursor.take_lex_error() {
                Some(lex_error) => ParseError::Lexer(lex_error),
                None => err,
            },
            err => err,
        });

        (result, self.cursor.into_lex_errors())
    }

    fn parse_root(&mut self) -> ParseResult<R::Output> {
        let expr = self.parse_expr()?;
        self.cursor.expect_end()?;
        Ok(expr.node)
    }

    fn parse_expr(&mut self) -> ParseResult<Spanned<R::Output>> {
        let mut lhs = self.parse_term()?;

        while let Some(op) = self.accept_op(&[BinOp::Add, BinOp::Sub]) {
            let rhs = self.parse_term()?;
            lhs = self.reduce_binary(op, lhs, rhs)?;
        }

        Ok(lhs)
    }

    fn parse_term(&mut self) -> ParseResult<Spanned<R::Output>> {
        let mut lhs = self.parse_factor()?;

        while let Some(op) = self.accept_op(&[BinOp::Mul, BinOp::Div]) {
            let rhs = self.parse_factor()?;
            lhs = self.reduce_binary(op, lhs, rhs)?;
        }

        Ok(lhs)
    }

    fn parse_factor(&mut self) -> ParseResult<Spanned<R::Output>> {
        if let Some(token) = self.cursor.accept_token(TokenKind::Number) {
            let value = parse_integer(token.text, token.span)?;
            log::trace!("literal {value}");

            let node = self.reduce.literal(value, token.span)?;
            return Ok(Spanned::new(node, token.span));
        }

        if self.depth == MAX_NESTING && self.cursor.lookahead().is_some_and(is_lparen) {
            return Err(self
                .cursor
                .error_expected(Expected::Message("a number (parentheses nest too deep)"))
                .into());
        }

        if let Some(open) = self.cursor.accept_token(TokenKind::LParen) {
            self.depth += 1;
            let inner = self.parse_expr()?;
            self.depth -= 1;

            let close = self
                .cursor
                .expect(TokenKind::RParen)
                .map_err(|err| match err {
                    ParseError::Syntax(err) => ParseError::Syntax(SyntaxError {
                        unclosed: Some(open.span),
                        ..err
                    }),
                    err => err,
                })?;

            let span = open.span.union(close.span);
            let node = self.reduce.parenthesized(inner.node, span);
            return Ok(Spanned::new(node, span));
        }

        Err(self
            .cursor
            .error_expected(Expected::Message("a number or `(`"))
            .into())
    }

    fn accept_op(&mut self, ops: &[BinOp]) -> Option<BinOp> {
        ops.iter()
            .copied()
            .find(|op| self.cursor.accept(op.token_kind()))
    }

    fn reduce_binary(
        &mut self,
        op: BinOp,
        lhs: Spanned<R::Output>,
        rhs: Spanned<R::Output>,
    ) -> ParseResult<Spanned<R::Output>> {
        log::trace!("reduce `{op}`");

        let span = lhs.span.union(rhs.span);
        let node = self.reduce.binary(op, lhs, rhs)?;
        Ok(Spanned::new(node, span))
    }
}

fn is_lparen(token: Token) -> bool {
    token.kind == TokenKind::LParen
}

fn parse_integer(text: &str, span: Span) -> Result<i64, EvalError> {
    text.parse().map_err(|err: std::num::ParseIntError| match err.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => EvalError::IntegerOverflow {
            text: text.to_owned(),
            span,
        },
        _ => EvalError::InvalidInteger {
            text: text.to_owned(),
            span,
        },
    })
}
