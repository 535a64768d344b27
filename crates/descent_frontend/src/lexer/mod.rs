#[cfg(test)]
mod tests;

mod grammar;

use descent_diagnostic::span::Span;
use descent_diagnostic::{Diagnostic, IntoDiagnostic, Snippet};
use regex::CaptureMatches;

pub use grammar::{Action, Grammar, GrammarBuilder, GrammarError, Rule};
use grammar::Matched;

use crate::token::*;

#[derive(thiserror::Error, serde::Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[error("unexpected character {character:?} at line {line}, column {column}")]
pub struct LexError {
    pub character: char,
    pub line: u32,
    pub column: u32,
    pub span: Span,
}

impl LexError {
    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }
}

impl IntoDiagnostic for LexError {
    fn into_diagnostic(self) -> Diagnostic {
        Diagnostic::error()
            .with_message(format!("unexpected character {:?}", self.character))
            .with_snippet(Snippet::primary("not part of any token", self.span))
    }
}

/// What the lexer does when no rule matches a character.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Record the character, log it and keep scanning.
    #[default]
    Tolerant,

    /// Yield the error and stop.
    FailFast,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LexerOptions {
    pub policy: ErrorPolicy,
}

impl LexerOptions {
    pub fn fail_fast() -> Self {
        Self {
            policy: ErrorPolicy::FailFast,
        }
    }
}

/// A lazy, single-pass token stream over `source`.
///
/// Whitespace and comments are consumed without producing tokens. Under
/// [`ErrorPolicy::Tolerant`] the iterator never yields `Err`; unmatched
/// characters are collected and can be read back with [`Lexer::errors`].
pub struct Lexer<'g, 'src> {
    grammar: &'g Grammar,
    source: &'src str,
    matches: CaptureMatches<'g, 'src>,
    options: LexerOptions,

    errors: Vec<LexError>,

    line: u32,
    pos: usize,
    done: bool,

    // column of the character at `mark`, on the current line
    mark: usize,
    mark_column: u32,
}

impl<'g, 'src> Lexer<'g, 'src> {
    pub fn new(grammar: &'g Grammar, source: &'src str, options: LexerOptions) -> Self {
        Self {
            grammar,
            source,
            matches: grammar.regex().captures_iter(source),
            options,

            errors: vec![],

            line: 1,
            pos: 0,
            done: false,

            mark: 0,
            mark_column: 1,
        }
    }

    /// Characters skipped so far under the tolerant policy.
    pub fn errors(&self) -> &[LexError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<LexError> {
        self.errors
    }

    /// Position just past the last consumed character.
    pub fn eof_position(&self) -> Position {
        Position::new(self.line, self.column_of(self.pos))
    }

    pub fn eof_span(&self) -> Span {
        Span::empty(self.pos)
    }

    fn lex_token(&mut self) -> Option<Result<Token<'src>, LexError>> {
        loop {
            let captures = self.matches.next()?;
            let matched = self.grammar.classify(&captures)?;

            let m = match matched {
                Matched::Rule(_, m) | Matched::Mismatch(m) => m,
            };

            let line = self.line;
            let column = self.advance_column(m.start());
            let span = Span::new(m.start(), m.end());

            self.pos = m.end();
            self.track_newlines(m.start(), m.as_str());

            match matched {
                Matched::Rule(Action::Skip, _) => continue,

                Matched::Rule(Action::Emit(kind), _) => {
                    let kind = match kind {
                        TokenKind::Identifier => self
                            .grammar
                            .keyword(m.as_str())
                            .map_or(kind, TokenKind::Keyword),
                        kind => kind,
                    };

                    log::trace!("{line}:{column} {kind:?} {:?}", m.as_str());

                    return Some(Ok(Token {
                        kind,
                        text: m.as_str(),
                        line,
                        column,
                        span,
                    }));
                }

                Matched::Mismatch(_) => {
                    let character = m.as_str().chars().next()?;
                    let error = LexError {
                        character,
                        line,
                        column,
                        span,
                    };

                    match self.options.policy {
                        ErrorPolicy::Tolerant => {
                            log::warn!("skipping {error}");
                            self.errors.push(error);
                        }
                        ErrorPolicy::FailFast => {
                            log::debug!("stopping at {error}");
                            self.done = true;
                            return Some(Err(error));
                        }
                    }
                }
            }
        }
    }

    fn track_newlines(&mut self, start: usize, text: &str) {
        if let Some(last) = text.rfind('\n') {
            let count = text.bytes().filter(|&b| b == b'\n').count();
            self.line += count as u32;
            self.mark = start + last + 1;
            self.mark_column = 1;
        }
    }

    /// Columns only move forward, so each character is counted once.
    fn column_of(&self, byte: usize) -> u32 {
        let between = self.source.get(self.mark..byte).unwrap_or_default();
        self.mark_column + between.chars().count() as u32
    }

    fn advance_column(&mut self, byte: usize) -> u32 {
        let column = self.column_of(byte);
        if byte > self.mark {
            self.mark = byte;
            self.mark_column = column;
        }
        column
    }
}

impl<'src> Iterator for Lexer<'_, 'src> {
    type Item = Result<Token<'src>, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let next = self.lex_token();
        if next.is_none() {
            self.done = true;
        }

        next
    }
}

/// Runs a lexer to completion, returning every token and every unmatched
/// character.
pub fn tokenize<'src>(
    grammar: &Grammar,
    source: &'src str,
    options: LexerOptions,
) -> (Vec<Token<'src>>, Vec<LexError>) {
    let mut lexer = Lexer::new(grammar, source, options);

    let mut tokens = vec![];
    let mut fatal = None;

    for result in lexer.by_ref() {
        match result {
            Ok(token) => tokens.push(token),
            Err(error) => fatal = Some(error),
        }
    }

    let mut errors = lexer.into_errors();
    errors.extend(fatal);

    (tokens, errors)
}
