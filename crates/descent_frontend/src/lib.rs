#[macro_use]
extern crate macro_rules_attribute;

mod cursor;
mod lexer;
mod parser;

pub mod ast;
pub mod token;

pub use cursor::Cursor;
pub use lexer::{
    tokenize, Action, ErrorPolicy, Grammar, GrammarBuilder, GrammarError, LexError, Lexer,
    LexerOptions, Rule,
};
pub use parser::{
    BuildTree, EvalError, Expected, Fold, ParseError, ParseResult, Parser, Reduce, Spanned,
    SyntaxError, MAX_NESTING,
};

use ast::Expr;

derive_alias! {
    #[derive(Node!)] = #[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)];
    #[derive(NodeCopy!)] = #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)];
}

pub fn lex<'g, 'src>(
    grammar: &'g Grammar,
    source: &'src str,
    options: LexerOptions,
) -> Lexer<'g, 'src> {
    Lexer::new(grammar, source, options)
}

/// Parses `source` with the expression grammar, reducing with `reduce`.
pub fn parse_with<R: Reduce>(
    source: &str,
    reduce: R,
    options: LexerOptions,
) -> (ParseResult<R::Output>, Vec<LexError>) {
    Parser::new(lex(Grammar::expression(), source, options), reduce).parse()
}

pub fn evaluate(source: &str) -> ParseResult<i64> {
    parse_with(source, Fold, LexerOptions::default()).0
}

pub fn build_tree(source: &str) -> ParseResult<Expr> {
    parse_with(source, BuildTree, LexerOptions::default()).0
}
