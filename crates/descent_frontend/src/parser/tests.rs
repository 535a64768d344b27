use descent_diagnostic::span::Span;

use super::{
    BuildTree, EvalError, Expected, Fold, ParseError, ParseResult, Reduce, Spanned, SyntaxError,
    MAX_NESTING,
};
use crate::ast::BinOp;
use crate::lexer::LexerOptions;
use crate::token::TokenKind;
use crate::{build_tree, evaluate, parse_with};

fn tree(source: &str) -> String {
    match build_tree(source) {
        Ok(tree) => tree.to_string(),
        Err(err) => format!("error: {err}"),
    }
}

fn tree_then_fold(source: &str) -> ParseResult<i64> {
    build_tree(source).and_then(|tree| Ok(tree.evaluate()?))
}

fn syntax_error(source: &str) -> SyntaxError {
    match evaluate(source) {
        Err(ParseError::Syntax(err)) => err,
        other => panic!("expected a syntax error for {source:?}, got {other:?}"),
    }
}

#[test]
fn precedence() {
    assert_eq!(evaluate("2 + 3 * 4"), Ok(14));
    assert_eq!(evaluate("(2 + 3) * 4"), Ok(20));
    assert_eq!(evaluate("2 + (3 + 4) * 5"), Ok(37));
}

#[test]
fn left_associative() {
    assert_eq!(evaluate("8 - 3 - 2"), Ok(3));
    assert_eq!(evaluate("16 / 4 / 2"), Ok(2));

    insta::assert_snapshot!(tree("8 - 3 - 2"), @"(- (- 8 3) 2)");
}

#[test]
fn trees() {
    insta::assert_snapshot!(tree("2"), @"2");
    insta::assert_snapshot!(tree("2 + 3 * 4"), @"(+ 2 (* 3 4))");
    insta::assert_snapshot!(tree("2 + (3 + 4) * 5"), @"(+ 2 (* (+ 3 4) 5))");
    insta::assert_snapshot!(tree("2 + 3 + 4"), @"(+ (+ 2 3) 4)");
    insta::assert_snapshot!(tree("((7))"), @"7");
}

#[test]
fn strategies_agree() {
    let sources = [
        "1",
        "2 + 3 * 4",
        "(2 + 3) * 4",
        "8 - 3 - 2",
        "100 / 7 / 2 * 3 - (4 - 5)",
        "((((1 + 2) * 3) - 4) / 5)",
        "1 / (2 - 2)",
        "(1) / (0)",
        "9223372036854775807 + 1",
        "99999999999999999999",
        "2 +",
        "(2 + 3",
        "2 3",
    ];

    for source in sources {
        assert_eq!(tree_then_fold(source), evaluate(source), "{source:?}");
    }
}

#[test]
fn whitespace_and_comments_do_not_matter() {
    let plain = "2+3*(4-1)";
    let noisy = " 2 /* two */ +\n\t3 // three\n * ( 4\n - 1 ) ";

    assert_eq!(tree(plain), tree(noisy));
    assert_eq!(evaluate(plain), evaluate(noisy));
    assert_eq!(evaluate(noisy), Ok(11));
}

#[test]
fn missing_operand() {
    let err = syntax_error("2 +");

    assert_eq!(err.expected, Expected::Message("a number or `(`"));
    assert_eq!(err.found, "end of input");
    assert_eq!((err.line, err.column), (1, 4));
}

#[test]
fn unclosed_paren() {
    let err = syntax_error("(2 + 3");

    assert_eq!(err.expected, Expected::Token(TokenKind::RParen));
    assert_eq!(err.found, "end of input");
    assert_eq!((err.line, err.column), (1, 7));
    assert_eq!(err.span, Span::empty(6));
    assert_eq!(err.unclosed, Some(Span::new(0, 1)));
}

#[test]
fn unexpected_token() {
    let err = syntax_error("1 +\n  )");

    assert_eq!(err.expected, Expected::Message("a number or `(`"));
    assert_eq!(err.found, "`)`");
    assert_eq!((err.line, err.column), (2, 3));
}

#[test]
fn trailing_tokens() {
    let err = syntax_error("2 3");

    assert_eq!(err.expected, Expected::EndOfInput);
    assert_eq!(err.unclosed, None);
    assert_eq!(err.found, "number `3`");
    assert_eq!((err.line, err.column), (1, 3));
}

#[test]
fn empty_input() {
    let err = syntax_error("");

    assert_eq!(err.found, "end of input");
    assert_eq!((err.line, err.column), (1, 1));
}

#[test]
fn tolerant_lexing_keeps_parsing() {
    let (result, lex_errors) = parse_with("2 @ + 3", Fold, LexerOptions::default());

    assert_eq!(result, Ok(5));
    assert_eq!(lex_errors.len(), 1);
    assert_eq!(lex_errors[0].character, '@');
    assert_eq!((lex_errors[0].line, lex_errors[0].column), (1, 3));
}

#[test]
fn fail_fast_lexing_aborts() {
    let (result, lex_errors) = parse_with("2 @ + 3", Fold, LexerOptions::fail_fast());

    assert!(matches!(result, Err(ParseError::Lexer(err)) if err.character == '@'));
    assert!(lex_errors.is_empty());
}

#[test]
fn lex_error_replaces_the_syntax_error_it_caused() {
    let (result, _) = parse_with("(1 + 2 @) * 2", Fold, LexerOptions::fail_fast());
    assert!(matches!(result, Err(ParseError::Lexer(err)) if err.column == 8));

    let (result, _) = parse_with("(1 + 2 @) * 2", Fold, LexerOptions::default());
    assert_eq!(result, Ok(6));
}

#[test]
fn earlier_eval_error_is_kept_under_fail_fast() {
    for options in [LexerOptions::fail_fast(), LexerOptions::default()] {
        let (result, _) = parse_with("1 / 0 @", Fold, options);
        assert!(matches!(result, Err(ParseError::Eval(EvalError::DivisionByZero { .. }))));
    }
}

#[test]
fn division_by_zero_points_at_divisor() {
    assert_eq!(
        evaluate("1 / (2 - 2)"),
        Err(ParseError::Eval(EvalError::DivisionByZero {
            span: Span::new(4, 11)
        }))
    );

    // building the tree never evaluates
    assert!(build_tree("1 / 0").is_ok());
}

#[test]
fn literal_overflow() {
    assert!(matches!(
        evaluate("99999999999999999999"),
        Err(ParseError::Eval(EvalError::IntegerOverflow { text, .. }))
            if text == "99999999999999999999"
    ));
}

#[test]
fn tree_spans_cover_parentheses() {
    let tree = build_tree("(1 + 2) * 3").unwrap();
    assert_eq!(tree.span, Span::new(0, 11));

    let crate::ast::ExprKind::Binary { lhs, rhs, .. } = &tree.kind else {
        panic!("expected a binary node, got {tree:?}");
    };
    assert_eq!(lhs.span, Span::new(0, 7));
    assert_eq!(rhs.span, Span::new(10, 11));
}

/// Renders reverse polish notation.
struct Rpn;

impl Reduce for Rpn {
    type Output = String;

    fn literal(&mut self, value: i64, _span: Span) -> ParseResult<String> {
        Ok(value.to_string())
    }

    fn binary(
        &mut self,
        op: BinOp,
        lhs: Spanned<String>,
        rhs: Spanned<String>,
    ) -> ParseResult<String> {
        Ok(format!("{} {} {op}", lhs.node, rhs.node))
    }
}

#[test]
fn custom_strategy() {
    let (result, _) = parse_with("2 + 3 * (4 - 1)", Rpn, LexerOptions::default());
    assert_eq!(result.as_deref(), Ok("2 3 4 1 - * +"));
}

#[test]
fn independent_parses_on_threads() {
    let sources = ["1 + 1", "2 * 3", "(8 - 3) - 2", "7 / 2"];

    let results: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = sources
            .iter()
            .map(|source| scope.spawn(move || evaluate(source)))
            .collect();

        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(results, [Ok(2), Ok(6), Ok(3), Ok(3)]);

    let (tree, _) = parse_with("7 / 2", BuildTree, LexerOptions::default());
    assert_eq!(tree.map(|t| t.to_string()).as_deref(), Ok("(/ 7 2)"));
}

#[test]
fn long_flat_chains() {
    let source = vec!["1"; 200_000].join("+");
    assert_eq!(evaluate(&source), Ok(200_000));

    let tree = build_tree(&source).unwrap();
    assert_eq!(tree.evaluate(), Ok(200_000));
    assert!(tree.to_string().starts_with("(+ (+ "));

    drop(tree);
}

fn nested(depth: usize) -> String {
    format!("{}1{}", "(".repeat(depth), ")".repeat(depth))
}

#[test]
fn nesting_limit() {
    assert_eq!(evaluate(&nested(MAX_NESTING)), Ok(1));
    assert!(build_tree(&nested(MAX_NESTING)).is_ok());

    let err = syntax_error(&nested(MAX_NESTING + 1));
    assert!(matches!(err.expected, Expected::Message(_)));
    assert_eq!(err.found, "`(`");
    assert_eq!(err.column as usize, MAX_NESTING + 1);

    let err = syntax_error(&nested(50_000));
    assert_eq!(err.column as usize, MAX_NESTING + 1);
}
