use super::{tokenize, Grammar, LexError, Lexer, LexerOptions};
use crate::token::{Keyword, Position, Token, TokenKind};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn render(tokens: &[Token], errors: &[LexError]) -> String {
    let tokens = tokens
        .iter()
        .map(|t| format!("{}:{} {:?} {:?}", t.line, t.column, t.kind, t.text));
    let errors = errors
        .iter()
        .map(|e| format!("error {}:{} {:?}", e.line, e.column, e.character));

    tokens.chain(errors).collect::<Vec<_>>().join("\n")
}

fn lex_netlist(source: &str) -> String {
    let (tokens, errors) = tokenize(Grammar::netlist(), source, LexerOptions::default());
    render(&tokens, &errors)
}

fn lex_expr(source: &str) -> String {
    let (tokens, errors) = tokenize(Grammar::expression(), source, LexerOptions::default());
    render(&tokens, &errors)
}

#[test]
fn keyword_is_promoted() {
    let (tokens, errors) = tokenize(Grammar::netlist(), "module", LexerOptions::default());

    assert!(errors.is_empty());
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::Keyword(Keyword::Module));
    assert_eq!(tokens[0].text, "module");
}

#[test]
fn keyword_promotion_is_exact() {
    insta::assert_snapshot!(lex_netlist("modules Module wire_a wire"), @r###"
    1:1 Identifier "modules"
    1:9 Identifier "Module"
    1:16 Identifier "wire_a"
    1:23 Keyword(Wire) "wire"
    "###);
}

#[test]
fn expression_grammar_has_no_keywords() {
    insta::assert_snapshot!(lex_expr("module"), @r###"1:1 Identifier "module""###);
}

#[test]
fn line_and_column() {
    let (tokens, _) = tokenize(Grammar::expression(), "a\nb", LexerOptions::default());

    assert_eq!(tokens[1].text, "b");
    assert_eq!(tokens[1].position(), Position::new(2, 1));
}

#[test]
fn netlist_module() {
    let source = "module top(a, b);\n  input a; // clock\n  /* multi\n     line */ output b;\n\
                  endmodule\n";

    insta::assert_snapshot!(lex_netlist(source), @r###"
    1:1 Keyword(Module) "module"
    1:8 Identifier "top"
    1:11 LParen "("
    1:12 Identifier "a"
    1:13 Comma ","
    1:15 Identifier "b"
    1:16 RParen ")"
    1:17 Semicolon ";"
    2:3 Keyword(Input) "input"
    2:9 Identifier "a"
    2:10 Semicolon ";"
    4:14 Keyword(Output) "output"
    4:21 Identifier "b"
    4:22 Semicolon ";"
    5:1 Keyword(Endmodule) "endmodule"
    "###);
}

#[test]
fn netlist_numbers() {
    insta::assert_snapshot!(lex_netlist("1.2.3 12 .5"), @r###"
    1:1 Number "1.2.3"
    1:7 Number "12"
    1:10 Dot "."
    1:11 Number "5"
    "###);
}

#[test]
fn comments_are_not_division() {
    insta::assert_snapshot!(lex_expr("1 /* a\nb */ + // c\n2 / 4"), @r###"
    1:1 Number "1"
    2:6 Add "+"
    3:1 Number "2"
    3:3 Div "/"
    3:5 Number "4"
    "###);
}

#[test]
fn block_comments_are_not_greedy() {
    insta::assert_snapshot!(lex_expr("/* a */ 1 /* b */"), @r###"1:9 Number "1""###);
}

#[test]
fn mismatch_is_tolerated() {
    init_logger();

    insta::assert_snapshot!(lex_expr("2 @ 3"), @r###"
    1:1 Number "2"
    1:5 Number "3"
    error 1:3 '@'
    "###);
}

#[test]
fn columns_count_characters() {
    insta::assert_snapshot!(lex_expr("é 1"), @r###"
    1:3 Number "1"
    error 1:1 'é'
    "###);
}

#[test]
fn fail_fast_stops_at_mismatch() {
    let mut lexer = Lexer::new(Grammar::expression(), "2 @ 3", LexerOptions::fail_fast());

    assert_eq!(lexer.next().map(|t| t.map(|t| t.text)), Some(Ok("2")));

    let err = lexer.next().and_then(Result::err).unwrap();
    assert_eq!(err.character, '@');
    assert_eq!(err.position(), Position::new(1, 3));

    assert!(lexer.next().is_none());
    assert!(lexer.errors().is_empty());
}

#[test]
fn tokens_are_produced_on_demand() {
    let mut lexer = Lexer::new(Grammar::expression(), "1 + @", LexerOptions::default());

    assert!(lexer.next().is_some());
    assert!(lexer.errors().is_empty());

    assert_eq!(lexer.by_ref().count(), 1);
    assert_eq!(lexer.errors().len(), 1);
}

#[test]
fn eof_position_after_last_line() {
    let mut lexer = Lexer::new(Grammar::expression(), "ab\ncd ", LexerOptions::default());
    lexer.by_ref().for_each(drop);

    assert_eq!(lexer.eof_position(), Position::new(2, 4));
    assert_eq!(lexer.eof_span().start, 6);
}

#[test]
fn empty_input() {
    let (tokens, errors) = tokenize(Grammar::netlist(), "", LexerOptions::default());
    assert!(tokens.is_empty());
    assert!(errors.is_empty());
}

#[test]
fn columns_on_a_long_line() {
    let source = vec!["1"; 100_000].join("+");
    let (tokens, errors) = tokenize(Grammar::expression(), &source, LexerOptions::default());

    assert!(errors.is_empty());
    assert_eq!(tokens.len(), 199_999);

    let last = tokens[tokens.len() - 1];
    assert_eq!(last.position(), Position::new(1, 199_999));
    assert_eq!(last.span.start, 199_998);
}

#[test]
fn columns_restart_inside_block_comments() {
    insta::assert_snapshot!(lex_expr("ab /* é\né */ cd\n  é"), @r###"
    1:1 Identifier "ab"
    2:6 Identifier "cd"
    error 3:3 'é'
    "###);
}

#[test]
fn identifiers_are_ascii() {
    insta::assert_snapshot!(lex_netlist("aé b_1"), @r###"
    1:1 Identifier "a"
    1:4 Identifier "b_1"
    error 1:2 'é'
    "###);
}
