use std::fmt;

use descent_diagnostic::span::Span;

use crate::NodeCopy;

#[derive(NodeCopy!)]
pub struct Token<'src> {
    pub kind: TokenKind,
    pub text: &'src str,
    pub line: u32,
    pub column: u32,
    pub span: Span,
}

impl Token<'_> {
    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    /// Human-readable description used in "found ..." messages.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Identifier | TokenKind::Number => {
                format!("{} `{}`", self.kind.token_name(), self.text)
            }
            kind => kind.token_name().to_owned(),
        }
    }
}

/// 1-based line and column (in characters).
#[derive(NodeCopy!, Default, PartialOrd, Ord)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(NodeCopy!)]
pub enum TokenKind {
    Keyword(Keyword),
    Identifier,
    Number,

    LParen,
    RParen,

    Dot,
    Comma,
    Semicolon,

    Add,
    Sub,
    Mul,
    Div,
}

#[derive(NodeCopy!)]
pub enum Keyword {
    Module,
    Input,
    Output,
    Inout,
    Endmodule,
    Assign,
    Wire,
}

impl Keyword {
    pub const ALL: [Keyword; 7] = [
        Keyword::Module,
        Keyword::Input,
        Keyword::Output,
        Keyword::Inout,
        Keyword::Endmodule,
        Keyword::Assign,
        Keyword::Wire,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::Module => "module",
            Keyword::Input => "input",
            Keyword::Output => "output",
            Keyword::Inout => "inout",
            Keyword::Endmodule => "endmodule",
            Keyword::Assign => "assign",
            Keyword::Wire => "wire",
        }
    }
}

impl TokenKind {
    pub fn token_name(&self) -> &'static str {
        match self {
            TokenKind::Keyword(kw) => match kw {
                Keyword::Module => "keyword `module`",
                Keyword::Input => "keyword `input`",
                Keyword::Output => "keyword `output`",
                Keyword::Inout => "keyword `inout`",
                Keyword::Endmodule => "keyword `endmodule`",
                Keyword::Assign => "keyword `assign`",
                Keyword::Wire => "keyword `wire`",
            },
            TokenKind::Identifier => "identifier",
            TokenKind::Number => "number",
            TokenKind::LParen => "`(`",
            TokenKind::RParen => "`)`",
            TokenKind::Dot => "`.`",
            TokenKind::Comma => "`,`",
            TokenKind::Semicolon => "`;`",
            TokenKind::Add => "`+`",
            TokenKind::Sub => "`-`",
            TokenKind::Mul => "`*`",
            TokenKind::Div => "`/`",
        }
    }
}
