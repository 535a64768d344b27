use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::{Captures, Match, Regex};

use crate::token::{Keyword, TokenKind};

const MISMATCH_GROUP: &str = "mismatch";

static EXPRESSION: Lazy<Grammar> = Lazy::new(|| {
    GrammarBuilder::new()
        .skip("line_comment", r"//[^\n]*")
        .skip("block_comment", r"(?s)/\*.*?\*/")
        .token("number", r"[0-9]+", TokenKind::Number)
        .token("identifier", r"[A-Za-z_][A-Za-z0-9_]*", TokenKind::Identifier)
        .token("lparen", r"\(", TokenKind::LParen)
        .token("rparen", r"\)", TokenKind::RParen)
        .token("dot", r"\.", TokenKind::Dot)
        .token("comma", ",", TokenKind::Comma)
        .token("semicolon", ";", TokenKind::Semicolon)
        .token("add", r"\+", TokenKind::Add)
        .token("sub", "-", TokenKind::Sub)
        .token("mul", r"\*", TokenKind::Mul)
        .token("div", "/", TokenKind::Div)
        .skip("newline", r"\n")
        .skip("whitespace", r"[ \t\r]+")
        .build()
        .expect("expression grammar is valid")
});

static NETLIST: Lazy<Grammar> = Lazy::new(|| {
    GrammarBuilder::new()
        .token("identifier", r"[a-zA-Z][a-zA-Z0-9_]*", TokenKind::Identifier)
        .token("lparen", r"\(", TokenKind::LParen)
        .token("rparen", r"\)", TokenKind::RParen)
        .token("dot", r"\.", TokenKind::Dot)
        .token("comma", ",", TokenKind::Comma)
        .token("semicolon", ";", TokenKind::Semicolon)
        .token("number", r"[0-9]+(\.[0-9]+)*", TokenKind::Number)
        .skip("newline", r"\n")
        .skip("whitespace", r"[ \t\r]+")
        .skip("block_comment", r"(?s)/\*.*?\*/")
        .skip("line_comment", r"//[^\n]*")
        .keywords(Keyword::ALL)
        .build()
        .expect("netlist grammar is valid")
});

#[derive(thiserror::Error, Debug)]
pub enum GrammarError {
    #[error("rule `{rule}` has an invalid pattern: {source}")]
    InvalidPattern {
        rule: String,
        #[source]
        source: Box<regex::Error>,
    },

    #[error("rule `{rule}` can match the empty string")]
    MatchesEmpty { rule: String },
}

/// What the lexer does with text matched by a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Emit(TokenKind),
    Skip,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub name: String,
    pub pattern: String,
    pub action: Action,
}

/// An ordered set of lexical rules compiled into a single regex.
///
/// Rules are tried in the order they were added and the first one that
/// matches wins, even if a later rule would match more text. A catch-all
/// rule matching any single character is always appended last, so every
/// character of the input is consumed by exactly one rule.
#[derive(Debug)]
pub struct Grammar {
    regex: Regex,
    rules: Vec<(usize, Rule)>,
    mismatch: usize,
    keywords: HashMap<&'static str, Keyword>,
}

/// The outcome of a single match.
#[derive(Clone, Copy)]
pub(crate) enum Matched<'src> {
    Rule(Action, Match<'src>),
    Mismatch(Match<'src>),
}

impl Grammar {
    /// Rules for arithmetic expressions.
    ///
    /// # Panics
    /// Never in practice: the built-in patterns are constant and valid.
    pub fn expression() -> &'static Grammar {
        &EXPRESSION
    }

    /// Rules for Verilog-like netlists, with keyword promotion for
    /// `module`, `input`, `output`, `inout`, `endmodule`, `assign` and `wire`.
    ///
    /// # Panics
    /// Never in practice: the built-in patterns are constant and valid.
    pub fn netlist() -> &'static Grammar {
        &NETLIST
    }

    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter().map(|(_, rule)| rule)
    }

    pub fn keyword(&self, text: &str) -> Option<Keyword> {
        self.keywords.get(text).copied()
    }

    pub(crate) fn regex(&self) -> &Regex {
        &self.regex
    }

    pub(crate) fn classify<'src>(&self, captures: &Captures<'src>) -> Option<Matched<'src>> {
        for (group, rule) in &self.rules {
            if let Some(m) = captures.get(*group) {
                return Some(Matched::Rule(rule.action, m));
            }
        }

        captures.get(self.mismatch).map(Matched::Mismatch)
    }
}

#[derive(Debug, Default, Clone)]
pub struct GrammarBuilder {
    rules: Vec<Rule>,
    keywords: HashMap<&'static str, Keyword>,
}

impl GrammarBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    #[must_use]
    pub fn token(
        self,
        name: impl Into<String>,
        pattern: impl Into<String>,
        kind: TokenKind,
    ) -> Self {
        self.rule(Rule {
            name: name.into(),
            pattern: pattern.into(),
            action: Action::Emit(kind),
        })
    }

    #[must_use]
    pub fn skip(self, name: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.rule(Rule {
            name: name.into(),
            pattern: pattern.into(),
            action: Action::Skip,
        })
    }

    /// Promotes identifiers whose text is exactly `keyword` to that keyword.
    #[must_use]
    pub fn keyword(mut self, keyword: Keyword) -> Self {
        self.keywords.insert(keyword.as_str(), keyword);
        self
    }

    #[must_use]
    pub fn keywords(self, keywords: impl IntoIterator<Item = Keyword>) -> Self {
        keywords.into_iter().fold(self, Self::keyword)
    }

    pub fn build(self) -> Result<Grammar, GrammarError> {
        let mut groups = Vec::with_capacity(self.rules.len() + 1);

        for (i, rule) in self.rules.iter().enumerate() {
            let single = Regex::new(&rule.pattern).map_err(|source| GrammarError::InvalidPattern {
                rule: rule.name.clone(),
                source: Box::new(source),
            })?;

            if single.is_match("") {
                return Err(GrammarError::MatchesEmpty {
                    rule: rule.name.clone(),
                });
            }

            groups.push(format!("(?P<{}>{})", group_name(i), rule.pattern));
        }

        groups.push(format!("(?P<{MISMATCH_GROUP}>(?s).)"));
        let alternation = groups.join("|");

        // individual patterns compiled, so only the size limit can fail here
        let regex = Regex::new(&alternation).map_err(|source| GrammarError::InvalidPattern {
            rule: "<combined>".to_owned(),
            source: Box::new(source),
        })?;

        let group_index = |name: &str| {
            regex
                .capture_names()
                .position(|group| group == Some(name))
                .unwrap_or(0)
        };

        let rules = self
            .rules
            .into_iter()
            .enumerate()
            .map(|(i, rule)| (group_index(&group_name(i)), rule))
            .collect();
        let mismatch = group_index(MISMATCH_GROUP);

        Ok(Grammar {
            regex,
            rules,
            mismatch,
            keywords: self.keywords,
        })
    }
}

fn group_name(index: usize) -> String {
    format!("rule{index}")
}
