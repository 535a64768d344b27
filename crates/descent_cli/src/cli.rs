use std::io;

use clap::{Args, Parser, Subcommand};
use descent_diagnostic::source::SourceFile;
use descent_frontend::{ErrorPolicy, LexerOptions};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Evaluate an arithmetic expression.
    Eval {
        #[command(flatten)]
        input: Input,
    },

    /// Print the syntax tree of an arithmetic expression.
    Tree {
        #[command(flatten)]
        input: Input,

        /// Print the tree as JSON instead of an s-expression.
        #[arg(long)]
        json: bool,
    },

    /// Print the token stream.
    Tokens {
        #[command(flatten)]
        input: Input,

        /// Use the netlist grammar instead of the expression grammar.
        #[arg(long)]
        netlist: bool,

        /// Print the tokens as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct Input {
    /// The input file.
    pub input: String,

    /// Whether the given input should be used directly as the source instead
    /// of as the source file path.
    #[arg(long, short, action)]
    pub source: bool,

    /// Stop at the first character no rule matches instead of skipping it.
    #[arg(long)]
    pub strict: bool,
}

impl Input {
    pub fn load(&self) -> io::Result<SourceFile> {
        if self.source {
            Ok(SourceFile::new("<input>", self.input.as_str()))
        } else {
            log::debug!("reading {}", self.input);
            let source = std::fs::read_to_string(&self.input)?;
            Ok(SourceFile::new(self.input.as_str(), source))
        }
    }

    pub fn lexer_options(&self) -> LexerOptions {
        let policy = if self.strict {
            ErrorPolicy::FailFast
        } else {
            ErrorPolicy::Tolerant
        };

        LexerOptions { policy }
    }
}
