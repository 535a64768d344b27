mod cli;

use std::io;

use clap::Parser as _;
use cli::{Cli, Command, Input};
use descent_diagnostic::source::SourceFile;
use descent_diagnostic::{
    DiagnosticEmitter, DiagnosticKind, IntoDiagnostic, PrettyDiagnosticEmitter,
};
use descent_frontend::{parse_with, tokenize, BuildTree, Fold, Grammar, LexError, ParseResult};

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("errors while processing {0}")]
    HadErrors(String),
}

type CliResult<T> = Result<T, CliError>;

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let mut emitter = PrettyDiagnosticEmitter::default();

    match run(&cli.command, &mut emitter) {
        Ok(output) => println!("{output}"),
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}

fn run(command: &Command, emitter: &mut impl DiagnosticEmitter) -> CliResult<String> {
    match command {
        Command::Eval { input } => {
            let source = load(input)?;
            let (result, lex_errors) =
                parse_with(source.source_str(), Fold, input.lexer_options());

            let value = finish(result, lex_errors, &source, emitter)?;
            Ok(value.to_string())
        }

        Command::Tree { input, json } => {
            let source = load(input)?;
            let (result, lex_errors) =
                parse_with(source.source_str(), BuildTree, input.lexer_options());

            let tree = finish(result, lex_errors, &source, emitter)?;
            if *json {
                Ok(serde_json::to_string_pretty(&tree)?)
            } else {
                Ok(tree.to_string())
            }
        }

        Command::Tokens {
            input,
            netlist,
            json,
        } => {
            let source = load(input)?;
            let grammar = if *netlist {
                Grammar::netlist()
            } else {
                Grammar::expression()
            };

            let (tokens, lex_errors) =
                tokenize(grammar, source.source_str(), input.lexer_options());
            let had_errors = input.strict && !lex_errors.is_empty();
            report_lex_errors(lex_errors, input.strict, &source, emitter)?;

            if had_errors {
                return Err(CliError::HadErrors(source.name().to_owned()));
            }

            if *json {
                return Ok(serde_json::to_string_pretty(&tokens)?);
            }

            let lines: Vec<_> = tokens
                .iter()
                .map(|t| {
                    format!(
                        "{}:{}\t{}\t{}",
                        t.line,
                        t.column,
                        t.kind.token_name(),
                        t.text
                    )
                })
                .collect();
            Ok(lines.join("\n"))
        }
    }
}

fn load(input: &Input) -> CliResult<SourceFile> {
    let source = input.load()?;
    log::info!("processing {}", source.name());
    Ok(source)
}

/// Reports skipped characters as warnings and a failed parse as an error.
fn finish<T>(
    result: ParseResult<T>,
    lex_errors: Vec<LexError>,
    source: &SourceFile,
    emitter: &mut impl DiagnosticEmitter,
) -> CliResult<T> {
    report_lex_errors(lex_errors, false, source, emitter)?;

    result.or_else(|err| {
        emitter.emit_diagnostic(err.into_diagnostic(), source)?;
        Err(CliError::HadErrors(source.name().to_owned()))
    })
}

fn report_lex_errors(
    lex_errors: Vec<LexError>,
    fatal: bool,
    source: &SourceFile,
    emitter: &mut impl DiagnosticEmitter,
) -> io::Result<()> {
    for error in lex_errors {
        let mut diagnostic = error.into_diagnostic();
        if !fatal {
            diagnostic.kind = DiagnosticKind::Warning;
        }
        emitter.emit_diagnostic(diagnostic, source)?;
    }

    Ok(())
}
