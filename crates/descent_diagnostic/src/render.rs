use std::io;

use termcolor::{ColorSpec, WriteColor};
use unicode_width::UnicodeWidthStr;

use super::source::SourceFile;
use super::{Config, Diagnostic, DiagnosticKind, Snippet, SnippetKind};

const TAB: &str = "    ";

impl Diagnostic {
    pub fn write_to_stream(
        &self,
        source: &SourceFile,
        config: &Config,
        stream: &mut impl WriteColor,
    ) -> io::Result<()> {
        DiagnosticWriter {
            diagnostic: self,
            source,
            stream,
            config,
        }
        .draw_all()
    }
}

struct DiagnosticWriter<'stream, 'a, W: WriteColor> {
    diagnostic: &'a Diagnostic,
    source: &'a SourceFile,

    stream: &'stream mut W,
    config: &'a Config,
}

impl<'a, W: WriteColor> DiagnosticWriter<'_, 'a, W> {
    fn draw_all(mut self) -> io::Result<()> {
        self.draw_header()?;

        for snippet in &self.diagnostic.snippets {
            self.draw_snippet(snippet)?;
        }

        Ok(())
    }

    fn draw_header(&mut self) -> io::Result<()> {
        self.stream.set_color(self.get_primary_color())?;
        write!(self.stream, "{}:", self.diagnostic.kind.as_str())?;
        self.stream.reset()?;

        match &self.diagnostic.message {
            Some(message) => writeln!(self.stream, " {message}"),
            None => writeln!(self.stream),
        }
    }

    fn draw_snippet(&mut self, snippet: &Snippet) -> io::Result<()> {
        let name = self.source.name();

        let Some((line_num, col_num)) = self.source.byte_to_line_col(snippet.span.start) else {
            self.stream.set_color(&self.config.subtle)?;
            writeln!(self.stream, "In {name}")?;
            self.stream.reset()?;
            return Ok(());
        };

        self.stream.set_color(&self.config.subtle)?;
        writeln!(self.stream, "In {name}:{line_num}:{col_num}")?;
        self.stream.reset()?;

        let line = line_num - 1;
        let first = line.saturating_sub(self.config.context_size);
        let last = (line + 1 + self.config.context_size).min(self.source.num_lines());
        let line_num_width = 1 + last.max(1).ilog10() as usize;

        for index in first..last {
            let Some(line_str) = self.source.line_str(index) else {
                break;
            };

            self.draw_gutter(Some(index + 1), line_num_width)?;
            writeln!(self.stream, "{}", line_str.replace('\t', TAB))?;

            if index == line {
                self.draw_gutter(None, line_num_width)?;
                self.draw_underline(snippet, line_str, index)?;
            }
        }

        writeln!(self.stream)
    }

    fn draw_underline(
        &mut self,
        snippet: &Snippet,
        line_str: &str,
        index: usize,
    ) -> io::Result<()> {
        let line_start = self.source.line_to_byte(index).unwrap_or(0);

        let start = (snippet.span.start - line_start).min(line_str.len());
        let end = snippet
            .span
            .end
            .saturating_sub(line_start)
            .clamp(start, line_str.len());

        let offset = line_str.get(..start).map_or(start, str_width);
        let width = line_str.get(start..end).map_or(1, str_width).max(1);

        self.stream
            .set_color(self.get_snippet_color(snippet.kind))?;

        write!(self.stream, "{:<offset$}", "")?;
        for _ in 0..width {
            write!(self.stream, "{}", self.config.underline)?;
        }
        writeln!(
            self.stream,
            "{}{}",
            self.config.underline_after, snippet.label
        )?;

        self.stream.reset()
    }

    fn draw_gutter(&mut self, line: Option<usize>, line_num_width: usize) -> io::Result<()> {
        self.stream.set_color(&self.config.subtle)?;

        match line {
            Some(line) => write!(self.stream, "{line:>line_num_width$}")?,
            None => write!(self.stream, "{:>line_num_width$}", "")?,
        }

        write!(self.stream, " {} ", self.config.gutter)?;

        self.stream.reset()
    }

    fn get_primary_color(&self) -> &'a ColorSpec {
        match self.diagnostic.kind {
            DiagnosticKind::Warning => &self.config.warning_color,
            DiagnosticKind::Error => &self.config.error_color,
        }
    }

    fn get_snippet_color(&self, kind: SnippetKind) -> &'a ColorSpec {
        match kind {
            SnippetKind::Primary => self.get_primary_color(),
            SnippetKind::Secondary => &self.config.emphasis,
        }
    }
}

fn str_width(s: &str) -> usize {
    let num_tabs = s.chars().filter(|&ch| ch == '\t').count();
    s.width() + num_tabs * TAB.len()
}
