//! Colored terminal output.

use std::io::{self, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Writes sections, progress, warnings and success lines to the terminal.
///
/// Status lines go to stdout; warnings and errors go to stderr. `quiet`
/// suppresses everything but errors and raw output.
#[derive(Debug, Clone)]
pub struct OutputManager {
    verbose: bool,
    quiet: bool,
    color: ColorChoice,
}

impl OutputManager {
    /// Creates an output manager with automatic color detection.
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            color: ColorChoice::Auto,
        }
    }

    /// Disables colors.
    pub fn without_color(mut self) -> Self {
        self.color = ColorChoice::Never;
        self
    }

    fn stdout(&self) -> StandardStream {
        StandardStream::stdout(self.color)
    }

    fn stderr(&self) -> StandardStream {
        StandardStream::stderr(self.color)
    }

    fn colored(
        stream: &mut StandardStream,
        color: Color,
        bold: bool,
        prefix: &str,
        message: &str,
    ) -> io::Result<()> {
        stream.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(bold))?;
        write!(stream, "{prefix}")?;
        stream.reset()?;
        writeln!(stream, "{message}")
    }

    /// Section header.
    pub fn section(&self, title: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let mut out = self.stdout();
        writeln!(out)?;
        out.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true))?;
        writeln!(out, "{title}")?;
        out.reset()
    }

    /// Progress line.
    pub fn progress(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        Self::colored(&mut self.stdout(), Color::Blue, true, "→ ", message)
    }

    /// Success line.
    pub fn success(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        Self::colored(&mut self.stdout(), Color::Green, true, "✓ ", message)
    }

    /// Warning line on stderr.
    pub fn warn(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        Self::colored(&mut self.stderr(), Color::Yellow, true, "⚠ ", message)
    }

    /// Error line on stderr, printed even when quiet.
    pub fn error(&self, message: &str) -> io::Result<()> {
        Self::colored(&mut self.stderr(), Color::Red, true, "✗ ", message)
    }

    /// Detail line, only in verbose mode.
    pub fn verbose(&self, message: &str) -> io::Result<()> {
        if !self.verbose || self.quiet {
            return Ok(());
        }
        let mut out = self.stdout();
        out.set_color(ColorSpec::new().set_dimmed(true))?;
        writeln!(out, "  {message}")?;
        out.reset()
    }

    /// Indented plain line.
    pub fn indent(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        writeln!(self.stdout(), "  {message}")
    }

    /// Unstyled output, printed even when quiet.
    pub fn println(&self, message: &str) -> io::Result<()> {
        let mut out = io::stdout().lock();
        writeln!(out, "{message}")
    }
}
