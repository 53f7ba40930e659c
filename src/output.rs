//! Line-oriented output sinks.
//!
//! The renderer only ever hands complete lines of markup to a sink. A
//! decorated sink turns the markup into ANSI escape codes, an undecorated
//! one strips it. Each sink carries the [`Decorator`] that reads its markup
//! dialect ([`Markup`] unless replaced).

use std::io::{self, Write};
use std::sync::Arc;

use crossterm::tty::IsTty;

use crate::markup::{Decorator, Markup};

/// Destination for rendered lines.
pub trait OutputSink {
    /// Write one complete line (without the trailing newline).
    ///
    /// # Errors
    ///
    /// Propagates any I/O failure of the underlying destination.
    fn write_line(&mut self, line: &str) -> io::Result<()>;

    /// Whether markup is turned into terminal styling.
    fn is_decorated(&self) -> bool;

    /// The markup dialect of the lines this sink accepts.
    fn decorator(&self) -> Arc<dyn Decorator> {
        Arc::new(Markup)
    }
}

impl<S: OutputSink + ?Sized> OutputSink for &mut S {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        (**self).write_line(line)
    }

    fn is_decorated(&self) -> bool {
        (**self).is_decorated()
    }

    fn decorator(&self) -> Arc<dyn Decorator> {
        (**self).decorator()
    }
}

fn decorate(decorator: &dyn Decorator, line: &str, decorated: bool) -> String {
    if decorated {
        decorator.decorate(line)
    } else {
        decorator.strip(line)
    }
}

/// Collects lines in memory.
#[derive(Debug, Clone)]
pub struct BufferedOutput {
    lines: Vec<String>,
    decorated: bool,
    decorator: Arc<dyn Decorator>,
}

impl Default for BufferedOutput {
    fn default() -> Self {
        Self {
            lines: Vec::new(),
            decorated: false,
            decorator: Arc::new(Markup),
        }
    }
}

impl BufferedOutput {
    /// Create an undecorated buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether markup is converted to ANSI codes.
    #[must_use]
    pub fn decorated(mut self, decorated: bool) -> Self {
        self.decorated = decorated;
        self
    }

    /// Read lines with another markup dialect.
    #[must_use]
    pub fn with_decorator(mut self, decorator: impl Decorator + 'static) -> Self {
        self.decorator = Arc::new(decorator);
        self
    }

    /// Lines written so far.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// All lines joined with `\n`, each line terminated.
    #[must_use]
    pub fn contents(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }

    /// Take the collected lines, leaving the buffer empty.
    pub fn take_lines(&mut self) -> Vec<String> {
        std::mem::take(&mut self.lines)
    }

    /// Forget everything written so far.
    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

impl OutputSink for BufferedOutput {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.lines.push(decorate(&*self.decorator, line, self.decorated));
        Ok(())
    }

    fn is_decorated(&self) -> bool {
        self.decorated
    }

    fn decorator(&self) -> Arc<dyn Decorator> {
        Arc::clone(&self.decorator)
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullOutput;

impl OutputSink for NullOutput {
    fn write_line(&mut self, _line: &str) -> io::Result<()> {
        Ok(())
    }

    fn is_decorated(&self) -> bool {
        false
    }
}

/// Writes lines to any [`Write`] implementation.
#[derive(Debug)]
pub struct ConsoleOutput<W: Write> {
    writer: W,
    decorated: bool,
    decorator: Arc<dyn Decorator>,
}

impl ConsoleOutput<io::Stdout> {
    /// Standard output, decorated when it is a terminal.
    #[must_use]
    pub fn stdout() -> Self {
        let stdout = io::stdout();
        let decorated = stdout.is_tty();
        Self {
            writer: stdout,
            decorated,
            decorator: Arc::new(Markup),
        }
    }
}

impl<W: Write> ConsoleOutput<W> {
    /// Wrap a writer; undecorated by default.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            decorated: false,
            decorator: Arc::new(Markup),
        }
    }

    /// Set whether markup is converted to ANSI codes.
    #[must_use]
    pub fn decorated(mut self, decorated: bool) -> Self {
        self.decorated = decorated;
        self
    }

    /// Read lines with another markup dialect.
    #[must_use]
    pub fn with_decorator(mut self, decorator: impl Decorator + 'static) -> Self {
        self.decorator = Arc::new(decorator);
        self
    }

    /// Recover the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> OutputSink for ConsoleOutput<W> {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.writer, "{}", decorate(&*self.decorator, line, self.decorated))
    }

    fn is_decorated(&self) -> bool {
        self.decorated
    }

    fn decorator(&self) -> Arc<dyn Decorator> {
        Arc::clone(&self.decorator)
    }
}
