//! Step reporting.
//!
//! The rewriter announces what it is doing as a sequence of named steps, each
//! with an optional item count. Reporters decide how (or whether) to show them.

use std::io::{self, IsTerminal, Write};

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";

/// Observer for step events.
pub trait Progress {
    /// Begin a step that will process `total` items.
    fn start(&mut self, name: &str, total: usize);

    /// One more item of the current step is done.
    fn update(&mut self);

    /// Close the current step. A non-empty `message` is shown on its own line.
    fn finish(&mut self, message: &str);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn start(&mut self, _name: &str, _total: usize) {}

    fn update(&mut self) {}

    fn finish(&mut self, _message: &str) {}
}

/// Single-line step display on stderr.
///
/// Each step overwrites the previous status with a carriage return, as
/// `msvg: Updating layers (12/40)`. Starting a step while another is open
/// closes the open one first. Bold styling is only used on a terminal.
pub struct TerminalProgress<W: Write = io::Stderr> {
    out: W,
    color: bool,
    prefix: String,
    active: bool,
    name: String,
    index: usize,
    total: usize,
}

impl TerminalProgress {
    pub fn new(prefix: &str) -> Self {
        let out = io::stderr();
        let color = out.is_terminal();
        Self::with_writer(out, prefix, color)
    }
}

impl<W: Write> TerminalProgress<W> {
    pub fn with_writer(out: W, prefix: &str, color: bool) -> Self {
        Self {
            out,
            color,
            prefix: prefix.to_string(),
            active: false,
            name: String::new(),
            index: 1,
            total: 1,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn print(&mut self, line: &str) {
        let prefix = if self.color {
            format!("{BOLD}{}{RESET}: ", self.prefix)
        } else {
            format!("{}: ", self.prefix)
        };
        // Best effort
        let _ = write!(self.out, "\r{prefix}{line}");
        let _ = self.out.flush();
    }
}

impl<W: Write> Progress for TerminalProgress<W> {
    fn start(&mut self, name: &str, total: usize) {
        if self.active {
            self.finish("");
        }
        self.active = true;
        self.name = name.to_string();
        self.index = 1;
        self.total = total;
        let line = self.name.clone();
        self.print(&line);
    }

    fn update(&mut self) {
        let line = format!("{} ({}/{})", self.name, self.index, self.total);
        self.print(&line);
        self.index += 1;
    }

    fn finish(&mut self, message: &str) {
        self.active = false;
        self.index = 1;
        let _ = writeln!(self.out);
        if !message.is_empty() {
            self.print(message);
            let _ = writeln!(self.out);
        }
        let _ = self.out.flush();
    }
}
