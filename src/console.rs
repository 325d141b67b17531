//! User-facing messages on standard output

use std::fmt;
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Writes progress and result lines, flushing after each one
pub struct Console<W: Write = io::Stdout> {
    out: W,
}

impl Console<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> Console<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Overwrites the current line.
    pub fn load_progress(&mut self, url: &str, percent: u8) {
        self.emit(format_args!("Loading page \"{url}\": {percent}%   \r"));
    }

    pub fn load_finished(&mut self) {
        self.emit(format_args!("\n"));
    }

    pub fn load_failed(&mut self) {
        self.emit(format_args!("Failed loading page\n"));
    }

    pub fn waiting(&mut self, delay: Duration) {
        self.emit(format_args!(
            "Waiting {} milliseconds before snapshot..",
            delay.as_millis()
        ));
    }

    pub fn tick(&mut self) {
        self.emit(format_args!("."));
    }

    pub fn end_line(&mut self) {
        self.emit(format_args!("\n"));
    }

    pub fn saved(&mut self, path: &Path) {
        self.emit(format_args!(
            "Image successfully saved to \"{}\"\n",
            path.display()
        ));
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, args: fmt::Arguments<'_>) {
        if let Err(e) = self.out.write_fmt(args).and_then(|_| self.out.flush()) {
            debug!("Console write failed: {}", e);
        }
    }
}
