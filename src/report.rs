//! Console sink for user-facing output.

use console::style;
use std::fmt::Display;
use std::io::{self, Write};

/// Writes colored, line-oriented messages to any writer
///
/// The binary wraps stdout; tests wrap a `Vec<u8>` and inspect the captured text.
pub struct Reporter<W: Write> {
    out: W,
}

impl Reporter<io::Stdout> {
    pub fn stdout() -> Self {
        Reporter::new(io::stdout())
    }
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W) -> Self {
        Reporter { out }
    }

    pub fn success(&mut self, msg: impl Display) {
        self.line(style(msg.to_string()).green());
    }

    pub fn failure(&mut self, msg: impl Display) {
        self.line(style(msg.to_string()).red());
    }

    pub fn plain(&mut self, msg: impl Display) {
        self.line(msg);
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, msg: impl Display) {
        // a closed stdout is not worth aborting the run over
        if let Err(err) = writeln!(self.out, "{msg}") {
            tracing::warn!("failed to write console output: {err}");
        }
    }
}

impl Reporter<Vec<u8>> {
    /// Captured output as text, for tests
    pub fn captured(&self) -> String {
        String::from_utf8_lossy(&self.out).into_owned()
    }
}
