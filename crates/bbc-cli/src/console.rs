//! Terminal stand-in for the robot's character LCD.

use std::io::{self, Write};

use bbc_hal::Display;
use colored::Colorize;

/// Renders LCD writes as lines on a terminal.
///
/// A `clear` draws a separator so consecutive screens stay distinguishable
/// in scrollback; positioned writes are prefixed with their cell.
pub struct ConsoleDisplay<W: Write> {
    out: W,
}

impl ConsoleDisplay<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleDisplay<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    // The LCD has no way to report failure; neither does its stand-in.
    fn line(&mut self, text: &str) {
        let _ = writeln!(self.out, "{text}");
        let _ = self.out.flush();
    }
}

impl<W: Write> Display for ConsoleDisplay<W> {
    fn clear(&mut self) {
        let rule = "─".repeat(16);
        self.line(&format!("  {}", rule.as_str().dimmed()));
    }

    fn print(&mut self, text: &str) {
        let styled = if text.starts_with("FATAL") {
            text.red().bold()
        } else {
            text.bold().cyan()
        };
        self.line(&format!("  {} {styled}", "lcd>".dimmed()));
    }

    fn print_at(&mut self, row: u8, col: u8, text: &str) {
        let cell = format!("lcd[{row},{col}]>");
        self.line(&format!("  {} {text}", cell.as_str().dimmed()));
    }
}
