//! Console progress reporter.
//!
//! Output shape:
//!
//! ```text
//!  • parser
//!    ✓ empty input (3ms)
//!    ✗ nested lists (1s)
//!
//!      operation timed out after 1s
//! ```
//!
//! Every section with children prints a bullet header and indents its children by two spaces. Leaf sections print
//! a tick or a cross with the time since their operation started; failures are followed by the rendered error,
//! indented three spaces past the result line.

use std::io::{self, Write};
use std::time::Instant;

use testit_core::{format_duration, indent_lines, render_failure};

use super::Reporter;
use crate::errors::SuiteError;

const MAGENTA: &str = "\x1b[35m";
const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";
const RESET: &str = "\x1b[0m";

const INDENT: &str = "  ";

/// Default console reporter
pub struct ConsoleReporter {
    out: Box<dyn Write + Send>,
    colors: bool,
    depth: usize,
    started: Instant,
}

impl ConsoleReporter {
    pub fn new(out: impl Write + Send + 'static, colors: bool) -> Self {
        Self {
            out: Box::new(out),
            colors,
            depth: 0,
            started: Instant::now(),
        }
    }

    pub fn stdout(colors: bool) -> Self {
        Self::new(io::stdout(), colors)
    }

    pub fn disable_colors(&mut self) {
        self.colors = false;
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if self.colors {
            format!("{color}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn indent(&self) -> String {
        INDENT.repeat(self.depth)
    }

    fn elapsed(&self) -> String {
        format_duration(self.started.elapsed())
    }

    fn print_failure(&mut self, label: &str, error: &SuiteError) {
        let indent = self.indent();
        let line = format!(
            "{indent}{}{label}{}",
            self.paint(RED, " \u{2717} "),
            self.paint(CYAN, &format!(" ({})", self.elapsed()))
        );
        let body = indent_lines(&render_failure(error), &format!("{indent}   "));
        // Console output is best effort; a closed stdout must not fail the run.
        let _ = writeln!(self.out, "{line}");
        let _ = writeln!(self.out);
        let _ = writeln!(self.out, "{body}");
    }
}

impl Reporter for ConsoleReporter {
    fn on_children_start(&mut self, name: &str) {
        let line = format!("{}{}{name}", self.indent(), self.paint(MAGENTA, " \u{2022} "));
        let _ = writeln!(self.out, "{line}");
        self.depth += 1;
    }

    fn on_children_end(&mut self, _name: &str) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn on_section_start(&mut self, _name: &str) {
        self.started = Instant::now();
    }

    fn on_run_start(&mut self) {
        self.started = Instant::now();
    }

    fn on_section_pass(&mut self, name: &str) {
        let line = format!(
            "{}{}{name} {}",
            self.indent(),
            self.paint(GREEN, " \u{2713} "),
            self.paint(CYAN, &format!("({})", self.elapsed()))
        );
        let _ = writeln!(self.out, "{line}");
    }

    fn on_section_fail(&mut self, name: &str, error: &SuiteError) {
        self.print_failure(name, error);
    }

    fn on_run_fail(&mut self, error: &SuiteError) {
        self.print_failure("run", error);
    }
}
