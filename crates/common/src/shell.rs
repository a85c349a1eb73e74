//! A small global shell abstraction for CLI output, independent of `tracing`.
//!
//! `tracing` carries structured diagnostic logs; this carries the handful of
//! user-facing lines the CLI prints directly (startup banner, warnings) that
//! should respect `--quiet` and color preferences rather than a log level.

use std::io::{self, Write};
use std::sync::{Mutex, OnceLock};

use colored::Colorize;

/// The output mode: either normal output or completely quiet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Normal,
    Quiet,
}

/// Choices for whether to use colored output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorChoice {
    Always,
    Never,
}

#[derive(Debug)]
pub struct Shell {
    pub output_mode: OutputMode,
    pub color_choice: ColorChoice,
}

impl Shell {
    pub fn new() -> Self {
        Self {
            output_mode: OutputMode::Normal,
            color_choice: ColorChoice::Always,
        }
    }

    pub fn println_out(&mut self, msg: &str) -> io::Result<()> {
        if self.output_mode == OutputMode::Quiet {
            return Ok(());
        }
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        writeln!(handle, "{msg}")?;
        handle.flush()
    }

    pub fn println_err(&mut self, msg: &str) -> io::Result<()> {
        if self.output_mode == OutputMode::Quiet {
            return Ok(());
        }
        let stderr = io::stderr();
        let mut handle = stderr.lock();
        writeln!(handle, "{msg}")?;
        handle.flush()
    }

    pub fn warn(&mut self, msg: &str) -> io::Result<()> {
        let formatted = if self.should_color() {
            format!("{} {msg}", "warning:".yellow().bold())
        } else {
            format!("warning: {msg}")
        };
        self.println_err(&formatted)
    }

    pub fn error(&mut self, msg: &str) -> io::Result<()> {
        let formatted = if self.should_color() {
            format!("{} {msg}", "error:".red().bold())
        } else {
            format!("error: {msg}")
        };
        self.println_err(&formatted)
    }

    fn should_color(&self) -> bool {
        matches!(self.color_choice, ColorChoice::Always)
    }
}

impl Default for Shell {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL_SHELL: OnceLock<Mutex<Shell>> = OnceLock::new();

/// Get a lock to the global shell, initializing it with defaults on first use.
pub fn get_shell() -> std::sync::MutexGuard<'static, Shell> {
    GLOBAL_SHELL
        .get_or_init(|| Mutex::new(Shell::new()))
        .lock()
        .expect("global shell mutex is poisoned")
}

pub fn set_shell(shell: Shell) {
    let _ = GLOBAL_SHELL.set(Mutex::new(shell));
}

/// Print a line to stdout through the global shell.
#[macro_export]
macro_rules! sh_println {
    ($($arg:tt)*) => {{
        let msg = format!($($arg)*);
        $crate::shell::get_shell().println_out(&msg)
            .unwrap_or_else(|e| eprintln!("error writing output: {e}"));
    }};
}

/// Print a warning line through the global shell.
#[macro_export]
macro_rules! sh_warn {
    ($($arg:tt)*) => {{
        let msg = format!($($arg)*);
        $crate::shell::get_shell().warn(&msg)
            .unwrap_or_else(|e| eprintln!("error writing warning: {e}"));
    }};
}

/// Print an error line through the global shell.
#[macro_export]
macro_rules! sh_err {
    ($($arg:tt)*) => {{
        let msg = format!($($arg)*);
        $crate::shell::get_shell().error(&msg)
            .unwrap_or_else(|e| eprintln!("error writing error: {e}"));
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_mode_suppresses_println() {
        let mut shell = Shell::new();
        shell.output_mode = OutputMode::Quiet;
        assert!(shell.println_out("hidden").is_ok());
    }

    #[test]
    fn print_macros_do_not_panic() {
        sh_println!("hello {}", "world");
        sh_warn!("careful");
        sh_err!("oops");
    }
}
