//! Colored terminal output.
//!
//! ```ignore
//! log!("minify"; "{} ({})", path, change);
//! debug!("download"; "{} already downloaded", name);
//! ```
//!
//! `warning` and `error` lines go to stderr, everything else to stdout.
//! `debug!` lines are printed only when debug output is switched on.

use owo_colors::OwoColorize;
use std::io::{Write, stderr, stdout};
use std::sync::atomic::{AtomicBool, Ordering};

static VERBOSE: AtomicBool = AtomicBool::new(false);

pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::Relaxed);
}

pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::Relaxed)
}

#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

/// Prefix groups sharing a color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prefix {
    Problem,
    Warning,
    Network,
    Output,
    Other,
}

impl Prefix {
    fn of(module: &str) -> Self {
        match module.to_ascii_lowercase().as_str() {
            "error" => Self::Problem,
            "warning" => Self::Warning,
            "download" => Self::Network,
            "gzip" | "minify" => Self::Output,
            _ => Self::Other,
        }
    }

    fn paint(self, text: &str) -> String {
        match self {
            Self::Problem => text.bright_red().bold().to_string(),
            Self::Warning => text.bright_magenta().bold().to_string(),
            Self::Network => text.bright_blue().bold().to_string(),
            Self::Output => text.bright_green().bold().to_string(),
            Self::Other => text.bright_yellow().bold().to_string(),
        }
    }

    fn to_stderr(self) -> bool {
        matches!(self, Self::Problem | Self::Warning)
    }
}

fn prefix(module: &str) -> String {
    Prefix::of(module).paint(&format!("[{module}]"))
}

pub fn log(module: &str, message: &str) {
    let line = format!("{} {message}", prefix(module));
    // write errors (closed pipe) are ignored
    if Prefix::of(module).to_stderr() {
        writeln!(stderr().lock(), "{line}").ok();
    } else {
        let mut out = stdout().lock();
        writeln!(out, "{line}").ok();
        out.flush().ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_flag_roundtrip() {
        set_verbose(true);
        assert!(is_verbose());
        set_verbose(false);
        assert!(!is_verbose());
    }

    #[test]
    fn test_prefix_groups() {
        assert_eq!(Prefix::of("Warning"), Prefix::Warning);
        assert_eq!(Prefix::of("gzip"), Prefix::Output);
        assert_eq!(Prefix::of("resolve"), Prefix::Other);
        assert!(Prefix::of("error").to_stderr());
        assert!(!Prefix::of("download").to_stderr());
    }

    #[test]
    fn test_prefix_contains_module() {
        // color codes, when enabled, only wrap the bracketed name
        assert!(prefix("gzip").contains("[gzip]"));
        assert!(prefix("Warning").contains("[Warning]"));
    }
}
