//! Colored terminal output helpers.
//!
//! Status messages go to stderr so stdout carries only lookup results.

use console::style;

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print an aligned `label: value` line to stdout.
pub fn field(label: &str, value: &str) {
    println!("{:<14} {}", style(format!("{label}:")).bold(), value);
}
