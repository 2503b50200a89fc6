//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use colored::Colorize;

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print success status (green checkmark) to stderr, stdout may carry the document
pub fn success(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{} {}", "✓".green(), msg);
}

/// Print indented detail to stderr (no color)
pub fn detail(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("  {}", msg);
}

/// Print section header (cyan bold)
pub fn header(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg.to_string().cyan().bold());
}

/// Print a labelled path, marking whether it exists
pub fn path_entry(label: &str, path: &std::path::Path) {
    let marker = if path.exists() { "✓".green() } else { "✗".red() };
    println!("{} {}: {}", marker, label, path.display());
}

/// Print plain output (no color, for documents and data)
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}
