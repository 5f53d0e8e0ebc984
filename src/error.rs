//! Rendering of fatal errors for the terminal.

use anyhow::Error;
use colored::*;

/// Join an error and its sources with " → ", outermost first. A source whose
/// message repeats the previous one is skipped.
///
/// # Example
///
/// ```
/// use org_secrets::error::format_error_chain;
///
/// let err = anyhow::anyhow!("connection refused")
///     .context("Failed to list repositories of acme");
/// assert_eq!(
///     format_error_chain(&err),
///     "Failed to list repositories of acme → connection refused"
/// );
/// ```
pub fn format_error_chain(error: &Error) -> String {
    let mut chain: Vec<String> = Vec::new();
    for cause in error.chain() {
        let message = cause.to_string();
        if chain.last() != Some(&message) {
            chain.push(message);
        }
    }
    chain.join(" → ")
}

/// Print a fatal error to stderr.
pub fn report(error: &Error) {
    eprintln!("{} {}", "Error:".red().bold(), format_error_chain(error));
}
