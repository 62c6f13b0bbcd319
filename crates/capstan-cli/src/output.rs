//! Terminal output helpers.

use colored::Colorize;

/// Print a response body to stdout.
///
/// Bodies are usually JSON and get re-rendered with indentation; anything
/// that does not parse is printed verbatim so server diagnostics are never
/// hidden.
pub fn print_body(body: &[u8]) {
    if body.is_empty() {
        println!("{}", "(empty response body)".dimmed());
        return;
    }
    println!("{}", pretty(body));
}

/// Print a success line with a green tick.
pub fn success(message: &str) {
    println!("{} {message}", "✓".green());
}

/// Print a progress line for one step of a longer flow.
pub fn step(message: &str) {
    println!("{} {message}", "▸".cyan());
}

fn pretty(body: &[u8]) -> String {
    let raw = || String::from_utf8_lossy(body).into_owned();
    match serde_json::from_slice::<serde_json::Value>(body) {
        Ok(value) => serde_json::to_string_pretty(&value).unwrap_or_else(|_| raw()),
        Err(_) => raw(),
    }
}
