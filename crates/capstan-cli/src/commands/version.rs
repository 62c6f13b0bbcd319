//! Implementation of the `capstan version` command.

/// Print the client version.
pub fn run() {
    println!("capstan v{}", env!("CARGO_PKG_VERSION"));
}
