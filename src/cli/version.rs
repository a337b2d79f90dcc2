//! Version command for the docverify CLI.

/// The current version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The `--version` output line.
pub fn version_line() -> String {
    format!("docverify {}", VERSION)
}
