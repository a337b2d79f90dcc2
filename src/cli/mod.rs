//! CLI module for docverify.
//!
//! - Argument parsing
//! - Version display
//! - `parse` and `send` command handlers
//!
//! ```ignore
//! use docverify::cli::{parse_args, CliCommand};
//!
//! let args = parse_args(std::env::args())?;
//! match args.command {
//!     CliCommand::Version => println!("{}", version_line()),
//!     // ...
//! }
//! ```

pub mod args;
pub mod commands;
pub mod version;

pub use args::{parse_args, ArgsError, CliArgs, CliCommand, InputSource, USAGE};
pub use commands::{render_event, render_parse_output, render_reply, run_parse, run_send};
pub use version::{version_line, VERSION};
