//! Asset Loader CLI Library
//!
//! Provides the simulation [`Session`] and supporting modules for the
//! `corten-loader` command-line tool.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cli;
pub mod error;
pub mod repl;
pub mod runtime;

pub use cli::Cli;
pub use error::{CliError, CliResult};
pub use runtime::{format_plan, Outcome, Report, Session};
