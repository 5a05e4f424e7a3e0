//! CLI module
//!
//! Command-line interface for working with deployment specifications.
//!
//! # Commands
//!
//! - `validate` - Schema-check, upgrade and build a specification file
//! - `upgrade` - Rewrite a specification in the latest wire generation
//! - `inspect` - Show roots and deployment order of a specification
//! - `versions` - List supported spec versions
//! - `serve` - Start the HTTP transport for recording sessions

mod commands;
mod runner;
mod server;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
pub use server::{router, serve, ServerConfig};

#[cfg(test)]
mod tests;
