//! CLI Adapter
//!
//! Command-line interface for the swap aggregator.
//! Uses clap derive macros for argument parsing.

mod commands;

pub use commands::{CliApp, Command, ProvidersCmd, QuoteCmd, TokensCmd};
