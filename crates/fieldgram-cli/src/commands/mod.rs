//! CLI subcommands.

pub mod batch;
pub mod classify;
pub mod config;
pub mod extract;
mod output;
mod pipeline;

pub use output::OutputFormat;
