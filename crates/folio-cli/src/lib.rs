//! Folio CLI - Command-line interface for the portfolio data layer
//!
//! This crate provides the CLI application that ties together all Folio components.

pub mod config;
pub mod report;

pub use config::{Command, Config, OutputFormat};
pub use report::{failure_notice, report_failure};
