//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! # Command Modules
//!
//! - [`codes`] - Registry listing and processing code decoding
//! - [`config`] - Configuration management (init, path, show)
//! - [`retrieve`] - Time series retrieval from a CSV of sites and dates

pub mod codes;
pub mod common;
pub mod config;
pub mod retrieve;
