//! Subcommand implementations.

pub mod caption;
pub mod config;
pub mod models;
