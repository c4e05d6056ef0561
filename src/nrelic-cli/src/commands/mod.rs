//! Command handlers for nrelic CLI
//!
//! Each subcommand has its own module with handler functions.

pub mod common;
pub mod configure;
pub mod decrypt;
pub mod extract;
pub mod scan;
