//! Command-line front end for the table merger.

pub mod cli;
pub mod commands;
pub mod diagnose;
pub mod logging;
pub mod summary;
