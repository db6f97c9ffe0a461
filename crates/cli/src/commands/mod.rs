//! Subcommand implementations

pub mod changes;
pub mod config;
pub mod doctor;
pub mod run;
