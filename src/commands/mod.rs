//! CLI subcommands

pub mod report;
