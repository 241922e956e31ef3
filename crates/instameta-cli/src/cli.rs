//! CLI argument definitions for the instameta plugin binary.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// instameta: fill Stash scene/image metadata from Instagram posts.
///
/// Reads the plugin input JSON on stdin and writes one JSON result line on
/// stdout. Logs go to stderr.
#[derive(Parser, Debug)]
#[command(name = "instameta", version, about)]
pub struct CliArgs {
    /// Path to a TOML configuration file.
    #[arg(short = 'c', long = "config", env = "INSTAMETA_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Run as a Stash task or hook (default)
    Task,
    /// Scrape a single post URL without touching Stash
    Scrape,
}

impl Command {
    /// Whether a failed run exits non-zero. The scraper reports failure as an
    /// empty fragment and exits 0.
    pub fn exits_nonzero_on_failure(&self) -> bool {
        matches!(self, Command::Task)
    }
}

impl CliArgs {
    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::Task)
    }
}
