//! CLI command definitions

use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for parley
#[derive(Parser, Debug)]
#[command(name = "parley")]
#[command(author, version, about = "Streaming chat client for the parley assistant")]
#[command(long_about = r#"
Parley talks to an agent backend over a token-streaming channel, keeping
multiple conversation sessions with retry and edit support and a live
context panel.

Without a message argument it starts the interactive chat REPL. With a
message it sends once, streams the reply, and exits.

Configuration files are loaded from (in priority order):
1. --config <path>     Explicit config file
2. ./parley.toml       Project-level config
3. ~/.config/parley/config.toml   Global config

Example:
  parley                                 # interactive chat (echo backend)
  parley --backend http://localhost:8787 # chat against a running server
  parley "best coffee near the station"  # one-shot question
"#)]
pub struct Cli {
    /// One-shot message: send, stream the reply, and exit
    pub message: Option<String>,

    /// Base URL of the agent backend (omit for the built-in echo backend)
    #[arg(short, long, value_name = "URL")]
    pub backend: Option<String>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Append the conversation transcript to a JSONL file
    #[arg(long, value_name = "PATH")]
    pub transcript_log: Option<PathBuf>,
}
