//! CLI command definitions

use clap::{ArgGroup, Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for discussion results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Every point with its status, the moderator summary and chain totals
    Full,
    /// Only the conclusions reached
    Summary,
    /// JSON output
    Json,
}

/// CLI arguments for agora
#[derive(Parser, Debug)]
#[command(name = "agora")]
#[command(author, version, about = "Multi-agent debate - several LLMs argue a topic round by round")]
#[command(long_about = r#"
Agora runs a panel of LLM agents that debate a topic in rounds.

Each round every agent answers every open discussion point. Points whose
responses mostly agree are concluded; a moderator summarizes the round and
proposes the questions debated next. Every round is saved as
<snapshot-dir>/round_<N>.json.

Configuration files are loaded from (in priority order):
1. AGORA_* environment variables
2. --config <path>     Explicit config file
3. ./agora.toml        Project-level config
4. ~/.config/agora/config.toml   Global config

The API key is read from OPENROUTER_API_KEY (a .env file is honored).

Example:
  agora "Is there a universal basis for ethics?"
  agora --max-rounds 3 --output summary "Should AI systems have rights?"
  agora --topic-file topic.txt --snapshot-dir runs/ethics
"#)]
#[command(group(ArgGroup::new("topic_source").args(["topic", "topic_file"])))]
pub struct Cli {
    /// The topic to debate
    pub topic: Option<String>,

    /// Read the topic from a file
    #[arg(long, value_name = "PATH")]
    pub topic_file: Option<PathBuf>,

    /// Override the number of rounds
    #[arg(long, value_name = "N")]
    pub max_rounds: Option<u32>,

    /// Override the directory receiving round snapshots
    #[arg(long, value_name = "DIR")]
    pub snapshot_dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "full")]
    pub output: OutputFormat,

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

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Also write diagnostic logs to discussion_<timestamp>.log in this directory
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
}
