//! CLI command definitions

use chatsynth_domain::OutputFormat;
use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for chatsynth
#[derive(Parser, Debug)]
#[command(name = "chatsynth")]
#[command(author, version, about = "Ask several LLMs at once and merge their answers")]
#[command(long_about = r#"
chatsynth sends one question to a group of models in parallel, streams every
answer as it arrives and asks a synthesizer model to merge them.

Merge modes:
  union         keep every piece of information, drop duplicates
  intersection  keep only what at least N models agree on
  selective     keep only the most relevant content

Configuration files are loaded from (in priority order):
1. CHATSYNTH_* environment variables
2. --config <path>                       Explicit config file
3. ./chatsynth.toml                      Project-level config
4. ~/.config/chatsynth/config.toml       Global config

Example:
  chatsynth "What's the best way to handle errors in Rust?"
  chatsynth -m openai/gpt-4o -m anthropic/claude-3.5-sonnet --mode intersection "Compare async runtimes"
  chatsynth --chat -g research
"#)]
pub struct Cli {
    /// The question to ask (not required in chat mode)
    pub question: Option<String>,

    /// Start interactive chat mode
    #[arg(short, long)]
    pub chat: bool,

    /// Configured model group to use
    #[arg(short, long, value_name = "ID", conflicts_with = "model")]
    pub group: Option<String>,

    /// Models for an ad-hoc group (can be specified multiple times)
    #[arg(short, long, value_name = "MODEL")]
    pub model: Vec<String>,

    /// Model that merges the answers
    #[arg(short, long, value_name = "MODEL")]
    pub synthesizer: Option<String>,

    /// Merge mode: union, intersection or selective
    #[arg(long, value_name = "MODE")]
    pub mode: Option<String>,

    /// Minimum number of agreeing models in intersection mode
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    pub threshold: Option<i64>,

    /// Output format: full, synthesis or json
    #[arg(short, long, value_name = "FORMAT")]
    pub output: Option<OutputFormat>,

    /// Seconds to wait for the models before unfinished answers are dropped (0 waits forever)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// List configured model groups and exit
    #[arg(long)]
    pub list_groups: bool,
}

impl Cli {
    /// Tracing filter directive for the requested verbosity
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    /// Whether any flag overrides the group's synthesizer
    pub fn overrides_synthesizer(&self) -> bool {
        self.synthesizer.is_some() || self.mode.is_some() || self.threshold.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_ad_hoc_group_flags() {
        let cli = Cli::try_parse_from([
            "chatsynth",
            "-m",
            "openai/gpt-4o",
            "-m",
            "anthropic/claude-3-haiku",
            "--mode",
            "intersection",
            "--threshold",
            "2",
            "-o",
            "json",
            "What is Rust?",
        ])
        .unwrap();

        assert_eq!(cli.model.len(), 2);
        assert_eq!(cli.mode.as_deref(), Some("intersection"));
        assert_eq!(cli.threshold, Some(2));
        assert_eq!(cli.output, Some(OutputFormat::Json));
        assert_eq!(cli.question.as_deref(), Some("What is Rust?"));
        assert!(cli.overrides_synthesizer());
    }

    #[test]
    fn test_negative_threshold_parses() {
        let cli = Cli::try_parse_from(["chatsynth", "--threshold", "-1", "q"]).unwrap();
        assert_eq!(cli.threshold, Some(-1));
    }

    #[test]
    fn test_group_conflicts_with_models() {
        let result = Cli::try_parse_from(["chatsynth", "-g", "research", "-m", "openai/gpt-4o"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_verbosity_levels() {
        let cli = Cli::try_parse_from(["chatsynth", "-vv", "--chat"]).unwrap();
        assert_eq!(cli.log_level(), "debug");
        assert!(cli.chat);
        assert!(!cli.overrides_synthesizer());
    }

    #[test]
    fn test_unknown_output_format_is_rejected() {
        assert!(Cli::try_parse_from(["chatsynth", "-o", "xml", "q"]).is_err());
    }
}
