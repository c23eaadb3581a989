//! CLI argument parsing for tootmirror
//!
//! Global flags: --format, --quiet, --verbose, --log-level, --log-json

pub mod args;
pub mod format;
pub mod output;
pub mod parse;

use clap::{Parser, Subcommand};

pub use args::{EvaluateArgs, PreviewArgs, RunArgs, VerifyArgs};
pub use output::OutputFormat;

/// Tootmirror - mirror Mastodon posts to Twitter
#[derive(Parser, Debug)]
#[command(name = "tootmirror")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, global = true, value_enum, default_value = "human")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Log at debug level
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Log filter: a level (error, warn, info, debug, trace) or a directive
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Write logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Mirror new posts until interrupted
    Run(RunArgs),

    /// Check Mastodon credentials and show the account
    Verify(VerifyArgs),

    /// Show the text that would be published for a body
    Preview(PreviewArgs),

    /// Show what would happen to a Mastodon status
    Evaluate(EvaluateArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tootmirror_core::policy::UrlAppendMode;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_preview_flags() {
        let cli = Cli::try_parse_from([
            "tootmirror",
            "--format",
            "json",
            "preview",
            "hello",
            "--extra",
            "https://example.com",
            "--url-append-mode",
            "always",
            "--mirror-reshares",
            "true",
        ])
        .unwrap();

        assert_eq!(cli.format, OutputFormat::Json);
        let Some(Commands::Preview(args)) = cli.command else {
            panic!("expected preview");
        };
        assert_eq!(args.body.as_deref(), Some("hello"));
        assert_eq!(args.extras, vec!["https://example.com"]);
        assert_eq!(args.policy.url_append_mode, UrlAppendMode::Always);
        assert!(args.policy.mirror_reshares);
    }

    #[test]
    fn test_bad_mode_is_rejected() {
        let result = Cli::try_parse_from([
            "tootmirror",
            "preview",
            "hi",
            "--url-append-mode",
            "sometimes",
        ]);
        assert!(result.is_err());
    }
}
