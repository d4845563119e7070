//! CLI commands using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// pictriage - resilient image analysis
///
/// Validates and repairs image files, then sends them to a local vision
/// model for a structured description.
#[derive(Parser)]
#[command(name = "pictriage")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Repair and analyze untrusted image files with a local vision model", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze one or more images
    Analyze {
        /// Image files to analyze
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Target platform (general, tuchong, xiaohongshu, ...)
        #[arg(short, long, default_value = "general")]
        platform: String,

        /// Engine to request; falls back to the default if unavailable
        #[arg(short, long)]
        engine: Option<String>,

        /// Model to use instead of the configured one
        #[arg(short, long)]
        model: Option<String>,

        /// Language of the generated text (en, zh, ...)
        #[arg(short, long, default_value = "en")]
        language: String,

        /// Inference timeout in seconds
        #[arg(short, long)]
        timeout: Option<u64>,

        /// Print full results as JSON
        #[arg(long)]
        json: bool,
    },

    /// List engines and their current availability
    Engines,

    /// Check and decode a file without analyzing it
    Check {
        /// Image file to check
        path: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_analyze() {
        let cli = Cli::try_parse_from([
            "pictriage", "-v", "analyze", "a.jpg", "b.png", "--engine", "mlx", "--timeout", "30",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Analyze {
                paths,
                engine,
                timeout,
                platform,
                ..
            } => {
                assert_eq!(paths.len(), 2);
                assert_eq!(engine.as_deref(), Some("mlx"));
                assert_eq!(timeout, Some(30));
                assert_eq!(platform, "general");
            }
            _ => panic!("expected analyze"),
        }
    }
}
