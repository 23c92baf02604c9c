//! CLI module for Docent
//!
//! Provides command-line interface parsing and handling for the docent binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Docent - a retrieval-augmented study assistant
///
/// Chunks a course document, embeds it, and answers questions, writes
/// notes or builds assessments grounded in its content.
#[derive(Parser, Debug)]
#[command(
    name = "docent",
    version,
    about = "Docent - retrieval-augmented study assistant",
    long_about = "Ingest a course document and ask questions about it, generate course notes,\n\
                  or inspect how the document is chunked.\n\n\
                  Providers are configured in docent.toml; API keys are read from the\n\
                  environment (a .env file is loaded first).",
    after_help = "EXAMPLES:\n    \
                  docent chunk notes.txt --size 200        # Show how a file is chunked\n    \
                  docent ask notes.txt \"What is ATP?\"      # Answer one question\n    \
                  docent chat notes.txt                    # Ask questions interactively\n    \
                  docent notes notes.txt --format summary  # Generate course notes\n    \
                  docent config --validate                 # Check docent.toml"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "docent.toml", global = true)]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Split a file into chunks and print them
    Chunk {
        /// Text file to chunk
        file: PathBuf,

        /// Chunk size limit (defaults to rag.chunk_size)
        #[arg(short, long)]
        size: Option<usize>,
    },

    /// Ingest a file and answer one question about it
    Ask {
        /// Text file to ingest
        file: PathBuf,

        /// Question to answer
        question: String,

        /// Number of chunks to retrieve (defaults to rag.top_k)
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Print the retrieved context after the answer
        #[arg(long)]
        show_context: bool,
    },

    /// Ingest a file, then answer questions read from stdin
    ///
    /// One question per line; stops at end of input or on "exit".
    Chat {
        /// Text file to ingest
        file: PathBuf,
    },

    /// Generate course notes for a file
    Notes {
        /// Text file to ingest
        file: PathBuf,

        /// Preferred content format (repeatable)
        #[arg(short, long = "format")]
        format: Vec<String>,

        /// Preferred assessment style (repeatable)
        #[arg(short, long = "style")]
        style: Vec<String>,
    },

    /// Show configuration information
    Config {
        /// Only validate the configuration file
        #[arg(long)]
        validate: bool,
    },
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
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
    fn test_parse_ask_with_global_flags() {
        let cli = Cli::try_parse_from([
            "docent",
            "ask",
            "doc.txt",
            "What is ATP?",
            "-k",
            "3",
            "--no-color",
            "--config",
            "custom.toml",
        ])
        .unwrap();

        assert!(cli.no_color);
        assert_eq!(cli.config, PathBuf::from("custom.toml"));
        match cli.command {
            Commands::Ask {
                question, top_k, ..
            } => {
                assert_eq!(question, "What is ATP?");
                assert_eq!(top_k, Some(3));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_repeated_preferences() {
        let cli = Cli::try_parse_from([
            "docent", "notes", "doc.txt", "-f", "bullets", "-f", "tables", "-s", "quiz",
        ])
        .unwrap();

        match cli.command {
            Commands::Notes { format, style, .. } => {
                assert_eq!(format, vec!["bullets", "tables"]);
                assert_eq!(style, vec!["quiz"]);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_default_config_path() {
        let cli = Cli::try_parse_from(["docent", "config"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("docent.toml"));
        assert!(!cli.verbose);
    }
}
