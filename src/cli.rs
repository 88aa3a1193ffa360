use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "weekly-recap")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "AI-powered weekly activity report for GitHub and Google Calendar",
    long_about = "weekly-recap aggregates your recent GitHub activity (commits, pull requests \
                  authored, reviewed and awaiting review) together with your calendar meetings, \
                  and asks an AI backend to write an HTML activity report."
)]
pub struct Cli {
    /// Path to config file (default: ~/.config/weekly-recap/config.toml)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// GitHub username to report on
    #[arg(short, long)]
    pub username: Option<String>,

    /// Number of days to look back
    #[arg(short, long, value_name = "DAYS")]
    pub days: Option<u32>,

    /// Comma-separated list of repositories (owner/repo)
    #[arg(short, long, value_delimiter = ',')]
    pub repos: Option<Vec<String>>,

    /// AI provider for report generation (e.g. groq, claude)
    #[arg(short, long)]
    pub provider: Option<String>,

    /// Model override for the selected provider
    #[arg(long)]
    pub model: Option<String>,

    /// Directory to write the report into
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Skip fetching calendar events
    #[arg(long)]
    pub no_calendar: bool,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommands
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize configuration file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },

    /// Show current configuration
    Config,
}

impl Cli {
    /// Validate CLI arguments
    pub fn validate(&self) -> Result<(), String> {
        if self.days == Some(0) {
            return Err("--days must be greater than zero".to_string());
        }

        if let Some(ref repos) = self.repos {
            for repo in repos {
                if !repo.contains('/') {
                    return Err(format!(
                        "repository '{}' is not a qualified owner/repo name",
                        repo
                    ));
                }
            }
        }

        Ok(())
    }
}
