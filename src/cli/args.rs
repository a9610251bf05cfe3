//! CLI argument definitions using clap

use clap::{ArgAction, Parser, Subcommand};

use crate::domain::VcsType;

/// Manage CircleCI project environment variables
#[derive(Parser, Debug)]
#[command(name = "circleci-env")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// CircleCI API token
    #[arg(short, long, global = true, env = "CIRCLECI_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// VCS type of the project [default: github]
    #[arg(short = 'v', long, global = true)]
    pub vcs_type: Option<VcsType>,

    /// Username or organization hosting the project
    #[arg(short, long, global = true)]
    pub username: Option<String>,

    /// CircleCI project name
    #[arg(short, long, global = true)]
    pub project: Option<String>,

    /// Debug output (-d info, -dd debug, -ddd trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub debug: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List env vars (values obfuscated)
    List,

    /// Print one env var
    Get {
        /// Name of the environment variable
        key: String,
    },

    /// Create or update an env var
    Set {
        /// Name of the environment variable
        key: String,
        /// Value of the environment variable
        value: String,
    },

    /// Delete an env var
    #[command(name = "del", visible_alias = "delete")]
    Del {
        /// Name of the environment variable
        key: String,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config (token redacted)
    Show,

    /// Show config path
    Path,

    /// Create config template
    Init,
}
