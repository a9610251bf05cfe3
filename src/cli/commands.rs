//! Command dispatch: resolve flags and settings, run one operation, render it

use std::io::{self, Write};

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, info, instrument};

use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, Settings, SettingsError};
use crate::domain::{ProjectSlug, VcsType};
use crate::infrastructure::{CircleClient, EnvVarApi};

/// One environment variable operation, selected from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    List,
    Get { key: String },
    Set { key: String, value: String },
    Delete { key: String },
}

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Commands::List => run_remote(cli, Operation::List),
        Commands::Get { key } => run_remote(cli, Operation::Get { key: key.clone() }),
        Commands::Set { key, value } => run_remote(
            cli,
            Operation::Set {
                key: key.clone(),
                value: value.clone(),
            },
        ),
        Commands::Del { key } => run_remote(cli, Operation::Delete { key: key.clone() }),
        Commands::Config { command } => cmd_config(command),
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
    }
}

/// Resolve credentials and project, build the client, run against stdout.
#[instrument(skip_all)]
fn run_remote(cli: &Cli, operation: Operation) -> CliResult<()> {
    let settings = Settings::load()?;
    let token = resolve_token(cli.token.as_deref(), &settings)?;
    let slug = resolve_slug(cli, &settings)?;

    let client = CircleClient::with_options(&token, settings.client_options())?;
    debug!("client ready: base={}, project={}", client.base(), slug);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_operation(&client, &slug, &operation, &mut out)
}

/// Run one operation and render its result.
///
/// Results are fetched completely before anything is written, so a failure
/// never leaves partial output behind.
pub fn run_operation(
    api: &dyn EnvVarApi,
    slug: &ProjectSlug,
    operation: &Operation,
    out: &mut dyn Write,
) -> CliResult<()> {
    match operation {
        Operation::List => {
            let vars = api.list(slug)?;
            debug!("listed {} variables", vars.len());
            output::write_variables(out, &vars).map_err(CliError::Output)
        }
        Operation::Get { key } => {
            let var = api.get(slug, key)?;
            output::write_variables(out, std::slice::from_ref(&var)).map_err(CliError::Output)
        }
        Operation::Set { key, value } => {
            api.set(slug, key, value)?;
            info!("set {} on {}", key, slug);
            Ok(())
        }
        Operation::Delete { key } => {
            api.delete(slug, key)?;
            info!("deleted {} on {}", key, slug);
            Ok(())
        }
    }
}

/// Flag (or `CIRCLECI_TOKEN`) first, then configuration; empty counts as missing.
pub fn resolve_token(flag: Option<&str>, settings: &Settings) -> CliResult<String> {
    flag.or(settings.token.as_deref())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .ok_or(CliError::MissingToken)
}

/// Flags override configuration for vcs type and username; project comes from flags only.
pub fn resolve_slug(cli: &Cli, settings: &Settings) -> CliResult<ProjectSlug> {
    let vcs_type: VcsType = cli.vcs_type.unwrap_or(settings.vcs_type);
    let account = cli
        .username
        .as_deref()
        .or(settings.username.as_deref())
        .unwrap_or_default();
    let project = cli.project.as_deref().unwrap_or_default();
    Ok(ProjectSlug::new(vcs_type, account, project)?)
}

fn cmd_config(command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            match global_config_path() {
                Some(path) if path.exists() => debug!("config file: {}", path.display()),
                _ => output::warning("no config file found, showing defaults and environment"),
            }
            let settings = Settings::load()?;
            output::info(&settings.to_redacted_toml()?);
            Ok(())
        }
        ConfigCommands::Path => {
            let path = global_config_path().ok_or(SettingsError::NoConfigDir)?;
            output::info(&path.display());
            Ok(())
        }
        ConfigCommands::Init => {
            let path = Settings::init_global()?;
            output::info(&format!("Created {}", path.display()));
            Ok(())
        }
    }
}
