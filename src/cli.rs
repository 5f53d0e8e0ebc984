//! Command-line interface.

use std::path::PathBuf;

use chrono::Local;
use clap::{Args, Parser, Subcommand};

use crate::models::AppFilter;

#[derive(Parser, Debug)]
#[command(
    name = "org-secrets",
    version,
    about = "Export and import GitHub organization secrets and variables as CSV"
)]
pub struct Cli {
    /// GitHub token (defaults to GITHUB_TOKEN, then GH_TOKEN)
    #[arg(short = 't', long, global = true)]
    pub token: Option<String>,

    /// GitHub host, e.g. a GitHub Enterprise Server hostname
    #[arg(long, global = true)]
    pub hostname: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Actions, Dependabot and Codespaces secrets
    Secrets {
        #[command(subcommand)]
        command: SecretsCommand,
    },
    /// Actions variables
    Variables {
        #[command(subcommand)]
        command: VariablesCommand,
    },
    /// Deployment environments
    Environments {
        #[command(subcommand)]
        command: EnvironmentsCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum SecretsCommand {
    /// Write organization and repository secrets to a CSV report
    Export(SecretsExportArgs),
    /// Create or update secrets from a CSV file
    Create(CreateArgs),
}

#[derive(Subcommand, Debug)]
pub enum VariablesCommand {
    /// Write organization and repository variables to a CSV report
    Export(ExportArgs),
    /// Create variables from a CSV file or another organization
    Create(VariablesCreateArgs),
}

#[derive(Subcommand, Debug)]
pub enum EnvironmentsCommand {
    /// Write repository environments to a CSV report
    Export(ExportArgs),
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Organization to export
    pub organization: String,

    /// Limit the export to these repositories (skips organization-level entries)
    pub repositories: Vec<String>,

    /// Output CSV file
    #[arg(short = 'o', long = "output-file")]
    pub output_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct SecretsExportArgs {
    #[command(flatten)]
    pub export: ExportArgs,

    /// Providers to export (defaults to the config file, then all)
    #[arg(short = 'a', long, value_enum)]
    pub app: Option<AppFilter>,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Destination organization
    pub organization: String,

    /// CSV file to read
    #[arg(short = 'f', long = "from-file")]
    pub from_file: PathBuf,
}

#[derive(Args, Debug)]
pub struct VariablesCreateArgs {
    /// Destination organization
    pub organization: String,

    /// CSV file to read
    #[arg(
        short = 'f',
        long = "from-file",
        conflicts_with = "source_organization",
        required_unless_present = "source_organization"
    )]
    pub from_file: Option<PathBuf>,

    /// Copy variables directly from this organization
    #[arg(long, requires = "source_token")]
    pub source_organization: Option<String>,

    /// Token for the source organization
    #[arg(long, requires = "source_organization")]
    pub source_token: Option<String>,

    /// Host of the source organization (defaults to the destination host)
    #[arg(long, requires = "source_organization")]
    pub source_hostname: Option<String>,
}

/// Where `variables create` reads from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariableSource {
    File(PathBuf),
    Organization {
        organization: String,
        token: String,
        hostname: Option<String>,
    },
}

impl VariablesCreateArgs {
    pub fn source(&self) -> Option<VariableSource> {
        if let Some(path) = &self.from_file {
            return Some(VariableSource::File(path.clone()));
        }
        match (&self.source_organization, &self.source_token) {
            (Some(organization), Some(token)) => Some(VariableSource::Organization {
                organization: organization.clone(),
                token: token.clone(),
                hostname: self.source_hostname.clone(),
            }),
            _ => None,
        }
    }
}

/// `report-<kind>-<YYYYmmddHHMMSS>.csv` in the current directory.
pub fn default_report_path(kind: &str) -> PathBuf {
    PathBuf::from(format!(
        "report-{}-{}.csv",
        kind,
        Local::now().format("%Y%m%d%H%M%S")
    ))
}
