//! Command dispatch: resolves the token and host, opens files, runs a driver
//! and reports its summary.

use std::env;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::*;
use tracing::debug;

use crate::app_deps::{GitHubApiFactory, RealGitHubApiFactory};
use crate::cli::{
    Cli, Commands, CreateArgs, EnvironmentsCommand, ExportArgs, SecretsCommand,
    SecretsExportArgs, VariableSource, VariablesCommand, VariablesCreateArgs,
    default_report_path,
};
use crate::config::Config;
use crate::errors::ConfigError;
use crate::schema::{self, CsvExporter};
use crate::summary::Summary;
use crate::validation::{validate_repo_name, validate_repo_owner, validate_token};
use crate::{environments, export, import, migrate};

/// Pick the token: `--token`, then `GITHUB_TOKEN`, then `GH_TOKEN`.
pub fn resolve_token(flag: Option<&str>) -> Result<String> {
    let token = flag
        .map(str::to_string)
        .or_else(|| env::var("GITHUB_TOKEN").ok())
        .or_else(|| env::var("GH_TOKEN").ok())
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
        .ok_or(ConfigError::MissingToken)?;

    validate_token(&token)?;
    Ok(token)
}

fn validate_targets(organization: &str, repositories: &[String]) -> Result<()> {
    validate_repo_owner(organization)?;
    for repo in repositories {
        validate_repo_name(repo)?;
    }
    Ok(())
}

fn create_report(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file {}", path.display()))?;
    Ok(BufWriter::new(file))
}

fn open_input(path: &Path) -> Result<File> {
    File::open(path).with_context(|| format!("Failed to open {}", path.display()))
}

/// Print the outcome. Any failed unit turns the command into an error.
fn finish(summary: &Summary, success: String) -> Result<()> {
    if summary.is_success() {
        println!("{} {}", "✓".green(), success.green());
    } else {
        println!(
            "{} Completed with {} failure(s)",
            "⚠".yellow(),
            summary.failed().to_string().red()
        );
    }
    summary.print();

    if summary.is_success() {
        Ok(())
    } else {
        anyhow::bail!(
            "{} of {} entries failed",
            summary.failed(),
            summary.failed() + summary.succeeded()
        )
    }
}

pub struct App;

impl App {
    pub async fn run(cli: Cli, config: Config) -> Result<()> {
        Self::run_with_deps(&RealGitHubApiFactory, cli, config).await
    }

    pub async fn run_with_deps(
        factory: &dyn GitHubApiFactory,
        cli: Cli,
        config: Config,
    ) -> Result<()> {
        let hostname = cli
            .hostname
            .clone()
            .unwrap_or_else(|| config.github.hostname.clone());
        let token = resolve_token(cli.token.as_deref())?;
        debug!(hostname = %hostname, "resolved GitHub host");

        let session = Session {
            factory,
            token,
            hostname,
            config: &config,
        };

        match cli.command {
            Commands::Secrets { command } => match command {
                SecretsCommand::Export(args) => session.export_secrets(args).await,
                SecretsCommand::Create(args) => session.create_secrets(args).await,
            },
            Commands::Variables { command } => match command {
                VariablesCommand::Export(args) => session.export_variables(args).await,
                VariablesCommand::Create(args) => session.create_variables(args).await,
            },
            Commands::Environments { command } => match command {
                EnvironmentsCommand::Export(args) => session.export_environments(args).await,
            },
        }
    }
}

struct Session<'a> {
    factory: &'a dyn GitHubApiFactory,
    token: String,
    hostname: String,
    config: &'a Config,
}

impl Session<'_> {
    fn output_path(args: &ExportArgs, kind: &str) -> PathBuf {
        args.output_file
            .clone()
            .unwrap_or_else(|| default_report_path(kind))
    }

    async fn export_secrets(&self, args: SecretsExportArgs) -> Result<()> {
        let export_args = &args.export;
        validate_targets(&export_args.organization, &export_args.repositories)?;
        let filter = args.app.unwrap_or(self.config.export.app);
        let path = Self::output_path(export_args, "secrets");

        let api = self.factory.create(self.token.clone(), &self.hostname)?;
        let mut exporter = CsvExporter::secrets(create_report(&path)?)
            .context("Failed to write CSV header")?;
        let summary = export::export_secrets(
            api.as_ref(),
            &export_args.organization,
            &export_args.repositories,
            filter,
            &mut exporter,
        )
        .await?;

        finish(
            &summary,
            format!("Successfully exported secrets to {}", path.display()),
        )
    }

    async fn create_secrets(&self, args: CreateArgs) -> Result<()> {
        validate_repo_owner(&args.organization)?;
        let rows = schema::parse_secrets(open_input(&args.from_file)?)
            .with_context(|| format!("Failed to read {}", args.from_file.display()))?;

        let api = self.factory.create(self.token.clone(), &self.hostname)?;
        let summary = import::create_secrets(api.as_ref(), &args.organization, rows).await;

        finish(
            &summary,
            format!("Successfully created secrets for {}", args.organization),
        )
    }

    async fn export_variables(&self, args: ExportArgs) -> Result<()> {
        validate_targets(&args.organization, &args.repositories)?;
        let path = Self::output_path(&args, "variables");

        let api = self.factory.create(self.token.clone(), &self.hostname)?;
        let mut exporter = CsvExporter::variables(create_report(&path)?)
            .context("Failed to write CSV header")?;
        let summary = export::export_variables(
            api.as_ref(),
            &args.organization,
            &args.repositories,
            &mut exporter,
        )
        .await?;

        finish(
            &summary,
            format!("Successfully exported variables to {}", path.display()),
        )
    }

    async fn create_variables(&self, args: VariablesCreateArgs) -> Result<()> {
        validate_repo_owner(&args.organization)?;
        let source = args
            .source()
            .context("Either --from-file or --source-organization is required")?;
        let api = self.factory.create(self.token.clone(), &self.hostname)?;

        let summary = match source {
            VariableSource::File(path) => {
                let rows = schema::parse_variables(open_input(&path)?)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                import::create_variables(api.as_ref(), &args.organization, rows).await
            }
            VariableSource::Organization {
                organization,
                token,
                hostname,
            } => {
                validate_repo_owner(&organization)?;
                validate_token(&token)?;
                let source_host = hostname.unwrap_or_else(|| self.hostname.clone());
                let source_api = self.factory.create(token, &source_host)?;
                migrate::migrate_variables(
                    source_api.as_ref(),
                    &organization,
                    api.as_ref(),
                    &args.organization,
                )
                .await?
            }
        };

        finish(
            &summary,
            format!("Successfully created variables for {}", args.organization),
        )
    }

    async fn export_environments(&self, args: ExportArgs) -> Result<()> {
        validate_targets(&args.organization, &args.repositories)?;
        let path = Self::output_path(&args, "environments");

        let api = self.factory.create(self.token.clone(), &self.hostname)?;
        let mut exporter = CsvExporter::environments(create_report(&path)?)
            .context("Failed to write CSV header")?;
        let summary = environments::export_environments(
            api.as_ref(),
            &args.organization,
            &args.repositories,
            &mut exporter,
        )
        .await?;

        finish(
            &summary,
            format!("Successfully exported environment data to {}", path.display()),
        )
    }
}
