//! Export of live secrets and variables to CSV.
//!
//! Organization-level entries are exported only when no repositories are
//! named. Listing or resolving one entry may fail without stopping the run;
//! inventory and CSV write errors are fatal.

use std::io;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::app_deps::GitHubApi;
use crate::inventory;
use crate::models::{AppFilter, Level, Provider, Repository, Target, Visibility};
use crate::schema::CsvExporter;
use crate::summary::{Bucket, Summary};
use crate::visibility::{ScopeSource, resolve_for_export, resolve_repository};

fn declared_visibility(name: &str, visibility: Option<Visibility>) -> Visibility {
    visibility.unwrap_or_else(|| {
        warn!(name, "organization entry has no visibility; treating as all");
        Visibility::All
    })
}

/// Export the secrets of `owner` (or of the named `repos`) for every provider
/// enabled by `filter`.
pub async fn export_secrets<W: io::Write>(
    api: &dyn GitHubApi,
    owner: &str,
    repos: &[String],
    filter: AppFilter,
    exporter: &mut CsvExporter<W>,
) -> Result<Summary> {
    let inventory = inventory::collect(api, owner, repos)
        .await
        .with_context(|| format!("Failed to list repositories of {}", owner))?;
    let providers = filter.providers();
    let mut summary = Summary::new();

    if repos.is_empty() {
        let org = Target::organization(owner);
        for &provider in &providers {
            export_organization_secrets(api, &org, provider, &inventory, exporter, &mut summary)
                .await?;
        }
    }

    for repo in &inventory {
        for &provider in &providers {
            export_repository_secrets(api, owner, repo, provider, exporter, &mut summary).await?;
        }
    }

    exporter.flush().context("Failed to flush CSV output")?;
    Ok(summary)
}

async fn export_organization_secrets<W: io::Write>(
    api: &dyn GitHubApi,
    org: &Target,
    provider: Provider,
    inventory: &[Repository],
    exporter: &mut CsvExporter<W>,
    summary: &mut Summary,
) -> Result<()> {
    let bucket = Bucket::Unit(Level::Organization, provider);
    let secrets = match api.list_secrets(org, provider).await {
        Ok(secrets) => secrets,
        Err(err) => {
            summary.record(bucket, format!("{} {} secrets", org, provider), Err(err.into()));
            return Ok(());
        }
    };
    info!(owner = %org, %provider, count = secrets.len(), "exporting organization secrets");

    for secret in secrets {
        let visibility = declared_visibility(&secret.name, secret.visibility);
        let resolved = resolve_for_export(
            api,
            &org.owner,
            ScopeSource::Secret(provider),
            &secret.name,
            visibility,
            inventory,
        )
        .await;

        match resolved {
            Ok(resolved) => {
                exporter
                    .write_secret(
                        Level::Organization,
                        provider,
                        &secret.name,
                        &resolved.access,
                        &resolved.scope,
                    )
                    .context("Failed to write CSV row")?;
                summary.record(bucket, &secret.name, Ok(()));
            }
            Err(err) => summary.record(bucket, &secret.name, Err(err.into())),
        }
    }
    Ok(())
}

async fn export_repository_secrets<W: io::Write>(
    api: &dyn GitHubApi,
    owner: &str,
    repo: &Repository,
    provider: Provider,
    exporter: &mut CsvExporter<W>,
    summary: &mut Summary,
) -> Result<()> {
    let bucket = Bucket::Unit(Level::Repository, provider);
    let target = Target::repository(owner, &repo.name);
    let secrets = match api.list_secrets(&target, provider).await {
        Ok(secrets) => secrets,
        Err(err) => {
            summary.record(bucket, format!("{} {} secrets", target, provider), Err(err.into()));
            return Ok(());
        }
    };

    let resolved = resolve_repository(repo);
    for secret in secrets {
        exporter
            .write_secret(
                Level::Repository,
                provider,
                &secret.name,
                &resolved.access,
                &resolved.scope,
            )
            .context("Failed to write CSV row")?;
        summary.record(bucket, format!("{}/{}", repo.name, secret.name), Ok(()));
    }
    Ok(())
}

/// Export the Actions variables of `owner` (or of the named `repos`).
pub async fn export_variables<W: io::Write>(
    api: &dyn GitHubApi,
    owner: &str,
    repos: &[String],
    exporter: &mut CsvExporter<W>,
) -> Result<Summary> {
    let inventory = inventory::collect(api, owner, repos)
        .await
        .with_context(|| format!("Failed to list repositories of {}", owner))?;
    let mut summary = Summary::new();

    if repos.is_empty() {
        export_organization_variables(api, owner, &inventory, exporter, &mut summary).await?;
    }

    let bucket = Bucket::Unit(Level::Repository, Provider::Actions);
    for repo in &inventory {
        let target = Target::repository(owner, &repo.name);
        let variables = match api.list_variables(&target).await {
            Ok(variables) => variables,
            Err(err) => {
                summary.record(bucket, format!("{} variables", target), Err(err.into()));
                continue;
            }
        };

        let resolved = resolve_repository(repo);
        for variable in variables {
            exporter
                .write_variable(
                    Level::Repository,
                    &variable.name,
                    &variable.value,
                    &resolved.access,
                    &resolved.scope,
                )
                .context("Failed to write CSV row")?;
            summary.record(bucket, format!("{}/{}", repo.name, variable.name), Ok(()));
        }
    }

    exporter.flush().context("Failed to flush CSV output")?;
    Ok(summary)
}

async fn export_organization_variables<W: io::Write>(
    api: &dyn GitHubApi,
    owner: &str,
    inventory: &[Repository],
    exporter: &mut CsvExporter<W>,
    summary: &mut Summary,
) -> Result<()> {
    let bucket = Bucket::Unit(Level::Organization, Provider::Actions);
    let org = Target::organization(owner);
    let variables = match api.list_variables(&org).await {
        Ok(variables) => variables,
        Err(err) => {
            summary.record(bucket, format!("{} variables", org), Err(err.into()));
            return Ok(());
        }
    };
    info!(owner, count = variables.len(), "exporting organization variables");

    for variable in variables {
        let visibility = declared_visibility(&variable.name, variable.visibility);
        let resolved = resolve_for_export(
            api,
            owner,
            ScopeSource::Variable,
            &variable.name,
            visibility,
            inventory,
        )
        .await;

        match resolved {
            Ok(resolved) => {
                exporter
                    .write_variable(
                        Level::Organization,
                        &variable.name,
                        &variable.value,
                        &resolved.access,
                        &resolved.scope,
                    )
                    .context("Failed to write CSV row")?;
                summary.record(bucket, &variable.name, Ok(()));
            }
            Err(err) => summary.record(bucket, &variable.name, Err(err.into())),
        }
    }
    Ok(())
}
