//! Deployment environment report.

use std::io;

use anyhow::{Context, Result};
use tracing::debug;

use crate::app_deps::GitHubApi;
use crate::constants::csv::{CELL_SEPARATOR, REVIEWER_SEPARATOR};
use crate::errors::GitHubError;
use crate::inventory;
use crate::models::{Environment, Repository, Target};
use crate::schema::{CsvExporter, EnvironmentRecord, join_cell};
use crate::summary::{Bucket, Summary};

const WAIT_TIMER_RULE: &str = "wait_timer";
const REQUIRED_REVIEWERS_RULE: &str = "required_reviewers";

/// `Type;login;id` for every required reviewer, joined with `|`.
pub fn format_reviewers(environment: &Environment) -> String {
    environment
        .protection_rules
        .iter()
        .filter(|rule| rule.kind == REQUIRED_REVIEWERS_RULE)
        .flat_map(|rule| rule.reviewers.iter())
        .map(|r| {
            format!(
                "{}{sep}{}{sep}{}",
                r.kind,
                r.reviewer.handle(),
                r.reviewer.id,
                sep = CELL_SEPARATOR
            )
        })
        .collect::<Vec<_>>()
        .join(REVIEWER_SEPARATOR)
}

/// Wait timer in minutes, 0 when the environment has none.
pub fn wait_timer(environment: &Environment) -> u64 {
    environment
        .protection_rules
        .iter()
        .find(|rule| rule.kind == WAIT_TIMER_RULE)
        .and_then(|rule| rule.wait_timer)
        .unwrap_or_default()
}

async fn environment_record(
    api: &dyn GitHubApi,
    target: &Target,
    repo: &Repository,
    environment: &Environment,
) -> Result<EnvironmentRecord, GitHubError> {
    let secrets = api.list_environment_secrets(target, &environment.name).await?;
    let variables = api
        .list_environment_variables(target, &environment.name)
        .await?;
    let policy = environment.deployment_branch_policy;

    Ok(EnvironmentRecord {
        repository_name: repo.name.clone(),
        repository_id: repo.database_id,
        environment_name: environment.name.clone(),
        admin_bypass: environment.can_admins_bypass,
        wait_timer: wait_timer(environment),
        reviewers: format_reviewers(environment),
        protected_branches: policy.is_some_and(|p| p.protected_branches),
        custom_branch_policies: policy.is_some_and(|p| p.custom_branch_policies),
        secrets_total_count: secrets.len(),
        secrets_list: join_cell(&secrets.iter().map(|s| s.name.as_str()).collect::<Vec<_>>()),
        variables_total_count: variables.len(),
        variables_list: join_cell(
            &variables.iter().map(|v| v.name.as_str()).collect::<Vec<_>>(),
        ),
    })
}

async fn repository_records(
    api: &dyn GitHubApi,
    owner: &str,
    repo: &Repository,
) -> Result<Vec<EnvironmentRecord>, GitHubError> {
    let target = Target::repository(owner, &repo.name);
    let environments = api.list_environments(&target).await?;
    debug!(repo = %target, count = environments.len(), "gathered environments");

    let mut records = Vec::with_capacity(environments.len());
    for environment in &environments {
        records.push(environment_record(api, &target, repo, environment).await?);
    }
    Ok(records)
}

/// Write one row per environment of every repository of `owner` (or of the
/// named `repos`). A repository whose environments cannot be read is recorded
/// as failed and skipped.
pub async fn export_environments<W: io::Write>(
    api: &dyn GitHubApi,
    owner: &str,
    repos: &[String],
    exporter: &mut CsvExporter<W>,
) -> Result<Summary> {
    let inventory = inventory::collect(api, owner, repos)
        .await
        .with_context(|| format!("Failed to list repositories of {}", owner))?;
    let mut summary = Summary::new();

    for repo in &inventory {
        match repository_records(api, owner, repo).await {
            Ok(records) => {
                for record in &records {
                    exporter
                        .write_environment(record)
                        .context("Failed to write CSV row")?;
                }
                summary.record(Bucket::Environments, &repo.name, Ok(()));
            }
            Err(err) => summary.record(Bucket::Environments, &repo.name, Err(err.into())),
        }
    }

    exporter.flush().context("Failed to flush CSV output")?;
    Ok(summary)
}
