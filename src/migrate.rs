//! Direct copy of organization variables from one organization to another.

use anyhow::{Context, Result};
use tracing::info;

use crate::app_deps::GitHubApi;
use crate::errors::ReconcileError;
use crate::models::{Level, Provider, Target, Variable, Visibility};
use crate::payload::{VariablePayload, parse_repository_ids};
use crate::summary::{Bucket, Summary};
use crate::visibility::{ScopeSource, resolve_for_export};

/// Build the destination body for one source variable. `selected` variables
/// keep the repository IDs they have in the source organization.
async fn migrated_payload(
    source: &dyn GitHubApi,
    source_org: &str,
    variable: &Variable,
) -> Result<VariablePayload, ReconcileError> {
    let visibility = variable.visibility.unwrap_or(Visibility::All);
    let resolved = resolve_for_export(
        source,
        source_org,
        ScopeSource::Variable,
        &variable.name,
        visibility,
        &[],
    )
    .await?;

    let selected = match visibility {
        Visibility::Selected => Some(parse_repository_ids(&variable.name, &resolved.scope.ids)?),
        Visibility::All | Visibility::Private => None,
    };

    Ok(VariablePayload::organization(
        &variable.name,
        &variable.value,
        &resolved.access,
        selected,
    ))
}

/// Copy every variable of `source_org` into `destination_org`.
pub async fn migrate_variables(
    source: &dyn GitHubApi,
    source_org: &str,
    destination: &dyn GitHubApi,
    destination_org: &str,
) -> Result<Summary> {
    let variables = source
        .list_variables(&Target::organization(source_org))
        .await
        .with_context(|| format!("Failed to list variables of {}", source_org))?;
    info!(
        source = source_org,
        destination = destination_org,
        count = variables.len(),
        "migrating variables"
    );

    let bucket = Bucket::Unit(Level::Organization, Provider::Actions);
    let target = Target::organization(destination_org);
    let mut summary = Summary::new();

    for variable in &variables {
        let outcome = match migrated_payload(source, source_org, variable).await {
            Ok(payload) => destination
                .create_variable(&target, &payload)
                .await
                .map_err(ReconcileError::from),
            Err(err) => Err(err),
        };
        summary.record(bucket, &variable.name, outcome);
    }
    Ok(summary)
}
