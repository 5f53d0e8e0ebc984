//! Creation of secrets and variables from parsed CSV rows.
//!
//! Every row is one unit of work. A row that fails (bad shape, bad name, bad
//! key, API error) is recorded and the next row is processed.

use tracing::{debug, info};

use crate::app_deps::GitHubApi;
use crate::cipher::{encrypt_secret, fetch_key};
use crate::errors::{ReconcileError, SchemaError};
use crate::models::{Level, Provider, Target};
use crate::payload::{SecretPayload, VariablePayload};
use crate::schema::{ImportedSecret, ImportedVariable};
use crate::summary::{Bucket, Summary};
use crate::validation::{validate_name, validate_repo_name};
use crate::visibility::{organization_access, secret_selection, variable_selection};

fn unparsed_subject(index: usize, err: &SchemaError) -> String {
    match err {
        SchemaError::Malformed { line, .. } => format!("line {}", line),
        _ => format!("row {}", index + 1),
    }
}

/// Create or update one secret. The public key is fetched for this call only.
pub async fn create_secret(
    api: &dyn GitHubApi,
    owner: &str,
    secret: &ImportedSecret,
) -> Result<(), ReconcileError> {
    validate_name(&secret.name)?;

    let (target, payload_shape) = match secret.level {
        Level::Organization => {
            let visibility = organization_access(&secret.name, &secret.access)?;
            let selected = secret_selection(secret)?;
            (Target::organization(owner), Some((visibility, selected)))
        }
        Level::Repository => {
            let repo = secret.target_repository()?;
            validate_repo_name(repo)?;
            (Target::repository(owner, repo), None)
        }
    };

    let key = fetch_key(api, &target, secret.provider).await?;
    let encrypted = encrypt_secret(&key.key, &secret.value)?;

    let payload = match payload_shape {
        Some((visibility, selected)) => {
            SecretPayload::organization(visibility.as_str(), selected, key.key_id, encrypted)
        }
        None => SecretPayload::repository(key.key_id, encrypted),
    };

    debug!(dest = %target, provider = %secret.provider, secret = %secret.name, "putting secret");
    api.put_secret(&target, secret.provider, &secret.name, &payload)
        .await?;
    Ok(())
}

/// Create every parsed secret row against `owner`.
pub async fn create_secrets(
    api: &dyn GitHubApi,
    owner: &str,
    rows: Vec<Result<ImportedSecret, SchemaError>>,
) -> Summary {
    let mut summary = Summary::new();
    info!(owner, rows = rows.len(), "creating secrets");

    for (index, row) in rows.into_iter().enumerate() {
        match row {
            Ok(secret) => {
                let bucket = Bucket::Unit(secret.level, secret.provider);
                let outcome = create_secret(api, owner, &secret).await;
                summary.record(bucket, secret.name, outcome);
            }
            Err(err) => {
                summary.record(Bucket::Unparsed, unparsed_subject(index, &err), Err(err.into()))
            }
        }
    }
    summary
}

/// Create one Actions variable.
pub async fn create_variable(
    api: &dyn GitHubApi,
    owner: &str,
    variable: &ImportedVariable,
) -> Result<(), ReconcileError> {
    validate_name(&variable.name)?;

    let (target, payload) = match variable.level {
        Level::Organization => {
            let visibility = organization_access(&variable.name, &variable.access)?;
            let selected = variable_selection(variable)?;
            (
                Target::organization(owner),
                VariablePayload::organization(
                    &variable.name,
                    &variable.value,
                    visibility.as_str(),
                    selected,
                ),
            )
        }
        Level::Repository => {
            let repo = variable.target_repository()?;
            validate_repo_name(repo)?;
            (
                Target::repository(owner, repo),
                VariablePayload::repository(&variable.name, &variable.value),
            )
        }
    };

    debug!(dest = %target, variable = %variable.name, "creating variable");
    api.create_variable(&target, &payload).await?;
    Ok(())
}

/// Create every parsed variable row against `owner`.
pub async fn create_variables(
    api: &dyn GitHubApi,
    owner: &str,
    rows: Vec<Result<ImportedVariable, SchemaError>>,
) -> Summary {
    let mut summary = Summary::new();
    info!(owner, rows = rows.len(), "creating variables");

    for (index, row) in rows.into_iter().enumerate() {
        match row {
            Ok(variable) => {
                let bucket = Bucket::Unit(variable.level, Provider::Actions);
                let outcome = create_variable(api, owner, &variable).await;
                summary.record(bucket, variable.name, outcome);
            }
            Err(err) => {
                summary.record(Bucket::Unparsed, unparsed_subject(index, &err), Err(err.into()))
            }
        }
    }
    summary
}
