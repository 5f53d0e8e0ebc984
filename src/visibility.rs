//! Resolution between abstract visibility (`all`, `private`, `selected`,
//! `RepoOnly`) and concrete repository sets.
//!
//! Export turns a live visibility into the names and IDs written to CSV.
//! Import turns a CSV row back into the repository ID array of a create call.

use tracing::debug;

use crate::app_deps::GitHubApi;
use crate::constants::csv::REPO_ONLY_ACCESS;
use crate::errors::{GitHubError, SchemaError};
use crate::models::{Provider, RepoVisibility, Repository, ScopedRepository, Target, Visibility};
use crate::payload::{SelectedRepositoryIds, parse_repository_ids};
use crate::schema::{ImportedSecret, ImportedVariable, RepositoryScope};

/// Which scoped-repositories endpoint backs a `selected` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeSource {
    Secret(Provider),
    Variable,
}

/// An export-side resolution: the access cell plus the repository cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub access: String,
    pub scope: RepositoryScope,
}

/// All non-public repositories of the inventory. GitHub has no endpoint for
/// this set, so it is derived.
pub fn resolve_private(inventory: &[Repository]) -> RepositoryScope {
    let (names, ids) = inventory
        .iter()
        .filter(|repo| repo.visibility != RepoVisibility::Public)
        .map(|repo| (repo.name.clone(), repo.database_id.to_string()))
        .unzip();
    RepositoryScope { names, ids }
}

/// The scoped repositories of a `selected` entry, in server order.
pub fn resolve_selected(scoped: &[ScopedRepository]) -> RepositoryScope {
    let (names, ids) = scoped
        .iter()
        .map(|repo| (repo.name.clone(), repo.id.to_string()))
        .unzip();
    RepositoryScope { names, ids }
}

/// Repository-level entries always map to their own repository.
pub fn resolve_repository(repo: &Repository) -> Resolved {
    Resolved {
        access: REPO_ONLY_ACCESS.to_string(),
        scope: RepositoryScope {
            names: vec![repo.name.clone()],
            ids: vec![repo.database_id.to_string()],
        },
    }
}

/// Resolve an organization-level secret or variable for export. Only
/// `selected` costs an API call.
pub async fn resolve_for_export(
    api: &dyn GitHubApi,
    owner: &str,
    source: ScopeSource,
    name: &str,
    visibility: Visibility,
    inventory: &[Repository],
) -> Result<Resolved, GitHubError> {
    let scope = match visibility {
        Visibility::Selected => {
            debug!(owner, name, "fetching scoped repositories");
            let org = Target::organization(owner);
            let scoped = match source {
                ScopeSource::Secret(provider) => {
                    api.list_secret_repositories(&org, provider, name).await?
                }
                ScopeSource::Variable => api.list_variable_repositories(&org, name).await?,
            };
            resolve_selected(&scoped)
        }
        Visibility::Private => resolve_private(inventory),
        Visibility::All => RepositoryScope::default(),
    };

    Ok(Resolved {
        access: visibility.as_str().to_string(),
        scope,
    })
}

/// The declared access of an organization-level row. `RepoOnly` and blanks
/// are not valid here.
pub fn organization_access(name: &str, access: &str) -> Result<Visibility, SchemaError> {
    match access.to_ascii_lowercase().as_str() {
        "all" => Ok(Visibility::All),
        "private" => Ok(Visibility::Private),
        "selected" => Ok(Visibility::Selected),
        _ => Err(SchemaError::InvalidAccess {
            name: name.to_string(),
            access: access.to_string(),
        }),
    }
}

/// A `selected` row needs one name per ID. Both lists empty is reported later
/// as a row with no repositories.
fn check_lists(name: &str, names: &[String], ids: &[String]) -> Result<(), SchemaError> {
    if names.len() != ids.len() {
        return Err(SchemaError::MismatchedRepositoryLists {
            name: name.to_string(),
            names: names.len(),
            ids: ids.len(),
        });
    }
    Ok(())
}

/// Repository IDs for an organization secret. `None` unless access is
/// `selected`, in which case the row must carry valid numeric IDs.
pub fn secret_selection(
    secret: &ImportedSecret,
) -> Result<Option<SelectedRepositoryIds>, SchemaError> {
    if !secret.is_selected() {
        return Ok(None);
    }
    check_lists(&secret.name, &secret.repository_names, &secret.repository_ids)?;
    SelectedRepositoryIds::for_provider(secret.provider, &secret.name, &secret.repository_ids)
        .map(Some)
}

/// Repository IDs for an organization variable (always integers).
pub fn variable_selection(variable: &ImportedVariable) -> Result<Option<Vec<u64>>, SchemaError> {
    if !variable.is_selected() {
        return Ok(None);
    }
    check_lists(&variable.name, &variable.repository_names, &variable.repository_ids)?;
    parse_repository_ids(&variable.name, &variable.repository_ids).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Level;
    use chrono::Utc;

    fn repo(name: &str, id: u64, visibility: RepoVisibility) -> Repository {
        Repository {
            database_id: id,
            name: name.to_string(),
            visibility,
            updated_at: Utc::now(),
        }
    }

    fn secret(provider: Provider, access: &str, names: &[&str], ids: &[&str]) -> ImportedSecret {
        ImportedSecret {
            level: Level::Organization,
            provider,
            name: "S".to_string(),
            value: "v".to_string(),
            access: access.to_string(),
            repository_names: names.iter().map(|s| s.to_string()).collect(),
            repository_ids: ids.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_private_excludes_public_repositories() {
        let inventory = vec![
            repo("pub", 1, RepoVisibility::Public),
            repo("priv", 2, RepoVisibility::Private),
            repo("int", 3, RepoVisibility::Internal),
        ];
        let scope = resolve_private(&inventory);
        assert_eq!(crate::schema::join_cell(&scope.names), "priv;int");
        assert_eq!(crate::schema::join_cell(&scope.ids), "2;3");
    }

    #[test]
    fn test_selected_keeps_server_order() {
        let scoped = vec![
            ScopedRepository { id: 20, name: "b".to_string() },
            ScopedRepository { id: 10, name: "a".to_string() },
        ];
        let scope = resolve_selected(&scoped);
        assert_eq!(scope.names, vec!["b", "a"]);
        assert_eq!(scope.ids, vec!["20", "10"]);
    }

    #[test]
    fn test_repository_level_is_repo_only() {
        let resolved = resolve_repository(&repo("api", 42, RepoVisibility::Public));
        assert_eq!(resolved.access, "RepoOnly");
        assert_eq!(resolved.scope.names, vec!["api"]);
        assert_eq!(resolved.scope.ids, vec!["42"]);
    }

    #[test]
    fn test_non_selected_access_has_no_selection() {
        let row = secret(Provider::Actions, "private", &[], &[]);
        assert_eq!(secret_selection(&row).unwrap(), None);
        let row = secret(Provider::Actions, "all", &["ignored"], &["x"]);
        assert_eq!(secret_selection(&row).unwrap(), None);
    }

    #[test]
    fn test_organization_access_rejects_repo_only() {
        assert_eq!(organization_access("S", "Selected").unwrap(), Visibility::Selected);
        assert!(matches!(
            organization_access("S", "RepoOnly"),
            Err(SchemaError::InvalidAccess { .. })
        ));
        assert!(organization_access("S", "").is_err());
    }

    #[test]
    fn test_selected_requires_matching_lists() {
        let row = secret(Provider::Codespaces, "selected", &["a", "b"], &["1"]);
        assert!(matches!(
            secret_selection(&row),
            Err(SchemaError::MismatchedRepositoryLists { names: 2, ids: 1, .. })
        ));

        let row = secret(Provider::Codespaces, "selected", &[], &[]);
        assert!(matches!(
            secret_selection(&row),
            Err(SchemaError::NoSelectedRepositories(_))
        ));
    }

    #[test]
    fn test_selected_rejects_ids_without_names() {
        let row = secret(Provider::Actions, "selected", &[], &["111", "222"]);
        assert!(matches!(
            secret_selection(&row),
            Err(SchemaError::MismatchedRepositoryLists { names: 0, ids: 2, .. })
        ));
    }

    #[test]
    fn test_selected_shapes_follow_provider() {
        let row = secret(Provider::Dependabot, "selected", &["a", "b"], &["1234", "5678"]);
        assert_eq!(
            secret_selection(&row).unwrap(),
            Some(SelectedRepositoryIds::Strings(vec!["1234".into(), "5678".into()]))
        );
        let row = secret(Provider::Actions, "selected", &["a", "b"], &["1234", "5678"]);
        assert_eq!(
            secret_selection(&row).unwrap(),
            Some(SelectedRepositoryIds::Integers(vec![1234, 5678]))
        );
    }
}
