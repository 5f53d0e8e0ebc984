//! Data model shared by the API client, the CSV schema and the drivers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a secret or variable belongs to the whole organization or one repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Level {
    Organization,
    Repository,
}

/// The GitHub subsystem that owns a secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Provider {
    Actions,
    Dependabot,
    Codespaces,
}

impl Provider {
    pub const ALL: [Provider; 3] = [Provider::Actions, Provider::Dependabot, Provider::Codespaces];

    /// Path segment used by the REST API.
    pub fn api_segment(&self) -> &'static str {
        match self {
            Provider::Actions => "actions",
            Provider::Dependabot => "dependabot",
            Provider::Codespaces => "codespaces",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Organization => write!(f, "Organization"),
            Level::Repository => write!(f, "Repository"),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Actions => write!(f, "Actions"),
            Provider::Dependabot => write!(f, "Dependabot"),
            Provider::Codespaces => write!(f, "Codespaces"),
        }
    }
}

/// Which providers an export covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AppFilter {
    #[default]
    All,
    Actions,
    Codespaces,
    Dependabot,
}

impl AppFilter {
    pub fn includes(&self, provider: Provider) -> bool {
        match self {
            AppFilter::All => true,
            AppFilter::Actions => provider == Provider::Actions,
            AppFilter::Codespaces => provider == Provider::Codespaces,
            AppFilter::Dependabot => provider == Provider::Dependabot,
        }
    }

    /// Providers enabled by this filter, in export order.
    pub fn providers(&self) -> Vec<Provider> {
        Provider::ALL
            .into_iter()
            .filter(|p| self.includes(*p))
            .collect()
    }
}

/// Scoping policy of an organization-level secret or variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    All,
    Private,
    Selected,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::All => "all",
            Visibility::Private => "private",
            Visibility::Selected => "selected",
        }
    }
}

/// Repository visibility as reported by GraphQL (`PUBLIC`, `PRIVATE`, `INTERNAL`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RepoVisibility {
    #[serde(alias = "public")]
    Public,
    #[serde(alias = "private")]
    Private,
    #[serde(alias = "internal")]
    Internal,
}

/// Repository snapshot taken once per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    pub database_id: u64,
    pub name: String,
    pub visibility: RepoVisibility,
    pub updated_at: DateTime<Utc>,
}

/// One page of the organization repository listing.
#[derive(Debug, Clone, Default)]
pub struct RepositoryPage {
    pub repositories: Vec<Repository>,
    pub end_cursor: Option<String>,
    pub has_next_page: bool,
}

/// A secret as listed by the API. The value is never returned.
#[derive(Debug, Clone, Deserialize)]
pub struct Secret {
    pub name: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    /// Absent for repository and environment secrets.
    pub visibility: Option<Visibility>,
    pub selected_repositories_url: Option<String>,
}

/// An Actions variable as listed by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct Variable {
    pub name: String,
    pub value: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub visibility: Option<Visibility>,
    pub selected_repositories_url: Option<String>,
}

/// A repository a `selected` secret or variable is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScopedRepository {
    pub id: u64,
    pub name: String,
}

/// Encryption key for one organization or repository target.
#[derive(Debug, Clone, Deserialize)]
pub struct PublicKey {
    pub key_id: String,
    pub key: String,
}

/// Deployment environment of a repository.
#[derive(Debug, Clone, Deserialize)]
pub struct Environment {
    pub name: String,
    #[serde(default)]
    pub can_admins_bypass: bool,
    #[serde(default)]
    pub protection_rules: Vec<ProtectionRule>,
    pub deployment_branch_policy: Option<BranchPolicy>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProtectionRule {
    #[serde(rename = "type")]
    pub kind: String,
    pub wait_timer: Option<u64>,
    #[serde(default)]
    pub reviewers: Vec<RequiredReviewer>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RequiredReviewer {
    #[serde(rename = "type")]
    pub kind: String,
    pub reviewer: ReviewerIdentity,
}

/// A user (`login`) or team (`slug`) reviewer.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewerIdentity {
    pub id: u64,
    pub login: Option<String>,
    pub slug: Option<String>,
}

impl ReviewerIdentity {
    pub fn handle(&self) -> &str {
        self.login
            .as_deref()
            .or(self.slug.as_deref())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct BranchPolicy {
    pub protected_branches: bool,
    pub custom_branch_policies: bool,
}

/// An organization or a single repository of that organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub owner: String,
    pub repository: Option<String>,
}

impl Target {
    pub fn organization(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repository: None,
        }
    }

    pub fn repository(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repository: Some(repo.into()),
        }
    }

    pub fn level(&self) -> Level {
        if self.repository.is_some() {
            Level::Repository
        } else {
            Level::Organization
        }
    }

    fn base_path(&self) -> String {
        match &self.repository {
            Some(repo) => format!("/repos/{}/{}", self.owner, repo),
            None => format!("/orgs/{}", self.owner),
        }
    }

    pub fn secrets_path(&self, provider: Provider) -> String {
        format!("{}/{}/secrets", self.base_path(), provider.api_segment())
    }

    pub fn secret_path(&self, provider: Provider, name: &str) -> String {
        format!("{}/{}", self.secrets_path(provider), name)
    }

    pub fn public_key_path(&self, provider: Provider) -> String {
        format!("{}/public-key", self.secrets_path(provider))
    }

    /// Only meaningful for organization targets.
    pub fn secret_repositories_path(&self, provider: Provider, name: &str) -> String {
        format!("{}/repositories", self.secret_path(provider, name))
    }

    pub fn variables_path(&self) -> String {
        format!("{}/actions/variables", self.base_path())
    }

    pub fn variable_repositories_path(&self, name: &str) -> String {
        format!("{}/{}/repositories", self.variables_path(), name)
    }

    pub fn environments_path(&self) -> String {
        format!("{}/environments", self.base_path())
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.repository {
            Some(repo) => write!(f, "{}/{}", self.owner, repo),
            None => write!(f, "{}", self.owner),
        }
    }
}
