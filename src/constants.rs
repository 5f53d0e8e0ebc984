//! Application constants for API endpoints, CSV layout, and validation rules.
//!
//! This module contains all constant values used throughout the application,
//! including GitHub API path fragments, the CSV headers of every report, and
//! validation constraints.

/// GitHub API constants.
pub mod api {
    /// Default GitHub host.
    pub const DEFAULT_HOSTNAME: &str = "github.com";

    /// Page size used for both GraphQL and REST pagination.
    pub const PAGE_SIZE: usize = 100;

    /// Paginated organization repository query.
    pub const REPOSITORIES_QUERY: &str = r#"query($owner: String!, $endCursor: String) {
  organization(login: $owner) {
    repositories(first: 100, after: $endCursor) {
      totalCount
      nodes { databaseId name visibility updatedAt }
      pageInfo { endCursor hasNextPage }
    }
  }
}"#;

    /// Single repository query.
    pub const REPOSITORY_QUERY: &str = r#"query($owner: String!, $name: String!) {
  repository(owner: $owner, name: $name) { databaseId name visibility updatedAt }
}"#;
}

/// CSV layout constants.
pub mod csv {
    /// Separator used inside multi-valued cells.
    pub const CELL_SEPARATOR: &str = ";";

    /// Separator between reviewers in the environment report.
    pub const REVIEWER_SEPARATOR: &str = "|";

    /// Access value written for repository-level secrets and variables.
    pub const REPO_ONLY_ACCESS: &str = "RepoOnly";

    pub const SECRET_HEADER: [&str; 7] = [
        "SecretLevel",
        "SecretType",
        "SecretName",
        "SecretValue",
        "SecretAccess",
        "RepositoryNames",
        "RepositoryIDs",
    ];

    pub const VARIABLE_HEADER: [&str; 6] = [
        "VariableLevel",
        "VariableName",
        "VariableValue",
        "VariableAccess",
        "RepositoryNames",
        "RepositoryIDs",
    ];

    pub const ENVIRONMENT_HEADER: [&str; 12] = [
        "RepositoryName",
        "RepositoryID",
        "EnvironmentName",
        "AdminBypass",
        "WaitTimer",
        "Reviewers",
        "ProtectedBranches",
        "CustomBranchPolicies",
        "SecretsTotalCount",
        "SecretsList",
        "VariablesTotalCount",
        "VariablesList",
    ];
}

/// Secret and variable name validation constants.
pub mod validation {
    /// Maximum length for a secret or variable name.
    pub const MAX_NAME_LENGTH: usize = 255;

    /// GitHub allows letters, numbers and underscores, not starting with a number.
    pub const VALID_NAME_PATTERN: &str = r"^[A-Za-z_][A-Za-z0-9_]*$";

    /// Reserved prefix for secret and variable names.
    pub const RESERVED_PREFIX: &str = "GITHUB_";
}

/// Repository validation constants.
pub mod repo {
    /// Maximum length for an organization or user name.
    pub const MAX_OWNER_LENGTH: usize = 39; // GitHub username limit

    /// Maximum length for repository name.
    pub const MAX_REPO_NAME_LENGTH: usize = 100;
}

/// Logging constants.
pub mod log {
    /// Environment variable overriding the log filter.
    pub const LOG_ENV: &str = "ORG_SECRETS_LOG";

    /// Filter used when nothing else is configured.
    pub const DEFAULT_LEVEL: &str = "warn";
}

/// Name of the configuration directory under the XDG config home.
pub const APP_DIR: &str = "org-secrets";
