use thiserror::Error;

/// Errors that can occur when working with GitHub API.
#[derive(Error, Debug)]
pub enum GitHubError {
    #[error("GitHub API error (status {status_code}): {message}")]
    ApiError {
        status_code: u16,
        message: String,
        documentation_url: Option<String>,
    },
    #[error("HTTP error: {0}")]
    HttpError(String),
    #[error("URI error: {0}")]
    UriError(String),
    #[error("GraphQL error: {0}")]
    GraphQl(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Failed to decode response: {0}")]
    Decode(String),
}

/// Errors raised while sealing a secret value for GitHub.
#[derive(Error, Debug)]
pub enum EncryptionError {
    #[error("Invalid public key format: {0}")]
    InvalidBase64(String),
    #[error("Invalid public key length. Expected 32 bytes, got {0}")]
    InvalidKeyLength(usize),
    #[error("Failed to encrypt secret")]
    Seal,
}

/// Problems with a single CSV row.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Malformed CSV row at line {line}: {message}")]
    Malformed { line: u64, message: String },
    #[error("Repository-level entry '{0}' does not name a repository")]
    MissingRepository(String),
    #[error("Repository-level entry '{name}' names {count} repositories, expected exactly one")]
    AmbiguousRepository { name: String, count: usize },
    #[error("'{0}' has selected access but no repository IDs")]
    NoSelectedRepositories(String),
    #[error("'{name}' has a non-numeric repository ID: '{value}'")]
    InvalidRepositoryId { name: String, value: String },
    #[error("Organization-level entry '{name}' has unknown access '{access}'")]
    InvalidAccess { name: String, access: String },
    #[error("'{name}' lists {names} repository names but {ids} repository IDs")]
    MismatchedRepositoryLists { name: String, names: usize, ids: usize },
}

/// Errors that can occur during validation.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Name validation failed: {0}")]
    Name(String),
    #[error("Repository owner validation failed: {0}")]
    RepositoryOwner(String),
    #[error("Repository name validation failed: {0}")]
    RepositoryName(String),
    #[error("Token validation failed: {0}")]
    Token(String),
}

/// Errors that can occur when working with configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),
    #[error("Failed to parse config file: {0}")]
    ParseError(String),
    #[error("No GitHub token found; pass --token or set GITHUB_TOKEN")]
    MissingToken,
}

/// Failure of one unit of reconciliation work (one secret, variable or repository).
#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error(transparent)]
    Api(#[from] GitHubError),
    #[error(transparent)]
    Encryption(#[from] EncryptionError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl From<octocrab::Error> for GitHubError {
    fn from(err: octocrab::Error) -> Self {
        match err {
            octocrab::Error::GitHub { source, .. } => GitHubError::ApiError {
                status_code: source.status_code.as_u16(),
                message: source.message,
                documentation_url: source.documentation_url,
            },
            octocrab::Error::Http { source, .. } => GitHubError::HttpError(source.to_string()),
            octocrab::Error::Uri { source, .. } => GitHubError::UriError(source.to_string()),
            octocrab::Error::Serde { source, .. } => GitHubError::Decode(source.to_string()),
            octocrab::Error::Json { source, .. } => GitHubError::Decode(source.to_string()),
            _ => GitHubError::HttpError(err.to_string()),
        }
    }
}

impl GitHubError {
    /// True when the server answered 404.
    pub fn is_not_found(&self) -> bool {
        match self {
            GitHubError::NotFound(_) => true,
            GitHubError::ApiError { status_code, .. } => *status_code == 404,
            _ => false,
        }
    }
}
