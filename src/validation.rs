//! Input validation utilities.
//!
//! This module validates secret and variable names, organization and
//! repository names, and GitHub tokens before any API call is made with them.

use std::sync::LazyLock;

use regex::Regex;

use crate::constants;
use crate::errors::ValidationError;

static NAME_PATTERN: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(constants::validation::VALID_NAME_PATTERN));

/// Validate a secret or variable name according to GitHub API requirements.
///
/// # Errors
///
/// Returns an error if:
/// - The name is empty
/// - The name exceeds the maximum length
/// - The name contains characters other than letters, digits and underscores
/// - The name starts with a digit or with the reserved `GITHUB_` prefix
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::Name("name cannot be empty".to_string()));
    }

    if trimmed.len() > constants::validation::MAX_NAME_LENGTH {
        return Err(ValidationError::Name(format!(
            "'{}' exceeds {} characters",
            trimmed,
            constants::validation::MAX_NAME_LENGTH
        )));
    }

    let re = NAME_PATTERN
        .as_ref()
        .map_err(|e| ValidationError::Name(format!("failed to compile validation regex: {}", e)))?;

    if !re.is_match(trimmed) {
        return Err(ValidationError::Name(format!(
            "'{}' may only contain letters, numbers and underscores and must not start with a number",
            trimmed
        )));
    }

    if trimmed
        .to_ascii_uppercase()
        .starts_with(constants::validation::RESERVED_PREFIX)
    {
        return Err(ValidationError::Name(format!(
            "'{}' uses the reserved {} prefix",
            trimmed,
            constants::validation::RESERVED_PREFIX
        )));
    }

    Ok(())
}

/// Validate an organization (repository owner) name.
pub fn validate_repo_owner(owner: &str) -> Result<(), ValidationError> {
    let trimmed = owner.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::RepositoryOwner(
            "organization cannot be empty".to_string(),
        ));
    }

    if trimmed.len() > constants::repo::MAX_OWNER_LENGTH {
        return Err(ValidationError::RepositoryOwner(format!(
            "organization cannot exceed {} characters (got {})",
            constants::repo::MAX_OWNER_LENGTH,
            trimmed.len()
        )));
    }

    if trimmed.starts_with('-')
        || !trimmed.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        return Err(ValidationError::RepositoryOwner(format!(
            "'{}' is not a valid organization name",
            trimmed
        )));
    }

    Ok(())
}

/// Validate a repository name.
pub fn validate_repo_name(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::RepositoryName(
            "repository name cannot be empty".to_string(),
        ));
    }

    if trimmed.len() > constants::repo::MAX_REPO_NAME_LENGTH {
        return Err(ValidationError::RepositoryName(format!(
            "repository name cannot exceed {} characters (got {})",
            constants::repo::MAX_REPO_NAME_LENGTH,
            trimmed.len()
        )));
    }

    if trimmed.contains('/') {
        return Err(ValidationError::RepositoryName(format!(
            "'{}' must be a bare repository name without the organization",
            trimmed
        )));
    }

    if trimmed == "." || trimmed == ".." {
        return Err(ValidationError::RepositoryName(format!(
            "'{}' is not a repository name",
            trimmed
        )));
    }

    if !trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return Err(ValidationError::RepositoryName(format!(
            "'{}' may only contain letters, numbers, '-', '_' and '.'",
            trimmed
        )));
    }

    Ok(())
}

/// Validate a GitHub token format (basic checks).
///
/// Classic tokens start with `ghp_`, fine-grained ones with `github_pat_`, but
/// GHES and app tokens vary, so only the length is checked.
pub fn validate_token(token: &str) -> Result<(), ValidationError> {
    let trimmed = token.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::Token("GitHub token cannot be empty".to_string()));
    }

    if trimmed.len() < 20 {
        return Err(ValidationError::Token(
            "GitHub token appears too short (minimum 20 characters)".to_string(),
        ));
    }

    if trimmed.len() > 255 {
        return Err(ValidationError::Token(
            "GitHub token appears too long (maximum 255 characters)".to_string(),
        ));
    }

    Ok(())
}
