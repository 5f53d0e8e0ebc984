//! Repository inventory of an organization.
//!
//! The inventory is the only source for the set of private and internal
//! repositories, which `private` visibility resolution needs.

use tracing::{debug, info};

use crate::app_deps::GitHubApi;
use crate::errors::GitHubError;
use crate::models::Repository;

/// Lazy, finite sequence of repository pages. The cursor stays inside.
pub struct RepositoryPages<'a> {
    api: &'a dyn GitHubApi,
    owner: String,
    cursor: Option<String>,
    done: bool,
}

impl<'a> RepositoryPages<'a> {
    pub fn new(api: &'a dyn GitHubApi, owner: impl Into<String>) -> Self {
        Self {
            api,
            owner: owner.into(),
            cursor: None,
            done: false,
        }
    }

    /// Fetch the next page, or `None` once the server reported the last one.
    pub async fn next_page(&mut self) -> Result<Option<Vec<Repository>>, GitHubError> {
        if self.done {
            return Ok(None);
        }
        debug!(owner = %self.owner, cursor = ?self.cursor, "fetching repository page");
        let page = self
            .api
            .list_repository_page(&self.owner, self.cursor.as_deref())
            .await?;

        self.done = !page.has_next_page || page.end_cursor.is_none();
        self.cursor = page.end_cursor;
        Ok(Some(page.repositories))
    }

    /// Start again from the first page.
    pub fn restart(&mut self) {
        self.cursor = None;
        self.done = false;
    }
}

/// Every repository of `owner`. Any error aborts.
pub async fn list_all(api: &dyn GitHubApi, owner: &str) -> Result<Vec<Repository>, GitHubError> {
    let mut pages = RepositoryPages::new(api, owner);
    let mut repositories = Vec::new();
    while let Some(page) = pages.next_page().await? {
        repositories.extend(page);
    }
    info!(owner, count = repositories.len(), "listed repositories");
    Ok(repositories)
}

/// A single named repository.
pub async fn lookup(
    api: &dyn GitHubApi,
    owner: &str,
    name: &str,
) -> Result<Repository, GitHubError> {
    debug!(owner, repo = name, "looking up repository");
    let repository = api.get_repository(owner, name).await?;
    if !repository.name.eq_ignore_ascii_case(name) {
        return Err(GitHubError::NotFound(format!(
            "repository {}/{} (server returned {})",
            owner, name, repository.name
        )));
    }
    Ok(repository)
}

/// The named repositories, or the whole organization when `names` is empty.
pub async fn collect(
    api: &dyn GitHubApi,
    owner: &str,
    names: &[String],
) -> Result<Vec<Repository>, GitHubError> {
    if names.is_empty() {
        return list_all(api, owner).await;
    }
    info!(owner, repos = ?names, "processing named repositories");
    let mut repositories = Vec::with_capacity(names.len());
    for name in names {
        repositories.push(lookup(api, owner, name).await?);
    }
    Ok(repositories)
}
