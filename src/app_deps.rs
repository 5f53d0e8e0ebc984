use anyhow::Result;
use async_trait::async_trait;

use crate::errors::GitHubError;
use crate::github;
use crate::models::{
    Environment, Provider, PublicKey, Repository, RepositoryPage, ScopedRepository, Secret,
    Target, Variable,
};
use crate::payload::{SecretPayload, VariablePayload};

/// Every GitHub call the drivers make. Implemented by [`github::GitHubClient`]
/// and by in-memory fakes in tests.
#[async_trait]
pub trait GitHubApi: Send + Sync {
    async fn list_repository_page(
        &self,
        owner: &str,
        cursor: Option<&str>,
    ) -> Result<RepositoryPage, GitHubError>;

    async fn get_repository(&self, owner: &str, name: &str) -> Result<Repository, GitHubError>;

    async fn list_secrets(
        &self,
        target: &Target,
        provider: Provider,
    ) -> Result<Vec<Secret>, GitHubError>;

    async fn list_secret_repositories(
        &self,
        target: &Target,
        provider: Provider,
        name: &str,
    ) -> Result<Vec<ScopedRepository>, GitHubError>;

    async fn get_public_key(
        &self,
        target: &Target,
        provider: Provider,
    ) -> Result<PublicKey, GitHubError>;

    async fn put_secret(
        &self,
        target: &Target,
        provider: Provider,
        name: &str,
        payload: &SecretPayload,
    ) -> Result<(), GitHubError>;

    async fn list_variables(&self, target: &Target) -> Result<Vec<Variable>, GitHubError>;

    async fn list_variable_repositories(
        &self,
        target: &Target,
        name: &str,
    ) -> Result<Vec<ScopedRepository>, GitHubError>;

    async fn create_variable(
        &self,
        target: &Target,
        payload: &VariablePayload,
    ) -> Result<(), GitHubError>;

    async fn list_environments(&self, target: &Target) -> Result<Vec<Environment>, GitHubError>;

    async fn list_environment_secrets(
        &self,
        target: &Target,
        environment: &str,
    ) -> Result<Vec<Secret>, GitHubError>;

    async fn list_environment_variables(
        &self,
        target: &Target,
        environment: &str,
    ) -> Result<Vec<Variable>, GitHubError>;
}

/// Builds API clients for a host and token. The variable migration needs two:
/// one for the source organization and one for the destination.
pub trait GitHubApiFactory: Send + Sync {
    fn create(&self, token: String, hostname: &str) -> Result<Box<dyn GitHubApi>>;
}

pub struct RealGitHubApiFactory;

impl GitHubApiFactory for RealGitHubApiFactory {
    fn create(&self, token: String, hostname: &str) -> Result<Box<dyn GitHubApi>> {
        let client = github::GitHubClient::new(token, hostname)?;
        Ok(Box::new(client))
    }
}
