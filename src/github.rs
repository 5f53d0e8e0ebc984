use anyhow::{Context, Result};
use async_trait::async_trait;
use octocrab::Octocrab;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::app_deps::GitHubApi;
use crate::constants::api::{
    DEFAULT_HOSTNAME, PAGE_SIZE, REPOSITORIES_QUERY, REPOSITORY_QUERY,
};
use crate::errors::GitHubError;
use crate::models::{
    Environment, Provider, PublicKey, Repository, RepositoryPage, ScopedRepository, Secret,
    Target, Variable,
};
use crate::payload::{SecretPayload, VariablePayload};

#[derive(Debug, Serialize)]
struct PageParams {
    per_page: usize,
    page: usize,
}

/// A REST list response of the form `{"total_count": n, "<items>": [...]}`.
trait Listing: DeserializeOwned {
    type Item;
    fn total_count(&self) -> usize;
    fn into_items(self) -> Vec<Self::Item>;
}

macro_rules! listing {
    ($name:ident, $field:ident, $item:ty) => {
        #[derive(Debug, Deserialize)]
        struct $name {
            #[serde(default)]
            total_count: usize,
            #[serde(default)]
            $field: Vec<$item>,
        }

        impl Listing for $name {
            type Item = $item;

            fn total_count(&self) -> usize {
                self.total_count
            }

            fn into_items(self) -> Vec<$item> {
                self.$field
            }
        }
    };
}

listing!(SecretsResponse, secrets, Secret);
listing!(VariablesResponse, variables, Variable);
listing!(ScopedRepositoriesResponse, repositories, ScopedRepository);
listing!(EnvironmentsResponse, environments, Environment);

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct OrganizationData {
    organization: Option<OrganizationNode>,
}

#[derive(Debug, Deserialize)]
struct OrganizationNode {
    repositories: RepositoryConnection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RepositoryConnection {
    nodes: Vec<Repository>,
    page_info: PageInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    end_cursor: Option<String>,
    has_next_page: bool,
}

#[derive(Debug, Deserialize)]
struct RepositoryData {
    repository: Option<Repository>,
}

/// REST base URI for a host; `None` means octocrab's github.com default.
pub fn api_base_uri(hostname: &str) -> Option<String> {
    let host = hostname.trim().trim_end_matches('/');
    if host.is_empty() || host == DEFAULT_HOSTNAME || host == "api.github.com" {
        None
    } else {
        Some(format!("https://{}/api/v3", host))
    }
}

/// Percent-encode one path segment (environment names may contain spaces).
fn encode_segment(segment: &str) -> String {
    segment
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                (b as char).to_string()
            }
            _ => format!("%{:02X}", b),
        })
        .collect()
}

/// GraphQL base for a REST base. Enterprise Server serves GraphQL from
/// `/api/graphql`, next to the `/api/v3` REST root.
pub fn graphql_base_uri(rest_base: &str) -> &str {
    let base = rest_base.trim_end_matches('/');
    base.strip_suffix("/v3").unwrap_or(base)
}

fn build_octocrab(token: String, base: Option<&str>) -> Result<Octocrab> {
    let mut builder = Octocrab::builder().personal_token(token);
    if let Some(base) = base {
        builder = builder
            .base_uri(base)
            .with_context(|| format!("Invalid GitHub API base URI: {}", base))?;
    }
    builder.build().context("Failed to create Octocrab client")
}

pub struct GitHubClient {
    octocrab: Octocrab,
    graphql: Octocrab,
}

impl GitHubClient {
    pub fn new(token: String, hostname: &str) -> Result<Self> {
        match api_base_uri(hostname) {
            Some(base) => Self::enterprise(token, &base),
            None => Ok(Self::with_octocrab(build_octocrab(token, None)?)),
        }
    }

    /// Client for an Enterprise Server REST base such as
    /// `https://ghe.example.com/api/v3`.
    pub fn enterprise(token: String, rest_base: &str) -> Result<Self> {
        let octocrab = build_octocrab(token.clone(), Some(rest_base))?;
        let graphql = build_octocrab(token, Some(graphql_base_uri(rest_base)))?;
        Ok(Self { octocrab, graphql })
    }

    /// Wrap an existing client for both REST and GraphQL (tests point one at
    /// a mock server).
    pub fn with_octocrab(octocrab: Octocrab) -> Self {
        Self {
            graphql: octocrab.clone(),
            octocrab,
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: Option<&PageParams>,
    ) -> Result<T, GitHubError> {
        debug!(path, "GET");
        Ok(self.octocrab.get::<T, _, _>(path, params).await?)
    }

    /// Fetch every page of a REST listing, one request at a time.
    async fn get_all<L: Listing>(&self, path: &str) -> Result<Vec<L::Item>, GitHubError> {
        let mut items = Vec::new();
        let mut page = 1;
        loop {
            let params = PageParams {
                per_page: PAGE_SIZE,
                page,
            };
            let listing: L = self.get_json(path, Some(&params)).await?;
            let total = listing.total_count();
            let batch = listing.into_items();
            let fetched = batch.len();
            items.extend(batch);

            if fetched < PAGE_SIZE || items.len() >= total {
                break;
            }
            page += 1;
        }
        Ok(items)
    }

    async fn graphql<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, GitHubError> {
        let payload = json!({ "query": query, "variables": variables });
        let response: GraphQlResponse<T> = self.graphql.graphql(&payload).await?;

        if !response.errors.is_empty() {
            let messages: Vec<String> = response.errors.into_iter().map(|e| e.message).collect();
            return Err(GitHubError::GraphQl(messages.join("; ")));
        }
        response
            .data
            .ok_or_else(|| GitHubError::GraphQl("response contained no data".to_string()))
    }

    /// PUT a body; GitHub answers 201 or 204, possibly with no content.
    async fn put_empty<B: Serialize + Sync + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), GitHubError> {
        debug!(path, "PUT");
        let response = self.octocrab._put(path, Some(body)).await?;
        octocrab::map_github_error(response).await?;
        Ok(())
    }

    async fn post_empty<B: Serialize + Sync + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), GitHubError> {
        debug!(path, "POST");
        let response = self.octocrab._post(path, Some(body)).await?;
        octocrab::map_github_error(response).await?;
        Ok(())
    }
}

#[async_trait]
impl GitHubApi for GitHubClient {
    async fn list_repository_page(
        &self,
        owner: &str,
        cursor: Option<&str>,
    ) -> Result<RepositoryPage, GitHubError> {
        debug!(owner, cursor, "listing repositories");
        let data: OrganizationData = self
            .graphql(
                REPOSITORIES_QUERY,
                json!({ "owner": owner, "endCursor": cursor }),
            )
            .await?;
        let connection = data
            .organization
            .ok_or_else(|| GitHubError::NotFound(format!("organization {}", owner)))?
            .repositories;

        Ok(RepositoryPage {
            repositories: connection.nodes,
            end_cursor: connection.page_info.end_cursor,
            has_next_page: connection.page_info.has_next_page,
        })
    }

    async fn get_repository(&self, owner: &str, name: &str) -> Result<Repository, GitHubError> {
        let data: RepositoryData = self
            .graphql(REPOSITORY_QUERY, json!({ "owner": owner, "name": name }))
            .await?;
        data.repository
            .ok_or_else(|| GitHubError::NotFound(format!("repository {}/{}", owner, name)))
    }

    async fn list_secrets(
        &self,
        target: &Target,
        provider: Provider,
    ) -> Result<Vec<Secret>, GitHubError> {
        self.get_all::<SecretsResponse>(&target.secrets_path(provider))
            .await
    }

    async fn list_secret_repositories(
        &self,
        target: &Target,
        provider: Provider,
        name: &str,
    ) -> Result<Vec<ScopedRepository>, GitHubError> {
        self.get_all::<ScopedRepositoriesResponse>(&target.secret_repositories_path(provider, name))
            .await
    }

    async fn get_public_key(
        &self,
        target: &Target,
        provider: Provider,
    ) -> Result<PublicKey, GitHubError> {
        self.get_json(&target.public_key_path(provider), None).await
    }

    async fn put_secret(
        &self,
        target: &Target,
        provider: Provider,
        name: &str,
        payload: &SecretPayload,
    ) -> Result<(), GitHubError> {
        self.put_empty(&target.secret_path(provider, name), payload)
            .await
    }

    async fn list_variables(&self, target: &Target) -> Result<Vec<Variable>, GitHubError> {
        self.get_all::<VariablesResponse>(&target.variables_path())
            .await
    }

    async fn list_variable_repositories(
        &self,
        target: &Target,
        name: &str,
    ) -> Result<Vec<ScopedRepository>, GitHubError> {
        self.get_all::<ScopedRepositoriesResponse>(&target.variable_repositories_path(name))
            .await
    }

    async fn create_variable(
        &self,
        target: &Target,
        payload: &VariablePayload,
    ) -> Result<(), GitHubError> {
        self.post_empty(&target.variables_path(), payload).await
    }

    async fn list_environments(&self, target: &Target) -> Result<Vec<Environment>, GitHubError> {
        self.get_all::<EnvironmentsResponse>(&target.environments_path())
            .await
    }

    async fn list_environment_secrets(
        &self,
        target: &Target,
        environment: &str,
    ) -> Result<Vec<Secret>, GitHubError> {
        let path = format!(
            "{}/{}/secrets",
            target.environments_path(),
            encode_segment(environment)
        );
        self.get_all::<SecretsResponse>(&path).await
    }

    async fn list_environment_variables(
        &self,
        target: &Target,
        environment: &str,
    ) -> Result<Vec<Variable>, GitHubError> {
        let path = format!(
            "{}/{}/variables",
            target.environments_path(),
            encode_segment(environment)
        );
        self.get_all::<VariablesResponse>(&path).await
    }
}
