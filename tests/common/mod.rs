#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose};
use chrono::Utc;
use crypto_box::SecretKey;
use crypto_box::aead::OsRng;

use org_secrets::app_deps::GitHubApi;
use org_secrets::errors::GitHubError;
use org_secrets::models::{
    Environment, Provider, PublicKey, RepoVisibility, Repository, RepositoryPage,
    ScopedRepository, Secret, Target, Variable, Visibility,
};
use org_secrets::payload::{SecretPayload, VariablePayload};

pub fn repo(name: &str, id: u64, visibility: RepoVisibility) -> Repository {
    Repository {
        database_id: id,
        name: name.to_string(),
        visibility,
        updated_at: Utc::now(),
    }
}

pub fn secret(name: &str, visibility: Option<Visibility>) -> Secret {
    Secret {
        name: name.to_string(),
        created_at: None,
        updated_at: None,
        visibility,
        selected_repositories_url: None,
    }
}

pub fn variable(name: &str, value: &str, visibility: Option<Visibility>) -> Variable {
    Variable {
        name: name.to_string(),
        value: value.to_string(),
        created_at: None,
        updated_at: None,
        visibility,
        selected_repositories_url: None,
    }
}

pub fn scoped(name: &str, id: u64) -> ScopedRepository {
    ScopedRepository {
        id,
        name: name.to_string(),
    }
}

pub fn keypair() -> (SecretKey, String) {
    let secret = SecretKey::generate(&mut OsRng);
    let public = general_purpose::STANDARD.encode(secret.public_key().as_bytes());
    (secret, public)
}

pub fn open_sealed(secret: &SecretKey, sealed_b64: &str) -> String {
    let sealed = general_purpose::STANDARD.decode(sealed_b64).unwrap();
    String::from_utf8(secret.unseal(&sealed).unwrap()).unwrap()
}

fn not_found(what: String) -> GitHubError {
    GitHubError::ApiError {
        status_code: 404,
        message: format!("Not Found: {}", what),
        documentation_url: None,
    }
}

/// In-memory organization. Keys are `Target` display strings (`owner` or
/// `owner/repo`). Clones share their call records.
#[derive(Clone, Default)]
pub struct MockGitHub {
    pub repositories: Vec<Repository>,
    pub page_size: usize,
    pub secrets: HashMap<(String, Provider), Vec<Secret>>,
    pub secret_scopes: HashMap<(Provider, String), Vec<ScopedRepository>>,
    pub variables: HashMap<String, Vec<Variable>>,
    pub variable_scopes: HashMap<String, Vec<ScopedRepository>>,
    pub environments: HashMap<String, Vec<Environment>>,
    pub environment_secrets: HashMap<(String, String), Vec<Secret>>,
    pub environment_variables: HashMap<(String, String), Vec<Variable>>,
    pub public_key: Option<String>,
    /// Targets (display form) whose calls fail with a 500.
    pub failing: HashSet<String>,
    pub put_secrets: Arc<Mutex<Vec<(Target, Provider, String, SecretPayload)>>>,
    pub created_variables: Arc<Mutex<Vec<(Target, VariablePayload)>>>,
    pub key_requests: Arc<Mutex<Vec<(Target, Provider)>>>,
    pub page_requests: Arc<Mutex<Vec<Option<String>>>>,
}

impl MockGitHub {
    pub fn new() -> Self {
        Self {
            page_size: 100,
            ..Default::default()
        }
    }

    pub fn with_public_key(mut self, key: String) -> Self {
        self.public_key = Some(key);
        self
    }

    fn check(&self, target: &Target) -> Result<(), GitHubError> {
        if self.failing.contains(&target.to_string()) {
            return Err(GitHubError::ApiError {
                status_code: 500,
                message: format!("boom for {}", target),
                documentation_url: None,
            });
        }
        Ok(())
    }

    pub fn puts(&self) -> Vec<(Target, Provider, String, SecretPayload)> {
        self.put_secrets.lock().unwrap().clone()
    }

    pub fn created(&self) -> Vec<(Target, VariablePayload)> {
        self.created_variables.lock().unwrap().clone()
    }
}

#[async_trait]
impl GitHubApi for MockGitHub {
    async fn list_repository_page(
        &self,
        owner: &str,
        cursor: Option<&str>,
    ) -> Result<RepositoryPage, GitHubError> {
        self.check(&Target::organization(owner))?;
        self.page_requests
            .lock()
            .unwrap()
            .push(cursor.map(str::to_string));

        let start: usize = cursor.map(|c| c.parse().unwrap()).unwrap_or(0);
        let end = (start + self.page_size).min(self.repositories.len());
        let has_next_page = end < self.repositories.len();
        Ok(RepositoryPage {
            repositories: self.repositories[start..end].to_vec(),
            end_cursor: has_next_page.then(|| end.to_string()),
            has_next_page,
        })
    }

    async fn get_repository(&self, owner: &str, name: &str) -> Result<Repository, GitHubError> {
        self.check(&Target::repository(owner, name))?;
        self.repositories
            .iter()
            .find(|r| r.name == name)
            .cloned()
            .ok_or_else(|| GitHubError::NotFound(format!("repository {}/{}", owner, name)))
    }

    async fn list_secrets(
        &self,
        target: &Target,
        provider: Provider,
    ) -> Result<Vec<Secret>, GitHubError> {
        self.check(target)?;
        Ok(self
            .secrets
            .get(&(target.to_string(), provider))
            .cloned()
            .unwrap_or_default())
    }

    async fn list_secret_repositories(
        &self,
        target: &Target,
        provider: Provider,
        name: &str,
    ) -> Result<Vec<ScopedRepository>, GitHubError> {
        self.check(target)?;
        self.secret_scopes
            .get(&(provider, name.to_string()))
            .cloned()
            .ok_or_else(|| not_found(name.to_string()))
    }

    async fn get_public_key(
        &self,
        target: &Target,
        provider: Provider,
    ) -> Result<PublicKey, GitHubError> {
        self.check(target)?;
        self.key_requests
            .lock()
            .unwrap()
            .push((target.clone(), provider));
        let key = self
            .public_key
            .clone()
            .ok_or_else(|| not_found("public key".to_string()))?;
        Ok(PublicKey {
            key_id: "k1".to_string(),
            key,
        })
    }

    async fn put_secret(
        &self,
        target: &Target,
        provider: Provider,
        name: &str,
        payload: &SecretPayload,
    ) -> Result<(), GitHubError> {
        self.check(target)?;
        self.put_secrets.lock().unwrap().push((
            target.clone(),
            provider,
            name.to_string(),
            payload.clone(),
        ));
        Ok(())
    }

    async fn list_variables(&self, target: &Target) -> Result<Vec<Variable>, GitHubError> {
        self.check(target)?;
        Ok(self
            .variables
            .get(&target.to_string())
            .cloned()
            .unwrap_or_default())
    }

    async fn list_variable_repositories(
        &self,
        target: &Target,
        name: &str,
    ) -> Result<Vec<ScopedRepository>, GitHubError> {
        self.check(target)?;
        self.variable_scopes
            .get(name)
            .cloned()
            .ok_or_else(|| not_found(name.to_string()))
    }

    async fn create_variable(
        &self,
        target: &Target,
        payload: &VariablePayload,
    ) -> Result<(), GitHubError> {
        self.check(target)?;
        self.created_variables
            .lock()
            .unwrap()
            .push((target.clone(), payload.clone()));
        Ok(())
    }

    async fn list_environments(&self, target: &Target) -> Result<Vec<Environment>, GitHubError> {
        self.check(target)?;
        Ok(self
            .environments
            .get(&target.to_string())
            .cloned()
            .unwrap_or_default())
    }

    async fn list_environment_secrets(
        &self,
        target: &Target,
        environment: &str,
    ) -> Result<Vec<Secret>, GitHubError> {
        self.check(target)?;
        Ok(self
            .environment_secrets
            .get(&(target.to_string(), environment.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn list_environment_variables(
        &self,
        target: &Target,
        environment: &str,
    ) -> Result<Vec<Variable>, GitHubError> {
        self.check(target)?;
        Ok(self
            .environment_variables
            .get(&(target.to_string(), environment.to_string()))
            .cloned()
            .unwrap_or_default())
    }
}
