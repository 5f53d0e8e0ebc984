mod common;

use std::fs;
use std::sync::Mutex;

use anyhow::Result;
use clap::Parser;
use tempfile::TempDir;

use common::{MockGitHub, keypair, repo, secret, variable};
use org_secrets::app::App;
use org_secrets::app_deps::{GitHubApi, GitHubApiFactory};
use org_secrets::cli::Cli;
use org_secrets::config::Config;
use org_secrets::models::{Provider, RepoVisibility, Visibility};

const TOKEN: &str = "ghp_test_token_1234567890";

/// Hands out the destination mock, or the source mock for the token
/// `source_token_1234567890`. Records which hosts were requested.
struct MockFactory {
    destination: MockGitHub,
    source: MockGitHub,
    hosts: Mutex<Vec<String>>,
}

impl MockFactory {
    fn new(destination: MockGitHub) -> Self {
        Self {
            destination,
            source: MockGitHub::new(),
            hosts: Mutex::new(Vec::new()),
        }
    }
}

impl GitHubApiFactory for MockFactory {
    fn create(&self, token: String, hostname: &str) -> Result<Box<dyn GitHubApi>> {
        self.hosts.lock().unwrap().push(hostname.to_string());
        if token == "source_token_1234567890" {
            Ok(Box::new(self.source.clone()))
        } else {
            Ok(Box::new(self.destination.clone()))
        }
    }
}

fn cli(args: &[&str]) -> Cli {
    let mut argv = vec!["org-secrets", "--token", TOKEN];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).unwrap()
}

#[tokio::test]
async fn test_secrets_export_writes_report() -> Result<()> {
    let dir = TempDir::new()?;
    let output = dir.path().join("secrets.csv");

    let mut api = MockGitHub::new();
    api.repositories = vec![repo("api", 42, RepoVisibility::Private)];
    api.secrets.insert(
        ("acme".to_string(), Provider::Actions),
        vec![secret("ORG_TOKEN", Some(Visibility::Private))],
    );
    let factory = MockFactory::new(api);

    let args = cli(&["secrets", "export", "acme", "-o", output.to_str().unwrap()]);
    App::run_with_deps(&factory, args, Config::default()).await?;

    let report = fs::read_to_string(&output)?;
    assert!(report.contains("Organization,Actions,ORG_TOKEN,,private,api,42"));
    assert_eq!(factory.hosts.lock().unwrap().clone(), vec!["github.com"]);
    Ok(())
}

#[tokio::test]
async fn test_secrets_create_reports_failures_as_error() -> Result<()> {
    let dir = TempDir::new()?;
    let input = dir.path().join("secrets.csv");
    fs::write(
        &input,
        "SecretLevel,SecretType,SecretName,SecretValue,SecretAccess,RepositoryNames,RepositoryIDs\n\
         Organization,Actions,GOOD,v,all,,\n\
         Organization,Actions,BAD,v,selected,,\n",
    )?;

    let (_, public_key) = keypair();
    let api = MockGitHub::new().with_public_key(public_key);
    let factory = MockFactory::new(api.clone());

    let args = cli(&["secrets", "create", "acme", "-f", input.to_str().unwrap()]);
    let err = App::run_with_deps(&factory, args, Config::default())
        .await
        .unwrap_err();

    assert!(err.to_string().contains("1 of 2 entries failed"));
    // The good row was still created.
    assert_eq!(api.puts().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_missing_input_file_is_fatal() {
    let factory = MockFactory::new(MockGitHub::new());
    let args = cli(&["secrets", "create", "acme", "-f", "/nonexistent/in.csv"]);

    let err = App::run_with_deps(&factory, args, Config::default())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Failed to open"));
}

#[tokio::test]
async fn test_invalid_organization_is_rejected_before_any_call() {
    let factory = MockFactory::new(MockGitHub::new());
    let args = cli(&["variables", "export", "not/an/org"]);

    assert!(
        App::run_with_deps(&factory, args, Config::default())
            .await
            .is_err()
    );
    assert!(factory.hosts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_variables_migration_uses_source_host() -> Result<()> {
    let mut factory = MockFactory::new(MockGitHub::new());
    factory.source.variables.insert(
        "old-org".to_string(),
        vec![variable("COLOR", "blue", Some(Visibility::All))],
    );
    let destination = factory.destination.clone();

    let args = cli(&[
        "variables",
        "create",
        "new-org",
        "--source-organization",
        "old-org",
        "--source-token",
        "source_token_1234567890",
        "--source-hostname",
        "ghe.example.com",
        "--hostname",
        "github.example.org",
    ]);
    App::run_with_deps(&factory, args, Config::default()).await?;

    assert_eq!(destination.created().len(), 1);
    assert_eq!(
        factory.hosts.lock().unwrap().clone(),
        vec!["github.example.org", "ghe.example.com"]
    );
    Ok(())
}

#[tokio::test]
async fn test_config_supplies_default_app_filter() -> Result<()> {
    let dir = TempDir::new()?;
    let output = dir.path().join("secrets.csv");

    let mut api = MockGitHub::new();
    api.repositories = vec![repo("api", 42, RepoVisibility::Private)];
    api.secrets.insert(
        ("acme".to_string(), Provider::Actions),
        vec![secret("ACTIONS_ONLY", Some(Visibility::All))],
    );
    api.secrets.insert(
        ("acme".to_string(), Provider::Codespaces),
        vec![secret("CODESPACES_ONLY", Some(Visibility::All))],
    );
    let factory = MockFactory::new(api);
    let config = Config::from_toml("[export]\napp = \"codespaces\"\n")?;

    let args = cli(&["secrets", "export", "acme", "-o", output.to_str().unwrap()]);
    App::run_with_deps(&factory, args, config).await?;

    let report = fs::read_to_string(&output)?;
    assert!(report.contains("CODESPACES_ONLY"));
    assert!(!report.contains("ACTIONS_ONLY"));
    Ok(())
}
