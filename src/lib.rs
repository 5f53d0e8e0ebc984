//! # org-secrets
//!
//! Export and import GitHub organization secrets and variables as CSV.
//!
//! Secrets (Actions, Dependabot, Codespaces) and Actions variables are read
//! from or written to an organization and its repositories. Export resolves
//! each entry's visibility into concrete repository names and IDs; import
//! seals every secret value against the destination's public key before
//! creating it.
//!
//! ## Modules
//!
//! - [`inventory`] - Repository listing and lookup
//! - [`cipher`] - Sealed-box encryption of secret values
//! - [`visibility`] - Visibility to repository-set resolution
//! - [`schema`] - CSV reading and writing
//! - [`payload`] - Provider-specific request bodies
//! - [`export`], [`import`], [`migrate`], [`environments`] - Batch drivers
//! - [`summary`] - Per-unit outcome accounting
//! - [`github`] - GitHub API client
//! - [`config`], [`paths`], [`logging`] - Ambient set-up
//! - [`validation`] - Input validation utilities
//! - [`error`], [`errors`] - Error formatting and structured error types

pub mod app;
pub mod app_deps;
pub mod cipher;
pub mod cli;
pub mod config;
pub mod constants;
pub mod environments;
pub mod error;
pub mod errors;
pub mod export;
pub mod github;
pub mod import;
pub mod inventory;
pub mod logging;
pub mod migrate;
pub mod models;
pub mod paths;
pub mod payload;
pub mod schema;
pub mod summary;
pub mod validation;
pub mod visibility;
