//! XDG-compliant path resolution for configuration files.
//!
//! This module locates `config.toml` and `.env` following the XDG Base
//! Directory Specification, with the current directory taking precedence.

use std::env;
use std::path::{Path, PathBuf};

use crate::constants::APP_DIR;

fn default_xdg_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join(APP_DIR))
}

fn xdg_config_home_dir() -> Option<PathBuf> {
    env::var("XDG_CONFIG_HOME")
        .ok()
        .filter(|dir| !dir.is_empty())
        .map(|dir| PathBuf::from(dir).join(APP_DIR))
}

/// Find the config.toml file, if any.
/// Priority:
/// 1. CONFIG_PATH from environment (if set and the file exists)
/// 2. Current directory/config.toml
/// 3. ~/.config/org-secrets/config.toml
/// 4. XDG_CONFIG_HOME/org-secrets/config.toml
pub fn find_config_file() -> Option<PathBuf> {
    if let Ok(config_path) = env::var("CONFIG_PATH") {
        let path = PathBuf::from(&config_path);
        if path.exists() {
            return Some(path);
        }
    }

    let candidates = [
        env::current_dir().ok().map(|dir| dir.join("config.toml")),
        default_xdg_dir().map(|dir| dir.join("config.toml")),
        xdg_config_home_dir().map(|dir| dir.join("config.toml")),
    ];
    candidates.into_iter().flatten().find(|path| path.exists())
}

fn load_from(path: &Path) -> bool {
    if !path.exists() {
        return false;
    }
    // Variables already set in the process environment win.
    dotenv::from_path(path).is_ok()
}

/// Find and load a .env file.
/// Priority:
/// 1. Current directory/.env
/// 2. ~/.config/org-secrets/.env
/// 3. XDG_CONFIG_HOME/org-secrets/.env
pub fn load_env_file() -> Option<PathBuf> {
    let candidates = [
        Some(PathBuf::from(".env")),
        default_xdg_dir().map(|dir| dir.join(".env")),
        xdg_config_home_dir().map(|dir| dir.join(".env")),
    ];
    candidates
        .into_iter()
        .flatten()
        .find(|path| load_from(path))
}
