use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde::Serialize;

pub const URL_ENV_VAR: &str = "INVENTORY_API_URL";

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct ConfigFile {
    #[serde(alias = "inventory_api_url")]
    pub url: Option<String>,
    pub output: Option<String>,
    pub output_format: Option<String>,
    pub proxy: Option<String>,
    pub user_agent: Option<String>,
    pub sequencing: Option<String>,
    pub no_color: Option<bool>,
}

fn home_dir() -> Option<PathBuf> {
    ["HOME", "USERPROFILE"]
        .into_iter()
        .filter_map(env::var_os)
        .find(|dir| !dir.is_empty())
        .map(PathBuf::from)
}

pub fn default_config_path() -> Option<PathBuf> {
    Some(home_dir()?.join(".vpcview").join("config.yml"))
}

/// `~` and `~/rest` resolve against the home directory; anything else, or
/// an unknown home, is taken literally.
pub fn expand_tilde(path: &str) -> PathBuf {
    let rest = match path.strip_prefix('~') {
        Some("") => "",
        Some(rest) if rest.starts_with(['/', '\\']) => &rest[1..],
        _ => return PathBuf::from(path),
    };
    match home_dir() {
        Some(home) if rest.is_empty() => home,
        Some(home) => home.join(rest),
        None => PathBuf::from(path),
    }
}

pub fn expand_tilde_string(path: &str) -> String {
    expand_tilde(path).to_string_lossy().to_string()
}

pub fn load_config(path: &Path, allow_missing: bool) -> Result<ConfigFile, String> {
    match fs::read_to_string(path) {
        Ok(contents) => parse_config(&contents)
            .map_err(|e| format!("failed to parse config '{}': {e}", path.display())),
        Err(e) if e.kind() == io::ErrorKind::NotFound && allow_missing => {
            Ok(ConfigFile::default())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(format!("config file not found '{}'", path.display()))
        }
        Err(e) => Err(format!("failed to read config '{}': {e}", path.display())),
    }
}

/// An empty document (or one holding only comments) is a valid, empty config.
pub fn parse_config(contents: &str) -> Result<ConfigFile, serde_yaml::Error> {
    match serde_yaml::from_str::<Option<ConfigFile>>(contents)? {
        Some(cfg) => Ok(cfg),
        None => Ok(ConfigFile::default()),
    }
}

/// Picks the endpoint: explicit value, then config, then the environment.
///
/// A missing URL resolves to the empty string; the request itself reports it.
pub fn resolve_url(
    cli: Option<String>,
    cfg: Option<String>,
    env_value: Option<String>,
) -> String {
    [cli, cfg, env_value]
        .into_iter()
        .flatten()
        .map(|u| u.trim().to_string())
        .find(|u| !u.is_empty())
        .unwrap_or_default()
}

pub fn url_from_env() -> Option<String> {
    env::var(URL_ENV_VAR).ok()
}

fn default_config_yaml() -> String {
    r#"# vpcview config
#
# Location (default):
#   ~/.vpcview/config.yml

# Inventory endpoint (falls back to $INVENTORY_API_URL)
# url: https://api.example.com/inventory

# Output (optional, stdout when unset)
# output: ./inventory.html
# output_format: html

# HTTP (optional)
# proxy: http://127.0.0.1:8080
# user_agent: vpcview

# Overlapping fetches: last-resolved or latest-request
sequencing: last-resolved

# Output styling
no_color: false
"#
    .to_string()
}

/// Writes the commented default config unless a file is already there.
/// Returns whether a file was written.
pub fn ensure_default_config_file(path: &Path) -> Result<bool, String> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            format!("failed to create config directory '{}': {e}", parent.display())
        })?;
    }
    let mut file = match fs::OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(format!("failed to create config file '{}': {e}", path.display())),
    };
    file.write_all(default_config_yaml().as_bytes())
        .map_err(|e| format!("failed to write config file '{}': {e}", path.display()))?;
    Ok(true)
}
