mod settings;

pub use settings::{ApiSettings, Config, OutputSettings, SessionSettings};

use crate::error::{ParcelasError, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable that overrides `api.base_url`
pub const API_URL_ENV: &str = "PARCELAS_API_URL";

/// Get the config directory path (~/.parcelas/)
pub fn config_dir() -> Result<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "parcelas") {
        return Ok(proj_dirs.config_dir().to_path_buf());
    }

    // Fallback to ~/.parcelas/
    let home = dirs_home().ok_or_else(|| {
        ParcelasError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;

    Ok(home.join(".parcelas"))
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// Expand ~ in paths
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_home() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Resolve the output directory; relative paths hang off the config dir
pub fn resolve_output_dir(dir: &str, cfg_dir: &Path) -> PathBuf {
    let expanded = expand_path(dir);
    if expanded.is_absolute() {
        expanded
    } else {
        cfg_dir.join(expanded)
    }
}

/// Load config.toml, applying the `PARCELAS_API_URL` override
pub fn load_config(cfg_dir: &Path) -> Result<Config> {
    if !cfg_dir.exists() {
        return Err(ParcelasError::ConfigNotFound(cfg_dir.to_path_buf()));
    }

    let path = cfg_dir.join("config.toml");
    if !path.exists() {
        return Err(ParcelasError::ConfigFileNotFound(path));
    }
    let content = fs::read_to_string(&path)?;
    let mut config: Config =
        toml::from_str(&content).map_err(|e| ParcelasError::ConfigParse { path, source: e })?;

    if let Ok(url) = std::env::var(API_URL_ENV) {
        if !url.trim().is_empty() {
            log::debug!("api.base_url overridden by {API_URL_ENV}");
            config.api.base_url = url;
        }
    }

    Ok(config)
}

/// Template content for config.toml
pub const CONFIG_TEMPLATE: &str = r#"[api]
base_url = "http://localhost:8080/api"  # or set PARCELAS_API_URL
timeout_secs = 30

[session]
ttl_secs = 3600  # local session lifetime, the token's own expiry still applies

[output]
dir = "output"  # receipts and reports; relative to this directory
"#;
