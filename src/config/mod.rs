mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./avmeta.toml",
        "~/.config/avmeta/config.toml",
        "/etc/avmeta/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Directory holding the database and downloaded covers.
pub fn resolve_data_dir(config: &Config) -> Result<PathBuf> {
    match &config.data_dir {
        Some(dir) => Ok(dir.clone()),
        None => {
            let cwd = std::env::current_dir().context("Failed to resolve current directory")?;
            Ok(cwd.join("avmeta-data"))
        }
    }
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    if let Some(ref proxy) = config.proxy {
        reqwest::Proxy::all(proxy.as_str())
            .with_context(|| format!("Invalid proxy URL: {}", proxy))?;
    }

    if config.http.timeout_secs == 0 {
        anyhow::bail!("http.timeout_secs cannot be 0");
    }

    if config.http.cookie_retry_times == 0 {
        anyhow::bail!("http.cookie_retry_times cannot be 0");
    }

    Ok(())
}
