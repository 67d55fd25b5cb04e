// Server address resolution.
//
// Precedence, lowest to highest: `--address` flag (with its default), the
// `server_address` value of the JSON config file, the `SERVER_ADDRESS`
// environment variable.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const DEFAULT_ADDRESS: &str = "localhost:8080";
pub const CONFIG_FILE_NAME: &str = "config.json";
pub const ADDRESS_ENV: &str = "SERVER_ADDRESS";

/// Contents of the JSON config file.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    #[serde(default)]
    pub server_address: String,
}

/// Resolved client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub server_address: String,
}

impl Config {
    /// Load the config file (if any) and apply the environment override.
    ///
    /// `explicit` is the path from `--config`/`CONFIG`. A missing file only
    /// warns; a file that exists but does not decode is an error.
    pub fn load(explicit: Option<&Path>, flag_address: &str) -> Result<Self> {
        let file = match config_path(explicit) {
            Some(path) => read_config_file(&path)?,
            None => None,
        };
        let env_address = std::env::var(ADDRESS_ENV).ok();
        Ok(Self::resolve(file, flag_address, env_address))
    }

    pub fn resolve(file: Option<ConfigFile>, flag_address: &str, env_address: Option<String>) -> Self {
        let from_file = file
            .map(|file| file.server_address)
            .filter(|address| !address.is_empty());
        let server_address = env_address
            .filter(|address| !address.is_empty())
            .or(from_file)
            .unwrap_or_else(|| flag_address.to_string());
        Config { server_address }
    }

    /// Base URL for the transport: `http://` is assumed when no scheme is
    /// given.
    pub fn base_url(&self) -> String {
        let address = self.server_address.trim().trim_end_matches('/');
        if address.contains("://") {
            address.to_string()
        } else {
            format!("http://{address}")
        }
    }
}

/// First candidate config path: the explicit one, `./config.json`, then
/// `<config dir>/keeper/config.json`.
fn config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return Some(local);
    }
    dirs::config_dir()
        .map(|dir| dir.join("keeper").join(CONFIG_FILE_NAME))
        .filter(|path| path.exists())
}

fn read_config_file(path: &Path) -> Result<Option<ConfigFile>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot open config file, using defaults");
            return Ok(None);
        }
    };
    let config: ConfigFile = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Decoding config file {}", path.display()))?;
    debug!(path = %path.display(), "config file loaded");
    Ok(Some(config))
}
