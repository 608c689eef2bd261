use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::client::DEFAULT_ENDPOINT;
use crate::error::{ChatError, Result};
use crate::request::RequestFormat;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub endpoint: Option<String>,
    pub request_format: Option<RequestFormat>,
}

impl Config {
    pub fn new() -> Self {
        Self {
            endpoint: Some(DEFAULT_ENDPOINT.to_string()),
            request_format: Some(RequestFormat::default()),
        }
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(config_path)
            .map_err(|e| ChatError::config(format!("{}: {e}", config_path.display())))?;
        serde_json::from_str(&config_content)
            .map_err(|e| ChatError::config(format!("{}: {e}", config_path.display())))
    }

    pub fn save(&self) -> Result<PathBuf> {
        let config_path = Self::get_config_path()?;
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ChatError::config(format!("{}: {e}", parent.display())))?;
        }

        let config_content = serde_json::to_string_pretty(self)
            .map_err(|e| ChatError::config(e.to_string()))?;
        fs::write(config_path, config_content)
            .map_err(|e| ChatError::config(format!("{}: {e}", config_path.display())))
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT)
    }

    pub fn request_format(&self) -> RequestFormat {
        self.request_format.unwrap_or_default()
    }

    fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ChatError::config("Could not determine config directory"))?;

        Ok(config_dir.join("agentchat").join("config.json"))
    }
}
