use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{CoreError, Result};

pub const DEFAULT_DID_SCRIPT_URL: &str = "https://agent.d-id.com/v1/index.js";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";

/// Centralized configuration for the MetaWorks services
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub database: DatabaseSection,
    #[serde(default)]
    pub integrations: IntegrationsSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub bind: String,
    /// Allow any origin (development only)
    pub cors_permissive: bool,
    /// Extra allowed origins on top of the localhost defaults
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub session_ttl_hours: u64,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:5000".to_string(),
            cors_permissive: false,
            cors_origins: Vec::new(),
            request_timeout_secs: 30,
            upload_dir: PathBuf::from("uploads"),
            max_upload_bytes: 10 * 1024 * 1024,
            session_ttl_hours: 24 * 7,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    pub url: Option<String>,
    pub max_connections: u32,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrationsSection {
    pub did_agent_id: Option<String>,
    pub did_client_key: Option<String>,
    pub did_script_url: String,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: String,
}

impl Default for IntegrationsSection {
    fn default() -> Self {
        Self {
            did_agent_id: None,
            did_client_key: None,
            did_script_url: DEFAULT_DID_SCRIPT_URL.to_string(),
            openai_api_key: None,
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
        }
    }
}

impl AppConfig {
    /// Load config from `$METAWORKS_CONFIG` or ~/.metaworks/config.toml,
    /// then apply environment overrides.
    ///
    /// A missing file is not an error: defaults plus environment apply.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = fs::read_to_string(path)?;
            Self::parse(&content, path)?
        } else {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            Self::default()
        };

        config.expand_variables(|key| env::var(key).ok());
        config.apply_env_overrides(|key| env::var(key).ok());
        Ok(config)
    }

    fn parse(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|source| CoreError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Config file path: $METAWORKS_CONFIG or ~/.metaworks/config.toml
    pub fn config_path() -> PathBuf {
        if let Ok(path) = env::var("METAWORKS_CONFIG") {
            return PathBuf::from(path);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".metaworks/config.toml")
    }

    /// Environment wins over the file. `NEW_DID_*` wins over `DID_*`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let first = |keys: &[&str]| keys.iter().find_map(|k| lookup(*k).filter(|v| !v.is_empty()));

        if let Some(url) = first(&["DATABASE_URL"]) {
            self.database.url = Some(url);
        }
        if let Some(bind) = first(&["METAWORKS_BIND"]) {
            self.server.bind = bind;
        }
        if let Some(agent) = first(&["NEW_DID_AGENT_ID", "DID_AGENT_ID"]) {
            self.integrations.did_agent_id = Some(agent);
        }
        if let Some(key) = first(&["NEW_DID_CLIENT_KEY", "DID_CLIENT_KEY"]) {
            self.integrations.did_client_key = Some(key);
        }
        if let Some(key) = first(&["OPENAI_API_KEY"]) {
            self.integrations.openai_api_key = Some(key);
        }
    }

    /// Expand ${VAR} references in string values
    fn expand_variables<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let expand = |value: &mut String| *value = expand_string(value.as_str(), &lookup);
        let expand_opt = |value: &mut Option<String>| {
            if let Some(v) = value.as_mut() {
                *v = expand_string(v.as_str(), &lookup);
            }
        };

        expand(&mut self.server.bind);
        expand_opt(&mut self.database.url);
        expand_opt(&mut self.integrations.did_agent_id);
        expand_opt(&mut self.integrations.did_client_key);
        expand_opt(&mut self.integrations.openai_api_key);
        expand(&mut self.integrations.openai_base_url);

        let upload_dir = self.server.upload_dir.display().to_string();
        self.server.upload_dir = PathBuf::from(expand_string(&upload_dir, &lookup));
    }

    /// Save config to the default path
    pub fn save(&self) -> Result<PathBuf> {
        let config_path = Self::config_path();
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let toml_str = toml::to_string_pretty(self)?;
        fs::write(path, toml_str)?;
        Ok(())
    }
}

/// Replace every `${NAME}` with its looked-up value (empty when unset).
fn expand_string<F>(s: &str, lookup: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut result = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start + 2..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        let name = &rest[start + 2..start + 2 + len];
        result.push_str(&lookup(name).unwrap_or_default());
        rest = &rest[start + 3 + len..];
    }

    result.push_str(rest);
    result
}
