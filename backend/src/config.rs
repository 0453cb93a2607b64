//! Backend configuration, read from `config.yaml` in the data directory.

use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;

use crate::domain::reasons::{default_deactivation_labels, DeactivationReasons};
use crate::storage::FileConnection;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BackendConfig {
    /// Address the REST server listens on
    pub bind_address: String,
    /// Origin allowed by CORS (the portal frontend)
    pub allowed_origin: String,
    /// Labels offered when deactivating a service, in display order
    pub deactivation_reasons: Vec<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3000".to_string(),
            allowed_origin: "http://localhost:8080".to_string(),
            deactivation_reasons: default_deactivation_labels(),
        }
    }
}

impl BackendConfig {
    /// Load `config.yaml` from the data directory, falling back to defaults
    /// for the whole file or any missing key
    pub fn load(connection: &FileConnection) -> Result<Self> {
        let path = connection.config_file_path();
        if !path.exists() {
            info!("No config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let yaml_content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: BackendConfig = serde_yaml::from_str(&yaml_content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn deactivation_reasons(&self) -> DeactivationReasons {
        DeactivationReasons::new(self.deactivation_reasons.clone())
    }
}
