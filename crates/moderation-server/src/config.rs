//! Service configuration

use moderation_classifiers::{DEFAULT_LEMMATIZER_PATH, DEFAULT_MODEL_DIR};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Moderation service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Bind address
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding the trained artifacts
    #[serde(default = "default_model_dir")]
    pub model_dir: String,

    /// Lemmatizer model used to normalize request text
    #[serde(default = "default_lemmatizer")]
    pub lemmatizer: String,

    /// Decimal digits kept in the reported probability
    #[serde(default = "default_probability_decimals")]
    pub probability_decimals: u32,
}

/// Values given on the command line, applied over the file
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub listen: Option<String>,
    pub port: Option<u16>,
    pub model_dir: Option<String>,
    pub lemmatizer: Option<String>,
}

impl ServiceConfig {
    /// Load configuration from file and CLI overrides
    pub fn load(config_path: &str, overrides: &ConfigOverrides) -> anyhow::Result<Self> {
        // Try to load from file, or use defaults
        let mut config = if Path::new(config_path).exists() {
            let content = std::fs::read_to_string(config_path)?;
            serde_yaml::from_str(&content)?
        } else {
            Self::default()
        };

        config.apply(overrides);
        Ok(config)
    }

    /// Apply CLI overrides
    pub fn apply(&mut self, overrides: &ConfigOverrides) {
        if let Some(listen) = &overrides.listen {
            self.listen = listen.clone();
        }

        if let Some(port) = overrides.port {
            self.port = port;
        }

        if let Some(model_dir) = &overrides.model_dir {
            self.model_dir = model_dir.clone();
        }

        if let Some(lemmatizer) = &overrides.lemmatizer {
            self.lemmatizer = lemmatizer.clone();
        }
    }

    /// `listen:port` socket address string
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.listen, self.port)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            port: default_port(),
            model_dir: default_model_dir(),
            lemmatizer: default_lemmatizer(),
            probability_decimals: default_probability_decimals(),
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5001
}

fn default_model_dir() -> String {
    DEFAULT_MODEL_DIR.to_string()
}

fn default_lemmatizer() -> String {
    DEFAULT_LEMMATIZER_PATH.to_string()
}

fn default_probability_decimals() -> u32 {
    4
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() {
        let config = ServiceConfig::load("does/not/exist.yaml", &ConfigOverrides::default()).unwrap();

        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.bind_address(), "0.0.0.0:5001");
        assert_eq!(config.model_dir, "model_moderation");
        assert_eq!(config.probability_decimals, 4);
    }

    #[test]
    fn test_file_then_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port: 6000\nmodel_dir: /srv/models").unwrap();
        let path = file.path().to_str().unwrap();

        let config = ServiceConfig::load(path, &ConfigOverrides::default()).unwrap();
        assert_eq!(config.port, 6000);
        assert_eq!(config.model_dir, "/srv/models");
        assert_eq!(config.listen, "0.0.0.0");

        let overrides = ConfigOverrides {
            port: Some(7000),
            listen: Some("127.0.0.1".to_string()),
            ..Default::default()
        };
        let config = ServiceConfig::load(path, &overrides).unwrap();
        assert_eq!(config.bind_address(), "127.0.0.1:7000");
        assert_eq!(config.model_dir, "/srv/models");
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port: [not, a, port]").unwrap();

        let result = ServiceConfig::load(file.path().to_str().unwrap(), &ConfigOverrides::default());
        assert!(result.is_err());
    }
}
