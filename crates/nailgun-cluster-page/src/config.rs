/*
[INPUT]:  YAML configuration file, NAILGUN__* environment overrides
[OUTPUT]: Parsed page configuration
[POS]:    Configuration layer - API endpoint, cluster, polling, logging
[UPDATE]: When adding new configuration options
*/

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use config::{Config, Environment, File, FileFormat};
use nailgun_adapter::ClientConfig;
use serde::{Deserialize, Serialize};

const ENV_PREFIX: &str = "NAILGUN";
const ENV_SEPARATOR: &str = "__";

/// Top-level configuration of the cluster page
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PageConfig {
    /// Nailgun API connection
    pub api: ApiConfig,
    /// Cluster opened when none is given on the command line
    #[serde(default)]
    pub cluster_id: Option<u64>,
    /// Poll interval while tasks are running
    #[serde(default = "default_update_interval_ms")]
    pub update_interval_ms: u64,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ApiConfig {
    /// e.g. "http://10.20.0.2:8000"
    pub base_url: String,
    /// Keystone token sent as X-Auth-Token
    #[serde(default)]
    pub auth_token: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LogConfig {
    /// EnvFilter directive, e.g. "info" or "nailgun_cluster_page=debug"
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Also write logs to this file
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_update_interval_ms() -> u64 {
    5000
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

impl PageConfig {
    /// `$CONFIG_DIR/nailgun-cluster-page/config.yaml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("nailgun-cluster-page").join("config.yaml"))
    }

    /// Configuration written by `init`
    pub fn sample() -> Self {
        Self {
            api: ApiConfig {
                base_url: "http://10.20.0.2:8000".to_string(),
                auth_token: None,
                timeout_secs: default_timeout_secs(),
                connect_timeout_secs: default_connect_timeout_secs(),
            },
            cluster_id: Some(1),
            update_interval_ms: default_update_interval_ms(),
            log: LogConfig::default(),
        }
    }

    /// Load configuration from a YAML file, layered with environment overrides
    pub fn from_file(path: &Path) -> Result<Self> {
        Self::load(path, Environment::with_prefix(ENV_PREFIX))
    }

    fn load(path: &Path, env: Environment) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::from(path).format(FileFormat::Yaml))
            .add_source(env.separator(ENV_SEPARATOR).try_parsing(true))
            .build()
            .with_context(|| format!("read config {}", path.display()))?;
        let config: Self = settings
            .try_deserialize()
            .with_context(|| format!("parse config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content).context("parse YAML config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("serialize config to YAML")
    }

    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            bail!("api.base_url must not be empty");
        }
        if self.update_interval_ms == 0 {
            bail!("update_interval_ms must be greater than zero");
        }
        Ok(())
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_millis(self.update_interval_ms)
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            timeout: Duration::from_secs(self.api.timeout_secs),
            connect_timeout: Duration::from_secs(self.api.connect_timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use tokio_test::{assert_err, assert_ok};

    /// Environment source fed from a map instead of the process environment
    fn env_from(vars: &[(&str, &str)]) -> Environment {
        let map: ::config::Map<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Environment::with_prefix(ENV_PREFIX).source(Some(map))
    }

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".yaml")
            .tempfile()
            .expect("temp file");
        file.write_all(content.as_bytes()).expect("write config");
        file
    }

    #[test]
    fn test_defaults_applied() {
        let config = PageConfig::from_yaml_str("api:\n  base_url: http://nailgun:8000\n")
            .expect("parse");
        assert_eq!(config.update_interval(), Duration::from_secs(5));
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.api.connect_timeout_secs, 10);
        assert_eq!(config.log.level, "info");
        assert_eq!(config.cluster_id, None);
    }

    #[test]
    fn test_sample_roundtrips_through_file() {
        let yaml = PageConfig::sample().to_yaml().expect("serialize");
        let file = write_config(&yaml);

        let loaded = assert_ok!(PageConfig::load(file.path(), env_from(&[])));
        assert_eq!(loaded, PageConfig::sample());
    }

    #[test]
    fn test_environment_overrides_file() {
        let file = write_config("api:\n  base_url: http://nailgun:8000\ncluster_id: 3\n");
        let env = env_from(&[
            ("NAILGUN__CLUSTER_ID", "7"),
            ("NAILGUN__UPDATE_INTERVAL_MS", "250"),
            ("NAILGUN__API__AUTH_TOKEN", "secret"),
        ]);

        let config = PageConfig::load(file.path(), env).expect("load");

        assert_eq!(config.cluster_id, Some(7));
        assert_eq!(config.update_interval(), Duration::from_millis(250));
        assert_eq!(config.api.auth_token.as_deref(), Some("secret"));
        assert_eq!(config.api.base_url, "http://nailgun:8000");
    }

    #[test]
    fn test_rejects_zero_interval() {
        let err = PageConfig::from_yaml_str(
            "api:\n  base_url: http://nailgun:8000\nupdate_interval_ms: 0\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("update_interval_ms"));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let missing = dir.path().join("absent.yaml");
        assert_err!(PageConfig::load(&missing, env_from(&[])));
    }

    #[test]
    fn test_client_config_from_api_section() {
        let mut config = PageConfig::sample();
        config.api.timeout_secs = 3;
        let client = config.client_config();
        assert_eq!(client.timeout, Duration::from_secs(3));
        assert_eq!(client.connect_timeout, Duration::from_secs(10));
    }
}
