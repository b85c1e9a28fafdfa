//! Loader configuration.
//!
//! Read once at process entry from a TOML file (`dwh.toml` by default) and
//! passed by reference to whatever needs it.
//!
//! ```toml
//! [cluster]
//! host = "example.abc123.us-west-2.redshift.amazonaws.com"
//! db_name = "dev"
//! db_user = "awsuser"
//! db_password = "secret"
//! db_port = 5439
//!
//! [iam_role]
//! arn = "'arn:aws:iam::123456789012:role/dwhRole'"
//!
//! [s3]
//! log_data = "'s3://udacity-dend/log_data'"
//! log_jsonpath = "'s3://udacity-dend/log_json_path.json'"
//! song_data = "'s3://udacity-dend/song_data'"
//! ```

use crate::error::{EtlError, EtlResult};
use crate::generator::DEFAULT_REGION;

use serde::Deserialize;
use sqlx::postgres::PgConnectOptions;
use std::path::{Path, PathBuf};

/// File name looked up in the working directory.
pub const CONFIG_FILE: &str = "dwh.toml";

/// Remove surrounding quote characters from a configuration value.
///
/// Leading and trailing `"` and `'` are stripped; quotes inside the value
/// are kept.
pub fn trim_value(value: &str) -> &str {
    value.trim_matches(|c: char| c == '"' || c == '\'')
}

/// Complete loader configuration.
///
/// `[cluster]` is only needed when a connection is opened from it, so
/// printing statements works from a file without credentials.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub cluster: Option<ClusterConfig>,
    pub iam_role: IamRoleConfig,
    pub s3: S3Config,
}

/// Warehouse connection parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct ClusterConfig {
    pub host: String,
    pub db_name: String,
    pub db_user: String,
    pub db_password: String,
    #[serde(default = "default_port")]
    pub db_port: u16,
}

/// Role the warehouse assumes to read from S3.
#[derive(Debug, Clone, Deserialize)]
pub struct IamRoleConfig {
    pub arn: String,
}

/// Locations of the raw data.
#[derive(Debug, Clone, Deserialize)]
pub struct S3Config {
    pub log_data: String,
    pub log_jsonpath: String,
    pub song_data: String,
    #[serde(default = "default_region")]
    pub region: String,
}

fn default_port() -> u16 {
    5439
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

impl Config {
    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> EtlResult<Self> {
        let config: Config =
            toml::from_str(content).map_err(|e| EtlError::Config(e.to_string()))?;
        Ok(config.trimmed())
    }

    /// Read and parse a configuration file.
    pub fn load(path: impl AsRef<Path>) -> EtlResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            EtlError::Config(format!("Failed to read '{}': {}", path.display(), e))
        })?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Self::from_toml(&content)
    }

    /// The `[cluster]` section, required to connect.
    pub fn cluster(&self) -> EtlResult<&ClusterConfig> {
        self.cluster
            .as_ref()
            .ok_or_else(|| EtlError::Config("missing [cluster] section".to_string()))
    }

    /// Find the configuration file: `./dwh.toml`, then
    /// `<config dir>/sparkify/dwh.toml`.
    pub fn locate() -> EtlResult<PathBuf> {
        let local = PathBuf::from(CONFIG_FILE);
        if local.exists() {
            return Ok(local);
        }
        if let Some(dir) = dirs::config_dir() {
            let global = dir.join("sparkify").join(CONFIG_FILE);
            if global.exists() {
                return Ok(global);
            }
        }
        Err(EtlError::Config(format!(
            "{} not found. Use --config or create {}",
            CONFIG_FILE, CONFIG_FILE
        )))
    }

    fn trimmed(mut self) -> Self {
        fn trim(value: &mut String) {
            *value = trim_value(value).to_string();
        }
        if let Some(cluster) = self.cluster.as_mut() {
            trim(&mut cluster.host);
            trim(&mut cluster.db_name);
            trim(&mut cluster.db_user);
            trim(&mut cluster.db_password);
        }
        trim(&mut self.iam_role.arn);
        trim(&mut self.s3.log_data);
        trim(&mut self.s3.log_jsonpath);
        trim(&mut self.s3.song_data);
        trim(&mut self.s3.region);
        self
    }
}

impl ClusterConfig {
    /// Connection options for the warehouse.
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.db_port)
            .username(&self.db_user)
            .password(&self.db_password)
            .database(&self.db_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"
[cluster]
host = "cluster.example.com"
db_name = "dev"
db_user = "awsuser"
db_password = "'pa\"ss'"

[iam_role]
arn = "'arn:aws:iam::123:role/dwhRole'"

[s3]
log_data = "'s3://udacity-dend/log_data'"
log_jsonpath = "'s3://udacity-dend/log_json_path.json'"
song_data = "\"s3://udacity-dend/song_data\""
"#;

    #[test]
    fn test_trim_value() {
        assert_eq!(trim_value("foo\"-\"bar"), "foo\"-\"bar");
        assert_eq!(trim_value("\"foo-bar\""), "foo-bar");
        assert_eq!(trim_value("'bar-foo'"), "bar-foo");
        assert_eq!(trim_value("plain"), "plain");
    }

    #[test]
    fn test_from_toml_trims_values() {
        let config = Config::from_toml(SAMPLE).unwrap();
        assert_eq!(config.iam_role.arn, "arn:aws:iam::123:role/dwhRole");
        assert_eq!(config.s3.log_data, "s3://udacity-dend/log_data");
        assert_eq!(config.s3.log_jsonpath, "s3://udacity-dend/log_json_path.json");
        assert_eq!(config.s3.song_data, "s3://udacity-dend/song_data");
        assert_eq!(config.cluster().unwrap().db_password, "pa\"ss");
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_toml(SAMPLE).unwrap();
        assert_eq!(config.cluster().unwrap().db_port, 5439);
        assert_eq!(config.s3.region, "us-west-2");
    }

    #[test]
    fn test_explicit_region_and_port() {
        let content = SAMPLE
            .replace("db_user = \"awsuser\"", "db_user = \"awsuser\"\ndb_port = 5440")
            .replace("[s3]", "[s3]\nregion = \"'eu-central-1'\"");
        let config = Config::from_toml(&content).unwrap();
        assert_eq!(config.cluster().unwrap().db_port, 5440);
        assert_eq!(config.s3.region, "eu-central-1");
    }

    #[test]
    fn test_missing_section() {
        let err = Config::from_toml("[cluster]\nhost = \"h\"").unwrap_err();
        assert!(matches!(err, EtlError::Config(_)));
    }

    #[test]
    fn test_without_cluster_section() {
        let content = &SAMPLE[SAMPLE.find("[iam_role]").unwrap()..];
        assert!(!content.contains("[cluster]"));
        let config = Config::from_toml(content).unwrap();
        assert!(config.cluster.is_none());
        assert_eq!(config.iam_role.arn, "arn:aws:iam::123:role/dwhRole");
        let err = config.cluster().unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: missing [cluster] section");
    }

    #[test]
    fn test_incomplete_cluster_section() {
        let content = SAMPLE.replace("db_password = \"'pa\\\"ss'\"\n", "");
        assert!(Config::from_toml(&content).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load("/nonexistent/dwh.toml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/dwh.toml"));
    }
}
