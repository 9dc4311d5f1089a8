//! Connection profile configuration.
//!
//! Profiles live in a JSON document:
//!
//! ```json
//! {
//!   "default": "local",
//!   "profiles": {
//!     "local": { "dialect": "sqlite", "url": "sqlite:app.db" },
//!     "reporting": {
//!       "dialect": "mysqli",
//!       "url": "mysql://report@db/reporting",
//!       "charset": "utf8mb4",
//!       "database": "reporting",
//!       "table_prefix": "rpt_"
//!     }
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use oxide_schema_core::{ConnectionInfo, Dialect};

use crate::error::{Result, RunnerError};

fn default_profile_name() -> String {
    "default".to_string()
}

/// All configured connection profiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Profile used when none is requested.
    #[serde(default = "default_profile_name")]
    pub default: String,
    /// Profiles by name.
    pub profiles: BTreeMap<String, ConnectionProfile>,
}

/// One named connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionProfile {
    /// Driver or dialect identifier (`sqlite`, `mysqli`, `pgsql`, ...).
    pub dialect: String,
    /// Connection URL.
    pub url: String,
    /// Default character set for created tables.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charset: Option<String>,
    /// Default collation for created tables.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collation: Option<String>,
    /// Database or schema name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    /// Prefix prepended to every table name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_prefix: Option<String>,
}

impl DatabaseConfig {
    /// Load configuration from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// Every profile must name a known dialect and a non-empty URL.
    pub fn validate(&self) -> Result<()> {
        if self.profiles.is_empty() {
            return Err(RunnerError::InvalidConfig("no profiles defined".into()));
        }
        for (name, profile) in &self.profiles {
            if profile.url.trim().is_empty() {
                return Err(RunnerError::InvalidConfig(format!(
                    "profile '{name}' has an empty url"
                )));
            }
            profile.dialect()?;
        }
        Ok(())
    }

    /// Returns a profile by name, or the default profile.
    pub fn profile(&self, name: Option<&str>) -> Result<&ConnectionProfile> {
        let name = name.unwrap_or(&self.default);
        self.profiles
            .get(name)
            .ok_or_else(|| RunnerError::ProfileNotFound(name.to_string()))
    }
}

impl ConnectionProfile {
    /// Resolves the dialect identifier.
    pub fn dialect(&self) -> Result<Dialect> {
        Ok(self.dialect.parse()?)
    }

    /// Builds the descriptor the compiler reads.
    pub fn connection_info(&self) -> Result<ConnectionInfo> {
        let mut info = ConnectionInfo::new(self.dialect()?);
        info.charset.clone_from(&self.charset);
        info.collation.clone_from(&self.collation);
        info.database.clone_from(&self.database);
        if let Some(prefix) = &self.table_prefix {
            info.table_prefix.clone_from(prefix);
        }
        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxide_schema_core::SchemaError;
    use std::io::Write;

    const CONFIG: &str = r#"{
        "default": "local",
        "profiles": {
            "local": { "dialect": "sqlite", "url": ":memory:" },
            "reporting": {
                "dialect": "MySQLi",
                "url": "mysql://report@db/reporting",
                "charset": "utf8mb4",
                "collation": "utf8mb4_unicode_ci",
                "database": "reporting",
                "table_prefix": "rpt_"
            }
        }
    }"#;

    #[test]
    fn test_default_profile() {
        let config = DatabaseConfig::from_json(CONFIG).unwrap();
        let profile = config.profile(None).unwrap();
        assert_eq!(profile.dialect().unwrap(), Dialect::Sqlite);
        assert_eq!(profile.url, ":memory:");
    }

    #[test]
    fn test_connection_info() {
        let config = DatabaseConfig::from_json(CONFIG).unwrap();
        let info = config.profile(Some("reporting")).unwrap().connection_info().unwrap();

        assert_eq!(info.dialect, Dialect::MySql);
        assert_eq!(info.charset.as_deref(), Some("utf8mb4"));
        assert_eq!(info.collation.as_deref(), Some("utf8mb4_unicode_ci"));
        assert_eq!(info.database.as_deref(), Some("reporting"));
        assert_eq!(info.table_prefix, "rpt_");
    }

    #[test]
    fn test_missing_profile() {
        let config = DatabaseConfig::from_json(CONFIG).unwrap();
        let err = config.profile(Some("nope")).unwrap_err();
        assert!(matches!(err, RunnerError::ProfileNotFound(ref name) if name == "nope"));
    }

    #[test]
    fn test_unknown_dialect_rejected() {
        let json = r#"{ "profiles": { "default": { "dialect": "oracle", "url": "x" } } }"#;
        let err = DatabaseConfig::from_json(json).unwrap_err();
        assert!(matches!(
            err,
            RunnerError::Schema(SchemaError::UnsupportedDialect(ref d)) if d == "oracle"
        ));
    }

    #[test]
    fn test_empty_profiles_rejected() {
        let err = DatabaseConfig::from_json(r#"{ "profiles": {} }"#).unwrap_err();
        assert!(matches!(err, RunnerError::InvalidConfig(_)));
    }

    #[test]
    fn test_empty_url_rejected() {
        let json = r#"{ "profiles": { "default": { "dialect": "sqlite", "url": " " } } }"#;
        assert!(matches!(
            DatabaseConfig::from_json(json).unwrap_err(),
            RunnerError::InvalidConfig(_)
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CONFIG.as_bytes()).unwrap();

        let config = DatabaseConfig::load(file.path()).unwrap();
        assert_eq!(config.default, "local");
        assert_eq!(config.profiles.len(), 2);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            DatabaseConfig::from_json("{").unwrap_err(),
            RunnerError::Serialization(_)
        ));
    }
}
