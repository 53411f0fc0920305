//! Session configuration loaded from TOML.
//!
//! ```toml
//! [links]
//! base_uri = "http://h/"
//! context_name = "shop"
//!
//! [session]
//! debug = false
//! ```

use crate::error::{Error, ErrorKind, ErrorOrigin};
use dynlink_core::link::LinkConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error as ThisError;
use url::Url;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("cannot read config '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("links.base_uri '{uri}' is not an absolute URL: {reason}")]
    InvalidBaseUri { uri: String, reason: String },

    #[error("links.context_name '{0}' must be one non-empty path segment")]
    InvalidContextName(String),
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::new(ErrorKind::InvalidInput, ErrorOrigin::Config, err.to_string())
    }
}

///
/// Config
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub links: LinksConfig,

    #[serde(default)]
    pub session: SessionConfig,
}

impl Config {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;

        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml_str(&input)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.links.validate()
    }

    #[must_use]
    pub fn link_config(&self) -> LinkConfig {
        LinkConfig::new(&self.links.base_uri, &self.links.context_name)
    }
}

///
/// LinksConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LinksConfig {
    pub base_uri: String,
    pub context_name: String,
}

impl LinksConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let invalid_uri = |reason: String| ConfigError::InvalidBaseUri {
            uri: self.base_uri.clone(),
            reason,
        };
        let url = Url::parse(&self.base_uri).map_err(|err| invalid_uri(err.to_string()))?;
        if url.cannot_be_a_base() {
            return Err(invalid_uri("URL cannot carry a path".to_string()));
        }

        let name = &self.context_name;
        if name.is_empty() || name.contains(['/', '?', '#']) {
            return Err(ConfigError::InvalidContextName(name.clone()));
        }

        Ok(())
    }
}

///
/// SessionConfig
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Emit per-operation debug summaries.
    #[serde(default)]
    pub debug: bool,
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
        [links]
        base_uri = "http://h/"
        context_name = "shop"

        [session]
        debug = true
    "#;

    #[test]
    fn parses_links_and_session() {
        let config = Config::from_toml_str(CONFIG).expect("config");

        assert_eq!(config.links.base_uri, "http://h/");
        assert_eq!(config.links.context_name, "shop");
        assert!(config.session.debug);
        assert_eq!(config.link_config().entity_prefix(), "http://h/shop/entity");
    }

    #[test]
    fn session_table_is_optional() {
        let config = Config::from_toml_str(
            r#"
            [links]
            base_uri = "https://api.example.com"
            context_name = "crm"
            "#,
        )
        .expect("config");

        assert!(!config.session.debug);
    }

    #[test]
    fn relative_base_uri_is_rejected() {
        let err = Config::from_toml_str(
            r#"
            [links]
            base_uri = "/relative"
            context_name = "shop"
            "#,
        )
        .unwrap_err();

        assert!(matches!(err, ConfigError::InvalidBaseUri { .. }));
    }

    #[test]
    fn context_name_must_be_one_segment() {
        for name in ["", "a/b", "a?b"] {
            let input = format!(
                "[links]\nbase_uri = \"http://h/\"\ncontext_name = \"{name}\"\n"
            );
            let err = Config::from_toml_str(&input).unwrap_err();

            assert!(matches!(err, ConfigError::InvalidContextName(_)), "{name}");
        }
    }

    #[test]
    fn unknown_keys_and_missing_tables_fail_to_parse() {
        let err = Config::from_toml_str("[links]\nbase_uri = \"http://h/\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));

        let err = Config::from_toml_str(&format!("{CONFIG}\n[extra]\nx = 1\n")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = Config::from_path("/nonexistent/dynlink.toml").unwrap_err();

        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/dynlink.toml"));
    }

    #[test]
    fn config_errors_are_invalid_input() {
        let err: Error = ConfigError::InvalidContextName(String::new()).into();

        assert_eq!(err.kind, ErrorKind::InvalidInput);
        assert_eq!(err.origin, ErrorOrigin::Config);
    }
}
