//! Configuration loading and management.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use jw_core::CategoryAliases;
use jw_jira::ApiVersion;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "WORKLOG_CONFIG";
/// Config file name looked up in the working and executable directories.
pub const CONFIG_FILE_NAME: &str = "worklog_config.yaml";
const HOME_CONFIG_FILE_NAME: &str = ".worklog_config.yaml";
const SYSTEM_CONFIG_PATH: &str = "/etc/jira-worklogger/worklog_config.yaml";

pub const DEFAULT_TIMEZONE: &str = "Europe/London";
pub const DEFAULT_LOG_LEVEL: &str = "info";
const PLACEHOLDER_TOKEN: &str = "YOUR_API_TOKEN";

/// Environment variables that override individual config keys.
const ENV_OVERRIDES: [(&str, &str); 6] = [
    ("JIRA_BASE_URL", "jira_base_url"),
    ("JIRA_EMAIL", "jira_email"),
    ("JIRA_API_TOKEN", "jira_api_token"),
    ("TIMEZONE", "timezone"),
    ("JIRA_API_VERSION", "api_version"),
    ("LOG_LEVEL", "log_level"),
];

/// Configuration errors. All of them are fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read or a value has the wrong shape.
    #[error(transparent)]
    Load(Box<figment::Error>),
    /// An explicitly requested config file does not exist.
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// A required setting is blank.
    #[error("missing {0} (set it in worklog_config.yaml or the environment)")]
    Missing(&'static str),
    /// The API token was never replaced in the sample config.
    #[error(
        "Please update your API token in worklog_config.yaml - it's currently set to the placeholder value 'YOUR_API_TOKEN'"
    )]
    PlaceholderToken,
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Load(Box::new(err))
    }
}

/// The `defaults` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Defaults {
    #[serde(default)]
    pub category_aliases: CategoryAliases,
}

/// The `discovery` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Discovery {
    /// Issue keys never offered as suggestions, nor their children.
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    pub jira_base_url: String,
    pub jira_email: String,
    pub jira_api_token: String,
    pub timezone: String,
    pub api_version: ApiVersion,
    pub log_level: String,
    #[serde(default)]
    pub defaults: Defaults,
    #[serde(default)]
    pub discovery: Discovery,
    /// File the settings were read from, if any.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("jira_base_url", &self.jira_base_url)
            .field("jira_email", &self.jira_email)
            .field("jira_api_token", &"[REDACTED]")
            .field("timezone", &self.timezone)
            .field("api_version", &self.api_version)
            .field("log_level", &self.log_level)
            .field("defaults", &self.defaults)
            .field("discovery", &self.discovery)
            .field("source", &self.source)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            jira_base_url: String::new(),
            jira_email: String::new(),
            jira_api_token: String::new(),
            timezone: DEFAULT_TIMEZONE.to_string(),
            api_version: ApiVersion::default(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            defaults: Defaults::default(),
            discovery: Discovery::default(),
            source: None,
        }
    }
}

impl Config {
    /// Loads configuration from the default search locations.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Loads configuration, optionally from a specific file.
    ///
    /// Layers, lowest first: built-in defaults, the config file, then the
    /// `JIRA_*`, `TIMEZONE` and `LOG_LEVEL` environment variables.
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let source = match config_path {
            Some(path) if path.is_file() => Some(path.to_path_buf()),
            Some(path) => return Err(ConfigError::NotFound(path.to_path_buf())),
            None => first_existing(candidate_paths()),
        };

        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = &source {
            figment = figment.merge(Yaml::file(path));
        }
        figment = figment.merge(Serialized::defaults(env_overrides()));

        let mut config = Self::from_figment(&figment)?;
        config.source = source;
        Ok(config)
    }

    /// Extracts and validates configuration from an assembled figment.
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.validated()
    }

    fn validated(mut self) -> Result<Self, ConfigError> {
        for value in [
            &mut self.jira_base_url,
            &mut self.jira_email,
            &mut self.jira_api_token,
            &mut self.timezone,
            &mut self.log_level,
        ] {
            *value = value.trim().to_string();
        }

        if self.jira_base_url.is_empty() {
            return Err(ConfigError::Missing("JIRA_BASE_URL"));
        }
        if self.jira_email.is_empty() {
            return Err(ConfigError::Missing("JIRA_EMAIL"));
        }
        if self.jira_api_token.is_empty() {
            return Err(ConfigError::Missing("JIRA_API_TOKEN"));
        }
        if self.jira_api_token == PLACEHOLDER_TOKEN {
            return Err(ConfigError::PlaceholderToken);
        }
        if self.timezone.is_empty() {
            DEFAULT_TIMEZONE.clone_into(&mut self.timezone);
        }
        if self.log_level.is_empty() {
            DEFAULT_LOG_LEVEL.clone_into(&mut self.log_level);
        }
        Ok(self)
    }
}

/// Reads non-blank override variables from the environment.
fn env_overrides() -> BTreeMap<&'static str, String> {
    ENV_OVERRIDES
        .iter()
        .filter_map(|(var, key)| {
            std::env::var(var)
                .ok()
                .filter(|value| !value.trim().is_empty())
                .map(|value| (*key, value))
        })
        .collect()
}

/// Config file locations in lookup order.
///
/// `$WORKLOG_CONFIG`, `./worklog_config.yaml`, the executable's directory,
/// `~/.worklog_config.yaml`, then the system-wide file.
pub fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
        paths.push(PathBuf::from(path));
    }
    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join(CONFIG_FILE_NAME));
    }
    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        paths.push(exe_dir.join(CONFIG_FILE_NAME));
    }
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(HOME_CONFIG_FILE_NAME));
    }
    paths.push(PathBuf::from(SYSTEM_CONFIG_PATH));
    paths
}

fn first_existing(paths: Vec<PathBuf>) -> Option<PathBuf> {
    paths.into_iter().find(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    use figment::Jail;

    const FULL_CONFIG: &str = r#"
jira_base_url: "https://example.atlassian.net"
jira_email: "me@example.com"
jira_api_token: "abc123"
timezone: "America/New_York"
api_version: 2
log_level: debug
defaults:
  category_aliases:
    Meetings: "PROJ-123"
    support: "PROJ-456"
discovery:
  exclude: ["CLOUD-1154"]
"#;

    const MINIMAL_CONFIG: &str = r#"
jira_base_url: "https://example.atlassian.net"
jira_email: "me@example.com"
jira_api_token: "abc123"
"#;

    fn from_yaml(yaml: &str) -> Result<Config, ConfigError> {
        let figment = Figment::from(Serialized::defaults(Config::default())).merge(Yaml::string(yaml));
        Config::from_figment(&figment)
    }

    #[test]
    fn test_full_file_is_read() {
        let config = from_yaml(FULL_CONFIG).unwrap();
        assert_eq!(config.jira_base_url, "https://example.atlassian.net");
        assert_eq!(config.timezone, "America/New_York");
        assert_eq!(config.api_version, ApiVersion::V2);
        assert_eq!(config.log_level, "debug");
        assert_eq!(
            config.defaults.category_aliases.resolve("meetings"),
            Some("PROJ-123")
        );
        assert_eq!(config.discovery.exclude, vec!["CLOUD-1154".to_string()]);
    }

    #[test]
    fn test_defaults_fill_optional_settings() {
        let config = from_yaml(MINIMAL_CONFIG).unwrap();
        assert_eq!(config.timezone, DEFAULT_TIMEZONE);
        assert_eq!(config.api_version, ApiVersion::V3);
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
        assert!(config.defaults.category_aliases.is_empty());
        assert!(config.discovery.exclude.is_empty());
    }

    #[test]
    fn test_blank_optional_settings_use_defaults() {
        let yaml = format!("{MINIMAL_CONFIG}timezone: \"\"\nlog_level: \"  \"\n");
        let config = from_yaml(&yaml).unwrap();
        assert_eq!(config.timezone, DEFAULT_TIMEZONE);
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
    }

    #[test]
    fn test_missing_required_settings_are_reported() {
        let err = from_yaml("jira_email: me@example.com\njira_api_token: x\n").unwrap_err();
        assert!(matches!(err, ConfigError::Missing("JIRA_BASE_URL")));

        let err = from_yaml("jira_base_url: https://x\njira_api_token: x\n").unwrap_err();
        assert!(matches!(err, ConfigError::Missing("JIRA_EMAIL")));

        let err = from_yaml("jira_base_url: https://x\njira_email: me\n").unwrap_err();
        assert!(matches!(err, ConfigError::Missing("JIRA_API_TOKEN")));
    }

    #[test]
    fn test_placeholder_token_is_rejected() {
        let yaml = MINIMAL_CONFIG.replace("abc123", PLACEHOLDER_TOKEN);
        assert!(matches!(
            from_yaml(&yaml),
            Err(ConfigError::PlaceholderToken)
        ));
    }

    #[test]
    fn test_unknown_api_version_is_rejected() {
        let yaml = format!("{MINIMAL_CONFIG}api_version: \"7\"\n");
        let err = from_yaml(&yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
        assert!(err.to_string().contains("unsupported API version"), "{err}");
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = from_yaml(MINIMAL_CONFIG).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("abc123"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_environment_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("custom.yaml", FULL_CONFIG)?;
            jail.set_env("JIRA_EMAIL", "env@example.com");
            jail.set_env("JIRA_API_VERSION", "3");
            jail.set_env("TIMEZONE", "Asia/Tokyo");
            jail.set_env("LOG_LEVEL", "  ");

            let config = Config::load_from(Some(Path::new("custom.yaml"))).unwrap();
            assert_eq!(config.jira_email, "env@example.com");
            assert_eq!(config.api_version, ApiVersion::V3);
            assert_eq!(config.timezone, "Asia/Tokyo");
            // Blank variables do not override.
            assert_eq!(config.log_level, "debug");
            assert_eq!(config.source.as_deref(), Some(Path::new("custom.yaml")));
            Ok(())
        });
    }

    #[test]
    fn test_numeric_token_from_environment_stays_text() {
        Jail::expect_with(|jail| {
            jail.create_file("custom.yaml", MINIMAL_CONFIG)?;
            jail.set_env("JIRA_API_TOKEN", "0123456789");

            let config = Config::load_from(Some(Path::new("custom.yaml"))).unwrap();
            assert_eq!(config.jira_api_token, "0123456789");
            Ok(())
        });
    }

    #[test]
    fn test_config_env_var_points_at_file() {
        Jail::expect_with(|jail| {
            jail.create_file("elsewhere.yaml", MINIMAL_CONFIG)?;
            jail.set_env(CONFIG_ENV, "elsewhere.yaml");

            let config = Config::load().unwrap();
            assert_eq!(config.source.as_deref(), Some(Path::new("elsewhere.yaml")));
            Ok(())
        });
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let err = Config::load_from(Some(Path::new("/nonexistent/worklog.yaml"))).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_candidate_paths_follow_lookup_order() {
        Jail::expect_with(|jail| {
            let root = jail.directory().to_path_buf();
            jail.set_env(CONFIG_ENV, "explicit.yaml");
            jail.set_env("HOME", root.display().to_string());

            let paths = candidate_paths();
            let cwd = std::env::current_dir().unwrap();
            assert_eq!(paths[0], Path::new("explicit.yaml"));
            assert_eq!(paths[1], cwd.join(CONFIG_FILE_NAME));
            assert_eq!(paths[paths.len() - 2], root.join(HOME_CONFIG_FILE_NAME));
            assert_eq!(paths.last().unwrap(), Path::new(SYSTEM_CONFIG_PATH));
            Ok(())
        });
    }

    #[test]
    fn test_first_existing_skips_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("present.yaml");
        std::fs::write(&present, MINIMAL_CONFIG).unwrap();
        let found = first_existing(vec![dir.path().join("absent.yaml"), present.clone()]);
        assert_eq!(found, Some(present));
    }
}
