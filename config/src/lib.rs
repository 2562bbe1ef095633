//! Configuration for VantagePoint.
//!
//! Settings come from an optional TOML file (`~/.vantagepoint/config.toml`,
//! or the path in `VANTAGEPOINT_CONFIG`) with environment variables layered
//! on top. The resolved [`Settings`] feed both the backend clients and the
//! [`ModeSelector`].
//!
//! ```toml
//! [doorway]
//! url = "http://localhost:8000"
//! session_name = "vantagepoint"
//! timeout_secs = 30
//!
//! [text_model]
//! api_key = "${ANTHROPIC_API_KEY}"
//! model = "claude-sonnet-4-20250514"
//! max_tokens = 500
//!
//! [chain]
//! name = "vantagepoint"
//! ```

mod mode;

use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs};

use serde::Deserialize;
use thiserror::Error;
use vantage_types::ApiKey;

pub use mode::{BackendSignals, ModeSelector};

/// Environment variable naming the geometric backend address.
pub const DOORWAY_URL_ENV: &str = "DOORWAY_API_URL";
/// Environment variable carrying the text-model credential.
pub const TEXT_MODEL_KEY_ENV: &str = "ANTHROPIC_API_KEY";
/// Environment variable overriding the text-model name.
pub const TEXT_MODEL_NAME_ENV: &str = "DOORWAY_MODEL";
/// Environment variable overriding the config file location.
pub const CONFIG_PATH_ENV: &str = "VANTAGEPOINT_CONFIG";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_TEXT_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_MAX_TOKENS: u32 = 500;
pub const DEFAULT_TEXT_MODEL_ENDPOINT: &str = "https://api.anthropic.com/v1/messages";
pub const DEFAULT_DOORWAY_SESSION_NAME: &str = "vantagepoint";
pub const DEFAULT_CHAIN_NAME: &str = "vantagepoint";

#[derive(Debug, Default, Deserialize)]
pub struct VantageConfig {
    pub doorway: Option<DoorwayConfig>,
    pub text_model: Option<TextModelConfig>,
    pub chain: Option<ChainConfig>,
}

/// Geometric-reasoning backend.
#[derive(Debug, Default, Deserialize)]
pub struct DoorwayConfig {
    pub url: Option<String>,
    pub session_name: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Text-completion backend.
#[derive(Default, Deserialize)]
pub struct TextModelConfig {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub endpoint: Option<String>,
    pub timeout_secs: Option<u64>,
}

// Manual Debug impl to prevent leaking API keys in logs.
impl std::fmt::Debug for TextModelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextModelConfig")
            .field(
                "api_key",
                &if self.api_key.is_some() {
                    "[REDACTED]"
                } else {
                    "None"
                },
            )
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("endpoint", &self.endpoint)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ChainConfig {
    pub name: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl ConfigError {
    pub fn path(&self) -> &PathBuf {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

impl VantageConfig {
    /// Load the config file if one exists. A missing file is `Ok(None)`.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(path).map_err(|err| {
            tracing::warn!("Failed to read config at {:?}: {}", path, err);
            ConfigError::Read {
                path: path.to_path_buf(),
                source: err,
            }
        })?;

        toml::from_str(&content).map(Some).map_err(|err| {
            tracing::warn!("Failed to parse config at {:?}: {}", path, err);
            ConfigError::Parse {
                path: path.to_path_buf(),
                source: err,
            }
        })
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    if let Ok(explicit) = env::var(CONFIG_PATH_ENV)
        && !explicit.trim().is_empty()
    {
        return Some(PathBuf::from(explicit));
    }
    dirs::home_dir().map(|home| home.join(".vantagepoint").join("config.toml"))
}

/// Replace `${VAR}` references through `lookup`.
/// Unknown variables expand to the empty string; an unclosed `${` is kept verbatim.
fn expand_vars_with<F>(value: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let name = &after[..end];
                if !name.is_empty() {
                    out.push_str(&lookup(name).unwrap_or_default());
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

// ============================================================================
// Resolved settings
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoorwaySettings {
    pub url: String,
    pub session_name: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextModelSettings {
    pub api_key: Option<ApiKey>,
    pub model: String,
    pub max_tokens: u32,
    pub endpoint: String,
    pub timeout: Duration,
}

/// File config merged with environment overrides and defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub doorway: Option<DoorwaySettings>,
    pub text_model: TextModelSettings,
    pub chain_name: String,
}

impl Settings {
    /// Resolve against the process environment.
    #[must_use]
    pub fn resolve(config: Option<&VantageConfig>) -> Self {
        Self::resolve_with(config, |name| env::var(name).ok())
    }

    /// Resolve with an explicit environment lookup. Blank values count as absent.
    pub fn resolve_with<F>(config: Option<&VantageConfig>, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_value = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let file_value = |value: Option<&String>| {
            value
                .map(|v| expand_vars_with(v, &lookup))
                .filter(|v| !v.trim().is_empty())
        };

        let doorway_cfg = config.and_then(|c| c.doorway.as_ref());
        let text_cfg = config.and_then(|c| c.text_model.as_ref());

        let doorway_url = env_value(DOORWAY_URL_ENV)
            .or_else(|| file_value(doorway_cfg.and_then(|d| d.url.as_ref())));
        let doorway = doorway_url.map(|url| DoorwaySettings {
            url: url.trim().trim_end_matches('/').to_string(),
            session_name: doorway_cfg
                .and_then(|d| d.session_name.clone())
                .unwrap_or_else(|| DEFAULT_DOORWAY_SESSION_NAME.to_string()),
            timeout: Duration::from_secs(
                doorway_cfg
                    .and_then(|d| d.timeout_secs)
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
        });

        let api_key = env_value(TEXT_MODEL_KEY_ENV)
            .or_else(|| file_value(text_cfg.and_then(|t| t.api_key.as_ref())))
            .and_then(ApiKey::new);
        let text_model = TextModelSettings {
            api_key,
            model: env_value(TEXT_MODEL_NAME_ENV)
                .or_else(|| file_value(text_cfg.and_then(|t| t.model.as_ref())))
                .unwrap_or_else(|| DEFAULT_TEXT_MODEL.to_string()),
            max_tokens: text_cfg
                .and_then(|t| t.max_tokens)
                .unwrap_or(DEFAULT_MAX_TOKENS),
            endpoint: file_value(text_cfg.and_then(|t| t.endpoint.as_ref()))
                .unwrap_or_else(|| DEFAULT_TEXT_MODEL_ENDPOINT.to_string()),
            timeout: Duration::from_secs(
                text_cfg
                    .and_then(|t| t.timeout_secs)
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
        };

        let chain_name = config
            .and_then(|c| c.chain.as_ref())
            .and_then(|c| c.name.clone())
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CHAIN_NAME.to_string());

        Self {
            doorway,
            text_model,
            chain_name,
        }
    }

    /// The two signals mode resolution reads.
    #[must_use]
    pub fn signals(&self) -> BackendSignals {
        BackendSignals {
            doorway_url: self.doorway.as_ref().map(|d| d.url.clone()),
            text_model_key: self.text_model.api_key.clone(),
        }
    }

    #[must_use]
    pub fn mode_selector(&self) -> ModeSelector {
        ModeSelector::new(self.signals())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use super::{
        DEFAULT_TEXT_MODEL, Settings, VantageConfig, expand_vars_with,
    };

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    fn parse(toml_text: &str) -> VantageConfig {
        toml::from_str(toml_text).unwrap()
    }

    #[test]
    fn expand_vars_no_vars() {
        assert_eq!(expand_vars_with("hello world", lookup_from(&[])), "hello world");
    }

    #[test]
    fn expand_vars_single_and_adjacent() {
        let lookup = lookup_from(&[("A", "alpha"), ("B", "beta")]);
        assert_eq!(expand_vars_with("x ${A} y", &lookup), "x alpha y");
        assert_eq!(expand_vars_with("${A}${B}", &lookup), "alphabeta");
    }

    #[test]
    fn expand_vars_missing_becomes_empty() {
        assert_eq!(
            expand_vars_with("before ${MISSING} after", lookup_from(&[])),
            "before  after"
        );
    }

    #[test]
    fn expand_vars_unclosed_brace_preserved() {
        assert_eq!(
            expand_vars_with("test ${UNCLOSED", lookup_from(&[])),
            "test ${UNCLOSED"
        );
    }

    #[test]
    fn expand_vars_unicode_content() {
        let lookup = lookup_from(&[("CRAB", "🦀")]);
        assert_eq!(expand_vars_with("héllo ${CRAB} ü", lookup), "héllo 🦀 ü");
    }

    #[test]
    fn defaults_without_config_or_env() {
        let settings = Settings::resolve_with(None, lookup_from(&[]));
        assert!(settings.doorway.is_none());
        assert!(settings.text_model.api_key.is_none());
        assert_eq!(settings.text_model.model, DEFAULT_TEXT_MODEL);
        assert_eq!(settings.text_model.max_tokens, 500);
        assert_eq!(settings.text_model.timeout, Duration::from_secs(30));
        assert_eq!(settings.chain_name, "vantagepoint");
    }

    #[test]
    fn env_overrides_file() {
        let config = parse(
            r#"
            [doorway]
            url = "http://file-host:8000/"
            timeout_secs = 5

            [text_model]
            model = "file-model"
            "#,
        );
        let settings = Settings::resolve_with(
            Some(&config),
            lookup_from(&[
                ("DOORWAY_API_URL", "http://env-host:9000"),
                ("DOORWAY_MODEL", "env-model"),
            ]),
        );
        let doorway = settings.doorway.unwrap();
        assert_eq!(doorway.url, "http://env-host:9000");
        assert_eq!(doorway.timeout, Duration::from_secs(5));
        assert_eq!(settings.text_model.model, "env-model");
    }

    #[test]
    fn file_values_expand_env_references() {
        let config = parse(
            r#"
            [text_model]
            api_key = "${MY_KEY}"
            "#,
        );
        let settings = Settings::resolve_with(Some(&config), lookup_from(&[("MY_KEY", "sk-1")]));
        assert_eq!(
            settings.text_model.api_key.unwrap().expose_secret(),
            "sk-1"
        );
    }

    #[test]
    fn blank_env_values_count_as_absent() {
        let settings = Settings::resolve_with(
            None,
            lookup_from(&[("DOORWAY_API_URL", "  "), ("ANTHROPIC_API_KEY", "")]),
        );
        assert!(settings.doorway.is_none());
        assert!(settings.text_model.api_key.is_none());
    }

    #[test]
    fn trailing_slash_is_trimmed_from_doorway_url() {
        let config = parse(
            r#"
            [doorway]
            url = "http://localhost:8000/"
            "#,
        );
        let settings = Settings::resolve_with(Some(&config), lookup_from(&[]));
        assert_eq!(settings.doorway.unwrap().url, "http://localhost:8000");
    }

    #[test]
    fn load_from_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = VantageConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn load_from_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[chain]\nname = \"team-chain\"\n").unwrap();
        let config = VantageConfig::load_from(&path).unwrap().unwrap();
        let settings = Settings::resolve_with(Some(&config), lookup_from(&[]));
        assert_eq!(settings.chain_name, "team-chain");
    }

    #[test]
    fn load_from_invalid_toml_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[doorway\nurl = 1").unwrap();
        let err = VantageConfig::load_from(&path).unwrap_err();
        assert_eq!(err.path(), &path);
        assert!(err.to_string().contains("failed to parse config"));
    }
}
