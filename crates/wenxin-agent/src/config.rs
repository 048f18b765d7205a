//! Adapter configuration.
//!
//! [`WenxinConfig`] is read from a TOML or JSON file (chosen by extension)
//! and then overridden by `WENXIN_*` environment variables. Every field has
//! a default, so an empty file plus `WENXIN_API_KEY` is a valid setup.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{AgentError, Result};
use crate::llm::client::CompletionClientConfig;
use crate::llm::image::ImageClientConfig;

/// Default Qianfan API base URL.
pub const DEFAULT_BASE_URL: &str = "https://qianfan.baidubce.com";

/// Model used when `wenxin_model` is set but empty.
const FALLBACK_WENXIN_MODEL: &str = "eb-instant";

/// Global model selector that maps to the Pro endpoint; every other value
/// (including `wenxin`) maps to `completions`.
const MODEL_WENXIN_4: &str = "wenxin-4";

/// Configuration for the Wenxin bot adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WenxinConfig {
    /// Qianfan API key, sent as the bearer credential.
    pub api_key: String,
    /// Qianfan secret key, consumed by token providers that exchange
    /// credentials.
    pub secret_key: String,
    /// Global model selector of the hosting framework (`wenxin`, `wenxin-4`).
    pub model: Option<String>,
    /// Explicit Qianfan model name; wins over `model` when present.
    pub wenxin_model: Option<String>,
    /// Send `character_desc` as the `system` field of every completion.
    pub prompt_enabled: bool,
    /// Persona text injected when `prompt_enabled` is set.
    pub character_desc: String,
    /// Allow image-creation requests.
    pub text_to_image: bool,
    /// History budget per session, in estimated tokens.
    pub conversation_max_tokens: usize,
    /// Evict sessions idle for this many seconds.
    pub expires_in_seconds: Option<u64>,
    /// Provider base URL, without the `/v2` suffix.
    pub base_url: String,
    /// Whole-request timeout for chat completions.
    pub request_timeout_secs: u64,
    /// Connect timeout for image generation.
    pub image_connect_timeout_secs: u64,
    /// Read timeout for image generation.
    pub image_read_timeout_secs: u64,
}

impl Default for WenxinConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            secret_key: String::new(),
            model: None,
            wenxin_model: None,
            prompt_enabled: false,
            character_desc: String::new(),
            text_to_image: false,
            conversation_max_tokens: 1000,
            expires_in_seconds: None,
            base_url: DEFAULT_BASE_URL.to_owned(),
            request_timeout_secs: 120,
            image_connect_timeout_secs: 5,
            image_read_timeout_secs: 90,
        }
    }
}

impl WenxinConfig {
    // -----------------------------------------------------------------------
    // Loading
    // -----------------------------------------------------------------------

    /// Load from `path` (if given) and apply environment overrides.
    ///
    /// A missing file is not an error; defaults are used instead.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) if p.exists() => Self::from_file(p)?,
            Some(p) => {
                warn!(path = ?p, "configuration file does not exist, using defaults");
                Self::default()
            }
            None => Self::default(),
        };
        config.apply_env(std::env::vars())?;
        Ok(config)
    }

    /// Parse a configuration file. `.json` files are read as JSON, anything
    /// else as TOML.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| AgentError::ConfigError {
            reason: format!("failed to read config file {}: {e}", path.display()),
        })?;

        let config: Self = if path.extension().and_then(|s| s.to_str()) == Some("json") {
            serde_json::from_str(&content).map_err(|e| AgentError::ConfigError {
                reason: format!("failed to parse JSON config: {e}"),
            })?
        } else {
            toml::from_str(&content).map_err(|e| AgentError::ConfigError {
                reason: format!("failed to parse TOML config: {e}"),
            })?
        };

        info!(path = ?path, "configuration loaded from file");
        Ok(config)
    }

    /// Apply `WENXIN_*` overrides from an iterator of environment pairs.
    pub fn apply_env<I>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            match key.as_str() {
                "WENXIN_API_KEY" => self.api_key = value,
                "WENXIN_SECRET_KEY" => self.secret_key = value,
                "WENXIN_MODEL" => self.wenxin_model = Some(value),
                "WENXIN_BASE_URL" => self.base_url = value,
                "WENXIN_PROMPT_ENABLED" => self.prompt_enabled = parse_env(&key, &value)?,
                "WENXIN_CHARACTER_DESC" => self.character_desc = value,
                "WENXIN_TEXT_TO_IMAGE" => self.text_to_image = parse_env(&key, &value)?,
                "WENXIN_CONVERSATION_MAX_TOKENS" => {
                    self.conversation_max_tokens = parse_env(&key, &value)?;
                }
                "WENXIN_EXPIRES_IN_SECONDS" => {
                    self.expires_in_seconds = Some(parse_env(&key, &value)?);
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Reject configurations the clients cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.is_empty() {
            return Err(AgentError::MissingApiKey {
                provider: "qianfan".into(),
            });
        }
        if self.base_url.is_empty() {
            return Err(AgentError::ConfigError {
                reason: "base_url must not be empty".into(),
            });
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Derived settings
    // -----------------------------------------------------------------------

    /// Resolve the Qianfan model name new sessions are created with.
    pub fn resolve_model(&self) -> String {
        match self.wenxin_model.as_deref() {
            Some("") => FALLBACK_WENXIN_MODEL.to_owned(),
            Some(name) => name.to_owned(),
            None => match self.model.as_deref() {
                Some(MODEL_WENXIN_4) => "completions_pro".to_owned(),
                _ => "completions".to_owned(),
            },
        }
    }

    /// The persona to send as `system`, if prompt injection is enabled.
    pub fn system_prompt(&self) -> Option<String> {
        if !self.prompt_enabled {
            return None;
        }
        if self.character_desc.is_empty() {
            warn!("prompt injection is enabled but character_desc is empty");
        }
        Some(self.character_desc.clone())
    }

    /// Idle timeout for sessions.
    pub fn session_ttl(&self) -> Option<Duration> {
        self.expires_in_seconds.map(Duration::from_secs)
    }

    /// Settings for the [`CompletionClient`](crate::CompletionClient).
    pub fn completion_config(&self) -> CompletionClientConfig {
        CompletionClientConfig {
            base_url: self.base_url.clone(),
            system_prompt: self.system_prompt(),
            timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }

    /// Settings for the [`ImageClient`](crate::ImageClient).
    pub fn image_config(&self) -> ImageClientConfig {
        ImageClientConfig {
            base_url: self.base_url.clone(),
            connect_timeout: Duration::from_secs(self.image_connect_timeout_secs),
            read_timeout: Duration::from_secs(self.image_read_timeout_secs),
        }
    }

    /// A copy safe to print: secrets are masked.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        copy.api_key = mask(&self.api_key);
        copy.secret_key = mask(&self.secret_key);
        copy
    }
}

fn parse_env<T>(key: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e| AgentError::ConfigError {
        reason: format!("invalid value for {key}: {e}"),
    })
}

fn mask(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    if secret.chars().count() <= 4 {
        "*".repeat(secret.chars().count())
    } else {
        format!("{visible}****")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn env(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn defaults_match_provider_limits() {
        let config = WenxinConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.conversation_max_tokens, 1000);
        assert_eq!(config.image_connect_timeout_secs, 5);
        assert_eq!(config.image_read_timeout_secs, 90);
        assert!(!config.text_to_image);
        assert!(config.system_prompt().is_none());
    }

    #[test]
    fn resolve_model_prefers_explicit_name() {
        let config = WenxinConfig {
            wenxin_model: Some("ernie-4.0-8k".into()),
            model: Some("wenxin-4".into()),
            ..WenxinConfig::default()
        };
        assert_eq!(config.resolve_model(), "ernie-4.0-8k");
    }

    #[test]
    fn resolve_model_empty_name_falls_back() {
        let config = WenxinConfig {
            wenxin_model: Some(String::new()),
            ..WenxinConfig::default()
        };
        assert_eq!(config.resolve_model(), "eb-instant");
    }

    #[test]
    fn resolve_model_from_global_selector() {
        let mut config = WenxinConfig {
            model: Some("wenxin".into()),
            ..WenxinConfig::default()
        };
        assert_eq!(config.resolve_model(), "completions");

        config.model = Some("wenxin-4".into());
        assert_eq!(config.resolve_model(), "completions_pro");

        config.model = None;
        assert_eq!(config.resolve_model(), "completions");
    }

    #[test]
    fn system_prompt_only_when_enabled() {
        let mut config = WenxinConfig {
            character_desc: "You are a cat.".into(),
            ..WenxinConfig::default()
        };
        assert!(config.system_prompt().is_none());

        config.prompt_enabled = true;
        assert_eq!(config.system_prompt().as_deref(), Some("You are a cat."));
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = WenxinConfig::default();
        config
            .apply_env(env(&[
                ("WENXIN_API_KEY", "bce-v3/abc"),
                ("WENXIN_MODEL", "ernie-speed"),
                ("WENXIN_TEXT_TO_IMAGE", "true"),
                ("WENXIN_CONVERSATION_MAX_TOKENS", "2048"),
                ("WENXIN_EXPIRES_IN_SECONDS", "3600"),
                ("UNRELATED", "ignored"),
            ]))
            .unwrap();

        assert_eq!(config.api_key, "bce-v3/abc");
        assert_eq!(config.resolve_model(), "ernie-speed");
        assert!(config.text_to_image);
        assert_eq!(config.conversation_max_tokens, 2048);
        assert_eq!(config.session_ttl(), Some(Duration::from_secs(3600)));
    }

    #[test]
    fn invalid_env_value_returns_error() {
        let mut config = WenxinConfig::default();
        let result = config.apply_env(env(&[("WENXIN_TEXT_TO_IMAGE", "maybe")]));
        assert!(matches!(result, Err(AgentError::ConfigError { .. })));
    }

    #[test]
    fn validate_requires_api_key() {
        let config = WenxinConfig::default();
        assert!(matches!(
            config.validate(),
            Err(AgentError::MissingApiKey { .. })
        ));

        let config = WenxinConfig {
            api_key: "key".into(),
            ..WenxinConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn load_toml_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("wenxin.toml");
        std::fs::write(
            &path,
            r#"
api_key = "file-key"
wenxin_model = "completions_pro"
prompt_enabled = true
character_desc = "helpful"
text_to_image = true
"#,
        )
        .unwrap();

        let config = WenxinConfig::from_file(&path).unwrap();
        assert_eq!(config.api_key, "file-key");
        assert_eq!(config.resolve_model(), "completions_pro");
        assert_eq!(config.system_prompt().as_deref(), Some("helpful"));
        assert!(config.text_to_image);
        // Unset fields keep their defaults.
        assert_eq!(config.request_timeout_secs, 120);
    }

    #[test]
    fn load_json_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("wenxin.json");
        std::fs::write(&path, r#"{"api_key": "json-key", "expires_in_seconds": 60}"#).unwrap();

        let config = WenxinConfig::from_file(&path).unwrap();
        assert_eq!(config.api_key, "json-key");
        assert_eq!(config.session_ttl(), Some(Duration::from_secs(60)));
    }

    #[test]
    fn malformed_file_returns_config_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "api_key = ").unwrap();

        assert!(matches!(
            WenxinConfig::from_file(&path),
            Err(AgentError::ConfigError { .. })
        ));
    }

    #[test]
    fn redacted_masks_secrets() {
        let config = WenxinConfig {
            api_key: "bce-v3/ALTAK-secret".into(),
            secret_key: "abc".into(),
            ..WenxinConfig::default()
        };
        let shown = config.redacted();
        assert_eq!(shown.api_key, "bce-****");
        assert_eq!(shown.secret_key, "***");
    }

    #[test]
    fn image_config_uses_configured_timeouts() {
        let config = WenxinConfig {
            image_connect_timeout_secs: 2,
            image_read_timeout_secs: 30,
            ..WenxinConfig::default()
        };
        let image = config.image_config();
        assert_eq!(image.connect_timeout, Duration::from_secs(2));
        assert_eq!(image.read_timeout, Duration::from_secs(30));
        assert_eq!(image.model, "irag-1.0");
    }
}
