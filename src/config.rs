use std::path::PathBuf;

use thiserror::Error;

use crate::llm::{openai, ollama, LlmError, LlmGenerate, OllamaClient, OpenAiClient};
use crate::prompt::PromptTemplate;

/// Application-level constants
pub const APP_NAME: &str = "PediCare";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Seconds before an LLM request is abandoned.
pub const LLM_TIMEOUT_SECS: u64 = 120;

/// Get the application data directory
/// ~/PediCare/ on all platforms, falling back to the working directory
/// when no home directory is known.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Default record store location.
pub fn database_path() -> PathBuf {
    app_data_dir().join("pedicare.db")
}

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "pedicare=info,pedicare_lib=info"
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unknown LLM provider {0:?} (expected ollama, openai or none)")]
    UnknownProvider(String),

    #[error("OPENAI_API_KEY is required for the openai provider")]
    MissingApiKey,

    #[error("Cannot read prompt template {path}: {source}")]
    Template {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Which language model answers questions, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LlmProvider {
    None,
    Ollama {
        url: String,
        model: String,
    },
    OpenAi {
        api_key: String,
        base_url: String,
        model: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub llm: LlmProvider,
    /// Replacement for the bundled prompt template.
    pub prompt_template: Option<PathBuf>,
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let db_path = get("PEDICARE_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(database_path);

        let api_key = get("OPENAI_API_KEY");
        let provider = get("PEDICARE_LLM").map(|p| p.to_lowercase());
        let llm = match provider.as_deref() {
            Some("none") => LlmProvider::None,
            Some("ollama") => LlmProvider::Ollama {
                url: get("OLLAMA_URL").unwrap_or_else(|| ollama::DEFAULT_OLLAMA_URL.into()),
                model: get("OLLAMA_MODEL").unwrap_or_else(|| ollama::DEFAULT_OLLAMA_MODEL.into()),
            },
            Some("openai") | None => match api_key {
                Some(api_key) => LlmProvider::OpenAi {
                    api_key,
                    base_url: get("OPENAI_BASE_URL")
                        .unwrap_or_else(|| openai::DEFAULT_OPENAI_URL.into()),
                    model: get("OPENAI_MODEL")
                        .unwrap_or_else(|| openai::DEFAULT_OPENAI_MODEL.into()),
                },
                None if provider.is_some() => return Err(ConfigError::MissingApiKey),
                None => LlmProvider::None,
            },
            Some(other) => return Err(ConfigError::UnknownProvider(other.to_string())),
        };

        Ok(Self {
            database_path: db_path,
            llm,
            prompt_template: get("PEDICARE_PROMPT_TEMPLATE").map(PathBuf::from),
        })
    }

    /// The configured template, or the bundled one.
    pub fn load_template(&self) -> Result<PromptTemplate, ConfigError> {
        match &self.prompt_template {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Template {
                    path: path.clone(),
                    source,
                })?;
                tracing::info!(path = %path.display(), "Using custom prompt template");
                Ok(PromptTemplate::new(text))
            }
            None => Ok(PromptTemplate::pediatric_care()),
        }
    }

    /// Client for the configured provider; `None` when no model is configured.
    pub fn llm_client(&self) -> Result<Option<Box<dyn LlmGenerate>>, LlmError> {
        let client: Box<dyn LlmGenerate> = match &self.llm {
            LlmProvider::None => return Ok(None),
            LlmProvider::Ollama { url, model } => {
                Box::new(OllamaClient::new(url, model, LLM_TIMEOUT_SECS)?)
            }
            LlmProvider::OpenAi {
                api_key,
                base_url,
                model,
            } => Box::new(OpenAiClient::new(base_url, api_key, model, LLM_TIMEOUT_SECS)?),
        };
        Ok(Some(client))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn app_data_dir_named_after_app() {
        assert!(app_data_dir().ends_with("PediCare"));
        assert!(database_path().starts_with(app_data_dir()));
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn defaults_without_environment() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.database_path, database_path());
        assert_eq!(cfg.llm, LlmProvider::None);
        assert!(cfg.prompt_template.is_none());
    }

    #[test]
    fn api_key_alone_selects_openai() {
        let cfg = config(&[("OPENAI_API_KEY", "sk-test")]).unwrap();
        assert_eq!(
            cfg.llm,
            LlmProvider::OpenAi {
                api_key: "sk-test".into(),
                base_url: "https://api.openai.com".into(),
                model: "gpt-4o-mini".into(),
            }
        );
    }

    #[test]
    fn explicit_none_wins_over_key() {
        let cfg = config(&[("PEDICARE_LLM", "none"), ("OPENAI_API_KEY", "sk-test")]).unwrap();
        assert_eq!(cfg.llm, LlmProvider::None);
    }

    #[test]
    fn ollama_with_overrides() {
        let cfg = config(&[
            ("PEDICARE_LLM", "Ollama"),
            ("OLLAMA_URL", "http://gpu-box:11434"),
            ("OLLAMA_MODEL", "medllama"),
            ("PEDICARE_DB_PATH", "/tmp/kids.db"),
        ])
        .unwrap();
        assert_eq!(
            cfg.llm,
            LlmProvider::Ollama {
                url: "http://gpu-box:11434".into(),
                model: "medllama".into(),
            }
        );
        assert_eq!(cfg.database_path, PathBuf::from("/tmp/kids.db"));
    }

    #[test]
    fn openai_without_key_is_error() {
        assert!(matches!(
            config(&[("PEDICARE_LLM", "openai")]),
            Err(ConfigError::MissingApiKey)
        ));
    }

    #[test]
    fn unknown_provider_is_error() {
        assert!(matches!(
            config(&[("PEDICARE_LLM", "claude")]),
            Err(ConfigError::UnknownProvider(p)) if p == "claude"
        ));
    }

    #[test]
    fn custom_template_loaded_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.txt");
        std::fs::write(&path, "Q: {query}").unwrap();

        let cfg = AppConfig {
            prompt_template: Some(path),
            ..config(&[]).unwrap()
        };
        assert_eq!(cfg.load_template().unwrap().text(), "Q: {query}");
    }

    #[test]
    fn missing_template_file_is_error() {
        let cfg = AppConfig {
            prompt_template: Some(PathBuf::from("/nonexistent/template.txt")),
            ..config(&[]).unwrap()
        };
        assert!(matches!(cfg.load_template(), Err(ConfigError::Template { .. })));
    }

    #[test]
    fn no_provider_means_no_client() {
        assert!(config(&[]).unwrap().llm_client().unwrap().is_none());
    }
}
