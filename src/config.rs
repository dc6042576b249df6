use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_OCR_MODEL: &str = "paddleocr-en";
const DEFAULT_SUMMARIZATION_MODEL: &str = "facebook/bart-large-cnn";
const DEFAULT_DOCUMENT_QA_MODEL: &str = "naver-clova-ix/donut-base-finetuned-docvqa";
const DEFAULT_INFERENCE_TIMEOUT_SECS: u64 = 120;
const DEFAULT_UPLOAD_MAX_AGE_SECS: u64 = 60 * 60;
const DEFAULT_UPLOAD_SWEEP_INTERVAL_SECS: u64 = 10 * 60;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the document service.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Base URL of the inference runtime hosting the OCR, summarization, and DocVQA models.
    pub inference_url: String,
    /// Model identifier used for OCR.
    pub ocr_model: String,
    /// Model identifier used for abstractive summaries.
    pub summarization_model: String,
    /// Model identifier used for document question answering.
    pub document_qa_model: String,
    /// Per-request timeout applied to inference calls, in seconds.
    pub inference_timeout_secs: u64,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
    /// Directory holding uploaded files that the cleanup task sweeps.
    pub upload_dir: Option<PathBuf>,
    /// Age after which an uploaded file is deleted, in seconds.
    pub upload_max_age_secs: u64,
    /// Interval between cleanup sweeps, in seconds.
    pub upload_sweep_interval_secs: u64,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            inference_url: load_env("INFERENCE_URL")?,
            ocr_model: load_env_optional("OCR_MODEL")
                .unwrap_or_else(|| DEFAULT_OCR_MODEL.to_string()),
            summarization_model: load_env_optional("SUMMARIZATION_MODEL")
                .unwrap_or_else(|| DEFAULT_SUMMARIZATION_MODEL.to_string()),
            document_qa_model: load_env_optional("DOCUMENT_QA_MODEL")
                .unwrap_or_else(|| DEFAULT_DOCUMENT_QA_MODEL.to_string()),
            inference_timeout_secs: parse_optional("INFERENCE_TIMEOUT_SECS")?
                .unwrap_or(DEFAULT_INFERENCE_TIMEOUT_SECS),
            server_port: parse_optional("SERVER_PORT")?,
            upload_dir: load_env_optional("UPLOAD_DIR").map(PathBuf::from),
            upload_max_age_secs: parse_optional("UPLOAD_MAX_AGE_SECS")?
                .unwrap_or(DEFAULT_UPLOAD_MAX_AGE_SECS),
            upload_sweep_interval_secs: parse_optional("UPLOAD_SWEEP_INTERVAL_SECS")?
                .unwrap_or(DEFAULT_UPLOAD_SWEEP_INTERVAL_SECS),
        })
    }

    /// Build a configuration pointing at the given runtime with every other field defaulted.
    pub fn with_inference_url(inference_url: impl Into<String>) -> Self {
        Self {
            inference_url: inference_url.into(),
            ocr_model: DEFAULT_OCR_MODEL.to_string(),
            summarization_model: DEFAULT_SUMMARIZATION_MODEL.to_string(),
            document_qa_model: DEFAULT_DOCUMENT_QA_MODEL.to_string(),
            inference_timeout_secs: DEFAULT_INFERENCE_TIMEOUT_SECS,
            server_port: None,
            upload_dir: None,
            upload_max_age_secs: DEFAULT_UPLOAD_MAX_AGE_SECS,
            upload_sweep_interval_secs: DEFAULT_UPLOAD_SWEEP_INTERVAL_SECS,
        }
    }

    /// Timeout applied to each inference request.
    pub fn inference_timeout(&self) -> Duration {
        Duration::from_secs(self.inference_timeout_secs)
    }
}

fn load_env(key: &str) -> Result<String, ConfigError> {
    load_env_optional(key).ok_or_else(|| ConfigError::MissingVariable(key.to_string()))
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_optional<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    load_env_optional(key)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key.to_string()))
        })
        .transpose()
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() {
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("Failed to load config from environment");
    tracing::debug!(
        inference_url = %config.inference_url,
        ocr_model = %config.ocr_model,
        summarization_model = %config.summarization_model,
        document_qa_model = %config.document_qa_model,
        server_port = ?config.server_port,
        upload_dir = ?config.upload_dir,
        "Loaded configuration"
    );
    CONFIG.set(config).expect("Failed to set config");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_optional_fields() {
        let config = Config::with_inference_url("http://127.0.0.1:9000");
        assert_eq!(config.summarization_model, DEFAULT_SUMMARIZATION_MODEL);
        assert_eq!(config.inference_timeout(), Duration::from_secs(120));
        assert!(config.upload_dir.is_none());
    }

    #[test]
    fn parse_optional_rejects_garbage() {
        // SAFETY: the variable name is unique to this test.
        unsafe { env::set_var("DOCQA_TEST_BAD_PORT", "not-a-port") };
        let result: Result<Option<u16>, _> = parse_optional("DOCQA_TEST_BAD_PORT");
        assert!(matches!(result, Err(ConfigError::InvalidValue(key)) if key == "DOCQA_TEST_BAD_PORT"));
    }

    #[test]
    fn blank_values_are_treated_as_missing() {
        // SAFETY: the variable name is unique to this test.
        unsafe { env::set_var("DOCQA_TEST_BLANK", "   ") };
        assert!(load_env_optional("DOCQA_TEST_BLANK").is_none());
        assert!(matches!(
            load_env("DOCQA_TEST_BLANK"),
            Err(ConfigError::MissingVariable(_))
        ));
    }
}
