pub mod ollama;
pub mod openai;

pub use ollama::OllamaClient;
pub use openai::OpenAiClient;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Cannot connect to language model at {0}")]
    Connection(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Model service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("Missing API key")]
    MissingApiKey,
}

/// One prompt in, one answer out.
pub trait LlmGenerate {
    fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}

/// Classify a transport failure the same way for every backend.
pub(crate) fn transport_error(err: reqwest::Error, base_url: &str, timeout_secs: u64) -> LlmError {
    if err.is_connect() {
        LlmError::Connection(base_url.to_string())
    } else if err.is_timeout() {
        LlmError::Timeout(timeout_secs)
    } else {
        LlmError::HttpClient(err.to_string())
    }
}

pub(crate) fn build_http_client(timeout_secs: u64) -> Result<reqwest::blocking::Client, LlmError> {
    reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| LlmError::HttpClient(e.to_string()))
}

/// Canned-answer generator for tests. Records every prompt it receives.
#[cfg(test)]
pub(crate) struct MockLlm {
    pub answer: String,
    pub prompts: std::cell::RefCell<Vec<String>>,
}

#[cfg(test)]
impl MockLlm {
    pub fn new(answer: &str) -> Self {
        Self {
            answer: answer.to_string(),
            prompts: std::cell::RefCell::new(Vec::new()),
        }
    }
}

#[cfg(test)]
impl LlmGenerate for MockLlm {
    fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.prompts.borrow_mut().push(prompt.to_string());
        Ok(self.answer.clone())
    }
}
