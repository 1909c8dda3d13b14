use crate::error::{env_error, CalResult};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;

/// Default language-model endpoint
pub const DEFAULT_LLM_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default language-model name
pub const DEFAULT_LLM_MODEL: &str = "gemini-2.0-flash";

/// Default timeout for the language-model call, in seconds
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 30;

/// Generation parameters for the language-model call.
///
/// Low-temperature defaults bias the model toward deterministic extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Sampling temperature
    pub temperature: f64,
    /// Top-k sampling cutoff
    pub top_k: u32,
    /// Top-p (nucleus) sampling cutoff
    pub top_p: f64,
    /// Maximum output tokens
    pub max_output_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            top_k: 1,
            top_p: 0.8,
            max_output_tokens: 8192,
        }
    }
}

/// Partial overrides for generation parameters loaded from the config file
#[derive(Debug, Default, Deserialize)]
struct GenerationOverrides {
    temperature: Option<f64>,
    top_k: Option<u32>,
    top_p: Option<f64>,
    max_output_tokens: Option<u32>,
}

/// Configuration for the language-model extraction service.
///
/// Passed explicitly into the extraction component; the component never
/// reads process-wide state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base endpoint URL for the generative-language service
    pub endpoint: String,
    /// API key; absence makes the primary extraction path fail over to regex
    pub api_key: Option<String>,
    /// Model name
    pub model: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Generation parameters
    pub generation: GenerationParams,
}

/// Main configuration structure for the application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Language-model extraction settings
    pub llm: LlmConfig,
    /// Redis connection URL for the event store
    pub redis_url: String,
}

impl Config {
    /// Load configuration from environment and config file
    pub fn load() -> CalResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        // The API key is optional: without it the extraction pipeline
        // still runs, using the regex fallback only.
        let api_key = env::var("LLM_API_KEY").ok().filter(|k| !k.is_empty());

        let endpoint =
            env::var("LLM_ENDPOINT").unwrap_or_else(|_| String::from(DEFAULT_LLM_ENDPOINT));
        let model = env::var("LLM_MODEL").unwrap_or_else(|_| String::from(DEFAULT_LLM_MODEL));

        let timeout_secs = match env::var("LLM_TIMEOUT_SECS") {
            Ok(raw) => raw
                .parse::<u64>()
                .map_err(|_| env_error("Invalid LLM_TIMEOUT_SECS format"))?,
            Err(_) => DEFAULT_LLM_TIMEOUT_SECS,
        };

        let redis_url =
            env::var("REDIS_URL").unwrap_or_else(|_| String::from("redis://127.0.0.1:6379"));

        // Start from defaults and merge overrides from file if present
        let mut generation = GenerationParams::default();
        if let Ok(content) = fs::read_to_string("config/generation.toml") {
            if let Ok(overrides) = toml::from_str::<GenerationOverrides>(&content) {
                if let Some(temperature) = overrides.temperature {
                    generation.temperature = temperature;
                }
                if let Some(top_k) = overrides.top_k {
                    generation.top_k = top_k;
                }
                if let Some(top_p) = overrides.top_p {
                    generation.top_p = top_p;
                }
                if let Some(max_output_tokens) = overrides.max_output_tokens {
                    generation.max_output_tokens = max_output_tokens;
                }
            }
        }

        Ok(Config {
            llm: LlmConfig {
                endpoint,
                api_key,
                model,
                timeout_secs,
                generation,
            },
            redis_url,
        })
    }
}
