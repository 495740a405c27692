use crate::errors::AppError;

pub const DEFAULT_MODEL_ID: &str = "openai/gpt-oss-20b";
pub const DEFAULT_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const DEFAULT_TEMPERATURE: f32 = 0.2;
const DEFAULT_MAX_TOKENS: u32 = 5000;

/// Settings consumed by the backend client and the resilient invoker.
/// Passed in explicitly; invocation code never reads the environment.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub api_key: String,
    pub api_url: String,
    pub model_id: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Application configuration loaded from environment variables.
/// Fails at startup if the credential is missing or a numeric value is invalid.
#[derive(Debug, Clone)]
pub struct Config {
    pub llm: LlmSettings,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration against an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("GROQ_API_KEY")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| {
                AppError::Configuration("Missing environment variables: GROQ_API_KEY".to_string())
            })?;

        let temperature = match lookup("GROQ_TEMPERATURE") {
            Some(raw) => parse_temperature(&raw)?,
            None => DEFAULT_TEMPERATURE,
        };

        let max_tokens = match lookup("GROQ_MAX_TOKENS") {
            Some(raw) => parse_max_tokens(&raw)?,
            None => DEFAULT_MAX_TOKENS,
        };

        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| {
                AppError::Configuration(format!("PORT must be a valid port number, got '{raw}'"))
            })?,
            None => 8080,
        };

        Ok(Config {
            llm: LlmSettings {
                api_key,
                api_url: lookup("GROQ_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
                model_id: lookup("GROQ_MODEL_ID").unwrap_or_else(|| DEFAULT_MODEL_ID.to_string()),
                temperature,
                max_tokens,
            },
            port,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn parse_temperature(raw: &str) -> Result<f32, AppError> {
    let value = raw.trim().parse::<f32>().map_err(|_| {
        AppError::Configuration(format!("GROQ_TEMPERATURE must be a number, got '{raw}'"))
    })?;
    if !value.is_finite() || !(0.0..=2.0).contains(&value) {
        return Err(AppError::Configuration(format!(
            "GROQ_TEMPERATURE must be between 0 and 2, got {value}"
        )));
    }
    Ok(value)
}

fn parse_max_tokens(raw: &str) -> Result<u32, AppError> {
    let value = raw.trim().parse::<i64>().map_err(|_| {
        AppError::Configuration(format!("GROQ_MAX_TOKENS must be an integer, got '{raw}'"))
    })?;
    if value <= 0 {
        return Err(AppError::Configuration(
            "GROQ_MAX_TOKENS must be > 0".to_string(),
        ));
    }
    u32::try_from(value).map_err(|_| {
        AppError::Configuration(format!("GROQ_MAX_TOKENS is too large: {value}"))
    })
}
