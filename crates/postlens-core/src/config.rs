use std::path::PathBuf;
use std::str::FromStr;

use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can pass a `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let env = parse_environment(&or_default("POSTLENS_ENV", "development"))?;
    let log_level = or_default("POSTLENS_LOG_LEVEL", "info");
    let data_dir = PathBuf::from(or_default("POSTLENS_DATA_DIR", "./data"));
    let tei_embed_url = or_default("POSTLENS_TEI_EMBED_URL", "http://localhost:8080");
    let tei_sentiment_url = or_default("POSTLENS_TEI_SENTIMENT_URL", "http://localhost:8081");

    let embedding_dim: usize = parse_value(&or_default, "POSTLENS_EMBEDDING_DIM", "384")?;
    let cluster_count: usize = parse_value(&or_default, "POSTLENS_CLUSTER_COUNT", "5")?;
    if cluster_count == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "POSTLENS_CLUSTER_COUNT".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    let cluster_seed: u64 = parse_value(&or_default, "POSTLENS_CLUSTER_SEED", "42")?;
    let focus_profile = optional("POSTLENS_FOCUS_PROFILE");
    let include_relative_dates = parse_bool(
        "POSTLENS_INCLUDE_RELATIVE_DATES",
        &or_default("POSTLENS_INCLUDE_RELATIVE_DATES", "true"),
    )?;
    let request_timeout_secs: u64 = parse_value(&or_default, "POSTLENS_REQUEST_TIMEOUT_SECS", "60")?;

    let llm_api_key = optional("GROQ_API_KEY");
    let llm_base_url = or_default("POSTLENS_LLM_BASE_URL", "https://api.groq.com/openai/v1");
    let llm_model = or_default("POSTLENS_LLM_MODEL", "llama-3.3-70b-versatile");
    let llm_max_tokens: u32 = parse_value(&or_default, "POSTLENS_LLM_MAX_TOKENS", "1500")?;
    let llm_temperature: f32 = parse_value(&or_default, "POSTLENS_LLM_TEMPERATURE", "0.7")?;
    let llm_max_retries: u32 = parse_value(&or_default, "POSTLENS_LLM_MAX_RETRIES", "2")?;
    let author = or_default("POSTLENS_AUTHOR", "the profile owner");

    Ok(AppConfig {
        env,
        log_level,
        data_dir,
        tei_embed_url,
        tei_sentiment_url,
        embedding_dim,
        cluster_count,
        cluster_seed,
        focus_profile,
        include_relative_dates,
        request_timeout_secs,
        llm_api_key,
        llm_base_url,
        llm_model,
        llm_max_tokens,
        llm_temperature,
        llm_max_retries,
        author,
    })
}

fn parse_value<T, D>(or_default: &D, var: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    D: Fn(&str, &str) -> String,
{
    let raw = or_default(var, default);
    raw.trim().parse::<T>().map_err(|e| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason: e.to_string(),
    })
}

fn parse_bool(var: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("expected a boolean, got \"{other}\""),
        }),
    }
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "POSTLENS_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
