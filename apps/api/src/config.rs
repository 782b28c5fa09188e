use anyhow::{bail, Context, Result};

use crate::bias::EngineConfig;

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Upper bound on candidates accepted in one request.
    pub max_candidates: usize,
    pub significance_alpha: f64,
    pub allow_synthetic_outcomes: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            rust_log: "info".to_string(),
            max_candidates: 10_000,
            significance_alpha: 0.05,
            allow_synthetic_outcomes: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();
        let significance_alpha = parse_env("SIGNIFICANCE_ALPHA", defaults.significance_alpha)?;
        if !(significance_alpha > 0.0 && significance_alpha < 1.0) {
            bail!("SIGNIFICANCE_ALPHA must be between 0 and 1 (exclusive), got {significance_alpha}");
        }

        Ok(Config {
            port: parse_env("PORT", defaults.port).context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or(defaults.rust_log),
            max_candidates: parse_env("MAX_CANDIDATES", defaults.max_candidates)?,
            significance_alpha,
            allow_synthetic_outcomes: parse_env(
                "ALLOW_SYNTHETIC_OUTCOMES",
                defaults.allow_synthetic_outcomes,
            )?,
        })
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            significance_alpha: self.significance_alpha,
            allow_synthetic_outcomes: self.allow_synthetic_outcomes,
            ..EngineConfig::default()
        }
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Environment variable '{key}' is invalid: {e}")),
        Err(_) => Ok(default),
    }
}
