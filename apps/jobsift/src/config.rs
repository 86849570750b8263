use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::filters::FilterSettings;
use crate::llm_client::{anthropic, openrouter, ReasoningGateway, ReasoningProvider, RetryPolicy};
use crate::pipeline::PipelineConfig;
use crate::scoring::{AssessmentMode, RubricScorer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Anthropic,
    OpenRouter,
}

impl FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "anthropic" => Ok(ProviderKind::Anthropic),
            "openrouter" => Ok(ProviderKind::OpenRouter),
            other => bail!("LLM_PROVIDER must be 'anthropic' or 'openrouter', got '{other}'"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Fails at startup if the provider's API key is missing or a value does not parse.
#[derive(Debug, Clone)]
pub struct Config {
    pub provider: ProviderKind,
    pub api_key: String,
    pub fast_model: String,
    pub structured_model: String,
    pub retry: RetryPolicy,
    pub pipeline: PipelineConfig,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(&lookup);

        let provider = match env.get("LLM_PROVIDER") {
            Some(raw) => raw.parse::<ProviderKind>()?,
            None => ProviderKind::Anthropic,
        };
        let (api_key, fast_default, structured_default) = match provider {
            ProviderKind::Anthropic => (
                env.require("ANTHROPIC_API_KEY")?,
                anthropic::DEFAULT_FAST_MODEL,
                anthropic::DEFAULT_STRUCTURED_MODEL,
            ),
            ProviderKind::OpenRouter => (
                env.require("OPENROUTER_API_KEY")?,
                openrouter::DEFAULT_FAST_MODEL,
                openrouter::DEFAULT_STRUCTURED_MODEL,
            ),
        };

        let defaults = RetryPolicy::default();
        let retry = RetryPolicy {
            max_attempts: env.parse_or("LLM_MAX_ATTEMPTS", defaults.max_attempts)?.max(1),
            base_delay: Duration::from_millis(
                env.parse_or("LLM_BASE_DELAY_MS", defaults.base_delay.as_millis() as u64)?,
            ),
            call_timeout: Duration::from_secs(
                env.parse_or("LLM_CALL_TIMEOUT_SECS", defaults.call_timeout.as_secs())?,
            ),
        };

        let filter_defaults = FilterSettings::default();
        let filters = FilterSettings {
            min_description_chars: env
                .parse_or("MIN_DESCRIPTION_CHARS", filter_defaults.min_description_chars)?,
            dedup_threshold: env.parse_or("DEDUP_THRESHOLD", filter_defaults.dedup_threshold)?,
            title_match_threshold: env.parse_opt("TITLE_MATCH_THRESHOLD")?,
        };
        if !(0.0..=1.0).contains(&filters.dedup_threshold) {
            bail!("DEDUP_THRESHOLD must be between 0 and 1");
        }

        let scorer_defaults = RubricScorer::default();
        let mode = match env.get("ASSESSMENT_MODE") {
            Some(raw) => raw
                .parse::<AssessmentMode>()
                .map_err(anyhow::Error::msg)
                .context("ASSESSMENT_MODE is invalid")?,
            None => scorer_defaults.mode,
        };
        let scorer = RubricScorer::new(
            mode,
            env.parse_or("RETENTION_THRESHOLD", scorer_defaults.retention_threshold)?,
        );

        let pipeline_defaults = PipelineConfig::default();
        let pipeline = PipelineConfig {
            filters,
            scorer,
            recency_window_days: env
                .parse_or("RECENCY_WINDOW_DAYS", pipeline_defaults.recency_window_days)?,
            max_postings: env.parse_opt("MAX_POSTINGS")?,
            max_concurrency: env
                .parse_or("MAX_CONCURRENCY", pipeline_defaults.max_concurrency)?
                .max(1),
            enrich: pipeline_defaults.enrich,
        };

        Ok(Config {
            provider,
            api_key,
            fast_model: env
                .get("LLM_MODEL_FAST")
                .unwrap_or_else(|| fast_default.to_string()),
            structured_model: env
                .get("LLM_MODEL_STRUCTURED")
                .unwrap_or_else(|| structured_default.to_string()),
            retry,
            pipeline,
            port: env
                .get("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env.get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }

    pub fn build_gateway(&self) -> ReasoningGateway {
        let provider: Arc<dyn ReasoningProvider> = match self.provider {
            ProviderKind::Anthropic => Arc::new(anthropic::AnthropicProvider::new(
                self.api_key.clone(),
                self.fast_model.clone(),
                self.structured_model.clone(),
                self.retry.call_timeout,
            )),
            ProviderKind::OpenRouter => Arc::new(openrouter::OpenRouterProvider::new(
                self.api_key.clone(),
                self.fast_model.clone(),
                self.structured_model.clone(),
                self.retry.call_timeout,
            )),
        };
        ReasoningGateway::new(provider, self.retry)
    }
}

struct Env<'a, F>(&'a F);

impl<F> Env<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Unset and blank values both count as absent.
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    fn require(&self, key: &str) -> Result<String> {
        self.get(key)
            .with_context(|| format!("Required environment variable '{key}' is not set"))
    }

    fn parse_opt<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        self.get(key)
            .map(|raw| {
                raw.trim()
                    .parse::<T>()
                    .with_context(|| format!("{key} has an invalid value '{raw}'"))
            })
            .transpose()
    }

    fn parse_or<T>(&self, key: &str, default: T) -> Result<T>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        Ok(self.parse_opt(key)?.unwrap_or(default))
    }
}
