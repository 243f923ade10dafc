use config::{Config, ConfigError};
use serde::Deserialize;
use std::env;
use std::time::Duration;
use validator::Validate;

pub const DEFAULT_API_URL: &str = "http://localhost:5000";
pub const DEFAULT_DB_URL: &str = "";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_RATE_LIMIT_MAX_ATTEMPTS: u32 = 60;
const DEFAULT_RATE_LIMIT_DELAY_MS: u64 = 100;

/// Names of the environment variables read by the resolver.
pub mod vars {
    pub const API_URL: &str = "TEST_API_URL";
    pub const DB_URL: &str = "TEST_DB_URL";
    pub const REQUEST_TIMEOUT_SECS: &str = "TEST_TARGET__REQUEST_TIMEOUT_SECS";
    pub const LOG_LEVEL: &str = "TEST_LOG__LEVEL";
    pub const LOG_FORMAT: &str = "TEST_LOG__FORMAT";
    pub const RATE_LIMIT_MAX_ATTEMPTS: &str = "TEST_RATE_LIMIT__MAX_ATTEMPTS";
    pub const RATE_LIMIT_DELAY_MS: &str = "TEST_RATE_LIMIT__DELAY_MS";
    pub const RATE_LIMIT_REQUIRE_ENFORCEMENT: &str = "TEST_RATE_LIMIT__REQUIRE_ENFORCEMENT";
    pub const RUN_TAGS: &str = "TEST_RUN__TAGS";
    pub const RUN_SKIP_TAGS: &str = "TEST_RUN__SKIP_TAGS";
}

/// Where the application under test lives. Neither URL is checked for
/// well-formedness; a bad value shows up as a transport failure.
#[derive(Debug, Deserialize, Clone)]
pub struct TargetConfig {
    pub base_url: String,
    pub db_url: String,
    /// Per-request timeout in seconds, 0 disables it.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl TargetConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }
}

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct LogConfig {
    #[validate(length(min = 1))]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl LogConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct RateLimitProbeConfig {
    #[validate(range(min = 1))]
    pub max_attempts: u32,
    pub delay_ms: u64,
    /// When set, the probe only passes if the target actually answers 429.
    #[serde(default)]
    pub require_enforcement: bool,
}

impl RateLimitProbeConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Tag filters applied by the runner. Both are comma separated lists.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct RunConfig {
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub skip_tags: String,
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
        .collect()
}

impl RunConfig {
    pub fn tag_list(&self) -> Vec<String> {
        split_list(&self.tags)
    }

    pub fn skip_tag_list(&self) -> Vec<String> {
        split_list(&self.skip_tags)
    }
}

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct HarnessConfig {
    pub target: TargetConfig,
    #[validate(nested)]
    pub log: LogConfig,
    #[validate(nested)]
    pub rate_limit: RateLimitProbeConfig,
    #[serde(default)]
    pub run: RunConfig,
}

fn parse_bool(value: &str) -> bool {
    let lower = value.to_lowercase();
    matches!(lower.as_str(), "true" | "1" | "yes" | "on")
}

fn parse_number(name: &str, value: &str) -> Result<i64, ConfigError> {
    let invalid = |reason: String| {
        ConfigError::Message(format!(
            "Invalid value '{}' for {}: {}. Expected a non-negative integer.",
            value, name, reason
        ))
    };
    let parsed = value
        .trim()
        .parse::<i64>()
        .map_err(|e| invalid(e.to_string()))?;
    if parsed < 0 {
        return Err(invalid("value is negative".to_string()));
    }
    Ok(parsed)
}

fn number_override(name: &str) -> Result<Option<i64>, ConfigError> {
    env::var(name)
        .ok()
        .map(|v| parse_number(name, &v))
        .transpose()
}

impl HarnessConfig {
    /// Loads `.env` (if any) and then resolves from the process environment.
    pub fn new() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("target.base_url", DEFAULT_API_URL)?
            .set_default("target.db_url", DEFAULT_DB_URL)?
            .set_default("target.request_timeout_secs", DEFAULT_REQUEST_TIMEOUT_SECS)?
            .set_default("log.level", "info")?
            .set_default("log.format", "pretty")?
            .set_default("rate_limit.max_attempts", DEFAULT_RATE_LIMIT_MAX_ATTEMPTS as i64)?
            .set_default("rate_limit.delay_ms", DEFAULT_RATE_LIMIT_DELAY_MS)?
            .set_default("rate_limit.require_enforcement", false)?
            .set_default("run.tags", "")?
            .set_default("run.skip_tags", "")?
            .set_override_option("target.base_url", env::var(vars::API_URL).ok())?
            .set_override_option("target.db_url", env::var(vars::DB_URL).ok())?
            .set_override_option(
                "target.request_timeout_secs",
                number_override(vars::REQUEST_TIMEOUT_SECS)?,
            )?
            .set_override_option("log.level", env::var(vars::LOG_LEVEL).ok())?
            .set_override_option("log.format", env::var(vars::LOG_FORMAT).ok())?
            .set_override_option(
                "rate_limit.max_attempts",
                number_override(vars::RATE_LIMIT_MAX_ATTEMPTS)?,
            )?
            .set_override_option(
                "rate_limit.delay_ms",
                number_override(vars::RATE_LIMIT_DELAY_MS)?,
            )?
            .set_override_option(
                "rate_limit.require_enforcement",
                env::var(vars::RATE_LIMIT_REQUIRE_ENFORCEMENT)
                    .ok()
                    .map(|v| parse_bool(&v)),
            )?
            .set_override_option("run.tags", env::var(vars::RUN_TAGS).ok())?
            .set_override_option("run.skip_tags", env::var(vars::RUN_SKIP_TAGS).ok())?
            .build()?;

        let config: HarnessConfig = s.try_deserialize()?;

        if let Err(e) = config.validate() {
            return Err(ConfigError::Message(format!("Validation error: {}", e)));
        }

        Ok(config)
    }

    /// Configuration pointing at `base_url` with every other knob at its
    /// default. Used to aim the harness at an in-process fake.
    pub fn for_target(base_url: impl Into<String>) -> Self {
        Self {
            target: TargetConfig {
                base_url: base_url.into(),
                db_url: DEFAULT_DB_URL.to_string(),
                request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            },
            log: LogConfig {
                level: "info".to_string(),
                format: default_log_format(),
            },
            rate_limit: RateLimitProbeConfig {
                max_attempts: DEFAULT_RATE_LIMIT_MAX_ATTEMPTS,
                delay_ms: DEFAULT_RATE_LIMIT_DELAY_MS,
                require_enforcement: false,
            },
            run: RunConfig::default(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.target.base_url
    }

    pub fn db_url(&self) -> &str {
        &self.target.db_url
    }
}
