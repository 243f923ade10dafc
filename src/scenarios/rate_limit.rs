// Public API rate limiting probe.
//
// Sends the same small translation until the target answers 429 or the
// attempt budget runs out. By default the probe passes when the endpoint
// either served requests or throttled them, since test deployments often
// run with the limiter off; `require_enforcement` demands a 429.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use tracing::{info, warn};

use super::{paths, Outcome, Scenario, ScenarioContext, Tag};
use crate::config::RateLimitProbeConfig;
use crate::error::{HarnessError, HarnessResult};
use crate::models::TranslateRequest;
use crate::session::Session;

/// What the probe saw.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProbeTally {
    pub attempts: u32,
    pub successes: u32,
    pub rate_limited: bool,
    pub other_statuses: Vec<u16>,
}

impl ProbeTally {
    pub fn verdict(&self, require_enforcement: bool) -> HarnessResult<()> {
        if self.rate_limited {
            return Ok(());
        }
        if require_enforcement {
            return Err(HarnessError::RateLimitNotObserved {
                attempts: self.attempts,
                successes: self.successes,
            });
        }
        if self.successes > 0 {
            return Ok(());
        }
        Err(HarnessError::RateLimitProbeInconclusive {
            attempts: self.attempts,
            last_status: self
                .other_statuses
                .last()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "none".to_string()),
        })
    }

    pub fn summary(&self) -> String {
        if self.rate_limited {
            format!(
                "rate limited after {} successful requests ({} attempts)",
                self.successes, self.attempts
            )
        } else {
            format!(
                "{} of {} requests succeeded, no 429 seen",
                self.successes, self.attempts
            )
        }
    }
}

/// Runs the bounded probe loop. Transport failures abort the probe.
pub async fn probe(session: &Session, config: &RateLimitProbeConfig) -> HarnessResult<ProbeTally> {
    let request = TranslateRequest::new("Test", "en-US", "es-ES");
    let mut tally = ProbeTally::default();

    for attempt in 1..=config.max_attempts {
        let response = session.post_json(paths::PUBLIC_TRANSLATE, &request).await?;
        tally.attempts = attempt;

        match response.status() {
            StatusCode::OK => tally.successes += 1,
            StatusCode::TOO_MANY_REQUESTS => {
                info!(attempt, successes = tally.successes, "Rate limit reached");
                tally.rate_limited = true;
                break;
            }
            other => {
                warn!(attempt, status = other.as_u16(), "Unexpected status while probing rate limit");
                tally.other_statuses.push(other.as_u16());
            }
        }

        if attempt < config.max_attempts {
            tokio::time::sleep(config.delay()).await;
        }
    }

    Ok(tally)
}

pub struct RateLimitProbe;

#[async_trait]
impl Scenario for RateLimitProbe {
    fn name(&self) -> &'static str {
        "rate_limit_probe"
    }

    fn tags(&self) -> &'static [Tag] {
        &[Tag::Api, Tag::Slow]
    }

    async fn run(&self, ctx: &ScenarioContext<'_>) -> HarnessResult<Outcome> {
        let session = ctx.public_session()?;
        let tally = probe(&session, &ctx.config.rate_limit).await?;
        tally.verdict(ctx.config.rate_limit.require_enforcement)?;
        Ok(Outcome::with_note(tally.summary()))
    }
}
