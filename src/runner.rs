use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

use crate::config::HarnessConfig;
use crate::error::HarnessResult;
use crate::scenarios::{Scenario, ScenarioContext, Tag};
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioStatus {
    Passed,
    Failed,
    Skipped,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioResult {
    pub name: String,
    pub tags: Vec<Tag>,
    pub status: ScenarioStatus,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// HTTP status captured by the failing check, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub target: String,
    pub results: Vec<ScenarioResult>,
}

impl RunReport {
    fn count(&self, status: ScenarioStatus) -> usize {
        self.results.iter().filter(|r| r.status == status).count()
    }

    pub fn passed(&self) -> usize {
        self.count(ScenarioStatus::Passed)
    }

    pub fn failed(&self) -> usize {
        self.count(ScenarioStatus::Failed)
    }

    pub fn skipped(&self) -> usize {
        self.count(ScenarioStatus::Skipped)
    }

    /// True when nothing failed. A run where everything was skipped counts.
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    pub fn result(&self, name: &str) -> Option<&ScenarioResult> {
        self.results.iter().find(|r| r.name == name)
    }

    pub fn render_text(&self) -> String {
        let mut lines = vec![format!("Run {} against {}", self.run_id, self.target)];
        for r in &self.results {
            let mark = match r.status {
                ScenarioStatus::Passed => "PASS",
                ScenarioStatus::Failed => "FAIL",
                ScenarioStatus::Skipped => "SKIP",
            };
            let mut line = format!("{mark} {} ({} ms)", r.name, r.duration_ms);
            if let Some(note) = &r.note {
                line.push_str(&format!(" - {note}"));
            }
            if let Some(err) = &r.error {
                line.push_str(&format!("\n     {err}"));
            }
            lines.push(line);
        }
        lines.push(format!(
            "{} passed, {} failed, {} skipped",
            self.passed(),
            self.failed(),
            self.skipped()
        ));
        lines.join("\n")
    }
}

/// Runs scenarios one after another against a single target. The shared
/// session (and its cookie jar) lives as long as the runner, so scenarios
/// are never run concurrently.
pub struct Runner {
    config: Arc<HarnessConfig>,
    shared: Session,
}

impl Runner {
    pub fn new(config: Arc<HarnessConfig>) -> HarnessResult<Self> {
        let shared = Session::shared(&config)?;
        Ok(Self { config, shared })
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Reason to skip, or None when the scenario should run. `names`
    /// restricts the run when non-empty.
    fn skip_reason(&self, scenario: &dyn Scenario, names: &[String]) -> Option<String> {
        if !names.is_empty() && !names.iter().any(|n| n == scenario.name()) {
            return Some("not selected".to_string());
        }

        let wanted = self.config.run.tag_list();
        if !wanted.is_empty() && !wanted.iter().any(|t| scenario.has_tag(t)) {
            return Some(format!("no tag in [{}]", wanted.join(", ")));
        }

        self.config
            .run
            .skip_tag_list()
            .into_iter()
            .find(|t| scenario.has_tag(t))
            .map(|t| format!("tagged {t}"))
    }

    pub async fn run(&self, scenarios: &[Box<dyn Scenario>]) -> RunReport {
        self.run_selected(scenarios, &[]).await
    }

    pub async fn run_selected(
        &self,
        scenarios: &[Box<dyn Scenario>],
        names: &[String],
    ) -> RunReport {
        let report_id = Uuid::new_v4();
        let started_at = Utc::now();
        info!(run_id = %report_id, target = %self.config.base_url(), "Starting conformance run");

        let ctx = ScenarioContext {
            config: &self.config,
            shared: &self.shared,
        };

        let mut results = Vec::with_capacity(scenarios.len());
        for scenario in scenarios {
            let tags = scenario.tags().to_vec();

            if let Some(reason) = self.skip_reason(scenario.as_ref(), names) {
                info!(scenario = scenario.name(), %reason, "Skipping scenario");
                results.push(ScenarioResult {
                    name: scenario.name().to_string(),
                    tags,
                    status: ScenarioStatus::Skipped,
                    duration_ms: 0,
                    note: Some(reason),
                    error: None,
                    http_status: None,
                });
                continue;
            }

            let span = info_span!("scenario", name = scenario.name());
            let start = Instant::now();
            let outcome = scenario.run(&ctx).instrument(span).await;
            let duration_ms = start.elapsed().as_millis() as u64;

            let result = match outcome {
                Ok(outcome) => {
                    info!(scenario = scenario.name(), duration_ms, "Scenario passed");
                    ScenarioResult {
                        name: scenario.name().to_string(),
                        tags,
                        status: ScenarioStatus::Passed,
                        duration_ms,
                        note: outcome.note,
                        error: None,
                        http_status: None,
                    }
                }
                Err(e) => {
                    error!(scenario = scenario.name(), duration_ms, "Scenario failed: {}", e);
                    ScenarioResult {
                        name: scenario.name().to_string(),
                        tags,
                        status: ScenarioStatus::Failed,
                        duration_ms,
                        note: None,
                        http_status: e.status().map(|s| s.as_u16()),
                        error: Some(e.to_string()),
                    }
                }
            };
            results.push(result);
        }

        let report = RunReport {
            run_id: report_id,
            started_at,
            target: self.config.base_url().to_string(),
            results,
        };
        info!(
            run_id = %report.run_id,
            passed = report.passed(),
            failed = report.failed(),
            skipped = report.skipped(),
            "Conformance run finished"
        );
        report
    }
}
