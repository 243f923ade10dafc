use async_trait::async_trait;
use serde::Serialize;
use std::fmt;

use crate::config::HarnessConfig;
use crate::error::HarnessResult;
use crate::session::Session;

pub mod chat;
pub mod public;
pub mod rate_limit;

pub use chat::{ChatCreateRequiresAuth, ChatListRequiresAuth, InfoReachable};
pub use public::{PublicInfo, Translate, TranslateMultilingual, TranslateValidation, TranslateWithContext};
pub use rate_limit::RateLimitProbe;

pub mod paths {
    pub const CHATS: &str = "/api/chats";
    pub const PUBLIC_INFO: &str = "/api/public/info";
    pub const PUBLIC_TRANSLATE: &str = "/api/public/translate";
}

/// Coarse labels used to select scenarios for a run.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tag {
    Api,
    Auth,
    Quick,
    Integration,
    Slow,
}

impl Tag {
    pub fn as_str(self) -> &'static str {
        match self {
            Tag::Api => "api",
            Tag::Auth => "auth",
            Tag::Quick => "quick",
            Tag::Integration => "integration",
            Tag::Slow => "slow",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a scenario gets to work with. The shared session outlives every
/// scenario; public sessions are opened on demand and dropped with the
/// scenario that asked for them.
pub struct ScenarioContext<'a> {
    pub config: &'a HarnessConfig,
    pub shared: &'a Session,
}

impl ScenarioContext<'_> {
    pub fn public_session(&self) -> HarnessResult<Session> {
        Session::public(self.config)
    }
}

/// Extra detail a passing scenario wants in the report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub note: Option<String>,
}

impl Outcome {
    pub fn ok() -> Self {
        Self::default()
    }

    pub fn with_note(note: impl Into<String>) -> Self {
        Self {
            note: Some(note.into()),
        }
    }
}

#[async_trait]
pub trait Scenario: Send + Sync {
    /// Stable identifier, used for selection on the command line
    fn name(&self) -> &'static str;

    fn tags(&self) -> &'static [Tag];

    /// Issue the requests and check the answers
    async fn run(&self, ctx: &ScenarioContext<'_>) -> HarnessResult<Outcome>;

    fn has_tag(&self, tag: &str) -> bool {
        self.tags().iter().any(|t| t.as_str() == tag)
    }
}

/// Every scenario, in the order a run executes them.
pub fn all() -> Vec<Box<dyn Scenario>> {
    vec![
        Box::new(ChatCreateRequiresAuth),
        Box::new(ChatListRequiresAuth),
        Box::new(InfoReachable),
        Box::new(PublicInfo),
        Box::new(Translate),
        Box::new(TranslateValidation),
        Box::new(TranslateMultilingual),
        Box::new(TranslateWithContext),
        Box::new(RateLimitProbe),
    ]
}
