// Chat endpoints sit behind login. Anonymous callers must be turned away,
// either with a redirect to the login page or a plain 401.

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

use super::{paths, Outcome, Scenario, ScenarioContext, Tag};
use crate::error::HarnessResult;
use crate::expect::expect_status;
use crate::models::CreateChatRequest;

pub const ANONYMOUS_REJECTIONS: [StatusCode; 2] = [StatusCode::FOUND, StatusCode::UNAUTHORIZED];

fn rejection_note(status: StatusCode) -> Outcome {
    let how = if status == StatusCode::FOUND {
        "redirected to login"
    } else {
        "unauthorized"
    };
    Outcome::with_note(how)
}

pub struct ChatCreateRequiresAuth;

#[async_trait]
impl Scenario for ChatCreateRequiresAuth {
    fn name(&self) -> &'static str {
        "chat_create_requires_auth"
    }

    fn tags(&self) -> &'static [Tag] {
        &[Tag::Api, Tag::Auth]
    }

    async fn run(&self, ctx: &ScenarioContext<'_>) -> HarnessResult<Outcome> {
        let body = CreateChatRequest {
            title: "Test Chat".to_string(),
        };
        let response = ctx.shared.post_json(paths::CHATS, &body).await?;
        expect_status(&response, &ANONYMOUS_REJECTIONS)?;
        Ok(rejection_note(response.status()))
    }
}

pub struct ChatListRequiresAuth;

#[async_trait]
impl Scenario for ChatListRequiresAuth {
    fn name(&self) -> &'static str {
        "chat_list_requires_auth"
    }

    fn tags(&self) -> &'static [Tag] {
        &[Tag::Api, Tag::Auth]
    }

    async fn run(&self, ctx: &ScenarioContext<'_>) -> HarnessResult<Outcome> {
        let response = ctx.shared.get(paths::CHATS).await?;
        expect_status(&response, &ANONYMOUS_REJECTIONS)?;
        Ok(rejection_note(response.status()))
    }
}

/// Liveness check through the shared session.
pub struct InfoReachable;

#[async_trait]
impl Scenario for InfoReachable {
    fn name(&self) -> &'static str {
        "info_reachable"
    }

    fn tags(&self) -> &'static [Tag] {
        &[Tag::Api, Tag::Quick]
    }

    async fn run(&self, ctx: &ScenarioContext<'_>) -> HarnessResult<Outcome> {
        let response = ctx.shared.get(paths::PUBLIC_INFO).await?;
        expect_status(&response, &[StatusCode::OK])?;
        debug!(bytes = response.body().len(), "Info endpoint reachable");
        Ok(Outcome::ok())
    }
}
