use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, info};

use super::{paths, Outcome, Scenario, ScenarioContext, Tag};
use crate::error::{HarnessError, HarnessResult};
use crate::expect::{expect_json, expect_keys, expect_non_empty_str, expect_status, expect_str_eq};
use crate::models::{fields, TranslateRequest, TranslateResponse};
use crate::session::Session;

/// Length known to be over the server's text limit. The exact cutoff is
/// not published, so only this value is asserted.
pub const OVERSIZED_TEXT_LEN: usize = 3000;

/// (text, from, to) pairs that must all translate.
pub const MULTILINGUAL_CASES: [(&str, &str, &str); 4] = [
    ("Hello", "en-US", "fr-FR"),
    ("Bonjour", "fr-FR", "en-US"),
    ("Hola", "es-ES", "en-US"),
    ("Olá", "pt-BR", "en-US"),
];

const INFO_KEYS: [&str; 3] = [fields::ENDPOINTS, fields::VOICES, fields::RATE_LIMIT];

/// Posts a translation and checks the full success contract: 200, all four
/// fields present, the request echoed back, a non-empty translation.
pub async fn translate_and_verify(
    session: &Session,
    request: &TranslateRequest,
) -> HarnessResult<TranslateResponse> {
    let response = session.post_json(paths::PUBLIC_TRANSLATE, request).await?;
    let body = expect_json(&response, StatusCode::OK)?;

    expect_keys(
        &body,
        &[
            fields::TRANSLATED_TEXT,
            fields::FROM_LANGUAGE,
            fields::TO_LANGUAGE,
            fields::ORIGINAL_TEXT,
        ],
    )?;
    if let Some(text) = request.text.as_deref() {
        expect_str_eq(&body, fields::ORIGINAL_TEXT, text)?;
    }
    expect_str_eq(&body, fields::FROM_LANGUAGE, &request.from_language)?;
    expect_str_eq(&body, fields::TO_LANGUAGE, &request.to_language)?;
    expect_non_empty_str(&body, fields::TRANSLATED_TEXT)?;

    serde_json::from_value(body).map_err(|source| HarnessError::MalformedBody {
        status: response.status(),
        body: response.body().to_string(),
        source,
    })
}

/// Posts a translation and only requires a 200 with a non-empty
/// `translatedText`.
pub async fn translate_non_empty(
    session: &Session,
    request: &TranslateRequest,
) -> HarnessResult<String> {
    let response = session.post_json(paths::PUBLIC_TRANSLATE, request).await?;
    let body: Value = expect_json(&response, StatusCode::OK)?;
    let translated = expect_non_empty_str(&body, fields::TRANSLATED_TEXT)?;
    Ok(translated.to_string())
}

pub struct PublicInfo;

#[async_trait]
impl Scenario for PublicInfo {
    fn name(&self) -> &'static str {
        "public_info"
    }

    fn tags(&self) -> &'static [Tag] {
        &[Tag::Api, Tag::Quick]
    }

    async fn run(&self, ctx: &ScenarioContext<'_>) -> HarnessResult<Outcome> {
        let session = ctx.public_session()?;
        let response = session.get(paths::PUBLIC_INFO).await?;
        let body = expect_json(&response, StatusCode::OK)?;
        expect_keys(&body, &INFO_KEYS)?;
        Ok(Outcome::ok())
    }
}

pub struct Translate;

#[async_trait]
impl Scenario for Translate {
    fn name(&self) -> &'static str {
        "translate"
    }

    fn tags(&self) -> &'static [Tag] {
        &[Tag::Api, Tag::Integration]
    }

    async fn run(&self, ctx: &ScenarioContext<'_>) -> HarnessResult<Outcome> {
        let session = ctx.public_session()?;
        let request =
            TranslateRequest::new("Hello world", "en-US", "es-ES").with_context("Casual greeting");
        let translated = translate_and_verify(&session, &request).await?;
        info!(translated = %translated.translated_text, "Translation echoed request");
        Ok(Outcome::with_note(format!(
            "{:?} -> {:?}",
            translated.original_text, translated.translated_text
        )))
    }
}

pub struct TranslateValidation;

#[async_trait]
impl Scenario for TranslateValidation {
    fn name(&self) -> &'static str {
        "translate_validation"
    }

    fn tags(&self) -> &'static [Tag] {
        &[Tag::Api, Tag::Quick]
    }

    async fn run(&self, ctx: &ScenarioContext<'_>) -> HarnessResult<Outcome> {
        let session = ctx.public_session()?;

        let missing_text = TranslateRequest::without_text("en-US", "es-ES");
        let response = session
            .post_json(paths::PUBLIC_TRANSLATE, &missing_text)
            .await?;
        expect_status(&response, &[StatusCode::BAD_REQUEST])
            .map_err(|e| e.in_case("missing text"))?;

        let oversized = TranslateRequest::new("a".repeat(OVERSIZED_TEXT_LEN), "en-US", "es-ES");
        let response = session.post_json(paths::PUBLIC_TRANSLATE, &oversized).await?;
        expect_status(&response, &[StatusCode::BAD_REQUEST])
            .map_err(|e| e.in_case(format!("text of {OVERSIZED_TEXT_LEN} characters")))?;

        Ok(Outcome::ok())
    }
}

pub struct TranslateMultilingual;

#[async_trait]
impl Scenario for TranslateMultilingual {
    fn name(&self) -> &'static str {
        "translate_multilingual"
    }

    fn tags(&self) -> &'static [Tag] {
        &[Tag::Api, Tag::Quick]
    }

    async fn run(&self, ctx: &ScenarioContext<'_>) -> HarnessResult<Outcome> {
        let session = ctx.public_session()?;

        for (text, from, to) in MULTILINGUAL_CASES {
            let request = TranslateRequest::new(text, from, to);
            let translated = translate_non_empty(&session, &request)
                .await
                .map_err(|e| e.in_case(request.label()))?;
            debug!(case = %request.label(), %translated, "Language pair translated");
        }

        Ok(Outcome::with_note(format!(
            "{} language pairs",
            MULTILINGUAL_CASES.len()
        )))
    }
}

/// Context must be accepted; whether it picks the financial sense of
/// "Bank" is not checked.
pub struct TranslateWithContext;

#[async_trait]
impl Scenario for TranslateWithContext {
    fn name(&self) -> &'static str {
        "translate_with_context"
    }

    fn tags(&self) -> &'static [Tag] {
        &[Tag::Api, Tag::Slow]
    }

    async fn run(&self, ctx: &ScenarioContext<'_>) -> HarnessResult<Outcome> {
        let session = ctx.public_session()?;
        let request =
            TranslateRequest::new("Bank", "en-US", "es-ES").with_context("Financial institution");
        let translated = translate_non_empty(&session, &request).await?;
        Ok(Outcome::with_note(format!("\"Bank\" -> {translated:?}")))
    }
}
