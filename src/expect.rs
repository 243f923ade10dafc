//! Response checks shared by the scenarios. Each check returns the
//! captured body in its error so a failing run explains itself.

use crate::error::{HarnessError, HarnessResult};
use crate::session::ApiResponse;
use reqwest::StatusCode;
use serde_json::Value;

pub fn expect_status(response: &ApiResponse, allowed: &[StatusCode]) -> HarnessResult<()> {
    if allowed.contains(&response.status()) {
        return Ok(());
    }
    Err(HarnessError::UnexpectedStatus {
        expected: allowed.to_vec(),
        actual: response.status(),
        body: response.body().to_string(),
    })
}

/// Status check followed by a JSON decode of the body.
pub fn expect_json(response: &ApiResponse, status: StatusCode) -> HarnessResult<Value> {
    expect_status(response, &[status])?;
    response.json()
}

pub fn expect_keys(body: &Value, keys: &[&str]) -> HarnessResult<()> {
    for key in keys {
        if body.get(key).is_none() {
            return Err(HarnessError::MissingField {
                field: (*key).to_string(),
                body: body.to_string(),
            });
        }
    }
    Ok(())
}

pub fn expect_str_eq(body: &Value, key: &str, expected: &str) -> HarnessResult<()> {
    let actual = body.get(key).ok_or_else(|| HarnessError::MissingField {
        field: key.to_string(),
        body: body.to_string(),
    })?;

    if actual.as_str() == Some(expected) {
        return Ok(());
    }
    Err(HarnessError::FieldMismatch {
        field: key.to_string(),
        expected: format!("{expected:?}"),
        actual: actual.to_string(),
    })
}

/// The field must be present, be a string, and have at least one character.
pub fn expect_non_empty_str<'a>(body: &'a Value, key: &str) -> HarnessResult<&'a str> {
    match body.get(key) {
        None => Err(HarnessError::MissingField {
            field: key.to_string(),
            body: body.to_string(),
        }),
        Some(Value::String(s)) if !s.is_empty() => Ok(s.as_str()),
        Some(_) => Err(HarnessError::EmptyField {
            field: key.to_string(),
            body: body.to_string(),
        }),
    }
}
