//! Assertions that fail with expected and actual values

use std::fmt::Debug;

use contactlist_common::{E2eError, E2eResult};
use serde_json::Value;

use crate::client::ApiResponse;

pub fn equal<T: PartialEq + Debug>(context: &str, expected: T, actual: T) -> E2eResult<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(E2eError::assertion(context, expected, actual))
    }
}

pub fn that(
    context: &str,
    condition: bool,
    expected: impl Debug,
    actual: impl Debug,
) -> E2eResult<()> {
    if condition {
        Ok(())
    } else {
        Err(E2eError::assertion(context, expected, actual))
    }
}

/// Field at `path` must be the JSON string `expected`
pub fn field_eq(resp: &ApiResponse, path: &str, expected: &str) -> E2eResult<()> {
    let actual = resp.field(path);
    if actual.as_ref().and_then(Value::as_str) == Some(expected) {
        Ok(())
    } else {
        Err(E2eError::assertion(
            format!("{} of {} {}", path, resp.method, resp.path),
            expected,
            actual,
        ))
    }
}

pub fn has_field(resp: &ApiResponse, path: &str) -> E2eResult<()> {
    that(
        &format!("body of {} {}", resp.method, resp.path),
        resp.has_field(path),
        format!("field {}", path),
        resp.text(),
    )
}

pub fn lacks_field(resp: &ApiResponse, path: &str) -> E2eResult<()> {
    that(
        &format!("body of {} {}", resp.method, resp.path),
        !resp.has_field(path),
        format!("no field {}", path),
        resp.text(),
    )
}

/// Field at `path` must be a non-empty string
pub fn non_empty(resp: &ApiResponse, path: &str) -> E2eResult<()> {
    let value = resp.str_field(path)?;
    that(
        &format!("{} of {} {}", path, resp.method, resp.path),
        !value.is_empty(),
        "a non-empty string",
        value,
    )
}

pub fn body_contains(resp: &ApiResponse, needle: &str) -> E2eResult<()> {
    let text = resp.text();
    that(
        &format!("body of {} {}", resp.method, resp.path),
        text.contains(needle),
        format!("to contain {:?}", needle),
        text,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use contactlist_common::FailureKind;
    use reqwest::{Method, StatusCode};

    fn resp(body: &str) -> ApiResponse {
        ApiResponse {
            method: Method::GET,
            path: "/users/me".into(),
            status: StatusCode::OK,
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn field_checks() {
        let r = resp(r#"{"_id":"1","firstName":"API","token":""}"#);
        field_eq(&r, "firstName", "API").unwrap();
        has_field(&r, "_id").unwrap();
        lacks_field(&r, "password").unwrap();

        let err = field_eq(&r, "firstName", "Updated API").unwrap_err();
        assert_eq!(err.kind(), FailureKind::Assertion);
        assert!(non_empty(&r, "token").is_err());
    }

    #[test]
    fn equal_reports_both_sides() {
        let err = equal("row count", 0usize, 2usize).unwrap_err();
        assert_eq!(err.to_string(), "Assertion failed: row count: expected 0, got 2");
    }
}
