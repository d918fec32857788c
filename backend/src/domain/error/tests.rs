//! Tests for domain error construction and serialisation.

use super::*;
use crate::domain::TraceId;
use rstest::{fixture, rstest};
use rstest_bdd_macros::{given, then, when};
use serde_json::json;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn expected_trace_id() -> String {
    TRACE_ID.to_owned()
}

#[rstest]
fn conflict_constructor_sets_code() {
    let err = Error::conflict("locked");
    assert_eq!(err.code(), ErrorCode::Conflict);
    assert_eq!(err.message(), "locked");
}

#[rstest]
fn blank_message_falls_back_to_code_description() {
    let err = Error::new(ErrorCode::ServiceUnavailable, "  ");
    assert_eq!(err.message(), "service unavailable");
}

#[rstest]
fn try_new_rejects_empty_messages() {
    let result = Error::try_new(ErrorCode::InvalidRequest, "   ");
    assert!(matches!(result, Err(ErrorValidationError::EmptyMessage)));
}

#[rstest]
fn try_with_trace_id_rejects_empty_values() {
    let result = Error::invalid_request("bad").try_with_trace_id(" ");
    assert!(matches!(result, Err(ErrorValidationError::EmptyTraceId)));
}

#[rstest]
fn trace_id_is_absent_out_of_scope() {
    assert!(Error::internal("boom").trace_id().is_none());
}

#[rstest]
#[tokio::test]
async fn new_captures_trace_id_in_scope(expected_trace_id: String) {
    let trace_id: TraceId = expected_trace_id
        .parse()
        .expect("fixtures provide a valid UUID");
    let error = TraceId::scope(trace_id, async move { Error::forbidden("staff only") }).await;

    assert_eq!(error.trace_id(), Some(expected_trace_id.as_str()));
}

#[rstest]
#[tokio::test]
async fn deserialised_errors_ignore_ambient_trace(expected_trace_id: String) {
    let trace_id: TraceId = expected_trace_id
        .parse()
        .expect("fixtures provide a valid UUID");
    let payload = json!({"code": "conflict", "message": "locked"});

    let error = TraceId::scope(trace_id, async move {
        serde_json::from_value::<Error>(payload).expect("valid payload deserialises")
    })
    .await;

    assert!(error.trace_id().is_none());
}

#[rstest]
fn serialises_camel_case_envelope(expected_trace_id: String) {
    let err = Error::invalid_request("comment required")
        .with_trace_id(expected_trace_id.clone())
        .with_details(json!({"code": "missing_comment"}));

    let value = serde_json::to_value(&err).expect("error serialises");
    assert_eq!(
        value,
        json!({
            "code": "invalid_request",
            "message": "comment required",
            "traceId": expected_trace_id,
            "details": {"code": "missing_comment"},
        })
    );
}

#[rstest]
fn deserialisation_rejects_blank_message() {
    let result = serde_json::from_value::<Error>(json!({"code": "not_found", "message": ""}));
    assert!(result.is_err());
}

#[given("a valid error payload")]
fn a_valid_error_payload() -> (ErrorCode, String) {
    (ErrorCode::Conflict, "transition locked".to_owned())
}

#[given("an empty error message")]
fn an_empty_error_message() -> (ErrorCode, String) {
    (ErrorCode::Conflict, "   ".to_owned())
}

#[when("the error is constructed")]
fn the_error_is_constructed(payload: (ErrorCode, String)) -> Result<Error, ErrorValidationError> {
    Error::try_new(payload.0, payload.1)
}

#[then("the construction succeeds")]
fn the_construction_succeeds(result: Result<Error, ErrorValidationError>) {
    assert!(result.is_ok());
}

#[then("construction fails with an empty message")]
fn construction_fails_with_empty_message(result: Result<Error, ErrorValidationError>) {
    assert!(matches!(result, Err(ErrorValidationError::EmptyMessage)));
}

#[rstest]
fn constructing_an_error_happy_path() {
    let result = the_error_is_constructed(a_valid_error_payload());
    the_construction_succeeds(result);
}

#[rstest]
fn constructing_an_error_unhappy_path() {
    let result = the_error_is_constructed(an_empty_error_message());
    construction_fails_with_empty_message(result);
}
