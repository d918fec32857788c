//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every helper yields an `invalid_request` error whose details name the
//! offending field and a stable code.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::json;

use crate::domain::ports::RawImage;
use crate::domain::{
    ApplicationId, ApplicationStatus, ApplicationValidationError, CategoryId,
    CategoryValidationError, Description, Error, Title,
};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidUuid,
    InvalidStatus,
    InvalidBase64,
    InvalidValue,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidStatus => "invalid_status",
            ErrorCode::InvalidBase64 => "invalid_base64",
            ErrorCode::InvalidValue => "invalid_value",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &'static str {
        self.0
    }
}

fn field_error(field: FieldName, code: ErrorCode, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "code": code.as_str(),
    }))
}

fn field_value_error(
    field: FieldName,
    code: ErrorCode,
    message: impl Into<String>,
    value: &str,
) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "value": value,
        "code": code.as_str(),
    }))
}

pub(crate) fn parse_application_id(raw: &str) -> Result<ApplicationId, Error> {
    const FIELD: FieldName = FieldName::new("id");
    ApplicationId::new(raw).map_err(|_| {
        field_value_error(FIELD, ErrorCode::InvalidUuid, "id must be a valid UUID", raw)
    })
}

pub(crate) fn parse_category_id(raw: &str, field: FieldName) -> Result<CategoryId, Error> {
    CategoryId::new(raw).map_err(|_| {
        let message = format!("{} must be a valid UUID", field.as_str());
        field_value_error(field, ErrorCode::InvalidUuid, message, raw)
    })
}

pub(crate) fn parse_status(raw: &str, field: FieldName) -> Result<ApplicationStatus, Error> {
    raw.parse().map_err(|_| {
        let message = format!(
            "{} must be one of new, in_progress, done",
            field.as_str()
        );
        field_value_error(field, ErrorCode::InvalidStatus, message, raw)
    })
}

/// Map a field validation failure from the application model.
pub(crate) fn application_field_error(err: &ApplicationValidationError) -> Error {
    let field = match err.field() {
        "title" => FieldName::new("title"),
        "description" => FieldName::new("description"),
        "comment" => FieldName::new("comment"),
        _ => FieldName::new("id"),
    };
    field_error(field, ErrorCode::InvalidValue, err.to_string())
}

pub(crate) fn category_name_error(err: &CategoryValidationError) -> Error {
    field_error(FieldName::new("name"), ErrorCode::InvalidValue, err.to_string())
}

pub(crate) fn parse_title(raw: &str) -> Result<Title, Error> {
    Title::new(raw).map_err(|err| application_field_error(&err))
}

pub(crate) fn parse_description(raw: &str) -> Result<Description, Error> {
    Description::new(raw).map_err(|err| application_field_error(&err))
}

/// Decode a base64 image body. Size and type checks happen in the domain.
pub(crate) fn decode_image(
    content_type: &str,
    data: &str,
    field: FieldName,
) -> Result<RawImage, Error> {
    let bytes = STANDARD.decode(data.trim()).map_err(|_| {
        let message = format!("{} must be base64 encoded", field.as_str());
        field_error(field, ErrorCode::InvalidBase64, message)
    })?;
    Ok(RawImage {
        content_type: content_type.trim().to_owned(),
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::Value;

    fn detail<'a>(error: &'a Error, key: &str) -> Option<&'a Value> {
        error.details().and_then(|details| details.get(key))
    }

    #[rstest]
    fn bad_ids_name_the_field_and_value() {
        let err = parse_application_id("nope").expect_err("invalid uuid");
        assert_eq!(detail(&err, "field"), Some(&json!("id")));
        assert_eq!(detail(&err, "value"), Some(&json!("nope")));
        assert_eq!(detail(&err, "code"), Some(&json!("invalid_uuid")));
    }

    #[rstest]
    #[case("new", ApplicationStatus::New)]
    #[case("in_progress", ApplicationStatus::InProgress)]
    #[case("done", ApplicationStatus::Done)]
    fn statuses_parse_from_wire_names(#[case] raw: &str, #[case] expected: ApplicationStatus) {
        assert_eq!(parse_status(raw, FieldName::new("status")).ok(), Some(expected));
    }

    #[rstest]
    #[case("P")]
    #[case("finished")]
    fn unknown_statuses_are_rejected(#[case] raw: &str) {
        let err = parse_status(raw, FieldName::new("status")).expect_err("unknown status");
        assert_eq!(detail(&err, "code"), Some(&json!("invalid_status")));
    }

    #[rstest]
    fn empty_titles_are_field_errors() {
        let err = parse_title("   ").expect_err("blank title");
        assert_eq!(detail(&err, "field"), Some(&json!("title")));
    }

    #[rstest]
    fn images_are_base64_decoded() {
        let raw = decode_image(" image/png ", "AQID", FieldName::new("image")).expect("decodes");
        assert_eq!(raw.content_type, "image/png");
        assert_eq!(raw.bytes, vec![1, 2, 3]);
    }

    #[rstest]
    fn invalid_base64_is_rejected() {
        let err = decode_image("image/png", "***", FieldName::new("designImage"))
            .expect_err("not base64");
        assert_eq!(detail(&err, "field"), Some(&json!("designImage")));
        assert_eq!(detail(&err, "code"), Some(&json!("invalid_base64")));
    }
}
