//! Design request DTOs and parsing helpers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::RawImage;
use crate::domain::{Application, ApplicationFilter, ApplicationStatus, Error};
use crate::inbound::http::validation::{
    FieldName, decode_image, parse_category_id, parse_status,
};

/// An image carried inline as base64 text.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImagePayload {
    /// Declared MIME type: `image/jpeg`, `image/png` or `image/bmp`.
    #[schema(example = "image/png")]
    pub content_type: String,
    /// Standard base64 encoding of the file, at most 2 MiB decoded.
    pub data: String,
}

impl ImagePayload {
    pub(super) fn decode(&self, field: FieldName) -> Result<RawImage, Error> {
        decode_image(&self.content_type, &self.data, field)
    }
}

/// Request body for `POST /api/v1/applications`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateApplicationRequest {
    #[schema(example = "Festival poster")]
    pub title: String,
    pub description: String,
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub category_id: String,
    pub image: ImagePayload,
}

/// Request body for `POST /api/v1/applications/{id}/transition`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransitionRequestBody {
    /// Target status: `new`, `in_progress` or `done`.
    #[schema(example = "in_progress")]
    pub status: String,
    /// Required when moving to `in_progress`.
    pub comment: Option<String>,
    /// Required when moving to `done` unless one is already attached.
    pub design_image: Option<ImagePayload>,
}

/// Request body for `PUT /api/v1/applications/{id}/favorite`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteRequest {
    pub favorite: bool,
}

/// Listing filters for `GET /api/v1/applications`.
#[derive(Debug, Default, Deserialize, Serialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListApplicationsQuery {
    /// `new`, `in_progress` or `done`.
    pub status: Option<String>,
    /// Category identifier.
    pub category: Option<String>,
    /// Case-insensitive match on title, description or applicant username.
    pub q: Option<String>,
}

impl ListApplicationsQuery {
    /// Build a domain filter. Empty parameters are ignored; the applicant
    /// scope is added by the access policy.
    pub(super) fn into_filter(self) -> Result<ApplicationFilter, Error> {
        let status = non_blank(self.status.as_deref())
            .map(|raw| parse_status(raw, FieldName::new("status")))
            .transpose()?;
        let category = non_blank(self.category.as_deref())
            .map(|raw| parse_category_id(raw, FieldName::new("category")))
            .transpose()?;
        Ok(ApplicationFilter {
            applicant: None,
            status,
            category,
            query: non_blank(self.q.as_deref()).map(str::to_owned),
        })
    }
}

fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|value| !value.is_empty())
}

/// Wire form of [`ApplicationStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatusDto {
    New,
    InProgress,
    Done,
}

impl From<ApplicationStatus> for ApplicationStatusDto {
    fn from(status: ApplicationStatus) -> Self {
        match status {
            ApplicationStatus::New => Self::New,
            ApplicationStatus::InProgress => Self::InProgress,
            ApplicationStatus::Done => Self::Done,
        }
    }
}

/// A design request as returned by the API.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationResponse {
    pub id: String,
    pub applicant_id: String,
    pub title: String,
    pub description: String,
    pub category_id: String,
    pub status: ApplicationStatusDto,
    pub comment: Option<String>,
    /// Download path for the reference image.
    #[schema(example = "/api/v1/applications/3fa85f64-5717-4562-b3fc-2c963f66afa6/image")]
    pub image_url: String,
    /// Download path for the finished design, once attached.
    pub design_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub favorite: bool,
}

impl From<&Application> for ApplicationResponse {
    fn from(application: &Application) -> Self {
        let base = format!("/api/v1/applications/{}", application.id());
        Self {
            id: application.id().to_string(),
            applicant_id: application.applicant().to_string(),
            title: application.title().as_ref().to_owned(),
            description: application.description().as_ref().to_owned(),
            category_id: application.category().to_string(),
            status: application.status().into(),
            comment: application.comment().map(|c| c.as_ref().to_owned()),
            image_url: format!("{base}/image"),
            design_image_url: application
                .design_image()
                .map(|_| format!("{base}/design-image")),
            created_at: application.created_at(),
            favorite: application.favorite(),
        }
    }
}
