//! The design request entity and its validated fields.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::image::ImageLocation;
use super::status::ApplicationStatus;
use crate::domain::category::CategoryId;
use crate::domain::user::UserId;

/// Maximum title length, in characters.
pub const TITLE_MAX: usize = 150;
/// Maximum description length, in characters.
pub const DESCRIPTION_MAX: usize = 500;

/// Validation errors for application fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplicationValidationError {
    InvalidId,
    EmptyTitle,
    TitleTooLong { max: usize },
    EmptyDescription,
    DescriptionTooLong { max: usize },
    EmptyComment,
}

impl ApplicationValidationError {
    /// Wire name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidId => "id",
            Self::EmptyTitle | Self::TitleTooLong { .. } => "title",
            Self::EmptyDescription | Self::DescriptionTooLong { .. } => "description",
            Self::EmptyComment => "comment",
        }
    }
}

impl fmt::Display for ApplicationValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId => write!(f, "application id must be a valid UUID"),
            Self::EmptyTitle => write!(f, "title must not be empty"),
            Self::TitleTooLong { max } => write!(f, "title must be at most {max} characters"),
            Self::EmptyDescription => write!(f, "description must not be empty"),
            Self::DescriptionTooLong { max } => {
                write!(f, "description must be at most {max} characters")
            }
            Self::EmptyComment => write!(f, "comment must not be empty"),
        }
    }
}

impl std::error::Error for ApplicationValidationError {}

/// Application identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(Uuid);

impl ApplicationId {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ApplicationValidationError> {
        Uuid::parse_str(raw.as_ref())
            .map(Self)
            .map_err(|_| ApplicationValidationError::InvalidId)
    }

    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

fn bounded_text(
    raw: &str,
    max: usize,
    empty: ApplicationValidationError,
    too_long: ApplicationValidationError,
) -> Result<String, ApplicationValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(empty);
    }
    if trimmed.chars().count() > max {
        return Err(too_long);
    }
    Ok(trimmed.to_owned())
}

macro_rules! text_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.0.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ApplicationValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }
    };
}

text_newtype!(
    /// Request title, 1 to [`TITLE_MAX`] characters after trimming.
    Title
);
text_newtype!(
    /// Request description, 1 to [`DESCRIPTION_MAX`] characters after trimming.
    Description
);
text_newtype!(
    /// Staff remark attached when work starts. Never blank.
    Comment
);

impl Title {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ApplicationValidationError> {
        bounded_text(
            raw.as_ref(),
            TITLE_MAX,
            ApplicationValidationError::EmptyTitle,
            ApplicationValidationError::TitleTooLong { max: TITLE_MAX },
        )
        .map(Self)
    }
}

impl Description {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ApplicationValidationError> {
        bounded_text(
            raw.as_ref(),
            DESCRIPTION_MAX,
            ApplicationValidationError::EmptyDescription,
            ApplicationValidationError::DescriptionTooLong {
                max: DESCRIPTION_MAX,
            },
        )
        .map(Self)
    }
}

impl Comment {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ApplicationValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ApplicationValidationError::EmptyComment);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Treat blank input as "no comment supplied".
    pub fn optional(raw: Option<&str>) -> Option<Self> {
        raw.and_then(|text| Self::new(text).ok())
    }
}

/// A design request.
///
/// Fields are private; status, comment and design image only change through
/// [`super::apply_transition`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Application {
    id: ApplicationId,
    applicant: UserId,
    title: Title,
    description: Description,
    category: CategoryId,
    image: ImageLocation,
    design_image: Option<ImageLocation>,
    status: ApplicationStatus,
    comment: Option<Comment>,
    created_at: DateTime<Utc>,
    favorite: bool,
}

/// Values supplied when an application is first submitted.
#[derive(Debug, Clone)]
pub struct NewApplication {
    pub id: ApplicationId,
    pub applicant: UserId,
    pub title: Title,
    pub description: Description,
    pub category: CategoryId,
    pub image: ImageLocation,
    pub created_at: DateTime<Utc>,
}

/// Every persisted field, used by adapters to rebuild an [`Application`].
#[derive(Debug, Clone)]
pub struct ApplicationRecord {
    pub id: ApplicationId,
    pub applicant: UserId,
    pub title: Title,
    pub description: Description,
    pub category: CategoryId,
    pub image: ImageLocation,
    pub design_image: Option<ImageLocation>,
    pub status: ApplicationStatus,
    pub comment: Option<Comment>,
    pub created_at: DateTime<Utc>,
    pub favorite: bool,
}

impl Application {
    /// Start a fresh application: status New, no review data, not a favourite.
    pub fn submit(new: NewApplication) -> Self {
        let NewApplication {
            id,
            applicant,
            title,
            description,
            category,
            image,
            created_at,
        } = new;
        Self {
            id,
            applicant,
            title,
            description,
            category,
            image,
            design_image: None,
            status: ApplicationStatus::New,
            comment: None,
            created_at,
            favorite: false,
        }
    }

    /// Rebuild an application loaded from storage.
    pub fn restore(record: ApplicationRecord) -> Self {
        let ApplicationRecord {
            id,
            applicant,
            title,
            description,
            category,
            image,
            design_image,
            status,
            comment,
            created_at,
            favorite,
        } = record;
        Self {
            id,
            applicant,
            title,
            description,
            category,
            image,
            design_image,
            status,
            comment,
            created_at,
            favorite,
        }
    }

    pub fn id(&self) -> ApplicationId {
        self.id
    }

    pub fn applicant(&self) -> &UserId {
        &self.applicant
    }

    pub fn title(&self) -> &Title {
        &self.title
    }

    pub fn description(&self) -> &Description {
        &self.description
    }

    pub fn category(&self) -> CategoryId {
        self.category
    }

    /// Reference image supplied by the applicant.
    pub fn image(&self) -> &ImageLocation {
        &self.image
    }

    pub fn design_image(&self) -> Option<&ImageLocation> {
        self.design_image.as_ref()
    }

    pub fn status(&self) -> ApplicationStatus {
        self.status
    }

    pub fn comment(&self) -> Option<&Comment> {
        self.comment.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn favorite(&self) -> bool {
        self.favorite
    }

    /// Copy with the favourite flag replaced.
    pub fn with_favorite(mut self, favorite: bool) -> Self {
        self.favorite = favorite;
        self
    }

    pub(super) fn reviewed(
        mut self,
        status: ApplicationStatus,
        comment: Option<Comment>,
        design_image: Option<ImageLocation>,
    ) -> Self {
        self.status = status;
        if comment.is_some() {
            self.comment = comment;
        }
        if design_image.is_some() {
            self.design_image = design_image;
        }
        self
    }
}

/// Listing filters. Empty fields do not constrain the result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationFilter {
    /// Restrict to one applicant; set for non-staff callers.
    pub applicant: Option<UserId>,
    pub status: Option<ApplicationStatus>,
    pub category: Option<CategoryId>,
    /// Case-insensitive search over title, description and applicant username.
    pub query: Option<String>,
}

impl ApplicationFilter {
    /// Normalised search text, if any.
    pub fn search_text(&self) -> Option<&str> {
        self.query
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }
}
