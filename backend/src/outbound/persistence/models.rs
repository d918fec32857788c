//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    Application, ApplicationId, ApplicationRecord, ApplicationStatus, Category, CategoryId,
    CategoryName, Comment, Description, EmailAddress, ImageLocation, PasswordDigest, PersonName,
    Title, User, UserDraft, UserId, Username,
};

use super::schema::{applications, categories, users};

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_staff: bool,
    pub password_digest: String,
}

impl UserRow {
    pub(crate) fn into_user(self) -> Result<User, String> {
        let username = Username::new(&self.username).map_err(|err| err.to_string())?;
        let email = EmailAddress::new(&self.email).map_err(|err| err.to_string())?;
        let first_name = PersonName::new(&self.first_name).map_err(|err| err.to_string())?;
        let last_name = PersonName::new(&self.last_name).map_err(|err| err.to_string())?;
        Ok(User::new(UserDraft {
            id: UserId::from_uuid(self.id),
            username,
            email,
            first_name,
            last_name,
            is_staff: self.is_staff,
        }))
    }

    pub(crate) fn digest(&self) -> Result<PasswordDigest, String> {
        PasswordDigest::decode(&self.password_digest).map_err(|err| err.to_string())
    }
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub email: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub is_staff: bool,
    pub password_digest: &'a str,
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = categories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CategoryRow {
    pub id: Uuid,
    pub name: String,
}

impl CategoryRow {
    pub(crate) fn into_category(self) -> Result<Category, String> {
        let name = CategoryName::new(&self.name).map_err(|err| err.to_string())?;
        Ok(Category::new(CategoryId::from_uuid(self.id), name))
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = categories)]
pub(crate) struct NewCategoryRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
}

// ---------------------------------------------------------------------------
// Applications
// ---------------------------------------------------------------------------

/// Row struct for reading from the applications table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = applications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ApplicationRow {
    pub id: Uuid,
    pub applicant_id: Uuid,
    pub title: String,
    pub description: String,
    pub category_id: Uuid,
    pub image: String,
    pub design_image: Option<String>,
    pub status: String,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub favorite: bool,
}

impl ApplicationRow {
    pub(crate) fn into_application(self) -> Result<Application, String> {
        let design_image = self
            .design_image
            .map(ImageLocation::parse)
            .transpose()
            .map_err(|err| err.to_string())?;
        Ok(Application::restore(ApplicationRecord {
            id: ApplicationId::from_uuid(self.id),
            applicant: UserId::from_uuid(self.applicant_id),
            title: Title::new(&self.title).map_err(|err| err.to_string())?,
            description: Description::new(&self.description).map_err(|err| err.to_string())?,
            category: CategoryId::from_uuid(self.category_id),
            image: ImageLocation::parse(&self.image).map_err(|err| err.to_string())?,
            design_image,
            status: ApplicationStatus::from_code(&self.status).map_err(|err| err.to_string())?,
            comment: Comment::optional(self.comment.as_deref()),
            created_at: self.created_at,
            favorite: self.favorite,
        }))
    }
}

/// Insertable struct for new applications.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = applications)]
pub(crate) struct NewApplicationRow<'a> {
    pub id: Uuid,
    pub applicant_id: Uuid,
    pub title: &'a str,
    pub description: &'a str,
    pub category_id: Uuid,
    pub image: &'a str,
    pub status: &'a str,
    pub created_at: DateTime<Utc>,
    pub favorite: bool,
}

impl<'a> From<&'a Application> for NewApplicationRow<'a> {
    fn from(value: &'a Application) -> Self {
        Self {
            id: *value.id().as_uuid(),
            applicant_id: *value.applicant().as_uuid(),
            title: value.title().as_ref(),
            description: value.description().as_ref(),
            category_id: *value.category().as_uuid(),
            image: value.image().as_ref(),
            status: value.status().code(),
            created_at: value.created_at(),
            favorite: value.favorite(),
        }
    }
}

/// Review fields written by a status transition.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = applications)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct ApplicationReview<'a> {
    pub status: &'a str,
    pub comment: Option<&'a str>,
    pub design_image: Option<&'a str>,
}

impl<'a> From<&'a Application> for ApplicationReview<'a> {
    fn from(value: &'a Application) -> Self {
        Self {
            status: value.status().code(),
            comment: value.comment().map(AsRef::as_ref),
            design_image: value.design_image().map(AsRef::as_ref),
        }
    }
}
