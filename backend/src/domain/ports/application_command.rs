//! Driving ports for design requests.

use async_trait::async_trait;

use crate::domain::{
    Application, ApplicationFilter, ApplicationId, ApplicationStatus, CategoryId, Description,
    Error, Principal, StoredImage, Title,
};

/// Image bytes exactly as received, before size and type checks.
#[derive(Clone, PartialEq, Eq)]
pub struct RawImage {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for RawImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawImage")
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Input for submitting a new request.
#[derive(Debug, Clone)]
pub struct SubmitApplicationRequest {
    pub actor: Principal,
    pub title: Title,
    pub description: Description,
    pub category: CategoryId,
    pub image: RawImage,
}

/// Input for a staff status change.
#[derive(Debug, Clone)]
pub struct TransitionRequest {
    pub actor: Principal,
    pub id: ApplicationId,
    pub status: ApplicationStatus,
    /// Blank text counts as no comment.
    pub comment: Option<String>,
    pub design_image: Option<RawImage>,
}

/// Which of an application's images to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageRole {
    Reference,
    Design,
}

/// Mutations on design requests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApplicationCommand: Send + Sync {
    async fn submit(&self, request: SubmitApplicationRequest) -> Result<Application, Error>;

    async fn transition(&self, request: TransitionRequest) -> Result<Application, Error>;

    /// Withdraw a New application owned by `actor`.
    async fn withdraw(&self, actor: &Principal, id: &ApplicationId) -> Result<(), Error>;

    async fn set_favorite(
        &self,
        actor: &Principal,
        id: &ApplicationId,
        favorite: bool,
    ) -> Result<Application, Error>;
}

/// Reads scoped by the access policy.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApplicationQuery: Send + Sync {
    /// Staff see every match; applicants see only their own.
    async fn list(
        &self,
        actor: &Principal,
        filter: ApplicationFilter,
    ) -> Result<Vec<Application>, Error>;

    async fn fetch(&self, actor: &Principal, id: &ApplicationId) -> Result<Application, Error>;

    async fn image(
        &self,
        actor: &Principal,
        id: &ApplicationId,
        role: ImageRole,
    ) -> Result<StoredImage, Error>;
}
