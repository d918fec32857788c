//! Status transitions and withdrawal rules.
//!
//! Both checks are pure: they take a snapshot of an [`Application`] and
//! either return the updated snapshot or the reason it was refused. Storage
//! adapters run them against a locked row so the read, the decision and the
//! write form one unit.

use serde_json::json;

use super::image::{ImageLocation, UploadError};
use super::model::{Application, Comment};
use super::status::ApplicationStatus;
use crate::domain::access::Principal;
use crate::domain::Error;

/// Reasons a workflow operation is refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkflowError {
    /// The caller lacks the role the operation needs.
    #[error("you are not allowed to perform this action")]
    Unauthorized,
    /// The status is InProgress or Done and may not change that way.
    #[error("status {current} is locked and cannot change to {requested}")]
    TransitionLocked {
        current: ApplicationStatus,
        requested: ApplicationStatus,
    },
    /// The requested status skips a step.
    #[error("cannot move from {current} straight to {requested}")]
    InvalidTransition {
        current: ApplicationStatus,
        requested: ApplicationStatus,
    },
    #[error("a comment is required to start work on an application")]
    MissingComment,
    #[error("a design image is required to complete an application")]
    MissingDesignImage,
    #[error("{0}")]
    InvalidUpload(UploadError),
    #[error("the selected category does not exist")]
    InvalidCategory,
    /// The application can only be withdrawn while it is New.
    #[error("an application in status {status} cannot be deleted")]
    InvalidState { status: ApplicationStatus },
    /// Storage was unreachable (`retryable`) or failed outright.
    #[error("storage failure: {message}")]
    Storage { message: String, retryable: bool },
}

impl WorkflowError {
    /// Stable snake_case identifier reported in error details.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::TransitionLocked { .. } => "transition_locked",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::MissingComment => "missing_comment",
            Self::MissingDesignImage => "missing_design_image",
            Self::InvalidUpload(_) => "invalid_upload",
            Self::InvalidCategory => "invalid_category",
            Self::InvalidState { .. } => "invalid_state",
            Self::Storage { .. } => "storage_error",
        }
    }
}

impl From<UploadError> for WorkflowError {
    fn from(value: UploadError) -> Self {
        Self::InvalidUpload(value)
    }
}

impl From<WorkflowError> for Error {
    fn from(value: WorkflowError) -> Self {
        let message = value.to_string();
        let code = value.code();
        let error = match &value {
            WorkflowError::Unauthorized => Error::forbidden(message),
            WorkflowError::TransitionLocked { .. }
            | WorkflowError::InvalidTransition { .. }
            | WorkflowError::InvalidState { .. } => Error::conflict(message),
            WorkflowError::MissingComment
            | WorkflowError::MissingDesignImage
            | WorkflowError::InvalidUpload(_)
            | WorkflowError::InvalidCategory => Error::invalid_request(message),
            WorkflowError::Storage {
                retryable: true, ..
            } => Error::service_unavailable(message),
            WorkflowError::Storage {
                retryable: false, ..
            } => Error::internal(message),
        };
        let field = match value {
            WorkflowError::MissingComment => Some("comment"),
            WorkflowError::MissingDesignImage => Some("designImage"),
            WorkflowError::InvalidUpload(_) => Some("image"),
            WorkflowError::InvalidCategory => Some("category"),
            _ => None,
        };
        match field {
            Some(field) => error.with_details(json!({ "code": code, "field": field })),
            None => error.with_details(json!({ "code": code })),
        }
    }
}

/// A staff request to move an application to `requested`.
#[derive(Debug, Clone)]
pub struct TransitionCommand {
    pub requested: ApplicationStatus,
    /// Replaces the stored comment when present.
    pub comment: Option<Comment>,
    /// Replaces the stored design image when present.
    pub design_image: Option<ImageLocation>,
    pub actor: Principal,
}

/// Validate `command` against `application` and return the updated snapshot.
///
/// Checks run in a fixed order and the first failure wins:
/// staff role, status lock, step skipping, comment, design image.
///
/// # Examples
/// ```
/// use design_desk::domain::{
///     apply_transition, ApplicationStatus, Comment, Principal, TransitionCommand,
///     UserId, WorkflowError,
/// };
/// # use design_desk::domain::{Application, ApplicationId, CategoryId, Description,
/// #     ImageArea, ImageKind, ImageLocation, NewApplication, Title};
/// # let app = Application::submit(NewApplication {
/// #     id: ApplicationId::random(),
/// #     applicant: UserId::random(),
/// #     title: Title::new("Logo").unwrap(),
/// #     description: Description::new("Fox").unwrap(),
/// #     category: CategoryId::random(),
/// #     image: ImageLocation::generate(ImageArea::Applications, ImageKind::Png),
/// #     created_at: chrono::Utc::now(),
/// # });
/// let staff = Principal::staff(UserId::random());
/// let mut command = TransitionCommand {
///     requested: ApplicationStatus::InProgress,
///     comment: None,
///     design_image: None,
///     actor: staff,
/// };
/// assert_eq!(apply_transition(&app, &command), Err(WorkflowError::MissingComment));
///
/// command.comment = Comment::optional(Some("On it"));
/// let updated = apply_transition(&app, &command).unwrap();
/// assert_eq!(updated.status(), ApplicationStatus::InProgress);
/// ```
pub fn apply_transition(
    application: &Application,
    command: &TransitionCommand,
) -> Result<Application, WorkflowError> {
    if !command.actor.can_review() {
        return Err(WorkflowError::Unauthorized);
    }

    let current = application.status();
    let requested = command.requested;
    let advances = current.successor() == Some(requested);
    if requested != current && !advances {
        if current.is_locked() {
            return Err(WorkflowError::TransitionLocked { current, requested });
        }
        return Err(WorkflowError::InvalidTransition { current, requested });
    }

    let has_comment = command.comment.is_some() || application.comment().is_some();
    if requested == ApplicationStatus::InProgress && !has_comment {
        return Err(WorkflowError::MissingComment);
    }

    let has_design = command.design_image.is_some() || application.design_image().is_some();
    if requested == ApplicationStatus::Done && !has_design {
        return Err(WorkflowError::MissingDesignImage);
    }

    Ok(application.clone().reviewed(
        requested,
        command.comment.clone(),
        command.design_image.clone(),
    ))
}

/// A stored transition and the design image it superseded, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionOutcome {
    pub application: Application,
    /// Previous design image, no longer referenced once the write commits.
    pub replaced_design: Option<ImageLocation>,
}

impl TransitionOutcome {
    /// Pair the updated snapshot with the design image `before` held that
    /// `after` no longer references.
    pub fn between(before: &Application, after: Application) -> Self {
        let replaced_design = before
            .design_image()
            .filter(|old| after.design_image() != Some(*old))
            .cloned();
        Self {
            application: after,
            replaced_design,
        }
    }
}

/// Check that `actor` may withdraw `application`.
pub fn check_deletion(application: &Application, actor: &Principal) -> Result<(), WorkflowError> {
    if !actor.can_delete(application.applicant()) {
        return Err(WorkflowError::Unauthorized);
    }
    if application.status() != ApplicationStatus::New {
        return Err(WorkflowError::InvalidState {
            status: application.status(),
        });
    }
    Ok(())
}

#[cfg(test)]
#[path = "workflow_tests.rs"]
mod tests;
