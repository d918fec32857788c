//! Design requests: the entity, its images and the review workflow.

mod image;
mod model;
mod status;
mod workflow;

pub use image::{
    ImageArea, ImageKind, ImageLocation, ImageUpload, InvalidImageLocation, MAX_IMAGE_BYTES,
    StoredImage, UploadError,
};
pub use model::{
    Application, ApplicationFilter, ApplicationId, ApplicationRecord,
    ApplicationValidationError, Comment, DESCRIPTION_MAX, Description, NewApplication,
    TITLE_MAX, Title,
};
pub use status::{ApplicationStatus, UnknownStatus};
pub use workflow::{
    TransitionCommand, TransitionOutcome, WorkflowError, apply_transition, check_deletion,
};
