//! Domain primitives, aggregates and services.
//!
//! Purpose: define strongly typed entities for design requests, the review
//! workflow that moves them along, and the access policy that decides who may
//! see or change them. Nothing here depends on HTTP or SQL; adapters reach the
//! domain through [`ports`].
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic error payload.
//! - User, Category, Application: the stored entities.
//! - apply_transition / check_deletion: the workflow rules.
//! - Principal: the caller the access policy reasons about.
//! - AccountService, CategoryService, ApplicationService: driving port
//!   implementations.

pub mod access;
pub mod account_service;
pub mod application;
pub mod application_service;
pub mod auth;
pub mod category;
pub mod category_service;
pub mod error;
pub mod password;
pub mod ports;
pub mod trace_id;
pub mod user;

pub use self::access::Principal;
pub use self::account_service::{AccountService, registration_error};
pub use self::application::{
    Application, ApplicationFilter, ApplicationId, ApplicationRecord, ApplicationStatus,
    ApplicationValidationError, Comment, DESCRIPTION_MAX, Description, ImageArea, ImageKind,
    ImageLocation, ImageUpload, InvalidImageLocation, MAX_IMAGE_BYTES, NewApplication,
    StoredImage, TITLE_MAX, Title, TransitionCommand, TransitionOutcome, UnknownStatus, UploadError,
    WorkflowError, apply_transition, check_deletion,
};
pub use self::application_service::ApplicationService;
pub use self::auth::{
    LoginCredentials, LoginValidationError, Registration, RegistrationField, RegistrationInput,
    RegistrationValidationError,
};
pub use self::category::{
    CATEGORY_NAME_MAX, Category, CategoryId, CategoryName, CategoryValidationError,
};
pub use self::category_service::CategoryService;
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::password::{MalformedDigest, PasswordDigest};
pub use self::trace_id::TraceId;
pub use self::user::{
    EMAIL_MAX, EmailAddress, NAME_MAX, PersonName, User, UserDraft, UserId, UserValidationError,
    Username,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use design_desk::domain::{ApiResult, Error};
///
/// fn create_category(is_staff: bool) -> ApiResult<()> {
///     if is_staff { Ok(()) } else { Err(Error::forbidden("staff only")) }
/// }
/// assert!(create_category(false).is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
