//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`, [`ImageStore`]) are implemented by outbound
//! adapters and return typed port errors. Driving ports (`*Command`,
//! `*Query`, [`LoginService`]) are implemented by the domain services and
//! return [`crate::domain::Error`].

mod macros;
pub(crate) use macros::define_port_error;

mod application_command;
mod application_repository;
mod category_command;
mod category_repository;
mod image_store;
mod login_service;
mod user_repository;

#[cfg(test)]
pub use application_command::{MockApplicationCommand, MockApplicationQuery};
pub use application_command::{
    ApplicationCommand, ApplicationQuery, ImageRole, RawImage, SubmitApplicationRequest,
    TransitionRequest,
};
#[cfg(test)]
pub use application_repository::MockApplicationRepository;
pub use application_repository::{ApplicationRepository, ApplicationRepositoryError};
pub use category_command::{CategoryCommand, CategoryQuery};
#[cfg(test)]
pub use category_command::{MockCategoryCommand, MockCategoryQuery};
#[cfg(test)]
pub use category_repository::MockCategoryRepository;
pub use category_repository::{CategoryRepository, CategoryRepositoryError};
#[cfg(test)]
pub use image_store::MockImageStore;
pub use image_store::{ImageStore, ImageStoreError};
pub use login_service::{LoginService, RegistrationCommand, UserProfileQuery};
#[cfg(test)]
pub use login_service::{MockLoginService, MockRegistrationCommand, MockUserProfileQuery};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{StoredCredentials, UserPersistenceError, UserRepository};
