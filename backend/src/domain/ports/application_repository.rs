//! Port for application persistence.
//!
//! `transition` and `delete` are atomic: adapters lock the stored row, run
//! the workflow check against that snapshot and write in the same unit.

use async_trait::async_trait;

use crate::domain::{
    Application, ApplicationFilter, ApplicationId, Principal, TransitionCommand, TransitionOutcome,
    WorkflowError,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by application repository adapters.
    pub enum ApplicationRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "application repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "application repository query failed: {message}",
        /// No application with the requested id.
        NotFound { id: String } => "application {id} not found",
        /// The referenced category does not exist.
        UnknownCategory => "referenced category does not exist",
        /// The workflow refused the change on the locked snapshot.
        Rejected { reason: WorkflowError } => "workflow rejected the change: {reason}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    async fn insert(&self, application: &Application) -> Result<(), ApplicationRepositoryError>;

    async fn find_by_id(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<Application>, ApplicationRepositoryError>;

    /// Applications matching `filter`, newest first.
    async fn list(
        &self,
        filter: &ApplicationFilter,
    ) -> Result<Vec<Application>, ApplicationRepositoryError>;

    /// Apply a status transition under a row lock and return the stored
    /// result with any design image it superseded.
    async fn transition(
        &self,
        id: &ApplicationId,
        command: &TransitionCommand,
    ) -> Result<TransitionOutcome, ApplicationRepositoryError>;

    /// Withdraw an application under a row lock and return what was removed.
    async fn delete(
        &self,
        id: &ApplicationId,
        actor: &Principal,
    ) -> Result<Application, ApplicationRepositoryError>;

    /// Update the favourite flag.
    async fn set_favorite(
        &self,
        id: &ApplicationId,
        favorite: bool,
    ) -> Result<Application, ApplicationRepositoryError>;
}
