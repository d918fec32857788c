//! Port for category persistence.

use async_trait::async_trait;

use crate::domain::{Category, CategoryId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by category repository adapters.
    pub enum CategoryRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "category repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "category repository query failed: {message}",
        /// A category with the same name exists.
        DuplicateName { name: String } => "category `{name}` already exists",
        /// Applications still reference the category.
        InUse { id: String } => "category {id} is still referenced by applications",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// All categories ordered by name.
    async fn list(&self) -> Result<Vec<Category>, CategoryRepositoryError>;

    async fn find_by_id(&self, id: &CategoryId)
    -> Result<Option<Category>, CategoryRepositoryError>;

    async fn insert(&self, category: &Category) -> Result<(), CategoryRepositoryError>;

    /// Remove a category. Returns `false` when it did not exist.
    ///
    /// Adapters must refuse with [`CategoryRepositoryError::InUse`] while any
    /// application references the category.
    async fn delete(&self, id: &CategoryId) -> Result<bool, CategoryRepositoryError>;
}
