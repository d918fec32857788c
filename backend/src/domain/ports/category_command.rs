//! Driving ports for category management.

use async_trait::async_trait;

use crate::domain::{Category, CategoryId, CategoryName, Error, Principal};

/// Staff-only category mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CategoryCommand: Send + Sync {
    async fn create(&self, actor: &Principal, name: CategoryName) -> Result<Category, Error>;

    /// Delete a category no application references.
    async fn delete(&self, actor: &Principal, id: &CategoryId) -> Result<(), Error>;
}

/// Category reads available to any signed-in user.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CategoryQuery: Send + Sync {
    async fn list(&self) -> Result<Vec<Category>, Error>;
}
