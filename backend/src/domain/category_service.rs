//! Category domain service.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info};

use crate::domain::ports::{
    CategoryCommand, CategoryQuery, CategoryRepository, CategoryRepositoryError,
};
use crate::domain::{Category, CategoryId, CategoryName, Error, Principal, WorkflowError};

/// Category service implementing the category driving ports.
#[derive(Clone)]
pub struct CategoryService<C> {
    categories: Arc<C>,
}

impl<C> CategoryService<C> {
    pub fn new(categories: Arc<C>) -> Self {
        Self { categories }
    }
}

fn map_category_error(error: CategoryRepositoryError) -> Error {
    match error {
        CategoryRepositoryError::Connection { message } => WorkflowError::Storage {
            message: format!("category repository unavailable: {message}"),
            retryable: true,
        }
        .into(),
        CategoryRepositoryError::Query { message } => WorkflowError::Storage {
            message: format!("category repository error: {message}"),
            retryable: false,
        }
        .into(),
        CategoryRepositoryError::DuplicateName { name } => {
            Error::invalid_request(format!("category `{name}` already exists")).with_details(
                json!({
                    "field": "name",
                    "code": "duplicate_name",
                }),
            )
        }
        CategoryRepositoryError::InUse { id } => {
            Error::conflict(format!("category {id} is still in use")).with_details(json!({
                "code": "category_in_use",
            }))
        }
    }
}

fn require_staff(actor: &Principal) -> Result<(), Error> {
    if actor.can_manage_categories() {
        return Ok(());
    }
    debug!(user_id = %actor.user_id(), "category change refused for non-staff");
    Err(WorkflowError::Unauthorized.into())
}

#[async_trait]
impl<C> CategoryCommand for CategoryService<C>
where
    C: CategoryRepository,
{
    async fn create(&self, actor: &Principal, name: CategoryName) -> Result<Category, Error> {
        require_staff(actor)?;
        let category = Category::new(CategoryId::random(), name);
        self.categories
            .insert(&category)
            .await
            .map_err(map_category_error)?;
        info!(category_id = %category.id(), name = %category.name(), "category created");
        Ok(category)
    }

    async fn delete(&self, actor: &Principal, id: &CategoryId) -> Result<(), Error> {
        require_staff(actor)?;
        let removed = self
            .categories
            .delete(id)
            .await
            .map_err(map_category_error)?;
        if !removed {
            return Err(Error::not_found(format!("category {id} not found")));
        }
        info!(category_id = %id, "category deleted");
        Ok(())
    }
}

#[async_trait]
impl<C> CategoryQuery for CategoryService<C>
where
    C: CategoryRepository,
{
    async fn list(&self) -> Result<Vec<Category>, Error> {
        self.categories.list().await.map_err(map_category_error)
    }
}
