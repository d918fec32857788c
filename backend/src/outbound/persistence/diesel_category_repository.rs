//! PostgreSQL-backed `CategoryRepository` implementation using Diesel ORM.
//!
//! Deletion checks for referencing applications inside the same transaction
//! as the delete; the `ON DELETE RESTRICT` foreign key backs that check up.

use async_trait::async_trait;
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::ports::{CategoryRepository, CategoryRepositoryError};
use crate::domain::{Category, CategoryId};

use super::diesel_basic_error_mapping::{
    ConstraintViolation, constraint_violation, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::{CategoryRow, NewCategoryRow};
use super::pool::{DbPool, PoolError};
use super::schema::{applications, categories};

/// Diesel-backed implementation of the [`CategoryRepository`] port.
#[derive(Clone)]
pub struct DieselCategoryRepository {
    pool: DbPool,
}

impl DieselCategoryRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> CategoryRepositoryError {
    map_basic_pool_error(error, CategoryRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> CategoryRepositoryError {
    map_basic_diesel_error(
        error,
        CategoryRepositoryError::query,
        CategoryRepositoryError::connection,
    )
}

enum DeleteOutcome {
    Removed,
    Missing,
    Referenced,
}

#[async_trait]
impl CategoryRepository for DieselCategoryRepository {
    async fn list(&self) -> Result<Vec<Category>, CategoryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<CategoryRow> = categories::table
            .select(CategoryRow::as_select())
            .order(categories::name.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter()
            .map(CategoryRow::into_category)
            .collect::<Result<Vec<_>, _>>()
            .map_err(CategoryRepositoryError::query)
    }

    async fn find_by_id(
        &self,
        id: &CategoryId,
    ) -> Result<Option<Category>, CategoryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<CategoryRow> = categories::table
            .find(id.as_uuid())
            .select(CategoryRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(CategoryRow::into_category)
            .transpose()
            .map_err(CategoryRepositoryError::query)
    }

    async fn insert(&self, category: &Category) -> Result<(), CategoryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewCategoryRow {
            id: *category.id().as_uuid(),
            name: category.name().as_ref(),
        };
        diesel::insert_into(categories::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| match constraint_violation(&err) {
                Some(ConstraintViolation::Unique(_)) => {
                    CategoryRepositoryError::duplicate_name(category.name().as_ref())
                }
                _ => map_diesel_error(err),
            })
    }

    async fn delete(&self, id: &CategoryId) -> Result<bool, CategoryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let uuid = *id.as_uuid();
        let outcome = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                async move {
                    let referenced: bool = diesel::select(exists(
                        applications::table.filter(applications::category_id.eq(uuid)),
                    ))
                    .get_result(conn)
                    .await?;
                    if referenced {
                        return Ok(DeleteOutcome::Referenced);
                    }
                    let removed = diesel::delete(categories::table.find(uuid))
                        .execute(conn)
                        .await?;
                    Ok(if removed == 0 {
                        DeleteOutcome::Missing
                    } else {
                        DeleteOutcome::Removed
                    })
                }
                .scope_boxed()
            })
            .await
            .map_err(|err| match constraint_violation(&err) {
                Some(ConstraintViolation::ForeignKey(_)) => {
                    CategoryRepositoryError::in_use(id.to_string())
                }
                _ => map_diesel_error(err),
            })?;

        match outcome {
            DeleteOutcome::Removed => Ok(true),
            DeleteOutcome::Missing => Ok(false),
            DeleteOutcome::Referenced => Err(CategoryRepositoryError::in_use(id.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for category repository error mapping.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let err = map_pool_error(PoolError::build("bad url"));
        assert!(matches!(err, CategoryRepositoryError::Connection { .. }));
    }

    #[rstest]
    fn diesel_error_maps_to_query_error() {
        let err = map_diesel_error(diesel::result::Error::NotFound);
        assert!(err.to_string().contains("record not found"));
    }
}
