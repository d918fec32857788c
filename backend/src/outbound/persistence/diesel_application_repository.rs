//! PostgreSQL-backed `ApplicationRepository` implementation using Diesel ORM.
//!
//! Transitions and withdrawals lock the row with `SELECT ... FOR UPDATE`,
//! evaluate the workflow on the locked snapshot and write before commit.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{ApplicationRepository, ApplicationRepositoryError};
use crate::domain::{
    Application, ApplicationFilter, ApplicationId, Principal, TransitionCommand,
    TransitionOutcome, WorkflowError, apply_transition, check_deletion,
};

use super::diesel_basic_error_mapping::{
    ConstraintViolation, constraint_violation, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::{ApplicationReview, ApplicationRow, NewApplicationRow};
use super::pool::{DbPool, PoolError};
use super::schema::{applications, users};

/// Diesel-backed implementation of the [`ApplicationRepository`] port.
#[derive(Clone)]
pub struct DieselApplicationRepository {
    pool: DbPool,
}

impl DieselApplicationRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ApplicationRepositoryError {
    map_basic_pool_error(error, ApplicationRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ApplicationRepositoryError {
    match constraint_violation(&error) {
        Some(ConstraintViolation::ForeignKey(constraint)) if constraint.contains("category") => {
            ApplicationRepositoryError::unknown_category()
        }
        _ => map_basic_diesel_error(
            error,
            ApplicationRepositoryError::query,
            ApplicationRepositoryError::connection,
        ),
    }
}

fn convert(row: ApplicationRow) -> Result<Application, ApplicationRepositoryError> {
    row.into_application()
        .map_err(ApplicationRepositoryError::query)
}

/// Escape `%`, `_` and `\` for a `LIKE` pattern.
fn like_pattern(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 2);
    escaped.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Failure inside a locking transaction.
enum LockedError {
    Diesel(diesel::result::Error),
    Missing,
    Rejected(WorkflowError),
    Corrupt(String),
}

impl From<diesel::result::Error> for LockedError {
    fn from(value: diesel::result::Error) -> Self {
        Self::Diesel(value)
    }
}

impl LockedError {
    fn into_port_error(self, id: Uuid) -> ApplicationRepositoryError {
        match self {
            Self::Diesel(err) => map_diesel_error(err),
            Self::Missing => ApplicationRepositoryError::not_found(id.to_string()),
            Self::Rejected(reason) => ApplicationRepositoryError::rejected(reason),
            Self::Corrupt(message) => ApplicationRepositoryError::query(message),
        }
    }
}

async fn lock_row(conn: &mut AsyncPgConnection, id: Uuid) -> Result<Application, LockedError> {
    let row: Option<ApplicationRow> = applications::table
        .find(id)
        .select(ApplicationRow::as_select())
        .for_update()
        .first(conn)
        .await
        .optional()?;
    let row = row.ok_or(LockedError::Missing)?;
    row.into_application().map_err(LockedError::Corrupt)
}

#[async_trait]
impl ApplicationRepository for DieselApplicationRepository {
    async fn insert(&self, application: &Application) -> Result<(), ApplicationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(applications::table)
            .values(&NewApplicationRow::from(application))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<Application>, ApplicationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<ApplicationRow> = applications::table
            .find(id.as_uuid())
            .select(ApplicationRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(convert).transpose()
    }

    async fn list(
        &self,
        filter: &ApplicationFilter,
    ) -> Result<Vec<Application>, ApplicationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = applications::table
            .inner_join(users::table)
            .select(ApplicationRow::as_select())
            .order((applications::created_at.desc(), applications::id.desc()))
            .into_boxed();
        if let Some(applicant) = &filter.applicant {
            query = query.filter(applications::applicant_id.eq(*applicant.as_uuid()));
        }
        if let Some(status) = filter.status {
            query = query.filter(applications::status.eq(status.code()));
        }
        if let Some(category) = filter.category {
            query = query.filter(applications::category_id.eq(*category.as_uuid()));
        }
        if let Some(text) = filter.search_text() {
            let pattern = like_pattern(text);
            query = query.filter(
                applications::title
                    .ilike(pattern.clone())
                    .or(applications::description.ilike(pattern.clone()))
                    .or(users::username.ilike(pattern)),
            );
        }
        let rows: Vec<ApplicationRow> = query.load(&mut conn).await.map_err(map_diesel_error)?;
        rows.into_iter().map(convert).collect()
    }

    async fn transition(
        &self,
        id: &ApplicationId,
        command: &TransitionCommand,
    ) -> Result<TransitionOutcome, ApplicationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let uuid = *id.as_uuid();
        conn.transaction::<_, LockedError, _>(|conn| {
            async move {
                let current = lock_row(conn, uuid).await?;
                let updated =
                    apply_transition(&current, command).map_err(LockedError::Rejected)?;
                diesel::update(applications::table.find(uuid))
                    .set(&ApplicationReview::from(&updated))
                    .execute(conn)
                    .await?;
                Ok(TransitionOutcome::between(&current, updated))
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| err.into_port_error(uuid))
    }

    async fn delete(
        &self,
        id: &ApplicationId,
        actor: &Principal,
    ) -> Result<Application, ApplicationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let uuid = *id.as_uuid();
        conn.transaction::<_, LockedError, _>(|conn| {
            async move {
                let current = lock_row(conn, uuid).await?;
                check_deletion(&current, actor).map_err(LockedError::Rejected)?;
                diesel::delete(applications::table.find(uuid))
                    .execute(conn)
                    .await?;
                Ok(current)
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| err.into_port_error(uuid))
    }

    async fn set_favorite(
        &self,
        id: &ApplicationId,
        favorite: bool,
    ) -> Result<Application, ApplicationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<ApplicationRow> = diesel::update(applications::table.find(id.as_uuid()))
            .set(applications::favorite.eq(favorite))
            .returning(ApplicationRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(convert)
            .transpose()?
            .ok_or_else(|| ApplicationRepositoryError::not_found(id.to_string()))
    }
}
