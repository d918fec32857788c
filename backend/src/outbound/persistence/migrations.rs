//! Embedded Diesel migrations applied at startup.

use diesel::{Connection, PgConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Errors raised while applying schema migrations.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("failed to connect for migrations: {message}")]
    Connect { message: String },
    #[error("failed to apply migrations: {message}")]
    Apply { message: String },
}

/// Apply all pending migrations and return the versions that ran.
///
/// Uses a synchronous connection; call from `spawn_blocking` inside a
/// runtime.
pub fn run_migrations(database_url: &str) -> Result<Vec<String>, MigrationError> {
    let mut connection =
        PgConnection::establish(database_url).map_err(|error| MigrationError::Connect {
            message: error.to_string(),
        })?;
    let applied = connection
        .run_pending_migrations(MIGRATIONS)
        .map_err(|error| MigrationError::Apply {
            message: error.to_string(),
        })?;
    Ok(applied.iter().map(ToString::to_string).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::migration::MigrationSource;
    use diesel::pg::Pg;
    use rstest::rstest;

    #[rstest]
    fn migrations_are_embedded() {
        let migrations =
            MigrationSource::<Pg>::migrations(&MIGRATIONS).expect("embedded migrations load");
        assert!(!migrations.is_empty());
    }

    #[rstest]
    fn foreign_keys_restrict_deletes() {
        let schema = include_str!("../../../migrations/2026-01-05-120000_create_core_tables/up.sql");
        let references = schema.matches("REFERENCES").count();
        assert_eq!(references, 2);
        assert_eq!(schema.matches("ON DELETE RESTRICT").count(), references);
        assert!(!schema.contains("CASCADE"));
    }

    #[rstest]
    fn unreachable_database_reports_connect_error() {
        let err = run_migrations("postgres://nobody@127.0.0.1:1/none").expect_err("no server");
        assert!(matches!(err, MigrationError::Connect { .. }));
    }
}
