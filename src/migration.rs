//! DDL for the person table. Idempotent: safe to run on every start.

use crate::error::AppError;
use sqlx::PgPool;

pub const PERSON_TABLE: &str = "person";

pub(crate) fn quote_ident(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Schema-qualified, quoted person table name.
pub fn person_table(schema: &str) -> String {
    format!("{}.{}", quote_ident(schema), quote_ident(PERSON_TABLE))
}

/// CREATE SCHEMA and CREATE TABLE for the person table, both IF NOT EXISTS.
/// The id is an identity column that still accepts explicit values (upserts by id).
pub async fn apply_migrations(pool: &PgPool, schema: &str) -> Result<(), AppError> {
    sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {}", quote_ident(schema)))
        .execute(pool)
        .await?;

    let ddl = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {} (
            id BIGINT GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY,
            name TEXT,
            email TEXT
        )
        "#,
        person_table(schema)
    );
    sqlx::query(&ddl).execute(pool).await?;
    tracing::info!(schema = %schema, table = PERSON_TABLE, "migrations applied");
    Ok(())
}
