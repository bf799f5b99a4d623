use super::PersonStore;
use crate::error::{AppError, ConfigError};
use crate::migration::{person_table, quote_ident};
use crate::model::Person;
use async_trait::async_trait;
use sqlx::{ConnectOptions, PgPool};
use std::str::FromStr;

type PersonRow = (i64, Option<String>, Option<String>);

fn row_to_person((id, name, email): PersonRow) -> Person {
    Person {
        id: Some(id),
        name,
        email,
    }
}

/// PostgreSQL-backed store over the table created by [`crate::migration::apply_migrations`].
#[derive(Clone, Debug)]
pub struct PgPersonStore {
    pool: PgPool,
    /// Schema-qualified, quoted table name, e.g. `"public"."person"`.
    table: String,
}

impl PgPersonStore {
    pub fn new(pool: PgPool, schema: &str) -> Self {
        PgPersonStore {
            pool,
            table: person_table(schema),
        }
    }

    async fn insert(&self, name: Option<&str>, email: Option<&str>) -> Result<Person, AppError> {
        let sql = format!(
            "INSERT INTO {} (name, email) VALUES ($1, $2) RETURNING id, name, email",
            self.table
        );
        tracing::debug!(sql = %sql, "query");
        let row: PersonRow = sqlx::query_as(&sql)
            .bind(name)
            .bind(email)
            .fetch_one(&self.pool)
            .await?;
        Ok(row_to_person(row))
    }

    /// Insert-or-overwrite at `id`, then move the identity sequence past it so generated ids
    /// never land on an explicitly chosen one. The table lock serializes upserts against each
    /// other and against in-flight inserts, so `MAX(id)` sees every committed row; the sequence
    /// never moves backwards.
    async fn upsert(&self, id: i64, name: Option<&str>, email: Option<&str>) -> Result<Person, AppError> {
        let lock = format!("LOCK TABLE {} IN SHARE ROW EXCLUSIVE MODE", self.table);
        let sql = format!(
            "INSERT INTO {} (id, name, email) VALUES ($1, $2, $3) \
             ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name, email = EXCLUDED.email \
             RETURNING id, name, email",
            self.table
        );
        let bump = format!(
            "WITH s AS (SELECT pg_get_serial_sequence($1, 'id')::regclass AS seq) \
             SELECT setval(s.seq, GREATEST((SELECT MAX(id) FROM {}), pg_sequence_last_value(s.seq), 1)) FROM s",
            self.table
        );
        tracing::debug!(sql = %sql, id, "query (tx)");
        let mut tx = self.pool.begin().await?;
        sqlx::query(&lock).execute(&mut *tx).await?;
        let row: PersonRow = sqlx::query_as(&sql)
            .bind(id)
            .bind(name)
            .bind(email)
            .fetch_one(&mut *tx)
            .await?;
        sqlx::query(&bump).bind(self.table.as_str()).execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(row_to_person(row))
    }
}

#[async_trait]
impl PersonStore for PgPersonStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Person>, AppError> {
        let sql = format!("SELECT id, name, email FROM {} WHERE id = $1", self.table);
        tracing::debug!(sql = %sql, id, "query");
        let row: Option<PersonRow> = sqlx::query_as(&sql).bind(id).fetch_optional(&self.pool).await?;
        Ok(row.map(row_to_person))
    }

    async fn save(&self, person: Person) -> Result<Person, AppError> {
        match person.id {
            Some(id) => self.upsert(id, person.name.as_deref(), person.email.as_deref()).await,
            None => self.insert(person.name.as_deref(), person.email.as_deref()).await,
        }
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }
}

/// Ensure the database in `database_url` exists; create it if not. Connects to the
/// default `postgres` database to run CREATE DATABASE. Call before creating the main pool.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)
        .map_err(|e| invalid_url(e.to_string()))?;
    let mut conn: sqlx::PgConnection = opts.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

fn invalid_url(reason: String) -> AppError {
    AppError::Config(ConfigError::Invalid { var: "DATABASE_URL", reason })
}

/// Split `postgres://host/db?opts` into the admin url (`postgres://host/postgres`) and `db`.
fn parse_db_name_from_url(url: &str) -> Result<(String, String), AppError> {
    let scheme_end = url.find("://").map(|i| i + 3).unwrap_or(0);
    let slash = url[scheme_end..]
        .rfind('/')
        .map(|i| i + scheme_end)
        .ok_or_else(|| invalid_url("no database path".into()))?;
    let path_start = slash + 1;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let db_name = path_and_query.split('?').next().unwrap_or("").trim();
    let base = url.get(..path_start).unwrap_or(url);
    Ok((format!("{}postgres", base), db_name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_database_name() {
        let (admin, db) = parse_db_name_from_url("postgres://u:p@localhost:5432/person?sslmode=disable").unwrap();
        assert_eq!(admin, "postgres://u:p@localhost:5432/postgres");
        assert_eq!(db, "person");
    }

    #[test]
    fn url_without_path_is_rejected() {
        assert!(parse_db_name_from_url("postgres://localhost").is_err());
    }

    #[test]
    fn trailing_slash_means_no_database() {
        let (_, db) = parse_db_name_from_url("postgres://localhost/").unwrap();
        assert!(db.is_empty());
    }
}
