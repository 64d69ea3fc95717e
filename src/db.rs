use std::str::FromStr;

use sqlx::postgres::PgConnectOptions;
use sqlx::{Connection, PgConnection};

use crate::error::AppError;

/// Database every Postgres server has; used for create-database checks.
const MAINTENANCE_DATABASE: &str = "postgres";

/// Postgres truncates identifiers beyond this many bytes.
const MAX_IDENTIFIER_LEN: usize = 63;

const CREATE_COMPANY_TABLE: &str = "CREATE TABLE company (
    id SERIAL PRIMARY KEY,
    hh_company_id INT UNIQUE NOT NULL,
    company_name VARCHAR(255) NOT NULL
)";

const CREATE_VACANCY_TABLE: &str = "CREATE TABLE vacancy (
    id SERIAL PRIMARY KEY,
    hh_vacancy_id INT UNIQUE NOT NULL,
    hh_company_id INT NOT NULL,
    company_name VARCHAR(255) NOT NULL,
    title VARCHAR NOT NULL,
    salary_from INT,
    salary_to INT,
    currency VARCHAR(10),
    vacancy_url VARCHAR,
    description TEXT
)";

/// Connection settings for the vacancy database.
///
/// Holds no open connection. Every operation connects, does one unit of work
/// and closes the connection again.
#[derive(Debug, Clone)]
pub struct Store {
    options: PgConnectOptions,
    database: String,
}

impl Store {
    /// `database_url` locates the server; `database` names the database to use on it.
    pub fn new(database_url: &str, database: &str) -> Result<Self, AppError> {
        validate_database_name(database)?;
        let options = PgConnectOptions::from_str(database_url)?;
        Ok(Self {
            options,
            database: database.to_string(),
        })
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    /// Open a connection to the vacancy database.
    pub async fn connect(&self) -> Result<PgConnection, AppError> {
        let options = self.options.clone().database(&self.database);
        Ok(PgConnection::connect_with(&options).await?)
    }

    async fn connect_maintenance(&self) -> Result<PgConnection, AppError> {
        let options = self.options.clone().database(MAINTENANCE_DATABASE);
        Ok(PgConnection::connect_with(&options).await?)
    }

    /// Create the database unless it already exists. Returns whether it was created.
    pub async fn ensure_database(&self) -> Result<bool, AppError> {
        let mut conn = self.connect_maintenance().await?;
        let result = create_database_if_missing(&mut conn, &self.database).await;
        release(conn).await;

        let created = result?;
        if created {
            tracing::info!("Created database '{}'", self.database);
        } else {
            tracing::info!("Database '{}' already exists, skipping creation", self.database);
        }
        Ok(created)
    }

    /// Create the company and vacancy tables. Fails if either already exists.
    pub async fn create_tables(&self) -> Result<(), AppError> {
        let mut conn = self.connect().await?;
        let result = async {
            sqlx::query(CREATE_COMPANY_TABLE).execute(&mut conn).await?;
            sqlx::query(CREATE_VACANCY_TABLE).execute(&mut conn).await?;
            Ok::<(), sqlx::Error>(())
        }
        .await;
        release(conn).await;

        result?;
        tracing::info!("Created company and vacancy tables");
        Ok(())
    }

    /// Drop both tables if present so the next load starts from an empty schema.
    pub async fn reset_tables(&self) -> Result<(), AppError> {
        let mut conn = self.connect().await?;
        let result = sqlx::query("DROP TABLE IF EXISTS vacancy, company")
            .execute(&mut conn)
            .await;
        release(conn).await;

        result?;
        tracing::debug!("Dropped existing company and vacancy tables");
        Ok(())
    }

    /// Row counts as `(vacancies, companies)`.
    pub async fn counts(&self) -> Result<(i64, i64), AppError> {
        let mut conn = self.connect().await?;
        let result: Result<(i64, i64), sqlx::Error> = sqlx::query_as(
            "SELECT (SELECT COUNT(*) FROM vacancy), (SELECT COUNT(*) FROM company)",
        )
        .fetch_one(&mut conn)
        .await;
        release(conn).await;
        Ok(result?)
    }

    /// Round-trip a trivial query; backs the readiness probe.
    pub async fn ping(&self) -> Result<(), AppError> {
        let mut conn = self.connect().await?;
        let result = conn.ping().await;
        release(conn).await;
        Ok(result?)
    }
}

async fn create_database_if_missing(
    conn: &mut PgConnection,
    database: &str,
) -> Result<bool, sqlx::Error> {
    let (exists,): (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
            .bind(database)
            .fetch_one(&mut *conn)
            .await?;
    if exists {
        return Ok(false);
    }

    // CREATE DATABASE takes no bind parameters; the name was validated in Store::new.
    sqlx::query(&format!(
        "CREATE DATABASE \"{database}\" WITH ENCODING 'UTF8'"
    ))
    .execute(&mut *conn)
    .await?;
    Ok(true)
}

/// Close a connection, logging rather than failing if the goodbye is lost.
pub(crate) async fn release(conn: PgConnection) {
    if let Err(e) = conn.close().await {
        tracing::warn!("Failed to close database connection: {e}");
    }
}

/// Database names are spliced into DDL, so only plain identifiers are accepted.
pub fn validate_database_name(name: &str) -> Result<(), AppError> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if !valid_start || !valid_rest || name.len() > MAX_IDENTIFIER_LEN {
        return Err(AppError::Validation(format!(
            "Invalid database name '{name}': use letters, digits and underscores, starting with a letter"
        )));
    }
    Ok(())
}
