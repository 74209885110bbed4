use std::str::FromStr;

use sqlx::{sqlite::SqliteConnectOptions, Error, SqlitePool};
use thiserror::Error;

pub mod models;
pub mod stock;
pub mod store;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Failed to parse database URL: {0}")]
    UrlParse(String),
    #[error("Database error: {0}")]
    Sqlx(#[from] Error),
    #[error("Failed to create schema: {0}")]
    Migration(String),
}

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS medicins (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT,
        fabriquant TEXT,
        description TEXT,
        quantity INTEGER,
        seuil_alerte INTEGER,
        user_id TEXT
    )",
    "CREATE INDEX IF NOT EXISTS idx_medicins_user_id ON medicins (user_id)",
    "CREATE TABLE IF NOT EXISTS historique_medicin (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        action TEXT NOT NULL,
        medicin_name TEXT,
        user_id TEXT,
        date_action DATETIME NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS lots (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        numero_lot TEXT NOT NULL,
        date_expiration DATE NOT NULL,
        date_entree DATETIME NOT NULL,
        quantite INTEGER NOT NULL,
        medicin_id INTEGER NOT NULL,
        user_id TEXT
    )",
    "CREATE INDEX IF NOT EXISTS idx_lots_user_id ON lots (user_id)",
    "CREATE TABLE IF NOT EXISTS mouvements_stock (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        motif TEXT NOT NULL,
        date_mouvement DATETIME NOT NULL,
        type_mouvement TEXT NOT NULL,
        lot_id INTEGER NOT NULL,
        utilisateur_id INTEGER NOT NULL,
        quantite INTEGER NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS alertes (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        type_alerte TEXT NOT NULL,
        message TEXT NOT NULL,
        est_resolue BOOLEAN NOT NULL DEFAULT 0,
        date_alerte DATETIME NOT NULL,
        lot_id INTEGER NOT NULL
    )",
];

/// Opens the SQLite pool and makes sure every table exists.
///
/// Parameters:
/// - `database_url`: a `sqlite://` URL; the file is created when missing.
///
/// Returns:
/// - `Ok(SqlitePool)` ready for the stores.
/// - `Err(DatabaseError::UrlParse)` if the URL or its options are invalid.
/// - `Err(DatabaseError::Sqlx)` / `Err(DatabaseError::Migration)` if the
///   connection or the schema creation fails.
pub async fn init_db(database_url: &str) -> Result<SqlitePool, DatabaseError> {
    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| DatabaseError::UrlParse(e.to_string()))?
        .create_if_missing(true);

    let pool = SqlitePool::connect_with(options).await?;
    ensure_schema(&pool).await?;

    log::info!("Database ready at {}", database_url);
    Ok(pool)
}

/// Runs the idempotent `CREATE ... IF NOT EXISTS` statements.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), DatabaseError> {
    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| DatabaseError::Migration(e.to_string()))?;
    }
    Ok(())
}

/// Single-connection in-memory database; every connection to `:memory:` is a
/// fresh database, so the pool must never open a second one.
#[cfg(test)]
pub(crate) async fn memory_pool() -> SqlitePool {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    ensure_schema(&pool).await.unwrap();
    pool
}
