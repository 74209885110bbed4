//! Storage capabilities used by the service layer, and their SQLite implementation.
//!
//! The traits are deliberately narrow: the service only ever needs keyed
//! reads, full scans, an owner filter, and single-row writes. Each call is
//! independent; nothing here groups calls into a transaction.

use async_trait::async_trait;
use sqlx::SqlitePool;

use super::{
    models::{HistoriqueMedicin, Medicin, MedicinPayload, NewHistorique},
    DatabaseError,
};

#[async_trait]
pub trait MedicinStore: Send + Sync {
    /// Persists a new medicine; the store assigns the id.
    async fn insert(&self, payload: &MedicinPayload) -> Result<Medicin, DatabaseError>;
    /// Writes every column of `medicin` back to its row.
    async fn update(&self, medicin: &Medicin) -> Result<Medicin, DatabaseError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Medicin>, DatabaseError>;
    async fn find_all(&self) -> Result<Vec<Medicin>, DatabaseError>;
    async fn find_by_user_id(&self, user_id: &str) -> Result<Vec<Medicin>, DatabaseError>;
    async fn delete_by_id(&self, id: i64) -> Result<(), DatabaseError>;
}

#[async_trait]
pub trait HistoriqueStore: Send + Sync {
    async fn insert(&self, entry: &NewHistorique) -> Result<HistoriqueMedicin, DatabaseError>;
    async fn find_all(&self) -> Result<Vec<HistoriqueMedicin>, DatabaseError>;
}

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl MedicinStore for SqliteStore {
    async fn insert(&self, payload: &MedicinPayload) -> Result<Medicin, DatabaseError> {
        let medicin = sqlx::query_as::<_, Medicin>(
            "INSERT INTO medicins (name, fabriquant, description, quantity, seuil_alerte, user_id)
             VALUES (?, ?, ?, ?, ?, ?)
             RETURNING *",
        )
        .bind(&payload.name)
        .bind(&payload.fabriquant)
        .bind(&payload.description)
        .bind(payload.quantity)
        .bind(payload.seuil_alerte)
        .bind(&payload.user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(medicin)
    }

    async fn update(&self, medicin: &Medicin) -> Result<Medicin, DatabaseError> {
        let medicin = sqlx::query_as::<_, Medicin>(
            "UPDATE medicins
             SET name = ?, fabriquant = ?, description = ?, quantity = ?,
                 seuil_alerte = ?, user_id = ?
             WHERE id = ?
             RETURNING *",
        )
        .bind(&medicin.name)
        .bind(&medicin.fabriquant)
        .bind(&medicin.description)
        .bind(medicin.quantity)
        .bind(medicin.seuil_alerte)
        .bind(&medicin.user_id)
        .bind(medicin.id)
        .fetch_one(&self.pool)
        .await?;

        Ok(medicin)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Medicin>, DatabaseError> {
        let medicin = sqlx::query_as::<_, Medicin>("SELECT * FROM medicins WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(medicin)
    }

    async fn find_all(&self) -> Result<Vec<Medicin>, DatabaseError> {
        let medicins = sqlx::query_as::<_, Medicin>("SELECT * FROM medicins ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(medicins)
    }

    async fn find_by_user_id(&self, user_id: &str) -> Result<Vec<Medicin>, DatabaseError> {
        let medicins =
            sqlx::query_as::<_, Medicin>("SELECT * FROM medicins WHERE user_id = ? ORDER BY id")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(medicins)
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), DatabaseError> {
        sqlx::query("DELETE FROM medicins WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl HistoriqueStore for SqliteStore {
    async fn insert(&self, entry: &NewHistorique) -> Result<HistoriqueMedicin, DatabaseError> {
        let historique = sqlx::query_as::<_, HistoriqueMedicin>(
            "INSERT INTO historique_medicin (action, medicin_name, user_id, date_action)
             VALUES (?, ?, ?, ?)
             RETURNING *",
        )
        .bind(entry.action.as_str())
        .bind(&entry.medicin_name)
        .bind(&entry.user_id)
        .bind(entry.date_action)
        .fetch_one(&self.pool)
        .await?;

        Ok(historique)
    }

    async fn find_all(&self) -> Result<Vec<HistoriqueMedicin>, DatabaseError> {
        let entries =
            sqlx::query_as::<_, HistoriqueMedicin>("SELECT * FROM historique_medicin ORDER BY id")
                .fetch_all(&self.pool)
                .await?;
        Ok(entries)
    }
}
