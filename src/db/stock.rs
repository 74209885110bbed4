//! Storage for lots, stock movements and alerts.
//!
//! Timestamps are resolved by the caller and passed in explicitly; the stores
//! never read the clock.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};

use super::{
    models::{Alerte, AlertePayload, Lot, LotPayload, MouvementPayload, MouvementStock, TypeAlert},
    store::SqliteStore,
    DatabaseError,
};

#[async_trait]
pub trait LotStore: Send + Sync {
    async fn insert(
        &self,
        payload: &LotPayload,
        date_entree: NaiveDateTime,
    ) -> Result<Lot, DatabaseError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Lot>, DatabaseError>;
    async fn find_all(&self) -> Result<Vec<Lot>, DatabaseError>;
    async fn find_by_user_id(&self, user_id: &str) -> Result<Vec<Lot>, DatabaseError>;
    /// Lots whose expiration date is on or before `limit`, soonest first.
    async fn find_expiring(&self, limit: NaiveDate) -> Result<Vec<Lot>, DatabaseError>;
}

#[async_trait]
pub trait MouvementStore: Send + Sync {
    async fn insert(
        &self,
        payload: &MouvementPayload,
        date_mouvement: NaiveDateTime,
    ) -> Result<MouvementStock, DatabaseError>;
    /// Returns `None` when no row has this id.
    async fn update(
        &self,
        id: i64,
        payload: &MouvementPayload,
        date_mouvement: NaiveDateTime,
    ) -> Result<Option<MouvementStock>, DatabaseError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<MouvementStock>, DatabaseError>;
    /// Newest movement first.
    async fn find_all(&self) -> Result<Vec<MouvementStock>, DatabaseError>;
    async fn find_by_lot_id(&self, lot_id: i64) -> Result<Vec<MouvementStock>, DatabaseError>;
    /// Returns whether a row was removed.
    async fn delete_by_id(&self, id: i64) -> Result<bool, DatabaseError>;
}

#[async_trait]
pub trait AlerteStore: Send + Sync {
    async fn insert(
        &self,
        payload: &AlertePayload,
        date_alerte: NaiveDateTime,
    ) -> Result<Alerte, DatabaseError>;
    async fn update(
        &self,
        id: i64,
        payload: &AlertePayload,
        date_alerte: NaiveDateTime,
    ) -> Result<Option<Alerte>, DatabaseError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Alerte>, DatabaseError>;
    async fn find_all(&self) -> Result<Vec<Alerte>, DatabaseError>;
    /// Alerts on lots owned by `user_id`.
    async fn find_by_user_id(&self, user_id: &str) -> Result<Vec<Alerte>, DatabaseError>;
    async fn has_open(&self, lot_id: i64, kind: TypeAlert) -> Result<bool, DatabaseError>;
    async fn delete_by_id(&self, id: i64) -> Result<bool, DatabaseError>;
}

#[async_trait]
impl LotStore for SqliteStore {
    async fn insert(
        &self,
        payload: &LotPayload,
        date_entree: NaiveDateTime,
    ) -> Result<Lot, DatabaseError> {
        let lot = sqlx::query_as::<_, Lot>(
            "INSERT INTO lots (numero_lot, date_expiration, date_entree, quantite, medicin_id, user_id)
             VALUES (?, ?, ?, ?, ?, ?)
             RETURNING *",
        )
        .bind(&payload.numero_lot)
        .bind(payload.date_expiration)
        .bind(date_entree)
        .bind(payload.quantite)
        .bind(payload.medicin_id)
        .bind(&payload.user_id)
        .fetch_one(self.pool())
        .await?;

        Ok(lot)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Lot>, DatabaseError> {
        let lot = sqlx::query_as::<_, Lot>("SELECT * FROM lots WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(lot)
    }

    async fn find_all(&self) -> Result<Vec<Lot>, DatabaseError> {
        let lots = sqlx::query_as::<_, Lot>("SELECT * FROM lots ORDER BY id")
            .fetch_all(self.pool())
            .await?;
        Ok(lots)
    }

    async fn find_by_user_id(&self, user_id: &str) -> Result<Vec<Lot>, DatabaseError> {
        let lots = sqlx::query_as::<_, Lot>("SELECT * FROM lots WHERE user_id = ? ORDER BY id")
            .bind(user_id)
            .fetch_all(self.pool())
            .await?;
        Ok(lots)
    }

    async fn find_expiring(&self, limit: NaiveDate) -> Result<Vec<Lot>, DatabaseError> {
        let lots = sqlx::query_as::<_, Lot>(
            "SELECT * FROM lots WHERE date_expiration <= ? ORDER BY date_expiration, id",
        )
        .bind(limit)
        .fetch_all(self.pool())
        .await?;
        Ok(lots)
    }
}

#[async_trait]
impl MouvementStore for SqliteStore {
    async fn insert(
        &self,
        payload: &MouvementPayload,
        date_mouvement: NaiveDateTime,
    ) -> Result<MouvementStock, DatabaseError> {
        let mouvement = sqlx::query_as::<_, MouvementStock>(
            "INSERT INTO mouvements_stock (motif, date_mouvement, type_mouvement, lot_id, utilisateur_id, quantite)
             VALUES (?, ?, ?, ?, ?, ?)
             RETURNING *",
        )
        .bind(&payload.motif)
        .bind(date_mouvement)
        .bind(payload.kind.as_str())
        .bind(payload.lot_id)
        .bind(payload.utilisateur_id)
        .bind(payload.quantite)
        .fetch_one(self.pool())
        .await?;

        Ok(mouvement)
    }

    async fn update(
        &self,
        id: i64,
        payload: &MouvementPayload,
        date_mouvement: NaiveDateTime,
    ) -> Result<Option<MouvementStock>, DatabaseError> {
        let mouvement = sqlx::query_as::<_, MouvementStock>(
            "UPDATE mouvements_stock
             SET motif = ?, date_mouvement = ?, type_mouvement = ?, lot_id = ?,
                 utilisateur_id = ?, quantite = ?
             WHERE id = ?
             RETURNING *",
        )
        .bind(&payload.motif)
        .bind(date_mouvement)
        .bind(payload.kind.as_str())
        .bind(payload.lot_id)
        .bind(payload.utilisateur_id)
        .bind(payload.quantite)
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(mouvement)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<MouvementStock>, DatabaseError> {
        let mouvement =
            sqlx::query_as::<_, MouvementStock>("SELECT * FROM mouvements_stock WHERE id = ?")
                .bind(id)
                .fetch_optional(self.pool())
                .await?;
        Ok(mouvement)
    }

    async fn find_all(&self) -> Result<Vec<MouvementStock>, DatabaseError> {
        let mouvements = sqlx::query_as::<_, MouvementStock>(
            "SELECT * FROM mouvements_stock ORDER BY date_mouvement DESC, id DESC",
        )
        .fetch_all(self.pool())
        .await?;
        Ok(mouvements)
    }

    async fn find_by_lot_id(&self, lot_id: i64) -> Result<Vec<MouvementStock>, DatabaseError> {
        let mouvements = sqlx::query_as::<_, MouvementStock>(
            "SELECT * FROM mouvements_stock WHERE lot_id = ? ORDER BY date_mouvement DESC, id DESC",
        )
        .bind(lot_id)
        .fetch_all(self.pool())
        .await?;
        Ok(mouvements)
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM mouvements_stock WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl AlerteStore for SqliteStore {
    async fn insert(
        &self,
        payload: &AlertePayload,
        date_alerte: NaiveDateTime,
    ) -> Result<Alerte, DatabaseError> {
        let alerte = sqlx::query_as::<_, Alerte>(
            "INSERT INTO alertes (type_alerte, message, est_resolue, date_alerte, lot_id)
             VALUES (?, ?, ?, ?, ?)
             RETURNING *",
        )
        .bind(payload.kind.as_str())
        .bind(&payload.message)
        .bind(payload.est_resolue)
        .bind(date_alerte)
        .bind(payload.lot_id)
        .fetch_one(self.pool())
        .await?;

        Ok(alerte)
    }

    async fn update(
        &self,
        id: i64,
        payload: &AlertePayload,
        date_alerte: NaiveDateTime,
    ) -> Result<Option<Alerte>, DatabaseError> {
        let alerte = sqlx::query_as::<_, Alerte>(
            "UPDATE alertes
             SET type_alerte = ?, message = ?, est_resolue = ?, date_alerte = ?, lot_id = ?
             WHERE id = ?
             RETURNING *",
        )
        .bind(payload.kind.as_str())
        .bind(&payload.message)
        .bind(payload.est_resolue)
        .bind(date_alerte)
        .bind(payload.lot_id)
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(alerte)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Alerte>, DatabaseError> {
        let alerte = sqlx::query_as::<_, Alerte>("SELECT * FROM alertes WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(alerte)
    }

    async fn find_all(&self) -> Result<Vec<Alerte>, DatabaseError> {
        let alertes = sqlx::query_as::<_, Alerte>("SELECT * FROM alertes ORDER BY id")
            .fetch_all(self.pool())
            .await?;
        Ok(alertes)
    }

    async fn find_by_user_id(&self, user_id: &str) -> Result<Vec<Alerte>, DatabaseError> {
        let alertes = sqlx::query_as::<_, Alerte>(
            "SELECT a.* FROM alertes a JOIN lots l ON a.lot_id = l.id
             WHERE l.user_id = ? ORDER BY a.id",
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await?;
        Ok(alertes)
    }

    async fn has_open(&self, lot_id: i64, kind: TypeAlert) -> Result<bool, DatabaseError> {
        let open: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM alertes WHERE lot_id = ? AND type_alerte = ? AND est_resolue = 0)",
        )
        .bind(lot_id)
        .bind(kind.as_str())
        .fetch_one(self.pool())
        .await?;
        Ok(open)
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM alertes WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
