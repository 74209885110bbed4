use std::sync::Arc;

use crate::{
    db::{
        models::{Action, HistoriqueMedicin, Medicin, MedicinPayload, NewHistorique},
        store::{HistoriqueStore, MedicinStore},
    },
    error::ServiceError,
};

pub mod monitor;
pub mod stock;

pub use stock::StockService;

/// Medicine management plus the audit trail every mutation leaves behind.
///
/// The primary write and its audit write are two separate store calls. If the
/// audit write fails, the primary change stays committed and the error is
/// returned to the caller.
#[derive(Clone)]
pub struct MedicinService {
    medicins: Arc<dyn MedicinStore>,
    historique: Arc<dyn HistoriqueStore>,
}

impl MedicinService {
    pub fn new(medicins: Arc<dyn MedicinStore>, historique: Arc<dyn HistoriqueStore>) -> Self {
        Self {
            medicins,
            historique,
        }
    }

    /// Saves a new medicine and records an `Ajout` entry for it.
    ///
    /// Parameters:
    /// - `payload`: The client's fields. The store assigns the id.
    ///
    /// Returns:
    /// - `Ok(Medicin)` with the saved row.
    /// - `Err(ServiceError::Database)` if either write fails. When only the
    ///   audit write fails the medicine is already saved.
    pub async fn create(&self, payload: MedicinPayload) -> Result<Medicin, ServiceError> {
        let saved = self.medicins.insert(&payload).await?;
        self.record(Action::Ajout, &saved).await?;
        Ok(saved)
    }

    /// Overwrites the mutable fields of medicine `id`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::MedicinNotFound`] when `id` does not exist; no
    /// audit row is written in that case.
    pub async fn update(&self, id: i64, payload: MedicinPayload) -> Result<Medicin, ServiceError> {
        let mut medicin = self
            .medicins
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::MedicinNotFound(id))?;

        medicin.apply(payload);
        let saved = self.medicins.update(&medicin).await?;
        self.record(Action::Modification, &saved).await?;
        Ok(saved)
    }

    /// Deletes medicine `id`. An unknown id is silently ignored.
    ///
    /// The audit row is written from the pre-deletion snapshot, before the
    /// row is removed.
    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        let Some(medicin) = self.medicins.find_by_id(id).await? else {
            log::debug!("Delete of unknown medicin {} ignored", id);
            return Ok(());
        };

        self.record(Action::Suppression, &medicin).await?;
        self.medicins.delete_by_id(id).await?;
        Ok(())
    }

    /// Lists medicines in id order.
    ///
    /// Parameters:
    /// - `user_id`: Restricts the result to one owner when given.
    ///
    /// Returns:
    /// - `Ok(Vec<Medicin>)`, possibly empty.
    pub async fn list(&self, user_id: Option<&str>) -> Result<Vec<Medicin>, ServiceError> {
        let medicins = match user_id {
            Some(user_id) => self.medicins.find_by_user_id(user_id).await?,
            None => self.medicins.find_all().await?,
        };
        Ok(medicins)
    }

    /// Looks up one medicine. An unknown id is `Ok(None)`, not an error.
    pub async fn get(&self, id: i64) -> Result<Option<Medicin>, ServiceError> {
        Ok(self.medicins.find_by_id(id).await?)
    }

    /// Medicines whose quantity is at or below their alert threshold.
    ///
    /// Parameters:
    /// - `user_id`: Same owner filter as [`MedicinService::list`].
    ///
    /// Returns:
    /// - `Ok(Vec<Medicin>)` in id order. Rows missing either value are left out.
    pub async fn low_stock(&self, user_id: Option<&str>) -> Result<Vec<Medicin>, ServiceError> {
        let medicins = self.list(user_id).await?;
        Ok(medicins.into_iter().filter(Medicin::is_low_stock).collect())
    }

    /// Every audit entry in write order, including those of deleted medicines.
    pub async fn historique(&self) -> Result<Vec<HistoriqueMedicin>, ServiceError> {
        Ok(self.historique.find_all().await?)
    }

    async fn record(&self, action: Action, medicin: &Medicin) -> Result<(), ServiceError> {
        let entry = self
            .historique
            .insert(&NewHistorique::record(action, medicin))
            .await?;
        log::debug!(
            "Recorded {} for medicin {:?} (historique {})",
            action,
            medicin.name,
            entry.id
        );
        Ok(())
    }
}
