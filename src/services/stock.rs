use std::{collections::HashMap, sync::Arc};

use chrono::{Duration, Local, NaiveDate, NaiveDateTime};

use crate::{
    db::{
        models::{
            Alerte, AlertePayload, Lot, LotPayload, LotView, Medicin, MouvementPayload,
            MouvementStock, TypeAlert,
        },
        stock::{AlerteStore, LotStore, MouvementStore},
        store::MedicinStore,
    },
    error::ServiceError,
};

/// Lots, stock movements and alerts.
///
/// Movements are a journal only: recording one does not change the quantity
/// of its lot or medicine.
#[derive(Clone)]
pub struct StockService {
    medicins: Arc<dyn MedicinStore>,
    lots: Arc<dyn LotStore>,
    mouvements: Arc<dyn MouvementStore>,
    alertes: Arc<dyn AlerteStore>,
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

fn not_found(entity: &'static str, id: i64) -> ServiceError {
    ServiceError::NotFound { entity, id }
}

impl StockService {
    pub fn new(
        medicins: Arc<dyn MedicinStore>,
        lots: Arc<dyn LotStore>,
        mouvements: Arc<dyn MouvementStore>,
        alertes: Arc<dyn AlerteStore>,
    ) -> Self {
        Self {
            medicins,
            lots,
            mouvements,
            alertes,
        }
    }

    /// Registers a new lot of an existing medicine.
    ///
    /// Parameters:
    /// - `payload`: The lot fields. A missing `dateEntree` is set to now.
    ///
    /// Returns:
    /// - `Ok(LotView)` with the saved lot and its medicine.
    /// - `Err(ServiceError::NotFound)` if `medicinId` names no medicine.
    pub async fn create_lot(&self, payload: LotPayload) -> Result<LotView, ServiceError> {
        let medicin = self
            .medicins
            .find_by_id(payload.medicin_id)
            .await?
            .ok_or_else(|| not_found("Médicament", payload.medicin_id))?;

        let date_entree = payload.date_entree.unwrap_or_else(now);
        let lot = self.lots.insert(&payload, date_entree).await?;
        log::info!(
            "Lot {} registered for {:?} ({} unités, expire le {})",
            lot.numero_lot,
            medicin.name,
            lot.quantite,
            lot.date_expiration
        );

        Ok(LotView {
            lot,
            medicin: Some(medicin),
        })
    }

    /// Lists lots in id order, each with its medicine embedded.
    ///
    /// Parameters:
    /// - `user_id`: Restricts the result to one owner when given.
    pub async fn list_lots(&self, user_id: Option<&str>) -> Result<Vec<LotView>, ServiceError> {
        let lots = match user_id {
            Some(user_id) => self.lots.find_by_user_id(user_id).await?,
            None => self.lots.find_all().await?,
        };
        let medicins = self.medicins_by_id().await?;

        Ok(lots
            .into_iter()
            .map(|lot| LotView {
                medicin: medicins.get(&lot.medicin_id).cloned(),
                lot,
            })
            .collect())
    }

    pub async fn get_lot(&self, id: i64) -> Result<LotView, ServiceError> {
        let lot = self
            .lots
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found("Lot", id))?;
        let medicin = self.medicins.find_by_id(lot.medicin_id).await?;
        Ok(LotView { lot, medicin })
    }

    /// Lots expiring on or before `today + window_days`, soonest first.
    pub async fn expiring_lots(
        &self,
        today: NaiveDate,
        window_days: i64,
    ) -> Result<Vec<Lot>, ServiceError> {
        Ok(self
            .lots
            .find_expiring(today + Duration::days(window_days))
            .await?)
    }

    /// Records a stock movement against an existing lot.
    ///
    /// Parameters:
    /// - `payload`: The movement. A missing `dateMouvement` is set to now.
    ///
    /// Returns:
    /// - `Ok(MouvementStock)` with the saved movement.
    /// - `Err(ServiceError::NotFound)` if `lotId` names no lot.
    pub async fn create_mouvement(
        &self,
        payload: MouvementPayload,
    ) -> Result<MouvementStock, ServiceError> {
        self.require_lot(payload.lot_id).await?;
        let date = payload.date_mouvement.unwrap_or_else(now);
        let mouvement = self.mouvements.insert(&payload, date).await?;
        log::info!(
            "Mouvement {} {} x{} on lot {}",
            mouvement.id,
            mouvement.kind.as_str(),
            mouvement.quantite,
            mouvement.lot_id
        );
        Ok(mouvement)
    }

    /// Movements newest first, optionally for one lot only.
    pub async fn list_mouvements(
        &self,
        lot_id: Option<i64>,
    ) -> Result<Vec<MouvementStock>, ServiceError> {
        let mouvements = match lot_id {
            Some(lot_id) => self.mouvements.find_by_lot_id(lot_id).await?,
            None => self.mouvements.find_all().await?,
        };
        Ok(mouvements)
    }

    pub async fn get_mouvement(&self, id: i64) -> Result<MouvementStock, ServiceError> {
        self.mouvements
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found("Mouvement", id))
    }

    /// Replaces movement `id`. Without a `dateMouvement` the stored date is kept.
    ///
    /// Returns:
    /// - `Err(ServiceError::NotFound)` if the movement or its new lot is unknown.
    pub async fn update_mouvement(
        &self,
        id: i64,
        payload: MouvementPayload,
    ) -> Result<MouvementStock, ServiceError> {
        let existing = self.get_mouvement(id).await?;
        self.require_lot(payload.lot_id).await?;
        let date = payload.date_mouvement.unwrap_or(existing.date_mouvement);

        self.mouvements
            .update(id, &payload, date)
            .await?
            .ok_or_else(|| not_found("Mouvement", id))
    }

    pub async fn delete_mouvement(&self, id: i64) -> Result<(), ServiceError> {
        if !self.mouvements.delete_by_id(id).await? {
            return Err(not_found("Mouvement", id));
        }
        log::info!("Mouvement {} deleted", id);
        Ok(())
    }

    /// Raises an alert on an existing lot.
    ///
    /// Parameters:
    /// - `payload`: The alert. A missing `dateAlerte` is set to now.
    ///
    /// Returns:
    /// - `Ok(Alerte)` with the saved alert.
    /// - `Err(ServiceError::NotFound)` if `lotId` names no lot.
    pub async fn create_alerte(&self, payload: AlertePayload) -> Result<Alerte, ServiceError> {
        self.require_lot(payload.lot_id).await?;
        let date = payload.date_alerte.unwrap_or_else(now);
        let alerte = self.alertes.insert(&payload, date).await?;
        log::info!(
            "Alerte {} ({}) on lot {}: {}",
            alerte.id,
            alerte.kind.as_str(),
            alerte.lot_id,
            alerte.message
        );
        Ok(alerte)
    }

    /// Alerts in id order; with `user_id`, only those on lots that user owns.
    pub async fn list_alertes(&self, user_id: Option<&str>) -> Result<Vec<Alerte>, ServiceError> {
        let alertes = match user_id {
            Some(user_id) => self.alertes.find_by_user_id(user_id).await?,
            None => self.alertes.find_all().await?,
        };
        Ok(alertes)
    }

    pub async fn get_alerte(&self, id: i64) -> Result<Alerte, ServiceError> {
        self.alertes
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found("Alerte", id))
    }

    /// Replaces alert `id`, typically to mark it resolved. Without a
    /// `dateAlerte` the stored date is kept.
    pub async fn update_alerte(
        &self,
        id: i64,
        payload: AlertePayload,
    ) -> Result<Alerte, ServiceError> {
        let existing = self.get_alerte(id).await?;
        self.require_lot(payload.lot_id).await?;
        let date = payload.date_alerte.unwrap_or(existing.date_alerte);

        self.alertes
            .update(id, &payload, date)
            .await?
            .ok_or_else(|| not_found("Alerte", id))
    }

    pub async fn delete_alerte(&self, id: i64) -> Result<(), ServiceError> {
        if !self.alertes.delete_by_id(id).await? {
            return Err(not_found("Alerte", id));
        }
        log::info!("Alerte {} deleted", id);
        Ok(())
    }

    /// Raises an `EXPIRATION` alert for every lot expiring within the window.
    ///
    /// Parameters:
    /// - `today`: The reference date.
    /// - `window_days`: How far ahead of `today` a lot counts as expiring.
    ///
    /// Lots that already carry an unresolved `EXPIRATION` alert are skipped,
    /// so running the check repeatedly does not pile up duplicates.
    ///
    /// Returns:
    /// - `Ok(Vec<Alerte>)` with only the alerts created by this call.
    pub async fn raise_expiry_alerts(
        &self,
        today: NaiveDate,
        window_days: i64,
    ) -> Result<Vec<Alerte>, ServiceError> {
        let lots = self.expiring_lots(today, window_days).await?;
        if lots.is_empty() {
            return Ok(Vec::new());
        }

        let medicins = self.medicins_by_id().await?;
        let mut raised = Vec::new();
        for lot in lots {
            if self.alertes.has_open(lot.id, TypeAlert::Expiration).await? {
                continue;
            }

            let message = expiry_message(&lot, medicins.get(&lot.medicin_id), today);
            log::warn!("{}", message);
            let payload = AlertePayload {
                kind: TypeAlert::Expiration,
                message,
                est_resolue: false,
                date_alerte: None,
                lot_id: lot.id,
            };
            raised.push(self.alertes.insert(&payload, now()).await?);
        }
        Ok(raised)
    }

    async fn require_lot(&self, lot_id: i64) -> Result<Lot, ServiceError> {
        self.lots
            .find_by_id(lot_id)
            .await?
            .ok_or_else(|| not_found("Lot", lot_id))
    }

    async fn medicins_by_id(&self) -> Result<HashMap<i64, Medicin>, ServiceError> {
        Ok(self
            .medicins
            .find_all()
            .await?
            .into_iter()
            .map(|m| (m.id, m))
            .collect())
    }
}

fn expiry_message(lot: &Lot, medicin: Option<&Medicin>, today: NaiveDate) -> String {
    let name = medicin
        .and_then(|m| m.name.as_deref())
        .unwrap_or("médicament inconnu");
    let days = (lot.date_expiration - today).num_days();
    let when = lot.date_expiration.format("%d-%m-%Y");

    if days < 0 {
        format!("Le lot {} de {} a expiré le {}", lot.numero_lot, name, when)
    } else {
        format!(
            "Le lot {} de {} expire le {} (dans {} jours)",
            lot.numero_lot, name, when, days
        )
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{
        db::{memory_pool, models::TypeMouvement, store::SqliteStore},
        services::{tests::payload, MedicinService},
    };

    pub(crate) async fn services() -> (MedicinService, StockService) {
        let store = Arc::new(SqliteStore::new(memory_pool().await));
        let medicins = MedicinService::new(store.clone(), store.clone());
        let stock = StockService::new(store.clone(), store.clone(), store.clone(), store);
        (medicins, stock)
    }

    pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub(crate) fn lot(numero: &str, medicin_id: i64, expires: NaiveDate) -> LotPayload {
        LotPayload {
            numero_lot: numero.to_string(),
            date_expiration: expires,
            date_entree: None,
            quantite: 25,
            medicin_id,
            user_id: Some("u1".to_string()),
        }
    }

    fn sortie(lot_id: i64, quantite: i32) -> MouvementPayload {
        MouvementPayload {
            motif: "vente".to_string(),
            date_mouvement: None,
            kind: TypeMouvement::Sortie,
            lot_id,
            utilisateur_id: 1,
            quantite,
        }
    }

    #[tokio::test]
    async fn create_lot_embeds_its_medicine() {
        let (medicins, stock) = services().await;
        let doliprane = medicins
            .create(payload("Doliprane", "u1", Some(10), Some(2)))
            .await
            .unwrap();

        let view = stock
            .create_lot(lot("L-01", doliprane.id, date(2026, 5, 1)))
            .await
            .unwrap();

        assert_eq!(view.lot.numero_lot, "L-01");
        assert_eq!(view.medicin, Some(doliprane));
        assert_eq!(stock.get_lot(view.lot.id).await.unwrap(), view);
    }

    #[tokio::test]
    async fn create_lot_requires_an_existing_medicine() {
        let (_, stock) = services().await;

        let err = stock
            .create_lot(lot("L-01", 42, date(2026, 5, 1)))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::NotFound { entity: "Médicament", id: 42 }));
        assert!(stock.list_lots(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_lots_filters_by_owner_and_survives_medicine_deletion() {
        let (medicins, stock) = services().await;
        let m = medicins.create(payload("Advil", "u1", None, None)).await.unwrap();
        stock.create_lot(lot("A", m.id, date(2026, 1, 1))).await.unwrap();
        let mut other = lot("B", m.id, date(2026, 1, 1));
        other.user_id = Some("u2".to_string());
        stock.create_lot(other).await.unwrap();

        medicins.delete(m.id).await.unwrap();

        let mine = stock.list_lots(Some("u1")).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].lot.numero_lot, "A");
        assert_eq!(mine[0].medicin, None);
        assert_eq!(stock.list_lots(None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn mouvements_need_a_lot_and_keep_their_date_on_update() {
        let (medicins, stock) = services().await;
        let m = medicins.create(payload("Smecta", "u1", None, None)).await.unwrap();
        let l = stock.create_lot(lot("S-1", m.id, date(2026, 1, 1))).await.unwrap();

        assert!(matches!(
            stock.create_mouvement(sortie(99, 1)).await.unwrap_err(),
            ServiceError::NotFound { entity: "Lot", id: 99 }
        ));

        let created = stock.create_mouvement(sortie(l.lot.id, 4)).await.unwrap();
        let updated = stock
            .update_mouvement(created.id, sortie(l.lot.id, 6))
            .await
            .unwrap();
        assert_eq!(updated.quantite, 6);
        assert_eq!(updated.date_mouvement, created.date_mouvement);
        assert_eq!(stock.list_mouvements(Some(l.lot.id)).await.unwrap(), vec![updated]);
        assert!(stock.list_mouvements(Some(l.lot.id + 1)).await.unwrap().is_empty());

        stock.delete_mouvement(created.id).await.unwrap();
        assert!(matches!(
            stock.delete_mouvement(created.id).await.unwrap_err(),
            ServiceError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn expiry_alerts_are_raised_once_per_lot() {
        let (medicins, stock) = services().await;
        let m = medicins.create(payload("Aspirine", "u1", None, None)).await.unwrap();
        let soon = stock.create_lot(lot("SOON", m.id, date(2025, 3, 1))).await.unwrap();
        stock.create_lot(lot("LATER", m.id, date(2026, 3, 1))).await.unwrap();
        let today = date(2025, 1, 1);

        let raised = stock.raise_expiry_alerts(today, 90).await.unwrap();
        assert_eq!(raised.len(), 1);
        assert_eq!(raised[0].lot_id, soon.lot.id);
        assert_eq!(raised[0].kind, TypeAlert::Expiration);
        assert_eq!(
            raised[0].message,
            "Le lot SOON de Aspirine expire le 01-03-2025 (dans 59 jours)"
        );

        assert!(stock.raise_expiry_alerts(today, 90).await.unwrap().is_empty());

        let mut resolved = AlertePayload {
            kind: TypeAlert::Expiration,
            message: raised[0].message.clone(),
            est_resolue: true,
            date_alerte: None,
            lot_id: soon.lot.id,
        };
        stock.update_alerte(raised[0].id, resolved.clone()).await.unwrap();
        assert_eq!(stock.raise_expiry_alerts(today, 90).await.unwrap().len(), 1);

        resolved.lot_id = 500;
        assert!(stock.update_alerte(raised[0].id, resolved).await.is_err());
        assert_eq!(stock.list_alertes(Some("u1")).await.unwrap().len(), 2);
        assert!(stock.list_alertes(Some("u2")).await.unwrap().is_empty());
    }

    #[test]
    fn expired_lots_are_worded_in_the_past() {
        let l = Lot {
            id: 1,
            numero_lot: "X9".to_string(),
            date_expiration: date(2024, 12, 31),
            date_entree: date(2024, 1, 1).and_hms_opt(8, 0, 0).unwrap(),
            quantite: 1,
            medicin_id: 1,
            user_id: None,
        };

        assert_eq!(
            expiry_message(&l, None, date(2025, 1, 10)),
            "Le lot X9 de médicament inconnu a expiré le 31-12-2024"
        );
    }
}
