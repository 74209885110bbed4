use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A tracked medicine and its current stock.
#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Medicin {
    pub id: i64,
    pub name: Option<String>,
    pub fabriquant: Option<String>,
    pub description: Option<String>,
    pub quantity: Option<i32>,
    pub seuil_alerte: Option<i32>,
    pub user_id: Option<String>,
}

impl Medicin {
    /// Low stock only holds when both the quantity and the threshold are known.
    pub fn is_low_stock(&self) -> bool {
        match (self.quantity, self.seuil_alerte) {
            (Some(quantity), Some(seuil)) => quantity <= seuil,
            _ => false,
        }
    }

    /// Overwrites the mutable fields from `payload`. `id` and `user_id` are kept.
    pub fn apply(&mut self, payload: MedicinPayload) {
        self.name = payload.name;
        self.fabriquant = payload.fabriquant;
        self.description = payload.description;
        self.seuil_alerte = payload.seuil_alerte;
        self.quantity = payload.quantity;
    }
}

/// Request body for create and update. Any `id` sent by the client is ignored.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct MedicinPayload {
    pub name: Option<String>,
    pub fabriquant: Option<String>,
    pub description: Option<String>,
    pub quantity: Option<i32>,
    pub seuil_alerte: Option<i32>,
    pub user_id: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Ajout,
    Modification,
    Suppression,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Ajout => "Ajout",
            Action::Modification => "Modification",
            Action::Suppression => "Suppression",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Action {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "Ajout" => Ok(Action::Ajout),
            "Modification" => Ok(Action::Modification),
            "Suppression" => Ok(Action::Suppression),
            _ => Err(format!("unknown action: {}", value)),
        }
    }
}

/// One audit entry. The medicine is referenced by a name snapshot, not by id,
/// so entries outlive the medicine they describe.
#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoriqueMedicin {
    pub id: i64,
    #[sqlx(try_from = "String")]
    pub action: Action,
    pub medicin_name: Option<String>,
    pub user_id: Option<String>,
    pub date_action: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct NewHistorique {
    pub action: Action,
    pub medicin_name: Option<String>,
    pub user_id: Option<String>,
    pub date_action: NaiveDateTime,
}

impl NewHistorique {
    /// Snapshots `medicin` for `action`, stamped with the server's local clock.
    pub fn record(action: Action, medicin: &Medicin) -> Self {
        Self {
            action,
            medicin_name: medicin.name.clone(),
            user_id: medicin.user_id.clone(),
            date_action: chrono::Local::now().naive_local(),
        }
    }
}

/// A dated batch of one medicine. `medicin_id` is checked on creation only;
/// deleting the medicine leaves the lot in place.
#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Lot {
    pub id: i64,
    pub numero_lot: String,
    pub date_expiration: NaiveDate,
    pub date_entree: NaiveDateTime,
    pub quantite: i32,
    pub medicin_id: i64,
    pub user_id: Option<String>,
}

/// A lot as returned to clients, with its medicine when it still exists.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LotView {
    #[serde(flatten)]
    pub lot: Lot,
    pub medicin: Option<Medicin>,
}

/// Body of `POST /api/lots`. Web forms post `quantite` and `medicinId` as
/// strings, so both accept either form. `dateEntree` defaults to now.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LotPayload {
    pub numero_lot: String,
    pub date_expiration: NaiveDate,
    pub date_entree: Option<NaiveDateTime>,
    #[serde(deserialize_with = "number_or_string::deserialize")]
    pub quantite: i32,
    #[serde(deserialize_with = "number_or_string::deserialize")]
    pub medicin_id: i64,
    pub user_id: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum TypeMouvement {
    Entree,
    Sortie,
}

impl TypeMouvement {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeMouvement::Entree => "ENTREE",
            TypeMouvement::Sortie => "SORTIE",
        }
    }
}

impl TryFrom<String> for TypeMouvement {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "ENTREE" => Ok(TypeMouvement::Entree),
            "SORTIE" => Ok(TypeMouvement::Sortie),
            _ => Err(format!("unknown movement type: {}", value)),
        }
    }
}

/// A stock movement (entry or exit) recorded against a lot.
#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MouvementStock {
    pub id: i64,
    pub motif: String,
    pub date_mouvement: NaiveDateTime,
    #[serde(rename = "type")]
    #[sqlx(rename = "type_mouvement", try_from = "String")]
    pub kind: TypeMouvement,
    pub lot_id: i64,
    pub utilisateur_id: i64,
    pub quantite: i32,
}

/// Body of `POST /mouvements` and `PUT /mouvements/:id`.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MouvementPayload {
    pub motif: String,
    pub date_mouvement: Option<NaiveDateTime>,
    #[serde(rename = "type")]
    pub kind: TypeMouvement,
    pub lot_id: i64,
    pub utilisateur_id: i64,
    pub quantite: i32,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum TypeAlert {
    Stock,
    Expiration,
}

impl TypeAlert {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeAlert::Stock => "STOCK",
            TypeAlert::Expiration => "EXPIRATION",
        }
    }
}

impl TryFrom<String> for TypeAlert {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "STOCK" => Ok(TypeAlert::Stock),
            "EXPIRATION" => Ok(TypeAlert::Expiration),
            _ => Err(format!("unknown alert type: {}", value)),
        }
    }
}

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Alerte {
    pub id: i64,
    #[serde(rename = "type")]
    #[sqlx(rename = "type_alerte", try_from = "String")]
    pub kind: TypeAlert,
    pub message: String,
    pub est_resolue: bool,
    pub date_alerte: NaiveDateTime,
    pub lot_id: i64,
}

/// Body of `POST /alertes` and `PUT /alertes/:id`.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AlertePayload {
    #[serde(rename = "type")]
    pub kind: TypeAlert,
    pub message: String,
    #[serde(default)]
    pub est_resolue: bool,
    pub date_alerte: Option<NaiveDateTime>,
    pub lot_id: i64,
}

pub mod number_or_string {
    use std::{fmt::Display, str::FromStr};

    use serde::{de::Error, Deserialize, Deserializer};

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de> + FromStr,
        T::Err: Display,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum NumberOrString<T> {
            Number(T),
            String(String),
        }

        match NumberOrString::<T>::deserialize(deserializer)? {
            NumberOrString::Number(n) => Ok(n),
            NumberOrString::String(s) => s.trim().parse().map_err(D::Error::custom),
        }
    }
}
