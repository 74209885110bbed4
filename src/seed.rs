use std::sync::Arc;

use chrono::{Duration, Local};
use envconfig::Envconfig;
use gestion_stock::{
    config::Config,
    db::{
        init_db,
        models::{LotPayload, MedicinPayload},
        store::SqliteStore,
    },
    services::{MedicinService, StockService},
};

fn medicin(
    name: &str,
    fabriquant: &str,
    description: &str,
    quantity: i32,
    seuil_alerte: i32,
    user_id: &str,
) -> MedicinPayload {
    MedicinPayload {
        name: Some(name.to_string()),
        fabriquant: Some(fabriquant.to_string()),
        description: Some(description.to_string()),
        quantity: Some(quantity),
        seuil_alerte: Some(seuil_alerte),
        user_id: Some(user_id.to_string()),
    }
}

fn get_seed_data() -> Vec<MedicinPayload> {
    vec![
        medicin("Doliprane 1000mg", "Sanofi", "Paracétamol, boîte de 8", 120, 30, "user123"),
        medicin("Amoxicilline 500mg", "Biogaran", "Antibiotique, gélules", 12, 20, "user123"),
        medicin("Spasfon Lyoc", "Teva", "Antispasmodique", 45, 15, "user123"),
        medicin("Levothyrox 75µg", "Merck", "Hormone thyroïdienne", 8, 10, "pharma456"),
        medicin("Metformine 850mg", "Mylan", "Antidiabétique oral", 200, 50, "pharma456"),
        medicin("Amlodipine 5mg", "Pfizer", "Inhibiteur calcique", 25, 25, "pharma456"),
        medicin("Oméprazole 20mg", "Arrow", "Inhibiteur de la pompe à protons", 90, 20, "clinic789"),
        medicin("Ventoline", "GSK", "Salbutamol en suspension", 4, 10, "clinic789"),
    ]
}

/// Goes through the services so every seeded medicine also gets its "Ajout"
/// entry. Each medicine gets one lot; expiry dates are staggered a month
/// apart so some fall inside the default alert window.
pub async fn seed_database(
    medicins: &MedicinService,
    stock: &StockService,
) -> Result<(), Box<dyn std::error::Error>> {
    let today = Local::now().date_naive();

    for (i, payload) in get_seed_data().into_iter().enumerate() {
        let medicin = medicins.create(payload).await?;
        log::info!("Seeded medicin {} ({:?})", medicin.id, medicin.name);

        let lot = stock
            .create_lot(LotPayload {
                numero_lot: format!("LOT-{:04}", medicin.id),
                date_expiration: today + Duration::days(30 * (i as i64 + 1)),
                date_entree: None,
                quantite: medicin.quantity.unwrap_or_default(),
                medicin_id: medicin.id,
                user_id: medicin.user_id.clone(),
            })
            .await?;
        log::info!("Seeded lot {} expiring {}", lot.lot.numero_lot, lot.lot.date_expiration);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::init_from_env()?;
    let pool = init_db(&config.database_url).await?;
    let store = Arc::new(SqliteStore::new(pool));

    let medicins = MedicinService::new(store.clone(), store.clone());
    let stock = StockService::new(store.clone(), store.clone(), store.clone(), store);

    seed_database(&medicins, &stock).await?;
    Ok(())
}
