pub mod inventory;
pub mod patients;
pub mod returns;
pub mod sales;

use crate::db::DbPool;
use crate::events::EventSender;
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub inventory: Arc<crate::services::inventory::InventoryService>,
    pub sales: Arc<crate::services::sales::SaleService>,
    pub returns: Arc<crate::services::returns::ReturnService>,
    pub patients: Arc<crate::services::patients::PatientService>,
}

impl AppServices {
    pub fn new(db: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            inventory: Arc::new(crate::services::inventory::InventoryService::new(
                db.clone(),
                event_sender.clone(),
            )),
            sales: Arc::new(crate::services::sales::SaleService::new(
                db.clone(),
                event_sender.clone(),
            )),
            returns: Arc::new(crate::services::returns::ReturnService::new(
                db.clone(),
                event_sender.clone(),
            )),
            patients: Arc::new(crate::services::patients::PatientService::new(
                db,
                event_sender,
            )),
        }
    }
}
