use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::info;
use uuid::Uuid;

/// Events emitted after state changes commit. Consumed by the audit sink;
/// delivery is fire-and-forget and never affects transaction outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    SaleCompleted {
        sale_id: Uuid,
        sale_number: String,
        hospital_id: Uuid,
        total_amount: Decimal,
    },
    SaleReturnProcessed {
        return_id: Uuid,
        sale_id: Uuid,
        hospital_id: Uuid,
        refund_amount: Decimal,
    },
    InventoryItemCreated(Uuid),
    InventoryItemUpdated(Uuid),
    PatientRegistered(Uuid),
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Audit log consumer. Runs for the lifetime of the channel.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        match &event {
            Event::SaleCompleted {
                sale_id,
                sale_number,
                hospital_id,
                total_amount,
            } => {
                info!(
                    sale_id = %sale_id,
                    sale_number = %sale_number,
                    hospital_id = %hospital_id,
                    total_amount = %total_amount,
                    "Sale completed"
                );
            }
            Event::SaleReturnProcessed {
                return_id,
                sale_id,
                hospital_id,
                refund_amount,
            } => {
                info!(
                    return_id = %return_id,
                    sale_id = %sale_id,
                    hospital_id = %hospital_id,
                    refund_amount = %refund_amount,
                    "Return processed"
                );
            }
            Event::InventoryItemCreated(id) => {
                info!(item_id = %id, "Inventory item created");
            }
            Event::InventoryItemUpdated(id) => {
                info!(item_id = %id, "Inventory item updated");
            }
            Event::PatientRegistered(id) => {
                info!(patient_id = %id, "Patient registered");
            }
        }
    }
    info!("Event channel closed; audit consumer stopping");
}
