use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

/// Domain events emitted by the settlement ledger after a successful
/// mutation commits. Consumers are strictly after-the-fact: nothing in the
/// ledger awaits an event handler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Wallet events
    WalletCreated(Uuid),
    WalletCredited {
        wallet_id: Uuid,
        amount: Decimal,
    },
    WalletDebited {
        wallet_id: Uuid,
        amount: Decimal,
    },

    // Withdrawal events
    WithdrawalRequested(Uuid),
    WithdrawalApproved {
        request_id: Uuid,
        amount: Decimal,
    },
    WithdrawalCompleted(Uuid),
    WithdrawalRejected {
        request_id: Uuid,
        reason: String,
    },

    // Payment events
    PaymentRecorded {
        payment_id: Uuid,
        supplier_id: Uuid,
        amount: Decimal,
        payment_date: DateTime<Utc>,
    },

    // Settings events
    PaymentSettingsUpdated,
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
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

/// Background consumer of the event channel. Today this only records the
/// stream in the logs; notification fan-out hangs off this loop when it
/// lands.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::PaymentRecorded {
                payment_id,
                supplier_id,
                amount,
                ..
            } => {
                info!(%payment_id, %supplier_id, %amount, "payment recorded");
            }
            Event::WithdrawalApproved { request_id, amount } => {
                info!(%request_id, %amount, "withdrawal approved");
            }
            Event::WithdrawalRejected { request_id, reason } => {
                info!(%request_id, reason = %reason, "withdrawal rejected");
            }
            other => {
                info!("Received event: {:?}", other);
            }
        }
    }

    warn!("Event channel closed; event processing loop exiting");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_delivers_to_receiver() {
        let (tx, mut rx) = mpsc::channel(4);
        let sender = EventSender::new(tx);

        sender
            .send(Event::WalletCreated(Uuid::new_v4()))
            .await
            .expect("send should succeed");

        assert!(matches!(rx.recv().await, Some(Event::WalletCreated(_))));
    }

    #[tokio::test]
    async fn send_fails_when_receiver_dropped() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);

        assert!(sender
            .send(Event::PaymentSettingsUpdated)
            .await
            .is_err());
    }
}
