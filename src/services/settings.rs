use crate::{
    db::DbPool,
    entities::payment_settings::{self, Entity as SettingsEntity, PaymentSchedule, SINGLETON_ID},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{instrument, warn};
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UpdateSettingsRequest {
    pub minimum_payout_amount: Option<Decimal>,
    pub minimum_withdrawal_amount: Option<Decimal>,
    pub payment_schedule: Option<PaymentSchedule>,
    pub allow_partial_payment: Option<bool>,
}

/// Access to the process-wide payment policy singleton. Readers always get
/// a value: a missing row falls back to the built-in defaults without
/// writing anything.
#[derive(Clone)]
pub struct SettingsService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl SettingsService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Current payment settings, defaulted when the singleton row has never
    /// been written.
    #[instrument(skip(self))]
    pub async fn get(&self) -> Result<payment_settings::Model, ServiceError> {
        let db = &*self.db_pool;
        let found = SettingsEntity::find_by_id(SINGLETON_ID)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(found.unwrap_or_default())
    }

    /// Applies an admin settings change, creating the singleton row on first
    /// write.
    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        request: UpdateSettingsRequest,
    ) -> Result<payment_settings::Model, ServiceError> {
        if let Some(min) = request.minimum_payout_amount {
            if min <= Decimal::ZERO {
                return Err(ServiceError::ValidationError(
                    "minimum_payout_amount must be positive".to_string(),
                ));
            }
        }
        if let Some(min) = request.minimum_withdrawal_amount {
            if min <= Decimal::ZERO {
                return Err(ServiceError::ValidationError(
                    "minimum_withdrawal_amount must be positive".to_string(),
                ));
            }
        }

        let db = &*self.db_pool;
        let current = SettingsEntity::find_by_id(SINGLETON_ID)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let now = Utc::now();
        let updated = match current {
            Some(existing) => {
                let mut active: payment_settings::ActiveModel = existing.into();
                if let Some(min) = request.minimum_payout_amount {
                    active.minimum_payout_amount = Set(min);
                }
                if let Some(min) = request.minimum_withdrawal_amount {
                    active.minimum_withdrawal_amount = Set(min);
                }
                if let Some(schedule) = request.payment_schedule {
                    active.payment_schedule = Set(schedule);
                }
                if let Some(allow) = request.allow_partial_payment {
                    active.allow_partial_payment = Set(allow);
                }
                active.updated_at = Set(Some(now));
                active.update(db).await.map_err(ServiceError::DatabaseError)?
            }
            None => {
                let defaults = payment_settings::Model::default();
                let active = payment_settings::ActiveModel {
                    id: Set(SINGLETON_ID),
                    minimum_payout_amount: Set(request
                        .minimum_payout_amount
                        .unwrap_or(defaults.minimum_payout_amount)),
                    minimum_withdrawal_amount: Set(request
                        .minimum_withdrawal_amount
                        .unwrap_or(defaults.minimum_withdrawal_amount)),
                    payment_schedule: Set(request
                        .payment_schedule
                        .unwrap_or(defaults.payment_schedule)),
                    allow_partial_payment: Set(request
                        .allow_partial_payment
                        .unwrap_or(defaults.allow_partial_payment)),
                    updated_at: Set(Some(now)),
                };
                active.insert(db).await.map_err(ServiceError::DatabaseError)?
            }
        };

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(Event::PaymentSettingsUpdated).await {
                warn!(error = %e, "Failed to send settings updated event");
            }
        }

        Ok(updated)
    }
}
