use crate::{
    db::DbPool,
    entities::supplier::{self, Entity as SupplierEntity, SupplierStatus},
    errors::ServiceError,
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// Read-only supplier reference data used by the ledger: bank snapshots for
/// payment recording, business names for reference initials, and the
/// APPROVED gate for aggregation. Supplier onboarding itself lives outside
/// this service.
#[derive(Clone)]
pub struct SupplierService {
    db_pool: Arc<DbPool>,
}

impl SupplierService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Gets a supplier by ID
    #[instrument(skip(self))]
    pub async fn get_supplier(
        &self,
        supplier_id: Uuid,
    ) -> Result<Option<supplier::Model>, ServiceError> {
        let db = &*self.db_pool;
        let supplier = SupplierEntity::find_by_id(supplier_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(supplier)
    }

    /// Gets a supplier by ID, erroring when it does not exist
    pub async fn require_supplier(
        &self,
        supplier_id: Uuid,
    ) -> Result<supplier::Model, ServiceError> {
        self.get_supplier(supplier_id).await?.ok_or_else(|| {
            ServiceError::NotFound(format!("Supplier with ID {} not found", supplier_id))
        })
    }

    /// Loads the APPROVED suppliers among the given ids, keyed for joins
    /// against aggregated sales.
    #[instrument(skip(self, supplier_ids))]
    pub async fn approved_by_ids(
        &self,
        supplier_ids: &[Uuid],
    ) -> Result<Vec<supplier::Model>, ServiceError> {
        if supplier_ids.is_empty() {
            return Ok(Vec::new());
        }

        let db = &*self.db_pool;
        let suppliers = SupplierEntity::find()
            .filter(supplier::Column::Id.is_in(supplier_ids.iter().copied()))
            .filter(supplier::Column::Status.eq(SupplierStatus::Approved))
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(suppliers)
    }
}
