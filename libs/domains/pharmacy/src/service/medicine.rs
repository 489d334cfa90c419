use std::sync::Arc;

use bson::oid::ObjectId;
use tracing::instrument;

use super::validate_input;
use crate::error::{PharmacyError, PharmacyResult};
use crate::models::{CreateMedicine, Medicine, MedicineFilter, UpdateMedicine};
use crate::pipeline::SortKey;
use crate::query::{PageParams, Paginated};
use crate::references::{parse_id, ReferenceResolver};
use crate::repository::{EntityKind, EntityStore, FindOptions, Records};

/// Medicine CRUD; every write resolves the supplier reference first
pub struct MedicineService<S: EntityStore> {
    store: Arc<S>,
}

impl<S: EntityStore> MedicineService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    fn records(&self) -> Records<'_, S, Medicine> {
        Records::new(self.store.as_ref())
    }

    fn references(&self) -> ReferenceResolver<'_, S> {
        ReferenceResolver::new(self.store.as_ref())
    }

    #[instrument(skip(self, input), fields(medicine_name = %input.name))]
    pub async fn create(&self, input: CreateMedicine) -> PharmacyResult<Medicine> {
        validate_input(&input)?;
        let supplier_id = parse_id(&input.supplier_id)?;
        let medicine = Medicine::create(input, supplier_id)?;

        self.references().resolve_supplier(supplier_id).await?;
        self.records().insert(&medicine).await?;

        tracing::info!(medicine_id = %medicine.id, %supplier_id, "Medicine created successfully");
        Ok(medicine)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: ObjectId) -> PharmacyResult<Medicine> {
        self.records()
            .get(id)
            .await?
            .ok_or_else(|| PharmacyError::not_found(EntityKind::Medicine, id))
    }

    /// Filtered page of medicines ordered by name
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: MedicineFilter,
        params: PageParams,
    ) -> PharmacyResult<Paginated<Medicine>> {
        let page = params.validate()?;
        let predicate = filter.to_predicate()?;

        let total = self.records().count(predicate.clone()).await?;
        let medicines = self
            .records()
            .find(
                predicate,
                FindOptions::sorted(vec![SortKey::asc("name")]).paged(page.skip(), page.size),
            )
            .await?;

        Ok(Paginated::new(medicines, page, total))
    }

    #[instrument(skip(self))]
    pub async fn count(&self, filter: MedicineFilter) -> PharmacyResult<u64> {
        self.records().count(filter.to_predicate()?).await
    }

    #[instrument(skip(self, changes))]
    pub async fn update(&self, id: ObjectId, changes: UpdateMedicine) -> PharmacyResult<Medicine> {
        validate_input(&changes)?;
        let changes = changes.parse()?;
        let mut medicine = self.get(id).await?;

        if let Some(supplier_id) = changes.supplier_id {
            self.references().resolve_supplier(supplier_id).await?;
        }
        medicine.apply(changes);

        if !self.records().replace(&medicine).await? {
            return Err(PharmacyError::not_found(EntityKind::Medicine, id));
        }

        tracing::info!(medicine_id = %id, "Medicine updated successfully");
        Ok(medicine)
    }

    /// Refused while stock lots still reference the medicine
    #[instrument(skip(self))]
    pub async fn delete(&self, id: ObjectId) -> PharmacyResult<()> {
        self.get(id).await?;
        self.references()
            .ensure_unreferenced(EntityKind::Medicine, id, EntityKind::StockLot, "medicine_id")
            .await?;

        if !self.records().delete(id).await? {
            return Err(PharmacyError::not_found(EntityKind::Medicine, id));
        }

        tracing::info!(medicine_id = %id, "Medicine deleted successfully");
        Ok(())
    }
}

impl<S: EntityStore> Clone for MedicineService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}
