use std::sync::Arc;

use bson::oid::ObjectId;
use tracing::instrument;

use super::validate_input;
use crate::error::{PharmacyError, PharmacyResult};
use crate::models::{
    CreateStockLot, ExpiryWindow, StockLot, StockLotFilter, StockLotWithMedicine, UpdateStockLot,
};
use crate::pipeline::{Pipeline, SortKey};
use crate::query::dates::{end_of_day, parse_date, start_of_day};
use crate::query::{Page, PageParams, Paginated, Predicate};
use crate::references::{parse_id, ReferenceResolver};
use crate::repository::{EntityKind, EntityStore, Records};

/// Stock lot CRUD; reads join the lot's current medicine
pub struct StockService<S: EntityStore> {
    store: Arc<S>,
}

impl<S: EntityStore> StockService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    fn records(&self) -> Records<'_, S, StockLot> {
        Records::new(self.store.as_ref())
    }

    #[instrument(skip(self, input), fields(medicine_id = %input.medicine_id))]
    pub async fn create(&self, input: CreateStockLot) -> PharmacyResult<StockLotWithMedicine> {
        validate_input(&input)?;
        let medicine_id = parse_id(&input.medicine_id)?;
        let lot = StockLot::create(input, medicine_id)?;

        let medicine = ReferenceResolver::new(self.store.as_ref())
            .resolve_medicine(medicine_id)
            .await?;
        self.records().insert(&lot).await?;

        tracing::info!(stock_lot_id = %lot.id, quantity = lot.quantity, "Stock lot created successfully");
        Ok(StockLotWithMedicine {
            lot,
            medicine: Some(medicine),
        })
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: ObjectId) -> PharmacyResult<StockLotWithMedicine> {
        let pipeline = with_medicine(Pipeline::new().filter(Predicate::by_id(id)));
        self.read_joined(pipeline)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| PharmacyError::not_found(EntityKind::StockLot, id))
    }

    /// Filtered page of lots, soonest expiry first
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: StockLotFilter,
        params: PageParams,
    ) -> PharmacyResult<Paginated<StockLotWithMedicine>> {
        let page = params.validate()?;
        self.page_by_expiry(filter.to_predicate()?, page).await
    }

    /// Lots expiring inside `[start, end]`, both taken as whole days
    #[instrument(skip(self))]
    pub async fn expiring(
        &self,
        window: ExpiryWindow,
        params: PageParams,
    ) -> PharmacyResult<Paginated<StockLotWithMedicine>> {
        let page = params.validate()?;
        let start = start_of_day(parse_date(&window.start)?);
        let end = end_of_day(parse_date(&window.end)?);

        let predicate = Predicate::all().between("expiry_date", Some(start), Some(end));
        self.page_by_expiry(predicate, page).await
    }

    #[instrument(skip(self))]
    pub async fn count(&self, filter: StockLotFilter) -> PharmacyResult<u64> {
        self.records().count(filter.to_predicate()?).await
    }

    #[instrument(skip(self, changes))]
    pub async fn update(
        &self,
        id: ObjectId,
        changes: UpdateStockLot,
    ) -> PharmacyResult<StockLotWithMedicine> {
        validate_input(&changes)?;
        let changes = changes.parse()?;
        let mut lot = self
            .records()
            .get(id)
            .await?
            .ok_or_else(|| PharmacyError::not_found(EntityKind::StockLot, id))?;

        if let Some(medicine_id) = changes.medicine_id {
            ReferenceResolver::new(self.store.as_ref())
                .resolve_medicine(medicine_id)
                .await?;
        }
        lot.apply(changes);

        if !self.records().replace(&lot).await? {
            return Err(PharmacyError::not_found(EntityKind::StockLot, id));
        }

        tracing::info!(stock_lot_id = %id, "Stock lot updated successfully");
        self.get(id).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: ObjectId) -> PharmacyResult<()> {
        if !self.records().delete(id).await? {
            return Err(PharmacyError::not_found(EntityKind::StockLot, id));
        }

        tracing::info!(stock_lot_id = %id, "Stock lot deleted successfully");
        Ok(())
    }

    async fn page_by_expiry(
        &self,
        predicate: Predicate,
        page: Page,
    ) -> PharmacyResult<Paginated<StockLotWithMedicine>> {
        let total = self.records().count(predicate.clone()).await?;
        let pipeline = with_medicine(
            Pipeline::new()
                .filter(predicate)
                .sort(vec![SortKey::asc("expiry_date"), SortKey::asc("_id")])
                .window(page.skip(), page.size),
        );
        let lots = self.read_joined(pipeline).await?;

        Ok(Paginated::new(lots, page, total))
    }

    async fn read_joined(&self, pipeline: Pipeline) -> PharmacyResult<Vec<StockLotWithMedicine>> {
        self.store
            .run_pipeline(EntityKind::StockLot, pipeline)
            .await?
            .into_iter()
            .map(StockLotWithMedicine::from_document)
            .collect()
    }
}

impl<S: EntityStore> Clone for StockService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

/// Attach the current medicine; lots whose medicine is gone are kept
fn with_medicine(pipeline: Pipeline) -> Pipeline {
    pipeline.join_one(
        EntityKind::Medicine,
        "medicine_id",
        StockLotWithMedicine::JOIN_FIELD,
        true,
    )
}
