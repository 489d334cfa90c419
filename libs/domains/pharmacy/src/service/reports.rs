use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::instrument;

use crate::error::{PharmacyError, PharmacyResult};
use crate::models::{
    MedicinesBySupplierRow, ReportResult, StockByMedicineRow, SupplierAddressRow,
    SupplierAveragePriceRow, SupplierMedicineCountRow, SupplierPriceExtremeRow,
};
use crate::pipeline::Pipeline;
use crate::query::TextPattern;
use crate::reports::{self, PriceExtreme};
use crate::repository::{EntityKind, EntityStore};

/// Runs the aggregation reports. An empty result is never an error.
pub struct ReportService<S: EntityStore> {
    store: Arc<S>,
}

impl<S: EntityStore> ReportService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    #[instrument(skip(self))]
    pub async fn stock_by_medicine_name(
        &self,
        name: &str,
    ) -> PharmacyResult<ReportResult<StockByMedicineRow>> {
        let pattern = search_term("name", name)?;
        self.run("stock_by_medicine_name", reports::stock_by_medicine_name(pattern))
            .await
    }

    #[instrument(skip(self))]
    pub async fn suppliers_by_address(
        &self,
        address: &str,
    ) -> PharmacyResult<ReportResult<SupplierAddressRow>> {
        let pattern = search_term("address", address)?;
        self.run("suppliers_by_address", reports::suppliers_by_address(pattern))
            .await
    }

    #[instrument(skip(self))]
    pub async fn medicine_count_per_supplier(
        &self,
    ) -> PharmacyResult<ReportResult<SupplierMedicineCountRow>> {
        self.run(
            "medicine_count_per_supplier",
            reports::medicine_count_per_supplier(),
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn average_price_per_supplier(
        &self,
    ) -> PharmacyResult<ReportResult<SupplierAveragePriceRow>> {
        self.run(
            "average_price_per_supplier",
            reports::average_price_per_supplier(),
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn price_extreme_per_supplier(
        &self,
        extreme: PriceExtreme,
    ) -> PharmacyResult<ReportResult<SupplierPriceExtremeRow>> {
        let name = match extreme {
            PriceExtreme::MostExpensive => "most_expensive_per_supplier",
            PriceExtreme::Cheapest => "cheapest_per_supplier",
        };
        self.run(name, reports::price_extreme_per_supplier(extreme))
            .await
    }

    #[instrument(skip(self))]
    pub async fn medicines_by_supplier_name(
        &self,
        name: &str,
    ) -> PharmacyResult<ReportResult<MedicinesBySupplierRow>> {
        let pattern = search_term("name", name)?;
        self.run(
            "medicines_by_supplier_name",
            reports::medicines_by_supplier_name(pattern),
        )
        .await
    }

    async fn run<T: DeserializeOwned>(
        &self,
        report: &'static str,
        (from, pipeline): (EntityKind, Pipeline),
    ) -> PharmacyResult<ReportResult<T>> {
        let rows = self
            .store
            .run_pipeline(from, pipeline)
            .await?
            .into_iter()
            .map(|row| bson::from_document(row).map_err(PharmacyError::from))
            .collect::<PharmacyResult<Vec<T>>>()?;

        tracing::debug!(report, rows = rows.len(), "Report completed");
        Ok(ReportResult::new(rows))
    }
}

impl<S: EntityStore> Clone for ReportService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

fn search_term(field: &str, raw: &str) -> PharmacyResult<TextPattern> {
    TextPattern::parse(raw)
        .ok_or_else(|| PharmacyError::Validation(format!("{} must not be empty", field)))
}
