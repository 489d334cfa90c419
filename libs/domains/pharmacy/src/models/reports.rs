//! Row types produced by the aggregation reports.
//!
//! Every id in a report row is rendered as a hex string by the pipeline
//! itself, so rows never carry native `ObjectId`s.

use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// `{ data, total }` envelope; an empty `data` is a valid answer
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReportResult<T> {
    pub data: Vec<T>,
    pub total: u64,
}

impl<T> ReportResult<T> {
    pub fn new(data: Vec<T>) -> Self {
        let total = data.len() as u64;
        Self { data, total }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Term for reports that filter by a partial name
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NameQuery {
    /// Case-insensitive; `^term` prefix, `term$` suffix
    pub name: String,
}

/// Term for the supplier address lookup
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AddressQuery {
    /// Case-insensitive partial address
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LotDetail {
    pub lot_id: String,
    pub quantity: i64,
    #[serde(serialize_with = "serialize_rfc3339")]
    #[serde(deserialize_with = "chrono_datetime_as_bson_datetime::deserialize")]
    pub entry_date: DateTime<Utc>,
    #[serde(serialize_with = "serialize_rfc3339")]
    #[serde(deserialize_with = "chrono_datetime_as_bson_datetime::deserialize")]
    pub expiry_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StockByMedicineRow {
    pub medicine_name: String,
    pub total_quantity: i64,
    pub lots: Vec<LotDetail>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SupplierAddressRow {
    pub id: String,
    pub name: String,
    pub tax_id: String,
    pub phone: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SupplierMedicineCountRow {
    pub supplier_id: String,
    pub supplier_name: String,
    pub medicine_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SupplierAveragePriceRow {
    pub supplier_id: String,
    pub supplier_name: String,
    pub average_price: f64,
}

/// One extreme (most expensive or cheapest) medicine of a supplier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SupplierPriceExtremeRow {
    pub supplier_id: String,
    pub supplier_name: String,
    pub medicine_id: String,
    pub medicine_name: String,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MedicineSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(serialize_with = "serialize_rfc3339")]
    #[serde(deserialize_with = "chrono_datetime_as_bson_datetime::deserialize")]
    pub expiry_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MedicinesBySupplierRow {
    pub supplier_id: String,
    pub supplier_name: String,
    pub medicines: Vec<MedicineSummary>,
}

// Rows are read from BSON but written as JSON.
fn serialize_rfc3339<S>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&ts.to_rfc3339())
}
