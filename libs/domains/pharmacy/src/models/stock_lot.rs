use bson::{oid::ObjectId, serde_helpers::chrono_datetime_as_bson_datetime, Bson, Document};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::medicine::{Medicine, MedicineResponse};
use crate::error::PharmacyResult;
use crate::query::dates::{self, parse_date, parse_optional_date};
use crate::references::parse_id;
use crate::validation::require_positive_quantity;

/// Stock lot as stored in the `estoques` collection.
///
/// Only the medicine id is persisted; reads join the current medicine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockLot {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub medicine_id: ObjectId,
    pub quantity: i64,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub entry_date: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub expiry_date: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl StockLot {
    /// Build a lot for an already resolved medicine; `entry_date` defaults to now.
    pub fn create(input: CreateStockLot, medicine_id: ObjectId) -> PharmacyResult<Self> {
        let now = dates::now();
        Ok(Self {
            id: ObjectId::new(),
            medicine_id,
            quantity: require_positive_quantity(input.quantity)?,
            entry_date: parse_optional_date(input.entry_date.as_deref())?.unwrap_or(now),
            expiry_date: parse_date(&input.expiry_date)?,
            created_at: now,
            updated_at: now,
        })
    }

    /// Merge checked changes; a new medicine must already be known to exist.
    pub fn apply(&mut self, changes: StockLotChanges) {
        if let Some(quantity) = changes.quantity {
            self.quantity = quantity;
        }
        if let Some(entry_date) = changes.entry_date {
            self.entry_date = entry_date;
        }
        if let Some(expiry_date) = changes.expiry_date {
            self.expiry_date = expiry_date;
        }
        if let Some(medicine_id) = changes.medicine_id {
            self.medicine_id = medicine_id;
        }
        self.updated_at = dates::next_update_time(self.updated_at);
    }
}

/// An [`UpdateStockLot`] with dates, quantity and medicine id parsed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StockLotChanges {
    pub medicine_id: Option<ObjectId>,
    pub quantity: Option<i64>,
    pub entry_date: Option<DateTime<Utc>>,
    pub expiry_date: Option<DateTime<Utc>>,
}

/// A lot together with the medicine it currently references
#[derive(Debug, Clone, PartialEq)]
pub struct StockLotWithMedicine {
    pub lot: StockLot,
    /// `None` when the medicine no longer exists
    pub medicine: Option<Medicine>,
}

impl StockLotWithMedicine {
    /// Field the joined medicine is written to by the read pipeline
    pub const JOIN_FIELD: &'static str = "medicine";

    /// Split a joined pipeline row into the lot and its medicine
    pub fn from_document(mut doc: Document) -> PharmacyResult<Self> {
        let medicine = match doc.remove(Self::JOIN_FIELD) {
            Some(Bson::Document(medicine)) => Some(bson::from_document(medicine)?),
            _ => None,
        };
        Ok(Self {
            lot: bson::from_document(doc)?,
            medicine,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StockLotResponse {
    #[schema(example = "65f1a2b3c4d5e6f708192a3d")]
    pub id: String,
    #[schema(example = "65f1a2b3c4d5e6f708192a3c")]
    pub medicine_id: String,
    /// Current medicine record, absent if it was removed
    pub medicine: Option<MedicineResponse>,
    #[schema(example = 120)]
    pub quantity: i64,
    pub entry_date: DateTime<Utc>,
    pub expiry_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<StockLotWithMedicine> for StockLotResponse {
    fn from(joined: StockLotWithMedicine) -> Self {
        let lot = joined.lot;
        Self {
            id: lot.id.to_hex(),
            medicine_id: lot.medicine_id.to_hex(),
            medicine: joined.medicine.map(MedicineResponse::from),
            quantity: lot.quantity,
            entry_date: lot.entry_date,
            expiry_date: lot.expiry_date,
            created_at: lot.created_at,
            updated_at: lot.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateStockLot {
    /// Existing medicine id
    #[schema(example = "65f1a2b3c4d5e6f708192a3c")]
    pub medicine_id: String,
    /// Must be greater than 0
    #[validate(range(min = 1))]
    #[schema(example = 120)]
    pub quantity: i64,
    /// Defaults to the time of the request
    pub entry_date: Option<String>,
    #[schema(example = "2026-12-31")]
    pub expiry_date: String,
}

/// Partial update; omitted fields keep their value
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateStockLot {
    pub medicine_id: Option<String>,
    #[validate(range(min = 1))]
    pub quantity: Option<i64>,
    pub entry_date: Option<String>,
    pub expiry_date: Option<String>,
}

impl UpdateStockLot {
    pub fn parse(self) -> PharmacyResult<StockLotChanges> {
        Ok(StockLotChanges {
            medicine_id: self.medicine_id.map(|v| parse_id(&v)).transpose()?,
            quantity: self.quantity.map(require_positive_quantity).transpose()?,
            entry_date: self.entry_date.map(|v| parse_date(&v)).transpose()?,
            expiry_date: self.expiry_date.map(|v| parse_date(&v)).transpose()?,
        })
    }
}

/// Query filters for listing stock lots
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StockLotFilter {
    /// Lots of this medicine
    pub medicine_id: Option<String>,
    /// Exact quantity
    pub quantity: Option<i64>,
    pub min_quantity: Option<i64>,
    pub max_quantity: Option<i64>,
    /// Expiring on or after
    pub expiry_from: Option<String>,
    /// Expiring on or before
    pub expiry_to: Option<String>,
    /// Expiry calendar year
    pub expiry_year: Option<i32>,
    /// Expiry calendar month (1-12); alone it matches that month in any year
    #[param(minimum = 1, maximum = 12)]
    pub expiry_month: Option<u32>,
    /// Received on or after
    pub entry_from: Option<String>,
    /// Received on or before
    pub entry_to: Option<String>,
}

/// Required window for the expiring-stock listing
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ExpiryWindow {
    /// Window start (YYYY-MM-DD or RFC 3339)
    pub start: String,
    /// Window end, inclusive
    pub end: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StockLotCount {
    pub total_stock_lots: u64,
}
