use bson::{oid::ObjectId, serde_helpers::chrono_datetime_as_bson_datetime};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::PharmacyResult;
use crate::query::dates::{self, parse_date};
use crate::references::parse_id;
use crate::validation::{require_positive_price, require_text};

/// Medicine as stored in the `remedios` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Medicine {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub expiry_date: DateTime<Utc>,
    /// Owning supplier, validated on every write
    pub supplier_id: ObjectId,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Medicine {
    /// Build a record for an already resolved supplier.
    pub fn create(input: CreateMedicine, supplier_id: ObjectId) -> PharmacyResult<Self> {
        let now = dates::now();
        Ok(Self {
            id: ObjectId::new(),
            name: require_text("name", &input.name)?,
            description: input.description.trim().to_string(),
            price: require_positive_price(input.price)?,
            expiry_date: parse_date(&input.expiry_date)?,
            supplier_id,
            created_at: now,
            updated_at: now,
        })
    }

    /// Merge checked changes; a new supplier must already be known to exist.
    pub fn apply(&mut self, changes: MedicineChanges) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(price) = changes.price {
            self.price = price;
        }
        if let Some(expiry_date) = changes.expiry_date {
            self.expiry_date = expiry_date;
        }
        if let Some(supplier_id) = changes.supplier_id {
            self.supplier_id = supplier_id;
        }
        self.updated_at = dates::next_update_time(self.updated_at);
    }
}

/// An [`UpdateMedicine`] with dates, price and supplier id parsed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MedicineChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub supplier_id: Option<ObjectId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MedicineResponse {
    #[schema(example = "65f1a2b3c4d5e6f708192a3c")]
    pub id: String,
    #[schema(example = "Dipirona 500mg")]
    pub name: String,
    pub description: String,
    #[schema(example = 12.9)]
    pub price: f64,
    pub expiry_date: DateTime<Utc>,
    #[schema(example = "65f1a2b3c4d5e6f708192a3b")]
    pub supplier_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Medicine> for MedicineResponse {
    fn from(medicine: Medicine) -> Self {
        Self {
            id: medicine.id.to_hex(),
            name: medicine.name,
            description: medicine.description,
            price: medicine.price,
            expiry_date: medicine.expiry_date,
            supplier_id: medicine.supplier_id.to_hex(),
            created_at: medicine.created_at,
            updated_at: medicine.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateMedicine {
    #[validate(length(min = 1, max = 200))]
    #[schema(example = "Dipirona 500mg")]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub description: String,
    /// Must be greater than 0
    #[validate(range(exclusive_min = 0.0))]
    #[schema(example = 12.9)]
    pub price: f64,
    /// YYYY-MM-DD or RFC 3339
    #[schema(example = "2026-12-31")]
    pub expiry_date: String,
    /// Existing supplier id
    #[schema(example = "65f1a2b3c4d5e6f708192a3b")]
    pub supplier_id: String,
}

/// Partial update; omitted fields keep their value
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateMedicine {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(range(exclusive_min = 0.0))]
    pub price: Option<f64>,
    pub expiry_date: Option<String>,
    pub supplier_id: Option<String>,
}

impl UpdateMedicine {
    pub fn parse(self) -> PharmacyResult<MedicineChanges> {
        Ok(MedicineChanges {
            name: self.name.map(|v| require_text("name", &v)).transpose()?,
            description: self.description.map(|v| v.trim().to_string()),
            price: self.price.map(require_positive_price).transpose()?,
            expiry_date: self.expiry_date.map(|v| parse_date(&v)).transpose()?,
            supplier_id: self.supplier_id.map(|v| parse_id(&v)).transpose()?,
        })
    }
}

/// Query filters for listing medicines
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MedicineFilter {
    /// Name contains (`^term` prefix, `term$` suffix), case-insensitive
    pub name: Option<String>,
    /// Description contains, case-insensitive
    pub description: Option<String>,
    /// Owning supplier id
    pub supplier_id: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    /// Expiring on or after; with `expiry_to` both snap to whole days
    pub expiry_from: Option<String>,
    /// Expiring on or before
    pub expiry_to: Option<String>,
    pub created_from: Option<String>,
    pub created_to: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MedicineCount {
    pub total_medicines: u64,
}
