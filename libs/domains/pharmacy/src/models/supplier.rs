use bson::{oid::ObjectId, serde_helpers::chrono_datetime_as_bson_datetime};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::PharmacyResult;
use crate::query::dates;
use crate::validation::{normalize_tax_id, require_text, validate_tax_id};

/// Supplier as stored in the `fornecedores` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supplier {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    /// 14 digits, unique
    pub tax_id: String,
    pub phone: String,
    pub address: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Supplier {
    /// Validate and normalize `input` into a new record; both timestamps are equal.
    pub fn create(input: CreateSupplier) -> PharmacyResult<Self> {
        let now = dates::now();
        Ok(Self {
            id: ObjectId::new(),
            name: require_text("name", &input.name)?,
            tax_id: normalize_tax_id(&input.tax_id)?,
            phone: require_text("phone", &input.phone)?,
            address: require_text("address", &input.address)?,
            created_at: now,
            updated_at: now,
        })
    }

    /// Merge checked changes; `updated_at` always moves forward.
    pub fn apply(&mut self, changes: SupplierChanges) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(tax_id) = changes.tax_id {
            self.tax_id = tax_id;
        }
        if let Some(phone) = changes.phone {
            self.phone = phone;
        }
        if let Some(address) = changes.address {
            self.address = address;
        }
        self.updated_at = dates::next_update_time(self.updated_at);
    }
}

/// An [`UpdateSupplier`] whose fields are trimmed and normalized
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SupplierChanges {
    pub name: Option<String>,
    pub tax_id: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SupplierResponse {
    #[schema(example = "65f1a2b3c4d5e6f708192a3b")]
    pub id: String,
    #[schema(example = "Teste Farma")]
    pub name: String,
    #[schema(example = "12345678001122")]
    pub tax_id: String,
    #[schema(example = "(11) 99999-1234")]
    pub phone: String,
    #[schema(example = "Rua Teste, 100")]
    pub address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Supplier> for SupplierResponse {
    fn from(supplier: Supplier) -> Self {
        Self {
            id: supplier.id.to_hex(),
            name: supplier.name,
            tax_id: supplier.tax_id,
            phone: supplier.phone,
            address: supplier.address,
            created_at: supplier.created_at,
            updated_at: supplier.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateSupplier {
    #[validate(length(min = 1, max = 200))]
    #[schema(example = "Teste Farma")]
    pub name: String,
    /// 14 digits; `.`, `/` and `-` separators are stripped
    #[validate(custom(function = "validate_tax_id"))]
    #[schema(example = "12.345.678/0011-22")]
    pub tax_id: String,
    #[validate(length(min = 1, max = 30))]
    #[schema(example = "(11) 99999-1234")]
    pub phone: String,
    #[validate(length(min = 1, max = 300))]
    #[schema(example = "Rua Teste, 100")]
    pub address: String,
}

/// Partial update; omitted fields keep their value
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateSupplier {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(custom(function = "validate_tax_id"))]
    pub tax_id: Option<String>,
    #[validate(length(min = 1, max = 30))]
    pub phone: Option<String>,
    #[validate(length(min = 1, max = 300))]
    pub address: Option<String>,
}

impl UpdateSupplier {
    pub fn parse(self) -> PharmacyResult<SupplierChanges> {
        Ok(SupplierChanges {
            name: self.name.map(|v| require_text("name", &v)).transpose()?,
            tax_id: self.tax_id.map(|v| normalize_tax_id(&v)).transpose()?,
            phone: self.phone.map(|v| require_text("phone", &v)).transpose()?,
            address: self.address.map(|v| require_text("address", &v)).transpose()?,
        })
    }
}

/// Query filters for listing suppliers
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SupplierFilter {
    /// Name contains (`^term` prefix, `term$` suffix), case-insensitive
    pub name: Option<String>,
    /// Exact tax id, punctuation allowed
    pub tax_id: Option<String>,
    /// Address contains, case-insensitive
    pub address: Option<String>,
    /// Created on or after (YYYY-MM-DD or RFC 3339)
    pub created_from: Option<String>,
    /// Created on or before
    pub created_to: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SupplierCount {
    pub total_suppliers: u64,
}
