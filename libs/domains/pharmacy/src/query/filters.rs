//! Listing filters to [`Predicate`]s.
//!
//! Every parameter is optional; absent ones add no condition, so an empty
//! filter matches all records. Bad ids, dates or months fail before any store
//! access.

use super::dates::{end_of_day, month_bounds, parse_optional_date, start_of_day, year_bounds};
use super::predicate::{Predicate, Test};
use super::text::TextPattern;
use crate::error::{PharmacyError, PharmacyResult};
use crate::models::{MedicineFilter, StockLotFilter, SupplierFilter};
use crate::references::parse_id;
use crate::validation::normalize_tax_id;

impl SupplierFilter {
    pub fn to_predicate(&self) -> PharmacyResult<Predicate> {
        let mut predicate = Predicate::all()
            .matching("name", text(&self.name))
            .matching("address", text(&self.address));

        if let Some(tax_id) = &self.tax_id {
            predicate = predicate.eq("tax_id", normalize_tax_id(tax_id)?);
        }

        Ok(predicate.between(
            "created_at",
            parse_optional_date(self.created_from.as_deref())?,
            parse_optional_date(self.created_to.as_deref())?,
        ))
    }
}

impl MedicineFilter {
    pub fn to_predicate(&self) -> PharmacyResult<Predicate> {
        let mut predicate = Predicate::all()
            .matching("name", text(&self.name))
            .matching("description", text(&self.description));

        if let Some(supplier_id) = &self.supplier_id {
            predicate = predicate.eq("supplier_id", parse_id(supplier_id)?);
        }

        let mut expiry_from = parse_optional_date(self.expiry_from.as_deref())?;
        let mut expiry_to = parse_optional_date(self.expiry_to.as_deref())?;
        // A full range covers whole calendar days.
        if let (Some(from), Some(to)) = (expiry_from, expiry_to) {
            expiry_from = Some(start_of_day(from));
            expiry_to = Some(end_of_day(to));
        }

        Ok(predicate
            .between("price", self.min_price, self.max_price)
            .between("expiry_date", expiry_from, expiry_to)
            .between(
                "created_at",
                parse_optional_date(self.created_from.as_deref())?,
                parse_optional_date(self.created_to.as_deref())?,
            ))
    }
}

impl StockLotFilter {
    pub fn to_predicate(&self) -> PharmacyResult<Predicate> {
        let mut predicate = Predicate::all();

        if let Some(medicine_id) = &self.medicine_id {
            predicate = predicate.eq("medicine_id", parse_id(medicine_id)?);
        }
        if let Some(quantity) = self.quantity {
            predicate = predicate.eq("quantity", quantity);
        }

        predicate = predicate
            .between("quantity", self.min_quantity, self.max_quantity)
            .between(
                "expiry_date",
                parse_optional_date(self.expiry_from.as_deref())?,
                parse_optional_date(self.expiry_to.as_deref())?,
            )
            .between(
                "entry_date",
                parse_optional_date(self.entry_from.as_deref())?,
                parse_optional_date(self.entry_to.as_deref())?,
            );

        if let Some(month) = self.expiry_month {
            if !(1..=12).contains(&month) {
                return Err(PharmacyError::Validation(format!(
                    "expiry_month must be between 1 and 12, got {}",
                    month
                )));
            }
        }

        predicate = match (self.expiry_year, self.expiry_month) {
            (Some(year), Some(month)) => {
                let (first, last) = month_bounds(year, month)?;
                predicate.between("expiry_date", Some(first), Some(last))
            }
            (Some(year), None) => {
                let (first, last) = year_bounds(year)?;
                predicate.between("expiry_date", Some(first), Some(last))
            }
            (None, Some(month)) => predicate.with("expiry_date", Test::MonthOf(month)),
            (None, None) => predicate,
        };

        Ok(predicate)
    }
}

fn text(raw: &Option<String>) -> Option<TextPattern> {
    raw.as_deref().and_then(TextPattern::parse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::predicate::Value;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_empty_filters_match_everything() {
        assert!(SupplierFilter::default().to_predicate().unwrap().is_empty());
        assert!(MedicineFilter::default().to_predicate().unwrap().is_empty());
        assert!(StockLotFilter::default().to_predicate().unwrap().is_empty());
    }

    #[test]
    fn test_supplier_text_and_tax_id() {
        let predicate = SupplierFilter {
            name: Some("^farma".into()),
            tax_id: Some("12.345.678/0011-22".into()),
            ..Default::default()
        }
        .to_predicate()
        .unwrap();

        assert_eq!(
            predicate.condition("name"),
            Some(&Test::Matches(TextPattern::Prefix("farma".into())))
        );
        assert_eq!(
            predicate.condition("tax_id"),
            Some(&Test::Equals(Value::Text("12345678001122".into())))
        );
    }

    #[test]
    fn test_blank_text_is_ignored() {
        let predicate = SupplierFilter {
            address: Some("   ".into()),
            ..Default::default()
        }
        .to_predicate()
        .unwrap();
        assert!(predicate.is_empty());
    }

    #[test]
    fn test_medicine_supplier_id_must_parse() {
        let err = MedicineFilter {
            supplier_id: Some("not-an-id".into()),
            ..Default::default()
        }
        .to_predicate()
        .unwrap_err();
        assert!(matches!(err, PharmacyError::InvalidId(_)));
    }

    #[test]
    fn test_medicine_full_expiry_range_snaps_to_days() {
        let predicate = MedicineFilter {
            expiry_from: Some("2025-03-10T15:00:00Z".into()),
            expiry_to: Some("2025-03-20".into()),
            ..Default::default()
        }
        .to_predicate()
        .unwrap();

        let lower = Utc.with_ymd_and_hms(2025, 3, 10, 0, 0, 0).unwrap();
        let upper = Utc.with_ymd_and_hms(2025, 3, 20, 23, 59, 59).unwrap()
            + chrono::Duration::milliseconds(999);
        assert_eq!(
            predicate.condition("expiry_date"),
            Some(&Test::Range {
                lower: Some(Value::Date(lower)),
                upper: Some(Value::Date(upper)),
            })
        );
    }

    #[test]
    fn test_medicine_single_bound_is_kept_as_given() {
        let predicate = MedicineFilter {
            expiry_from: Some("2025-03-10T15:00:00Z".into()),
            min_price: Some(5.0),
            ..Default::default()
        }
        .to_predicate()
        .unwrap();

        let lower = Utc.with_ymd_and_hms(2025, 3, 10, 15, 0, 0).unwrap();
        assert_eq!(
            predicate.condition("expiry_date"),
            Some(&Test::Range {
                lower: Some(Value::Date(lower)),
                upper: None,
            })
        );
        assert_eq!(
            predicate.condition("price"),
            Some(&Test::Range {
                lower: Some(Value::Float(5.0)),
                upper: None,
            })
        );
    }

    #[test]
    fn test_inverted_range_is_not_an_error() {
        let predicate = StockLotFilter {
            expiry_from: Some("2026-01-01".into()),
            expiry_to: Some("2025-01-01".into()),
            ..Default::default()
        }
        .to_predicate();
        assert!(predicate.is_ok());
    }

    #[test]
    fn test_stock_year_and_month() {
        let year_only = StockLotFilter {
            expiry_year: Some(2025),
            ..Default::default()
        }
        .to_predicate()
        .unwrap();
        let (first, last) = year_bounds(2025).unwrap();
        assert_eq!(
            year_only.condition("expiry_date"),
            Some(&Test::Range {
                lower: Some(Value::Date(first)),
                upper: Some(Value::Date(last)),
            })
        );

        let month_only = StockLotFilter {
            expiry_month: Some(7),
            ..Default::default()
        }
        .to_predicate()
        .unwrap();
        assert_eq!(month_only.condition("expiry_date"), Some(&Test::MonthOf(7)));

        let both = StockLotFilter {
            expiry_year: Some(2025),
            expiry_month: Some(2),
            ..Default::default()
        }
        .to_predicate()
        .unwrap();
        let (first, last) = month_bounds(2025, 2).unwrap();
        assert_eq!(
            both.condition("expiry_date"),
            Some(&Test::Range {
                lower: Some(Value::Date(first)),
                upper: Some(Value::Date(last)),
            })
        );
    }

    #[test]
    fn test_stock_month_out_of_range() {
        for month in [0, 13] {
            let err = StockLotFilter {
                expiry_month: Some(month),
                ..Default::default()
            }
            .to_predicate()
            .unwrap_err();
            assert!(matches!(err, PharmacyError::Validation(_)));
        }
    }

    #[test]
    fn test_stock_quantity_exact_and_range() {
        let predicate = StockLotFilter {
            quantity: Some(10),
            min_quantity: Some(5),
            ..Default::default()
        }
        .to_predicate()
        .unwrap();
        assert_eq!(predicate.conditions().len(), 2);
        assert_eq!(
            predicate.condition("quantity"),
            Some(&Test::Equals(Value::Int(10)))
        );
    }
}
