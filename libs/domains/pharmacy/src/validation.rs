//! Field rules checked by the services before anything is persisted.

use validator::ValidationError;

use crate::error::{PharmacyError, PharmacyResult};

pub const TAX_ID_DIGITS: usize = 14;

/// Reduce a tax id to its 14 digits.
///
/// Accepts the usual punctuation (`12.345.678/0001-99`); letters or a wrong
/// digit count are rejected.
pub fn normalize_tax_id(raw: &str) -> PharmacyResult<String> {
    if let Some(bad) = raw
        .chars()
        .find(|c| !c.is_ascii_digit() && !matches!(c, '.' | '/' | '-' | ' '))
    {
        return Err(PharmacyError::Validation(format!(
            "tax id contains an invalid character '{}'",
            bad
        )));
    }

    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.len() != TAX_ID_DIGITS {
        return Err(PharmacyError::Validation(format!(
            "tax id must contain exactly {} digits, got {}",
            TAX_ID_DIGITS,
            digits.len()
        )));
    }

    Ok(digits)
}

pub fn require_positive_price(price: f64) -> PharmacyResult<f64> {
    if price.is_finite() && price > 0.0 {
        Ok(price)
    } else {
        Err(PharmacyError::Validation(format!(
            "price must be greater than 0, got {}",
            price
        )))
    }
}

pub fn require_positive_quantity(quantity: i64) -> PharmacyResult<i64> {
    if quantity > 0 {
        Ok(quantity)
    } else {
        Err(PharmacyError::Validation(format!(
            "quantity must be greater than 0, got {}",
            quantity
        )))
    }
}

/// Trimmed, non-blank text
pub fn require_text(field: &str, value: &str) -> PharmacyResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(PharmacyError::Validation(format!(
            "{} must not be empty",
            field
        )))
    } else {
        Ok(trimmed.to_string())
    }
}

/// `validator` adapter so request bodies fail fast with per-field details
pub fn validate_tax_id(raw: &str) -> Result<(), ValidationError> {
    normalize_tax_id(raw).map(|_| ()).map_err(|e| {
        let mut err = ValidationError::new("tax_id");
        err.message = Some(e.to_string().into());
        err
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_tax_id_strips_punctuation() {
        assert_eq!(
            normalize_tax_id("12.345.678/0011-22").unwrap(),
            "12345678001122"
        );
        assert_eq!(normalize_tax_id("12345678001122").unwrap(), "12345678001122");
    }

    #[test]
    fn test_normalize_tax_id_rejects_wrong_length() {
        assert!(matches!(
            normalize_tax_id("1234567800112"),
            Err(PharmacyError::Validation(_))
        ));
        assert!(normalize_tax_id("123456780011223").is_err());
        assert!(normalize_tax_id("").is_err());
    }

    #[test]
    fn test_normalize_tax_id_rejects_letters() {
        let err = normalize_tax_id("12A45678001122").unwrap_err();
        assert!(err.to_string().contains("'A'"));
    }

    #[test]
    fn test_positive_price() {
        assert_eq!(require_positive_price(12.9).unwrap(), 12.9);
        assert!(require_positive_price(0.0).is_err());
        assert!(require_positive_price(-1.0).is_err());
        assert!(require_positive_price(f64::NAN).is_err());
    }

    #[test]
    fn test_positive_quantity() {
        assert_eq!(require_positive_quantity(1).unwrap(), 1);
        assert!(require_positive_quantity(0).is_err());
        assert!(require_positive_quantity(-5).is_err());
    }

    #[test]
    fn test_require_text_trims() {
        assert_eq!(require_text("name", "  Dipirona ").unwrap(), "Dipirona");
        assert!(require_text("name", "   ").is_err());
    }

    #[test]
    fn test_validate_tax_id_adapter() {
        assert!(validate_tax_id("12.345.678/0011-22").is_ok());
        let err = validate_tax_id("123").unwrap_err();
        assert_eq!(err.code, "tax_id");
    }
}
