//! Business logic over an [`EntityStore`](crate::repository::EntityStore).
//!
//! Services share one store behind an `Arc` and are cheap to clone.

mod medicine;
mod reports;
mod stock;
mod supplier;

pub use medicine::MedicineService;
pub use reports::ReportService;
pub use stock::StockService;
pub use supplier::SupplierService;

use validator::Validate;

use crate::error::{PharmacyError, PharmacyResult};

fn validate_input<T: Validate>(input: &T) -> PharmacyResult<()> {
    input
        .validate()
        .map_err(|e| PharmacyError::Validation(e.to_string()))
}
