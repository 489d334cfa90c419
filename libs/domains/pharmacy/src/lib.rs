//! Pharmacy Domain
//!
//! Suppliers, the medicines they provide and the stock lots received for
//! each medicine, stored in MongoDB, plus aggregation reports across them.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │  Services   │  ← Validation, reference checks, restricted deletes, reports
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ EntityStore │  ← Predicates and pipelines (trait + MongoDB implementation)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Entities, DTOs, report rows
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use domain_pharmacy::{handlers, MongoStore};
//! use mongodb::Client;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::with_uri_str("mongodb://localhost:27017").await?;
//! let store = MongoStore::new(client.database("farmacia_db"));
//! store.init_indexes().await?;
//!
//! let router = handlers::router(Arc::new(store));
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod pipeline;
pub mod query;
pub mod references;
pub mod reports;
pub mod repository;
pub mod service;
pub mod validation;

pub use error::{PharmacyError, PharmacyResult};
pub use handlers::ApiDoc;
pub use models::{
    CreateMedicine, CreateStockLot, CreateSupplier, Medicine, StockLot, Supplier, UpdateMedicine,
    UpdateStockLot, UpdateSupplier,
};
pub use mongodb::MongoStore;
pub use repository::{EntityKind, EntityStore};
pub use service::{MedicineService, ReportService, StockService, SupplierService};
