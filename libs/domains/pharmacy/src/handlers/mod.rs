//! HTTP handlers for the pharmacy API

pub mod medicines;
pub mod reports;
pub mod stock;
pub mod suppliers;

use std::sync::Arc;

use axum::Router;
use axum_helpers::{
    errors::responses::{
        BadRequestObjectIdResponse, BadRequestValidationResponse, ConflictResponse,
        InternalServerErrorResponse, NotFoundResponse,
    },
    ErrorResponse,
};
use utoipa::OpenApi;

use crate::repository::EntityStore;
use crate::service::{MedicineService, ReportService, StockService, SupplierService};

/// OpenAPI documentation for the pharmacy API
#[derive(OpenApi)]
#[openapi(
    nest(
        (path = "/suppliers", api = suppliers::SuppliersApi),
        (path = "/medicines", api = medicines::MedicinesApi),
        (path = "/stock", api = stock::StockApi),
        (path = "/reports", api = reports::ReportsApi),
    ),
    components(
        schemas(ErrorResponse),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestObjectIdResponse,
            ConflictResponse,
            InternalServerErrorResponse
        )
    )
)]
pub struct ApiDoc;

/// All pharmacy routes over one shared store
pub fn router<S: EntityStore + 'static>(store: Arc<S>) -> Router {
    Router::new()
        .nest(
            "/suppliers",
            suppliers::router(SupplierService::new(store.clone())),
        )
        .nest(
            "/medicines",
            medicines::router(MedicineService::new(store.clone())),
        )
        .nest("/stock", stock::router(StockService::new(store.clone())))
        .nest("/reports", reports::router(ReportService::new(store)))
}
