use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use axum_helpers::errors::responses::{BadRequestValidationResponse, InternalServerErrorResponse};
use utoipa::OpenApi;

use crate::error::PharmacyResult;
use crate::models::{
    AddressQuery, LotDetail, MedicineSummary, MedicinesBySupplierRow, NameQuery, ReportResult,
    StockByMedicineRow, SupplierAddressRow, SupplierAveragePriceRow, SupplierMedicineCountRow,
    SupplierPriceExtremeRow,
};
use crate::reports::PriceExtreme;
use crate::repository::EntityStore;
use crate::service::ReportService;

#[derive(OpenApi)]
#[openapi(
    paths(
        stock_by_medicine,
        suppliers_by_address,
        medicine_count_per_supplier,
        average_price_per_supplier,
        most_expensive_per_supplier,
        cheapest_per_supplier,
        medicines_by_supplier,
    ),
    components(schemas(
        LotDetail,
        StockByMedicineRow,
        SupplierAddressRow,
        SupplierMedicineCountRow,
        SupplierAveragePriceRow,
        SupplierPriceExtremeRow,
        MedicineSummary,
        MedicinesBySupplierRow,
    )),
    tags((name = "Reports", description = "Aggregations across suppliers, medicines and stock"))
)]
pub struct ReportsApi;

pub fn router<S: EntityStore + 'static>(service: ReportService<S>) -> Router {
    Router::new()
        .route("/stock-by-medicine", get(stock_by_medicine))
        .route("/suppliers-by-address", get(suppliers_by_address))
        .route("/medicine-count-per-supplier", get(medicine_count_per_supplier))
        .route("/average-price-per-supplier", get(average_price_per_supplier))
        .route("/most-expensive-per-supplier", get(most_expensive_per_supplier))
        .route("/cheapest-per-supplier", get(cheapest_per_supplier))
        .route("/medicines-by-supplier", get(medicines_by_supplier))
        .with_state(Arc::new(service))
}

/// Total quantity and lots for medicines whose name matches
#[utoipa::path(
    get,
    path = "/stock-by-medicine",
    tag = "Reports",
    params(NameQuery),
    responses(
        (status = 200, description = "Stock per medicine", body = ReportResult<StockByMedicineRow>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn stock_by_medicine<S: EntityStore>(
    State(service): State<Arc<ReportService<S>>>,
    Query(query): Query<NameQuery>,
) -> PharmacyResult<Json<ReportResult<StockByMedicineRow>>> {
    Ok(Json(service.stock_by_medicine_name(&query.name).await?))
}

/// Suppliers whose address matches
#[utoipa::path(
    get,
    path = "/suppliers-by-address",
    tag = "Reports",
    params(AddressQuery),
    responses(
        (status = 200, description = "Matching suppliers", body = ReportResult<SupplierAddressRow>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn suppliers_by_address<S: EntityStore>(
    State(service): State<Arc<ReportService<S>>>,
    Query(query): Query<AddressQuery>,
) -> PharmacyResult<Json<ReportResult<SupplierAddressRow>>> {
    Ok(Json(service.suppliers_by_address(&query.address).await?))
}

#[utoipa::path(
    get,
    path = "/medicine-count-per-supplier",
    tag = "Reports",
    responses(
        (status = 200, description = "Medicines per supplier", body = ReportResult<SupplierMedicineCountRow>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn medicine_count_per_supplier<S: EntityStore>(
    State(service): State<Arc<ReportService<S>>>,
) -> PharmacyResult<Json<ReportResult<SupplierMedicineCountRow>>> {
    Ok(Json(service.medicine_count_per_supplier().await?))
}

#[utoipa::path(
    get,
    path = "/average-price-per-supplier",
    tag = "Reports",
    responses(
        (status = 200, description = "Average medicine price per supplier", body = ReportResult<SupplierAveragePriceRow>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn average_price_per_supplier<S: EntityStore>(
    State(service): State<Arc<ReportService<S>>>,
) -> PharmacyResult<Json<ReportResult<SupplierAveragePriceRow>>> {
    Ok(Json(service.average_price_per_supplier().await?))
}

#[utoipa::path(
    get,
    path = "/most-expensive-per-supplier",
    tag = "Reports",
    responses(
        (status = 200, description = "Most expensive medicine per supplier", body = ReportResult<SupplierPriceExtremeRow>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn most_expensive_per_supplier<S: EntityStore>(
    State(service): State<Arc<ReportService<S>>>,
) -> PharmacyResult<Json<ReportResult<SupplierPriceExtremeRow>>> {
    Ok(Json(
        service
            .price_extreme_per_supplier(PriceExtreme::MostExpensive)
            .await?,
    ))
}

#[utoipa::path(
    get,
    path = "/cheapest-per-supplier",
    tag = "Reports",
    responses(
        (status = 200, description = "Cheapest medicine per supplier", body = ReportResult<SupplierPriceExtremeRow>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn cheapest_per_supplier<S: EntityStore>(
    State(service): State<Arc<ReportService<S>>>,
) -> PharmacyResult<Json<ReportResult<SupplierPriceExtremeRow>>> {
    Ok(Json(
        service
            .price_extreme_per_supplier(PriceExtreme::Cheapest)
            .await?,
    ))
}

/// Medicines grouped under suppliers whose name matches
#[utoipa::path(
    get,
    path = "/medicines-by-supplier",
    tag = "Reports",
    params(NameQuery),
    responses(
        (status = 200, description = "Medicines per matching supplier", body = ReportResult<MedicinesBySupplierRow>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn medicines_by_supplier<S: EntityStore>(
    State(service): State<Arc<ReportService<S>>>,
    Query(query): Query<NameQuery>,
) -> PharmacyResult<Json<ReportResult<MedicinesBySupplierRow>>> {
    Ok(Json(service.medicines_by_supplier_name(&query.name).await?))
}
