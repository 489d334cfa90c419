use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use axum_helpers::{
    errors::responses::{
        BadRequestObjectIdResponse, BadRequestValidationResponse, InternalServerErrorResponse,
        NotFoundResponse,
    },
    ObjectIdPath, ValidatedJson,
};
use utoipa::OpenApi;

use crate::error::PharmacyResult;
use crate::models::{
    CreateStockLot, ExpiryWindow, StockLotCount, StockLotFilter, StockLotResponse,
    UpdateStockLot,
};
use crate::query::{PageParams, Paginated};
use crate::repository::EntityStore;
use crate::service::StockService;

#[derive(OpenApi)]
#[openapi(
    paths(
        list_stock,
        create_stock_lot,
        count_stock,
        list_expiring,
        get_stock_lot,
        update_stock_lot,
        delete_stock_lot,
    ),
    components(schemas(StockLotResponse, CreateStockLot, UpdateStockLot, StockLotCount)),
    tags((name = "Stock", description = "Stock lots received per medicine"))
)]
pub struct StockApi;

pub fn router<S: EntityStore + 'static>(service: StockService<S>) -> Router {
    Router::new()
        .route("/", get(list_stock).post(create_stock_lot))
        .route("/count", get(count_stock))
        .route("/expiring", get(list_expiring))
        .route(
            "/{id}",
            get(get_stock_lot)
                .put(update_stock_lot)
                .delete(delete_stock_lot),
        )
        .with_state(Arc::new(service))
}

/// List stock lots, soonest expiry first
#[utoipa::path(
    get,
    path = "",
    tag = "Stock",
    params(StockLotFilter, PageParams),
    responses(
        (status = 200, description = "Page of stock lots", body = Paginated<StockLotResponse>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_stock<S: EntityStore>(
    State(service): State<Arc<StockService<S>>>,
    Query(filter): Query<StockLotFilter>,
    Query(page): Query<PageParams>,
) -> PharmacyResult<Json<Paginated<StockLotResponse>>> {
    let lots = service.list(filter, page).await?;
    Ok(Json(lots.map(StockLotResponse::from)))
}

/// Receive a stock lot for an existing medicine
#[utoipa::path(
    post,
    path = "",
    tag = "Stock",
    request_body = CreateStockLot,
    responses(
        (status = 201, description = "Stock lot created", body = StockLotResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_stock_lot<S: EntityStore>(
    State(service): State<Arc<StockService<S>>>,
    ValidatedJson(input): ValidatedJson<CreateStockLot>,
) -> PharmacyResult<impl IntoResponse> {
    let lot = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(StockLotResponse::from(lot))))
}

#[utoipa::path(
    get,
    path = "/count",
    tag = "Stock",
    params(StockLotFilter),
    responses(
        (status = 200, description = "Number of stock lots", body = StockLotCount),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn count_stock<S: EntityStore>(
    State(service): State<Arc<StockService<S>>>,
    Query(filter): Query<StockLotFilter>,
) -> PharmacyResult<Json<StockLotCount>> {
    let total_stock_lots = service.count(filter).await?;
    Ok(Json(StockLotCount { total_stock_lots }))
}

/// Lots expiring within a date window (inclusive, whole days)
#[utoipa::path(
    get,
    path = "/expiring",
    tag = "Stock",
    params(ExpiryWindow, PageParams),
    responses(
        (status = 200, description = "Page of expiring lots", body = Paginated<StockLotResponse>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_expiring<S: EntityStore>(
    State(service): State<Arc<StockService<S>>>,
    Query(window): Query<ExpiryWindow>,
    Query(page): Query<PageParams>,
) -> PharmacyResult<Json<Paginated<StockLotResponse>>> {
    let lots = service.expiring(window, page).await?;
    Ok(Json(lots.map(StockLotResponse::from)))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Stock",
    params(("id" = String, Path, description = "Stock lot ObjectId")),
    responses(
        (status = 200, description = "Stock lot with its medicine", body = StockLotResponse),
        (status = 400, response = BadRequestObjectIdResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_stock_lot<S: EntityStore>(
    State(service): State<Arc<StockService<S>>>,
    ObjectIdPath(id): ObjectIdPath,
) -> PharmacyResult<Json<StockLotResponse>> {
    let lot = service.get(id).await?;
    Ok(Json(lot.into()))
}

/// Correct a stock lot
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Stock",
    params(("id" = String, Path, description = "Stock lot ObjectId")),
    request_body = UpdateStockLot,
    responses(
        (status = 200, description = "Stock lot updated", body = StockLotResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_stock_lot<S: EntityStore>(
    State(service): State<Arc<StockService<S>>>,
    ObjectIdPath(id): ObjectIdPath,
    ValidatedJson(changes): ValidatedJson<UpdateStockLot>,
) -> PharmacyResult<Json<StockLotResponse>> {
    let lot = service.update(id, changes).await?;
    Ok(Json(lot.into()))
}

/// Write off a stock lot
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Stock",
    params(("id" = String, Path, description = "Stock lot ObjectId")),
    responses(
        (status = 204, description = "Stock lot deleted"),
        (status = 400, response = BadRequestObjectIdResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_stock_lot<S: EntityStore>(
    State(service): State<Arc<StockService<S>>>,
    ObjectIdPath(id): ObjectIdPath,
) -> PharmacyResult<StatusCode> {
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
