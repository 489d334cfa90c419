use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use axum_helpers::{
    errors::responses::{
        BadRequestObjectIdResponse, BadRequestValidationResponse, ConflictResponse,
        InternalServerErrorResponse, NotFoundResponse,
    },
    ObjectIdPath, ValidatedJson,
};
use utoipa::OpenApi;

use crate::error::PharmacyResult;
use crate::models::{
    CreateSupplier, SupplierCount, SupplierFilter, SupplierResponse, UpdateSupplier,
};
use crate::query::{PageParams, Paginated};
use crate::repository::EntityStore;
use crate::service::SupplierService;

#[derive(OpenApi)]
#[openapi(
    paths(
        list_suppliers,
        create_supplier,
        count_suppliers,
        get_supplier_by_tax_id,
        get_supplier,
        update_supplier,
        delete_supplier,
    ),
    components(schemas(SupplierResponse, CreateSupplier, UpdateSupplier, SupplierCount)),
    tags((name = "Suppliers", description = "Supplier registry"))
)]
pub struct SuppliersApi;

pub fn router<S: EntityStore + 'static>(service: SupplierService<S>) -> Router {
    Router::new()
        .route("/", get(list_suppliers).post(create_supplier))
        .route("/count", get(count_suppliers))
        .route("/tax-id/{tax_id}", get(get_supplier_by_tax_id))
        .route(
            "/{id}",
            get(get_supplier).put(update_supplier).delete(delete_supplier),
        )
        .with_state(Arc::new(service))
}

/// List suppliers, ordered by name
#[utoipa::path(
    get,
    path = "",
    tag = "Suppliers",
    params(SupplierFilter, PageParams),
    responses(
        (status = 200, description = "Page of suppliers", body = Paginated<SupplierResponse>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_suppliers<S: EntityStore>(
    State(service): State<Arc<SupplierService<S>>>,
    Query(filter): Query<SupplierFilter>,
    Query(page): Query<PageParams>,
) -> PharmacyResult<Json<Paginated<SupplierResponse>>> {
    let suppliers = service.list(filter, page).await?;
    Ok(Json(suppliers.map(SupplierResponse::from)))
}

/// Register a supplier
#[utoipa::path(
    post,
    path = "",
    tag = "Suppliers",
    request_body = CreateSupplier,
    responses(
        (status = 201, description = "Supplier created", body = SupplierResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_supplier<S: EntityStore>(
    State(service): State<Arc<SupplierService<S>>>,
    ValidatedJson(input): ValidatedJson<CreateSupplier>,
) -> PharmacyResult<impl IntoResponse> {
    let supplier = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(SupplierResponse::from(supplier))))
}

/// Count suppliers matching the filters
#[utoipa::path(
    get,
    path = "/count",
    tag = "Suppliers",
    params(SupplierFilter),
    responses(
        (status = 200, description = "Number of suppliers", body = SupplierCount),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn count_suppliers<S: EntityStore>(
    State(service): State<Arc<SupplierService<S>>>,
    Query(filter): Query<SupplierFilter>,
) -> PharmacyResult<Json<SupplierCount>> {
    let total_suppliers = service.count(filter).await?;
    Ok(Json(SupplierCount { total_suppliers }))
}

/// Find a supplier by tax id
#[utoipa::path(
    get,
    path = "/tax-id/{tax_id}",
    tag = "Suppliers",
    params(("tax_id" = String, Path, description = "14 digits, punctuation allowed")),
    responses(
        (status = 200, description = "Supplier found", body = SupplierResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_supplier_by_tax_id<S: EntityStore>(
    State(service): State<Arc<SupplierService<S>>>,
    Path(tax_id): Path<String>,
) -> PharmacyResult<Json<SupplierResponse>> {
    let supplier = service.get_by_tax_id(&tax_id).await?;
    Ok(Json(supplier.into()))
}

/// Get a supplier by id
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Suppliers",
    params(("id" = String, Path, description = "Supplier ObjectId")),
    responses(
        (status = 200, description = "Supplier found", body = SupplierResponse),
        (status = 400, response = BadRequestObjectIdResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_supplier<S: EntityStore>(
    State(service): State<Arc<SupplierService<S>>>,
    ObjectIdPath(id): ObjectIdPath,
) -> PharmacyResult<Json<SupplierResponse>> {
    let supplier = service.get(id).await?;
    Ok(Json(supplier.into()))
}

/// Update the supplied fields of a supplier
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Suppliers",
    params(("id" = String, Path, description = "Supplier ObjectId")),
    request_body = UpdateSupplier,
    responses(
        (status = 200, description = "Supplier updated", body = SupplierResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_supplier<S: EntityStore>(
    State(service): State<Arc<SupplierService<S>>>,
    ObjectIdPath(id): ObjectIdPath,
    ValidatedJson(changes): ValidatedJson<UpdateSupplier>,
) -> PharmacyResult<Json<SupplierResponse>> {
    let supplier = service.update(id, changes).await?;
    Ok(Json(supplier.into()))
}

/// Delete a supplier without medicines
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Suppliers",
    params(("id" = String, Path, description = "Supplier ObjectId")),
    responses(
        (status = 204, description = "Supplier deleted"),
        (status = 400, response = BadRequestObjectIdResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_supplier<S: EntityStore>(
    State(service): State<Arc<SupplierService<S>>>,
    ObjectIdPath(id): ObjectIdPath,
) -> PharmacyResult<StatusCode> {
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
