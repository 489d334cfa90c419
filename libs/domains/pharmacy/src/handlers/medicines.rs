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
        BadRequestObjectIdResponse, BadRequestValidationResponse, ConflictResponse,
        InternalServerErrorResponse, NotFoundResponse,
    },
    ObjectIdPath, ValidatedJson,
};
use utoipa::OpenApi;

use crate::error::PharmacyResult;
use crate::models::{
    CreateMedicine, MedicineCount, MedicineFilter, MedicineResponse, UpdateMedicine,
};
use crate::query::{PageParams, Paginated};
use crate::repository::EntityStore;
use crate::service::MedicineService;

#[derive(OpenApi)]
#[openapi(
    paths(
        list_medicines,
        create_medicine,
        count_medicines,
        get_medicine,
        update_medicine,
        delete_medicine,
    ),
    components(schemas(MedicineResponse, CreateMedicine, UpdateMedicine, MedicineCount)),
    tags((name = "Medicines", description = "Medicine catalog"))
)]
pub struct MedicinesApi;

pub fn router<S: EntityStore + 'static>(service: MedicineService<S>) -> Router {
    Router::new()
        .route("/", get(list_medicines).post(create_medicine))
        .route("/count", get(count_medicines))
        .route(
            "/{id}",
            get(get_medicine).put(update_medicine).delete(delete_medicine),
        )
        .with_state(Arc::new(service))
}

/// List medicines, ordered by name
#[utoipa::path(
    get,
    path = "",
    tag = "Medicines",
    params(MedicineFilter, PageParams),
    responses(
        (status = 200, description = "Page of medicines", body = Paginated<MedicineResponse>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_medicines<S: EntityStore>(
    State(service): State<Arc<MedicineService<S>>>,
    Query(filter): Query<MedicineFilter>,
    Query(page): Query<PageParams>,
) -> PharmacyResult<Json<Paginated<MedicineResponse>>> {
    let medicines = service.list(filter, page).await?;
    Ok(Json(medicines.map(MedicineResponse::from)))
}

/// Add a medicine for an existing supplier
#[utoipa::path(
    post,
    path = "",
    tag = "Medicines",
    request_body = CreateMedicine,
    responses(
        (status = 201, description = "Medicine created", body = MedicineResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_medicine<S: EntityStore>(
    State(service): State<Arc<MedicineService<S>>>,
    ValidatedJson(input): ValidatedJson<CreateMedicine>,
) -> PharmacyResult<impl IntoResponse> {
    let medicine = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(MedicineResponse::from(medicine))))
}

#[utoipa::path(
    get,
    path = "/count",
    tag = "Medicines",
    params(MedicineFilter),
    responses(
        (status = 200, description = "Number of medicines", body = MedicineCount),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn count_medicines<S: EntityStore>(
    State(service): State<Arc<MedicineService<S>>>,
    Query(filter): Query<MedicineFilter>,
) -> PharmacyResult<Json<MedicineCount>> {
    let total_medicines = service.count(filter).await?;
    Ok(Json(MedicineCount { total_medicines }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Medicines",
    params(("id" = String, Path, description = "Medicine ObjectId")),
    responses(
        (status = 200, description = "Medicine found", body = MedicineResponse),
        (status = 400, response = BadRequestObjectIdResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_medicine<S: EntityStore>(
    State(service): State<Arc<MedicineService<S>>>,
    ObjectIdPath(id): ObjectIdPath,
) -> PharmacyResult<Json<MedicineResponse>> {
    let medicine = service.get(id).await?;
    Ok(Json(medicine.into()))
}

/// Update the supplied fields; a new supplier must exist
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Medicines",
    params(("id" = String, Path, description = "Medicine ObjectId")),
    request_body = UpdateMedicine,
    responses(
        (status = 200, description = "Medicine updated", body = MedicineResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_medicine<S: EntityStore>(
    State(service): State<Arc<MedicineService<S>>>,
    ObjectIdPath(id): ObjectIdPath,
    ValidatedJson(changes): ValidatedJson<UpdateMedicine>,
) -> PharmacyResult<Json<MedicineResponse>> {
    let medicine = service.update(id, changes).await?;
    Ok(Json(medicine.into()))
}

/// Delete a medicine without stock lots
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Medicines",
    params(("id" = String, Path, description = "Medicine ObjectId")),
    responses(
        (status = 204, description = "Medicine deleted"),
        (status = 400, response = BadRequestObjectIdResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_medicine<S: EntityStore>(
    State(service): State<Arc<MedicineService<S>>>,
    ObjectIdPath(id): ObjectIdPath,
) -> PharmacyResult<StatusCode> {
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
