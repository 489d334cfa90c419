//! OpenAPI documentation configuration

use utoipa::OpenApi;

/// Combined OpenAPI documentation served by the docs UIs
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Pharmacy API",
        version = "0.1.0",
        description = "Suppliers, medicines and stock lots backed by MongoDB, with aggregation reports",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    nest(
        (path = "/api", api = domain_pharmacy::ApiDoc)
    )
)]
pub struct ApiDoc;
