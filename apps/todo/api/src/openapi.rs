use domain_tasks::handlers::BEARER_SCHEME;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    components(
        schemas(axum_helpers::ErrorResponse)
    ),
    info(
        title = "Todo API",
        version = "0.1.0",
        description = "Public to-do tasks with comments; writes require a bearer token"
    ),
    servers(
        (url = "/api", description = "API base path")
    ),
    modifiers(&TasksAddon)
)]
pub struct ApiDoc;

/// Mounts the tasks domain at the API root and registers its bearer scheme.
struct TasksAddon;

impl Modify for TasksAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.merge(domain_tasks::ApiDoc::openapi());

        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            BEARER_SCHEME,
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
