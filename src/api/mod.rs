//! HTTP API layer: system routes and the OpenAPI document.

pub mod handlers;

use axum::Router;
use utoipa::OpenApi;

use crate::app_state::AppState;

/// OpenAPI description of the gateway's HTTP surface.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "onebot-gateway",
        description = "Token-authenticated WebSocket gateway for OneBot action messages."
    ),
    paths(handlers::system::health_handler, crate::ws::handler::ws_handler),
    tags(
        (name = "System", description = "Health and metadata"),
        (name = "Gateway", description = "WebSocket gateway endpoint"),
    )
)]
pub struct ApiDoc;

/// Builds the router with every non-gateway HTTP endpoint.
pub fn build_router() -> Router<AppState> {
    let router = Router::new().merge(handlers::system::routes());
    with_docs(router)
}

#[cfg(feature = "swagger-ui")]
fn with_docs(router: Router<AppState>) -> Router<AppState> {
    router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
}

#[cfg(not(feature = "swagger-ui"))]
fn with_docs(router: Router<AppState>) -> Router<AppState> {
    router.route(
        "/api-docs/openapi.json",
        axum::routing::get(|| async { axum::Json(ApiDoc::openapi()) }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_gateway_and_health() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/health"));
        assert!(doc.paths.paths.contains_key("/ws"));
    }
}
