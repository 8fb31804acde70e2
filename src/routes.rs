// src/routes.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::currency::currency_preference};

/// Monta o router completo. O `main` e os testes usam o mesmo.
pub fn build_router(app_state: AppState) -> Router {
    // Formulários públicos do site
    let form_routes = Router::new()
        .route("/contact", post(handlers::contact::submit_contact))
        .route("/subscribe", post(handlers::newsletter::subscribe))
        .route("/newsletter/check", post(handlers::newsletter::check_subscription));

    let content_routes = Router::new()
        .route("/podcast/latest", get(handlers::podcast::latest_episode));

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api", form_routes.merge(content_routes))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Preferência de moeda vale para todas as rotas
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            currency_preference,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
