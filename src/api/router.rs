//! API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/`. A permissive CORS layer lets the
//! single-page dashboard call the API from its own dev origin.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints;
use crate::api::types::ApiContext;

/// Build the API router.
///
/// NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
pub fn api_router(ctx: ApiContext) -> Router {
    let routes = Router::new()
        .route("/health", get(endpoints::health::check))
        .route(
            "/medications",
            get(endpoints::medications::list).post(endpoints::medications::create),
        )
        .route(
            "/medications/:id",
            get(endpoints::medications::get_one)
                .put(endpoints::medications::update)
                .delete(endpoints::medications::delete),
        )
        .route("/medications/:id/dose", post(endpoints::medications::mark_dose))
        .route(
            "/medications/:id/refill",
            post(endpoints::medications::refill),
        )
        .route("/schedule/today", get(endpoints::schedule::today))
        .route("/schedule/today/slots", get(endpoints::schedule::today_slots))
        .route("/analytics", get(endpoints::analytics::summary))
        .route("/reminders/upcoming", get(endpoints::reminders::upcoming))
        .with_state(ctx);

    Router::new().nest("/api", routes).layer(CorsLayer::permissive())
}
