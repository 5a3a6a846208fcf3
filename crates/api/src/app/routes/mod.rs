use axum::{Router, routing::post};

pub mod settlements;
pub mod system;

/// Router for the settlement endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/settlements", post(settlements::settle_group))
        .route("/settlements/plan", post(settlements::plan_settlements))
}
