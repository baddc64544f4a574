use axum::{http::StatusCode, routing::get, Router};

pub fn health_routes() -> Router {
    Router::new().route("/healthcheck", get(healthcheck))
}

pub async fn healthcheck() -> (StatusCode, &'static str) {
    (StatusCode::OK, "Server is up and running!")
}
