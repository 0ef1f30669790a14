use axum::{Router, routing::get};
use axum::http::{header, Method, StatusCode};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use crate::api::AppState;
use crate::api::handlers;

pub fn create_router(state: AppState) -> Router {
    // 配置 CORS，确保正确处理预检请求
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600));

    Router::new()
        .route("/", get(handlers::page::index_page).post(handlers::page::index_page))
        .route(
            "/generate",
            get(handlers::generate::generate_get).post(handlers::generate::generate_post),
        )
        .fallback(not_found)
        // CORS 层应该在最后，确保所有路由都应用
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not Found")
}
