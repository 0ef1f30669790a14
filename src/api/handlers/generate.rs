use axum::{
    extract::{Json, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use axum::Json as AxumJson;
use crate::api::AppState;
use crate::model::generate::{GenerateQuery, GenerateRequest};

const DEFAULT_TEXT: &str = "Hello World";

pub async fn generate_get(
    State(state): State<AppState>,
    Query(query): Query<GenerateQuery>,
) -> impl IntoResponse {
    respond(state, query.text).await
}

pub async fn generate_post(
    State(state): State<AppState>,
    Json(payload): Json<GenerateRequest>,
) -> impl IntoResponse {
    respond(state, payload.text).await
}

/// GET/POST 共用的生成逻辑，空文本一律回退到默认值
async fn respond(state: AppState, text: Option<String>) -> Response {
    let text = match text {
        Some(t) if !t.trim().is_empty() => t,
        _ => DEFAULT_TEXT.to_string(),
    };

    let size = state.config.qr.size;

    match state.composer.compose(&text, size).await {
        Ok(image) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, image.content_type.as_str()),
                (header::CACHE_CONTROL, "public, max-age=3600"),
            ],
            image.bytes,
        ).into_response(),
        Err(e) => {
            tracing::error!("生成失败: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                AxumJson(serde_json::json!({"error": e.to_string()})),
            ).into_response()
        }
    }
}
