use axum::response::{Html, IntoResponse};

pub async fn index_page() -> impl IntoResponse {
    let html_content = include_str!("../../templates/index.html");
    Html(html_content.to_string())
}
