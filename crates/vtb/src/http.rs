//! Keep-alive HTTP server.
//!
//! Hosting platforms ping `/` to keep the process warm; `/privacy` serves
//! the static privacy-policy page the bot links to.

use axum::{response::Html, routing::get, Router};

async fn health() -> &'static str {
    "OK"
}

async fn privacy() -> Html<&'static str> {
    Html(include_str!("../assets/privacy.html"))
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(health))
        .route("/privacy", get(privacy))
}

pub async fn serve(port: u16) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!(port, "keep-alive server listening");
    axum::serve(listener, router()).await?;
    Ok(())
}
