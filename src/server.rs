use crate::config::AppConfig;
use anyhow::{Context, Result};
use axum::response::Redirect;
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;

/// First `message` value in a raw query string. Repeated keys or malformed
/// pairs never fail the request; the home page must always record its visit.
pub fn message_param(raw_query: Option<&str>) -> Option<String> {
    let pairs: Vec<(String, String)> =
        serde_urlencoded::from_str(raw_query.unwrap_or_default()).unwrap_or_default();
    pairs
        .into_iter()
        .find(|(key, _)| key == "message")
        .map(|(_, value)| value)
}

/// `303 See Other` back to the status page with `message` in the query.
pub fn redirect_with_message(message: &str) -> Redirect {
    match serde_urlencoded::to_string([("message", message)]) {
        Ok(query) => Redirect::to(&format!("/?{}", query)),
        Err(e) => {
            tracing::warn!("Failed to encode redirect message: {}", e);
            Redirect::to("/")
        }
    }
}

/// Binds to `BIND_HOST:PORT` and serves until the process exits.
pub async fn serve(config: &AppConfig, app: Router, endpoints: &[&str]) -> Result<()> {
    let addr = config.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("🚀 Listening on http://{}", addr);
    for endpoint in endpoints {
        info!("   {}", endpoint);
    }

    axum::serve(listener, app.layer(TraceLayer::new_for_http()))
        .await
        .context("Server error")
}
