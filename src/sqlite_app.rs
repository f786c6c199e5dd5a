//! Structured-store variant: users and visits in SQLite.

use crate::config::AppConfig;
use crate::error::AppResult;
use crate::models::{CreateUserForm, CreateUserOutcome, RecordHealth, HOME_PAGE};
use crate::server::{message_param, redirect_with_message};
use crate::storage::{RecordStore, RECENT_VISITS_LIMIT};
use crate::view::RecordPage;
use axum::{
    extract::{RawQuery, State},
    response::{Html, Redirect},
    routing::{get, post},
    Form, Json, Router,
};
use std::sync::Arc;
use tracing::{debug, info};

pub const ENDPOINTS: [&str; 3] = [
    "GET  /          - Status page (records a visit)",
    "POST /add_user  - Create a user",
    "GET  /health    - Counts as JSON",
];

pub struct AppState {
    pub config: AppConfig,
    pub store: RecordStore,
}

pub fn router(config: AppConfig, store: RecordStore) -> Router {
    let state = Arc::new(AppState { config, store });
    Router::new()
        .route("/", get(index))
        .route("/add_user", post(add_user))
        .route("/health", get(health))
        .with_state(state)
}

async fn index(
    State(state): State<Arc<AppState>>,
    RawQuery(query): RawQuery,
) -> AppResult<Html<String>> {
    let message = message_param(query.as_deref());
    let visit = state.store.record_visit(HOME_PAGE).await?;
    debug!(visit_id = visit.id, "Recorded visit");

    let users = state.store.list_users().await?;
    let visits = state.store.recent_visits(RECENT_VISITS_LIMIT).await?;
    let total_visits = state.store.count_visits().await?;
    let total_users = state.store.count_users().await?;

    let page = RecordPage {
        message: message.as_deref(),
        total_visits,
        total_users,
        db_exists: state.store.db_exists(),
        users: &users,
        visits: &visits,
        storage_path: &state.config.storage_path,
        db_path: state.store.db_path(),
    };
    Ok(Html(page.render()))
}

async fn add_user(
    State(state): State<Arc<AppState>>,
    Form(form): Form<CreateUserForm>,
) -> AppResult<Redirect> {
    let outcome = state.store.create_user(&form.username, &form.email).await?;
    match &outcome {
        CreateUserOutcome::Created(username) => info!(%username, "User created"),
        rejected => info!(?rejected, "User rejected"),
    }
    Ok(redirect_with_message(&outcome.message()))
}

async fn health(State(state): State<Arc<AppState>>) -> AppResult<Json<RecordHealth>> {
    Ok(Json(RecordHealth {
        status: "healthy".to_string(),
        users: state.store.count_users().await?,
        visits: state.store.count_visits().await?,
        db_exists: state.store.db_exists(),
    }))
}
