use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::{SecondsFormat, Utc};
use tracing::debug;

use crate::error::AppError;
use crate::models::{Inserted, SignInUpdate, Updated, User};
use crate::state::AppState;

pub async fn list(State(state): State<Arc<AppState>>) -> Result<Json<Vec<User>>, AppError> {
    Ok(Json(state.store.list_users().await?))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(user): Json<User>,
) -> Result<Json<Inserted>, AppError> {
    user.validate()?;
    let id = state.store.insert_user(user).await?;
    Ok(Json(Inserted::from(id)))
}

pub async fn sign_in(
    State(state): State<Arc<AppState>>,
    Json(update): Json<SignInUpdate>,
) -> Result<Json<Updated>, AppError> {
    update.validate()?;

    let sign_in_time = update
        .last_sign_in_time
        .unwrap_or_else(|| Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true));

    let outcome = state
        .store
        .record_sign_in(&update.email, &sign_in_time)
        .await?;
    if outcome.matched == 0 {
        debug!("sign-in update matched no user for {}", update.email);
    }

    Ok(Json(Updated::from(outcome)))
}
