use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::AppError;
use crate::models::{Comment, Inserted};
use crate::state::AppState;

pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(comment): Json<Comment>,
) -> Result<Json<Inserted>, AppError> {
    comment.validate()?;
    let id = state.store.insert_comment(comment).await?;
    Ok(Json(Inserted::from(id)))
}

/// An unknown or malformed blog id just yields an empty list.
pub async fn list(
    State(state): State<Arc<AppState>>,
    Path(blog_id): Path<String>,
) -> Result<Json<Vec<Comment>>, AppError> {
    Ok(Json(state.store.list_comments(&blog_id).await?))
}
