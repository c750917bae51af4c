use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::AppError;
use crate::models::{Inserted, WishlistAdd, WishlistItem};
use crate::state::AppState;

pub async fn list(
    State(state): State<Arc<AppState>>,
    Path(email): Path<String>,
) -> Result<Json<Vec<WishlistItem>>, AppError> {
    Ok(Json(state.store.list_wishlist(&email).await?))
}

/// The unique index on `(blogId, userEmail)` arbitrates duplicates, so two
/// concurrent adds for the same pair cannot both land.
pub async fn add(
    State(state): State<Arc<AppState>>,
    Json(request): Json<WishlistAdd>,
) -> Result<Json<Inserted>, AppError> {
    let blog_id = request.validate()?;

    let blog = state
        .store
        .get_blog(blog_id)
        .await?
        .ok_or(AppError::NotFound("blog"))?;

    let item = WishlistItem::snapshot(blog_id, &request.user_email, &blog);
    let id = state.store.insert_wishlist(item).await?;
    Ok(Json(Inserted::from(id)))
}
