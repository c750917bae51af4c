use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::error::AppError;
use crate::models::{
    parse_object_id, Blog, BlogListQuery, BlogPatch, FeaturedBlog, Inserted, Updated,
};
use crate::state::AppState;

pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BlogListQuery>,
) -> Result<Json<Vec<Blog>>, AppError> {
    let blogs = state
        .store
        .list_blogs(query.category(), query.search())
        .await?;
    Ok(Json(blogs))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Option<Blog>>, AppError> {
    let id = parse_object_id(&id)?;
    Ok(Json(state.store.get_blog(id).await?))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(blog): Json<Blog>,
) -> Result<Json<Inserted>, AppError> {
    blog.validate()?;
    let id = state.store.insert_blog(blog).await?;
    Ok(Json(Inserted::from(id)))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(patch): Json<BlogPatch>,
) -> Result<Json<Updated>, AppError> {
    let id = parse_object_id(&id)?;
    patch.validate()?;
    let outcome = state.store.upsert_blog(id, patch).await?;
    Ok(Json(Updated::from(outcome)))
}

pub async fn featured(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<FeaturedBlog>>, AppError> {
    let blogs = state.store.list_blogs(None, None).await?;
    Ok(Json(rank_featured(blogs)))
}

const FEATURED_LIMIT: usize = 10;

/// Full scan, scored by the whitespace token count of `longDesc`.
/// `sort_by` is stable, so ties keep their collection order.
fn rank_featured(blogs: Vec<Blog>) -> Vec<FeaturedBlog> {
    let mut ranked: Vec<FeaturedBlog> = blogs
        .into_iter()
        .map(|blog| FeaturedBlog {
            word_count: blog.long_desc.as_deref().map_or(0, word_count),
            blog,
        })
        .collect();

    ranked.sort_by(|a, b| b.word_count.cmp(&a.word_count));
    ranked.truncate(FEATURED_LIMIT);
    ranked
}

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blog_with_desc(title: &str, long_desc: Option<&str>) -> Blog {
        Blog {
            title: title.to_string(),
            category: "misc".to_string(),
            long_desc: long_desc.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_word_count_splits_on_any_whitespace() {
        assert_eq!(word_count("one two   three\n\tfour"), 4);
        assert_eq!(word_count("   "), 0);
        assert_eq!(word_count(""), 0);
    }

    #[test]
    fn test_rank_orders_by_descending_word_count() {
        let ranked = rank_featured(vec![
            blog_with_desc("short", Some("two words")),
            blog_with_desc("long", Some("five words in this one")),
            blog_with_desc("bare", None),
        ]);

        let titles: Vec<&str> = ranked.iter().map(|f| f.blog.title.as_str()).collect();
        assert_eq!(titles, ["long", "short", "bare"]);
        assert_eq!(ranked[0].word_count, 5);
        assert_eq!(ranked[2].word_count, 0);
    }

    #[test]
    fn test_rank_is_stable_on_ties() {
        let ranked = rank_featured(vec![
            blog_with_desc("first", Some("same length")),
            blog_with_desc("second", Some("equal tokens")),
            blog_with_desc("third", Some("also two")),
        ]);

        let titles: Vec<&str> = ranked.iter().map(|f| f.blog.title.as_str()).collect();
        assert_eq!(titles, ["first", "second", "third"]);
    }

    #[test]
    fn test_rank_caps_at_ten() {
        let blogs = (0..15)
            .map(|i| blog_with_desc(&format!("blog {i}"), Some("a few words here")))
            .collect();
        assert_eq!(rank_featured(blogs).len(), FEATURED_LIMIT);
    }
}
