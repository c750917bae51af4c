//! Store abstraction over the four collections.
//!
//! Handlers only ever see `Arc<dyn Store>`, injected through the shared
//! state. The MongoDB implementation backs the real server; the in-memory
//! one backs the tests and storeless local runs.

pub mod memory;
pub mod mongo;

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

use crate::error::AppError;
use crate::models::{Blog, BlogPatch, Comment, Updated, User, WishlistItem};

/// What a filtered update touched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateOutcome {
    pub matched: u64,
    pub modified: u64,
    pub upserted_id: Option<ObjectId>,
}

impl From<UpdateOutcome> for Updated {
    fn from(outcome: UpdateOutcome) -> Self {
        Self {
            matched_count: outcome.matched,
            modified_count: outcome.modified,
            upserted_id: outcome.upserted_id.map(|id| id.to_hex()),
        }
    }
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn list_users(&self) -> Result<Vec<User>, AppError>;
    async fn insert_user(&self, user: User) -> Result<ObjectId, AppError>;
    /// Sets `lastSignInTime` on the user matching `email`. Zero matches is
    /// not an error; the outcome carries the count.
    async fn record_sign_in(
        &self,
        email: &str,
        sign_in_time: &str,
    ) -> Result<UpdateOutcome, AppError>;

    /// `category` filters by exact match, `search` by the title text index.
    async fn list_blogs(
        &self,
        category: Option<&str>,
        search: Option<&str>,
    ) -> Result<Vec<Blog>, AppError>;
    async fn get_blog(&self, id: ObjectId) -> Result<Option<Blog>, AppError>;
    async fn insert_blog(&self, blog: Blog) -> Result<ObjectId, AppError>;
    /// Writes the provided whitelist fields, creating the document when the
    /// id is new.
    async fn upsert_blog(&self, id: ObjectId, patch: BlogPatch)
        -> Result<UpdateOutcome, AppError>;

    async fn insert_comment(&self, comment: Comment) -> Result<ObjectId, AppError>;
    async fn list_comments(&self, blog_id: &str) -> Result<Vec<Comment>, AppError>;

    async fn list_wishlist(&self, user_email: &str) -> Result<Vec<WishlistItem>, AppError>;
    /// Fails with [`AppError::Duplicate`] when `(blogId, userEmail)` is
    /// already present.
    async fn insert_wishlist(&self, item: WishlistItem) -> Result<ObjectId, AppError>;
}
