//! # MongoDB
//!
//! Document store backing all four collections.
//!
//! ## Collections
//!
//! - `users`: one document per sign-up, `lastSignInTime` rewritten on sign-in
//! - `blogs`: text index on `title` for the `search` query parameter
//! - `comments`: keyed by `blogId`, never updated or deleted
//! - `wishlist`: unique compound index on `(blogId, userEmail)` so duplicate
//!   adds lose the write instead of racing a read-then-insert
//!
//! Indexes are created at startup; `create_index` is idempotent, so repeated
//! boots are harmless.

use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Document},
    error::{ErrorKind, WriteFailure},
    options::{ClientOptions, IndexOptions},
    results::{InsertOneResult, UpdateResult},
    Client, Collection, IndexModel,
};
use tracing::info;

use super::{Store, UpdateOutcome};
use crate::config::Config;
use crate::error::AppError;
use crate::models::{Blog, BlogPatch, Comment, User, WishlistItem};

pub struct MongoStore {
    users: Collection<User>,
    blogs: Collection<Blog>,
    comments: Collection<Comment>,
    wishlist: Collection<WishlistItem>,
}

impl MongoStore {
    pub async fn connect(config: &Config) -> Result<Self, AppError> {
        let mut options = ClientOptions::parse(&config.mongo_url).await?;
        options.server_selection_timeout = Some(Duration::from_secs(5));

        let client = Client::with_options(options)?;
        let db = client.database(&config.db_name);

        // Fail at boot, not on the first request.
        db.run_command(doc! { "ping": 1 }).await?;
        info!("Connected to MongoDB database {}", config.db_name);

        let store = Self {
            users: db.collection("users"),
            blogs: db.collection("blogs"),
            comments: db.collection("comments"),
            wishlist: db.collection("wishlist"),
        };
        store.ensure_indexes().await?;

        Ok(store)
    }

    async fn ensure_indexes(&self) -> Result<(), AppError> {
        self.blogs
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "title": "text" })
                    .build(),
            )
            .await?;

        self.wishlist
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "blogId": 1, "userEmail": 1 })
                    .options(IndexOptions::builder().unique(true).build())
                    .build(),
            )
            .await?;

        Ok(())
    }
}

#[async_trait]
impl Store for MongoStore {
    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        Ok(self.users.find(doc! {}).await?.try_collect().await?)
    }

    async fn insert_user(&self, user: User) -> Result<ObjectId, AppError> {
        let result = self.users.insert_one(&user).await?;
        Ok(inserted_object_id(result))
    }

    async fn record_sign_in(
        &self,
        email: &str,
        sign_in_time: &str,
    ) -> Result<UpdateOutcome, AppError> {
        let result = self
            .users
            .update_one(
                doc! { "email": email },
                doc! { "$set": { "lastSignInTime": sign_in_time } },
            )
            .await?;
        Ok(update_outcome(result))
    }

    async fn list_blogs(
        &self,
        category: Option<&str>,
        search: Option<&str>,
    ) -> Result<Vec<Blog>, AppError> {
        let mut filter = Document::new();
        if let Some(category) = category {
            filter.insert("category", category);
        }
        if let Some(search) = search {
            filter.insert("$text", doc! { "$search": search });
        }

        Ok(self.blogs.find(filter).await?.try_collect().await?)
    }

    async fn get_blog(&self, id: ObjectId) -> Result<Option<Blog>, AppError> {
        Ok(self.blogs.find_one(doc! { "_id": id }).await?)
    }

    async fn insert_blog(&self, blog: Blog) -> Result<ObjectId, AppError> {
        let result = self.blogs.insert_one(&blog).await?;
        Ok(inserted_object_id(result))
    }

    async fn upsert_blog(
        &self,
        id: ObjectId,
        patch: BlogPatch,
    ) -> Result<UpdateOutcome, AppError> {
        let result = self
            .blogs
            .update_one(doc! { "_id": id }, doc! { "$set": patch_document(&patch) })
            .upsert(true)
            .await?;
        Ok(update_outcome(result))
    }

    async fn insert_comment(&self, comment: Comment) -> Result<ObjectId, AppError> {
        let result = self.comments.insert_one(&comment).await?;
        Ok(inserted_object_id(result))
    }

    async fn list_comments(&self, blog_id: &str) -> Result<Vec<Comment>, AppError> {
        Ok(self
            .comments
            .find(doc! { "blogId": blog_id })
            .await?
            .try_collect()
            .await?)
    }

    async fn list_wishlist(&self, user_email: &str) -> Result<Vec<WishlistItem>, AppError> {
        Ok(self
            .wishlist
            .find(doc! { "userEmail": user_email })
            .await?
            .try_collect()
            .await?)
    }

    async fn insert_wishlist(&self, item: WishlistItem) -> Result<ObjectId, AppError> {
        match self.wishlist.insert_one(&item).await {
            Ok(result) => Ok(inserted_object_id(result)),
            Err(err) if is_duplicate_key(&err) => Err(AppError::Duplicate("wishlist entry")),
            Err(err) => Err(err.into()),
        }
    }
}

/// Only the whitelist fields the caller actually sent end up in `$set`.
fn patch_document(patch: &BlogPatch) -> Document {
    let mut set = Document::new();
    if let Some(title) = &patch.title {
        set.insert("title", title.as_str());
    }
    if let Some(category) = &patch.category {
        set.insert("category", category.as_str());
    }
    if let Some(image_url) = &patch.image_url {
        set.insert("imageUrl", image_url.as_str());
    }
    if let Some(long_desc) = &patch.long_desc {
        set.insert("longDesc", long_desc.as_str());
    }
    if let Some(short_desc) = &patch.short_desc {
        set.insert("shortDesc", short_desc.as_str());
    }
    set
}

fn update_outcome(result: UpdateResult) -> UpdateOutcome {
    UpdateOutcome {
        matched: result.matched_count,
        modified: result.modified_count,
        upserted_id: result.upserted_id.and_then(|id| id.as_object_id()),
    }
}

fn inserted_object_id(result: InsertOneResult) -> ObjectId {
    // All inserts leave `_id` unset, so the server generates an ObjectId.
    result
        .inserted_id
        .as_object_id()
        .expect("server-generated _id")
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match &*err.kind {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => write_error.code == 11000,
        _ => false,
    }
}
