//! In-memory store backed by plain Vecs, preserving insertion order the way
//! an unindexed collection scan does. Used by the integration tests and for
//! local development without a running MongoDB.

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use parking_lot::RwLock;

use super::{Store, UpdateOutcome};
use crate::error::AppError;
use crate::models::{Blog, BlogPatch, Comment, User, WishlistItem};

#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<Vec<User>>,
    blogs: RwLock<Vec<Blog>>,
    comments: RwLock<Vec<Comment>>,
    wishlist: RwLock<Vec<WishlistItem>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        Ok(self.users.read().clone())
    }

    async fn insert_user(&self, mut user: User) -> Result<ObjectId, AppError> {
        let id = ObjectId::new();
        user.id = Some(id);
        self.users.write().push(user);
        Ok(id)
    }

    async fn record_sign_in(
        &self,
        email: &str,
        sign_in_time: &str,
    ) -> Result<UpdateOutcome, AppError> {
        let mut users = self.users.write();
        match users.iter_mut().find(|user| user.email == email) {
            Some(user) => {
                let modified = user.last_sign_in_time.as_deref() != Some(sign_in_time);
                if modified {
                    user.last_sign_in_time = Some(sign_in_time.to_string());
                }
                Ok(UpdateOutcome {
                    matched: 1,
                    modified: modified as u64,
                    upserted_id: None,
                })
            }
            None => Ok(UpdateOutcome::default()),
        }
    }

    async fn list_blogs(
        &self,
        category: Option<&str>,
        search: Option<&str>,
    ) -> Result<Vec<Blog>, AppError> {
        // Substring match on the title stands in for the text index.
        let search = search.map(str::to_lowercase);
        Ok(self
            .blogs
            .read()
            .iter()
            .filter(|blog| category.is_none_or(|c| blog.category == c))
            .filter(|blog| {
                search
                    .as_deref()
                    .is_none_or(|s| blog.title.to_lowercase().contains(s))
            })
            .cloned()
            .collect())
    }

    async fn get_blog(&self, id: ObjectId) -> Result<Option<Blog>, AppError> {
        Ok(self
            .blogs
            .read()
            .iter()
            .find(|blog| blog.id == Some(id))
            .cloned())
    }

    async fn insert_blog(&self, mut blog: Blog) -> Result<ObjectId, AppError> {
        let id = ObjectId::new();
        blog.id = Some(id);
        self.blogs.write().push(blog);
        Ok(id)
    }

    async fn upsert_blog(
        &self,
        id: ObjectId,
        patch: BlogPatch,
    ) -> Result<UpdateOutcome, AppError> {
        let mut blogs = self.blogs.write();
        match blogs.iter_mut().find(|blog| blog.id == Some(id)) {
            Some(blog) => {
                let modified = apply_patch(blog, &patch);
                Ok(UpdateOutcome {
                    matched: 1,
                    modified: modified as u64,
                    upserted_id: None,
                })
            }
            None => {
                let mut blog = Blog {
                    id: Some(id),
                    ..Default::default()
                };
                apply_patch(&mut blog, &patch);
                blogs.push(blog);
                Ok(UpdateOutcome {
                    matched: 0,
                    modified: 0,
                    upserted_id: Some(id),
                })
            }
        }
    }

    async fn insert_comment(&self, mut comment: Comment) -> Result<ObjectId, AppError> {
        let id = ObjectId::new();
        comment.id = Some(id);
        self.comments.write().push(comment);
        Ok(id)
    }

    async fn list_comments(&self, blog_id: &str) -> Result<Vec<Comment>, AppError> {
        Ok(self
            .comments
            .read()
            .iter()
            .filter(|comment| comment.blog_id == blog_id)
            .cloned()
            .collect())
    }

    async fn list_wishlist(&self, user_email: &str) -> Result<Vec<WishlistItem>, AppError> {
        Ok(self
            .wishlist
            .read()
            .iter()
            .filter(|item| item.user_email == user_email)
            .cloned()
            .collect())
    }

    async fn insert_wishlist(&self, mut item: WishlistItem) -> Result<ObjectId, AppError> {
        // Checked under the write lock, so concurrent adds serialize the
        // same way the unique index serializes them in MongoDB.
        let mut wishlist = self.wishlist.write();
        if wishlist
            .iter()
            .any(|existing| existing.blog_id == item.blog_id && existing.user_email == item.user_email)
        {
            return Err(AppError::Duplicate("wishlist entry"));
        }

        let id = ObjectId::new();
        item.id = Some(id);
        wishlist.push(item);
        Ok(id)
    }
}

fn apply_patch(blog: &mut Blog, patch: &BlogPatch) -> bool {
    let mut changed = false;
    if let Some(title) = &patch.title {
        changed |= blog.title != *title;
        blog.title = title.clone();
    }
    if let Some(category) = &patch.category {
        changed |= blog.category != *category;
        blog.category = category.clone();
    }
    if let Some(image_url) = &patch.image_url {
        changed |= blog.image_url.as_ref() != Some(image_url);
        blog.image_url = Some(image_url.clone());
    }
    if let Some(long_desc) = &patch.long_desc {
        changed |= blog.long_desc.as_ref() != Some(long_desc);
        blog.long_desc = Some(long_desc.clone());
    }
    if let Some(short_desc) = &patch.short_desc {
        changed |= blog.short_desc.as_ref() != Some(short_desc);
        blog.short_desc = Some(short_desc.clone());
    }
    changed
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn blog(title: &str, category: &str) -> Blog {
        Blog {
            title: title.to_string(),
            category: category.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_sign_in_unknown_email_matches_nothing() {
        let store = MemoryStore::new();
        let outcome = store
            .record_sign_in("ghost@example.com", "2026-01-01T00:00:00Z")
            .await
            .unwrap();
        assert_eq!(outcome, UpdateOutcome::default());
    }

    #[tokio::test]
    async fn test_sign_in_updates_matching_user() {
        let store = MemoryStore::new();
        store
            .insert_user(User {
                id: None,
                email: "reader@example.com".to_string(),
                name: None,
                photo_url: None,
                last_sign_in_time: None,
            })
            .await
            .unwrap();

        let outcome = store
            .record_sign_in("reader@example.com", "2026-01-01T00:00:00Z")
            .await
            .unwrap();
        assert_eq!(outcome.matched, 1);
        assert_eq!(outcome.modified, 1);

        let users = store.list_users().await.unwrap();
        assert_eq!(
            users[0].last_sign_in_time.as_deref(),
            Some("2026-01-01T00:00:00Z")
        );
    }

    #[tokio::test]
    async fn test_category_and_search_filters() {
        let store = MemoryStore::new();
        store.insert_blog(blog("Async Rust in anger", "rust")).await.unwrap();
        store.insert_blog(blog("Sourdough starters", "baking")).await.unwrap();
        store.insert_blog(blog("Rust on tiny chips", "embedded")).await.unwrap();

        let all = store.list_blogs(None, None).await.unwrap();
        assert_eq!(all.len(), 3);

        let rust = store.list_blogs(Some("rust"), None).await.unwrap();
        assert_eq!(rust.len(), 1);
        assert_eq!(rust[0].title, "Async Rust in anger");

        let searched = store.list_blogs(None, Some("rust")).await.unwrap();
        assert_eq!(searched.len(), 2);

        let both = store.list_blogs(Some("embedded"), Some("rust")).await.unwrap();
        assert_eq!(both.len(), 1);
        assert_eq!(both[0].title, "Rust on tiny chips");
    }

    #[tokio::test]
    async fn test_upsert_preserves_fields_outside_whitelist() {
        let store = MemoryStore::new();
        let id = store
            .insert_blog(Blog {
                author: Some("ana".to_string()),
                ..blog("First draft", "rust")
            })
            .await
            .unwrap();

        let patch = BlogPatch {
            title: Some("Second draft".to_string()),
            ..Default::default()
        };
        let outcome = store.upsert_blog(id, patch).await.unwrap();
        assert_eq!(outcome.matched, 1);
        assert_eq!(outcome.upserted_id, None);

        let stored = store.get_blog(id).await.unwrap().unwrap();
        assert_eq!(stored.title, "Second draft");
        assert_eq!(stored.author.as_deref(), Some("ana"));
        assert_eq!(stored.category, "rust");
    }

    #[tokio::test]
    async fn test_upsert_creates_missing_blog() {
        let store = MemoryStore::new();
        let id = ObjectId::new();

        let patch = BlogPatch {
            title: Some("Fresh".to_string()),
            category: Some("rust".to_string()),
            ..Default::default()
        };
        let outcome = store.upsert_blog(id, patch).await.unwrap();
        assert_eq!(outcome.matched, 0);
        assert_eq!(outcome.upserted_id, Some(id));

        let stored = store.get_blog(id).await.unwrap().unwrap();
        assert_eq!(stored.title, "Fresh");
        assert_eq!(stored.author, None);
    }

    #[tokio::test]
    async fn test_duplicate_wishlist_insert_is_rejected() {
        let store = MemoryStore::new();
        let blog_id = store.insert_blog(blog("Keep me", "rust")).await.unwrap();
        let stored = store.get_blog(blog_id).await.unwrap().unwrap();

        let item = WishlistItem::snapshot(blog_id, "reader@example.com", &stored);
        store.insert_wishlist(item.clone()).await.unwrap();

        let again = store.insert_wishlist(item).await;
        assert!(matches!(again, Err(AppError::Duplicate(_))));

        let items = store.list_wishlist("reader@example.com").await.unwrap();
        assert_eq!(items.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_wishlist_adds_yield_one_success() {
        let store = Arc::new(MemoryStore::new());
        let blog_id = store.insert_blog(blog("Keep me", "rust")).await.unwrap();
        let stored = store.get_blog(blog_id).await.unwrap().unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            let item = WishlistItem::snapshot(blog_id, "reader@example.com", &stored);
            handles.push(tokio::spawn(async move { store.insert_wishlist(item).await }));
        }

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                successes += 1;
            }
        }
        assert_eq!(successes, 1);

        let items = store.list_wishlist("reader@example.com").await.unwrap();
        assert_eq!(items.len(), 1);
    }
}
