//! Typed records for the four collections plus the request and response
//! shapes of the HTTP surface. Everything is camelCase on the wire and in
//! storage, with `_id` carried as an optional `ObjectId`.

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    /// RFC 3339 text, handed over as-is by the identity provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_sign_in_time: Option<String>,
}

impl User {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_email(&self.email)
    }
}

/// PATCH /users body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInUpdate {
    pub email: String,
    pub last_sign_in_time: Option<String>,
}

impl SignInUpdate {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_email(&self.email)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blog {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    // Defaulted so documents created sparsely through PUT still deserialize.
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_desc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_desc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

impl Blog {
    pub fn validate(&self) -> Result<(), AppError> {
        require("title", &self.title)?;
        require("category", &self.category)
    }
}

/// PUT /blog/{id} body: the whitelist of editable fields. Only the fields
/// present are written; anything else on the document is left alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPatch {
    pub title: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub long_desc: Option<String>,
    pub short_desc: Option<String>,
}

impl BlogPatch {
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(title) = &self.title {
            require("title", title)?;
        }
        if let Some(category) = &self.category {
            require("category", category)?;
        }
        if self.is_empty() {
            return Err(AppError::Validation("no editable fields provided".into()));
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.category.is_none()
            && self.image_url.is_none()
            && self.long_desc.is_none()
            && self.short_desc.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Hex id of the blog this comment hangs off. Format-checked at the
    /// boundary; existence is not.
    pub blog_id: String,
    pub body: String,
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_photo_url: Option<String>,
}

impl Comment {
    pub fn validate(&self) -> Result<(), AppError> {
        parse_object_id(&self.blog_id)?;
        require("body", &self.body)?;
        require("author", &self.author)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItem {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub blog_id: String,
    pub user_email: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_desc: Option<String>,
}

impl WishlistItem {
    /// Denormalized copy of the blog at wishlisting time.
    pub fn snapshot(blog_id: ObjectId, user_email: &str, blog: &Blog) -> Self {
        Self {
            id: None,
            blog_id: blog_id.to_hex(),
            user_email: user_email.to_string(),
            title: blog.title.clone(),
            category: blog.category.clone(),
            image_url: blog.image_url.clone(),
            short_desc: blog.short_desc.clone(),
        }
    }
}

/// POST /wishlist body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistAdd {
    pub blog_id: String,
    pub user_email: String,
}

impl WishlistAdd {
    /// Returns the parsed blog id so callers don't parse twice.
    pub fn validate(&self) -> Result<ObjectId, AppError> {
        validate_email(&self.user_email)?;
        parse_object_id(&self.blog_id)
    }
}

/// GET /blogs query string.
#[derive(Debug, Default, Deserialize)]
pub struct BlogListQuery {
    pub category: Option<String>,
    pub search: Option<String>,
}

impl BlogListQuery {
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref().filter(|c| !c.is_empty())
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref().filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Inserted {
    pub inserted_id: String,
}

impl From<ObjectId> for Inserted {
    fn from(id: ObjectId) -> Self {
        Self {
            inserted_id: id.to_hex(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Updated {
    pub matched_count: u64,
    pub modified_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upserted_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeaturedBlog {
    #[serde(flatten)]
    pub blog: Blog,
    pub word_count: usize,
}

pub fn parse_object_id(id: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(id).map_err(|_| AppError::Validation(format!("malformed id: {id}")))
}

fn validate_email(email: &str) -> Result<(), AppError> {
    if email.trim().is_empty() || !email.contains('@') {
        return Err(AppError::Validation("invalid email address".into()));
    }
    Ok(())
}

fn require(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blog(title: &str, category: &str) -> Blog {
        Blog {
            title: title.to_string(),
            category: category.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_user_email_validation() {
        let mut user = User {
            id: None,
            email: "reader@example.com".to_string(),
            name: None,
            photo_url: None,
            last_sign_in_time: None,
        };
        assert!(user.validate().is_ok());

        user.email = "not-an-email".to_string();
        assert!(user.validate().is_err());

        user.email = "   ".to_string();
        assert!(user.validate().is_err());
    }

    #[test]
    fn test_blog_requires_title_and_category() {
        assert!(blog("Borrowed time", "rust").validate().is_ok());
        assert!(blog("", "rust").validate().is_err());
        assert!(blog("Borrowed time", "  ").validate().is_err());
    }

    #[test]
    fn test_blog_patch_rejects_empty_patch() {
        assert!(BlogPatch::default().validate().is_err());

        let patch = BlogPatch {
            short_desc: Some("short".to_string()),
            ..Default::default()
        };
        assert!(patch.validate().is_ok());
    }

    #[test]
    fn test_blog_patch_rejects_blank_title() {
        let patch = BlogPatch {
            title: Some("".to_string()),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
    }

    #[test]
    fn test_comment_blog_id_format() {
        let mut comment = Comment {
            id: None,
            blog_id: ObjectId::new().to_hex(),
            body: "nice read".to_string(),
            author: "reader".to_string(),
            author_photo_url: None,
        };
        assert!(comment.validate().is_ok());

        comment.blog_id = "definitely-not-hex".to_string();
        assert!(comment.validate().is_err());
    }

    #[test]
    fn test_wishlist_add_returns_parsed_id() {
        let id = ObjectId::new();
        let request = WishlistAdd {
            blog_id: id.to_hex(),
            user_email: "reader@example.com".to_string(),
        };
        assert_eq!(request.validate().unwrap(), id);
    }

    #[test]
    fn test_query_treats_empty_params_as_absent() {
        let query = BlogListQuery {
            category: Some("".to_string()),
            search: Some("rust".to_string()),
        };
        assert_eq!(query.category(), None);
        assert_eq!(query.search(), Some("rust"));
    }
}
