pub mod blogs;
pub mod comments;
pub mod users;
pub mod wishlist;

pub async fn health() -> &'static str {
    "Blog server is running"
}
