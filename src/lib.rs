//! REST backend for the blog platform.
//!
//! Stateless axum handlers in front of four MongoDB collections: `users`,
//! `blogs`, `comments`, `wishlist`. Handlers validate the request, issue one
//! or two store calls through the injected [`database::Store`] handle, and
//! serialize the result. No durable state lives in the process.
//!
//! # Endpoints
//!
//! | Method & path | Purpose |
//! |---|---|
//! | GET `/` | liveness text |
//! | GET/POST/PATCH `/users` | list, sign-up, sign-in time update |
//! | GET `/blogs?category=&search=` | filtered/searched list |
//! | POST `/blogs` | create |
//! | GET/PUT `/blog/{id}` | fetch one, partial upsert |
//! | GET `/featured-blogs` | top 10 by `longDesc` word count |
//! | POST `/comments`, GET `/comments/{blogId}` | create, list per blog |
//! | POST `/wishlist`, GET `/wishlist/{email}` | add (409 on duplicate, 404 on missing blog), list per user |

use std::{sync::Arc, time::Duration};

use axum::{
    http::{header::CONTENT_TYPE, Method},
    routing::{get, post},
    Router,
};
use signal::{
    ctrl_c,
    unix::{signal, SignalKind},
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;

use routes::{blogs, comments, users, wishlist};
use state::AppState;

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(routes::health))
        .route(
            "/users",
            get(users::list).post(users::create).patch(users::sign_in),
        )
        .route("/blogs", get(blogs::list).post(blogs::create))
        .route("/blog/{id}", get(blogs::get).put(blogs::update))
        .route("/featured-blogs", get(blogs::featured))
        .route("/comments", post(comments::create))
        .route("/comments/{blog_id}", get(comments::list))
        .route("/wishlist", post(wishlist::add))
        .route("/wishlist/{email}", get(wishlist::list))
        .with_state(state)
}

pub async fn start_server() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let state = AppState::new().await;

    info!("Starting server...");

    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    let app = app(state.clone()).layer(cors);

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await.unwrap();
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    println!("Server shutting down...");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
