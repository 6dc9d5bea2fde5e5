//! Community Portal Backend
//!
//! REST backend for the content portal and the citizen wishlist desk, with
//! SQLite persistence and a session-guarded admin surface.

mod api;
mod auth;
mod config;
mod db;
mod drafts;
mod errors;
mod models;
mod tickets;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use db::Repository;
use drafts::DraftWorkflow;
use tickets::TicketWorkflow;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub drafts: DraftWorkflow,
    pub tickets: TicketWorkflow,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(repo: Repository, config: Config) -> Self {
        Self {
            drafts: DraftWorkflow::new(repo.clone()),
            tickets: TicketWorkflow::new(repo.clone()),
            repo: Arc::new(repo),
            config: Arc::new(config),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    if config.log_json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting Community Portal Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let repo = Repository::new(pool);

    match &config.bootstrap_admin_token {
        Some(token) => auth::ensure_bootstrap_admin(&repo, token).await?,
        None => tracing::warn!(
            "No bootstrap admin token configured (PORTAL_BOOTSTRAP_ADMIN_TOKEN). Only existing sessions can reach the admin API."
        ),
    }

    let bind_addr = config.bind_addr;
    let app = create_router(AppState::new(repo, config));

    // Start server
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!("Server listening on {}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Admin routes, all behind the session guard
    let admin_routes = Router::new()
        // Session
        .route("/session", get(api::current_session))
        .route("/logout", post(api::logout))
        .route("/dashboard", get(api::dashboard))
        // Posts
        .route("/posts", get(api::list_all_posts).post(api::create_post))
        .route("/posts/{id}", get(api::load_post).delete(api::delete_post))
        .route(
            "/posts/{id}/draft",
            put(api::save_draft).delete(api::discard_draft),
        )
        .route("/posts/{id}/publish", post(api::publish_post))
        .route("/posts/{id}/status", put(api::set_post_status))
        // Wishlist
        .route("/wishlist", get(api::list_tickets))
        .route("/wishlist/batch/status", put(api::batch_set_ticket_status))
        .route("/wishlist/batch/delete", post(api::batch_delete_tickets))
        .route("/wishlist/notes/{note_id}", delete(api::delete_ticket_note))
        .route(
            "/wishlist/{id}",
            get(api::get_ticket).delete(api::delete_ticket),
        )
        .route("/wishlist/{id}/status", put(api::set_ticket_status))
        .route("/wishlist/{id}/priority", put(api::set_ticket_priority))
        .route("/wishlist/{id}/reply", post(api::reply_ticket))
        .route(
            "/wishlist/{id}/notes",
            get(api::list_ticket_notes).post(api::add_ticket_note),
        )
        .route_layer(middleware::from_fn_with_state(
            state.repo.clone(),
            auth::admin_guard,
        ));

    // Public routes
    let api_routes = Router::new()
        // Posts
        .route("/posts", get(api::list_published_posts))
        .route("/posts/counts", get(api::published_counts))
        .route("/posts/{id}", get(api::get_published_post))
        .route("/posts/{id}/adjacent", get(api::adjacent_posts))
        // Search
        .route("/search", get(api::search_posts))
        // Categories
        .route("/categories", get(api::list_categories))
        // Wishlist
        .route(
            "/wishlist",
            get(api::list_recent_tickets).post(api::submit_ticket),
        )
        .route("/wishlist/options", get(api::ticket_options))
        .route("/wishlist/{id}", get(api::get_public_ticket))
        .nest("/admin", admin_routes);

    // Health check
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
