//! Server initialization and routing
//!
//! This module handles the Axum server setup including:
//! - Router configuration for the content API and static file serving
//! - Middleware stack (auth, rate limiting, logging, compression)
//! - Graceful shutdown handling

use crate::config::AppConfig;
use crate::middleware::{admin_auth, log_requests, rate_limit, request_id};
use crate::routes::{about, health, journals, photos};
use crate::state::AppState;
use axum::extract::DefaultBodyLimit;
use axum::http::{header, StatusCode};
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{delete, get, post, put};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::compression::CompressionLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Build the Axum router with all routes and middleware
///
/// Routes are divided into:
/// - Liveness: `/api/health` (plus `/health`), no auth, no rate limit
/// - Public content reads (no auth, rate limited)
/// - Static image/content/frontend trees (no auth, no rate limit)
/// - Admin routes: every mutating endpoint (HTTP Basic auth required,
///   rate limited)
///
/// Upload endpoints get their own body limit sized from the configured
/// per-file cap and file count; everything else keeps Axum's default.
pub fn build_router(state: Arc<AppState>) -> Router {
    // Liveness, never rate limited
    let liveness = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/health", get(health::health_check));

    // Public content reads share the rate limit with the admin API
    let public_api = Router::new()
        .route("/api/photos", get(photos::list_photos))
        .route("/api/about", get(about::get_about))
        .route("/api/journals", get(journals::list_journals))
        .route("/api/journals/{id}", get(journals::get_journal))
        .layer(from_fn_with_state(state.clone(), rate_limit));

    // Mutating JSON endpoints (require admin credentials)
    let admin_api = Router::new()
        .route("/api/about", put(about::put_about))
        .route("/api/photos/{filename}", delete(photos::delete_photo))
        .route("/api/journals", post(journals::create_journal))
        .route("/api/journals/{id}", put(journals::update_journal))
        .route("/api/journals/{id}", delete(journals::delete_journal))
        .route(
            "/api/journals/{id}/photos/{filename}",
            delete(journals::delete_journal_photo),
        );

    // File uploads (admin, larger body limit)
    let admin_uploads = Router::new()
        .route("/api/photos", post(photos::upload_photos))
        .route("/api/about/photo", post(about::upload_profile_photo))
        .route(
            "/api/journals/{id}/photos",
            post(journals::upload_journal_photos),
        )
        .layer(DefaultBodyLimit::max(state.config.upload_body_limit()));

    let admin = admin_api
        .merge(admin_uploads)
        .layer(from_fn_with_state(state.clone(), admin_auth))
        .layer(from_fn_with_state(state.clone(), rate_limit));

    // Static trees served straight off the content directories
    let cache_control =
        SetResponseHeaderLayer::overriding(header::CACHE_CONTROL, state.config.static_cache_header());
    let static_files = Router::new()
        .nest_service("/images", ServeDir::new(state.store.images_dir()))
        .nest_service("/thumbnails", ServeDir::new(state.store.thumbnails_dir()))
        .nest_service(
            "/content/journals",
            ServeDir::new(state.store.journals_dir()),
        )
        .nest_service("/assets", ServeDir::new(state.store.assets_dir()))
        .layer(cache_control);

    // Frontend: serve the built app, falling back to index.html so
    // client-side routes resolve on refresh.
    let index = state.config.frontend_dir.join("index.html");
    let frontend = ServeDir::new(&state.config.frontend_dir).fallback(ServeFile::new(index));

    Router::new()
        .merge(liveness)
        .merge(public_api)
        .merge(admin)
        .merge(static_files)
        .fallback_service(frontend)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(state.config.timeout_secs),
        ))
        .layer(CompressionLayer::new())
        .layer(from_fn(request_id))
        .layer(from_fn(log_requests))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the shutterlog HTTP server
///
/// Initializes logging and shared state, builds the router, binds to the
/// configured TCP address, and blocks until the server is shut down via
/// SIGTERM or Ctrl+C.
pub async fn start_server(config: AppConfig) -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(&config.log_level)
        .with_target(false)
        .json()
        .init();

    let addr: SocketAddr = config.socket_addr()?;

    tracing::info!(
        "Starting shutterlog on {} (data: {}, frontend: {})",
        addr,
        config.data_dir.display(),
        config.frontend_dir.display()
    );
    tracing::info!(
        "Timeout: {}s, Max upload: {}MB x {} files, Rate limit: {}/minute",
        config.timeout_secs,
        config.max_upload_mb,
        config.max_files_per_upload,
        config.rate_limit_per_minute
    );

    let (state, thumb_worker) = AppState::new(config)?;
    let app = build_router(state.clone());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    // Accepted uploads may still have thumbnails pending; drain before exit.
    state.thumbs.close();
    thumb_worker.await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Shutdown signal handler
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
