//! labsite-api: HTTP server for the labsite academic site
//!
//! Serves the localized public pages, the admin page tree and the JSON API.
//! Every request passes through the edge router first. API requests then get
//! their session resolved; the admin pages sit behind [`middleware::admin_guard`].

pub mod error;
mod handlers;
pub mod middleware;
mod pages;
pub mod session;

use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
};
use labsite_core::{Labsite, LabsiteConfig};
use middleware::{admin_guard, auth_middleware, locale_router};
use session::SessionCookies;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_governor::GovernorLayer;
use tower_governor::governor::GovernorConfigBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Application state shared across handlers
pub struct AppState {
    pub site: Labsite,
    pub sessions: SessionCookies,
}

impl AppState {
    /// Session cookies are marked `Secure` when the site runs in production.
    pub fn new(site: Labsite) -> Self {
        let sessions = SessionCookies::new(site.tokens().clone(), site.config().is_production());
        Self { site, sessions }
    }
}

/// The JSON API, with the session resolved into [`middleware::AuthStatus`].
fn api_routes(state: &Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/auth/login", post(handlers::login))
        .route("/admin/auth/logout", post(handlers::logout))
        .route("/admin/auth/me", get(handlers::me))
        .route(
            "/admin/papers",
            get(handlers::list_papers).post(handlers::create_paper),
        )
        .route(
            "/admin/papers/{id}",
            get(handlers::get_paper)
                .put(handlers::update_paper)
                .delete(handlers::delete_paper),
        )
        .route("/papers", get(handlers::public_papers))
        .layer(from_fn_with_state(state.clone(), auth_middleware))
}

/// The admin page tree. Unknown admin paths still pass the guard before
/// reaching the fallback.
fn admin_routes(state: &Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/login", get(handlers::admin_login_page))
        .route("/papers", get(handlers::admin_papers_page))
        .fallback(handlers::fallback)
        .layer(from_fn_with_state(state.sessions.clone(), admin_guard))
}

fn page_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/{locale}", get(handlers::home_page))
        .route("/{locale}/achievements", get(handlers::achievements_page))
        .route("/{locale}/forum", get(handlers::forum_page))
        .route("/{locale}/forum/{id}", get(handlers::forum_detail_page))
        .route("/{locale}/papers", get(handlers::papers_page))
}

/// Build the Axum router with all routes.
///
/// Note: Rate limiting is applied separately in `serve()` because it requires
/// real TCP connection info (peer IP) which isn't available in `oneshot` tests.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = build_cors_layer(state.site.config());

    Router::new()
        .nest("/api", api_routes(&state))
        .nest("/admin", admin_routes(&state))
        .merge(page_routes())
        .route("/health", get(handlers::health))
        .fallback(handlers::fallback)
        // Edge routing runs first, before any route matching
        .layer(from_fn(locale_router))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http().make_span_with(
                tower_http::trace::DefaultMakeSpan::new()
                    .level(tracing::Level::INFO)
                    .include_headers(false),
            ),
        )
}

/// Build CORS layer from config.
///
/// Without `cors_origins`, cross-origin requests are denied.
/// `cors_origins = ["*"]` allows all origins.
fn build_cors_layer(config: &LabsiteConfig) -> CorsLayer {
    let origins = config
        .server
        .as_ref()
        .map(|s| &s.cors_origins)
        .filter(|o| !o.is_empty());

    match origins {
        Some(origins) if origins.iter().any(|o| o == "*") => CorsLayer::permissive(),
        Some(origins) => {
            let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            CorsLayer::new().allow_origin(origins)
        }
        None => CorsLayer::new(),
    }
}

/// Run the HTTP server until SIGINT or SIGTERM, then drain connections and
/// close the database pool.
pub async fn serve(site: Labsite) -> anyhow::Result<()> {
    let server_config = site.config().server.clone().unwrap_or_default();
    let state = Arc::new(AppState::new(site));

    // 50 burst, 10/second per IP; slows password guessing on the login endpoint.
    let governor_conf = GovernorConfigBuilder::default()
        .per_second(10)
        .burst_size(50)
        .finish()
        .ok_or_else(|| anyhow::anyhow!("invalid rate limit configuration"))?;

    let app = build_router(state.clone()).layer(GovernorLayer::new(governor_conf));

    let addr: SocketAddr = format!("{}:{}", server_config.host, server_config.port).parse()?;
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    state.site.shutdown().await;
    Ok(())
}

/// Wait for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections...");
}
