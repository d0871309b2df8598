//! Middleware for labsite-api
//!
//! - [`locale_router`]: edge routing (locale redirects, admin canonicalization)
//! - [`auth_middleware`]: resolves the admin session for API requests
//! - [`admin_guard`]: gates the admin page tree and adds the admin chrome

use axum::{
    body::Body,
    extract::{OriginalUri, Request, State},
    http::{HeaderName, HeaderValue, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use labsite_core::{
    AdminIdentity, RouteDecision,
    locale::{LOCALE_COOKIE, LOCALE_COOKIE_MAX_AGE_SECS},
    route,
    routing::{ADMIN_LOGIN, is_admin_login},
};
use std::sync::Arc;

use crate::AppState;
use crate::error::internal_error;
use crate::pages;
use crate::session::SessionCookies;

/// Request header carrying the requested pathname to downstream handlers.
pub const X_PATHNAME: &str = "x-pathname";

/// Largest admin page body the guard will buffer to add the chrome.
const MAX_ADMIN_PAGE_BYTES: usize = 2 * 1024 * 1024;

/// A `302 Found` redirect.
pub fn redirect_found(location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => (StatusCode::FOUND, [(header::LOCATION, value)]).into_response(),
        Err(e) => internal_error(format!("invalid redirect target {:?}: {}", location, e)),
    }
}

/// Edge routing middleware.
///
/// Runs on every request and applies [`labsite_core::route`]:
/// 1. Redirects (302) locale-prefixed admin paths, `/admin`, and paths
///    without a locale prefix, keeping the query string
/// 2. Forwards API, admin and asset paths with an `x-pathname` header
/// 3. For localized pages, stores the path locale in the `locale` cookie
pub async fn locale_router(mut request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();

    let decision = {
        let jar = CookieJar::from_headers(request.headers());
        let accept_language = request
            .headers()
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|v| v.to_str().ok());
        route(&path, jar.get(LOCALE_COOKIE).map(|c| c.value()), accept_language)
    };

    match decision {
        RouteDecision::Redirect(target) => {
            let location = match request.uri().query() {
                Some(query) => format!("{}?{}", target, query),
                None => target,
            };
            redirect_found(&location)
        }
        RouteDecision::PassThrough => {
            if let Ok(value) = HeaderValue::from_str(&path) {
                request
                    .headers_mut()
                    .insert(HeaderName::from_static(X_PATHNAME), value);
            }
            next.run(request).await
        }
        RouteDecision::Page(locale) => {
            let mut response = next.run(request).await;

            let cookie = Cookie::build((LOCALE_COOKIE, locale.as_str()))
                .path("/")
                .max_age(time::Duration::seconds(LOCALE_COOKIE_MAX_AGE_SECS))
                .build();
            if let Ok(value) = HeaderValue::from_str(&cookie.to_string()) {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            response
        }
    }
}

/// Authentication status for the current request.
///
/// This is inserted into request extensions by the auth middleware
/// and can be extracted by handlers to make authorization decisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthStatus {
    /// No valid session cookie
    Public,
    /// Valid, unexpired admin session
    Admin(AdminIdentity),
}

impl AuthStatus {
    pub fn admin(&self) -> Option<&AdminIdentity> {
        match self {
            AuthStatus::Admin(identity) => Some(identity),
            AuthStatus::Public => None,
        }
    }
}

/// Authentication middleware that validates the session cookie.
///
/// Layered on the `/api` tree only. Inserts [`AuthStatus`] into request
/// extensions for handlers to read.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let jar = CookieJar::from_headers(request.headers());
    let auth_status = match state.sessions.current_admin(&jar) {
        Some(identity) => AuthStatus::Admin(identity),
        None => AuthStatus::Public,
    };

    request.extensions_mut().insert(auth_status);
    next.run(request).await
}

/// Guard for the admin page tree.
///
/// 1. The login page renders as-is, without checking the session
/// 2. Without a session, redirects to the login page before any handler runs
/// 3. With a session, runs the handler with the [`AdminIdentity`] in request
///    extensions and wraps HTML pages in the admin chrome
///
/// The pathname is taken from [`OriginalUri`], since the router nested at
/// `/admin` sees the path with that prefix stripped.
pub async fn admin_guard(
    State(sessions): State<SessionCookies>,
    mut request: Request,
    next: Next,
) -> Response {
    let pathname = request
        .extensions()
        .get::<OriginalUri>()
        .map(|OriginalUri(uri)| uri.path().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    if is_admin_login(&pathname) {
        return next.run(request).await;
    }

    let jar = CookieJar::from_headers(request.headers());
    let Some(admin) = sessions.current_admin(&jar) else {
        tracing::debug!("Redirecting unauthenticated request for {} to login", pathname);
        return redirect_found(ADMIN_LOGIN);
    };

    request.extensions_mut().insert(admin.clone());
    let response = next.run(request).await;
    with_admin_chrome(response, &admin, &pathname).await
}

async fn with_admin_chrome(response: Response, admin: &AdminIdentity, pathname: &str) -> Response {
    let is_html = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("text/html"));
    if !response.status().is_success() || !is_html {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, MAX_ADMIN_PAGE_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => return internal_error(e),
    };

    let page = String::from_utf8_lossy(&bytes);
    let html = pages::admin_chrome(admin, pathname, &page);
    parts.headers.remove(header::CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(html))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SESSION_COOKIE;
    use axum::{Router, middleware::from_fn_with_state, response::Html, routing::get};
    use labsite_core::TokenService;
    use tower::ServiceExt;

    const SECRET: &[u8] = b"guard-test-secret";

    /// An `/admin` tree behind the guard only, with no edge router in front.
    fn guarded_admin() -> Router {
        let sessions = SessionCookies::new(TokenService::new(SECRET), false);
        let admin = Router::new()
            .route("/login", get(|| async { Html("<p>login</p>") }))
            .route(
                "/papers",
                get(|| async {
                    Html("<!DOCTYPE html><html><head><title>T</title></head><body><p>papers</p></body></html>")
                }),
            )
            .layer(from_fn_with_state(sessions, admin_guard));
        Router::new().nest("/admin", admin)
    }

    fn request(path: &str, cookie: Option<&str>) -> Request {
        let mut builder = axum::http::Request::builder().uri(path);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_guard_lets_nested_login_page_through() {
        let response = guarded_admin()
            .oneshot(request("/admin/login", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(text(response).await, "<p>login</p>");
    }

    #[tokio::test]
    async fn test_guard_redirects_nested_page_without_session() {
        let response = guarded_admin()
            .oneshot(request("/admin/papers", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), ADMIN_LOGIN);
    }

    #[tokio::test]
    async fn test_guard_wraps_nested_page_with_session() {
        let token = TokenService::new(SECRET).issue(3, "editor").unwrap();
        let cookie = format!("{}={}", SESSION_COOKIE, token);
        let response = guarded_admin()
            .oneshot(request("/admin/papers", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let html = text(response).await;
        assert!(html.contains("欢迎，editor"));
        assert!(html.contains("<p>papers</p>"));
        assert!(html.contains("aria-current=\"page\""));
    }

    #[test]
    fn test_auth_status_admin() {
        let identity = AdminIdentity {
            id: 1,
            username: "admin".to_string(),
        };
        assert_eq!(AuthStatus::Admin(identity.clone()).admin(), Some(&identity));
        assert_eq!(AuthStatus::Public.admin(), None);
    }

    #[test]
    fn test_redirect_found() {
        let response = redirect_found("/en/papers?page=2");
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/en/papers?page=2"
        );
    }
}
