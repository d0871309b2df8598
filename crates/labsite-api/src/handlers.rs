//! HTTP request handlers for labsite-api

use crate::AppState;
use crate::error::{ApiError, error_response, internal_error};
use crate::middleware::AuthStatus;
use crate::pages;
use axum::{
    Extension, Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::{HeaderValue, StatusCode, Uri, header},
    response::{Html, IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use labsite_core::{
    AdminIdentity, ListOptions, ListResult, Locale, LoginOutcome, Publication, PublicationInput,
    find_forum, locale::LOCALE_COOKIE, routing::split_locale_prefix,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Query parameters for paginated lists
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

impl PageQuery {
    fn is_paginated(&self) -> bool {
        self.page.is_some() || self.limit.is_some()
    }

    fn options(&self) -> ListOptions {
        ListOptions::page(
            self.page.unwrap_or(1),
            self.limit.unwrap_or(labsite_core::DEFAULT_PAGE_SIZE),
        )
    }
}

#[derive(Serialize)]
struct PapersResponse {
    papers: Vec<Publication>,
    total: usize,
    limit: usize,
    offset: usize,
}

impl From<ListResult<Publication>> for PapersResponse {
    fn from(result: ListResult<Publication>) -> Self {
        Self {
            papers: result.items,
            total: result.total,
            limit: result.limit,
            offset: result.offset,
        }
    }
}

#[derive(Serialize)]
struct SuccessResponse {
    success: bool,
}

fn require_admin(auth_status: &AuthStatus) -> Result<&AdminIdentity, ApiError> {
    auth_status.admin().ok_or(ApiError::Unauthorized)
}

/// Without `page`/`limit`, every publication is returned in one response.
async fn publications_response(
    state: &AppState,
    query: &PageQuery,
) -> Result<Response, ApiError> {
    let result = if query.is_paginated() {
        state.site.list_publications(&query.options()).await?
    } else {
        let papers = state.site.all_publications().await?;
        let total = papers.len();
        ListResult {
            items: papers,
            total,
            limit: total,
            offset: 0,
        }
    };

    let mut response = Json(PapersResponse::from(result)).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    Ok(response)
}

// === Health ===

/// GET /health - Health check
pub async fn health() -> Response {
    #[derive(Serialize)]
    struct HealthResponse {
        status: &'static str,
    }

    Json(HealthResponse { status: "ok" }).into_response()
}

// === Auth ===

/// Login request body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Serialize)]
struct LoginResponse {
    success: bool,
    user: AdminIdentity,
}

/// POST /api/admin/auth/login - Exchange credentials for a session cookie
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Response {
    let required = || ApiError::BadRequest("Username and password are required".to_string());

    let Ok(Json(body)) = payload else {
        return required().into_response();
    };
    let (Some(username), Some(password)) = (body.username, body.password) else {
        return required().into_response();
    };

    match state.site.login(&username, &password).await {
        Ok(LoginOutcome::Authenticated { identity, token }) => {
            let jar = state.sessions.set_session(jar, token);
            let body = Json(LoginResponse {
                success: true,
                user: identity,
            });
            (jar, body).into_response()
        }
        Ok(LoginOutcome::Rejected) => ApiError::InvalidCredentials.into_response(),
        Err(e @ labsite_core::Error::Validation(_)) => ApiError::Core(e).into_response(),
        Err(e) => internal_error(format!("Login error: {}", e)),
    }
}

/// POST /api/admin/auth/logout - Clear the session cookie
pub async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    let jar = state.sessions.clear_session(jar);
    (jar, Json(SuccessResponse { success: true })).into_response()
}

/// GET /api/admin/auth/me - The signed-in admin
pub async fn me(Extension(auth_status): Extension<AuthStatus>) -> Result<Response, ApiError> {
    #[derive(Serialize)]
    struct MeResponse<'a> {
        user: &'a AdminIdentity,
    }

    let admin = require_admin(&auth_status)?;
    Ok(Json(MeResponse { user: admin }).into_response())
}

// === Publications (admin) ===

/// GET /api/admin/papers - List publications, newest first
pub async fn list_papers(
    State(state): State<Arc<AppState>>,
    Extension(auth_status): Extension<AuthStatus>,
    Query(query): Query<PageQuery>,
) -> Result<Response, ApiError> {
    require_admin(&auth_status)?;
    publications_response(&state, &query).await
}

fn read_input(
    payload: Result<Json<PublicationInput>, JsonRejection>,
) -> Result<PublicationInput, ApiError> {
    payload
        .map(|Json(input)| input)
        .map_err(|_| ApiError::BadRequest("Missing required fields".to_string()))
}

/// POST /api/admin/papers - Create a publication
pub async fn create_paper(
    State(state): State<Arc<AppState>>,
    Extension(auth_status): Extension<AuthStatus>,
    payload: Result<Json<PublicationInput>, JsonRejection>,
) -> Result<Response, ApiError> {
    #[derive(Serialize)]
    struct CreatedResponse {
        success: bool,
        id: i64,
    }

    require_admin(&auth_status)?;
    let id = state.site.create_publication(read_input(payload)?).await?;
    tracing::info!("Created publication {}", id);
    Ok(Json(CreatedResponse { success: true, id }).into_response())
}

/// GET /api/admin/papers/{id} - Get a single publication
pub async fn get_paper(
    State(state): State<Arc<AppState>>,
    Extension(auth_status): Extension<AuthStatus>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    #[derive(Serialize)]
    struct PaperResponse {
        paper: Publication,
    }

    require_admin(&auth_status)?;
    match state.site.get_publication(id).await? {
        Some(paper) => Ok(Json(PaperResponse { paper }).into_response()),
        None => Ok(error_response(StatusCode::NOT_FOUND, "Paper not found")),
    }
}

/// PUT /api/admin/papers/{id} - Replace a publication
pub async fn update_paper(
    State(state): State<Arc<AppState>>,
    Extension(auth_status): Extension<AuthStatus>,
    Path(id): Path<i64>,
    payload: Result<Json<PublicationInput>, JsonRejection>,
) -> Result<Response, ApiError> {
    require_admin(&auth_status)?;
    state.site.update_publication(id, read_input(payload)?).await?;
    tracing::info!("Updated publication {}", id);
    Ok(Json(SuccessResponse { success: true }).into_response())
}

/// DELETE /api/admin/papers/{id} - Delete a publication
pub async fn delete_paper(
    State(state): State<Arc<AppState>>,
    Extension(auth_status): Extension<AuthStatus>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    require_admin(&auth_status)?;
    if state.site.delete_publication(id).await? {
        tracing::info!("Deleted publication {}", id);
    }
    Ok(Json(SuccessResponse { success: true }).into_response())
}

// === Publications (public) ===

/// GET /api/papers - Public publication list
pub async fn public_papers(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Result<Response, ApiError> {
    publications_response(&state, &query).await
}

// === Pages ===

fn page_locale(segment: &str) -> Option<Locale> {
    segment.parse().ok()
}

fn html_page(html: String) -> Response {
    Html(html).into_response()
}

/// GET /{locale} - Home page
pub async fn home_page(Path(locale): Path<String>) -> Response {
    let Some(locale) = page_locale(&locale) else {
        return not_found(Locale::DEFAULT);
    };
    let s = pages::strings(locale);
    html_page(pages::public_page(locale, "", s.site_title, ""))
}

/// GET /{locale}/achievements
pub async fn achievements_page(Path(locale): Path<String>) -> Response {
    let Some(locale) = page_locale(&locale) else {
        return not_found(Locale::DEFAULT);
    };
    let s = pages::strings(locale);
    html_page(pages::public_page(locale, "/achievements", s.achievements, ""))
}

/// GET /{locale}/forum
pub async fn forum_page(Path(locale): Path<String>) -> Response {
    let Some(locale) = page_locale(&locale) else {
        return not_found(Locale::DEFAULT);
    };
    let s = pages::strings(locale);
    let content = pages::forum_list(locale);
    html_page(pages::public_page(locale, "/forum", s.forum, &content))
}

/// GET /{locale}/forum/{id} - A single forum session
pub async fn forum_detail_page(Path((locale, id)): Path<(String, String)>) -> Response {
    let Some(locale) = page_locale(&locale) else {
        return not_found(Locale::DEFAULT);
    };
    let Some(forum) = find_forum(&id) else {
        return not_found(locale);
    };
    let content = pages::forum_detail(locale, forum);
    html_page(pages::public_page(
        locale,
        &format!("/forum/{}", forum.id),
        forum.title,
        &content,
    ))
}

/// GET /{locale}/papers - Paginated publication list
pub async fn papers_page(
    State(state): State<Arc<AppState>>,
    Path(locale): Path<String>,
    Query(query): Query<PageQuery>,
) -> Response {
    let Some(locale) = page_locale(&locale) else {
        return not_found(Locale::DEFAULT);
    };

    match state.site.list_publications(&query.options()).await {
        Ok(result) => {
            let s = pages::strings(locale);
            let content = pages::papers_list(locale, &result);
            html_page(pages::public_page(locale, "/papers", s.papers, &content))
        }
        Err(e) => internal_error(e),
    }
}

fn not_found(locale: Locale) -> Response {
    let s = pages::strings(locale);
    (
        StatusCode::NOT_FOUND,
        Html(pages::public_page(locale, "", s.not_found, "")),
    )
        .into_response()
}

/// Fallback handler: JSON 404 under `/api`, otherwise a localized 404 page.
///
/// The page locale comes from the path prefix, then the `locale` cookie.
pub async fn fallback(uri: Uri, jar: CookieJar) -> Response {
    let path = uri.path();
    if path.starts_with("/api") {
        return error_response(StatusCode::NOT_FOUND, "Not found");
    }

    let locale = split_locale_prefix(path)
        .map(|(locale, _)| locale)
        .or_else(|| jar.get(LOCALE_COOKIE).and_then(|c| c.value().parse().ok()))
        .unwrap_or_default();
    not_found(locale)
}

// === Admin pages ===

/// GET /admin/login - Login form (no admin chrome)
pub async fn admin_login_page() -> Response {
    html_page(pages::admin_login())
}

/// GET /admin/papers - Publication management
pub async fn admin_papers_page(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Response {
    match state.site.list_publications(&query.options()).await {
        Ok(result) => html_page(pages::admin_papers(&result)),
        Err(e) => internal_error(e),
    }
}
