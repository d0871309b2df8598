//! Session cookie management for the admin area.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use labsite_core::{AdminIdentity, TOKEN_TTL_SECS, TokenService};

/// Name of the cookie carrying the admin session token
pub const SESSION_COOKIE: &str = "admin_token";

/// Stores, reads and clears the admin session token cookie.
#[derive(Clone)]
pub struct SessionCookies {
    tokens: TokenService,
    secure: bool,
}

impl SessionCookies {
    /// `secure` should be true in production so the cookie only travels over HTTPS.
    pub fn new(tokens: TokenService, secure: bool) -> Self {
        Self { tokens, secure }
    }

    /// Add the session cookie: HttpOnly, SameSite=Lax, 24h, site-wide.
    pub fn set_session(&self, jar: CookieJar, token: String) -> CookieJar {
        let cookie = Cookie::build((SESSION_COOKIE, token))
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .max_age(time::Duration::seconds(TOKEN_TTL_SECS))
            .path("/");
        jar.add(cookie)
    }

    /// Remove the session cookie. Safe to call when no session exists.
    pub fn clear_session(&self, jar: CookieJar) -> CookieJar {
        jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
    }

    /// The signed-in admin, if the jar carries a valid, unexpired token.
    pub fn current_admin(&self, jar: &CookieJar) -> Option<AdminIdentity> {
        let cookie = jar.get(SESSION_COOKIE)?;
        self.tokens.verify(cookie.value())
    }
}
