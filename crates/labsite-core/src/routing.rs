//! Edge routing decisions for inbound request paths.
//!
//! [`route`] is a pure function over the path and the locale signals of a
//! request. The HTTP layer applies the returned [`RouteDecision`]: it issues
//! the redirect, forwards the request untouched, or renders a localized page
//! and refreshes the locale cookie.
//!
//! Rules are evaluated in a fixed order and the first match wins:
//!
//! 1. `/{locale}/admin...` redirects to the unprefixed `/admin...` path
//! 2. `/admin` redirects to `/admin/papers`
//! 3. framework, API, admin and static-asset paths pass through
//! 4. paths without a locale prefix redirect to `/{resolved}{path}`
//! 5. anything else is a page for the prefixed locale

use crate::locale::{Locale, resolve_locale};

/// Landing page of the admin area.
pub const ADMIN_HOME: &str = "/admin/papers";

/// Login page of the admin area.
pub const ADMIN_LOGIN: &str = "/admin/login";

const PASS_THROUGH_PREFIXES: [&str; 4] = ["/_next", "/api", "/admin", "/health"];

/// What the edge middleware should do with a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Answer with a redirect to this path.
    Redirect(String),
    /// Forward unchanged (assets, API, admin tree).
    PassThrough,
    /// A content page for this locale; persist it in the locale cookie.
    Page(Locale),
}

/// Split `/{locale}` or `/{locale}/...` into the locale and the remainder.
///
/// The remainder is empty for the bare `/{locale}` path and starts with `/`
/// otherwise. Matching is case-sensitive.
pub fn split_locale_prefix(path: &str) -> Option<(Locale, &str)> {
    let rest = path.strip_prefix('/')?;
    let (segment, remainder) = match rest.find('/') {
        Some(idx) => (&rest[..idx], &rest[idx..]),
        None => (rest, ""),
    };
    let locale = segment.parse::<Locale>().ok()?;
    Some((locale, remainder))
}

/// A public file such as `/favicon.ico` or `/images/portrait.jpg`.
///
/// A dot anywhere in the path counts, so `/docs.v2/intro` is forwarded too.
fn is_static_asset(path: &str) -> bool {
    path.contains('.')
}

fn is_pass_through(path: &str) -> bool {
    PASS_THROUGH_PREFIXES.iter().any(|p| path.starts_with(p)) || is_static_asset(path)
}

/// Decide how to handle an inbound request path.
pub fn route(
    path: &str,
    cookie_locale: Option<&str>,
    accept_language: Option<&str>,
) -> RouteDecision {
    let prefixed = split_locale_prefix(path);

    if let Some((_, remainder)) = prefixed
        && remainder.starts_with("/admin")
    {
        return RouteDecision::Redirect(remainder.to_string());
    }

    if path == "/admin" {
        return RouteDecision::Redirect(ADMIN_HOME.to_string());
    }

    if is_pass_through(path) {
        return RouteDecision::PassThrough;
    }

    match prefixed {
        Some((locale, _)) => RouteDecision::Page(locale),
        None => {
            let locale = resolve_locale(cookie_locale, accept_language);
            let target = if path == "/" {
                format!("/{}", locale)
            } else {
                format!("/{}{}", locale, path)
            };
            RouteDecision::Redirect(target)
        }
    }
}

/// Whether a pathname belongs to the admin login page.
pub fn is_admin_login(path: &str) -> bool {
    path == ADMIN_LOGIN || path.starts_with(&format!("{}/", ADMIN_LOGIN))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn redirect(to: &str) -> RouteDecision {
        RouteDecision::Redirect(to.to_string())
    }

    #[test]
    fn test_locale_prefixed_admin_redirects_to_unprefixed() {
        assert_eq!(route("/zh/admin/papers", None, None), redirect("/admin/papers"));
        assert_eq!(route("/ja/admin", None, None), redirect("/admin"));
        assert_eq!(route("/en/admin/login", Some("zh"), None), redirect("/admin/login"));
    }

    #[test]
    fn test_bare_admin_redirects_to_papers() {
        assert_eq!(route("/admin", None, None), redirect("/admin/papers"));
    }

    #[test]
    fn test_pass_through_paths() {
        for path in [
            "/_next/static/chunk.js",
            "/api/admin/papers",
            "/admin/papers",
            "/admin/login",
            "/favicon.ico",
            "/images/portrait.jpg",
            "/docs.v2/intro",
            "/en/papers.old",
            "/health",
        ] {
            assert_eq!(route(path, None, None), RouteDecision::PassThrough, "{}", path);
        }
    }

    #[test]
    fn test_every_locale_prefixed_page_is_kept() {
        for locale in Locale::ALL {
            let path = format!("/{}/anything", locale);
            assert_eq!(route(&path, None, None), RouteDecision::Page(locale));
            assert_eq!(route(&format!("/{}", locale), None, None), RouteDecision::Page(locale));
        }
    }

    #[test]
    fn test_path_locale_wins_over_cookie() {
        assert_eq!(route("/ja/papers", Some("zh"), Some("en")), RouteDecision::Page(Locale::Ja));
    }

    #[test]
    fn test_unprefixed_redirects_to_default_without_signals() {
        assert_eq!(route("/papers", None, None), redirect("/en/papers"));
        assert_eq!(route("/", None, None), redirect("/en"));
    }

    #[test]
    fn test_unprefixed_uses_cookie_then_header() {
        assert_eq!(route("/papers", Some("zh"), Some("ja")), redirect("/zh/papers"));
        assert_eq!(route("/forum", None, Some("ja-JP,en;q=0.5")), redirect("/ja/forum"));
        assert_eq!(route("/forum", Some("xx"), Some("ja")), redirect("/ja/forum"));
    }

    #[test]
    fn test_prefix_match_is_case_sensitive() {
        assert_eq!(route("/ZH/papers", None, None), redirect("/en/ZH/papers"));
    }

    #[test]
    fn test_locale_lookalike_segment_is_not_a_prefix() {
        assert_eq!(route("/english/papers", None, None), redirect("/en/english/papers"));
    }

    #[test]
    fn test_split_locale_prefix() {
        assert_eq!(split_locale_prefix("/zh"), Some((Locale::Zh, "")));
        assert_eq!(split_locale_prefix("/zh/forum/3"), Some((Locale::Zh, "/forum/3")));
        assert_eq!(split_locale_prefix("/fr/forum"), None);
        assert_eq!(split_locale_prefix("zh/forum"), None);
    }

    #[test]
    fn test_is_admin_login() {
        assert!(is_admin_login("/admin/login"));
        assert!(is_admin_login("/admin/login/"));
        assert!(!is_admin_login("/admin/papers"));
        assert!(!is_admin_login("/admin/loginx"));
    }
}
