//! # labsite-core
//!
//! Core library for labsite - a localized academic profile site with a small
//! admin panel for managing publications.
//!
//! This crate holds the domain logic without any HTTP or CLI concerns:
//!
//! - **Locales**: the fixed set of supported languages and preferred-locale
//!   resolution from cookies and `Accept-Language`
//! - **Routing**: the edge decision for every inbound path (locale redirects,
//!   admin canonicalization, pass-through)
//! - **Auth**: bcrypt password hashing, HS256 session tokens, and the
//!   first-login flow that replaces a placeholder hash
//! - **Storage**: a pooled database of admin accounts and publications
//! - **Forum**: the compiled-in catalog of recorded forum sessions
//!
//! ## Quick Start
//!
//! ```ignore
//! use labsite_core::{Labsite, LoginOutcome, resolve_config};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = resolve_config(None)?;
//!     let site = Labsite::from_config(config).await?;
//!
//!     match site.login("admin", "s3cret").await? {
//!         LoginOutcome::Authenticated { identity, token } => {
//!             println!("{} signed in, token {}", identity.username, token);
//!         }
//!         LoginOutcome::Rejected => println!("invalid credentials"),
//!     }
//!     Ok(())
//! }
//! ```

mod config;
pub mod db;
mod error;
pub mod forum;
pub mod locale;
mod password;
pub mod routing;
mod token;
mod types;

pub use config::{
    AuthConfig, Config, ConfigValue, DatabaseConfig, LabsiteConfig, ServerConfig, resolve_config,
};
pub use db::{Backend, Database};
pub use error::{Error, Result};
pub use forum::{FORUMS, Forum, find_forum};
pub use locale::{Locale, resolve_locale};
pub use password::{DEFAULT_BCRYPT_COST, PLACEHOLDER_HASH, PasswordHasher, is_placeholder_hash};
pub use routing::{RouteDecision, route};
pub use token::{AdminIdentity, Claims, DEV_FALLBACK_SECRET, TOKEN_TTL_SECS, TokenService};
pub use types::*;

/// Result of a login attempt that did not fault.
#[derive(Debug, Clone)]
pub enum LoginOutcome {
    /// Credentials accepted; `token` is a fresh session token.
    Authenticated {
        identity: AdminIdentity,
        token: String,
    },
    /// Unknown user or wrong password.
    Rejected,
}

/// Main entry point for labsite functionality.
///
/// Owns the database pool, the token service and the password hasher.
/// Shared across request handlers behind an `Arc`.
pub struct Labsite {
    config: LabsiteConfig,
    db: Database,
    tokens: TokenService,
    passwords: PasswordHasher,
}

impl Labsite {
    /// Connect to the database, create missing tables, and load the signing secret.
    ///
    /// # Errors
    ///
    /// Returns an error if the database is unreachable or, in production,
    /// if no JWT secret is configured.
    pub async fn from_config(config: LabsiteConfig) -> Result<Self> {
        let secret = config.jwt_secret()?;
        let db = Database::connect(&config.database).await?;
        db.migrate().await?;
        Ok(Self::with_database(config, db, secret.as_bytes()))
    }

    /// Assemble from an already connected database.
    pub fn with_database(config: LabsiteConfig, db: Database, secret: &[u8]) -> Self {
        let passwords = PasswordHasher::new(config.bcrypt_cost());
        Self {
            config,
            db,
            tokens: TokenService::new(secret),
            passwords,
        }
    }

    /// Authenticate an administrator.
    ///
    /// If the stored hash is still the placeholder, the submitted password
    /// becomes the account password. Read and write are not wrapped in a
    /// transaction; two concurrent first logins both write, last write wins.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome> {
        if username.is_empty() || password.is_empty() {
            return Err(Error::Validation(
                "Username and password are required".to_string(),
            ));
        }

        let Some(admin) = self.db.find_admin(username).await? else {
            tracing::info!("Login rejected for unknown user {:?}", username);
            return Ok(LoginOutcome::Rejected);
        };

        if is_placeholder_hash(&admin.password_hash) {
            let hash = self.passwords.hash(password)?;
            self.db.update_admin_password(admin.id, &hash).await?;
            tracing::info!("Password set on first login for {}", admin.username);
        } else if !self.passwords.verify(password, &admin.password_hash)? {
            tracing::info!("Login rejected for {}: wrong password", admin.username);
            return Ok(LoginOutcome::Rejected);
        }

        let token = self.tokens.issue(admin.id, &admin.username)?;
        tracing::info!("Admin {} signed in", admin.username);

        Ok(LoginOutcome::Authenticated {
            identity: AdminIdentity {
                id: admin.id,
                username: admin.username,
            },
            token,
        })
    }

    /// Verify a session token. See [`TokenService::verify`].
    pub fn verify_token(&self, token: &str) -> Option<AdminIdentity> {
        self.tokens.verify(token)
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    pub fn passwords(&self) -> &PasswordHasher {
        &self.passwords
    }

    /// Create tables and the placeholder admin account if none exists.
    pub async fn bootstrap(&self, admin_username: &str) -> Result<bool> {
        self.db.migrate().await?;
        let created = self.db.bootstrap_admin(admin_username).await?;
        if created {
            tracing::info!(
                "Created admin account {}; its password is set on first login",
                admin_username
            );
        }
        Ok(created)
    }

    // === Publications ===

    pub async fn list_publications(&self, opts: &ListOptions) -> Result<ListResult<Publication>> {
        self.db.list_publications(opts).await
    }

    pub async fn all_publications(&self) -> Result<Vec<Publication>> {
        self.db.all_publications().await
    }

    pub async fn get_publication(&self, id: i64) -> Result<Option<Publication>> {
        self.db.get_publication(id).await
    }

    pub async fn create_publication(&self, input: PublicationInput) -> Result<i64> {
        let publication = input.validate()?;
        self.db.create_publication(&publication).await
    }

    pub async fn update_publication(&self, id: i64, input: PublicationInput) -> Result<()> {
        let publication = input.validate()?;
        self.db.update_publication(id, &publication).await
    }

    pub async fn delete_publication(&self, id: i64) -> Result<bool> {
        self.db.delete_publication(id).await
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &LabsiteConfig {
        &self.config
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Release pooled connections.
    pub async fn shutdown(&self) {
        self.db.close().await;
    }
}
