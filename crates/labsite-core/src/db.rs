//! Database access for admin accounts and publications.
//!
//! A single bounded pool is created at startup and owned by [`Database`].
//! The sqlx `Any` driver lets the same queries run against MySQL in
//! production and SQLite for local use and tests; both use `?` placeholders.

use crate::config::DatabaseConfig;
use crate::error::{Error, Result};
use crate::password::PLACEHOLDER_HASH;
use crate::types::{AdminAccount, Authors, ListOptions, ListResult, NewPublication, Publication};
use sqlx::any::{AnyPoolOptions, AnyRow};
use sqlx::{AnyPool, Row};

/// SQL dialect behind the connection URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    MySql,
    Sqlite,
}

impl Backend {
    pub fn from_url(url: &str) -> Result<Self> {
        if url.starts_with("mysql:") || url.starts_with("mariadb:") {
            Ok(Backend::MySql)
        } else if url.starts_with("sqlite:") {
            Ok(Backend::Sqlite)
        } else {
            Err(Error::Config(
                "database.url must use the mysql:// or sqlite:// scheme".to_string(),
            ))
        }
    }

    fn schema(self) -> [&'static str; 2] {
        match self {
            Backend::MySql => [
                "CREATE TABLE IF NOT EXISTS admins (
                    id BIGINT AUTO_INCREMENT PRIMARY KEY,
                    username VARCHAR(50) UNIQUE NOT NULL,
                    password_hash VARCHAR(255) NOT NULL,
                    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
                    updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP
                )",
                "CREATE TABLE IF NOT EXISTS publications (
                    id BIGINT AUTO_INCREMENT PRIMARY KEY,
                    title VARCHAR(512) NOT NULL,
                    authors VARCHAR(4096) NOT NULL,
                    journal VARCHAR(255) NOT NULL,
                    year INT NOT NULL,
                    link VARCHAR(1024) NOT NULL DEFAULT ''
                )",
            ],
            Backend::Sqlite => [
                "CREATE TABLE IF NOT EXISTS admins (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    username TEXT UNIQUE NOT NULL,
                    password_hash TEXT NOT NULL,
                    created_at TEXT DEFAULT CURRENT_TIMESTAMP,
                    updated_at TEXT DEFAULT CURRENT_TIMESTAMP
                )",
                "CREATE TABLE IF NOT EXISTS publications (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    title TEXT NOT NULL,
                    authors TEXT NOT NULL,
                    journal TEXT NOT NULL,
                    year INTEGER NOT NULL,
                    link TEXT NOT NULL DEFAULT ''
                )",
            ],
        }
    }
}

/// Owned connection pool plus the queries the site needs
#[derive(Debug, Clone)]
pub struct Database {
    pool: AnyPool,
    backend: Backend,
}

const PUBLICATION_COLUMNS: &str = "id, title, authors, journal, year, link";

impl Database {
    /// Connect using the `[database]` config section.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let url = config.connection_url()?;
        Self::connect_url(&url, config.max_connections).await
    }

    pub async fn connect_url(url: &str, max_connections: u32) -> Result<Self> {
        sqlx::any::install_default_drivers();
        let backend = Backend::from_url(url)?;

        let pool = AnyPoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect(url)
            .await?;

        tracing::debug!("Connected to {:?} database", backend);
        Ok(Self { pool, backend })
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// Create the `admins` and `publications` tables if missing.
    pub async fn migrate(&self) -> Result<()> {
        for statement in self.backend.schema() {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Close the pool, waiting for checked-out connections to return.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    // === Admin accounts ===

    pub async fn find_admin(&self, username: &str) -> Result<Option<AdminAccount>> {
        let row = sqlx::query("SELECT id, username, password_hash FROM admins WHERE username = ?")
            .bind(username.to_string())
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(AdminAccount {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            password_hash: row.try_get("password_hash")?,
        }))
    }

    pub async fn count_admins(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM admins")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("count")?)
    }

    pub async fn insert_admin(&self, username: &str, password_hash: &str) -> Result<()> {
        sqlx::query("INSERT INTO admins (username, password_hash) VALUES (?, ?)")
            .bind(username.to_string())
            .bind(password_hash.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn update_admin_password(&self, id: i64, password_hash: &str) -> Result<()> {
        sqlx::query("UPDATE admins SET password_hash = ? WHERE id = ?")
            .bind(password_hash.to_string())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Insert `username` with the placeholder hash when no admin exists yet.
    ///
    /// Returns `true` if an account was created.
    pub async fn bootstrap_admin(&self, username: &str) -> Result<bool> {
        if self.count_admins().await? > 0 {
            return Ok(false);
        }
        self.insert_admin(username, PLACEHOLDER_HASH).await?;
        Ok(true)
    }

    // === Publications ===

    /// One page of publications, newest year first.
    pub async fn list_publications(&self, opts: &ListOptions) -> Result<ListResult<Publication>> {
        let limit = opts.effective_limit();
        let offset = opts.effective_offset();

        let sql = format!(
            "SELECT {} FROM publications ORDER BY year DESC, id DESC LIMIT ? OFFSET ?",
            PUBLICATION_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .bind(i64::try_from(offset).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await?;

        let items = rows
            .iter()
            .map(publication_from_row)
            .collect::<Result<Vec<_>>>()?;

        Ok(ListResult {
            items,
            total: self.count_publications().await? as usize,
            limit,
            offset,
        })
    }

    /// Every publication, newest year first.
    pub async fn all_publications(&self) -> Result<Vec<Publication>> {
        let sql = format!(
            "SELECT {} FROM publications ORDER BY year DESC, id DESC",
            PUBLICATION_COLUMNS
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(publication_from_row).collect()
    }

    pub async fn count_publications(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM publications")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("count")?)
    }

    pub async fn get_publication(&self, id: i64) -> Result<Option<Publication>> {
        let sql = format!("SELECT {} FROM publications WHERE id = ?", PUBLICATION_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(publication_from_row).transpose()
    }

    /// Insert a publication and return its id.
    pub async fn create_publication(&self, publication: &NewPublication) -> Result<i64> {
        let result = sqlx::query(
            "INSERT INTO publications (title, authors, journal, year, link) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(publication.title.clone())
        .bind(publication.authors.to_storage())
        .bind(publication.journal.clone())
        .bind(publication.year)
        .bind(publication.link.clone().unwrap_or_default())
        .execute(&self.pool)
        .await?;

        result
            .last_insert_id()
            .ok_or_else(|| Error::Internal("database did not report an insert id".to_string()))
    }

    /// Replace a publication. Fails with `NotFound` if `id` does not exist.
    pub async fn update_publication(&self, id: i64, publication: &NewPublication) -> Result<()> {
        if self.get_publication(id).await?.is_none() {
            return Err(Error::NotFound(format!("Publication {}", id)));
        }

        sqlx::query(
            "UPDATE publications SET title = ?, authors = ?, journal = ?, year = ?, link = ? WHERE id = ?",
        )
        .bind(publication.title.clone())
        .bind(publication.authors.to_storage())
        .bind(publication.journal.clone())
        .bind(publication.year)
        .bind(publication.link.clone().unwrap_or_default())
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Delete a publication. Returns `false` if nothing was deleted.
    pub async fn delete_publication(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM publications WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn publication_from_row(row: &AnyRow) -> Result<Publication> {
    let year: i64 = row.try_get("year")?;
    let authors: String = row.try_get("authors")?;
    let link: String = row.try_get("link")?;

    Ok(Publication {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        authors: Authors::parse(&authors),
        journal: row.try_get("journal")?,
        year: i32::try_from(year)
            .map_err(|_| Error::Internal(format!("publication year out of range: {}", year)))?,
        link: Some(link).filter(|l| !l.is_empty()),
    })
}
