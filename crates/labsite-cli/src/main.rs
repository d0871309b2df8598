//! labsite CLI - Command line interface for labsite

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use labsite_core::{DEFAULT_BCRYPT_COST, Labsite, PasswordHasher, resolve_config};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "labsite")]
#[command(about = "Localized academic group website with an admin area")]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve,

    /// Write an example labsite.toml
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Create tables and the initial admin account
    InitDb {
        /// Admin username; the password is set on first login
        #[arg(short, long, default_value = "admin")]
        username: String,
    },

    /// Print a bcrypt hash for a password
    HashPassword {
        password: String,

        /// bcrypt cost factor
        #[arg(long, default_value_t = DEFAULT_BCRYPT_COST)]
        cost: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve => cmd_serve(cli.config.as_deref()).await,
        Commands::Init { path } => cmd_init(&path),
        Commands::InitDb { username } => cmd_init_db(cli.config.as_deref(), &username).await,
        Commands::HashPassword { password, cost } => cmd_hash_password(&password, cost),
    }
}

async fn cmd_serve(config_path: Option<&Path>) -> Result<()> {
    let config = resolve_config(config_path)?;
    let site = Labsite::from_config(config).await?;
    tracing::info!("Database ready ({:?})", site.database().backend());
    labsite_api::serve(site).await?;
    tracing::info!("Server stopped");
    Ok(())
}

const EXAMPLE_CONFIG: &str = r#"[server]
host = "0.0.0.0"
port = 3000
# cors_origins = ["https://example.edu"]
# Requires auth.jwt_secret and marks session cookies Secure
production = false

[database]
# url = "env:DATABASE_URL"
host = "localhost"
port = 3306
user = "root"
# password = "env:DB_PASSWORD"
name = "personal_web"
max_connections = 10

[auth]
# jwt_secret = "env:JWT_SECRET"
bcrypt_cost = 10
"#;

fn cmd_init(path: &Path) -> Result<()> {
    let config_path = path.join("labsite.toml");
    if config_path.exists() {
        bail!("{} already exists", config_path.display());
    }

    std::fs::create_dir_all(path)?;
    std::fs::write(&config_path, EXAMPLE_CONFIG)?;
    tracing::debug!("Wrote example config to {}", config_path.display());

    println!("Created {}", config_path.display());
    println!();
    println!("Next steps:");
    println!("  1. Edit labsite.toml with your database settings");
    println!("  2. Run `labsite init-db` to create tables and the admin account");
    println!("  3. Run `labsite serve` and sign in at /admin/login");

    Ok(())
}

async fn cmd_init_db(config_path: Option<&Path>, username: &str) -> Result<()> {
    let config = resolve_config(config_path)?;
    let site = Labsite::from_config(config).await?;

    let created = site.bootstrap(username).await?;
    tracing::info!(username, created, "Bootstrapped admin account");
    if created {
        println!("Created admin account {:?}", username);
        println!("The password you use on the first login becomes the account password.");
    } else {
        println!("Tables are ready; an admin account already exists.");
    }

    site.shutdown().await;
    Ok(())
}

fn cmd_hash_password(password: &str, cost: u32) -> Result<()> {
    if password.is_empty() {
        bail!("password must not be empty");
    }
    tracing::debug!("Hashing password with bcrypt cost {}", cost);
    let hash = PasswordHasher::new(cost).hash(password)?;
    println!("{}", hash);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_init_writes_loadable_config() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        cmd_init(temp_dir.path()).unwrap();

        let config = labsite_core::Config::from_path(&temp_dir.path().join("labsite.toml")).unwrap();
        assert!(!config.is_production());
        assert_eq!(config.server.as_ref().unwrap().port, 3000);
        assert_eq!(config.database.name, "personal_web");
        assert_eq!(config.bcrypt_cost(), 10);

        // Refuses to overwrite
        assert!(cmd_init(temp_dir.path()).is_err());
    }

    #[tokio::test]
    async fn test_init_db_bootstraps_once() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("labsite.toml");
        let db_url = format!(
            "sqlite://{}?mode=rwc",
            temp_dir.path().join("site.db").display()
        );
        std::fs::write(
            &config_path,
            format!("[database]\nurl = {:?}\n\n[auth]\nbcrypt_cost = 4\n", db_url),
        )
        .unwrap();

        cmd_init_db(Some(&config_path), "admin").await.unwrap();
        // A second run finds the existing account
        cmd_init_db(Some(&config_path), "admin").await.unwrap();
    }

    #[test]
    fn test_hash_password_rejects_empty() {
        assert!(cmd_hash_password("", 4).is_err());
        assert!(cmd_hash_password("secret", 4).is_ok());
    }
}
