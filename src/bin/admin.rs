//! CLI administration tool for codehub.
//!
//! Provides commands for inspecting the catalog, viewing statistics and
//! maintaining the newsletter lists without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Check database connection
//! cargo run --bin admin -- db check
//!
//! # Row counts per table
//! cargo run --bin admin -- stats
//!
//! # List categories with their snippet counts
//! cargo run --bin admin -- categories list
//!
//! # Purge unsubscribed addresses
//! cargo run --bin admin -- newsletter purge-deleted
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` or `DB_HOST`/`DB_USER`/`DB_PASSWORD`/`DB_NAME`: PostgreSQL connection

use codehub::config::{Config, StorageBackend};
use codehub::domain::repositories::{CategoryRepository, SubscriberRepository};
use codehub::infrastructure::persistence::{PgCategoryRepository, PgSubscriberRepository};
use codehub::server::connect_pool;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing codehub.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Show row counts
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },

    /// Category operations
    Categories {
        #[command(subcommand)]
        action: CategoryAction,
    },

    /// Newsletter maintenance
    Newsletter {
        #[command(subcommand)]
        action: NewsletterAction,
    },
}

#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[derive(Subcommand)]
enum CategoryAction {
    /// List all categories
    List,
}

#[derive(Subcommand)]
enum NewsletterAction {
    /// Permanently delete every unsubscribed address
    PurgeDeleted {
        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Tables reported by `stats`, with their labels.
const COUNTED_TABLES: [(&str, &str); 10] = [
    ("Categories", "categories"),
    ("Snippets", "snippets"),
    ("History entries", "history_entries"),
    ("Reactions", "reactions"),
    ("Comments", "comments"),
    ("Shares", "shares"),
    ("Code runs", "code_runs"),
    ("Contacts", "contacts"),
    ("Subscribers", "newsletter_subscribers"),
    ("Unsubscribed", "deleted_subscribers"),
];

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = Config::from_env()?;
    if config.storage != StorageBackend::Postgres {
        anyhow::bail!("The admin tool needs STORAGE_BACKEND=postgres");
    }
    let pool = connect_pool(&config).await?;

    match cli.command {
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
        Commands::Categories { action } => handle_category_action(action, &pool).await?,
        Commands::Newsletter { action } => handle_newsletter_action(action, &pool).await?,
    }

    Ok(())
}

/// Displays the number of rows in every table.
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    for (label, table) in COUNTED_TABLES {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(pool)
            .await?;

        println!(
            "  {:<17} {}",
            format!("{label}:"),
            count.to_string().bright_green().bold()
        );
    }
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            println!("  PostgreSQL: {}", version.bright_white());
            println!();
        }
    }

    Ok(())
}

/// Lists categories with their snippet totals.
///
/// # Output Format
///
/// ```text
/// 📁 Categories
///
///   Slug                      Name                      Snippets
///   ──────────────────────────────────────────────────────────────
///   web-dev                   Web Dev                   12
/// ```
async fn handle_category_action(action: CategoryAction, pool: &PgPool) -> Result<()> {
    let repo = PgCategoryRepository::new(Arc::new(pool.clone()));

    match action {
        CategoryAction::List => {
            println!("{}", "📁 Categories".bright_blue().bold());
            println!();

            let total = repo
                .count(None)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to count categories: {e}"))?;
            let categories = repo
                .list(None, 1, total.max(1))
                .await
                .map_err(|e| anyhow::anyhow!("Failed to list categories: {e}"))?;

            if categories.is_empty() {
                println!("{}", "  No categories found".yellow());
                return Ok(());
            }

            println!(
                "  {:<25} {:<25} {}",
                "Slug".bright_white().bold(),
                "Name".bright_white().bold(),
                "Snippets".bright_white().bold()
            );
            println!("  {}", "─".repeat(62).bright_black());

            for category in &categories {
                let stats = repo
                    .stats(category.id)
                    .await
                    .map_err(|e| anyhow::anyhow!("Failed to load stats: {e}"))?;

                println!(
                    "  {:<25} {:<25} {}",
                    category.slug.cyan(),
                    category.name,
                    stats.snippet_count.to_string().bright_green()
                );
            }

            println!();
            println!("  Total: {}", total.to_string().bright_white().bold());
            println!();
        }
    }

    Ok(())
}

/// Handles newsletter maintenance commands.
///
/// # Safety
///
/// Purging requires confirmation (default: No) unless `--yes` is given.
async fn handle_newsletter_action(action: NewsletterAction, pool: &PgPool) -> Result<()> {
    let repo = PgSubscriberRepository::new(Arc::new(pool.clone()));

    match action {
        NewsletterAction::PurgeDeleted { yes } => {
            println!("{}", "🗑️  Purge Unsubscribed Addresses".bright_blue().bold());
            println!();

            let pending = repo
                .count_deleted()
                .await
                .map_err(|e| anyhow::anyhow!("Database error: {e}"))?;

            if pending == 0 {
                println!("{}", "  Nothing to purge".yellow());
                return Ok(());
            }

            println!(
                "  Unsubscribed addresses: {}",
                pending.to_string().bright_white().bold()
            );
            println!();

            if !yes {
                let confirmed = Confirm::new()
                    .with_prompt("Delete them permanently?")
                    .default(false)
                    .interact()?;

                if !confirmed {
                    println!("{}", "❌ Cancelled".red());
                    return Ok(());
                }
            }

            let deleted = repo
                .clear_deleted()
                .await
                .map_err(|e| anyhow::anyhow!("Failed to purge: {e}"))?;

            println!();
            println!(
                "{}",
                format!("✅ Purged {deleted} addresses").green().bold()
            );
            println!();
        }
    }

    Ok(())
}
