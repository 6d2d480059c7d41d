//! CLI administration tool for campaign-reports.
//!
//! Mints, inspects and revokes share links, and prints a campaign's live
//! analytics snapshot, without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Mint a share link
//! cargo run --bin admin -- share create --campaign cmp_42 --name "Spring Launch"
//!
//! # Show a link and its current status
//! cargo run --bin admin -- share show Xk3v9QpL2mN8rT1a
//!
//! # List a campaign's links
//! cargo run --bin admin -- share list --campaign cmp_42
//!
//! # Revoke a link
//! cargo run --bin admin -- share revoke Xk3v9QpL2mN8rT1a
//!
//! # Print live analytics for a campaign
//! cargo run --bin admin -- report cmp_42
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! Same as the service (see `campaign_reports::config`). Share and database
//! commands need `DATABASE_URL` (or the `DB_*` components): links minted
//! into an in-memory store would vanish when the command exits.

use campaign_reports::application::services::ShareLinkService;
use campaign_reports::config::{self, Config};
use campaign_reports::domain::analytics::AnalyticsSnapshot;
use campaign_reports::domain::entities::{LinkStatus, ShareLink};
use campaign_reports::infrastructure::persistence::{
    InMemoryShareLinkRepository, PgShareLinkRepository,
};
use campaign_reports::infrastructure::upstream::HttpResultsSource;
use campaign_reports::server::connect_database;
use campaign_reports::state::AppState;

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input};
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing campaign-reports.
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
    /// Manage share links
    Share {
        #[command(subcommand)]
        action: ShareAction,
    },

    /// Print a campaign's live analytics
    Report {
        /// Campaign identifier
        campaign_id: String,

        /// Bearer token tried before the configured fallbacks
        #[arg(short, long)]
        token: Option<String>,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Share link subcommands.
#[derive(Subcommand)]
enum ShareAction {
    /// Mint a new share link
    Create {
        /// Campaign identifier
        #[arg(short, long)]
        campaign: Option<String>,

        /// Campaign display name
        #[arg(short, long)]
        name: Option<String>,

        /// Lifetime in hours (defaults to SHARE_LINK_TTL_HOURS)
        #[arg(long)]
        ttl_hours: Option<u32>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Show a share link and its current status
    Show {
        /// Share identifier
        id: String,
    },

    /// List share links issued for a campaign
    List {
        /// Campaign identifier
        #[arg(short, long)]
        campaign: String,
    },

    /// Revoke a share link
    Revoke {
        /// Share identifier
        id: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = config::load_from_env()?;

    match cli.command {
        Commands::Share { action } => {
            let pool = connect(&config).await?;
            handle_share_action(action, &config, pool).await?
        }
        Commands::Report { campaign_id, token } => {
            print_report(&config, &campaign_id, token.as_deref()).await?
        }
        Commands::Db { action } => {
            let pool = connect(&config).await?;
            handle_db_action(action, &pool).await?
        }
    }

    Ok(())
}

async fn connect(config: &Config) -> Result<PgPool> {
    let database_url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL (or DB_* components) must be set for share and db commands")?;

    connect_database(config, database_url).await
}

/// Dispatches share link commands.
async fn handle_share_action(action: ShareAction, config: &Config, pool: PgPool) -> Result<()> {
    let repo = Arc::new(PgShareLinkRepository::new(Arc::new(pool)));
    let service = ShareLinkService::new(repo);

    match action {
        ShareAction::Create {
            campaign,
            name,
            ttl_hours,
            yes,
        } => create_link(&service, config, campaign, name, ttl_hours, yes).await,
        ShareAction::Show { id } => show_link(&service, &id).await,
        ShareAction::List { campaign } => list_links(&service, &campaign).await,
        ShareAction::Revoke { id, yes } => revoke_link(&service, &id, yes).await,
    }
}

/// Mints a share link with interactive prompts for missing values.
async fn create_link(
    service: &ShareLinkService<PgShareLinkRepository>,
    config: &Config,
    campaign: Option<String>,
    name: Option<String>,
    ttl_hours: Option<u32>,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "Create share link".bright_blue().bold());
    println!();

    let campaign_id = match campaign {
        Some(c) => c,
        None => Input::new().with_prompt("Campaign id").interact_text()?,
    };

    let campaign_name = match name {
        Some(n) => n,
        None => Input::new().with_prompt("Campaign name").interact_text()?,
    };

    let hours = ttl_hours.unwrap_or(config.share_link_ttl_hours);
    if hours == 0 || hours > config.share_link_max_ttl_hours {
        anyhow::bail!(
            "TTL must be between 1 and {} hours, got {}",
            config.share_link_max_ttl_hours,
            hours
        );
    }

    println!("  Campaign: {} ({})", campaign_name.cyan(), campaign_id.bright_black());
    println!("  Expires:  in {} hours", hours.to_string().bright_white());
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Create this share link?")
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "Cancelled".red());
            return Ok(());
        }
    }

    let link = service
        .create(&campaign_id, &campaign_name, Duration::hours(i64::from(hours)))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create share link: {}", e))?;

    println!();
    println!("{}", "Share link created".green().bold());
    println!();
    println!(
        "  {}/shared-reports/{}",
        config.public_base_url.trim_end_matches('/'),
        link.id.bright_yellow()
    );
    println!(
        "  Expires at {}",
        link.expires_at.format("%Y-%m-%d %H:%M UTC").to_string().bright_black()
    );
    println!();

    Ok(())
}

/// Prints one link. Read-only: does not apply lazy expiry.
async fn show_link(service: &ShareLinkService<PgShareLinkRepository>, id: &str) -> Result<()> {
    let link = service
        .resolve(id)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    println!("{}", "Share link".bright_blue().bold());
    println!();
    println!("  ID:       {}", link.id.bright_yellow());
    println!("  Campaign: {} ({})", link.campaign_name.cyan(), link.campaign_id.bright_black());
    println!("  Created:  {}", link.created_at.format("%Y-%m-%d %H:%M UTC"));
    println!("  Expires:  {}", link.expires_at.format("%Y-%m-%d %H:%M UTC"));
    if let Some(revoked_at) = link.revoked_at {
        println!("  Revoked:  {}", revoked_at.format("%Y-%m-%d %H:%M UTC"));
    }
    println!("  Status:   {}", status_label(&link));
    println!();

    Ok(())
}

/// Lists a campaign's links, newest first.
///
/// # Output Format
///
/// ```text
/// Share links for cmp_42
///
///   ID                 Created            Expires            Status
///   ──────────────────────────────────────────────────────────────────────
///   Xk3v9QpL2mN8rT1a   2026-10-01 10:00   2026-10-08 10:00   ACTIVE
///   Qw8e7R6t5Y4u3I2o   2026-09-01 09:12   2026-09-08 09:12   EXPIRED
/// ```
async fn list_links(
    service: &ShareLinkService<PgShareLinkRepository>,
    campaign_id: &str,
) -> Result<()> {
    println!(
        "{} {}",
        "Share links for".bright_blue().bold(),
        campaign_id.bright_blue().bold()
    );
    println!();

    let links = service
        .list_for_campaign(campaign_id)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list share links: {}", e))?;

    if links.is_empty() {
        println!("{}", "  No share links found".yellow());
        return Ok(());
    }

    println!(
        "  {:<18} {:<18} {:<18} {:<10}",
        "ID".bright_white().bold(),
        "Created".bright_white().bold(),
        "Expires".bright_white().bold(),
        "Status".bright_white().bold()
    );
    println!("  {}", "─".repeat(70).bright_black());

    for link in &links {
        println!(
            "  {:<18} {:<18} {:<18} {}",
            link.id.cyan(),
            link.created_at.format("%Y-%m-%d %H:%M").to_string().bright_black(),
            link.expires_at.format("%Y-%m-%d %H:%M").to_string().bright_black(),
            status_label(link)
        );
    }

    println!();
    println!("  Total: {}", links.len().to_string().bright_white().bold());
    println!();

    Ok(())
}

/// Revokes a link after confirmation. Idempotent.
async fn revoke_link(
    service: &ShareLinkService<PgShareLinkRepository>,
    id: &str,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "Revoke share link".bright_blue().bold());
    println!();

    let link = service
        .resolve(id)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    if !link.is_active {
        println!(
            "{} ({})",
            "This share link is already inactive".yellow(),
            status_label(&link)
        );
        return Ok(());
    }

    println!("  ID:       {}", link.id.bright_yellow());
    println!("  Campaign: {}", link.campaign_name.cyan());
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Revoke this share link?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "Cancelled".red());
            return Ok(());
        }
    }

    let link = service
        .revoke(id)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to revoke share link: {}", e))?;

    println!();
    println!("{} ({})", "Share link revoked".green().bold(), status_label(&link));
    println!();

    Ok(())
}

/// Fetches a campaign through the gateway and prints its snapshot.
async fn print_report(config: &Config, campaign_id: &str, token: Option<&str>) -> Result<()> {
    let source = HttpResultsSource::new(config.upstream_url()?, config.upstream_timeout())
        .context("Failed to build upstream HTTP client")?;

    let state = AppState::new(
        Arc::new(InMemoryShareLinkRepository::new()),
        Arc::new(source),
        config.gateway_settings(),
        config.report_settings(),
    );

    println!(
        "{} {}",
        "Campaign analytics for".bright_blue().bold(),
        campaign_id.bright_blue().bold()
    );
    println!();

    let snapshot = state
        .reports
        .compute_snapshot(campaign_id, token)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    print_snapshot(&snapshot);

    Ok(())
}

fn print_snapshot(snapshot: &AnalyticsSnapshot) {
    println!("  Posts:           {}", snapshot.total_posts.to_string().bright_green().bold());
    println!("  Influencers:     {}", snapshot.total_influencers.to_string().bright_green().bold());
    println!("  Likes:           {}", snapshot.total_likes);
    println!("  Comments:        {}", snapshot.total_comments);
    println!("  Views:           {}", snapshot.total_views);
    println!("  Plays:           {}", snapshot.total_plays);
    println!("  Engagement rate: {:.2}%", snapshot.average_engagement_rate);
    println!();
    println!("{}", "  Estimates (approximate)".bright_white().bold());
    println!("    Clicks:        ~{}", snapshot.estimates.clicks);
    println!("    Impressions:   ~{}", snapshot.estimates.impressions);
    println!("    Reach:         ~{}", snapshot.estimates.reach);
    println!();

    println!("{}", "  Top performers".bright_white().bold());
    for (rank, influencer) in snapshot.top_performers.iter().enumerate() {
        println!(
            "    {}. {:<24} engagement {:>8}  rate {:>6.2}%",
            rank + 1,
            influencer.display_name.cyan(),
            influencer.engagement,
            influencer.engagement_rate
        );
    }
    println!();

    println!("{}", "  Top posts".bright_white().bold());
    for (rank, post) in snapshot.top_posts.iter().enumerate() {
        println!(
            "    {}. {:<24} engagement {:>8}  {}",
            rank + 1,
            post.username.cyan(),
            post.engagement,
            post.url.as_deref().unwrap_or("").bright_black()
        );
    }
    println!();
}

fn status_label(link: &ShareLink) -> ColoredString {
    match link.status_at(Utc::now()) {
        LinkStatus::Active => "ACTIVE".green(),
        LinkStatus::Revoked => "REVOKED".red(),
        LinkStatus::Expired => "EXPIRED".yellow(),
    }
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            let links: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM share_links")
                .fetch_one(pool)
                .await?;

            println!("{}", "Database connection OK".green().bold());
            println!("  Share links stored: {}", links.to_string().bright_white());
        }
    }

    Ok(())
}
