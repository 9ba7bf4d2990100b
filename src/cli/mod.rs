//! CLI parser and command dispatch.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Days, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use console::style;

use crate::config::Settings;
use crate::kosis::KosisClient;
use crate::pipeline::{Collector, RunOptions};
use crate::repository::{migrations, AsyncSqlitePool, CompletionFlagRepository};

#[derive(Parser)]
#[command(name = "kosis-collect")]
#[command(about = "KOSIS statistical table batch collector")]
#[command(version)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, global = true, default_value = "kosis.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect refreshed tables for one or more execute dates
    Run {
        /// Execute date (YYYY-MM-DD); defaults to yesterday
        #[arg(long)]
        execute_date: Option<NaiveDate>,
        /// Days behind the execute date to accept refreshes from
        #[arg(long)]
        days_back: Option<u64>,
        /// Number of concurrent fetch workers
        #[arg(short, long)]
        workers: Option<usize>,
        /// Restrict collection to a table id (repeatable)
        #[arg(long = "tbl-id")]
        tbl_id: Vec<String>,
        /// Also collect the N-1 dates before the execute date
        #[arg(long, default_value = "1")]
        backfill: u64,
    },

    /// Apply pending database migrations
    Migrate,

    /// Show the completion flag for a run date
    Status {
        /// Run date (YYYYMMDD); defaults to today
        #[arg(long)]
        date: Option<String>,
    },
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(&cli.config)?;
    let _log_guards = crate::logging::init(Path::new(&settings.logging.dir), cli.verbose)?;

    match cli.command {
        Commands::Run {
            execute_date,
            days_back,
            workers,
            tbl_id,
            backfill,
        } => {
            cmd_run(
                &settings,
                execute_date,
                days_back,
                workers,
                tbl_id,
                backfill,
            )
            .await
        }
        Commands::Migrate => cmd_migrate(&settings).await,
        Commands::Status { date } => cmd_status(&settings, date).await,
    }
}

async fn cmd_run(
    settings: &Settings,
    execute_date: Option<NaiveDate>,
    days_back: Option<u64>,
    workers: Option<usize>,
    tbl_id: Vec<String>,
    backfill: u64,
) -> Result<()> {
    migrations::run_migrations(&settings.database.url)
        .await
        .context("failed to run database migrations")?;

    let end_date = execute_date.unwrap_or_else(|| settings.collector.execute_date_or_default());
    let dates: Vec<NaiveDate> = (0..backfill.max(1))
        .rev()
        .filter_map(|offset| end_date.checked_sub_days(Days::new(offset)))
        .collect();

    let options = RunOptions {
        days_back: days_back.unwrap_or(settings.collector.days_back),
        max_workers: workers.unwrap_or(settings.collector.max_workers),
        tbl_ids: if tbl_id.is_empty() {
            settings.collector.tbl_id.clone()
        } else {
            tbl_id
        },
    };

    let client = KosisClient::new(
        &settings.kosis.base_url,
        &settings.kosis.api_key()?,
        &settings.kosis.user_stats_id()?,
    )
    .context("failed to build the KOSIS client")?;

    let pool = AsyncSqlitePool::new(&settings.database.url);
    let collector = Collector::new(pool, client);
    let stats = collector.run(&dates, &options).await?;

    if stats.is_empty() {
        println!("{}", style("Nothing refreshed in the window.").yellow());
        return Ok(());
    }
    for stat in &stats {
        println!(
            "{}  {} urls, {} succeeded ({:.1}%)",
            style(&stat.date).cyan(),
            stat.url_count,
            style(stat.success_count).green(),
            stat.success_rate()
        );
    }
    Ok(())
}

async fn cmd_migrate(settings: &Settings) -> Result<()> {
    migrations::run_migrations(&settings.database.url)
        .await
        .context("failed to run database migrations")?;
    println!("{}", style("Database is up to date.").green());
    Ok(())
}

async fn cmd_status(settings: &Settings, date: Option<String>) -> Result<()> {
    let date = date.unwrap_or_else(|| Utc::now().format("%Y%m%d").to_string());
    let pool = AsyncSqlitePool::new(&settings.database.url);
    let completion = CompletionFlagRepository::new(pool);

    match completion.get(&date).await? {
        Some(record) => {
            let flag = if record.complete_flag == "Y" {
                style(record.complete_flag.as_str()).green()
            } else {
                style(record.complete_flag.as_str()).yellow()
            };
            println!("{}  flag={}", style(&record.collect_date).cyan(), flag);
            println!("  last change: {}", record.modified_at);
        }
        None => println!("No run recorded for {}.", style(&date).cyan()),
    }
    Ok(())
}
