//! Postsheet CLI
//!
//! Local inspection tool over the post loading pipeline.

use std::path::PathBuf;

use chrono::Utc;
use clap::{Parser, Subcommand};
use postsheet::{
    error::{AppError, Result},
    models::{Config, Post},
    pipeline::{self, BlogPipeline, CategorySelection},
};

/// Postsheet - spreadsheet-backed blog posts
#[derive(Parser, Debug)]
#[command(
    name = "postsheet",
    version,
    about = "Load and inspect spreadsheet-backed blog posts"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "postsheet.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Print posts as JSON instead of a listing
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List published posts, newest first
    Posts {
        /// Only featured posts
        #[arg(long)]
        featured: bool,

        /// Skip the snapshot cache
        #[arg(long)]
        fresh: bool,
    },

    /// Show a single post by slug
    Show { slug: String },

    /// Search or filter posts like the blog index does
    Browse {
        /// Free-text query; overrides category filters when non-blank
        #[arg(short, long, default_value = "")]
        query: String,

        /// Category to require (repeatable)
        #[arg(short = 'C', long = "category")]
        categories: Vec<String>,
    },

    /// Count posts per category
    Categories,

    /// Validate the configuration file
    Validate,

    /// Inspect or clear the snapshot cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand, Debug)]
enum CacheAction {
    /// Show snapshot age and size
    Info,
    /// Remove the snapshot
    Clear,
}

/// Initialize logging based on verbosity flag and configured level.
fn init_logging(verbose: bool, level: &str) {
    let level = if verbose { "debug" } else { level };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn print_posts(posts: &[Post], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(posts)?);
        return Ok(());
    }
    for post in posts {
        println!(
            "{}",
            post.format("{date}  {slug}  {title} ({read_time}) [{categories}]")
        );
    }
    Ok(())
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = Config::load(&cli.config);
    let level = loaded
        .as_ref()
        .map(|c| c.logging.level.clone())
        .unwrap_or_else(|_| "info".to_string());
    init_logging(cli.verbose, &level);

    let config = match loaded {
        Ok(config) => {
            log::debug!("Loaded configuration from {}", cli.config.display());
            config
        }
        Err(e) if matches!(cli.command, Command::Validate) => {
            log::error!("Config load failed from {}: {}", cli.config.display(), e);
            return Err(e);
        }
        Err(_) => Config::load_or_default(&cli.config),
    };

    if let Command::Validate = cli.command {
        log::info!("Validating configuration...");
        if let Err(e) = config.validate() {
            log::error!("Config validation failed: {}", e);
            return Err(e);
        }
        log::info!("✓ Config OK ({})", cli.config.display());
        return Ok(());
    }

    let blog = BlogPipeline::new(&config)?;

    match cli.command {
        Command::Posts { featured, fresh } => {
            let posts = if fresh {
                blog.refresh().await
            } else {
                blog.load_cached().await
            };
            let posts = if featured {
                pipeline::featured_posts(&posts, posts.len())
            } else {
                pipeline::sort_by_date_desc(posts)
            };
            print_posts(&posts, cli.json)?;
        }

        Command::Show { slug } => {
            let Some(post) = blog.get_post_by_slug(&slug).await else {
                log::error!("No post with slug {:?}", slug);
                return Err(AppError::validation(format!("post {slug:?} not found")));
            };

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&post)?);
            } else {
                println!("{}", post.format("# {title}\n{author} | {date} | {read_time}\n"));
                println!("{}", post.content);
            }
        }

        Command::Browse { query, categories } => {
            let posts = blog.load_cached().await;
            let selection = CategorySelection::of(&categories);
            let found = pipeline::browse(&posts, &query, &selection);
            log::info!("{} of {} posts match", found.len(), posts.len());
            print_posts(&found, cli.json)?;
        }

        Command::Categories => {
            let posts = blog.load_cached().await;
            let counts = pipeline::category_counts(&posts);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&counts)?);
            } else {
                for (category, count) in counts {
                    println!("{count:>4}  {category}");
                }
            }
        }

        Command::Validate => unreachable!("handled before the pipeline is built"),

        Command::Cache { action } => {
            let Some(cache) = blog.cache() else {
                return Err(AppError::config("no cache configured"));
            };

            match action {
                CacheAction::Info => match cache.status_at(Utc::now()).await {
                    Ok(Some(status)) => {
                        log::info!("Cache key: {}", cache.key());
                        log::info!("Posts: {}", status.count);
                        log::info!("Written at: {}", status.written_at.to_rfc3339());
                        log::info!("Expired: {}", status.expired);
                    }
                    Ok(None) => log::info!("No cached snapshot."),
                    Err(e) => log::warn!("Cached snapshot is unreadable: {}", e),
                },
                CacheAction::Clear => {
                    cache.clear().await?;
                    log::info!("Cleared cache entry {:?}", cache.key());
                }
            }
        }
    }

    Ok(())
}
