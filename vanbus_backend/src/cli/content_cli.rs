use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use vanbus_backend::config::Config;
use vanbus_backend::content::ContentPipeline;
use vanbus_backend::helper::public_helpers::{self, Origin, DEFAULT_LIST_LIMIT};
use vanbus_backend::models::{ContentItem, ListFilter};

#[derive(Parser, Debug)]
#[command(name = "content_cli", author, version, about = "Query the blog content sources from a shell.", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the .env configuration file.
    #[arg(long, required = true, value_name = "FILE")]
    env_file: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Posts {
        #[command(subcommand)]
        action: PostsAction,
    },
    Sources {
        #[command(subcommand)]
        action: SourcesAction,
    },
}

#[derive(Subcommand, Debug)]
enum PostsAction {
    /// List posts the way the site would show them.
    List {
        #[arg(long)]
        q: Option<String>,
        #[arg(long, default_value_t = DEFAULT_LIST_LIMIT)]
        limit: usize,
    },
    /// Show one post by slug.
    Get { slug: String },
}

#[derive(Subcommand, Debug)]
enum SourcesAction {
    /// Try every source once and report how it answered.
    Check,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::from_env(&cli.env_file) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    env_logger::init_from_env(env_logger::Env::new().default_filter_or(&config.log_level));

    let pipeline = match vanbus_backend::build_pipeline(&config) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            eprintln!("❌ Error building HTTP clients: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Posts { action } => match action {
            PostsAction::List { q, limit } => list_posts(&pipeline, q, limit).await,
            PostsAction::Get { slug } => get_post(&pipeline, &slug).await,
        },
        Commands::Sources { action } => match action {
            SourcesAction::Check => check_sources(&pipeline).await,
        },
    }
}

fn origin_label(origin: Origin) -> &'static str {
    match origin {
        Origin::Live => "live",
        Origin::Bundled => "bundled fallback",
    }
}

fn print_summary(post: &ContentItem) {
    let date = post
        .published_at
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "----------".to_string());
    println!(
        "{}  {:<50}  {} min  [{}]",
        date,
        post.slug,
        post.estimated_reading_minutes,
        post.categories.join(", ")
    );
}

async fn list_posts(pipeline: &ContentPipeline, q: Option<String>, limit: usize) -> ExitCode {
    let mut filter = ListFilter::default().limit(limit);
    if let Some(q) = q {
        filter = filter.search(q);
    }

    let listing = public_helpers::fetch_posts(pipeline, &filter).await;
    println!("{} post(s) from {}:", listing.posts.len(), origin_label(listing.origin));
    for post in &listing.posts {
        print_summary(post);
    }
    ExitCode::SUCCESS
}

async fn get_post(pipeline: &ContentPipeline, slug: &str) -> ExitCode {
    match public_helpers::fetch_post_by_slug(pipeline, slug).await {
        Some(detail) => match serde_json::to_string_pretty(&detail) {
            Ok(json) => {
                println!("{}", json);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("❌ Error encoding post: {}", e);
                ExitCode::FAILURE
            }
        },
        None => {
            eprintln!("❌ No post with slug '{}'.", slug);
            ExitCode::FAILURE
        }
    }
}

async fn check_sources(pipeline: &ContentPipeline) -> ExitCode {
    let reports = pipeline.probe().await;
    for report in &reports {
        match &report.error {
            None => println!(
                "✅ {:<16} {} item(s) in {} ms",
                report.source, report.item_count, report.elapsed_ms
            ),
            Some(error) => println!(
                "❌ {:<16} failed after {} ms: {}",
                report.source, report.elapsed_ms, error
            ),
        }
    }

    if reports.iter().any(|r| r.ok) {
        ExitCode::SUCCESS
    } else {
        eprintln!("ℹ️ No source answered; the site is serving bundled posts.");
        ExitCode::FAILURE
    }
}
