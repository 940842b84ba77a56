mod analyze;
mod feedback;
mod generate;
mod scrape;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use postlens_generator::FeedbackFields;
use tracing_subscriber::EnvFilter;

use crate::feedback::FeedbackCommands;
use crate::scrape::PageSource;

#[derive(Debug, Parser)]
#[command(name = "postlens")]
#[command(about = "Scrape LinkedIn activity pages, analyze engagement trends and draft new posts")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract posts from saved profile activity pages
    Scrape {
        /// A profile URL and the saved HTML of its activity page (repeatable)
        #[arg(
            long = "page",
            value_name = "PROFILE_URL=HTML_FILE",
            value_parser = scrape::parse_page_arg,
            required = true
        )]
        pages: Vec<PageSource>,
        /// Raw posts table to write (defaults to `<data dir>/posts.csv`)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Enrich raw posts and compute the trend summary
    Analyze {
        /// Raw posts table (defaults to `<data dir>/posts.csv`)
        #[arg(long)]
        input: Option<PathBuf>,
        /// Enriched posts table (defaults to `<data dir>/posts_analyzed.csv`)
        #[arg(long)]
        posts_output: Option<PathBuf>,
        /// Trend summary (defaults to `<data dir>/trends.csv`)
        #[arg(long)]
        trends_output: Option<PathBuf>,
        /// Normalize only and print what would be analyzed, without calling the models
        #[arg(long)]
        dry_run: bool,
    },
    /// Print a saved trend summary
    Trends {
        /// Trend summary (defaults to `<data dir>/trends.csv`)
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Draft new posts from the trend summary
    Generate {
        /// Number of posts to draft
        #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..))]
        count: u32,
        /// Steer the prompt with stored reviewer feedback
        #[arg(long)]
        with_feedback: bool,
        /// Generated posts table (defaults to `<data dir>/generated_posts.csv`)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Record or list reviewer feedback on generated posts
    Feedback {
        #[command(subcommand)]
        command: FeedbackCommands,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    let config = postlens_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Some(Commands::Scrape { pages, output }) => {
            let output = output.unwrap_or_else(|| config.posts_path());
            scrape::run_scrape(&pages, &output)?;
        }
        Some(Commands::Analyze {
            input,
            posts_output,
            trends_output,
            dry_run,
        }) => {
            let paths = analyze::AnalyzePaths {
                input: input.unwrap_or_else(|| config.posts_path()),
                posts_output: posts_output.unwrap_or_else(|| config.analyzed_posts_path()),
                trends_output: trends_output.unwrap_or_else(|| config.trends_path()),
            };
            analyze::run_analyze(&config, &paths, dry_run).await?;
        }
        Some(Commands::Trends { input }) => {
            let input = input.unwrap_or_else(|| config.trends_path());
            analyze::run_trends(&input)?;
        }
        Some(Commands::Generate {
            count,
            with_feedback,
            output,
        }) => {
            let output = output.unwrap_or_else(|| config.generated_posts_path());
            generate::run_generate(&config, count, with_feedback, &output).await?;
        }
        Some(Commands::Feedback { command }) => {
            let path = config.feedback_path();
            match command {
                FeedbackCommands::Add {
                    post_id,
                    tone,
                    cta,
                    content,
                    other,
                } => {
                    let fields = FeedbackFields {
                        tone,
                        cta,
                        content,
                        other,
                    };
                    feedback::run_feedback_add(&path, &post_id, fields)?;
                }
                FeedbackCommands::List => feedback::run_feedback_list(&path),
            }
        }
        None => println!("no command given; run `postlens --help` for usage"),
    }

    Ok(())
}
