use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::config::Config;
use crate::export::write_outcome;
use crate::ingest::{read_known_urls, read_postings, read_profile};
use crate::matching::{rank_postings, DEFAULT_TOP_N};
use crate::pipeline::titles::suggest_titles;
use crate::pipeline::{run_pipeline, PipelineContext};
use crate::routes::build_router;
use crate::state::AppState;

#[derive(Parser, Debug)]
#[command(
    name = "jobsift",
    about = "Filter, score and summarize scraped job postings against a candidate profile",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Run the pipeline once over a scraped batch
    Run(RunArgs),
    /// Suggest search titles for the scraper from a candidate profile
    SuggestTitles(SuggestTitlesArgs),
    /// Rank postings by keyword similarity to the resume, without any LLM calls
    Rank(RankArgs),
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Scraped postings (.csv or .json)
    #[arg(long)]
    postings: PathBuf,
    /// Candidate profile (.json)
    #[arg(long)]
    profile: PathBuf,
    /// Previously seen URLs (.csv or .json)
    #[arg(long)]
    known_urls: Option<PathBuf>,
    /// Where to write results (.csv or .json). Prints JSON to stdout when omitted.
    #[arg(long)]
    output: Option<PathBuf>,
    /// Keep only the first N postings that survive filtering
    #[arg(long)]
    max_postings: Option<usize>,
    /// Skip the summary and requirements questions for retained postings
    #[arg(long)]
    no_enrich: bool,
}

#[derive(Args, Debug)]
struct SuggestTitlesArgs {
    /// Candidate profile (.json)
    #[arg(long)]
    profile: PathBuf,
}

#[derive(Args, Debug)]
struct RankArgs {
    /// Scraped postings (.csv or .json)
    #[arg(long)]
    postings: PathBuf,
    /// Candidate profile (.json)
    #[arg(long)]
    profile: PathBuf,
    /// How many of the closest postings to print
    #[arg(long, default_value_t = DEFAULT_TOP_N)]
    top: usize,
}

impl Cli {
    pub async fn run(self, config: Config) -> Result<()> {
        let command = self
            .command
            .unwrap_or_else(|| Command::Serve(ServeArgs {
                host: "0.0.0.0".to_string(),
                port: None,
            }));

        match command {
            Command::Serve(args) => serve(config, args).await,
            Command::Run(args) => run_batch(config, args).await,
            Command::SuggestTitles(args) => print_titles(config, args).await,
            Command::Rank(args) => print_ranking(args),
        }
    }
}

async fn serve(config: Config, args: ServeArgs) -> Result<()> {
    let gateway = config.build_gateway();
    info!(
        "Reasoning gateway initialized (provider: {}, models: {} / {})",
        gateway.provider_name(),
        config.fast_model,
        config.structured_model
    );

    let state = AppState {
        gateway,
        pipeline: config.pipeline.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let port = args.port.unwrap_or(config.port);
    let addr: SocketAddr = format!("{}:{}", args.host, port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", args.host, port))?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn run_batch(config: Config, args: RunArgs) -> Result<()> {
    let postings = read_postings(&args.postings)?;
    let profile = read_profile(&args.profile)?;
    let known = match &args.known_urls {
        Some(path) => read_known_urls(path)?,
        None => Vec::new(),
    };

    let mut pipeline = config.pipeline.clone();
    if args.max_postings.is_some() {
        pipeline.max_postings = args.max_postings;
    }
    if args.no_enrich {
        pipeline.enrich = false;
    }

    let gateway = config.build_gateway();
    let ctx = PipelineContext::new(profile, pipeline, &known);
    let outcome = run_pipeline(&gateway, &ctx, postings).await;

    match &args.output {
        Some(path) => write_outcome(path, &outcome)?,
        None => println!(
            "{}",
            serde_json::to_string_pretty(&outcome).context("Failed to serialize outcome")?
        ),
    }

    Ok(())
}

async fn print_titles(config: Config, args: SuggestTitlesArgs) -> Result<()> {
    let profile = read_profile(&args.profile)?;
    let gateway = config.build_gateway();
    let titles = suggest_titles(&gateway, &profile).await;
    if titles.is_empty() {
        anyhow::bail!("No title suggestions were produced");
    }
    for title in titles {
        println!("{title}");
    }
    Ok(())
}

fn print_ranking(args: RankArgs) -> Result<()> {
    let postings = read_postings(&args.postings)?;
    let profile = read_profile(&args.profile)?;
    let ranked = rank_postings(&profile.resume, &postings, args.top);
    info!("Ranked {} postings; printing the top {}", postings.len(), ranked.len());
    println!(
        "{}",
        serde_json::to_string_pretty(&ranked).context("Failed to serialize ranking")?
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_arguments_parse() {
        let cli = Cli::try_parse_from([
            "jobsift",
            "run",
            "--postings",
            "jobs.csv",
            "--profile",
            "me.json",
            "--max-postings",
            "10",
            "--no-enrich",
        ])
        .unwrap();

        match cli.command {
            Some(Command::Run(args)) => {
                assert_eq!(args.postings, PathBuf::from("jobs.csv"));
                assert_eq!(args.max_postings, Some(10));
                assert!(args.no_enrich);
                assert!(args.output.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["jobsift"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_serve_port_override() {
        let cli = Cli::try_parse_from(["jobsift", "serve", "--port", "9100"]).unwrap();
        match cli.command {
            Some(Command::Serve(args)) => {
                assert_eq!(args.port, Some(9100));
                assert_eq!(args.host, "0.0.0.0");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_rank_arguments_parse() {
        let cli = Cli::try_parse_from([
            "jobsift", "rank", "--postings", "jobs.json", "--profile", "me.json",
        ])
        .unwrap();
        match cli.command {
            Some(Command::Rank(args)) => {
                assert_eq!(args.postings, PathBuf::from("jobs.json"));
                assert_eq!(args.top, DEFAULT_TOP_N);
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let cli = Cli::try_parse_from([
            "jobsift", "rank", "--postings", "a.csv", "--profile", "b.json", "--top", "3",
        ])
        .unwrap();
        assert!(matches!(cli.command, Some(Command::Rank(args)) if args.top == 3));
    }
}
