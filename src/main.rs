mod api;
mod llm;
mod logging;
mod lunarcrush;
mod server;

use clap::{Args, Parser, Subcommand};
use std::io::{self, Read};
use std::path::Path;
use viralcast::config::EstimatorConfig;
use viralcast::{
    estimate, format_number, format_percent, ContentType, CreatorProfile, Platform, PostInput,
};

#[derive(Parser)]
#[command(name = "viralcast", about = "Social post viral probability estimator")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    Estimate(EstimateArgs),
    Serve(ServeArgs),
}

#[derive(Args, Debug, Clone)]
struct EstimateArgs {
    #[arg(long)]
    text: Option<String>,
    #[arg(long, default_value = "twitter")]
    platform: String,
    #[arg(long, default_value = "text")]
    content_type: String,
    #[arg(long, value_delimiter = ',')]
    hashtags: Vec<String>,
    #[arg(long, default_value_t = 0)]
    media_count: u32,
    #[arg(long)]
    handle: Option<String>,
    #[arg(long)]
    followers: Option<u64>,
    #[arg(long, default_value_t = 0)]
    engagements: u64,
    #[arg(long)]
    verified: bool,
    #[arg(long)]
    lunarcrush: bool,
    #[arg(long)]
    ai: bool,
    #[arg(long)]
    ai_model: Option<String>,
    #[arg(long)]
    details: bool,
}

impl Default for EstimateArgs {
    fn default() -> Self {
        Self {
            text: None,
            platform: "twitter".to_string(),
            content_type: "text".to_string(),
            hashtags: Vec::new(),
            media_count: 0,
            handle: None,
            followers: None,
            engagements: 0,
            verified: false,
            lunarcrush: false,
            ai: false,
            ai_model: None,
            details: false,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
    #[arg(long, default_value_t = 8787)]
    port: u16,
    #[arg(long, default_value = "../webapp/dist")]
    web_root: String,
}

#[tokio::main]
async fn main() {
    load_dotenv();
    logging::init(&std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()));
    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or(Command::Estimate(EstimateArgs::default()));

    match command {
        Command::Estimate(args) => run_estimate(args).await,
        Command::Serve(args) => server::serve(args).await,
    }
}

async fn run_estimate(args: EstimateArgs) -> Result<(), String> {
    let config = EstimatorConfig::load(None)
        .map(|(config, _)| config)
        .unwrap_or_default();

    let mut input = PostInput::default();
    input.platform = Platform::from_str(&args.platform)
        .ok_or_else(|| format!("invalid platform: {}", args.platform))?;
    input.content_type = ContentType::from_str(&args.content_type)
        .ok_or_else(|| format!("invalid content type: {}", args.content_type))?;
    input.hashtags = args.hashtags;
    input.media_count = args.media_count;
    input.text = read_text(args.text)?;

    let creator = resolve_creator(&args.handle, args.followers, args.engagements, args.verified);
    let creator = match creator {
        Some(profile) => Some(profile),
        None if args.lunarcrush => {
            let handle = args
                .handle
                .as_deref()
                .ok_or_else(|| "pass --handle to look up a creator".to_string())?;
            let client = lunarcrush::LunarCrushClient::from_env(&config.lunarcrush)
                .ok_or_else(|| "LUNARCRUSH_API_KEY is not set".to_string())?;
            let profile = client
                .lookup(input.platform.network(), handle)
                .await
                .map_err(|err| err.to_string())?;
            Some(profile)
        }
        None => None,
    };

    let llm_outcome = if args.ai {
        let client = llm::GeminiClient::from_env(&config.gemini, args.ai_model)
            .ok_or_else(|| "GEMINI_API_KEY is not set".to_string())?;
        Some(
            client
                .analyze(&input, creator.as_ref(), &config.trending.topics)
                .await?,
        )
    } else {
        None
    };

    let result = estimate(
        &input,
        creator.as_ref(),
        Some(&config.trending.topics),
        llm_outcome.as_ref().map(|outcome| &outcome.analysis),
        &config.scoring,
    );

    println!(
        "Viral probability: {}/100 ({})",
        result.viral_probability,
        result.category.label()
    );
    println!("Confidence: {}/100", result.confidence);
    match result.expected_reach {
        Some(reach) => println!("Expected reach: {}", format_number(reach as f64)),
        None => println!("Expected reach: n/a (no creator data)"),
    }
    println!("Source: {}", result.source.label());

    if !result.key_factors.is_empty() {
        println!("\nKey factors:");
        for factor in &result.key_factors {
            println!("- {}", factor);
        }
    }

    if !result.recommendations.is_empty() {
        println!("\nRecommendations:");
        for recommendation in &result.recommendations {
            println!("- {}: {}", recommendation.title, recommendation.description);
        }
    }

    if args.details {
        if let Some(profile) = creator.as_ref() {
            println!("\nCreator: @{} ({})", profile.handle, profile.tier().label());
            println!(
                "  followers: {} | engagements: {} | authority: {}",
                format_number(profile.follower_count as f64),
                format_number(profile.engagement_count as f64),
                format_percent(profile.authority_score)
            );
        }
        if let Some(outcome) = llm_outcome.as_ref() {
            println!(
                "\nAI analysis ({}, {}ms):",
                outcome.trace.model, outcome.trace.latency_ms
            );
            match outcome.analysis.viral_probability {
                Some(probability) => println!("  probability: {}/100", probability),
                None => println!("  probability: not extracted"),
            }
            if let Some(summary) = outcome.analysis.summary.as_ref() {
                println!("  summary: {}", summary);
            }
        }
    }

    Ok(())
}

fn resolve_creator(
    handle: &Option<String>,
    followers: Option<u64>,
    engagements: u64,
    verified: bool,
) -> Option<CreatorProfile> {
    let followers = followers?;
    Some(CreatorProfile::new(
        handle.clone().unwrap_or_else(|| "creator".to_string()),
        followers,
        engagements,
        verified,
    ))
}

fn read_text(arg: Option<String>) -> Result<String, String> {
    if let Some(text) = arg {
        if !text.trim().is_empty() {
            return Ok(text);
        }
    }

    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .map_err(|err| format!("failed reading stdin: {}", err))?;
    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Err("missing post text: pass --text or pipe stdin".to_string());
    }
    Ok(trimmed.to_string())
}

fn load_dotenv() {
    let _ = dotenvy::dotenv();
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let manifest_path = Path::new(manifest_dir).join(".env");
    let _ = dotenvy::from_path(manifest_path);
}
