// src/main.rs
use clap::{Args, Parser, Subcommand};
use faq_extractor::ai::{self, AiOutput, AiSettings, Provider};
use faq_extractor::config::{FaqConfig, InsertPosition, PresentationStyle};
use faq_extractor::storage::{self, insert_block, Published, StorageManager};
use faq_extractor::utils::{self, html_debug, AppError};
use faq_extractor::utils::error::AiError;
use std::path::PathBuf;
use std::time::Duration;

const ENV_API_KEY: &str = "FAQ_AI_API_KEY";

/// Builds an FAQ block and FAQPage structured data from article HTML
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract FAQs from the document with the heuristic matchers
    Extract(CommonArgs),
    /// Ask an AI provider to write FAQs for the document
    Generate {
        #[command(flatten)]
        common: CommonArgs,

        /// AI provider: openai or openrouter
        #[arg(long, default_value = "openai")]
        provider: Provider,

        /// API key (falls back to FAQ_AI_API_KEY)
        #[arg(long)]
        api_key: Option<String>,

        /// Model name
        #[arg(long, default_value = ai::models::DEFAULT_MODEL)]
        model: String,

        /// Chat completions URL overriding the provider's default
        #[arg(long)]
        endpoint: Option<String>,

        /// Request timeout in seconds
        #[arg(long, default_value_t = ai::models::DEFAULT_TIMEOUT_SECS)]
        timeout_secs: u64,
    },
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// HTML file holding the article content
    #[arg(short, long)]
    input: PathBuf,

    /// Identifier the outputs are stored under ([A-Za-z0-9_-])
    #[arg(long)]
    doc_id: String,

    /// Output directory for generated FAQ files
    #[arg(short, long, default_value = "./output")]
    output_dir: PathBuf,

    /// JSON config file (presentation_style, min_items, insert_position, auto_insert)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Presentation style: disclosure or static
    #[arg(long)]
    style: Option<PresentationStyle>,

    /// Minimum number of FAQs required before anything is saved
    #[arg(long)]
    min_items: Option<usize>,

    /// Where to insert the block: prepend or append
    #[arg(long)]
    position: Option<InsertPosition>,

    /// Also write the document with the FAQ block inserted
    #[arg(long)]
    insert: bool,

    /// Print the block and JSON-LD script to stdout
    #[arg(long)]
    print: bool,

    /// Debug mode - save annotated HTML highlighting FAQ patterns
    #[arg(short, long)]
    debug: bool,
}

impl CommonArgs {
    /// Config file and environment, then CLI flags on top.
    fn resolve_config(&self) -> Result<FaqConfig, AppError> {
        let mut config = FaqConfig::load(self.config.as_deref())?;
        if let Some(style) = self.style {
            config.presentation_style = style;
        }
        if let Some(min_items) = self.min_items {
            config.min_items = min_items;
        }
        if let Some(position) = self.position {
            config.insert_position = position;
        }
        if self.insert {
            config.auto_insert = true;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let cli = Cli::parse();
    tracing::debug!("Parsed args: {:?}", cli);

    match cli.command {
        Command::Extract(common) => run_extract(&common),
        Command::Generate { common, provider, api_key, model, endpoint, timeout_secs } => {
            let settings = AiSettings {
                provider,
                api_key: api_key.or_else(|| std::env::var(ENV_API_KEY).ok()),
                model,
                timeout: Duration::from_secs(timeout_secs),
                endpoint,
                ..AiSettings::default()
            };
            run_generate(&common, &settings).await
        }
    }
}

fn run_extract(args: &CommonArgs) -> Result<(), AppError> {
    let config = args.resolve_config()?;
    let storage = StorageManager::new(&args.output_dir)?;
    let html = std::fs::read_to_string(&args.input)?;
    tracing::info!("Extracting FAQs from {} ({} bytes)", args.input.display(), html.len());

    if args.debug {
        let debug_path = storage.document_dir(&args.doc_id)?.join("debug").join("annotated.html");
        match html_debug::create_debug_html(&html, &debug_path, &html_debug::FAQ_DEBUG_PATTERNS) {
            Ok(count) => tracing::info!("Highlighted {} pattern match(es) in {}", count, debug_path.display()),
            Err(e) => tracing::warn!("Failed to create debug HTML: {}", e),
        }
    }

    let items = faq_extractor::extract(&html);
    tracing::info!("Found {} FAQ item(s)", items.len());

    let published = storage::publish(&storage, &config, &args.doc_id, &items, "extract")?;
    finish(args, &config, &storage, &html, published.as_ref())
}

async fn run_generate(args: &CommonArgs, settings: &AiSettings) -> Result<(), AppError> {
    let config = args.resolve_config()?;
    let storage = StorageManager::new(&args.output_dir)?;
    let html = std::fs::read_to_string(&args.input)?;

    // The request is bounded by its own timeout; Ctrl-C drops it early.
    let output = tokio::select! {
        result = ai::generate_faqs(settings, &html) => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupted, abandoning AI request");
            return Err(AiError::Cancelled.into());
        }
    };

    let published = match output {
        AiOutput::Items(items) => {
            if items.is_empty() {
                return Err(AppError::Processing("AI reply contained no usable FAQs".to_string()));
            }
            storage::publish(&storage, &config, &args.doc_id, &items, "ai")?
        }
        AiOutput::Raw(body) => {
            tracing::warn!("AI reply was not structured; saving it without FAQPage data");
            storage::publish_raw(&storage, &config, &args.doc_id, &body, "ai")?
        }
    };

    finish(args, &config, &storage, &html, published.as_ref())
}

/// Inserts and prints whatever was published; nothing when the gate held.
fn finish(
    args: &CommonArgs,
    config: &FaqConfig,
    storage: &StorageManager,
    html: &str,
    published: Option<&Published>,
) -> Result<(), AppError> {
    let Some(published) = published else {
        return Ok(());
    };
    tracing::info!("Saved {} FAQ item(s) to {}", published.item_count, published.dir.display());
    let rendered = published.rendered();

    if config.auto_insert {
        let document = insert_block(html, &rendered, config.insert_position);
        let path = storage.save_document(&args.doc_id, &document)?;
        tracing::info!("Inserted FAQ block ({:?}) into {}", config.insert_position, path.display());
    }
    if args.print {
        println!("{}", rendered);
    }
    Ok(())
}
