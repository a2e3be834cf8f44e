//! # revagent CLI
//!
//! Review analysis for a product page, plus RecipeBot.
//!
//! Usage:
//!   revagent reviews list
//!   revagent reviews add --author <name> --rating <1-5> [--image <file>] <content>...
//!   revagent sentiment <id> | --all
//!   revagent keywords register <keyword>
//!   revagent keywords extract <id> | --all
//!   revagent keywords show [--keyword <k>]
//!   revagent moderate <id> | --all
//!   revagent recipe
//!
//! Examples:
//!   revagent -s demo reviews list
//!   revagent keywords register 배터리
//!   revagent --provider openai --model gpt-4o-mini sentiment --all

use clap::{Parser, Subcommand};
use revagent_agent::{
    AgentConfig, KeywordExtractor, ProductInfo, RecipeBot, ReviewModerator, SentimentAnalyzer,
};
use revagent_agent::tools::WebSearch;
use revagent_core::{
    highlight, phrases_for, save_image, AnalysisRecord, AnyProvider, KeywordAnalysis, KeywordRegistry, Marker,
    ModerationResult, ProviderConfig, ProviderType, Registration, Review, ReviewSession, SentimentResult,
    SessionManager,
};
use revagent_error::{Error, ErrorClass, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Sub-check model used with Anthropic when no tool model is given
const ANTHROPIC_TOOL_MODEL: &str = "claude-3-7-sonnet-20250219";

#[derive(Parser, Debug)]
#[command(name = "revagent")]
#[command(author, version, about = "revagent - review analysis agents")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Model provider: anthropic, openai or local
    #[arg(long, env = "REVAGENT_PROVIDER", default_value = "anthropic", global = true)]
    provider: String,

    /// Model for the main agents (provider default when unset)
    #[arg(long, env = "REVAGENT_MODEL", global = true)]
    model: Option<String>,

    /// Model for the moderation sub-checks
    #[arg(long, global = true)]
    tool_model: Option<String>,

    /// API key (falls back to ANTHROPIC_API_KEY or OPENAI_API_KEY)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Provider base URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Directory for sessions, images and the keyword registry
    #[arg(long, default_value = ".revagent", global = true)]
    data_dir: PathBuf,

    /// Session ID
    #[arg(short, long, default_value = "default", global = true)]
    session: String,

    /// Product name shown to the moderator
    #[arg(long, default_value = "프리미엄 무선 이어폰", global = true)]
    product: String,

    /// Product category shown to the moderator
    #[arg(long, default_value = "전자기기", global = true)]
    category: String,

    /// Verbose output (tool calls, raw responses, info logs)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode - only show results
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage reviews
    Reviews {
        #[command(subcommand)]
        action: ReviewsAction,
    },
    /// Analyze review sentiment
    Sentiment {
        /// Review id
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        id: Option<u64>,
        /// Analyze every review
        #[arg(long)]
        all: bool,
    },
    /// Keyword registry and matching
    Keywords {
        #[command(subcommand)]
        action: KeywordsAction,
    },
    /// Moderate reviews
    Moderate {
        /// Review id
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        id: Option<u64>,
        /// Moderate every review
        #[arg(long)]
        all: bool,
    },
    /// Chat with RecipeBot
    Recipe {
        /// Search endpoint base URL
        #[arg(long)]
        search_url: Option<String>,
    },
    /// Manage sessions
    Sessions {
        #[command(subcommand)]
        action: SessionsAction,
    },
}

#[derive(Subcommand, Debug)]
enum ReviewsAction {
    /// List reviews, newest first
    List,
    /// Add a review
    Add {
        #[arg(long)]
        author: String,
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
        rating: u8,
        /// Image file attached to the review
        #[arg(long)]
        image: Option<PathBuf>,
        /// Review text
        #[arg(trailing_var_arg = true, required = true)]
        content: Vec<String>,
    },
    /// Show one review with its analysis records
    Show { id: u64 },
    /// Replace the session's reviews with the sample reviews
    Seed,
}

#[derive(Subcommand, Debug)]
enum KeywordsAction {
    /// List registered keywords
    List,
    /// Register a keyword
    Register { keyword: String },
    /// Match reviews against the registered keywords
    Extract {
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        id: Option<u64>,
        #[arg(long)]
        all: bool,
    },
    /// Show reviews with matched phrases highlighted
    Show {
        /// Only reviews matching this keyword
        #[arg(short, long)]
        keyword: Option<String>,
        /// Use <mark></mark> instead of terminal colors
        #[arg(long)]
        markup: bool,
    },
}

#[derive(Subcommand, Debug)]
enum SessionsAction {
    /// List stored sessions
    List,
    /// Delete the current session; the next command starts from the samples
    Reset,
}

// ============================================================================
// Setup
// ============================================================================

fn init_logging(verbose: bool, quiet: bool) {
    let default = if verbose {
        "info"
    } else if quiet {
        "error"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn api_key(cli: &Cli, provider_type: ProviderType) -> Result<String> {
    let var = match provider_type {
        ProviderType::OpenAI => "OPENAI_API_KEY",
        _ => "ANTHROPIC_API_KEY",
    };
    cli.api_key
        .clone()
        .or_else(|| std::env::var(var).ok())
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| {
            Error::config_invalid(format!("missing API key: pass --api-key or set {}", var))
                .with_operation("cli::api_key")
        })
}

fn provider_config(cli: &Cli) -> Result<ProviderConfig> {
    let provider_type: ProviderType = cli.provider.parse()?;
    let mut config = match provider_type {
        ProviderType::OpenAI => ProviderConfig::openai(api_key(cli, provider_type)?),
        ProviderType::Anthropic => ProviderConfig::anthropic(api_key(cli, provider_type)?),
        ProviderType::Local => {
            let base_url = cli.base_url.as_deref().unwrap_or("http://localhost:11434/v1");
            let model = cli.model.as_deref().unwrap_or("llama3.2");
            ProviderConfig::local(base_url, model)
        }
    };
    if let Some(url) = &cli.base_url {
        config = config.with_base_url(url.as_str());
    }
    if let Some(model) = &cli.model {
        config = config.with_model(model.as_str());
    }
    Ok(config)
}

fn build_provider(cli: &Cli) -> Result<AnyProvider> {
    let config = provider_config(cli)?;
    tracing::info!(provider = ?config.provider_type, model = ?config.default_model, "provider configured");
    AnyProvider::from_config(config)
}

fn agent_config(cli: &Cli, provider_type: ProviderType) -> AgentConfig {
    let mut config = AgentConfig {
        verbose: cli.verbose,
        ..AgentConfig::default()
    };
    if let Some(model) = &cli.model {
        config = config.with_model(model.as_str());
    }
    match (&cli.tool_model, provider_type) {
        (Some(model), _) => config = config.with_tool_model(model.as_str()),
        (None, ProviderType::Anthropic) => config = config.with_tool_model(ANTHROPIC_TOOL_MODEL),
        _ => {}
    }
    config
}

fn registry(cli: &Cli) -> KeywordRegistry {
    KeywordRegistry::new(cli.data_dir.join("registered_keywords.txt"))
}

/// Add a review, copying its image under `<data_dir>/images`.
///
/// The copied image is removed again when the review is rejected.
fn add_review(
    session: &mut ReviewSession,
    data_dir: &Path,
    author: &str,
    content: &str,
    rating: u8,
    image: Option<&Path>,
) -> Result<u64> {
    let image_path = match image {
        Some(file) => {
            let bytes = std::fs::read(file).map_err(|e| {
                Error::from(e)
                    .with_operation("cli::reviews_add")
                    .with_context("path", file.display().to_string())
            })?;
            Some(save_image(&bytes, data_dir.join("images"))?)
        }
        None => None,
    };
    match session.add_review(author, content, rating, image_path.clone()) {
        Ok(review) => Ok(review.id),
        Err(e) => {
            if let Some(saved) = &image_path {
                if let Err(remove) = std::fs::remove_file(saved) {
                    tracing::warn!(path = %saved.display(), error = %remove, "orphan image left behind");
                }
            }
            Err(e)
        }
    }
}

/// Ids to analyze: one review or all of them in list order
fn target_ids(session: &ReviewSession, id: Option<u64>, all: bool) -> Result<Vec<u64>> {
    if all {
        return Ok(session.reviews_newest_first().map(|r| r.id).collect());
    }
    match id {
        Some(id) => {
            session.review(id)?;
            Ok(vec![id])
        }
        None => Err(Error::invalid_argument("give a review id or --all")),
    }
}

// ============================================================================
// Rendering
// ============================================================================

fn review_header(review: &Review) -> String {
    format!(
        "#{} {} {:<5} {}",
        review.id,
        review.author,
        review.stars(),
        review.timestamp
    )
}

fn sentiment_line(record: &AnalysisRecord<SentimentResult>) -> String {
    let s = &record.payload;
    let mut line = format!(
        "sentiment: {} (score {:+.2}, confidence {:.2})",
        s.sentiment, s.score, s.confidence
    );
    if record.is_fallback() {
        line.push_str(" [fallback]");
    }
    line
}

fn keywords_line(record: &AnalysisRecord<KeywordAnalysis>) -> String {
    let keywords = record.payload.keywords();
    if keywords.is_empty() {
        "keywords: (none)".to_string()
    } else {
        format!("keywords: {}", keywords.join(", "))
    }
}

fn moderation_lines(record: &AnalysisRecord<ModerationResult>) -> Vec<String> {
    let m = &record.payload;
    let mut lines = vec![format!(
        "moderation: {}{}{}",
        m.overall_status,
        if m.failed_checks.is_empty() {
            String::new()
        } else {
            format!(" ({})", m.failed_checks.join(", "))
        },
        if record.is_fallback() { " [fallback]" } else { "" }
    )];
    for (name, check) in m.checks() {
        lines.push(format!(
            "  {:<18} {} {:.2} {}",
            name, check.status, check.confidence, check.reason
        ));
    }
    lines
}

fn print_review(session: &ReviewSession, review: &Review, verbose: bool) {
    println!("{}", review_header(review));
    println!("  {}", review.content);
    if let Some(path) = &review.image_path {
        println!("  image: {}", path.display());
    }
    if let Some(record) = session.sentiment(review.id) {
        println!("  {}", sentiment_line(record));
        if verbose {
            println!("    reason: {}", record.payload.reason);
        }
    }
    if let Some(record) = session.keywords(review.id) {
        println!("  {}", keywords_line(record));
    }
    if let Some(record) = session.moderation(review.id) {
        for line in moderation_lines(record) {
            println!("  {}", line);
        }
    }
}

fn print_raw(label: &str, record_raw: &str, created_at: String) {
    println!("  --- {} raw response ({}) ---", label, created_at);
    for line in record_raw.lines() {
        println!("  {}", line);
    }
}

// ============================================================================
// Commands
// ============================================================================

fn run_reviews(cli: &Cli, manager: &SessionManager, action: &ReviewsAction) -> Result<()> {
    let mut session = manager.open(&cli.session)?;
    match action {
        ReviewsAction::List => {
            if !cli.quiet {
                println!(
                    "Session '{}': {} reviews, average rating {:.1}\n",
                    session.id,
                    session.reviews().len(),
                    session.average_rating()
                );
            }
            for review in session.reviews_newest_first() {
                print_review(&session, review, cli.verbose);
                println!();
            }
        }
        ReviewsAction::Add {
            author,
            rating,
            image,
            content,
        } => {
            let id = add_review(
                &mut session,
                &cli.data_dir,
                author,
                &content.join(" "),
                *rating,
                image.as_deref(),
            )?;
            manager.save(&session)?;
            println!("Added review #{}", id);
        }
        ReviewsAction::Show { id } => {
            let review = session.review(*id)?;
            print_review(&session, review, true);
            if cli.verbose {
                if let Some(r) = session.sentiment(*id) {
                    print_raw("sentiment", &r.raw_response, r.created_at_display());
                }
                if let Some(r) = session.keywords(*id) {
                    print_raw("keywords", &r.raw_response, r.created_at_display());
                }
                if let Some(r) = session.moderation(*id) {
                    print_raw("moderation", &r.raw_response, r.created_at_display());
                }
            }
        }
        ReviewsAction::Seed => {
            session = ReviewSession::sample(cli.session.as_str());
            manager.save(&session)?;
            println!("Session '{}' now holds {} sample reviews", session.id, session.reviews().len());
        }
    }
    Ok(())
}

async fn run_sentiment(cli: &Cli, manager: &SessionManager, id: Option<u64>, all: bool) -> Result<()> {
    let mut session = manager.open(&cli.session)?;
    let ids = target_ids(&session, id, all)?;
    let provider = build_provider(cli)?;
    let config = agent_config(cli, cli.provider.parse()?);
    let analyzer = SentimentAnalyzer::new(&provider, config);

    for id in ids {
        if !cli.quiet {
            println!("Analyzing review #{}...", id);
        }
        let record = analyzer.analyze_review(&mut session, id).await?;
        manager.save(&session)?;
        println!("#{} {}", id, sentiment_line(&record));
        println!("   {}", record.payload.reason);
        if let Some(error) = record.error() {
            eprintln!("   analysis failed: {}", error);
        }
    }
    Ok(())
}

async fn run_keywords(cli: &Cli, manager: &SessionManager, action: &KeywordsAction) -> Result<()> {
    match action {
        KeywordsAction::List => {
            let keywords = registry(cli).list()?;
            if keywords.is_empty() {
                println!("(no keywords registered)");
            }
            for keyword in keywords {
                println!("  - {}", keyword);
            }
        }
        KeywordsAction::Register { keyword } => match registry(cli).register(keyword)? {
            Registration::Registered { keyword, total } => {
                println!("Registered '{}' ({} keywords)", keyword, total)
            }
            Registration::AlreadyExists { keyword, total } => {
                println!("'{}' is already registered ({} keywords)", keyword, total)
            }
        },
        KeywordsAction::Extract { id, all } => {
            let mut session = manager.open(&cli.session)?;
            let ids = target_ids(&session, *id, *all)?;
            let provider = build_provider(cli)?;
            let config = agent_config(cli, cli.provider.parse()?);
            let extractor = KeywordExtractor::new(&provider, config, registry(cli));
            if extractor.list()?.is_empty() && !cli.quiet {
                println!("No keywords registered yet; use `revagent keywords register <keyword>`");
            }

            for id in ids {
                let record = extractor.analyze_review(&mut session, id).await?;
                manager.save(&session)?;
                println!("#{} {}", id, keywords_line(&record));
                for m in &record.payload.matched_keywords {
                    println!("   {} [{}] \"{}\"", m.keyword, m.match_type.as_str(), m.original_phrase);
                }
                if let Some(error) = record.error() {
                    eprintln!("   analysis failed: {}", error);
                }
            }
        }
        KeywordsAction::Show { keyword, markup } => {
            let session = manager.open(&cli.session)?;
            let marker = if *markup { Marker::default() } else { Marker::ansi() };
            let reviews: Vec<&Review> = match keyword {
                Some(k) => session.reviews_matching_keyword(k),
                None => session
                    .reviews_newest_first()
                    .filter(|r| session.keywords(r.id).is_some())
                    .collect(),
            };
            if reviews.is_empty() && !cli.quiet {
                println!("(no analyzed reviews)");
            }
            for review in reviews {
                let Some(record) = session.keywords(review.id) else {
                    continue;
                };
                let phrases = phrases_for(&record.payload, keyword.as_deref());
                println!("{}", review_header(review));
                println!("  {}", highlight(&review.content, &phrases, &marker));
                println!("  {}\n", keywords_line(record));
            }
        }
    }
    Ok(())
}

async fn run_moderate(cli: &Cli, manager: &SessionManager, id: Option<u64>, all: bool) -> Result<()> {
    let mut session = manager.open(&cli.session)?;
    let ids = target_ids(&session, id, all)?;
    let provider = build_provider(cli)?;
    let config = agent_config(cli, cli.provider.parse()?);
    let product = ProductInfo::new(cli.product.as_str(), cli.category.as_str());
    let moderator = ReviewModerator::new(&provider, config, product);

    for id in ids {
        if !cli.quiet {
            println!("Moderating review #{}...", id);
        }
        let record = moderator.moderate_review(&mut session, id).await?;
        manager.save(&session)?;
        println!("#{}", id);
        for line in moderation_lines(&record) {
            println!("   {}", line);
        }
        if let Some(error) = record.error() {
            eprintln!("   moderation failed: {}", error);
        }
    }
    Ok(())
}

async fn run_recipe(cli: &Cli, search_url: Option<&str>) -> Result<()> {
    let provider = build_provider(cli)?;
    let config = agent_config(cli, cli.provider.parse()?);
    let search = match search_url {
        Some(url) => WebSearch::with_base_url(url),
        None => WebSearch::new(),
    };
    let mut bot = RecipeBot::new(&provider, config, search);

    println!("\n👨‍🍳 RecipeBot: Ask me about recipes or cooking! Type 'exit' to quit.\n");
    let stdin = std::io::stdin();
    loop {
        print!("\nYou > ");
        std::io::stdout().flush().map_err(Error::from)?;

        let mut input = String::new();
        if stdin.read_line(&mut input).map_err(Error::from)? == 0 {
            break;
        }
        let input = input.trim();
        if input.eq_ignore_ascii_case("exit") {
            println!("Happy cooking! 🍽️");
            break;
        }
        if input.is_empty() {
            continue;
        }

        match bot.ask(input).await {
            Ok(answer) => println!("\nRecipeBot > {}", answer),
            Err(e) => eprintln!("\nError: {}", e),
        }
    }
    Ok(())
}

fn run_sessions(cli: &Cli, manager: &SessionManager, action: &SessionsAction) -> Result<()> {
    match action {
        SessionsAction::List => {
            let sessions = manager.list()?;
            println!("Sessions in {} ({}):", cli.data_dir.display(), manager.backend_name());
            if sessions.is_empty() {
                println!("  (no sessions found)");
            }
            for id in sessions {
                let marker = if id == cli.session { "*" } else { "-" };
                println!("  {} {}", marker, id);
            }
        }
        SessionsAction::Reset => {
            manager.delete(&cli.session)?;
            println!("Session '{}' deleted", cli.session);
        }
    }
    Ok(())
}

async fn run(cli: &Cli) -> Result<()> {
    let manager = SessionManager::new(&cli.data_dir)?;
    match &cli.command {
        Commands::Reviews { action } => run_reviews(cli, &manager, action),
        Commands::Sentiment { id, all } => run_sentiment(cli, &manager, *id, *all).await,
        Commands::Keywords { action } => run_keywords(cli, &manager, action).await,
        Commands::Moderate { id, all } => run_moderate(cli, &manager, *id, *all).await,
        Commands::Recipe { search_url } => run_recipe(cli, search_url.as_deref()).await,
        Commands::Sessions { action } => run_sessions(cli, &manager, action),
    }
}

/// Input errors exit like usage errors; the rest exit with 1
fn exit_code(error: &Error) -> i32 {
    match error.class() {
        ErrorClass::Input => 2,
        ErrorClass::Provider | ErrorClass::SchemaMismatch | ErrorClass::Resource => 1,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    if let Err(e) = run(&cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(exit_code(&e));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use revagent_core::{Extraction, InvocationError, KeywordMatch, MatchType, SentimentLabel};
    use revagent_error::ErrorKind;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&["revagent", "reviews", "list"]);
        assert_eq!(cli.data_dir, PathBuf::from(".revagent"));
        assert_eq!(cli.session, "default");
        assert_eq!(cli.product, "프리미엄 무선 이어폰");
        assert_eq!(cli.category, "전자기기");
        assert!(matches!(cli.command, Commands::Reviews { action: ReviewsAction::List }));
    }

    #[test]
    fn test_review_add() {
        let cli = parse(&[
            "revagent", "-s", "demo", "reviews", "add", "--author", "정하늘", "--rating", "2", "음질이", "별로예요",
        ]);
        assert_eq!(cli.session, "demo");
        let Commands::Reviews {
            action: ReviewsAction::Add { author, rating, content, image },
        } = cli.command
        else {
            panic!("expected reviews add");
        };
        assert_eq!(author, "정하늘");
        assert_eq!(rating, 2);
        assert_eq!(content.join(" "), "음질이 별로예요");
        assert!(image.is_none());
    }

    #[test]
    fn test_rating_range_enforced() {
        let result = Cli::try_parse_from(["revagent", "reviews", "add", "--author", "a", "--rating", "6", "x"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_id_or_all() {
        assert!(Cli::try_parse_from(["revagent", "sentiment"]).is_err());
        assert!(Cli::try_parse_from(["revagent", "sentiment", "3", "--all"]).is_err());
        let cli = parse(&["revagent", "moderate", "--all"]);
        assert!(matches!(cli.command, Commands::Moderate { id: None, all: true }));
        let cli = parse(&["revagent", "keywords", "extract", "4"]);
        assert!(matches!(
            cli.command,
            Commands::Keywords { action: KeywordsAction::Extract { id: Some(4), all: false } }
        ));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = parse(&["revagent", "keywords", "show", "--keyword", "배터리", "--provider", "openai", "-v"]);
        assert_eq!(cli.provider, "openai");
        assert!(cli.verbose);
    }

    #[test]
    fn test_local_provider_needs_no_key() {
        let cli = parse(&["revagent", "--provider", "local", "--model", "qwen2.5", "recipe"]);
        let config = provider_config(&cli).unwrap();
        assert_eq!(config.provider_type, ProviderType::Local);
        assert_eq!(config.default_model.as_deref(), Some("qwen2.5"));
        assert!(agent_config(&cli, config.provider_type).tool_model.is_none());
    }

    #[test]
    fn test_anthropic_tool_model_default() {
        let cli = parse(&["revagent", "--api-key", "k", "moderate", "1"]);
        let config = agent_config(&cli, ProviderType::Anthropic);
        assert_eq!(config.tool_model.as_deref(), Some(ANTHROPIC_TOOL_MODEL));
        let cli = parse(&["revagent", "--api-key", "k", "--tool-model", "m", "moderate", "1"]);
        assert_eq!(agent_config(&cli, ProviderType::Anthropic).tool_model.as_deref(), Some("m"));
    }

    #[test]
    fn test_unknown_provider() {
        let cli = parse(&["revagent", "--provider", "bedrock", "recipe"]);
        assert_eq!(provider_config(&cli).unwrap_err().kind(), ErrorKind::ConfigInvalid);
    }

    #[test]
    fn test_rejected_review_removes_image() {
        let dir = tempfile::TempDir::new().unwrap();
        let upload = dir.path().join("upload.png");
        std::fs::write(&upload, b"\x89PNG\r\n\x1a\n0000").unwrap();
        let data_dir = dir.path().join("data");
        let mut session = ReviewSession::sample("test");
        let before = session.reviews().len();

        let err = add_review(&mut session, &data_dir, "  ", "좋아요", 5, Some(&upload)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(exit_code(&err), 2);
        assert_eq!(session.reviews().len(), before);
        let images = std::fs::read_dir(data_dir.join("images")).unwrap().count();
        assert_eq!(images, 0);

        let id = add_review(&mut session, &data_dir, "정하늘", "좋아요", 5, Some(&upload)).unwrap();
        let saved = session.review(id).unwrap().image_path.clone().unwrap();
        assert!(saved.starts_with(data_dir.join("images")));
        assert!(saved.exists());
    }

    #[test]
    fn test_exit_code_by_class() {
        assert_eq!(exit_code(&Error::review_not_found(9)), 2);
        assert_eq!(exit_code(&Error::new(ErrorKind::RateLimited, "slow down")), 1);
        assert_eq!(exit_code(&Error::storage_failed("disk full")), 1);
    }

    #[test]
    fn test_target_ids() {
        let session = ReviewSession::sample("t");
        assert_eq!(target_ids(&session, None, true).unwrap(), vec![5, 4, 3, 2, 1]);
        assert_eq!(target_ids(&session, Some(2), false).unwrap(), vec![2]);
        assert_eq!(target_ids(&session, Some(9), false).unwrap_err().kind(), ErrorKind::ReviewNotFound);
    }

    #[test]
    fn test_render_lines() {
        let sentiment = AnalysisRecord::from_extraction(
            Extraction::Parsed {
                value: SentimentResult {
                    sentiment: SentimentLabel::Positive,
                    score: 0.8,
                    confidence: 0.9,
                    reason: "만족".into(),
                },
                raw_response: String::new(),
            },
            "좋아요",
        );
        assert_eq!(sentiment_line(&sentiment), "sentiment: positive (score +0.80, confidence 0.90)");

        let keywords = AnalysisRecord::from_extraction(
            Extraction::Parsed {
                value: KeywordAnalysis {
                    matched_keywords: vec![KeywordMatch {
                        keyword: "배송".into(),
                        match_type: MatchType::Exact,
                        original_phrase: "빠른 배송".into(),
                    }],
                },
                raw_response: String::new(),
            },
            "빠른 배송",
        );
        assert_eq!(keywords_line(&keywords), "keywords: 배송");

        let failed: AnalysisRecord<ModerationResult> = AnalysisRecord::from_extraction(
            Extraction::Failed(InvocationError {
                kind: ErrorKind::ParseFailed,
                message: "no json".into(),
                raw_response: None,
            }),
            "리뷰",
        );
        let lines = moderation_lines(&failed);
        assert_eq!(lines[0], "moderation: FAIL (profanity_check, rating_consistency, image_match) [fallback]");
        assert_eq!(lines.len(), 4);
    }
}
