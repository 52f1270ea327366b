//! Command-line interface for stock-compare

use anyhow::Context;
use clap::{Parser, Subcommand};
use compare_llm::LLMProvider;
use compare_llm::providers::OpenAIProvider;
use compare_stock::format::{format_currency, format_percent};
use compare_stock::scoring::{ComponentKind, ScoreComponent};
use compare_stock::{
    AiCommentary, CompanyProfile, CompareConfig, ComparisonEngine, Language, Market,
    SessionStore,
};
use compare_utils::{LogFormat, env_flag, init_tracing};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "stock-compare", version)]
#[command(about = "Compare two listed companies: fundamentals, score, chart and AI commentary")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Output and prompt language (fr, en)
    #[arg(long, global = true)]
    lang: Option<Language>,

    /// Read fundamentals from <DIR>/<SYMBOL>.json instead of Yahoo Finance
    #[arg(long, global = true, value_name = "DIR")]
    offline: Option<PathBuf>,

    /// Session file used by `ask`
    #[arg(long, global = true, value_name = "PATH")]
    session: Option<PathBuf>,

    /// LLM model identifier
    #[arg(long, global = true)]
    model: Option<String>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log as JSON lines (also STOCK_COMPARE_LOG_JSON=1)
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compare two companies side by side
    Compare {
        #[arg(default_value = "AAPL")]
        first: String,
        #[arg(default_value = "TSLA")]
        second: String,
        /// Exchange of bare tickers (us, paris, london, ...)
        #[arg(long)]
        market: Option<Market>,
        /// Skip the LLM commentary
        #[arg(long)]
        no_ai: bool,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Ask a follow-up question about the last comparison
    Ask {
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
    /// Show the financial score breakdown of one company
    Score {
        ticker: String,
        #[arg(long)]
        market: Option<Market>,
        #[arg(long)]
        json: bool,
    },
}

impl Command {
    fn market(&self) -> Option<Market> {
        match self {
            Command::Compare { market, .. } | Command::Score { market, .. } => *market,
            Command::Ask { .. } => None,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "info,compare_stock=debug,compare_llm=debug"
    } else {
        "warn,compare_stock=info"
    };
    let format = if cli.log_json || env_flag("STOCK_COMPARE_LOG_JSON") {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    };
    init_tracing(filter, format);

    let config = build_config(&cli)?;
    let store = SessionStore::new(config.session_path.clone());
    let language = config.language;

    match cli.command {
        Command::Compare {
            first,
            second,
            no_ai,
            json,
            ..
        } => {
            let llm = if no_ai { None } else { llm_provider() };
            let engine = ComparisonEngine::from_config(config, llm)
                .context("Failed to set up the comparison engine")?;

            let report = if no_ai {
                engine.compare_data(&first, &second).await
            } else {
                engine.compare(&first, &second).await
            }
            .with_context(|| format!("Failed to compare {first} and {second}"))?;

            if let AiCommentary::Failed(error) = &report.commentary {
                warn!("AI commentary failed: {}", error);
            }

            let mut session = store.load().await.context("Failed to read the session")?;
            session.record(&report);
            store
                .save(&session)
                .await
                .with_context(|| format!("Failed to save session to {}", store.path().display()))?;

            if json {
                println!("{}", report.to_json()?);
            } else {
                println!("{report}");
            }
        }
        Command::Ask { question } => {
            let question = question.join(" ");
            let engine = ComparisonEngine::from_config(config, llm_provider())
                .context("Failed to set up the comparison engine")?;

            let session = store.load().await.context("Failed to read the session")?;
            if session.is_empty() {
                warn!("No previous comparison found; run `stock-compare compare` first");
            } else {
                info!("Asking about {}", session.tickers.join(" / "));
            }

            let answer = engine
                .ask(&question, &session)
                .await
                .context("Failed to get an answer")?;
            println!("{}\n\n{answer}", answer_title(language));
        }
        Command::Score { ticker, json, .. } => {
            let engine = ComparisonEngine::from_config(config, None)
                .context("Failed to set up the comparison engine")?;
            let profile = engine
                .score_one(&ticker)
                .await
                .with_context(|| format!("Failed to score {ticker}"))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&profile)?);
            } else {
                print_score(&profile, language);
            }
        }
    }

    Ok(())
}

fn build_config(cli: &Cli) -> anyhow::Result<CompareConfig> {
    let mut builder = CompareConfig::builder();
    if let Some(lang) = cli.lang {
        builder = builder.language(lang);
    }
    if let Some(dir) = &cli.offline {
        builder = builder.snapshot_dir(dir);
    }
    if let Some(path) = &cli.session {
        builder = builder.session_path(path);
    }
    if let Some(model) = &cli.model {
        builder = builder.model(model);
    }
    if let Some(market) = cli.command.market() {
        builder = builder.market(market);
    }

    builder
        .with_env()
        .build()
        .context("Invalid configuration")
}

fn llm_provider() -> Option<Arc<dyn LLMProvider>> {
    match OpenAIProvider::from_env() {
        Ok(provider) => Some(Arc::new(provider)),
        Err(e) => {
            warn!("AI commentary disabled: {}", e);
            None
        }
    }
}

fn print_score(profile: &CompanyProfile, language: Language) {
    println!("{} ({}): {}", profile.name, profile.symbol, profile.score);
    for component in &profile.score.components {
        println!(
            "  {:<18} {}/{}  {}",
            component.kind.label(language),
            component.points,
            component.max_points(),
            describe(component, language)
        );
    }
}

fn describe(component: &ScoreComponent, language: Language) -> String {
    match component.value {
        None => match language {
            Language::French => "(donnée inexploitable)".to_string(),
            Language::English => "(unusable input)".to_string(),
        },
        Some(v) => match component.kind {
            ComponentKind::NetMargin | ComponentKind::ReturnOnEquity => format_percent(v),
            ComponentKind::Leverage => format!("{v:.2}"),
            ComponentKind::FreeCashFlow => format_currency(Some(v), language),
        },
    }
}

fn answer_title(language: Language) -> &'static str {
    match language {
        Language::French => "Réponse à ta question :",
        Language::English => "Answer to your question:",
    }
}
