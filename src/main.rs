//! `rag` - ask questions against a precomputed embedding corpus.
//!
//! With `--query` the tool answers once and exits. Without it, it reads
//! questions from stdin until `exit` or end of input.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use rag::answer::{Answer, Answerer, OpenAiChat};
use rag::{RagConfig, RetrievalResult, Retriever};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "rag",
    about = "Answer questions from a precomputed embedding corpus"
)]
struct Cli {
    /// YAML configuration file (defaults apply when omitted)
    #[arg(long, short, env = "RAG_CONFIG")]
    config: Option<PathBuf>,

    /// Question to answer; omit for an interactive session
    #[arg(long, short)]
    query: Option<String>,

    /// Number of passages to retrieve (overrides retrieval.top_n)
    #[arg(long)]
    top_n: Option<usize>,

    /// Only print the retrieved context and references (skip the LLM call)
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// Print results as JSON
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, default_value_t = false)]
    log_json: bool,
}

enum Session {
    DryRun(Arc<Retriever>),
    Answer(Answerer),
}

impl Session {
    async fn ask(&self, query: &str, top_n: usize, json: bool) -> Result<()> {
        match self {
            Session::DryRun(retriever) => {
                let result = retriever.retrieve(query, top_n).await?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&result)?);
                } else {
                    print_retrieval(&result);
                }
            }
            Session::Answer(answerer) => {
                let answer = answerer.answer_with_top_n(query, top_n).await?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&answer)?);
                } else {
                    print_answer(&answer);
                }
            }
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let config = match &cli.config {
        Some(path) => RagConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => {
            let config = RagConfig::default();
            config.validate()?;
            config
        }
    };

    let top_n = cli.top_n.unwrap_or(config.retrieval.top_n);
    if top_n == 0 {
        bail!("--top-n must be at least 1");
    }

    let retriever = Arc::new(
        config
            .build_retriever()
            .context("failed to set up the embedding provider")?,
    );

    let session = if cli.dry_run {
        Session::DryRun(retriever)
    } else {
        let chat = OpenAiChat::new(&config.generation)
            .context("failed to set up the chat model (use --dry-run to skip generation)")?;
        Session::Answer(
            Answerer::new(retriever, Arc::new(chat))
                .with_template(config.generation.template.clone())
                .with_fallback_answer(config.generation.fallback_answer.clone()),
        )
    };

    match cli.query.as_deref() {
        Some(query) => session.ask(query, top_n, cli.json).await,
        None => interactive(&session, top_n, cli.json).await,
    }
}

async fn interactive(session: &Session, top_n: usize, json: bool) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("Enter a question (type 'exit' to quit): ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };
        let query = line.trim();
        if query.eq_ignore_ascii_case("exit") {
            println!("Bye.");
            break;
        }
        if query.is_empty() {
            continue;
        }

        if let Err(err) = session.ask(query, top_n, json).await {
            eprintln!("error: {err:#}");
        }
    }
    Ok(())
}

fn print_retrieval(result: &RetrievalResult) {
    println!("--- Retrieved Context ---");
    println!("{}", result.context);
    println!();
    println!("--- References ---");
    for hit in &result.scored {
        println!("{:.4}  {}  ({})", hit.similarity, hit.url, hit.title);
    }
    println!();
}

fn print_answer(answer: &Answer) {
    println!();
    println!("=== Answer ===");
    println!("{}", answer.text);
    println!();
    println!("=== Recommended articles ===");
    println!("{}", answer.references.join("\n"));
    println!();
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
