use std::{env, error::Error};

use semantic::{build_provider, RetryConfig, SemanticConfig};

/// Embeds one query through a remote provider and prints a short summary.
///
/// Defaults to OpenAI `text-embedding-3-small` with the key read from
/// `OPENAI_API_KEY`:
///
/// ```bash
/// OPENAI_API_KEY=sk-xxx cargo run -p rag-semantic --example api_embed -- "Which shrine has the most torii?"
/// ```
///
/// Point it at a Hugging Face feature-extraction endpoint instead:
///
/// ```bash
/// RAG_EMBED_PROVIDER=hf \
/// RAG_EMBED_API_URL=https://router.huggingface.co/hf-inference/models/BAAI/bge-small-en-v1.5/pipeline/feature-extraction \
/// RAG_EMBED_KEY_ENV=HF_TOKEN HF_TOKEN=hf_xxx \
/// cargo run -p rag-semantic --example api_embed -- "Some text"
/// ```
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let text = env::args()
        .skip(1)
        .collect::<Vec<_>>()
        .join(" ");
    let text = if text.is_empty() {
        "Which temple has the best autumn leaves?".to_string()
    } else {
        text
    };

    let mut cfg = SemanticConfig {
        retry_config: Some(RetryConfig::default()),
        ..SemanticConfig::default()
    };
    if let Ok(provider) = env::var("RAG_EMBED_PROVIDER") {
        cfg.api_provider = provider;
    }
    if let Ok(url) = env::var("RAG_EMBED_API_URL") {
        cfg.api_url = Some(url);
    }
    if let Ok(key_env) = env::var("RAG_EMBED_KEY_ENV") {
        cfg.api_key_env = Some(key_env);
    }

    let provider = build_provider(&cfg)?;
    let vector = provider.embed(&text).await?;

    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    println!("provider : {}", provider.name());
    println!("text     : {text}");
    println!("dims     : {}", vector.len());
    println!("l2 norm  : {norm:.4}");
    println!(
        "head     : {:?}",
        &vector[..vector.len().min(8)]
    );

    Ok(())
}
