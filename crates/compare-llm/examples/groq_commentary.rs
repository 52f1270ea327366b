//! Ask a hosted model for a one-paragraph company comparison
//!
//! Run with `GROQ_API_KEY` set (or `OPENAI_API_KEY` plus `LLM_API_BASE`):
//!
//! ```text
//! cargo run -p compare-llm --example groq_commentary -- AAPL MSFT
//! ```

use compare_llm::providers::OpenAIProvider;
use compare_llm::{CompletionRequest, LLMProvider, Message};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let first = args.next().unwrap_or_else(|| "AAPL".to_string());
    let second = args.next().unwrap_or_else(|| "TSLA".to_string());

    let provider = OpenAIProvider::from_env()?;
    println!("Provider: {} ({})", provider.name(), provider.config().api_base);

    let request = CompletionRequest::builder("llama3-70b-8192")
        .system("You are a financial expert. Answer in one short paragraph.")
        .add_message(Message::user(format!(
            "Which looks more promising for an investment today, {first} or {second}?"
        )))
        .max_tokens(300)
        .temperature(0.7)
        .build();

    let response = provider.complete(request).await?;
    println!("\n{}", response.text());
    println!(
        "\n[{} tokens, stop: {:?}]",
        response.usage.total(),
        response.stop_reason
    );

    Ok(())
}
