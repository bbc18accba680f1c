use std::error::Error;
use std::fs::File;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use llmfactory::core::config::{self, CliOverrides, ResolvedConfig};
use llmfactory::core::retry::{RetryPolicy, retry};
use llmfactory::core::similarity::cosine_similarity;
use llmfactory::inference::{
    Client, CompletionRequest, ProviderRegistry, get_completion, get_embeddings,
};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

const BOLD_BEGIN: &str = "\x1b[1m";
const BOLD_END: &str = "\x1b[0m";

#[derive(Parser)]
#[command(name = "llmfactory", about = "Ask any registered LLM provider the same way")]
struct Args {
    /// Registered provider name (openai, anthropic, ollama)
    #[arg(short, long, global = true)]
    provider: Option<String>,

    /// Model identifier passed to the provider
    #[arg(short, long, global = true)]
    model: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ask each prompt in turn and print the answers
    Complete {
        /// System text sent with every prompt
        #[arg(short, long)]
        system: Option<String>,

        #[arg(short, long)]
        temperature: Option<f32>,

        /// Total calls per prompt, including the first (1 disables retry)
        #[arg(short, long)]
        attempts: Option<u32>,

        #[arg(required = true)]
        prompts: Vec<String>,
    },
    /// Embed two sentences and print their cosine similarity
    Similarity { first: String, second: String },
    /// List registered provider names
    Providers,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to llmfactory.log in current directory
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    if let Ok(log_file) = File::create("llmfactory.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let registry = ProviderRegistry::with_defaults();

    let (system, temperature, attempts) = match &args.command {
        Command::Complete {
            system,
            temperature,
            attempts,
            ..
        } => (system.as_deref(), *temperature, *attempts),
        _ => (None, None, None),
    };
    let cli = CliOverrides {
        provider: args.provider.as_deref(),
        model: args.model.as_deref(),
        system_prompt: system,
        temperature,
        max_attempts: attempts,
    };
    let resolved = config::resolve(&config::load_config()?, &cli);

    log::info!(
        "llmfactory starting: provider={}, model={}",
        resolved.provider,
        resolved.model_name
    );

    match &args.command {
        Command::Providers => {
            for name in registry.names() {
                println!("{name}");
            }
            Ok(())
        }
        Command::Complete { prompts, .. } => {
            let client = build_client(&registry, &resolved)?;
            complete_all(client.as_ref(), &resolved, prompts).await
        }
        Command::Similarity { first, second } => {
            let client = build_client(&registry, &resolved)?;
            similarity(client.as_ref(), &resolved, args.model.as_deref(), first, second).await
        }
    }
}

fn build_client(
    registry: &ProviderRegistry,
    resolved: &ResolvedConfig,
) -> Result<Box<dyn Client>, Box<dyn Error>> {
    let params = resolved.client_params(&resolved.provider);
    Ok(registry.create(&resolved.provider, &params)?)
}

async fn complete_all(
    client: &dyn Client,
    resolved: &ResolvedConfig,
    prompts: &[String],
) -> Result<(), Box<dyn Error>> {
    let policy = RetryPolicy::default().with_max_attempts(resolved.max_attempts);
    println!("Using MODEL={}; provider={}", resolved.model_name, client.name());

    for prompt in prompts {
        let request = CompletionRequest::new(&resolved.model_name, &resolved.system_prompt, prompt)
            .with_temperature(resolved.temperature)
            .with_max_tokens(resolved.max_tokens);

        let answer = retry(&policy, || get_completion(client, request)).await?;
        println!("\n{BOLD_BEGIN}Prompt:{BOLD_END} {prompt}");
        println!("\n{BOLD_BEGIN}Answer:{BOLD_END} {answer}");
        println!("-------------------");
    }
    Ok(())
}

async fn similarity(
    client: &dyn Client,
    resolved: &ResolvedConfig,
    cli_model: Option<&str>,
    first: &str,
    second: &str,
) -> Result<(), Box<dyn Error>> {
    let model = cli_model.unwrap_or(resolved.embedding_model.as_str());
    let sentences = vec![first.to_string(), second.to_string()];
    let embeddings = get_embeddings(client, model, &sentences).await?;

    for (phrase, embedding) in sentences.iter().zip(&embeddings) {
        let preview: Vec<f32> = embedding.iter().take(5).copied().collect();
        println!("Phrase: {phrase}");
        println!("Embedding shape: ({},)", embedding.len());
        println!("Embedding: {preview:?}");
    }
    println!("{}", "--".repeat(40));

    match cosine_similarity(&embeddings[0], &embeddings[1]) {
        Some(score) => println!("Cosine similarity: {score:.4}"),
        None => println!("Cosine similarity: undefined (empty or mismatched vectors)"),
    }
    Ok(())
}
