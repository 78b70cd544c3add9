use std::io::{self, Read};
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gpt3_tokenizer::{CacheConfig, Encoder, EnvConfig, TokenBudget, TokenId};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gpt3-tokenizer")]
#[command(version)]
#[command(about = "Encode, decode and count GPT-3 BPE tokens", long_about = None)]
struct Cli {
    /// Vocabulary JSON (overrides GPT3_TOKENIZER_VOCAB)
    #[arg(long, global = true)]
    vocab: Option<PathBuf>,

    /// Merge rules (overrides GPT3_TOKENIZER_MERGES)
    #[arg(long, global = true)]
    merges: Option<PathBuf>,

    /// Merge-cache bound, 0 for unbounded (overrides GPT3_TOKENIZER_CACHE_SIZE)
    #[arg(long, global = true)]
    cache_size: Option<usize>,

    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print merge-cache statistics as JSON to stderr when done
    #[arg(long, global = true)]
    stats: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the token ids of TEXT (stdin when omitted)
    Encode {
        text: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Print the text behind the given ids
    Decode {
        #[arg(required = true)]
        ids: Vec<TokenId>,
    },
    /// Print the number of tokens in TEXT (stdin when omitted)
    Count { text: Option<String> },
    /// Print how many completion tokens a model has left after TEXT
    Budget {
        #[arg(short, long)]
        model: String,
        text: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let mut config = EnvConfig::from_env();
    if let Some(vocab) = cli.vocab {
        config.vocab_path = vocab;
    }
    if let Some(merges) = cli.merges {
        config.merges_path = merges;
    }
    if let Some(size) = cli.cache_size {
        config.cache_size = size;
    }

    let encoder = Encoder::from_files(
        &config.vocab_path,
        &config.merges_path,
        CacheConfig::from_capacity(config.cache_size),
    )
    .context("failed to load tokenizer assets")?;

    match cli.command {
        Commands::Encode { text, json } => {
            let ids = encoder.encode(&read_input(text)?)?;
            if json {
                println!("{}", serde_json::to_string(&ids)?);
            } else {
                let ids: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
                println!("{}", ids.join(" "));
            }
        }
        Commands::Decode { ids } => {
            print!("{}", encoder.decode(&ids)?);
        }
        Commands::Count { text } => {
            println!("{}", encoder.count_tokens(&read_input(text)?)?);
        }
        Commands::Budget { model, text } => {
            let budget = TokenBudget::for_model(&model)
                .with_context(|| format!("unknown model: {}", model))?;
            let prompt = read_input(text)?;
            println!("{}", budget.remaining(&encoder, &[prompt])?);
        }
    }

    let stats = encoder.cache_stats();
    tracing::debug!(?stats, "merge cache");
    if cli.stats {
        eprintln!("{}", serde_json::to_string(&stats)?);
    }
    Ok(())
}

fn read_input(text: Option<String>) -> Result<String> {
    match text {
        Some(text) => Ok(text),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            Ok(buf)
        }
    }
}
