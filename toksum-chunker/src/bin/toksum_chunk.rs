use anyhow::{Context, bail};
use clap::{Parser, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use toksum_chunker::{ChunkerConfig, DEFAULT_MODEL, SimpleChunker, SmartChunker};

/// Budget used when neither the flags nor a config file set one
const DEFAULT_MAX_TOKENS: usize = 512;

/// Split text into token-bounded chunks and print them as JSON.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the input text file. If not provided, reads from stdin.
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Model whose tokenizer sizes the chunks. Overrides the config file.
    #[arg(short, long)]
    model: Option<String>,

    /// Maximum tokens per chunk. Overrides the config file.
    #[arg(short = 't', long)]
    max_tokens: Option<usize>,

    /// Which boundaries to chunk at.
    #[arg(long, value_enum, default_value_t = Mode::Sentences)]
    mode: Mode,

    /// Source language for `--mode code`, e.g. python or rust.
    #[arg(short, long)]
    language: Option<String>,

    /// TOML file with `model` and `max_tokens`.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Mode {
    Sentences,
    Paragraphs,
    Code,
    Words,
}

fn resolve_config(args: &Args) -> anyhow::Result<ChunkerConfig> {
    let mut config = match &args.config {
        Some(path) => ChunkerConfig::from_toml_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => ChunkerConfig {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
        },
    };

    if let Some(model) = &args.model {
        config.model = model.clone();
    }
    if let Some(max_tokens) = args.max_tokens {
        config.max_tokens = max_tokens;
    }
    config.validate()?;
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let args = Args::parse();
    let config = resolve_config(&args)?;

    let text = if let Some(input_path) = &args.input {
        fs::read_to_string(input_path)
            .with_context(|| format!("failed to read {}", input_path.display()))?
    } else {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    };

    let chunks = match args.mode {
        Mode::Sentences => SmartChunker::from_config(config)?.chunk_by_sentences(&text)?,
        Mode::Paragraphs => SmartChunker::from_config(config)?.chunk_by_paragraphs(&text)?,
        Mode::Code => {
            let Some(language) = &args.language else {
                bail!("--language is required with --mode code");
            };
            SmartChunker::from_config(config)?.chunk_code(&text, language)?
        }
        Mode::Words => {
            SimpleChunker::new(config.model, config.max_tokens)?.chunk_text(&text)?
        }
    };

    let json_output = serde_json::to_string_pretty(&chunks)?;
    println!("{}", json_output);

    Ok(())
}
