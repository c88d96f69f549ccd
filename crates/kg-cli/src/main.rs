//! kgraph CLI - Knowledge graph generator
//!
//! Usage:
//!   kgraph file <path> [--output graph.svg] [--show-text] [--show-triplets]
//!   kgraph url <url>   [--format dot]
//!   kgraph shell

mod pipeline;
mod shell;

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use kg_core::{
    AppConfig, LoggingConfig, OutputFormat, ParserBackend, ParserConfig, SentenceParser,
};
use kg_parser::{TextSource, TextSourceAdapter};
use once_cell::sync::OnceCell;
use tracing_subscriber::EnvFilter;

use crate::pipeline::{Pipeline, RunOptions};
use crate::shell::Shell;

/// Parser loaded once per process and shared read-only by every run
static PARSER: OnceCell<Box<dyn SentenceParser>> = OnceCell::new();

#[derive(Parser)]
#[command(name = "kgraph")]
#[command(about = "Extract subject-verb-object triplets from text and draw them as a knowledge graph")]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Sentence parser backend (udpipe, conllu)
    #[arg(long, global = true)]
    parser: Option<ParserBackend>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a graph from a .pdf or .txt file
    File {
        /// Path to the document
        path: PathBuf,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Build a graph from the paragraphs of a web page
    Url {
        /// Page URL
        url: String,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Interactive mode
    Shell {
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Args)]
struct OutputArgs {
    /// Graph output path (default: knowledge_graph.<format>)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Graph format (svg, dot, json)
    #[arg(short, long)]
    format: Option<OutputFormat>,

    /// Layout seed for reproducible drawings
    #[arg(long)]
    seed: Option<u64>,

    /// Print the extracted text
    #[arg(long)]
    show_text: bool,

    /// Print the extracted triplets
    #[arg(long)]
    show_triplets: bool,
}

impl OutputArgs {
    fn into_options(self, config: &AppConfig) -> RunOptions {
        let mut render = config.render.clone();
        if let Some(format) = self.format {
            render.format = format;
        }
        if self.seed.is_some() {
            render.seed = self.seed;
        }

        let output = self.output.unwrap_or_else(|| {
            PathBuf::from(format!("knowledge_graph.{}", render.format.extension()))
        });

        RunOptions {
            output,
            render,
            show_text: self.show_text,
            show_triplets: self.show_triplets,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(backend) = cli.parser {
        config.parser.backend = backend;
    }

    init_tracing(&config.logging);

    let parser = shared_parser(&config.parser)?;
    let adapter = TextSourceAdapter::new(&config.fetch)?;
    let pipeline = Pipeline::new(adapter, parser);

    let mut stdout = std::io::stdout();

    match cli.command {
        Commands::File { path, output } => {
            let options = output.into_options(&config);
            match TextSource::from_path(&path) {
                Ok(source) => {
                    pipeline.run(&source, &options, &mut stdout).await?;
                }
                Err(e) => println!("Error: {e}"),
            }
        }
        Commands::Url { url, output } => {
            let options = output.into_options(&config);
            pipeline
                .run(&TextSource::Url(url), &options, &mut stdout)
                .await?;
        }
        Commands::Shell { output } => {
            let options = output.into_options(&config);
            let stdin = std::io::stdin();
            Shell::new(&pipeline, &options, stdin.lock(), stdout)
                .run()
                .await?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::from_file(path)?.with_env_override()?,
        None => AppConfig::from_env()?,
    };
    Ok(config)
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if logging.json_format {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn shared_parser(config: &ParserConfig) -> kg_core::Result<&'static dyn SentenceParser> {
    PARSER
        .get_or_try_init(|| kg_extractor::build_parser(config))
        .map(|parser| parser.as_ref())
}
