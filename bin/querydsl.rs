use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use querydsl::{CompilerConfig, Query, QueryDsl};
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "querydsl")]
#[command(about = "Compile the all/any/none search DSL into Elasticsearch queries", long_about = None)]
struct Args {
    /// Maximum number of clause processors running at once
    #[arg(long, env = "QUERYDSL_MAX_CONCURRENT_CLAUSES", default_value = "64")]
    max_concurrent_clauses: usize,

    /// Let sibling clauses finish after one fails instead of cancelling them
    #[arg(long, env = "QUERYDSL_NO_CANCEL_ON_ERROR")]
    no_cancel_on_error: bool,

    /// Give up on translation after this many milliseconds
    #[arg(long, env = "QUERYDSL_TIMEOUT_MS")]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print documentation for every registered clause type
    Docs,

    /// Translate a DSL document into backend query JSON
    Translate {
        /// DSL document to read (stdin when omitted)
        file: Option<PathBuf>,

        /// Pretty-print the output
        #[arg(long)]
        pretty: bool,
    },

    /// Print a human-readable summary of a DSL document
    Summarize {
        /// DSL document to read (stdin when omitted)
        file: Option<PathBuf>,
    },
}

async fn read_input(file: Option<&PathBuf>) -> Result<String> {
    match file {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut input = String::new();
            tokio::io::stdin()
                .read_to_string(&mut input)
                .await
                .context("failed to read stdin")?;
            Ok(input)
        }
    }
}

fn cancellation(timeout_ms: Option<u64>) -> CancellationToken {
    let cancel = CancellationToken::new();
    if let Some(ms) = timeout_ms {
        let deadline = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            debug!(timeout_ms = ms, "translation deadline reached");
            deadline.cancel();
        });
    }
    cancel
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let args = Args::parse();

    let config = CompilerConfig::default()
        .with_max_concurrent_clauses(args.max_concurrent_clauses)
        .with_cancel_on_error(!args.no_cancel_on_error);
    let dsl = QueryDsl::with_default_clauses_and_config(config);

    info!(
        "querydsl v{} with {} clause types",
        querydsl::VERSION,
        dsl.registry().len()
    );

    match args.command {
        Command::Docs => {
            let docs = dsl.documentation();
            println!("{}", serde_json::to_string_pretty(&docs)?);
        }
        Command::Translate { file, pretty } => {
            let input = read_input(file.as_ref()).await?;
            let cancel = cancellation(args.timeout_ms);
            let translated = dsl
                .translate_str(&input, &cancel)
                .await
                .context("translation failed")?;

            if pretty {
                println!("{}", serde_json::to_string_pretty(&translated)?);
            } else {
                println!("{}", translated);
            }
        }
        Command::Summarize { file } => {
            let input = read_input(file.as_ref()).await?;
            let query = Query::from_json_str(&input).context("invalid DSL document")?;
            println!("{}", dsl.summarize(&query, &CancellationToken::new()));
        }
    }

    Ok(())
}
