use std::{io::Write, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{
    HttpQaBackend, PreviewRegistry, QaBackend, QuestionBounds, SessionController,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod repl;

use config::{load_settings, validate_server_url};
use repl::{parse_line, Command, Repl, HELP};

#[derive(Parser, Debug)]
#[command(name = "documind", about = "Ask questions about a PDF")]
struct Args {
    /// Base URL of the backend serving /api/upload and /api/question.
    #[arg(long)]
    server_url: Option<String>,
    /// Settings file; defaults to ./documind.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    max_question_chars: Option<usize>,
    /// PDF to upload on start.
    file: Option<PathBuf>,
}

// Uploads and answers can take minutes, so no request timeout is set.
fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("documind/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("failed to build HTTP client")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(server_url) = args.server_url {
        settings.server_url = server_url;
    }
    if let Some(max) = args.max_question_chars {
        settings.max_question_chars = max;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    validate_server_url(&settings.server_url)?;
    let backend: Arc<dyn QaBackend> = Arc::new(
        HttpQaBackend::with_client(&settings.server_url, http_client()?)
            .with_context(|| format!("failed to configure backend '{}'", settings.server_url))?,
    );
    info!(server_url = %settings.server_url, "documind starting");

    let controller = SessionController::new_with_dependencies(
        backend,
        PreviewRegistry::new(),
        QuestionBounds::new(settings.max_question_chars),
    );

    let mut updates = controller.subscribe();
    tokio::spawn(async move {
        let mut was_loading = false;
        while updates.changed().await.is_ok() {
            let loading = updates.borrow_and_update().is_loading;
            if loading && !was_loading {
                println!("Processing...");
            }
            was_loading = loading;
        }
    });

    let mut repl = Repl::new(controller, std::io::stdout());
    println!("{HELP}\n");

    if let Some(path) = args.file {
        repl.execute(Command::Open(path)).await?;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        repl.prompt()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        if !repl.execute(parse_line(&line)).await? {
            break;
        }
    }

    std::io::stdout().flush()?;
    Ok(())
}
