mod cli;
mod config;
mod models;
mod pdf_chat_client;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use dotenv::dotenv;
use eyre::Result;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use url::Url;

use crate::cli::chat::paths::sanitize_path;
use crate::cli::chat::ChatContext;
use crate::config::ClientConfig;
use crate::pdf_chat_client::PdfChatClient;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    session: SessionArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a chat session
    Chat {
        #[command(flatten)]
        session: SessionArgs,
    },
}

#[derive(Args, Clone)]
struct SessionArgs {
    /// Upload endpoint of the PDF backend
    #[arg(long, env = "UPLOAD_PDF_URL")]
    upload_url: Option<Url>,

    /// Question endpoint of the PDF backend
    #[arg(long, env = "ASK_QUESTION_URL")]
    ask_url: Option<Url>,

    /// PDF to upload before the first question
    #[arg(short, long)]
    file: Option<String>,

    /// Ask a single question and exit
    #[arg(short, long)]
    input: Option<String>,

    /// Allow questions without uploading, for a backend that already holds a document
    #[arg(long)]
    skip_upload: bool,

    /// Give up on a request after this many seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load environment variables from .env file
    dotenv().ok();

    let cli = Cli::parse();
    let session = match cli.command {
        Some(Commands::Chat { session }) => session,
        None => cli.session,
    };

    let log_level = if session.verbose { Level::DEBUG } else { Level::WARN };

    // Logs go to stderr so they stay out of the transcript
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting PDF Chat CLI");

    let (Some(upload_url), Some(ask_url)) = (session.upload_url, session.ask_url) else {
        eprintln!("Both UPLOAD_PDF_URL and ASK_QUESTION_URL must be set (or pass --upload-url and --ask-url)");
        return Ok(ExitCode::FAILURE);
    };

    let config = match ClientConfig::new(upload_url, ask_url, session.timeout_secs) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            return Ok(ExitCode::FAILURE);
        }
    };
    info!("Upload endpoint: {}, ask endpoint: {}", config.upload_url, config.ask_url);

    let client = PdfChatClient::new(config)?;
    let file: Option<PathBuf> = session.file.as_deref().map(sanitize_path);
    let interactive = session.input.is_none();

    let mut chat_context = ChatContext::new(
        Box::new(io::stdout()),
        Box::new(client),
        session.input,
        file,
        interactive,
        session.skip_upload,
    );
    chat_context.run().await
}
