//! Prism CLI entry point.
//!
//! This binary is the composition root: it loads configuration, wires
//! observability, constructs the client, and exposes one subcommand per SDK
//! operation. Results are printed as pretty JSON on stdout; failures exit
//! non-zero with the error chain on stderr.
//!
//! Authentication order: `--session` flag, then `PRISM_SESSION`/config file
//! session, then a fresh login with the configured credentials. URL-building
//! subcommands never authenticate — they issue no requests at all.

mod config;

use std::path::PathBuf;

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use prism_client::{ClientOptions, PrismClient, RetrieveRequest};
use prism_core::{
    ContentHash, FileExtension, JobCategory, JobHandle, JobPriority, PurchaseLife, PurchaseToken,
    SessionToken,
};

use crate::config::CliConfig;

#[derive(Parser)]
#[command(name = "prism", version, about = "Client for the Prism content/job service")]
struct Cli {
    /// Configuration file (defaults to ./prism.toml if present).
    #[arg(long, global = true)]
    config: Option<String>,

    /// Prism host, overriding configuration.
    #[arg(long, global = true)]
    host: Option<String>,

    /// Prism port, overriding configuration.
    #[arg(long, global = true)]
    port: Option<u16>,

    /// Session token to reuse instead of logging in.
    #[arg(long, global = true)]
    session: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and print the issued session token.
    Login,
    /// Content operations.
    #[command(subcommand)]
    Content(ContentCommand),
    /// Job lifecycle operations.
    #[command(subcommand)]
    Job(JobCommand),
    /// Pure URL builders (no network).
    #[command(subcommand)]
    Url(UrlCommand),
}

#[derive(Subcommand)]
enum ContentCommand {
    /// Look up the stored-content record for a hash.
    Detail { hash: String },
    /// Upload a local file.
    Upload { path: PathBuf },
    /// Ask the service to fetch a URL and store the result.
    Retrieve {
        url: String,
        /// File extension; derived from the URL when omitted.
        #[arg(long)]
        ext: Option<String>,
    },
    /// Purchase content for playback.
    Purchase {
        hash: String,
        ext: String,
        /// Referrer domains allowed to use the playback URL.
        #[arg(long = "referrer")]
        referrers: Vec<String>,
        /// Purchase lifetime in seconds.
        #[arg(long, default_value_t = 86_400)]
        life: u64,
    },
    /// Revoke a purchase.
    Release { token: String },
}

#[derive(Subcommand)]
enum JobCommand {
    /// Create a job from a JSON description.
    Create {
        /// Job description as a JSON document.
        description: String,
        #[arg(long)]
        priority: Option<i32>,
        #[arg(long)]
        category: Option<String>,
    },
    /// Fetch the current job record.
    Detail { handle: String },
    /// Apply a JSON patch to a job.
    Update { handle: String, changes: String },
    /// Queue the job for execution.
    Start { handle: String },
    /// Abort a running job.
    Abort { handle: String },
    /// Re-queue a failed job.
    Retry { handle: String },
    /// Delete a job.
    Remove { handle: String },
    /// Check whether a job output file exists.
    Exists { handle: String, file: String },
    /// Print the download URL for a job output file.
    Url { handle: String, file: String },
}

#[derive(Subcommand)]
enum UrlCommand {
    /// Playback URL for a purchase token.
    Purchase {
        token: String,
        #[arg(long)]
        ext: Option<String>,
        #[arg(long)]
        name: Option<String>,
    },
    /// Static-content URL for a hash.
    Static {
        hash: String,
        #[arg(long)]
        ext: Option<String>,
        #[arg(long)]
        name: Option<String>,
    },
}

impl Command {
    /// URL builders stay fully local; everything else talks to the service.
    fn needs_session(&self) -> bool {
        !matches!(self, Command::Url(_) | Command::Job(JobCommand::Url { .. }))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let cfg = CliConfig::load(cli.config.as_deref()).context("loading configuration")?;
    run(cli, cfg).await
}

async fn run(cli: Cli, cfg: CliConfig) -> anyhow::Result<()> {
    let opts: ClientOptions = cfg.client_options();
    let mut client = PrismClient::new(opts)?;

    let host = client.connect(cli.host.as_deref(), cli.port);
    tracing::debug!(%host, "client ready");

    if cli.command.needs_session() {
        authenticate(&mut client, cli.session.or(cfg.session)).await?;
    }

    match cli.command {
        Command::Login => {
            // authenticate() above already logged in or adopted a session.
            let token = client
                .session()
                .ok_or_else(|| anyhow!("no session established"))?;
            println!("{token}");
        }
        Command::Content(op) => run_content(&client, op).await?,
        Command::Job(op) => run_job(&client, op).await?,
        Command::Url(op) => run_url(&client, op)?,
    }

    Ok(())
}

async fn authenticate(client: &mut PrismClient, session: Option<String>) -> anyhow::Result<()> {
    match session {
        Some(token) => {
            let token = SessionToken::new(token).context("session token must not be empty")?;
            client.set_session(token);
        }
        None => {
            client.login().await.context("login failed")?;
        }
    }
    Ok(())
}

async fn run_content(client: &PrismClient, op: ContentCommand) -> anyhow::Result<()> {
    match op {
        ContentCommand::Detail { hash } => {
            let detail = client.content_detail(&content_hash(&hash)?).await?;
            print_json(&detail)
        }
        ContentCommand::Upload { path } => {
            let entry = client.content_upload(&path).await?;
            print_json(&entry)
        }
        ContentCommand::Retrieve { url, ext } => {
            let ext = ext.map(file_extension).transpose()?;
            let entry = client
                .content_retrieve(RetrieveRequest::new(url), ext)
                .await?;
            print_json(&entry)
        }
        ContentCommand::Purchase {
            hash,
            ext,
            referrers,
            life,
        } => {
            let receipt = client
                .content_purchase(
                    &content_hash(&hash)?,
                    &file_extension(ext)?,
                    &referrers,
                    PurchaseLife::from_secs(life),
                )
                .await?;
            print_json(&receipt)
        }
        ContentCommand::Release { token } => {
            let token =
                PurchaseToken::new(token).context("purchase token must not be empty")?;
            let body = client.content_purchase_remove(&token).await?;
            print_json(&body)
        }
    }
}

async fn run_job(client: &PrismClient, op: JobCommand) -> anyhow::Result<()> {
    match op {
        JobCommand::Create {
            description,
            priority,
            category,
        } => {
            let description: Value =
                serde_json::from_str(&description).context("description must be valid JSON")?;
            let category = category
                .map(|c| JobCategory::new(c).context("category must not be empty"))
                .transpose()?;
            let detail = client
                .job_create(&description, priority.map(JobPriority::new), category)
                .await?;
            print_json(&detail)
        }
        JobCommand::Detail { handle } => {
            print_json(&client.job_detail(&job_handle(&handle)?).await?)
        }
        JobCommand::Update { handle, changes } => {
            let changes: Value =
                serde_json::from_str(&changes).context("changes must be valid JSON")?;
            print_json(&client.job_update(&job_handle(&handle)?, &changes).await?)
        }
        JobCommand::Start { handle } => {
            print_json(&client.job_start(&job_handle(&handle)?).await?)
        }
        JobCommand::Abort { handle } => {
            print_json(&client.job_abort(&job_handle(&handle)?).await?)
        }
        JobCommand::Retry { handle } => {
            print_json(&client.job_retry(&job_handle(&handle)?).await?)
        }
        JobCommand::Remove { handle } => {
            print_json(&client.job_remove(&job_handle(&handle)?).await?)
        }
        JobCommand::Exists { handle, file } => {
            let exists = client
                .job_content_exists(&job_handle(&handle)?, &file)
                .await?;
            println!("{exists}");
            Ok(())
        }
        JobCommand::Url { handle, file } => {
            println!("{}", client.job_content_url(&job_handle(&handle)?, &file)?);
            Ok(())
        }
    }
}

fn run_url(client: &PrismClient, op: UrlCommand) -> anyhow::Result<()> {
    match op {
        UrlCommand::Purchase { token, ext, name } => {
            let token = PurchaseToken::new(token).context("purchase token must not be empty")?;
            let mut receipt = prism_client::PurchaseReceipt::from_token(token);
            receipt.ext = ext;
            println!("{}", client.url_purchase(&receipt, name.as_deref()));
        }
        UrlCommand::Static { hash, ext, name } => {
            let ext = ext.map(file_extension).transpose()?;
            println!(
                "{}",
                client.url_static(&content_hash(&hash)?, ext.as_ref(), name.as_deref())
            );
        }
    }
    Ok(())
}

fn content_hash(value: &str) -> anyhow::Result<ContentHash> {
    ContentHash::new(value).context("content hash must not be empty")
}

fn job_handle(value: &str) -> anyhow::Result<JobHandle> {
    JobHandle::new(value).context("job handle must not be empty")
}

fn file_extension(value: String) -> anyhow::Result<FileExtension> {
    FileExtension::new(value).context("extension must not be empty")
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
