use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "runsync",
    version,
    about = "Publish CI test results, their attachments and console logs to a test-management service"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Publish a results file as a new test run
    Publish(PublishArgs),
    /// Print the attachment kind each file would be uploaded as
    Classify(ClassifyArgs),
    Version,
}

#[derive(Parser, Debug, Clone)]
pub struct PublishArgs {
    /// Results file (JSON run document)
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Project the run is created in
    #[arg(long, env = "RUNSYNC_PROJECT")]
    pub project: String,

    /// Run name; overrides the name in the results file
    #[arg(long)]
    pub run_name: Option<String>,

    /// Upload run attachments as a single TestResults_{id}.zip
    #[arg(long)]
    pub archive: bool,

    /// Collection URL of the service
    #[arg(long, env = "RUNSYNC_URL")]
    pub url: Option<String>,

    /// Bearer token
    #[arg(long, env = "RUNSYNC_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Parallel result attachment uploads
    #[arg(long, env = "RUNSYNC_ATTACHMENT_CONCURRENCY")]
    pub attachment_concurrency: Option<usize>,

    #[command(flatten)]
    pub context: ContextArgs,
}

/// Build and release correlation for the run.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ContextArgs {
    #[arg(long, default_value = "")]
    pub owner: String,

    #[arg(long, default_value = "")]
    pub platform: String,

    #[arg(long, default_value = "")]
    pub configuration: String,

    #[arg(long, default_value_t = 0)]
    pub build_id: i64,

    #[arg(long, default_value = "")]
    pub build_uri: String,

    #[arg(long, default_value = "")]
    pub release_uri: String,

    #[arg(long, default_value = "")]
    pub release_environment_uri: String,
}

#[derive(Parser, Debug, Clone)]
pub struct ClassifyArgs {
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,
}
