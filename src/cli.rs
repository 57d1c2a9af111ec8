use clap::Parser;

#[derive(Parser)]
#[command(name = "snapsort")]
#[command(about = "Telegram photo bot: files incoming photos into S3 prefixes by per-user label.")]
pub(crate) struct Cli {
    /// Verbose logging (debug level; RUST_LOG still overrides).
    #[arg(long, short = 'v')]
    pub(crate) verbose: bool,

    /// Override the target S3 bucket (default: S3_BUCKET_NAME).
    #[arg(long)]
    pub(crate) bucket: Option<String>,

    /// Override the AWS region (default: AWS_REGION, then ap-south-1).
    #[arg(long)]
    pub(crate) region: Option<String>,
}
