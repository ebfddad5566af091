use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "adpulse",
    version,
    about = "Creative fatigue scoring and next-best-concept ranking"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Score a batch of creatives and propose guardrail-gated actions
    Score(ScoreArgs),
    /// Rank candidate next concepts into a diversity-capped shortlist
    Rank(RankArgs),
    /// Evaluate proposed actions against the guardrail rule set
    Check(CheckArgs),
    /// Write a sample configuration file
    Init(InitArgs),
    Version,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ScoreArgs {
    #[arg(long, default_value = "adpulse.yaml")]
    pub config: PathBuf,

    /// JSON list of creative manifest entries
    #[arg(long)]
    pub creatives: PathBuf,

    /// JSON list of daily performance records
    #[arg(long)]
    pub performance: PathBuf,

    /// Directory asset_path entries resolve against
    #[arg(long)]
    pub assets_dir: Option<PathBuf>,

    /// Scoring date; defaults to the latest performance date
    #[arg(long)]
    pub as_of: Option<chrono::NaiveDate>,

    /// SQLite feature-vector cache
    #[arg(long)]
    pub cache: Option<PathBuf>,

    /// External quality-scoring endpoint (JSON over HTTP)
    #[arg(long, env = "ADPULSE_QUALITY_ENDPOINT")]
    pub quality_endpoint: Option<String>,

    /// Fail on unknown config keys
    #[arg(long, default_value = "false")]
    pub strict: bool,

    #[arg(long, default_value = "text")]
    pub format: String, // text|json
}

#[derive(clap::Args, Debug, Clone)]
pub struct RankArgs {
    #[arg(long, default_value = "adpulse.yaml")]
    pub config: PathBuf,

    /// JSON list of concept candidates
    #[arg(long)]
    pub candidates: PathBuf,

    #[arg(long, default_value = "false")]
    pub strict: bool,

    #[arg(long, default_value = "text")]
    pub format: String,
}

#[derive(clap::Args, Debug, Clone)]
pub struct CheckArgs {
    #[arg(long, default_value = "adpulse.yaml")]
    pub config: PathBuf,

    /// JSON list of {action, context} entries
    #[arg(long)]
    pub actions: PathBuf,

    #[arg(long, default_value = "false")]
    pub strict: bool,

    #[arg(long, default_value = "text")]
    pub format: String,
}

#[derive(clap::Args, Debug, Clone)]
pub struct InitArgs {
    #[arg(long, default_value = "adpulse.yaml")]
    pub path: PathBuf,

    #[arg(long, default_value = "false")]
    pub force: bool,
}
