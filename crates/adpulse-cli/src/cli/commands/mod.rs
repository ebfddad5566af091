use crate::cli::args::{Cli, Command};

mod check;
mod init;
mod rank;
mod score;

pub mod exit_codes {
    pub const OK: i32 = 0;
    pub const BLOCKED: i32 = 1;
    pub const CONFIG_ERROR: i32 = 2;
}

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Score(args) => score::run(args).await,
        Command::Rank(args) => rank::run(args),
        Command::Check(args) => check::run(args),
        Command::Init(args) => init::run(args),
        Command::Version => {
            println!("adpulse {}", env!("CARGO_PKG_VERSION"));
            Ok(exit_codes::OK)
        }
    }
}

/// Shared config loading with the CLI's error convention: a bad config is a
/// printed error and exit code 2, not a stack trace.
pub(crate) fn load_config_or_exit(
    path: &std::path::Path,
    strict: bool,
) -> Result<adpulse_core::config::OptimizerConfig, i32> {
    match adpulse_core::config::load_config(path, strict) {
        Ok(cfg) => Ok(cfg),
        Err(e) => {
            eprintln!("error: {e}");
            Err(exit_codes::CONFIG_ERROR)
        }
    }
}

pub(crate) fn read_json<T: serde::de::DeserializeOwned>(
    path: &std::path::Path,
) -> anyhow::Result<T> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    serde_json::from_str(&raw)
        .map_err(|e| anyhow::anyhow!("failed to parse {}: {e}", path.display()))
}
