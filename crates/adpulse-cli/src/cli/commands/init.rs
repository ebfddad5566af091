use super::exit_codes;
use crate::cli::args::InitArgs;
use adpulse_core::config::write_sample_config;

pub fn run(args: InitArgs) -> anyhow::Result<i32> {
    if args.path.exists() && !args.force {
        eprintln!(
            "error: {} already exists (use --force to overwrite)",
            args.path.display()
        );
        return Ok(exit_codes::CONFIG_ERROR);
    }
    write_sample_config(&args.path)?;
    println!("wrote {}", args.path.display());
    Ok(exit_codes::OK)
}
