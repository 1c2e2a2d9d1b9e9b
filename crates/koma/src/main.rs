//! `koma [BOOT_SCRIPT] [--config koma.json]`
//!
//! Exit code 0 when the game quits (including after a logged `_update`
//! error), 1 when setup fails.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use koma::logging::init_logging;
use koma::{App, EngineConfig};

#[derive(Debug, Parser)]
#[command(version, about = "Run a Lua game")]
struct Args {
    /// Lua file defining `_init`, `_update(dt)` and `_draw()`.
    #[arg(default_value = "scripts/main.lua")]
    boot_script: PathBuf,

    /// Config file. Defaults to `koma.json` in the working directory, if any.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => EngineConfig::load(path),
        None => EngineConfig::discover(&std::env::current_dir().unwrap_or_default()),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("koma: {e}");
            return ExitCode::from(1);
        }
    };

    init_logging(config.log_filter.as_deref());

    match App::new(config, args.boot_script).run() {
        Ok(reason) => ExitCode::from(reason.exit_code()),
        Err(e) => {
            log::error!("{e}");
            ExitCode::from(1)
        }
    }
}
