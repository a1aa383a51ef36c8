//! Synchronizes dependencies and starts Klack
use clap::Parser;
use klack::common::{install_logger, project_directory, APP_NAME};
use klack::config::KlackConfig;
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
    /// Override the project directory (defaults to the directory of this binary)
    #[arg(long)]
    project_dir: Option<PathBuf>,
    /// Arguments passed through to the main program
    #[arg(last = true)]
    program_args: Vec<OsString>,
}

fn main() {
    let args: Args = Args::parse();

    let project_dir = match project_directory(args.project_dir) {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("{:#}", e);
            std::process::exit(1);
        }
    };
    let config = match KlackConfig::load_or_default(&project_dir) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{:#}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = install_logger(args.debug, config.log_to_file) {
        eprintln!("Unable to install logger: {:#}", e);
        std::process::exit(1);
    }
    log::info!(
        "Starting {} from {}, version: {}",
        APP_NAME,
        project_dir.display(),
        env!("CARGO_PKG_VERSION")
    );
    let e = klack::launcher::run(&project_dir, &config, &args.program_args);
    log::error!("{:#}", e);
    std::process::exit(1);
}
