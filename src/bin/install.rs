//! Registers Klack in the application menu, and optionally at login
use anyhow::Context;
use clap::Parser;
use klack::common::{install_logger, project_directory, DesktopPaths, APP_NAME};
use klack::config::KlackConfig;
use klack::install::{install, Autostart};
use klack::prompt::confirm;
use klack::refresh::refresh_desktop;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
    /// Enable autostart without asking
    #[arg(long, conflicts_with = "no_autostart")]
    autostart: bool,
    /// Skip autostart without asking
    #[arg(long)]
    no_autostart: bool,
    /// Override the project directory (defaults to the directory of this binary)
    #[arg(long)]
    project_dir: Option<PathBuf>,
}

impl Args {
    fn autostart(&self) -> Autostart {
        match (self.autostart, self.no_autostart) {
            (true, _) => Autostart::Enable,
            (_, true) => Autostart::Disable,
            _ => Autostart::Ask,
        }
    }
}

fn ask_autostart(choice: Autostart) -> anyhow::Result<bool> {
    match choice {
        Autostart::Enable => Ok(true),
        Autostart::Disable => Ok(false),
        Autostart::Ask => {
            let question = format!("Start {} automatically when you log in?", APP_NAME);
            confirm(
                &question,
                &mut std::io::stdin().lock(),
                &mut std::io::stdout(),
            )
            .context("Reading autostart answer")
        }
    }
}

fn run(project_dir: PathBuf, config: KlackConfig, autostart: Autostart) -> anyhow::Result<()> {
    let paths = DesktopPaths::for_current_user()?;
    let report = install(
        &project_dir,
        &paths,
        &config,
        || ask_autostart(autostart),
        refresh_desktop,
    )?;
    println!("Installed {}", report.menu_entry.display());
    if let Some(autostart_entry) = report.autostart_entry {
        println!("Autostart enabled: {}", autostart_entry.display());
    }
    Ok(())
}

fn main() {
    let args: Args = Args::parse();
    let autostart = args.autostart();

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

    // Setup logging
    if let Err(e) = install_logger(args.debug, config.log_to_file) {
        eprintln!("Unable to install logger: {:#}", e);
        std::process::exit(1);
    }
    if let Err(e) = run(project_dir, config, autostart) {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}
