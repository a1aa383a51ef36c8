//! Removes the Klack menu and autostart entries
use clap::Parser;
use klack::common::{install_logger, DesktopPaths};
use klack::refresh::refresh_desktop;
use klack::uninstall::uninstall;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn run() -> anyhow::Result<()> {
    let paths = DesktopPaths::for_current_user()?;
    let report = uninstall(&paths, refresh_desktop)?;
    if !report.menu_entry_removed && !report.autostart_entry_removed {
        println!("Nothing to uninstall");
    } else {
        println!("Uninstalled");
    }
    Ok(())
}

fn main() {
    let args: Args = Args::parse();

    if let Err(e) = install_logger(args.debug, false) {
        eprintln!("Unable to install logger: {:#}", e);
        std::process::exit(1);
    }
    if let Err(e) = run() {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}
