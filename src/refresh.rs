//! Best-effort refresh of desktop menu caches after descriptors change

use crate::common::DesktopPaths;
use std::io;
use std::path::PathBuf;
use std::process::{Command, Output};

pub const MENU_DATABASE_TOOL: &str = "update-desktop-database";
pub const MENU_FORCE_UPDATE_TOOL: &str = "xdg-desktop-menu";
/// Tried in order, only the first one found is run
pub const KDE_CACHE_TOOLS: [&str; 2] = ["kbuildsycoca6", "kbuildsycoca5"];

pub fn is_kde(current_desktop: Option<&str>) -> bool {
    current_desktop
        .map(|d| d.split(':').any(|name| name.trim().eq_ignore_ascii_case("kde")))
        .unwrap_or(false)
}

/// Builds the refresh commands for the tools that are actually installed
pub fn refresh_commands<L>(
    paths: &DesktopPaths,
    current_desktop: Option<&str>,
    lookup: L,
) -> Vec<Command>
where
    L: Fn(&str) -> Option<PathBuf>,
{
    let mut commands = Vec::new();
    match lookup(MENU_DATABASE_TOOL) {
        Some(program) => {
            let mut cmd = Command::new(program);
            cmd.arg(&paths.applications_dir);
            commands.push(cmd);
        }
        None => log::info!("{} not found, skipping", MENU_DATABASE_TOOL),
    }
    match lookup(MENU_FORCE_UPDATE_TOOL) {
        Some(program) => {
            let mut cmd = Command::new(program);
            cmd.arg("forceupdate");
            commands.push(cmd);
        }
        None => log::info!("{} not found, skipping", MENU_FORCE_UPDATE_TOOL),
    }
    if is_kde(current_desktop) {
        match KDE_CACHE_TOOLS.iter().find_map(|&tool| lookup(tool)) {
            Some(program) => commands.push(Command::new(program)),
            None => log::info!("No KDE cache tool found, skipping"),
        }
    }
    commands
}

pub fn refresh_desktop(paths: &DesktopPaths) {
    let desktop = std::env::var("XDG_CURRENT_DESKTOP").ok();
    refresh_desktop_with(
        paths,
        desktop.as_deref(),
        |tool| which::which(tool).ok(),
        |cmd| cmd.output(),
    )
}

/// Runs every available refresh command; failures are logged and ignored
pub fn refresh_desktop_with<L, E>(
    paths: &DesktopPaths,
    current_desktop: Option<&str>,
    lookup: L,
    mut exec: E,
) where
    L: Fn(&str) -> Option<PathBuf>,
    E: FnMut(&mut Command) -> io::Result<Output>,
{
    log::info!("Refreshing desktop");
    for mut cmd in refresh_commands(paths, current_desktop, lookup) {
        let program = cmd.get_program().to_string_lossy().into_owned();
        log::debug!("Running {}", program);
        match exec(&mut cmd) {
            Ok(output) if output.status.success() => {}
            Ok(output) => log::warn!(
                "Failed to refresh desktop with {} ({}): {}",
                program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ),
            Err(e) => log::warn!("Failed to refresh desktop with {}: {}", program, e),
        }
    }
}
