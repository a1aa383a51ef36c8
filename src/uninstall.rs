use crate::common::{remove_file_if_exists, DesktopPaths};
use anyhow::Context;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UninstallReport {
    pub menu_entry_removed: bool,
    pub autostart_entry_removed: bool,
}

pub fn uninstall<R>(paths: &DesktopPaths, refresh: R) -> anyhow::Result<UninstallReport>
where
    R: FnOnce(&DesktopPaths),
{
    log::info!("Starting uninstall");
    let menu_entry_removed = remove_entry(&paths.menu_entry(), "Desktop entry")?;
    let autostart_entry_removed = remove_entry(&paths.autostart_entry(), "Autostart entry")?;

    refresh(paths);

    log::info!("Completed uninstall");
    Ok(UninstallReport {
        menu_entry_removed,
        autostart_entry_removed,
    })
}

fn remove_entry(path: &Path, label: &str) -> anyhow::Result<bool> {
    let removed =
        remove_file_if_exists(path).with_context(|| format!("Removing {}", path.display()))?;
    if !removed {
        log::info!("{} {} not found, nothing to remove", label, path.display());
    }
    Ok(removed)
}
