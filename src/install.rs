use crate::common::{write_file_atomic, DesktopPaths};
use crate::config::KlackConfig;
use crate::desktop_entry::{upsert_key, DesktopEntry, AUTOSTART_ENABLED_KEY};
use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Launch entry not found: {}", .0.display())]
    LaunchEntryMissing(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Autostart {
    /// Ask interactively
    Ask,
    Enable,
    Disable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub menu_entry: PathBuf,
    pub autostart_entry: Option<PathBuf>,
    pub icon_found: bool,
}

/// Registers the launch entry of `project_dir` with the desktop menu.
/// `ask_autostart` is only consulted after the menu entry has been written.
pub fn install<A, R>(
    project_dir: &Path,
    paths: &DesktopPaths,
    config: &KlackConfig,
    ask_autostart: A,
    refresh: R,
) -> anyhow::Result<InstallReport>
where
    A: FnOnce() -> anyhow::Result<bool>,
    R: FnOnce(&DesktopPaths),
{
    log::info!("Starting install from {}", project_dir.display());

    let launch_entry = project_dir.join(&config.launch_entry);
    if !launch_entry.is_file() {
        return Err(Error::LaunchEntryMissing(launch_entry).into());
    }
    ensure_executable(&launch_entry)?;

    let icon = project_dir.join(&config.icon);
    let icon_found = icon.is_file();
    if !icon_found {
        log::warn!(
            "Icon {} not found, the menu entry will have no icon until it exists",
            icon.display()
        );
    }

    let menu_entry = paths.menu_entry();
    log::info!("Creating desktop entry {}", menu_entry.display());
    let contents = DesktopEntry::new(config, &launch_entry, &icon).render();
    write_file_atomic(&menu_entry, &contents).context("Writing desktop entry")?;

    refresh(paths);

    let autostart_entry = if ask_autostart()? {
        Some(create_autostart_entry(paths)?)
    } else {
        log::info!("Autostart not enabled");
        None
    };

    log::info!("Completed install");
    Ok(InstallReport {
        menu_entry,
        autostart_entry,
        icon_found,
    })
}

fn create_autostart_entry(paths: &DesktopPaths) -> anyhow::Result<PathBuf> {
    let menu_entry = paths.menu_entry();
    let autostart_entry = paths.autostart_entry();
    log::info!("Creating autostart entry {}", autostart_entry.display());
    let contents = fs::read_to_string(&menu_entry)
        .with_context(|| format!("Reading {}", menu_entry.display()))?;
    let contents = upsert_key(&contents, AUTOSTART_ENABLED_KEY, "true");
    write_file_atomic(&autostart_entry, &contents).context("Writing autostart entry")?;
    Ok(autostart_entry)
}

#[cfg(unix)]
fn ensure_executable(path: &Path) -> anyhow::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mode = fs::metadata(path)
        .with_context(|| format!("Reading metadata of {}", path.display()))?
        .permissions()
        .mode();
    if mode & 0o111 == 0 {
        log::info!("Setting execute permissions on {}", path.display());
        fs::set_permissions(path, fs::Permissions::from_mode(mode | 0o755))
            .with_context(|| format!("Setting permissions of {}", path.display()))?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn ensure_executable(_path: &Path) -> anyhow::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sandbox() -> (tempfile::TempDir, PathBuf, DesktopPaths) {
        let tmp = tempfile::tempdir().unwrap();
        let project = tmp.path().join("project");
        fs::create_dir_all(&project).unwrap();
        let paths = DesktopPaths {
            applications_dir: tmp.path().join("applications"),
            autostart_dir: tmp.path().join("autostart"),
        };
        (tmp, project, paths)
    }

    #[test]
    fn missing_launch_entry_writes_nothing() {
        let (_tmp, project, paths) = sandbox();
        let mut refreshed = false;
        let err = install(
            &project,
            &paths,
            &KlackConfig::default(),
            || panic!("should not ask"),
            |_| refreshed = true,
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::LaunchEntryMissing(_))
        ));
        assert!(!paths.applications_dir.exists());
        assert!(!refreshed);
    }

    #[test]
    fn missing_icon_is_only_a_warning() {
        let (_tmp, project, paths) = sandbox();
        fs::write(project.join("klack-run"), "#!/bin/sh\n").unwrap();
        let report = install(
            &project,
            &paths,
            &KlackConfig::default(),
            || Ok(false),
            |_| {},
        )
        .unwrap();
        assert!(!report.icon_found);
        assert!(report.menu_entry.is_file());
        assert_eq!(report.autostart_entry, None);
        let contents = fs::read_to_string(&report.menu_entry).unwrap();
        assert!(contents.contains(&format!("Icon={}", project.join("icon.png").display())));
    }

    #[cfg(unix)]
    #[test]
    fn launch_entry_is_made_executable() {
        use std::os::unix::fs::PermissionsExt;
        let (_tmp, project, paths) = sandbox();
        let launch = project.join("klack-run");
        fs::write(&launch, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&launch, fs::Permissions::from_mode(0o644)).unwrap();
        install(&project, &paths, &KlackConfig::default(), || Ok(false), |_| {}).unwrap();
        let mode = fs::metadata(&launch).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }
}
