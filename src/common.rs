//! Common constants and helper functions used by the install, uninstall and run binaries

use anyhow::Context;
use log::LevelFilter;
use simplelog::{ColorChoice, CombinedLogger, SharedLogger, TermLogger, TerminalMode, WriteLogger};
use std::fs;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const APP_NAME: &str = "Klack";

pub const APP_DIRECTORY_NAME: &str = "klack";

/// File name of the launcher descriptor, in both the menu and autostart directories
pub const DESKTOP_FILE_NAME: &str = "klack.desktop";

/// Overrides the directory the binaries consider to be the project root
pub const PROJECT_DIR_ENV: &str = "KLACK_PROJECT_DIR";

/// Per-user locations the launcher descriptor is registered in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesktopPaths {
    /// Application menu directory, usually `~/.local/share/applications`
    pub applications_dir: PathBuf,
    /// Login autostart directory, usually `~/.config/autostart`
    pub autostart_dir: PathBuf,
}

impl DesktopPaths {
    pub fn for_current_user() -> anyhow::Result<Self> {
        let data = dirs::data_dir().context("Unable to get data_dir()")?;
        let config = dirs::config_dir().context("Unable to get config_dir()")?;
        Ok(Self {
            applications_dir: data.join("applications"),
            autostart_dir: config.join("autostart"),
        })
    }

    pub fn menu_entry(&self) -> PathBuf {
        self.applications_dir.join(DESKTOP_FILE_NAME)
    }

    pub fn autostart_entry(&self) -> PathBuf {
        self.autostart_dir.join(DESKTOP_FILE_NAME)
    }
}

/// Resolves the project directory: explicit argument, then `KLACK_PROJECT_DIR`,
/// then the directory containing the running executable
pub fn project_directory(explicit: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    let dir = match explicit {
        Some(dir) => dir,
        None => match std::env::var_os(PROJECT_DIR_ENV) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => {
                let exe = std::env::current_exe().context("Unable to get current_exe()")?;
                exe.parent()
                    .context("Executable has no parent directory")?
                    .to_path_buf()
            }
        },
    };
    fs::canonicalize(&dir).with_context(|| format!("Resolving project directory {}", dir.display()))
}

/// Path to the local application data folder
/// This is where the log file will be stored
pub fn local_data_directory() -> anyhow::Result<PathBuf> {
    let path = dirs::data_local_dir()
        .context("Unable to get data_local_dir()")?
        .join(APP_DIRECTORY_NAME);
    fs::create_dir_all(&path).context("Unable to create data directory")?;
    Ok(path)
}

pub fn install_logger(debug: bool, to_disk: bool) -> anyhow::Result<()> {
    let filter = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let config = simplelog::ConfigBuilder::default()
        .set_target_level(LevelFilter::Debug)
        .build();
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        filter,
        config.clone(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];
    if to_disk {
        let file = File::create(get_log_path()?).context("Unable to create log file")?;
        let file_logger = WriteLogger::new(filter, config, file);
        loggers.push(file_logger);
    }
    CombinedLogger::init(loggers)?;
    if debug {
        log::warn!("Debug logging enabled");
    }
    Ok(())
}

pub fn get_log_path() -> anyhow::Result<PathBuf> {
    Ok(local_data_directory()?.join("log.txt"))
}

/// Removes a file or symlink (dangling or not), returning whether there was anything to remove
pub fn remove_file_if_exists<P: AsRef<Path>>(p: P) -> std::io::Result<bool> {
    let exists = match fs::symlink_metadata(p.as_ref()) {
        Ok(meta) => !meta.is_dir(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
        Err(e) => return Err(e),
    };
    if exists {
        log::info!("Removing file {}", p.as_ref().display());
        fs::remove_file(p)?;
        return Ok(true);
    }
    Ok(false)
}

/// Writes `contents` to `dest` through a temporary file in the same directory,
/// creating the directory if needed and replacing any existing file
pub fn write_file_atomic(dest: &Path, contents: &str) -> anyhow::Result<()> {
    let parent = dest.parent().context("Destination has no parent directory")?;
    fs::create_dir_all(parent).with_context(|| format!("Ensuring {} exists", parent.display()))?;
    let mut tmp = tempfile::NamedTempFile::new_in(parent)
        .with_context(|| format!("Creating temporary file in {}", parent.display()))?;
    tmp.write_all(contents.as_bytes())
        .with_context(|| format!("Writing {}", tmp.path().display()))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(fs::Permissions::from_mode(0o644))
            .context("Setting descriptor permissions")?;
    }
    tmp.persist(dest)
        .map_err(|e| e.error)
        .with_context(|| format!("Replacing {}", dest.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    #[test]
    fn entries_use_fixed_file_name() {
        let paths = DesktopPaths {
            applications_dir: PathBuf::from("/home/u/.local/share/applications"),
            autostart_dir: PathBuf::from("/home/u/.config/autostart"),
        };
        assert_eq!(
            paths.menu_entry(),
            PathBuf::from("/home/u/.local/share/applications/klack.desktop")
        );
        assert_eq!(
            paths.autostart_entry(),
            PathBuf::from("/home/u/.config/autostart/klack.desktop")
        );
    }

    #[test]
    fn remove_file_if_exists_reports_absence() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("gone.desktop");
        assert!(!remove_file_if_exists(&file).unwrap());
        fs::write(&file, "x").unwrap();
        assert!(remove_file_if_exists(&file).unwrap());
        assert!(!file.exists());
    }

    #[cfg(unix)]
    #[test]
    fn remove_file_if_exists_removes_dangling_symlink() {
        let tmp = tempfile::tempdir().unwrap();
        let link = tmp.path().join("klack.desktop");
        std::os::unix::fs::symlink(tmp.path().join("missing-target"), &link).unwrap();
        assert!(remove_file_if_exists(&link).unwrap());
        assert!(fs::symlink_metadata(&link).is_err());
    }

    #[test]
    fn remove_file_if_exists_leaves_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("klack.desktop");
        fs::create_dir(&dir).unwrap();
        assert!(!remove_file_if_exists(&dir).unwrap());
        assert!(dir.is_dir());
    }

    #[test]
    fn write_file_atomic_creates_parent_and_overwrites() {
        let tmp = tempfile::tempdir().unwrap();
        let dest = tmp.path().join("nested").join("dir").join("klack.desktop");
        write_file_atomic(&dest, "first").unwrap();
        write_file_atomic(&dest, "second").unwrap();
        assert_eq!(fs::read_to_string(&dest).unwrap(), "second");
        let leftovers = fs::read_dir(dest.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn project_directory_prefers_explicit_then_env() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let prior = std::env::var_os(PROJECT_DIR_ENV);

        let explicit = tempfile::tempdir().unwrap();
        let from_env = tempfile::tempdir().unwrap();
        std::env::set_var(PROJECT_DIR_ENV, from_env.path());

        let dir = project_directory(Some(explicit.path().to_path_buf())).unwrap();
        assert_eq!(dir, fs::canonicalize(explicit.path()).unwrap());

        let dir = project_directory(None).unwrap();
        assert_eq!(dir, fs::canonicalize(from_env.path()).unwrap());

        match prior {
            Some(v) => std::env::set_var(PROJECT_DIR_ENV, v),
            None => std::env::remove_var(PROJECT_DIR_ENV),
        }
    }

    #[test]
    fn project_directory_rejects_missing_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let err = project_directory(Some(tmp.path().join("nope"))).unwrap_err();
        assert!(format!("{:#}", err).contains("Resolving project directory"));
    }
}
