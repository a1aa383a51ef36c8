use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};
use validator::{Validate, ValidationError};

pub const CONFIG_FILE_NAME: &str = "klack.json";

/// Optional per-project settings, read from `klack.json` next to the launch entry
#[derive(Debug, Deserialize, Serialize, Validate, Clone, PartialEq)]
#[serde(default)]
pub struct KlackConfig {
    /// Display name shown in the application menu
    #[validate(length(min = 1), custom = "single_line")]
    pub name: String,
    #[validate(custom = "single_line")]
    pub comment: String,
    /// Executable the descriptor launches, relative to the project directory
    #[validate(custom = "relative_path")]
    pub launch_entry: String,
    #[validate(custom = "relative_path")]
    pub icon: String,
    pub terminal: bool,
    #[validate(length(min = 1), custom = "category_list")]
    pub categories: Vec<String>,
    pub startup_notify: bool,
    /// Program handed to the dependency tool's `run` command
    #[validate(custom = "relative_path")]
    pub main_program: String,
    #[validate(length(min = 1), custom = "token")]
    pub dependency_tool: String,
    /// Directories the main program expects next to it
    #[validate(custom = "relative_path_list")]
    pub resource_dirs: Vec<String>,
    pub log_to_file: bool,
}

impl Default for KlackConfig {
    fn default() -> Self {
        KlackConfig {
            name: "Klack".to_owned(),
            comment: "Mechanical keyboard click sounds".to_owned(),
            launch_entry: "klack-run".to_owned(),
            icon: "icon.png".to_owned(),
            terminal: false,
            categories: vec![
                "AudioVideo".to_owned(),
                "Audio".to_owned(),
                "Utility".to_owned(),
            ],
            startup_notify: false,
            main_program: "main.py".to_owned(),
            dependency_tool: "uv".to_owned(),
            resource_dirs: vec!["keydown".to_owned(), "keyup".to_owned()],
            log_to_file: false,
        }
    }
}

impl KlackConfig {
    pub fn path(project_dir: &Path) -> PathBuf {
        project_dir.join(CONFIG_FILE_NAME)
    }

    /// Returns `None` when the file does not exist
    pub fn load(path: &Path) -> anyhow::Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Unable to read {}", path.display()))?;
        let config: KlackConfig = serde_json::from_str(&contents)
            .with_context(|| format!("Unable to parse {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config {}", path.display()))?;
        log::debug!("Loaded config file {}", path.display());
        Ok(Some(config))
    }

    pub fn load_or_default(project_dir: &Path) -> anyhow::Result<Self> {
        Ok(Self::load(&Self::path(project_dir))?.unwrap_or_default())
    }
}

fn single_line(value: &str) -> Result<(), ValidationError> {
    if value.contains(['\n', '\r']) {
        return Err(ValidationError::new("single_line"));
    }
    Ok(())
}

fn token(value: &str) -> Result<(), ValidationError> {
    if value.contains(['\n', '\r', ';']) {
        return Err(ValidationError::new("token"));
    }
    Ok(())
}

fn category_list(values: &[String]) -> Result<(), ValidationError> {
    for value in values {
        if value.trim_end_matches(';').is_empty() {
            return Err(ValidationError::new("category"));
        }
        token(value.trim_end_matches(';')).map_err(|_| ValidationError::new("category"))?;
    }
    Ok(())
}

fn relative_path_list(values: &[String]) -> Result<(), ValidationError> {
    for value in values {
        single_line(value)?;
        relative_path(value)?;
    }
    Ok(())
}

fn relative_path(value: &str) -> Result<(), ValidationError> {
    let path = Path::new(value);
    if value.is_empty() || path.is_absolute() {
        return Err(ValidationError::new("relative_path"));
    }
    if path
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
    {
        return Err(ValidationError::new("relative_path"));
    }
    Ok(())
}
