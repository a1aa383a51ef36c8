//! Runs the main program through the dependency-sync tool

use crate::config::KlackConfig;
use anyhow::Context;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("`{tool}` was not found on PATH. {hint}")]
    ToolMissing { tool: String, hint: String },
    #[error("Main program not found: {}", .0.display())]
    MainProgramMissing(PathBuf),
    #[error("`{tool} sync` failed (exit {code:?})")]
    SyncFailed { tool: String, code: Option<i32> },
}

/// A project that has passed the launch preconditions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Launch {
    pub project_dir: PathBuf,
    pub tool: PathBuf,
    pub tool_name: String,
    pub main_program: String,
}

fn install_hint(tool: &str) -> String {
    if tool == "uv" {
        "Install it with `curl -LsSf https://astral.sh/uv/install.sh | sh` \
         (see https://docs.astral.sh/uv/getting-started/installation/), then open a new shell."
            .to_owned()
    } else {
        format!("Install `{tool}` and make sure it is on PATH.")
    }
}

/// Checks the dependency tool and main program exist
pub fn prepare<L>(project_dir: &Path, config: &KlackConfig, lookup: L) -> anyhow::Result<Launch>
where
    L: Fn(&str) -> Option<PathBuf>,
{
    let tool_name = config.dependency_tool.clone();
    let tool = lookup(tool_name.as_str()).ok_or_else(|| Error::ToolMissing {
        hint: install_hint(&tool_name),
        tool: tool_name.clone(),
    })?;
    log::debug!("Using {} at {}", tool_name, tool.display());

    for dir in &config.resource_dirs {
        let path = project_dir.join(dir);
        if !path.is_dir() {
            log::warn!("Expected directory {} is missing", path.display());
        }
    }

    let main_program = project_dir.join(&config.main_program);
    if !main_program.is_file() {
        return Err(Error::MainProgramMissing(main_program).into());
    }

    Ok(Launch {
        project_dir: project_dir.to_path_buf(),
        tool,
        tool_name,
        main_program: config.main_program.clone(),
    })
}

impl Launch {
    fn tool_command(&self, subcommand: &str) -> Command {
        let mut cmd = Command::new(&self.tool);
        cmd.current_dir(&self.project_dir)
            .arg(subcommand)
            .arg("--project")
            .arg(&self.project_dir);
        cmd
    }

    pub fn sync_command(&self) -> Command {
        self.tool_command("sync")
    }

    pub fn run_command(&self, extra_args: &[OsString]) -> Command {
        let mut cmd = self.tool_command("run");
        cmd.arg(&self.main_program).args(extra_args);
        cmd
    }

    pub fn sync<E>(&self, mut exec: E) -> anyhow::Result<()>
    where
        E: FnMut(&mut Command) -> anyhow::Result<ExitStatus>,
    {
        log::info!("Synchronizing dependencies with {}", self.tool_name);
        let status = exec(&mut self.sync_command())?;
        if !status.success() {
            return Err(Error::SyncFailed {
                tool: self.tool_name.clone(),
                code: status.code(),
            }
            .into());
        }
        Ok(())
    }
}

/// Resolves, synchronizes and hands over to the main program.
/// Only returns on failure.
pub fn run(project_dir: &Path, config: &KlackConfig, extra_args: &[OsString]) -> anyhow::Error {
    let launch = match prepare(project_dir, config, |tool| which::which(tool).ok()) {
        Ok(launch) => launch,
        Err(e) => return e,
    };
    if let Err(e) = launch.sync(|cmd| {
        cmd.status()
            .with_context(|| format!("Running {} sync", launch.tool_name))
    }) {
        return e;
    }
    log::info!("Starting {}", launch.main_program);
    replace_process(launch.run_command(extra_args))
}

cfg_if::cfg_if! {
    if #[cfg(unix)] {
        fn replace_process(mut cmd: Command) -> anyhow::Error {
            use std::os::unix::process::CommandExt;
            let program = cmd.get_program().to_string_lossy().into_owned();
            anyhow::Error::new(cmd.exec()).context(format!("Executing {}", program))
        }
    } else {
        fn replace_process(mut cmd: Command) -> anyhow::Error {
            let program = cmd.get_program().to_string_lossy().into_owned();
            match cmd.status() {
                Ok(status) => std::process::exit(status.code().unwrap_or(1)),
                Err(e) => anyhow::Error::new(e).context(format!("Executing {}", program)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn args(cmd: &Command) -> Vec<String> {
        cmd.get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn missing_tool_has_actionable_message() {
        let tmp = tempfile::tempdir().unwrap();
        let err = prepare(tmp.path(), &KlackConfig::default(), |_| None).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("`uv` was not found on PATH"));
        assert!(msg.contains("astral.sh/uv/install.sh"));
    }

    #[test]
    fn missing_main_program_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let err = prepare(tmp.path(), &KlackConfig::default(), |_| {
            Some(PathBuf::from("/usr/bin/uv"))
        })
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::MainProgramMissing(_))
        ));
    }

    #[test]
    fn commands_point_at_project() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("main.py"), "print('hi')").unwrap();
        let launch = prepare(tmp.path(), &KlackConfig::default(), |_| {
            Some(PathBuf::from("/usr/bin/uv"))
        })
        .unwrap();
        let project = tmp.path().to_string_lossy().into_owned();

        let sync = launch.sync_command();
        assert_eq!(sync.get_program(), "/usr/bin/uv");
        assert_eq!(sync.get_current_dir(), Some(tmp.path()));
        assert_eq!(args(&sync), vec!["sync".to_string(), "--project".into(), project.clone()]);

        let run = launch.run_command(&[OsString::from("--verbose")]);
        assert_eq!(
            args(&run),
            vec![
                "run".to_string(),
                "--project".into(),
                project,
                "main.py".into(),
                "--verbose".into()
            ]
        );
    }

    #[test]
    fn custom_tool_gets_generic_hint() {
        let tmp = tempfile::tempdir().unwrap();
        let config = KlackConfig {
            dependency_tool: "pdm".to_owned(),
            ..KlackConfig::default()
        };
        let err = prepare(tmp.path(), &config, |_| None).unwrap_err();
        assert!(err.to_string().contains("Install `pdm` and make sure it is on PATH."));
    }
}
