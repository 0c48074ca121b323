//! Package manager integration (pip)
//!
//! This module provides:
//! - The PackageManager trait the workflow talks to
//! - SystemPip, which runs `python -m pip` with an explicit interpreter
//! - Parsers for `pip list --outdated --format=json` and `pip freeze` output

use crate::config::PipConfig;
use crate::domain::{normalize_name, FrozenVersions, OutdatedPackage};
use crate::error::PipError;
use std::io::Write;
use std::process::{Command, Output};

/// The three package manager operations the workflow needs
pub trait PackageManager {
    /// Every installed package with a newer version available, in reported order
    fn list_outdated(&self) -> Result<Vec<OutdatedPackage>, PipError>;

    /// Upgrade exactly the given packages
    fn upgrade(&self, packages: &[&str]) -> Result<(), PipError>;

    /// Exact installed version of every package
    fn freeze(&self) -> Result<FrozenVersions, PipError>;
}

/// Package manager that executes the real pip
#[derive(Debug, Clone)]
pub struct SystemPip {
    config: PipConfig,
}

impl SystemPip {
    /// Create a pip runner for the configured interpreter
    pub fn new(config: PipConfig) -> Self {
        Self { config }
    }

    /// `python -m pip <args>`
    fn command(&self, args: &[&str]) -> Command {
        let mut command = Command::new(&self.config.python);
        command.arg("-m").arg("pip").args(args);
        command
    }

    /// Human-readable command line for messages
    fn command_line(&self, args: &[&str]) -> String {
        format!("{} -m pip {}", self.config.python.display(), args.join(" "))
    }

    /// Run a pip command and capture its output
    fn run_captured(&self, args: &[&str]) -> std::io::Result<Output> {
        log::debug!("Running: {}", self.command_line(args));
        self.command(args).output()
    }
}

impl PackageManager for SystemPip {
    fn list_outdated(&self) -> Result<Vec<OutdatedPackage>, PipError> {
        let args = ["list", "--outdated", "--format=json"];
        let output = self
            .run_captured(&args)
            .map_err(|e| PipError::query(format!("failed to execute command: {}", e)))?;

        if !output.status.success() {
            return Err(PipError::query(format!(
                "{} exited with {}: {}",
                self.command_line(&args),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        parse_outdated_json(&String::from_utf8_lossy(&output.stdout))
    }

    fn upgrade(&self, packages: &[&str]) -> Result<(), PipError> {
        // Dropping the guard deletes the file, whichever way this returns
        let mut list_file = tempfile::Builder::new()
            .prefix("updr-upgrade-")
            .suffix(".txt")
            .tempfile()
            .map_err(|e| PipError::command("create upgrade list", e.to_string()))?;

        for package in packages {
            writeln!(list_file, "{}", package)
                .map_err(|e| PipError::command("write upgrade list", e.to_string()))?;
        }
        list_file
            .flush()
            .map_err(|e| PipError::command("write upgrade list", e.to_string()))?;

        let list_path = list_file.path().to_string_lossy().into_owned();
        let args = ["install", "--upgrade", "-r", list_path.as_str()];
        let command_line = self.command_line(&args);
        log::debug!("Running: {}", command_line);

        // Inherit stdio so pip's own progress is visible
        let status = self
            .command(&args)
            .status()
            .map_err(|e| PipError::command(&command_line, format!("failed to execute: {}", e)))?;

        if let Err(e) = list_file.close() {
            log::warn!("Failed to remove temporary upgrade list: {}", e);
        }

        if status.success() {
            Ok(())
        } else {
            Err(PipError::command(command_line, format!("exited with {}", status)))
        }
    }

    fn freeze(&self) -> Result<FrozenVersions, PipError> {
        let args = ["freeze"];
        let command_line = self.command_line(&args);
        let output = self
            .run_captured(&args)
            .map_err(|e| PipError::command(&command_line, format!("failed to execute: {}", e)))?;

        if !output.status.success() {
            return Err(PipError::command(
                command_line,
                format!(
                    "exited with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            ));
        }

        Ok(parse_freeze(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// Parse `pip list --outdated --format=json` output
pub fn parse_outdated_json(stdout: &str) -> Result<Vec<OutdatedPackage>, PipError> {
    let trimmed = stdout.trim();
    // Some pip versions print nothing at all when nothing is outdated
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    serde_json::from_str(trimmed)
        .map_err(|e| PipError::query(format!("unexpected pip list output: {}", e)))
}

/// Parse `pip freeze` output. Only `name==version` lines are kept; editable
/// installs, direct URL references and comments are ignored.
pub fn parse_freeze(stdout: &str) -> FrozenVersions {
    let mut frozen = FrozenVersions::new();
    for line in stdout.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('-') {
            continue;
        }
        let Some((name, version)) = line.split_once("==") else {
            continue;
        };
        let name = name.trim();
        let version = version.trim();
        if name.is_empty() || version.is_empty() {
            continue;
        }
        frozen.insert(&normalize_name(name), version);
    }
    frozen
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    /// Serializes tests that spawn processes; writing an executable while
    /// another thread forks can fail with ETXTBSY
    static SPAWN: Mutex<()> = Mutex::new(());

    /// Scripted package manager for testing
    struct MockPackageManager {
        outdated: Vec<OutdatedPackage>,
        upgraded: RefCell<Vec<String>>,
    }

    impl PackageManager for MockPackageManager {
        fn list_outdated(&self) -> Result<Vec<OutdatedPackage>, PipError> {
            Ok(self.outdated.clone())
        }

        fn upgrade(&self, packages: &[&str]) -> Result<(), PipError> {
            self.upgraded
                .borrow_mut()
                .extend(packages.iter().map(|p| p.to_string()));
            Ok(())
        }

        fn freeze(&self) -> Result<FrozenVersions, PipError> {
            Ok(parse_freeze("requests==2.31.0\n"))
        }
    }

    #[test]
    fn test_parse_outdated_json() {
        let stdout = r#"[{"name": "requests", "version": "2.0.0", "latest_version": "2.31.0", "latest_filetype": "wheel"}, {"name": "Click", "version": "7.0", "latest_version": "8.1.7", "latest_filetype": "wheel"}]"#;
        let outdated = parse_outdated_json(stdout).unwrap();
        assert_eq!(
            outdated,
            vec![
                OutdatedPackage::new("requests", "2.0.0", "2.31.0"),
                OutdatedPackage::new("Click", "7.0", "8.1.7"),
            ]
        );
    }

    #[test]
    fn test_parse_outdated_json_empty_array() {
        assert!(parse_outdated_json("[]\n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_outdated_json_empty_output() {
        assert!(parse_outdated_json("  \n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_outdated_json_invalid() {
        let err = parse_outdated_json("Package    Version\n-------").unwrap_err();
        assert!(matches!(err, PipError::QueryError { .. }));
    }

    #[test]
    fn test_parse_outdated_json_missing_field() {
        let err = parse_outdated_json(r#"[{"name": "requests", "version": "2.0.0"}]"#).unwrap_err();
        assert!(matches!(err, PipError::QueryError { .. }));
    }

    #[test]
    fn test_parse_freeze() {
        let stdout = "\
# Editable install with no version control (demo==0.1.0)
-e /home/me/demo
Flask==3.0.3
requests==2.31.0
pkg @ file:///tmp/pkg-1.0-py3-none-any.whl
typing_extensions==4.12.2
";
        let frozen = parse_freeze(stdout);
        assert_eq!(frozen.len(), 3);
        assert_eq!(frozen.get("flask"), Some("3.0.3"));
        assert_eq!(frozen.get("requests"), Some("2.31.0"));
        assert_eq!(frozen.get("typing-extensions"), Some("4.12.2"));
        assert_eq!(frozen.get("pkg"), None);
    }

    #[test]
    fn test_command_line() {
        let pip = SystemPip::new(PipConfig::new("/venv/bin/python"));
        assert_eq!(
            pip.command_line(&["freeze"]),
            "/venv/bin/python -m pip freeze"
        );
    }

    #[test]
    fn test_system_pip_missing_interpreter() {
        let _guard = SPAWN.lock().unwrap_or_else(|e| e.into_inner());
        let pip = SystemPip::new(PipConfig::new(PathBuf::from(
            "/nonexistent/interpreter/python",
        )));
        assert!(matches!(
            pip.list_outdated(),
            Err(PipError::QueryError { .. })
        ));
        assert!(matches!(
            pip.upgrade(&["requests"]),
            Err(PipError::CommandError { .. })
        ));
        assert!(matches!(pip.freeze(), Err(PipError::CommandError { .. })));
    }

    /// Interpreter script that records the `-r` list path and its content,
    /// then exits with `code`
    #[cfg(unix)]
    fn recording_python(dir: &Path, code: i32) -> (PathBuf, PathBuf) {
        use std::os::unix::fs::PermissionsExt;

        let record = dir.join(format!("upgrade-list-{}", code));
        let script = dir.join(format!("python-{}", code));
        fs::write(
            &script,
            format!(
                "#!/bin/sh\nprintf '%s\\n' \"$6\" > '{record}'\ncat \"$6\" >> '{record}'\nexit {code}\n",
                record = record.display(),
                code = code
            ),
        )
        .unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        (script, record)
    }

    #[cfg(unix)]
    #[test]
    fn test_upgrade_removes_list_file_on_every_exit() {
        let _guard = SPAWN.lock().unwrap_or_else(|e| e.into_inner());
        let temp_dir = tempfile::TempDir::new().unwrap();

        for (code, succeeds) in [(0, true), (1, false)] {
            let (script, record) = recording_python(temp_dir.path(), code);
            let pip = SystemPip::new(PipConfig::new(script));

            let result = pip.upgrade(&["requests", "click"]);
            assert_eq!(result.is_ok(), succeeds, "exit code {}", code);

            let recorded = fs::read_to_string(&record).unwrap();
            let mut lines = recorded.lines();
            let list_path = lines.next().unwrap();
            assert!(list_path.contains("updr-upgrade-"), "{}", list_path);
            assert_eq!(lines.collect::<Vec<_>>(), vec!["requests", "click"]);
            assert!(
                !Path::new(list_path).exists(),
                "list file left behind after exit code {}",
                code
            );
        }
    }

    #[test]
    fn test_mock_package_manager() {
        let pm = MockPackageManager {
            outdated: vec![OutdatedPackage::new("requests", "2.0.0", "2.31.0")],
            upgraded: RefCell::new(Vec::new()),
        };
        assert_eq!(pm.list_outdated().unwrap().len(), 1);
        pm.upgrade(&["requests"]).unwrap();
        assert_eq!(*pm.upgraded.borrow(), vec!["requests".to_string()]);
        assert_eq!(pm.freeze().unwrap().get("requests"), Some("2.31.0"));
    }
}
