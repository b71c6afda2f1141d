//! Package installer collaborators.

use std::sync::{Arc, Mutex};

use contracts::{CourierError, InstallOutcome, PackageInstaller};
use tokio::process::Command;
use tracing::{info, instrument, warn};

/// Installer that shells out to a configured command, appending the
/// package name (e.g. `pip install --upgrade -q <package>`).
#[derive(Debug, Clone)]
pub struct CommandInstaller {
    program: String,
    args: Vec<String>,
}

impl CommandInstaller {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// The conventional pip invocation used by the original deployment.
    pub fn pip() -> Self {
        Self::new(
            "pip",
            vec![
                "install".to_string(),
                "--upgrade".to_string(),
                "-q".to_string(),
                "--disable-pip-version-check".to_string(),
                "--no-warn-script-location".to_string(),
            ],
        )
    }
}

impl PackageInstaller for CommandInstaller {
    #[instrument(name = "command_install", skip(self), fields(program = %self.program))]
    async fn install(&self, package: &str) -> Result<InstallOutcome, CourierError> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(package)
            .output()
            .await
            .map_err(|e| CourierError::install(package, e.to_string()))?;

        if output.status.success() {
            info!(package, "package installed");
            Ok(InstallOutcome {
                success: true,
                detail: String::new(),
            })
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = tail(&stderr, 400);
            warn!(package, detail = %detail, "package install failed");
            Ok(InstallOutcome {
                success: false,
                detail,
            })
        }
    }
}

/// Last `max_chars` characters of installer output.
fn tail(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    let count = trimmed.chars().count();
    if count <= max_chars {
        return trimmed.to_string();
    }
    trimmed
        .chars()
        .skip(count - max_chars)
        .collect()
}

/// Mock installer for tests.
#[derive(Debug, Default, Clone)]
pub struct MockInstaller {
    fail_packages: Vec<String>,
    installed: Arc<Mutex<Vec<String>>>,
}

impl MockInstaller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installer that fails for the given package names
    pub fn failing_for(packages: Vec<String>) -> Self {
        Self {
            fail_packages: packages,
            installed: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Packages successfully "installed" so far
    pub fn installed(&self) -> Vec<String> {
        self.installed.lock().expect("mock installer poisoned").clone()
    }
}

impl PackageInstaller for MockInstaller {
    async fn install(&self, package: &str) -> Result<InstallOutcome, CourierError> {
        if self.fail_packages.iter().any(|p| p == package) {
            return Ok(InstallOutcome {
                success: false,
                detail: format!("no matching distribution found for {package}"),
            });
        }
        self.installed
            .lock()
            .expect("mock installer poisoned")
            .push(package.to_string());
        Ok(InstallOutcome {
            success: true,
            detail: String::new(),
        })
    }
}
