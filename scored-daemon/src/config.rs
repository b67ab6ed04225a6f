//! Resolved daemon configuration and pre-daemonization validation.

use std::path::PathBuf;

use crate::errors::{DaemonError, Result};

/// Default post-fork working directory.
pub const DEFAULT_WORKING_ROOT: &str = "/";
/// Default transaction log destination.
pub const DEFAULT_LOGFILE: &str = "/var/log/scored.log";
/// Default single-instance guard path.
pub const DEFAULT_PIDFILE: &str = "/var/run/scored.pid";
/// Default credential file holding the reference digest.
pub const DEFAULT_PASSWD_FILE: &str = "/etc/scored-passwd";
/// Default listen port.
pub const DEFAULT_PORT: u16 = 30000;
/// Default unprivileged account the daemon drops to.
pub const DEFAULT_USER: &str = "scored";

/// Immutable configuration, resolved by the CLI layer before the fork.
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// Directory the daemon chdirs into after detaching.
    pub working_root: PathBuf,
    /// Transaction log path; ownership is handed to `user` during bootstrap.
    pub logfile: PathBuf,
    /// Existence of this file at startup means another instance is running.
    pub pidfile: PathBuf,
    /// Credential file read once per request, never cached.
    pub passwd_file: PathBuf,
    /// TCP listen port; bound while still privileged.
    pub port: u16,
    /// Unprivileged account the daemon runs as after bootstrap.
    pub user: String,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            working_root: PathBuf::from(DEFAULT_WORKING_ROOT),
            logfile: PathBuf::from(DEFAULT_LOGFILE),
            pidfile: PathBuf::from(DEFAULT_PIDFILE),
            passwd_file: PathBuf::from(DEFAULT_PASSWD_FILE),
            port: DEFAULT_PORT,
            user: DEFAULT_USER.to_string(),
        }
    }
}

impl DaemonConfig {
    /// Check the invariants that must hold before daemonization starts.
    ///
    /// The pid file acts as a single-instance guard by existence alone; the
    /// working root must be a directory that exists; the port must be
    /// nonzero. All failures are fatal and reported before the process
    /// detaches, so the operator still has a terminal to read them on.
    pub fn validate(&self) -> Result<()> {
        if self.pidfile.exists() {
            return Err(DaemonError::AlreadyRunning(self.pidfile.clone()));
        }

        let meta = std::fs::metadata(&self.working_root).map_err(|e| DaemonError::WorkingRoot {
            path: self.working_root.clone(),
            source: e,
        })?;
        if !meta.is_dir() {
            return Err(DaemonError::NotADirectory(self.working_root.clone()));
        }

        if self.port == 0 {
            return Err(DaemonError::InvalidPort);
        }

        Ok(())
    }
}
