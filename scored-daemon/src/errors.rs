use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DaemonError {
    #[error("already running? pid file exists: {0}")]
    AlreadyRunning(PathBuf),

    #[error("invalid working directory {path}: {source}")]
    WorkingRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}: not a directory")]
    NotADirectory(PathBuf),

    #[error("invalid port: 0")]
    InvalidPort,

    #[error("fork failed: {0}")]
    Fork(#[source] std::io::Error),

    #[error("failed to create new session: {0}")]
    Setsid(#[source] std::io::Error),

    #[error("failed to write pid file {path}: {source}")]
    PidFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot resolve unprivileged user '{name}': {source}")]
    UserNotFound {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to prepare log file {path}: {source}")]
    LogSetup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to redirect stdio to /dev/null: {0}")]
    StdioRedirect(#[source] std::io::Error),

    #[error("cannot change working directory to {path}: {source}")]
    Chdir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot bind and listen on port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to drop privileges to '{name}': {source}")]
    PrivilegeDrop {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("privilege drop did not stick: process can still regain root")]
    ReescalationPossible,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DaemonError>;
