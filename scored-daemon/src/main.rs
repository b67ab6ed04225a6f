use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use scored_daemon::bootstrap::daemonize;
use scored_daemon::config::{
    DaemonConfig, DEFAULT_LOGFILE, DEFAULT_PASSWD_FILE, DEFAULT_PIDFILE, DEFAULT_PORT,
    DEFAULT_USER, DEFAULT_WORKING_ROOT,
};

/// Privilege-dropping scoring daemon.
#[derive(Parser, Debug)]
#[command(name = "scored", version, about)]
struct Args {
    /// Working directory after detaching
    #[arg(short = 'd', long = "working-root", default_value = DEFAULT_WORKING_ROOT)]
    working_root: PathBuf,

    /// Transaction log file
    #[arg(short = 'l', long = "logfile", default_value = DEFAULT_LOGFILE)]
    logfile: PathBuf,

    /// Pid file; its existence blocks a second instance
    #[arg(long = "pidfile", default_value = DEFAULT_PIDFILE)]
    pidfile: PathBuf,

    /// Credential file holding the SHA-512 password digest
    #[arg(long = "passwd-file", default_value = DEFAULT_PASSWD_FILE)]
    passwd_file: PathBuf,

    /// TCP listen port
    #[arg(short = 'p', long = "port", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Unprivileged account to run as
    #[arg(short = 'u', long = "user", default_value = DEFAULT_USER)]
    user: String,
}

impl From<Args> for DaemonConfig {
    fn from(args: Args) -> Self {
        Self {
            working_root: args.working_root,
            logfile: args.logfile,
            pidfile: args.pidfile,
            passwd_file: args.passwd_file,
            port: args.port,
            user: args.user,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config: DaemonConfig = Args::parse().into();

    config
        .validate()
        .context("refusing to start with an invalid configuration")?;

    info!(
        port = config.port,
        user = %config.user,
        logfile = %config.logfile.display(),
        "starting scored"
    );

    // daemonize() only ever returns an error; the Ok arm is uninhabited.
    match daemonize(&config) {
        Ok(never) => match never {},
        Err(err) => Err(err).context("daemon startup failed"),
    }
}
