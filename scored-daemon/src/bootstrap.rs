//! Daemonization and privileged setup, in the only order that works.
//!
//! Everything that needs root happens before the drop: binding the
//! (possibly privileged) port, creating and chowning the log file,
//! writing the pid file. Everything that could leak an inherited
//! descriptor happens before the listener is created, so the listening
//! socket is the only descriptor the daemon carries besides stdio.

use std::convert::Infallible;
use std::fs::OpenOptions;
use std::io::Write;
use std::net::TcpListener;
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;
use std::process;

use tracing::info;

use scored_unix::net::bind_listen;
use scored_unix::process::{
    close_all_fds, fork, getuid, redirect_stdio_dev_null, reescalation_possible, setgid, setsid,
    setuid, Fork,
};
use scored_unix::users::{chmod_path, chown_path, resolve_account, UserAccount};

use crate::config::DaemonConfig;
use crate::engine::Engine;
use crate::errors::{DaemonError, Result};
use crate::exec::NoopExecutor;
use crate::reqlog::RequestLog;

/// Detach from the controlling terminal, finish privileged setup, drop
/// privileges, and serve forever.
///
/// On success this never returns: the parent processes exit during the
/// double fork and the surviving child enters the accept loop. Every
/// error is fatal; partial bootstrap is worse than no daemon.
pub fn daemonize(config: &DaemonConfig) -> Result<Infallible> {
    detach()?;

    write_pid_file(&config.pidfile)?;

    // Resolve the account while /etc is guaranteed readable and before
    // any descriptor games.
    let account = resolve_account(&config.user).map_err(|e| DaemonError::UserNotFound {
        name: config.user.clone(),
        source: e,
    })?;

    prepare_log_file(&config.logfile, &account)?;

    close_all_fds();
    redirect_stdio_dev_null().map_err(DaemonError::StdioRedirect)?;

    std::env::set_current_dir(&config.working_root).map_err(|e| DaemonError::Chdir {
        path: config.working_root.clone(),
        source: e,
    })?;

    // Bind while still privileged; ports below 1024 need it.
    let listener = bind_listen(config.port).map_err(|e| DaemonError::Bind {
        port: config.port,
        source: e,
    })?;

    drop_privileges(&account)?;

    info!(port = config.port, user = %account.name, "entering accept loop");
    serve(listener, config)
}

/// Double fork with a setsid in between. Both parents exit immediately;
/// only the grandchild, session-less and unadoptable by a terminal,
/// returns.
fn detach() -> Result<()> {
    if let Fork::Parent { .. } = fork().map_err(DaemonError::Fork)? {
        process::exit(0);
    }
    setsid().map_err(DaemonError::Setsid)?;
    if let Fork::Parent { .. } = fork().map_err(DaemonError::Fork)? {
        process::exit(0);
    }
    Ok(())
}

/// Record the daemon's pid. `create_new` keeps two racing instances from
/// silently sharing a pid file even after the validate-time existence
/// check passed for both.
fn write_pid_file(path: &Path) -> Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(0o600)
        .open(path)
        .map_err(|e| DaemonError::PidFile {
            path: path.to_path_buf(),
            source: e,
        })?;
    writeln!(file, "{}", process::id()).map_err(|e| DaemonError::PidFile {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Create the transaction log if absent and hand it to the unprivileged
/// account, so appends keep working after the drop.
fn prepare_log_file(path: &Path, account: &UserAccount) -> Result<()> {
    let wrap = |e: std::io::Error| DaemonError::LogSetup {
        path: path.to_path_buf(),
        source: e,
    };

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(wrap)?;
    chown_path(path, account).map_err(wrap)?;
    chmod_path(path, 0o644).map_err(wrap)
}

/// Drop to the unprivileged account, group first, and verify the drop
/// stuck. A process that can still seteuid back to root is a fatal
/// security fault, not a warning.
fn drop_privileges(account: &UserAccount) -> Result<()> {
    let wrap = |e: std::io::Error| DaemonError::PrivilegeDrop {
        name: account.name.clone(),
        source: e,
    };

    if getuid() == 0 {
        setgid(account.gid).map_err(wrap)?;
        setuid(account.uid).map_err(wrap)?;
    }

    if reescalation_possible() {
        return Err(DaemonError::ReescalationPossible);
    }
    Ok(())
}

fn serve(listener: TcpListener, config: &DaemonConfig) -> Result<Infallible> {
    let log = RequestLog::new(&config.logfile);
    let mut engine = Engine::new(listener, config.passwd_file.clone(), log, NoopExecutor);
    Ok(engine.run()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    #[test]
    fn pid_file_contains_our_pid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scored.pid");
        write_pid_file(&path).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.trim().parse::<u32>().unwrap(), process::id());
    }

    #[test]
    fn second_pid_file_write_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scored.pid");
        write_pid_file(&path).unwrap();

        let err = write_pid_file(&path).unwrap_err();
        assert!(matches!(err, DaemonError::PidFile { .. }));
    }

    #[test]
    fn prepare_log_file_creates_and_sets_mode() {
        use std::os::unix::fs::MetadataExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scored.log");
        let account = UserAccount {
            name: "self".into(),
            uid: getuid(),
            gid: scored_unix::process::getgid(),
        };
        prepare_log_file(&path, &account).unwrap();

        let meta = fs::metadata(&path).unwrap();
        assert_eq!(meta.mode() & 0o777, 0o644);
    }
}
