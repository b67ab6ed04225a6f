//! Harness that runs a real engine accept loop without the daemonization.
//!
//! The engine thread is detached; it blocks in `accept()` between requests
//! and dies with the test process. Each harness gets its own temp
//! directory, credential file, log file, and ephemeral port, so tests run
//! in parallel without stepping on each other.

use std::fs;
use std::io::{Read, Write};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread;

use tempfile::TempDir;

use scored_daemon::auth::digest_hex;
use scored_daemon::engine::Engine;
use scored_daemon::exec::{ExecError, InstructionExecutor};
use scored_daemon::reqlog::{Award, RequestLog};

/// Executor that records every dispatched payload.
#[derive(Clone, Default)]
pub struct RecordingExecutor {
    calls: Arc<Mutex<Vec<String>>>,
    /// Canned award attached to every successful dispatch.
    pub award: Option<Award>,
}

impl RecordingExecutor {
    /// Executor that attaches `award` to every successful dispatch.
    pub fn with_award(award: Award) -> Self {
        Self {
            calls: Arc::default(),
            award: Some(award),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl InstructionExecutor for RecordingExecutor {
    fn execute(&mut self, instructions: &str) -> Result<Option<Award>, ExecError> {
        self.calls.lock().unwrap().push(instructions.to_owned());
        Ok(self.award.clone())
    }
}

pub struct EngineHarness {
    _dir: TempDir,
    addr: SocketAddr,
    executor: RecordingExecutor,
    passwd_path: PathBuf,
    log_path: PathBuf,
}

impl EngineHarness {
    /// Start an engine whose credential file holds the digest of
    /// `password`.
    pub fn new(password: &str) -> Self {
        Self::with_executor(password, RecordingExecutor::default())
    }

    pub fn with_executor(password: &str, executor: RecordingExecutor) -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let passwd_path = dir.path().join("scored-passwd");
        fs::write(&passwd_path, format!("{}\n", digest_hex(password))).expect("write credential");
        let log_path = dir.path().join("scored.log");

        let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");

        let mut engine = Engine::new(
            listener,
            passwd_path.clone(),
            RequestLog::new(&log_path),
            executor.clone(),
        );
        thread::spawn(move || {
            let _ = engine.run();
        });

        Self {
            _dir: dir,
            addr,
            executor,
            passwd_path,
            log_path,
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// One full client transaction: connect, write, half-close, read the
    /// status line until the engine closes the connection.
    pub fn send(&self, payload: &[u8]) -> String {
        let mut stream = TcpStream::connect(self.addr).expect("connect to engine");
        stream.write_all(payload).expect("write request");
        stream.shutdown(Shutdown::Write).expect("half-close");
        let mut reply = String::new();
        stream.read_to_string(&mut reply).expect("read reply");
        reply
    }

    /// Connect and hang up without writing anything.
    pub fn connect_and_abort(&self) {
        let stream = TcpStream::connect(self.addr).expect("connect to engine");
        drop(stream);
    }

    /// Replace the stored digest with the digest of `password`.
    pub fn rotate_password(&self, password: &str) {
        fs::write(&self.passwd_path, format!("{}\n", digest_hex(password)))
            .expect("rewrite credential");
    }

    /// Delete the credential file to simulate an unreadable store.
    pub fn remove_credential_file(&self) {
        fs::remove_file(&self.passwd_path).expect("remove credential");
    }

    /// Payloads dispatched to the executor so far.
    pub fn dispatched(&self) -> Vec<String> {
        self.executor.calls()
    }

    /// Transaction log contents, one entry per element.
    pub fn log_lines(&self) -> Vec<String> {
        fs::read_to_string(&self.log_path)
            .unwrap_or_default()
            .lines()
            .map(str::to_owned)
            .collect()
    }
}
