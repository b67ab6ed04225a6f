use super::*;

use std::fs;
use std::io::Write as _;
use std::net::{Shutdown, SocketAddr};
use std::sync::{Arc, Mutex};
use std::thread;

use crate::auth::digest_hex;
use crate::exec::ExecError;

/// Records every dispatched payload and returns a canned result.
#[derive(Clone, Default)]
struct RecordingExecutor {
    calls: Arc<Mutex<Vec<String>>>,
    award: Option<Award>,
    fail: bool,
}

impl InstructionExecutor for RecordingExecutor {
    fn execute(&mut self, instructions: &str) -> Result<Option<Award>, ExecError> {
        self.calls.lock().unwrap().push(instructions.to_owned());
        if self.fail {
            return Err(ExecError::Rejected("canned failure".into()));
        }
        Ok(self.award.clone())
    }
}

struct Fixture {
    _dir: tempfile::TempDir,
    engine: Engine<RecordingExecutor>,
    calls: Arc<Mutex<Vec<String>>>,
    log_path: PathBuf,
    passwd_path: PathBuf,
}

fn fixture_with(executor: RecordingExecutor) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let passwd_path = dir.path().join("scored-passwd");
    fs::write(&passwd_path, format!("{}\n", digest_hex("hunter2"))).unwrap();
    let log_path = dir.path().join("scored.log");

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let calls = executor.calls.clone();
    let engine = Engine::new(
        listener,
        passwd_path.clone(),
        RequestLog::new(&log_path),
        executor,
    );
    Fixture {
        _dir: dir,
        engine,
        calls,
        log_path,
        passwd_path,
    }
}

fn fixture() -> Fixture {
    fixture_with(RecordingExecutor::default())
}

/// Drive one connection through `serve_connection` and return the reply.
fn send(fixture: &mut Fixture, payload: &[u8]) -> String {
    let addr = fixture.engine.local_addr().unwrap();
    let payload = payload.to_vec();
    let client = thread::spawn(move || {
        let mut stream = TcpStream::connect(addr).unwrap();
        stream.write_all(&payload).unwrap();
        stream.shutdown(Shutdown::Write).unwrap();
        let mut reply = String::new();
        stream.read_to_string(&mut reply).unwrap();
        reply
    });

    // The engine owns the listener, but tests drive connections one at a
    // time rather than entering the infinite accept loop.
    let (stream, peer) = accept_one(&fixture.engine);
    fixture.engine.serve_connection(stream, peer.ip());
    client.join().unwrap()
}

fn accept_one<E>(engine: &Engine<E>) -> (TcpStream, SocketAddr) {
    engine.listener.accept().unwrap()
}

fn log_lines(fixture: &Fixture) -> Vec<String> {
    fs::read_to_string(&fixture.log_path)
        .unwrap_or_default()
        .lines()
        .map(str::to_owned)
        .collect()
}

// ============================================================
// Status lines
// ============================================================

#[test]
fn correct_password_yields_success() {
    let mut fx = fixture();
    let reply = send(&mut fx, b"hunter2:noop:EOM:");
    assert_eq!(reply, "0:SUCCESS:EOM:\n");
}

#[test]
fn wrong_password_yields_auth_fail() {
    let mut fx = fixture();
    let reply = send(&mut fx, b"letmein:noop:EOM:");
    assert_eq!(reply, "1:AUTH_FAIL:EOM:\n");
}

#[test]
fn missing_terminator_yields_req_fail() {
    let mut fx = fixture();
    let reply = send(&mut fx, b"hunter2:noop");
    assert_eq!(reply, "2:REQ_FAIL:EOM:\n");
}

#[test]
fn empty_request_yields_req_fail() {
    let mut fx = fixture();
    let reply = send(&mut fx, b"");
    assert_eq!(reply, "2:REQ_FAIL:EOM:\n");
}

#[test]
fn buffer_filling_request_yields_req_fail() {
    let mut fx = fixture();
    // A well-terminated request that exactly fills the read buffer is
    // rejected: its tail may have been cut off.
    let mut payload = vec![b'a'; MAX_REQUEST_SIZE - 5];
    payload.extend_from_slice(b":EOM:");
    let (status, award) = fx.engine.evaluate(&payload);
    assert_eq!(status, ResponseStatus::ReqFail);
    assert!(award.is_none());
}

#[test]
fn unreadable_credential_file_denies_access() {
    let mut fx = fixture();
    fs::remove_file(&fx.passwd_path).unwrap();
    let reply = send(&mut fx, b"hunter2:noop:EOM:");
    assert_eq!(reply, "1:AUTH_FAIL:EOM:\n");
}

#[test]
fn malformed_request_never_reads_credential_file() {
    let mut fx = fixture();
    // Framing is rejected before authentication, so a missing credential
    // file cannot turn a framing error into AUTH_FAIL.
    fs::remove_file(&fx.passwd_path).unwrap();
    let reply = send(&mut fx, b"no terminator here");
    assert_eq!(reply, "2:REQ_FAIL:EOM:\n");
}

// ============================================================
// Dispatch
// ============================================================

#[test]
fn success_dispatches_instructions_exactly_once() {
    let mut fx = fixture();
    send(&mut fx, b"hunter2:award 100 to team7:EOM:");
    let calls = fx.calls.lock().unwrap();
    assert_eq!(calls.as_slice(), ["award 100 to team7"]);
}

#[test]
fn failures_never_dispatch() {
    let mut fx = fixture();
    send(&mut fx, b"wrongpass:payload:EOM:");
    send(&mut fx, b"unterminated");
    assert!(fx.calls.lock().unwrap().is_empty());
}

#[test]
fn executor_failure_does_not_change_the_reply() {
    let mut fx = fixture_with(RecordingExecutor {
        fail: true,
        ..Default::default()
    });
    let reply = send(&mut fx, b"hunter2:boom:EOM:");
    assert_eq!(reply, "0:SUCCESS:EOM:\n");
}

#[test]
fn executor_award_lands_in_the_log() {
    let mut fx = fixture_with(RecordingExecutor {
        award: Some(Award {
            points: 250,
            reason: "service uptime".into(),
        }),
        ..Default::default()
    });
    send(&mut fx, b"hunter2:tick:EOM:");

    let lines = log_lines(&fx);
    assert_eq!(lines.len(), 1);
    let cols: Vec<&str> = lines[0].split('\t').collect();
    assert_eq!(cols[2], "SUCCESS");
    assert_eq!(cols[3], "250");
    assert_eq!(cols[4], "service uptime");
}

// ============================================================
// Logging
// ============================================================

#[test]
fn every_connection_logs_exactly_one_line() {
    let mut fx = fixture();
    send(&mut fx, b"hunter2:noop:EOM:");
    send(&mut fx, b"bad:noop:EOM:");
    send(&mut fx, b"garbage");
    assert_eq!(log_lines(&fx).len(), 3);
}

#[test]
fn log_line_carries_client_ip_and_label() {
    let mut fx = fixture();
    send(&mut fx, b"hunter2:noop:EOM:");

    let lines = log_lines(&fx);
    let cols: Vec<&str> = lines[0].split('\t').collect();
    assert_eq!(cols[1], "[127.0.0.1]");
    assert_eq!(cols[2], "SUCCESS");
}

// ============================================================
// Repeatability
// ============================================================

#[test]
fn identical_requests_get_identical_replies() {
    let mut fx = fixture();
    let first = send(&mut fx, b"hunter2:noop:EOM:");
    let second = send(&mut fx, b"hunter2:noop:EOM:");
    assert_eq!(first, second);
}

#[test]
fn rotated_password_takes_effect_without_restart() {
    let mut fx = fixture();
    assert_eq!(send(&mut fx, b"hunter2:noop:EOM:"), "0:SUCCESS:EOM:\n");

    fs::write(&fx.passwd_path, format!("{}\n", digest_hex("swordfish"))).unwrap();
    assert_eq!(send(&mut fx, b"hunter2:noop:EOM:"), "1:AUTH_FAIL:EOM:\n");
    assert_eq!(send(&mut fx, b"swordfish:noop:EOM:"), "0:SUCCESS:EOM:\n");
}
