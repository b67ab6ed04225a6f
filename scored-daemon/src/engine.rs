//! The accept loop and per-connection transaction.
//!
//! One thread, one connection at a time. Every accepted connection gets
//! exactly one read, one status line, one log entry, and a close, in that
//! order, no matter how the evaluation goes.

use std::convert::Infallible;
use std::io::{self, Read, Write};
use std::net::{IpAddr, TcpListener, TcpStream};
use std::path::PathBuf;

use tracing::{debug, warn};

use scored_protocol::protocol::MAX_REQUEST_SIZE;
use scored_protocol::{parse_request, ResponseStatus};

use crate::auth;
use crate::credential;
use crate::exec::InstructionExecutor;
use crate::reqlog::{Award, LogEntry, RequestLog};

pub struct Engine<E> {
    listener: TcpListener,
    passwd_file: PathBuf,
    log: RequestLog,
    executor: E,
}

impl<E: InstructionExecutor> Engine<E> {
    pub fn new(listener: TcpListener, passwd_file: PathBuf, log: RequestLog, executor: E) -> Self {
        Self {
            listener,
            passwd_file,
            log,
            executor,
        }
    }

    /// Serve connections forever.
    ///
    /// Accept failures are transient (fd pressure, aborted handshakes) and
    /// never bring the loop down.
    pub fn run(&mut self) -> io::Result<Infallible> {
        loop {
            match self.listener.accept() {
                Ok((stream, peer)) => self.serve_connection(stream, peer.ip()),
                Err(err) => warn!(error = %err, "accept failed, continuing"),
            }
        }
    }

    /// Handle one accepted connection end to end.
    ///
    /// The client gets a status line on a best-effort basis; a peer that
    /// hangs up early still produces a log entry.
    pub fn serve_connection(&mut self, mut stream: TcpStream, peer: IpAddr) {
        let mut buf = vec![0u8; MAX_REQUEST_SIZE];
        let (status, award) = match stream.read(&mut buf) {
            Ok(n) => self.evaluate(&buf[..n]),
            Err(err) => {
                debug!(client = %peer, error = %err, "read failed");
                (ResponseStatus::ReqFail, None)
            }
        };

        if let Err(err) = stream.write_all(status.wire_line().as_bytes()) {
            debug!(client = %peer, error = %err, "response write failed");
        }

        let entry = LogEntry::now(peer, status, award);
        if let Err(err) = self.log.append(&entry) {
            warn!(path = %self.log.path().display(), error = %err, "log append failed");
        }

        // stream drops here; the protocol is single-shot
    }

    /// Decide the status line for one raw request.
    ///
    /// Framing is checked before the credential file is touched, so a
    /// malformed request never reads the stored digest. A request that
    /// fills the whole buffer is rejected outright: the tail may have
    /// been cut and a truncated payload must not be dispatched.
    fn evaluate(&mut self, raw: &[u8]) -> (ResponseStatus, Option<Award>) {
        if raw.len() == MAX_REQUEST_SIZE {
            debug!("request filled the read buffer, rejecting as oversized");
            return (ResponseStatus::ReqFail, None);
        }

        let request = match parse_request(raw) {
            Ok(request) => request,
            Err(err) => {
                debug!(error = %err, "malformed request");
                return (ResponseStatus::ReqFail, None);
            }
        };

        let reference = match credential::read_reference_digest(&self.passwd_file) {
            Ok(reference) => reference,
            Err(err) => {
                warn!(
                    path = %self.passwd_file.display(),
                    error = %err,
                    "credential file unreadable, denying"
                );
                return (ResponseStatus::AuthFail, None);
            }
        };

        let status = auth::authenticate(&reference, &request.password);
        if status != ResponseStatus::Success {
            return (status, None);
        }

        // Dispatch exactly once. The executor's verdict is logged, never
        // reflected back to the client.
        let award = match self.executor.execute(&request.instructions) {
            Ok(award) => award,
            Err(err) => {
                warn!(error = %err, "instruction dispatch failed");
                None
            }
        };
        (ResponseStatus::Success, award)
    }
}

impl<E> Engine<E> {
    /// Local address the engine is listening on. Useful when bound to
    /// an ephemeral port.
    pub fn local_addr(&self) -> io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }
}

#[cfg(test)]
mod tests;
