//! Transaction log: one line appended per served connection.
//!
//! Format, tab-separated after the timestamp:
//!
//! ```text
//! <unix-seconds>:\t[<client-ip>]\t<status-label>\t<point-delta>\t<reason>
//! ```
//!
//! The point-delta and reason columns carry award metadata when an
//! executor reports it; they are written empty otherwise so the column
//! layout stays fixed.

use std::fmt::Write as _;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::net::IpAddr;
use std::path::{Path, PathBuf};

use scored_protocol::ResponseStatus;

/// Score award reported by an executor for a dispatched instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Award {
    pub points: i64,
    pub reason: String,
}

/// A single transaction to be appended to the log.
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// Unix timestamp in seconds, captured when the entry is built.
    pub timestamp: i64,
    /// Peer address of the served connection.
    pub client_addr: IpAddr,
    /// Outcome reported to the client.
    pub status: ResponseStatus,
    /// Award metadata, when the dispatch produced any.
    pub award: Option<Award>,
}

impl LogEntry {
    /// Build an entry stamped with the current time.
    pub fn now(client_addr: IpAddr, status: ResponseStatus, award: Option<Award>) -> Self {
        Self {
            timestamp: chrono::Utc::now().timestamp(),
            client_addr,
            status,
            award,
        }
    }

    fn render(&self) -> String {
        let mut line = String::new();
        let _ = write!(
            line,
            "{}:\t[{}]\t{}",
            self.timestamp,
            self.client_addr,
            self.status.label()
        );
        match &self.award {
            Some(award) => {
                let _ = write!(line, "\t{}\t{}", award.points, award.reason);
            }
            None => line.push_str("\t\t"),
        }
        line.push('\n');
        line
    }
}

/// Append-only transaction log.
///
/// The file is opened, written, and closed for every entry. Slower than
/// holding the handle, but an externally rotated or deleted log picks
/// back up on the next transaction.
#[derive(Debug, Clone)]
pub struct RequestLog {
    path: PathBuf,
}

impl RequestLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one rendered entry.
    pub fn append(&self, entry: &LogEntry) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(entry.render().as_bytes())
    }
}
