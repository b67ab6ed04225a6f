//! scored — a privilege-dropping scoring daemon.
//!
//! The daemon accepts single-shot TCP connections, authenticates a
//! client-supplied password against a locally stored SHA-512 digest, and on
//! success hands the opaque instruction payload to an executor hook. Every
//! connection is answered with exactly one of three fixed status lines and
//! recorded with exactly one line in the transaction log.

pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod credential;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod reqlog;

pub use config::DaemonConfig;
pub use engine::Engine;
pub use errors::{DaemonError, Result};
