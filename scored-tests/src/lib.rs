//! Test utilities for the scored workspace
//!
//! This crate provides the engine harness used by the integration tests:
//! a real accept loop on an ephemeral port, backed by temporary credential
//! and log files, with a recording executor standing in for the scoring
//! backend.

pub mod helpers;

pub use helpers::engine_harness::{EngineHarness, RecordingExecutor};
