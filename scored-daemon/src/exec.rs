//! Instruction dispatch behind an authenticated request.
//!
//! The payload is opaque to the daemon; what "executing" it means is the
//! executor's business. The stock executor is a no-op: authentication and
//! logging are the product, the hook exists for the scoring backend.

use thiserror::Error;

use crate::reqlog::Award;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("instruction rejected: {0}")]
    Rejected(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Receives the instruction payload of each authenticated request.
///
/// Dispatch happens exactly once per successful authentication, after the
/// response status is decided. The outcome does not alter the wire reply;
/// a returned [`Award`] only enriches the transaction log.
pub trait InstructionExecutor {
    fn execute(&mut self, instructions: &str) -> Result<Option<Award>, ExecError>;
}

/// Discards every instruction.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopExecutor;

impl InstructionExecutor for NoopExecutor {
    fn execute(&mut self, _instructions: &str) -> Result<Option<Award>, ExecError> {
        Ok(None)
    }
}
