//! Wire protocol for the scored daemon: request framing and the fixed
//! three-status response vocabulary.

pub mod errors;
pub mod protocol;

pub use errors::FrameError;
pub use protocol::{parse_request, Request, ResponseStatus};
