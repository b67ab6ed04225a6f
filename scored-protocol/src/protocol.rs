//! Request framing and the fixed response vocabulary.
//!
//! One connection carries exactly one request and one response. A request is
//! a colon-delimited ASCII line closed by a literal `:EOM:` marker:
//!
//! ```text
//! <password>:<opaque-instructions>:EOM:
//! ```
//!
//! The first field is the claimed password; everything between it and the
//! terminator is handed to the instruction executor without interpretation.

use crate::errors::FrameError;

/// Literal end-of-message marker every well-formed request must contain.
pub const EOM_MARKER: &str = ":EOM:";

/// Maximum request size in bytes. The engine issues a single read of this
/// size per connection; a request that fills the buffer is rejected as too
/// large rather than silently truncated.
pub const MAX_REQUEST_SIZE: usize = 8192;

/// Maximum accepted password field length in bytes.
pub const MAX_PASSWORD_SIZE: usize = 2048;

/// Length of a SHA-512 digest rendered as lowercase hex.
pub const REFERENCE_DIGEST_HEX_LEN: usize = 128;

/// Terminal status of one request, with its fixed wire line and log label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStatus {
    Success,
    AuthFail,
    ReqFail,
}

impl ResponseStatus {
    /// Numeric status code as it appears on the wire.
    pub fn code(&self) -> u8 {
        match self {
            Self::Success => 0,
            Self::AuthFail => 1,
            Self::ReqFail => 2,
        }
    }

    /// Label written to the transaction log.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::AuthFail => "AUTH_FAIL",
            Self::ReqFail => "REQ_FAIL",
        }
    }

    /// The exact response line sent to the client, newline included.
    pub fn wire_line(&self) -> &'static str {
        match self {
            Self::Success => "0:SUCCESS:EOM:\n",
            Self::AuthFail => "1:AUTH_FAIL:EOM:\n",
            Self::ReqFail => "2:REQ_FAIL:EOM:\n",
        }
    }
}

impl std::fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A framed request: the claimed password and the opaque instruction payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// First colon-delimited field.
    pub password: String,
    /// Everything between the password and the `:EOM:` marker, uninterpreted.
    pub instructions: String,
}

/// Frame a raw request buffer into a typed [`Request`].
///
/// Framing is checked before anything else: a buffer without the `:EOM:`
/// marker is malformed regardless of its other content. An empty password
/// field is rejected rather than passed on (the ancestral parser fell over
/// on it), and an over-long password is an explicit error instead of a
/// silent truncation.
pub fn parse_request(raw: &[u8]) -> Result<Request, FrameError> {
    if raw.len() > MAX_REQUEST_SIZE {
        return Err(FrameError::RequestTooLarge {
            size: raw.len(),
            max: MAX_REQUEST_SIZE,
        });
    }

    let text = std::str::from_utf8(raw)?;

    let marker = text
        .find(EOM_MARKER)
        .ok_or(FrameError::MissingTerminator)?;
    let body = &text[..marker];

    // Password is the field before the first ':'; the marker itself starts
    // with ':', so a bare "<password>:EOM:" frame yields empty instructions.
    let (password, instructions) = match body.split_once(':') {
        Some((pw, rest)) => (pw, rest),
        None => (body, ""),
    };

    if password.is_empty() {
        return Err(FrameError::MissingPassword);
    }
    if password.len() > MAX_PASSWORD_SIZE {
        return Err(FrameError::PasswordTooLarge {
            size: password.len(),
            max: MAX_PASSWORD_SIZE,
        });
    }

    Ok(Request {
        password: password.to_string(),
        instructions: instructions.to_string(),
    })
}
