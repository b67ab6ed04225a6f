use thiserror::Error;

/// Ways a raw request buffer can fail to frame into a [`crate::Request`].
///
/// Every variant maps to the `REQ_FAIL` wire status; the variants exist so
/// the engine can log and tests can assert the precise cause.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("request does not contain the :EOM: terminator")]
    MissingTerminator,

    #[error("request has no password field before the first ':'")]
    MissingPassword,

    #[error("request of {size} bytes exceeds the {max} byte limit")]
    RequestTooLarge { size: usize, max: usize },

    #[error("password field of {size} bytes exceeds the {max} byte limit")]
    PasswordTooLarge { size: usize, max: usize },

    #[error("request is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
}
