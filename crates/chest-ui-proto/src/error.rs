//! Protocol-level errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtoError {
    #[error("buffer too short: need {needed} more bytes, have {remaining}")]
    BufferTooShort { needed: usize, remaining: usize },

    #[error("VarInt encoding error: {0}")]
    VarInt(#[from] crate::types::VarIntError),

    #[error("invalid UTF-8 string")]
    InvalidUtf8,

    #[error("JSON encode error: {0}")]
    JsonEncode(String),

    #[error("JSON parse error: {0}")]
    JsonParse(String),

    #[error("invalid form response: {0}")]
    InvalidFormResponse(String),
}
