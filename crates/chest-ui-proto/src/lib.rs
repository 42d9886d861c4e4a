//! Wire-level dialog primitive for chest-style forms.
//!
//! Styled text, the action-form JSON document, and the two Bedrock packets
//! that carry a form to a client and its answer back.

pub mod codec;
pub mod error;
pub mod form;
pub mod packets;
pub mod text;
pub mod types;

pub use error::ProtoError;
pub use form::{ActionForm, FormButton, FormCancelReason, FormResult};
pub use text::{RawMessage, StyledText, TextSegment};
