//! Errors surfaced by the form service and its collaborators.

use chest_ui_proto::ProtoError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormError {
    #[error("no pending form with id {form_id}")]
    UnknownForm { form_id: u32 },

    #[error("form {form_id} was sent to {expected}, answered by {actual}")]
    UserMismatch {
        form_id: u32,
        expected: String,
        actual: String,
    },

    #[error("player {0} disconnected before answering")]
    Disconnected(String),

    #[error("form {form_id} rejected: {reason}")]
    Rejected { form_id: u32, reason: String },

    #[error("protocol error: {0}")]
    Proto(#[from] ProtoError),
}

/// Failure inside the name/lore collaborator for a single item.
#[derive(Debug, Error)]
pub enum DescribeError {
    #[error("item {identifier} is missing its {component} component")]
    MissingComponent {
        identifier: String,
        component: &'static str,
    },

    #[error("cannot describe item: {0}")]
    Other(String),
}
