//! Packets that carry a form between server and client.

pub mod modal_form_request;
pub mod modal_form_response;

pub use modal_form_request::ModalFormRequest;
pub use modal_form_response::ModalFormResponse;

/// Packet IDs.
pub mod id {
    pub const MODAL_FORM_REQUEST: u32 = 0x64;
    pub const MODAL_FORM_RESPONSE: u32 = 0x65;
}
