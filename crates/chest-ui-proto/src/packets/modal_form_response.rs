//! ModalFormResponse (0x65): Client → Server.
//!
//! The client's response to a ModalFormRequest.

use bytes::{Buf, BufMut};

use crate::codec::{self, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;
use crate::types::VarUInt32;

/// Client response to a form.
#[derive(Debug, Clone)]
pub struct ModalFormResponse {
    /// The form ID from the original request.
    pub form_id: u32,
    pub has_response_data: bool,
    /// JSON response data; present only if `has_response_data` is true.
    pub response_data: Option<String>,
    pub has_cancel_reason: bool,
    /// Present only if `has_cancel_reason` is true.
    pub cancel_reason: Option<u8>,
}

impl ModalFormResponse {
    /// A click on button `index`.
    pub fn selection(form_id: u32, index: u32) -> Self {
        Self {
            form_id,
            has_response_data: true,
            response_data: Some(index.to_string()),
            has_cancel_reason: false,
            cancel_reason: None,
        }
    }

    /// The form was closed without a selection.
    pub fn closed(form_id: u32, reason: u8) -> Self {
        Self {
            form_id,
            has_response_data: false,
            response_data: None,
            has_cancel_reason: true,
            cancel_reason: Some(reason),
        }
    }
}

impl ProtoDecode for ModalFormResponse {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let form_id = VarUInt32::proto_decode(buf)?.0;

        if buf.remaining() < 1 {
            return Err(ProtoError::BufferTooShort {
                needed: 1,
                remaining: 0,
            });
        }
        let has_response_data = buf.get_u8() != 0;
        let response_data = if has_response_data {
            Some(codec::read_string(buf)?)
        } else {
            None
        };

        // Older clients omit the cancel-reason block entirely.
        let has_cancel_reason = buf.has_remaining() && buf.get_u8() != 0;
        let cancel_reason = if has_cancel_reason && buf.has_remaining() {
            Some(buf.get_u8())
        } else {
            None
        };

        Ok(Self {
            form_id,
            has_response_data,
            response_data,
            has_cancel_reason,
            cancel_reason,
        })
    }
}

impl ProtoEncode for ModalFormResponse {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        VarUInt32(self.form_id).proto_encode(buf);
        match &self.response_data {
            Some(data) if self.has_response_data => {
                buf.put_u8(1);
                codec::write_string(buf, data);
            }
            _ => buf.put_u8(0),
        }
        match self.cancel_reason {
            Some(reason) if self.has_cancel_reason => {
                buf.put_u8(1);
                buf.put_u8(reason);
            }
            _ => buf.put_u8(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn decode_with_response() {
        let mut buf = BytesMut::new();
        buf.put_u8(5);
        buf.put_u8(1);
        buf.put_u8(2);
        buf.put_slice(b"42");
        buf.put_u8(0);

        let pkt = ModalFormResponse::proto_decode(&mut buf.freeze()).unwrap();
        assert_eq!(pkt.form_id, 5);
        assert_eq!(pkt.response_data.as_deref(), Some("42"));
        assert!(!pkt.has_cancel_reason);
    }

    #[test]
    fn decode_without_cancel_block() {
        let bytes = [7u8, 1, 1, b'3'];
        let pkt = ModalFormResponse::proto_decode(&mut &bytes[..]).unwrap();
        assert_eq!(pkt.response_data.as_deref(), Some("3"));
        assert!(pkt.cancel_reason.is_none());
    }

    #[test]
    fn closed_response_survives_the_wire() {
        let mut buf = BytesMut::new();
        ModalFormResponse::closed(10, 0).proto_encode(&mut buf);
        assert_eq!(&buf[..], &[10, 0, 1, 0]);
        let pkt = ModalFormResponse::proto_decode(&mut buf.freeze()).unwrap();
        assert!(!pkt.has_response_data);
        assert_eq!(pkt.cancel_reason, Some(0));
    }

    #[test]
    fn selection_response_survives_the_wire() {
        let mut buf = BytesMut::new();
        ModalFormResponse::selection(3, 31).proto_encode(&mut buf);
        let pkt = ModalFormResponse::proto_decode(&mut buf.freeze()).unwrap();
        assert_eq!(pkt.form_id, 3);
        assert_eq!(pkt.response_data.as_deref(), Some("31"));
    }
}
