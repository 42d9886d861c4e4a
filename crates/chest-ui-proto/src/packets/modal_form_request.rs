//! ModalFormRequest (0x64): Server → Client.
//!
//! Sends a form to the client as a JSON string.

use bytes::{Buf, BufMut};

use crate::codec::{self, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;
use crate::form::ActionForm;
use crate::types::VarUInt32;

/// A server-initiated form request.
#[derive(Debug, Clone)]
pub struct ModalFormRequest {
    /// Unique form ID used to correlate the response.
    pub form_id: u32,
    /// JSON-encoded form data.
    pub form_data: String,
}

impl ModalFormRequest {
    pub fn action_form(form_id: u32, form: &ActionForm) -> Result<Self, ProtoError> {
        Ok(Self {
            form_id,
            form_data: form.to_json()?,
        })
    }
}

impl ProtoEncode for ModalFormRequest {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        VarUInt32(self.form_id).proto_encode(buf);
        codec::write_string(buf, &self.form_data);
    }
}

impl ProtoDecode for ModalFormRequest {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let form_id = VarUInt32::proto_decode(buf)?.0;
        let form_data = codec::read_string(buf)?;
        Ok(Self { form_id, form_data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::RawMessage;
    use bytes::BytesMut;

    #[test]
    fn encode_action_form_request() {
        let mut form = ActionForm::new(RawMessage::new());
        form.button("a", None);
        let pkt = ModalFormRequest::action_form(200, &form).unwrap();
        let mut buf = BytesMut::new();
        pkt.proto_encode(&mut buf);
        // form_id 200 needs two VarUInt32 bytes
        assert_eq!(&buf[..2], &[0xC8, 0x01]);
        assert!(buf[..].windows(6).any(|w| w == b"\"form\""));

        let decoded = ModalFormRequest::proto_decode(&mut buf.freeze()).unwrap();
        assert_eq!(decoded.form_id, 200);
        assert_eq!(decoded.form_data, pkt.form_data);
    }
}
