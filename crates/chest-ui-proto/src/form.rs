//! Action forms: a title plus an ordered list of (label, icon) buttons.
//!
//! This is the host's only rendering surface. The icon field is a single
//! string, so everything a button shows beyond its label must be packed into
//! that string by the caller.

use serde::Serialize;

use crate::error::ProtoError;
use crate::packets::ModalFormResponse;
use crate::text::{RawMessage, StyledText};

/// A single button of an action form.
#[derive(Debug, Clone, PartialEq)]
pub struct FormButton {
    pub label: StyledText,
    pub icon: Option<String>,
}

/// An action form ready to be sent to one player.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ActionForm {
    pub title: RawMessage,
    pub body: String,
    pub buttons: Vec<FormButton>,
}

#[derive(Serialize)]
struct WireForm<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    title: String,
    content: &'a str,
    buttons: Vec<WireButton>,
}

#[derive(Serialize)]
struct WireButton {
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<WireImage>,
}

#[derive(Serialize)]
struct WireImage {
    #[serde(rename = "type")]
    kind: &'static str,
    data: String,
}

fn wire_text(text: &StyledText) -> Result<String, ProtoError> {
    match text {
        StyledText::Plain(s) => Ok(s.clone()),
        StyledText::Raw(raw) => raw.to_wire_string(),
    }
}

impl ActionForm {
    pub fn new(title: RawMessage) -> Self {
        Self {
            title,
            body: String::new(),
            buttons: Vec::new(),
        }
    }

    pub fn button(&mut self, label: impl Into<StyledText>, icon: Option<String>) -> &mut Self {
        self.buttons.push(FormButton {
            label: label.into(),
            icon,
        });
        self
    }

    /// Serialise to the JSON carried by `ModalFormRequest::form_data`.
    pub fn to_json(&self) -> Result<String, ProtoError> {
        let buttons = self
            .buttons
            .iter()
            .map(|b| {
                Ok(WireButton {
                    text: wire_text(&b.label)?,
                    image: b.icon.as_ref().map(|data| WireImage {
                        kind: "path",
                        data: data.clone(),
                    }),
                })
            })
            .collect::<Result<Vec<_>, ProtoError>>()?;
        let wire = WireForm {
            kind: "form",
            title: self.title.to_wire_string()?,
            content: &self.body,
            buttons,
        };
        serde_json::to_string(&wire).map_err(|e| ProtoError::JsonEncode(e.to_string()))
    }
}

/// Why the client reported a form as cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormCancelReason {
    UserClosed,
    UserBusy,
    Unknown(u8),
}

impl From<u8> for FormCancelReason {
    fn from(v: u8) -> Self {
        match v {
            0 => FormCancelReason::UserClosed,
            1 => FormCancelReason::UserBusy,
            other => FormCancelReason::Unknown(other),
        }
    }
}

/// The decoded answer to an action form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormResult {
    pub canceled: bool,
    pub selection: Option<u32>,
    pub cancel_reason: Option<FormCancelReason>,
}

impl FormResult {
    pub fn selected(index: u32) -> Self {
        Self {
            canceled: false,
            selection: Some(index),
            cancel_reason: None,
        }
    }

    pub fn cancelled(reason: FormCancelReason) -> Self {
        Self {
            canceled: true,
            selection: None,
            cancel_reason: Some(reason),
        }
    }

    /// Decode a `ModalFormResponse` sent for an action form.
    ///
    /// Missing data and the JSON literal `null` both mean the form was closed.
    pub fn from_packet(packet: &ModalFormResponse) -> Result<Self, ProtoError> {
        let reason = packet
            .cancel_reason
            .map(FormCancelReason::from)
            .unwrap_or(FormCancelReason::UserClosed);
        let data = match packet.response_data.as_deref() {
            Some(d) => d.trim(),
            None => return Ok(Self::cancelled(reason)),
        };
        let value: serde_json::Value =
            serde_json::from_str(data).map_err(|e| ProtoError::JsonParse(e.to_string()))?;
        match value {
            serde_json::Value::Null => Ok(Self::cancelled(reason)),
            serde_json::Value::Number(n) => n
                .as_u64()
                .and_then(|v| u32::try_from(v).ok())
                .map(Self::selected)
                .ok_or_else(|| ProtoError::InvalidFormResponse(format!("bad selection {n}"))),
            other => Err(ProtoError::InvalidFormResponse(format!(
                "expected button index, got {other}"
            ))),
        }
    }
}
