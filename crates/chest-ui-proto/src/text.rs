//! Styled text: either a plain string or an ordered list of rawtext segments.

use serde::{Deserialize, Serialize};

use crate::error::ProtoError;

/// One rawtext segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextSegment {
    Text {
        text: String,
    },
    Translate {
        translate: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        with: Vec<String>,
    },
}

impl TextSegment {
    pub fn text(s: impl Into<String>) -> Self {
        TextSegment::Text { text: s.into() }
    }

    pub fn translate(key: impl Into<String>) -> Self {
        TextSegment::Translate {
            translate: key.into(),
            with: Vec::new(),
        }
    }
}

/// A structured message, serialised as `{"rawtext":[...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMessage {
    pub rawtext: Vec<TextSegment>,
}

impl RawMessage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_text(&mut self, s: impl Into<String>) -> &mut Self {
        self.rawtext.push(TextSegment::text(s));
        self
    }

    /// Append styled text: segment lists are spliced in place, plain strings
    /// become a single text segment.
    pub fn append(&mut self, text: &StyledText) -> &mut Self {
        match text {
            StyledText::Plain(s) => {
                self.rawtext.push(TextSegment::text(s.clone()));
            }
            StyledText::Raw(raw) => self.rawtext.extend(raw.rawtext.iter().cloned()),
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.rawtext.is_empty()
    }

    /// Flatten to a readable string. Translation keys are shown verbatim.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for segment in &self.rawtext {
            match segment {
                TextSegment::Text { text } => out.push_str(text),
                TextSegment::Translate { translate, .. } => out.push_str(translate),
            }
        }
        out
    }

    /// The string placed in a form JSON field; the client re-parses it as rawtext.
    pub fn to_wire_string(&self) -> Result<String, ProtoError> {
        serde_json::to_string(self).map_err(|e| ProtoError::JsonEncode(e.to_string()))
    }
}

/// Text accepted anywhere a label or title is expected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StyledText {
    Plain(String),
    Raw(RawMessage),
}

impl StyledText {
    pub fn plain_text(&self) -> String {
        match self {
            StyledText::Plain(s) => s.clone(),
            StyledText::Raw(raw) => raw.plain_text(),
        }
    }
}

impl From<&str> for StyledText {
    fn from(s: &str) -> Self {
        StyledText::Plain(s.to_string())
    }
}

impl From<String> for StyledText {
    fn from(s: String) -> Self {
        StyledText::Plain(s)
    }
}

impl From<RawMessage> for StyledText {
    fn from(raw: RawMessage) -> Self {
        StyledText::Raw(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_splices_segments_and_wraps_strings() {
        let mut msg = RawMessage::new();
        msg.push_text("§c§h§e§s§t§2§7§r");
        msg.append(&"Shop".into());
        let mut nested = RawMessage::new();
        nested.rawtext.push(TextSegment::translate("menu.title"));
        nested.push_text("!");
        msg.append(&nested.into());
        assert_eq!(msg.rawtext.len(), 4);
        assert_eq!(msg.rawtext[1], TextSegment::text("Shop"));
        assert_eq!(msg.rawtext[2], TextSegment::translate("menu.title"));
    }

    #[test]
    fn wire_string_is_rawtext_json() {
        let mut msg = RawMessage::new();
        msg.push_text("a");
        msg.rawtext.push(TextSegment::translate("b"));
        assert_eq!(
            msg.to_wire_string().unwrap(),
            r#"{"rawtext":[{"text":"a"},{"translate":"b"}]}"#
        );
    }

    #[test]
    fn styled_text_deserializes_both_shapes() {
        let plain: StyledText = serde_json::from_str(r#""hello""#).unwrap();
        assert_eq!(plain, StyledText::Plain("hello".into()));
        let raw: StyledText =
            serde_json::from_str(r#"{"rawtext":[{"translate":"k","with":["1"]}]}"#).unwrap();
        match raw {
            StyledText::Raw(m) => assert_eq!(m.plain_text(), "k"),
            other => panic!("expected rawtext, got {other:?}"),
        }
    }
}
