//! Button label grammar.
//!
//! The resource pack reads stack size and durability from the start of each
//! button label, so every label begins with a fixed-width prefix:
//!
//! ```text
//! label  := "stack#" NN "dur#" NN "§r" text { "\n" line }
//! NN     := two decimal digits, zero padded
//! ```
//!
//! Stack size is clamped to `1..=99`, durability to `0..=99`.

use chest_ui_proto::{RawMessage, StyledText};

/// Formatting reset code.
pub const RESET: &str = "§r";

const STACK_TAG: &str = "stack#";
const DURABILITY_TAG: &str = "dur#";

/// Stack size and durability carried at the start of a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelPrefix {
    stack: u8,
    durability: u8,
}

impl LabelPrefix {
    pub fn new(stack: i64, durability: i64) -> Self {
        Self {
            stack: stack.clamp(1, 99) as u8,
            durability: durability.clamp(0, 99) as u8,
        }
    }

    pub fn stack(&self) -> u8 {
        self.stack
    }

    pub fn durability(&self) -> u8 {
        self.durability
    }

    pub fn render(&self) -> String {
        format!(
            "{STACK_TAG}{:02}{DURABILITY_TAG}{:02}{RESET}",
            self.stack, self.durability
        )
    }

    /// Split a label into its prefix and the remaining text.
    pub fn parse(label: &str) -> Option<(Self, &str)> {
        let rest = label.strip_prefix(STACK_TAG)?;
        let (stack, rest) = two_digits(rest)?;
        let rest = rest.strip_prefix(DURABILITY_TAG)?;
        let (durability, rest) = two_digits(rest)?;
        let rest = rest.strip_prefix(RESET)?;
        Some((Self { stack, durability }, rest))
    }
}

fn two_digits(s: &str) -> Option<(u8, &str)> {
    let digits = s.get(..2)?;
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((digits.parse().ok()?, &s[2..]))
}

/// Label for a fixed grid button.
///
/// The name is closed with a reset code; description lines each start on a
/// new line.
pub fn button_label(prefix: LabelPrefix, name: &StyledText, description: &[StyledText]) -> RawMessage {
    let mut label = RawMessage::new();
    match name {
        StyledText::Plain(text) => {
            label.push_text(format!("{}{text}{RESET}", prefix.render()));
        }
        StyledText::Raw(raw) => {
            label.push_text(prefix.render());
            label.append(&StyledText::Raw(raw.clone()));
            label.push_text(RESET);
        }
    }
    append_lines(&mut label, description);
    label
}

/// Label for a projected inventory item.
pub fn item_label(prefix: LabelPrefix, name: &str, lines: &[String]) -> RawMessage {
    let mut label = RawMessage::new();
    label.push_text(format!("{}{name}", prefix.render()));
    for line in lines {
        label.push_text(format!("\n{line}"));
    }
    label
}

fn append_lines(label: &mut RawMessage, lines: &[StyledText]) {
    for line in lines {
        match line {
            StyledText::Plain(text) => {
                label.push_text(format!("\n{text}"));
            }
            StyledText::Raw(raw) => {
                label.push_text("\n");
                label.append(&StyledText::Raw(raw.clone()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chest_ui_proto::TextSegment;

    #[test]
    fn fields_are_clamped_and_padded() {
        let cases = [(0, "00"), (1, "01"), (99, "99"), (150, "99")];
        for (input, expected) in cases {
            let prefix = LabelPrefix::new(input, input);
            let stack = if input == 0 { "01" } else { expected };
            assert_eq!(prefix.render(), format!("stack#{stack}dur#{expected}§r"));
        }
        assert_eq!(LabelPrefix::new(-5, -5).render(), "stack#01dur#00§r");
    }

    #[test]
    fn parse_splits_prefix_from_text() {
        let (prefix, rest) = LabelPrefix::parse("stack#16dur#07§rAnvil§r").unwrap();
        assert_eq!(prefix.stack(), 16);
        assert_eq!(prefix.durability(), 7);
        assert_eq!(rest, "Anvil§r");
    }

    #[test]
    fn parse_rejects_malformed_prefixes() {
        assert!(LabelPrefix::parse("Anvil").is_none());
        assert!(LabelPrefix::parse("stack#1dur#07§rAnvil").is_none());
        assert!(LabelPrefix::parse("stack#16dur#07Anvil").is_none());
        assert!(LabelPrefix::parse("stack#ABdur#07§r").is_none());
        assert!(LabelPrefix::parse("stack#").is_none());
    }

    #[test]
    fn rendered_prefix_parses_back() {
        let prefix = LabelPrefix::new(64, 33);
        let label = format!("{}Stone", prefix.render());
        assert_eq!(LabelPrefix::parse(&label), Some((prefix, "Stone")));
    }

    #[test]
    fn plain_button_label() {
        let label = button_label(
            LabelPrefix::new(1, 0),
            &"Anvil".into(),
            &["§7Heavy".into(), "Second".into()],
        );
        assert_eq!(label.plain_text(), "stack#01dur#00§rAnvil§r\n§7Heavy\nSecond");
        assert_eq!(label.rawtext.len(), 3);
    }

    #[test]
    fn structured_name_is_spliced() {
        let mut name = RawMessage::new();
        name.rawtext.push(TextSegment::translate("item.anvil.name"));
        let label = button_label(LabelPrefix::new(2, 0), &name.into(), &[]);
        assert_eq!(
            label.rawtext,
            vec![
                TextSegment::text("stack#02dur#00§r"),
                TextSegment::translate("item.anvil.name"),
                TextSegment::text("§r"),
            ]
        );
    }

    #[test]
    fn item_label_lines() {
        let label = item_label(LabelPrefix::new(5, 40), "Iron Sword", &["§8minecraft:iron_sword".into()]);
        assert_eq!(
            label.plain_text(),
            "stack#05dur#40§rIron Sword\n§8minecraft:iron_sword"
        );
    }
}
