//! Read-only item snapshots, containers, and the name/lore collaborator.

use std::collections::HashMap;

use crate::error::DescribeError;

/// Durability state of a damageable item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Durability {
    pub damage: u32,
    pub max: u32,
}

impl Durability {
    pub fn remaining(&self) -> u32 {
        self.max.saturating_sub(self.damage)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enchantment {
    pub id: String,
    pub level: u32,
}

/// A snapshot of one item stack, as the host reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemSnapshot {
    /// Namespaced type identifier, e.g. `minecraft:iron_sword`.
    pub identifier: String,
    pub amount: i32,
    pub name_tag: Option<String>,
    pub durability: Option<Durability>,
    pub enchantments: Vec<Enchantment>,
    pub lore: Vec<String>,
}

impl ItemSnapshot {
    pub fn new(identifier: impl Into<String>, amount: i32) -> Self {
        Self {
            identifier: identifier.into(),
            amount,
            name_tag: None,
            durability: None,
            enchantments: Vec::new(),
            lore: Vec::new(),
        }
    }

    pub fn with_durability(mut self, damage: u32, max: u32) -> Self {
        self.durability = Some(Durability { damage, max });
        self
    }

    pub fn with_enchantment(mut self, id: impl Into<String>, level: u32) -> Self {
        self.enchantments.push(Enchantment {
            id: id.into(),
            level,
        });
        self
    }

    pub fn with_name_tag(mut self, name: impl Into<String>) -> Self {
        self.name_tag = Some(name.into());
        self
    }

    pub fn is_enchanted(&self) -> bool {
        !self.enchantments.is_empty()
    }
}

/// Fixed-size ordered item container.
pub trait Container {
    fn size(&self) -> usize;
    fn item(&self, slot: usize) -> Option<&ItemSnapshot>;
}

impl Container for [Option<ItemSnapshot>] {
    fn size(&self) -> usize {
        self.len()
    }

    fn item(&self, slot: usize) -> Option<&ItemSnapshot> {
        self.get(slot).and_then(Option::as_ref)
    }
}

impl Container for Vec<Option<ItemSnapshot>> {
    fn size(&self) -> usize {
        self.len()
    }

    fn item(&self, slot: usize) -> Option<&ItemSnapshot> {
        self.get(slot).and_then(Option::as_ref)
    }
}

/// Access to each player's live inventory.
pub trait InventorySource {
    fn inventory(&self, user: &str) -> Option<&dyn Container>;
}

impl InventorySource for HashMap<String, Vec<Option<ItemSnapshot>>> {
    fn inventory(&self, user: &str) -> Option<&dyn Container> {
        self.get(user).map(|inv| inv as &dyn Container)
    }
}

/// Resolves display names and lore lines for projected items.
pub trait ItemDescriber: Send + Sync {
    fn display_name(&self, item: &ItemSnapshot) -> Result<String, DescribeError>;
    fn lore_lines(&self, item: &ItemSnapshot) -> Result<Vec<String>, DescribeError>;
}

/// `minecraft:iron_sword` -> `Iron Sword`.
pub fn fallback_display_name(identifier: &str) -> String {
    let bare = identifier.rsplit_once(':').map_or(identifier, |(_, name)| name);
    let words: Vec<String> = bare
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect();
    if words.is_empty() {
        "Unknown Item".to_string()
    } else {
        words.join(" ")
    }
}

fn roman(level: u32) -> String {
    const NUMERALS: [&str; 10] = ["I", "II", "III", "IV", "V", "VI", "VII", "VIII", "IX", "X"];
    match level {
        1..=10 => NUMERALS[level as usize - 1].to_string(),
        _ => level.to_string(),
    }
}

/// Name tag or cleaned identifier; enchantment, durability and identifier lore.
#[derive(Debug, Default, Clone, Copy)]
pub struct BasicDescriber;

impl ItemDescriber for BasicDescriber {
    fn display_name(&self, item: &ItemSnapshot) -> Result<String, DescribeError> {
        match item.name_tag.as_deref().map(str::trim) {
            Some(tag) if !tag.is_empty() => Ok(tag.to_string()),
            _ => Ok(fallback_display_name(&item.identifier)),
        }
    }

    fn lore_lines(&self, item: &ItemSnapshot) -> Result<Vec<String>, DescribeError> {
        let mut lines = Vec::new();

        if !item.enchantments.is_empty() {
            for ench in &item.enchantments {
                let color = if ench.id.contains("curse") { "§c" } else { "§9" };
                let name = fallback_display_name(&ench.id);
                if ench.level > 1 {
                    lines.push(format!("{color}{name} {}", roman(ench.level)));
                } else {
                    lines.push(format!("{color}{name}"));
                }
            }
            lines.push(String::new());
        }

        if let Some(dur) = item.durability {
            if dur.max == 0 {
                return Err(DescribeError::MissingComponent {
                    identifier: item.identifier.clone(),
                    component: "durability",
                });
            }
            lines.push(format!("§7Durability: {} / {}", dur.remaining(), dur.max));
        }

        lines.push(format!("§8{}", item.identifier));

        if !item.lore.is_empty() {
            lines.push(String::new());
            lines.extend(item.lore.iter().cloned());
        }
        Ok(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_names() {
        assert_eq!(fallback_display_name("minecraft:iron_sword"), "Iron Sword");
        assert_eq!(fallback_display_name("stone"), "Stone");
        assert_eq!(fallback_display_name("minecraft:"), "Unknown Item");
    }

    #[test]
    fn name_tag_wins_over_identifier() {
        let item = ItemSnapshot::new("minecraft:stick", 1).with_name_tag("Wand");
        assert_eq!(BasicDescriber.display_name(&item).unwrap(), "Wand");
        let blank = ItemSnapshot::new("minecraft:stick", 1).with_name_tag("  ");
        assert_eq!(BasicDescriber.display_name(&blank).unwrap(), "Stick");
    }

    #[test]
    fn lore_for_enchanted_damaged_sword() {
        let item = ItemSnapshot::new("minecraft:iron_sword", 1)
            .with_durability(50, 250)
            .with_enchantment("minecraft:sharpness", 5)
            .with_enchantment("minecraft:curse_of_vanishing", 1);
        let lore = BasicDescriber.lore_lines(&item).unwrap();
        assert_eq!(
            lore,
            vec![
                "§9Sharpness V".to_string(),
                "§cCurse Of Vanishing".to_string(),
                String::new(),
                "§7Durability: 200 / 250".to_string(),
                "§8minecraft:iron_sword".to_string(),
            ]
        );
    }

    #[test]
    fn zero_max_durability_is_a_describe_error() {
        let item = ItemSnapshot::new("minecraft:bow", 1).with_durability(3, 0);
        assert!(BasicDescriber.lore_lines(&item).is_err());
    }

    #[test]
    fn containers_report_empty_slots() {
        let inv: Vec<Option<ItemSnapshot>> = vec![Some(ItemSnapshot::new("minecraft:dirt", 3)), None];
        assert_eq!(inv.size(), 2);
        assert!(inv.item(0).is_some());
        assert!(inv.item(1).is_none());
        assert!(inv.item(9).is_none());

        let mut players = HashMap::new();
        players.insert("Alice".to_string(), inv);
        assert_eq!(players.inventory("Alice").map(|c| c.size()), Some(2));
        assert!(players.inventory("Bob").is_none());
    }
}
