//! Grid builder: a fixed-length array of labeled, iconified cells.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chest_ui_proto::{RawMessage, StyledText};
use serde::Deserialize;
use thiserror::Error;

use crate::icon::{IconCode, IconEncoder};
use crate::label::{self, LabelPrefix};
use crate::projector::SlotOverride;

/// The native grids the resource pack can skin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum GridSize {
    Chest1,
    Chest5,
    Chest9,
    Chest18,
    #[default]
    Chest27,
    Chest36,
    Chest45,
    Chest54,
    Furnace,
    FurnaceLit,
}

impl GridSize {
    pub fn slot_count(self) -> usize {
        match self {
            GridSize::Chest1 => 1,
            GridSize::Chest5 => 5,
            GridSize::Chest9 => 9,
            GridSize::Chest18 => 18,
            GridSize::Chest27 => 27,
            GridSize::Chest36 => 36,
            GridSize::Chest45 => 45,
            GridSize::Chest54 => 54,
            GridSize::Furnace | GridSize::FurnaceLit => 3,
        }
    }

    /// Cells per row, used by [`ChestForm::pattern`].
    pub fn columns(self) -> usize {
        match self {
            GridSize::Furnace | GridSize::FurnaceLit => 3,
            _ => 9,
        }
    }

    fn tag(self) -> &'static str {
        match self {
            GridSize::Chest1 => "chest01",
            GridSize::Chest5 => "chest05",
            GridSize::Chest9 => "chest09",
            GridSize::Chest18 => "chest18",
            GridSize::Chest27 => "chest27",
            GridSize::Chest36 => "chest36",
            GridSize::Chest45 => "chest45",
            GridSize::Chest54 => "chest54",
            GridSize::Furnace => "furnace",
            GridSize::FurnaceLit => "furnacelit",
        }
    }

    /// Hidden title prefix that selects the grid skin: `§c§h§e§s§t§2§7§r`.
    pub fn skin_marker(self) -> String {
        let mut marker = String::new();
        for c in self.tag().chars() {
            marker.push('§');
            marker.push(c);
        }
        marker.push_str(label::RESET);
        marker
    }

    /// Parse a size name, falling back to a single chest for unknown names.
    pub fn from_name(name: &str) -> Self {
        name.parse().unwrap_or(GridSize::Chest27)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown grid size: {0}")]
pub struct UnknownGridSize(pub String);

impl FromStr for GridSize {
    type Err = UnknownGridSize;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "1" => GridSize::Chest1,
            "5" => GridSize::Chest5,
            "9" => GridSize::Chest9,
            "18" => GridSize::Chest18,
            "small" | "single" | "27" => GridSize::Chest27,
            "36" => GridSize::Chest36,
            "45" => GridSize::Chest45,
            "large" | "double" | "54" => GridSize::Chest54,
            "furnace" => GridSize::Furnace,
            "furnace_lit" | "lit_furnace" => GridSize::FurnaceLit,
            other => return Err(UnknownGridSize(other.to_string())),
        })
    }
}

impl TryFrom<String> for GridSize {
    type Error = UnknownGridSize;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// A rendered cell: what one form button shows.
///
/// An empty cell has a blank label and no icon; the pack draws nothing and
/// the button does nothing useful when clicked.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub label: StyledText,
    pub icon: Option<IconCode>,
}

impl Cell {
    pub fn empty() -> Self {
        Self {
            label: StyledText::Plain(String::new()),
            icon: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.icon.is_none() && matches!(&self.label, StyledText::Plain(s) if s.is_empty())
    }
}

/// Everything needed to place one button.
#[derive(Debug, Clone, PartialEq)]
pub struct ButtonSpec {
    /// `None` makes placement a no-op.
    pub name: Option<StyledText>,
    pub description: Vec<StyledText>,
    pub texture: String,
    pub stack_size: i64,
    pub durability: i64,
    pub enchanted: bool,
}

impl ButtonSpec {
    pub fn new(name: impl Into<StyledText>, texture: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            description: Vec::new(),
            texture: texture.into(),
            stack_size: 1,
            durability: 0,
            enchanted: false,
        }
    }

    /// A spec without a label. Placing it leaves the target cell untouched.
    pub fn unnamed(texture: impl Into<String>) -> Self {
        Self {
            name: None,
            ..Self::new("", texture)
        }
    }

    pub fn description<I, T>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<StyledText>,
    {
        self.description = lines.into_iter().map(Into::into).collect();
        self
    }

    pub fn stack_size(mut self, amount: i64) -> Self {
        self.stack_size = amount;
        self
    }

    pub fn durability(mut self, durability: i64) -> Self {
        self.durability = durability;
        self
    }

    pub fn enchanted(mut self, enchanted: bool) -> Self {
        self.enchanted = enchanted;
        self
    }
}

/// A placed button whose icon is encoded at render time, so the live custom
/// offset is read on every render.
#[derive(Debug, Clone, PartialEq)]
enum GridEntry {
    Empty,
    Button {
        label: RawMessage,
        texture: String,
        enchanted: bool,
    },
}

/// Returns true for inventory slots that should render as empty.
pub type HidePredicate = Arc<dyn Fn(u32) -> bool + Send + Sync>;

/// A chest-style form under construction.
#[derive(Clone)]
pub struct ChestForm {
    size: GridSize,
    title: RawMessage,
    entries: Vec<GridEntry>,
    overrides: HashMap<u32, SlotOverride>,
    hide: Option<HidePredicate>,
    inventory: Option<bool>,
}

impl fmt::Debug for ChestForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChestForm")
            .field("size", &self.size)
            .field("title", &self.title.plain_text())
            .field("placed", &self.placed_count())
            .field("overrides", &self.overrides.len())
            .finish()
    }
}

impl ChestForm {
    pub fn new(size: GridSize) -> Self {
        let mut title = RawMessage::new();
        title.push_text(size.skin_marker());
        Self {
            size,
            title,
            entries: vec![GridEntry::Empty; size.slot_count()],
            overrides: HashMap::new(),
            hide: None,
            inventory: None,
        }
    }

    pub fn size(&self) -> GridSize {
        self.size
    }

    pub fn slot_count(&self) -> usize {
        self.entries.len()
    }

    pub fn title_message(&self) -> &RawMessage {
        &self.title
    }

    /// Append to the title. Calls accumulate after the skin marker.
    pub fn title(&mut self, text: impl Into<StyledText>) -> &mut Self {
        self.title.append(&text.into());
        self
    }

    /// Place a button. Out-of-range slots are clamped into the grid rather
    /// than rejected, so an off-by-one lands on the nearest edge cell.
    pub fn button(&mut self, slot: i64, spec: &ButtonSpec) -> &mut Self {
        let Some(name) = &spec.name else {
            return self;
        };
        let last = self.entries.len() as i64 - 1;
        let index = slot.clamp(0, last) as usize;
        let prefix = LabelPrefix::new(spec.stack_size, spec.durability);
        self.entries[index] = GridEntry::Button {
            label: label::button_label(prefix, name, &spec.description),
            texture: spec.texture.clone(),
            enchanted: spec.enchanted,
        };
        self
    }

    /// Fill cells from rows of legend characters. Characters missing from
    /// `key` are skipped.
    pub fn pattern<S: AsRef<str>>(&mut self, rows: &[S], key: &HashMap<char, ButtonSpec>) -> &mut Self {
        let columns = self.size.columns();
        for (row, line) in rows.iter().enumerate() {
            for (column, c) in line.as_ref().chars().enumerate() {
                if let Some(spec) = key.get(&c) {
                    self.button((column + row * columns) as i64, spec);
                }
            }
        }
        self
    }

    /// Alter how one inventory slot is projected without touching the item.
    pub fn override_inventory_slot(&mut self, slot: u32, data: SlotOverride) -> &mut Self {
        self.overrides.insert(slot, data);
        self
    }

    pub fn hide_inventory_slots<F>(&mut self, predicate: F) -> &mut Self
    where
        F: Fn(u32) -> bool + Send + Sync + 'static,
    {
        self.hide = Some(Arc::new(predicate));
        self
    }

    /// Force inventory projection on or off for this form.
    pub fn with_inventory(&mut self, enabled: bool) -> &mut Self {
        self.inventory = Some(enabled);
        self
    }

    pub fn inventory_enabled(&self) -> Option<bool> {
        self.inventory
    }

    pub fn overrides(&self) -> &HashMap<u32, SlotOverride> {
        &self.overrides
    }

    pub fn hide_predicate(&self) -> Option<&HidePredicate> {
        self.hide.as_ref()
    }

    pub fn placed_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e, GridEntry::Button { .. }))
            .count()
    }

    /// Encode the fixed grid into cells.
    pub fn cells(&self, encoder: &IconEncoder) -> Vec<Cell> {
        self.entries
            .iter()
            .map(|entry| match entry {
                GridEntry::Empty => Cell::empty(),
                GridEntry::Button {
                    label,
                    texture,
                    enchanted,
                } => Cell {
                    label: StyledText::Raw(label.clone()),
                    icon: Some(encoder.icon_for(texture, *enchanted)),
                },
            })
            .collect()
    }
}
