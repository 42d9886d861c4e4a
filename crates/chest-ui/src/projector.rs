//! Inventory projection: the player's container rendered as extra cells
//! after the fixed grid, plus the button-to-slot map used to resolve clicks.

use std::collections::HashMap;

use chest_ui_proto::StyledText;
use tracing::warn;

use crate::grid::Cell;
use crate::icon::IconEncoder;
use crate::item::{fallback_display_name, Container, ItemDescriber, ItemSnapshot};
use crate::label::{self, LabelPrefix};

/// Projection-only changes to one inventory slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotOverride {
    /// Shown amount; `<= 0` renders the slot empty.
    pub amount: Option<i32>,
    pub display_name: Option<String>,
    /// Lines shown before the item's own lore.
    pub description: Option<Vec<String>>,
}

/// Button index to container slot for one rendered form.
///
/// Keys form the contiguous range starting right after the control buttons,
/// in container order, so the map is stored as a base plus a length.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotMap {
    control_button_count: usize,
    len: usize,
}

impl SlotMap {
    pub fn new(control_button_count: usize, container_size: usize) -> Self {
        Self {
            control_button_count,
            len: container_size,
        }
    }

    /// Container slot behind `button`, or `None` for control buttons and
    /// indices past the end.
    pub fn get(&self, button: u32) -> Option<u32> {
        let button = button as usize;
        if button >= self.control_button_count && button < self.control_button_count + self.len {
            Some((button - self.control_button_count) as u32)
        } else {
            None
        }
    }

    /// Button index that shows container `slot`.
    pub fn button_for_slot(&self, slot: u32) -> Option<u32> {
        ((slot as usize) < self.len).then(|| (self.control_button_count + slot as usize) as u32)
    }

    pub fn control_button_count(&self) -> usize {
        self.control_button_count
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// `(button, slot)` pairs in container order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (0..self.len).map(move |slot| ((self.control_button_count + slot) as u32, slot as u32))
    }
}

/// Cells for the container plus the map back to its slots.
#[derive(Debug, Clone)]
pub struct Projection {
    pub cells: Vec<Cell>,
    pub slot_map: SlotMap,
}

/// Renders container contents. Never mutates the container.
pub struct InventoryProjector<'a> {
    encoder: &'a IconEncoder,
    describer: &'a dyn ItemDescriber,
}

impl<'a> InventoryProjector<'a> {
    pub fn new(encoder: &'a IconEncoder, describer: &'a dyn ItemDescriber) -> Self {
        Self { encoder, describer }
    }

    pub fn project(
        &self,
        container: &dyn Container,
        control_button_count: usize,
        overrides: &HashMap<u32, SlotOverride>,
        hide: Option<&dyn Fn(u32) -> bool>,
    ) -> Projection {
        let size = container.size();
        let mut cells = Vec::with_capacity(size);

        for slot in 0..size {
            let item = container.item(slot);
            let slot_id = slot as u32;
            let over = overrides.get(&slot_id);
            let amount = over
                .and_then(|o| o.amount)
                .unwrap_or_else(|| item.map_or(0, |i| i.amount));

            let hidden = hide.is_some_and(|h| h(slot_id));
            if amount <= 0 || hidden {
                cells.push(Cell::empty());
                continue;
            }
            cells.push(self.item_cell(item, amount, over));
        }

        Projection {
            cells,
            slot_map: SlotMap::new(control_button_count, size),
        }
    }

    fn item_cell(&self, item: Option<&ItemSnapshot>, amount: i32, over: Option<&SlotOverride>) -> Cell {
        // An override can show an amount for an empty slot; render it as air.
        let identifier = item.map_or("minecraft:air", |i| i.identifier.as_str());

        let name = match over
            .and_then(|o| o.display_name.clone())
            .filter(|n| !n.is_empty())
        {
            Some(name) => name,
            None => item.map_or_else(
                || fallback_display_name(identifier),
                |i| self.display_name(i),
            ),
        };

        let mut lines = Vec::new();
        if let Some(description) = over.and_then(|o| o.description.as_ref()) {
            lines.extend(description.iter().cloned());
        }
        if let Some(i) = item {
            lines.extend(self.lore_lines(i));
        }

        let durability = item.map_or(0, durability_presentation);
        let enchanted = item.is_some_and(ItemSnapshot::is_enchanted);
        let prefix = LabelPrefix::new(i64::from(amount), i64::from(durability));

        Cell {
            label: StyledText::Raw(label::item_label(prefix, &name, &lines)),
            icon: Some(self.encoder.icon_for(identifier, enchanted)),
        }
    }

    fn display_name(&self, item: &ItemSnapshot) -> String {
        match self.describer.display_name(item) {
            Ok(name) => name,
            Err(e) => {
                warn!("Falling back to identifier name for {}: {e}", item.identifier);
                fallback_display_name(&item.identifier)
            }
        }
    }

    fn lore_lines(&self, item: &ItemSnapshot) -> Vec<String> {
        self.describer.lore_lines(item).unwrap_or_else(|e| {
            warn!("Dropping lore for {}: {e}", item.identifier);
            Vec::new()
        })
    }
}

/// Remaining durability scaled to `0..=99`; undamaged items show 0 and any
/// damage shows at least 1.
pub fn durability_presentation(item: &ItemSnapshot) -> u8 {
    match item.durability {
        Some(d) if d.damage > 0 && d.max == 0 => 1,
        Some(d) if d.damage > 0 => {
            let scaled = (f64::from(d.remaining()) / f64::from(d.max) * 99.0).round();
            (scaled as u8).clamp(1, 99)
        }
        _ => 0,
    }
}
