//! The answer to a chest form, resolved against its slot map.

use chest_ui_proto::{FormCancelReason, FormResult};

use crate::projector::SlotMap;

/// A form result plus where the click landed.
///
/// Handlers receive this by `&mut` and run synchronously. Setting
/// [`handled`](Self::handled) suppresses the automatic reopen for this click;
/// calling [`reopen`](Self::reopen) asks for the same form to be shown again
/// as soon as the handler returns.
///
/// `inventory_slot` is an index into the inventory as it was when the form was
/// rendered. The item there may have changed since; check it before acting.
#[derive(Debug, Clone)]
pub struct ChestFormResponse {
    pub user: String,
    pub form_id: u32,
    pub result: FormResult,
    /// Container slot behind the clicked button, `None` for control buttons.
    pub inventory_slot: Option<u32>,
    pub control_button_count: usize,
    pub slot_map: SlotMap,
    pub handled: bool,
    reopen_requested: bool,
}

impl ChestFormResponse {
    pub fn resolve(user: &str, form_id: u32, result: FormResult, slot_map: SlotMap) -> Self {
        let inventory_slot = match (result.canceled, result.selection) {
            (false, Some(index)) => slot_map.get(index),
            _ => None,
        };
        Self {
            user: user.to_string(),
            form_id,
            control_button_count: slot_map.control_button_count(),
            result,
            inventory_slot,
            slot_map,
            handled: false,
            reopen_requested: false,
        }
    }

    pub fn canceled(&self) -> bool {
        self.result.canceled
    }

    pub fn cancel_reason(&self) -> Option<FormCancelReason> {
        self.result.cancel_reason
    }

    pub fn selection(&self) -> Option<u32> {
        self.result.selection
    }

    /// Selected grid button, when the click was not on an inventory slot.
    pub fn control_button(&self) -> Option<u32> {
        self.selection()
            .filter(|&i| !self.canceled() && (i as usize) < self.control_button_count)
    }

    /// Show the same form again right after the handler returns.
    pub fn reopen(&mut self) {
        self.reopen_requested = true;
    }

    pub fn reopen_requested(&self) -> bool {
        self.reopen_requested
    }
}
