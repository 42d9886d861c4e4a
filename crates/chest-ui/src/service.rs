//! Form orchestration: render, track, resolve, and reopen.
//!
//! [`ChestUiService`] is owned by the host's event loop and only ever touched
//! from it. Forms go out as [`OutgoingForm`]s for the host to send; answers
//! come back through [`ChestUiService::handle_response`], and pinned forms
//! come back out of [`ChestUiService::tick`].

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chest_ui_proto::packets::{ModalFormRequest, ModalFormResponse};
use chest_ui_proto::{ActionForm, FormResult, ProtoError};
use tracing::{debug, warn};

use crate::config::ChestUiConfig;
use crate::error::FormError;
use crate::grid::ChestForm;
use crate::icon::IconEncoder;
use crate::item::{Container, InventorySource, ItemDescriber};
use crate::projector::{InventoryProjector, SlotMap};
use crate::response::ChestFormResponse;
use crate::scheduler::ReopenScheduler;

/// Called synchronously with every resolved answer.
pub type ResponseHandler = Arc<dyn Fn(&mut ChestFormResponse) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShowOptions {
    /// Reopen the form shortly after an inventory slot is clicked, unless the
    /// handler marks the response handled.
    pub auto_reopen_inventory: bool,
}

impl Default for ShowOptions {
    fn default() -> Self {
        Self {
            auto_reopen_inventory: true,
        }
    }
}

/// A form plus everything needed to show it again.
#[derive(Clone)]
pub struct ShowRequest {
    pub form: Arc<ChestForm>,
    pub options: ShowOptions,
    handler: Option<ResponseHandler>,
}

impl fmt::Debug for ShowRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShowRequest")
            .field("form", &self.form)
            .field("options", &self.options)
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}

impl ShowRequest {
    pub fn new(form: impl Into<Arc<ChestForm>>, options: ShowOptions) -> Self {
        Self {
            form: form.into(),
            options,
            handler: None,
        }
    }

    pub fn on_response<F>(mut self, handler: F) -> Self
    where
        F: Fn(&mut ChestFormResponse) + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(handler));
        self
    }
}

/// The action form for a chest form, and where its inventory cells point.
#[derive(Debug, Clone)]
pub struct RenderedForm {
    pub form: ActionForm,
    pub slot_map: SlotMap,
}

/// A form the host must deliver to `user`.
#[derive(Debug, Clone)]
pub struct OutgoingForm {
    pub user: String,
    pub form_id: u32,
    pub form: ActionForm,
}

impl OutgoingForm {
    pub fn to_packet(&self) -> Result<ModalFormRequest, ProtoError> {
        ModalFormRequest::action_form(self.form_id, &self.form)
    }
}

/// What happened after an answer was handled.
#[derive(Debug)]
pub struct ResponseOutcome {
    pub response: ChestFormResponse,
    /// Set when the handler called [`ChestFormResponse::reopen`].
    pub reopened: Option<OutgoingForm>,
    pub reopen_armed: bool,
}

struct PendingForm {
    user: String,
    request: ShowRequest,
    slot_map: SlotMap,
}

pub struct ChestUiService {
    config: ChestUiConfig,
    encoder: IconEncoder,
    describer: Arc<dyn ItemDescriber>,
    pending: HashMap<u32, PendingForm>,
    reopens: ReopenScheduler<ShowRequest>,
    next_form_id: u32,
}

impl ChestUiService {
    pub fn new(config: ChestUiConfig, encoder: IconEncoder, describer: Arc<dyn ItemDescriber>) -> Self {
        Self {
            config,
            encoder,
            describer,
            pending: HashMap::new(),
            reopens: ReopenScheduler::new(),
            next_form_id: 1,
        }
    }

    pub fn config(&self) -> &ChestUiConfig {
        &self.config
    }

    pub fn default_options(&self) -> ShowOptions {
        ShowOptions {
            auto_reopen_inventory: self.config.auto_reopen_inventory,
        }
    }

    /// Wrap a form with the configured default options.
    pub fn request(&self, form: ChestForm) -> ShowRequest {
        ShowRequest::new(form, self.default_options())
    }

    /// Render the grid, then the inventory (when enabled for this form).
    pub fn render(&self, form: &ChestForm, inventory: Option<&dyn Container>) -> RenderedForm {
        let mut action = ActionForm::new(form.title_message().clone());
        let cells = form.cells(&self.encoder);
        let control_button_count = cells.len();

        let project = form
            .inventory_enabled()
            .unwrap_or(self.config.inventory_enabled);
        let (extra, slot_map) = match inventory.filter(|_| project) {
            Some(container) => {
                let projector = InventoryProjector::new(&self.encoder, self.describer.as_ref());
                let hide = form.hide_predicate().map(|h| &**h as &dyn Fn(u32) -> bool);
                let p = projector.project(container, control_button_count, form.overrides(), hide);
                (p.cells, p.slot_map)
            }
            None => (Vec::new(), SlotMap::new(control_button_count, 0)),
        };

        for cell in cells.into_iter().chain(extra) {
            action.button(cell.label, cell.icon.map(|icon| icon.to_string()));
        }
        RenderedForm {
            form: action,
            slot_map,
        }
    }

    /// Render `request` for `user` and register it as pending.
    ///
    /// Any armed reopen for the user is cancelled; the new form supersedes it.
    pub fn show(
        &mut self,
        user: &str,
        request: ShowRequest,
        inventories: &dyn InventorySource,
    ) -> OutgoingForm {
        self.reopens.cancel_all(user);

        let rendered = self.render(&request.form, inventories.inventory(user));
        let form_id = self.allocate_form_id();
        debug!(
            "Sending form {form_id} to {user} ({} buttons, {} inventory slots)",
            rendered.form.buttons.len(),
            rendered.slot_map.len()
        );
        self.pending.insert(
            form_id,
            PendingForm {
                user: user.to_string(),
                request,
                slot_map: rendered.slot_map,
            },
        );
        OutgoingForm {
            user: user.to_string(),
            form_id,
            form: rendered.form,
        }
    }

    /// Resolve a client answer, run the handler, and decide about reopening.
    pub fn handle_response(
        &mut self,
        user: &str,
        packet: &ModalFormResponse,
        inventories: &dyn InventorySource,
    ) -> Result<ResponseOutcome, FormError> {
        let form_id = packet.form_id;
        let pending = self
            .pending
            .remove(&form_id)
            .ok_or(FormError::UnknownForm { form_id })
            .inspect_err(|_| debug!("Response for unknown form {form_id} from {user}"))?;
        if pending.user != user {
            let expected = pending.user.clone();
            self.pending.insert(form_id, pending);
            return Err(FormError::UserMismatch {
                form_id,
                expected,
                actual: user.to_string(),
            });
        }

        // Any answer from this player supersedes a reopen that is still armed.
        self.reopens.cancel_all(user);

        let result = FormResult::from_packet(packet)?;
        let mut response = ChestFormResponse::resolve(user, form_id, result, pending.slot_map);
        debug!(
            "Form {form_id} from {user}: selection={:?} inventory_slot={:?}",
            response.selection(),
            response.inventory_slot
        );

        if let Some(handler) = &pending.request.handler {
            handler(&mut response);
        }

        let mut reopened = None;
        let mut reopen_armed = false;
        if response.reopen_requested() {
            reopened = Some(self.show(user, pending.request, inventories));
        } else if response.inventory_slot.is_some()
            && pending.request.options.auto_reopen_inventory
            && !response.handled
        {
            self.reopens
                .arm(user, self.config.reopen_delay_ticks, pending.request);
            reopen_armed = true;
        }

        Ok(ResponseOutcome {
            response,
            reopened,
            reopen_armed,
        })
    }

    /// The host could not deliver or display a form. Nothing is rearmed.
    pub fn handle_failure(&mut self, user: &str, form_id: u32, reason: impl Into<String>) -> FormError {
        let reason = reason.into();
        let Some(pending) = self.pending.remove(&form_id) else {
            debug!("Failure for unknown form {form_id} from {user}");
            return FormError::UnknownForm { form_id };
        };
        if pending.user != user {
            let expected = pending.user.clone();
            self.pending.insert(form_id, pending);
            return FormError::UserMismatch {
                form_id,
                expected,
                actual: user.to_string(),
            };
        }
        self.reopens.cancel_all(user);
        warn!("Form {form_id} for {user} failed: {reason}");
        FormError::Rejected { form_id, reason }
    }

    /// Drop everything pending for a player who left.
    ///
    /// Returns one error per form that will never be answered.
    pub fn player_disconnected(&mut self, user: &str) -> Vec<FormError> {
        self.reopens.cancel_all(user);
        let before = self.pending.len();
        self.pending.retain(|_, p| p.user != user);
        let dropped = before - self.pending.len();
        if dropped > 0 {
            warn!("{user} disconnected with {dropped} unanswered form(s)");
        }
        (0..dropped)
            .map(|_| FormError::Disconnected(user.to_string()))
            .collect()
    }

    /// Advance reopen timers and re-render the forms that are due.
    pub fn tick(&mut self, inventories: &dyn InventorySource) -> Vec<OutgoingForm> {
        let fired = self.reopens.tick();
        let mut outgoing = Vec::with_capacity(fired.len());
        for (user, request) in fired {
            if inventories.inventory(&user).is_none() {
                debug!("Skipping reopen for {user}: no longer online");
                continue;
            }
            outgoing.push(self.show(&user, request, inventories));
        }
        outgoing
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_reopen_armed(&self, user: &str) -> bool {
        self.reopens.is_armed(user)
    }

    fn allocate_form_id(&mut self) -> u32 {
        let id = self.next_form_id;
        self.next_form_id = self.next_form_id.wrapping_add(1).max(1);
        id
    }
}
