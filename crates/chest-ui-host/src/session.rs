//! Simulated players driving a [`ChestUiService`].
//!
//! Plays the part of a server connection handler: forms leave as encoded
//! `ModalFormRequest` packets, answers arrive as encoded `ModalFormResponse`
//! packets, and inventories can change between renders.

use std::collections::HashMap;
use std::io::Cursor;
use std::str::FromStr;
use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use chest_ui::label::LabelPrefix;
use chest_ui::registry::{CustomItemBatch, CustomItemOffsets};
use chest_ui::{
    BasicDescriber, ButtonSpec, ChestForm, ChestUiService, CustomOffsetSource, FormError,
    GridSize, IconCode, IconEncoder, ItemSnapshot, OutgoingForm, ShowRequest, TextureTable,
};
use chest_ui_proto::codec::{ProtoDecode, ProtoEncode};
use chest_ui_proto::packets::{self, ModalFormRequest, ModalFormResponse};
use chest_ui_proto::types::VarUInt32;
use chest_ui_proto::{ProtoError, RawMessage};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{ButtonAction, HostConfig, MenuSection};

const INVENTORY_SIZE: usize = 36;

const HELP: &str = "\
commands:
  join <player>                      connect a player with an empty inventory
  leave <player>                     disconnect a player
  give <player> <slot> <item> [n]    put n (default 1) items in a slot
  clear <player> <slot>              empty a slot
  enchant <player> <slot> <id> [lvl] enchant the item in a slot
  damage <player> <slot> <dmg> <max> set durability of the item in a slot
  open <player> [size]               show the menu
  click <player> <button>            press a button on the open form
  close <player>                     close the open form
  fail <player> [reason]             report the open form as undeliverable
  offset <count> [version]           register a batch of custom items
  status                             show players, forms and timers
  stop                               shut down";

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("unknown command '{0}', try 'help'")]
    UnknownCommand(String),

    #[error("{0} is not online")]
    UnknownPlayer(String),

    #[error("{0} has no form open")]
    NoOpenForm(String),

    #[error("expected a number, got '{0}'")]
    InvalidNumber(String),

    #[error("slot {slot} is outside the {size}-slot inventory")]
    InvalidSlot { slot: usize, size: usize },

    #[error("slot {0} is empty")]
    EmptySlot(usize),

    #[error("unexpected packet 0x{0:02X}")]
    UnexpectedPacket(u32),

    #[error(transparent)]
    Form(#[from] FormError),

    #[error(transparent)]
    Proto(#[from] ProtoError),
}

/// The form a simulated client has on screen.
#[derive(Debug, Clone, Copy)]
struct Screen {
    form_id: u32,
    buttons: usize,
}

pub struct Session {
    service: ChestUiService,
    offsets: Arc<CustomItemOffsets>,
    placeholder: String,
    menu: MenuSection,
    inventories: HashMap<String, Vec<Option<ItemSnapshot>>>,
    screens: HashMap<String, Screen>,
    ticks: u64,
}

impl Session {
    pub fn new(config: HostConfig, textures: TextureTable) -> Self {
        let offsets = Arc::new(CustomItemOffsets::with_batches(
            config.textures.custom_item_fallback,
            config.custom_items,
        ));
        let encoder = IconEncoder::new(Arc::new(textures), offsets.clone());
        Self {
            service: ChestUiService::new(config.ui, encoder, Arc::new(BasicDescriber)),
            offsets,
            placeholder: config.textures.placeholder,
            menu: config.menu,
            inventories: HashMap::new(),
            screens: HashMap::new(),
            ticks: 0,
        }
    }

    pub fn offsets(&self) -> &CustomItemOffsets {
        &self.offsets
    }

    pub fn current_tick(&self) -> u64 {
        self.ticks
    }

    /// Advance one game tick and deliver any forms whose reopen fired.
    pub fn game_tick(&mut self) -> Vec<String> {
        self.ticks += 1;
        let due = self.service.tick(&self.inventories);
        let mut shown = Vec::with_capacity(due.len());
        for form in due {
            let user = form.user.clone();
            match self.deliver(form) {
                Ok(view) => shown.push(view),
                Err(e) => shown.push(format!("failed to reopen for {user}: {e}")),
            }
        }
        shown
    }

    pub fn handle_command(&mut self, line: &str) -> Result<String, CommandError> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&command, args)) = words.split_first() else {
            return Ok(String::new());
        };

        match command {
            "help" => Ok(HELP.to_string()),
            "join" => {
                let [player] = args else {
                    return Err(CommandError::Usage("join <player>"));
                };
                self.inventories
                    .entry(player.to_string())
                    .or_insert_with(|| vec![None; INVENTORY_SIZE]);
                info!("{player} joined");
                Ok(format!("{player} joined"))
            }
            "leave" => {
                let [player] = args else {
                    return Err(CommandError::Usage("leave <player>"));
                };
                if self.inventories.remove(*player).is_none() {
                    return Err(CommandError::UnknownPlayer(player.to_string()));
                }
                self.screens.remove(*player);
                let dropped = self.service.player_disconnected(player);
                Ok(format!("{player} left, {} form(s) dropped", dropped.len()))
            }
            "give" => {
                let (player, slot, item, amount) = match args {
                    [player, slot, item] => (player, slot, item, 1),
                    [player, slot, item, amount] => (player, slot, item, number(amount)?),
                    _ => return Err(CommandError::Usage("give <player> <slot> <item> [amount]")),
                };
                let item = ItemSnapshot::new(*item, amount);
                let entry = self.slot_mut(player, number(slot)?)?;
                *entry = Some(item);
                Ok(format!("gave {amount} to {player}"))
            }
            "clear" => {
                let [player, slot] = args else {
                    return Err(CommandError::Usage("clear <player> <slot>"));
                };
                *self.slot_mut(player, number(slot)?)? = None;
                Ok(format!("cleared slot {slot} of {player}"))
            }
            "enchant" => {
                let (player, slot, id, level) = match args {
                    [player, slot, id] => (player, slot, id, 1),
                    [player, slot, id, level] => (player, slot, id, number(level)?),
                    _ => return Err(CommandError::Usage("enchant <player> <slot> <id> [level]")),
                };
                let slot = number(slot)?;
                let item = self.item_mut(player, slot)?;
                item.enchantments.push(chest_ui::item::Enchantment {
                    id: id.to_string(),
                    level,
                });
                Ok(format!("enchanted slot {slot} of {player}"))
            }
            "damage" => {
                let [player, slot, damage, max] = args else {
                    return Err(CommandError::Usage("damage <player> <slot> <damage> <max>"));
                };
                let (slot, damage, max) = (number(slot)?, number(damage)?, number(max)?);
                let item = self.item_mut(player, slot)?;
                item.durability = Some(chest_ui::item::Durability { damage, max });
                Ok(format!("damaged slot {slot} of {player}"))
            }
            "open" => {
                let (player, size) = match args {
                    [player] => (player, None),
                    [player, size] => (player, Some(*size)),
                    _ => return Err(CommandError::Usage("open <player> [size]")),
                };
                self.require_online(player)?;
                let request = self.menu_request(size);
                let form = self.service.show(player, request, &self.inventories);
                self.deliver(form)
            }
            "click" => {
                let [player, button] = args else {
                    return Err(CommandError::Usage("click <player> <button>"));
                };
                let button: u32 = number(button)?;
                let screen = self.take_screen(player)?;
                let packet = ModalFormResponse::selection(screen.form_id, button);
                self.server_receive(player, frame(packets::id::MODAL_FORM_RESPONSE, &packet))
            }
            "close" => {
                let [player] = args else {
                    return Err(CommandError::Usage("close <player>"));
                };
                let screen = self.take_screen(player)?;
                let packet = ModalFormResponse::closed(screen.form_id, 0);
                self.server_receive(player, frame(packets::id::MODAL_FORM_RESPONSE, &packet))
            }
            "fail" => {
                let Some((player, reason)) = args.split_first() else {
                    return Err(CommandError::Usage("fail <player> [reason]"));
                };
                let screen = self.take_screen(player)?;
                let reason = if reason.is_empty() {
                    "client busy".to_string()
                } else {
                    reason.join(" ")
                };
                let err = self.service.handle_failure(player, screen.form_id, reason);
                Ok(format!("form {} failed: {err}", screen.form_id))
            }
            "offset" => {
                let (count, version) = match args {
                    [count] => (number(count)?, format!("runtime-{}", self.ticks)),
                    [count, version] => (number(count)?, version.to_string()),
                    _ => return Err(CommandError::Usage("offset <count> [version]")),
                };
                self.offsets.register(CustomItemBatch {
                    version,
                    count,
                    description: "registered from console".into(),
                });
                let offset = self.offsets.log_state();
                Ok(format!("custom item offset is now {offset}"))
            }
            "status" => Ok(self.status()),
            other => Err(CommandError::UnknownCommand(other.to_string())),
        }
    }

    fn status(&self) -> String {
        let mut players: Vec<&String> = self.inventories.keys().collect();
        players.sort();
        let mut out = format!(
            "tick {}, {} pending form(s), custom offset {}",
            self.ticks,
            self.service.pending_count(),
            self.offsets.current_custom_offset()
        );
        for player in players {
            let items = self.inventories[player].iter().flatten().count();
            let screen = self
                .screens
                .get(player)
                .map_or("no form".to_string(), |s| {
                    format!("form {} ({} buttons)", s.form_id, s.buttons)
                });
            let reopen = if self.service.is_reopen_armed(player) {
                ", reopen armed"
            } else {
                ""
            };
            out.push_str(&format!("\n  {player}: {items} stacks, {screen}{reopen}"));
        }
        out
    }

    fn menu_request(&self, size: Option<&str>) -> ShowRequest {
        let size = GridSize::from_name(size.unwrap_or(&self.menu.size));
        let mut form = ChestForm::new(size);
        form.title(self.menu.title.as_str());

        let last = size.slot_count() as i64 - 1;
        let mut actions = HashMap::new();
        for button in &self.menu.buttons {
            let texture = if button.texture.is_empty() {
                self.placeholder.as_str()
            } else {
                button.texture.as_str()
            };
            let spec = ButtonSpec::new(button.name.as_str(), texture)
                .description(button.description.iter().map(String::as_str))
                .stack_size(button.stack_size)
                .durability(button.durability)
                .enchanted(button.enchanted);
            form.button(button.slot, &spec);
            actions.insert(button.slot.clamp(0, last) as u32, button.action);
        }

        let consume = self.menu.consume_inventory_clicks;
        self.service.request(form).on_response(move |r| {
            if let Some(slot) = r.inventory_slot {
                info!("{} clicked inventory slot {slot}", r.user);
                r.handled = consume;
            } else if let Some(button) = r.control_button() {
                info!("{} clicked menu button {button}", r.user);
                if actions.get(&button) == Some(&ButtonAction::Reopen) {
                    r.reopen();
                }
            } else if r.canceled() {
                info!("{} closed the menu ({:?})", r.user, r.cancel_reason());
            }
        })
    }

    /// Encode a form, hand it to the simulated client, and return what it shows.
    fn deliver(&mut self, form: OutgoingForm) -> Result<String, CommandError> {
        let packet = form.to_packet()?;
        let bytes = frame(packets::id::MODAL_FORM_REQUEST, &packet);
        debug!("Sending ModalFormRequest ({} bytes) to {}", bytes.len(), form.user);
        self.client_receive(&form.user, bytes)
    }

    fn client_receive(&mut self, user: &str, bytes: Bytes) -> Result<String, CommandError> {
        let mut buf = Cursor::new(&bytes[..]);
        let packet_id = VarUInt32::proto_decode(&mut buf)?.0;
        if packet_id != packets::id::MODAL_FORM_REQUEST {
            return Err(CommandError::UnexpectedPacket(packet_id));
        }
        let request = ModalFormRequest::proto_decode(&mut buf)?;
        let (view, buttons) = describe_form(&request.form_data)?;
        let displaced = self.screens.insert(
            user.to_string(),
            Screen {
                form_id: request.form_id,
                buttons,
            },
        );
        let mut out = format!("{user} sees form {}: {view}", request.form_id);

        // The client answers a form it had to drop as busy.
        if let Some(old) = displaced.filter(|old| old.form_id != request.form_id) {
            let packet = ModalFormResponse::closed(old.form_id, 1);
            let bytes = frame(packets::id::MODAL_FORM_RESPONSE, &packet);
            let summary = self.server_receive(user, bytes)?;
            out.push('\n');
            out.push_str(&summary);
        }
        Ok(out)
    }

    fn server_receive(&mut self, user: &str, bytes: Bytes) -> Result<String, CommandError> {
        let mut buf = Cursor::new(&bytes[..]);
        let packet_id = VarUInt32::proto_decode(&mut buf)?.0;
        match packet_id {
            packets::id::MODAL_FORM_RESPONSE => self.handle_modal_form_response(user, &mut buf),
            other => Err(CommandError::UnexpectedPacket(other)),
        }
    }

    fn handle_modal_form_response(
        &mut self,
        user: &str,
        buf: &mut Cursor<&[u8]>,
    ) -> Result<String, CommandError> {
        let response = ModalFormResponse::proto_decode(buf)?;
        let outcome = self
            .service
            .handle_response(user, &response, &self.inventories)?;

        let r = &outcome.response;
        let mut summary = match (r.inventory_slot, r.control_button()) {
            _ if r.canceled() => format!("form {} closed", r.form_id),
            (Some(slot), _) => format!("form {}: inventory slot {slot}", r.form_id),
            (None, Some(button)) => format!("form {}: button {button}", r.form_id),
            (None, None) => format!("form {}: nothing selected", r.form_id),
        };
        if outcome.reopen_armed {
            summary.push_str(", reopen armed");
        }
        if let Some(form) = outcome.reopened {
            summary.push('\n');
            summary.push_str(&self.deliver(form)?);
        }
        Ok(summary)
    }

    fn require_online(&self, player: &str) -> Result<(), CommandError> {
        if self.inventories.contains_key(player) {
            Ok(())
        } else {
            Err(CommandError::UnknownPlayer(player.to_string()))
        }
    }

    fn take_screen(&mut self, player: &str) -> Result<Screen, CommandError> {
        self.require_online(player)?;
        self.screens
            .remove(player)
            .ok_or_else(|| CommandError::NoOpenForm(player.to_string()))
    }

    fn slot_mut(&mut self, player: &str, slot: usize) -> Result<&mut Option<ItemSnapshot>, CommandError> {
        let inventory = self
            .inventories
            .get_mut(player)
            .ok_or_else(|| CommandError::UnknownPlayer(player.to_string()))?;
        let size = inventory.len();
        inventory
            .get_mut(slot)
            .ok_or(CommandError::InvalidSlot { slot, size })
    }

    fn item_mut(&mut self, player: &str, slot: usize) -> Result<&mut ItemSnapshot, CommandError> {
        self.slot_mut(player, slot)?
            .as_mut()
            .ok_or(CommandError::EmptySlot(slot))
    }
}

fn number<T: FromStr>(s: &str) -> Result<T, CommandError> {
    s.parse()
        .map_err(|_| CommandError::InvalidNumber(s.to_string()))
}

/// Packet id header followed by the packet body.
fn frame(packet_id: u32, packet: &impl ProtoEncode) -> Bytes {
    let mut buf = BytesMut::new();
    VarUInt32(packet_id).proto_encode(&mut buf);
    packet.proto_encode(&mut buf);
    buf.freeze()
}

/// Render form JSON the way a player would read it. Returns the text and the
/// button count.
fn describe_form(form_data: &str) -> Result<(String, usize), ProtoError> {
    let form: serde_json::Value =
        serde_json::from_str(form_data).map_err(|e| ProtoError::JsonParse(e.to_string()))?;
    let title = form["title"].as_str().map(styled_plain).unwrap_or_default();
    let buttons = form["buttons"].as_array().map(Vec::as_slice).unwrap_or_default();

    let mut out = strip_formatting(&title);
    for (index, button) in buttons.iter().enumerate() {
        let text = button["text"].as_str().map(styled_plain).unwrap_or_default();
        let icon = button["image"]["data"].as_str();
        if text.is_empty() && icon.is_none() {
            continue;
        }
        out.push_str(&format!("\n  [{index:>2}] {}", describe_button(&text, icon)));
    }
    Ok((out, buttons.len()))
}

fn describe_button(text: &str, icon: Option<&str>) -> String {
    let mut out = match LabelPrefix::parse(text) {
        Some((prefix, rest)) => {
            let name = rest.lines().next().unwrap_or_default();
            let mut s = format!("{} x{}", strip_formatting(name), prefix.stack());
            if prefix.durability() > 0 {
                s.push_str(&format!(" ({}%)", prefix.durability()));
            }
            s
        }
        None => strip_formatting(text),
    };
    match icon.map(|data| (data, data.parse::<u64>())) {
        Some((_, Ok(code))) => {
            if let Some((index, enchanted)) = IconCode::Packed(code).decode() {
                out.push_str(&format!(" <icon {index}{}>", if enchanted { "*" } else { "" }));
            }
        }
        Some((data, Err(_))) => out.push_str(&format!(" <{data}>")),
        None => {}
    }
    out
}

/// Rawtext JSON strings flatten to their text; anything else is taken as is.
fn styled_plain(text: &str) -> String {
    match serde_json::from_str::<RawMessage>(text) {
        Ok(raw) => raw.plain_text(),
        Err(_) => text.to_string(),
    }
}

fn strip_formatting(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '§' {
            chars.next();
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        let config: HostConfig = toml::from_str(
            r#"
            [ui]
            reopen_delay_ticks = 3

            [menu]
            title = "Shop"

            [[menu.buttons]]
            slot = 0
            name = "Refresh"
            texture = "minecraft:clock"
            action = "reopen"

            [[menu.buttons]]
            slot = 26
            name = "Close"
            texture = "minecraft:barrier"
            "#,
        )
        .unwrap();
        let mut textures = TextureTable::new();
        textures.insert("minecraft:clock", 7);
        textures.insert("minecraft:barrier", 300);
        textures.insert("minecraft:dirt", 3);
        let mut session = Session::new(config, textures);
        session.handle_command("join Alice").unwrap();
        session
    }

    #[test]
    fn open_sends_grid_and_inventory() {
        let mut s = session();
        s.handle_command("give Alice 0 minecraft:dirt 12").unwrap();
        let view = s.handle_command("open Alice").unwrap();
        assert!(view.contains("Shop"));
        assert!(view.contains("[ 0] Refresh x1 <icon 7>"));
        assert!(view.contains("[27] Dirt x12 <icon 3>"));
        assert_eq!(s.screens["Alice"].buttons, 27 + INVENTORY_SIZE);
    }

    #[test]
    fn inventory_click_reopens_after_delay() {
        let mut s = session();
        s.handle_command("give Alice 0 minecraft:dirt 12").unwrap();
        s.handle_command("open Alice").unwrap();
        let first = s.screens["Alice"].form_id;

        let summary = s.handle_command("click Alice 27").unwrap();
        assert!(summary.contains("inventory slot 0"));
        assert!(summary.contains("reopen armed"));
        assert!(!s.screens.contains_key("Alice"));

        s.handle_command("clear Alice 0").unwrap();
        assert!(s.game_tick().is_empty());
        assert!(s.game_tick().is_empty());
        let shown = s.game_tick();
        assert_eq!(shown.len(), 1);
        assert!(!shown[0].contains("Dirt"));
        assert_ne!(s.screens["Alice"].form_id, first);
    }

    #[test]
    fn reopen_button_reshows_immediately() {
        let mut s = session();
        s.handle_command("open Alice").unwrap();
        let summary = s.handle_command("click Alice 0").unwrap();
        assert!(summary.contains("button 0"));
        assert!(summary.contains("Alice sees form"));
        assert!(s.screens.contains_key("Alice"));
    }

    #[test]
    fn close_and_fail_never_reopen() {
        let mut s = session();
        s.handle_command("open Alice").unwrap();
        assert!(s.handle_command("close Alice").unwrap().contains("closed"));
        s.handle_command("open Alice").unwrap();
        assert!(s.handle_command("fail Alice busy").unwrap().contains("busy"));
        for _ in 0..5 {
            assert!(s.game_tick().is_empty());
        }
        assert!(matches!(
            s.handle_command("click Alice 0"),
            Err(CommandError::NoOpenForm(_))
        ));
    }

    #[test]
    fn offset_registration_moves_custom_icons() {
        let mut s = session();
        let before = s.handle_command("open Alice").unwrap();
        assert!(before.contains("Close x1 <icon 300>"));
        s.handle_command("close Alice").unwrap();

        assert!(s.handle_command("offset 10 v2").unwrap().ends_with("10"));
        let view = s.handle_command("open Alice").unwrap();
        assert!(view.contains("Close x1 <icon 310>"));
        assert!(view.contains("Refresh x1 <icon 7>"));
    }

    #[test]
    fn reopening_over_an_open_form_answers_it_busy() {
        let mut s = session();
        let first = s.handle_command("open Alice").unwrap();
        assert!(!first.contains("closed"));
        for _ in 0..50 {
            let view = s.handle_command("open Alice").unwrap();
            assert!(view.contains("closed"));
        }
        assert_eq!(s.service.pending_count(), 1);
        assert!(s.handle_command("click Alice 26").is_ok());
        assert_eq!(s.service.pending_count(), 0);
    }

    #[test]
    fn leave_drops_pending_forms() {
        let mut s = session();
        s.handle_command("open Alice").unwrap();
        assert!(s.handle_command("leave Alice").unwrap().contains("1 form(s) dropped"));
        assert!(matches!(
            s.handle_command("open Alice"),
            Err(CommandError::UnknownPlayer(_))
        ));
    }

    #[test]
    fn bad_commands() {
        let mut s = session();
        assert!(matches!(s.handle_command("dance"), Err(CommandError::UnknownCommand(_))));
        assert!(matches!(s.handle_command("give Alice"), Err(CommandError::Usage(_))));
        assert!(matches!(
            s.handle_command("give Alice x minecraft:dirt"),
            Err(CommandError::InvalidNumber(_))
        ));
        assert!(matches!(
            s.handle_command("give Alice 40 minecraft:dirt"),
            Err(CommandError::InvalidSlot { slot: 40, size: 36 })
        ));
        assert!(matches!(
            s.handle_command("enchant Alice 3 minecraft:sharpness"),
            Err(CommandError::EmptySlot(3))
        ));
        assert_eq!(s.handle_command("   ").unwrap(), "");
    }

    #[test]
    fn describes_labels_and_icons() {
        assert_eq!(
            describe_button("stack#05dur#42§rIron Sword\n§7Durability: 10 / 20", Some("458752")),
            "Iron Sword x5 (42%) <icon 7>"
        );
        assert_eq!(describe_button("plain", Some("textures/ui/x")), "plain <textures/ui/x>");
        assert_eq!(describe_button("§aGreen§r", None), "Green");
        assert_eq!(styled_plain(r#"{"rawtext":[{"text":"a"},{"text":"b"}]}"#), "ab");
    }
}
