//! Chest-style grid forms with a live projection of the player's inventory.
//!
//! A [`ChestForm`] describes a fixed grid of labeled, iconified buttons.
//! [`ChestUiService`] renders it (appending the player's inventory after the
//! grid), tracks the form until the client answers, resolves clicks back to
//! inventory slots, and keeps the form pinned open with a per-player
//! single-flight reopen timer.

pub mod config;
pub mod error;
pub mod grid;
pub mod icon;
pub mod item;
pub mod label;
pub mod projector;
pub mod registry;
pub mod response;
pub mod scheduler;
pub mod service;

pub use config::ChestUiConfig;
pub use error::{DescribeError, FormError};
pub use grid::{ButtonSpec, Cell, ChestForm, GridSize};
pub use icon::{IconCode, IconEncoder};
pub use item::{BasicDescriber, Container, InventorySource, ItemDescriber, ItemSnapshot};
pub use projector::{InventoryProjector, Projection, SlotMap, SlotOverride};
pub use registry::{CustomItemOffsets, CustomOffsetSource, TextureRegistry, TextureTable};
pub use response::ChestFormResponse;
pub use scheduler::ReopenScheduler;
pub use service::{
    ChestUiService, OutgoingForm, RenderedForm, ResponseHandler, ResponseOutcome, ShowOptions,
    ShowRequest,
};
