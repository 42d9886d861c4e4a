//! Texture and custom-item registries consulted when encoding icons.
//!
//! [`TextureTable`] maps texture/type identifiers to base icon indices and is
//! loaded from JSON (`{"minecraft:stone": 1, ...}`). [`CustomItemOffsets`]
//! tracks how many custom icons are registered; every index at or above the
//! built-in range is shifted by that total.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, PoisonError};

use serde::Deserialize;
use tracing::info;

/// Lookup from texture/type identifier to base icon index.
pub trait TextureRegistry: Send + Sync {
    fn lookup_base_index(&self, identifier: &str) -> Option<u32>;

    /// Custom-content key to texture identifier, applied before lookup.
    fn alias(&self, _key: &str) -> Option<&str> {
        None
    }
}

/// Live source of the custom icon offset. Read on every encode, never cached.
pub trait CustomOffsetSource: Send + Sync {
    fn current_custom_offset(&self) -> u32;
}

impl CustomOffsetSource for u32 {
    fn current_custom_offset(&self) -> u32 {
        *self
    }
}

impl CustomOffsetSource for AtomicU32 {
    fn current_custom_offset(&self) -> u32 {
        self.load(Ordering::Acquire)
    }
}

/// In-memory texture table.
#[derive(Debug, Default, Clone)]
pub struct TextureTable {
    indices: HashMap<String, u32>,
    aliases: HashMap<String, String>,
}

impl TextureTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON object of `identifier -> base index`.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let indices: HashMap<String, u32> = serde_json::from_str(json)?;
        Ok(Self {
            indices,
            aliases: HashMap::new(),
        })
    }

    pub fn insert(&mut self, identifier: impl Into<String>, base_index: u32) {
        self.indices.insert(identifier.into(), base_index);
    }

    pub fn insert_alias(&mut self, key: impl Into<String>, texture: impl Into<String>) {
        self.aliases.insert(key.into(), texture.into());
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

impl TextureRegistry for TextureTable {
    fn lookup_base_index(&self, identifier: &str) -> Option<u32> {
        self.indices.get(identifier).copied()
    }

    fn alias(&self, key: &str) -> Option<&str> {
        self.aliases.get(key).map(String::as_str)
    }
}

/// One registration of custom items.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomItemBatch {
    pub version: String,
    pub count: u32,
    #[serde(default)]
    pub description: String,
}

/// Running total of registered custom icons.
///
/// When nothing is registered the configured fallback count is reported
/// instead, so a pack that only sets a flat count still encodes correctly.
#[derive(Debug, Default)]
pub struct CustomItemOffsets {
    total: AtomicU32,
    fallback: u32,
    history: Mutex<Vec<CustomItemBatch>>,
}

impl CustomItemOffsets {
    pub fn new(fallback: u32) -> Self {
        Self {
            total: AtomicU32::new(0),
            fallback,
            history: Mutex::new(Vec::new()),
        }
    }

    pub fn with_batches(fallback: u32, batches: impl IntoIterator<Item = CustomItemBatch>) -> Self {
        let offsets = Self::new(fallback);
        for batch in batches {
            offsets.register(batch);
        }
        offsets
    }

    /// Register more custom icons. Takes effect on the next encode.
    pub fn register(&self, batch: CustomItemBatch) {
        self.total.fetch_add(batch.count, Ordering::AcqRel);
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(batch);
    }

    /// Sum of all registered batch counts (ignores the fallback).
    pub fn registered_total(&self) -> u32 {
        self.total.load(Ordering::Acquire)
    }

    pub fn log_state(&self) -> u32 {
        let offset = self.current_custom_offset();
        info!("Custom item offset: {offset}");
        let history = self.history.lock().unwrap_or_else(PoisonError::into_inner);
        for batch in history.iter() {
            info!(
                "  {}: {} items ({})",
                batch.version, batch.count, batch.description
            );
        }
        offset
    }
}

impl CustomOffsetSource for CustomItemOffsets {
    fn current_custom_offset(&self) -> u32 {
        match self.registered_total() {
            0 => self.fallback,
            total => total,
        }
    }
}
