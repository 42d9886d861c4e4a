//! Icon codes: everything a button's picture needs, packed into one value.
//!
//! The form's icon field is a single string. Known textures are sent as
//! `safe_index * 65536 + (enchanted ? 32768 : 0)`, where indices below 256 are
//! the built-in range and everything above is shifted by the current custom
//! offset. Unknown textures are sent as their raw identifier and the resource
//! pack shows a placeholder for them.

use std::fmt;
use std::sync::Arc;

use crate::registry::{CustomOffsetSource, TextureRegistry};

/// Indices below this are built-in and never offset.
pub const BUILTIN_RANGE: u32 = 256;
/// Multiplier applied to the safe index.
pub const INDEX_STRIDE: u64 = 65536;
/// Added when the item shows an enchantment glint.
pub const ENCHANT_FLAG: u64 = 32768;

/// The value placed in a button's icon field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IconCode {
    /// Raw texture identifier or path.
    Texture(String),
    Packed(u64),
}

impl IconCode {
    /// Split a packed code into `(safe_index, enchanted)`.
    pub fn decode(&self) -> Option<(u64, bool)> {
        match self {
            IconCode::Packed(code) => Some((code / INDEX_STRIDE, code % INDEX_STRIDE >= ENCHANT_FLAG)),
            IconCode::Texture(_) => None,
        }
    }
}

impl fmt::Display for IconCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IconCode::Texture(s) => f.write_str(s),
            IconCode::Packed(code) => write!(f, "{code}"),
        }
    }
}

/// Pack a known base index.
pub fn pack(base_index: u32, enchanted: bool, custom_offset: u32) -> u64 {
    let safe_index = if base_index < BUILTIN_RANGE {
        u64::from(base_index)
    } else {
        u64::from(base_index) + u64::from(custom_offset)
    };
    safe_index * INDEX_STRIDE + if enchanted { ENCHANT_FLAG } else { 0 }
}

fn is_texture_path(texture: &str) -> bool {
    texture.contains('/') || texture.ends_with(".png")
}

/// Resolves texture keys against the registries and produces icon codes.
#[derive(Clone)]
pub struct IconEncoder {
    textures: Arc<dyn TextureRegistry>,
    offsets: Arc<dyn CustomOffsetSource>,
}

impl IconEncoder {
    pub fn new(textures: Arc<dyn TextureRegistry>, offsets: Arc<dyn CustomOffsetSource>) -> Self {
        Self { textures, offsets }
    }

    /// Encode a base index that was already looked up.
    ///
    /// `None` means the registry did not know the texture; `fallback` is
    /// returned unchanged.
    pub fn encode(&self, base_index: Option<u32>, fallback: &str, enchanted: bool) -> IconCode {
        match base_index {
            Some(index) => IconCode::Packed(pack(
                index,
                enchanted,
                self.offsets.current_custom_offset(),
            )),
            None => IconCode::Texture(fallback.to_string()),
        }
    }

    /// Resolve a texture key (alias, path, or identifier) to an icon code.
    pub fn icon_for(&self, texture: &str, enchanted: bool) -> IconCode {
        let target = self.textures.alias(texture).unwrap_or(texture);
        if is_texture_path(target) {
            return IconCode::Texture(target.to_string());
        }
        let base_index = self.textures.lookup_base_index(target);
        self.encode(base_index, target, enchanted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{CustomItemBatch, CustomItemOffsets, TextureTable};

    fn encoder_with(offsets: Arc<dyn CustomOffsetSource>) -> IconEncoder {
        let mut table = TextureTable::new();
        table.insert("minecraft:stone", 1);
        table.insert("minecraft:diamond_sword", 255);
        table.insert("custom:gun", 300);
        table.insert_alias("shop:gun", "custom:gun");
        table.insert_alias("shop:coin", "textures/items/coin");
        IconEncoder::new(Arc::new(table), offsets)
    }

    #[test]
    fn builtin_range_is_never_offset() {
        for base in [0u32, 1, 17, 255] {
            assert_eq!(pack(base, false, 40), u64::from(base) * 65536);
            assert_eq!(pack(base, true, 40), u64::from(base) * 65536 + 32768);
        }
    }

    #[test]
    fn custom_range_is_offset() {
        for (base, k) in [(256u32, 0u32), (256, 12), (300, 46), (1000, 1)] {
            assert_eq!(pack(base, false, k), u64::from(base + k) * 65536);
            assert_eq!(pack(base, true, k), u64::from(base + k) * 65536 + 32768);
        }
    }

    #[test]
    fn offset_is_read_on_every_encode() {
        let offsets = Arc::new(CustomItemOffsets::new(0));
        let encoder = encoder_with(offsets.clone());
        assert_eq!(encoder.icon_for("custom:gun", false), IconCode::Packed(300 * 65536));

        offsets.register(CustomItemBatch {
            version: "v2".into(),
            count: 10,
            description: "guns".into(),
        });
        assert_eq!(encoder.icon_for("custom:gun", false), IconCode::Packed(310 * 65536));
        assert_eq!(encoder.icon_for("minecraft:stone", false), IconCode::Packed(65536));
    }

    #[test]
    fn unknown_texture_falls_back_to_identifier() {
        let encoder = encoder_with(Arc::new(0u32));
        assert_eq!(
            encoder.icon_for("minecraft:mystery", true),
            IconCode::Texture("minecraft:mystery".into())
        );
        assert_eq!(
            encoder.encode(None, "minecraft:mystery", false).to_string(),
            "minecraft:mystery"
        );
    }

    #[test]
    fn aliases_and_paths() {
        let encoder = encoder_with(Arc::new(5u32));
        assert_eq!(encoder.icon_for("shop:gun", true), IconCode::Packed(305 * 65536 + 32768));
        assert_eq!(
            encoder.icon_for("shop:coin", false),
            IconCode::Texture("textures/items/coin".into())
        );
        assert_eq!(
            encoder.icon_for("textures/ui/arrow.png", false),
            IconCode::Texture("textures/ui/arrow.png".into())
        );
    }

    #[test]
    fn decode_inverts_packing() {
        let code = IconCode::Packed(pack(255, true, 0));
        assert_eq!(code.decode(), Some((255, true)));
        assert_eq!(code.to_string(), (255u64 * 65536 + 32768).to_string());
        assert_eq!(IconCode::Texture("x".into()).decode(), None);
    }
}
