use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chest_ui::registry::CustomItemBatch;
use chest_ui::{ChestUiConfig, TextureTable};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid texture table {}: {source}", path.display())]
    TextureTable {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Deserialize)]
pub struct HostConfig {
    #[serde(default)]
    pub ui: ChestUiConfig,
    #[serde(default)]
    pub textures: TexturesSection,
    #[serde(default)]
    pub custom_items: Vec<CustomItemBatch>,
    #[serde(default)]
    pub menu: MenuSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

#[derive(Debug, Deserialize)]
pub struct TexturesSection {
    /// JSON object of `identifier -> base index`, relative to the config file.
    #[serde(default)]
    pub table: Option<PathBuf>,
    #[serde(default = "default_placeholder")]
    pub placeholder: String,
    /// Offset used while no custom item batch is registered.
    #[serde(default)]
    pub custom_item_fallback: u32,
    #[serde(default)]
    pub aliases: HashMap<String, String>,
}

fn default_placeholder() -> String {
    "minecraft:info_update2".into()
}

impl Default for TexturesSection {
    fn default() -> Self {
        Self {
            table: None,
            placeholder: default_placeholder(),
            custom_item_fallback: 0,
            aliases: HashMap::new(),
        }
    }
}

/// The demo menu opened by the console `open` command.
#[derive(Debug, Deserialize)]
pub struct MenuSection {
    #[serde(default = "default_menu_title")]
    pub title: String,
    #[serde(default = "default_menu_size")]
    pub size: String,
    /// Mark inventory clicks handled, which suppresses the auto-reopen.
    #[serde(default)]
    pub consume_inventory_clicks: bool,
    #[serde(default)]
    pub buttons: Vec<MenuButton>,
}

fn default_menu_title() -> String {
    "Menu".into()
}

fn default_menu_size() -> String {
    "small".into()
}

impl Default for MenuSection {
    fn default() -> Self {
        Self {
            title: default_menu_title(),
            size: default_menu_size(),
            consume_inventory_clicks: false,
            buttons: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MenuButton {
    pub slot: i64,
    pub name: String,
    /// Empty means the configured placeholder texture.
    #[serde(default)]
    pub texture: String,
    #[serde(default)]
    pub description: Vec<String>,
    #[serde(default = "default_stack_size")]
    pub stack_size: i64,
    #[serde(default)]
    pub durability: i64,
    #[serde(default)]
    pub enchanted: bool,
    #[serde(default)]
    pub action: ButtonAction,
}

fn default_stack_size() -> i64 {
    1
}

/// What the demo handler does when a grid button is clicked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonAction {
    #[default]
    None,
    Reopen,
}

#[derive(Debug, Deserialize)]
pub struct LoggingSection {
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    "info".into()
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

impl HostConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&contents)?)
    }

    /// Build the texture table: the JSON file (if any) plus configured aliases.
    pub fn texture_table(&self, base_dir: &Path) -> Result<TextureTable, ConfigError> {
        let mut table = match &self.textures.table {
            Some(rel) => {
                let path = base_dir.join(rel);
                let json = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
                    path: path.clone(),
                    source,
                })?;
                TextureTable::from_json(&json)
                    .map_err(|source| ConfigError::TextureTable { path, source })?
            }
            None => TextureTable::new(),
        };
        for (key, texture) in &self.textures.aliases {
            table.insert_alias(key.clone(), texture.clone());
        }
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_config() {
        let toml_str = r#"
            [ui]
            reopen_delay_ticks = 5

            [textures]
            table = "textures.json"
            custom_item_fallback = 40

            [textures.aliases]
            "shop:coin" = "minecraft:gold_nugget"

            [[custom_items]]
            version = "v1"
            count = 12
            description = "Initial pack"

            [[custom_items]]
            version = "v2"
            count = 3

            [menu]
            title = "Shop"
            size = "double"

            [[menu.buttons]]
            slot = 49
            name = "Close"
            texture = "minecraft:barrier"
            action = "reopen"

            [logging]
            level = "debug"
        "#;
        let config: HostConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.ui.reopen_delay_ticks, 5);
        assert!(config.ui.inventory_enabled); // default
        assert_eq!(config.textures.table, Some(PathBuf::from("textures.json")));
        assert_eq!(config.textures.placeholder, "minecraft:info_update2");
        assert_eq!(config.textures.custom_item_fallback, 40);
        assert_eq!(config.textures.aliases["shop:coin"], "minecraft:gold_nugget");
        assert_eq!(config.custom_items.len(), 2);
        assert_eq!(config.custom_items[1].count, 3);
        assert!(config.custom_items[1].description.is_empty());
        assert_eq!(config.menu.title, "Shop");
        assert_eq!(config.menu.buttons[0].stack_size, 1);
        assert_eq!(config.menu.buttons[0].action, ButtonAction::Reopen);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config: HostConfig = toml::from_str("").unwrap();
        assert_eq!(config.ui.reopen_delay_ticks, 3);
        assert!(config.ui.auto_reopen_inventory);
        assert!(config.textures.table.is_none());
        assert!(config.custom_items.is_empty());
        assert_eq!(config.menu.size, "small");
        assert!(!config.menu.consume_inventory_clicks);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn aliases_land_in_texture_table() {
        let config: HostConfig = toml::from_str(
            r#"
            [textures.aliases]
            "shop:coin" = "minecraft:gold_nugget"
            "#,
        )
        .unwrap();
        let table = config.texture_table(Path::new(".")).unwrap();
        assert!(table.is_empty());
        assert_eq!(
            chest_ui::TextureRegistry::alias(&table, "shop:coin"),
            Some("minecraft:gold_nugget")
        );
    }

    #[test]
    fn missing_texture_table_is_io_error() {
        let config: HostConfig =
            toml::from_str("[textures]\ntable = \"does-not-exist.json\"").unwrap();
        assert!(matches!(
            config.texture_table(Path::new("/nonexistent")),
            Err(ConfigError::Io { .. })
        ));
    }
}
