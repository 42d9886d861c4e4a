//! `[ui]` section of the host configuration.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ChestUiConfig {
    /// Append the player's inventory after the grid.
    #[serde(default = "default_true")]
    pub inventory_enabled: bool,
    /// Ticks between an inventory click and the automatic reopen.
    #[serde(default = "default_reopen_delay_ticks")]
    pub reopen_delay_ticks: u64,
    /// Default for [`ShowOptions::auto_reopen_inventory`](crate::ShowOptions).
    #[serde(default = "default_true")]
    pub auto_reopen_inventory: bool,
}

fn default_true() -> bool {
    true
}

fn default_reopen_delay_ticks() -> u64 {
    3
}

impl Default for ChestUiConfig {
    fn default() -> Self {
        Self {
            inventory_enabled: true,
            reopen_delay_ticks: default_reopen_delay_ticks(),
            auto_reopen_inventory: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_section_uses_defaults() {
        let config: ChestUiConfig = toml::from_str("").unwrap();
        assert!(config.inventory_enabled);
        assert!(config.auto_reopen_inventory);
        assert_eq!(config.reopen_delay_ticks, 3);
    }

    #[test]
    fn explicit_values() {
        let config: ChestUiConfig = toml::from_str(
            r#"
            inventory_enabled = false
            reopen_delay_ticks = 10
            auto_reopen_inventory = false
            "#,
        )
        .unwrap();
        assert!(!config.inventory_enabled);
        assert!(!config.auto_reopen_inventory);
        assert_eq!(config.reopen_delay_ticks, 10);
    }
}
