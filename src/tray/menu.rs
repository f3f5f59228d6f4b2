//! Layout of the tray context menu and the mapping from clicked entries to
//! [`MenuAction`]s. The native menu is built from this on Windows.

use crate::app::MenuAction;
use crate::config;

/// Menu item IDs
pub mod menu_ids {
    pub const STARTUP: &str = "startup";
    pub const PRODUCT: &str = "product";
    pub const EXIT: &str = "exit";
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEntry {
    Item {
        id: &'static str,
        label: String,
        enabled: bool,
        /// Rendered as a check item whose state mirrors the autostart flag.
        checkable: bool,
    },
    Separator,
}

/// The four fixed entries, top to bottom.
pub fn menu_entries() -> Vec<MenuEntry> {
    vec![
        MenuEntry::Item {
            id: menu_ids::STARTUP,
            label: "Startup".to_string(),
            enabled: true,
            checkable: true,
        },
        MenuEntry::Separator,
        MenuEntry::Item {
            id: menu_ids::PRODUCT,
            label: config::product_label(),
            enabled: false,
            checkable: false,
        },
        MenuEntry::Item {
            id: menu_ids::EXIT,
            label: "Exit".to_string(),
            enabled: true,
            checkable: false,
        },
    ]
}

/// Action for a clicked entry; `None` for the informational item and
/// anything unknown.
pub fn menu_action(id: &str) -> Option<MenuAction> {
    match id {
        menu_ids::STARTUP => Some(MenuAction::ToggleStartup),
        menu_ids::EXIT => Some(MenuAction::Exit),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(entry: &MenuEntry) -> (&'static str, &str, bool, bool) {
        match entry {
            MenuEntry::Item {
                id,
                label,
                enabled,
                checkable,
            } => (*id, label.as_str(), *enabled, *checkable),
            MenuEntry::Separator => panic!("expected an item, got a separator"),
        }
    }

    #[test]
    fn test_menu_has_four_entries_in_order() {
        let entries = menu_entries();
        assert_eq!(entries.len(), 4);

        assert_eq!(item(&entries[0]), (menu_ids::STARTUP, "Startup", true, true));
        assert_eq!(entries[1], MenuEntry::Separator);
        assert_eq!(item(&entries[2]).0, menu_ids::PRODUCT);
        assert_eq!(item(&entries[3]), (menu_ids::EXIT, "Exit", true, false));
    }

    #[test]
    fn test_product_entry_is_disabled_label() {
        let entries = menu_entries();
        let (_, label, enabled, checkable) = item(&entries[2]);

        assert_eq!(label, format!("AnalogClock v{}", env!("CARGO_PKG_VERSION")));
        assert!(!enabled);
        assert!(!checkable);
    }

    #[test]
    fn test_only_startup_is_checkable() {
        let checkable: Vec<_> = menu_entries()
            .iter()
            .filter_map(|e| match e {
                MenuEntry::Item { id, checkable: true, .. } => Some(*id),
                _ => None,
            })
            .collect();
        assert_eq!(checkable, vec![menu_ids::STARTUP]);
    }

    #[test]
    fn test_menu_action_mapping() {
        assert_eq!(menu_action(menu_ids::STARTUP), Some(MenuAction::ToggleStartup));
        assert_eq!(menu_action(menu_ids::EXIT), Some(MenuAction::Exit));
        assert_eq!(menu_action(menu_ids::PRODUCT), None);
        assert_eq!(menu_action("settings"), None);
        assert_eq!(menu_action(""), None);
    }

    #[test]
    fn test_every_entry_id_is_unique() {
        let mut ids: Vec<_> = menu_entries()
            .iter()
            .filter_map(|e| match e {
                MenuEntry::Item { id, .. } => Some(*id),
                MenuEntry::Separator => None,
            })
            .collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 3);
    }
}
