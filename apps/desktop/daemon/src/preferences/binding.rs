//! Two-way bindings between preference widgets and settings keys.
//!
//! Reading maps a setting onto widget state; writing maps a user change back. Every
//! binding also follows the key's writability with the widget's sensitivity.

use serde_json::Value;

use super::PreferencesError;
use super::store::SettingsStore;
use super::widgets::Widgets;

#[derive(Debug, Clone)]
pub enum Binding {
    /// Check button `active` to a bool key
    Bool { widget: &'static str, key: &'static str },
    /// Combo index to one of `values`
    Enum {
        widget: &'static str,
        key: &'static str,
        values: &'static [&'static str],
    },
    /// Combo index to one of `values`; reading picks the first value at least as large
    UintEnum {
        widget: &'static str,
        key: &'static str,
        values: &'static [u64],
    },
    /// Radio group: each radio is active when the key equals its value
    Radio {
        widgets: &'static [&'static str],
        key: &'static str,
        values: &'static [&'static str],
    },
}

pub fn enum_get_mapping(values: &[&str], setting: &str) -> Option<usize> {
    values.iter().position(|v| *v == setting)
}

pub fn enum_set_mapping(values: &[&str], index: usize) -> Option<String> {
    values.get(index).map(|v| v.to_string())
}

/// First index whose value is `>= setting`. Settings between steps round up.
pub fn uint_enum_get_mapping(values: &[u64], setting: u64) -> Option<usize> {
    values.iter().position(|v| *v >= setting)
}

pub fn uint_enum_set_mapping(values: &[u64], index: usize) -> Option<u64> {
    values.get(index).copied()
}

pub fn radio_get_mapping(widget_value: &str, setting: &str) -> bool {
    widget_value == setting
}

/// Only activating a radio writes. Deactivation is the other radio's job.
pub fn radio_set_mapping(widget_value: &str, active: bool) -> Option<String> {
    active.then(|| widget_value.to_string())
}

impl Binding {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Bool { key, .. } | Self::Enum { key, .. } | Self::UintEnum { key, .. } | Self::Radio { key, .. } => *key,
        }
    }

    pub fn widgets(&self) -> &[&'static str] {
        match self {
            Self::Bool { widget, .. } | Self::Enum { widget, .. } | Self::UintEnum { widget, .. } => {
                std::slice::from_ref(widget)
            }
            Self::Radio { widgets, .. } => *widgets,
        }
    }

    pub fn controls(&self, widget: &str) -> bool {
        self.widgets().iter().any(|w| *w == widget)
    }

    /// Updates the widgets from the setting's current value and writability.
    pub fn load(&self, store: &SettingsStore, widgets: &mut Widgets) -> Result<(), PreferencesError> {
        let sensitive = store.is_writable(self.key());
        for id in self.widgets() {
            widgets.set_sensitive(id, sensitive);
        }

        match self {
            Self::Bool { widget, key } => {
                widgets.set_active(widget, store.get_bool(key)?);
            }
            Self::Enum { widget, key, values } => {
                let setting = store.get_string(key)?;
                match enum_get_mapping(values, &setting) {
                    Some(index) => {
                        widgets.set_active_index(widget, Some(index));
                    }
                    None => log::warn!("{}={} has no entry in {}", key, setting, widget),
                }
            }
            Self::UintEnum { widget, key, values } => {
                let setting = store.get_u64(key)?;
                match uint_enum_get_mapping(values, setting) {
                    Some(index) => {
                        widgets.set_active_index(widget, Some(index));
                    }
                    None => log::warn!("{}={} is above every entry in {}", key, setting, widget),
                }
            }
            Self::Radio {
                widgets: ids,
                key,
                values,
            } => {
                let setting = store.get_string(key)?;
                for (id, value) in ids.iter().zip(values.iter()) {
                    widgets.set_active(id, radio_get_mapping(value, &setting));
                }
            }
        }
        Ok(())
    }

    /// Writes the state of `widget` (one of this binding's widgets) to the setting.
    pub fn store(&self, widget: &str, widgets: &Widgets, store: &SettingsStore) -> Result<(), PreferencesError> {
        let state = widgets
            .get(widget)
            .ok_or_else(|| PreferencesError::UnknownWidget(widget.to_string()))?;

        match self {
            Self::Bool { key, .. } => {
                if let Some(active) = state.is_active() {
                    store.set_bool(key, active)?;
                }
            }
            Self::Enum { key, values, .. } => {
                if let Some(value) = state.active_index().and_then(|i| enum_set_mapping(values, i)) {
                    store.set(key, Value::String(value))?;
                }
            }
            Self::UintEnum { key, values, .. } => {
                if let Some(value) = state.active_index().and_then(|i| uint_enum_set_mapping(values, i)) {
                    store.set_u64(key, value)?;
                }
            }
            Self::Radio {
                widgets: ids,
                key,
                values,
            } => {
                let value = ids
                    .iter()
                    .position(|id| *id == widget)
                    .and_then(|i| values.get(i))
                    .and_then(|v| radio_set_mapping(v, state.is_active().unwrap_or(false)));
                if let Some(value) = value {
                    store.set_string(key, &value)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::keys::{CLICK_POLICY, FILE_THUMBNAIL_LIMIT};
    use super::super::widgets::Widget;
    use super::*;

    const LIMITS: &[u64] = &[
        102_400,
        512_000,
        1_048_576,
        3_145_728,
        5_242_880,
        10_485_760,
        104_857_600,
        1_073_741_824,
        2_147_483_648,
        4_294_967_295,
    ];

    #[test]
    fn uint_enum_rounds_up_to_next_step() {
        assert_eq!(uint_enum_get_mapping(LIMITS, 102_400), Some(0));
        assert_eq!(uint_enum_get_mapping(LIMITS, 600_000), Some(2));
        assert_eq!(uint_enum_get_mapping(LIMITS, 0), Some(0));
        assert_eq!(uint_enum_get_mapping(LIMITS, u64::MAX), None);
        assert_eq!(uint_enum_set_mapping(LIMITS, 9), Some(4_294_967_295));
        assert_eq!(uint_enum_set_mapping(LIMITS, 10), None);
    }

    #[test]
    fn enum_maps_by_position() {
        let values = &["single", "double"];
        assert_eq!(enum_get_mapping(values, "double"), Some(1));
        assert_eq!(enum_get_mapping(values, "triple"), None);
        assert_eq!(enum_set_mapping(values, 0).as_deref(), Some("single"));
    }

    #[test]
    fn radio_deactivation_writes_nothing() {
        assert!(radio_get_mapping("single", "single"));
        assert!(!radio_get_mapping("single", "double"));
        assert_eq!(radio_set_mapping("single", true).as_deref(), Some("single"));
        assert_eq!(radio_set_mapping("single", false), None);
    }

    #[test]
    fn radio_binding_round_trip_through_store() {
        let store = SettingsStore::in_memory();
        let mut widgets = Widgets::default();
        widgets.insert("single", Widget::toggle());
        widgets.insert("double", Widget::toggle());
        let binding = Binding::Radio {
            widgets: &["single", "double"],
            key: CLICK_POLICY,
            values: &["single", "double"],
        };

        binding.load(&store, &mut widgets).unwrap();
        assert_eq!(widgets.get("double").unwrap().is_active(), Some(true));
        assert_eq!(widgets.get("single").unwrap().is_active(), Some(false));

        widgets.set_active("double", false);
        binding.store("double", &widgets, &store).unwrap();
        assert_eq!(store.get_string(CLICK_POLICY).unwrap(), "double");

        widgets.set_active("single", true);
        binding.store("single", &widgets, &store).unwrap();
        assert_eq!(store.get_string(CLICK_POLICY).unwrap(), "single");
    }

    #[test]
    fn uint_binding_selects_rounded_entry_and_tracks_writability() {
        let store = SettingsStore::in_memory();
        store.set_u64(FILE_THUMBNAIL_LIMIT, 2_000_000).unwrap();
        store.set_writable(FILE_THUMBNAIL_LIMIT, false).unwrap();
        let mut widgets = Widgets::default();
        widgets.insert("limit", Widget::combo(LIMITS.iter().map(u64::to_string).collect()));
        let binding = Binding::UintEnum {
            widget: "limit",
            key: FILE_THUMBNAIL_LIMIT,
            values: LIMITS,
        };

        binding.load(&store, &mut widgets).unwrap();

        let widget = widgets.get("limit").unwrap();
        assert_eq!(widget.active_index(), Some(3));
        assert!(!widget.sensitive);
    }
}
