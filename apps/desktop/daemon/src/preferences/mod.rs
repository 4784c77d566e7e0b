//! User preferences: the settings store and the window that edits it.

mod binding;
mod columns;
pub mod keys;
mod store;
mod widgets;
mod window;


use std::fmt;

pub use binding::Binding;
pub use columns::{Column, ColumnChooser, common_columns};
pub use store::{SettingsChange, SettingsError, SettingsStore};
pub use widgets::{Widget, WidgetKind, Widgets};
pub use window::{ICON_CAPTIONS_COMPONENTS, PreferencesWindow, THUMBNAIL_LIMIT_VALUES, show};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreferencesError {
    UnknownWidget(String),
    /// The widget's key is locked, so the widget can't be edited
    Insensitive(String),
    IndexOutOfRange { widget: String, index: usize },
    Settings(SettingsError),
}

impl fmt::Display for PreferencesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownWidget(id) => write!(f, "No preferences widget named {}", id),
            Self::Insensitive(id) => write!(f, "Widget {} is not editable", id),
            Self::IndexOutOfRange { widget, index } => write!(f, "Widget {} has no entry {}", widget, index),
            Self::Settings(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for PreferencesError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Settings(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SettingsError> for PreferencesError {
    fn from(e: SettingsError) -> Self {
        Self::Settings(e)
    }
}
