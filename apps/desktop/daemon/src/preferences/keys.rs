//! Setting keys and their schema.
//!
//! Keys are flat and dot-namespaced ("list-view.use-tree-view"), the same shape the
//! settings file uses on disk.

use serde_json::{Value, json};

pub const SORT_DIRECTORIES_FIRST: &str = "preferences.sort-directories-first";
pub const CONFIRM_TRASH: &str = "preferences.confirm-trash";
pub const SHOW_CREATE_LINK: &str = "preferences.show-create-link";
pub const SHOW_DELETE_PERMANENTLY: &str = "preferences.show-delete-permanently";
pub const CLICK_POLICY: &str = "preferences.click-policy";
pub const EXECUTABLE_TEXT_ACTIVATION: &str = "preferences.executable-text-activation";
pub const RECURSIVE_SEARCH: &str = "preferences.recursive-search";
pub const SHOW_FILE_THUMBNAILS: &str = "preferences.show-image-thumbnails";
pub const SHOW_DIRECTORY_ITEM_COUNTS: &str = "preferences.show-directory-item-counts";
pub const FILE_THUMBNAIL_LIMIT: &str = "preferences.thumbnail-limit";

pub const LIST_VIEW_USE_TREE: &str = "list-view.use-tree-view";
pub const LIST_VIEW_DEFAULT_VISIBLE_COLUMNS: &str = "list-view.default-visible-columns";
pub const LIST_VIEW_DEFAULT_COLUMN_ORDER: &str = "list-view.default-column-order";

pub const ICON_VIEW_CAPTIONS: &str = "icon-view.captions";

/// The toolkit file chooser's own copy of the folders-first flag.
pub const FILE_CHOOSER_SORT_DIRECTORIES_FIRST: &str = "file-chooser.sort-directories-first";

/// Type of a setting's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Bool,
    String,
    Uint64,
    StringList,
}

impl ValueKind {
    pub fn matches(self, value: &Value) -> bool {
        match self {
            Self::Bool => value.is_boolean(),
            Self::String => value.is_string(),
            Self::Uint64 => value.is_u64(),
            Self::StringList => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string)),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::String => "string",
            Self::Uint64 => "uint64",
            Self::StringList => "string list",
        }
    }
}

/// One key of the schema.
#[derive(Debug, Clone)]
pub struct SettingSchema {
    pub key: &'static str,
    pub kind: ValueKind,
    pub default: Value,
    /// Allowed values for string settings. Empty means any string.
    pub choices: &'static [&'static str],
}

const SPEED_TRADEOFF_CHOICES: &[&str] = &["local-only", "always", "never"];

fn entry(key: &'static str, kind: ValueKind, default: Value) -> SettingSchema {
    SettingSchema {
        key,
        kind,
        default,
        choices: &[],
    }
}

fn choice(key: &'static str, default: &str, choices: &'static [&'static str]) -> SettingSchema {
    SettingSchema {
        key,
        kind: ValueKind::String,
        default: json!(default),
        choices,
    }
}

/// Every key the application knows, with its default.
pub fn schema() -> Vec<SettingSchema> {
    vec![
        entry(SORT_DIRECTORIES_FIRST, ValueKind::Bool, json!(false)),
        entry(CONFIRM_TRASH, ValueKind::Bool, json!(true)),
        entry(SHOW_CREATE_LINK, ValueKind::Bool, json!(false)),
        entry(SHOW_DELETE_PERMANENTLY, ValueKind::Bool, json!(false)),
        choice(CLICK_POLICY, "double", &["single", "double"]),
        choice(EXECUTABLE_TEXT_ACTIVATION, "display", &["launch", "display", "ask"]),
        choice(RECURSIVE_SEARCH, "local-only", SPEED_TRADEOFF_CHOICES),
        choice(SHOW_FILE_THUMBNAILS, "local-only", SPEED_TRADEOFF_CHOICES),
        choice(SHOW_DIRECTORY_ITEM_COUNTS, "local-only", SPEED_TRADEOFF_CHOICES),
        entry(FILE_THUMBNAIL_LIMIT, ValueKind::Uint64, json!(10_485_760u64)),
        entry(LIST_VIEW_USE_TREE, ValueKind::Bool, json!(false)),
        entry(
            LIST_VIEW_DEFAULT_VISIBLE_COLUMNS,
            ValueKind::StringList,
            json!(["name", "size", "date_modified"]),
        ),
        entry(
            LIST_VIEW_DEFAULT_COLUMN_ORDER,
            ValueKind::StringList,
            json!([
                "name",
                "size",
                "type",
                "owner",
                "group",
                "permissions",
                "mime_type",
                "where",
                "date_modified",
                "date_modified_with_time",
                "date_accessed"
            ]),
        ),
        entry(ICON_VIEW_CAPTIONS, ValueKind::StringList, json!(["none", "none", "none"])),
        entry(FILE_CHOOSER_SORT_DIRECTORIES_FIRST, ValueKind::Bool, json!(false)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_their_kind() {
        for entry in schema() {
            assert!(entry.kind.matches(&entry.default), "bad default for {}", entry.key);
            if let Some(default) = entry.default.as_str()
                && !entry.choices.is_empty()
            {
                assert!(entry.choices.contains(&default), "default not a choice for {}", entry.key);
            }
        }
    }

    #[test]
    fn keys_are_unique() {
        let entries = schema();
        let mut keys: Vec<&str> = entries.iter().map(|e| e.key).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), entries.len());
    }

    #[test]
    fn kinds_check_values() {
        assert!(ValueKind::StringList.matches(&json!(["a", "b"])));
        assert!(!ValueKind::StringList.matches(&json!(["a", 1])));
        assert!(ValueKind::Uint64.matches(&json!(4_294_967_295u64)));
        assert!(!ValueKind::Uint64.matches(&json!(-1)));
    }
}
