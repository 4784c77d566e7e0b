//! List view columns and the chooser that orders and toggles them.

/// A list view column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub label: &'static str,
}

const COMMON_COLUMNS: &[Column] = &[
    Column { name: "name", label: "Name" },
    Column { name: "size", label: "Size" },
    Column { name: "type", label: "Type" },
    Column { name: "owner", label: "Owner" },
    Column { name: "group", label: "Group" },
    Column { name: "permissions", label: "Permissions" },
    Column { name: "mime_type", label: "MIME Type" },
    Column { name: "where", label: "Location" },
    Column { name: "date_modified", label: "Modified" },
    Column { name: "date_modified_with_time", label: "Modified - Time" },
    Column { name: "date_accessed", label: "Accessed" },
];

/// Columns every directory supports, in their natural order.
pub fn common_columns() -> &'static [Column] {
    COMMON_COLUMNS
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ChooserEntry {
    column: Column,
    visible: bool,
}

/// Visible columns and their order, as edited on the "List Columns" page.
///
/// The name column is always visible.
#[derive(Debug, Clone)]
pub struct ColumnChooser {
    entries: Vec<ChooserEntry>,
}

impl ColumnChooser {
    pub fn new() -> Self {
        Self {
            entries: COMMON_COLUMNS
                .iter()
                .map(|column| ChooserEntry {
                    column: *column,
                    visible: column.name == "name",
                })
                .collect(),
        }
    }

    /// Applies stored settings. Columns missing from `column_order` keep their natural
    /// order after the listed ones; unknown names are ignored.
    pub fn set_settings(&mut self, visible_columns: &[String], column_order: &[String]) {
        let mut ordered: Vec<ChooserEntry> = Vec::with_capacity(COMMON_COLUMNS.len());
        for name in column_order {
            if let Some(column) = COMMON_COLUMNS.iter().find(|c| c.name == name)
                && !ordered.iter().any(|e| e.column.name == column.name)
            {
                ordered.push(ChooserEntry {
                    column: *column,
                    visible: false,
                });
            }
        }
        for column in COMMON_COLUMNS {
            if !ordered.iter().any(|e| e.column.name == column.name) {
                ordered.push(ChooserEntry {
                    column: *column,
                    visible: false,
                });
            }
        }
        for entry in &mut ordered {
            entry.visible = entry.column.name == "name" || visible_columns.iter().any(|v| v == entry.column.name);
        }
        self.entries = ordered;
    }

    /// Returns `(visible_columns, column_order)`, both in display order.
    pub fn settings(&self) -> (Vec<String>, Vec<String>) {
        let visible = self
            .entries
            .iter()
            .filter(|e| e.visible)
            .map(|e| e.column.name.to_string())
            .collect();
        let order = self.entries.iter().map(|e| e.column.name.to_string()).collect();
        (visible, order)
    }

    /// Flips a column's visibility. Returns whether anything changed.
    pub fn toggle(&mut self, name: &str) -> bool {
        if name == "name" {
            return false;
        }
        match self.entries.iter_mut().find(|e| e.column.name == name) {
            Some(entry) => {
                entry.visible = !entry.visible;
                true
            }
            None => false,
        }
    }

    pub fn move_up(&mut self, name: &str) -> bool {
        match self.position(name) {
            Some(index) if index > 0 => {
                self.entries.swap(index, index - 1);
                true
            }
            _ => false,
        }
    }

    pub fn move_down(&mut self, name: &str) -> bool {
        match self.position(name) {
            Some(index) if index + 1 < self.entries.len() => {
                self.entries.swap(index, index + 1);
                true
            }
            _ => false,
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.column.name == name)
    }
}

impl Default for ColumnChooser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn settings_reorder_and_fill_in_missing_columns() {
        let mut chooser = ColumnChooser::new();
        chooser.set_settings(&strings(&["size", "bogus"]), &strings(&["size", "name", "bogus"]));

        let (visible, order) = chooser.settings();
        assert_eq!(visible, strings(&["size", "name"]));
        assert_eq!(&order[..3], &strings(&["size", "name", "type"])[..]);
        assert_eq!(order.len(), common_columns().len());
    }

    #[test]
    fn name_column_cannot_be_hidden() {
        let mut chooser = ColumnChooser::new();
        assert!(!chooser.toggle("name"));
        assert!(chooser.toggle("owner"));
        let (visible, _) = chooser.settings();
        assert_eq!(visible, strings(&["name", "owner"]));
    }

    #[test]
    fn moving_stops_at_the_edges() {
        let mut chooser = ColumnChooser::new();
        assert!(!chooser.move_up("name"));
        assert!(chooser.move_down("name"));
        assert!(!chooser.move_down("date_accessed"));
        let (_, order) = chooser.settings();
        assert_eq!(&order[..2], &strings(&["size", "name"])[..]);
    }
}
