//! Widget state of the preferences window, addressed by builder id.

use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetKind {
    /// Check buttons and radio buttons
    Toggle { active: bool },
    /// Combo boxes. `active` is `None` until something is selected.
    Combo { items: Vec<String>, active: Option<usize> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Widget {
    pub kind: WidgetKind,
    pub sensitive: bool,
}

impl Widget {
    pub fn toggle() -> Self {
        Self {
            kind: WidgetKind::Toggle { active: false },
            sensitive: true,
        }
    }

    pub fn combo(items: Vec<String>) -> Self {
        Self {
            kind: WidgetKind::Combo { items, active: None },
            sensitive: true,
        }
    }

    pub fn is_active(&self) -> Option<bool> {
        match self.kind {
            WidgetKind::Toggle { active } => Some(active),
            WidgetKind::Combo { .. } => None,
        }
    }

    pub fn active_index(&self) -> Option<usize> {
        match &self.kind {
            WidgetKind::Combo { active, .. } => *active,
            WidgetKind::Toggle { .. } => None,
        }
    }

    pub fn items(&self) -> &[String] {
        match &self.kind {
            WidgetKind::Combo { items, .. } => items,
            WidgetKind::Toggle { .. } => &[],
        }
    }
}

#[derive(Debug, Default)]
pub struct Widgets {
    by_id: HashMap<&'static str, Widget>,
}

impl Widgets {
    pub fn insert(&mut self, id: &'static str, widget: Widget) {
        self.by_id.insert(id, widget);
    }

    pub fn get(&self, id: &str) -> Option<&Widget> {
        self.by_id.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Widget> {
        self.by_id.get_mut(id)
    }

    /// Sets a toggle's state. Returns whether it changed.
    pub fn set_active(&mut self, id: &str, value: bool) -> bool {
        match self.by_id.get_mut(id).map(|w| &mut w.kind) {
            Some(WidgetKind::Toggle { active }) if *active != value => {
                *active = value;
                true
            }
            _ => false,
        }
    }

    /// Selects a combo entry. Out-of-range indices are ignored. Returns whether it changed.
    pub fn set_active_index(&mut self, id: &str, index: Option<usize>) -> bool {
        match self.by_id.get_mut(id).map(|w| &mut w.kind) {
            Some(WidgetKind::Combo { items, active }) if index.is_none_or(|i| i < items.len()) && *active != index => {
                *active = index;
                true
            }
            _ => false,
        }
    }

    pub fn set_sensitive(&mut self, id: &str, sensitive: bool) {
        if let Some(widget) = self.by_id.get_mut(id) {
            widget.sensitive = sensitive;
        }
    }
}
