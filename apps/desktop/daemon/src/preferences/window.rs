//! The preferences window: widgets bound to settings keys.
//!
//! User edits go through `toggle`, `select` and the column methods; changes made
//! elsewhere reach the widgets through `sync_from_settings`. Updating widgets from
//! settings never writes back.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::TryRecvError;

use super::PreferencesError;
use super::binding::Binding;
use super::columns::{ColumnChooser, common_columns};
use super::keys;
use super::store::{SettingsChange, SettingsStore};
use super::widgets::{Widget, Widgets};

pub const FOLDERS_FIRST_WIDGET: &str = "sort_folders_first_checkbutton";
pub const DELETE_PERMANENTLY_WIDGET: &str = "show_delete_permanently_checkbutton";
pub const CREATE_LINK_WIDGET: &str = "show_create_link_checkbutton";
pub const LIST_VIEW_USE_TREE_WIDGET: &str = "use_tree_view_checkbutton";
pub const TRASH_CONFIRM_WIDGET: &str = "trash_confirm_checkbutton";
pub const THUMBNAIL_LIMIT_WIDGET: &str = "preview_image_size_combobox";

const SPEED_TRADEOFF_VALUES: &[&str] = &["local-only", "always", "never"];

const CLICK_BEHAVIOR_COMPONENTS: &[&str] = &["single_click_radiobutton", "double_click_radiobutton"];
const CLICK_BEHAVIOR_VALUES: &[&str] = &["single", "double"];

const EXECUTABLE_TEXT_COMPONENTS: &[&str] = &[
    "scripts_execute_radiobutton",
    "scripts_view_radiobutton",
    "scripts_confirm_radiobutton",
];
const EXECUTABLE_TEXT_VALUES: &[&str] = &["launch", "display", "ask"];

const RECURSIVE_SEARCH_COMPONENTS: &[&str] = &[
    "search_recursive_only_this_computer_radiobutton",
    "search_recursive_all_locations_radiobutton",
    "search_recursive_never_radiobutton",
];
const THUMBNAILS_COMPONENTS: &[&str] = &[
    "thumbnails_only_this_computer_radiobutton",
    "thumbnails_all_files_radiobutton",
    "thumbnails_never_radiobutton",
];
const COUNT_COMPONENTS: &[&str] = &[
    "count_only_this_computer_radiobutton",
    "count_all_files_radiobutton",
    "count_never_radiobutton",
];

pub const THUMBNAIL_LIMIT_VALUES: &[u64] = &[
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

pub const ICON_CAPTIONS_COMPONENTS: &[&str] = &["captions_0_combobox", "captions_1_combobox", "captions_2_combobox"];

const WINDOW_ICON: &str = "system-file-manager";

fn bindings() -> Vec<Binding> {
    vec![
        Binding::Bool {
            widget: FOLDERS_FIRST_WIDGET,
            key: keys::SORT_DIRECTORIES_FIRST,
        },
        Binding::Bool {
            widget: TRASH_CONFIRM_WIDGET,
            key: keys::CONFIRM_TRASH,
        },
        Binding::Bool {
            widget: LIST_VIEW_USE_TREE_WIDGET,
            key: keys::LIST_VIEW_USE_TREE,
        },
        Binding::Bool {
            widget: CREATE_LINK_WIDGET,
            key: keys::SHOW_CREATE_LINK,
        },
        Binding::Bool {
            widget: DELETE_PERMANENTLY_WIDGET,
            key: keys::SHOW_DELETE_PERMANENTLY,
        },
        Binding::Radio {
            widgets: CLICK_BEHAVIOR_COMPONENTS,
            key: keys::CLICK_POLICY,
            values: CLICK_BEHAVIOR_VALUES,
        },
        Binding::Radio {
            widgets: EXECUTABLE_TEXT_COMPONENTS,
            key: keys::EXECUTABLE_TEXT_ACTIVATION,
            values: EXECUTABLE_TEXT_VALUES,
        },
        Binding::Radio {
            widgets: RECURSIVE_SEARCH_COMPONENTS,
            key: keys::RECURSIVE_SEARCH,
            values: SPEED_TRADEOFF_VALUES,
        },
        Binding::Radio {
            widgets: THUMBNAILS_COMPONENTS,
            key: keys::SHOW_FILE_THUMBNAILS,
            values: SPEED_TRADEOFF_VALUES,
        },
        Binding::Radio {
            widgets: COUNT_COMPONENTS,
            key: keys::SHOW_DIRECTORY_ITEM_COUNTS,
            values: SPEED_TRADEOFF_VALUES,
        },
        Binding::UintEnum {
            widget: THUMBNAIL_LIMIT_WIDGET,
            key: keys::FILE_THUMBNAIL_LIMIT,
            values: THUMBNAIL_LIMIT_VALUES,
        },
    ]
}

pub struct PreferencesWindow {
    store: Arc<SettingsStore>,
    changes: broadcast::Receiver<SettingsChange>,
    widgets: Widgets,
    bindings: Vec<Binding>,
    /// Column names behind each caption combo's entries, "none" first
    caption_columns: Vec<&'static str>,
    column_chooser: ColumnChooser,
    transient_for: Option<String>,
    visible: bool,
    times_presented: u32,
}

impl PreferencesWindow {
    /// Builds the window, loads every widget from settings and shows it.
    pub fn new(store: Arc<SettingsStore>, parent: Option<&str>) -> Result<Self, PreferencesError> {
        let changes = store.subscribe();
        let mut window = Self {
            store,
            changes,
            widgets: Widgets::default(),
            bindings: bindings(),
            caption_columns: Vec::new(),
            column_chooser: ColumnChooser::new(),
            transient_for: parent.map(str::to_string),
            visible: false,
            times_presented: 0,
        };

        window.setup_bound_widgets()?;
        window.setup_icon_caption_page()?;
        window.set_columns_from_settings()?;
        // The checkbox starts inactive, so loading `true` counts as a change
        if window.widgets.get(FOLDERS_FIRST_WIDGET).and_then(Widget::is_active) == Some(true) {
            window.sort_folders_first_toggled()?;
        }
        window.visible = true;
        log::debug!("Preferences window created");
        Ok(window)
    }

    fn setup_bound_widgets(&mut self) -> Result<(), PreferencesError> {
        let limit_labels: Vec<String> = THUMBNAIL_LIMIT_VALUES
            .iter()
            .map(|v| crate::file_system::format_size(*v))
            .collect();

        for binding in &self.bindings {
            for id in binding.widgets() {
                let widget = match binding {
                    Binding::Enum { values, .. } => Widget::combo(values.iter().map(|v| v.to_string()).collect()),
                    Binding::UintEnum { .. } => Widget::combo(limit_labels.clone()),
                    Binding::Bool { .. } | Binding::Radio { .. } => Widget::toggle(),
                };
                self.widgets.insert(*id, widget);
            }
            binding.load(&self.store, &mut self.widgets)?;
        }
        Ok(())
    }

    fn setup_icon_caption_page(&mut self) -> Result<(), PreferencesError> {
        // "name" is always shown under icons, so it's not offered as a caption
        let mut labels = vec!["None".to_string()];
        self.caption_columns = vec!["none"];
        for column in common_columns().iter().filter(|c| c.name != "name") {
            labels.push(column.label.to_string());
            self.caption_columns.push(column.name);
        }

        let writable = self.store.is_writable(keys::ICON_VIEW_CAPTIONS);
        for id in ICON_CAPTIONS_COMPONENTS {
            let mut combo = Widget::combo(labels.clone());
            combo.sensitive = writable;
            self.widgets.insert(*id, combo);
        }
        self.update_icon_captions_from_settings()
    }

    /// Missing entries in the stored list mean "none".
    fn update_icon_captions_from_settings(&mut self) -> Result<(), PreferencesError> {
        let captions = self.store.get_strv(keys::ICON_VIEW_CAPTIONS)?;
        let mut stored = captions.iter();
        for id in ICON_CAPTIONS_COMPONENTS {
            let name = stored.next().map(String::as_str).unwrap_or("none");
            match self.caption_columns.iter().position(|c| *c == name) {
                Some(index) => {
                    self.widgets.set_active_index(id, Some(index));
                }
                None => log::debug!("Unknown icon caption '{}' for {}", name, id),
            }
        }
        Ok(())
    }

    fn icon_captions_changed(&self) -> Result<(), PreferencesError> {
        let captions: Vec<String> = ICON_CAPTIONS_COMPONENTS
            .iter()
            .map(|id| {
                let index = self.widgets.get(id).and_then(Widget::active_index).unwrap_or(0);
                self.caption_columns.get(index).copied().unwrap_or("none").to_string()
            })
            .collect();
        self.store.set_strv(keys::ICON_VIEW_CAPTIONS, &captions)?;
        Ok(())
    }

    fn set_columns_from_settings(&mut self) -> Result<(), PreferencesError> {
        let visible = self.store.get_strv(keys::LIST_VIEW_DEFAULT_VISIBLE_COLUMNS)?;
        let order = self.store.get_strv(keys::LIST_VIEW_DEFAULT_COLUMN_ORDER)?;
        self.column_chooser.set_settings(&visible, &order);
        Ok(())
    }

    fn columns_changed(&self) -> Result<(), PreferencesError> {
        let (visible, order) = self.column_chooser.settings();
        self.store.set_strv(keys::LIST_VIEW_DEFAULT_VISIBLE_COLUMNS, &visible)?;
        self.store.set_strv(keys::LIST_VIEW_DEFAULT_COLUMN_ORDER, &order)?;
        Ok(())
    }

    /// Mirrors the folders-first checkbox into the file chooser's settings.
    fn sort_folders_first_toggled(&self) -> Result<(), PreferencesError> {
        if let Some(active) = self.widgets.get(FOLDERS_FIRST_WIDGET).and_then(Widget::is_active)
            && self.store.is_writable(keys::FILE_CHOOSER_SORT_DIRECTORIES_FIRST)
        {
            self.store
                .set_bool(keys::FILE_CHOOSER_SORT_DIRECTORIES_FIRST, active)?;
        }
        Ok(())
    }

    pub fn widget(&self, id: &str) -> Option<&Widget> {
        self.widgets.get(id)
    }

    pub fn column_chooser(&self) -> &ColumnChooser {
        &self.column_chooser
    }

    /// The user clicked a check button or radio button.
    pub fn toggle(&mut self, id: &str, active: bool) -> Result<(), PreferencesError> {
        self.ensure_editable(id)?;
        let binding = self
            .bindings
            .iter()
            .find(|b| b.controls(id))
            .ok_or_else(|| PreferencesError::UnknownWidget(id.to_string()))?;

        if !self.widgets.set_active(id, active) {
            return Ok(());
        }

        // Activating a radio deactivates the rest of its group
        if let Binding::Radio { widgets, .. } = binding
            && active
        {
            for other in widgets.iter().filter(|w| **w != id) {
                if self.widgets.set_active(other, false) {
                    binding.store(other, &self.widgets, &self.store)?;
                }
            }
        }
        binding.store(id, &self.widgets, &self.store)?;

        if id == FOLDERS_FIRST_WIDGET {
            self.sort_folders_first_toggled()?;
        }
        Ok(())
    }

    /// The user picked entry `index` in a combo box.
    pub fn select(&mut self, id: &str, index: usize) -> Result<(), PreferencesError> {
        self.ensure_editable(id)?;
        let items = self
            .widgets
            .get(id)
            .map(|w| w.items().len())
            .ok_or_else(|| PreferencesError::UnknownWidget(id.to_string()))?;
        if index >= items {
            return Err(PreferencesError::IndexOutOfRange {
                widget: id.to_string(),
                index,
            });
        }
        if !self.widgets.set_active_index(id, Some(index)) {
            return Ok(());
        }

        if ICON_CAPTIONS_COMPONENTS.iter().any(|c| *c == id) {
            return self.icon_captions_changed();
        }
        match self.bindings.iter().find(|b| b.controls(id)) {
            Some(binding) => binding.store(id, &self.widgets, &self.store),
            None => Err(PreferencesError::UnknownWidget(id.to_string())),
        }
    }

    pub fn toggle_column(&mut self, name: &str) -> Result<(), PreferencesError> {
        if self.column_chooser.toggle(name) {
            self.columns_changed()?;
        }
        Ok(())
    }

    pub fn move_column_up(&mut self, name: &str) -> Result<(), PreferencesError> {
        if self.column_chooser.move_up(name) {
            self.columns_changed()?;
        }
        Ok(())
    }

    pub fn move_column_down(&mut self, name: &str) -> Result<(), PreferencesError> {
        if self.column_chooser.move_down(name) {
            self.columns_changed()?;
        }
        Ok(())
    }

    /// "Use Default" on the list columns page.
    pub fn use_default_columns(&mut self) -> Result<(), PreferencesError> {
        self.store.reset(keys::LIST_VIEW_DEFAULT_VISIBLE_COLUMNS)?;
        self.store.reset(keys::LIST_VIEW_DEFAULT_COLUMN_ORDER)?;
        self.set_columns_from_settings()
    }

    /// Applies setting changes made since the last call to the widgets.
    pub fn sync_from_settings(&mut self) -> Result<(), PreferencesError> {
        loop {
            let change = match self.changes.try_recv() {
                Ok(change) => change,
                Err(TryRecvError::Lagged(skipped)) => {
                    log::debug!("Preferences window missed {} setting changes, reloading all", skipped);
                    self.reload_all()?;
                    continue;
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => return Ok(()),
            };
            self.apply_change(&change)?;
        }
    }

    fn apply_change(&mut self, change: &SettingsChange) -> Result<(), PreferencesError> {
        let key = change.key();
        if key == keys::ICON_VIEW_CAPTIONS {
            let writable = self.store.is_writable(key);
            for id in ICON_CAPTIONS_COMPONENTS {
                self.widgets.set_sensitive(id, writable);
            }
            return self.update_icon_captions_from_settings();
        }
        if key == keys::LIST_VIEW_DEFAULT_VISIBLE_COLUMNS || key == keys::LIST_VIEW_DEFAULT_COLUMN_ORDER {
            return self.set_columns_from_settings();
        }

        for binding in self.bindings.iter().filter(|b| b.key() == key) {
            binding.load(&self.store, &mut self.widgets)?;
        }
        if key == keys::SORT_DIRECTORIES_FIRST && matches!(change, SettingsChange::Value(_)) {
            self.sort_folders_first_toggled()?;
        }
        Ok(())
    }

    fn reload_all(&mut self) -> Result<(), PreferencesError> {
        for binding in &self.bindings {
            binding.load(&self.store, &mut self.widgets)?;
        }
        self.update_icon_captions_from_settings()?;
        self.set_columns_from_settings()
    }

    fn ensure_editable(&self, id: &str) -> Result<(), PreferencesError> {
        match self.widgets.get(id) {
            Some(widget) if widget.sensitive => Ok(()),
            Some(_) => Err(PreferencesError::Insensitive(id.to_string())),
            None => Err(PreferencesError::UnknownWidget(id.to_string())),
        }
    }

    pub fn icon_name(&self) -> &'static str {
        WINDOW_ICON
    }

    pub fn transient_for(&self) -> Option<&str> {
        self.transient_for.as_deref()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Raises the window to the user.
    pub fn present(&mut self) {
        self.visible = true;
        self.times_presented += 1;
    }

    /// Closing destroys the window; the next `show` builds a fresh one.
    pub fn close(&mut self) {
        self.visible = false;
        log::debug!("Preferences window closed");
    }

    pub fn times_presented(&self) -> u32 {
        self.times_presented
    }
}

/// Shows the preferences window, reusing the open one if there is one.
pub fn show<'a>(
    slot: &'a mut Option<PreferencesWindow>,
    store: &Arc<SettingsStore>,
    parent: Option<&str>,
) -> Result<&'a mut PreferencesWindow, PreferencesError> {
    let window = match slot.take().filter(PreferencesWindow::is_visible) {
        Some(mut window) => {
            window.present();
            window
        }
        None => PreferencesWindow::new(Arc::clone(store), parent)?,
    };
    Ok(slot.insert(window))
}
