//! View interfaces shared by the window slot's content views.
//!
//! `View` is what a slot talks to (location, search, loading state). `FilesView` is the
//! per-file protocol directory views implement on top.

mod empty;

pub use empty::EmptyView;

use std::cmp::Ordering;
use std::sync::Arc;

use crate::file_system::Location;

/// Icon zoom levels of the grid view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ZoomLevel {
    Small,
    Standard,
    Large,
    Larger,
}

impl ZoomLevel {
    /// Icon size in pixels.
    pub fn icon_size(self) -> u32 {
        match self {
            Self::Small => 48,
            Self::Standard => 64,
            Self::Large => 96,
            Self::Larger => 128,
        }
    }
}

/// Identifies a view implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewId {
    Grid = 0,
    List = 1,
    Empty = 3,
    OtherLocations = 4,
}

/// A file as views see it. Views share files by `Arc` and may compare them by identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileItem {
    pub location: Location,
    pub is_directory: bool,
    pub size: u64,
}

pub type FileRef = Arc<FileItem>;

impl FileItem {
    pub fn new(location: Location, is_directory: bool, size: u64) -> FileRef {
        Arc::new(Self {
            location,
            is_directory,
            size,
        })
    }

    /// Themed icon name for this file at `size` pixels.
    pub fn icon_name(&self, size: u32) -> String {
        let base = if self.is_directory { "folder" } else { "text-x-generic" };
        if size <= 16 {
            format!("{}-symbolic", base)
        } else {
            base.to_string()
        }
    }
}

/// A search as typed into the window's search bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    text: String,
    location: Option<Location>,
}

impl Query {
    pub fn new(text: impl Into<String>, location: Option<Location>) -> Self {
        Self {
            text: text.into(),
            location,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }
}

/// Change notifications from views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    SelectionChanged,
    IsLoading(bool),
}

/// What the window slot needs from any content view.
pub trait View {
    fn icon(&self) -> Option<&str>;
    fn location(&self) -> Option<&Location>;
    fn set_location(&mut self, location: Option<Location>);
    fn selection(&self) -> Vec<FileRef>;
    fn set_selection(&mut self, selection: Vec<FileRef>);
    fn search_query(&self) -> Option<&Query>;
    fn set_search_query(&mut self, query: Option<Query>);
    /// The view menu's content. `None` makes the view menu button insensitive.
    fn view_widget(&self) -> Option<&str>;
    fn is_loading(&self) -> bool;
    fn is_searching(&self) -> bool;
}

/// Per-file operations of directory views.
pub trait FilesView {
    fn add_file(&mut self, file: &FileRef, directory: &Location);
    fn remove_file(&mut self, file: &FileRef, directory: &Location);
    fn file_changed(&mut self, file: &FileRef, directory: &Location);
    fn begin_loading(&mut self);
    fn end_loading(&mut self, all_files_seen: bool);
    fn clear(&mut self);
    fn selection(&self) -> Vec<FileRef>;
    fn selection_for_file_transfer(&self) -> Vec<FileRef>;
    fn set_selection(&mut self, selection: Vec<FileRef>);
    fn select_all(&mut self);
    fn reveal_selection(&mut self);
    fn is_empty(&self) -> bool;
    fn end_file_changes(&mut self);
    fn bump_zoom_level(&mut self, increment: i32);
    fn zoom_level(&self) -> ZoomLevel;
    fn zoom_to_level(&mut self, level: ZoomLevel);
    fn restore_default_zoom_level(&mut self);
    fn can_zoom_in(&self) -> bool;
    fn can_zoom_out(&self) -> bool;
    fn click_policy_changed(&mut self);
    fn compare_files(&self, a: &FileRef, b: &FileRef) -> Ordering;
    fn sort_directories_first_changed(&mut self);
    fn using_manual_layout(&self) -> bool;
    fn first_visible_file(&self) -> Option<String>;
    fn scroll_to_file(&mut self, uri: &str);
    fn view_id(&self) -> ViewId;
    fn icon(&self) -> Option<&str>;
}
