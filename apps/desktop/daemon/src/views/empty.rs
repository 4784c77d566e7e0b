//! A files view that shows nothing. Used to measure directory loading without rendering.

use std::cmp::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::broadcast;

use super::{FileRef, FilesView, ViewEvent, ViewId, ZoomLevel};
use crate::file_system::Location;

const EVENT_CAPACITY: usize = 16;

pub struct EmptyView {
    number_of_files: usize,
    cumulative_load: Duration,
    events: broadcast::Sender<ViewEvent>,
}

impl EmptyView {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            number_of_files: 0,
            cumulative_load: Duration::ZERO,
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ViewEvent> {
        self.events.subscribe()
    }

    pub fn file_count(&self) -> usize {
        self.number_of_files
    }
}

impl Default for EmptyView {
    fn default() -> Self {
        Self::new()
    }
}

impl FilesView for EmptyView {
    fn add_file(&mut self, file: &FileRef, _directory: &Location) {
        self.number_of_files += 1;

        let started = Instant::now();
        let icon = file.icon_name(ZoomLevel::Standard.icon_size());
        let elapsed = started.elapsed();
        self.cumulative_load += elapsed;
        log::debug!(
            "Loaded {} ({}): {:.3}s, cumulative {:.3}s",
            file.location,
            icon,
            elapsed.as_secs_f64(),
            self.cumulative_load.as_secs_f64()
        );
    }

    fn remove_file(&mut self, file: &FileRef, _directory: &Location) {
        if self.number_of_files == 0 {
            log::warn!("Removing {} from an empty view", file.location);
            return;
        }
        self.number_of_files -= 1;
    }

    fn file_changed(&mut self, _file: &FileRef, _directory: &Location) {}

    fn begin_loading(&mut self) {}

    fn end_loading(&mut self, _all_files_seen: bool) {}

    fn clear(&mut self) {}

    fn selection(&self) -> Vec<FileRef> {
        Vec::new()
    }

    fn selection_for_file_transfer(&self) -> Vec<FileRef> {
        Vec::new()
    }

    fn set_selection(&mut self, _selection: Vec<FileRef>) {
        let _ = self.events.send(ViewEvent::SelectionChanged);
    }

    fn select_all(&mut self) {}

    fn reveal_selection(&mut self) {}

    fn is_empty(&self) -> bool {
        self.number_of_files == 0
    }

    fn end_file_changes(&mut self) {}

    fn bump_zoom_level(&mut self, _increment: i32) {}

    fn zoom_level(&self) -> ZoomLevel {
        ZoomLevel::Standard
    }

    fn zoom_to_level(&mut self, _level: ZoomLevel) {}

    fn restore_default_zoom_level(&mut self) {}

    fn can_zoom_in(&self) -> bool {
        false
    }

    fn can_zoom_out(&self) -> bool {
        false
    }

    fn click_policy_changed(&mut self) {}

    /// Orders by identity, so the same file always sorts equal to itself only.
    fn compare_files(&self, a: &FileRef, b: &FileRef) -> Ordering {
        Arc::as_ptr(a).cmp(&Arc::as_ptr(b))
    }

    fn sort_directories_first_changed(&mut self) {}

    fn using_manual_layout(&self) -> bool {
        false
    }

    fn first_visible_file(&self) -> Option<String> {
        None
    }

    fn scroll_to_file(&mut self, _uri: &str) {}

    fn view_id(&self) -> ViewId {
        ViewId::Empty
    }

    fn icon(&self) -> Option<&str> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::super::FileItem;
    use super::*;

    fn file(path: &str) -> FileRef {
        FileItem::new(Location::from_path(path), false, 0)
    }

    #[test]
    fn counts_added_and_removed_files() {
        let mut view = EmptyView::new();
        let dir = Location::from_path("/tmp");
        assert!(view.is_empty());

        let a = file("/tmp/a");
        let b = file("/tmp/b");
        view.add_file(&a, &dir);
        view.add_file(&b, &dir);
        assert_eq!(view.file_count(), 2);
        assert!(!view.is_empty());

        view.remove_file(&a, &dir);
        view.remove_file(&b, &dir);
        assert!(view.is_empty());

        // Never goes negative
        view.remove_file(&a, &dir);
        assert_eq!(view.file_count(), 0);
    }

    #[test]
    fn set_selection_notifies_but_selects_nothing() {
        let mut view = EmptyView::new();
        let mut events = view.subscribe();

        view.set_selection(vec![file("/tmp/a")]);

        assert_eq!(events.try_recv().unwrap(), ViewEvent::SelectionChanged);
        assert!(view.selection().is_empty());
        assert!(view.selection_for_file_transfer().is_empty());
    }

    #[test]
    fn zoom_is_fixed_at_standard() {
        let mut view = EmptyView::new();
        view.zoom_to_level(ZoomLevel::Larger);
        view.bump_zoom_level(1);
        assert_eq!(view.zoom_level(), ZoomLevel::Standard);
        assert!(!view.can_zoom_in());
        assert!(!view.can_zoom_out());
    }

    #[test]
    fn compares_by_identity_not_content() {
        let view = EmptyView::new();
        let a = file("/tmp/same");
        let b = file("/tmp/same");

        assert_eq!(view.compare_files(&a, &Arc::clone(&a)), Ordering::Equal);
        assert_ne!(view.compare_files(&a, &b), Ordering::Equal);
        assert_eq!(view.compare_files(&a, &b), view.compare_files(&b, &a).reverse());
    }

    #[test]
    fn identifies_as_empty_view_without_icon() {
        let view = EmptyView::new();
        assert_eq!(view.view_id(), ViewId::Empty);
        assert_eq!(view.icon(), None);
        assert_eq!(view.first_visible_file(), None);
        assert!(!view.using_manual_layout());
    }
}
