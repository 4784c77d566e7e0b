//! The "Other Locations" view.
//!
//! Shows the places list for `other-locations:///` and hands every other location back
//! to the application, which picks a suitable view for it.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::TryRecvError;

use super::list::{OpenFlags, PlacesList, PlacesListEvent};
use super::row::FilesystemInfoProvider;
use crate::file_system::{Location, OTHER_LOCATIONS_URI};
use crate::views::{FileRef, Query, View, ViewEvent};

pub const PLACES_VIEW_ICON: &str = "view-list-symbolic";

const EVENT_CAPACITY: usize = 16;

/// Window open flags. No flag means "replace the current slot's location".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowOpenFlags(u32);

impl WindowOpenFlags {
    pub const NONE: Self = Self(0);
    pub const NEW_TAB: Self = Self(1);
    pub const NEW_WINDOW: Self = Self(1 << 1);

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl From<OpenFlags> for WindowOpenFlags {
    fn from(flags: OpenFlags) -> Self {
        match flags {
            OpenFlags::NewTab => Self::NEW_TAB,
            OpenFlags::NewWindow => Self::NEW_WINDOW,
            OpenFlags::Normal => Self::NONE,
        }
    }
}

/// The application side of location handling.
pub trait LocationOpener: Send + Sync {
    /// Opens `location` in whatever view suits it.
    fn open_location_full(&self, location: &Location, flags: WindowOpenFlags);
}

/// The window slot hosting a view.
pub trait WindowSlot: Send + Sync {
    /// Activates `location` as if the user had opened it from `launch_directory`.
    fn activate_file(&self, location: &Location, launch_directory: &str, flags: WindowOpenFlags);
}

/// Notifications from the places view.
pub type PlacesViewEvent = ViewEvent;

pub struct PlacesView<P: FilesystemInfoProvider> {
    location: Location,
    search_query: Option<Query>,
    places_list: PlacesList<P>,
    list_events: broadcast::Receiver<PlacesListEvent>,
    application: Arc<dyn LocationOpener>,
    slot: Option<Arc<dyn WindowSlot>>,
    events: broadcast::Sender<PlacesViewEvent>,
}

impl<P: FilesystemInfoProvider> PlacesView<P> {
    pub fn new(runtime: Handle, provider: Arc<P>, application: Arc<dyn LocationOpener>) -> Self {
        let mut places_list = PlacesList::new(runtime, provider);
        places_list.set_open_flags(&[OpenFlags::NewTab, OpenFlags::NewWindow, OpenFlags::Normal]);
        let list_events = places_list.subscribe();
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            location: Location::other_locations(),
            search_query: None,
            places_list,
            list_events,
            application,
            slot: None,
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PlacesViewEvent> {
        self.events.subscribe()
    }

    /// Attaches the view to (or detaches it from) a window slot.
    pub fn set_slot(&mut self, slot: Option<Arc<dyn WindowSlot>>) {
        self.slot = slot;
    }

    pub fn places_list(&self) -> &PlacesList<P> {
        &self.places_list
    }

    pub fn places_list_mut(&mut self) -> &mut PlacesList<P> {
        &mut self.places_list
    }

    /// Reloads the places list, forwarding its loading changes.
    pub async fn refresh(&mut self) {
        self.places_list.refresh().await;
        self.dispatch_list_events();
    }

    /// Handles everything the places list emitted since the last call.
    pub fn dispatch_list_events(&mut self) {
        loop {
            match self.list_events.try_recv() {
                Ok(PlacesListEvent::OpenLocation { location, flags }) => self.open_location(&location, flags),
                Ok(PlacesListEvent::LoadingChanged(loading)) => {
                    let _ = self.events.send(ViewEvent::IsLoading(loading));
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    log::warn!("Places view missed {} list events", skipped);
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
    }

    fn open_location(&self, location: &Location, flags: OpenFlags) {
        let Some(slot) = &self.slot else {
            log::debug!("No window slot for places view, dropping open of {}", location);
            return;
        };
        slot.activate_file(location, OTHER_LOCATIONS_URI, flags.into());
    }
}

impl<P: FilesystemInfoProvider> View for PlacesView<P> {
    fn icon(&self) -> Option<&str> {
        Some(PLACES_VIEW_ICON)
    }

    fn location(&self) -> Option<&Location> {
        Some(&self.location)
    }

    fn set_location(&mut self, location: Option<Location>) {
        let Some(location) = location else {
            return;
        };
        if location.is_other_locations() {
            self.location = location;
        } else {
            self.application.open_location_full(&location, WindowOpenFlags::NONE);
        }
    }

    fn selection(&self) -> Vec<FileRef> {
        Vec::new()
    }

    fn set_selection(&mut self, _selection: Vec<FileRef>) {}

    fn search_query(&self) -> Option<&Query> {
        self.search_query.as_ref()
    }

    fn set_search_query(&mut self, query: Option<Query>) {
        self.places_list.set_search_query(query.as_ref().map(Query::text));
        self.search_query = query;
    }

    fn view_widget(&self) -> Option<&str> {
        None
    }

    fn is_loading(&self) -> bool {
        self.places_list.is_loading()
    }

    fn is_searching(&self) -> bool {
        self.search_query.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::super::row::{FilesystemAttributes, FilesystemInfo, ProbeError};
    use super::super::volumes::{LocationCategory, VolumeInfo};
    use super::*;
    use std::sync::Mutex;
    use tokio_util::sync::CancellationToken;

    struct NoSpace;

    impl FilesystemInfoProvider for NoSpace {
        async fn query_filesystem_info(
            &self,
            _location: &Location,
            _attributes: FilesystemAttributes,
            _priority: i32,
            _cancellation: &CancellationToken,
        ) -> Result<FilesystemInfo, ProbeError> {
            Ok(FilesystemInfo::default())
        }
    }

    #[derive(Default)]
    struct Recorder {
        opened: Mutex<Vec<(Location, WindowOpenFlags)>>,
        activated: Mutex<Vec<(Location, String, WindowOpenFlags)>>,
    }

    impl LocationOpener for Recorder {
        fn open_location_full(&self, location: &Location, flags: WindowOpenFlags) {
            self.opened.lock().unwrap().push((location.clone(), flags));
        }
    }

    impl WindowSlot for Recorder {
        fn activate_file(&self, location: &Location, launch_directory: &str, flags: WindowOpenFlags) {
            self.activated
                .lock()
                .unwrap()
                .push((location.clone(), launch_directory.to_string(), flags));
        }
    }

    fn view_with(recorder: &Arc<Recorder>) -> PlacesView<NoSpace> {
        PlacesView::new(Handle::current(), Arc::new(NoSpace), Arc::clone(recorder) as Arc<dyn LocationOpener>)
    }

    #[tokio::test]
    async fn starts_at_other_locations_with_list_icon() {
        let view = view_with(&Arc::new(Recorder::default()));
        assert_eq!(view.location().unwrap().uri(), OTHER_LOCATIONS_URI);
        assert_eq!(view.icon(), Some("view-list-symbolic"));
        assert_eq!(view.view_widget(), None);
        assert!(view.selection().is_empty());
    }

    #[tokio::test]
    async fn foreign_locations_are_delegated_to_application() {
        let recorder = Arc::new(Recorder::default());
        let mut view = view_with(&recorder);

        view.set_location(Some(Location::from_path("/home/me")));
        view.set_location(None);

        assert_eq!(view.location().unwrap().uri(), OTHER_LOCATIONS_URI);
        let opened = recorder.opened.lock().unwrap();
        assert_eq!(*opened, vec![(Location::from_path("/home/me"), WindowOpenFlags::NONE)]);
    }

    #[tokio::test]
    async fn own_location_is_stored_without_delegating() {
        let recorder = Arc::new(Recorder::default());
        let mut view = view_with(&recorder);

        view.set_location(Some(Location::other_locations()));

        assert!(recorder.opened.lock().unwrap().is_empty());
        assert!(view.location().unwrap().is_other_locations());
    }

    #[tokio::test]
    async fn search_query_is_forwarded_to_list() {
        let mut view = view_with(&Arc::new(Recorder::default()));
        assert!(!view.is_searching());

        view.set_search_query(Some(Query::new("usb", None)));
        assert!(view.is_searching());
        assert_eq!(view.places_list().search_query(), Some("usb"));

        view.set_search_query(None);
        assert!(!view.is_searching());
        assert_eq!(view.places_list().search_query(), None);
    }

    #[tokio::test]
    async fn list_open_requests_activate_in_slot_with_mapped_flags() {
        let recorder = Arc::new(Recorder::default());
        let mut view = view_with(&recorder);
        view.set_slot(Some(Arc::clone(&recorder) as Arc<dyn WindowSlot>));
        view.places_list_mut().populate(vec![VolumeInfo {
            id: "backup".to_string(),
            name: "Backup".to_string(),
            path: "/media/backup".to_string(),
            category: LocationCategory::AttachedVolume,
            icon: None,
            is_ejectable: true,
        }]);

        view.places_list().activate_row(0, OpenFlags::NewTab);
        view.places_list().activate_row(0, OpenFlags::NewWindow);
        view.places_list().activate_row(0, OpenFlags::Normal);
        view.dispatch_list_events();

        let activated = recorder.activated.lock().unwrap();
        let flags: Vec<WindowOpenFlags> = activated.iter().map(|(_, _, f)| *f).collect();
        assert_eq!(
            flags,
            vec![WindowOpenFlags::NEW_TAB, WindowOpenFlags::NEW_WINDOW, WindowOpenFlags::NONE]
        );
        assert!(activated.iter().all(|(loc, dir, _)| {
            *loc == Location::from_path("/media/backup") && dir == OTHER_LOCATIONS_URI
        }));
    }

    #[tokio::test]
    async fn open_requests_without_slot_are_dropped() {
        let recorder = Arc::new(Recorder::default());
        let mut view = view_with(&recorder);
        view.places_list_mut().populate(vec![VolumeInfo {
            id: "root".to_string(),
            name: "Computer".to_string(),
            path: "/".to_string(),
            category: LocationCategory::MainVolume,
            icon: None,
            is_ejectable: false,
        }]);

        view.places_list().activate_row(0, OpenFlags::Normal);
        view.dispatch_list_events();

        assert!(recorder.activated.lock().unwrap().is_empty());
        assert!(recorder.opened.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn loading_changes_become_view_notifications() {
        let mut view = view_with(&Arc::new(Recorder::default()));
        let mut events = view.subscribe();

        view.places_list_mut().set_loading(true);
        view.dispatch_list_events();
        assert!(view.is_loading());

        view.places_list_mut().set_loading(false);
        view.dispatch_list_events();
        assert!(!view.is_loading());

        assert_eq!(events.try_recv().unwrap(), ViewEvent::IsLoading(true));
        assert_eq!(events.try_recv().unwrap(), ViewEvent::IsLoading(false));
    }
}
