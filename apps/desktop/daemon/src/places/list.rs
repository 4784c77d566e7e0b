//! The list of places rows behind "Other Locations".

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::broadcast;

use super::row::{FilesystemInfoProvider, PlacesViewRow};
use super::volumes::{VolumeInfo, list_volumes};
use crate::file_system::Location;

const EVENT_CAPACITY: usize = 64;

/// How the user asked to open a place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenFlags {
    Normal,
    NewTab,
    NewWindow,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacesListEvent {
    OpenLocation { location: Location, flags: OpenFlags },
    LoadingChanged(bool),
}

pub struct PlacesList<P: FilesystemInfoProvider> {
    runtime: Handle,
    provider: Arc<P>,
    rows: Vec<PlacesViewRow<P>>,
    loading: bool,
    search_query: Option<String>,
    open_flags: Vec<OpenFlags>,
    events: broadcast::Sender<PlacesListEvent>,
}

impl<P: FilesystemInfoProvider> PlacesList<P> {
    pub fn new(runtime: Handle, provider: Arc<P>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            runtime,
            provider,
            rows: Vec::new(),
            loading: false,
            search_query: None,
            open_flags: vec![OpenFlags::Normal],
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PlacesListEvent> {
        self.events.subscribe()
    }

    /// Re-reads volumes from the system and rebuilds the rows.
    pub async fn refresh(&mut self) {
        self.set_loading(true);
        let volumes = match tokio::task::spawn_blocking(list_volumes).await {
            Ok(volumes) => volumes,
            Err(e) => {
                log::warn!("Listing volumes failed: {}", e);
                Vec::new()
            }
        };
        self.populate(volumes);
        self.set_loading(false);
    }

    /// Replaces all rows with one per volume. Each new row starts its own space probe.
    pub fn populate(&mut self, volumes: Vec<VolumeInfo>) {
        self.rows = volumes
            .iter()
            .map(|volume| PlacesViewRow::new(self.runtime.clone(), Arc::clone(&self.provider), volume.to_row_spec()))
            .collect();
    }

    pub fn rows(&self) -> &[PlacesViewRow<P>] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [PlacesViewRow<P>] {
        &mut self.rows
    }

    /// Rows matching the search query by name or path, case-insensitively.
    pub fn visible_rows(&self) -> Vec<&PlacesViewRow<P>> {
        let Some(query) = self.search_query.as_deref().map(str::to_lowercase) else {
            return self.rows.iter().collect();
        };
        self.rows
            .iter()
            .filter(|row| row.name().to_lowercase().contains(&query) || row.path().to_lowercase().contains(&query))
            .collect()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn set_loading(&mut self, loading: bool) {
        if self.loading != loading {
            self.loading = loading;
            let _ = self.events.send(PlacesListEvent::LoadingChanged(loading));
        }
    }

    pub fn search_query(&self) -> Option<&str> {
        self.search_query.as_deref()
    }

    /// An empty query shows every row, same as none.
    pub fn set_search_query(&mut self, query: Option<&str>) {
        self.search_query = query.filter(|q| !q.is_empty()).map(str::to_string);
    }

    /// The ways rows may be opened. Requests with other flags open normally.
    pub fn set_open_flags(&mut self, flags: &[OpenFlags]) {
        self.open_flags = flags.to_vec();
    }

    pub fn open_flags(&self) -> &[OpenFlags] {
        &self.open_flags
    }

    /// Asks for the row at `index` to be opened. Returns false for rows with nothing to open.
    pub fn activate_row(&self, index: usize, flags: OpenFlags) -> bool {
        let Some(location) = self.rows.get(index).and_then(|row| row.location()) else {
            return false;
        };
        let flags = if self.open_flags.contains(&flags) {
            flags
        } else {
            OpenFlags::Normal
        };
        log::debug!("Opening place {} ({:?})", location, flags);
        let _ = self.events.send(PlacesListEvent::OpenLocation { location, flags });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::super::row::{FilesystemAttributes, FilesystemInfo, ProbeError};
    use super::super::volumes::LocationCategory;
    use super::*;
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

    fn volume(name: &str, path: &str, category: LocationCategory) -> VolumeInfo {
        VolumeInfo {
            id: name.to_lowercase(),
            name: name.to_string(),
            path: path.to_string(),
            category,
            icon: None,
            is_ejectable: false,
        }
    }

    fn sample_list() -> PlacesList<NoSpace> {
        let mut list = PlacesList::new(Handle::current(), Arc::new(NoSpace));
        list.populate(vec![
            volume("Documents", "/home/me/Documents", LocationCategory::Favorite),
            volume("Computer", "/", LocationCategory::MainVolume),
            volume("Backup", "/media/BACKUP", LocationCategory::AttachedVolume),
        ]);
        list
    }

    #[tokio::test]
    async fn search_filters_by_name_or_path_ignoring_case() {
        let mut list = sample_list();
        assert_eq!(list.visible_rows().len(), 3);

        list.set_search_query(Some("backup"));
        let names: Vec<&str> = list.visible_rows().iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["Backup"]);

        list.set_search_query(Some("/home"));
        assert_eq!(list.visible_rows().len(), 1);

        list.set_search_query(Some(""));
        assert_eq!(list.search_query(), None);
        assert_eq!(list.visible_rows().len(), 3);
    }

    #[tokio::test]
    async fn activation_emits_open_location() {
        let mut list = sample_list();
        list.set_open_flags(&[OpenFlags::Normal, OpenFlags::NewTab]);
        let mut events = list.subscribe();

        assert!(list.activate_row(2, OpenFlags::NewTab));
        assert!(list.activate_row(0, OpenFlags::NewWindow));
        assert!(!list.activate_row(9, OpenFlags::Normal));

        assert_eq!(
            events.try_recv().unwrap(),
            PlacesListEvent::OpenLocation {
                location: Location::from_path("/media/BACKUP"),
                flags: OpenFlags::NewTab,
            }
        );
        // New windows aren't allowed here, so it falls back to a normal open
        assert_eq!(
            events.try_recv().unwrap(),
            PlacesListEvent::OpenLocation {
                location: Location::from_path("/home/me/Documents"),
                flags: OpenFlags::Normal,
            }
        );
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn loading_changes_are_announced_once() {
        let mut list = sample_list();
        let mut events = list.subscribe();

        list.set_loading(true);
        list.set_loading(true);
        list.set_loading(false);

        assert_eq!(events.try_recv().unwrap(), PlacesListEvent::LoadingChanged(true));
        assert_eq!(events.try_recv().unwrap(), PlacesListEvent::LoadingChanged(false));
        assert!(events.try_recv().is_err());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn refresh_lists_at_least_the_root() {
        let mut list = PlacesList::new(Handle::current(), Arc::new(NoSpace));
        let mut events = list.subscribe();

        list.refresh().await;

        assert!(!list.is_loading());
        assert!(list.rows().iter().any(|row| row.path() == "/"));
        assert_eq!(events.try_recv().unwrap(), PlacesListEvent::LoadingChanged(true));
        assert_eq!(events.try_recv().unwrap(), PlacesListEvent::LoadingChanged(false));
    }
}
