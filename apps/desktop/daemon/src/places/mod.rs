//! "Other Locations": the places view, its list and rows, and the volumes they show.

mod list;
mod row;
mod view;
mod volumes;


pub use list::{OpenFlags, PlacesList, PlacesListEvent};
pub use row::{
    EjectButton, FilesystemAttributes, FilesystemInfo, FilesystemInfoProvider, PRIORITY_DEFAULT, PlacesViewRow,
    ProbeError, ProbeOutcome, RowSpec, SpaceLabel, StatvfsProvider,
};
pub use view::{LocationOpener, PLACES_VIEW_ICON, PlacesView, PlacesViewEvent, WindowOpenFlags, WindowSlot};
pub use volumes::{DEFAULT_VOLUME_ID, LocationCategory, VolumeInfo, is_network_fs_type, list_volumes};

use crate::file_system::Location;

/// A mounted filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mount {
    pub name: String,
    pub root: Location,
}

/// A volume, mounted or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Volume {
    pub name: String,
    pub mount: Option<Mount>,
}

impl Mount {
    pub fn new(name: impl Into<String>, root: Location) -> Self {
        Self { name: name.into(), root }
    }
}

impl Volume {
    pub fn new(name: impl Into<String>, mount: Option<Mount>) -> Self {
        Self {
            name: name.into(),
            mount,
        }
    }
}
