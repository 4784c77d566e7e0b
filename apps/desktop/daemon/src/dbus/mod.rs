//! File-operations bus service.
//!
//! Exposes one method, `CopyURIs(as URIList, s Destination)`, which forwards to the copy
//! engine and replies immediately. The service object is created and torn down by the
//! application; there is no process-wide instance.

mod dispatch;
#[cfg(target_os = "linux")]
mod service;

pub use dispatch::{CopyDispatch, trigger_copy_file_operation};
#[cfg(target_os = "linux")]
pub use service::{DBusManager, FileOperationsService};

pub const BUS_NAME: &str = "org.gnome.Nautilus";
pub const OBJECT_PATH: &str = "/org/gnome/Nautilus";
pub const INTERFACE_NAME: &str = "org.gnome.Nautilus.FileOperations";

/// Error type for bus setup and teardown.
#[derive(Debug)]
pub enum DBusError {
    /// Connecting, registering or owning the name failed
    #[cfg(target_os = "linux")]
    Bus(zbus::Error),
    /// No session bus on this platform
    Unsupported,
}

impl std::fmt::Display for DBusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            #[cfg(target_os = "linux")]
            Self::Bus(e) => write!(f, "D-Bus error: {}", e),
            Self::Unsupported => write!(f, "D-Bus is not available on this platform"),
        }
    }
}

impl std::error::Error for DBusError {}

#[cfg(target_os = "linux")]
impl From<zbus::Error> for DBusError {
    fn from(err: zbus::Error) -> Self {
        Self::Bus(err)
    }
}
