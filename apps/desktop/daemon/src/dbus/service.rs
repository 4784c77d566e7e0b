//! Session-bus service for `org.gnome.Nautilus.FileOperations`.

use std::sync::Arc;

use zbus::{connection, interface};

use super::dispatch::trigger_copy_file_operation;
use super::{BUS_NAME, DBusError, OBJECT_PATH};
use crate::config::DBusConfig;
use crate::file_system::FileOperations;

/// The object served at `/org/gnome/Nautilus`.
pub struct FileOperationsService {
    operations: Arc<dyn FileOperations>,
}

impl FileOperationsService {
    pub fn new(operations: Arc<dyn FileOperations>) -> Self {
        Self { operations }
    }
}

#[interface(name = "org.gnome.Nautilus.FileOperations")]
impl FileOperationsService {
    /// Starts copying `uri_list` into `destination` and replies right away.
    #[zbus(name = "CopyURIs")]
    async fn copy_uris(&self, uri_list: Vec<String>, destination: String) {
        trigger_copy_file_operation(self.operations.as_ref(), &uri_list, &destination);
    }
}

/// Owns the bus name and the registered object for the application's lifetime.
///
/// Built by `start`, torn down by `stop`; the application holds exactly one.
pub struct DBusManager {
    connection: zbus::Connection,
}

impl DBusManager {
    /// Connects to the session bus (or the configured address), registers the object
    /// and requests the well-known name.
    pub async fn start(config: &DBusConfig, operations: Arc<dyn FileOperations>) -> Result<Self, DBusError> {
        let builder = match &config.address {
            Some(address) => connection::Builder::address(address.as_str())?,
            None => connection::Builder::session()?,
        };

        let connection = builder
            .serve_at(OBJECT_PATH, FileOperationsService::new(operations))?
            .name(BUS_NAME)?
            .build()
            .await?;

        log::info!("D-Bus service {} registered at {}", BUS_NAME, OBJECT_PATH);
        Ok(Self { connection })
    }

    pub fn connection(&self) -> &zbus::Connection {
        &self.connection
    }

    /// Unregisters the object and releases the name.
    pub async fn stop(self) -> Result<(), DBusError> {
        let removed = self
            .connection
            .object_server()
            .remove::<FileOperationsService, _>(OBJECT_PATH)
            .await?;
        if !removed {
            log::debug!("D-Bus object at {} was already gone", OBJECT_PATH);
        }

        self.connection.release_name(BUS_NAME).await?;
        log::info!("D-Bus service {} stopped", BUS_NAME);
        Ok(())
    }
}
