//! One row of the places list: a volume, mount or plain location with its free space.
//!
//! Free space is measured asynchronously. Each change of file, mount or network flag
//! cancels the outstanding probe and starts a new one, so a row has at most one probe
//! in flight and a stale result never overwrites a newer one.

use std::fmt;
use std::future::Future;
use std::path::Path;
use std::sync::{Arc, Mutex};

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::{Mount, Volume};
use crate::file_system::{Location, format_size, get_space_info_for_path};
use crate::ignore_poison::IgnorePoison;

/// Priority passed to the provider for space probes.
pub const PRIORITY_DEFAULT: i32 = 0;

const EJECT_ICON: &str = "media-eject-symbolic";
const DISCONNECT_ICON: &str = "network-offline-symbolic";

/// Which filesystem attributes a probe asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilesystemAttributes {
    pub free: bool,
    pub size: bool,
}

impl FilesystemAttributes {
    pub const FREE_AND_SIZE: Self = Self { free: true, size: true };
}

/// Result of a filesystem query. Attributes the filesystem doesn't report are `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilesystemInfo {
    pub free: Option<u64>,
    pub size: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    Cancelled,
    NotMounted,
    /// The location isn't backed by a local filesystem
    Unsupported { uri: String },
    Io(String),
}

impl ProbeError {
    /// Cancellation and unmounted locations are routine and not worth a warning.
    pub fn is_expected(&self) -> bool {
        matches!(self, Self::Cancelled | Self::NotMounted)
    }
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancelled => write!(f, "Operation was cancelled"),
            Self::NotMounted => write!(f, "Location is not mounted"),
            Self::Unsupported { uri } => write!(f, "Filesystem info not supported for {}", uri),
            Self::Io(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ProbeError {}

/// Answers filesystem-info queries for a location.
pub trait FilesystemInfoProvider: Send + Sync + 'static {
    fn query_filesystem_info(
        &self,
        location: &Location,
        attributes: FilesystemAttributes,
        priority: i32,
        cancellation: &CancellationToken,
    ) -> impl Future<Output = Result<FilesystemInfo, ProbeError>> + Send;
}

/// Queries local paths with `statvfs` on the blocking pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatvfsProvider;

impl FilesystemInfoProvider for StatvfsProvider {
    async fn query_filesystem_info(
        &self,
        location: &Location,
        attributes: FilesystemAttributes,
        _priority: i32,
        cancellation: &CancellationToken,
    ) -> Result<FilesystemInfo, ProbeError> {
        let Some(path) = location.local_path().map(Path::to_path_buf) else {
            return Err(ProbeError::Unsupported { uri: location.uri() });
        };
        if cancellation.is_cancelled() {
            return Err(ProbeError::Cancelled);
        }

        let space = tokio::task::spawn_blocking(move || get_space_info_for_path(&path))
            .await
            .map_err(|e| ProbeError::Io(e.to_string()))?
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => ProbeError::NotMounted,
                _ => ProbeError::Io(e.to_string()),
            })?;

        Ok(FilesystemInfo {
            free: attributes.free.then_some(space.available_bytes),
            size: attributes.size.then_some(space.total_bytes),
        })
    }
}

/// The "x / y available" label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpaceLabel {
    pub text: String,
    pub visible: bool,
}

/// How a probe ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The label now shows free and total space
    Applied,
    /// The filesystem didn't report both attributes; the label stays blank
    Incomplete,
    /// A newer probe or the row's drop superseded this one
    Superseded,
    Failed(ProbeError),
}

/// The unmount/disconnect button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EjectButton {
    /// Hidden buttons still take space, so rows stay aligned
    pub child_visible: bool,
    pub icon_name: &'static str,
    pub tooltip: &'static str,
}

/// Construction-time properties of a row.
#[derive(Debug, Clone, Default)]
pub struct RowSpec {
    pub name: String,
    pub path: String,
    pub icon: Option<String>,
    pub volume: Option<Volume>,
    pub mount: Option<Mount>,
    pub file: Option<Location>,
    pub is_network: bool,
}

struct Probe {
    token: CancellationToken,
    handle: JoinHandle<ProbeOutcome>,
}

pub struct PlacesViewRow<P: FilesystemInfoProvider> {
    provider: Arc<P>,
    runtime: Handle,
    name: String,
    path: String,
    icon: Option<String>,
    volume: Option<Volume>,
    mount: Option<Mount>,
    file: Option<Location>,
    is_network: bool,
    busy: bool,
    eject: EjectButton,
    space_label: Arc<Mutex<SpaceLabel>>,
    probe: Option<Probe>,
}

impl<P: FilesystemInfoProvider> PlacesViewRow<P> {
    /// Builds the row and starts measuring its free space.
    pub fn new(runtime: Handle, provider: Arc<P>, spec: RowSpec) -> Self {
        let mut row = Self {
            provider,
            runtime,
            name: spec.name,
            path: spec.path,
            icon: spec.icon,
            volume: spec.volume,
            mount: spec.mount,
            file: spec.file,
            is_network: false,
            busy: false,
            eject: EjectButton {
                child_visible: false,
                icon_name: EJECT_ICON,
                tooltip: "Unmount",
            },
            space_label: Arc::new(Mutex::new(SpaceLabel::default())),
            probe: None,
        };
        row.apply_is_network(spec.is_network);
        row.eject.child_visible = row.mount.is_some();
        row.measure_available_space();
        row
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn set_path(&mut self, path: impl Into<String>) {
        self.path = path.into();
    }

    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    pub fn set_icon(&mut self, icon: Option<String>) {
        self.icon = icon;
    }

    pub fn volume(&self) -> Option<&Volume> {
        self.volume.as_ref()
    }

    pub fn mount(&self) -> Option<&Mount> {
        self.mount.as_ref()
    }

    pub fn file(&self) -> Option<&Location> {
        self.file.as_ref()
    }

    pub fn is_network(&self) -> bool {
        self.is_network
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Shows or hides the busy spinner.
    pub fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
    }

    pub fn eject_button(&self) -> &EjectButton {
        &self.eject
    }

    pub fn space_label(&self) -> SpaceLabel {
        self.space_label.lock_ignore_poison().clone()
    }

    pub fn set_mount(&mut self, mount: Option<Mount>) {
        self.mount = mount;
        self.eject.child_visible = self.mount.is_some();
        self.measure_available_space();
    }

    pub fn set_file(&mut self, file: Option<Location>) {
        self.file = file;
        self.measure_available_space();
    }

    pub fn set_is_network(&mut self, is_network: bool) {
        self.apply_is_network(is_network);
        self.measure_available_space();
    }

    /// Waits for the outstanding probe, if any. `None` when nothing was started.
    pub async fn probe_finished(&mut self) -> Option<ProbeOutcome> {
        let probe = self.probe.take()?;
        match probe.handle.await {
            Ok(outcome) => Some(outcome),
            Err(e) => Some(ProbeOutcome::Failed(ProbeError::Io(e.to_string()))),
        }
    }

    fn apply_is_network(&mut self, is_network: bool) {
        self.is_network = is_network;
        if is_network {
            self.eject.icon_name = DISCONNECT_ICON;
            self.eject.tooltip = "Disconnect";
        } else {
            self.eject.icon_name = EJECT_ICON;
            self.eject.tooltip = "Unmount";
        }
    }

    /// What activating the row opens, and what gets probed for space.
    ///
    /// File first, then the mount root, then the root of the volume's own mount.
    pub fn location(&self) -> Option<Location> {
        if let Some(file) = &self.file {
            return Some(file.clone());
        }
        if let Some(mount) = &self.mount {
            return Some(mount.root.clone());
        }
        self.volume
            .as_ref()
            .and_then(|volume| volume.mount.as_ref())
            .map(|mount| mount.root.clone())
    }

    fn measure_available_space(&mut self) {
        // Cancel before clearing: a probe holding the label lock either wrote before the
        // clear or sees the cancellation.
        if let Some(previous) = self.probe.take() {
            previous.token.cancel();
        }

        let should_measure =
            !self.is_network && (self.volume.is_some() || self.mount.is_some() || self.file.is_some());
        {
            let mut label = self.space_label.lock_ignore_poison();
            label.text.clear();
            label.visible = should_measure;
        }
        if !should_measure {
            return;
        }

        let Some(location) = self.location() else {
            return;
        };

        let token = CancellationToken::new();
        let task_token = token.clone();
        let provider = Arc::clone(&self.provider);
        let label = Arc::clone(&self.space_label);
        let handle = self
            .runtime
            .spawn(async move { run_probe(provider, location, label, task_token).await });
        self.probe = Some(Probe { token, handle });
    }
}

impl<P: FilesystemInfoProvider> Drop for PlacesViewRow<P> {
    fn drop(&mut self) {
        if let Some(probe) = self.probe.take() {
            probe.token.cancel();
        }
    }
}

async fn run_probe<P: FilesystemInfoProvider>(
    provider: Arc<P>,
    location: Location,
    label: Arc<Mutex<SpaceLabel>>,
    token: CancellationToken,
) -> ProbeOutcome {
    let result = tokio::select! {
        biased;
        _ = token.cancelled() => Err(ProbeError::Cancelled),
        result = provider.query_filesystem_info(&location, FilesystemAttributes::FREE_AND_SIZE, PRIORITY_DEFAULT, &token) => result,
    };

    let info = match result {
        Ok(info) => info,
        Err(ProbeError::Cancelled) => return ProbeOutcome::Superseded,
        Err(e) => {
            if !e.is_expected() {
                log::warn!("Failed to measure available space: {}", e);
            }
            return ProbeOutcome::Failed(e);
        }
    };

    let (Some(free), Some(total)) = (info.free, info.size) else {
        return ProbeOutcome::Incomplete;
    };
    let text = format!("{} / {} available", format_size(free), format_size(total));

    let mut label = label.lock_ignore_poison();
    if token.is_cancelled() {
        return ProbeOutcome::Superseded;
    }
    label.text = text;
    ProbeOutcome::Applied
}
