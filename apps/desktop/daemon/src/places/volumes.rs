//! Volumes and well-known folders shown under "Other Locations".
//!
//! Favorites are the common XDG folders plus home. Mounted disks come from `sysinfo`;
//! pseudo filesystems are left out and network filesystems get their own category.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sysinfo::Disks;

use super::row::RowSpec;
use super::Mount;
use crate::file_system::Location;

/// Category of a location item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationCategory {
    Favorite,
    MainVolume,
    AttachedVolume,
    Network,
}

/// Information about a location (volume or folder).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeInfo {
    pub id: String,
    pub name: String,
    pub path: String,
    pub category: LocationCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub is_ejectable: bool,
}

/// Default volume ID for the root filesystem.
pub const DEFAULT_VOLUME_ID: &str = "root";

const NETWORK_FS_TYPES: &[&str] = &[
    "nfs", "nfs4", "cifs", "smb", "smb3", "smbfs", "sshfs", "davfs", "afs", "ceph", "glusterfs", "9p",
];

const PSEUDO_FS_TYPES: &[&str] = &[
    "proc", "sysfs", "tmpfs", "devtmpfs", "devpts", "cgroup", "cgroup2", "overlay", "squashfs", "autofs", "debugfs",
    "tracefs", "securityfs", "pstore", "bpf", "mqueue", "hugetlbfs", "configfs", "fusectl", "ramfs", "efivarfs",
];

const HIDDEN_MOUNT_PREFIXES: &[&str] = &["/proc", "/sys", "/dev", "/run", "/snap", "/boot", "/var/lib"];

/// Whether `fs_type` (as reported by the mount table) is a network filesystem.
///
/// FUSE types are matched on their subtype, so `fuse.sshfs` counts as network.
pub fn is_network_fs_type(fs_type: &str) -> bool {
    let fs_type = fs_type.to_ascii_lowercase();
    let base = fs_type.strip_prefix("fuse.").unwrap_or(&fs_type);
    NETWORK_FS_TYPES.iter().any(|t| base == *t || base.starts_with(&format!("{}2", t)))
}

/// A mount table entry, detached from `sysinfo` so listing can be tested.
#[derive(Debug, Clone)]
pub(super) struct DiskEntry {
    pub name: String,
    pub mount_point: PathBuf,
    pub fs_type: String,
    pub is_removable: bool,
}

/// Lists favorites, the root filesystem and mounted disks.
pub fn list_volumes() -> Vec<VolumeInfo> {
    let home = dirs::home_dir().unwrap_or_default();
    let disks = Disks::new_with_refreshed_list();
    let entries = disks.list().iter().map(|disk| DiskEntry {
        name: disk.name().to_string_lossy().into_owned(),
        mount_point: disk.mount_point().to_path_buf(),
        fs_type: disk.file_system().to_string_lossy().into_owned(),
        is_removable: disk.is_removable(),
    });
    let volumes = build_volumes(&home, entries);
    log::debug!("Listed {} places", volumes.len());
    volumes
}

pub(super) fn build_volumes(home: &Path, disks: impl IntoIterator<Item = DiskEntry>) -> Vec<VolumeInfo> {
    let mut locations = Vec::new();

    // Add favorites (common XDG directories)
    let favorites = [
        (home.join("Desktop"), "Desktop", "fav-desktop"),
        (home.join("Documents"), "Documents", "fav-documents"),
        (home.join("Downloads"), "Downloads", "fav-downloads"),
    ];
    for (path, name, id) in favorites {
        if path.exists() {
            locations.push(VolumeInfo {
                id: id.to_string(),
                name: name.to_string(),
                path: path.to_string_lossy().to_string(),
                category: LocationCategory::Favorite,
                icon: Some("folder-symbolic".to_string()),
                is_ejectable: false,
            });
        }
    }

    if !home.as_os_str().is_empty() {
        locations.push(VolumeInfo {
            id: "home".to_string(),
            name: "Home".to_string(),
            path: home.to_string_lossy().to_string(),
            category: LocationCategory::Favorite,
            icon: Some("user-home-symbolic".to_string()),
            is_ejectable: false,
        });
    }

    locations.push(VolumeInfo {
        id: DEFAULT_VOLUME_ID.to_string(),
        name: "Computer".to_string(),
        path: "/".to_string(),
        category: LocationCategory::MainVolume,
        icon: Some("drive-harddisk-symbolic".to_string()),
        is_ejectable: false,
    });

    for disk in disks {
        let mount_point = disk.mount_point.to_string_lossy().to_string();
        if mount_point == "/" || !is_user_visible(&disk) {
            continue;
        }
        if locations.iter().any(|v| v.path == mount_point) {
            continue;
        }

        let name = disk
            .mount_point
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| disk.name.clone());

        let (category, icon) = if is_network_fs_type(&disk.fs_type) {
            (LocationCategory::Network, "folder-remote-symbolic")
        } else {
            (LocationCategory::AttachedVolume, "drive-removable-media-symbolic")
        };

        locations.push(VolumeInfo {
            id: format!("mount-{}", mount_point),
            name,
            path: mount_point,
            category,
            icon: Some(icon.to_string()),
            is_ejectable: disk.is_removable || category == LocationCategory::Network,
        });
    }

    locations
}

fn is_user_visible(disk: &DiskEntry) -> bool {
    let fs_type = disk.fs_type.to_ascii_lowercase();
    if PSEUDO_FS_TYPES.contains(&fs_type.as_str()) {
        return false;
    }
    // Removable media lands in /run/media on most distros
    if disk.mount_point.starts_with("/run/media") {
        return true;
    }
    !HIDDEN_MOUNT_PREFIXES.iter().any(|prefix| disk.mount_point.starts_with(prefix))
}

impl VolumeInfo {
    /// Row properties for this place. Attached and network volumes are backed by a mount
    /// (so they get an eject button); folders and the root filesystem by a plain file.
    pub fn to_row_spec(&self) -> RowSpec {
        let location = Location::from_path(&self.path);
        let is_network = self.category == LocationCategory::Network;
        let (mount, file) = match self.category {
            LocationCategory::AttachedVolume | LocationCategory::Network => {
                (Some(Mount::new(self.name.clone(), location)), None)
            }
            LocationCategory::Favorite | LocationCategory::MainVolume => (None, Some(location)),
        };

        RowSpec {
            name: self.name.clone(),
            path: self.path.clone(),
            icon: self.icon.clone(),
            volume: None,
            mount,
            file,
            is_network,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disk(mount_point: &str, fs_type: &str, is_removable: bool) -> DiskEntry {
        DiskEntry {
            name: "/dev/sdx1".to_string(),
            mount_point: PathBuf::from(mount_point),
            fs_type: fs_type.to_string(),
            is_removable,
        }
    }

    #[test]
    fn detects_network_filesystems() {
        assert!(is_network_fs_type("nfs4"));
        assert!(is_network_fs_type("CIFS"));
        assert!(is_network_fs_type("fuse.sshfs"));
        assert!(is_network_fs_type("davfs2"));
        assert!(!is_network_fs_type("ext4"));
        assert!(!is_network_fs_type("fuse.portal"));
    }

    #[test]
    fn favorites_only_include_existing_folders() {
        let home = tempfile::tempdir().unwrap();
        std::fs::create_dir(home.path().join("Downloads")).unwrap();

        let volumes = build_volumes(home.path(), Vec::new());

        let ids: Vec<&str> = volumes.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["fav-downloads", "home", DEFAULT_VOLUME_ID]);
    }

    #[test]
    fn disks_are_categorized_and_pseudo_mounts_hidden() {
        let home = tempfile::tempdir().unwrap();
        let volumes = build_volumes(
            home.path(),
            vec![
                disk("/", "ext4", false),
                disk("/proc", "proc", false),
                disk("/run/user/1000", "tmpfs", false),
                disk("/run/media/me/USB", "vfat", true),
                disk("/mnt/nas", "nfs4", false),
                disk("/boot/efi", "vfat", false),
            ],
        );

        let attached: Vec<&VolumeInfo> = volumes
            .iter()
            .filter(|v| v.category != LocationCategory::Favorite && v.category != LocationCategory::MainVolume)
            .collect();
        assert_eq!(attached.len(), 2);
        assert_eq!(attached[0].name, "USB");
        assert_eq!(attached[0].category, LocationCategory::AttachedVolume);
        assert!(attached[0].is_ejectable);
        assert_eq!(attached[1].name, "nas");
        assert_eq!(attached[1].category, LocationCategory::Network);
    }

    #[test]
    fn row_spec_uses_mount_for_volumes_and_file_for_folders() {
        let usb = VolumeInfo {
            id: "mount-/media/usb".to_string(),
            name: "usb".to_string(),
            path: "/media/usb".to_string(),
            category: LocationCategory::AttachedVolume,
            icon: None,
            is_ejectable: true,
        };
        let spec = usb.to_row_spec();
        assert_eq!(spec.mount.unwrap().root, Location::from_path("/media/usb"));
        assert!(spec.file.is_none());
        assert!(!spec.is_network);

        let nas = VolumeInfo {
            category: LocationCategory::Network,
            ..usb.clone()
        };
        assert!(nas.to_row_spec().is_network);

        let home = VolumeInfo {
            category: LocationCategory::Favorite,
            ..usb
        };
        let spec = home.to_row_spec();
        assert!(spec.mount.is_none());
        assert_eq!(spec.file, Some(Location::from_path("/media/usb")));
    }

    #[test]
    fn volume_info_serializes_camel_case() {
        let info = VolumeInfo {
            id: "root".to_string(),
            name: "Computer".to_string(),
            path: "/".to_string(),
            category: LocationCategory::MainVolume,
            icon: None,
            is_ejectable: false,
        };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["isEjectable"], false);
        assert_eq!(json["category"], "main_volume");
        assert!(json.get("icon").is_none());
    }
}
