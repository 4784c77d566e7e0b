//! Filesystem space queries and size formatting.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Space information for the filesystem containing a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpaceInfo {
    /// Total capacity in bytes.
    pub total_bytes: u64,
    /// Space available to unprivileged users, in bytes.
    pub available_bytes: u64,
    /// Used space in bytes.
    pub used_bytes: u64,
}

/// Gets space information for a path using statvfs.
#[cfg(unix)]
pub fn get_space_info_for_path(path: &Path) -> std::io::Result<SpaceInfo> {
    use std::ffi::CString;

    let path_c = CString::new(path.to_string_lossy().as_bytes())
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    // SAFETY: `stat` is a plain C struct; statvfs only writes into it on success.
    let mut stat: libc::statvfs = unsafe { std::mem::zeroed() };
    if unsafe { libc::statvfs(path_c.as_ptr(), &mut stat) } != 0 {
        return Err(std::io::Error::last_os_error());
    }

    #[allow(clippy::unnecessary_cast, reason = "statvfs field types vary across platforms")]
    let block_size = stat.f_frsize as u64;
    #[allow(clippy::unnecessary_cast, reason = "statvfs field types vary across platforms")]
    let total_bytes = (stat.f_blocks as u64) * block_size;
    #[allow(clippy::unnecessary_cast, reason = "statvfs field types vary across platforms")]
    let available_bytes = (stat.f_bavail as u64) * block_size;
    #[allow(clippy::unnecessary_cast, reason = "statvfs field types vary across platforms")]
    let used_bytes = total_bytes.saturating_sub((stat.f_bfree as u64) * block_size);

    Ok(SpaceInfo {
        total_bytes,
        available_bytes,
        used_bytes,
    })
}

#[cfg(not(unix))]
pub fn get_space_info_for_path(_path: &Path) -> std::io::Result<SpaceInfo> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "space queries need statvfs",
    ))
}

/// Formats a byte count with decimal (SI) units, one decimal place above 1000 bytes.
///
/// Matches how the desktop shell formats sizes: `999` → "999 bytes",
/// `512000` → "512.0 kB", `1048576` → "1.0 MB".
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 6] = ["kB", "MB", "GB", "TB", "PB", "EB"];
    const BASE: f64 = 1000.0;

    if bytes < 1000 {
        return if bytes == 1 {
            "1 byte".to_string()
        } else {
            format!("{} bytes", bytes)
        };
    }

    let mut value = bytes as f64 / BASE;
    let mut unit = 0;
    while value >= BASE && unit < UNITS.len() - 1 {
        value /= BASE;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_small_counts_as_bytes() {
        assert_eq!(format_size(0), "0 bytes");
        assert_eq!(format_size(1), "1 byte");
        assert_eq!(format_size(999), "999 bytes");
    }

    #[test]
    fn formats_with_decimal_units() {
        assert_eq!(format_size(1000), "1.0 kB");
        assert_eq!(format_size(512_000), "512.0 kB");
        assert_eq!(format_size(1_048_576), "1.0 MB");
        assert_eq!(format_size(4_294_967_295), "4.3 GB");
    }

    #[cfg(unix)]
    #[test]
    fn space_info_for_temp_dir() {
        let info = get_space_info_for_path(&std::env::temp_dir()).unwrap();
        assert!(info.total_bytes > 0);
        assert!(info.available_bytes <= info.total_bytes);
    }

    #[cfg(unix)]
    #[test]
    fn space_info_for_missing_path_fails() {
        assert!(get_space_info_for_path(Path::new("/definitely/not/here")).is_err());
    }
}
