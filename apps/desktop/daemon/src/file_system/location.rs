//! Location handles for paths and URIs.
//!
//! A `Location` is what the bus service, the copy engine and the places view pass
//! around. `file://` URIs are resolved to native paths up front; every other scheme
//! (`smb://`, `sftp://`, `other-locations://`, ...) is kept verbatim.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// URI of the places view itself.
pub const OTHER_LOCATIONS_URI: &str = "other-locations:///";

const FILE_SCHEME_PREFIX: &str = "file://";

/// A filesystem path, mount root, or URI on a non-native backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum Location {
    /// A path on the local filesystem.
    Native { path: PathBuf },
    /// Anything the local filesystem can't resolve directly.
    Uri { scheme: String, uri: String },
}

impl Location {
    /// Parses a URI the way the bus receives it.
    ///
    /// Strings without a scheme are treated as absolute or relative local paths.
    pub fn from_uri(uri: &str) -> Self {
        if let Some(rest) = uri.strip_prefix(FILE_SCHEME_PREFIX) {
            // file://host/path is allowed; only localhost (or empty host) maps to a path
            let path_part = match rest.find('/') {
                Some(0) => rest,
                Some(idx) if &rest[..idx] == "localhost" => &rest[idx..],
                _ => {
                    return Self::Uri {
                        scheme: "file".to_string(),
                        uri: uri.to_string(),
                    };
                }
            };
            let decoded = urlencoding::decode(path_part)
                .map(|s| s.into_owned())
                .unwrap_or_else(|_| path_part.to_string());
            return Self::Native {
                path: PathBuf::from(decoded),
            };
        }

        match parse_scheme(uri) {
            Some(scheme) => Self::Uri {
                scheme: scheme.to_ascii_lowercase(),
                uri: uri.to_string(),
            },
            None => Self::Native {
                path: PathBuf::from(uri),
            },
        }
    }

    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::Native { path: path.into() }
    }

    /// The places view's own location.
    pub fn other_locations() -> Self {
        Self::from_uri(OTHER_LOCATIONS_URI)
    }

    pub fn scheme(&self) -> &str {
        match self {
            Self::Native { .. } => "file",
            Self::Uri { scheme, .. } => scheme,
        }
    }

    /// Returns the URI form, percent-encoding native path segments.
    pub fn uri(&self) -> String {
        match self {
            Self::Native { path } => {
                let encoded: Vec<String> = path
                    .to_string_lossy()
                    .split('/')
                    .map(|segment| urlencoding::encode(segment).into_owned())
                    .collect();
                format!("{}{}", FILE_SCHEME_PREFIX, encoded.join("/"))
            }
            Self::Uri { uri, .. } => uri.clone(),
        }
    }

    pub fn local_path(&self) -> Option<&Path> {
        match self {
            Self::Native { path } => Some(path),
            Self::Uri { .. } => None,
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, Self::Native { .. })
    }

    /// Last path component, or the whole URI when there is none.
    pub fn display_name(&self) -> String {
        match self {
            Self::Native { path } => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            Self::Uri { uri, .. } => uri
                .trim_end_matches('/')
                .rsplit('/')
                .next()
                .filter(|s| !s.is_empty())
                .map(|s| urlencoding::decode(s).map(|d| d.into_owned()).unwrap_or_else(|_| s.to_string()))
                .unwrap_or_else(|| uri.clone()),
        }
    }

    pub fn is_other_locations(&self) -> bool {
        matches!(self, Self::Uri { uri, .. } if uri == OTHER_LOCATIONS_URI)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.uri())
    }
}

/// RFC 3986 scheme: ALPHA *( ALPHA / DIGIT / "+" / "-" / "." ) followed by ':'
fn parse_scheme(uri: &str) -> Option<&str> {
    let colon = uri.find(':')?;
    let scheme = &uri[..colon];
    let mut chars = scheme.chars();
    let first = chars.next()?;
    if !first.is_ascii_alphabetic() {
        return None;
    }
    if chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) {
        Some(scheme)
    } else {
        None
    }
}
