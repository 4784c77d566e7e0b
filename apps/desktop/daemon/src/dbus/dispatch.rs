//! `CopyURIs` argument handling, independent of the bus transport.

use crate::file_system::{FileOperations, Location};

/// What a `CopyURIs` call resulted in. The bus reply is empty either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyDispatch {
    /// Handed to the copy engine with this many sources.
    Started { sources: usize },
    /// Missing sources or destination; nothing happened.
    Discarded,
}

/// Resolves the URIs and hands them to the copy engine.
///
/// An empty source list or an empty destination string is discarded silently,
/// matching what the caller sees for a started copy.
pub fn trigger_copy_file_operation(
    operations: &dyn FileOperations,
    uris: &[String],
    destination: &str,
) -> CopyDispatch {
    if uris.is_empty() || destination.is_empty() {
        log::debug!("Called 'CopyURIs' with empty arguments, discarding");
        return CopyDispatch::Discarded;
    }

    let destination = Location::from_uri(destination);
    let sources: Vec<Location> = uris.iter().map(|uri| Location::from_uri(uri)).collect();
    let count = sources.len();

    log::debug!("Called CopyURIs with dest {} and first uri {}", destination, uris[0]);
    operations.copy(sources, destination);

    CopyDispatch::Started { sources: count }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingOperations {
        calls: Mutex<Vec<(Vec<Location>, Location)>>,
    }

    impl FileOperations for RecordingOperations {
        fn copy(&self, sources: Vec<Location>, destination: Location) {
            self.calls.lock().unwrap().push((sources, destination));
        }
    }

    #[test]
    fn empty_source_list_never_reaches_collaborator() {
        let ops = RecordingOperations::default();
        let result = trigger_copy_file_operation(&ops, &[], "file:///tmp");
        assert_eq!(result, CopyDispatch::Discarded);
        assert!(ops.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn missing_destination_is_discarded() {
        let ops = RecordingOperations::default();
        let result = trigger_copy_file_operation(&ops, &["file:///tmp/a".to_string()], "");
        assert_eq!(result, CopyDispatch::Discarded);
        assert!(ops.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn every_uri_becomes_one_source_in_order() {
        let ops = RecordingOperations::default();
        let uris = vec![
            "file:///tmp/a".to_string(),
            "file:///tmp/b".to_string(),
            "sftp://host/c".to_string(),
        ];

        let result = trigger_copy_file_operation(&ops, &uris, "file:///home/user/Downloads");

        assert_eq!(result, CopyDispatch::Started { sources: 3 });
        let calls = ops.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let (sources, destination) = &calls[0];
        let got: Vec<String> = sources.iter().map(Location::uri).collect();
        assert_eq!(got, uris);
        assert_eq!(destination, &Location::from_path("/home/user/Downloads"));
    }
}
