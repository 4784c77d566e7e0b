//! File system access: locations, space queries and copy operations.

pub mod location;
pub mod space;
pub mod write_operations;

pub use location::{Location, OTHER_LOCATIONS_URI};
pub use space::{SpaceInfo, format_size, get_space_info_for_path};
pub use write_operations::{FileOperations, LocalFileOperations};
