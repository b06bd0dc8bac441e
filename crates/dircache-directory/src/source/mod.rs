//! Directory backend abstraction.

pub mod static_directory;
pub mod traits;

pub use static_directory::StaticDirectory;
pub use traits::DirectoryQuery;
