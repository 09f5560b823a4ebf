// Service exports
pub mod cache;
pub mod directory;

pub use cache::{CachedDirectory, CacheKey, CacheStats};
pub use directory::{DirectoryError, DirectorySearch, HttpDirectoryClient};
