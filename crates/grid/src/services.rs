//! Collaborator interfaces the portal consumes.
//!
//! The portal never talks to the grid directly. Every question it asks,
//! whether a path exists, where a user's home is, which resources exist,
//! goes through one of these traits. Implementations must be thread-safe;
//! calls are synchronous and may block on grid communication.

use crate::error::Result;
use crate::model::{DataGridUser, GridEntry, Resource};

/// Namespace queries about collections and data objects.
pub trait CollectionService: Send + Sync {
    /// Home directory of the given user.
    fn home_directory(&self, user: &DataGridUser) -> Result<String>;

    /// Shared public directory of the user's zone.
    fn public_directory(&self, user: &DataGridUser) -> Result<String>;

    /// Whether the path names an existing collection or data object.
    ///
    /// Missing paths are `Ok(false)`; errors are reserved for failures to
    /// answer the question.
    fn is_path_valid(&self, path: &str) -> Result<bool>;

    /// Whether the path names a data object.
    fn is_data_object(&self, path: &str) -> Result<bool>;

    /// Describe a single entry.
    fn describe(&self, path: &str) -> Result<GridEntry>;

    /// Children of a collection, collections first, then by name.
    fn list_collection(&self, path: &str) -> Result<Vec<GridEntry>>;
}

/// Storage resource enumeration.
pub trait ResourceService: Send + Sync {
    /// All resources of the zone, in display order.
    fn find_all(&self) -> Result<Vec<Resource>>;
}

/// Lookup of the logged-in user.
pub trait UserDirectory: Send + Sync {
    /// Resolve an authenticated principal name to a grid user.
    fn logged_user(&self, principal: &str) -> Result<DataGridUser>;
}
