//! Stand-alone implementations of the grid collaborator traits.
//!
//! These let the portal run without a remote grid: namespace queries are
//! answered from a local directory tree, users and resources from the
//! configuration file.

pub mod directory;
pub mod local;

pub use directory::{ConfiguredResources, ConfiguredUsers};
pub use local::LocalGrid;
