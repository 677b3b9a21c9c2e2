//! # Gridview Grid Library
//!
//! Vocabulary shared by every layer of Gridview: namespace paths, the
//! entities the grid reports (users, resources, entries) and the
//! collaborator traits through which the portal asks the grid questions.
//!
//! ## Overview
//!
//! - **Paths**: splitting, joining and validating absolute namespace paths,
//!   plus the URL codec used when a path travels as a query parameter
//! - **Model**: `DataGridUser`, `UiMode`, `Resource`, `GridEntry`
//! - **Services**: `CollectionService`, `ResourceService`, `UserDirectory`
//!
//! ## Example Usage
//!
//! ```rust
//! use grid::path;
//!
//! let split = path::separate("/tempZone/home/alice/report.csv");
//! assert_eq!(split.collection_parent, "/tempZone/home/alice");
//! assert_eq!(split.child_name, "report.csv");
//!
//! let encoded = path::encode_component("/tempZone/home/alice");
//! assert_eq!(encoded, "%2FtempZone%2Fhome%2Falice");
//! assert_eq!(path::decode_component(&encoded).unwrap(), "/tempZone/home/alice");
//! ```
//!
//! ## Modules
//!
//! - [`path`]: Namespace path utilities
//! - [`model`]: Domain entities
//! - [`services`]: Collaborator traits
//! - [`error`]: Error types

pub mod error;
pub mod model;
pub mod path;
pub mod services;

pub use error::{GridError, Result};
pub use model::{DataGridUser, EntryKind, GridEntry, Resource, UiMode, UserType};
pub use path::CollectionAndPath;
pub use services::{CollectionService, ResourceService, UserDirectory};
