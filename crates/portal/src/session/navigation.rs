//! Per-session navigation state.
//!
//! Everything the collection browser remembers between two requests of the
//! same user lives here: where the user is, the selection pending a copy,
//! move, upload or download, which flow sent the user back to the browser,
//! and the UI mode.

use std::fmt;
use std::str::FromStr;

use grid::{path, DataGridUser, UiMode};
use serde::Serialize;

/// A flow that can hand the user back to the collection browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Origin {
    /// Metadata search results.
    MetadataSearch,
    /// File-properties search results.
    FilePropertiesSearch,
    /// Bookmarks list.
    Bookmarks,
}

impl Origin {
    /// Name used in query strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::MetadataSearch => "metadataSearch",
            Origin::FilePropertiesSearch => "filePropertiesSearch",
            Origin::Bookmarks => "bookmarks",
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Origin {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "metadataSearch" => Ok(Origin::MetadataSearch),
            "filePropertiesSearch" => Ok(Origin::FilePropertiesSearch),
            "bookmarks" => Ok(Origin::Bookmarks),
            other => Err(format!("unknown origin: {}", other)),
        }
    }
}

/// One-shot markers of the flow that navigated to the browser.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CameFrom {
    /// Arrived from metadata search.
    pub metadata_search: bool,
    /// Arrived from file-properties search.
    pub file_properties_search: bool,
    /// Arrived from bookmarks.
    pub bookmarks: bool,
}

impl CameFrom {
    /// True when no flag is set.
    pub fn is_empty(&self) -> bool {
        !(self.metadata_search || self.file_properties_search || self.bookmarks)
    }
}

/// Navigation state of one user session.
///
/// `parent_path` is always a prefix of `current_path` when both are set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationState {
    current_path: Option<String>,
    parent_path: Option<String>,
    source_paths: Vec<String>,
    came_from: CameFrom,
    ui_mode: Option<UiMode>,
}

impl NavigationState {
    /// Create an empty navigation state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Path of the collection the user is looking at.
    pub fn current_path(&self) -> Option<&str> {
        self.current_path.as_deref()
    }

    /// Parent of [`current_path`](Self::current_path).
    pub fn parent_path(&self) -> Option<&str> {
        self.parent_path.as_deref()
    }

    /// Move to `path`, deriving the parent from it.
    pub fn navigate_to(&mut self, path: &str) {
        self.parent_path = Some(path::collection_parent(path));
        self.current_path = Some(path.to_string());
    }

    /// Replace the current path and derive its parent.
    ///
    /// Used by flows that only know where the user should land next; the
    /// next legacy render validates the path.
    pub fn set_current_path(&mut self, path: impl Into<String>) {
        let path = path.into();
        self.parent_path = Some(path::collection_parent(&path));
        self.current_path = Some(path);
    }

    /// Reset to `home`, which becomes its own parent.
    pub fn reset_to(&mut self, home: &str) {
        self.current_path = Some(home.to_string());
        self.parent_path = Some(home.to_string());
    }

    /// Recompute the parent by cutting the current path at its last separator.
    pub fn truncate_parent(&mut self) {
        if let Some(current) = &self.current_path {
            self.parent_path = Some(path::collection_parent(current));
        }
    }

    /// Paths pending a multi-step operation, in selection order.
    pub fn source_paths(&self) -> &[String] {
        &self.source_paths
    }

    /// Replace the pending selection.
    pub fn set_source_paths(&mut self, paths: Vec<String>) {
        self.source_paths = paths;
    }

    /// Drop the pending selection.
    pub fn clear_source_paths(&mut self) {
        self.source_paths.clear();
    }

    /// Cached UI mode, if any.
    pub fn ui_mode(&self) -> Option<UiMode> {
        self.ui_mode
    }

    /// Overwrite the cached UI mode.
    pub fn set_ui_mode(&mut self, mode: UiMode) {
        self.ui_mode = Some(mode);
    }

    /// Cached UI mode, deriving and caching it from the user's role when unset.
    pub fn resolve_ui_mode(&mut self, user: &DataGridUser) -> UiMode {
        *self.ui_mode.get_or_insert_with(|| UiMode::for_user(user))
    }

    /// Record which flow is about to hand the user back.
    pub fn mark_came_from(&mut self, origin: Origin) {
        match origin {
            Origin::MetadataSearch => self.came_from.metadata_search = true,
            Origin::FilePropertiesSearch => self.came_from.file_properties_search = true,
            Origin::Bookmarks => self.came_from.bookmarks = true,
        }
    }

    /// Current markers without consuming them.
    pub fn came_from(&self) -> CameFrom {
        self.came_from
    }

    /// Return the markers and reset them, so each is seen by one render only.
    pub fn take_came_from(&mut self) -> CameFrom {
        std::mem::take(&mut self.came_from)
    }
}
