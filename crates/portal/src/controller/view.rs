//! View models handed to the template renderer.

use grid::{path, GridEntry, Resource, UiMode};
use serde::Serialize;

use crate::session::CameFrom;

/// Template of the collection browser.
pub const MANAGEMENT_VIEW: &str = "collections/collectionManagement";

/// Template of the single-entry detail page.
pub const INFO_VIEW: &str = "collections/info";

/// Route of the detail page data objects redirect to.
pub const INFO_ROUTE: &str = "/collectionInfo";

/// A template name together with the model to render it with.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct View<M> {
    /// Template name.
    pub name: &'static str,
    /// Template context.
    pub model: M,
}

/// Outcome of a collection browser request.
#[derive(Debug, Clone, PartialEq)]
pub enum CollectionsResponse {
    /// Send the browser elsewhere.
    Redirect(String),
    /// Render the collection browser.
    Render(View<CollectionModel>),
}

impl CollectionsResponse {
    /// The rendered view, if this is not a redirect.
    pub fn view(&self) -> Option<&View<CollectionModel>> {
        match self {
            CollectionsResponse::Render(view) => Some(view),
            CollectionsResponse::Redirect(_) => None,
        }
    }

    /// The redirect target, if this is a redirect.
    pub fn redirect(&self) -> Option<&str> {
        match self {
            CollectionsResponse::Redirect(location) => Some(location),
            CollectionsResponse::Render(_) => None,
        }
    }
}

/// Redirect target showing the details of a data object.
pub fn info_location(grid_path: &str) -> String {
    format!("{}?path={}", INFO_ROUTE, path::encode_component(grid_path))
}

/// Context of the collection browser template.
///
/// Fields stay unset when a grid error interrupted population; the template
/// then relies on `unexpected_error`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionModel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ui_mode: Option<UiMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoded_current_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoded_parent_path: Option<String>,
    /// Only set in user mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_path: Option<String>,
    /// Only set in user mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_path: Option<String>,
    pub resources: Vec<Resource>,
    pub entries: Vec<EntryView>,
    pub overwrite_file_option: bool,
    pub request_header: String,
    /// Only set by the legacy re-entry render.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub came_from_metadata_search: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub came_from_file_properties_search: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub came_from_bookmarks: Option<bool>,
    pub unexpected_error: bool,
}

impl CollectionModel {
    /// Empty model carrying the page banner.
    pub fn new(request_header: &str) -> Self {
        Self {
            request_header: request_header.to_string(),
            ..Self::default()
        }
    }

    /// Copy the one-shot flow markers into the model.
    pub fn set_came_from(&mut self, came_from: CameFrom) {
        self.came_from_metadata_search = Some(came_from.metadata_search);
        self.came_from_file_properties_search = Some(came_from.file_properties_search);
        self.came_from_bookmarks = Some(came_from.bookmarks);
    }
}

/// A namespace entry with the link the template needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryView {
    #[serde(flatten)]
    pub entry: GridEntry,
    pub encoded_path: String,
    pub is_collection: bool,
}

impl From<GridEntry> for EntryView {
    fn from(entry: GridEntry) -> Self {
        Self {
            encoded_path: path::encode_component(&entry.path),
            is_collection: entry.kind == grid::EntryKind::Collection,
            entry,
        }
    }
}

/// Context of the detail page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoModel {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<GridEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoded_parent_path: Option<String>,
    pub request_header: String,
    pub unexpected_error: bool,
}
