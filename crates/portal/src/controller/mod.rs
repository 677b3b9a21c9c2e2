//! Collection browser controller and its view models.

pub mod collections;
pub mod view;

pub use collections::{CollectionController, ControllerError, RequestContext};
pub use view::{
    info_location, CollectionModel, CollectionsResponse, EntryView, InfoModel, View, INFO_ROUTE,
    INFO_VIEW, MANAGEMENT_VIEW,
};
