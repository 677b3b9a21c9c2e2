//! Collection browser request handling.
//!
//! Two entry points share the session's navigation state:
//!
//! - [`CollectionController::index_via_url`] answers `GET /collections` with
//!   an optional `path` parameter.
//! - [`CollectionController::index`] re-enters the browser from other flows
//!   using whatever path the session already holds.
//!
//! Failures come in two tiers. Failing to establish who the user is, or a
//! request that cannot be parsed, is fatal and returned as
//! [`ControllerError`]. Grid errors while locating the collection are logged
//! and degrade the page: the view still renders with `unexpected_error` set.

use std::sync::Arc;

use grid::{
    path, CollectionService, DataGridUser, GridError, ResourceService, UiMode, UserDirectory,
};
use tracing::{debug, error, info, warn};

use super::view::{
    info_location, CollectionModel, CollectionsResponse, EntryView, InfoModel, View, INFO_VIEW,
    MANAGEMENT_VIEW,
};
use crate::session::{NavigationState, Origin};

/// Errors that abort a request without rendering the browser.
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    /// The logged-in user could not be established.
    #[error("could not establish user context: {0}")]
    UserContext(#[source] GridError),

    /// A path parameter could not be decoded or is not acceptable.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// The user may not perform the request.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The grid failed while answering a request that has no degraded form.
    #[error("grid error: {0}")]
    Grid(#[from] GridError),
}

/// Per-request facts the handlers need besides the session state.
#[derive(Debug, Clone, Copy)]
pub struct RequestContext<'a> {
    /// Authenticated principal name.
    pub principal: &'a str,
    /// Banner shown above the page.
    pub request_header: &'a str,
}

/// Handler for the collection browser.
pub struct CollectionController {
    collections: Arc<dyn CollectionService>,
    resources: Arc<dyn ResourceService>,
    users: Arc<dyn UserDirectory>,
}

impl CollectionController {
    /// Create a controller over the given collaborators.
    pub fn new(
        collections: Arc<dyn CollectionService>,
        resources: Arc<dyn ResourceService>,
        users: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            collections,
            resources,
            users,
        }
    }

    fn logged_user(&self, principal: &str) -> Result<DataGridUser, ControllerError> {
        self.users.logged_user(principal).map_err(|e| {
            error!(principal = %principal, error = %e, "Failed to get user and user mode info");
            ControllerError::UserContext(e)
        })
    }

    fn decode(requested: &str) -> Result<String, ControllerError> {
        path::decode_component(requested).map_err(|e| {
            warn!(path = %requested, error = %e, "Rejected undecodable path");
            ControllerError::InvalidPath(e.to_string())
        })
    }

    /// Answer `GET /collections?path=`.
    ///
    /// An empty or missing path means the user's home directory. A path
    /// naming a data object redirects to its detail page. Anything else
    /// renders the collection browser positioned at that path.
    pub fn index_via_url(
        &self,
        nav: &mut NavigationState,
        ctx: &RequestContext<'_>,
        requested: Option<&str>,
    ) -> Result<CollectionsResponse, ControllerError> {
        info!("index_via_url()");
        debug!(request_header = %ctx.request_header, "Request header");

        let user = self.logged_user(ctx.principal)?;

        let decoded = match requested.unwrap_or("") {
            "" => None,
            raw => Some(Self::decode(raw)?),
        };

        let mut model = CollectionModel::new(ctx.request_header);
        match self.locate_via_url(nav, &user, decoded, &mut model) {
            Ok(Some(location)) => {
                info!(location = %location, "Redirecting to info page");
                return Ok(CollectionsResponse::Redirect(location));
            }
            Ok(None) => {}
            Err(e) => {
                error!(error = %e, "Error establishing collection location");
                model.unexpected_error = true;
            }
        }

        info!("Displaying {}", MANAGEMENT_VIEW);
        Ok(CollectionsResponse::Render(View {
            name: MANAGEMENT_VIEW,
            model,
        }))
    }

    /// Returns the redirect target when the path is a data object.
    fn locate_via_url(
        &self,
        nav: &mut NavigationState,
        user: &DataGridUser,
        decoded: Option<String>,
        model: &mut CollectionModel,
    ) -> grid::Result<Option<String>> {
        let target = match decoded {
            Some(target) => {
                info!(path = %target, "Path provided");
                target
            }
            None => {
                info!("No path, going to home directory");
                self.collections.home_directory(user)?
            }
        };

        nav.set_source_paths(path::components(&target));
        nav.navigate_to(&target);
        let mode = nav.resolve_ui_mode(user);

        if self.collections.is_data_object(&target)? {
            return Ok(Some(info_location(&target)));
        }

        debug!(path = %target, "Is collection, continuing to collection management");
        self.populate(nav, user, mode, model)
            .map(|()| None)
    }

    /// Re-enter the collection browser at the session's current path.
    ///
    /// The pending selection is dropped. A current path that vanished
    /// upstream sends the user home; one that turned out to be a data object
    /// moves the parent up to its collection. The one-shot flow markers are
    /// reported once and reset, also when the render is degraded.
    pub fn index(
        &self,
        nav: &mut NavigationState,
        ctx: &RequestContext<'_>,
    ) -> Result<View<CollectionModel>, ControllerError> {
        info!("index()");
        nav.clear_source_paths();

        let user = self.logged_user(ctx.principal)?;
        let came_from = nav.take_came_from();

        let mut model = CollectionModel::new(ctx.request_header);
        model.set_came_from(came_from);

        let located = self.reposition(nav, &user).and_then(|()| {
            let mode = nav.resolve_ui_mode(&user);
            self.populate(nav, &user, mode, &mut model)
        });
        if let Err(e) = located {
            error!(error = %e, "Could not respond to request for collections");
            model.unexpected_error = true;
        }

        info!("Returning to {}", MANAGEMENT_VIEW);
        Ok(View {
            name: MANAGEMENT_VIEW,
            model,
        })
    }

    fn reposition(&self, nav: &mut NavigationState, user: &DataGridUser) -> grid::Result<()> {
        let current = nav.current_path().map(str::to_string);
        let valid = match current.as_deref() {
            Some(current) => self.collections.is_path_valid(current)?,
            None => false,
        };
        match current {
            Some(current) if valid => {
                let is_data_object = self.collections.is_data_object(&current)?;
                if is_data_object {
                    debug!(path = %current, "Current path is a data object, moving parent up");
                    nav.truncate_parent();
                }
            }
            stale => {
                let home = self.collections.home_directory(user)?;
                info!(
                    stale = ?stale,
                    home = %home,
                    "Current path no longer valid, resetting to home"
                );
                nav.reset_to(&home);
            }
        }
        Ok(())
    }

    /// Fill the browser model for the session's current position.
    fn populate(
        &self,
        nav: &NavigationState,
        user: &DataGridUser,
        mode: UiMode,
        model: &mut CollectionModel,
    ) -> grid::Result<()> {
        model.ui_mode = Some(mode);

        let current = nav
            .current_path()
            .ok_or_else(|| GridError::InvalidPath("no current path".to_string()))?;
        model.current_path = Some(current.to_string());
        model.encoded_current_path = Some(path::encode_component(current));
        if let Some(parent) = nav.parent_path() {
            model.parent_path = Some(parent.to_string());
            model.encoded_parent_path = Some(path::encode_component(parent));
        }
        model.overwrite_file_option = user.is_force_file_overwriting();

        if mode == UiMode::User {
            model.home_path = Some(self.collections.home_directory(user)?);
            model.public_path = Some(self.collections.public_directory(user)?);
        }

        model.resources = self.resources.find_all()?;
        model.entries = self
            .collections
            .list_collection(current)?
            .into_iter()
            .map(EntryView::from)
            .collect();
        Ok(())
    }

    /// Re-enter the browser on behalf of another flow.
    pub fn return_from(
        &self,
        nav: &mut NavigationState,
        ctx: &RequestContext<'_>,
        origin: Option<Origin>,
    ) -> Result<View<CollectionModel>, ControllerError> {
        if let Some(origin) = origin {
            debug!(origin = %origin, "Returning from flow");
            nav.mark_came_from(origin);
        }
        self.index(nav, ctx)
    }

    /// Switch the session's UI mode and re-enter the browser.
    ///
    /// Only administrators may switch to the admin view.
    pub fn switch_mode(
        &self,
        nav: &mut NavigationState,
        ctx: &RequestContext<'_>,
        mode: UiMode,
    ) -> Result<View<CollectionModel>, ControllerError> {
        let user = self.logged_user(ctx.principal)?;
        if mode == UiMode::Admin && !user.is_admin() {
            warn!(principal = %ctx.principal, "Non-admin asked for admin mode");
            return Err(ControllerError::Forbidden(format!(
                "{} is not an administrator",
                user.username
            )));
        }

        info!(principal = %ctx.principal, mode = %mode, "Switching UI mode");
        nav.set_ui_mode(mode);
        self.index(nav, ctx)
    }

    /// Replace the selection pending a copy, move, upload or download.
    ///
    /// Every path must exist; nothing changes otherwise.
    pub fn select_sources(
        &self,
        nav: &mut NavigationState,
        ctx: &RequestContext<'_>,
        paths: Vec<String>,
    ) -> Result<(), ControllerError> {
        self.logged_user(ctx.principal)?;
        for candidate in &paths {
            if !self.collections.is_path_valid(candidate)? {
                return Err(ControllerError::InvalidPath(candidate.clone()));
            }
        }
        debug!(count = paths.len(), "Updated source paths");
        nav.set_source_paths(paths);
        Ok(())
    }

    /// Set where the next re-entry should land. Validated on re-entry.
    pub fn set_current_path(
        &self,
        nav: &mut NavigationState,
        ctx: &RequestContext<'_>,
        target: &str,
    ) -> Result<(), ControllerError> {
        self.logged_user(ctx.principal)?;
        if !path::is_absolute(target) {
            return Err(ControllerError::InvalidPath(target.to_string()));
        }
        nav.set_current_path(target);
        Ok(())
    }

    /// Answer `GET /collectionInfo?path=`.
    pub fn collection_info(
        &self,
        ctx: &RequestContext<'_>,
        requested: Option<&str>,
    ) -> Result<View<InfoModel>, ControllerError> {
        self.logged_user(ctx.principal)?;

        let target = match requested.unwrap_or("") {
            "" => return Err(ControllerError::InvalidPath("path is required".to_string())),
            raw => Self::decode(raw)?,
        };

        let mut model = InfoModel {
            path: target.clone(),
            encoded_parent_path: Some(path::encode_component(&path::collection_parent(
                &target,
            ))),
            request_header: ctx.request_header.to_string(),
            ..InfoModel::default()
        };

        match self.collections.describe(&target) {
            Ok(entry) => model.entry = Some(entry),
            Err(e) => {
                error!(path = %target, error = %e, "Could not describe entry");
                model.unexpected_error = true;
            }
        }

        Ok(View {
            name: INFO_VIEW,
            model,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    use grid::{EntryKind, GridEntry, Resource, UserType};

    const ZONE: &str = "zone";

    /// In-memory grid with switchable failure.
    #[derive(Default)]
    struct FakeGrid {
        collections: HashSet<String>,
        data_objects: HashSet<String>,
        failing: Mutex<bool>,
    }

    impl FakeGrid {
        fn standard() -> Self {
            let mut grid = FakeGrid::default();
            for c in [
                "/zone",
                "/zone/home",
                "/zone/home/alice",
                "/zone/home/alice/projects",
                "/zone/home/rods",
                "/zone/home/public",
            ] {
                grid.collections.insert(c.to_string());
            }
            grid.data_objects
                .insert("/zone/home/alice/file.txt".to_string());
            grid.data_objects
                .insert("/zone/home/alice/a b.txt".to_string());
            grid
        }

        fn fail(&self, failing: bool) {
            *self.failing.lock().unwrap() = failing;
        }

        fn check(&self) -> grid::Result<()> {
            if *self.failing.lock().unwrap() {
                Err(GridError::Communication("connection reset".to_string()))
            } else {
                Ok(())
            }
        }
    }

    impl CollectionService for FakeGrid {
        fn home_directory(&self, user: &DataGridUser) -> grid::Result<String> {
            self.check()?;
            Ok(path::home_directory(ZONE, &user.username))
        }

        fn public_directory(&self, _user: &DataGridUser) -> grid::Result<String> {
            self.check()?;
            Ok(path::public_directory(ZONE))
        }

        fn is_path_valid(&self, p: &str) -> grid::Result<bool> {
            self.check()?;
            Ok(self.collections.contains(p) || self.data_objects.contains(p))
        }

        fn is_data_object(&self, p: &str) -> grid::Result<bool> {
            self.check()?;
            if self.data_objects.contains(p) {
                Ok(true)
            } else if self.collections.contains(p) {
                Ok(false)
            } else {
                Err(GridError::NotFound(p.to_string()))
            }
        }

        fn describe(&self, p: &str) -> grid::Result<GridEntry> {
            let kind = if self.is_data_object(p)? {
                EntryKind::DataObject
            } else {
                EntryKind::Collection
            };
            let split = path::separate(p);
            Ok(GridEntry {
                path: p.to_string(),
                name: split.child_name,
                parent: split.collection_parent,
                kind,
                size: 0,
                modified: 0,
            })
        }

        fn list_collection(&self, p: &str) -> grid::Result<Vec<GridEntry>> {
            self.check()?;
            let mut children: Vec<GridEntry> = self
                .collections
                .iter()
                .chain(self.data_objects.iter())
                .filter(|c| c.as_str() != p && path::collection_parent(c) == p)
                .map(|c| self.describe(c))
                .collect::<grid::Result<_>>()?;
            children.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(children)
        }
    }

    struct FakeResources;

    impl ResourceService for FakeResources {
        fn find_all(&self) -> grid::Result<Vec<Resource>> {
            Ok(vec![Resource {
                name: "demoResc".to_string(),
                resource_type: "unixfilesystem".to_string(),
                host: "localhost".to_string(),
                zone: ZONE.to_string(),
            }])
        }
    }

    struct FakeUsers(HashMap<String, DataGridUser>);

    impl FakeUsers {
        fn standard() -> Self {
            let mut users = HashMap::new();
            users.insert(
                "alice".to_string(),
                DataGridUser::new("alice", ZONE).with_force_file_overwriting(true),
            );
            users.insert(
                "rods".to_string(),
                DataGridUser::new("rods", ZONE).with_user_type(UserType::RodsAdmin),
            );
            Self(users)
        }
    }

    impl UserDirectory for FakeUsers {
        fn logged_user(&self, principal: &str) -> grid::Result<DataGridUser> {
            self.0
                .get(principal)
                .cloned()
                .ok_or_else(|| GridError::UserNotFound(principal.to_string()))
        }
    }

    fn controller() -> (CollectionController, Arc<FakeGrid>) {
        let grid = Arc::new(FakeGrid::standard());
        let controller = CollectionController::new(
            grid.clone(),
            Arc::new(FakeResources),
            Arc::new(FakeUsers::standard()),
        );
        (controller, grid)
    }

    fn ctx(principal: &str) -> RequestContext<'_> {
        RequestContext {
            principal,
            request_header: "Test Grid",
        }
    }

    fn rendered(response: CollectionsResponse) -> CollectionModel {
        match response {
            CollectionsResponse::Render(view) => {
                assert_eq!(view.name, MANAGEMENT_VIEW);
                view.model
            }
            CollectionsResponse::Redirect(location) => {
                panic!("expected render, got redirect to {}", location)
            }
        }
    }

    #[test]
    fn test_empty_path_goes_home_in_user_mode() {
        let (controller, _) = controller();
        let mut nav = NavigationState::new();

        let model = rendered(
            controller
                .index_via_url(&mut nav, &ctx("alice"), Some(""))
                .unwrap(),
        );

        assert_eq!(model.ui_mode, Some(UiMode::User));
        assert_eq!(model.current_path.as_deref(), Some("/zone/home/alice"));
        assert_eq!(
            model.encoded_current_path.as_deref(),
            Some("%2Fzone%2Fhome%2Falice")
        );
        assert_eq!(model.parent_path.as_deref(), Some("/zone/home"));
        assert_eq!(model.home_path.as_deref(), Some("/zone/home/alice"));
        assert_eq!(model.public_path.as_deref(), Some("/zone/home/public"));
        assert_eq!(model.resources.len(), 1);
        assert!(model.overwrite_file_option);
        assert_eq!(model.request_header, "Test Grid");
        assert!(!model.unexpected_error);
        assert!(model.came_from_bookmarks.is_none());
        assert_eq!(nav.ui_mode(), Some(UiMode::User));
        assert_eq!(nav.current_path(), Some("/zone/home/alice"));
    }

    #[test]
    fn test_missing_path_equals_empty_path() {
        let (controller, _) = controller();
        let mut nav = NavigationState::new();
        let model = rendered(controller.index_via_url(&mut nav, &ctx("alice"), None).unwrap());
        assert_eq!(model.current_path.as_deref(), Some("/zone/home/alice"));
    }

    #[test]
    fn test_path_is_url_decoded() {
        let (controller, _) = controller();
        let mut nav = NavigationState::new();

        let model = rendered(
            controller
                .index_via_url(&mut nav, &ctx("alice"), Some("%2Fzone%2Fhome%2Falice%2Fprojects"))
                .unwrap(),
        );

        assert_eq!(
            model.current_path.as_deref(),
            Some("/zone/home/alice/projects")
        );
        assert_eq!(model.parent_path.as_deref(), Some("/zone/home/alice"));
        assert_eq!(
            nav.source_paths(),
            &["zone", "home", "alice", "projects"]
        );
        let names: Vec<&str> = model.entries.iter().map(|e| e.entry.name.as_str()).collect();
        assert!(names.is_empty());
    }

    #[test]
    fn test_entries_listed() {
        let (controller, _) = controller();
        let mut nav = NavigationState::new();
        let model = rendered(controller.index_via_url(&mut nav, &ctx("alice"), None).unwrap());
        let names: Vec<&str> = model.entries.iter().map(|e| e.entry.name.as_str()).collect();
        assert_eq!(names, vec!["a b.txt", "file.txt", "projects"]);
    }

    #[test]
    fn test_data_object_redirects() {
        let (controller, _) = controller();
        let mut nav = NavigationState::new();

        let response = controller
            .index_via_url(&mut nav, &ctx("alice"), Some("/zone/home/alice/file.txt"))
            .unwrap();

        assert_eq!(
            response.redirect(),
            Some("/collectionInfo?path=%2Fzone%2Fhome%2Falice%2Ffile.txt")
        );
        // The session still remembers where the user went
        assert_eq!(nav.current_path(), Some("/zone/home/alice/file.txt"));
    }

    #[test]
    fn test_data_object_with_space_redirects_reencoded() {
        let (controller, _) = controller();
        let mut nav = NavigationState::new();

        let response = controller
            .index_via_url(&mut nav, &ctx("alice"), Some("/zone/home/alice/a+b.txt"))
            .unwrap();
        assert_eq!(
            response.redirect(),
            Some("/collectionInfo?path=%2Fzone%2Fhome%2Falice%2Fa%20b.txt")
        );
    }

    #[test]
    fn test_admin_gets_admin_mode_without_shortcuts() {
        let (controller, _) = controller();
        let mut nav = NavigationState::new();

        let model = rendered(controller.index_via_url(&mut nav, &ctx("rods"), None).unwrap());

        assert_eq!(model.ui_mode, Some(UiMode::Admin));
        assert!(model.home_path.is_none());
        assert!(model.public_path.is_none());
        assert!(!model.overwrite_file_option);
    }

    #[test]
    fn test_cached_mode_is_reused() {
        let (controller, _) = controller();
        let mut nav = NavigationState::new();
        nav.set_ui_mode(UiMode::User);

        let model = rendered(controller.index_via_url(&mut nav, &ctx("rods"), None).unwrap());

        assert_eq!(model.ui_mode, Some(UiMode::User));
        assert_eq!(model.home_path.as_deref(), Some("/zone/home/rods"));
    }

    #[test]
    fn test_grid_failure_degrades_render() {
        let (controller, grid) = controller();
        let mut nav = NavigationState::new();
        grid.fail(true);

        let model = rendered(controller.index_via_url(&mut nav, &ctx("alice"), None).unwrap());

        assert!(model.unexpected_error);
        assert!(model.current_path.is_none());
        assert_eq!(model.request_header, "Test Grid");
    }

    #[test]
    fn test_missing_path_degrades_render() {
        let (controller, _) = controller();
        let mut nav = NavigationState::new();

        let model = rendered(
            controller
                .index_via_url(&mut nav, &ctx("alice"), Some("/zone/home/alice/gone"))
                .unwrap(),
        );
        assert!(model.unexpected_error);
    }

    #[test]
    fn test_unknown_user_is_fatal() {
        let (controller, _) = controller();
        let mut nav = NavigationState::new();

        let result = controller.index_via_url(&mut nav, &ctx("mallory"), None);
        assert!(matches!(result, Err(ControllerError::UserContext(_))));
        assert!(nav.current_path().is_none());
    }

    #[test]
    fn test_malformed_encoding_is_fatal() {
        let (controller, _) = controller();
        let mut nav = NavigationState::new();

        let result = controller.index_via_url(&mut nav, &ctx("alice"), Some("/zone/%zz"));
        assert!(matches!(result, Err(ControllerError::InvalidPath(_))));
    }

    #[test]
    fn test_index_reuses_current_path_and_clears_state() {
        let (controller, _) = controller();
        let mut nav = NavigationState::new();
        nav.navigate_to("/zone/home/alice/projects");
        nav.set_source_paths(vec!["/zone/home/alice/file.txt".to_string()]);
        nav.mark_came_from(Origin::MetadataSearch);
        nav.mark_came_from(Origin::Bookmarks);

        let view = controller.index(&mut nav, &ctx("alice")).unwrap();
        let model = view.model;

        assert_eq!(view.name, MANAGEMENT_VIEW);
        assert_eq!(
            model.current_path.as_deref(),
            Some("/zone/home/alice/projects")
        );
        assert_eq!(model.came_from_metadata_search, Some(true));
        assert_eq!(model.came_from_bookmarks, Some(true));
        assert_eq!(model.came_from_file_properties_search, Some(false));
        assert!(nav.source_paths().is_empty());
        assert!(nav.came_from().is_empty());

        // Flags are seen by one render only
        let again = controller.index(&mut nav, &ctx("alice")).unwrap().model;
        assert_eq!(again.came_from_metadata_search, Some(false));
        assert_eq!(again.came_from_bookmarks, Some(false));
    }

    #[test]
    fn test_index_resets_invalid_path_to_home() {
        let (controller, _) = controller();
        let mut nav = NavigationState::new();
        nav.navigate_to("/zone/home/alice/deleted");

        let model = controller.index(&mut nav, &ctx("alice")).unwrap().model;

        assert_eq!(model.current_path.as_deref(), Some("/zone/home/alice"));
        assert_eq!(model.parent_path.as_deref(), Some("/zone/home/alice"));
        assert_eq!(nav.parent_path(), Some("/zone/home/alice"));
    }

    #[test]
    fn test_index_without_current_path_goes_home() {
        let (controller, _) = controller();
        let mut nav = NavigationState::new();
        let model = controller.index(&mut nav, &ctx("alice")).unwrap().model;
        assert_eq!(model.current_path.as_deref(), Some("/zone/home/alice"));
        assert!(!model.unexpected_error);
    }

    #[test]
    fn test_index_stale_data_object_moves_parent() {
        let (controller, _) = controller();
        let mut nav = NavigationState::new();
        // Left behind by a redirect to the info page
        nav.navigate_to("/zone/home/alice/file.txt");

        let model = controller.index(&mut nav, &ctx("alice")).unwrap().model;

        assert_eq!(model.parent_path.as_deref(), Some("/zone/home/alice"));
        assert!(nav
            .current_path()
            .unwrap()
            .starts_with(nav.parent_path().unwrap()));
    }

    #[test]
    fn test_index_degraded_still_resets_flags() {
        let (controller, grid) = controller();
        let mut nav = NavigationState::new();
        nav.navigate_to("/zone/home/alice");
        nav.set_source_paths(vec!["/zone/home/alice/file.txt".to_string()]);
        nav.mark_came_from(Origin::FilePropertiesSearch);
        grid.fail(true);

        let view = controller.index(&mut nav, &ctx("alice")).unwrap();

        assert_eq!(view.name, MANAGEMENT_VIEW);
        assert!(view.model.unexpected_error);
        assert_eq!(view.model.came_from_file_properties_search, Some(true));
        assert!(nav.source_paths().is_empty());
        assert!(nav.came_from().is_empty());
    }

    #[test]
    fn test_index_unknown_user_keeps_flags() {
        let (controller, _) = controller();
        let mut nav = NavigationState::new();
        nav.mark_came_from(Origin::Bookmarks);

        let result = controller.index(&mut nav, &ctx("mallory"));
        assert!(matches!(result, Err(ControllerError::UserContext(_))));
        assert!(nav.came_from().bookmarks);
    }

    #[test]
    fn test_return_from_sets_flag_for_one_render() {
        let (controller, _) = controller();
        let mut nav = NavigationState::new();

        let model = controller
            .return_from(&mut nav, &ctx("alice"), Some(Origin::FilePropertiesSearch))
            .unwrap()
            .model;
        assert_eq!(model.came_from_file_properties_search, Some(true));
        assert!(nav.came_from().is_empty());
    }

    #[test]
    fn test_switch_mode() {
        let (controller, _) = controller();
        let mut nav = NavigationState::new();

        let model = controller
            .switch_mode(&mut nav, &ctx("rods"), UiMode::User)
            .unwrap()
            .model;
        assert_eq!(model.ui_mode, Some(UiMode::User));
        assert_eq!(model.home_path.as_deref(), Some("/zone/home/rods"));

        let model = controller
            .switch_mode(&mut nav, &ctx("rods"), UiMode::Admin)
            .unwrap()
            .model;
        assert_eq!(model.ui_mode, Some(UiMode::Admin));
    }

    #[test]
    fn test_switch_mode_forbidden_for_users() {
        let (controller, _) = controller();
        let mut nav = NavigationState::new();

        let result = controller.switch_mode(&mut nav, &ctx("alice"), UiMode::Admin);
        assert!(matches!(result, Err(ControllerError::Forbidden(_))));
        assert!(nav.ui_mode().is_none());
    }

    #[test]
    fn test_select_sources() {
        let (controller, _) = controller();
        let mut nav = NavigationState::new();

        controller
            .select_sources(
                &mut nav,
                &ctx("alice"),
                vec![
                    "/zone/home/alice/file.txt".to_string(),
                    "/zone/home/alice/projects".to_string(),
                ],
            )
            .unwrap();
        assert_eq!(nav.source_paths().len(), 2);

        let result = controller.select_sources(
            &mut nav,
            &ctx("alice"),
            vec!["/zone/home/alice/missing".to_string()],
        );
        assert!(matches!(result, Err(ControllerError::InvalidPath(_))));
        assert_eq!(nav.source_paths().len(), 2);
    }

    #[test]
    fn test_select_sources_grid_failure() {
        let (controller, grid) = controller();
        let mut nav = NavigationState::new();
        grid.fail(true);

        let result = controller.select_sources(
            &mut nav,
            &ctx("alice"),
            vec!["/zone/home/alice/file.txt".to_string()],
        );
        assert!(matches!(result, Err(ControllerError::Grid(_))));
    }

    #[test]
    fn test_set_current_path() {
        let (controller, _) = controller();
        let mut nav = NavigationState::new();

        controller
            .set_current_path(&mut nav, &ctx("alice"), "/zone/home/public")
            .unwrap();
        assert_eq!(nav.current_path(), Some("/zone/home/public"));
        assert_eq!(nav.parent_path(), Some("/zone/home"));

        let result = controller.set_current_path(&mut nav, &ctx("alice"), "relative");
        assert!(matches!(result, Err(ControllerError::InvalidPath(_))));
    }

    #[test]
    fn test_collection_info() {
        let (controller, _) = controller();

        let view = controller
            .collection_info(&ctx("alice"), Some("%2Fzone%2Fhome%2Falice%2Ffile.txt"))
            .unwrap();
        assert_eq!(view.name, INFO_VIEW);
        assert_eq!(view.model.path, "/zone/home/alice/file.txt");
        assert_eq!(
            view.model.encoded_parent_path.as_deref(),
            Some("%2Fzone%2Fhome%2Falice")
        );
        let entry = view.model.entry.unwrap();
        assert_eq!(entry.kind, EntryKind::DataObject);
        assert!(!view.model.unexpected_error);
    }

    #[test]
    fn test_collection_info_missing_entry_degrades() {
        let (controller, _) = controller();
        let view = controller
            .collection_info(&ctx("alice"), Some("/zone/home/alice/gone"))
            .unwrap();
        assert!(view.model.unexpected_error);
        assert!(view.model.entry.is_none());
    }

    #[test]
    fn test_collection_info_requires_path() {
        let (controller, _) = controller();
        let result = controller.collection_info(&ctx("alice"), None);
        assert!(matches!(result, Err(ControllerError::InvalidPath(_))));
    }
}
