//! HTTP routing for the collection browser.
//!
//! Every browser route follows the same steps. It resolves the principal,
//! binds the session cookie, locks the session for the rest of the request
//! and calls into [`CollectionController`]. Controller failures are mapped to
//! status codes by [`PortalError`].

use std::sync::Arc;

use axum::extract::{Query, RawQuery, State};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{debug, info_span, warn, Level};

use crate::controller::{
    CollectionController, CollectionsResponse, ControllerError, RequestContext, View,
};
use crate::render::ViewRenderer;
use crate::session::{NavigationState, Origin, SessionStore};
use grid::UiMode;

/// Name of the cookie carrying the session id.
pub const SESSION_COOKIE: &str = "GRIDVIEW_SESSION";

/// Errors turned into HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    /// No principal could be determined for the request.
    #[error("no authenticated user")]
    Unauthenticated,

    /// The controller refused or failed the request.
    #[error(transparent)]
    Controller(#[from] ControllerError),

    /// A query parameter had an unexpected value.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// A template failed to render.
    #[error("render failed: {0}")]
    Render(#[from] minijinja::Error),
}

impl PortalError {
    /// Status code reported for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            PortalError::Unauthenticated => StatusCode::UNAUTHORIZED,
            PortalError::Controller(e) => match e {
                ControllerError::UserContext(_) => StatusCode::UNAUTHORIZED,
                ControllerError::InvalidPath(_) => StatusCode::BAD_REQUEST,
                ControllerError::Forbidden(_) => StatusCode::FORBIDDEN,
                ControllerError::Grid(_) => StatusCode::BAD_GATEWAY,
            },
            PortalError::BadRequest(_) => StatusCode::BAD_REQUEST,
            PortalError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for PortalError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

/// Request-independent settings of the router.
#[derive(Debug, Clone)]
pub struct RouterSettings {
    /// Header carrying the authenticated principal.
    pub user_header: String,
    /// Principal used when the header is absent.
    pub default_user: Option<String>,
    /// Banner shown on every page.
    pub request_header: String,
}

/// Shared state of all handlers.
#[derive(Clone)]
pub struct AppState {
    controller: Arc<CollectionController>,
    sessions: Arc<SessionStore>,
    renderer: Arc<ViewRenderer>,
    settings: Arc<RouterSettings>,
}

impl AppState {
    /// Bundle the pieces the handlers need.
    pub fn new(
        controller: Arc<CollectionController>,
        sessions: Arc<SessionStore>,
        renderer: Arc<ViewRenderer>,
        settings: RouterSettings,
    ) -> Self {
        Self {
            controller,
            sessions,
            renderer,
            settings: Arc::new(settings),
        }
    }

    /// Session store backing the cookie.
    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    fn principal(&self, headers: &HeaderMap) -> Result<String, PortalError> {
        let from_header = headers
            .get(self.settings.user_header.as_str())
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        match from_header {
            Some(principal) => Ok(principal.to_string()),
            None => self
                .settings
                .default_user
                .clone()
                .ok_or(PortalError::Unauthenticated),
        }
    }

    /// Run `handler` against the caller's session.
    ///
    /// The session lock is held until the handler returns. A cookie is added
    /// to the returned jar when a new session was created.
    async fn with_session<T, F>(
        &self,
        headers: &HeaderMap,
        jar: CookieJar,
        handler: F,
    ) -> Result<(CookieJar, T), PortalError>
    where
        F: FnOnce(
            &CollectionController,
            &mut NavigationState,
            &RequestContext<'_>,
        ) -> Result<T, ControllerError>,
    {
        let principal = self.principal(headers)?;

        let cookie_id = jar.get(SESSION_COOKIE).map(|c| c.value().to_string());
        let (session_id, handle, created) = self.sessions.get_or_create(cookie_id.as_deref());
        let jar = if created {
            jar.add(
                Cookie::build((SESSION_COOKIE, session_id.clone()))
                    .path("/")
                    .http_only(true)
                    .same_site(SameSite::Lax)
                    .build(),
            )
        } else {
            jar
        };

        let mut session = handle.lock().await;
        session.touch();
        session.bind_principal(&principal);
        debug!(session_id = %session_id, principal = %principal, "Serving request");

        let ctx = RequestContext {
            principal: &principal,
            request_header: &self.settings.request_header,
        };
        let output = handler(&self.controller, &mut session.navigation, &ctx)?;
        Ok((jar, output))
    }

    fn page<M: Serialize>(&self, view: &View<M>) -> Result<Html<String>, PortalError> {
        Ok(Html(self.renderer.render(view)?))
    }

    /// HTML error page, falling back to plain text when rendering fails.
    fn error_page(&self, error: PortalError) -> Response {
        let status = error.status();
        if status.is_server_error() {
            warn!(status = %status, error = %error, "Request failed");
        } else {
            debug!(status = %status, error = %error, "Request rejected");
        }
        match self.renderer.render_error(
            status.as_u16(),
            &error.to_string(),
            &self.settings.request_header,
        ) {
            Ok(body) => (status, Html(body)).into_response(),
            Err(_) => error.into_response(),
        }
    }

    fn html_response<M: Serialize>(
        &self,
        result: Result<(CookieJar, View<M>), PortalError>,
    ) -> Response {
        match result.and_then(|(jar, view)| Ok((jar, self.page(&view)?))) {
            Ok(ok) => ok.into_response(),
            Err(e) => self.error_page(e),
        }
    }
}

/// Value of `name` in a raw query string, still percent-encoded.
///
/// Browser routes pass paths to the controller undecoded. The controller
/// applies the only form decode.
fn raw_param<'a>(query: Option<&'a str>, name: &str) -> Option<&'a str> {
    query?.split('&').find_map(|pair| match pair.split_once('=') {
        Some((key, value)) if key == name => Some(value),
        None if pair == name => Some(""),
        _ => None,
    })
}

#[derive(Debug, Deserialize)]
struct ReturnQuery {
    from: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ModeQuery {
    mode: String,
}

/// Body of the selection endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct Selection {
    /// Paths pending a multi-step operation.
    pub paths: Vec<String>,
}

/// Body of `POST /collections/current`.
#[derive(Debug, Serialize, Deserialize)]
pub struct CurrentPath {
    /// Path the next re-entry should land on.
    pub path: String,
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/collections", get(collections))
        .route("/collections/index", get(index))
        .route("/collections/return", get(return_from))
        .route("/collections/switchMode", get(switch_mode))
        .route(
            "/collections/selection",
            get(get_selection).post(set_selection),
        )
        .route("/collections/current", post(set_current))
        .route("/collectionInfo", get(collection_info))
        .route("/health", get(health))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    info_span!(
                        "http",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                })
                .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
        )
        .with_state(state)
}

async fn collections(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    RawQuery(query): RawQuery,
) -> Response {
    let path = raw_param(query.as_deref(), "path");
    let result = state
        .with_session(&headers, jar, |controller, nav, ctx| {
            controller.index_via_url(nav, ctx, path)
        })
        .await;

    match result {
        Ok((jar, CollectionsResponse::Redirect(location))) => {
            (jar, Redirect::to(&location)).into_response()
        }
        Ok((jar, CollectionsResponse::Render(view))) => state.html_response(Ok((jar, view))),
        Err(e) => state.error_page(e),
    }
}

async fn index(State(state): State<AppState>, headers: HeaderMap, jar: CookieJar) -> Response {
    let result = state
        .with_session(&headers, jar, |controller, nav, ctx| {
            controller.index(nav, ctx)
        })
        .await;
    state.html_response(result)
}

async fn return_from(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    Query(query): Query<ReturnQuery>,
) -> Response {
    let origin = match query.from.as_deref().filter(|f| !f.is_empty()) {
        Some(from) => match from.parse::<Origin>() {
            Ok(origin) => Some(origin),
            Err(e) => return state.error_page(PortalError::BadRequest(e)),
        },
        None => None,
    };

    let result = state
        .with_session(&headers, jar, |controller, nav, ctx| {
            controller.return_from(nav, ctx, origin)
        })
        .await;
    state.html_response(result)
}

async fn switch_mode(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    Query(query): Query<ModeQuery>,
) -> Response {
    let mode = match query.mode.parse::<UiMode>() {
        Ok(mode) => mode,
        Err(e) => return state.error_page(PortalError::BadRequest(e)),
    };

    let result = state
        .with_session(&headers, jar, |controller, nav, ctx| {
            controller.switch_mode(nav, ctx, mode)
        })
        .await;
    state.html_response(result)
}

async fn collection_info(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    RawQuery(query): RawQuery,
) -> Response {
    let path = raw_param(query.as_deref(), "path");
    let result = state
        .with_session(&headers, jar, |controller, _nav, ctx| {
            controller.collection_info(ctx, path)
        })
        .await;
    state.html_response(result)
}

async fn get_selection(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<(CookieJar, Json<Selection>), PortalError> {
    let (jar, paths) = state
        .with_session(&headers, jar, |_controller, nav, _ctx| {
            Ok(nav.source_paths().to_vec())
        })
        .await?;
    Ok((jar, Json(Selection { paths })))
}

async fn set_selection(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    Json(selection): Json<Selection>,
) -> Result<(CookieJar, StatusCode), PortalError> {
    let (jar, ()) = state
        .with_session(&headers, jar, |controller, nav, ctx| {
            controller.select_sources(nav, ctx, selection.paths)
        })
        .await?;
    Ok((jar, StatusCode::NO_CONTENT))
}

async fn set_current(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    Json(current): Json<CurrentPath>,
) -> Result<(CookieJar, StatusCode), PortalError> {
    let (jar, ()) = state
        .with_session(&headers, jar, |controller, nav, ctx| {
            controller.set_current_path(nav, ctx, &current.path)
        })
        .await?;
    Ok((jar, StatusCode::NO_CONTENT))
}

async fn health() -> &'static str {
    "ok"
}
