//! # Gridview Portal Library
//!
//! HTTP front end for browsing the namespace of a data grid.
//!
//! ## Overview
//!
//! - **Collection browser**: navigate collections by URL, get redirected to
//!   the detail page for data objects, re-enter the browser from other flows
//! - **Session state**: per-browser navigation state keyed by a cookie
//! - **Two-tier errors**: fatal errors abort the request, grid errors degrade
//!   the page instead
//! - **Local grid**: a directory tree stands in for a remote grid
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      PortalServer                        │
//! ├──────────────────────────────────────────────────────────┤
//! │  ┌────────────────────────────────────────────────────┐  │
//! │  │          Router (axum, session cookie)             │  │
//! │  └────────────────────────────────────────────────────┘  │
//! │  ┌──────────────┐  ┌──────────────────┐  ┌───────────┐  │
//! │  │ SessionStore │  │ CollectionCtrl   │  │ Renderer  │  │
//! │  └──────────────┘  └──────────────────┘  └───────────┘  │
//! │  ┌────────────────────────────────────────────────────┐  │
//! │  │  LocalGrid / ConfiguredUsers / ConfiguredResources │  │
//! │  └────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use portal::{Config, PortalServer};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load_default()?;
//!     let server = PortalServer::new(config)?;
//!     server.run(async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .await
//! }
//! ```
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading and defaults
//! - [`session`]: Navigation state and the session store
//! - [`controller`]: Collection browser request handling
//! - [`backend`]: Local implementations of the grid services
//! - [`render`]: Template rendering
//! - [`router`]: HTTP routes
//! - [`server`]: Server lifecycle

pub mod backend;
pub mod config;
pub mod controller;
pub mod render;
pub mod router;
pub mod server;
pub mod session;

// Re-export grid for convenience
pub use grid;

pub use config::Config;

pub use backend::{ConfiguredResources, ConfiguredUsers, LocalGrid};

pub use controller::{
    CollectionController, CollectionModel, CollectionsResponse, ControllerError, RequestContext,
    View,
};

pub use session::{CameFrom, NavigationState, Origin, SessionStore};

pub use render::ViewRenderer;

pub use router::{build_router, AppState, PortalError, RouterSettings, SESSION_COOKIE};

pub use server::{PortalServer, ServerState};
