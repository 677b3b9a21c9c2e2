//! Session management module.
//!
//! This module keeps the per-session navigation state of the collection
//! browser and expires sessions that have been idle for too long.

pub mod navigation;
pub mod store;

pub use navigation::{CameFrom, NavigationState, Origin};
pub use store::{SessionHandle, SessionId, SessionState, SessionStore};
