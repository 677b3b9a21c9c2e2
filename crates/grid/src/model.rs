//! Domain entities shared between the grid collaborators and the portal.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ============================================================================
// Users
// ============================================================================

/// Role of a grid account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    /// Zone administrator.
    RodsAdmin,
    /// Regular user.
    #[default]
    RodsUser,
    /// User allowed to manage groups but not the zone.
    GroupAdmin,
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UserType::RodsAdmin => "rodsadmin",
            UserType::RodsUser => "rodsuser",
            UserType::GroupAdmin => "groupadmin",
        };
        f.write_str(name)
    }
}

/// The logged-in grid user as seen by the portal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataGridUser {
    /// Account name.
    pub username: String,
    /// Zone the account belongs to.
    pub zone: String,
    /// Account role.
    #[serde(default)]
    pub user_type: UserType,
    /// Whether uploads always overwrite existing data objects.
    #[serde(default)]
    pub force_file_overwriting: bool,
}

impl DataGridUser {
    /// Create a regular user in the given zone.
    pub fn new(username: impl Into<String>, zone: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            zone: zone.into(),
            user_type: UserType::RodsUser,
            force_file_overwriting: false,
        }
    }

    /// Set the account role.
    pub fn with_user_type(mut self, user_type: UserType) -> Self {
        self.user_type = user_type;
        self
    }

    /// Set the overwrite preference.
    pub fn with_force_file_overwriting(mut self, force: bool) -> Self {
        self.force_file_overwriting = force;
        self
    }

    /// Zone administrators are the only admins.
    pub fn is_admin(&self) -> bool {
        self.user_type == UserType::RodsAdmin
    }

    /// Whether uploads for this user overwrite without asking.
    pub fn is_force_file_overwriting(&self) -> bool {
        self.force_file_overwriting
    }
}

// ============================================================================
// UI mode
// ============================================================================

/// Which variant of the collection browser a session sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UiMode {
    /// Administrator view.
    Admin,
    /// User view with home/public shortcuts.
    User,
}

impl UiMode {
    /// Mode a user lands in when the session has none yet.
    pub fn for_user(user: &DataGridUser) -> Self {
        if user.is_admin() {
            UiMode::Admin
        } else {
            UiMode::User
        }
    }

    /// Lower-case name as used in URLs and templates.
    pub fn as_str(&self) -> &'static str {
        match self {
            UiMode::Admin => "admin",
            UiMode::User => "user",
        }
    }
}

impl fmt::Display for UiMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UiMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "admin" => Ok(UiMode::Admin),
            "user" => Ok(UiMode::User),
            other => Err(format!("unknown ui mode: {}", other)),
        }
    }
}

// ============================================================================
// Resources and entries
// ============================================================================

/// A storage resource offered as an upload target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// Resource name.
    pub name: String,
    /// Resource type, e.g. `unixfilesystem` or `replication`.
    #[serde(default)]
    pub resource_type: String,
    /// Host serving the resource.
    #[serde(default)]
    pub host: String,
    /// Zone the resource belongs to.
    #[serde(default)]
    pub zone: String,
}

/// Kind of a namespace entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Directory-like container.
    Collection,
    /// File-like leaf.
    DataObject,
}

/// Summary of a single namespace entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridEntry {
    /// Absolute path.
    pub path: String,
    /// Last path segment.
    pub name: String,
    /// Parent collection.
    pub parent: String,
    /// Entry kind.
    pub kind: EntryKind,
    /// Size in bytes (0 for collections).
    pub size: u64,
    /// Last modification, seconds since the Unix epoch.
    pub modified: u64,
}
