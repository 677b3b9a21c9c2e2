//! User and resource directories backed by the configuration file.

use std::collections::HashMap;

use grid::{DataGridUser, GridError, Resource, ResourceService, Result, UserDirectory};

use crate::config::{ResourceEntry, UserEntry};

/// Grid accounts declared in the configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredUsers {
    users: HashMap<String, DataGridUser>,
}

impl ConfiguredUsers {
    /// Build the directory for `zone` from configured accounts.
    pub fn new(zone: &str, entries: &[UserEntry]) -> Self {
        let users = entries
            .iter()
            .map(|entry| {
                let user = DataGridUser::new(entry.username.clone(), zone)
                    .with_user_type(entry.user_type)
                    .with_force_file_overwriting(entry.force_file_overwriting);
                (entry.username.clone(), user)
            })
            .collect();
        Self { users }
    }

    /// Account names, unordered.
    pub fn usernames(&self) -> impl Iterator<Item = &str> {
        self.users.keys().map(String::as_str)
    }

    /// Number of accounts.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Whether no account is configured.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl UserDirectory for ConfiguredUsers {
    fn logged_user(&self, principal: &str) -> Result<DataGridUser> {
        self.users
            .get(principal)
            .cloned()
            .ok_or_else(|| GridError::UserNotFound(principal.to_string()))
    }
}

/// Storage resources declared in the configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredResources {
    resources: Vec<Resource>,
}

impl ConfiguredResources {
    /// Build the resource list for `zone` from configured entries.
    pub fn new(zone: &str, entries: &[ResourceEntry]) -> Self {
        let resources = entries
            .iter()
            .map(|entry| Resource {
                name: entry.name.clone(),
                resource_type: entry.resource_type.clone(),
                host: entry.host.clone(),
                zone: zone.to_string(),
            })
            .collect();
        Self { resources }
    }
}

impl ResourceService for ConfiguredResources {
    fn find_all(&self) -> Result<Vec<Resource>> {
        Ok(self.resources.clone())
    }
}
