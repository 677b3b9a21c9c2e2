//! Grid backed by a local directory tree.
//!
//! The zone `/<zone>` maps onto a root directory: `/<zone>/home/alice`
//! lives at `<root>/home/alice`. Every namespace path is validated before it
//! touches the filesystem, and canonical paths must stay under the root, so
//! neither `..` segments nor symlinks can reach outside the zone.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use grid::path::{self, HOME_COLLECTION, PUBLIC_USER};
use grid::{CollectionService, DataGridUser, EntryKind, GridEntry, GridError, Result};

/// A single zone stored under a local directory.
#[derive(Debug, Clone)]
pub struct LocalGrid {
    zone: String,
    root: PathBuf,
}

impl LocalGrid {
    /// Create a grid serving `zone` from `root`.
    pub fn new(zone: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            zone: zone.into(),
            root: root.into(),
        }
    }

    /// Zone served by this grid.
    pub fn zone(&self) -> &str {
        &self.zone
    }

    /// Local directory holding the zone.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the home collections of the given users and the public one.
    pub fn provision<'a, I>(&self, usernames: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let homes = self.root.join(HOME_COLLECTION);
        fs::create_dir_all(homes.join(PUBLIC_USER))?;
        for username in usernames {
            if username.is_empty() || username.contains('/') || username == ".." {
                return Err(GridError::InvalidPath(format!("bad user name: {}", username)));
            }
            fs::create_dir_all(homes.join(username))?;
        }
        tracing::debug!(root = %self.root.display(), zone = %self.zone, "Provisioned home collections");
        Ok(())
    }

    /// Map a namespace path onto the local tree without touching the disk.
    fn to_local(&self, grid_path: &str) -> Result<PathBuf> {
        path::validate(grid_path)?;

        let mut segments = path::components(grid_path).into_iter();
        match segments.next() {
            Some(zone) if zone == self.zone => {}
            _ => {
                return Err(GridError::OutsideZone {
                    zone: self.zone.clone(),
                    path: grid_path.to_string(),
                })
            }
        }

        Ok(segments.fold(self.root.clone(), |acc, segment| acc.join(segment)))
    }

    /// Map a namespace path onto an existing local path inside the root.
    fn resolve_existing(&self, grid_path: &str) -> Result<PathBuf> {
        let local = self.to_local(grid_path)?;

        // A data object used as an intermediate segment is ENOTDIR
        let canonical = fs::canonicalize(&local).map_err(|e| match e.kind() {
            ErrorKind::NotFound | ErrorKind::NotADirectory => {
                GridError::NotFound(grid_path.to_string())
            }
            _ => GridError::Io(e),
        })?;

        let root = fs::canonicalize(&self.root).map_err(|e| {
            GridError::Communication(format!(
                "grid root {} unavailable: {}",
                self.root.display(),
                e
            ))
        })?;

        if !canonical.starts_with(&root) {
            tracing::warn!(path = %grid_path, "Path resolves outside the grid root");
            return Err(GridError::OutsideZone {
                zone: self.zone.clone(),
                path: grid_path.to_string(),
            });
        }

        Ok(canonical)
    }

    fn entry_for(&self, grid_path: &str, metadata: &fs::Metadata) -> GridEntry {
        let split = path::separate(grid_path);
        let kind = if metadata.is_dir() {
            EntryKind::Collection
        } else {
            EntryKind::DataObject
        };
        let size = if metadata.is_file() { metadata.len() } else { 0 };
        let modified = metadata
            .modified()
            .unwrap_or(SystemTime::UNIX_EPOCH)
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        GridEntry {
            path: grid_path.trim_end_matches('/').to_string(),
            name: split.child_name,
            parent: split.collection_parent,
            kind,
            size,
            modified,
        }
    }

    /// Hidden entries and symlinks leaving the root are skipped.
    fn read_collection(&self, grid_path: &str) -> Result<Vec<GridEntry>> {
        let local = self.resolve_existing(grid_path)?;
        let metadata = fs::metadata(&local)?;
        if !metadata.is_dir() {
            return Err(GridError::InvalidPath(format!(
                "not a collection: {}",
                grid_path
            )));
        }

        let mut results = Vec::new();
        for entry in fs::read_dir(&local)? {
            let entry = match entry {
                Ok(e) => e,
                Err(_) => continue,
            };

            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with('.') {
                continue;
            }

            let child = path::join(grid_path, &name);
            if self.resolve_existing(&child).is_err() {
                continue;
            }

            let metadata = match fs::metadata(entry.path()) {
                Ok(m) => m,
                Err(_) => continue,
            };
            results.push(self.entry_for(&child, &metadata));
        }

        results.sort_by(|a, b| match (a.kind, b.kind) {
            (EntryKind::Collection, EntryKind::DataObject) => std::cmp::Ordering::Less,
            (EntryKind::DataObject, EntryKind::Collection) => std::cmp::Ordering::Greater,
            _ => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        });

        Ok(results)
    }
}

impl CollectionService for LocalGrid {
    fn home_directory(&self, user: &DataGridUser) -> Result<String> {
        Ok(path::home_directory(&self.zone, &user.username))
    }

    fn public_directory(&self, _user: &DataGridUser) -> Result<String> {
        Ok(path::public_directory(&self.zone))
    }

    fn is_path_valid(&self, grid_path: &str) -> Result<bool> {
        match self.resolve_existing(grid_path) {
            Ok(_) => Ok(true),
            Err(GridError::NotFound(_))
            | Err(GridError::OutsideZone { .. })
            | Err(GridError::InvalidPath(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn is_data_object(&self, grid_path: &str) -> Result<bool> {
        let local = self.resolve_existing(grid_path)?;
        Ok(!fs::metadata(local)?.is_dir())
    }

    fn describe(&self, grid_path: &str) -> Result<GridEntry> {
        let local = self.resolve_existing(grid_path)?;
        let metadata = fs::metadata(local)?;
        Ok(self.entry_for(grid_path, &metadata))
    }

    fn list_collection(&self, grid_path: &str) -> Result<Vec<GridEntry>> {
        self.read_collection(grid_path)
    }
}
