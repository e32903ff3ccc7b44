use super::MigrationDescriptor;
use super::parsing::parse_migration_file;
use crate::error::{MigrationError, Result};
use crate::version::Version;
use itertools::Itertools;
use serde::Serialize;
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Which discovered scripts should be kept
#[derive(Debug, Clone, Default)]
pub struct DiscoveryFilter {
    /// Keep only scripts at exactly this version
    pub target_version: Option<Version>,
    /// Drop scripts below this version
    pub base_version: Option<Version>,
    /// Script basenames already applied at `base_version`
    pub exclude_at_base: HashSet<String>,
}

impl DiscoveryFilter {
    pub fn includes(&self, descriptor: &MigrationDescriptor) -> bool {
        if let Some(target) = &self.target_version
            && descriptor.version != *target
        {
            return false;
        }

        match &self.base_version {
            Some(base) if descriptor.version < *base => false,
            Some(base) if descriptor.version == *base => {
                !self.exclude_at_base.contains(&descriptor.script)
            }
            _ => true,
        }
    }
}

/// All discovered scripts sharing one version, in discovery order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionGroup {
    pub version: Version,
    pub migrations: Vec<MigrationDescriptor>,
}

fn access_error(path: &Path, source: std::io::Error) -> MigrationError {
    match source.kind() {
        ErrorKind::NotFound => MigrationError::NotFound {
            path: path.to_path_buf(),
            source,
        },
        _ => MigrationError::InsufficientAccess {
            path: path.to_path_buf(),
            source,
        },
    }
}

/// Find migration scripts in a directory, filter them and group them by version.
///
/// Groups are sorted by ascending version. Entries are visited in file name order, and
/// scripts inside a group keep that order. Files that don't parse as migrations are
/// skipped; only directory-level failures are returned as errors.
pub fn discover_migrations(
    directory: &Path,
    filter: &DiscoveryFilter,
) -> Result<Vec<VersionGroup>> {
    let metadata = std::fs::metadata(directory).map_err(|e| access_error(directory, e))?;
    if !metadata.is_dir() {
        return Err(MigrationError::NotADirectory(directory.to_path_buf()));
    }

    let root = std::fs::canonicalize(directory).map_err(|e| access_error(directory, e))?;

    let mut entries = std::fs::read_dir(&root)
        .map_err(|e| access_error(&root, e))?
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(|e| access_error(&root, e))?;
    entries.sort_by_key(|entry| entry.file_name());

    let mut descriptors = Vec::new();
    for entry in entries {
        let path: PathBuf = entry.path();

        if path.is_dir() {
            debug!("Skipping directory {}", path.display());
            continue;
        }

        let descriptor = match parse_migration_file(&path) {
            Ok(descriptor) => descriptor,
            Err(e) => {
                debug!("Skipping {}: {}", path.display(), e);
                continue;
            }
        };

        if filter.includes(&descriptor) {
            descriptors.push(descriptor);
        } else {
            debug!(
                "Filtered out {} (version {})",
                descriptor.script, descriptor.version
            );
        }
    }

    // Stable sort keeps file name order inside each version
    descriptors.sort_by(|a, b| a.version.cmp(&b.version));

    let groups = descriptors
        .into_iter()
        .chunk_by(|d| d.version.clone())
        .into_iter()
        .map(|(version, migrations)| VersionGroup {
            version,
            migrations: migrations.collect(),
        })
        .collect();

    Ok(groups)
}
