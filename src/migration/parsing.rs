use super::{MigrationDescriptor, ScriptKind};
use crate::constants::DESCRIPTION_SEPARATOR;
use crate::error::{MigrationError, Result};
use crate::version::Version;
use std::path::Path;

/// Parse a migration filename like "V1_2__add_user_index.sql" or "3__seed_roles.rs".
///
/// Returns the script kind, the version and the description with underscores turned
/// into spaces. A filename without the `__` separator is all version, no description.
pub fn parse_migration_filename(filename: &str) -> Result<(ScriptKind, Version, String)> {
    let (stem, extension) = filename
        .rsplit_once('.')
        .ok_or_else(|| MigrationError::InvalidFilename(filename.to_string()))?;

    let kind = ScriptKind::from_extension(extension)
        .ok_or_else(|| MigrationError::InvalidFilename(filename.to_string()))?;

    let (raw_version, raw_description) = stem
        .split_once(DESCRIPTION_SEPARATOR)
        .unwrap_or((stem, ""));

    let version = Version::parse(raw_version)?;
    let description = raw_description.replace('_', " ");

    Ok((kind, version, description))
}

/// Build a descriptor for a file on disk; rank defaults to 1 until execution
pub fn parse_migration_file(path: &Path) -> Result<MigrationDescriptor> {
    let script = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| MigrationError::InvalidFilename(path.display().to_string()))?
        .to_string();

    let (kind, version, description) = parse_migration_filename(&script)?;

    Ok(MigrationDescriptor {
        script,
        path: path.to_path_buf(),
        kind,
        version,
        description,
        rank: 1,
    })
}
