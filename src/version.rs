//! Migration versions: dot-separated groups of non-negative integers.
//!
//! Versions compare group by group after padding the shorter one with zeros, so
//! `1.2` and `1.2.0` are the same version while `1.9` sorts before `1.10`.

use crate::error::{MigrationError, Result};
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct Version {
    groups: Vec<u64>,
}

impl Version {
    /// Parse a raw version token like "1.2", "V1_2" or "001".
    ///
    /// A single leading `v`/`V` is stripped and underscores act as group separators.
    /// Leading zeros are dropped from every group.
    pub fn parse(raw: &str) -> Result<Self> {
        let invalid = || MigrationError::InvalidVersion(raw.to_string());

        let trimmed = raw
            .strip_prefix(['v', 'V'])
            .unwrap_or(raw)
            .replace('_', ".");

        if trimmed.is_empty() {
            return Err(invalid());
        }

        let groups = trimmed
            .split('.')
            .map(|group| {
                if group.is_empty() || !group.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(invalid());
                }
                group.parse::<u64>().map_err(|_| invalid())
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { groups })
    }

    /// Groups without trailing zeros; equal versions share the same significant groups
    fn significant_groups(&self) -> &[u64] {
        let len = self
            .groups
            .iter()
            .rposition(|g| *g != 0)
            .map_or(0, |pos| pos + 1);
        &self.groups[..len]
    }
}

/// Compare two optional versions; a missing version sorts before any present one
pub fn compare(a: Option<&Version>, b: Option<&Version>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => a.cmp(b),
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.groups.len().max(other.groups.len());
        (0..len)
            .map(|i| {
                let a = self.groups.get(i).copied().unwrap_or(0);
                let b = other.groups.get(i).copied().unwrap_or(0);
                a.cmp(&b)
            })
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.significant_groups().hash(state);
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self
            .groups
            .iter()
            .map(|g| g.to_string())
            .collect::<Vec<_>>()
            .join(".");
        f.write_str(&rendered)
    }
}

impl FromStr for Version {
    type Err = MigrationError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
