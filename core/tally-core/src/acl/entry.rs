//! ACL entries and claim-string parsing.

use serde::{Deserialize, Serialize};

use super::eq_ignore_case;

/// Well-known permission codes.
///
/// Codes are free-form strings; these are the ones the time-tracking API checks.
pub mod permissions {
    /// Read time entries, projects, tags.
    pub const VIEW: &str = "V";
    /// Edit existing entries.
    pub const EDIT: &str = "E";
    /// Add new entries.
    pub const ADD: &str = "A";
    /// Manage the resource (rename, archive, grant).
    pub const MANAGE: &str = "M";
    /// Track time against the resource.
    pub const TRACK: &str = "T";
}

/// A `(path, permissions)` pair parsed from one claim string.
///
/// Built fresh from the claim set on every check and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclEntry {
    pub path: String,
    pub permissions: Vec<String>,
}

impl AclEntry {
    /// Returns true if this entry's path equals `path` (case-insensitive).
    pub fn matches_path(&self, path: &str) -> bool {
        eq_ignore_case(&self.path, path)
    }

    /// Returns true if this entry carries `permission` (case-insensitive).
    pub fn grants(&self, permission: &str) -> bool {
        self.permissions
            .iter()
            .any(|p| eq_ignore_case(p, permission))
    }
}

/// Parses a single `Path=Perm1,Perm2` claim.
///
/// Returns `None` when there is no `=`, when the trimmed path is empty, or when
/// no permission survives trimming. Only the first `=` separates path from list.
pub fn parse_claim(raw: &str) -> Option<AclEntry> {
    let (path, perms) = raw.split_once('=')?;

    let path = path.trim();
    if path.is_empty() {
        return None;
    }

    let permissions: Vec<String> = perms
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect();
    if permissions.is_empty() {
        return None;
    }

    Some(AclEntry {
        path: path.to_string(),
        permissions,
    })
}

/// Parses raw claim values into entries, preserving input order.
///
/// Malformed values are skipped. Duplicate paths are all kept; evaluation
/// picks the first one.
pub fn parse_claims<I, S>(raw_values: I) -> Vec<AclEntry>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    raw_values
        .into_iter()
        .filter_map(|raw| {
            let parsed = parse_claim(raw.as_ref());
            if parsed.is_none() {
                tracing::trace!(claim = %raw.as_ref(), "Dropping malformed ACL claim");
            }
            parsed
        })
        .collect()
}
