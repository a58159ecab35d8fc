//! Permission evaluation over parsed ACL entries.

use super::entry::AclEntry;

/// Finds the entry that decides checks on `resource_path`.
///
/// Walks from the full path toward the root, one segment at a time, and returns
/// the first entry (in input order) whose path matches the candidate. Returns
/// `None` for an empty path or when no ancestor has an entry.
pub fn closest_entry<'a>(entries: &'a [AclEntry], resource_path: &str) -> Option<&'a AclEntry> {
    if resource_path.is_empty() || entries.is_empty() {
        return None;
    }

    let segments: Vec<&str> = resource_path.split('/').collect();
    for depth in (1..=segments.len()).rev() {
        let candidate = segments[..depth].join("/");
        if let Some(entry) = entries.iter().find(|e| e.matches_path(&candidate)) {
            return Some(entry);
        }
    }

    None
}

/// Returns true if the closest entry for `resource_path` grants `permission`.
///
/// Only the closest entry is consulted. If it lacks the permission the answer is
/// false, even when a less specific ancestor would have granted it.
pub fn has_permission(entries: &[AclEntry], resource_path: &str, permission: &str) -> bool {
    closest_entry(entries, resource_path).is_some_and(|entry| entry.grants(permission))
}

/// Returns true if any of `permissions` is granted. False for an empty list.
pub fn has_any_permission<S: AsRef<str>>(
    entries: &[AclEntry],
    resource_path: &str,
    permissions: &[S],
) -> bool {
    permissions
        .iter()
        .any(|p| has_permission(entries, resource_path, p.as_ref()))
}

/// Returns true if every one of `permissions` is granted. True for an empty list.
pub fn has_all_permissions<S: AsRef<str>>(
    entries: &[AclEntry],
    resource_path: &str,
    permissions: &[S],
) -> bool {
    permissions
        .iter()
        .all(|p| has_permission(entries, resource_path, p.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acl::parse_claims;

    fn entries(claims: &[&str]) -> Vec<AclEntry> {
        parse_claims(claims)
    }

    #[test]
    fn test_grant_on_descendant_of_entry() {
        let acl = entries(&["Project/INTERNAL=V,A,M", "Project/CLIENT-A=V,E,T"]);
        assert_eq!(acl.len(), 2);
        assert!(has_permission(&acl, "Project/INTERNAL/Task/17", "A"));
        assert!(has_permission(&acl, "Project/CLIENT-A", "T"));
        assert!(!has_permission(&acl, "Project/CLIENT-A/Task/3", "A"));
    }

    #[test]
    fn test_closest_match_is_authoritative() {
        let acl = entries(&["A=V", "A/B=E"]);
        assert!(!has_permission(&acl, "A/B/C", "V"));
        assert!(has_permission(&acl, "A/B/C", "E"));
        assert!(has_permission(&acl, "A/X", "V"));
    }

    #[test]
    fn test_falls_back_only_when_depth_has_no_entry() {
        let acl = entries(&["A=V"]);
        assert!(has_permission(&acl, "A/B/C/D", "V"));
        assert_eq!(closest_entry(&acl, "A/B/C/D").map(|e| e.path.as_str()), Some("A"));
    }

    #[test]
    fn test_first_duplicate_wins() {
        let acl = entries(&["A=V", "a=E"]);
        assert!(has_permission(&acl, "A", "V"));
        assert!(!has_permission(&acl, "A", "E"));
    }

    #[test]
    fn test_case_insensitive_path_and_code() {
        let acl = entries(&["Project/INTERNAL=V,A"]);
        assert_eq!(
            has_permission(&acl, "project/internal", "a"),
            has_permission(&acl, "PROJECT/INTERNAL", "A")
        );
        assert!(has_permission(&acl, "project/internal", "a"));
    }

    #[test]
    fn test_empty_path_and_empty_entries() {
        let acl = entries(&["A=V"]);
        assert!(!has_permission(&acl, "", "V"));
        assert!(!has_permission(&[], "A", "V"));
    }

    #[test]
    fn test_sibling_prefix_does_not_match() {
        let acl = entries(&["Project/INT=V"]);
        assert!(!has_permission(&acl, "Project/INTERNAL", "V"));
    }

    #[test]
    fn test_any_and_all_combinators() {
        let acl = entries(&["Project/X=V,E"]);
        assert!(has_any_permission(&acl, "Project/X", &["M", "E"]));
        assert!(!has_any_permission(&acl, "Project/X", &["M", "T"]));
        assert!(has_all_permissions(&acl, "Project/X/Task/1", &["V", "E"]));
        assert!(!has_all_permissions(&acl, "Project/X", &["V", "M"]));
    }

    #[test]
    fn test_combinators_with_empty_permission_list() {
        let acl = entries(&["Project/X=V"]);
        let none: [&str; 0] = [];
        assert!(!has_any_permission(&acl, "Project/X", &none));
        assert!(has_all_permissions(&acl, "Project/X", &none));
    }
}
