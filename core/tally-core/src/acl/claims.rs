//! Claim sources and the caller-facing [`AccessControl`] facade.

use serde::{Deserialize, Serialize};

use super::check;
use super::entry::{parse_claims, AclEntry};

/// Claim type carrying ACL strings.
pub const ACL_CLAIM_TYPE: &str = "acl";

/// Anything that can list a principal's claims by type.
///
/// The authentication layer implements this over whatever principal
/// representation it has; [`Claims`] is the plain list version.
pub trait ClaimSource {
    /// Returns every claim value of `claim_type`, in the order they were issued.
    fn all_claims_of_type(&self, claim_type: &str) -> Vec<String>;
}

impl<T: ClaimSource + ?Sized> ClaimSource for &T {
    fn all_claims_of_type(&self, claim_type: &str) -> Vec<String> {
        (**self).all_claims_of_type(claim_type)
    }
}

/// A flat list of `(type, value)` claims.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    claims: Vec<(String, String)>,
}

impl Claims {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a claim list holding only ACL claims.
    pub fn from_acl<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut claims = Self::new();
        for value in values {
            claims.push(ACL_CLAIM_TYPE, value);
        }
        claims
    }

    pub fn push(&mut self, claim_type: impl Into<String>, value: impl Into<String>) {
        self.claims.push((claim_type.into(), value.into()));
    }

    pub fn len(&self) -> usize {
        self.claims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }
}

impl ClaimSource for Claims {
    fn all_claims_of_type(&self, claim_type: &str) -> Vec<String> {
        self.claims
            .iter()
            .filter(|(t, _)| t.eq_ignore_ascii_case(claim_type))
            .map(|(_, v)| v.clone())
            .collect()
    }
}

/// Answers "does this principal have permission P on resource R".
///
/// Claims are re-read and re-parsed on every check, so a source whose claim set
/// changes is always evaluated against its current contents.
#[derive(Debug, Clone)]
pub struct AccessControl<S> {
    source: S,
}

impl<S: ClaimSource> AccessControl<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Parses the current ACL claims.
    pub fn entries(&self) -> Vec<AclEntry> {
        parse_claims(self.source.all_claims_of_type(ACL_CLAIM_TYPE))
    }

    pub fn has_permission(&self, resource_path: &str, permission: &str) -> bool {
        let granted = check::has_permission(&self.entries(), resource_path, permission);
        tracing::debug!(
            resource = %resource_path,
            permission = %permission,
            granted,
            "ACL check"
        );
        granted
    }

    pub fn has_any_permission<P: AsRef<str>>(&self, resource_path: &str, permissions: &[P]) -> bool {
        check::has_any_permission(&self.entries(), resource_path, permissions)
    }

    pub fn has_all_permissions<P: AsRef<str>>(&self, resource_path: &str, permissions: &[P]) -> bool {
        check::has_all_permissions(&self.entries(), resource_path, permissions)
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acl::permissions::{ADD, EDIT, TRACK, VIEW};
    use std::cell::RefCell;

    #[test]
    fn test_claims_filter_by_type() {
        let mut claims = Claims::new();
        claims.push("acl", "Project/A=V");
        claims.push("email", "someone@example.com");
        claims.push("ACL", "Project/B=E");

        assert_eq!(
            claims.all_claims_of_type(ACL_CLAIM_TYPE),
            vec!["Project/A=V".to_string(), "Project/B=E".to_string()]
        );
        assert_eq!(claims.all_claims_of_type("role"), Vec::<String>::new());
    }

    #[test]
    fn test_access_control_over_claims() {
        let acl = AccessControl::new(Claims::from_acl([
            "Project/INTERNAL=V,A,M",
            "Project/CLIENT-A=V,E,T",
        ]));

        assert_eq!(acl.entries().len(), 2);
        assert!(acl.has_permission("Project/INTERNAL/Task/17", ADD));
        assert!(!acl.has_permission("Project/INTERNAL/Task/17", TRACK));
        assert!(acl.has_any_permission("Project/CLIENT-A", &[ADD, EDIT]));
        assert!(acl.has_all_permissions("Project/CLIENT-A", &[VIEW, EDIT, TRACK]));
        assert!(!acl.has_permission("Project/OTHER", VIEW));
    }

    #[test]
    fn test_no_claims_denies_everything() {
        let acl = AccessControl::new(Claims::new());
        assert!(!acl.has_permission("Project/INTERNAL", VIEW));
    }

    struct RotatingSource {
        claims: RefCell<Vec<String>>,
    }

    impl ClaimSource for RotatingSource {
        fn all_claims_of_type(&self, _claim_type: &str) -> Vec<String> {
            self.claims.borrow().clone()
        }
    }

    #[test]
    fn test_checks_see_current_claims() {
        let source = RotatingSource {
            claims: RefCell::new(vec!["Project/A=V".to_string()]),
        };
        let acl = AccessControl::new(&source);
        assert!(acl.has_permission("Project/A", VIEW));

        source.claims.replace(vec!["Project/A=E".to_string()]);
        assert!(!acl.has_permission("Project/A", VIEW));
        assert!(acl.has_permission("Project/A", EDIT));
    }
}
