//! Hierarchical access control over `/`-delimited resource paths.
//!
//! A principal carries ACL claims of the form `Path=Perm1,Perm2`:
//!
//! ```text
//! Project/INTERNAL=V,A,M
//! Project/CLIENT-A=V,E,T
//! ```
//!
//! # Evaluation: Most Specific Path Wins
//!
//! A check for permission `P` on `Project/INTERNAL/Task/17` looks for an entry at
//! `Project/INTERNAL/Task/17`, then `Project/INTERNAL/Task`, then `Project/INTERNAL`,
//! then `Project`. The first depth that has *any* entry decides the outcome.
//! Its permissions are authoritative, so a grandparent grant does not leak through
//! a closer entry that lacks the permission:
//!
//! ```text
//! A=V, A/B=E   →   has_permission("A/B/C", "V") == false
//! ```
//!
//! This is deny-by-specificity, not inheritance across levels.
//!
//! # Failure Semantics
//!
//! Nothing in this module fails. Claims without `=` (or with an empty path or
//! permission list) are dropped at parse time, and a path with no matching entry
//! is simply not granted.
//!
//! # Module Structure
//!
//! - [`entry`]: [`AclEntry`] and claim parsing
//! - [`check`]: Permission evaluation over parsed entries
//! - [`claims`]: [`ClaimSource`] capability and the [`AccessControl`] facade

mod check;
mod claims;
mod entry;

pub use check::{closest_entry, has_all_permissions, has_any_permission, has_permission};
pub use claims::{AccessControl, ClaimSource, Claims, ACL_CLAIM_TYPE};
pub use entry::{parse_claim, parse_claims, permissions, AclEntry};

/// Ordinal case-insensitive comparison used for both paths and permission codes.
pub(crate) fn eq_ignore_case(a: &str, b: &str) -> bool {
    if a.is_ascii() && b.is_ascii() {
        return a.eq_ignore_ascii_case(b);
    }
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}
