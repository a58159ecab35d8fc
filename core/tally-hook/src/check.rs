//! ACL checks from the command line.
//!
//! Claims come from repeated `--claim` arguments, or from `TALLY_ACL_CLAIMS`
//! (semicolon-separated) when none are given.

use std::env;

use tally_core::{AccessControl, ClaimSource, ACL_CLAIM_TYPE};

const CLAIMS_ENV: &str = "TALLY_ACL_CLAIMS";

/// ACL claims gathered from arguments or the environment.
pub struct CliClaims {
    values: Vec<String>,
}

impl CliClaims {
    pub fn new(args: Vec<String>) -> Self {
        if !args.is_empty() {
            return Self { values: args };
        }
        let values = env::var(CLAIMS_ENV)
            .map(|raw| split_env_claims(&raw))
            .unwrap_or_default();
        Self { values }
    }
}

impl ClaimSource for CliClaims {
    fn all_claims_of_type(&self, claim_type: &str) -> Vec<String> {
        if claim_type.eq_ignore_ascii_case(ACL_CLAIM_TYPE) {
            self.values.clone()
        } else {
            Vec::new()
        }
    }
}

fn split_env_claims(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Any,
    All,
}

/// Evaluates the check and returns whether it was granted.
pub fn run(claims: CliClaims, path: &str, permissions: &[String], mode: Mode) -> bool {
    let acl = AccessControl::new(claims);
    let granted = match mode {
        Mode::Any => acl.has_any_permission(path, permissions),
        Mode::All => acl.has_all_permissions(path, permissions),
    };
    tracing::info!(
        path = %path,
        permissions = ?permissions,
        mode = ?mode,
        granted,
        "ACL check"
    );
    granted
}
