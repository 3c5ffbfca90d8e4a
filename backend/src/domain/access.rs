//! Capability checks for domain operations.
//!
//! Each operation declares the set of roles allowed to invoke it and performs
//! exactly one check on entry. This replaces scattering per-handler role
//! comparisons across the codebase.

use super::error::Error;
use super::user::{Actor, Role};

/// Immutable set of roles permitted to invoke an operation.
///
/// # Examples
/// ```
/// use backend::domain::{Role, RoleSet};
///
/// const ROSTER_EDITORS: RoleSet = RoleSet::of(&[Role::Teacher, Role::Admin]);
/// assert!(ROSTER_EDITORS.allows(Role::Admin));
/// assert!(!ROSTER_EDITORS.allows(Role::Student));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleSet(u8);

const fn bit(role: Role) -> u8 {
    match role {
        Role::Student => 0b001,
        Role::Teacher => 0b010,
        Role::Admin => 0b100,
    }
}

impl RoleSet {
    /// Set containing every role; used by operations that only require
    /// authentication.
    pub const ANY: Self = Self::of(&[Role::Student, Role::Teacher, Role::Admin]);

    /// Build a set from the listed roles.
    pub const fn of(roles: &[Role]) -> Self {
        let mut mask = 0u8;
        let mut i = 0;
        while i < roles.len() {
            mask |= bit(roles[i]);
            i += 1;
        }
        Self(mask)
    }

    /// Whether the given role is a member of the set.
    pub const fn allows(self, role: Role) -> bool {
        self.0 & bit(role) != 0
    }
}

/// Reject the actor with `Forbidden` unless their role is in `allowed`.
///
/// `operation` names the attempted action in the error details so clients can
/// distinguish which capability was missing.
pub fn authorize(actor: &Actor, allowed: RoleSet, operation: &str) -> Result<(), Error> {
    if allowed.allows(actor.role) {
        Ok(())
    } else {
        Err(
            Error::forbidden(format!("role {} may not {operation}", actor.role)).with_details(
                serde_json::json!({ "role": actor.role.as_str(), "operation": operation }),
            ),
        )
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::{ErrorCode, UserId};
    use rstest::rstest;

    fn actor(role: Role) -> Actor {
        Actor {
            id: UserId::random(),
            role,
        }
    }

    #[rstest]
    #[case(Role::Student)]
    #[case(Role::Teacher)]
    #[case(Role::Admin)]
    fn any_allows_every_role(#[case] role: Role) {
        assert!(RoleSet::ANY.allows(role));
    }

    #[rstest]
    fn singleton_set_excludes_other_roles() {
        let students = RoleSet::of(&[Role::Student]);
        assert!(students.allows(Role::Student));
        assert!(!students.allows(Role::Teacher));
        assert!(!students.allows(Role::Admin));
    }

    #[rstest]
    fn authorize_passes_member_roles() {
        let editors = RoleSet::of(&[Role::Teacher, Role::Admin]);
        authorize(&actor(Role::Teacher), editors, "edit roster").expect("teacher allowed");
    }

    #[rstest]
    fn authorize_rejects_with_forbidden_and_details() {
        let editors = RoleSet::of(&[Role::Admin]);
        let err = authorize(&actor(Role::Student), editors, "delete course")
            .expect_err("student must be rejected");
        assert_eq!(err.code(), ErrorCode::Forbidden);
        let details = err.details().expect("details present");
        assert_eq!(
            details.get("operation").and_then(serde_json::Value::as_str),
            Some("delete course")
        );
    }
}
