//! Session-backed request models for the admin dashboard.

use std::collections::HashSet;

use fiesta_core::permissions::effective_permissions;
use fiesta_core::records::{Role, StaffMember};
use fiesta_core::types::{Email, StaffId};

/// Session keys. Centralized to avoid typo'd string literals in handlers.
pub mod session_keys {
    /// [`fiesta_core::types::StaffId`] of the signed-in member.
    pub const STAFF_ID: &str = "staff_id";
}

/// The signed-in staff member as seen by the current request.
///
/// Rebuilt from the staff and role documents on every protected request, so a
/// permission revocation, role edit, or deactivation applies immediately
/// rather than on the member's next sign-in.
#[derive(Debug, Clone)]
pub struct CurrentStaff {
    pub id: StaffId,
    pub name: String,
    pub email: Email,
    pub permissions: HashSet<String>,
}

impl CurrentStaff {
    /// Build the request view from freshly loaded documents. Returns `None`
    /// for a deactivated account.
    #[must_use]
    pub fn resolve(member: StaffMember, role: Option<&Role>) -> Option<Self> {
        if !member.active {
            return None;
        }
        let permissions = effective_permissions(&member.permissions, role)
            .into_iter()
            .map(ToString::to_string)
            .collect();
        Some(Self {
            id: member.id,
            name: member.name,
            email: member.email,
            permissions,
        })
    }

    /// Whether this staff member holds a permission key.
    #[must_use]
    pub fn has_permission(&self, key: &str) -> bool {
        self.permissions.contains(key)
    }

    /// Reject with `Forbidden` unless the permission is held.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::AppError::Forbidden`] naming the missing key.
    pub fn require(&self, key: &str) -> crate::error::Result<()> {
        if self.has_permission(key) {
            Ok(())
        } else {
            Err(crate::error::AppError::Forbidden(key.to_string()))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use fiesta_core::permissions::keys;
    use fiesta_core::types::RoleId;

    fn member_with(active: bool, perms: &[&str]) -> StaffMember {
        StaffMember {
            id: StaffId::new("s1"),
            name: "Sam".to_string(),
            email: Email::parse("sam@example.com").unwrap(),
            role_id: None,
            permissions: perms.iter().map(ToString::to_string).collect(),
            active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn staff_with(perms: &[&str]) -> CurrentStaff {
        CurrentStaff::resolve(member_with(true, perms), None).unwrap()
    }

    #[test]
    fn test_require_passes_with_permission() {
        let staff = staff_with(&[keys::CATALOG_WRITE]);
        assert!(staff.require(keys::CATALOG_WRITE).is_ok());
    }

    #[test]
    fn test_require_rejects_missing_permission() {
        let staff = staff_with(&[keys::CATALOG_WRITE]);
        let err = staff.require(keys::ORDERS_WRITE).unwrap_err();
        assert!(err.to_string().contains(keys::ORDERS_WRITE));
    }

    #[test]
    fn test_resolve_rejects_deactivated_account() {
        assert!(CurrentStaff::resolve(member_with(false, &[keys::CATALOG_WRITE]), None).is_none());
    }

    #[test]
    fn test_resolve_tracks_the_current_documents() {
        let role = Role {
            id: RoleId::new("dispatcher"),
            name: "Dispatcher".to_string(),
            permissions: vec![keys::ORDERS_WRITE.to_string()],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        // With the role attached the grant is there...
        let staff = CurrentStaff::resolve(member_with(true, &[]), Some(&role)).unwrap();
        assert!(staff.require(keys::ORDERS_WRITE).is_ok());

        // ...and once the role (or grant) is gone, the very next resolve
        // loses it - nothing is remembered from the previous request.
        let staff = CurrentStaff::resolve(member_with(true, &[]), None).unwrap();
        assert!(staff.require(keys::ORDERS_WRITE).is_err());
    }
}
