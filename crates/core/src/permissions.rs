//! Staff permission checks.
//!
//! A staff member's effective permissions are the union of their direct
//! permission list and their role's list. The check is a pure set membership
//! re-evaluated on every protected request; there is no caching and no
//! revocation protocol beyond the next read.

use std::collections::HashSet;

use crate::records::{Role, StaffMember};

/// Well-known permission keys used by the admin API.
pub mod keys {
    /// Create/update/delete products and categories.
    pub const CATALOG_WRITE: &str = "catalog.write";
    /// Seed demo catalog data.
    pub const CATALOG_SEED: &str = "catalog.seed";
    /// Update order status.
    pub const ORDERS_WRITE: &str = "orders.write";
    /// Manage staff accounts.
    pub const STAFF_MANAGE: &str = "staff.manage";
    /// Manage roles.
    pub const ROLES_MANAGE: &str = "roles.manage";

    /// Every key the admin API knows about; role editors validate against
    /// this list.
    pub const ALL: &[&str] = &[
        CATALOG_WRITE,
        CATALOG_SEED,
        ORDERS_WRITE,
        STAFF_MANAGE,
        ROLES_MANAGE,
    ];
}

/// Union of a direct permission list and a role's permission list.
#[must_use]
pub fn effective_permissions<'a>(
    direct: &'a [String],
    role: Option<&'a Role>,
) -> HashSet<&'a str> {
    let mut set: HashSet<&str> = direct.iter().map(String::as_str).collect();
    if let Some(role) = role {
        set.extend(role.permissions.iter().map(String::as_str));
    }
    set
}

/// Whether a staff member holds `key`, directly or through their role.
///
/// `role` is the resolved record for `staff.role_id`, when one exists; soft
/// foreign keys mean it can be absent even when `role_id` is set.
#[must_use]
pub fn has_permission(staff: &StaffMember, role: Option<&Role>, key: &str) -> bool {
    effective_permissions(&staff.permissions, role).contains(key)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{Email, RoleId, StaffId};
    use chrono::Utc;

    fn staff(direct: &[&str], role_id: Option<&str>) -> StaffMember {
        StaffMember {
            id: StaffId::new("s1"),
            name: "Sam".to_string(),
            email: Email::parse("sam@example.com").unwrap(),
            role_id: role_id.map(RoleId::new),
            permissions: direct.iter().map(ToString::to_string).collect(),
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn role(perms: &[&str]) -> Role {
        Role {
            id: RoleId::new("r1"),
            name: "Manager".to_string(),
            permissions: perms.iter().map(ToString::to_string).collect(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_role_permission_without_direct() {
        let member = staff(&[], Some("r1"));
        let manager = role(&[keys::ORDERS_WRITE]);
        assert!(has_permission(&member, Some(&manager), keys::ORDERS_WRITE));
    }

    #[test]
    fn test_direct_permission_without_role() {
        let member = staff(&[keys::CATALOG_WRITE], None);
        assert!(has_permission(&member, None, keys::CATALOG_WRITE));
    }

    #[test]
    fn test_absent_from_both_is_denied() {
        let member = staff(&[keys::CATALOG_WRITE], Some("r1"));
        let manager = role(&[keys::ORDERS_WRITE]);
        assert!(!has_permission(&member, Some(&manager), keys::STAFF_MANAGE));
    }

    #[test]
    fn test_effective_permissions_is_union() {
        let member = staff(&[keys::CATALOG_WRITE, keys::ORDERS_WRITE], Some("r1"));
        let manager = role(&[keys::ORDERS_WRITE, keys::ROLES_MANAGE]);
        let effective = effective_permissions(&member.permissions, Some(&manager));
        assert_eq!(
            effective,
            HashSet::from([keys::CATALOG_WRITE, keys::ORDERS_WRITE, keys::ROLES_MANAGE])
        );
    }

    #[test]
    fn test_all_lists_every_key() {
        for key in [
            keys::CATALOG_WRITE,
            keys::CATALOG_SEED,
            keys::ORDERS_WRITE,
            keys::STAFF_MANAGE,
            keys::ROLES_MANAGE,
        ] {
            assert!(keys::ALL.contains(&key));
        }
        assert_eq!(keys::ALL.len(), 5);
    }

    #[test]
    fn test_unresolved_role_falls_back_to_direct_only() {
        // role_id set but the role document is gone (soft foreign key).
        let member = staff(&[keys::CATALOG_WRITE], Some("deleted-role"));
        assert!(has_permission(&member, None, keys::CATALOG_WRITE));
        assert!(!has_permission(&member, None, keys::ORDERS_WRITE));
    }
}
