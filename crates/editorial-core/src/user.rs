//! User aggregate
//!
//! The fields of a user the editorial core cares about: one role, the
//! rubrik and division that role is bound to, and direct permissions granted
//! on top of the role.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use editorial_rbac::{Permission, PermissionSet, Role};

/// A user as seen by the editorial core.
///
/// The role is a single optional field: a user never holds two roles.
/// Assigning a role goes through [`crate::AssignmentService`], which also
/// keeps `rubrik_id` consistent with the role.
///
/// # Examples
///
/// ```
/// use editorial_core::User;
/// use editorial_rbac::{Permission, Role};
///
/// let mut user = User::new("Dewi", "dewi@example.com");
/// assert!(user.role.is_none());
///
/// user.assign_role(Role::Author);
/// assert!(user.has_role(Role::Author));
/// assert!(user.has_permission(Permission::ArticleSubmit));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique user ID
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Login email
    pub email: String,

    /// The user's single role
    pub role: Option<Role>,

    /// Rubrik the role is bound to
    pub rubrik_id: Option<Uuid>,

    /// Division the user belongs to
    pub division_id: Option<Uuid>,

    /// Permissions granted independently of the role
    #[serde(default)]
    pub direct_permissions: PermissionSet,

    /// When the user was created
    pub created_at: DateTime<Utc>,

    /// When the user was last updated
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a user with no role and no permissions.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            email: email.into(),
            role: None,
            rubrik_id: None,
            division_id: None,
            direct_permissions: PermissionSet::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the role without validation.
    ///
    /// For fixtures and seeding. Live assignment belongs to the assignment
    /// service.
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    /// Set the rubrik without validation.
    pub fn with_rubrik(mut self, rubrik_id: Uuid) -> Self {
        self.rubrik_id = Some(rubrik_id);
        self
    }

    /// Set the division without validation.
    pub fn with_division(mut self, division_id: Uuid) -> Self {
        self.division_id = Some(division_id);
        self
    }

    /// Grant a direct permission.
    pub fn with_permission(mut self, permission: Permission) -> Self {
        self.direct_permissions.add(permission);
        self
    }

    /// Check if the user holds `role`.
    pub fn has_role(&self, role: Role) -> bool {
        self.role == Some(role)
    }

    /// Check if the user is a Super Admin.
    pub fn is_super_admin(&self) -> bool {
        self.has_role(Role::SuperAdmin)
    }

    /// Check if the user holds `permission` through the role or directly.
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.direct_permissions.has(permission)
            || self
                .role
                .map(|role| role.default_permissions().has(permission))
                .unwrap_or(false)
    }

    /// Every permission the user holds.
    pub fn effective_permissions(&self) -> PermissionSet {
        let mut set = self
            .role
            .map(|role| role.default_permissions())
            .unwrap_or_default();
        set.merge(&self.direct_permissions);
        set
    }

    /// Check if the user's rubrik equals `rubrik_id`.
    ///
    /// Absent rubriks never match, not even each other.
    pub fn rubrik_matches(&self, rubrik_id: Option<Uuid>) -> bool {
        matches!((self.rubrik_id, rubrik_id), (Some(mine), Some(theirs)) if mine == theirs)
    }

    /// Replace whatever role the user held with `role`.
    pub fn assign_role(&mut self, role: Role) {
        self.role = Some(role);
        self.touch();
    }

    /// Drop the role.
    pub fn revoke_role(&mut self) {
        self.role = None;
        self.touch();
    }

    /// Replace the direct permissions with exactly `permissions`.
    pub fn sync_permissions<I>(&mut self, permissions: I)
    where
        I: IntoIterator<Item = Permission>,
    {
        self.direct_permissions.sync(permissions);
        self.touch();
    }

    /// Mark the user as modified now.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
