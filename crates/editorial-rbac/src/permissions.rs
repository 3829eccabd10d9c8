//! # Permissions
//!
//! Named capabilities and exact permission sets.
//!
//! The external role/permission store registers permissions by name
//! (`article.approve`, `manage.users`). The core works with the closed
//! [`Permission`] enum instead and only converts at the boundary.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A named capability.
///
/// Serializes as its store name, e.g. `"article.request_revision"`.
///
/// # Example
///
/// ```
/// use editorial_rbac::Permission;
///
/// assert_eq!(Permission::ArticleApprove.as_str(), "article.approve");
/// assert_eq!(Permission::parse("manage.users"), Some(Permission::ManageUsers));
/// assert_eq!(Permission::parse("manage.everything"), None);
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Permission {
    /// See an article.
    #[serde(rename = "article.view")]
    ArticleView,

    /// Draft a new article.
    #[serde(rename = "article.create")]
    ArticleCreate,

    /// Edit article content fields.
    #[serde(rename = "article.update")]
    ArticleUpdate,

    /// Hard-delete an article.
    #[serde(rename = "article.delete")]
    ArticleDelete,

    /// Send a draft into review.
    #[serde(rename = "article.submit")]
    ArticleSubmit,

    /// Take a submitted article into editor review.
    #[serde(rename = "article.review_editor")]
    ArticleReviewEditor,

    /// Approve an article for the admin stage.
    #[serde(rename = "article.approve")]
    ArticleApprove,

    /// Send an article back to its author.
    #[serde(rename = "article.request_revision")]
    ArticleRequestRevision,

    /// Take an approved article into admin review.
    #[serde(rename = "article.review_admin")]
    ArticleReviewAdmin,

    /// Publish an article.
    #[serde(rename = "article.publish")]
    ArticlePublish,

    /// Reject an article at the admin stage.
    #[serde(rename = "article.reject")]
    ArticleReject,

    /// Assign roles, rubriks and direct permissions to users.
    #[serde(rename = "manage.users")]
    ManageUsers,

    /// Register roles and their permission sets.
    #[serde(rename = "manage.roles")]
    ManageRoles,

    /// Create and edit rubriks.
    #[serde(rename = "manage.rubriks")]
    ManageRubriks,

    /// Create and edit divisions.
    #[serde(rename = "manage.divisions")]
    ManageDivisions,
}

impl Permission {
    /// Get the store name of the permission.
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ArticleView => "article.view",
            Permission::ArticleCreate => "article.create",
            Permission::ArticleUpdate => "article.update",
            Permission::ArticleDelete => "article.delete",
            Permission::ArticleSubmit => "article.submit",
            Permission::ArticleReviewEditor => "article.review_editor",
            Permission::ArticleApprove => "article.approve",
            Permission::ArticleRequestRevision => "article.request_revision",
            Permission::ArticleReviewAdmin => "article.review_admin",
            Permission::ArticlePublish => "article.publish",
            Permission::ArticleReject => "article.reject",
            Permission::ManageUsers => "manage.users",
            Permission::ManageRoles => "manage.roles",
            Permission::ManageRubriks => "manage.rubriks",
            Permission::ManageDivisions => "manage.divisions",
        }
    }

    /// Parse a permission from its store name.
    ///
    /// Matching is exact: store names are identifiers, not prose.
    pub fn parse(s: &str) -> Option<Self> {
        Self::all().into_iter().find(|p| p.as_str() == s)
    }

    /// Get all permissions.
    pub fn all() -> Vec<Self> {
        vec![
            Permission::ArticleView,
            Permission::ArticleCreate,
            Permission::ArticleUpdate,
            Permission::ArticleDelete,
            Permission::ArticleSubmit,
            Permission::ArticleReviewEditor,
            Permission::ArticleApprove,
            Permission::ArticleRequestRevision,
            Permission::ArticleReviewAdmin,
            Permission::ArticlePublish,
            Permission::ArticleReject,
            Permission::ManageUsers,
            Permission::ManageRoles,
            Permission::ManageRubriks,
            Permission::ManageDivisions,
        ]
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An exact set of permissions.
///
/// Ordered, so iteration and serialization are stable.
///
/// # Example
///
/// ```
/// use editorial_rbac::{Permission, PermissionSet};
///
/// let mut set = PermissionSet::new();
/// set.add(Permission::ArticleView);
/// set.add(Permission::ArticleCreate);
///
/// set.sync([Permission::ArticleCreate]);
/// assert!(!set.has(Permission::ArticleView));
/// assert_eq!(set.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet {
    permissions: BTreeSet<Permission>,
}

impl PermissionSet {
    /// Create a new empty permission set.
    pub fn new() -> Self {
        Self {
            permissions: BTreeSet::new(),
        }
    }

    /// Add a permission to the set.
    ///
    /// # Returns
    ///
    /// `true` if the permission was not already present
    pub fn add(&mut self, permission: Permission) -> bool {
        self.permissions.insert(permission)
    }

    /// Add multiple permissions to the set.
    pub fn add_all<I>(&mut self, permissions: I)
    where
        I: IntoIterator<Item = Permission>,
    {
        self.permissions.extend(permissions);
    }

    /// Remove a permission from the set.
    ///
    /// # Returns
    ///
    /// `true` if the permission was present, `false` otherwise
    pub fn remove(&mut self, permission: Permission) -> bool {
        self.permissions.remove(&permission)
    }

    /// Check if the set contains a permission.
    pub fn has(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }

    /// Replace the contents with exactly `permissions`.
    ///
    /// Permissions missing from the new list are removed and new ones are
    /// added; the result never depends on the previous contents.
    pub fn sync<I>(&mut self, permissions: I)
    where
        I: IntoIterator<Item = Permission>,
    {
        self.permissions = permissions.into_iter().collect();
    }

    /// Merge another permission set into this one.
    pub fn merge(&mut self, other: &PermissionSet) {
        self.permissions.extend(other.permissions.iter().copied());
    }

    /// Iterate over the permissions in order.
    pub fn iter(&self) -> impl Iterator<Item = Permission> + '_ {
        self.permissions.iter().copied()
    }

    /// Store names of every permission in the set.
    pub fn names(&self) -> Vec<&'static str> {
        self.iter().map(|p| p.as_str()).collect()
    }

    /// Get the count of permissions.
    pub fn len(&self) -> usize {
        self.permissions.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }

    /// Clear all permissions.
    pub fn clear(&mut self) {
        self.permissions.clear();
    }

    /// Check if this set contains all permissions from another set.
    pub fn contains_all(&self, other: &PermissionSet) -> bool {
        other.permissions.is_subset(&self.permissions)
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<T: IntoIterator<Item = Permission>>(iter: T) -> Self {
        Self {
            permissions: iter.into_iter().collect(),
        }
    }
}
