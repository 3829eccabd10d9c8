//! Editorial roles
//!
//! This module defines the four editorial roles, which of them are bound to
//! a rubrik, and the permissions each role grants by default.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::permissions::{Permission, PermissionSet};

/// A user's role in the editorial pipeline.
///
/// A user holds at most one role. Two roles are scoped to a single rubrik
/// and only act on articles of that rubrik.
///
/// # Permission Model
///
/// - **Author**: drafts articles and submits them for review
/// - **Editor Rubrik**: first review stage for one rubrik
/// - **Admin Rubrik**: final review stage (publish/reject) for one rubrik
/// - **Super Admin**: everything, in every rubrik, plus user management
///
/// # Examples
///
/// ```
/// use editorial_rbac::Role;
///
/// assert_eq!(Role::parse("admin rubrik"), Some(Role::AdminRubrik));
/// assert_eq!(Role::parse("super_admin"), Some(Role::SuperAdmin));
/// assert!(Role::EditorRubrik.requires_rubrik());
/// assert!(!Role::Author.requires_rubrik());
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    /// Full control over every article and user
    #[serde(rename = "Super Admin")]
    SuperAdmin,

    /// Admin-stage reviewer for one rubrik
    #[serde(rename = "Admin Rubrik")]
    AdminRubrik,

    /// Editor-stage reviewer for one rubrik
    #[serde(rename = "Editor Rubrik")]
    EditorRubrik,

    /// Writes and submits articles
    #[serde(rename = "Author")]
    Author,
}

impl Role {
    /// Check if this role must be bound to a rubrik.
    ///
    /// # Returns
    ///
    /// `true` for Editor Rubrik and Admin Rubrik
    pub fn requires_rubrik(&self) -> bool {
        matches!(self, Role::EditorRubrik | Role::AdminRubrik)
    }

    /// Check if this role may be bound to a division.
    ///
    /// Super Admin is global; every other role may belong to one division.
    pub fn allows_division(&self) -> bool {
        !matches!(self, Role::SuperAdmin)
    }

    /// Permissions granted by holding this role.
    ///
    /// Super Admin receives every permission.
    pub fn default_permissions(&self) -> PermissionSet {
        let perms: &[Permission] = match self {
            Role::SuperAdmin => return Permission::all().into_iter().collect(),
            Role::AdminRubrik => &[
                Permission::ArticleView,
                Permission::ArticleUpdate,
                Permission::ArticleReviewAdmin,
                Permission::ArticlePublish,
                Permission::ArticleReject,
            ],
            Role::EditorRubrik => &[
                Permission::ArticleView,
                Permission::ArticleUpdate,
                Permission::ArticleReviewEditor,
                Permission::ArticleApprove,
                Permission::ArticleRequestRevision,
            ],
            Role::Author => &[
                Permission::ArticleView,
                Permission::ArticleCreate,
                Permission::ArticleUpdate,
                Permission::ArticleDelete,
                Permission::ArticleSubmit,
            ],
        };
        perms.iter().copied().collect()
    }

    /// Parse role from its store name.
    ///
    /// Case-insensitive; `_` and `-` are accepted in place of spaces.
    pub fn parse(s: &str) -> Option<Self> {
        let normalized = s.trim().to_lowercase().replace(['_', '-'], " ");
        match normalized.as_str() {
            "super admin" => Some(Self::SuperAdmin),
            "admin rubrik" => Some(Self::AdminRubrik),
            "editor rubrik" => Some(Self::EditorRubrik),
            "author" => Some(Self::Author),
            _ => None,
        }
    }

    /// Get the store name of the role.
    ///
    /// # Examples
    ///
    /// ```
    /// use editorial_rbac::Role;
    ///
    /// assert_eq!(Role::EditorRubrik.as_str(), "Editor Rubrik");
    /// ```
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "Super Admin",
            Self::AdminRubrik => "Admin Rubrik",
            Self::EditorRubrik => "Editor Rubrik",
            Self::Author => "Author",
        }
    }

    /// Get all roles.
    pub fn all() -> Vec<Self> {
        vec![
            Self::SuperAdmin,
            Self::AdminRubrik,
            Self::EditorRubrik,
            Self::Author,
        ]
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
