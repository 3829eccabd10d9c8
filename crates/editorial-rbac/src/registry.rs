//! Role and permission registry
//!
//! The role/permission store registers roles and permissions by name under a
//! guard. [`RoleRegistry`] is that registration: the set of names the store
//! knows about, plus each role's permission names.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

use crate::permissions::{Permission, PermissionSet};
use crate::roles::Role;

/// Guard every editorial role and permission is registered under.
pub const DEFAULT_GUARD: &str = "web";

/// Registry error types.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// A role references a permission that is not registered.
    #[error("Permission not registered: {0}")]
    UnknownPermission(String),

    /// Blank role or permission name.
    #[error("Name must not be empty")]
    EmptyName,
}

/// Registered role and permission names for one guard.
///
/// # Example
///
/// ```
/// use editorial_rbac::{Role, RoleRegistry, DEFAULT_GUARD};
///
/// let registry = RoleRegistry::with_defaults(DEFAULT_GUARD);
/// assert!(registry.role_exists("Editor Rubrik"));
/// assert_eq!(registry.resolve_role("Editor Rubrik"), Some(Role::EditorRubrik));
/// assert!(registry.permission_exists("article.publish"));
/// assert!(!registry.permission_exists("article.archive"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleRegistry {
    guard: String,
    permissions: BTreeSet<String>,
    roles: BTreeMap<String, BTreeSet<String>>,
}

impl RoleRegistry {
    /// Create an empty registry for a guard.
    pub fn new(guard: impl Into<String>) -> Self {
        Self {
            guard: guard.into(),
            permissions: BTreeSet::new(),
            roles: BTreeMap::new(),
        }
    }

    /// Create a registry holding every known permission and every role with
    /// its default permissions.
    pub fn with_defaults(guard: impl Into<String>) -> Self {
        let mut registry = Self::new(guard);
        for perm in Permission::all() {
            registry.permissions.insert(perm.as_str().to_string());
        }
        for role in Role::all() {
            let names = role
                .default_permissions()
                .iter()
                .map(|p| p.as_str().to_string())
                .collect();
            registry.roles.insert(role.as_str().to_string(), names);
        }
        registry
    }

    /// The guard these names are registered under.
    pub fn guard(&self) -> &str {
        &self.guard
    }

    /// Register a permission name.
    pub fn register_permission(&mut self, name: impl Into<String>) -> Result<(), RegistryError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(RegistryError::EmptyName);
        }
        self.permissions.insert(name);
        Ok(())
    }

    /// Register (or re-register) a role with its permission names.
    ///
    /// Every permission must already be registered.
    pub fn register_role(
        &mut self,
        name: impl Into<String>,
        permissions: &[&str],
    ) -> Result<(), RegistryError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if let Some(missing) = permissions.iter().find(|p| !self.permissions.contains(**p)) {
            return Err(RegistryError::UnknownPermission((*missing).to_string()));
        }
        self.roles
            .insert(name, permissions.iter().map(|p| p.to_string()).collect());
        Ok(())
    }

    /// Remove a role registration.
    pub fn unregister_role(&mut self, name: &str) -> bool {
        self.roles.remove(name).is_some()
    }

    /// Check if a role name is registered.
    pub fn role_exists(&self, name: &str) -> bool {
        self.roles.contains_key(name)
    }

    /// Check if a permission name is registered.
    pub fn permission_exists(&self, name: &str) -> bool {
        self.permissions.contains(name)
    }

    /// Resolve a registered role name to a [`Role`].
    ///
    /// `None` when the name is not registered or not a known role.
    pub fn resolve_role(&self, name: &str) -> Option<Role> {
        if !self.role_exists(name) {
            return None;
        }
        Role::parse(name)
    }

    /// Resolve a registered permission name to a [`Permission`].
    pub fn resolve_permission(&self, name: &str) -> Option<Permission> {
        if !self.permission_exists(name) {
            return None;
        }
        Permission::parse(name)
    }

    /// Known permissions registered for a role.
    pub fn role_permissions(&self, role: Role) -> PermissionSet {
        self.roles
            .get(role.as_str())
            .map(|names| names.iter().filter_map(|n| Permission::parse(n)).collect())
            .unwrap_or_default()
    }

    /// Registered role names, in order.
    pub fn role_names(&self) -> impl Iterator<Item = &str> {
        self.roles.keys().map(String::as_str)
    }
}

impl Default for RoleRegistry {
    fn default() -> Self {
        Self::with_defaults(DEFAULT_GUARD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_register_every_role_and_permission() {
        let registry = RoleRegistry::default();
        assert_eq!(registry.guard(), "web");
        for role in Role::all() {
            assert!(registry.role_exists(role.as_str()));
            assert_eq!(registry.role_permissions(role), role.default_permissions());
        }
        for perm in Permission::all() {
            assert!(registry.permission_exists(perm.as_str()));
        }
    }

    #[test]
    fn test_resolve_requires_registration() {
        let mut registry = RoleRegistry::default();
        assert!(registry.unregister_role("Admin Rubrik"));

        assert_eq!(registry.resolve_role("Admin Rubrik"), None);
        assert_eq!(registry.resolve_role("Author"), Some(Role::Author));
    }

    #[test]
    fn test_registered_but_unknown_names_do_not_resolve() {
        let mut registry = RoleRegistry::default();
        registry.register_permission("article.archive").unwrap();
        registry.register_role("Proofreader", &["article.view"]).unwrap();

        assert!(registry.permission_exists("article.archive"));
        assert_eq!(registry.resolve_permission("article.archive"), None);
        assert!(registry.role_exists("Proofreader"));
        assert_eq!(registry.resolve_role("Proofreader"), None);
    }

    #[test]
    fn test_register_role_rejects_unknown_permission() {
        let mut registry = RoleRegistry::new(DEFAULT_GUARD);
        let err = registry.register_role("Author", &["article.create"]).unwrap_err();
        assert_eq!(err, RegistryError::UnknownPermission("article.create".to_string()));
        assert!(!registry.role_exists("Author"));
    }

    #[test]
    fn test_blank_names_rejected() {
        let mut registry = RoleRegistry::new(DEFAULT_GUARD);
        assert_eq!(registry.register_permission("  "), Err(RegistryError::EmptyName));
        assert_eq!(registry.register_role("", &[]), Err(RegistryError::EmptyName));
    }
}
