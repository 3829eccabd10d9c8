//! # Editorial RBAC (Role-Based Access Control)
//!
//! Closed vocabulary for who may do what in the editorial review pipeline.
//!
//! ## Overview
//!
//! The editorial-rbac crate handles:
//! - **Roles**: the four editorial roles, two of them scoped to a rubrik
//! - **Permissions**: named capabilities (`article.approve`, `manage.users`, ...)
//! - **Actions**: operations the article policy decides on
//! - **Permission Sets**: exact, deterministic sets of permissions
//! - **Registry**: the dynamically registered role/permission names of a guard
//!
//! ## Architecture
//!
//! ```text
//! Role ──default_permissions()──> PermissionSet ──has()──> Permission
//!
//! RoleRegistry (guard "web") ──resolve_role("Editor Rubrik")──────> Role
//!                            ──resolve_permission("manage.users")─> Permission
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use editorial_rbac::{Permission, PermissionSet, Role};
//!
//! let role = Role::parse("Editor Rubrik").unwrap();
//! assert!(role.requires_rubrik());
//!
//! let defaults = role.default_permissions();
//! assert!(defaults.has(Permission::ArticleApprove));
//! assert!(!defaults.has(Permission::ManageUsers));
//!
//! let mut direct = PermissionSet::new();
//! direct.add(Permission::ManageRubriks);
//! assert_eq!(direct.len(), 1);
//! ```
//!
//! Names are compile-time checked in the core. The registry keeps the
//! external store's dynamic registration: a name must be registered for the
//! guard *and* known to the enums before the core accepts it.

pub mod actions;
pub mod permissions;
pub mod registry;
pub mod roles;

// Re-export main types for convenience
pub use actions::ArticleAction;
pub use permissions::{Permission, PermissionSet};
pub use registry::{RegistryError, RoleRegistry, DEFAULT_GUARD};
pub use roles::Role;
