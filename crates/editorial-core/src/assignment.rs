//! Role assignment
//!
//! A user holds at most one role. Assigning a role replaces the previous one
//! together with the rubrik and division binding and the direct permissions,
//! in a single store write.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use editorial_events::EventBus;
use editorial_rbac::{Permission, PermissionSet, Role, RoleRegistry, DEFAULT_GUARD};

use crate::error::{EditorialError, EditorialResult, FieldErrors};
use crate::events::{self, UserEvent};
use crate::store::{EditorialStore, StoreError};
use crate::user::User;

/// Input for [`AssignmentService::assign_role`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssignRoleRequest {
    /// Role name as registered ("Editor Rubrik")
    pub role: String,

    /// Rubrik to bind the role to (rubrik roles only)
    #[serde(default)]
    pub rubrik_id: Option<Uuid>,

    /// Division the user belongs to
    #[serde(default)]
    pub division_id: Option<Uuid>,

    /// Permission names granted on top of the role
    #[serde(default)]
    pub direct_permissions: Vec<String>,
}

impl AssignRoleRequest {
    /// Request a role with no rubrik, division or direct permissions.
    pub fn new(role: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            ..Self::default()
        }
    }

    /// Bind to a rubrik.
    pub fn with_rubrik(mut self, rubrik_id: Uuid) -> Self {
        self.rubrik_id = Some(rubrik_id);
        self
    }

    /// Set the division.
    pub fn with_division(mut self, division_id: Uuid) -> Self {
        self.division_id = Some(division_id);
        self
    }

    /// Set the direct permissions.
    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.direct_permissions = permissions.into_iter().map(Into::into).collect();
        self
    }
}

/// A request that passed validation.
struct Assignment {
    role: Role,
    rubrik_id: Option<Uuid>,
    division_id: Option<Uuid>,
    permissions: PermissionSet,
}

/// Assigns roles to users.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use editorial_core::{AssignRoleRequest, AssignmentService, MemoryStore, User, UserStore};
/// use editorial_rbac::{Permission, Role};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::new();
/// let manager = User::new("Ops", "ops@example.com").with_permission(Permission::ManageUsers);
/// let user = User::new("Dewi", "dewi@example.com");
/// store.save_user(&user).await?;
///
/// let service = AssignmentService::new(Arc::new(store));
/// let user = service
///     .assign_role(Some(&manager), user.id, AssignRoleRequest::new("Author"))
///     .await?;
/// assert_eq!(user.role, Some(Role::Author));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AssignmentService {
    store: Arc<dyn EditorialStore>,
    events: Option<Arc<dyn EventBus>>,
    guard: String,
}

impl AssignmentService {
    /// Create a service resolving names under [`DEFAULT_GUARD`], without
    /// event publishing.
    pub fn new(store: Arc<dyn EditorialStore>) -> Self {
        Self {
            store,
            events: None,
            guard: DEFAULT_GUARD.to_string(),
        }
    }

    /// Resolve role and permission names under `guard`
    /// (see [`crate::EditorialConfig::guard`]).
    pub fn with_guard(mut self, guard: impl Into<String>) -> Self {
        self.guard = guard.into();
        self
    }

    /// Publish role events on `bus`.
    pub fn with_events(mut self, bus: Arc<dyn EventBus>) -> Self {
        self.events = Some(bus);
        self
    }

    /// Give `user_id` exactly one role.
    ///
    /// Replaces the previous role, sets the rubrik and division to the
    /// validated values (cleared where the role does not use them) and
    /// replaces the direct permissions with exactly the requested list.
    ///
    /// # Errors
    ///
    /// * [`EditorialError::Unauthorized`] - actor lacks `manage.users`
    /// * [`EditorialError::NotFound`] - no such user
    /// * [`EditorialError::ValidationFailed`] - one entry per failing field;
    ///   the user is left unchanged
    #[instrument(skip_all, fields(user_id = %user_id, role = %request.role))]
    pub async fn assign_role(
        &self,
        actor: Option<&User>,
        user_id: Uuid,
        request: AssignRoleRequest,
    ) -> EditorialResult<User> {
        let actor = require_manager(actor, "assignRole")?;

        let mut user = self
            .store
            .get_user(user_id)
            .await?
            .ok_or_else(|| EditorialError::not_found("user", user_id))?;

        let assignment = self.validate(&request).await?;
        let previous = user.role;

        user.assign_role(assignment.role);
        user.rubrik_id = assignment.rubrik_id;
        user.division_id = assignment.division_id;
        user.sync_permissions(assignment.permissions.iter());
        self.store.save_user(&user).await?;

        info!(
            actor_id = %actor.id,
            previous = ?previous,
            rubrik_id = ?user.rubrik_id,
            "Role assigned"
        );

        let event = UserEvent::RoleAssigned {
            user_id: user.id,
            role: assignment.role.as_str().to_string(),
            rubrik_id: user.rubrik_id,
            division_id: user.division_id,
            permissions: user
                .direct_permissions
                .names()
                .into_iter()
                .map(String::from)
                .collect(),
        };
        events::publish(self.events.as_ref(), event.to_event(actor.id)).await;

        Ok(user)
    }

    /// Overwrite the role of every user in `user_ids` with `role`.
    ///
    /// Only the role is written: rubrik, division and direct permissions
    /// stay as stored. Duplicate ids are collapsed. Nothing is written unless
    /// the role exists and every user does; the store applies the batch
    /// atomically.
    #[instrument(skip_all, fields(users = user_ids.len(), role = %role))]
    pub async fn bulk_assign_role(
        &self,
        actor: Option<&User>,
        user_ids: &[Uuid],
        role: &str,
    ) -> EditorialResult<Vec<User>> {
        let actor = require_manager(actor, "bulkAssignRole")?;

        let registry = self.store.role_registry(&self.guard).await?;
        let role = match registry.resolve_role(role.trim()) {
            Some(role) => role,
            None => {
                warn!(guard = %self.guard, "Bulk assignment of an unknown role");
                return Err(EditorialError::ValidationFailed(FieldErrors::single(
                    "role",
                    "The selected role is invalid.",
                )));
            }
        };

        let mut seen = HashSet::new();
        let ids: Vec<Uuid> = user_ids.iter().copied().filter(|id| seen.insert(*id)).collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let users = match self.store.set_role_for_users(&ids, role).await {
            Ok(users) => users,
            Err(StoreError::Missing { entity, id }) => {
                return Err(EditorialError::not_found(entity, id))
            }
            Err(e) => return Err(e.into()),
        };

        info!(actor_id = %actor.id, count = users.len(), "Roles bulk assigned");

        let event = UserEvent::RolesBulkAssigned {
            user_ids: users.iter().map(|u| u.id).collect(),
            role: role.as_str().to_string(),
        };
        events::publish(self.events.as_ref(), event.to_event(actor.id)).await;

        Ok(users)
    }

    async fn validate(&self, request: &AssignRoleRequest) -> EditorialResult<Assignment> {
        let registry = self.store.role_registry(&self.guard).await?;
        let mut errors = FieldErrors::new();

        let role = if request.role.trim().is_empty() {
            errors.add("role", "The role field is required.");
            None
        } else {
            let role = registry.resolve_role(request.role.trim());
            if role.is_none() {
                errors.add("role", "The selected role is invalid.");
            }
            role
        };

        match (role, request.rubrik_id) {
            (Some(role), None) if role.requires_rubrik() => {
                errors.add("rubrik_id", format!("A rubrik is required for the {} role.", role));
            }
            (Some(role), Some(_)) if !role.requires_rubrik() => {
                errors.add(
                    "rubrik_id",
                    format!("The {} role cannot be bound to a rubrik.", role),
                );
            }
            (_, Some(id)) => {
                if !self.store.rubrik_exists(id).await? {
                    errors.add("rubrik_id", "The selected rubrik does not exist.");
                }
            }
            _ => {}
        }

        if let Some(id) = request.division_id {
            if !self.store.division_exists(id).await? {
                errors.add("division_id", "The selected division does not exist.");
            }
        }

        let permissions = resolve_permissions(&registry, &request.direct_permissions, &mut errors);

        match role {
            Some(role) if errors.is_empty() => Ok(Assignment {
                role,
                rubrik_id: request.rubrik_id.filter(|_| role.requires_rubrik()),
                division_id: request.division_id.filter(|_| role.allows_division()),
                permissions,
            }),
            _ => {
                warn!(fields = %errors, "Role assignment rejected");
                Err(EditorialError::ValidationFailed(errors))
            }
        }
    }
}

fn resolve_permissions(
    registry: &RoleRegistry,
    names: &[String],
    errors: &mut FieldErrors,
) -> PermissionSet {
    let mut permissions = PermissionSet::new();
    for (i, name) in names.iter().enumerate() {
        match registry.resolve_permission(name) {
            Some(permission) => {
                permissions.add(permission);
            }
            None => errors.add(
                format!("direct_permissions.{}", i),
                "The selected permission is invalid.",
            ),
        }
    }
    permissions
}

fn require_manager<'a>(actor: Option<&'a User>, action: &str) -> EditorialResult<&'a User> {
    match actor {
        Some(actor) if actor.has_permission(Permission::ManageUsers) => Ok(actor),
        _ => {
            warn!(actor_id = ?actor.map(|a| a.id), action, "Actor may not manage users");
            Err(EditorialError::unauthorized(action))
        }
    }
}
