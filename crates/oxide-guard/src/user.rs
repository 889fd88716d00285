//! The authenticated-user capability consumed by the guard.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// A named role carrying a set of permission codenames.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Role name (e.g., "admin", "editor").
    pub name: String,
    /// Permission codenames granted by this role.
    #[serde(default)]
    pub permissions: BTreeSet<String>,
}

impl Role {
    /// Creates a role without permissions.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            permissions: BTreeSet::new(),
        }
    }

    /// Grants a permission to this role.
    #[must_use]
    pub fn grant(mut self, permission: impl Into<String>) -> Self {
        self.permissions.insert(permission.into());
        self
    }

    /// Returns whether this role carries the given permission.
    #[must_use]
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }
}

/// The current user as seen by the access guard.
///
/// The guard only needs to know which roles the user holds and what those
/// roles permit; how the user was authenticated is not its concern.
pub trait AuthenticatedUser: Send + Sync {
    /// Returns the roles held by the user.
    fn roles(&self) -> &[Role];

    /// Returns whether the user holds the named role.
    fn has_role(&self, name: &str) -> bool {
        self.roles().iter().any(|role| role.name == name)
    }
}

/// A simple in-memory user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique username.
    pub username: String,
    /// Roles held by the user.
    #[serde(default)]
    pub roles: Vec<Role>,
}

impl User {
    /// Creates a user without roles.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            roles: Vec::new(),
        }
    }

    /// Adds a role to the user.
    #[must_use]
    pub fn with_role(mut self, role: Role) -> Self {
        self.roles.push(role);
        self
    }
}

impl AuthenticatedUser for User {
    fn roles(&self) -> &[Role] {
        &self.roles
    }
}

/// Source of the current user at request time.
pub trait UserProvider: Send + Sync {
    /// Returns the signed-in user, if any.
    fn current_user(&self) -> Option<Arc<dyn AuthenticatedUser>>;
}

impl<F> UserProvider for F
where
    F: Fn() -> Option<Arc<dyn AuthenticatedUser>> + Send + Sync,
{
    fn current_user(&self) -> Option<Arc<dyn AuthenticatedUser>> {
        self()
    }
}

/// A provider for which nobody is ever signed in.
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

impl UserProvider for Anonymous {
    fn current_user(&self) -> Option<Arc<dyn AuthenticatedUser>> {
        None
    }
}

/// A provider that always reports the same signed-in user.
#[derive(Clone)]
pub struct SignedIn(Arc<dyn AuthenticatedUser>);

impl SignedIn {
    /// Creates a provider for the given user.
    pub fn new(user: impl AuthenticatedUser + 'static) -> Self {
        Self(Arc::new(user))
    }
}

impl UserProvider for SignedIn {
    fn current_user(&self) -> Option<Arc<dyn AuthenticatedUser>> {
        Some(Arc::clone(&self.0))
    }
}

impl std::fmt::Debug for SignedIn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignedIn")
            .field("roles", &self.0.roles())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_permissions() {
        let role = Role::new("editor").grant("change_post");
        assert!(role.has_permission("change_post"));
        assert!(!role.has_permission("delete_post"));
    }

    #[test]
    fn test_user_has_role() {
        let user = User::new("alice").with_role(Role::new("admin"));
        assert!(user.has_role("admin"));
        assert!(!user.has_role("editor"));
    }

    #[test]
    fn test_providers() {
        assert!(Anonymous.current_user().is_none());

        let provider = SignedIn::new(User::new("alice").with_role(Role::new("admin")));
        let user = provider.current_user().unwrap();
        assert!(user.has_role("admin"));

        let closure = || -> Option<Arc<dyn AuthenticatedUser>> { None };
        assert!(closure.current_user().is_none());
    }
}
