//! Protection rules attached to controller actions.

use serde::{Deserialize, Serialize};

/// Options shared by every protection rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleOptions {
    /// Where to send the client when the rule denies access.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_path: Option<String>,
    /// Message queued under the `info` flash category on denial.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// The kind of a protection rule, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    /// A signed-in user is required.
    Authentication,
    /// No user may be signed in.
    Unauthenticated,
    /// The user must hold every listed role.
    Roles,
    /// The user's roles must carry the listed permissions.
    Permissions,
}

impl RuleKind {
    /// All kinds in the order the guard evaluates them.
    pub const ORDER: [Self; 4] = [
        Self::Authentication,
        Self::Unauthenticated,
        Self::Roles,
        Self::Permissions,
    ];

    /// Returns the kind as a string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Authentication => "require_authentication",
            Self::Unauthenticated => "require_unauthenticated",
            Self::Roles => "require_roles",
            Self::Permissions => "require_permissions",
        }
    }
}

impl std::fmt::Display for RuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A declarative access requirement on a controller action.
///
/// Rules are built once when an action is registered:
///
/// ```
/// use oxide_guard::ProtectionRule;
///
/// let rule = ProtectionRule::roles(["editor", "admin"])
///     .redirect_to("/login")
///     .with_message("Editors only.");
/// assert_eq!(rule.options().redirect_path.as_deref(), Some("/login"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum ProtectionRule {
    /// Deny unless a user is signed in.
    RequireAuthentication {
        #[serde(default)]
        options: RuleOptions,
    },
    /// Deny if a user is signed in.
    RequireUnauthenticated {
        #[serde(default)]
        options: RuleOptions,
    },
    /// Deny unless the user holds every role.
    RequireRoles {
        roles: Vec<String>,
        #[serde(default)]
        options: RuleOptions,
    },
    /// Deny unless the user's roles carry the permissions.
    RequirePermissions {
        permissions: Vec<String>,
        #[serde(default)]
        options: RuleOptions,
    },
}

impl ProtectionRule {
    /// Creates a rule requiring a signed-in user.
    #[must_use]
    pub fn authenticated() -> Self {
        Self::RequireAuthentication {
            options: RuleOptions::default(),
        }
    }

    /// Creates a rule requiring that no user is signed in.
    #[must_use]
    pub fn unauthenticated() -> Self {
        Self::RequireUnauthenticated {
            options: RuleOptions::default(),
        }
    }

    /// Creates a rule requiring every given role.
    pub fn roles<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::RequireRoles {
            roles: roles.into_iter().map(Into::into).collect(),
            options: RuleOptions::default(),
        }
    }

    /// Creates a rule requiring the given permissions.
    pub fn permissions<I, S>(permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::RequirePermissions {
            permissions: permissions.into_iter().map(Into::into).collect(),
            options: RuleOptions::default(),
        }
    }

    /// Sets the redirect path used on denial.
    #[must_use]
    pub fn redirect_to(mut self, path: impl Into<String>) -> Self {
        self.options_mut().redirect_path = Some(path.into());
        self
    }

    /// Sets the flash message queued on denial.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.options_mut().message = Some(message.into());
        self
    }

    /// Returns the kind of this rule.
    #[must_use]
    pub const fn kind(&self) -> RuleKind {
        match self {
            Self::RequireAuthentication { .. } => RuleKind::Authentication,
            Self::RequireUnauthenticated { .. } => RuleKind::Unauthenticated,
            Self::RequireRoles { .. } => RuleKind::Roles,
            Self::RequirePermissions { .. } => RuleKind::Permissions,
        }
    }

    /// Returns the rule options.
    #[must_use]
    pub const fn options(&self) -> &RuleOptions {
        match self {
            Self::RequireAuthentication { options }
            | Self::RequireUnauthenticated { options }
            | Self::RequireRoles { options, .. }
            | Self::RequirePermissions { options, .. } => options,
        }
    }

    fn options_mut(&mut self) -> &mut RuleOptions {
        match self {
            Self::RequireAuthentication { options }
            | Self::RequireUnauthenticated { options }
            | Self::RequireRoles { options, .. }
            | Self::RequirePermissions { options, .. } => options,
        }
    }
}
