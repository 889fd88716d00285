//! The access control chain.

use tracing::debug;

use crate::flash::{FlashSink, INFO};
use crate::rules::{ProtectionRule, RuleKind};
use crate::user::AuthenticatedUser;

/// How `RequirePermissions` rules are satisfied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PermissionPolicy {
    /// Every role held by the user must carry every listed permission.
    ///
    /// A user without roles passes.
    #[default]
    EveryRole,
    /// Each listed permission must be carried by at least one role.
    AnyRole,
}

/// Why access was denied and where to send the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Denial {
    /// The kind of the rule that failed.
    pub rule: RuleKind,
    /// Redirect target, if the rule declared one.
    pub redirect_path: Option<String>,
}

/// The outcome of an access check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The action may run.
    Allow,
    /// The action must not run.
    Deny(Denial),
}

impl Decision {
    /// Returns whether access was granted.
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Evaluates protection rules against the current user.
///
/// Rules are checked in a fixed order regardless of how they were declared:
/// authentication, then unauthenticated, then roles, then permissions. Only
/// the first declared rule of each kind takes part. The first failing rule
/// ends the check.
///
/// ```
/// use oxide_guard::{AccessGuard, Decision, Discard, ProtectionRule};
///
/// let guard = AccessGuard::new();
/// let rules = [ProtectionRule::authenticated(), ProtectionRule::roles(["admin"])];
/// let decision = guard.check(&rules, None, &Discard);
/// assert!(!decision.is_allowed());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessGuard {
    policy: PermissionPolicy,
}

impl AccessGuard {
    /// Creates a guard with the default permission policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the permission policy.
    #[must_use]
    pub const fn permission_policy(mut self, policy: PermissionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Checks `rules` for `user`, queueing the failing rule's message on denial.
    pub fn check(
        &self,
        rules: &[ProtectionRule],
        user: Option<&dyn AuthenticatedUser>,
        flash: &dyn FlashSink,
    ) -> Decision {
        for kind in RuleKind::ORDER {
            let Some(rule) = rules.iter().find(|rule| rule.kind() == kind) else {
                continue;
            };

            if !self.satisfied(rule, user) {
                debug!(rule = %kind, signed_in = user.is_some(), "access denied");
                let options = rule.options();
                if let Some(message) = &options.message {
                    flash.push(INFO, message);
                }
                return Decision::Deny(Denial {
                    rule: kind,
                    redirect_path: options.redirect_path.clone(),
                });
            }
        }

        Decision::Allow
    }

    fn satisfied(&self, rule: &ProtectionRule, user: Option<&dyn AuthenticatedUser>) -> bool {
        match (rule, user) {
            (ProtectionRule::RequireAuthentication { .. }, user) => user.is_some(),
            (ProtectionRule::RequireUnauthenticated { .. }, user) => user.is_none(),
            (
                ProtectionRule::RequireRoles { .. } | ProtectionRule::RequirePermissions { .. },
                None,
            ) => false,
            (ProtectionRule::RequireRoles { roles, .. }, Some(user)) => {
                roles.iter().all(|role| user.has_role(role))
            }
            (ProtectionRule::RequirePermissions { permissions, .. }, Some(user)) => {
                match self.policy {
                    PermissionPolicy::EveryRole => user.roles().iter().all(|role| {
                        permissions
                            .iter()
                            .all(|permission| role.has_permission(permission))
                    }),
                    PermissionPolicy::AnyRole => permissions.iter().all(|permission| {
                        user.roles()
                            .iter()
                            .any(|role| role.has_permission(permission))
                    }),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flash::FlashBag;
    use crate::user::{Role, User};

    fn admin() -> User {
        User::new("alice").with_role(Role::new("admin").grant("edit").grant("delete"))
    }

    #[test]
    fn test_no_rules_allows() {
        let bag = FlashBag::new();
        assert_eq!(AccessGuard::new().check(&[], None, &bag), Decision::Allow);
    }

    #[test]
    fn test_require_authentication() {
        let guard = AccessGuard::new();
        let bag = FlashBag::new();
        let rules = [ProtectionRule::authenticated()];
        let user = admin();

        assert!(!guard.check(&rules, None, &bag).is_allowed());
        assert!(guard.check(&rules, Some(&user), &bag).is_allowed());
    }

    #[test]
    fn test_require_unauthenticated() {
        let guard = AccessGuard::new();
        let bag = FlashBag::new();
        let rules = [ProtectionRule::unauthenticated()
            .redirect_to("/")
            .with_message("You must be signed out to view this page.")];
        let user = admin();

        assert!(guard.check(&rules, None, &bag).is_allowed());
        assert_eq!(
            guard.check(&rules, Some(&user), &bag),
            Decision::Deny(Denial {
                rule: RuleKind::Unauthenticated,
                redirect_path: Some("/".to_string()),
            })
        );
        assert_eq!(
            bag.take(INFO),
            vec!["You must be signed out to view this page."]
        );
    }

    #[test]
    fn test_authentication_checked_before_roles() {
        let bag = FlashBag::new();
        let rules = [
            ProtectionRule::roles(["admin"]).with_message("roles"),
            ProtectionRule::authenticated().with_message("sign in"),
        ];

        let decision = AccessGuard::new().check(&rules, None, &bag);

        assert_eq!(
            decision,
            Decision::Deny(Denial {
                rule: RuleKind::Authentication,
                redirect_path: None,
            })
        );
        assert_eq!(bag.take(INFO), vec!["sign in"]);
    }

    #[test]
    fn test_roles_require_every_role() {
        let guard = AccessGuard::new();
        let bag = FlashBag::new();
        let user = admin();

        let rules = [ProtectionRule::roles(["admin"])];
        assert!(guard.check(&rules, Some(&user), &bag).is_allowed());

        let rules = [ProtectionRule::roles(["admin", "editor"])];
        assert!(!guard.check(&rules, Some(&user), &bag).is_allowed());
    }

    #[test]
    fn test_roles_without_user_deny() {
        let bag = FlashBag::new();
        let rules = [ProtectionRule::roles(Vec::<String>::new())];
        assert!(!AccessGuard::new().check(&rules, None, &bag).is_allowed());
    }

    #[test]
    fn test_permissions_without_user_deny() {
        let bag = FlashBag::new();
        let rules = [ProtectionRule::permissions(["edit"]).with_message("m")];

        let decision = AccessGuard::new().check(&rules, None, &bag);

        assert_eq!(
            decision,
            Decision::Deny(Denial {
                rule: RuleKind::Permissions,
                redirect_path: None,
            })
        );
        assert_eq!(bag.take(INFO), vec!["m"]);

        let guard = AccessGuard::new().permission_policy(PermissionPolicy::AnyRole);
        assert!(!guard.check(&rules, None, &bag).is_allowed());
    }

    #[test]
    fn test_only_first_rule_of_a_kind_counts() {
        let bag = FlashBag::new();
        let user = admin();
        let rules = [
            ProtectionRule::roles(["admin"]),
            ProtectionRule::roles(["nobody"]),
        ];
        assert!(AccessGuard::new()
            .check(&rules, Some(&user), &bag)
            .is_allowed());
    }

    #[test]
    fn test_permissions_every_role() {
        let guard = AccessGuard::new();
        let bag = FlashBag::new();
        let rules = [ProtectionRule::permissions(["edit"])];

        let user = admin();
        assert!(guard.check(&rules, Some(&user), &bag).is_allowed());

        let user = admin().with_role(Role::new("viewer"));
        assert!(!guard.check(&rules, Some(&user), &bag).is_allowed());

        let user = User::new("bob");
        assert!(guard.check(&rules, Some(&user), &bag).is_allowed());
    }

    #[test]
    fn test_permissions_any_role() {
        let guard = AccessGuard::new().permission_policy(PermissionPolicy::AnyRole);
        let bag = FlashBag::new();
        let rules = [ProtectionRule::permissions(["edit", "publish"])];

        let user = admin().with_role(Role::new("publisher").grant("publish"));
        assert!(guard.check(&rules, Some(&user), &bag).is_allowed());

        let user = admin();
        assert!(!guard.check(&rules, Some(&user), &bag).is_allowed());

        let user = User::new("bob");
        assert!(!guard.check(&rules, Some(&user), &bag).is_allowed());
    }

    #[test]
    fn test_allow_queues_nothing() {
        let bag = FlashBag::new();
        let rules = [ProtectionRule::unauthenticated().with_message("unused")];
        assert!(AccessGuard::new().check(&rules, None, &bag).is_allowed());
        assert!(bag.is_empty());
    }
}
