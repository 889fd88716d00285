//! # oxide-guard
//!
//! Declarative access control for controller actions.
//!
//! This crate provides:
//! - [`ProtectionRule`] values attached to actions at registration time
//! - The [`AuthenticatedUser`] capability and a simple in-memory [`User`]
//! - A [`FlashSink`] for messages shown on the next rendered page
//! - [`AccessGuard`], which evaluates the rules in a fixed order
//!
//! ## Quick Start
//!
//! ```rust
//! use oxide_guard::{AccessGuard, Decision, FlashBag, ProtectionRule, Role, User, INFO};
//!
//! let rules = vec![
//!     ProtectionRule::authenticated()
//!         .redirect_to("/login")
//!         .with_message("Please sign in first."),
//!     ProtectionRule::roles(["admin"]),
//! ];
//!
//! let flash = FlashBag::new();
//! let guard = AccessGuard::new();
//!
//! // Nobody is signed in: the authentication rule fails first.
//! let decision = guard.check(&rules, None, &flash);
//! assert!(matches!(decision, Decision::Deny(ref d) if d.redirect_path.as_deref() == Some("/login")));
//! assert_eq!(flash.take(INFO), vec!["Please sign in first."]);
//!
//! // An admin passes both rules.
//! let alice = User::new("alice").with_role(Role::new("admin"));
//! assert_eq!(guard.check(&rules, Some(&alice), &flash), Decision::Allow);
//! ```
//!
//! ## Permissions
//!
//! By default a `RequirePermissions` rule passes only when every role held by
//! the user carries every listed permission. Use
//! [`PermissionPolicy::AnyRole`] to accept a permission granted by any one of
//! the user's roles.

mod flash;
mod guard;
mod rules;
mod user;

pub use flash::{Discard, FlashBag, FlashMessages, FlashSink, INFO};
pub use guard::{AccessGuard, Decision, Denial, PermissionPolicy};
pub use rules::{ProtectionRule, RuleKind, RuleOptions};
pub use user::{Anonymous, AuthenticatedUser, Role, SignedIn, User, UserProvider};
