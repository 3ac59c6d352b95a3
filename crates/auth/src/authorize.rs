//! Permission checks over a principal's claim set.
//!
//! - No IO
//! - No panics
//! - Missing claims deny

use securefile_core::{ResourceId, UserId};

use crate::claims::{ClaimSet, names};
use crate::groups::GroupAction;

/// Group value that grants administrator rights.
pub const ADMIN_GROUP: &str = "admin";

/// The rule that granted an authorization decision.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Grant {
    /// `groups=admin` or `admin=true`.
    Admin,
    GroupMembership,
    Scope,
    /// Resource-scoped read that also needed group read access.
    ScopeAndGroup,
    /// The principal is the user the resource belongs to.
    Owner,
}

/// Outcome of a `CanPerform*` check, kept for audit logging.
///
/// The boundary only ever reports allowed/forbidden; which rule matched is
/// not shown to callers.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Decision {
    Granted(Grant),
    Denied,
}

impl Decision {
    pub fn is_granted(self) -> bool {
        matches!(self, Decision::Granted(_))
    }
}

/// Authorization evaluator bound to one principal's claims.
#[derive(Debug, Copy, Clone)]
pub struct Authorizer<'a> {
    claims: &'a ClaimSet,
}

impl<'a> Authorizer<'a> {
    pub fn new(claims: &'a ClaimSet) -> Self {
        Self { claims }
    }

    /// A `groups` claim equal to `admin`, or an `admin` claim of `true`.
    pub fn is_admin(&self) -> bool {
        self.claims.contains(names::GROUPS, ADMIN_GROUP)
            || self.claims.first(names::ADMIN) == Some("true")
    }

    /// Whether the lower-cased `scope` list contains `required_scope`.
    ///
    /// Only the stored side is lower-cased: `required_scope` is compared as
    /// given, so callers pass lower-case scopes.
    pub fn has_scope_permission(&self, required_scope: &str) -> bool {
        match self.claims.first(names::SCOPE) {
            Some(raw) => raw.to_lowercase().split(' ').any(|s| s == required_scope),
            None => false,
        }
    }

    /// Whether any `groups` claim starts with `<group>:r` (read) or
    /// `<group>:rw` (write). An absent or empty group never matches.
    ///
    /// This is a prefix match on the raw claim, looser than
    /// [`GroupMembership`](crate::GroupMembership) parsing: `team:rwx`
    /// grants write here but is not a valid membership.
    pub fn is_member_of_group(&self, required_group: Option<&str>, action: GroupAction) -> bool {
        let Some(group) = required_group.filter(|g| !g.is_empty()) else {
            return false;
        };
        let prefix = format!("{group}{}", action.membership_suffix());
        self.claims
            .all(names::GROUPS)
            .any(|g| g.starts_with(prefix.as_str()))
    }

    /// Whether `sub` parses as a UUID equal to `required_user`.
    pub fn is_required_user(&self, required_user: UserId) -> bool {
        self.claims
            .first(names::SUBJECT)
            .and_then(|sub| sub.parse::<UserId>().ok())
            .is_some_and(|id| id == required_user)
    }

    pub fn can_perform_create(&self, resource_type: &str, required_group: Option<&str>) -> bool {
        self.evaluate_create(resource_type, required_group).is_granted()
    }

    pub fn can_perform_update_or_delete(&self, required_user: UserId) -> bool {
        self.evaluate_update_or_delete(required_user).is_granted()
    }

    /// Read check; the combination of `required_group` and `resource_id`
    /// selects the rule:
    ///
    /// | group | id  | allowed when                                  |
    /// |-------|-----|-----------------------------------------------|
    /// | –     | –   | admin, or scope `type:read`                   |
    /// | yes   | –   | admin, or group read access                   |
    /// | yes   | yes | admin, or (scope `type:read:id` and group read) |
    /// | –     | yes | admin, or scope `type:read:id`                |
    pub fn can_perform_read(
        &self,
        resource_type: &str,
        required_group: Option<&str>,
        resource_id: Option<ResourceId>,
    ) -> bool {
        self.evaluate_read(resource_type, required_group, resource_id)
            .is_granted()
    }

    /// Admin, else group write access, else scope `<type>:create`.
    pub fn evaluate_create(&self, resource_type: &str, required_group: Option<&str>) -> Decision {
        let decision = if self.is_admin() {
            Decision::Granted(Grant::Admin)
        } else if self.is_member_of_group(required_group, GroupAction::Write) {
            Decision::Granted(Grant::GroupMembership)
        } else if self.has_scope_permission(&format!("{resource_type}:create")) {
            Decision::Granted(Grant::Scope)
        } else {
            Decision::Denied
        };
        record("create", resource_type, decision)
    }

    pub fn evaluate_update_or_delete(&self, required_user: UserId) -> Decision {
        let decision = if self.is_admin() {
            Decision::Granted(Grant::Admin)
        } else if self.is_required_user(required_user) {
            Decision::Granted(Grant::Owner)
        } else {
            Decision::Denied
        };
        record("update_or_delete", "user", decision)
    }

    pub fn evaluate_read(
        &self,
        resource_type: &str,
        required_group: Option<&str>,
        resource_id: Option<ResourceId>,
    ) -> Decision {
        if self.is_admin() {
            return record("read", resource_type, Decision::Granted(Grant::Admin));
        }

        let granted = match (required_group, resource_id) {
            (None, None) => self
                .has_scope_permission(&format!("{resource_type}:read"))
                .then_some(Grant::Scope),
            (Some(group), None) => self
                .is_member_of_group(Some(group), GroupAction::Read)
                .then_some(Grant::GroupMembership),
            (Some(group), Some(id)) => (self
                .has_scope_permission(&format!("{resource_type}:read:{id}"))
                && self.is_member_of_group(Some(group), GroupAction::Read))
            .then_some(Grant::ScopeAndGroup),
            (None, Some(id)) => self
                .has_scope_permission(&format!("{resource_type}:read:{id}"))
                .then_some(Grant::Scope),
        };

        record("read", resource_type, granted.map_or(Decision::Denied, Decision::Granted))
    }
}

fn record(operation: &'static str, resource_type: &str, decision: Decision) -> Decision {
    tracing::debug!(operation, resource_type, ?decision, "authorization decision");
    decision
}
