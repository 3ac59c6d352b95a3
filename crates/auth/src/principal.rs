use securefile_core::UserId;

use crate::authorize::Authorizer;
use crate::claims::{ClaimSet, names};
use crate::groups::GroupMembership;

/// The caller behind the current request: the claim set of a token that
/// has passed verification.
///
/// Only produced by [`VerifiedToken::into_principal`](crate::VerifiedToken::into_principal);
/// transports that verify tokens elsewhere can evaluate raw claims through
/// [`Authorizer::new`] instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    claims: ClaimSet,
}

impl Principal {
    pub(crate) fn from_verified(claims: ClaimSet) -> Self {
        Self { claims }
    }

    /// Subject as a user id; `None` for resource tokens or a non-UUID `sub`.
    pub fn id(&self) -> Option<UserId> {
        self.claims.first(names::SUBJECT)?.parse().ok()
    }

    pub fn display_name(&self) -> Option<&str> {
        self.claims.first(names::NAME)
    }

    pub fn email(&self) -> Option<&str> {
        self.claims.first(names::EMAIL)
    }

    pub fn token_id(&self) -> Option<&str> {
        self.claims.first(names::TOKEN_ID)
    }

    /// Raw `groups` values, including non-membership ones such as `admin`.
    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.claims.all(names::GROUPS)
    }

    /// `groups` values that parse as `<group>:<ro|rw>`.
    pub fn memberships(&self) -> Vec<GroupMembership> {
        self.groups().filter_map(|g| g.parse().ok()).collect()
    }

    /// Granted scopes, lower-cased the way scope checks see them.
    pub fn scopes(&self) -> Vec<String> {
        self.claims
            .first(names::SCOPE)
            .map(|raw| raw.to_lowercase().split(' ').map(str::to_owned).collect())
            .unwrap_or_default()
    }

    pub fn claims(&self) -> &ClaimSet {
        &self.claims
    }

    pub fn authorizer(&self) -> Authorizer<'_> {
        Authorizer::new(&self.claims)
    }
}
