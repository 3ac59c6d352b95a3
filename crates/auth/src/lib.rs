//! `securefile-auth`: token issuance/verification and claims-based
//! authorization.
//!
//! No HTTP or storage here: transports hand it bearer tokens and get back
//! verified claims and allow/deny answers.

pub mod authorize;
pub mod claims;
pub mod groups;
pub mod login;
pub mod principal;
pub mod scope;
pub mod settings;
pub mod token;

pub use authorize::{Authorizer, Decision, Grant};
pub use claims::ClaimSet;
pub use groups::{AccessLevel, GroupAction, GroupMembership};
pub use login::{Authenticator, LoginError, PasswordVerifier, UserDirectory, UserRecord};
pub use principal::Principal;
pub use scope::Scope;
pub use settings::{ConfigError, TokenSettings};
pub use token::{
    RandomTokenIds, TokenIdGenerator, TokenIssueError, TokenService, TokenValidationError,
    VerifiedToken,
};
