//! `securefile-core`: shared primitives for the SecureFile services.
//!
//! This crate contains **pure** building blocks (no infrastructure concerns).

pub mod clock;
pub mod error;
pub mod id;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{DomainError, DomainResult};
pub use id::{ResourceId, UserId};
