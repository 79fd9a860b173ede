//! Session subsystem: identity records and mappers, the ordered probe
//! resolver, the time-boxed snapshot store, and the session manager that
//! ties them together.
//!
//! Flow overview: UI actions call the [`SessionManager`], which drives
//! [`resolver::resolve`] through the rewrite table; a resolved identity is
//! written to the [`SnapshotStore`] and published over a watch channel.
//! Application start reads the snapshot to pre-populate state before the
//! first refresh confirms it against the backend.

pub mod identity;
pub mod manager;
pub mod resolver;
pub mod snapshot;

pub use identity::{EmployerRef, Identity, Role};
pub use manager::{AuthState, Credentials, Phase, SessionManager, SignupReceipt, VerificationOutcome};
pub use snapshot::{SnapshotStore, SNAPSHOT_TTL};
