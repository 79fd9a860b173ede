//! Session and identity resolution client for the ArkWork job platform.
//!
//! The crate answers "who am I" by probing three role-specific endpoints in
//! a fixed order (admin, employer, user), normalizing the winning payload
//! into a canonical [`session::Identity`], and caching it in a time-boxed
//! snapshot slot. Every request is routed through a declarative rewrite
//! table so call sites use stable paths regardless of backend deployment.

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod routes;
pub mod session;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
