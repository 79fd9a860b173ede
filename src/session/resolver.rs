//! Ordered identity probes. Admin and employer sessions are rarer and use
//! distinct cookies, so the chain checks them before the generic user
//! endpoint; a generic session must never mask an admin or employer one.
//! The chain short-circuits on the first payload a mapper accepts, and it
//! never errors: a failed or rejected probe just means "not this role".

use serde_json::Value;
use tracing::debug;

use crate::api::ApiClient;
use crate::session::identity::{self, Identity, Role};

pub(crate) struct Probe {
    pub role: Role,
    pub path: &'static str,
    pub map: fn(&Value) -> Option<Identity>,
}

pub(crate) const PROBES: [Probe; 3] = [
    Probe {
        role: Role::Admin,
        path: "/api/admin/me",
        map: identity::map_admin,
    },
    Probe {
        role: Role::Employer,
        path: "/api/employers/auth/me",
        map: identity::map_employer,
    },
    Probe {
        role: Role::User,
        path: "/auth/me",
        map: identity::map_user,
    },
];

/// Resolves the current identity, or `None` when no role has a session.
/// Probes run strictly sequentially; mixing concurrent probes over a shared
/// cookie jar could let a fast generic probe win over a slower admin one.
pub async fn resolve(api: &ApiClient) -> Option<Identity> {
    for probe in &PROBES {
        match api.get_optional_json(probe.path).await {
            Ok(Some(body)) => {
                if let Some(identity) = (probe.map)(&body) {
                    debug!(role = %probe.role, id = %identity.id, "session resolved");
                    return Some(identity);
                }
                debug!(role = %probe.role, "payload rejected, continuing probe chain");
            }
            Ok(None) => debug!(role = %probe.role, "no session for role"),
            Err(err) => debug!(role = %probe.role, "probe failed (ok to continue): {err}"),
        }
    }

    debug!("no valid session found");
    None
}
