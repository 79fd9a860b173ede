//! Auth session manager. Orchestrates sign-in/sign-up/sign-out, drives the
//! resolver on demand, and publishes the canonical identity plus loading
//! phase over a watch channel. The manager is the only writer of the
//! snapshot store; every other component reads the published state.
//!
//! Concurrent `refresh()` calls are last-write-wins: there is no generation
//! guard, so the last call to complete determines the published identity.

use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::api::{self, ApiClient};
use crate::errors::{AppError, AuthError};
use crate::session::identity::{Identity, Role};
use crate::session::resolver;
use crate::session::snapshot::SnapshotStore;

const USER_SIGNIN: &str = "/api/auth/signin";
const EMPLOYER_SIGNIN: &str = "/api/employers/auth/signin";
const ADMIN_SIGNIN: &str = "/api/admin/signin";
const SIGNUP: &str = "/auth/signup";
const USER_SIGNOUT: &str = "/auth/signout";
const EMPLOYER_SIGNOUT: &str = "/api/employers/auth/signout";
const ADMIN_SIGNOUT: &str = "/api/admin/signout";
const FORGOT: &str = "/api/auth/forgot";
const RESET_PASSWORD: &str = "/api/auth/reset-password";
const VERIFY_EMAIL: &str = "/api/auth/verify";

const SIGNIN_FALLBACK: &str = "Login failed. Please try again.";
const SIGNUP_FALLBACK: &str = "Signup failed. Please try again.";
const RESET_FALLBACK: &str = "Password reset failed. Please try again.";
const VERIFY_FALLBACK: &str = "Verification failed. Please try again.";

/// Where the manager is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Constructed; identity pre-populated from the snapshot, not yet
    /// confirmed against the backend.
    Initializing,
    /// A resolution cycle is in flight.
    Resolving,
    /// Resolution complete; identity is set or null.
    Idle,
}

/// Published auth state.
#[derive(Clone, Debug)]
pub struct AuthState {
    pub phase: Phase,
    pub identity: Option<Identity>,
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }
}

/// Sign-in credentials. The password stays wrapped until the request body
/// is serialized.
#[derive(Clone, Debug)]
pub struct Credentials {
    pub username_or_email: String,
    pub password: SecretString,
}

/// Backend acknowledgement of a sign-up request.
#[derive(Clone, Debug)]
pub struct SignupReceipt {
    pub ok: bool,
    pub message: String,
}

/// Result of a successful email verification.
#[derive(Clone, Debug)]
pub struct VerificationOutcome {
    pub message: String,
    pub identity: Option<Identity>,
}

pub struct SessionManager {
    api: ApiClient,
    store: SnapshotStore,
    state: watch::Sender<AuthState>,
}

impl SessionManager {
    /// Builds a manager, pre-populating identity from the snapshot so the
    /// application can render a likely-correct state before `refresh()`
    /// confirms it.
    pub fn new(api: ApiClient, store: SnapshotStore) -> Self {
        let identity = store.read();
        let (state, _) = watch::channel(AuthState {
            phase: Phase::Initializing,
            identity,
        });
        Self { api, store, state }
    }

    /// Subscribes to published auth state.
    pub fn watch(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    /// Snapshot of the currently published state.
    pub fn current(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Re-derives the canonical identity from the backend, caches it, and
    /// publishes it. Never fails; an exhausted probe chain publishes null.
    /// Partial results are never published mid-chain.
    pub async fn refresh(&self) {
        self.set_phase(Phase::Resolving);
        let identity = resolver::resolve(&self.api).await;
        self.store.write(identity.as_ref());
        self.publish(identity);
    }

    /// Re-reads the snapshot slot and publishes it, for contexts woken by
    /// [`SnapshotStore::changes`].
    pub fn sync_from_store(&self) {
        let identity = self.store.read();
        self.state.send_modify(|state| state.identity = identity);
    }

    /// Signs in a regular user.
    ///
    /// # Errors
    /// `Rejected` with a normalized message when the backend refuses;
    /// `SessionNotEstablished` when the call succeeds but no session is
    /// observable afterwards.
    pub async fn signin_user(&self, credentials: &Credentials) -> Result<Identity, AuthError> {
        debug!("signin user {}", credentials.username_or_email);
        self.signin(USER_SIGNIN, credentials).await
    }

    /// Signs in an employer account.
    ///
    /// # Errors
    /// Same contract as [`Self::signin_user`].
    pub async fn signin_employer(&self, credentials: &Credentials) -> Result<Identity, AuthError> {
        debug!("signin employer {}", credentials.username_or_email);
        self.signin(EMPLOYER_SIGNIN, credentials).await
    }

    /// Signs in an admin. The backend expects the admin username under the
    /// `usernameOrEmail` field, same as the other roles.
    ///
    /// # Errors
    /// Same contract as [`Self::signin_user`].
    pub async fn signin_admin(&self, credentials: &Credentials) -> Result<Identity, AuthError> {
        debug!("signin admin {}", credentials.username_or_email);
        self.signin(ADMIN_SIGNIN, credentials).await
    }

    async fn signin(&self, path: &str, credentials: &Credentials) -> Result<Identity, AuthError> {
        let body = json!({
            "usernameOrEmail": credentials.username_or_email,
            "password": credentials.password.expose_secret(),
        });
        if let Err(err) = self.api.post_json(path, &body).await {
            return Err(AuthError::Rejected(clean_message(&err, SIGNIN_FALLBACK)));
        }

        // Re-derive identity through the probe chain instead of trusting
        // the sign-in response body.
        self.refresh().await;

        match self.store.read() {
            Some(identity) => Ok(identity),
            None => Err(AuthError::SessionNotEstablished),
        }
    }

    /// Registers a new account. The created account is unverified, so this
    /// deliberately does not refresh: no session may exist until email
    /// verification completes.
    ///
    /// # Errors
    /// `Rejected` with a normalized message when the backend refuses.
    pub async fn signup(
        &self,
        name: &str,
        email: &str,
        password: &SecretString,
    ) -> Result<SignupReceipt, AuthError> {
        debug!("signup {email}");
        let body = json!({
            "name": name,
            "email": email,
            "password": password.expose_secret(),
        });
        match self.api.post_json(SIGNUP, &body).await {
            // A 2xx with no explicit flag still counts as accepted.
            Ok(value) => Ok(SignupReceipt {
                ok: value.get("ok").and_then(Value::as_bool).unwrap_or(true),
                message: message_or(&value, "Account created. Check your email to verify."),
            }),
            Err(err) => Err(AuthError::Rejected(clean_message(&err, SIGNUP_FALLBACK))),
        }
    }

    /// Signs out. The role-specific endpoint is tried first; if it fails,
    /// all three are attempted. Local state is cleared regardless, so
    /// sign-out succeeds client-side even when every backend call fails.
    pub async fn signout(&self) {
        self.set_phase(Phase::Resolving);
        let role = self.current().identity.map(|identity| identity.role);
        let primary = match role {
            Some(Role::Employer) => EMPLOYER_SIGNOUT,
            Some(Role::Admin) => ADMIN_SIGNOUT,
            _ => USER_SIGNOUT,
        };

        if let Err(err) = self.api.post_empty(primary).await {
            warn!("signout endpoint error (ignored): {err}");
            for path in [EMPLOYER_SIGNOUT, USER_SIGNOUT, ADMIN_SIGNOUT] {
                let _ = self.api.post_empty(path).await;
            }
        }

        self.store.clear();
        self.publish(None);
    }

    /// Requests a password-reset email.
    ///
    /// # Errors
    /// `Rejected` with a normalized message when the backend refuses.
    pub async fn forgot_password(&self, email: &str) -> Result<String, AuthError> {
        let body = json!({ "email": email });
        match self.api.post_json(FORGOT, &body).await {
            Ok(value) => Ok(message_or(
                &value,
                "If the address exists, a reset link has been sent.",
            )),
            Err(err) => Err(AuthError::Rejected(clean_message(&err, RESET_FALLBACK))),
        }
    }

    /// Checks whether a reset token is still valid. Any failure counts as
    /// invalid.
    pub async fn validate_reset_token(&self, token: &str) -> bool {
        self.api
            .get_json(&format!("/api/auth/verify-token/{token}"))
            .await
            .is_ok()
    }

    /// Sets a new password using a reset token.
    ///
    /// # Errors
    /// `Rejected` with a normalized message when the backend refuses.
    pub async fn reset_password(
        &self,
        token: &str,
        new_password: &SecretString,
    ) -> Result<String, AuthError> {
        let body = json!({
            "token": token,
            "newPassword": new_password.expose_secret(),
        });
        match self.api.post_json(RESET_PASSWORD, &body).await {
            Ok(value) => Ok(message_or(&value, "Password updated.")),
            Err(err) => Err(AuthError::Rejected(clean_message(&err, RESET_FALLBACK))),
        }
    }

    /// Verifies an email address. Success requires both the `ok` flag and a
    /// `user` payload; the now-valid session is then resolved and cached.
    ///
    /// # Errors
    /// `Rejected` with a normalized message when verification fails.
    pub async fn verify_email(&self, token: &str) -> Result<VerificationOutcome, AuthError> {
        let body = json!({ "token": token });
        match self.api.post_json(VERIFY_EMAIL, &body).await {
            Ok(value) => {
                let ok = value.get("ok").and_then(Value::as_bool).unwrap_or(false);
                let has_user = value.get("user").is_some_and(|user| !user.is_null());
                if !(ok && has_user) {
                    return Err(AuthError::Rejected(message_or(&value, VERIFY_FALLBACK)));
                }
                let message = message_or(&value, "Email verified successfully.");
                self.refresh().await;
                Ok(VerificationOutcome {
                    message,
                    identity: self.current().identity,
                })
            }
            Err(err) => Err(AuthError::Rejected(clean_message(&err, VERIFY_FALLBACK))),
        }
    }

    fn set_phase(&self, phase: Phase) {
        self.state.send_modify(|state| state.phase = phase);
    }

    fn publish(&self, identity: Option<Identity>) {
        self.state.send_replace(AuthState {
            phase: Phase::Idle,
            identity,
        });
    }
}

/// Normalizes a transport error into a single user-facing message: nested
/// JSON body message first, then the error's own text, then the fallback.
fn clean_message(err: &AppError, fallback: &str) -> String {
    let message = match err {
        AppError::Http { message, .. } => {
            api::body_message(message).unwrap_or_else(|| message.clone())
        }
        other => other.to_string(),
    };
    let trimmed = message.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

fn message_or(value: &Value, fallback: &str) -> String {
    value
        .get("message")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|message| !message.is_empty())
        .map_or_else(|| fallback.to_string(), ToString::to_string)
}
