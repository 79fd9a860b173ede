//! Canonical identity records and the role-specific payload mappers. Each
//! mapper validates that the payload's role matches the probing endpoint's
//! expected role; a mismatch is a rejection, never a coercion. Required
//! fields missing from the payload also reject the candidate.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Mutually exclusive account category; drives endpoint selection and
/// downstream routing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Employer,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Employer => "employer",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "user" => Ok(Role::User),
            "employer" => Ok(Role::Employer),
            "admin" => Ok(Role::Admin),
            other => Err(format!("invalid role: {other}")),
        }
    }
}

/// Employer summary attached to employer-role identities.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployerRef {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// Normalized session descriptor produced by the resolver. `employer` is
/// populated only for employer identities, `username` only for admins.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    pub name: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cv_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employer: Option<EmployerRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// Unwraps common envelope shapes: a `data` field, a `user` field, or the
/// raw body itself.
pub(crate) fn extract_payload(value: &Value) -> Option<&Value> {
    if value.is_null() {
        return None;
    }
    let inner = value
        .get("data")
        .or_else(|| value.get("user"))
        .unwrap_or(value);
    if inner.is_null() {
        None
    } else {
        Some(inner)
    }
}

fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str)
}

fn owned_field(value: &Value, key: &str) -> Option<String> {
    str_field(value, key).map(ToString::to_string)
}

/// Reads an identifier field, tolerating numeric ids from older backends.
fn id_field(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(id) if !id.trim().is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

fn trimmed(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(ToString::to_string)
}

/// Substring before `@`; values without `@` pass through unchanged.
fn email_local_part(email: Option<&str>) -> Option<String> {
    let email = email?;
    let prefix = match email.split_once('@') {
        Some((prefix, _)) => prefix,
        None => email,
    };
    trimmed(Some(prefix))
}

fn name_for_employer(raw: &Value) -> String {
    trimmed(str_field(raw, "displayName"))
        .or_else(|| email_local_part(str_field(raw, "email")))
        .unwrap_or_else(|| "Company".to_string())
}

fn name_for_user(raw: &Value) -> String {
    trimmed(str_field(raw, "name"))
        .or_else(|| email_local_part(str_field(raw, "email")))
        .unwrap_or_else(|| "User".to_string())
}

fn name_for_admin(raw: &Value) -> String {
    trimmed(str_field(raw, "username")).unwrap_or_else(|| "Admin".to_string())
}

/// A missing role field defaults to the expected role; a present one must
/// match it case-insensitively.
fn role_matches(raw: &Value, expected: Role) -> bool {
    str_field(raw, "role")
        .unwrap_or_else(|| expected.as_str())
        .eq_ignore_ascii_case(expected.as_str())
}

pub(crate) fn map_admin(value: &Value) -> Option<Identity> {
    let raw = extract_payload(value)?;
    if !role_matches(raw, Role::Admin) {
        return None;
    }
    let id = id_field(raw, "id")?;
    let username = trimmed(str_field(raw, "username"));
    let email = username
        .as_deref()
        .map(|username| format!("{username}@local"))
        .or_else(|| owned_field(raw, "email"));

    Some(Identity {
        id,
        email,
        name: name_for_admin(raw),
        role: Role::Admin,
        photo_url: None,
        cv_url: None,
        employer: None,
        username,
    })
}

pub(crate) fn map_employer(value: &Value) -> Option<Identity> {
    let raw = extract_payload(value)?;
    if !role_matches(raw, Role::Employer) {
        return None;
    }
    let id = id_field(raw, "id")
        .or_else(|| id_field(raw, "adminId"))
        .or_else(|| raw.get("admin").and_then(|admin| id_field(admin, "id")))
        .or_else(|| owned_field(raw, "email"))?;

    let employer = raw
        .get("employer")
        .filter(|employer| employer.is_object())
        .and_then(|employer| {
            id_field(employer, "id").map(|employer_id| EmployerRef {
                id: employer_id,
                slug: owned_field(employer, "slug"),
                display_name: owned_field(employer, "displayName"),
            })
        })
        .or_else(|| {
            id_field(raw, "employerId").map(|employer_id| EmployerRef {
                id: employer_id,
                slug: None,
                display_name: owned_field(raw, "displayName"),
            })
        });

    Some(Identity {
        id,
        email: owned_field(raw, "email"),
        name: name_for_employer(raw),
        role: Role::Employer,
        photo_url: None,
        cv_url: None,
        employer,
        username: None,
    })
}

pub(crate) fn map_user(value: &Value) -> Option<Identity> {
    let raw = extract_payload(value)?;
    if !role_matches(raw, Role::User) {
        return None;
    }
    let id = id_field(raw, "id")?;

    Some(Identity {
        id,
        email: owned_field(raw, "email"),
        name: name_for_user(raw),
        role: Role::User,
        photo_url: owned_field(raw, "photoUrl"),
        cv_url: owned_field(raw, "cvUrl"),
        employer: None,
        username: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn admin_role_matches_case_insensitively() {
        let identity = map_admin(&json!({"role": "ADMIN", "id": "a1", "username": "root"}))
            .expect("admin identity");
        assert_eq!(identity.id, "a1");
        assert_eq!(identity.role, Role::Admin);
        assert_eq!(identity.name, "root");
        assert_eq!(identity.username.as_deref(), Some("root"));
        assert_eq!(identity.email.as_deref(), Some("root@local"));
    }

    #[test]
    fn admin_without_username_uses_fallback_name() {
        let identity =
            map_admin(&json!({"id": "a2", "email": "ops@arkwork.dev"})).expect("admin identity");
        assert_eq!(identity.name, "Admin");
        assert_eq!(identity.email.as_deref(), Some("ops@arkwork.dev"));
    }

    #[test]
    fn admin_requires_id() {
        assert!(map_admin(&json!({"role": "admin", "username": "root"})).is_none());
    }

    #[test]
    fn employer_unwraps_envelope_and_falls_back_to_email_local_part() {
        let payload = json!({
            "data": {"role": "employer", "employerId": "e9", "displayName": "", "email": "corp@x.com"}
        });
        let identity = map_employer(&payload).expect("employer identity");
        assert_eq!(identity.role, Role::Employer);
        assert_eq!(identity.name, "corp");
        let employer = identity.employer.expect("employer ref");
        assert_eq!(employer.id, "e9");
    }

    #[test]
    fn employer_nested_object_is_preferred() {
        let payload = json!({
            "id": "u7",
            "role": "employer",
            "displayName": "Acme Drilling",
            "employer": {"id": "e1", "slug": "acme", "displayName": "Acme Drilling"}
        });
        let identity = map_employer(&payload).expect("employer identity");
        assert_eq!(identity.id, "u7");
        assert_eq!(identity.name, "Acme Drilling");
        let employer = identity.employer.expect("employer ref");
        assert_eq!(employer.slug.as_deref(), Some("acme"));
    }

    #[test]
    fn employer_rejects_role_mismatch() {
        assert!(map_employer(&json!({"role": "user", "id": "u1"})).is_none());
    }

    #[test]
    fn user_unwraps_user_envelope() {
        let payload = json!({"user": {"role": "user", "id": "u1", "email": "jane@x.com"}});
        let identity = map_user(&payload).expect("user identity");
        assert_eq!(identity.id, "u1");
        assert_eq!(identity.name, "jane");
    }

    #[test]
    fn user_missing_role_defaults_to_expected() {
        let identity = map_user(&json!({"id": "u2"})).expect("user identity");
        assert_eq!(identity.role, Role::User);
        assert_eq!(identity.name, "User");
    }

    #[test]
    fn user_requires_id() {
        assert!(map_user(&json!({"role": "user", "email": "jane@x.com"})).is_none());
    }

    #[test]
    fn user_carries_profile_urls() {
        let payload = json!({
            "role": "user",
            "id": "u3",
            "name": "Jane",
            "photoUrl": "https://cdn/x.png",
            "cvUrl": "https://cdn/cv.pdf"
        });
        let identity = map_user(&payload).expect("user identity");
        assert_eq!(identity.photo_url.as_deref(), Some("https://cdn/x.png"));
        assert_eq!(identity.cv_url.as_deref(), Some("https://cdn/cv.pdf"));
    }

    #[test]
    fn null_payloads_are_rejected() {
        assert!(map_user(&Value::Null).is_none());
        assert!(map_admin(&json!({"data": null})).is_none());
    }

    #[test]
    fn identity_round_trips_through_json() {
        let identity = Identity {
            id: "u1".to_string(),
            email: Some("jane@x.com".to_string()),
            name: "jane".to_string(),
            role: Role::User,
            photo_url: None,
            cv_url: None,
            employer: None,
            username: None,
        };
        let encoded = serde_json::to_string(&identity).expect("encode");
        assert!(encoded.contains(r#""role":"user""#));
        let decoded: Identity = serde_json::from_str(&encoded).expect("decode");
        assert_eq!(decoded, identity);
    }
}
