//! Provider payload types.

use serde::{Deserialize, Serialize};

/// Username/password pair submitted for authentication. Transient:
/// passed through to the provider and discarded, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// One provider-defined profile attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeEntry {
    pub name: String,
    pub value: String,
}

impl AttributeEntry {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Account record returned by a successful registration.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisteredAccount {
    /// User ID assigned by the provider
    pub user_id: String,
    /// Email the account was registered with
    #[serde(default)]
    pub email: Option<String>,
}

/// Token bundle issued by authentication or refresh.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    pub refresh_token: String,
    /// Token lifetime in seconds
    pub expires_in: i64,
    pub user: GrantUser,
}

/// User identity attached to a token grant.
#[derive(Debug, Clone, Deserialize)]
pub struct GrantUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_grant_deserialization() {
        let json = r#"{
            "access_token": "at-1",
            "refresh_token": "rt-1",
            "expires_in": 3600,
            "user": {"id": "user-1", "email": "a@x.com"}
        }"#;

        let grant: TokenGrant = serde_json::from_str(json).unwrap();
        assert_eq!(grant.access_token, "at-1");
        assert_eq!(grant.expires_in, 3600);
        assert_eq!(grant.user.id, "user-1");
        assert_eq!(grant.user.email.as_deref(), Some("a@x.com"));
    }

    #[test]
    fn test_grant_user_email_optional() {
        let json = r#"{"id": "user-2"}"#;
        let user: GrantUser = serde_json::from_str(json).unwrap();
        assert!(user.email.is_none());
    }

    #[test]
    fn test_attribute_entry_serialization() {
        let entry = AttributeEntry::new("email", "a@x.com");
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains(r#""name":"email""#));
        assert!(json.contains(r#""value":"a@x.com""#));
    }
}
