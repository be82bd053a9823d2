//! Data model for the Contact List application
//!
//! Fixtures are what the harness sends; `User` and `Contact` are what the
//! application stores and returns. Field names on the wire are camelCase and
//! identifiers are MongoDB-style `_id` strings.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{E2eError, E2eResult};

/// A user account to register with the application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFixture {
    pub first_name: String,
    pub last_name: String,
    /// Unique for the lifetime of the remote account
    pub email: String,
    /// Length policy is enforced by the application, not here
    pub password: String,
}

impl UserFixture {
    pub fn credentials(&self) -> Credentials {
        Credentials {
            email: self.email.clone(),
            password: self.password.clone(),
        }
    }
}

/// Body of `POST /users/login`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// A contact to create. Only the two names are required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactFixture {
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthdate: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_province: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl ContactFixture {
    /// A contact carrying only the required names
    pub fn named(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> E2eResult<()> {
        if self.first_name.trim().is_empty() {
            return Err(E2eError::InvalidFixture("contact firstName is empty".into()));
        }
        if self.last_name.trim().is_empty() {
            return Err(E2eError::InvalidFixture("contact lastName is empty".into()));
        }
        Ok(())
    }

    /// Name as rendered in the contact table
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// `birthdate` in the `YYYY-MM-DD` form the forms and API use
    pub fn birthdate_str(&self) -> Option<String> {
        self.birthdate.map(|d| d.format("%Y-%m-%d").to_string())
    }
}

/// Opaque bearer credential returned by register and login.
///
/// `Debug` is redacted so tokens never end up in logs.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value for the `Authorization` header
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SessionToken(<{} bytes>)", self.0.len())
    }
}

/// A user as returned by the application (never includes the password)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Body of a successful register or login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthPayload {
    pub user: User,
    pub token: SessionToken,
}

/// Body of `PATCH /users/me`; absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// A contact as stored by the application, scoped to its owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    #[serde(rename = "_id")]
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthdate: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_province: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Id of the owning user
    pub owner: String,
}

impl Contact {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Names of the fields where this record disagrees with `fixture`.
    ///
    /// Optional fields the fixture leaves unset are not compared.
    pub fn mismatches(&self, fixture: &ContactFixture) -> Vec<&'static str> {
        let mut out = Vec::new();
        if self.first_name != fixture.first_name {
            out.push("firstName");
        }
        if self.last_name != fixture.last_name {
            out.push("lastName");
        }
        if fixture.birthdate.is_some() && self.birthdate != fixture.birthdate {
            out.push("birthdate");
        }

        let optional = [
            ("email", &self.email, &fixture.email),
            ("phone", &self.phone, &fixture.phone),
            ("street1", &self.street1, &fixture.street1),
            ("street2", &self.street2, &fixture.street2),
            ("city", &self.city, &fixture.city),
            ("stateProvince", &self.state_province, &fixture.state_province),
            ("postalCode", &self.postal_code, &fixture.postal_code),
            ("country", &self.country, &fixture.country),
        ];
        for (name, stored, sent) in optional {
            if sent.is_some() && stored != sent {
                out.push(name);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contact_fixture_serializes_camel_case_and_skips_unset() {
        let mut contact = ContactFixture::named("Jane", "Smith");
        contact.state_province = Some("KS".into());
        let json = serde_json::to_value(&contact).unwrap();

        assert_eq!(json["firstName"], "Jane");
        assert_eq!(json["stateProvince"], "KS");
        assert!(json.get("phone").is_none());
        assert!(json.get("birthdate").is_none());
    }

    #[test]
    fn birthdate_uses_iso_dates() {
        let contact = ContactFixture {
            birthdate: NaiveDate::from_ymd_opt(1990, 5, 15),
            ..ContactFixture::named("John", "Doe")
        };
        let json = serde_json::to_value(&contact).unwrap();
        assert_eq!(json["birthdate"], "1990-05-15");
        assert_eq!(contact.birthdate_str().as_deref(), Some("1990-05-15"));
    }

    #[test]
    fn validate_rejects_blank_names() {
        assert!(ContactFixture::named("", "Doe").validate().is_err());
        assert!(ContactFixture::named("John", "  ").validate().is_err());
        assert!(ContactFixture::named("John", "Doe").validate().is_ok());
    }

    #[test]
    fn session_token_debug_is_redacted() {
        let token = SessionToken::new("eyJhbGciOiJIUzI1NiJ9.secret");
        let shown = format!("{:?}", token);
        assert!(!shown.contains("secret"));
        assert_eq!(token.bearer(), "Bearer eyJhbGciOiJIUzI1NiJ9.secret");
    }

    #[test]
    fn contact_parses_server_shape() {
        let body = serde_json::json!({
            "_id": "6650f0c2a1b2c3d4e5f60718",
            "firstName": "John",
            "lastName": "Doe",
            "birthdate": "1990-05-15",
            "phone": "8005555555",
            "owner": "6650f0c2a1b2c3d4e5f60700",
            "__v": 0
        });
        let contact: Contact = serde_json::from_value(body).unwrap();
        assert_eq!(contact.full_name(), "John Doe");
        assert_eq!(contact.owner, "6650f0c2a1b2c3d4e5f60700");

        let mut fixture = ContactFixture::named("John", "Doe");
        fixture.phone = Some("8005555555".into());
        fixture.birthdate = NaiveDate::from_ymd_opt(1990, 5, 15);
        assert!(contact.mismatches(&fixture).is_empty());

        fixture.phone = Some("5551234567".into());
        assert_eq!(contact.mismatches(&fixture), vec!["phone"]);
    }

    #[test]
    fn user_has_no_password_field() {
        let user = User {
            id: "abc".into(),
            first_name: "Test".into(),
            last_name: "User".into(),
            email: "t@example.com".into(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["_id"], "abc");
    }
}
