//! In-memory state of the mock application
//!
//! Users, their contacts and live session tokens. The REST handlers and the
//! simulated page both go through these operations, so an account created in
//! the UI can be read back over the API and vice versa.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use contactlist_common::{Contact, User};
use parking_lot::RwLock;
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

/// Shortest password the application accepts
pub const MIN_PASSWORD_LEN: usize = 7;

pub type SharedStore = Arc<RwLock<Store>>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{0}")]
    Validation(String),

    #[error("Email address is already in use")]
    EmailInUse,

    #[error("Incorrect username or password")]
    BadCredentials,

    #[error("Please authenticate.")]
    Unauthorized,

    #[error("Invalid Contact ID")]
    InvalidId,

    #[error("Not found")]
    NotFound,
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone)]
struct StoredUser {
    id: String,
    first_name: String,
    last_name: String,
    email: String,
    password: String,
}

impl StoredUser {
    fn public(&self) -> User {
        User {
            id: self.id.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
        }
    }
}

/// Body of `POST /users` and `PATCH /users/me`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Body of `POST /contacts` and `PUT /contacts/:id`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birthdate: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub street1: Option<String>,
    pub street2: Option<String>,
    pub city: Option<String>,
    pub state_province: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Default)]
pub struct Store {
    users: HashMap<String, StoredUser>,
    /// Insertion order is the order the list endpoint returns
    contacts: Vec<Contact>,
    /// token -> user id
    sessions: HashMap<String, String>,
}

impl Store {
    pub fn shared() -> SharedStore {
        Arc::new(RwLock::new(Store::default()))
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn contact_count(&self) -> usize {
        self.contacts.len()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn register(&mut self, input: UserInput) -> StoreResult<(User, String)> {
        let first_name = required("User", "firstName", input.first_name)?;
        let last_name = required("User", "lastName", input.last_name)?;
        let email = required("User", "email", input.email)?.to_lowercase();
        let password = required("User", "password", input.password)?;

        if !is_valid_email(&email) {
            return Err(StoreError::Validation(
                "User validation failed: email: Email is invalid".into(),
            ));
        }
        check_password(&password)?;
        if self.users.values().any(|u| u.email == email) {
            return Err(StoreError::EmailInUse);
        }

        let user = StoredUser {
            id: object_id(),
            first_name,
            last_name,
            email,
            password,
        };
        let public = user.public();
        self.users.insert(user.id.clone(), user);
        let token = self.open_session(&public.id);
        Ok((public, token))
    }

    pub fn login(&mut self, email: &str, password: &str) -> StoreResult<(User, String)> {
        let email = email.trim().to_lowercase();
        let user = self
            .users
            .values()
            .find(|u| u.email == email && u.password == password)
            .map(StoredUser::public)
            .ok_or(StoreError::BadCredentials)?;
        let token = self.open_session(&user.id);
        Ok((user, token))
    }

    /// Resolve a token to its user id
    pub fn authenticate(&self, token: &str) -> StoreResult<String> {
        self.sessions
            .get(token)
            .filter(|id| self.users.contains_key(*id))
            .cloned()
            .ok_or(StoreError::Unauthorized)
    }

    pub fn logout(&mut self, token: &str) -> StoreResult<()> {
        self.sessions
            .remove(token)
            .map(|_| ())
            .ok_or(StoreError::Unauthorized)
    }

    pub fn user(&self, user_id: &str) -> StoreResult<User> {
        self.users
            .get(user_id)
            .map(StoredUser::public)
            .ok_or(StoreError::Unauthorized)
    }

    pub fn update_user(&mut self, user_id: &str, input: UserInput) -> StoreResult<User> {
        if let Some(email) = &input.email {
            let email = email.trim().to_lowercase();
            if !is_valid_email(&email) {
                return Err(StoreError::Validation(
                    "User validation failed: email: Email is invalid".into(),
                ));
            }
            if self.users.values().any(|u| u.email == email && u.id != user_id) {
                return Err(StoreError::EmailInUse);
            }
        }
        if let Some(password) = &input.password {
            check_password(password)?;
        }

        let user = self.users.get_mut(user_id).ok_or(StoreError::Unauthorized)?;
        if let Some(v) = input.first_name.filter(|v| !v.trim().is_empty()) {
            user.first_name = v;
        }
        if let Some(v) = input.last_name.filter(|v| !v.trim().is_empty()) {
            user.last_name = v;
        }
        if let Some(v) = input.email {
            user.email = v.trim().to_lowercase();
        }
        if let Some(v) = input.password {
            user.password = v;
        }
        Ok(user.public())
    }

    /// Remove a user together with their contacts and sessions
    pub fn delete_user(&mut self, user_id: &str) -> StoreResult<()> {
        self.users.remove(user_id).ok_or(StoreError::Unauthorized)?;
        self.contacts.retain(|c| c.owner != user_id);
        self.sessions.retain(|_, owner| owner != user_id);
        Ok(())
    }

    pub fn create_contact(&mut self, owner: &str, input: ContactInput) -> StoreResult<Contact> {
        let contact = build_contact(object_id(), owner, input)?;
        self.contacts.push(contact.clone());
        Ok(contact)
    }

    pub fn list_contacts(&self, owner: &str) -> Vec<Contact> {
        self.contacts
            .iter()
            .filter(|c| c.owner == owner)
            .cloned()
            .collect()
    }

    /// Contacts owned by someone else are reported as missing, not forbidden
    pub fn contact(&self, owner: &str, id: &str) -> StoreResult<Contact> {
        check_object_id(id)?;
        self.contacts
            .iter()
            .find(|c| c.id == id && c.owner == owner)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    pub fn replace_contact(
        &mut self,
        owner: &str,
        id: &str,
        input: ContactInput,
    ) -> StoreResult<Contact> {
        check_object_id(id)?;
        let slot = self
            .contacts
            .iter_mut()
            .find(|c| c.id == id && c.owner == owner)
            .ok_or(StoreError::NotFound)?;
        let updated = build_contact(id.to_string(), owner, input)?;
        *slot = updated.clone();
        Ok(updated)
    }

    pub fn delete_contact(&mut self, owner: &str, id: &str) -> StoreResult<()> {
        check_object_id(id)?;
        let before = self.contacts.len();
        self.contacts.retain(|c| !(c.id == id && c.owner == owner));
        if self.contacts.len() == before {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    fn open_session(&mut self, user_id: &str) -> String {
        let token = format!("mock.{}", Uuid::new_v4().simple());
        self.sessions.insert(token.clone(), user_id.to_string());
        token
    }
}

fn build_contact(id: String, owner: &str, input: ContactInput) -> StoreResult<Contact> {
    let first_name = required("Contact", "firstName", input.first_name)?;
    let last_name = required("Contact", "lastName", input.last_name)?;

    let birthdate = match non_empty(input.birthdate) {
        Some(raw) => Some(NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|_| {
            StoreError::Validation("Contact validation failed: birthdate: Birthdate is invalid".into())
        })?),
        None => None,
    };
    let email = non_empty(input.email);
    if let Some(email) = &email {
        if !is_valid_email(email) {
            return Err(StoreError::Validation(
                "Contact validation failed: email: Email is invalid".into(),
            ));
        }
    }

    Ok(Contact {
        id,
        first_name,
        last_name,
        birthdate,
        email,
        phone: non_empty(input.phone),
        street1: non_empty(input.street1),
        street2: non_empty(input.street2),
        city: non_empty(input.city),
        state_province: non_empty(input.state_province),
        postal_code: non_empty(input.postal_code),
        country: non_empty(input.country),
        owner: owner.to_string(),
    })
}

fn required(model: &str, field: &str, value: Option<String>) -> StoreResult<String> {
    non_empty(value).ok_or_else(|| {
        StoreError::Validation(format!(
            "{} validation failed: {}: Path `{}` is required.",
            model, field, field
        ))
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn check_password(password: &str) -> StoreResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(StoreError::Validation(format!(
            "User validation failed: password: Path `password` is shorter than the minimum allowed length ({}).",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain
            .split_once('.')
            .map(|(host, tld)| !host.is_empty() && !tld.is_empty())
            .unwrap_or(false)
}

fn check_object_id(id: &str) -> StoreResult<()> {
    if id.len() == 24 && id.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(())
    } else {
        Err(StoreError::InvalidId)
    }
}

fn object_id() -> String {
    Uuid::new_v4().simple().to_string()[..24].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_input(email: &str) -> UserInput {
        UserInput {
            first_name: Some("Test".into()),
            last_name: Some("User".into()),
            email: Some(email.into()),
            password: Some("MySecurePassword123!".into()),
        }
    }

    fn contact_input(first: &str, last: &str) -> ContactInput {
        ContactInput {
            first_name: Some(first.into()),
            last_name: Some(last.into()),
            ..Default::default()
        }
    }

    #[test]
    fn register_then_authenticate() {
        let mut store = Store::default();
        let (user, token) = store.register(user_input("a@example.com")).unwrap();
        assert_eq!(store.authenticate(&token).unwrap(), user.id);
        assert_eq!(user.id.len(), 24);
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let mut store = Store::default();
        store.register(user_input("dup@example.com")).unwrap();
        let err = store.register(user_input("DUP@example.com")).unwrap_err();
        assert_eq!(err, StoreError::EmailInUse);
    }

    #[test]
    fn short_password_and_bad_email_are_validation_errors() {
        let mut store = Store::default();
        let mut input = user_input("p@example.com");
        input.password = Some("123".into());
        assert!(matches!(store.register(input), Err(StoreError::Validation(_))));
        assert!(matches!(
            store.register(user_input("invalid-email-format")),
            Err(StoreError::Validation(_))
        ));
    }

    #[test]
    fn logout_invalidates_only_that_token() {
        let mut store = Store::default();
        let (_, first) = store.register(user_input("l@example.com")).unwrap();
        let (_, second) = store.login("l@example.com", "MySecurePassword123!").unwrap();
        assert_eq!(store.session_count(), 2);
        store.logout(&first).unwrap();
        assert_eq!(store.session_count(), 1);
        assert_eq!(store.authenticate(&first), Err(StoreError::Unauthorized));
        assert!(store.authenticate(&second).is_ok());
    }

    #[test]
    fn contacts_are_scoped_to_owner() {
        let mut store = Store::default();
        let (alice, _) = store.register(user_input("alice@example.com")).unwrap();
        let (bob, _) = store.register(user_input("bob@example.com")).unwrap();
        let contact = store.create_contact(&alice.id, contact_input("Jane", "Smith")).unwrap();

        assert!(store.contact(&alice.id, &contact.id).is_ok());
        assert_eq!(store.contact(&bob.id, &contact.id), Err(StoreError::NotFound));
        assert_eq!(
            store.delete_contact(&bob.id, &contact.id),
            Err(StoreError::NotFound)
        );
        assert!(store.list_contacts(&bob.id).is_empty());
    }

    #[test]
    fn contact_requires_both_names() {
        let mut store = Store::default();
        let err = store
            .create_contact("owner", contact_input("", "Smith"))
            .unwrap_err();
        assert!(err.to_string().contains("firstName"));
    }

    #[test]
    fn malformed_id_differs_from_missing_id() {
        let store = Store::default();
        assert_eq!(store.contact("o", "abc"), Err(StoreError::InvalidId));
        assert_eq!(
            store.contact("o", "507f1f77bcf86cd799439011"),
            Err(StoreError::NotFound)
        );
    }

    #[test]
    fn deleting_user_drops_contacts_and_sessions() {
        let mut store = Store::default();
        let (user, token) = store.register(user_input("gone@example.com")).unwrap();
        store.create_contact(&user.id, contact_input("A", "B")).unwrap();
        store.delete_user(&user.id).unwrap();
        assert_eq!(store.contact_count(), 0);
        assert_eq!(store.authenticate(&token), Err(StoreError::Unauthorized));
    }
}
