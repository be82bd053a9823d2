//! Fixture generation for users and contacts
//!
//! Every generated email combines the wall clock, a process-wide monotonic
//! counter and a random UUID fragment. The counter alone makes two emails
//! from the same process differ; the other parts keep separate runs against
//! a shared remote database apart.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{NaiveDate, Utc};
use rand::Rng;
use uuid::Uuid;

use crate::types::{ContactFixture, UserFixture};

/// Domain used for every generated address
pub const EMAIL_DOMAIN: &str = "example.com";

/// Password that satisfies the application's length policy
pub const DEFAULT_PASSWORD: &str = "MySecurePassword123!";

/// Well-formed ObjectId that no contact will ever have
pub const NONEXISTENT_CONTACT_ID: &str = "507f1f77bcf86cd799439011";

/// Bearer value the application must reject
pub const INVALID_TOKEN: &str = "invalid-token";

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Field-by-field overrides merged over a generated user
#[derive(Debug, Clone, Default)]
pub struct UserOverrides {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Field-by-field overrides merged over a generated contact
#[derive(Debug, Clone, Default)]
pub struct ContactOverrides {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub street1: Option<String>,
    pub street2: Option<String>,
    pub city: Option<String>,
    pub state_province: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

/// Produces collision-free fixtures.
///
/// The prefix lets a suite tag its accounts (`api.test`, `ui.test`, ...) so
/// leftovers on the shared remote can be traced back to their origin.
#[derive(Debug, Clone)]
pub struct FixtureGenerator {
    prefix: String,
}

impl Default for FixtureGenerator {
    fn default() -> Self {
        Self::new("test.user")
    }
}

impl FixtureGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// A fresh unique email address
    pub fn unique_email(&self) -> String {
        unique_email_with(&self.prefix)
    }

    pub fn generate_user(&self) -> UserFixture {
        self.generate_user_with(UserOverrides::default())
    }

    pub fn generate_user_with(&self, overrides: UserOverrides) -> UserFixture {
        UserFixture {
            first_name: overrides.first_name.unwrap_or_else(|| "Test".to_string()),
            last_name: overrides.last_name.unwrap_or_else(|| "User".to_string()),
            email: overrides.email.unwrap_or_else(|| self.unique_email()),
            password: overrides
                .password
                .unwrap_or_else(|| DEFAULT_PASSWORD.to_string()),
        }
    }

    /// A contact with every optional field populated
    pub fn generate_contact(&self) -> ContactFixture {
        self.generate_contact_with(ContactOverrides::default())
    }

    pub fn generate_contact_with(&self, o: ContactOverrides) -> ContactFixture {
        ContactFixture {
            first_name: o.first_name.unwrap_or_else(|| "John".to_string()),
            last_name: o.last_name.unwrap_or_else(|| "Doe".to_string()),
            birthdate: o.birthdate.or_else(|| NaiveDate::from_ymd_opt(1990, 5, 15)),
            email: Some(o.email.unwrap_or_else(|| unique_email_with("john.doe"))),
            phone: Some(o.phone.unwrap_or_else(|| "8005555555".to_string())),
            street1: Some(o.street1.unwrap_or_else(|| "123 Main St.".to_string())),
            street2: Some(o.street2.unwrap_or_else(|| "Apartment A".to_string())),
            city: Some(o.city.unwrap_or_else(|| "Anytown".to_string())),
            state_province: Some(o.state_province.unwrap_or_else(|| "KS".to_string())),
            postal_code: Some(o.postal_code.unwrap_or_else(|| "12345".to_string())),
            country: Some(o.country.unwrap_or_else(|| "USA".to_string())),
        }
    }
}

fn unique_email_with(prefix: &str) -> String {
    let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    let millis = Utc::now().timestamp_millis();
    let nonce = Uuid::new_v4().simple().to_string();
    format!("{}.{}.{}.{}@{}", prefix, millis, seq, &nonce[..8], EMAIL_DOMAIN)
}

/// Phone number of the requested length, digits only
pub fn random_phone(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn emails_never_collide_within_a_process() {
        let generator = FixtureGenerator::default();
        let emails: HashSet<String> = (0..10_000)
            .map(|_| generator.generate_user().email)
            .collect();
        assert_eq!(emails.len(), 10_000);
    }

    #[test]
    fn emails_stay_unique_across_threads() {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                std::thread::spawn(|| {
                    let generator = FixtureGenerator::new("thread");
                    (0..500).map(|_| generator.unique_email()).collect::<Vec<_>>()
                })
            })
            .collect();

        let mut all = HashSet::new();
        for handle in handles {
            for email in handle.join().unwrap() {
                assert!(all.insert(email), "duplicate email generated");
            }
        }
        assert_eq!(all.len(), 4_000);
    }

    #[test]
    fn generated_email_is_well_formed() {
        let email = FixtureGenerator::new("api.test").unique_email();
        assert!(email.starts_with("api.test."));
        assert!(email.ends_with("@example.com"));
        assert_eq!(email.matches('@').count(), 1);
    }

    #[test]
    fn overrides_replace_only_given_fields() {
        let generator = FixtureGenerator::default();
        let user = generator.generate_user_with(UserOverrides {
            password: Some("123".into()),
            ..Default::default()
        });
        assert_eq!(user.password, "123");
        assert_eq!(user.first_name, "Test");
        assert!(user.email.ends_with("@example.com"));
    }

    #[test]
    fn generated_contact_is_valid_and_complete() {
        let contact = FixtureGenerator::default().generate_contact();
        contact.validate().unwrap();
        assert_eq!(contact.full_name(), "John Doe");
        assert_eq!(contact.birthdate_str().as_deref(), Some("1990-05-15"));
        assert!(contact.country.is_some());
        assert!(contact.email.as_deref().unwrap().starts_with("john.doe."));
    }

    #[test]
    fn random_phone_has_requested_digits() {
        let phone = random_phone(10);
        assert_eq!(phone.len(), 10);
        assert!(phone.chars().all(|c| c.is_ascii_digit()));
    }
}
