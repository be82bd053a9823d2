//! REST API scenarios: users, contacts, authorization and ownership

use async_trait::async_trait;
use contactlist_common::fixtures::{
    random_phone, UserOverrides, INVALID_TOKEN, NONEXISTENT_CONTACT_ID,
};
use contactlist_common::selectors::text;
use contactlist_common::{
    Contact, ContactFixture, Credentials, E2eError, E2eResult, SessionToken, UserUpdate,
};
use reqwest::Method;
use serde_json::{json, Value};

use crate::check;
use crate::client::Endpoint;
use crate::runner::{Scenario, ScenarioContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiCase {
    RegisterValid,
    RegisterInvalidEmail,
    RegisterDuplicateEmail,
    RegisterShortPassword,
    LoginValid,
    LoginUnknownEmail,
    LoginWrongPassword,
    ProfileValid,
    ProfileWithoutToken,
    ProfileInvalidToken,
    UpdateFirstName,
    UpdateMultipleFields,
    UpdateWithoutToken,
    LogoutValid,
    LogoutWithoutToken,
    DeleteAccount,
    DeleteAccountWithoutToken,
    CreateContactAllFields,
    CreateContactRequiredOnly,
    CreateContactMissingFirstName,
    CreateContactWithoutToken,
    ListContacts,
    ListContactsWithoutToken,
    GetContactRoundTrip,
    GetContactNotFound,
    GetContactWithoutToken,
    UpdateContact,
    UpdateContactNotFound,
    UpdateContactWithoutToken,
    DeleteContact,
    DeleteContactNotFound,
    DeleteContactWithoutToken,
    ProtectedEndpoints,
    OwnershipIsolation,
}

/// What has to exist before the case runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Given {
    Nothing,
    User,
    UserWithContact,
}

impl ApiCase {
    pub const ALL: &'static [ApiCase] = &[
        ApiCase::RegisterValid,
        ApiCase::RegisterInvalidEmail,
        ApiCase::RegisterDuplicateEmail,
        ApiCase::RegisterShortPassword,
        ApiCase::LoginValid,
        ApiCase::LoginUnknownEmail,
        ApiCase::LoginWrongPassword,
        ApiCase::ProfileValid,
        ApiCase::ProfileWithoutToken,
        ApiCase::ProfileInvalidToken,
        ApiCase::UpdateFirstName,
        ApiCase::UpdateMultipleFields,
        ApiCase::UpdateWithoutToken,
        ApiCase::LogoutValid,
        ApiCase::LogoutWithoutToken,
        ApiCase::DeleteAccount,
        ApiCase::DeleteAccountWithoutToken,
        ApiCase::CreateContactAllFields,
        ApiCase::CreateContactRequiredOnly,
        ApiCase::CreateContactMissingFirstName,
        ApiCase::CreateContactWithoutToken,
        ApiCase::ListContacts,
        ApiCase::ListContactsWithoutToken,
        ApiCase::GetContactRoundTrip,
        ApiCase::GetContactNotFound,
        ApiCase::GetContactWithoutToken,
        ApiCase::UpdateContact,
        ApiCase::UpdateContactNotFound,
        ApiCase::UpdateContactWithoutToken,
        ApiCase::DeleteContact,
        ApiCase::DeleteContactNotFound,
        ApiCase::DeleteContactWithoutToken,
        ApiCase::ProtectedEndpoints,
        ApiCase::OwnershipIsolation,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            ApiCase::RegisterValid => "register_valid",
            ApiCase::RegisterInvalidEmail => "register_invalid_email",
            ApiCase::RegisterDuplicateEmail => "register_duplicate_email",
            ApiCase::RegisterShortPassword => "register_short_password",
            ApiCase::LoginValid => "login_valid",
            ApiCase::LoginUnknownEmail => "login_unknown_email",
            ApiCase::LoginWrongPassword => "login_wrong_password",
            ApiCase::ProfileValid => "profile_valid",
            ApiCase::ProfileWithoutToken => "profile_without_token",
            ApiCase::ProfileInvalidToken => "profile_invalid_token",
            ApiCase::UpdateFirstName => "update_first_name",
            ApiCase::UpdateMultipleFields => "update_multiple_fields",
            ApiCase::UpdateWithoutToken => "update_without_token",
            ApiCase::LogoutValid => "logout_valid",
            ApiCase::LogoutWithoutToken => "logout_without_token",
            ApiCase::DeleteAccount => "delete_account",
            ApiCase::DeleteAccountWithoutToken => "delete_account_without_token",
            ApiCase::CreateContactAllFields => "create_contact_all_fields",
            ApiCase::CreateContactRequiredOnly => "create_contact_required_only",
            ApiCase::CreateContactMissingFirstName => "create_contact_missing_first_name",
            ApiCase::CreateContactWithoutToken => "create_contact_without_token",
            ApiCase::ListContacts => "list_contacts",
            ApiCase::ListContactsWithoutToken => "list_contacts_without_token",
            ApiCase::GetContactRoundTrip => "get_contact_round_trip",
            ApiCase::GetContactNotFound => "get_contact_not_found",
            ApiCase::GetContactWithoutToken => "get_contact_without_token",
            ApiCase::UpdateContact => "update_contact",
            ApiCase::UpdateContactNotFound => "update_contact_not_found",
            ApiCase::UpdateContactWithoutToken => "update_contact_without_token",
            ApiCase::DeleteContact => "delete_contact",
            ApiCase::DeleteContactNotFound => "delete_contact_not_found",
            ApiCase::DeleteContactWithoutToken => "delete_contact_without_token",
            ApiCase::ProtectedEndpoints => "protected_endpoints",
            ApiCase::OwnershipIsolation => "ownership_isolation",
        }
    }

    fn given(&self) -> Given {
        use ApiCase::*;
        match self {
            RegisterValid | RegisterInvalidEmail | RegisterDuplicateEmail
            | RegisterShortPassword | ProfileWithoutToken | ProfileInvalidToken
            | UpdateWithoutToken | LogoutWithoutToken => Given::Nothing,
            ListContacts | GetContactWithoutToken | UpdateContact | UpdateContactWithoutToken
            | DeleteContact | DeleteContactWithoutToken | ProtectedEndpoints
            | OwnershipIsolation => Given::UserWithContact,
            _ => Given::User,
        }
    }

    fn area(&self) -> &'static str {
        let slug = self.slug();
        if slug.contains("contact") {
            "contacts"
        } else {
            "users"
        }
    }

    fn is_negative(&self) -> bool {
        let slug = self.slug();
        slug.contains("without_token")
            || slug.contains("invalid")
            || slug.contains("not_found")
            || slug.contains("missing")
            || slug.contains("unknown")
            || slug.contains("wrong")
            || slug.contains("duplicate")
            || slug.contains("short")
    }
}

pub struct ApiScenario(pub ApiCase);

pub fn scenarios() -> Vec<Box<dyn Scenario>> {
    ApiCase::ALL
        .iter()
        .map(|case| Box::new(ApiScenario(*case)) as Box<dyn Scenario>)
        .collect()
}

#[async_trait]
impl Scenario for ApiScenario {
    fn name(&self) -> String {
        format!("api::{}", self.0.slug())
    }

    fn suite(&self) -> &'static str {
        "api"
    }

    fn tags(&self) -> Vec<&'static str> {
        let mut tags = vec!["api", self.0.area()];
        if self.0.is_negative() {
            tags.push("negative");
        }
        if matches!(self.0, ApiCase::ProtectedEndpoints | ApiCase::OwnershipIsolation) {
            tags.push("security");
        }
        tags
    }

    async fn setup(&self, ctx: &mut ScenarioContext) -> E2eResult<()> {
        match self.0.given() {
            Given::Nothing => Ok(()),
            Given::User => ctx.sign_up_primary().await,
            Given::UserWithContact => {
                ctx.sign_up_primary().await?;
                let contact = ctx.fixtures.generate_contact();
                let resp = ctx.api.create_contact(Some(&token(ctx)?), &contact).await?;
                resp.expect_status(201)?;
                ctx.contact_id = Some(resp.str_field("_id")?);
                Ok(())
            }
        }
    }

    async fn run(&self, ctx: &mut ScenarioContext) -> E2eResult<()> {
        match self.0 {
            ApiCase::RegisterValid => register_valid(ctx).await,
            ApiCase::RegisterInvalidEmail => register_invalid_email(ctx).await,
            ApiCase::RegisterDuplicateEmail => register_duplicate_email(ctx).await,
            ApiCase::RegisterShortPassword => register_short_password(ctx).await,
            ApiCase::LoginValid => login_valid(ctx).await,
            ApiCase::LoginUnknownEmail => login_unknown_email(ctx).await,
            ApiCase::LoginWrongPassword => login_wrong_password(ctx).await,
            ApiCase::ProfileValid => profile_valid(ctx).await,
            ApiCase::ProfileWithoutToken => {
                expect_401(ctx.api.me(None).await?)
            }
            ApiCase::ProfileInvalidToken => profile_invalid_token(ctx).await,
            ApiCase::UpdateFirstName => update_first_name(ctx).await,
            ApiCase::UpdateMultipleFields => update_multiple_fields(ctx).await,
            ApiCase::UpdateWithoutToken => {
                let update = UserUpdate {
                    first_name: Some("Test".into()),
                    ..Default::default()
                };
                expect_401(ctx.api.update_me(None, &update).await?)
            }
            ApiCase::LogoutValid => {
                ctx.api.logout(Some(&token(ctx)?)).await?.expect_status(200)?;
                Ok(())
            }
            ApiCase::LogoutWithoutToken => expect_401(ctx.api.logout(None).await?),
            ApiCase::DeleteAccount => delete_account(ctx).await,
            ApiCase::DeleteAccountWithoutToken => delete_account_without_token(ctx).await,
            ApiCase::CreateContactAllFields => create_contact_all_fields(ctx).await,
            ApiCase::CreateContactRequiredOnly => create_contact_required_only(ctx).await,
            ApiCase::CreateContactMissingFirstName => create_contact_missing_first_name(ctx).await,
            ApiCase::CreateContactWithoutToken => create_contact_without_token(ctx).await,
            ApiCase::ListContacts => list_contacts(ctx).await,
            ApiCase::ListContactsWithoutToken => expect_401(ctx.api.list_contacts(None).await?),
            ApiCase::GetContactRoundTrip => get_contact_round_trip(ctx).await,
            ApiCase::GetContactNotFound => get_contact_not_found(ctx).await,
            ApiCase::GetContactWithoutToken => {
                let id = ctx.contact_id()?.to_string();
                expect_401(ctx.api.get_contact(None, &id).await?)
            }
            ApiCase::UpdateContact => update_contact(ctx).await,
            ApiCase::UpdateContactNotFound => update_contact_not_found(ctx).await,
            ApiCase::UpdateContactWithoutToken => update_contact_without_token(ctx).await,
            ApiCase::DeleteContact => delete_contact(ctx).await,
            ApiCase::DeleteContactNotFound => {
                let resp = ctx
                    .api
                    .delete_contact(Some(&token(ctx)?), NONEXISTENT_CONTACT_ID)
                    .await?;
                resp.expect_status(404)?;
                Ok(())
            }
            ApiCase::DeleteContactWithoutToken => delete_contact_without_token(ctx).await,
            ApiCase::ProtectedEndpoints => unauthorized_matrix(ctx).await,
            ApiCase::OwnershipIsolation => ownership_isolation(ctx).await,
        }
    }
}

fn token(ctx: &ScenarioContext) -> E2eResult<SessionToken> {
    Ok(ctx.session()?.token.clone())
}

fn expect_401(resp: crate::client::ApiResponse) -> E2eResult<()> {
    resp.expect_status(401)?;
    Ok(())
}

// ============================================================================
// Users
// ============================================================================

async fn register_valid(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let user = ctx.fixtures.generate_user_with(UserOverrides {
        first_name: Some("API".into()),
        last_name: Some("Tester".into()),
        password: Some("ApiPassword123!".into()),
        ..Default::default()
    });
    ctx.track_user(&user);

    let resp = ctx.api.register(&user).await?;
    resp.expect_status(201)?;
    check::has_field(&resp, "user._id")?;
    check::field_eq(&resp, "user.firstName", &user.first_name)?;
    check::field_eq(&resp, "user.lastName", &user.last_name)?;
    check::field_eq(&resp, "user.email", &user.email)?;
    check::lacks_field(&resp, "user.password")?;
    check::non_empty(&resp, "token")
}

async fn register_invalid_email(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let user = ctx.fixtures.generate_user_with(UserOverrides {
        email: Some("invalid-email-format".into()),
        ..Default::default()
    });
    ctx.track_user(&user);

    let resp = ctx.api.register(&user).await?;
    resp.expect_status(400)?;
    check::has_field(&resp, "message")
}

async fn register_duplicate_email(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let first = ctx.fixtures.generate_user();
    ctx.register(&first).await?;

    let duplicate = ctx.fixtures.generate_user_with(UserOverrides {
        first_name: Some("Another".into()),
        email: Some(first.email.clone()),
        ..Default::default()
    });
    let resp = ctx.api.register(&duplicate).await?;
    resp.expect_status(400)?;
    let message = resp.str_field("message")?;
    check::that(
        "duplicate registration message",
        message.contains(text::EMAIL_IN_USE),
        text::EMAIL_IN_USE,
        message,
    )
}

async fn register_short_password(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let user = ctx.fixtures.generate_user_with(UserOverrides {
        password: Some("123".into()),
        ..Default::default()
    });
    ctx.track_user(&user);

    let resp = ctx.api.register(&user).await?;
    resp.expect_status(400)?;
    check::has_field(&resp, "message")
}

async fn login_valid(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let user = ctx.user()?.clone();
    let resp = ctx.api.login(&user.credentials()).await?;
    resp.expect_status(200)?;
    check::has_field(&resp, "user")?;
    check::field_eq(&resp, "user.email", &user.email)?;
    check::non_empty(&resp, "token")
}

async fn login_unknown_email(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let credentials = Credentials {
        email: ctx.fixtures.unique_email(),
        password: ctx.user()?.password.clone(),
    };
    ctx.api.login(&credentials).await?.expect_status(401)?;
    Ok(())
}

async fn login_wrong_password(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let credentials = Credentials {
        email: ctx.user()?.email.clone(),
        password: "wrongpassword".into(),
    };
    ctx.api.login(&credentials).await?.expect_status(401)?;
    Ok(())
}

async fn profile_valid(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let user = ctx.user()?.clone();
    let resp = ctx.api.me(Some(&token(ctx)?)).await?;
    resp.expect_status(200)?;
    check::has_field(&resp, "_id")?;
    check::field_eq(&resp, "firstName", &user.first_name)?;
    check::field_eq(&resp, "lastName", &user.last_name)?;
    check::field_eq(&resp, "email", &user.email)?;
    check::lacks_field(&resp, "password")
}

async fn profile_invalid_token(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let header = SessionToken::new(INVALID_TOKEN).bearer();
    let resp = ctx
        .api
        .request_with_header(Method::GET, "/users/me", None, Some(&header))
        .await?;
    expect_401(resp)
}

async fn update_first_name(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let user = ctx.user()?.clone();
    let update = UserUpdate {
        first_name: Some("UpdatedFirstName".into()),
        ..Default::default()
    };
    let resp = ctx.api.update_me(Some(&token(ctx)?), &update).await?;
    resp.expect_status(200)?;
    check::field_eq(&resp, "firstName", "UpdatedFirstName")?;
    check::field_eq(&resp, "lastName", &user.last_name)?;
    check::field_eq(&resp, "email", &user.email)
}

async fn update_multiple_fields(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let update = UserUpdate {
        first_name: Some("NewFirst".into()),
        last_name: Some("NewLast".into()),
        ..Default::default()
    };
    let resp = ctx.api.update_me(Some(&token(ctx)?), &update).await?;
    resp.expect_status(200)?;
    check::field_eq(&resp, "firstName", "NewFirst")?;
    check::field_eq(&resp, "lastName", "NewLast")
}

async fn delete_account(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let credentials = ctx.user()?.credentials();
    ctx.api.delete_me(Some(&token(ctx)?)).await?.expect_status(200)?;
    // the account is really gone
    ctx.api.login(&credentials).await?.expect_status(401)?;
    Ok(())
}

async fn delete_account_without_token(ctx: &mut ScenarioContext) -> E2eResult<()> {
    expect_401(ctx.api.delete_me(None).await?)?;
    ctx.api.me(Some(&token(ctx)?)).await?.expect_status(200)?;
    Ok(())
}

// ============================================================================
// Contacts
// ============================================================================

fn contact_mismatches(context: &str, contact: &Contact, fixture: &ContactFixture) -> E2eResult<()> {
    let fields = contact.mismatches(fixture);
    check::that(context, fields.is_empty(), "no differing fields", fields)
}

async fn create_contact_all_fields(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let fixture = ctx.fixtures.generate_contact();
    let resp = ctx.api.create_contact(Some(&token(ctx)?), &fixture).await?;
    resp.expect_status(201)?;
    check::has_field(&resp, "_id")?;
    check::has_field(&resp, "owner")?;
    contact_mismatches("created contact", &resp.json()?, &fixture)
}

async fn create_contact_required_only(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let fixture = ContactFixture::named("Jane", "Smith");
    let resp = ctx.api.create_contact(Some(&token(ctx)?), &fixture).await?;
    resp.expect_status(201)?;
    check::field_eq(&resp, "firstName", "Jane")?;
    check::field_eq(&resp, "lastName", "Smith")
}

async fn create_contact_missing_first_name(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let mut body = serde_json::to_value(ctx.fixtures.generate_contact())?;
    if let Value::Object(map) = &mut body {
        map.remove("firstName");
    }
    let resp = ctx
        .api
        .request(Method::POST, "/contacts", Some(&body), Some(&token(ctx)?))
        .await?;
    resp.expect_status(400)?;
    Ok(())
}

async fn create_contact_without_token(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let fixture = ctx.fixtures.generate_contact();
    expect_401(ctx.api.create_contact(None, &fixture).await?)?;

    let contacts: Vec<Contact> = ctx.api.list_contacts(Some(&token(ctx)?)).await?.json()?;
    check::equal("contacts after rejected create", 0, contacts.len())
}

async fn list_contacts(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let resp = ctx.api.list_contacts(Some(&token(ctx)?)).await?;
    resp.expect_status(200)?;
    let body = resp.json_value()?;
    let first = body
        .as_array()
        .and_then(|rows| rows.first())
        .ok_or_else(|| E2eError::assertion("GET /contacts", "a non-empty array", &body))?;
    for field in ["_id", "firstName", "lastName"] {
        check::that(
            "first listed contact",
            first.get(field).is_some(),
            field,
            first,
        )?;
    }
    Ok(())
}

async fn get_contact_round_trip(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let token = token(ctx)?;
    let fixture = ctx.fixtures.generate_contact();
    let created = ctx.api.create_contact(Some(&token), &fixture).await?;
    created.expect_status(201)?;
    let id = created.str_field("_id")?;

    let resp = ctx.api.get_contact(Some(&token), &id).await?;
    resp.expect_status(200)?;
    check::field_eq(&resp, "_id", &id)?;
    contact_mismatches("fetched contact", &resp.json()?, &fixture)
}

async fn get_contact_not_found(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let resp = ctx
        .api
        .get_contact(Some(&token(ctx)?), NONEXISTENT_CONTACT_ID)
        .await?;
    resp.expect_status(404)?;
    Ok(())
}

async fn update_contact(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let id = ctx.contact_id()?.to_string();
    let phone = random_phone(10);
    let body = json!({
        "firstName": "UpdatedJohn",
        "lastName": "UpdatedDoe",
        "email": "updated.email@example.com",
        "phone": phone,
    });
    let resp = ctx.api.update_contact(Some(&token(ctx)?), &id, &body).await?;
    resp.expect_status(200)?;
    check::field_eq(&resp, "firstName", "UpdatedJohn")?;
    check::field_eq(&resp, "lastName", "UpdatedDoe")?;
    check::field_eq(&resp, "email", "updated.email@example.com")?;
    check::field_eq(&resp, "phone", &phone)
}

async fn update_contact_not_found(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let body = json!({
        "firstName": "Amy",
        "lastName": "Miller",
        "birthdate": "1992-02-02",
        "email": "amiller@fake.com",
        "phone": "8005554242",
        "street1": "13 School St.",
        "street2": "Apt. 5",
        "city": "Washington",
        "stateProvince": "QC",
        "postalCode": "A1A1A1",
        "country": "Canada"
    });
    let resp = ctx
        .api
        .update_contact(Some(&token(ctx)?), NONEXISTENT_CONTACT_ID, &body)
        .await?;
    resp.expect_status(404)?;
    Ok(())
}

async fn update_contact_without_token(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let id = ctx.contact_id()?.to_string();
    expect_401(
        ctx.api
            .update_contact(None, &id, &json!({ "firstName": "Test" }))
            .await?,
    )?;

    let resp = ctx.api.get_contact(Some(&token(ctx)?), &id).await?;
    resp.expect_status(200)?;
    check::field_eq(&resp, "firstName", "John")
}

async fn delete_contact(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let token = token(ctx)?;
    let id = ctx.contact_id()?.to_string();

    let resp = ctx.api.delete_contact(Some(&token), &id).await?;
    resp.expect_status(200)?;
    check::body_contains(&resp, text::CONTACT_DELETED)?;

    ctx.api.get_contact(Some(&token), &id).await?.expect_status(404)?;
    Ok(())
}

async fn delete_contact_without_token(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let id = ctx.contact_id()?.to_string();
    expect_401(ctx.api.delete_contact(None, &id).await?)?;
    ctx.api
        .get_contact(Some(&token(ctx)?), &id)
        .await?
        .expect_status(200)?;
    Ok(())
}

/// Every bearer-protected route, with bodies that would mutate if accepted
pub fn protected_endpoints(contact_id: &str) -> Vec<Endpoint> {
    let contact_path = format!("/contacts/{}", contact_id);
    vec![
        Endpoint::new(Method::GET, "/users/me"),
        Endpoint::new(Method::PATCH, "/users/me").with_body(json!({ "firstName": "Intruder" })),
        Endpoint::new(Method::DELETE, "/users/me"),
        Endpoint::new(Method::POST, "/users/logout"),
        Endpoint::new(Method::GET, "/contacts"),
        Endpoint::new(Method::POST, "/contacts")
            .with_body(json!({ "firstName": "Intruder", "lastName": "Contact" })),
        Endpoint::new(Method::GET, contact_path.clone()),
        Endpoint::new(Method::PUT, contact_path.clone())
            .with_body(json!({ "firstName": "Intruder", "lastName": "Contact" })),
        Endpoint::new(Method::DELETE, contact_path),
    ]
}

async fn unauthorized_matrix(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let token = token(ctx)?;
    let id = ctx.contact_id()?.to_string();
    let endpoints = protected_endpoints(&id);
    let invalid = SessionToken::new(INVALID_TOKEN).bearer();

    for authorization in [None, Some(invalid.as_str())] {
        let responses = ctx.api.request_all(&endpoints, authorization).await;
        for (endpoint, resp) in endpoints.iter().zip(responses) {
            let status = resp?.status();
            check::equal(
                &format!("{} with authorization {:?}", endpoint, authorization),
                401,
                status,
            )?;
        }
    }

    // nothing above may have changed state
    let user = ctx.user()?.clone();
    let me = ctx.api.me(Some(&token)).await?;
    me.expect_status(200)?;
    check::field_eq(&me, "firstName", &user.first_name)?;

    let contacts: Vec<Contact> = ctx.api.list_contacts(Some(&token)).await?.json()?;
    check::equal("contacts after unauthorized calls", 1, contacts.len())?;
    check::equal("surviving contact", id.as_str(), contacts[0].id.as_str())
}

async fn ownership_isolation(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let owner = token(ctx)?;
    let id = ctx.contact_id()?.to_string();
    let (_, other) = ctx.register_user().await?;

    let resp = ctx.api.get_contact(Some(&other.token), &id).await?;
    resp.expect_status(404)?;
    let resp = ctx
        .api
        .update_contact(Some(&other.token), &id, &json!({ "firstName": "Thief", "lastName": "X" }))
        .await?;
    resp.expect_status(404)?;
    let resp = ctx.api.delete_contact(Some(&other.token), &id).await?;
    resp.expect_status(404)?;

    let contacts: Vec<Contact> = ctx.api.list_contacts(Some(&other.token)).await?.json()?;
    check::equal("contacts visible to another user", 0, contacts.len())?;

    let resp = ctx.api.get_contact(Some(&owner), &id).await?;
    resp.expect_status(200)?;
    check::field_eq(&resp, "firstName", "John")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn case_slugs_are_unique() {
        let slugs: HashSet<_> = ApiCase::ALL.iter().map(|c| c.slug()).collect();
        assert_eq!(slugs.len(), ApiCase::ALL.len());
    }

    #[test]
    fn negative_cases_are_tagged() {
        let tags = ApiScenario(ApiCase::GetContactWithoutToken).tags();
        assert!(tags.contains(&"negative"));
        assert!(tags.contains(&"contacts"));
        assert!(!ApiScenario(ApiCase::RegisterValid).tags().contains(&"negative"));
    }

    #[test]
    fn protected_routes_cover_every_method() {
        let endpoints = protected_endpoints("abc");
        assert_eq!(endpoints.len(), 9);
        assert!(endpoints.iter().all(|e| e.path.starts_with("/users/") || e.path.starts_with("/contacts")));
    }
}
