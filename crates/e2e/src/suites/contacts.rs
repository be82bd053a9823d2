//! Contact management through the browser

use async_trait::async_trait;
use contactlist_common::fixtures::ContactOverrides;
use contactlist_common::selectors::{self, paths, text};
use contactlist_common::{Contact, ContactFixture, E2eError, E2eResult};

use crate::check;
use crate::runner::{Scenario, ScenarioContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactsCase {
    ListPage,
    EmptyList,
    NavigateToAdd,
    Logout,
    AddForm,
    AddAllFields,
    AddRequiredOnly,
    AddValidation,
    AddCancel,
    ViewDetails,
    Edit,
    Delete,
    ReturnToList,
}

impl ContactsCase {
    pub const ALL: &'static [ContactsCase] = &[
        ContactsCase::ListPage,
        ContactsCase::EmptyList,
        ContactsCase::NavigateToAdd,
        ContactsCase::Logout,
        ContactsCase::AddForm,
        ContactsCase::AddAllFields,
        ContactsCase::AddRequiredOnly,
        ContactsCase::AddValidation,
        ContactsCase::AddCancel,
        ContactsCase::ViewDetails,
        ContactsCase::Edit,
        ContactsCase::Delete,
        ContactsCase::ReturnToList,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            ContactsCase::ListPage => "list_page",
            ContactsCase::EmptyList => "empty_list",
            ContactsCase::NavigateToAdd => "navigate_to_add",
            ContactsCase::Logout => "logout",
            ContactsCase::AddForm => "add_form",
            ContactsCase::AddAllFields => "add_all_fields",
            ContactsCase::AddRequiredOnly => "add_required_only",
            ContactsCase::AddValidation => "add_validation",
            ContactsCase::AddCancel => "add_cancel",
            ContactsCase::ViewDetails => "view_details",
            ContactsCase::Edit => "edit",
            ContactsCase::Delete => "delete",
            ContactsCase::ReturnToList => "return_to_list",
        }
    }

    fn area(&self) -> &'static str {
        match self {
            ContactsCase::ListPage
            | ContactsCase::EmptyList
            | ContactsCase::NavigateToAdd
            | ContactsCase::Logout => "list",
            ContactsCase::AddForm
            | ContactsCase::AddAllFields
            | ContactsCase::AddRequiredOnly
            | ContactsCase::AddValidation
            | ContactsCase::AddCancel => "add",
            _ => "details",
        }
    }
}

/// The contact the details cases open: names plus email and phone
fn existing_contact() -> ContactFixture {
    let mut contact = ContactFixture::named("John", "Doe");
    contact.email = Some("john.doe@example.com".into());
    contact.phone = Some("8005555555".into());
    contact
}

pub struct ContactsScenario(pub ContactsCase);

pub fn scenarios() -> Vec<Box<dyn Scenario>> {
    ContactsCase::ALL
        .iter()
        .map(|case| Box::new(ContactsScenario(*case)) as Box<dyn Scenario>)
        .collect()
}

#[async_trait]
impl Scenario for ContactsScenario {
    fn name(&self) -> String {
        format!("contacts::{}", self.0.slug())
    }

    fn suite(&self) -> &'static str {
        "contacts"
    }

    fn tags(&self) -> Vec<&'static str> {
        vec!["ui", "contacts", self.0.area()]
    }

    fn needs_browser(&self) -> bool {
        true
    }

    async fn setup(&self, ctx: &mut ScenarioContext) -> E2eResult<()> {
        ctx.sign_up_primary().await?;
        let credentials = ctx.user()?.credentials();
        let ui = ctx.ui()?;
        ui.login(&credentials).await?;

        match self.0.area() {
            "add" => {
                ui.click(selectors::ADD_CONTACT).await?;
                ui.expect_url_contains(paths::ADD_CONTACT).await
            }
            "details" => ui.add_contact(&existing_contact()).await,
            _ => Ok(()),
        }
    }

    async fn run(&self, ctx: &mut ScenarioContext) -> E2eResult<()> {
        match self.0 {
            ContactsCase::ListPage => {
                let ui = ctx.ui()?;
                ui.expect_text(text::CONTACT_LIST).await?;
                ui.expect_text(text::ADD_NEW_CONTACT).await?;
                ui.expect_visible(selectors::ADD_CONTACT).await?;
                ui.expect_visible(selectors::LOGOUT).await
            }
            ContactsCase::EmptyList => {
                let ui = ctx.ui()?;
                ui.expect_visible(selectors::CONTACT_TABLE).await?;
                ui.expect_count(selectors::CONTACT_ROW, 0).await
            }
            ContactsCase::NavigateToAdd => {
                let ui = ctx.ui()?;
                ui.click(selectors::ADD_CONTACT).await?;
                ui.expect_url_contains(paths::ADD_CONTACT).await?;
                ui.expect_text(text::ADD_CONTACT).await
            }
            ContactsCase::Logout => {
                let ui = ctx.ui()?;
                ui.logout().await?;
                ui.expect_text(text::LOG_IN).await
            }
            ContactsCase::AddForm => {
                let ui = ctx.ui()?;
                ui.expect_text(text::ADD_CONTACT).await?;
                for selector in selectors::CONTACT_FORM_FIELDS {
                    ui.expect_visible(selector).await?;
                }
                ui.expect_visible(selectors::SUBMIT).await?;
                ui.expect_visible(selectors::CANCEL).await
            }
            ContactsCase::AddAllFields => add_all_fields(ctx).await,
            ContactsCase::AddRequiredOnly => {
                let ui = ctx.ui()?;
                ui.type_into(selectors::FIRST_NAME, "Jane").await?;
                ui.type_into(selectors::LAST_NAME, "Smith").await?;
                ui.click(selectors::SUBMIT).await?;
                ui.expect_url_contains(paths::CONTACT_LIST).await?;
                ui.expect_text("Jane Smith").await
            }
            ContactsCase::AddValidation => {
                let ui = ctx.ui()?;
                ui.click(selectors::SUBMIT).await?;
                ui.expect_url_contains(paths::ADD_CONTACT).await
            }
            ContactsCase::AddCancel => {
                let ui = ctx.ui()?;
                ui.type_into(selectors::FIRST_NAME, "Test").await?;
                ui.type_into(selectors::LAST_NAME, "Cancel").await?;
                ui.click(selectors::CANCEL).await?;
                ui.expect_url_contains(paths::CONTACT_LIST).await?;
                ui.expect_no_text("Test Cancel").await
            }
            ContactsCase::ViewDetails => {
                let contact = existing_contact();
                let ui = ctx.ui()?;
                ui.open_contact(&contact.full_name()).await?;
                for value in [
                    contact.first_name.as_str(),
                    contact.last_name.as_str(),
                    "john.doe@example.com",
                    "8005555555",
                ] {
                    ui.expect_text(value).await?;
                }
                for selector in [selectors::EDIT_CONTACT, selectors::DELETE, selectors::RETURN] {
                    ui.expect_visible(selector).await?;
                }
                Ok(())
            }
            ContactsCase::Edit => {
                let ui = ctx.ui()?;
                ui.open_contact(&existing_contact().full_name()).await?;
                ui.edit_contact(&[
                    (selectors::FIRST_NAME, "UpdatedJohn"),
                    (selectors::EMAIL, "updated.john@example.com"),
                ])
                .await?;
                ui.expect_text("UpdatedJohn").await?;
                ui.expect_text("updated.john@example.com").await
            }
            ContactsCase::Delete => {
                let name = existing_contact().full_name();
                let ui = ctx.ui()?;
                ui.open_contact(&name).await?;
                ui.delete_contact().await?;
                ui.expect_no_text(&name).await
            }
            ContactsCase::ReturnToList => {
                let ui = ctx.ui()?;
                ui.open_contact(&existing_contact().full_name()).await?;
                ui.click(selectors::RETURN).await?;
                ui.expect_url_contains(paths::CONTACT_LIST).await?;
                ui.expect_visible(selectors::CONTACT_TABLE).await
            }
        }
    }

    async fn teardown(&self, ctx: &mut ScenarioContext) -> E2eResult<()> {
        // the session is gone after logging out; account deletion covers it
        if self.0 == ContactsCase::Logout {
            return Ok(());
        }
        let Some(session) = ctx.session.as_ref() else {
            return Ok(());
        };
        let remaining: Vec<Contact> = ctx.api.list_contacts(session.token()).await?.json()?;
        let ui = ctx.ui()?;
        ui.visit(paths::CONTACT_LIST).await?;
        ui.clear_known_contacts(remaining.len()).await.map(|_| ())
    }
}

/// Fill every field through the form, then confirm over the API what was stored
async fn add_all_fields(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let contact = ctx.fixtures.generate_contact_with(ContactOverrides {
        street1: Some("1 Main St.".into()),
        ..Default::default()
    });
    let ui = ctx.ui()?;
    ui.fill_contact_form(&contact).await?;
    ui.click(selectors::SUBMIT).await?;
    ui.expect_url_contains(paths::CONTACT_LIST).await?;
    ui.expect_text(&contact.full_name()).await?;

    let token = ctx.session()?.token.clone();
    let stored: Vec<Contact> = ctx.api.list_contacts(Some(&token)).await?.json()?;
    let saved = stored
        .iter()
        .find(|c| c.full_name() == contact.full_name())
        .ok_or_else(|| {
            E2eError::assertion("contacts stored after adding", contact.full_name(), stored.len())
        })?;
    let fields = saved.mismatches(&contact);
    check::that("contact saved from the form", fields.is_empty(), "no differing fields", fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn details_cases_start_from_an_existing_contact() {
        for case in [ContactsCase::ViewDetails, ContactsCase::Edit, ContactsCase::Delete] {
            assert_eq!(case.area(), "details");
        }
        assert_eq!(existing_contact().full_name(), "John Doe");
    }

    #[test]
    fn names_are_prefixed_by_suite() {
        assert_eq!(ContactsScenario(ContactsCase::AddCancel).name(), "contacts::add_cancel");
        assert!(ContactsScenario(ContactsCase::Edit).tags().contains(&"ui"));
    }
}
