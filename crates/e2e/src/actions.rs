//! Composite UI flows
//!
//! Each helper is a fixed sequence of navigate, fill and submit steps that
//! returns only once a terminating condition is observable: the target page
//! for success, or the `#error` region for a rejected form.

use contactlist_common::selectors::{self, paths, text};
use contactlist_common::{ContactFixture, Credentials, E2eError, E2eResult, UserFixture};
use tracing::{debug, info};

use crate::ui::UiSession;
use crate::wait::Condition;

/// How a submitted form settled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome {
    /// The expected page was reached
    Accepted,
    /// The form stayed put and showed this message
    Rejected(String),
}

impl FormOutcome {
    fn into_result(self, what: &str) -> E2eResult<()> {
        match self {
            FormOutcome::Accepted => Ok(()),
            FormOutcome::Rejected(message) => {
                Err(E2eError::assertion(what, "form to be accepted", message))
            }
        }
    }
}

/// Form inputs populated from a contact, skipping unset optional fields
pub fn contact_form_values(contact: &ContactFixture) -> Vec<(&'static str, String)> {
    let optional = [
        (selectors::BIRTHDATE, contact.birthdate_str()),
        (selectors::EMAIL, contact.email.clone()),
        (selectors::PHONE, contact.phone.clone()),
        (selectors::STREET1, contact.street1.clone()),
        (selectors::STREET2, contact.street2.clone()),
        (selectors::CITY, contact.city.clone()),
        (selectors::STATE_PROVINCE, contact.state_province.clone()),
        (selectors::POSTAL_CODE, contact.postal_code.clone()),
        (selectors::COUNTRY, contact.country.clone()),
    ];

    let mut values = vec![
        (selectors::FIRST_NAME, contact.first_name.clone()),
        (selectors::LAST_NAME, contact.last_name.clone()),
    ];
    values.extend(optional.into_iter().filter_map(|(sel, v)| v.map(|v| (sel, v))));
    values
}

impl UiSession {
    /// Submit the current form and wait for either `success` or `#error`
    async fn submit_and_settle(&mut self, success: Condition) -> E2eResult<FormOutcome> {
        self.click(selectors::SUBMIT).await?;
        self.wait_for(Condition::Any(vec![
            success.clone(),
            Condition::visible(selectors::ERROR),
        ]))
        .await?;

        if success.holds(self.page()).await? {
            Ok(FormOutcome::Accepted)
        } else {
            let message = self.page().text_content(selectors::ERROR).await?;
            Ok(FormOutcome::Rejected(message))
        }
    }

    pub async fn fill_registration(&mut self, user: &UserFixture) -> E2eResult<()> {
        self.visit(paths::ADD_USER).await?;
        self.type_into(selectors::FIRST_NAME, &user.first_name).await?;
        self.type_into(selectors::LAST_NAME, &user.last_name).await?;
        self.type_into(selectors::EMAIL, &user.email).await?;
        self.type_into(selectors::PASSWORD, &user.password).await
    }

    /// Sign up through `/addUser`, reporting a rejection instead of failing
    pub async fn try_register(&mut self, user: &UserFixture) -> E2eResult<FormOutcome> {
        self.fill_registration(user).await?;
        self.submit_and_settle(Condition::url_contains(paths::CONTACT_LIST))
            .await
    }

    /// Sign up and land on the contact list
    pub async fn register(&mut self, user: &UserFixture) -> E2eResult<()> {
        info!(email = %user.email, "registering through the UI");
        self.try_register(user)
            .await?
            .into_result(&format!("registration of {}", user.email))
    }

    pub async fn try_login(&mut self, credentials: &Credentials) -> E2eResult<FormOutcome> {
        self.visit(paths::LOGIN).await?;
        self.type_into(selectors::EMAIL, &credentials.email).await?;
        self.type_into(selectors::PASSWORD, &credentials.password)
            .await?;
        self.submit_and_settle(Condition::url_contains(paths::CONTACT_LIST))
            .await
    }

    /// Log in and wait for the contact list
    pub async fn login(&mut self, credentials: &Credentials) -> E2eResult<()> {
        self.try_login(credentials)
            .await?
            .into_result(&format!("login of {}", credentials.email))?;
        self.expect_visible(selectors::LOGOUT).await
    }

    /// Log out and wait for the login page at `/`
    pub async fn logout(&mut self) -> E2eResult<()> {
        self.click(selectors::LOGOUT).await?;
        self.expect_url(paths::HOME).await
    }

    /// Fill the add/edit contact form with every field `contact` sets
    pub async fn fill_contact_form(&mut self, contact: &ContactFixture) -> E2eResult<()> {
        for (selector, value) in contact_form_values(contact) {
            self.type_into(selector, &value).await?;
        }
        Ok(())
    }

    /// From the contact list, add `contact` and wait for its row
    pub async fn add_contact(&mut self, contact: &ContactFixture) -> E2eResult<()> {
        contact.validate()?;
        self.click(selectors::ADD_CONTACT).await?;
        self.expect_url_contains(paths::ADD_CONTACT).await?;
        self.fill_contact_form(contact).await?;
        self.submit_and_settle(Condition::url_contains(paths::CONTACT_LIST))
            .await?
            .into_result(&format!("adding contact {}", contact.full_name()))?;
        self.expect_text(&contact.full_name()).await
    }

    /// From the contact list, open the row showing `full_name`
    pub async fn open_contact(&mut self, full_name: &str) -> E2eResult<()> {
        self.click_text(full_name).await?;
        self.expect_text(text::CONTACT_DETAILS).await
    }

    /// From a details page, apply `edits` and wait for the details page again
    pub async fn edit_contact(&mut self, edits: &[(&str, &str)]) -> E2eResult<()> {
        self.click(selectors::EDIT_CONTACT).await?;
        self.expect_url_contains(paths::EDIT_CONTACT).await?;
        // the form is prefilled asynchronously; typing earlier gets overwritten
        self.wait_for(Condition::Filled(selectors::FIRST_NAME.to_string()))
            .await?;
        for (selector, value) in edits {
            self.type_into(selector, value).await?;
        }
        self.submit_and_settle(Condition::text(text::CONTACT_DETAILS))
            .await?
            .into_result("editing contact")
    }

    /// From a details page, delete the contact and wait for the list
    pub async fn delete_contact(&mut self) -> E2eResult<()> {
        self.click(selectors::DELETE).await?;
        self.expect_url_contains(paths::CONTACT_LIST).await
    }

    /// Delete every contact of the logged-in user; returns how many went
    ///
    /// Trusts the first row count once the table is visible. When the
    /// number of contacts is known, prefer [`UiSession::clear_known_contacts`].
    pub async fn clear_all_contacts(&mut self) -> E2eResult<usize> {
        self.expect_visible(selectors::CONTACT_TABLE).await?;
        self.delete_rows().await
    }

    /// Wait until the table shows `expected` rows, then delete them all
    ///
    /// The live table renders before its rows are fetched, so an empty first
    /// read is not proof that the user has no contacts.
    pub async fn clear_known_contacts(&mut self, expected: usize) -> E2eResult<usize> {
        self.expect_visible(selectors::CONTACT_TABLE).await?;
        self.expect_count(selectors::CONTACT_ROW, expected).await?;
        self.delete_rows().await
    }

    // The table shrinks after each deletion, so the first remaining row is
    // re-queried every iteration rather than walking indices.
    async fn delete_rows(&mut self) -> E2eResult<usize> {
        let mut deleted = 0;
        loop {
            let remaining = self.page().count(selectors::CONTACT_ROW).await?;
            if remaining == 0 {
                break;
            }
            self.click(selectors::CONTACT_ROW).await?;
            self.expect_text(text::CONTACT_DETAILS).await?;
            self.delete_contact().await?;
            self.expect_count(selectors::CONTACT_ROW, remaining - 1).await?;
            deleted += 1;
        }

        debug!(deleted, "contact list cleared");
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_fields_come_first_and_unset_fields_are_skipped() {
        let mut contact = ContactFixture::named("Jane", "Smith");
        contact.phone = Some("5551234567".into());

        let values = contact_form_values(&contact);
        assert_eq!(
            values,
            vec![
                (selectors::FIRST_NAME, "Jane".to_string()),
                (selectors::LAST_NAME, "Smith".to_string()),
                (selectors::PHONE, "5551234567".to_string()),
            ]
        );
    }

    #[test]
    fn rejection_is_an_assertion_failure() {
        let err = FormOutcome::Rejected(text::EMAIL_IN_USE.into())
            .into_result("registration")
            .unwrap_err();
        assert_eq!(err.kind(), contactlist_common::FailureKind::Assertion);
        assert!(err.to_string().contains(text::EMAIL_IN_USE));
    }
}
