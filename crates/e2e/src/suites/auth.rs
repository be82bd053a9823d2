//! Login and registration through the browser

use async_trait::async_trait;
use contactlist_common::fixtures::UserOverrides;
use contactlist_common::selectors::{self, paths, text};
use contactlist_common::E2eResult;

use crate::actions::FormOutcome;
use crate::check;
use crate::runner::{Scenario, ScenarioContext};
use crate::wait::Condition;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthCase {
    HomepageLoginForm,
    SignUpLink,
    SignUpNavigates,
    RegistrationForm,
    RegisterSuccess,
    RegisterDuplicateEmail,
    RegisterRequiredFields,
    RegisterCancel,
    LoginValid,
    LoginInvalid,
    LoginEmpty,
}

impl AuthCase {
    pub const ALL: &'static [AuthCase] = &[
        AuthCase::HomepageLoginForm,
        AuthCase::SignUpLink,
        AuthCase::SignUpNavigates,
        AuthCase::RegistrationForm,
        AuthCase::RegisterSuccess,
        AuthCase::RegisterDuplicateEmail,
        AuthCase::RegisterRequiredFields,
        AuthCase::RegisterCancel,
        AuthCase::LoginValid,
        AuthCase::LoginInvalid,
        AuthCase::LoginEmpty,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            AuthCase::HomepageLoginForm => "homepage_login_form",
            AuthCase::SignUpLink => "sign_up_link",
            AuthCase::SignUpNavigates => "sign_up_navigates",
            AuthCase::RegistrationForm => "registration_form",
            AuthCase::RegisterSuccess => "register_success",
            AuthCase::RegisterDuplicateEmail => "register_duplicate_email",
            AuthCase::RegisterRequiredFields => "register_required_fields",
            AuthCase::RegisterCancel => "register_cancel",
            AuthCase::LoginValid => "login_valid",
            AuthCase::LoginInvalid => "login_invalid",
            AuthCase::LoginEmpty => "login_empty",
        }
    }

    fn area(&self) -> &'static str {
        match self {
            AuthCase::HomepageLoginForm | AuthCase::SignUpLink | AuthCase::SignUpNavigates => {
                "homepage"
            }
            AuthCase::LoginValid | AuthCase::LoginInvalid | AuthCase::LoginEmpty => "login",
            _ => "registration",
        }
    }
}

pub struct AuthScenario(pub AuthCase);

pub fn scenarios() -> Vec<Box<dyn Scenario>> {
    AuthCase::ALL
        .iter()
        .map(|case| Box::new(AuthScenario(*case)) as Box<dyn Scenario>)
        .collect()
}

#[async_trait]
impl Scenario for AuthScenario {
    fn name(&self) -> String {
        format!("auth::{}", self.0.slug())
    }

    fn suite(&self) -> &'static str {
        "auth"
    }

    fn tags(&self) -> Vec<&'static str> {
        vec!["ui", "auth", self.0.area()]
    }

    fn needs_browser(&self) -> bool {
        true
    }

    async fn setup(&self, ctx: &mut ScenarioContext) -> E2eResult<()> {
        if self.0 == AuthCase::LoginValid {
            ctx.sign_up_primary().await?;
        }
        let start = match self.0.area() {
            "registration" => paths::ADD_USER,
            _ => paths::HOME,
        };
        ctx.ui()?.visit(start).await
    }

    async fn run(&self, ctx: &mut ScenarioContext) -> E2eResult<()> {
        match self.0 {
            AuthCase::HomepageLoginForm => {
                let ui = ctx.ui()?;
                ui.expect_text(text::APP_TITLE).await?;
                ui.expect_text(text::LOG_IN).await?;
                for selector in [selectors::EMAIL, selectors::PASSWORD, selectors::SUBMIT] {
                    ui.expect_visible(selector).await?;
                }
                Ok(())
            }
            AuthCase::SignUpLink => {
                let ui = ctx.ui()?;
                ui.expect_text(text::SIGN_UP_PROMPT).await?;
                let label = ui.text_of(selectors::SIGNUP).await?;
                check::that("sign up link", label.contains(text::SIGN_UP), text::SIGN_UP, label)
            }
            AuthCase::SignUpNavigates => {
                let ui = ctx.ui()?;
                ui.click(selectors::SIGNUP).await?;
                ui.expect_url_contains(paths::ADD_USER).await?;
                ui.expect_text(text::ADD_USER).await
            }
            AuthCase::RegistrationForm => {
                let ui = ctx.ui()?;
                ui.expect_text(text::ADD_USER).await?;
                for selector in [
                    selectors::FIRST_NAME,
                    selectors::LAST_NAME,
                    selectors::EMAIL,
                    selectors::PASSWORD,
                    selectors::SUBMIT,
                ] {
                    ui.expect_visible(selector).await?;
                }
                Ok(())
            }
            AuthCase::RegisterSuccess => register_success(ctx).await,
            AuthCase::RegisterDuplicateEmail => register_duplicate_email(ctx).await,
            AuthCase::RegisterRequiredFields => {
                let ui = ctx.ui()?;
                ui.click(selectors::SUBMIT).await?;
                ui.expect_url_contains(paths::ADD_USER).await
            }
            AuthCase::RegisterCancel => {
                let ui = ctx.ui()?;
                let label = ui.text_of(selectors::CANCEL).await?;
                check::that("cancel button", label.contains(text::CANCEL), text::CANCEL, label)?;
                ui.click(selectors::CANCEL).await?;
                ui.expect_url_contains(paths::LOGIN).await
            }
            AuthCase::LoginValid => {
                let credentials = ctx.user()?.credentials();
                let ui = ctx.ui()?;
                ui.login(&credentials).await?;
                ui.expect_url_contains(paths::CONTACT_LIST).await?;
                ui.expect_text(text::CONTACT_LIST).await
            }
            AuthCase::LoginInvalid => {
                let ui = ctx.ui()?;
                ui.type_into(selectors::EMAIL, "invalid@example.com").await?;
                ui.type_into(selectors::PASSWORD, "wrongpassword").await?;
                ui.click(selectors::SUBMIT).await?;
                let message = ui.text_of(selectors::ERROR).await?;
                check::that(
                    "login error",
                    message.contains(text::BAD_CREDENTIALS),
                    text::BAD_CREDENTIALS,
                    &message,
                )?;
                ui.expect_url(paths::HOME).await
            }
            AuthCase::LoginEmpty => {
                let ui = ctx.ui()?;
                ui.click(selectors::SUBMIT).await?;
                ui.expect_url(paths::HOME).await
            }
        }
    }
}

async fn register_success(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let user = ctx.fixtures.generate_user_with(UserOverrides {
        first_name: Some("Test".into()),
        last_name: Some("User".into()),
        password: Some("myPassword123!".into()),
        ..Default::default()
    });
    ctx.track_user(&user);

    let ui = ctx.ui()?;
    ui.register(&user).await?;
    ui.expect_text(text::CONTACT_LIST).await?;
    ui.expect_text(text::ADD_NEW_CONTACT).await
}

async fn register_duplicate_email(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let first = ctx.fixtures.generate_user();
    ctx.track_user(&first);
    let again = ctx.fixtures.generate_user_with(UserOverrides {
        first_name: Some("Another".into()),
        email: Some(first.email.clone()),
        password: Some("anotherPassword".into()),
        ..Default::default()
    });

    let ui = ctx.ui()?;
    ui.register(&first).await?;
    ui.logout().await?;

    match ui.try_register(&again).await? {
        FormOutcome::Rejected(message) => {
            check::that(
                "duplicate sign-up error",
                message.contains(text::EMAIL_IN_USE),
                text::EMAIL_IN_USE,
                &message,
            )?;
            ui.wait_for(Condition::url_contains(paths::ADD_USER)).await
        }
        FormOutcome::Accepted => Err(contactlist_common::E2eError::assertion(
            "second sign-up with the same email",
            "rejection",
            "accepted",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_case_needs_a_browser() {
        assert!(AuthCase::ALL
            .iter()
            .all(|case| AuthScenario(*case).needs_browser()));
    }

    #[test]
    fn tags_group_by_page() {
        assert!(AuthScenario(AuthCase::LoginEmpty).tags().contains(&"login"));
        assert!(AuthScenario(AuthCase::RegisterCancel)
            .tags()
            .contains(&"registration"));
        assert_eq!(
            AuthScenario(AuthCase::SignUpLink).name(),
            "auth::sign_up_link"
        );
    }
}
