//! Page structure, routing, resilience and accessibility checks

use std::time::{Duration, Instant};

use async_trait::async_trait;
use contactlist_common::selectors::{self, paths, text};
use contactlist_common::{E2eError, E2eResult};

use crate::check;
use crate::runner::{Scenario, ScenarioContext};

/// Upper bound for the contact list to render after a direct visit
pub const MAX_LOAD_TIME: Duration = Duration::from_secs(5);

const VIEWPORTS: [(u32, u32); 3] = [(375, 667), (768, 1024), (1280, 720)];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationCase {
    PageTitle,
    Branding,
    ResponsiveViewports,
    ButtonStyling,
    NavigationFlow,
    ProtectedRedirect,
    BackForward,
    NetworkError,
    FormReset,
    LoadTime,
    RapidClicks,
    FormLabels,
    KeyboardNavigation,
    ButtonText,
}

impl NavigationCase {
    pub const ALL: &'static [NavigationCase] = &[
        NavigationCase::PageTitle,
        NavigationCase::Branding,
        NavigationCase::ResponsiveViewports,
        NavigationCase::ButtonStyling,
        NavigationCase::NavigationFlow,
        NavigationCase::ProtectedRedirect,
        NavigationCase::BackForward,
        NavigationCase::NetworkError,
        NavigationCase::FormReset,
        NavigationCase::LoadTime,
        NavigationCase::RapidClicks,
        NavigationCase::FormLabels,
        NavigationCase::KeyboardNavigation,
        NavigationCase::ButtonText,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            NavigationCase::PageTitle => "page_title",
            NavigationCase::Branding => "branding",
            NavigationCase::ResponsiveViewports => "responsive_viewports",
            NavigationCase::ButtonStyling => "button_styling",
            NavigationCase::NavigationFlow => "navigation_flow",
            NavigationCase::ProtectedRedirect => "protected_redirect",
            NavigationCase::BackForward => "back_forward",
            NavigationCase::NetworkError => "network_error",
            NavigationCase::FormReset => "form_reset",
            NavigationCase::LoadTime => "load_time",
            NavigationCase::RapidClicks => "rapid_clicks",
            NavigationCase::FormLabels => "form_labels",
            NavigationCase::KeyboardNavigation => "keyboard_navigation",
            NavigationCase::ButtonText => "button_text",
        }
    }

    fn area(&self) -> &'static str {
        use NavigationCase::*;
        match self {
            PageTitle | Branding | ResponsiveViewports | ButtonStyling => "styling",
            NavigationFlow | ProtectedRedirect | BackForward => "routing",
            NetworkError | FormReset => "forms",
            LoadTime | RapidClicks => "performance",
            FormLabels | KeyboardNavigation | ButtonText => "a11y",
        }
    }
}

pub struct NavigationScenario(pub NavigationCase);

pub fn scenarios() -> Vec<Box<dyn Scenario>> {
    NavigationCase::ALL
        .iter()
        .map(|case| Box::new(NavigationScenario(*case)) as Box<dyn Scenario>)
        .collect()
}

#[async_trait]
impl Scenario for NavigationScenario {
    fn name(&self) -> String {
        format!("navigation::{}", self.0.slug())
    }

    fn suite(&self) -> &'static str {
        "navigation"
    }

    fn tags(&self) -> Vec<&'static str> {
        vec!["ui", "navigation", self.0.area()]
    }

    fn needs_browser(&self) -> bool {
        true
    }

    /// Every case starts logged in on the contact list
    async fn setup(&self, ctx: &mut ScenarioContext) -> E2eResult<()> {
        ctx.sign_up_primary().await?;
        let credentials = ctx.user()?.credentials();
        ctx.ui()?.login(&credentials).await
    }

    async fn run(&self, ctx: &mut ScenarioContext) -> E2eResult<()> {
        match self.0 {
            NavigationCase::PageTitle => {
                let title = ctx.ui()?.page().title().await?;
                check::that(
                    "page title",
                    title.contains(text::CONTACT_LIST),
                    text::CONTACT_LIST,
                    title,
                )
            }
            NavigationCase::Branding => ctx.ui()?.expect_text(text::CONTACT_LIST).await,
            NavigationCase::ResponsiveViewports => {
                let ui = ctx.ui()?;
                for (width, height) in VIEWPORTS {
                    ui.page().set_viewport(width, height).await?;
                    ui.expect_text(text::CONTACT_LIST).await?;
                    ui.expect_visible(selectors::ADD_CONTACT).await?;
                }
                Ok(())
            }
            NavigationCase::ButtonStyling => {
                let ui = ctx.ui()?;
                for selector in [selectors::ADD_CONTACT, selectors::LOGOUT] {
                    ui.expect_visible(selector).await?;
                    let color = ui.page().css_value(selector, "background-color").await?;
                    check::that(
                        &format!("background-color of {}", selector),
                        !color.is_empty(),
                        "a computed color",
                        color,
                    )?;
                }
                Ok(())
            }
            NavigationCase::NavigationFlow => {
                let ui = ctx.ui()?;
                ui.expect_url_contains(paths::CONTACT_LIST).await?;
                ui.click(selectors::ADD_CONTACT).await?;
                ui.expect_url_contains(paths::ADD_CONTACT).await?;
                ui.click(selectors::CANCEL).await?;
                ui.expect_url_contains(paths::CONTACT_LIST).await?;
                ui.logout().await
            }
            NavigationCase::ProtectedRedirect => {
                let ui = ctx.ui()?;
                ui.logout().await?;
                for path in [paths::CONTACT_LIST, paths::ADD_CONTACT] {
                    ui.visit(path).await?;
                    ui.expect_url(paths::HOME).await?;
                }
                Ok(())
            }
            NavigationCase::BackForward => {
                let ui = ctx.ui()?;
                ui.click(selectors::ADD_CONTACT).await?;
                ui.expect_url_contains(paths::ADD_CONTACT).await?;
                ui.page().go_back().await?;
                ui.expect_url_contains(paths::CONTACT_LIST).await?;
                ui.page().go_forward().await?;
                ui.expect_url_contains(paths::ADD_CONTACT).await
            }
            NavigationCase::NetworkError => network_error(ctx).await,
            NavigationCase::FormReset => {
                let ui = ctx.ui()?;
                ui.click(selectors::ADD_CONTACT).await?;
                ui.type_into(selectors::FIRST_NAME, "Test").await?;
                ui.type_into(selectors::LAST_NAME, "User").await?;
                ui.type_into(selectors::EMAIL, "test@example.com").await?;
                ui.click(selectors::CANCEL).await?;
                ui.click(selectors::ADD_CONTACT).await?;
                for selector in [selectors::FIRST_NAME, selectors::LAST_NAME, selectors::EMAIL] {
                    ui.expect_value(selector, "").await?;
                }
                Ok(())
            }
            NavigationCase::LoadTime => {
                let ui = ctx.ui()?;
                let start = Instant::now();
                ui.visit(paths::CONTACT_LIST).await?;
                ui.expect_text(text::CONTACT_LIST).await?;
                let elapsed = start.elapsed();
                check::that(
                    "contact list load time",
                    elapsed < MAX_LOAD_TIME,
                    MAX_LOAD_TIME,
                    elapsed,
                )
            }
            NavigationCase::RapidClicks => rapid_clicks(ctx).await,
            NavigationCase::FormLabels => {
                let ui = ctx.ui()?;
                ui.click(selectors::ADD_CONTACT).await?;
                for selector in [selectors::FIRST_NAME, selectors::LAST_NAME, selectors::EMAIL] {
                    ui.expect_visible(selector).await?;
                    let id = ui.page().attribute(selector, "id").await?;
                    check::equal(
                        &format!("id attribute of {}", selector),
                        Some(&selector[1..]),
                        id.as_deref(),
                    )?;
                }
                Ok(())
            }
            NavigationCase::KeyboardNavigation => {
                let ui = ctx.ui()?;
                ui.expect_visible(selectors::ADD_CONTACT).await?;
                ui.page().press("Tab").await?;
                ui.expect_focused("add-contact").await?;
                ui.page().press("Tab").await?;
                ui.expect_focused("logout").await?;
                ui.page().press("Shift+Tab").await?;
                ui.expect_focused("add-contact").await
            }
            NavigationCase::ButtonText => {
                let ui = ctx.ui()?;
                for (selector, label) in [
                    (selectors::ADD_CONTACT, text::ADD_NEW_CONTACT),
                    (selectors::LOGOUT, text::LOGOUT),
                ] {
                    let content = ui.text_of(selector).await?;
                    check::that(
                        &format!("text of {}", selector),
                        content.contains(label),
                        label,
                        content,
                    )?;
                }
                Ok(())
            }
        }
    }
}

/// A failed sign-up request must leave a working form, not a broken page
async fn network_error(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let user = ctx.fixtures.generate_user();
    // tracked in case the request slips through
    ctx.track_user(&user);

    let ui = ctx.ui()?;
    ui.page().abort_requests("POST", "/users").await?;
    ui.logout().await?;
    ui.fill_registration(&user).await?;
    ui.click(selectors::SUBMIT).await?;

    ui.expect_url_contains(paths::ADD_USER).await?;
    ui.expect_visible(selectors::SUBMIT).await?;
    ui.expect_visible(selectors::FIRST_NAME).await
}

/// Only the first of several quick clicks may navigate
async fn rapid_clicks(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let ui = ctx.ui()?;
    ui.expect_visible(selectors::ADD_CONTACT).await?;
    for _ in 0..3 {
        // later clicks may find the button already gone
        match ui.page().click(selectors::ADD_CONTACT).await {
            Ok(()) | Err(E2eError::ElementNotFound(_)) => {}
            Err(e) => return Err(e),
        }
    }
    ui.expect_url_contains(paths::ADD_CONTACT).await?;
    ui.expect_text(text::ADD_CONTACT).await?;

    ui.page().go_back().await?;
    ui.expect_url_contains(paths::CONTACT_LIST).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_case_has_an_area() {
        for case in NavigationCase::ALL {
            assert!(!case.area().is_empty());
        }
        assert_eq!(NavigationCase::ALL.len(), 14);
    }

    #[test]
    fn viewports_cover_mobile_to_desktop() {
        assert_eq!(VIEWPORTS.first(), Some(&(375, 667)));
        assert_eq!(VIEWPORTS.last(), Some(&(1280, 720)));
    }
}
