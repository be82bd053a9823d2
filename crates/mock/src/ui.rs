//! Simulated browser page over the mock store
//!
//! Renders each application page as a flat list of elements and applies
//! clicks, form input and navigation the way the real single-page app does:
//! protected pages bounce to `/` without a session, failed submissions keep
//! the page and show `#error`, and deleting a contact re-renders a shorter
//! table.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use contactlist_common::selectors::{self, paths, text};
use contactlist_common::{Contact, E2eError, E2eResult, Page, PageFactory};
use tracing::debug;

use crate::store::{ContactInput, SharedStore, UserInput};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Route {
    Home,
    Login,
    AddUser,
    ContactList,
    AddContact,
    ContactDetails(String),
    EditContact(String),
}

impl Route {
    fn path(&self) -> &'static str {
        match self {
            Route::Home => paths::HOME,
            Route::Login => paths::LOGIN,
            Route::AddUser => paths::ADD_USER,
            Route::ContactList => paths::CONTACT_LIST,
            Route::AddContact => paths::ADD_CONTACT,
            Route::ContactDetails(_) => paths::CONTACT_DETAILS,
            Route::EditContact(_) => paths::EDIT_CONTACT,
        }
    }

    fn is_protected(&self) -> bool {
        !matches!(self, Route::Home | Route::Login | Route::AddUser)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Control {
    Submit,
    Cancel,
    SignUp,
    Logout,
    AddContact,
    EditContact,
    Delete,
    Return,
}

#[derive(Debug, Clone)]
enum Role {
    Text,
    Input,
    Button(Control),
    Row(String),
    Table,
}

#[derive(Debug, Clone)]
struct Element {
    selector: Option<&'static str>,
    text: String,
    role: Role,
}

impl Element {
    fn text(text: impl Into<String>) -> Self {
        Self {
            selector: None,
            text: text.into(),
            role: Role::Text,
        }
    }

    fn input(selector: &'static str) -> Self {
        Self {
            selector: Some(selector),
            text: String::new(),
            role: Role::Input,
        }
    }

    fn button(selector: &'static str, label: &str, control: Control) -> Self {
        Self {
            selector: Some(selector),
            text: label.to_string(),
            role: Role::Button(control),
        }
    }

    fn matches(&self, selector: &str) -> bool {
        self.selector == Some(selector)
    }

    fn is_focusable(&self) -> bool {
        self.selector.is_some() && matches!(self.role, Role::Input | Role::Button(_))
    }

    /// `id` or class name without the leading sigil
    fn name(&self) -> Option<&'static str> {
        self.selector.map(|s| &s[1..])
    }
}

/// Simulated tab on the mock application
pub struct MockPage {
    store: SharedStore,
    base_url: String,
    history: Vec<Route>,
    position: usize,
    token: Option<String>,
    /// Last contact opened, restored when `/contactDetails` is visited directly
    selected: Option<String>,
    form: HashMap<&'static str, String>,
    error: Option<String>,
    focus: Option<usize>,
    viewport: (u32, u32),
    aborted: Vec<(String, String)>,
    artifact_dir: PathBuf,
}

impl MockPage {
    pub fn new(store: SharedStore, base_url: impl Into<String>, artifact_dir: PathBuf) -> Self {
        Self {
            store,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            history: vec![Route::Home],
            position: 0,
            token: None,
            selected: None,
            form: HashMap::new(),
            error: None,
            focus: None,
            viewport: (1280, 720),
            aborted: Vec::new(),
            artifact_dir,
        }
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    fn route(&self) -> &Route {
        &self.history[self.position]
    }

    fn session_user(&self) -> Option<String> {
        let token = self.token.as_deref()?;
        self.store.read().authenticate(token).ok()
    }

    fn navigate(&mut self, route: Route) {
        let route = if route.is_protected() && self.session_user().is_none() {
            Route::Home
        } else {
            route
        };
        debug!(path = route.path(), "mock page navigate");
        self.history.truncate(self.position + 1);
        self.history.push(route);
        self.position = self.history.len() - 1;
        self.enter_current();
    }

    /// Reset per-page state after the current route changed
    fn enter_current(&mut self) {
        self.form.clear();
        self.error = None;
        self.focus = None;

        match self.route().clone() {
            Route::ContactDetails(id) => self.selected = Some(id),
            Route::EditContact(id) => {
                self.selected = Some(id.clone());
                if let Some(contact) = self.contact(&id) {
                    self.prefill(&contact);
                }
            }
            _ => {}
        }
    }

    fn contact(&self, id: &str) -> Option<Contact> {
        let owner = self.session_user()?;
        self.store.read().contact(&owner, id).ok()
    }

    fn prefill(&mut self, c: &Contact) {
        let values = [
            (selectors::FIRST_NAME, Some(c.first_name.clone())),
            (selectors::LAST_NAME, Some(c.last_name.clone())),
            (
                selectors::BIRTHDATE,
                c.birthdate.map(|d| d.format("%Y-%m-%d").to_string()),
            ),
            (selectors::EMAIL, c.email.clone()),
            (selectors::PHONE, c.phone.clone()),
            (selectors::STREET1, c.street1.clone()),
            (selectors::STREET2, c.street2.clone()),
            (selectors::CITY, c.city.clone()),
            (selectors::STATE_PROVINCE, c.state_province.clone()),
            (selectors::POSTAL_CODE, c.postal_code.clone()),
            (selectors::COUNTRY, c.country.clone()),
        ];
        for (selector, value) in values {
            if let Some(value) = value {
                self.form.insert(selector, value);
            }
        }
    }

    fn field(&self, selector: &'static str) -> Option<String> {
        self.form.get(selector).filter(|v| !v.is_empty()).cloned()
    }

    fn is_aborted(&self, method: &str, path: &str) -> bool {
        self.aborted
            .iter()
            .any(|(m, suffix)| m.eq_ignore_ascii_case(method) && path.ends_with(suffix.as_str()))
    }

    fn render(&self) -> Vec<Element> {
        let mut out = Vec::new();
        match self.route().clone() {
            Route::Home | Route::Login => {
                out.push(Element::text(text::APP_TITLE));
                out.push(Element::text(text::LOG_IN));
                out.push(Element::input(selectors::EMAIL));
                out.push(Element::input(selectors::PASSWORD));
                out.push(Element::button(selectors::SUBMIT, "Submit", Control::Submit));
                out.push(Element::text(text::SIGN_UP_PROMPT));
                out.push(Element::button(selectors::SIGNUP, text::SIGN_UP, Control::SignUp));
            }
            Route::AddUser => {
                out.push(Element::text(text::ADD_USER));
                for selector in [
                    selectors::FIRST_NAME,
                    selectors::LAST_NAME,
                    selectors::EMAIL,
                    selectors::PASSWORD,
                ] {
                    out.push(Element::input(selector));
                }
                out.push(Element::button(selectors::SUBMIT, "Submit", Control::Submit));
                out.push(Element::button(selectors::CANCEL, text::CANCEL, Control::Cancel));
            }
            Route::ContactList => {
                out.push(Element::text(text::CONTACT_LIST));
                out.push(Element::button(
                    selectors::ADD_CONTACT,
                    text::ADD_NEW_CONTACT,
                    Control::AddContact,
                ));
                out.push(Element::button(selectors::LOGOUT, text::LOGOUT, Control::Logout));
                out.push(Element {
                    selector: Some(selectors::CONTACT_TABLE),
                    text: "Name Birthdate Email Phone Address City, State/Province, Postal Code Country".into(),
                    role: Role::Table,
                });
                let contacts = match self.session_user() {
                    Some(owner) => self.store.read().list_contacts(&owner),
                    None => Vec::new(),
                };
                for c in contacts {
                    out.push(Element {
                        selector: Some(selectors::CONTACT_ROW),
                        text: row_text(&c),
                        role: Role::Row(c.id.clone()),
                    });
                }
            }
            Route::AddContact | Route::EditContact(_) => {
                let heading = if matches!(self.route(), Route::AddContact) {
                    text::ADD_CONTACT
                } else {
                    text::EDIT_CONTACT
                };
                out.push(Element::text(heading));
                out.push(Element::button(selectors::LOGOUT, text::LOGOUT, Control::Logout));
                for selector in selectors::CONTACT_FORM_FIELDS {
                    out.push(Element::input(selector));
                }
                out.push(Element::button(selectors::SUBMIT, "Submit", Control::Submit));
                out.push(Element::button(selectors::CANCEL, text::CANCEL, Control::Cancel));
            }
            Route::ContactDetails(id) => {
                out.push(Element::text(text::CONTACT_DETAILS));
                out.push(Element::button(selectors::LOGOUT, text::LOGOUT, Control::Logout));
                out.push(Element::button(
                    selectors::EDIT_CONTACT,
                    text::EDIT_CONTACT,
                    Control::EditContact,
                ));
                out.push(Element::button(selectors::DELETE, "Delete Contact", Control::Delete));
                out.push(Element::button(
                    selectors::RETURN,
                    "Return to Contact List",
                    Control::Return,
                ));
                if let Some(c) = self.contact(&id) {
                    for value in detail_values(&c) {
                        out.push(Element::text(value));
                    }
                }
            }
        }

        if let Some(message) = &self.error {
            out.push(Element {
                selector: Some(selectors::ERROR),
                text: message.clone(),
                role: Role::Text,
            });
        }
        out
    }

    fn find(&self, selector: &str) -> E2eResult<Element> {
        self.render()
            .into_iter()
            .find(|e| e.matches(selector))
            .ok_or_else(|| E2eError::ElementNotFound(selector.to_string()))
    }

    fn focusables(&self) -> Vec<Element> {
        self.render().into_iter().filter(Element::is_focusable).collect()
    }

    fn activate(&mut self, element: Element) {
        match element.role {
            Role::Button(control) => self.press_control(control),
            Role::Row(id) => self.navigate(Route::ContactDetails(id)),
            Role::Input => {
                let selector = element.selector;
                self.focus = self
                    .focusables()
                    .iter()
                    .position(|e| e.selector == selector);
            }
            Role::Text | Role::Table => {}
        }
    }

    fn press_control(&mut self, control: Control) {
        let route = self.route().clone();
        match (control, route) {
            (Control::Submit, Route::Home | Route::Login) => self.submit_login(),
            (Control::Submit, Route::AddUser) => self.submit_registration(),
            (Control::Submit, Route::AddContact) => self.submit_contact(None),
            (Control::Submit, Route::EditContact(id)) => self.submit_contact(Some(id)),
            (Control::Cancel, Route::AddUser) => self.navigate(Route::Login),
            (Control::Cancel, Route::AddContact) => self.navigate(Route::ContactList),
            (Control::Cancel, Route::EditContact(id)) => self.navigate(Route::ContactDetails(id)),
            (Control::SignUp, _) => self.navigate(Route::AddUser),
            (Control::Logout, _) => {
                if let Some(token) = self.token.take() {
                    let _ = self.store.write().logout(&token);
                }
                self.navigate(Route::Home);
            }
            (Control::AddContact, _) => self.navigate(Route::AddContact),
            (Control::EditContact, Route::ContactDetails(id)) => {
                self.navigate(Route::EditContact(id))
            }
            (Control::Delete, Route::ContactDetails(id)) => {
                if let Some(owner) = self.session_user() {
                    let _ = self.store.write().delete_contact(&owner, &id);
                }
                self.navigate(Route::ContactList);
            }
            (Control::Return, _) => self.navigate(Route::ContactList),
            _ => {}
        }
    }

    fn submit_login(&mut self) {
        let (Some(email), Some(password)) =
            (self.field(selectors::EMAIL), self.field(selectors::PASSWORD))
        else {
            return;
        };
        if self.is_aborted("POST", "/users/login") {
            self.error = Some("TypeError: Failed to fetch".into());
            return;
        }
        let result = self.store.write().login(&email, &password);
        match result {
            Ok((_, token)) => {
                self.token = Some(token);
                self.navigate(Route::ContactList);
            }
            Err(e) => self.error = Some(e.to_string()),
        }
    }

    fn submit_registration(&mut self) {
        let input = UserInput {
            first_name: self.field(selectors::FIRST_NAME),
            last_name: self.field(selectors::LAST_NAME),
            email: self.field(selectors::EMAIL),
            password: self.field(selectors::PASSWORD),
        };
        // every sign-up input carries `required`
        if input.first_name.is_none()
            || input.last_name.is_none()
            || input.email.is_none()
            || input.password.is_none()
        {
            return;
        }
        if self.is_aborted("POST", "/users") {
            self.error = Some("TypeError: Failed to fetch".into());
            return;
        }
        let result = self.store.write().register(input);
        match result {
            Ok((_, token)) => {
                self.token = Some(token);
                self.navigate(Route::ContactList);
            }
            Err(e) => self.error = Some(e.to_string()),
        }
    }

    fn submit_contact(&mut self, existing: Option<String>) {
        let Some(owner) = self.session_user() else {
            self.navigate(Route::Home);
            return;
        };
        let input = ContactInput {
            first_name: self.field(selectors::FIRST_NAME),
            last_name: self.field(selectors::LAST_NAME),
            birthdate: self.field(selectors::BIRTHDATE),
            email: self.field(selectors::EMAIL),
            phone: self.field(selectors::PHONE),
            street1: self.field(selectors::STREET1),
            street2: self.field(selectors::STREET2),
            city: self.field(selectors::CITY),
            state_province: self.field(selectors::STATE_PROVINCE),
            postal_code: self.field(selectors::POSTAL_CODE),
            country: self.field(selectors::COUNTRY),
        };

        let result = match &existing {
            Some(id) => self.store.write().replace_contact(&owner, id, input),
            None => self.store.write().create_contact(&owner, input),
        };
        match (result, existing) {
            (Ok(_), Some(id)) => self.navigate(Route::ContactDetails(id)),
            (Ok(_), None) => self.navigate(Route::ContactList),
            (Err(e), _) => self.error = Some(e.to_string()),
        }
    }
}

fn row_text(c: &Contact) -> String {
    let mut parts = vec![c.full_name()];
    parts.extend(c.birthdate.map(|d| d.format("%Y-%m-%d").to_string()));
    parts.extend(c.email.clone());
    parts.extend(c.phone.clone());
    parts.extend(c.street1.clone());
    parts.extend(c.street2.clone());
    parts.extend(c.city.clone());
    parts.extend(c.state_province.clone());
    parts.extend(c.postal_code.clone());
    parts.extend(c.country.clone());
    parts.join(" ")
}

fn detail_values(c: &Contact) -> Vec<String> {
    let mut values = vec![c.first_name.clone(), c.last_name.clone()];
    values.extend(c.birthdate.map(|d| d.format("%Y-%m-%d").to_string()));
    for v in [
        &c.email,
        &c.phone,
        &c.street1,
        &c.street2,
        &c.city,
        &c.state_province,
        &c.postal_code,
        &c.country,
    ] {
        values.extend(v.clone());
    }
    values
}

#[async_trait]
impl Page for MockPage {
    async fn goto(&mut self, path: &str) -> E2eResult<()> {
        let path = path.strip_prefix(&self.base_url).unwrap_or(path);
        let route = match path.trim_end_matches('/') {
            "" => Route::Home,
            p if p == paths::LOGIN => Route::Login,
            p if p == paths::ADD_USER => Route::AddUser,
            p if p == paths::CONTACT_LIST => Route::ContactList,
            p if p == paths::ADD_CONTACT => Route::AddContact,
            p if p == paths::CONTACT_DETAILS => match self.selected.clone() {
                Some(id) => Route::ContactDetails(id),
                None => Route::ContactList,
            },
            p if p == paths::EDIT_CONTACT => match self.selected.clone() {
                Some(id) => Route::EditContact(id),
                None => Route::ContactList,
            },
            _ => Route::Home,
        };
        self.navigate(route);
        Ok(())
    }

    async fn current_url(&mut self) -> E2eResult<String> {
        Ok(format!("{}{}", self.base_url, self.route().path()))
    }

    async fn title(&mut self) -> E2eResult<String> {
        Ok(text::APP_TITLE.to_string())
    }

    async fn count(&mut self, selector: &str) -> E2eResult<usize> {
        Ok(self.render().iter().filter(|e| e.matches(selector)).count())
    }

    async fn is_visible(&mut self, selector: &str) -> E2eResult<bool> {
        Ok(self.render().iter().any(|e| e.matches(selector)))
    }

    async fn text_visible(&mut self, needle: &str) -> E2eResult<bool> {
        Ok(self.render().iter().any(|e| e.text.contains(needle)))
    }

    async fn click(&mut self, selector: &str) -> E2eResult<()> {
        let element = self.find(selector)?;
        self.activate(element);
        Ok(())
    }

    async fn click_text(&mut self, needle: &str) -> E2eResult<()> {
        let element = self
            .render()
            .into_iter()
            .find(|e| e.text.contains(needle))
            .ok_or_else(|| E2eError::ElementNotFound(format!("text={}", needle)))?;
        self.activate(element);
        Ok(())
    }

    async fn fill(&mut self, selector: &str, value: &str) -> E2eResult<()> {
        let element = self.find(selector)?;
        match (element.role, element.selector) {
            (Role::Input, Some(key)) => {
                self.form.insert(key, value.to_string());
                Ok(())
            }
            _ => Err(E2eError::Driver(format!("{} is not an input", selector))),
        }
    }

    async fn input_value(&mut self, selector: &str) -> E2eResult<String> {
        let element = self.find(selector)?;
        Ok(element
            .selector
            .and_then(|key| self.form.get(key).cloned())
            .unwrap_or_default())
    }

    async fn text_content(&mut self, selector: &str) -> E2eResult<String> {
        Ok(self.find(selector)?.text)
    }

    async fn attribute(&mut self, selector: &str, name: &str) -> E2eResult<Option<String>> {
        let element = self.find(selector)?;
        let value = match name {
            "id" if selector.starts_with('#') => element.name().map(String::from),
            "class" if selector.starts_with('.') => element.name().map(String::from),
            "value" => element.selector.and_then(|key| self.form.get(key).cloned()),
            _ => None,
        };
        Ok(value)
    }

    async fn css_value(&mut self, selector: &str, property: &str) -> E2eResult<String> {
        let element = self.find(selector)?;
        let value = match (property, &element.role) {
            ("background-color", Role::Button(_)) => "rgb(0, 123, 255)",
            ("background-color", _) => "rgba(0, 0, 0, 0)",
            ("display", _) => "block",
            _ => "",
        };
        Ok(value.to_string())
    }

    async fn press(&mut self, key: &str) -> E2eResult<()> {
        let focusables = self.focusables();
        if focusables.is_empty() {
            return Ok(());
        }
        match key {
            "Tab" => {
                self.focus = Some(self.focus.map_or(0, |i| (i + 1) % focusables.len()));
            }
            "Shift+Tab" => {
                let last = focusables.len() - 1;
                self.focus = Some(self.focus.map_or(last, |i| i.checked_sub(1).unwrap_or(last)));
            }
            "Enter" => {
                if let Some(element) = self.focus.and_then(|i| focusables.get(i).cloned()) {
                    self.activate(element);
                }
            }
            _ => {}
        }
        Ok(())
    }

    async fn focused_id(&mut self) -> E2eResult<Option<String>> {
        let focusables = self.focusables();
        Ok(self
            .focus
            .and_then(|i| focusables.get(i))
            .and_then(Element::name)
            .map(String::from))
    }

    async fn go_back(&mut self) -> E2eResult<()> {
        if self.position > 0 {
            self.position -= 1;
            self.enter_current();
        }
        Ok(())
    }

    async fn go_forward(&mut self) -> E2eResult<()> {
        if self.position + 1 < self.history.len() {
            self.position += 1;
            self.enter_current();
        }
        Ok(())
    }

    async fn set_viewport(&mut self, width: u32, height: u32) -> E2eResult<()> {
        self.viewport = (width, height);
        Ok(())
    }

    async fn abort_requests(&mut self, method: &str, url_suffix: &str) -> E2eResult<()> {
        self.aborted.push((method.to_string(), url_suffix.to_string()));
        Ok(())
    }

    /// Writes a text dump of the rendered page instead of an image
    async fn screenshot(&mut self, name: &str) -> E2eResult<PathBuf> {
        tokio::fs::create_dir_all(&self.artifact_dir).await?;
        let path = self.artifact_dir.join(format!("{}.txt", name));
        let mut dump = format!("{}{}\n", self.base_url, self.route().path());
        for element in self.render() {
            dump.push_str(&format!("{} {:?}\n", element.selector.unwrap_or("-"), element.text));
        }
        tokio::fs::write(&path, dump).await?;
        Ok(path)
    }

    async fn close(&mut self) -> E2eResult<()> {
        if let Some(token) = self.token.take() {
            // browser sessions end without an explicit logout
            debug!(token_len = token.len(), "mock page closed with live session");
        }
        Ok(())
    }
}

/// Hands out fresh `MockPage`s sharing one store
#[derive(Clone)]
pub struct MockPageFactory {
    store: SharedStore,
    base_url: String,
    artifact_dir: PathBuf,
}

impl MockPageFactory {
    pub fn new(store: SharedStore, base_url: impl Into<String>, artifact_dir: PathBuf) -> Self {
        Self {
            store,
            base_url: base_url.into(),
            artifact_dir,
        }
    }
}

#[async_trait]
impl PageFactory for MockPageFactory {
    async fn open(&self) -> E2eResult<Box<dyn Page>> {
        Ok(Box::new(MockPage::new(
            self.store.clone(),
            self.base_url.clone(),
            self.artifact_dir.clone(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;

    fn page() -> MockPage {
        MockPage::new(Store::shared(), "http://mock.local", std::env::temp_dir())
    }

    async fn sign_up(page: &mut MockPage, email: &str) {
        page.goto(paths::ADD_USER).await.unwrap();
        page.fill(selectors::FIRST_NAME, "Test").await.unwrap();
        page.fill(selectors::LAST_NAME, "User").await.unwrap();
        page.fill(selectors::EMAIL, email).await.unwrap();
        page.fill(selectors::PASSWORD, "myPassword123!").await.unwrap();
        page.click(selectors::SUBMIT).await.unwrap();
    }

    #[tokio::test]
    async fn protected_pages_redirect_home_without_session() {
        let mut page = page();
        page.goto(paths::CONTACT_LIST).await.unwrap();
        assert_eq!(page.current_url().await.unwrap(), "http://mock.local/");
        assert!(page.text_visible(text::LOG_IN).await.unwrap());
    }

    #[tokio::test]
    async fn viewport_defaults_to_desktop_and_can_be_resized() {
        let mut page = page();
        assert_eq!(page.viewport(), (1280, 720));
        page.set_viewport(375, 667).await.unwrap();
        assert_eq!(page.viewport(), (375, 667));
    }

    #[tokio::test]
    async fn sign_up_lands_on_contact_list() {
        let mut page = page();
        sign_up(&mut page, "ui@example.com").await;
        assert_eq!(page.current_url().await.unwrap(), "http://mock.local/contactList");
        assert_eq!(page.count(selectors::CONTACT_ROW).await.unwrap(), 0);
        assert!(page.is_visible(selectors::LOGOUT).await.unwrap());
    }

    #[tokio::test]
    async fn bad_login_shows_error_and_stays() {
        let mut page = page();
        page.goto("/").await.unwrap();
        page.fill(selectors::EMAIL, "nobody@example.com").await.unwrap();
        page.fill(selectors::PASSWORD, "wrongpassword").await.unwrap();
        page.click(selectors::SUBMIT).await.unwrap();

        assert_eq!(
            page.text_content(selectors::ERROR).await.unwrap(),
            text::BAD_CREDENTIALS
        );
        assert_eq!(page.current_url().await.unwrap(), "http://mock.local/");
    }

    #[tokio::test]
    async fn deleting_a_row_shrinks_the_table() {
        let mut page = page();
        sign_up(&mut page, "rows@example.com").await;
        for name in ["A", "B", "C"] {
            page.click(selectors::ADD_CONTACT).await.unwrap();
            page.fill(selectors::FIRST_NAME, name).await.unwrap();
            page.fill(selectors::LAST_NAME, "Row").await.unwrap();
            page.click(selectors::SUBMIT).await.unwrap();
        }
        assert_eq!(page.count(selectors::CONTACT_ROW).await.unwrap(), 3);

        page.click(selectors::CONTACT_ROW).await.unwrap();
        assert!(page.text_visible("A").await.unwrap());
        page.click(selectors::DELETE).await.unwrap();

        assert_eq!(page.count(selectors::CONTACT_ROW).await.unwrap(), 2);
        assert_eq!(
            page.text_content(selectors::CONTACT_ROW).await.unwrap(),
            "B Row"
        );
    }

    #[tokio::test]
    async fn tab_order_on_contact_list() {
        let mut page = page();
        sign_up(&mut page, "tab@example.com").await;
        page.press("Tab").await.unwrap();
        assert_eq!(page.focused_id().await.unwrap().as_deref(), Some("add-contact"));
        page.press("Tab").await.unwrap();
        assert_eq!(page.focused_id().await.unwrap().as_deref(), Some("logout"));
    }

    #[tokio::test]
    async fn history_moves_between_pages() {
        let mut page = page();
        sign_up(&mut page, "hist@example.com").await;
        page.click(selectors::ADD_CONTACT).await.unwrap();
        page.go_back().await.unwrap();
        assert!(page.current_url().await.unwrap().ends_with(paths::CONTACT_LIST));
        page.go_forward().await.unwrap();
        assert!(page.current_url().await.unwrap().ends_with(paths::ADD_CONTACT));
    }

    #[tokio::test]
    async fn aborted_registration_keeps_the_form() {
        let mut page = page();
        page.abort_requests("POST", "/users").await.unwrap();
        sign_up(&mut page, "net@example.com").await;
        assert!(page.current_url().await.unwrap().ends_with(paths::ADD_USER));
        assert!(page.is_visible(selectors::ERROR).await.unwrap());
    }
}
