//! Stable element identifiers exposed by the application's pages

// Form fields shared by the login, sign-up and contact forms
pub const FIRST_NAME: &str = "#firstName";
pub const LAST_NAME: &str = "#lastName";
pub const EMAIL: &str = "#email";
pub const PASSWORD: &str = "#password";
pub const BIRTHDATE: &str = "#birthdate";
pub const PHONE: &str = "#phone";
pub const STREET1: &str = "#street1";
pub const STREET2: &str = "#street2";
pub const CITY: &str = "#city";
pub const STATE_PROVINCE: &str = "#stateProvince";
pub const POSTAL_CODE: &str = "#postalCode";
pub const COUNTRY: &str = "#country";

// Controls
pub const SUBMIT: &str = "#submit";
pub const CANCEL: &str = "#cancel";
pub const SIGNUP: &str = "#signup";
pub const LOGOUT: &str = "#logout";
pub const ADD_CONTACT: &str = "#add-contact";
pub const EDIT_CONTACT: &str = "#edit-contact";
pub const DELETE: &str = "#delete";
pub const RETURN: &str = "#return";

/// Validation and server error region
pub const ERROR: &str = "#error";

pub const CONTACT_TABLE: &str = ".contactTable";
pub const CONTACT_ROW: &str = ".contactTableBodyRow";

/// Every input on the add/edit contact form, in tab order
pub const CONTACT_FORM_FIELDS: [&str; 11] = [
    FIRST_NAME,
    LAST_NAME,
    BIRTHDATE,
    EMAIL,
    PHONE,
    STREET1,
    STREET2,
    CITY,
    STATE_PROVINCE,
    POSTAL_CODE,
    COUNTRY,
];

/// Page paths
pub mod paths {
    pub const HOME: &str = "/";
    pub const LOGIN: &str = "/login";
    pub const ADD_USER: &str = "/addUser";
    pub const CONTACT_LIST: &str = "/contactList";
    pub const ADD_CONTACT: &str = "/addContact";
    pub const CONTACT_DETAILS: &str = "/contactDetails";
    pub const EDIT_CONTACT: &str = "/editContact";
}

/// Visible copy the scenarios look for
pub mod text {
    pub const APP_TITLE: &str = "Contact List App";
    pub const LOG_IN: &str = "Log In:";
    pub const SIGN_UP_PROMPT: &str = "Not yet a user? Click here to sign up!";
    pub const SIGN_UP: &str = "Sign up";
    pub const ADD_USER: &str = "Add User";
    pub const CONTACT_LIST: &str = "Contact List";
    pub const ADD_NEW_CONTACT: &str = "Add a New Contact";
    pub const ADD_CONTACT: &str = "Add Contact";
    pub const CONTACT_DETAILS: &str = "Contact Details";
    pub const EDIT_CONTACT: &str = "Edit Contact";
    pub const CANCEL: &str = "Cancel";
    pub const LOGOUT: &str = "Logout";
    pub const EMAIL_IN_USE: &str = "Email address is already in use";
    pub const BAD_CREDENTIALS: &str = "Incorrect username or password";
    pub const CONTACT_DELETED: &str = "Contact deleted";
}
