use crate::models::contact_models::ContactInquiry;
use crate::models::registration_models::Field;
use crate::registration::wizard::{RegistrationWizard, TransitionError};
use actix_web::{web, HttpResponse};
use std::collections::HashMap;
use thiserror::Error;
use url::form_urlencoded;

/// Parses URL-encoded form data from bytes, handling potential UTF-8 errors gracefully.
pub fn parse_form(form_bytes: &web::Bytes) -> Result<HashMap<String, String>, HttpResponse> {
    let body = match std::str::from_utf8(form_bytes) {
        Ok(s) => s,
        Err(_) => return Err(HttpResponse::BadRequest().body("Invalid UTF-8 in request body.")),
    };
    Ok(form_urlencoded::parse(body.as_bytes()).into_owned().collect())
}

/// Reads a posted checkbox value. Browsers send `on`; API clients tend to send `true`/`1`.
pub fn parse_checkbox(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "1" | "yes" => Some(true),
        "false" | "off" | "0" | "no" | "" => Some(false),
        _ => None,
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FormError {
    #[error("Unknown field '{0}'")]
    UnknownField(String),
    #[error("'{value}' is not a valid value for checkbox '{field}'")]
    InvalidCheckbox { field: Field, value: String },
    #[error(transparent)]
    Transition(#[from] TransitionError),
}

enum Update<'a> {
    Text(Field, &'a str),
    Flag(Field, bool),
}

/// Writes posted values into the wizard. Every key is checked before anything
/// is written, so a bad key leaves the wizard untouched. A field that was
/// showing an error is re-checked, so its message stays until the value is
/// fixed. Returns how many fields were updated.
pub fn apply_registration_fields(
    wizard: &mut RegistrationWizard,
    form: &HashMap<String, String>,
) -> Result<usize, FormError> {
    let mut updates = Vec::with_capacity(form.len());
    for (key, value) in form {
        let field: Field = key.parse().map_err(|_| FormError::UnknownField(key.clone()))?;
        if field.is_flag() {
            let flag = parse_checkbox(value).ok_or_else(|| FormError::InvalidCheckbox {
                field,
                value: value.clone(),
            })?;
            updates.push(Update::Flag(field, flag));
        } else {
            updates.push(Update::Text(field, value.as_str()));
        }
    }

    for update in &updates {
        let field = match *update {
            Update::Text(field, _) | Update::Flag(field, _) => field,
        };
        let flagged = wizard.errors().contains_key(&field);
        match *update {
            Update::Text(field, value) => wizard.set_text(field, value)?,
            Update::Flag(field, flag) => wizard.set_flag(field, flag)?,
        }
        if flagged {
            wizard.check_field(field);
        }
    }
    Ok(updates.len())
}

/// Builds a contact inquiry from the contact page form. Missing keys become
/// empty strings and are reported by validation.
pub fn contact_from_form(form: &HashMap<String, String>) -> ContactInquiry {
    let get = |key: &str| form.get(key).cloned().unwrap_or_default();
    ContactInquiry {
        name: get("name"),
        email: get("email"),
        phone: get("phone"),
        subject: get("subject"),
        inquiry_type: get("inquiry_type"),
        message: get("message"),
    }
}
