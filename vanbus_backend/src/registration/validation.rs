use crate::models::contact_models::ContactInquiry;
use crate::models::registration_models::{
    Field, RegistrationSubmission, Step, GRADE_OPTIONS, PICKUP_TIME_OPTIONS, SERVICE_TYPE_OPTIONS,
};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

/// Per-field messages, ordered by field so responses are stable.
pub type FieldErrors = BTreeMap<Field, String>;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_'+\-.]*[A-Za-z0-9_+\-]@([A-Za-z0-9][A-Za-z0-9\-]*\.)+[A-Za-z]{2,}$")
        .expect("email pattern")
});

pub const MIN_PHONE_CHARS: usize = 10;
pub const MIN_ADDRESS_CHARS: usize = 5;
pub const MIN_MESSAGE_CHARS: usize = 10;

pub fn is_valid_email(value: &str) -> bool {
    let value = value.trim();
    !value.starts_with('.') && !value.contains("..") && EMAIL_REGEX.is_match(value)
}

fn filled(value: &str) -> bool {
    !value.trim().is_empty()
}

fn at_least(value: &str, min_chars: usize) -> bool {
    value.trim().chars().count() >= min_chars
}

fn one_of(value: &str, options: &[&str]) -> bool {
    options.contains(&value.trim())
}

fn is_valid_date(value: &str) -> bool {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").is_ok()
}

/// Checks a single field. `None` means the value is acceptable.
pub fn validate_field(data: &RegistrationSubmission, field: Field) -> Option<String> {
    if field == Field::TermsAccepted {
        return (!data.terms_accepted).then(|| "You must accept the terms".to_string());
    }
    let value = data.text(field)?;

    let (ok, message) = match field {
        Field::StudentFirstName => (filled(value), "First name is required"),
        Field::StudentLastName => (filled(value), "Last name is required"),
        Field::DateOfBirth if !filled(value) => (false, "Date of birth is required"),
        Field::DateOfBirth => (is_valid_date(value), "Enter a valid date of birth"),
        Field::Grade => (one_of(value, GRADE_OPTIONS), "Grade is required"),
        Field::School => (filled(value), "School is required"),
        Field::StudentAddress => (at_least(value, MIN_ADDRESS_CHARS), "Address is required"),
        Field::ParentFirstName => (filled(value), "Parent first name is required"),
        Field::ParentLastName => (filled(value), "Parent last name is required"),
        Field::ParentPhone => (at_least(value, MIN_PHONE_CHARS), "Valid phone number is required"),
        Field::ParentEmail => (is_valid_email(value), "Valid email is required"),
        Field::EmergencyContact => (filled(value), "Emergency contact is required"),
        Field::EmergencyPhone => (at_least(value, MIN_PHONE_CHARS), "Emergency phone is required"),
        Field::ServiceType => (one_of(value, SERVICE_TYPE_OPTIONS), "Service type is required"),
        Field::PickupAddress => (at_least(value, MIN_ADDRESS_CHARS), "Pickup address is required"),
        Field::DropoffAddress => (at_least(value, MIN_ADDRESS_CHARS), "Drop-off address is required"),
        Field::PreferredPickupTime => (one_of(value, PICKUP_TIME_OPTIONS), "Pickup time is required"),
        // Medical notes are free text and optional.
        Field::MedicalConditions | Field::Medications | Field::SpecialNeeds => (true, ""),
        Field::TermsAccepted | Field::PhotoPermission => (true, ""),
    };

    (!ok).then(|| message.to_string())
}

pub fn validate_step(data: &RegistrationSubmission, step: Step) -> FieldErrors {
    validate_fields(data, &step.fields())
}

pub fn validate_all(data: &RegistrationSubmission) -> FieldErrors {
    validate_fields(data, &Field::ALL)
}

fn validate_fields(data: &RegistrationSubmission, fields: &[Field]) -> FieldErrors {
    fields
        .iter()
        .filter_map(|field| validate_field(data, *field).map(|message| (*field, message)))
        .collect()
}

/// Validates the contact page form; keys are the posted field names.
pub fn validate_contact(inquiry: &ContactInquiry) -> BTreeMap<&'static str, String> {
    let checks: [(&'static str, bool, &str); 6] = [
        ("name", filled(&inquiry.name), "Name is required"),
        ("email", is_valid_email(&inquiry.email), "Valid email is required"),
        ("phone", at_least(&inquiry.phone, MIN_PHONE_CHARS), "Valid phone number is required"),
        ("subject", filled(&inquiry.subject), "Subject is required"),
        ("inquiry_type", filled(&inquiry.inquiry_type), "Please select inquiry type"),
        (
            "message",
            at_least(&inquiry.message, MIN_MESSAGE_CHARS),
            "Message must be at least 10 characters",
        ),
    ];

    checks
        .into_iter()
        .filter(|(_, ok, _)| !ok)
        .map(|(name, _, message)| (name, message.to_string()))
        .collect()
}
