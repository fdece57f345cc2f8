use crate::models::contact_models::ContactInquiry;
use crate::models::registration_models::{Field, RegistrationSubmission};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::time::Duration;
use tera::{Context, Tera};
use thiserror::Error;

pub const DEFAULT_EMAIL_ENDPOINT: &str = "https://api.emailjs.com/api/v1.0/email/send";
pub const DEFAULT_EMAIL_SERVICE_ID: &str = "service_1nqvjzw";
pub const DEFAULT_EMAIL_TEMPLATE_ID: &str = "template_4dhuycr";
pub const DEFAULT_EMAIL_PUBLIC_KEY: &str = "StvI1RsGaSZOvZp1H";

pub const BUSINESS_EMAIL: &str = "kharwaramog02@gmail.com";
pub const BUSINESS_PHONE: &str = "9870525637";

const REGISTRATION_SUMMARY: &str = r#"STUDENT REGISTRATION SUBMISSION

=== STUDENT INFORMATION ===
Name: {{ student_first_name }} {{ student_last_name }}
Date of Birth: {{ date_of_birth }}
Grade: {{ grade }}
School: {{ school }}
Home Address: {{ student_address }}

=== PARENT/GUARDIAN INFORMATION ===
Name: {{ parent_first_name }} {{ parent_last_name }}
Phone: {{ parent_phone }}
Email: {{ parent_email }}
Emergency Contact: {{ emergency_contact }} ({{ emergency_phone }})

=== TRANSPORTATION DETAILS ===
Service Type: {{ service_type }}
Pickup Address: {{ pickup_address }}
Drop-off Address: {{ dropoff_address }}
Preferred Pickup Time: {{ preferred_pickup_time }}

=== MEDICAL INFORMATION ===
Medical Conditions: {% if medical_conditions %}{{ medical_conditions }}{% else %}None{% endif %}
Medications: {% if medications %}{{ medications }}{% else %}None{% endif %}
Special Needs: {% if special_needs %}{{ special_needs }}{% else %}None{% endif %}

=== AGREEMENTS ===
Terms Accepted: {% if terms_accepted %}Yes{% else %}No{% endif %}
Photo Permission: {% if photo_permission %}Yes{% else %}No{% endif %}

=== SUBMISSION INFO ===
Submitted on: {{ submission_date }}
Form Type: Student Registration
"#;

const CONTACT_SUMMARY: &str = r#"CONTACT FORM INQUIRY SUBMISSION

=== CONTACT INFORMATION ===
Name: {{ name }}
Email: {{ email }}
Phone: {{ phone }}

=== INQUIRY DETAILS ===
Inquiry Type: {{ inquiry_type }}
Subject: {{ subject }}

=== MESSAGE ===
{{ message }}

=== SUBMISSION INFO ===
Submitted on: {{ submission_date }}
Form Type: Contact Inquiry
"#;

#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("Relay request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Relay rejected the message with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("Could not render the message summary: {0}")]
    Render(#[from] tera::Error),
}

/// Flat key/value message handed to the outbound relay.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct DeliveryPayload {
    pub template_params: BTreeMap<String, String>,
}

fn yes_no(value: bool) -> String {
    let answer = if value { "Yes" } else { "No" };
    answer.to_string()
}

impl DeliveryPayload {
    pub fn for_registration(
        data: &RegistrationSubmission,
        submitted_at: DateTime<Utc>,
    ) -> Result<Self, DeliveryError> {
        let submission_date = submitted_at.format("%Y-%m-%d %H:%M:%S UTC").to_string();

        let mut context = Context::from_serialize(data)?;
        context.insert("submission_date", &submission_date);
        let message = Tera::one_off(REGISTRATION_SUMMARY, &context, false)?;

        let mut params = BTreeMap::new();
        for field in Field::ALL {
            let value = match data.flag(field) {
                Some(flag) => yes_no(flag),
                None => data.text(field).unwrap_or_default().trim().to_string(),
            };
            params.insert(field.as_str().to_string(), value);
        }
        params.insert("to_email".to_string(), BUSINESS_EMAIL.to_string());
        params.insert(
            "from_name".to_string(),
            "Amogh Van/Bus Services Registration Form".to_string(),
        );
        params.insert(
            "subject".to_string(),
            format!(
                "New Student Registration: {} {}",
                data.student_first_name.trim(),
                data.student_last_name.trim()
            ),
        );
        params.insert("submission_date".to_string(), submission_date);
        params.insert("message".to_string(), message);

        Ok(DeliveryPayload { template_params: params })
    }

    pub fn for_contact(
        inquiry: &ContactInquiry,
        submitted_at: DateTime<Utc>,
    ) -> Result<Self, DeliveryError> {
        let submission_date = submitted_at.format("%Y-%m-%d %H:%M:%S UTC").to_string();

        let mut context = Context::from_serialize(inquiry)?;
        context.insert("submission_date", &submission_date);
        let message = Tera::one_off(CONTACT_SUMMARY, &context, false)?;

        let mut params = BTreeMap::new();
        params.insert("to_email".to_string(), BUSINESS_EMAIL.to_string());
        params.insert("from_name".to_string(), "Amogh Van/Bus Services Contact Form".to_string());
        params.insert("subject".to_string(), format!("Contact Form Inquiry: {}", inquiry.subject.trim()));
        params.insert("contact_name".to_string(), inquiry.name.trim().to_string());
        params.insert("contact_email".to_string(), inquiry.email.trim().to_string());
        params.insert("contact_phone".to_string(), inquiry.phone.trim().to_string());
        params.insert("inquiry_type".to_string(), inquiry.inquiry_type.trim().to_string());
        params.insert("inquiry_subject".to_string(), inquiry.subject.trim().to_string());
        params.insert("contact_message".to_string(), inquiry.message.trim().to_string());
        params.insert("submission_date".to_string(), submission_date);
        params.insert("message".to_string(), message);

        Ok(DeliveryPayload { template_params: params })
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.template_params.get(key).map(String::as_str)
    }
}

/// Outbound channel for form submissions.
#[async_trait]
pub trait DeliveryRelay: Send + Sync {
    async fn deliver(&self, payload: &DeliveryPayload) -> Result<(), DeliveryError>;
}

#[derive(Debug, Clone)]
pub struct EmailRelaySettings {
    pub endpoint: String,
    pub service_id: String,
    pub template_id: String,
    pub public_key: String,
    pub timeout: Duration,
}

impl Default for EmailRelaySettings {
    fn default() -> Self {
        EmailRelaySettings {
            endpoint: DEFAULT_EMAIL_ENDPOINT.to_string(),
            service_id: DEFAULT_EMAIL_SERVICE_ID.to_string(),
            template_id: DEFAULT_EMAIL_TEMPLATE_ID.to_string(),
            public_key: DEFAULT_EMAIL_PUBLIC_KEY.to_string(),
            timeout: Duration::from_secs(15),
        }
    }
}

/// Transactional email relay (EmailJS REST API).
pub struct EmailRelay {
    client: reqwest::Client,
    settings: EmailRelaySettings,
}

impl EmailRelay {
    pub fn new(settings: EmailRelaySettings) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(settings.timeout).build()?;
        Ok(EmailRelay { client, settings })
    }
}

#[async_trait]
impl DeliveryRelay for EmailRelay {
    async fn deliver(&self, payload: &DeliveryPayload) -> Result<(), DeliveryError> {
        let body = json!({
            "service_id": self.settings.service_id,
            "template_id": self.settings.template_id,
            "user_id": self.settings.public_key,
            "template_params": payload.template_params,
        });

        let response = self.client.post(&self.settings.endpoint).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Rejected { status: status.as_u16(), body });
        }

        log::info!(
            "Relay accepted message '{}'",
            payload.param("subject").unwrap_or("(no subject)")
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registration::validation::tests::complete_submission;
    use chrono::TimeZone;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn submitted_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 2, 9, 30, 0).unwrap()
    }

    fn relay_for(server: &MockServer) -> EmailRelay {
        EmailRelay::new(EmailRelaySettings {
            endpoint: format!("{}/api/v1.0/email/send", server.uri()),
            ..EmailRelaySettings::default()
        })
        .expect("client")
    }

    #[test]
    fn registration_payload_carries_every_field_and_a_summary() {
        let payload = DeliveryPayload::for_registration(&complete_submission(), submitted_at())
            .expect("payload");

        for field in Field::ALL {
            assert!(payload.param(field.as_str()).is_some(), "missing {}", field);
        }
        assert_eq!(payload.param("terms_accepted"), Some("Yes"));
        assert_eq!(payload.param("photo_permission"), Some("No"));
        assert_eq!(payload.param("subject"), Some("New Student Registration: Aarav Kharwar"));
        assert_eq!(payload.param("submission_date"), Some("2025-08-02 09:30:00 UTC"));

        let message = payload.param("message").unwrap();
        assert!(message.contains("Name: Aarav Kharwar"));
        assert!(message.contains("Medical Conditions: None"));
        assert!(message.contains("Terms Accepted: Yes"));
    }

    #[test]
    fn contact_payload_summary() {
        let inquiry = ContactInquiry {
            name: "Meera".to_string(),
            email: "meera@example.com".to_string(),
            phone: "9870525637".to_string(),
            subject: "Field trip".to_string(),
            inquiry_type: "field-trip".to_string(),
            message: "Can you take 30 kids to the museum?".to_string(),
        };
        let payload = DeliveryPayload::for_contact(&inquiry, submitted_at()).expect("payload");
        assert_eq!(payload.param("subject"), Some("Contact Form Inquiry: Field trip"));
        assert!(payload.param("message").unwrap().contains("Can you take 30 kids"));
    }

    #[tokio::test]
    async fn email_relay_posts_identifiers_and_params() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1.0/email/send"))
            .and(body_partial_json(json!({
                "service_id": DEFAULT_EMAIL_SERVICE_ID,
                "template_id": DEFAULT_EMAIL_TEMPLATE_ID,
                "user_id": DEFAULT_EMAIL_PUBLIC_KEY,
                "template_params": { "grade": "3" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
            .expect(1)
            .mount(&server)
            .await;

        let payload = DeliveryPayload::for_registration(&complete_submission(), submitted_at())
            .expect("payload");
        relay_for(&server).deliver(&payload).await.expect("delivered");
    }

    #[tokio::test]
    async fn email_relay_reports_rejections() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("The user ID is invalid"))
            .mount(&server)
            .await;

        let payload = DeliveryPayload::for_registration(&complete_submission(), submitted_at())
            .expect("payload");
        let err = relay_for(&server).deliver(&payload).await.unwrap_err();
        match err {
            DeliveryError::Rejected { status, body } => {
                assert_eq!(status, 400);
                assert_eq!(body, "The user ID is invalid");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
