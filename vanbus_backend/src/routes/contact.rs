use crate::helper::form_helpers::{contact_from_form, parse_form};
use crate::middleware::urlencoded_guard;
use crate::models::Notification;
use crate::registration::delivery::{DeliveryPayload, BUSINESS_PHONE};
use crate::registration::validation::validate_contact;
use crate::AppState;
use actix_web::{guard, web, HttpResponse, Responder};
use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeMap;

pub const CONTACT_SENT_MESSAGE: &str =
    "Message sent successfully! We'll get back to you within 24 hours.";

#[derive(Serialize)]
struct ContactResponse {
    notification: Notification,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    errors: BTreeMap<&'static str, String>,
}

pub fn config_contact(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/contact",
        web::post().guard(guard::fn_guard(urlencoded_guard)).to(submit_contact),
    );
}

fn failure_message() -> String {
    format!("Failed to send message. Please try calling us directly at {}.", BUSINESS_PHONE)
}

async fn submit_contact(state: web::Data<AppState>, body: web::Bytes) -> impl Responder {
    let form = match parse_form(&body) {
        Ok(form) => form,
        Err(response) => return response,
    };

    let inquiry = contact_from_form(&form);
    let errors = validate_contact(&inquiry);
    if !errors.is_empty() {
        return HttpResponse::UnprocessableEntity().json(ContactResponse {
            notification: Notification::error("Please correct the highlighted fields."),
            errors,
        });
    }

    let delivered = match DeliveryPayload::for_contact(&inquiry, Utc::now()) {
        Ok(payload) => state.relay.deliver(&payload).await,
        Err(e) => Err(e),
    };

    match delivered {
        Ok(()) => HttpResponse::Ok().json(ContactResponse {
            notification: Notification::success(CONTACT_SENT_MESSAGE),
            errors: BTreeMap::new(),
        }),
        Err(e) => {
            log::error!("Failed to deliver contact inquiry from '{}': {}", inquiry.email.trim(), e);
            HttpResponse::BadGateway().json(ContactResponse {
                notification: Notification::error(failure_message()),
                errors: BTreeMap::new(),
            })
        }
    }
}
