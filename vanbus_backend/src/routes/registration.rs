use crate::helper::form_helpers::{apply_registration_fields, parse_form, FormError};
use crate::middleware::{find_registration, urlencoded_guard, ActiveRegistration, REGISTRATION_SESSION_KEY};
use crate::registration::wizard::{SubmitError, TransitionError, WizardView};
use crate::registration::RegistrationSession;
use crate::AppState;
use actix_session::Session;
use actix_web::http::StatusCode;
use actix_web::{guard, web, HttpResponse, Responder};
use serde::Serialize;

#[derive(Serialize)]
struct RegistrationResponse {
    #[serde(flatten)]
    view: WizardView,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub fn config_registration(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/registration")
            .route("", web::get().to(show_registration))
            .route(
                "/fields",
                web::post().guard(guard::fn_guard(urlencoded_guard)).to(update_fields),
            )
            .route("/advance", web::post().to(advance))
            .route("/retreat", web::post().to(retreat))
            .route("/submit", web::post().to(submit))
            .route("/new", web::post().to(start_new))
            .route("/abandon", web::post().to(abandon)),
    );
}

fn respond(status: StatusCode, registration: &RegistrationSession, error: Option<String>) -> HttpResponse {
    HttpResponse::build(status).json(RegistrationResponse { view: registration.view(), error })
}

fn transition_status(error: &TransitionError) -> StatusCode {
    match error {
        TransitionError::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
        TransitionError::WrongValueKind(_) => StatusCode::BAD_REQUEST,
        TransitionError::LastStep | TransitionError::NotEditing(_) => StatusCode::CONFLICT,
    }
}

fn transition_response(
    registration: &RegistrationSession,
    outcome: Result<impl Sized, TransitionError>,
) -> HttpResponse {
    match outcome {
        Ok(_) => respond(StatusCode::OK, registration, None),
        Err(e) => respond(transition_status(&e), registration, Some(e.to_string())),
    }
}

async fn show_registration(active: ActiveRegistration) -> impl Responder {
    let status = if active.created { StatusCode::CREATED } else { StatusCode::OK };
    respond(status, &active.registration, None)
}

async fn update_fields(active: ActiveRegistration, body: web::Bytes) -> impl Responder {
    let form = match parse_form(&body) {
        Ok(form) => form,
        Err(response) => return response,
    };

    let registration = &active.registration;
    match registration.with_wizard(|wizard| apply_registration_fields(wizard, &form)) {
        Ok(_) => respond(StatusCode::OK, registration, None),
        Err(FormError::Transition(e)) => respond(transition_status(&e), registration, Some(e.to_string())),
        Err(e) => respond(StatusCode::BAD_REQUEST, registration, Some(e.to_string())),
    }
}

async fn advance(active: ActiveRegistration) -> impl Responder {
    let outcome = active.registration.with_wizard(|wizard| wizard.advance());
    transition_response(&active.registration, outcome)
}

async fn retreat(active: ActiveRegistration) -> impl Responder {
    let outcome = active.registration.with_wizard(|wizard| wizard.retreat());
    transition_response(&active.registration, outcome)
}

async fn start_new(active: ActiveRegistration) -> impl Responder {
    let outcome = active.registration.with_wizard(|wizard| wizard.start_new());
    transition_response(&active.registration, outcome)
}

async fn submit(active: ActiveRegistration, state: web::Data<AppState>) -> impl Responder {
    let registration = &active.registration;
    match registration.submit(state.relay.as_ref()).await {
        Ok(()) => respond(StatusCode::OK, registration, None),
        Err(e) => {
            let status = match &e {
                SubmitError::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
                SubmitError::NotAtFinalStep
                | SubmitError::AlreadySubmitting
                | SubmitError::AlreadySubmitted => StatusCode::CONFLICT,
                SubmitError::Payload(_) | SubmitError::Delivery(_) => StatusCode::BAD_GATEWAY,
            };
            respond(status, registration, Some(e.to_string()))
        }
    }
}

async fn abandon(session: Session, state: web::Data<AppState>) -> impl Responder {
    if let Some(registration) = find_registration(&session, &state) {
        state.registrations.remove(&registration.id());
        log::debug!("Registration {} abandoned", registration.id());
    }
    session.remove(REGISTRATION_SESSION_KEY);
    HttpResponse::NoContent().finish()
}
