use crate::registration::RegistrationSession;
use crate::AppState;
use actix_session::{Session, SessionExt};
use actix_web::http::{header, Method};
use actix_web::{dev, guard, web, FromRequest, HttpRequest};
use std::future::{ready, Ready};
use std::sync::Arc;
use uuid::Uuid;

/// Cookie-session key holding the visitor's registration id.
pub const REGISTRATION_SESSION_KEY: &str = "registration_id";

/// The caller's registration. Opening the form (`GET`) without one, or after
/// it was pruned, binds a fresh one to the session cookie. Other requests
/// need a registration that already exists.
pub struct ActiveRegistration {
    pub registration: Arc<RegistrationSession>,
    pub created: bool,
}

impl FromRequest for ActiveRegistration {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        let Some(state) = req.app_data::<web::Data<AppState>>() else {
            log::error!("AppState is missing from app data; cannot resolve registration.");
            return ready(Err(actix_web::error::ErrorInternalServerError(
                "Registration is unavailable.",
            )));
        };

        let session = req.get_session();
        if let Some(registration) = find_registration(&session, state) {
            return ready(Ok(ActiveRegistration { registration, created: false }));
        }

        if req.method() != Method::GET {
            return ready(Err(actix_web::error::ErrorNotFound(
                "No registration in progress. Open the form first.",
            )));
        }

        let registration = state.registrations.create();
        if let Err(e) = session.insert(REGISTRATION_SESSION_KEY, registration.id()) {
            log::error!("Failed to bind registration {} to session: {}", registration.id(), e);
            state.registrations.remove(&registration.id());
            return ready(Err(actix_web::error::ErrorInternalServerError(
                "Registration is unavailable.",
            )));
        }
        ready(Ok(ActiveRegistration { registration, created: true }))
    }
}

/// The registration already bound to this session, if it is still alive.
pub fn find_registration(session: &Session, state: &AppState) -> Option<Arc<RegistrationSession>> {
    let id = session.get::<Uuid>(REGISTRATION_SESSION_KEY).unwrap_or(None)?;
    let found = state.registrations.get(&id);
    if found.is_none() {
        log::debug!("Registration {} from session cookie is gone", id);
    }
    found
}

/// Only lets URL-encoded form bodies through.
pub fn urlencoded_guard(ctx: &guard::GuardContext) -> bool {
    ctx.head()
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("application/x-www-form-urlencoded"))
        .unwrap_or(false)
}
