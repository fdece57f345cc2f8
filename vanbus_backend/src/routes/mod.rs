use actix_web::web;

pub mod contact;
pub mod public;
pub mod registration;

/// Everything under `/api`.
pub fn config_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .configure(public::config_public)
            .configure(contact::config_contact),
    );
}
