mod common;

use actix_session::{storage::CookieSessionStore, SessionMiddleware};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{test, web, App};
use common::{state_for, EMAIL_PATH};
use serde_json::Value;
use vanbus_backend::routes;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const STEP_ONE: &[(&str, &str)] = &[
    ("student_first_name", "Aarav"),
    ("student_last_name", "Kharwar"),
    ("date_of_birth", "2016-04-12"),
    ("grade", "3"),
    ("school", "Dadar Public School"),
    ("student_address", "12 Prabhadevi Road, Mumbai"),
];

const STEP_TWO: &[(&str, &str)] = &[
    ("parent_first_name", "Meera"),
    ("parent_last_name", "Kharwar"),
    ("parent_phone", "9870525637"),
    ("parent_email", "meera@example.com"),
    ("emergency_contact", "Rohan Kharwar"),
    ("emergency_phone", "9321025627"),
];

const STEP_THREE: &[(&str, &str)] = &[
    ("service_type", "daily-route"),
    ("pickup_address", "12 Prabhadevi Road"),
    ("dropoff_address", "Dadar Public School Gate 2"),
    ("preferred_pickup_time", "7:30"),
];

struct Visitor<S> {
    app: S,
    cookie: Option<Cookie<'static>>,
}

impl<S> Visitor<S>
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    async fn send(&mut self, req: test::TestRequest) -> (u16, Value) {
        let req = match &self.cookie {
            Some(cookie) => req.cookie(cookie.clone()),
            None => req,
        };
        let resp = test::call_service(&self.app, req.to_request()).await;
        if let Some(cookie) = resp.response().cookies().next() {
            self.cookie = Some(cookie.into_owned());
        }
        let status = resp.status().as_u16();
        let body = test::read_body(resp).await;
        let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    async fn open(&mut self) -> (u16, Value) {
        self.send(test::TestRequest::get().uri("/registration")).await
    }

    async fn post(&mut self, uri: &str) -> (u16, Value) {
        self.send(test::TestRequest::post().uri(uri)).await
    }

    async fn fill(&mut self, fields: &[(&str, &str)]) -> (u16, Value) {
        self.send(
            test::TestRequest::post()
                .uri("/registration/fields")
                .set_form(fields.to_vec()),
        )
        .await
    }
}

macro_rules! visitor {
    ($state:expr) => {
        Visitor {
            app: test::init_service(
                App::new().app_data($state.clone()).service(
                    web::scope("")
                        .wrap(
                            SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
                                .cookie_secure(false)
                                .build(),
                        )
                        .configure(routes::registration::config_registration),
                ),
            )
            .await,
            cookie: None,
        }
    };
}

fn step(body: &Value) -> &str {
    body["state"]["step"].as_str().unwrap_or("")
}

#[actix_web::test]
async fn full_registration_is_delivered_once_and_resets() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(EMAIL_PATH))
        .and(body_partial_json(serde_json::json!({
            "template_params": {
                "student_first_name": "Aarav",
                "terms_accepted": "Yes",
                "to_email": "kharwaramog02@gmail.com"
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .expect(1)
        .mount(&server)
        .await;

    let state = state_for(&server);
    let mut visitor = visitor!(state);

    let (status, body) = visitor.open().await;
    assert_eq!(status, 201);
    assert_eq!(step(&body), "student_info");
    assert!(visitor.cookie.is_some());

    for (fields, next) in [
        (STEP_ONE, "guardian_info"),
        (STEP_TWO, "transport_prefs"),
        (STEP_THREE, "consent_and_submit"),
    ] {
        let (status, _) = visitor.fill(fields).await;
        assert_eq!(status, 200);
        let (status, body) = visitor.post("/registration/advance").await;
        assert_eq!(status, 200, "advance failed: {body}");
        assert_eq!(step(&body), next);
    }

    visitor.fill(&[("terms_accepted", "on")]).await;
    let (status, body) = visitor.post("/registration/submit").await;
    assert_eq!(status, 200, "submit failed: {body}");
    assert_eq!(body["state"]["status"], "submitted");
    assert_eq!(body["notification"]["type"], "success");
    assert_eq!(body["data"]["student_first_name"], "");

    let (status, _) = visitor.post("/registration/submit").await;
    assert_eq!(status, 409);

    let (status, body) = visitor.post("/registration/new").await;
    assert_eq!(status, 200);
    assert_eq!(step(&body), "student_info");
    assert_eq!(body["data"]["parent_email"], "");
}

#[actix_web::test]
async fn advance_is_gated_by_step_validation() {
    let server = MockServer::start().await;
    let state = state_for(&server);
    let mut visitor = visitor!(state);
    visitor.open().await;

    let (status, body) = visitor.post("/registration/advance").await;
    assert_eq!(status, 422);
    assert_eq!(step(&body), "student_info");
    assert_eq!(body["errors"]["student_first_name"], "First name is required");

    let (status, _) = visitor.fill(&[("favourite_colour", "blue")]).await;
    assert_eq!(status, 400);

    let (status, body) = visitor.post("/registration/retreat").await;
    assert_eq!(status, 200);
    assert_eq!(step(&body), "student_info");
}

#[actix_web::test]
async fn unaccepted_terms_block_submission() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let state = state_for(&server);
    let mut visitor = visitor!(state);
    visitor.open().await;
    for fields in [STEP_ONE, STEP_TWO, STEP_THREE] {
        visitor.fill(fields).await;
        visitor.post("/registration/advance").await;
    }

    let (status, body) = visitor.post("/registration/submit").await;
    assert_eq!(status, 422);
    assert_eq!(step(&body), "consent_and_submit");
    assert_eq!(body["errors"]["terms_accepted"], "You must accept the terms");
}

#[actix_web::test]
async fn relay_failure_keeps_the_data_for_a_retry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(EMAIL_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("relay down"))
        .mount(&server)
        .await;

    let state = state_for(&server);
    let mut visitor = visitor!(state);
    visitor.open().await;
    for fields in [STEP_ONE, STEP_TWO, STEP_THREE] {
        visitor.fill(fields).await;
        visitor.post("/registration/advance").await;
    }
    visitor.fill(&[("terms_accepted", "true")]).await;

    let (status, body) = visitor.post("/registration/submit").await;
    assert_eq!(status, 502);
    assert_eq!(step(&body), "consent_and_submit");
    assert_eq!(body["data"]["student_first_name"], "Aarav");
    let message = body["notification"]["message"].as_str().unwrap_or("");
    assert!(message.contains("9870525637"));
}

#[actix_web::test]
async fn abandoning_starts_over_on_next_visit() {
    let server = MockServer::start().await;
    let state = state_for(&server);
    let mut visitor = visitor!(state);

    visitor.open().await;
    visitor.fill(&[("student_first_name", "Aarav")]).await;

    let (status, _) = visitor.post("/registration/abandon").await;
    assert_eq!(status, 204);

    let (status, body) = visitor.open().await;
    assert_eq!(status, 201);
    assert_eq!(body["data"]["student_first_name"], "");
}

#[actix_web::test]
async fn only_opening_the_form_starts_a_registration() {
    let server = MockServer::start().await;
    let state = state_for(&server);
    let mut visitor = visitor!(state);

    for uri in ["/registration/advance", "/registration/submit", "/registration/new"] {
        let (status, _) = visitor.post(uri).await;
        assert_eq!(status, 404, "{uri} without a registration");
    }
    let (status, _) = visitor.fill(STEP_ONE).await;
    assert_eq!(status, 404);
    assert!(visitor.cookie.is_none());
    assert!(state.registrations.is_empty());

    let (status, _) = visitor.open().await;
    assert_eq!(status, 201);
    assert_eq!(state.registrations.len(), 1);
    let (status, _) = visitor.fill(STEP_ONE).await;
    assert_eq!(status, 200);
}
