use crate::models::registration_models::{Field, RegistrationSubmission, Step};
use crate::models::Notification;
use crate::registration::delivery::{DeliveryError, DeliveryPayload, BUSINESS_EMAIL, BUSINESS_PHONE};
use crate::registration::validation::{validate_all, validate_field, validate_step, FieldErrors};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

pub const SUBMITTED_MESSAGE: &str =
    "Registration submitted successfully! Amogh Van/Bus Services will contact you within 24 hours.";

pub fn delivery_failure_message() -> String {
    format!(
        "Failed to submit registration. Please call us directly at {} or email {}.",
        BUSINESS_PHONE, BUSINESS_EMAIL
    )
}

/// Where the wizard is. Values are only editable in `Editing`.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(tag = "status", content = "step", rename_all = "snake_case")]
pub enum WizardState {
    Editing(Step),
    Submitting,
    Submitted,
}

impl WizardState {
    fn label(&self) -> &'static str {
        match self {
            WizardState::Editing(_) => "editing",
            WizardState::Submitting => "submitting",
            WizardState::Submitted => "submitted",
        }
    }

    /// Position used by the step indicator; past the last step once submitted.
    fn progress(&self) -> u8 {
        match self {
            WizardState::Editing(step) => step.number(),
            WizardState::Submitting => Step::ConsentAndSubmit.number(),
            WizardState::Submitted => Step::ConsentAndSubmit.number() + 1,
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TransitionError {
    #[error("{} field(s) need attention before continuing", .0.len())]
    Invalid(FieldErrors),
    #[error("already on the final step")]
    LastStep,
    #[error("registration is {0} and cannot be edited")]
    NotEditing(&'static str),
    #[error("field '{0}' does not accept that kind of value")]
    WrongValueKind(Field),
}

#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("submission is only available from the final step")]
    NotAtFinalStep,
    #[error("a submission is already in flight")]
    AlreadySubmitting,
    #[error("registration was already submitted")]
    AlreadySubmitted,
    #[error("{} field(s) need attention before submitting", .0.len())]
    Invalid(FieldErrors),
    #[error("could not prepare the submission: {0}")]
    Payload(DeliveryError),
    #[error("delivery failed: {0}")]
    Delivery(DeliveryError),
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MarkerStatus {
    Complete,
    Current,
    Upcoming,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct StepMarker {
    pub number: u8,
    pub title: &'static str,
    pub status: MarkerStatus,
}

/// Serializable snapshot handed to the page.
#[derive(Debug, Serialize, Clone)]
pub struct WizardView {
    pub state: WizardState,
    pub title: Option<&'static str>,
    pub description: Option<&'static str>,
    pub can_retreat: bool,
    pub can_submit: bool,
    pub indicator: Vec<StepMarker>,
    pub data: RegistrationSubmission,
    pub errors: FieldErrors,
    pub notification: Option<Notification>,
}

/// The four-step student registration form.
#[derive(Debug, Clone)]
pub struct RegistrationWizard {
    state: WizardState,
    data: RegistrationSubmission,
    errors: FieldErrors,
    notification: Option<Notification>,
}

impl Default for RegistrationWizard {
    fn default() -> Self {
        RegistrationWizard::new()
    }
}

impl RegistrationWizard {
    pub fn new() -> Self {
        RegistrationWizard {
            state: WizardState::Editing(Step::StudentInfo),
            data: RegistrationSubmission::default(),
            errors: FieldErrors::new(),
            notification: None,
        }
    }

    pub fn state(&self) -> WizardState {
        self.state
    }

    pub fn current_step(&self) -> Option<Step> {
        match self.state {
            WizardState::Editing(step) => Some(step),
            _ => None,
        }
    }

    pub fn data(&self) -> &RegistrationSubmission {
        &self.data
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    fn ensure_editing(&self) -> Result<Step, TransitionError> {
        self.current_step()
            .ok_or_else(|| TransitionError::NotEditing(self.state.label()))
    }

    pub fn set_text(&mut self, field: Field, value: &str) -> Result<(), TransitionError> {
        self.ensure_editing()?;
        if !self.data.set_text(field, value) {
            return Err(TransitionError::WrongValueKind(field));
        }
        self.errors.remove(&field);
        Ok(())
    }

    pub fn set_flag(&mut self, field: Field, value: bool) -> Result<(), TransitionError> {
        self.ensure_editing()?;
        if !self.data.set_flag(field, value) {
            return Err(TransitionError::WrongValueKind(field));
        }
        self.errors.remove(&field);
        Ok(())
    }

    /// Validates the fields of the current step and moves forward when they pass.
    pub fn advance(&mut self) -> Result<Step, TransitionError> {
        let step = self.ensure_editing()?;
        let next = step.next().ok_or(TransitionError::LastStep)?;

        let errors = validate_step(&self.data, step);
        if !errors.is_empty() {
            self.errors = errors.clone();
            return Err(TransitionError::Invalid(errors));
        }

        self.errors.clear();
        self.notification = None;
        self.state = WizardState::Editing(next);
        Ok(next)
    }

    /// Moves back one step without validating. A no-op on the first step.
    pub fn retreat(&mut self) -> Result<Step, TransitionError> {
        let step = self.ensure_editing()?;
        let target = step.previous().unwrap_or(step);
        if target != step {
            self.errors.clear();
            self.notification = None;
        }
        self.state = WizardState::Editing(target);
        Ok(target)
    }

    /// Runs the final checks and, when they pass, locks the wizard in `Submitting`
    /// and returns the message to deliver. Must be followed by [`finish_submission`].
    ///
    /// [`finish_submission`]: RegistrationWizard::finish_submission
    pub fn begin_submission(&mut self, submitted_at: DateTime<Utc>) -> Result<DeliveryPayload, SubmitError> {
        match self.state {
            WizardState::Submitting => return Err(SubmitError::AlreadySubmitting),
            WizardState::Submitted => return Err(SubmitError::AlreadySubmitted),
            WizardState::Editing(step) if step != Step::ConsentAndSubmit => {
                return Err(SubmitError::NotAtFinalStep)
            }
            WizardState::Editing(_) => {}
        }

        let errors = validate_all(&self.data);
        if !errors.is_empty() {
            let message = if errors.len() == 1 && errors.contains_key(&Field::TermsAccepted) {
                "You must accept the terms to submit your registration."
            } else {
                "Please correct the highlighted fields before submitting."
            };
            self.errors = errors.clone();
            self.notification = Some(Notification::error(message));
            return Err(SubmitError::Invalid(errors));
        }

        let payload = match DeliveryPayload::for_registration(&self.data, submitted_at) {
            Ok(payload) => payload,
            Err(e) => {
                self.notification = Some(Notification::error(delivery_failure_message()));
                return Err(SubmitError::Payload(e));
            }
        };

        self.errors.clear();
        self.notification = None;
        self.state = WizardState::Submitting;
        Ok(payload)
    }

    /// Settles an in-flight submission with the relay's answer.
    pub fn finish_submission(&mut self, outcome: Result<(), DeliveryError>) -> Result<(), SubmitError> {
        if self.state != WizardState::Submitting {
            log::warn!("Ignoring delivery outcome for a registration that is {}", self.state.label());
            return Ok(());
        }

        match outcome {
            Ok(()) => {
                self.state = WizardState::Submitted;
                self.data = RegistrationSubmission::default();
                self.errors.clear();
                self.notification = Some(Notification::success(SUBMITTED_MESSAGE));
                Ok(())
            }
            Err(e) => {
                // Values are kept so the family can retry without retyping.
                self.state = WizardState::Editing(Step::ConsentAndSubmit);
                self.notification = Some(Notification::error(delivery_failure_message()));
                Err(SubmitError::Delivery(e))
            }
        }
    }

    /// Returns a submission whose delivery never settled to the final step.
    /// The relay may or may not have accepted it, so the family is told to check.
    pub fn interrupt_submission(&mut self) {
        if self.state != WizardState::Submitting {
            return;
        }
        self.state = WizardState::Editing(Step::ConsentAndSubmit);
        self.notification = Some(Notification::error(delivery_failure_message()));
    }

    /// Starts a fresh, blank registration.
    pub fn start_new(&mut self) -> Result<(), TransitionError> {
        if self.state == WizardState::Submitting {
            return Err(TransitionError::NotEditing(self.state.label()));
        }
        *self = RegistrationWizard::new();
        Ok(())
    }

    /// Re-checks one field against its rule and updates its inline message.
    pub fn check_field(&mut self, field: Field) -> Option<String> {
        let message = validate_field(&self.data, field);
        match &message {
            Some(m) => {
                self.errors.insert(field, m.clone());
            }
            None => {
                self.errors.remove(&field);
            }
        }
        message
    }

    pub fn step_indicator(&self) -> Vec<StepMarker> {
        let progress = self.state.progress();
        Step::ALL
            .iter()
            .map(|step| {
                let status = if step.number() < progress {
                    MarkerStatus::Complete
                } else if step.number() == progress {
                    MarkerStatus::Current
                } else {
                    MarkerStatus::Upcoming
                };
                StepMarker { number: step.number(), title: step.title(), status }
            })
            .collect()
    }

    pub fn view(&self) -> WizardView {
        let step = self.current_step();
        WizardView {
            state: self.state,
            title: step.map(|s| s.title()),
            description: step.map(|s| s.description()),
            can_retreat: step.and_then(|s| s.previous()).is_some(),
            can_submit: step == Some(Step::ConsentAndSubmit),
            indicator: self.step_indicator(),
            data: self.data.clone(),
            errors: self.errors.clone(),
            notification: self.notification.clone(),
        }
    }
}
