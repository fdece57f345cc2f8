//! Student registration: field rules, the four-step wizard, per-visitor
//! sessions and the relay that delivers finished forms.

pub mod delivery;
pub mod session;
pub mod validation;
pub mod wizard;

pub use delivery::{DeliveryError, DeliveryPayload, DeliveryRelay, EmailRelay, EmailRelaySettings};
pub use session::{RegistrationSession, RegistrationStore};
pub use wizard::{RegistrationWizard, SubmitError, TransitionError, WizardState, WizardView};
