use crate::registration::delivery::DeliveryRelay;
use crate::registration::wizard::{RegistrationWizard, SubmitError, WizardState, WizardView};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::time::{Duration, Instant};
use uuid::Uuid;

struct Tracked {
    wizard: RegistrationWizard,
    last_touched: Instant,
}

/// One visitor's registration, shared between concurrent requests.
pub struct RegistrationSession {
    id: Uuid,
    inner: Mutex<Tracked>,
}

impl RegistrationSession {
    pub fn new() -> Self {
        RegistrationSession {
            id: Uuid::new_v4(),
            inner: Mutex::new(Tracked {
                wizard: RegistrationWizard::new(),
                last_touched: Instant::now(),
            }),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    fn lock(&self) -> MutexGuard<'_, Tracked> {
        self.inner.lock().unwrap_or_else(|poisoned| {
            log::error!("Mutex for registration {} was poisoned! Recovering lock.", self.id);
            poisoned.into_inner()
        })
    }

    /// Runs `f` against the wizard and marks the session as recently used.
    pub fn with_wizard<R>(&self, f: impl FnOnce(&mut RegistrationWizard) -> R) -> R {
        let mut guard = self.lock();
        guard.last_touched = Instant::now();
        f(&mut guard.wizard)
    }

    pub fn view(&self) -> WizardView {
        self.with_wizard(|wizard| wizard.view())
    }

    pub fn state(&self) -> WizardState {
        self.lock().wizard.state()
    }

    pub fn idle_for(&self) -> Duration {
        self.lock().last_touched.elapsed()
    }

    /// Final submission. The `Submitting` check-and-set happens under the lock,
    /// so a second call made while delivery is pending is refused without
    /// reaching the relay. The lock is not held across the relay call.
    pub async fn submit(&self, relay: &dyn DeliveryRelay) -> Result<(), SubmitError> {
        let payload = self.with_wizard(|wizard| wizard.begin_submission(Utc::now()))?;

        let mut pending = PendingDelivery { session: self, settled: false };
        let outcome = relay.deliver(&payload).await;
        pending.settled = true;
        if let Err(e) = &outcome {
            log::error!("Failed to deliver registration {}: {}", self.id, e);
        } else {
            log::info!("Registration {} delivered", self.id);
        }

        self.with_wizard(|wizard| wizard.finish_submission(outcome))
    }
}

/// Puts the wizard back on the final step if `submit` is dropped while the
/// relay call is pending, e.g. when the client disconnects.
struct PendingDelivery<'a> {
    session: &'a RegistrationSession,
    settled: bool,
}

impl Drop for PendingDelivery<'_> {
    fn drop(&mut self) {
        if !self.settled {
            log::warn!("Delivery of registration {} was interrupted", self.session.id);
            self.session.with_wizard(|wizard| wizard.interrupt_submission());
        }
    }
}

impl Default for RegistrationSession {
    fn default() -> Self {
        RegistrationSession::new()
    }
}

/// In-memory registrations keyed by id. Sessions left idle past `max_idle`
/// are dropped, which is how an abandoned form goes away.
pub struct RegistrationStore {
    sessions: RwLock<HashMap<Uuid, Arc<RegistrationSession>>>,
    max_idle: Duration,
}

impl RegistrationStore {
    pub fn new(max_idle: Duration) -> Self {
        RegistrationStore { sessions: RwLock::new(HashMap::new()), max_idle }
    }

    pub fn create(&self) -> Arc<RegistrationSession> {
        self.prune_idle();
        let session = Arc::new(RegistrationSession::new());
        self.write().insert(session.id(), Arc::clone(&session));
        log::debug!("Started registration {}", session.id());
        session
    }

    pub fn get(&self, id: &Uuid) -> Option<Arc<RegistrationSession>> {
        self.read().get(id).cloned()
    }

    /// Abandons a registration. Returns whether it existed.
    pub fn remove(&self, id: &Uuid) -> bool {
        self.write().remove(id).is_some()
    }

    /// Drops idle sessions, never one whose submission is still in flight.
    pub fn prune_idle(&self) -> usize {
        let mut sessions = self.write();
        let before = sessions.len();
        sessions.retain(|_, session| {
            session.state() == WizardState::Submitting || session.idle_for() < self.max_idle
        });
        let pruned = before - sessions.len();
        if pruned > 0 {
            log::debug!("Pruned {} abandoned registration(s)", pruned);
        }
        pruned
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<Uuid, Arc<RegistrationSession>>> {
        self.sessions.read().unwrap_or_else(|poisoned| {
            log::error!("RwLock for registrations was poisoned! Using stale data.");
            poisoned.into_inner()
        })
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<Uuid, Arc<RegistrationSession>>> {
        self.sessions.write().unwrap_or_else(|poisoned| {
            log::error!("RwLock for registrations was poisoned! Recovering lock.");
            poisoned.into_inner()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::registration_models::{Field, Step};
    use crate::registration::delivery::{DeliveryError, DeliveryPayload};
    use crate::registration::validation::tests::complete_submission;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    /// Relay that holds every delivery until released.
    struct GatedRelay {
        calls: AtomicUsize,
        gate: Notify,
        fail: bool,
    }

    impl GatedRelay {
        fn new(fail: bool) -> Self {
            GatedRelay { calls: AtomicUsize::new(0), gate: Notify::new(), fail }
        }
    }

    #[async_trait]
    impl DeliveryRelay for GatedRelay {
        async fn deliver(&self, _payload: &DeliveryPayload) -> Result<(), DeliveryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.gate.notified().await;
            if self.fail {
                Err(DeliveryError::Rejected { status: 500, body: "relay down".to_string() })
            } else {
                Ok(())
            }
        }
    }

    fn filled_session() -> RegistrationSession {
        let session = RegistrationSession::new();
        filled_session_into(&session);
        session
    }

    fn filled_session_into(session: &RegistrationSession) {
        let complete = complete_submission();
        session.with_wizard(|wizard| {
            for field in Field::ALL {
                match complete.flag(field) {
                    Some(flag) => wizard.set_flag(field, flag).unwrap(),
                    None => wizard.set_text(field, complete.text(field).unwrap()).unwrap(),
                }
            }
            for _ in 0..3 {
                wizard.advance().unwrap();
            }
        });
    }

    #[tokio::test]
    async fn overlapping_submits_deliver_once() {
        let session = filled_session();
        let relay = GatedRelay::new(false);

        let (first, second, _) = tokio::join!(
            session.submit(&relay),
            session.submit(&relay),
            async { relay.gate.notify_one() },
        );

        assert!(first.is_ok());
        assert!(matches!(second, Err(SubmitError::AlreadySubmitting)));
        assert_eq!(relay.calls.load(Ordering::SeqCst), 1);
        assert_eq!(session.state(), WizardState::Submitted);
        assert!(session.view().data.is_blank());
    }

    #[tokio::test]
    async fn failed_delivery_leaves_session_retryable() {
        let session = filled_session();
        let relay = GatedRelay::new(true);
        relay.gate.notify_one();

        let outcome = session.submit(&relay).await;
        assert!(matches!(outcome, Err(SubmitError::Delivery(_))));
        assert_eq!(session.state(), WizardState::Editing(Step::ConsentAndSubmit));
        assert_eq!(session.view().data, complete_submission());
    }

    #[tokio::test]
    async fn dropped_submit_returns_to_final_step() {
        let session = filled_session();
        let relay = GatedRelay::new(false);

        let cut_short = tokio::time::timeout(Duration::from_millis(20), session.submit(&relay)).await;
        assert!(cut_short.is_err());
        assert_eq!(session.state(), WizardState::Editing(Step::ConsentAndSubmit));
        assert_eq!(session.view().data, complete_submission());
        assert!(session.view().notification.map(|n| n.is_error()).unwrap_or(false));

        relay.gate.notify_one();
        assert!(session.submit(&relay).await.is_ok());
        assert_eq!(relay.calls.load(Ordering::SeqCst), 2);
        assert_eq!(session.state(), WizardState::Submitted);
    }

    #[tokio::test]
    async fn dropped_submit_does_not_block_pruning() {
        let store = RegistrationStore::new(Duration::from_millis(30));
        let session = store.create();
        filled_session_into(&session);
        let relay = GatedRelay::new(false);

        let _ = tokio::time::timeout(Duration::from_millis(10), session.submit(&relay)).await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(store.prune_idle(), 1);
        assert!(store.is_empty());
    }

    #[test]
    fn store_creates_finds_and_abandons() {
        let store = RegistrationStore::new(Duration::from_secs(3600));
        let session = store.create();
        assert!(store.get(&session.id()).is_some());
        assert!(store.remove(&session.id()));
        assert!(store.get(&session.id()).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn idle_sessions_are_pruned() {
        let store = RegistrationStore::new(Duration::from_millis(50));
        store.create();
        store.create();
        assert_eq!(store.len(), 2);
        std::thread::sleep(Duration::from_millis(80));
        assert_eq!(store.prune_idle(), 2);
        assert_eq!(store.len(), 0);
    }
}
