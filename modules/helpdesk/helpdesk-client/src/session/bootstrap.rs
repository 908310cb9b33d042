//! Session bootstrap: turns the stored token into an identity and owns every
//! later sign-in and sign-out.
//!
//! `SessionContext` is the single writer of [`SessionState`]; pages and
//! guards read it through `watch` receivers. Each transition that calls the
//! service takes a generation number, and its result is applied only while
//! that generation is still the newest, so a logout (or a newer login)
//! silently discards whatever was in flight.
//!
//! The generation check, the token write and the state update happen inside
//! one `watch` critical section. A concurrent logout therefore cannot slip
//! between "token saved" and "identity published", which keeps the stored
//! token and the published identity in agreement.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use helpdesk_sdk::{HelpdeskClient, HelpdeskError, Identity, Role};
use tokio::sync::watch;

use super::store::SessionStore;
use crate::routing::{Navigator, Route};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    /// Startup has not run yet.
    #[default]
    Unresolved,
    /// A resolution (startup or login) is in flight.
    Resolving,
    /// Settled: signed in as the identity, or signed out.
    Resolved(Option<Identity>),
}

impl SessionState {
    /// `Some(identity_or_none)` once settled, `None` while loading.
    #[must_use]
    pub fn resolved(&self) -> Option<Option<&Identity>> {
        match self {
            SessionState::Resolved(identity) => Some(identity.as_ref()),
            SessionState::Unresolved | SessionState::Resolving => None,
        }
    }

    #[must_use]
    pub fn identity(&self) -> Option<&Identity> {
        self.resolved().flatten()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, SessionState::Resolving)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Signed in; the token is stored and the user was sent home.
    LoggedIn(Identity),
    /// Another resolution was already in flight; nothing happened.
    Ignored,
    /// A logout or newer login happened while the request was in flight.
    Superseded,
}

enum TokenWrite<'a> {
    Keep,
    Save(&'a str),
    Clear,
}

enum Applied {
    Done,
    Stale,
    Failed(HelpdeskError),
}

pub struct SessionContext {
    client: Arc<dyn HelpdeskClient>,
    store: Arc<dyn SessionStore>,
    navigator: Arc<dyn Navigator>,
    state: watch::Sender<SessionState>,
    generation: AtomicU64,
    started: AtomicBool,
}

impl SessionContext {
    #[must_use]
    pub fn new(
        client: Arc<dyn HelpdeskClient>,
        store: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            client,
            store,
            navigator,
            state: watch::Sender::new(SessionState::Unresolved),
            generation: AtomicU64::new(0),
            started: AtomicBool::new(false),
        }
    }

    /// Run the startup transition. Only the first call that gets to start a
    /// resolution does anything; a call made while a login is in flight
    /// leaves startup for a later call.
    ///
    /// Without a stored token the session settles signed out and the
    /// service is not contacted. With one, the service is asked who it
    /// belongs to; any failure clears the token and settles signed out.
    pub async fn init(&self) {
        if self.started.swap(true, Ordering::SeqCst) {
            return;
        }

        let token = self.store.load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "session token unreadable; starting signed out");
            None
        });

        let Some(email) = token else {
            self.state.send_if_modified(|state| {
                if matches!(state, SessionState::Unresolved) {
                    *state = SessionState::Resolved(None);
                    true
                } else {
                    false
                }
            });
            tracing::debug!("no session token");
            return;
        };

        let Some((generation, _)) = self.begin() else {
            // A login is in flight; the token stays unresolved until the next init.
            self.started.store(false, Ordering::SeqCst);
            tracing::debug!("resolution already in flight; startup deferred");
            return;
        };

        match self.client.who_am_i(&email).await {
            Ok(identity) => {
                let user_id = identity.id;
                if let Applied::Stale =
                    self.apply(generation, SessionState::Resolved(Some(identity)), TokenWrite::Keep)
                {
                    tracing::debug!("stale session resolution discarded");
                } else {
                    tracing::info!(user_id, "session restored");
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "session token rejected; signing out");
                if let Applied::Stale =
                    self.apply(generation, SessionState::Resolved(None), TokenWrite::Clear)
                {
                    tracing::debug!("stale session failure discarded");
                }
            }
        }
    }

    /// Sign in as `email`.
    ///
    /// # Errors
    /// `Validation` for a blank email; otherwise the service's error (its
    /// reason is in [`HelpdeskError::user_message`]). On error the previous
    /// session, stored token included, is left as it was.
    pub async fn login(&self, email: &str) -> Result<LoginOutcome, HelpdeskError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(HelpdeskError::validation("email", "El email es obligatorio"));
        }

        let Some((generation, previous)) = self.begin() else {
            tracing::debug!("login ignored; resolution in flight");
            return Ok(LoginOutcome::Ignored);
        };

        match self.client.login(email).await {
            Ok(identity) => {
                let user_id = identity.id;
                let token = identity.email.clone();
                match self.apply(
                    generation,
                    SessionState::Resolved(Some(identity.clone())),
                    TokenWrite::Save(&token),
                ) {
                    Applied::Done => {
                        tracing::info!(user_id, "signed in");
                        self.navigator.push(Route::Home);
                        Ok(LoginOutcome::LoggedIn(identity))
                    }
                    Applied::Stale => Ok(LoginOutcome::Superseded),
                    Applied::Failed(e) => {
                        self.restore(generation, previous);
                        Err(e)
                    }
                }
            }
            Err(e) => {
                if self.restore(generation, previous) {
                    tracing::debug!(error = %e, "login rejected");
                    Err(e)
                } else {
                    Ok(LoginOutcome::Superseded)
                }
            }
        }
    }

    /// Sign out. Always succeeds and may be called in any state.
    pub fn logout(&self) {
        self.state.send_modify(|state| {
            self.generation.fetch_add(1, Ordering::SeqCst);
            if let Err(e) = self.store.clear() {
                tracing::warn!(error = %e, "failed to remove session token");
            }
            *state = SessionState::Resolved(None);
        });
        tracing::info!("signed out");
        self.navigator.replace(Route::Login);
    }

    /// Detach from the host: drop in-flight results and the in-memory
    /// identity. The stored token stays, and a later [`init`](Self::init)
    /// resolves it again.
    pub fn teardown(&self) {
        self.state.send_modify(|state| {
            self.generation.fetch_add(1, Ordering::SeqCst);
            *state = SessionState::Unresolved;
        });
        self.started.store(false, Ordering::SeqCst);
        tracing::debug!("session torn down");
    }

    #[must_use]
    pub fn current_identity(&self) -> Option<Identity> {
        self.state.borrow().identity().cloned()
    }

    #[must_use]
    pub fn current_role(&self) -> Option<Role> {
        self.state.borrow().identity().map(|identity| identity.role)
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading()
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    #[must_use]
    pub fn client(&self) -> &Arc<dyn HelpdeskClient> {
        &self.client
    }

    /// Enter `Resolving` under a fresh generation. `None` if a resolution
    /// is already in flight. Also returns the state being replaced.
    fn begin(&self) -> Option<(u64, SessionState)> {
        let mut started = None;
        self.state.send_if_modified(|state| {
            if state.is_loading() {
                return false;
            }
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            let previous = std::mem::replace(state, SessionState::Resolving);
            started = Some((generation, previous));
            true
        });
        started
    }

    fn apply(&self, generation: u64, next: SessionState, token: TokenWrite<'_>) -> Applied {
        let mut applied = Applied::Stale;
        self.state.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            match token {
                TokenWrite::Keep => {}
                TokenWrite::Save(email) => {
                    if let Err(e) = self.store.save(email) {
                        applied = Applied::Failed(e);
                        return false;
                    }
                }
                TokenWrite::Clear => {
                    if let Err(e) = self.store.clear() {
                        tracing::warn!(error = %e, "failed to remove session token");
                    }
                }
            }
            *state = next;
            applied = Applied::Done;
            true
        });
        applied
    }

    /// Put back the state a failed login replaced. A login that started
    /// before startup leaves `Unresolved`, so the next `init` still resolves
    /// the stored token. Returns `false` when the login had already been
    /// superseded.
    fn restore(&self, generation: u64, previous: SessionState) -> bool {
        let mut restored = false;
        self.state.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            *state = previous;
            restored = true;
            true
        });
        restored
    }
}
