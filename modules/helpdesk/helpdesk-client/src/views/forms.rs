use helpdesk_sdk::{HelpdeskClient, HelpdeskError, Identity, NewUser, Role};

use crate::routing::{Navigator, Route};
use crate::session::{LoginOutcome, SessionContext};

const LOGIN_FALLBACK: &str = "Error desconocido al iniciar sesi\u{f3}n";
const REGISTER_FALLBACK: &str = "Error desconocido al registrar";
const REGISTER_REQUIRED: &str = "Nombre y email son obligatorios";
const REGISTER_DONE: &str = "Registro exitoso. \u{a1}Inicia sesi\u{f3}n con tu nuevo email!";

/// Sign-in form. Navigation on success is done by the session.
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    error: Option<String>,
}

impl LoginForm {
    #[must_use]
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            error: None,
        }
    }

    /// Inline error from the last submit.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Returns the outcome, or `None` with [`error`](Self::error) set.
    pub async fn submit(&mut self, session: &SessionContext) -> Option<LoginOutcome> {
        self.error = None;
        match session.login(&self.email).await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                self.error = Some(e.user_message(LOGIN_FALLBACK));
                None
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub role: Role,
    error: Option<String>,
    notice: Option<String>,
}

impl Default for RegisterForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            role: Role::Customer,
            error: None,
            notice: None,
        }
    }
}

impl RegisterForm {
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Confirmation shown after a successful registration.
    #[must_use]
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Create the account and send the user to the login page.
    ///
    /// # Errors
    /// `Validation` when name or email is blank, otherwise the service's
    /// error. The inline error text is set in both cases.
    pub async fn submit(
        &mut self,
        client: &dyn HelpdeskClient,
        navigator: &dyn Navigator,
    ) -> Result<Identity, HelpdeskError> {
        self.error = None;
        self.notice = None;

        let name = self.name.trim();
        let email = self.email.trim();
        if name.is_empty() || email.is_empty() {
            self.error = Some(REGISTER_REQUIRED.to_owned());
            return Err(HelpdeskError::validation("nombre", REGISTER_REQUIRED));
        }

        let user = NewUser {
            display_name: name.to_owned(),
            email: email.to_owned(),
            role: self.role,
        };
        match client.register(&user).await {
            Ok(identity) => {
                tracing::info!(user_id = identity.id, "account registered");
                self.notice = Some(REGISTER_DONE.to_owned());
                navigator.push(Route::Login);
                Ok(identity)
            }
            Err(e) => {
                self.error = Some(e.user_message(REGISTER_FALLBACK));
                Err(e)
            }
        }
    }
}
