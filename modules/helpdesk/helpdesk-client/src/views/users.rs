use helpdesk_sdk::{HelpdeskClient, HelpdeskError, Identity, IdentityPatch, Role, UserId};

use super::require_staff;

const UPDATE_FALLBACK: &str = "No se pudo actualizar el usuario";

/// Staff-only user listing with per-role counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserDirectory {
    users: Vec<Identity>,
    notice: Option<String>,
    error: Option<String>,
}

impl UserDirectory {
    #[must_use]
    pub fn from_users(users: Vec<Identity>) -> Self {
        Self {
            users,
            notice: None,
            error: None,
        }
    }

    /// # Errors
    /// `Forbidden` when the viewer is not staff. A failed read yields an
    /// empty directory with a notice.
    pub async fn load(
        client: &dyn HelpdeskClient,
        viewer: &Identity,
    ) -> Result<Self, HelpdeskError> {
        require_staff(viewer, "list users")?;
        match client.list_users().await {
            Ok(users) => Ok(Self::from_users(users)),
            Err(e) => {
                tracing::warn!(error = %e, "failed to load users");
                Ok(Self {
                    notice: Some("No se pudieron cargar los usuarios".to_owned()),
                    ..Self::default()
                })
            }
        }
    }

    #[must_use]
    pub fn users(&self) -> &[Identity] {
        &self.users
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.users.len()
    }

    #[must_use]
    pub fn count(&self, role: Role) -> usize {
        self.users.iter().filter(|u| u.role == role).count()
    }

    #[must_use]
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Apply `patch` to user `id` and replace the listed entry with the
    /// service's answer.
    ///
    /// # Errors
    /// `Forbidden` when the editor is not staff, otherwise the service's
    /// error. Either way the inline error is set.
    pub async fn update_user(
        &mut self,
        client: &dyn HelpdeskClient,
        editor: &Identity,
        id: UserId,
        patch: &IdentityPatch,
    ) -> Result<Identity, HelpdeskError> {
        let result = match require_staff(editor, "update users") {
            Ok(()) => client.update_user(id, patch).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(updated) => {
                self.error = None;
                if let Some(slot) = self.users.iter_mut().find(|u| u.id == updated.id) {
                    slot.clone_from(&updated);
                } else {
                    self.users.push(updated.clone());
                }
                tracing::info!(user_id = updated.id, "user updated");
                Ok(updated)
            }
            Err(e) => {
                self.error = Some(e.user_message(UPDATE_FALLBACK));
                Err(e)
            }
        }
    }
}
