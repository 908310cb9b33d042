//! [`HelpdeskClient`] over HTTP.

use async_trait::async_trait;
use helpdesk_sdk::{
    HelpdeskClient, HelpdeskError, Identity, IdentityPatch, Interaction, NewTicket, NewUser, Role,
    Ticket, TicketId, TicketPriority, TicketRef, TicketStatus, TicketUpdate, UserId,
};
use serde::de::DeserializeOwned;
use ticketdesk_http::{HttpClient, HttpClientBuilder, HttpError, HttpResponse};
use url::Url;

use crate::config::ApiConfig;
use crate::mapper;
use crate::wire::{
    CreateTicketRequest, ErrorBody, InteractionRecord, LoginRequest, RegisterRequest,
    TicketCreated, TicketRecord, UserPatchRequest, UserRecord,
};

/// How a non-2xx answer is classified for a given call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Call {
    WhoAmI,
    Login,
    Other,
}

/// HTTP implementation of [`HelpdeskClient`].
///
/// Cheap to clone; the underlying [`HttpClient`] is a buffered tower stack.
#[derive(Clone)]
pub struct HttpHelpdeskClient {
    http: HttpClient,
    base: Url,
}

impl HttpHelpdeskClient {
    /// Build a client from configuration. Must run inside a tokio runtime.
    ///
    /// # Errors
    /// `Validation` when the base URL does not parse; `Network` when the
    /// transport cannot be built (TLS roots, invalid user agent).
    pub fn new(config: &ApiConfig) -> Result<Self, HelpdeskError> {
        let base = Url::parse(&config.base_url).map_err(|e| {
            HelpdeskError::validation("base_url", format!("'{}': {e}", config.base_url))
        })?;
        if base.cannot_be_a_base() {
            return Err(HelpdeskError::validation(
                "base_url",
                format!("'{}' cannot be used as a base URL", config.base_url),
            ));
        }

        let http = HttpClientBuilder::with_config(config.http_config())
            .build()
            .map_err(|e| HelpdeskError::network(e.to_string()))?;

        tracing::debug!(base_url = %base, "helpdesk client ready");
        Ok(Self { http, base })
    }

    /// Base URL joined with `segments` (each percent-encoded) and `query`.
    fn endpoint(&self, segments: &[&str], query: &[(&str, &str)]) -> String {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        url.into()
    }

    async fn read<T: DeserializeOwned>(
        record: &'static str,
        call: Call,
        sent: Result<HttpResponse, HttpError>,
    ) -> Result<T, HelpdeskError> {
        let body = sent
            .map_err(|e| classify(call, e))?
            .checked_bytes()
            .await
            .map_err(|e| classify(call, e))?;

        serde_json::from_slice(&body).map_err(|e| {
            tracing::warn!(record, error = %e, "undecodable response body");
            HelpdeskError::malformed(record, e.to_string())
        })
    }

    /// Status and priority changes answer either with the updated record or
    /// with a bare `{"mensaje": ...}`.
    async fn read_update(
        sent: Result<HttpResponse, HttpError>,
    ) -> Result<TicketUpdate, HelpdeskError> {
        let value: serde_json::Value = Self::read(mapper::TICKET, Call::Other, sent).await?;
        if value.get("id_ticket").is_none() {
            return Ok(TicketUpdate::Acknowledged);
        }
        let record: TicketRecord = serde_json::from_value(value)
            .map_err(|e| HelpdeskError::malformed(mapper::TICKET, e.to_string()))?;
        mapper::map_ticket(record).map(TicketUpdate::Full)
    }
}

/// Map a transport or status failure onto the helpdesk error taxonomy.
fn classify(call: Call, err: HttpError) -> HelpdeskError {
    if err.is_transport() {
        tracing::warn!(error = %err, "ticket service unreachable");
        return HelpdeskError::network(err.to_string());
    }

    match err {
        HttpError::HttpStatus {
            status,
            body_preview,
            ..
        } => {
            let detail = serde_json::from_str::<ErrorBody>(&body_preview)
                .ok()
                .and_then(|body| body.reason());
            match call {
                Call::Login => HelpdeskError::Authentication { reason: detail },
                Call::WhoAmI
                    if matches!(status.as_u16(), 401 | 403 | 404) =>
                {
                    HelpdeskError::NotAuthenticated
                }
                Call::WhoAmI | Call::Other => HelpdeskError::Service {
                    status: status.as_u16(),
                    detail,
                },
            }
        }
        HttpError::BodyTooLarge { .. } | HttpError::Json(_) => {
            HelpdeskError::malformed("response", err.to_string())
        }
        other => HelpdeskError::network(other.to_string()),
    }
}

#[async_trait]
impl HelpdeskClient for HttpHelpdeskClient {
    async fn who_am_i(&self, email: &str) -> Result<Identity, HelpdeskError> {
        let url = self.endpoint(&["me"], &[("email", email)]);
        let record: UserRecord =
            Self::read(mapper::USER, Call::WhoAmI, self.http.get(&url).send().await).await?;
        mapper::map_identity(record, email)
    }

    async fn login(&self, email: &str) -> Result<Identity, HelpdeskError> {
        let url = self.endpoint(&["auth", "login"], &[]);
        let sent = match self.http.post(&url).json(&LoginRequest { email }) {
            Ok(req) => req.send().await,
            Err(e) => Err(e),
        };
        let record: UserRecord = Self::read(mapper::USER, Call::Login, sent).await?;
        tracing::debug!(user_id = record.id, "login accepted");
        mapper::map_identity(record, email)
    }

    async fn register(&self, user: &NewUser) -> Result<Identity, HelpdeskError> {
        let url = self.endpoint(&["auth", "register"], &[]);
        let body = RegisterRequest {
            nombre: &user.display_name,
            email: &user.email,
            rol: user.role.as_wire(),
        };
        let sent = match self.http.post(&url).json(&body) {
            Ok(req) => req.send().await,
            Err(e) => Err(e),
        };
        let record: UserRecord = Self::read(mapper::USER, Call::Other, sent).await?;
        mapper::map_registered(record, user)
    }

    async fn list_tickets(
        &self,
        user_id: UserId,
        role: Role,
    ) -> Result<Vec<Ticket>, HelpdeskError> {
        let user_id = user_id.to_string();
        let url = self.endpoint(
            &["tickets"],
            &[("user_id", &user_id), ("user_role", role.as_wire())],
        );
        let records: Vec<TicketRecord> =
            Self::read(mapper::TICKET, Call::Other, self.http.get(&url).send().await).await?;
        mapper::map_tickets(records)
    }

    async fn create_ticket(
        &self,
        operator_id: UserId,
        ticket: &NewTicket,
    ) -> Result<TicketRef, HelpdeskError> {
        let operator_id = operator_id.to_string();
        let url = self.endpoint(&["tickets"], &[("operator_id", &operator_id)]);
        let body = CreateTicketRequest {
            client_email: &ticket.client_email,
            asunto: &ticket.subject,
            descripcion: &ticket.description,
            prioridad: ticket.priority.as_wire(),
        };
        let sent = match self.http.post(&url).json(&body) {
            Ok(req) => req.send().await,
            Err(e) => Err(e),
        };
        let created: TicketCreated = Self::read(mapper::TICKET, Call::Other, sent).await?;
        Ok(TicketRef {
            id: created.id_ticket.into_string(),
        })
    }

    async fn change_status(
        &self,
        ticket_id: &TicketId,
        status: TicketStatus,
    ) -> Result<TicketUpdate, HelpdeskError> {
        let url = self.endpoint(
            &["tickets", ticket_id, "estado"],
            &[("nuevo_estado", status.as_wire())],
        );
        Self::read_update(self.http.put(&url).send().await).await
    }

    async fn change_priority(
        &self,
        ticket_id: &TicketId,
        priority: TicketPriority,
    ) -> Result<TicketUpdate, HelpdeskError> {
        let url = self.endpoint(
            &["tickets", ticket_id, "prioridad"],
            &[("nueva_prioridad", priority.as_wire())],
        );
        Self::read_update(self.http.put(&url).send().await).await
    }

    async fn ticket_history(
        &self,
        ticket_id: &TicketId,
    ) -> Result<Vec<Interaction>, HelpdeskError> {
        let url = self.endpoint(&["tickets", ticket_id, "historial"], &[]);
        let records: Vec<InteractionRecord> =
            Self::read(mapper::INTERACTION, Call::Other, self.http.get(&url).send().await).await?;
        mapper::map_history(records)
    }

    async fn list_users(&self) -> Result<Vec<Identity>, HelpdeskError> {
        let url = self.endpoint(&["usuarios"], &[]);
        let records: Vec<UserRecord> =
            Self::read(mapper::USER, Call::Other, self.http.get(&url).send().await).await?;
        records.into_iter().map(mapper::map_user).collect()
    }

    async fn update_user(
        &self,
        id: UserId,
        patch: &IdentityPatch,
    ) -> Result<Identity, HelpdeskError> {
        if patch.is_empty() {
            return Err(HelpdeskError::validation("patch", "Nada que actualizar"));
        }

        let id = id.to_string();
        let url = self.endpoint(&["usuarios", &id], &[]);
        let body = UserPatchRequest {
            nombre: patch.display_name.as_deref(),
            email: patch.email.as_deref(),
            rol: patch.role.map(Role::as_wire),
            activo: patch.active,
        };
        let sent = match self.http.put(&url).json(&body) {
            Ok(req) => req.send().await,
            Err(e) => Err(e),
        };
        let record: UserRecord = Self::read(mapper::USER, Call::Other, sent).await?;
        mapper::map_user(record)
    }
}
