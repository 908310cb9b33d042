//! Record shapes exchanged with the remote service.
//!
//! Field names follow the service (`nombre`, `asunto`, `fecha_creacion`).
//! Nothing here leaves the crate's client boundary; [`crate::mapper`] turns
//! incoming records into domain values.

use serde::{Deserialize, Serialize};

/// Numeric or string identifier as emitted by the service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum WireId {
    Int(i64),
    Str(String),
}

impl WireId {
    #[must_use]
    pub fn into_string(self) -> String {
        match self {
            WireId::Int(n) => n.to_string(),
            WireId::Str(s) => s,
        }
    }
}

/// A user as returned by `/me`, `/auth/login`, `/auth/register` and `/usuarios`.
///
/// The primary key arrives as `id` or `id_usuario` depending on the endpoint.
/// Only the key and the role are always present.
#[derive(Debug, Clone, Deserialize)]
pub struct UserRecord {
    #[serde(alias = "id_usuario")]
    pub id: i64,
    #[serde(default)]
    pub nombre: Option<String>,
    pub rol: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub activo: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TicketRecord {
    pub id_ticket: WireId,
    pub asunto: String,
    #[serde(default)]
    pub descripcion: Option<String>,
    pub prioridad: String,
    pub estado: String,
    pub fecha_creacion: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InteractionRecord {
    pub id_interaccion: i64,
    pub autor: String,
    pub mensaje: String,
    pub fecha_creacion: String,
}

/// Acknowledgement of `POST /tickets`.
#[derive(Debug, Clone, Deserialize)]
pub struct TicketCreated {
    pub id_ticket: WireId,
}

/// Error body produced by the service: `{"detail": "..."}`, or a list of
/// `{"msg": ...}` entries for request validation failures.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorBody {
    /// Human-readable reason, if the body carried one.
    #[must_use]
    pub fn reason(&self) -> Option<String> {
        match self.detail.as_ref()? {
            serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            serde_json::Value::Array(items) => {
                let msgs: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(serde_json::Value::as_str))
                    .collect();
                if msgs.is_empty() {
                    None
                } else {
                    Some(msgs.join("; "))
                }
            }
            _ => None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
}

#[derive(Debug, Serialize)]
pub struct RegisterRequest<'a> {
    pub nombre: &'a str,
    pub email: &'a str,
    pub rol: &'static str,
}

#[derive(Debug, Serialize)]
pub struct CreateTicketRequest<'a> {
    pub client_email: &'a str,
    pub asunto: &'a str,
    pub descripcion: &'a str,
    pub prioridad: &'static str,
}

#[derive(Debug, Default, Serialize)]
pub struct UserPatchRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nombre: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rol: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activo: Option<bool>,
}
