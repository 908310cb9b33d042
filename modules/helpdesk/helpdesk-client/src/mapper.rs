//! Data mapper: service records in, canonical domain values out.
//!
//! Total and deterministic for well-formed input. Optional fields that are
//! missing take their defaults; a missing required field, an unknown enum
//! value or an unparseable timestamp is a `MalformedResponse` naming the
//! record kind.

use helpdesk_sdk::{
    HelpdeskError, Identity, Interaction, InteractionAuthor, NewUser, Role, Ticket,
    TicketPriority, TicketStatus,
};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

use crate::wire::{InteractionRecord, TicketRecord, UserRecord};

pub(crate) const USER: &str = "user";
pub(crate) const TICKET: &str = "ticket";
pub(crate) const INTERACTION: &str = "interaction";

/// Parse a service timestamp.
///
/// Accepts RFC 3339 and the naive `YYYY-MM-DDTHH:MM:SS[.ffffff]` form the
/// service emits (also with a space separator), read as UTC.
///
/// # Errors
/// `MalformedResponse` for `record` when no format matches.
pub fn parse_timestamp(record: &'static str, raw: &str) -> Result<OffsetDateTime, HelpdeskError> {
    let raw = raw.trim();
    if let Ok(ts) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Ok(ts);
    }

    let naive_t = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]");
    let naive_space = format_description!("[year]-[month]-[day] [hour]:[minute]:[second][optional [.[subsecond]]]");

    PrimitiveDateTime::parse(raw, naive_t)
        .or_else(|_| PrimitiveDateTime::parse(raw, naive_space))
        .map(PrimitiveDateTime::assume_utc)
        .map_err(|e| HelpdeskError::malformed(record, format!("bad timestamp '{raw}': {e}")))
}

fn parse_role(record: &'static str, raw: &str) -> Result<Role, HelpdeskError> {
    raw.parse()
        .map_err(|e: helpdesk_sdk::ParseEnumError| HelpdeskError::malformed(record, e.to_string()))
}

fn required(record: &'static str, field: &str, value: Option<String>) -> Result<String, HelpdeskError> {
    value.ok_or_else(|| HelpdeskError::malformed(record, format!("missing field `{field}`")))
}

/// Map a user record resolved for `requested_email` (`/me`, `/auth/login`).
///
/// The login response carries no email; when the record does carry one it
/// must match the requested email, ignoring ASCII case. The resulting
/// identity always reports the requested email.
///
/// # Errors
/// `MalformedResponse` on a missing name, an unknown role or an email mismatch.
pub fn map_identity(record: UserRecord, requested_email: &str) -> Result<Identity, HelpdeskError> {
    if let Some(email) = record.email.as_deref()
        && !email.trim().eq_ignore_ascii_case(requested_email.trim())
    {
        return Err(HelpdeskError::malformed(
            USER,
            format!("record email '{email}' does not match '{requested_email}'"),
        ));
    }

    Ok(Identity {
        id: record.id,
        display_name: required(USER, "nombre", record.nombre)?,
        role: parse_role(USER, &record.rol)?,
        email: requested_email.trim().to_owned(),
        active: record.activo.unwrap_or(true),
    })
}

/// Map a user record from a listing or an update, which must be complete.
///
/// # Errors
/// `MalformedResponse` on a missing name or email, or an unknown role.
pub fn map_user(record: UserRecord) -> Result<Identity, HelpdeskError> {
    Ok(Identity {
        id: record.id,
        display_name: required(USER, "nombre", record.nombre)?,
        role: parse_role(USER, &record.rol)?,
        email: required(USER, "email", record.email)?,
        active: record.activo.unwrap_or(true),
    })
}

/// Complete a registration acknowledgement (`id_usuario`, `rol`) with the
/// submitted form.
///
/// # Errors
/// `MalformedResponse` on an unknown role.
pub fn map_registered(record: UserRecord, submitted: &NewUser) -> Result<Identity, HelpdeskError> {
    Ok(Identity {
        id: record.id,
        display_name: record
            .nombre
            .unwrap_or_else(|| submitted.display_name.clone()),
        role: parse_role(USER, &record.rol)?,
        email: record.email.unwrap_or_else(|| submitted.email.clone()),
        active: record.activo.unwrap_or(true),
    })
}

/// # Errors
/// `MalformedResponse` on an unknown priority or status, or a bad timestamp.
pub fn map_ticket(record: TicketRecord) -> Result<Ticket, HelpdeskError> {
    let priority: TicketPriority = record
        .prioridad
        .parse()
        .map_err(|e: helpdesk_sdk::ParseEnumError| HelpdeskError::malformed(TICKET, e.to_string()))?;
    let status: TicketStatus = record
        .estado
        .parse()
        .map_err(|e: helpdesk_sdk::ParseEnumError| HelpdeskError::malformed(TICKET, e.to_string()))?;

    Ok(Ticket {
        id: record.id_ticket.into_string(),
        subject: record.asunto,
        description: record.descripcion.unwrap_or_default(),
        priority,
        status,
        created_at: parse_timestamp(TICKET, &record.fecha_creacion)?,
    })
}

/// # Errors
/// The first record that fails [`map_ticket`].
pub fn map_tickets(records: Vec<TicketRecord>) -> Result<Vec<Ticket>, HelpdeskError> {
    records.into_iter().map(map_ticket).collect()
}

/// # Errors
/// `MalformedResponse` on an unknown author or a bad timestamp.
pub fn map_interaction(record: InteractionRecord) -> Result<Interaction, HelpdeskError> {
    let author: InteractionAuthor = record.autor.parse().map_err(|e: helpdesk_sdk::ParseEnumError| {
        HelpdeskError::malformed(INTERACTION, e.to_string())
    })?;

    Ok(Interaction {
        id: record.id_interaccion,
        author,
        message: record.mensaje,
        created_at: parse_timestamp(INTERACTION, &record.fecha_creacion)?,
    })
}

/// Map a ticket history, ordered by creation time (stable for equal times).
///
/// # Errors
/// The first record that fails [`map_interaction`].
pub fn map_history(records: Vec<InteractionRecord>) -> Result<Vec<Interaction>, HelpdeskError> {
    let mut history = records
        .into_iter()
        .map(map_interaction)
        .collect::<Result<Vec<_>, _>>()?;
    history.sort_by_key(|i| i.created_at);
    Ok(history)
}
