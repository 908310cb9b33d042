use helpdesk_sdk::{HelpdeskClient, Interaction, InteractionAuthor, TicketId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub interaction: Interaction,
    /// Operator messages sit on the right of the conversation.
    pub align_right: bool,
}

/// Conversation of one ticket, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketHistoryView {
    pub ticket_id: TicketId,
    pub entries: Vec<HistoryEntry>,
    pub notice: Option<String>,
}

impl TicketHistoryView {
    #[must_use]
    pub fn from_interactions(ticket_id: TicketId, mut interactions: Vec<Interaction>) -> Self {
        interactions.sort_by_key(|i| i.created_at);
        let entries = interactions
            .into_iter()
            .map(|interaction| HistoryEntry {
                align_right: interaction.author == InteractionAuthor::Operator,
                interaction,
            })
            .collect();
        Self {
            ticket_id,
            entries,
            notice: None,
        }
    }

    /// Fetch the history; a failed read yields an empty view with a notice.
    pub async fn load(client: &dyn HelpdeskClient, ticket_id: &TicketId) -> Self {
        match client.ticket_history(ticket_id).await {
            Ok(interactions) => Self::from_interactions(ticket_id.clone(), interactions),
            Err(e) => {
                tracing::warn!(ticket_id = %ticket_id, error = %e, "failed to load ticket history");
                Self {
                    ticket_id: ticket_id.clone(),
                    entries: Vec::new(),
                    notice: Some("No se pudo cargar el historial".to_owned()),
                }
            }
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
