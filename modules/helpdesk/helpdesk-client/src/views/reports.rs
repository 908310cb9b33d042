use helpdesk_sdk::{HelpdeskClient, HelpdeskError, Identity, Ticket, TicketPriority, TicketStatus};

use super::{require_staff, share};

/// Dashboard counters: total and per status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketSummary {
    pub total: usize,
    pub by_status: Vec<(TicketStatus, usize)>,
}

impl TicketSummary {
    #[must_use]
    pub fn from_tickets(tickets: &[Ticket]) -> Self {
        Self {
            total: tickets.len(),
            by_status: TicketStatus::ALL
                .into_iter()
                .map(|s| (s, tickets.iter().filter(|t| t.status == s).count()))
                .collect(),
        }
    }

    #[must_use]
    pub fn count(&self, status: TicketStatus) -> usize {
        self.by_status
            .iter()
            .find(|(s, _)| *s == status)
            .map_or(0, |(_, n)| *n)
    }
}

/// One bar or pie slice.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSlice {
    pub label: &'static str,
    pub value: usize,
    /// Fraction of the total, `0.0..=1.0`.
    pub share: f64,
}

/// Staff report: the summary plus a priority breakdown and chart series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportView {
    pub summary: TicketSummary,
    pub by_priority: Vec<(TicketPriority, usize)>,
    pub chart: Vec<ChartSlice>,
    /// Set when the tickets could not be read.
    pub notice: Option<String>,
}

impl ReportView {
    #[must_use]
    pub fn from_tickets(tickets: &[Ticket]) -> Self {
        let summary = TicketSummary::from_tickets(tickets);
        let by_priority = TicketPriority::ALL
            .into_iter()
            .map(|p| (p, tickets.iter().filter(|t| t.priority == p).count()))
            .collect();
        let chart = summary
            .by_status
            .iter()
            .map(|&(status, value)| ChartSlice {
                label: status.label(),
                value,
                share: share(value, summary.total),
            })
            .collect();

        Self {
            summary,
            by_priority,
            chart,
            notice: None,
        }
    }

    /// Build the report for `viewer`.
    ///
    /// # Errors
    /// `Forbidden` when the viewer is not staff. A failed read is not an
    /// error: the report is empty and carries a notice.
    pub async fn load(
        client: &dyn HelpdeskClient,
        viewer: &Identity,
    ) -> Result<Self, HelpdeskError> {
        require_staff(viewer, "view reports")?;
        match client.list_tickets(viewer.id, viewer.role).await {
            Ok(tickets) => Ok(Self::from_tickets(&tickets)),
            Err(e) => {
                tracing::warn!(error = %e, "failed to load report data");
                Ok(Self {
                    notice: Some("No se pudieron cargar los datos del reporte".to_owned()),
                    ..Self::from_tickets(&[])
                })
            }
        }
    }
}
