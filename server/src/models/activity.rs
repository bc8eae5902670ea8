use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::money::Money;
use crate::models::ticket::{Ticket, TicketNumber, TicketStatus};

/// One row of the recent-activity feed.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivitySummary {
    pub id: Uuid,
    pub ticket_number: TicketNumber,
    pub license_plate: String,
    pub entry_time: DateTime<Utc>,
    pub exit_time: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i64>,
    pub amount: Option<Money>,
    pub status: TicketStatus,
}

impl From<Ticket> for ActivitySummary {
    fn from(ticket: Ticket) -> Self {
        Self {
            amount: ticket.amount_paid(),
            id: ticket.id,
            ticket_number: ticket.ticket_number,
            license_plate: ticket.license_plate,
            entry_time: ticket.entry_time,
            exit_time: ticket.exit_time,
            duration_minutes: ticket.duration_minutes,
            status: ticket.status,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityResponse {
    pub id: Uuid,
    pub ticket_number: TicketNumber,
    pub license_plate: String,
    pub entry_time: DateTime<Utc>,
    pub exit_time: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i64>,
    pub amount: Option<f64>,
    pub status: TicketStatus,
}

impl From<ActivitySummary> for ActivityResponse {
    fn from(activity: ActivitySummary) -> Self {
        Self {
            id: activity.id,
            ticket_number: activity.ticket_number,
            license_plate: activity.license_plate,
            entry_time: activity.entry_time,
            exit_time: activity.exit_time,
            duration_minutes: activity.duration_minutes,
            amount: activity.amount.map(|m| m.major_units()),
            status: activity.status,
        }
    }
}
